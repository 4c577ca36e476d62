use crate::{KeyValueStore, StoreError};

/// Browser localStorage backend. All keys are namespaced under a fixed
/// prefix so several stores can share the same origin.
#[derive(Debug)]
pub struct LocalStorageStore {
    key_prefix: String,
}

impl LocalStorageStore {
    pub fn new(key_prefix: impl Into<String>) -> Result<Self, StoreError> {
        let store = Self {
            key_prefix: key_prefix.into(),
        };
        // Fail fast if storage is unavailable (private mode, disabled, ...).
        window_local_storage()?;
        Ok(store)
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}.{}", self.key_prefix, key)
    }
}

impl KeyValueStore for LocalStorageStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let storage = window_local_storage()?;
        storage
            .get_item(&self.full_key(key))
            .map_err(|e| StoreError::Io(format!("get_item failed: {:?}", e)))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let storage = window_local_storage()?;
        storage
            .set_item(&self.full_key(key), value)
            .map_err(|e| StoreError::Io(format!("set_item failed: {:?}", e)))
    }

    fn remove(&mut self, key: &str) -> Result<bool, StoreError> {
        let storage = window_local_storage()?;
        let full = self.full_key(key);
        let existed = storage
            .get_item(&full)
            .map_err(|e| StoreError::Io(format!("get_item failed: {:?}", e)))?
            .is_some();
        if existed {
            storage
                .remove_item(&full)
                .map_err(|e| StoreError::Io(format!("remove_item failed: {:?}", e)))?;
        }
        Ok(existed)
    }
}

fn window_local_storage() -> Result<web_sys::Storage, StoreError> {
    let win = web_sys::window().ok_or(StoreError::StorageUnavailable)?;
    win.local_storage()
        .map_err(|e| StoreError::Io(format!("localStorage error: {:?}", e)))?
        .ok_or(StoreError::StorageUnavailable)
}
