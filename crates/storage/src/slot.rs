use std::marker::PhantomData;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::{KeyValueStore, StoreError};

/// Typed JSON view over a single storage key.
///
/// A slot does not own the store; callers pass whichever store backs the
/// current host (memory, file, browser localStorage).
#[derive(Debug)]
pub struct PersistedSlot<T> {
    key: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> PersistedSlot<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(key: &'static str) -> Self {
        Self {
            key,
            _marker: PhantomData,
        }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    pub fn load(&self, store: &dyn KeyValueStore) -> Result<Option<T>, StoreError> {
        let Some(raw) = store.get(self.key)? else {
            return Ok(None);
        };
        if raw.trim().is_empty() {
            return Ok(None);
        }
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| StoreError::Corrupt(e.to_string()))
    }

    pub fn save(&self, store: &mut dyn KeyValueStore, value: &T) -> Result<(), StoreError> {
        let raw = serde_json::to_string(value).map_err(|e| StoreError::Io(e.to_string()))?;
        store.set(self.key, &raw)
    }

    pub fn clear(&self, store: &mut dyn KeyValueStore) -> Result<bool, StoreError> {
        store.remove(self.key)
    }
}
