mod file;
mod memory;
mod slot;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use slot::PersistedSlot;

/// Fixed storage keys for process-wide persisted state. Everything under
/// these keys survives app restarts until explicitly reset.
pub mod keys {
    pub const AUTH_TOKENS: &str = "auth.tokens";
    pub const USER_PROFILE: &str = "auth.user";
    pub const ADD_PLACE_FORM: &str = "form.add_place";
    pub const REGISTER_FORM: &str = "form.register";
    pub const BOTTOM_NAV_VISIBLE: &str = "nav.bottom_visible";
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    StorageUnavailable,
    Corrupt(String),
    Io(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::StorageUnavailable => write!(f, "persistent storage unavailable"),
            StoreError::Corrupt(msg) => write!(f, "stored payload corrupt: {msg}"),
            StoreError::Io(msg) => write!(f, "storage error: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Durable string key-value storage.
///
/// Values are JSON documents written by `PersistedSlot`; the store itself is
/// oblivious to their shape. Writes are full-record replacement, never
/// partial in-place mutation, so subscribers always observe whole updates.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<bool, StoreError>;
}

#[cfg(target_arch = "wasm32")]
mod wasm_storage;

#[cfg(target_arch = "wasm32")]
pub use wasm_storage::LocalStorageStore;

#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug)]
pub struct LocalStorageStore;

#[cfg(not(target_arch = "wasm32"))]
impl LocalStorageStore {
    pub fn new(_key_prefix: impl Into<String>) -> Result<Self, StoreError> {
        Err(StoreError::StorageUnavailable)
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl KeyValueStore for LocalStorageStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::StorageUnavailable)
    }

    fn set(&mut self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::StorageUnavailable)
    }

    fn remove(&mut self, _key: &str) -> Result<bool, StoreError> {
        Err(StoreError::StorageUnavailable)
    }
}
