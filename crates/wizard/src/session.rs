use serde::Serialize;
use serde::de::DeserializeOwned;

use storage::{KeyValueStore, PersistedSlot, StoreError};

/// Durable holder for an in-progress form.
///
/// Every update persists the whole record immediately, independent of the
/// wizard lifecycle, so a half-filled form survives app restarts. The
/// record is removed only on cancel-at-first-step or successful submission
/// (via `reset`).
pub struct FormSession<D, S> {
    store: S,
    slot: PersistedSlot<D>,
    data: D,
}

impl<D, S> FormSession<D, S>
where
    D: Serialize + DeserializeOwned,
    S: KeyValueStore,
{
    /// Open the session: resume a persisted draft if one exists, otherwise
    /// start from (and persist) `initial`.
    pub fn open(store: S, key: &'static str, initial: D) -> Result<Self, StoreError> {
        let slot = PersistedSlot::new(key);
        let mut session = Self {
            store,
            slot,
            data: initial,
        };
        if let Some(existing) = session.slot.load(&session.store)? {
            session.data = existing;
        } else {
            session.slot.save(&mut session.store, &session.data)?;
        }
        Ok(session)
    }

    pub fn data(&self) -> &D {
        &self.data
    }

    /// Mutate the draft and persist the full record (replace, not patch, so
    /// observers always see whole updates).
    pub fn update(&mut self, mutate: impl FnOnce(&mut D)) -> Result<(), StoreError> {
        mutate(&mut self.data);
        self.slot.save(&mut self.store, &self.data)
    }

    /// Drop the persisted record and start over from `fresh`.
    pub fn reset(&mut self, fresh: D) -> Result<(), StoreError> {
        self.slot.clear(&mut self.store)?;
        self.data = fresh;
        Ok(())
    }

    pub fn into_store(self) -> S {
        self.store
    }
}
