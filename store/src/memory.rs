use std::sync::{Mutex, MutexGuard, PoisonError};

use vellum_types::VersionedState;

use crate::{BlobStore, StoreError};

/// Keeps the blob in memory. Loads hand out clones.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<Option<VersionedState>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_state(state: VersionedState) -> Self {
        Self {
            state: Mutex::new(Some(state)),
        }
    }

    /// Current contents, if any.
    #[must_use]
    pub fn snapshot(&self) -> Option<VersionedState> {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Option<VersionedState>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl BlobStore for MemoryStore {
    fn load(&self) -> Result<Option<VersionedState>, StoreError> {
        Ok(self.snapshot())
    }

    fn save(&self, state: &VersionedState) -> Result<(), StoreError> {
        *self.lock() = Some(state.clone());
        Ok(())
    }
}
