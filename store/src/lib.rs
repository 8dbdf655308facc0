//! Where the state blob lives between runs.
//!
//! - **`file`**: JSON on disk, written with temp file + rename
//! - **`memory`**: in-process store for tests and embedding hosts

mod file;
mod memory;

pub use file::{Durability, JsonFileStore};
pub use memory::MemoryStore;

use std::io;
use std::path::PathBuf;

use thiserror::Error;
use vellum_types::VersionedState;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read state from {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse state at {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode state")]
    Encode(#[source] serde_json::Error),
    #[error("failed to write state to {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Supplies the blob before a migration pass and accepts it afterwards.
pub trait BlobStore {
    /// `Ok(None)` when nothing has been persisted yet.
    fn load(&self) -> Result<Option<VersionedState>, StoreError>;

    fn save(&self, state: &VersionedState) -> Result<(), StoreError>;
}
