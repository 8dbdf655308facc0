//! JSON file store.
//!
//! Writes go to a temp file in the target directory and are renamed over the
//! blob. Where rename cannot replace an existing file, the old blob is moved
//! to `<name>.bak` first; a `.bak` left behind by a crash in that window is
//! restored on the next load.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;
use vellum_types::VersionedState;

use crate::{BlobStore, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Durability {
    /// fsync the blob, then best-effort fsync its directory.
    #[default]
    Synced,
    /// Skip fsync. For tests and throwaway state.
    Relaxed,
}

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    durability: Durability,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            durability: Durability::default(),
        }
    }

    #[must_use]
    pub fn with_durability(mut self, durability: Durability) -> Self {
        self.durability = durability;
        self
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn backup_path(&self) -> PathBuf {
        self.path.with_extension("bak")
    }

    fn recover_backup(&self) {
        let backup = self.backup_path();
        if self.path.exists() || !backup.exists() {
            return;
        }
        match fs::rename(&backup, &self.path) {
            Ok(()) => tracing::warn!(
                path = %self.path.display(),
                "Recovered state blob from interrupted write"
            ),
            Err(e) => tracing::warn!(
                path = %self.path.display(),
                "Failed to recover .bak state blob: {e}"
            ),
        }
    }

    fn write(&self, bytes: &[u8]) -> io::Result<()> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent)?;

        let mut tmp = NamedTempFile::new_in(parent)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(tmp.path(), fs::Permissions::from_mode(0o600))?;
        }

        tmp.write_all(bytes)?;
        if self.durability == Durability::Synced {
            tmp.as_file().sync_all()?;
        }

        if let Err(err) = tmp.persist(&self.path) {
            if !self.path.exists() {
                return Err(err.error);
            }
            let backup = self.backup_path();
            let _ = fs::remove_file(&backup);
            fs::rename(&self.path, &backup)?;
            if let Err(retry) = err.file.persist(&self.path) {
                let _ = fs::rename(&backup, &self.path);
                return Err(retry.error);
            }
            if let Err(e) = fs::remove_file(&backup) {
                tracing::warn!(path = %backup.display(), "Failed to remove .bak after write: {e}");
            }
        }

        if self.durability == Durability::Synced {
            sync_dir(parent);
        }
        Ok(())
    }
}

impl BlobStore for JsonFileStore {
    fn load(&self) -> Result<Option<VersionedState>, StoreError> {
        self.recover_backup();
        if !self.path.exists() {
            return Ok(None);
        }

        let raw = fs::read_to_string(&self.path).map_err(|source| StoreError::Read {
            path: self.path.clone(),
            source,
        })?;
        let state = serde_json::from_str(&raw).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })?;
        debug!(path = %self.path.display(), "Loaded state blob");
        Ok(Some(state))
    }

    fn save(&self, state: &VersionedState) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(state).map_err(StoreError::Encode)?;
        self.write(&bytes).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })?;
        debug!(
            path = %self.path.display(),
            version = %state.version(),
            "Saved state blob"
        );
        Ok(())
    }
}

#[cfg(unix)]
fn sync_dir(dir: &Path) {
    if let Err(e) = fs::File::open(dir).and_then(|d| d.sync_all()) {
        debug!(path = %dir.display(), "Directory sync failed (best-effort): {e}");
    }
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) {}
