//! `~/.vellum/config.toml`.
//!
//! ```toml
//! [store]
//! path = "${HOME}/.vellum/state.json"
//! fsync = true
//!
//! [migrations]
//! target_version = 185
//!
//! [diagnostics]
//! enabled = true
//! ```
//!
//! Every section is optional; a missing file means defaults.

use std::path::{Path, PathBuf};
use std::{env, fs, io};

use serde::Deserialize;
use thiserror::Error;
use vellum_types::SchemaVersion;

const CONFIG_DIR: &str = ".vellum";
const CONFIG_FILE: &str = "config.toml";
const STATE_FILE: &str = "state.json";

// Default value function for serde (bool::default() is false, so only true needs a fn)
const fn default_true() -> bool {
    true
}

#[derive(Debug, Default, Deserialize)]
pub struct VellumConfig {
    pub store: Option<StoreConfig>,
    pub migrations: Option<MigrationsConfig>,
    pub diagnostics: Option<DiagnosticsConfig>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StoreConfig {
    /// Blob location. `${VAR}` references are expanded.
    pub path: Option<String>,
    /// fsync the blob and its directory on save. Default: true.
    #[serde(default = "default_true")]
    pub fsync: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct MigrationsConfig {
    /// Stop at this version instead of the newest registered step.
    pub target_version: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct DiagnosticsConfig {
    /// Route escalated failures to the error log. Default: true.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config at {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl ConfigError {
    pub fn path(&self) -> &PathBuf {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

impl VellumConfig {
    /// Load from the default location. `Ok(None)` when there is no config file.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(None),
        }
    }

    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        match toml::from_str(&content) {
            Ok(config) => Ok(Some(config)),
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                Err(ConfigError::Parse {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        }
    }

    /// Configured blob path with `${VAR}` expanded, else the default location.
    #[must_use]
    pub fn state_path(&self) -> Option<PathBuf> {
        self.store
            .as_ref()
            .and_then(|store| store.path.as_deref())
            .map(|raw| PathBuf::from(expand_env_vars(raw)))
            .or_else(default_state_path)
    }

    #[must_use]
    pub fn fsync(&self) -> bool {
        self.store.as_ref().is_none_or(|store| store.fsync)
    }

    #[must_use]
    pub fn target_version(&self) -> Option<SchemaVersion> {
        self.migrations
            .as_ref()
            .and_then(|m| m.target_version)
            .map(SchemaVersion::new)
    }

    #[must_use]
    pub fn diagnostics_enabled(&self) -> bool {
        self.diagnostics.as_ref().is_none_or(|d| d.enabled)
    }
}

pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(CONFIG_DIR).join(CONFIG_FILE))
}

pub fn default_state_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(CONFIG_DIR).join(STATE_FILE))
}

/// Replace `${VAR}` with the variable's value. Unset variables become empty;
/// an unterminated `${` is kept literally.
#[must_use]
pub fn expand_env_vars(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            return out;
        };
        let var = &after[..end];
        if !var.is_empty() {
            out.push_str(&env::var(var).unwrap_or_default());
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    out
}
