//! Core domain types for vellum.
//!
//! This crate contains the persisted state shape and the small helpers a
//! migration step needs to inspect loosely-typed data. No IO, no async.

#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory

mod kind;
mod path;

pub use kind::ValueKind;
pub use path::StatePath;

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Per-controller state, keyed by controller name.
///
/// Insertion-ordered so a blob that passes through unchanged serializes
/// back with the same key order.
pub type StateData = Map<String, Value>;

// ============================================================================
// Schema Version
// ============================================================================

/// Schema version stamped on a persisted blob.
///
/// `0` marks a blob that has never been migrated.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SchemaVersion(u32);

impl SchemaVersion {
    pub const INITIAL: Self = Self(0);

    #[must_use]
    pub const fn new(version: u32) -> Self {
        Self(version)
    }

    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    #[must_use]
    pub const fn is_initial(self) -> bool {
        self.0 == 0
    }

    /// The version immediately before this one, saturating at [`Self::INITIAL`].
    #[must_use]
    pub const fn previous(self) -> Self {
        Self(self.0.saturating_sub(1))
    }
}

impl From<u32> for SchemaVersion {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Versioned State
// ============================================================================

/// Blob metadata.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Meta {
    /// Last migration fully applied to `data`.
    pub version: SchemaVersion,
    /// Keys written next to `version` by other builds, carried through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The single persisted state blob.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VersionedState {
    pub meta: Meta,
    #[serde(default)]
    pub data: StateData,
}

impl VersionedState {
    #[must_use]
    pub fn new(version: SchemaVersion, data: StateData) -> Self {
        Self {
            meta: Meta {
                version,
                extra: Map::new(),
            },
            data,
        }
    }

    #[must_use]
    pub fn version(&self) -> SchemaVersion {
        self.meta.version
    }

    /// Parse an already-deserialized blob.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}
