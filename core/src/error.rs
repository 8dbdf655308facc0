//! Error taxonomy for registration and step execution.

use std::error::Error as StdError;

use thiserror::Error;
use vellum_types::{SchemaVersion, StatePath, ValueKind};

/// A step was registered out of order. Fatal at startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("migration versions must be positive")]
    ZeroVersion,
    #[error("migration #{version} is already registered")]
    Duplicate { version: SchemaVersion },
    #[error("migration #{version} registered after #{latest}; versions must strictly increase")]
    OutOfOrder {
        version: SchemaVersion,
        latest: SchemaVersion,
    },
}

/// The data a step inspected does not have the shape it expects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaMismatch {
    #[error("{path} is not defined")]
    MissingKey { path: StatePath },
    #[error("typeof {path} is {found}, expected {expected}")]
    UnexpectedType {
        path: StatePath,
        expected: ValueKind,
        found: ValueKind,
    },
}

impl SchemaMismatch {
    #[must_use]
    pub fn path(&self) -> &StatePath {
        match self {
            Self::MissingKey { path } | Self::UnexpectedType { path, .. } => path,
        }
    }
}

/// Why a single step could not produce new data.
#[derive(Debug, Error)]
pub enum StepError {
    #[error(transparent)]
    SchemaMismatch(#[from] SchemaMismatch),
    #[error("{0}")]
    Failed(String),
    #[error("{context}")]
    Source {
        context: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
    #[error("step panicked: {0}")]
    Panicked(String),
}

impl StepError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }

    pub fn with_source(
        context: impl Into<String>,
        source: impl Into<Box<dyn StdError + Send + Sync>>,
    ) -> Self {
        Self::Source {
            context: context.into(),
            source: source.into(),
        }
    }
}

/// What the runner hands to the diagnostics reporter when a run rolls back.
#[derive(Debug, Error)]
#[error("Migration #{version} failed: {source}")]
pub struct MigrationFailure {
    pub version: SchemaVersion,
    #[source]
    pub source: StepError,
}
