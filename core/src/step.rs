//! The migration step contract.

use std::fmt;

use vellum_types::{SchemaVersion, StateData, StatePath};

use crate::error::StepError;

/// One version-tagged transform over a blob's `data`.
///
/// Implementations must not assume `data` has the shape they expect. Check it
/// (see [`crate::shape`]) and return a [`StepError`] or a soft-skip instead.
pub trait MigrationStep: Send + Sync {
    fn version(&self) -> SchemaVersion;

    fn description(&self) -> &str {
        ""
    }

    fn transform(&self, data: StateData) -> Result<StepOutcome, StepError>;
}

/// Successful result of a step.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    Applied(StateData),
    /// Nothing to do; `data` is handed back unchanged.
    Skipped { data: StateData, reason: SkipReason },
}

impl StepOutcome {
    #[must_use]
    pub fn data(&self) -> &StateData {
        match self {
            Self::Applied(data) | Self::Skipped { data, .. } => data,
        }
    }

    #[must_use]
    pub fn into_data(self) -> StateData {
        match self {
            Self::Applied(data) | Self::Skipped { data, .. } => data,
        }
    }
}

/// Expected, non-exceptional reasons to leave state alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// An optional sub-field is absent, e.g. on a fresh install.
    FieldAbsent { path: StatePath },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FieldAbsent { path } => write!(f, "{path} not found, skipping."),
        }
    }
}

/// A step built from a closure.
pub struct FnStep<F> {
    version: SchemaVersion,
    description: &'static str,
    transform: F,
}

impl<F> FnStep<F>
where
    F: Fn(StateData) -> Result<StepOutcome, StepError> + Send + Sync,
{
    pub fn new(version: u32, description: &'static str, transform: F) -> Self {
        Self {
            version: SchemaVersion::new(version),
            description,
            transform,
        }
    }
}

impl<F> MigrationStep for FnStep<F>
where
    F: Fn(StateData) -> Result<StepOutcome, StepError> + Send + Sync,
{
    fn version(&self) -> SchemaVersion {
        self.version
    }

    fn description(&self) -> &str {
        self.description
    }

    fn transform(&self, data: StateData) -> Result<StepOutcome, StepError> {
        (self.transform)(data)
    }
}

impl<F> fmt::Debug for FnStep<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnStep")
            .field("version", &self.version)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}
