//! Versioned state migration engine.
//!
//! A [`MigrationRegistry`] holds version-tagged [`MigrationStep`]s in strictly
//! ascending order. A [`MigrationRunner`] advances one [`VersionedState`] to the
//! target version, applying every eligible step in order inside a single
//! rollback boundary:
//!
//! - the version stamp always advances to the target once a run starts
//! - `data` is either fully transformed or identical to the input
//! - step failures are reported to a [`DiagnosticsReporter`], never returned
//!
//! [`VersionedState`]: vellum_types::VersionedState

pub mod diagnostics;
mod error;
mod registry;
mod runner;
pub mod shape;
mod step;
pub mod steps;

pub use diagnostics::{CapturingReporter, DiagnosticsReporter, ReportedError, TracingReporter};
pub use error::{MigrationFailure, RegistrationError, SchemaMismatch, StepError};
pub use registry::{MigrationRegistry, Steps};
pub use runner::{
    MigrationPlan, MigrationReport, MigrationRunner, PlannedStep, RunOutcome, SkippedStep,
};
pub use step::{FnStep, MigrationStep, SkipReason, StepOutcome};
