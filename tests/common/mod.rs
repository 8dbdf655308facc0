//! Shared test utilities and fixtures
//!
//! Common infrastructure for integration tests.

#![allow(dead_code)]

use serde_json::Value;
use vellum_core::steps::builtin_registry;
use vellum_core::{CapturingReporter, MigrationReport, MigrationRunner, ReportedError};
use vellum_types::{SchemaVersion, VersionedState};

/// Version of the built-in transaction history migration.
pub const VERSION: u32 = 185;
pub const OLD_VERSION: u32 = VERSION - 1;

pub fn target() -> SchemaVersion {
    SchemaVersion::new(VERSION)
}

/// Build a blob from a `data` fixture.
pub fn versioned(version: u32, data: Value) -> VersionedState {
    VersionedState::from_value(serde_json::json!({
        "meta": { "version": version },
        "data": data,
    }))
    .expect("fixture must be a valid blob")
}

/// Run the built-in registry with a capturing reporter.
pub fn run_builtin(state: &VersionedState) -> (MigrationReport, Vec<ReportedError>) {
    let registry = builtin_registry().expect("built-in registry");
    let reporter = CapturingReporter::new();
    let report = MigrationRunner::new(&registry)
        .with_reporter(&reporter)
        .run(state);
    (report, reporter.take())
}

/// Serialized `data`, for byte-level comparisons.
pub fn data_json(state: &VersionedState) -> String {
    serde_json::to_string(&state.data).expect("serializable")
}
