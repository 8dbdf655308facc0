//! One load → migrate → save pass against a blob store.

use std::fmt;

use anyhow::{Context, Result};
use tracing::info;

use vellum_core::{
    MigrationPlan, MigrationRegistry, MigrationReport, MigrationRunner, TracingReporter,
};
use vellum_store::BlobStore;
use vellum_types::SchemaVersion;

#[derive(Debug, Clone, Default)]
pub struct PassOptions {
    /// Overrides the newest registered version as the target.
    pub target: Option<SchemaVersion>,
    /// Send escalated failures to the diagnostics reporter.
    pub report_failures: bool,
    pub dry_run: bool,
}

#[derive(Debug)]
pub enum PassSummary {
    /// Nothing persisted yet.
    NoState,
    Planned(MigrationPlan),
    Migrated(MigrationReport),
}

impl fmt::Display for PassSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoState => f.write_str("No state blob found; nothing to migrate."),
            Self::Planned(plan) => write!(f, "Dry run: {plan}"),
            Self::Migrated(report) => {
                write!(f, "#{} -> #{}: {}", report.from, report.to, report.outcome)?;
                if !report.skipped.is_empty() {
                    write!(f, " ({} skipped)", report.skipped.len())?;
                }
                Ok(())
            }
        }
    }
}

pub fn run_pass(
    store: &dyn BlobStore,
    registry: &MigrationRegistry,
    options: &PassOptions,
) -> Result<PassSummary> {
    let Some(state) = store.load().context("failed to load state blob")? else {
        info!("No state blob yet; nothing to migrate");
        return Ok(PassSummary::NoState);
    };

    let reporter = TracingReporter;
    let mut runner = MigrationRunner::new(registry);
    if let Some(target) = options.target {
        runner = runner.with_target(target);
    }
    if options.report_failures {
        runner = runner.with_reporter(&reporter);
    }

    if options.dry_run {
        return Ok(PassSummary::Planned(runner.plan(&state)));
    }

    let report = runner.run(&state);
    if report.ran() {
        store
            .save(&report.state)
            .context("failed to persist migrated state")?;
    }
    Ok(PassSummary::Migrated(report))
}
