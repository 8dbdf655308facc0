//! Applies a registry to one state blob.

use std::any::Any;
use std::fmt;
use std::mem;
use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, info, warn};
use vellum_types::{SchemaVersion, StateData, VersionedState};

use crate::diagnostics::DiagnosticsReporter;
use crate::error::{MigrationFailure, StepError};
use crate::registry::MigrationRegistry;
use crate::step::{MigrationStep, SkipReason, StepOutcome};

/// One migration pass.
///
/// Build one per pass and drop it afterwards; nothing carries over between
/// runs except the registry itself.
pub struct MigrationRunner<'a> {
    registry: &'a MigrationRegistry,
    target: SchemaVersion,
    reporter: Option<&'a dyn DiagnosticsReporter>,
}

impl<'a> MigrationRunner<'a> {
    /// Target defaults to the highest registered version.
    #[must_use]
    pub fn new(registry: &'a MigrationRegistry) -> Self {
        Self {
            registry,
            target: registry.latest_version().unwrap_or(SchemaVersion::INITIAL),
            reporter: None,
        }
    }

    /// Pin the target version. Steps above it are not applied.
    #[must_use]
    pub fn with_target(mut self, target: SchemaVersion) -> Self {
        self.target = target;
        self
    }

    #[must_use]
    pub fn with_reporter(mut self, reporter: &'a dyn DiagnosticsReporter) -> Self {
        self.reporter = Some(reporter);
        self
    }

    #[must_use]
    pub fn target(&self) -> SchemaVersion {
        self.target
    }

    /// Steps a run would apply to `state`, without running them.
    #[must_use]
    pub fn plan(&self, state: &VersionedState) -> MigrationPlan {
        let from = state.version();
        let steps = self
            .registry
            .eligible(from, self.target)
            .map(|step| PlannedStep {
                version: step.version(),
                description: step.description().to_string(),
            })
            .collect();
        MigrationPlan {
            from,
            to: self.target.max(from),
            steps,
        }
    }

    /// Advance `original` to the target version. Never fails.
    #[must_use]
    pub fn migrate(&self, original: &VersionedState) -> VersionedState {
        self.run(original).state
    }

    /// Like [`Self::migrate`], keeping the record of what happened.
    ///
    /// The version stamp moves to the target as soon as the run starts. If
    /// any step fails, the failure is reported and `data` is restored to the
    /// caller's original payload; partial output is never kept.
    pub fn run(&self, original: &VersionedState) -> MigrationReport {
        let from = original.version();
        if from >= self.target {
            debug!(%from, target = %self.target, "State already at target version");
            return MigrationReport {
                state: original.clone(),
                from,
                to: from,
                applied: Vec::new(),
                skipped: Vec::new(),
                outcome: RunOutcome::UpToDate,
            };
        }

        let mut working = original.clone();
        working.meta.version = self.target;
        let data = mem::take(&mut working.data);

        let mut applied = Vec::new();
        let mut skipped = Vec::new();
        let outcome = match self.apply_eligible(from, data, &mut applied, &mut skipped) {
            Ok(data) => {
                working.data = data;
                RunOutcome::Completed
            }
            Err(failure) => {
                self.escalate(&failure);
                applied.clear();
                working.data = original.data.clone();
                RunOutcome::RolledBack {
                    failed_version: failure.version,
                    reason: failure.source.to_string(),
                }
            }
        };

        info!(
            %from,
            to = %self.target,
            applied = applied.len(),
            skipped = skipped.len(),
            %outcome,
            "Migration pass finished"
        );

        MigrationReport {
            state: working,
            from,
            to: self.target,
            applied,
            skipped,
            outcome,
        }
    }

    fn apply_eligible(
        &self,
        from: SchemaVersion,
        mut data: StateData,
        applied: &mut Vec<SchemaVersion>,
        skipped: &mut Vec<SkippedStep>,
    ) -> Result<StateData, MigrationFailure> {
        for step in self.registry.eligible(from, self.target) {
            let version = step.version();
            debug!(%version, description = step.description(), "Applying migration");
            match invoke(step, data) {
                Ok(StepOutcome::Applied(next)) => {
                    applied.push(version);
                    data = next;
                }
                Ok(StepOutcome::Skipped { data: next, reason }) => {
                    warn!(%version, "Migration {version}: {reason}");
                    skipped.push(SkippedStep { version, reason });
                    data = next;
                }
                Err(source) => return Err(MigrationFailure { version, source }),
            }
        }
        Ok(data)
    }

    fn escalate(&self, failure: &MigrationFailure) {
        warn!(version = %failure.version, "{failure}; keeping original data");
        if let Some(reporter) = self.reporter {
            reporter.report(failure);
        }
    }
}

impl fmt::Debug for MigrationRunner<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MigrationRunner")
            .field("registry", self.registry)
            .field("target", &self.target)
            .field("has_reporter", &self.reporter.is_some())
            .finish()
    }
}

fn invoke(step: &dyn MigrationStep, data: StateData) -> Result<StepOutcome, StepError> {
    panic::catch_unwind(AssertUnwindSafe(|| step.transform(data)))
        .unwrap_or_else(|payload| Err(StepError::Panicked(panic_message(&*payload))))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

// ============================================================================
// Reports
// ============================================================================

/// How a pass ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The blob was already at or past the target; nothing ran.
    UpToDate,
    Completed,
    /// A step failed; `data` is the caller's original payload.
    RolledBack {
        failed_version: SchemaVersion,
        reason: String,
    },
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UpToDate => f.write_str("up to date"),
            Self::Completed => f.write_str("completed"),
            Self::RolledBack {
                failed_version,
                reason,
            } => write!(f, "rolled back at #{failed_version}: {reason}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedStep {
    pub version: SchemaVersion,
    pub reason: SkipReason,
}

/// Everything a pass did.
#[derive(Debug, Clone, PartialEq)]
pub struct MigrationReport {
    pub state: VersionedState,
    pub from: SchemaVersion,
    pub to: SchemaVersion,
    /// Steps whose output is reflected in `state.data`. Empty after a rollback.
    pub applied: Vec<SchemaVersion>,
    pub skipped: Vec<SkippedStep>,
    pub outcome: RunOutcome,
}

impl MigrationReport {
    #[must_use]
    pub fn is_rolled_back(&self) -> bool {
        matches!(self.outcome, RunOutcome::RolledBack { .. })
    }

    /// False when the blob was already current and was returned as-is.
    #[must_use]
    pub fn ran(&self) -> bool {
        !matches!(self.outcome, RunOutcome::UpToDate)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedStep {
    pub version: SchemaVersion,
    pub description: String,
}

/// Dry-run view of a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationPlan {
    pub from: SchemaVersion,
    pub to: SchemaVersion,
    pub steps: Vec<PlannedStep>,
}

impl MigrationPlan {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl fmt::Display for MigrationPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} -> #{}", self.from, self.to)?;
        if self.steps.is_empty() {
            return f.write_str(" (no eligible migrations)");
        }
        for step in &self.steps {
            write!(f, "\n  #{}", step.version)?;
            if !step.description.is_empty() {
                write!(f, " {}", step.description)?;
            }
        }
        Ok(())
    }
}
