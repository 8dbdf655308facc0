//! Diagnostics reporting for escalated migration failures.
//!
//! The runner is handed a reporter rather than reaching for a global sink, so
//! hosts choose where failures go and tests can capture them.

use std::error::Error;
use std::mem;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Receives one error per escalated condition. Fire-and-forget.
pub trait DiagnosticsReporter: Send + Sync {
    fn report(&self, error: &(dyn Error + 'static));
}

/// Reports through `tracing` at error level, cause chain attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl DiagnosticsReporter for TracingReporter {
    fn report(&self, error: &(dyn Error + 'static)) {
        let reported = ReportedError::from_error(error);
        tracing::error!(causes = ?reported.causes, "{}", reported.message);
    }
}

/// A flattened error: top-level message plus each `source()` in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportedError {
    pub message: String,
    pub causes: Vec<String>,
}

impl ReportedError {
    #[must_use]
    pub fn from_error(error: &(dyn Error + 'static)) -> Self {
        let mut causes = Vec::new();
        let mut current = error.source();
        while let Some(cause) = current {
            causes.push(cause.to_string());
            current = cause.source();
        }
        Self {
            message: error.to_string(),
            causes,
        }
    }
}

/// Keeps every report in memory.
#[derive(Debug, Default)]
pub struct CapturingReporter {
    reports: Mutex<Vec<ReportedError>>,
}

impl CapturingReporter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn reports(&self) -> Vec<ReportedError> {
        self.lock().clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drain captured reports.
    pub fn take(&self) -> Vec<ReportedError> {
        mem::take(&mut *self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, Vec<ReportedError>> {
        // A poisoned capture buffer still holds valid reports.
        self.reports.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DiagnosticsReporter for CapturingReporter {
    fn report(&self, error: &(dyn Error + 'static)) {
        self.lock().push(ReportedError::from_error(error));
    }
}
