//! Migration steps shipped with this build.
//!
//! Append new steps to [`builtin_steps`] with a version strictly above the
//! last one. Registration order is checked when the registry is built.

mod prune_fields;

pub use prune_fields::{PruneRecordFields, TRANSACTION_HISTORY};

use crate::error::RegistrationError;
use crate::registry::MigrationRegistry;
use crate::step::MigrationStep;

fn builtin_steps() -> Vec<Box<dyn MigrationStep>> {
    vec![Box::new(TRANSACTION_HISTORY)]
}

/// Registry of every shipped step. An error here is a build defect; hosts
/// should refuse to start.
pub fn builtin_registry() -> Result<MigrationRegistry, RegistrationError> {
    MigrationRegistry::from_steps(builtin_steps())
}
