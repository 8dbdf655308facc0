//! Strip deprecated fields from the records of one controller's list.

use serde_json::Value;
use vellum_types::{SchemaVersion, StateData, StatePath};

use crate::error::StepError;
use crate::shape::{expect_array, expect_object, require, without_fields};
use crate::step::{MigrationStep, SkipReason, StepOutcome};

/// #185: transaction history is no longer persisted.
pub const TRANSACTION_HISTORY: PruneRecordFields = PruneRecordFields::new(
    185,
    "TransactionController",
    "transactions",
    &["history", "sendFlowHistory"],
    "Remove history and sendFlowHistory from transactions",
);

/// Removes `fields` from every record in `data[controller][collection]`.
///
/// Validation runs in a fixed order:
///
/// 1. `controller` missing: schema mismatch
/// 2. `controller` not an object: schema mismatch
/// 3. `collection` missing: soft-skip (fresh installs have no list yet)
/// 4. `collection` not an array: schema mismatch
///
/// Elements that are not objects are kept as they are. Order and length of
/// the list never change.
#[derive(Debug, Clone, Copy)]
pub struct PruneRecordFields {
    version: SchemaVersion,
    controller: &'static str,
    collection: &'static str,
    fields: &'static [&'static str],
    description: &'static str,
}

impl PruneRecordFields {
    #[must_use]
    pub const fn new(
        version: u32,
        controller: &'static str,
        collection: &'static str,
        fields: &'static [&'static str],
        description: &'static str,
    ) -> Self {
        Self {
            version: SchemaVersion::new(version),
            controller,
            collection,
            fields,
            description,
        }
    }

    #[must_use]
    pub fn fields(&self) -> &'static [&'static str] {
        self.fields
    }

    /// The pruned list, or `None` when the list is absent.
    fn pruned(&self, data: &StateData) -> Result<Option<Vec<Value>>, StepError> {
        let controller_path = StatePath::key(self.controller);
        let controller = require(data, self.controller, &controller_path)?;
        let controller = expect_object(controller, &controller_path)?;

        let collection_path = controller_path.child(self.collection);
        let Some(collection) = controller.get(self.collection) else {
            return Ok(None);
        };
        let items = expect_array(collection, &collection_path)?;

        let mut passed_through = 0usize;
        let pruned: Vec<Value> = items
            .iter()
            .map(|item| match item {
                Value::Object(record) => Value::Object(without_fields(record, self.fields)),
                other => {
                    passed_through += 1;
                    other.clone()
                }
            })
            .collect();
        if passed_through > 0 {
            tracing::debug!(
                version = %self.version,
                passed_through,
                "Kept malformed entries in {collection_path} unchanged"
            );
        }
        Ok(Some(pruned))
    }
}

impl MigrationStep for PruneRecordFields {
    fn version(&self) -> SchemaVersion {
        self.version
    }

    fn description(&self) -> &str {
        self.description
    }

    fn transform(&self, mut data: StateData) -> Result<StepOutcome, StepError> {
        let Some(pruned) = self.pruned(&data)? else {
            let path = StatePath::key(self.controller).child(self.collection);
            return Ok(StepOutcome::Skipped {
                data,
                reason: SkipReason::FieldAbsent { path },
            });
        };

        if let Some(Value::Object(controller)) = data.get_mut(self.controller) {
            controller.insert(self.collection.to_string(), Value::Array(pruned));
        }
        Ok(StepOutcome::Applied(data))
    }
}
