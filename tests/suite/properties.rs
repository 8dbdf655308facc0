//! Properties that hold for arbitrary blobs.

use proptest::prelude::*;
use serde_json::{Map, Value};
use vellum_core::steps::{TRANSACTION_HISTORY, builtin_registry};
use vellum_core::{MigrationRunner, RunOutcome};

use crate::common::{OLD_VERSION, data_json, run_builtin, target, versioned};

fn leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        "[a-z0-9]{0,8}".prop_map(Value::from),
    ]
}

fn any_json() -> impl Strategy<Value = Value> {
    leaf().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[A-Za-z]{1,6}", inner, 0..4)
                .prop_map(|map| Value::Object(map.into_iter().collect())),
        ]
    })
}

/// A transaction-like record, sometimes carrying the deprecated fields.
fn record() -> impl Strategy<Value = Value> {
    let key = prop::sample::select(vec![
        "id",
        "chainId",
        "status",
        "history",
        "sendFlowHistory",
    ]);
    prop::collection::btree_map(key, any_json(), 0..5).prop_map(|fields| {
        Value::Object(
            fields
                .into_iter()
                .map(|(key, value)| (key.to_string(), value))
                .collect(),
        )
    })
}

fn list_entry() -> impl Strategy<Value = Value> {
    prop_oneof![3 => record(), 1 => leaf()]
}

fn not_an_object() -> impl Strategy<Value = Value> {
    any_json().prop_filter("must not be an object", |value| !value.is_object())
}

fn not_an_array() -> impl Strategy<Value = Value> {
    any_json().prop_filter("must not be an array", |value| !value.is_array())
}

fn data_with(controller: Value) -> Value {
    let mut data = Map::new();
    data.insert("TransactionController".into(), controller);
    Value::Object(data)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn version_always_reaches_target(data in prop::collection::btree_map("[A-Za-z]{1,8}", any_json(), 0..6)) {
        let data = Value::Object(data.into_iter().collect());
        let (report, _) = run_builtin(&versioned(OLD_VERSION, data));
        prop_assert_eq!(report.state.version(), target());
    }

    #[test]
    fn controller_of_wrong_type_never_corrupts(controller in not_an_object()) {
        let state = versioned(OLD_VERSION, data_with(controller));
        let (report, reports) = run_builtin(&state);

        prop_assert!(report.is_rolled_back());
        prop_assert_eq!(data_json(&report.state), data_json(&state));
        prop_assert_eq!(reports.len(), 1);
    }

    #[test]
    fn list_of_wrong_type_never_corrupts(list in not_an_array()) {
        let mut controller = Map::new();
        controller.insert("transactions".into(), list);
        let state = versioned(OLD_VERSION, data_with(Value::Object(controller)));
        let (report, reports) = run_builtin(&state);

        prop_assert_eq!(data_json(&report.state), data_json(&state));
        prop_assert_eq!(reports.len(), 1);
    }

    #[test]
    fn absent_list_is_transparent(controller in prop::collection::btree_map("[a-z]{1,6}", any_json(), 0..4)) {
        let controller: Map<String, Value> = controller
            .into_iter()
            .filter(|(key, _)| key != "transactions")
            .collect();
        let state = versioned(OLD_VERSION, data_with(Value::Object(controller)));
        let (report, reports) = run_builtin(&state);

        prop_assert_eq!(&report.outcome, &RunOutcome::Completed);
        prop_assert_eq!(data_json(&report.state), data_json(&state));
        prop_assert!(reports.is_empty());
    }

    #[test]
    fn pruning_preserves_order_and_entries(list in prop::collection::vec(list_entry(), 0..12)) {
        let mut controller = Map::new();
        controller.insert("transactions".into(), Value::Array(list.clone()));
        let state = versioned(OLD_VERSION, data_with(Value::Object(controller)));
        let (report, reports) = run_builtin(&state);
        prop_assert!(reports.is_empty());

        let Some(Value::Array(out)) = report.state.data["TransactionController"].get("transactions") else {
            return Err(TestCaseError::fail("transactions must stay an array"));
        };
        prop_assert_eq!(out.len(), list.len());

        for (before, after) in list.iter().zip(out) {
            match before {
                Value::Object(fields) => {
                    let Value::Object(pruned) = after else {
                        return Err(TestCaseError::fail("record must stay a record"));
                    };
                    for (key, value) in fields {
                        if TRANSACTION_HISTORY.fields().contains(&key.as_str()) {
                            prop_assert!(!pruned.contains_key(key));
                        } else {
                            prop_assert_eq!(pruned.get(key), Some(value));
                        }
                    }
                    prop_assert!(pruned.keys().all(|key| fields.contains_key(key)));
                }
                other => prop_assert_eq!(after, other),
            }
        }
    }

    #[test]
    fn second_run_is_a_noop(list in prop::collection::vec(list_entry(), 0..8)) {
        let mut controller = Map::new();
        controller.insert("transactions".into(), Value::Array(list));
        let state = versioned(OLD_VERSION, data_with(Value::Object(controller)));

        let registry = builtin_registry().unwrap();
        let runner = MigrationRunner::new(&registry);
        let once = runner.migrate(&state);
        let twice = runner.run(&once);

        prop_assert_eq!(&twice.outcome, &RunOutcome::UpToDate);
        prop_assert_eq!(twice.state, once);
    }
}
