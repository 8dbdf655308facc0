//! End-to-end scenarios for the built-in transaction history migration.

use serde_json::json;
use vellum_core::steps::builtin_registry;
use vellum_core::{MigrationRunner, RunOutcome};

use crate::common::{OLD_VERSION, VERSION, data_json, run_builtin, target, versioned};

#[test]
fn prunes_deprecated_fields_from_every_record() {
    let state = versioned(
        OLD_VERSION,
        json!({
            "TransactionController": {
                "transactions": [
                    { "id": 1, "history": [{ "x": 1 }], "sendFlowHistory": [{ "y": 2 }] },
                    { "id": 2 }
                ]
            }
        }),
    );

    let (report, reports) = run_builtin(&state);

    assert_eq!(report.state.version(), target());
    assert_eq!(
        report.state.data["TransactionController"]["transactions"],
        json!([{ "id": 1 }, { "id": 2 }])
    );
    assert_eq!(report.outcome, RunOutcome::Completed);
    assert!(reports.is_empty());
}

#[test]
fn absent_list_is_a_soft_skip() {
    let state = versioned(OLD_VERSION, json!({ "TransactionController": {} }));

    let (report, reports) = run_builtin(&state);

    assert_eq!(report.state.version(), target());
    assert_eq!(data_json(&report.state), data_json(&state));
    assert_eq!(report.skipped.len(), 1);
    assert!(reports.is_empty());
}

#[test]
fn controller_of_wrong_type_escalates_and_keeps_data() {
    let state = versioned(
        OLD_VERSION,
        json!({ "TransactionController": [null, 123, "bad"] }),
    );

    let (report, reports) = run_builtin(&state);

    assert_eq!(report.state.version(), target());
    assert_eq!(data_json(&report.state), data_json(&state));
    assert_eq!(reports.len(), 1);
    insta::assert_snapshot!(
        reports[0].message.as_str(),
        @"Migration #185 failed: typeof state.TransactionController is array, expected object"
    );
}

#[test]
fn malformed_list_entries_survive() {
    let state = versioned(
        OLD_VERSION,
        json!({ "TransactionController": { "transactions": [null, 123, "bad"] } }),
    );

    let (report, reports) = run_builtin(&state);

    assert_eq!(
        report.state.data["TransactionController"]["transactions"],
        json!([null, 123, "bad"])
    );
    assert!(reports.is_empty());
}

#[test]
fn missing_controller_escalates() {
    let state = versioned(OLD_VERSION, json!({ "PreferencesController": {} }));

    let (report, reports) = run_builtin(&state);

    assert!(report.is_rolled_back());
    assert_eq!(data_json(&report.state), data_json(&state));
    assert_eq!(
        reports[0].causes,
        ["state.TransactionController is not defined"]
    );
}

#[test]
fn unrelated_controllers_are_untouched() {
    let state = versioned(
        OLD_VERSION,
        json!({
            "NetworkController": { "selectedNetworkClientId": "mainnet" },
            "TransactionController": { "transactions": [{ "id": 1, "history": [] }] },
            "AccountsController": { "internalAccounts": { "accounts": {} } }
        }),
    );

    let (report, _) = run_builtin(&state);

    for key in ["NetworkController", "AccountsController"] {
        assert_eq!(report.state.data[key], state.data[key]);
    }
    let keys: Vec<&str> = report.state.data.keys().map(String::as_str).collect();
    assert_eq!(
        keys,
        ["NetworkController", "TransactionController", "AccountsController"]
    );
}

#[test]
fn already_migrated_state_is_left_alone() {
    let state = versioned(
        VERSION,
        json!({ "TransactionController": { "transactions": [{ "id": 1, "history": [] }] } }),
    );

    let (report, reports) = run_builtin(&state);

    assert_eq!(report.outcome, RunOutcome::UpToDate);
    assert_eq!(report.state, state);
    assert!(reports.is_empty());
}

#[test]
fn dry_run_plan_names_the_step() {
    let registry = builtin_registry().unwrap();
    let plan = MigrationRunner::new(&registry).plan(&versioned(OLD_VERSION, json!({})));

    insta::assert_snapshot!(
        plan.to_string(),
        @r"
    #184 -> #185
      #185 Remove history and sendFlowHistory from transactions
    "
    );
}
