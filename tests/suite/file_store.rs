//! Blob store → runner → blob store, through a real file.

use std::fs;

use serde_json::json;
use vellum_core::MigrationRunner;
use vellum_core::steps::builtin_registry;
use vellum_store::{BlobStore, Durability, JsonFileStore};

use crate::common::{OLD_VERSION, data_json, target, versioned};

fn store(dir: &tempfile::TempDir) -> JsonFileStore {
    JsonFileStore::new(dir.path().join("state.json")).with_durability(Durability::Relaxed)
}

#[test]
fn migrated_blob_round_trips_through_disk() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = store(&dir);
    store
        .save(&versioned(
            OLD_VERSION,
            json!({
                "TransactionController": {
                    "transactions": [{ "id": 1, "history": [], "sendFlowHistory": [] }]
                }
            }),
        ))
        .unwrap();

    let registry = builtin_registry().unwrap();
    let loaded = store.load().unwrap().expect("blob saved above");
    store
        .save(&MigrationRunner::new(&registry).migrate(&loaded))
        .unwrap();

    let reloaded = store.load().unwrap().unwrap();
    assert_eq!(reloaded.version(), target());
    assert_eq!(
        reloaded.data["TransactionController"]["transactions"],
        json!([{ "id": 1 }])
    );
}

#[test]
fn failed_run_rewrites_identical_data_bytes() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("state.json");
    let raw = r#"{"meta":{"version":184,"build":"12.9.0"},"data":{"Zeta":{"b":1,"a":2},"TransactionController":"corrupt","Alpha":[3,2,1]}}"#;
    fs::write(&path, raw).unwrap();

    let store = JsonFileStore::new(&path).with_durability(Durability::Relaxed);
    let original = store.load().unwrap().unwrap();
    let registry = builtin_registry().unwrap();
    let migrated = MigrationRunner::new(&registry).migrate(&original);
    store.save(&migrated).unwrap();

    let reloaded = store.load().unwrap().unwrap();
    assert_eq!(reloaded.version(), target());
    assert_eq!(reloaded.meta.extra["build"], json!("12.9.0"));
    assert_eq!(
        data_json(&reloaded),
        r#"{"Zeta":{"b":1,"a":2},"TransactionController":"corrupt","Alpha":[3,2,1]}"#
    );
}
