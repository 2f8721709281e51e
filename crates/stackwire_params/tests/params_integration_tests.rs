//! Integration tests for the parameter store.

use std::fs;

use stackwire_params::{ParamError, ParameterEntry, ParameterStore};
use tempfile::tempdir;

fn sample_store() -> ParameterStore {
    vec![
        ParameterEntry::new("AppName", "shows"),
        ParameterEntry::new("Environment", "dev"),
        ParameterEntry::new("LambdaBucket", "shows-artifacts"),
        ParameterEntry::new("LambdaFolder", "functions"),
    ]
    .into_iter()
    .collect()
}

#[test]
fn test_persist_then_load_round_trips() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("parameters.json");

    let store = sample_store();
    store.persist(&path).unwrap();

    let loaded = ParameterStore::load(&path).unwrap();
    assert_eq!(loaded, store);
}

#[test]
fn test_persisted_file_shape() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("parameters.json");

    let mut store = ParameterStore::new();
    store.upsert("AppName", "shows");
    store.persist(&path).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(
        content,
        "[\n  {\n    \"ParameterKey\": \"AppName\",\n    \"ParameterValue\": \"shows\"\n  }\n]"
    );
}

#[test]
fn test_upsert_write_back_keeps_other_entries() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("parameters.json");
    sample_store().persist(&path).unwrap();

    let mut store = ParameterStore::load(&path).unwrap();
    assert!(store.upsert("CurrentGitHash", "9c1e2f0"));
    store.persist(&path).unwrap();

    let reloaded = ParameterStore::load(&path).unwrap();
    assert_eq!(reloaded.len(), 5);
    assert_eq!(reloaded.get("CurrentGitHash").unwrap(), "9c1e2f0");
    assert_eq!(reloaded.get("LambdaBucket").unwrap(), "shows-artifacts");

    // Same value again leaves the file untouched.
    let before = fs::read_to_string(&path).unwrap();
    let mut again = ParameterStore::load(&path).unwrap();
    assert!(!again.upsert("CurrentGitHash", "9c1e2f0"));
    again.persist(&path).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), before);
}

#[test]
fn test_load_unreadable_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("missing.json");
    let err = ParameterStore::load(&path).unwrap_err();

    match err {
        ParamError::Config { path: reported, message } => {
            assert_eq!(reported, path);
            assert!(message.contains("cannot read"));
        }
        other => panic!("expected config error, got {:?}", other),
    }
}

#[test]
fn test_load_malformed_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("parameters.json");
    fs::write(&path, r#"{"AppName": "shows"}"#).unwrap();

    let err = ParameterStore::load(&path).unwrap_err();
    assert!(matches!(err, ParamError::Config { .. }));
}
