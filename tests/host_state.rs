//! Integration tests for host state registration across runs.
//!
//! The host state file outlives any single invocation, so these tests
//! exercise `register_batch` the way repeated real runs would hit it:
//! separate calls against the same file, with pre-existing content.

use std::fs;
use std::path::PathBuf;

use serde_json::Value;

use vault_setup::host::{register_batch, vault_id};

fn read_state(path: &PathBuf) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn test_ids_stable_across_separate_runs() {
    let temp = tempfile::TempDir::new().unwrap();
    let state_path = temp.path().join("obsidian.json");
    let vault = temp.path().join("team-notes");
    fs::create_dir_all(&vault).unwrap();

    let first = register_batch(&state_path, &[vault.clone()]).unwrap();
    let second = register_batch(&state_path, &[vault.clone()]).unwrap();

    assert_eq!(first, second);
    assert_eq!(first[0], vault_id(&vault));
    assert_eq!(
        read_state(&state_path)["vaults"].as_object().unwrap().len(),
        1
    );
}

#[test]
fn test_repeated_runs_only_touch_timestamps() {
    let temp = tempfile::TempDir::new().unwrap();
    let state_path = temp.path().join("obsidian.json");
    let vault_a = temp.path().join("a");
    let vault_b = temp.path().join("b");
    fs::create_dir_all(&vault_a).unwrap();
    fs::create_dir_all(&vault_b).unwrap();

    register_batch(&state_path, &[vault_a.clone(), vault_b.clone()]).unwrap();
    let mut first = read_state(&state_path);

    register_batch(&state_path, &[vault_a, vault_b]).unwrap();
    let mut second = read_state(&state_path);

    // Strip the volatile timestamps, then the documents must be identical
    // (same ids, same order, same flags).
    for state in [&mut first, &mut second] {
        for entry in state["vaults"].as_object_mut().unwrap().values_mut() {
            entry.as_object_mut().unwrap().remove("ts");
        }
    }
    assert_eq!(first, second);
}

#[test]
fn test_existing_entries_keep_their_position() {
    let temp = tempfile::TempDir::new().unwrap();
    let state_path = temp.path().join("obsidian.json");
    fs::write(
        &state_path,
        r#"{"vaults":{"1111111111111111":{"path":"/one","ts":1,"open":false},"2222222222222222":{"path":"/two","ts":2,"open":false}}}"#,
    )
    .unwrap();

    let vault = temp.path().join("new");
    fs::create_dir_all(&vault).unwrap();
    register_batch(&state_path, &[vault]).unwrap();

    let content = fs::read_to_string(&state_path).unwrap();
    let one = content.find("1111111111111111").unwrap();
    let two = content.find("2222222222222222").unwrap();
    assert!(one < two, "pre-existing entries were reordered");

    let state = read_state(&state_path);
    assert_eq!(state["vaults"].as_object().unwrap().len(), 3);
    assert_eq!(state["vaults"]["1111111111111111"]["path"], "/one");
}

#[test]
fn test_batch_reads_and_writes_state_once() {
    // Two paths registered in one batch share a single read-modify-write:
    // a pre-existing malformed file is replaced by one valid document
    // containing both entries.
    let temp = tempfile::TempDir::new().unwrap();
    let state_path = temp.path().join("obsidian.json");
    fs::write(&state_path, "not json at all").unwrap();

    let vault_a = temp.path().join("a");
    let vault_b = temp.path().join("b");
    fs::create_dir_all(&vault_a).unwrap();
    fs::create_dir_all(&vault_b).unwrap();

    let ids = register_batch(&state_path, &[vault_a, vault_b]).unwrap();

    assert_eq!(ids.len(), 2);
    assert_ne!(ids[0], ids[1]);
    assert_eq!(
        read_state(&state_path)["vaults"].as_object().unwrap().len(),
        2
    );
}
