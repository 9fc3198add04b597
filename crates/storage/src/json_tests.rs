// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde::Deserialize;
use yare::parameterized;

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Record {
    name: String,
    count: u32,
}

fn record() -> Record {
    Record {
        name: "alpha".to_string(),
        count: 3,
    }
}

#[test]
fn save_then_load() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonStore::open(dir.path()).unwrap();

    store.save("things", "one", &record()).unwrap();

    assert!(store.path_for("things", "one").exists());
    assert_eq!(store.load::<Record>("things", "one").unwrap(), record());
}

#[test]
fn missing_record_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonStore::open(dir.path()).unwrap();

    assert!(matches!(
        store.load::<Record>("things", "nope"),
        Err(StorageError::NotFound { .. })
    ));
}

#[test]
fn save_leaves_no_temp_file() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonStore::open(dir.path()).unwrap();

    store.save("things", "one", &record()).unwrap();
    store.save("things", "one", &record()).unwrap();

    let names: Vec<String> = fs::read_dir(dir.path().join("things"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    assert_eq!(names, vec!["one.json".to_string()]);
}

#[test]
fn corrupt_file_is_json_error() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonStore::open(dir.path()).unwrap();
    fs::create_dir_all(dir.path().join("things")).unwrap();
    fs::write(store.path_for("things", "bad"), "{not json").unwrap();

    assert!(matches!(
        store.load::<Record>("things", "bad"),
        Err(StorageError::Json(_))
    ));
}

#[parameterized(
    plain = { "acct-1", "acct-1" },
    email = { "ops@example.com", "ops_example_com" },
    traversal = { "../etc", "___etc" },
    blank = { "  ", "_" },
)]
fn sanitizes_keys(input: &str, expected: &str) {
    assert_eq!(sanitize_key(input), expected);
}
