// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::{TimeZone, Utc};

fn exchange(body: &str) -> DebugExchange {
    DebugExchange {
        method: "post".to_string(),
        endpoint: "api/reset-credits/42".to_string(),
        status: 200,
        body: body.to_string(),
        timestamp: Utc.with_ymd_and_hms(2024, 1, 2, 15, 55, 1).unwrap(),
    }
}

fn saved_files(data_dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(data_dir.join("responses"))
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    files.sort();
    files
}

fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap()
}

#[test]
fn file_name_encodes_method_endpoint_time_and_sequence() {
    let dir = tempfile::tempdir().unwrap();
    let log = ResponseLog::new(dir.path());

    let path = log.path_for(&exchange("{}"), 7);

    assert_eq!(
        path.file_name().unwrap().to_string_lossy(),
        format!(
            "POST_api_reset-credits_42_20240102_155501.000_{}-7.json",
            std::process::id()
        )
    );
}

#[test]
fn json_body_is_embedded() {
    let dir = tempfile::tempdir().unwrap();
    let log = ResponseLog::new(dir.path());

    log.save_debug_response(&exchange(r#"{"success":true}"#));

    let files = saved_files(dir.path());
    assert_eq!(files.len(), 1);
    let saved = read_json(&files[0]);
    assert_eq!(saved["status"], 200);
    assert_eq!(saved["body"]["success"], true);
}

#[test]
fn non_json_body_is_kept_as_text() {
    let dir = tempfile::tempdir().unwrap();
    let log = ResponseLog::new(dir.path());

    log.save_debug_response(&exchange("OK"));

    let files = saved_files(dir.path());
    assert_eq!(read_json(&files[0])["body"], "OK");
}

#[test]
fn same_millisecond_dumps_never_collide() {
    let dir = tempfile::tempdir().unwrap();
    let log = ResponseLog::new(dir.path());
    let threads: Vec<_> = (0..8)
        .map(|i| {
            let log = log.clone();
            std::thread::spawn(move || log.save_debug_response(&exchange(&format!("{{\"n\":{}}}", i))))
        })
        .collect();
    for t in threads {
        t.join().unwrap();
    }

    let files = saved_files(dir.path());
    assert_eq!(files.len(), 8);
    let mut bodies: Vec<i64> = files
        .iter()
        .map(|f| read_json(f)["body"]["n"].as_i64().unwrap())
        .collect();
    bodies.sort();
    assert_eq!(bodies, (0..8).collect::<Vec<i64>>());
}

#[test]
fn unwritable_directory_does_not_panic() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("responses");
    std::fs::write(&blocker, "not a directory").unwrap();

    ResponseLog::new(dir.path()).save_debug_response(&exchange("{}"));
}
