// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::TimeZone;
use yare::parameterized;

fn record(start: DateTime<Utc>) -> RunLockRecord {
    RunLockRecord {
        holder_id: HolderId::new("holder-1"),
        start_time: start,
        operation: "second_reset".to_string(),
        host: "box".to_string(),
    }
}

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 2, 15, 55, 0).unwrap()
}

#[test]
fn free_lock_is_acquired() {
    let decision = LockDecision::decide(None, &LockConfig::default(), start());
    assert_eq!(decision, LockDecision::Acquire);
    assert!(decision.granted());
}

#[parameterized(
    fresh = { 0, false },
    nine_minutes = { 9 * 60, false },
    exactly_ten = { 10 * 60, false },
    eleven_minutes = { 11 * 60, true },
)]
fn staleness_window(age_secs: i64, reclaimable: bool) {
    let now = start() + chrono::Duration::seconds(age_secs);
    let decision = LockDecision::decide(Some(record(start())), &LockConfig::default(), now);

    assert_eq!(decision.granted(), reclaimable);
    if reclaimable {
        assert!(matches!(decision, LockDecision::Reclaim { previous } if previous == record(start())));
    } else {
        assert!(matches!(decision, LockDecision::Denied { .. }));
    }
}

#[test]
fn future_record_is_held() {
    let now = start() - chrono::Duration::minutes(30);
    let decision = LockDecision::decide(Some(record(start())), &LockConfig::default(), now);
    assert!(!decision.granted());
}

#[test]
fn custom_threshold_applies() {
    let config = LockConfig::default().with_stale_threshold(Duration::from_secs(30));
    let now = start() + chrono::Duration::seconds(31);
    assert!(LockDecision::decide(Some(record(start())), &config, now).granted());
}

#[test]
fn config_parses_humantime() {
    let config: LockConfig = serde_json::from_str(r#"{"stale_threshold":"10m"}"#).unwrap();
    assert_eq!(config, LockConfig::default());
}
