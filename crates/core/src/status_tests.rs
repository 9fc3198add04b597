// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::subscription::LedgerSnapshot;
use chrono::TimeZone;
use yare::parameterized;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn at(h: u32, m: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 2, h, m, 0).unwrap()
}

fn verdict(outcome: AccountOutcome) -> AccountVerdict {
    AccountVerdict {
        outcome,
        message: "done".to_string(),
        before: Some(LedgerSnapshot {
            credits: 5.0,
            reset_times: 3,
        }),
        after: Some(LedgerSnapshot {
            credits: 20.0,
            reset_times: 2,
        }),
    }
}

#[test]
fn rollover_clears_day_scoped_fields() {
    let mut status = ExecutionStatus::fresh(date(2024, 1, 1));
    status.first_reset_today = true;
    status.second_reset_today = true;
    status.consecutive_failures = 4;
    status.credits_after_reset = Some(20.0);

    assert!(status.roll_over(date(2024, 1, 2)));

    assert_eq!(status.today_date, date(2024, 1, 2));
    assert!(!status.first_reset_today);
    assert!(!status.second_reset_today);
    assert_eq!(status.credits_after_reset, None);
    assert_eq!(status.consecutive_failures, 4);
}

#[test]
fn same_day_load_keeps_flags() {
    let mut status = ExecutionStatus::fresh(date(2024, 1, 2));
    status.first_reset_today = true;

    assert!(!status.roll_over(date(2024, 1, 2)));
    assert!(status.first_reset_today);
}

#[test]
fn rollover_from_persisted_json() {
    let json = r#"{"today_date":"2024-01-01","first_reset_today":true,"second_reset_today":true,"consecutive_failures":2}"#;
    let mut status: ExecutionStatus = serde_json::from_str(json).unwrap();

    status.roll_over(date(2024, 1, 2));

    assert!(!status.has_run(Trigger::First));
    assert!(!status.has_run(Trigger::Second));
    assert_eq!(status.consecutive_failures, 2);
}

#[parameterized(
    success = { AccountOutcome::Succeeded, true, 0 },
    failure = { AccountOutcome::Failed, false, 3 },
)]
fn record_updates_outcome_bookkeeping(outcome: AccountOutcome, success: bool, failures: u32) {
    let mut status = ExecutionStatus::fresh(date(2024, 1, 2));
    status.consecutive_failures = 2;

    status.record(Trigger::Second, &verdict(outcome), at(23, 55));

    assert!(status.has_run(Trigger::Second));
    assert!(!status.has_run(Trigger::First));
    assert_eq!(status.last_run_time(Trigger::Second), Some(at(23, 55)));
    assert_eq!(status.last_reset_success, success);
    assert_eq!(status.consecutive_failures, failures);
    assert_eq!(status.reset_times_before_reset, Some(3));
    assert_eq!(status.credits_after_reset, Some(20.0));
}

#[test]
fn skip_marks_ran_but_leaves_counters() {
    let mut status = ExecutionStatus::fresh(date(2024, 1, 2));
    status.last_reset_success = true;
    status.consecutive_failures = 1;

    status.record(Trigger::First, &AccountVerdict::skipped("balance healthy"), at(18, 50));

    assert!(status.has_run(Trigger::First));
    assert!(status.last_reset_success);
    assert_eq!(status.consecutive_failures, 1);
    assert_eq!(status.last_reset_message, "skipped: balance healthy");
}

#[test]
fn second_gap_blocks_until_elapsed() {
    let mut status = ExecutionStatus::fresh(date(2024, 1, 2));
    status.record(Trigger::First, &verdict(AccountOutcome::Succeeded), at(18, 50));
    let gap = Duration::hours(5);

    assert_eq!(status.second_gap_remaining(at(20, 50), gap), Some(Duration::hours(3)));
    assert_eq!(status.second_gap_remaining(at(23, 50), gap), None);
}

#[test]
fn second_gap_ignores_first_from_previous_day() {
    let mut status = ExecutionStatus::fresh(date(2024, 1, 1));
    status.record(Trigger::First, &verdict(AccountOutcome::Succeeded), at(1, 0));
    status.roll_over(date(2024, 1, 2));

    assert_eq!(status.second_gap_remaining(at(2, 0), Duration::hours(5)), None);
}
