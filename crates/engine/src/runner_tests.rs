// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::TimeZone;
use refill_adapters::{BillingCall, FakeBillingApi, FakeConnector, ListStep};
use refill_core::{FakeClock, LockConfig, Outcome, SequentialIdGen, SubscriptionPlan};
use std::time::Duration;
use tempfile::TempDir;

struct Harness {
    dir: TempDir,
    api: FakeBillingApi,
    clock: FakeClock,
    store: StatusStore,
    account: Account,
    runner: AccountRunner<FakeConnector, FakeClock, SequentialIdGen>,
}

fn subscription(id: u64, plan_type: &str, credits: f64, reset_times: u32) -> Subscription {
    Subscription {
        id,
        name: format!("Plan {}", id),
        current_credits: credits,
        reset_times,
        plan: SubscriptionPlan {
            plan_type: plan_type.to_string(),
            credit_limit: 20.0,
            ..SubscriptionPlan::default()
        },
        ..Subscription::default()
    }
}

/// 2024-01-02 15:55 UTC is 23:55 in Shanghai
fn second_trigger_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 2, 15, 55, 0).unwrap()
}

fn harness(ledger: Vec<Subscription>) -> Harness {
    let config = EngineConfig {
        settle_delay: Duration::ZERO,
        ..EngineConfig::default()
    };
    harness_with(ledger, config)
}

fn harness_with(ledger: Vec<Subscription>, config: EngineConfig) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let clock = FakeClock::at(second_trigger_time());
    let connector = FakeConnector::new();
    let api = FakeBillingApi::new(ledger);
    connector.register("acct-1", api.clone());
    let store = StatusStore::open(dir.path()).unwrap();
    let locks = FileRunLock::new(
        dir.path(),
        LockConfig::default(),
        clock.clone(),
        SequentialIdGen::default(),
    );
    let runner = AccountRunner::new(
        RunnerDeps {
            connector,
            store: store.clone(),
            locks,
            clock: clock.clone(),
        },
        config,
    )
    .unwrap();

    Harness {
        dir,
        api,
        clock,
        store,
        account: Account::new("acct-1", "sk-test-key-123456"),
        runner,
    }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
}

#[tokio::test]
async fn second_trigger_resets_and_records() {
    let h = harness(vec![subscription(1, "MONTHLY", 5.0, 3)]);

    let report = h.runner.run(&h.account, Trigger::Second).await;

    let AccountRun::Completed { verdict, results } = &report.run else {
        panic!("expected completed run, got {:?}", report.run);
    };
    assert_eq!(verdict.outcome, AccountOutcome::Succeeded);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].outcome(), &Outcome::Success);

    let status = h.store.load("acct-1", today()).unwrap();
    assert!(status.second_reset_today);
    assert!(status.last_reset_success);
    assert_eq!(status.consecutive_failures, 0);
    assert_eq!(status.reset_times_before_reset, Some(3));
    assert_eq!(status.reset_times_after_reset, Some(2));
    assert_eq!(status.credits_after_reset, Some(20.0));
}

#[tokio::test]
async fn already_ran_today_does_nothing() {
    let h = harness(vec![subscription(1, "MONTHLY", 5.0, 3)]);
    let mut status = ExecutionStatus::fresh(today());
    status.second_reset_today = true;
    h.store.save("acct-1", &status).unwrap();

    let report = h.runner.run(&h.account, Trigger::Second).await;

    assert_eq!(report.run, AccountRun::AlreadyRan);
    assert!(h.api.calls().is_empty());
}

#[tokio::test]
async fn yesterdays_flags_do_not_block() {
    let h = harness(vec![subscription(1, "MONTHLY", 5.0, 3)]);
    let mut status = ExecutionStatus::fresh(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    status.second_reset_today = true;
    h.store.save("acct-1", &status).unwrap();

    let report = h.runner.run(&h.account, Trigger::Second).await;

    assert!(matches!(report.run, AccountRun::Completed { .. }));
    assert_eq!(h.api.reset_calls(), 1);
}

#[tokio::test]
async fn busy_lock_is_a_soft_skip() {
    let h = harness(vec![subscription(1, "MONTHLY", 5.0, 3)]);
    let other = FileRunLock::new(
        h.dir.path(),
        LockConfig::default(),
        h.clock.clone(),
        SequentialIdGen::new("other"),
    );
    let _held = other.try_acquire("acct-1", "second_reset").unwrap().unwrap();

    let report = h.runner.run(&h.account, Trigger::Second).await;

    assert_eq!(report.run, AccountRun::LockBusy);
    assert!(h.api.calls().is_empty());
    assert!(!h.store.load("acct-1", today()).unwrap().second_reset_today);
}

#[tokio::test]
async fn lock_is_released_after_run() {
    let h = harness(vec![subscription(1, "MONTHLY", 5.0, 3)]);
    h.runner.run(&h.account, Trigger::Second).await;

    let other = FileRunLock::new(
        h.dir.path(),
        LockConfig::default(),
        h.clock.clone(),
        SequentialIdGen::new("other"),
    );
    assert!(other.try_acquire("acct-1", "second_reset").unwrap().is_some());
}

#[tokio::test]
async fn second_waits_for_minimum_gap() {
    let h = harness(vec![subscription(1, "MONTHLY", 5.0, 3)]);
    let mut status = ExecutionStatus::fresh(today());
    status.first_reset_today = true;
    status.last_first_reset_time = Some(second_trigger_time() - chrono::Duration::hours(2));
    h.store.save("acct-1", &status).unwrap();

    let report = h.runner.run(&h.account, Trigger::Second).await;

    assert_eq!(
        report.run,
        AccountRun::GapNotElapsed {
            remaining: chrono::Duration::hours(3)
        }
    );
    assert!(h.api.calls().is_empty());
    assert!(!h.store.load("acct-1", today()).unwrap().second_reset_today);
}

#[tokio::test]
async fn list_failure_counts_as_failure() {
    let h = harness(vec![subscription(1, "MONTHLY", 5.0, 3)]);
    h.api.script_lists([ListStep::Fail(refill_adapters::BillingError::Transport(
        "connection refused".into(),
    ))]);

    let report = h.runner.run(&h.account, Trigger::Second).await;

    let AccountRun::Completed { verdict, .. } = &report.run else {
        panic!("expected completed run, got {:?}", report.run);
    };
    assert_eq!(verdict.outcome, AccountOutcome::Failed);
    let status = h.store.load("acct-1", today()).unwrap();
    assert!(status.second_reset_today);
    assert!(!status.last_reset_success);
    assert_eq!(status.consecutive_failures, 1);
}

#[tokio::test]
async fn skip_leaves_success_bookkeeping() {
    let h = harness(vec![subscription(1, "MONTHLY", 5.0, 0)]);
    let mut status = ExecutionStatus::fresh(today());
    status.last_reset_success = true;
    status.consecutive_failures = 2;
    h.store.save("acct-1", &status).unwrap();

    h.runner.run(&h.account, Trigger::Second).await;

    let status = h.store.load("acct-1", today()).unwrap();
    assert!(status.second_reset_today);
    assert!(status.last_reset_success);
    assert_eq!(status.consecutive_failures, 2);
    assert!(status.last_reset_message.starts_with("skipped: insufficient reset count"));
}

#[tokio::test]
async fn pay_per_use_never_reaches_executor() {
    let h = harness(vec![
        subscription(1, "PAY_PER_USE", 1.0, 5),
        subscription(2, "MONTHLY", 5.0, 3),
    ]);

    h.runner.run(&h.account, Trigger::Second).await;

    assert_eq!(
        h.api
            .calls()
            .into_iter()
            .filter(|c| matches!(c, BillingCall::Reset { .. }))
            .collect::<Vec<_>>(),
        vec![BillingCall::Reset { id: 2 }]
    );
}

#[tokio::test]
async fn unreadable_status_is_reported() {
    let h = harness(vec![subscription(1, "MONTHLY", 5.0, 3)]);
    let path = h.store.status_path("acct-1");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "not json").unwrap();

    let report = h.runner.run(&h.account, Trigger::Second).await;

    assert!(matches!(report.run, AccountRun::Unavailable { .. }));
    assert!(h.api.calls().is_empty());
}

#[tokio::test]
async fn status_save_failure_still_reports_results() {
    let h = harness(vec![subscription(1, "MONTHLY", 5.0, 3)]);
    // A directory where the temp file goes makes every status write fail
    let mut tmp = h.store.status_path("acct-1").into_os_string();
    tmp.push(".tmp");
    std::fs::create_dir_all(&tmp).unwrap();

    let report = h.runner.run(&h.account, Trigger::Second).await;

    let AccountRun::Completed { verdict, results } = &report.run else {
        panic!("expected completed run, got {:?}", report.run);
    };
    assert_eq!(verdict.outcome, AccountOutcome::Succeeded);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].outcome(), &Outcome::Success);
    assert_eq!(h.api.reset_calls(), 1);
    assert!(!h.store.status_path("acct-1").exists());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn runs_on_multi_thread_runtime() {
    let h = harness(vec![subscription(1, "MONTHLY", 5.0, 3)]);

    let report = h.runner.run(&h.account, Trigger::Second).await;

    assert!(matches!(report.run, AccountRun::Completed { .. }));
    assert!(h.store.load("acct-1", today()).unwrap().second_reset_today);
    let again = h.runner.run(&h.account, Trigger::Second).await;
    assert!(matches!(again.run, AccountRun::AlreadyRan));
}

#[tokio::test]
async fn first_trigger_applies_ceiling() {
    let mut config = EngineConfig {
        settle_delay: Duration::ZERO,
        ..EngineConfig::default()
    };
    config.first.enabled = true;
    let h = harness_with(vec![subscription(1, "MONTHLY", 19.0, 3)], config);

    let report = h.runner.run(&h.account, Trigger::First).await;

    let AccountRun::Completed { verdict, .. } = &report.run else {
        panic!("expected completed run, got {:?}", report.run);
    };
    assert_eq!(verdict.outcome, AccountOutcome::Skipped);
    assert_eq!(h.api.reset_calls(), 0);
    assert!(h.store.load("acct-1", today()).unwrap().first_reset_today);
}

#[test]
fn today_follows_configured_zone() {
    let h = harness(vec![]);
    // 17:00 UTC on Jan 1 is already Jan 2 in Shanghai
    let now = Utc.with_ymd_and_hms(2024, 1, 1, 17, 0, 0).unwrap();
    assert_eq!(h.runner.today(now), today());
}

#[tokio::test]
async fn refresh_saves_snapshot_and_buffers_status() {
    let h = harness(vec![
        subscription(1, "MONTHLY", 5.0, 1),
        subscription(2, "PAYGO", 1.0, 0),
    ]);

    let listed = h.runner.refresh(&h.account).await.unwrap();

    assert_eq!(listed.len(), 2);
    assert_eq!(h.runner.aggregator().pending(), 1);
    let snapshot = h.store.load_snapshot("acct-1").unwrap();
    assert_eq!(snapshot.subscriptions.len(), 2);
    assert_eq!(snapshot.last_updated, second_trigger_time());
}

#[tokio::test]
async fn preview_reports_preflight_verdicts() {
    let h = harness(vec![
        subscription(1, "MONTHLY", 5.0, 3),
        subscription(2, "MONTHLY", 5.0, 1),
        subscription(3, "PAY_PER_USE", 5.0, 3),
    ]);

    let previews = h.runner.preview(&h.account, Trigger::First).await.unwrap();

    assert_eq!(previews.len(), 3);
    assert!(previews[0].eligible && previews[0].skip.is_none());
    assert!(matches!(
        previews[1].skip,
        Some(SkipReason::InsufficientResets { .. })
    ));
    assert!(!previews[2].eligible);
    assert_eq!(h.api.reset_calls(), 0);
}
