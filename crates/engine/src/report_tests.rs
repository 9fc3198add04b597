// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

fn completed(outcome: AccountOutcome) -> AccountRun {
    AccountRun::Completed {
        verdict: AccountVerdict {
            outcome,
            message: "m".to_string(),
            before: None,
            after: None,
        },
        results: Vec::new(),
    }
}

#[parameterized(
    succeeded = { completed(AccountOutcome::Succeeded), Tally::Succeeded },
    failed = { completed(AccountOutcome::Failed), Tally::Failed },
    skipped = { completed(AccountOutcome::Skipped), Tally::Skipped },
    already_ran = { AccountRun::AlreadyRan, Tally::Succeeded },
    lock_busy = { AccountRun::LockBusy, Tally::Skipped },
    gap = { AccountRun::GapNotElapsed { remaining: chrono::Duration::minutes(90) }, Tally::Skipped },
    unavailable = { AccountRun::Unavailable { error: "io".to_string() }, Tally::Failed },
)]
fn tallies(run: AccountRun, expected: Tally) {
    assert_eq!(AccountReport::new("a", run).tally(), expected);
}

#[test]
fn summary_counts_every_report() {
    let mut summary = TriggerSummary::new(Trigger::Second);
    summary.add(AccountReport::new("a", completed(AccountOutcome::Succeeded)));
    summary.add(AccountReport::new("b", AccountRun::LockBusy));
    summary.add(AccountReport::new("c", completed(AccountOutcome::Failed)));
    summary.add_lost(1);

    assert_eq!((summary.succeeded, summary.failed, summary.skipped), (1, 2, 1));
    assert_eq!(summary.total(), 4);
    assert_eq!(summary.reports.len(), 3);
}

#[test]
fn gap_line_shows_remaining_minutes() {
    let report = AccountReport::new(
        "a",
        AccountRun::GapNotElapsed {
            remaining: chrono::Duration::minutes(90),
        },
    );
    assert_eq!(
        report.to_string(),
        "a: skipped: minimum gap after first trigger not elapsed (90m remaining)"
    );
}
