// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-account and per-trigger run reports

use refill_core::{AccountOutcome, AccountVerdict, ResetAttemptResult, Trigger};
use std::fmt;

/// What happened to one account during a trigger run
#[derive(Debug, Clone, PartialEq)]
pub enum AccountRun {
    /// Subscriptions were processed and the status recorded
    Completed {
        verdict: AccountVerdict,
        results: Vec<ResetAttemptResult>,
    },
    /// The trigger already ran today
    AlreadyRan,
    /// Another holder has the run lock
    LockBusy,
    /// `second` came too soon after `first`; not marked as ran
    GapNotElapsed { remaining: chrono::Duration },
    /// Status or lock could not be read
    Unavailable { error: String },
}

/// Counter a report contributes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tally {
    Succeeded,
    Failed,
    Skipped,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AccountReport {
    pub account_id: String,
    pub run: AccountRun,
}

impl AccountReport {
    pub fn new(account_id: impl Into<String>, run: AccountRun) -> Self {
        Self {
            account_id: account_id.into(),
            run,
        }
    }

    pub fn tally(&self) -> Tally {
        match &self.run {
            AccountRun::Completed { verdict, .. } => match verdict.outcome {
                AccountOutcome::Succeeded => Tally::Succeeded,
                AccountOutcome::Failed => Tally::Failed,
                AccountOutcome::Skipped => Tally::Skipped,
            },
            AccountRun::AlreadyRan => Tally::Succeeded,
            AccountRun::LockBusy | AccountRun::GapNotElapsed { .. } => Tally::Skipped,
            AccountRun::Unavailable { .. } => Tally::Failed,
        }
    }

    pub fn results(&self) -> &[ResetAttemptResult] {
        match &self.run {
            AccountRun::Completed { results, .. } => results,
            _ => &[],
        }
    }
}

impl fmt::Display for AccountReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.account_id)?;
        match &self.run {
            AccountRun::Completed { verdict, .. } => write!(f, "{}", verdict.message),
            AccountRun::AlreadyRan => write!(f, "already ran today"),
            AccountRun::LockBusy => write!(f, "skipped: run lock busy"),
            AccountRun::GapNotElapsed { remaining } => write!(
                f,
                "skipped: minimum gap after first trigger not elapsed ({}m remaining)",
                remaining.num_minutes()
            ),
            AccountRun::Unavailable { error } => write!(f, "unavailable: {}", error),
        }
    }
}

/// Aggregate of one trigger across accounts
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerSummary {
    pub trigger: Trigger,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    pub reports: Vec<AccountReport>,
}

impl TriggerSummary {
    pub fn new(trigger: Trigger) -> Self {
        Self {
            trigger,
            succeeded: 0,
            failed: 0,
            skipped: 0,
            reports: Vec::new(),
        }
    }

    pub fn add(&mut self, report: AccountReport) {
        match report.tally() {
            Tally::Succeeded => self.succeeded += 1,
            Tally::Failed => self.failed += 1,
            Tally::Skipped => self.skipped += 1,
        }
        self.reports.push(report);
    }

    /// Units that ended without a report
    pub fn add_lost(&mut self, count: usize) {
        self.failed += count;
    }

    pub fn total(&self) -> usize {
        self.succeeded + self.failed + self.skipped
    }

    /// Emit the run report: one line per result, one per account, one total
    pub fn log(&self) {
        for report in &self.reports {
            for result in report.results() {
                if result.outcome().is_failure() {
                    tracing::warn!(account = %report.account_id, trigger = %self.trigger, "{}", result);
                } else {
                    tracing::info!(account = %report.account_id, trigger = %self.trigger, "{}", result);
                }
            }
            tracing::info!(trigger = %self.trigger, "{}", report);
        }
        tracing::info!(
            trigger = %self.trigger,
            succeeded = self.succeeded,
            failed = self.failed,
            skipped = self.skipped,
            "trigger run complete"
        );
    }
}

#[cfg(test)]
#[path = "report_tests.rs"]
mod tests;
