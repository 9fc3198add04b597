// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-account daily trigger bookkeeping
//!
//! Day-scoped fields are cleared lazily: whoever loads a status for a date
//! other than the stored one calls [`ExecutionStatus::roll_over`] first.

use crate::outcome::{AccountOutcome, AccountVerdict};
use crate::trigger::Trigger;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionStatus {
    pub last_check_time: Option<DateTime<Utc>>,
    pub today_date: NaiveDate,

    pub first_reset_today: bool,
    pub last_first_reset_time: Option<DateTime<Utc>>,
    pub second_reset_today: bool,
    pub last_second_reset_time: Option<DateTime<Utc>>,

    pub last_reset_success: bool,
    pub last_reset_message: String,
    pub consecutive_failures: u32,

    pub reset_times_before_reset: Option<u32>,
    pub reset_times_after_reset: Option<u32>,
    pub credits_before_reset: Option<f64>,
    pub credits_after_reset: Option<f64>,
}

impl ExecutionStatus {
    pub fn fresh(today: NaiveDate) -> Self {
        Self {
            today_date: today,
            ..Self::default()
        }
    }

    /// Clear day-scoped fields when `today` differs from the stored date.
    ///
    /// Returns whether a rollover happened. `consecutive_failures`, the last
    /// outcome and the last-run timestamps survive.
    pub fn roll_over(&mut self, today: NaiveDate) -> bool {
        if self.today_date == today {
            return false;
        }
        self.today_date = today;
        self.first_reset_today = false;
        self.second_reset_today = false;
        self.reset_times_before_reset = None;
        self.reset_times_after_reset = None;
        self.credits_before_reset = None;
        self.credits_after_reset = None;
        true
    }

    pub fn has_run(&self, trigger: Trigger) -> bool {
        match trigger {
            Trigger::First => self.first_reset_today,
            Trigger::Second => self.second_reset_today,
        }
    }

    pub fn last_run_time(&self, trigger: Trigger) -> Option<DateTime<Utc>> {
        match trigger {
            Trigger::First => self.last_first_reset_time,
            Trigger::Second => self.last_second_reset_time,
        }
    }

    /// Time still to wait before `second` may run, if `first` ran today less
    /// than `min_gap` ago.
    pub fn second_gap_remaining(&self, now: DateTime<Utc>, min_gap: Duration) -> Option<Duration> {
        if !self.first_reset_today {
            return None;
        }
        let first = self.last_first_reset_time?;
        let elapsed = now - first;
        if elapsed < min_gap {
            Some(min_gap - elapsed)
        } else {
            None
        }
    }

    /// Record the outcome of a trigger run. The ran-today flag is set for
    /// every outcome; success and failure bookkeeping only move on a real
    /// success or failure.
    pub fn record(&mut self, trigger: Trigger, verdict: &AccountVerdict, now: DateTime<Utc>) {
        match trigger {
            Trigger::First => {
                self.first_reset_today = true;
                self.last_first_reset_time = Some(now);
            }
            Trigger::Second => {
                self.second_reset_today = true;
                self.last_second_reset_time = Some(now);
            }
        }
        self.last_check_time = Some(now);
        self.last_reset_message = verdict.message.clone();

        match verdict.outcome {
            AccountOutcome::Succeeded => {
                self.last_reset_success = true;
                self.consecutive_failures = 0;
            }
            AccountOutcome::Failed => {
                self.last_reset_success = false;
                self.consecutive_failures = self.consecutive_failures.saturating_add(1);
            }
            AccountOutcome::Skipped => return,
        }

        if let Some(before) = verdict.before {
            self.reset_times_before_reset = Some(before.reset_times);
            self.credits_before_reset = Some(before.credits);
        }
        if let Some(after) = verdict.after {
            self.reset_times_after_reset = Some(after.reset_times);
            self.credits_after_reset = Some(after.credits);
        }
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
