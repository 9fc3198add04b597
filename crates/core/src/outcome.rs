// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-subscription reset results and their per-account summary

use crate::subscription::{LedgerSnapshot, Subscription, SubscriptionId};
use crate::threshold::Threshold;
use crate::trigger::Trigger;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a subscription was left alone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SkipReason {
    /// Balance is healthy enough under the configured threshold
    Threshold { percent: f64, threshold: Threshold },
    /// Not enough resets remaining for this trigger
    InsufficientResets { required: u32, available: u32 },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Threshold { percent, threshold } => {
                write!(f, "balance {:.1}% outside threshold ({})", percent, threshold)
            }
            SkipReason::InsufficientResets {
                required,
                available,
            } => write!(
                f,
                "insufficient reset count ({} remaining, {} required)",
                available, required
            ),
        }
    }
}

/// Failure classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    /// Transport or remote error; never retried
    Transport,
    /// Pre-call check found the subscription now bills pay-per-use
    Refused,
    /// Reset had no visible effect and the subscription dropped below the
    /// trigger's minimum
    Ineligible,
    /// Both attempts left the ledger unchanged
    Unconfirmed,
}

/// Final outcome of one subscription under one trigger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Outcome {
    Success,
    Skipped(SkipReason),
    Failed { kind: FailureKind, error: String },
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failed { .. })
    }
}

/// Result of processing one subscription. Built once, read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResetAttemptResult {
    subscription_id: SubscriptionId,
    subscription_name: String,
    trigger: Trigger,
    outcome: Outcome,
    attempts: u8,
    before: LedgerSnapshot,
    after: Option<LedgerSnapshot>,
    remote_message: Option<String>,
}

impl ResetAttemptResult {
    /// Skipped before any remote mutation
    pub fn skipped(subscription: &Subscription, trigger: Trigger, reason: SkipReason) -> Self {
        Self {
            subscription_id: subscription.id,
            subscription_name: subscription.name.clone(),
            trigger,
            outcome: Outcome::Skipped(reason),
            attempts: 0,
            before: subscription.snapshot(),
            after: None,
            remote_message: None,
        }
    }

    /// A result after at least one remote interaction. `before` is the
    /// baseline of the final attempt.
    pub fn concluded(
        subscription: &Subscription,
        trigger: Trigger,
        outcome: Outcome,
        attempts: u8,
        before: LedgerSnapshot,
        after: Option<LedgerSnapshot>,
        remote_message: Option<String>,
    ) -> Self {
        Self {
            subscription_id: subscription.id,
            subscription_name: subscription.name.clone(),
            trigger,
            outcome,
            attempts,
            before,
            after,
            remote_message,
        }
    }

    pub fn subscription_id(&self) -> SubscriptionId {
        self.subscription_id
    }

    pub fn subscription_name(&self) -> &str {
        &self.subscription_name
    }

    pub fn trigger(&self) -> Trigger {
        self.trigger
    }

    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    pub fn attempts(&self) -> u8 {
        self.attempts
    }

    pub fn before(&self) -> LedgerSnapshot {
        self.before
    }

    pub fn after(&self) -> Option<LedgerSnapshot> {
        self.after
    }

    pub fn remote_message(&self) -> Option<&str> {
        self.remote_message.as_deref()
    }
}

/// One report line per result
impl fmt::Display for ResetAttemptResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}: ", self.subscription_id, self.subscription_name)?;
        match &self.outcome {
            Outcome::Success => match self.after {
                Some(after) => write!(f, "reset ok ({} -> {})", self.before, after),
                None => write!(f, "reset ok ({})", self.before),
            },
            Outcome::Skipped(reason) => write!(f, "skipped: {}", reason),
            Outcome::Failed { error, .. } => {
                write!(f, "failed after {} attempt(s): {}", self.attempts, error)
            }
        }
    }
}

/// Account-level outcome of one trigger run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountOutcome {
    Succeeded,
    Failed,
    Skipped,
}

/// Summary of an account's results, as recorded into its execution status
#[derive(Debug, Clone, PartialEq)]
pub struct AccountVerdict {
    pub outcome: AccountOutcome,
    pub message: String,
    /// Metrics of the last result that reached the remote service
    pub before: Option<LedgerSnapshot>,
    pub after: Option<LedgerSnapshot>,
}

impl AccountVerdict {
    /// Failed if any subscription failed, else succeeded if any succeeded,
    /// else skipped.
    pub fn summarize(results: &[ResetAttemptResult]) -> Self {
        let failures: Vec<String> = results
            .iter()
            .filter_map(|r| match r.outcome() {
                Outcome::Failed { error, .. } => Some(format!("#{}: {}", r.subscription_id(), error)),
                _ => None,
            })
            .collect();
        let successes = results.iter().filter(|r| r.outcome().is_success()).count();
        let last_remote = results.iter().rev().find(|r| r.attempts() > 0);
        let before = last_remote.map(|r| r.before());
        let after = last_remote.and_then(|r| r.after());

        if !failures.is_empty() {
            return Self {
                outcome: AccountOutcome::Failed,
                message: failures.join("; "),
                before,
                after,
            };
        }
        if successes > 0 {
            return Self {
                outcome: AccountOutcome::Succeeded,
                message: format!("reset {} subscription(s)", successes),
                before,
                after,
            };
        }
        let reason = results
            .iter()
            .find_map(|r| match r.outcome() {
                Outcome::Skipped(reason) => Some(reason.to_string()),
                _ => None,
            })
            .unwrap_or_else(|| "no eligible subscriptions".to_string());
        Self::skipped(reason)
    }

    pub fn skipped(reason: impl fmt::Display) -> Self {
        Self {
            outcome: AccountOutcome::Skipped,
            message: format!("skipped: {}", reason),
            before: None,
            after: None,
        }
    }
}

#[cfg(test)]
#[path = "outcome_tests.rs"]
mod tests;
