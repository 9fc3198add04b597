// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reset executor: skip-or-act for one subscription, then verify
//!
//! The remote acknowledgement is never taken as proof. Each attempt re-reads
//! the ledger after a settle delay; one retry absorbs a slow ledger update.

use refill_adapters::{BillingApi, ResetAck};
use refill_core::{
    FailureKind, LedgerSnapshot, Outcome, ResetAttemptResult, SkipReason, Subscription,
    SubscriptionId, Threshold, Trigger,
};
use std::time::Duration;

pub const MAX_ATTEMPTS: u8 = 2;

/// Evaluate, then at most two (attempt, verify) pairs, then the converged read
const MAX_TRANSITIONS: usize = 2 + 2 * MAX_ATTEMPTS as usize;

/// Executor phases
#[derive(Debug)]
enum Phase {
    Evaluating,
    Attempting {
        attempt: u8,
        baseline: Subscription,
    },
    Verifying {
        attempt: u8,
        baseline: Subscription,
        ack: ResetAck,
    },
    Converged(ResetAttemptResult),
}

/// Runs the reset protocol against one billing account
#[derive(Clone)]
pub struct ResetExecutor<B> {
    api: B,
    settle_delay: Duration,
}

/// One execution, carrying what every phase needs
struct Run<'a> {
    original: &'a Subscription,
    trigger: Trigger,
    threshold: &'a Threshold,
}

impl<B: BillingApi> ResetExecutor<B> {
    pub fn new(api: B, settle_delay: Duration) -> Self {
        Self { api, settle_delay }
    }

    /// Process one subscription to a definitive result.
    ///
    /// The settle delay is never interrupted; cancellation only takes effect
    /// between subscriptions.
    pub async fn execute(
        &self,
        subscription: &Subscription,
        trigger: Trigger,
        threshold: &Threshold,
    ) -> ResetAttemptResult {
        let run = Run {
            original: subscription,
            trigger,
            threshold,
        };

        let mut phase = Phase::Evaluating;
        for _ in 0..MAX_TRANSITIONS {
            phase = match phase {
                Phase::Converged(result) => return result,
                Phase::Evaluating => evaluate(&run),
                Phase::Attempting { attempt, baseline } => {
                    self.attempt(&run, attempt, baseline).await
                }
                Phase::Verifying {
                    attempt,
                    baseline,
                    ack,
                } => self.verify(&run, attempt, baseline, ack).await,
            };
        }

        match phase {
            Phase::Converged(result) => result,
            other => {
                tracing::error!(id = subscription.id, phase = ?other, "reset did not converge");
                ResetAttemptResult::concluded(
                    subscription,
                    trigger,
                    failed(FailureKind::Unconfirmed, "reset did not converge"),
                    MAX_ATTEMPTS,
                    subscription.snapshot(),
                    None,
                    None,
                )
            }
        }
    }

    async fn attempt(&self, run: &Run<'_>, attempt: u8, baseline: Subscription) -> Phase {
        let id = baseline.id;

        // The plan may have changed since the listing
        let current = match self.find(id).await {
            Ok(current) => current,
            Err(error) => {
                return converge(run, attempt, &baseline, None, None, transport(error));
            }
        };
        if current.is_pay_per_use() {
            tracing::error!(id, plan_type = %current.plan.plan_type, "refusing to reset pay-per-use subscription");
            return converge(
                run,
                attempt,
                &baseline,
                None,
                None,
                failed(FailureKind::Refused, "refused: pay-per-use"),
            );
        }

        tracing::info!(
            id,
            attempt,
            trigger = %run.trigger,
            before = %baseline.snapshot(),
            "resetting"
        );
        match self.api.reset(id).await {
            Ok(ack) => {
                if !ack.success {
                    tracing::warn!(id, message = %ack.message, "reset not acknowledged, verifying anyway");
                }
                tokio::time::sleep(self.settle_delay).await;
                Phase::Verifying {
                    attempt,
                    baseline,
                    ack,
                }
            }
            Err(error) => converge(run, attempt, &baseline, None, None, transport(error.to_string())),
        }
    }

    async fn verify(&self, run: &Run<'_>, attempt: u8, baseline: Subscription, ack: ResetAck) -> Phase {
        let message = Some(ack.message);
        let refetched = match self.find(baseline.id).await {
            Ok(refetched) => refetched,
            Err(error) => return converge(run, attempt, &baseline, None, message, transport(error)),
        };
        let before = baseline.snapshot();
        let after = refetched.snapshot();

        if after.confirms_reset_from(&before) {
            tracing::info!(id = baseline.id, attempt, %before, %after, "reset confirmed");
            return converge(run, attempt, &baseline, Some(after), message, Outcome::Success);
        }

        let required = run.trigger.min_reset_times();
        if after.reset_times < required {
            tracing::warn!(id = baseline.id, attempt, %before, %after, "reset ineffective, no longer eligible");
            return converge(
                run,
                attempt,
                &baseline,
                Some(after),
                message,
                failed(
                    FailureKind::Ineligible,
                    format!(
                        "reset ineffective and no longer eligible ({} resets remaining, {} required)",
                        after.reset_times, required
                    ),
                ),
            );
        }

        if attempt < MAX_ATTEMPTS {
            tracing::warn!(id = baseline.id, attempt, %before, %after, "ledger unchanged, retrying");
            return Phase::Attempting {
                attempt: attempt + 1,
                baseline: refetched,
            };
        }

        tracing::warn!(id = baseline.id, attempt, %before, %after, "reset unconfirmed after retry");
        converge(
            run,
            attempt,
            &baseline,
            Some(after),
            message,
            failed(FailureKind::Unconfirmed, "reset unconfirmed after retry"),
        )
    }

    async fn find(&self, id: SubscriptionId) -> Result<Subscription, String> {
        let subs = self
            .api
            .list_subscriptions()
            .await
            .map_err(|e| e.to_string())?;
        subs.into_iter()
            .find(|s| s.id == id)
            .ok_or_else(|| format!("subscription {} no longer listed", id))
    }
}

/// Pre-flight skip checks; no remote call involved
pub fn preflight(sub: &Subscription, trigger: Trigger, threshold: &Threshold) -> Option<SkipReason> {
    // `second` is the day's last chance and ignores the balance
    if trigger.applies_threshold() {
        if let Some(percent) = sub.credit_percent() {
            if threshold.should_skip(percent) {
                return Some(SkipReason::Threshold {
                    percent,
                    threshold: *threshold,
                });
            }
        }
    }

    let required = trigger.min_reset_times();
    if sub.reset_times < required {
        return Some(SkipReason::InsufficientResets {
            required,
            available: sub.reset_times,
        });
    }
    None
}

fn evaluate(run: &Run<'_>) -> Phase {
    match preflight(run.original, run.trigger, run.threshold) {
        Some(reason) => {
            tracing::info!(id = run.original.id, trigger = %run.trigger, %reason, "skipping");
            Phase::Converged(ResetAttemptResult::skipped(run.original, run.trigger, reason))
        }
        None => Phase::Attempting {
            attempt: 1,
            baseline: run.original.clone(),
        },
    }
}

fn converge(
    run: &Run<'_>,
    attempt: u8,
    baseline: &Subscription,
    after: Option<LedgerSnapshot>,
    remote_message: Option<String>,
    outcome: Outcome,
) -> Phase {
    Phase::Converged(ResetAttemptResult::concluded(
        run.original,
        run.trigger,
        outcome,
        attempt,
        baseline.snapshot(),
        after,
        remote_message,
    ))
}

fn failed(kind: FailureKind, error: impl Into<String>) -> Outcome {
    Outcome::Failed {
        kind,
        error: error.into(),
    }
}

fn transport(error: String) -> Outcome {
    failed(FailureKind::Transport, error)
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
