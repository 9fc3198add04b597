// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One account, one trigger: lock, status, filter, execute, record

use crate::aggregator::LogAggregator;
use crate::config::{ConfigError, EngineConfig};
use crate::executor::{preflight, ResetExecutor};
use crate::report::{AccountReport, AccountRun};
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use refill_adapters::{BillingApi, BillingConnector, BillingError};
use refill_core::{
    Account, AccountOutcome, AccountVerdict, Clock, ExecutionStatus, IdGen, SkipReason,
    Subscription, Trigger,
};
use refill_storage::{AccountSnapshot, FileRunLock, RunLockGuard, StatusStore, StorageError};

/// Reset-count level below which the inventory refresh warns
const LOW_RESET_WARNING: u32 = 2;

/// Runner adapter and storage dependencies
pub struct RunnerDeps<K, C: Clock, I: IdGen> {
    pub connector: K,
    pub store: StatusStore,
    pub locks: FileRunLock<C, I>,
    pub clock: C,
}

/// Subscription as seen by a dry run
#[derive(Debug, Clone, PartialEq)]
pub struct Preview {
    pub subscription: Subscription,
    pub eligible: bool,
    /// Pre-flight verdict for eligible subscriptions; `None` means it would
    /// be reset
    pub skip: Option<SkipReason>,
}

pub struct AccountRunner<K, C: Clock, I: IdGen> {
    connector: K,
    store: StatusStore,
    locks: FileRunLock<C, I>,
    clock: C,
    config: EngineConfig,
    tz: Tz,
    aggregator: LogAggregator<C>,
}

impl<K, C, I> AccountRunner<K, C, I>
where
    K: BillingConnector,
    C: Clock,
    I: IdGen,
{
    pub fn new(deps: RunnerDeps<K, C, I>, config: EngineConfig) -> Result<Self, ConfigError> {
        let tz = config.validate()?;
        let aggregator = LogAggregator::new(deps.clock.clone(), config.summary_interval);
        Ok(Self {
            connector: deps.connector,
            store: deps.store,
            locks: deps.locks,
            clock: deps.clock,
            config,
            tz,
            aggregator,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn tz(&self) -> Tz {
        self.tz
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn aggregator(&self) -> &LogAggregator<C> {
        &self.aggregator
    }

    /// Calendar day in the configured zone
    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.tz).date_naive()
    }

    /// Run `trigger` for one account. Never fails; every path yields a report.
    pub async fn run(&self, account: &Account, trigger: Trigger) -> AccountReport {
        let guard = match self.acquire(account, trigger).await {
            Ok(Some(guard)) => guard,
            Ok(None) => {
                tracing::info!(account = %account.id, %trigger, "run lock busy, skipping");
                return AccountReport::new(&account.id, AccountRun::LockBusy);
            }
            Err(e) => {
                tracing::error!(account = %account.id, %trigger, error = %e, "run lock unavailable");
                return AccountReport::new(
                    &account.id,
                    AccountRun::Unavailable {
                        error: format!("run lock: {}", e),
                    },
                );
            }
        };

        let run = self.run_locked(account, trigger).await;

        if let Err(e) = off_runtime(move || guard.release()).await {
            tracing::warn!(account = %account.id, %trigger, error = %e, "failed to release run lock");
        }
        AccountReport::new(&account.id, run)
    }

    async fn run_locked(&self, account: &Account, trigger: Trigger) -> AccountRun {
        let now = self.clock.now();
        let mut status = match self.load_status(account, self.today(now)).await {
            Ok(status) => status,
            Err(e) => {
                tracing::error!(account = %account.id, error = %e, "status unreadable");
                return AccountRun::Unavailable {
                    error: format!("status: {}", e),
                };
            }
        };

        if status.has_run(trigger) {
            tracing::info!(account = %account.id, %trigger, "already ran today");
            return AccountRun::AlreadyRan;
        }

        if trigger == Trigger::Second {
            if let Some(remaining) = self.second_gap(&status, now) {
                tracing::info!(
                    account = %account.id,
                    remaining_min = remaining.num_minutes(),
                    "first trigger ran too recently, skipping second"
                );
                return AccountRun::GapNotElapsed { remaining };
            }
        }

        tracing::info!(account = %account.id, key = %account.masked_key(), %trigger, "running trigger");
        let api = self.connector.connect(account);
        let (verdict, results) = match api.list_subscriptions().await {
            Ok(subscriptions) => {
                let candidates = self.config.eligibility.filter(&subscriptions);
                tracing::info!(
                    account = %account.id,
                    listed = subscriptions.len(),
                    eligible = candidates.len(),
                    "subscriptions filtered"
                );
                let executor = ResetExecutor::new(api, self.config.settle_delay);
                let threshold = self.config.trigger(trigger).threshold;
                let mut results = Vec::with_capacity(candidates.len());
                for candidate in &candidates {
                    results.push(executor.execute(candidate, trigger, &threshold).await);
                }
                (AccountVerdict::summarize(&results), results)
            }
            Err(e) => {
                tracing::error!(account = %account.id, error = %e, "failed to list subscriptions");
                (list_failure(&e), Vec::new())
            }
        };

        status.record(trigger, &verdict, self.clock.now());
        if let Err(e) = self.save_status(account, status).await {
            // Reporting still goes ahead; the ran flag may be lost
            tracing::error!(account = %account.id, %trigger, error = %e, "failed to save status");
        }

        AccountRun::Completed { verdict, results }
    }

    async fn acquire(
        &self,
        account: &Account,
        trigger: Trigger,
    ) -> Result<Option<RunLockGuard>, StorageError> {
        let locks = self.locks.clone();
        let account_id = account.id.clone();
        let operation = trigger.lock_operation();
        off_runtime(move || locks.try_acquire(&account_id, &operation)).await
    }

    async fn load_status(
        &self,
        account: &Account,
        today: NaiveDate,
    ) -> Result<ExecutionStatus, StorageError> {
        let store = self.store.clone();
        let account_id = account.id.clone();
        off_runtime(move || store.load(&account_id, today)).await
    }

    async fn save_status(
        &self,
        account: &Account,
        status: ExecutionStatus,
    ) -> Result<(), StorageError> {
        let store = self.store.clone();
        let account_id = account.id.clone();
        off_runtime(move || store.save(&account_id, &status)).await
    }

    fn second_gap(&self, status: &ExecutionStatus, now: DateTime<Utc>) -> Option<chrono::Duration> {
        let min_gap = chrono::Duration::from_std(self.config.min_gap).ok()?;
        status.second_gap_remaining(now, min_gap)
    }

    /// List, log and persist the account's inventory
    pub async fn refresh(&self, account: &Account) -> Result<Vec<Subscription>, BillingError> {
        let api = self.connector.connect(account);
        let subscriptions = api.list_subscriptions().await?;
        let policy = &self.config.eligibility;

        for sub in &subscriptions {
            if sub.is_pay_per_use() && policy.matches_target(sub) {
                tracing::error!(
                    account = %account.id,
                    id = sub.id,
                    name = %sub.name,
                    "pay-per-use subscription matches a target plan; it will never be reset"
                );
            }
        }

        for sub in policy.filter(&subscriptions) {
            let percent = sub
                .credit_percent()
                .map(|p| format!("{:.1}%", p))
                .unwrap_or_else(|| "n/a".to_string());
            self.aggregator.push(format!(
                "{} #{} {}: {:.2}/{:.2} ({}) resets={}",
                account.display_name(),
                sub.id,
                sub.name,
                sub.current_credits,
                sub.credit_limit(),
                percent,
                sub.reset_times
            ));
            if sub.reset_times < LOW_RESET_WARNING {
                tracing::warn!(
                    account = %account.id,
                    id = sub.id,
                    reset_times = sub.reset_times,
                    "few resets remaining"
                );
            }
        }

        let snapshot = AccountSnapshot::new(&subscriptions, self.clock.now());
        let store = self.store.clone();
        let account_id = account.id.clone();
        if let Err(e) = off_runtime(move || store.save_snapshot(&account_id, &snapshot)).await {
            tracing::warn!(account = %account.id, error = %e, "failed to save account snapshot");
        }
        Ok(subscriptions)
    }

    /// What `trigger` would do to each listed subscription, without acting
    pub async fn preview(
        &self,
        account: &Account,
        trigger: Trigger,
    ) -> Result<Vec<Preview>, BillingError> {
        let api = self.connector.connect(account);
        let subscriptions = api.list_subscriptions().await?;
        let threshold = self.config.trigger(trigger).threshold;

        Ok(subscriptions
            .into_iter()
            .map(|sub| {
                let eligible = self.config.eligibility.is_eligible(&sub);
                let skip = if eligible {
                    preflight(&sub, trigger, &threshold)
                } else {
                    None
                };
                Preview {
                    subscription: sub,
                    eligible,
                    skip,
                }
            })
            .collect())
    }

    /// Persisted status, rolled over to today
    pub fn status(&self, account: &Account) -> Result<ExecutionStatus, StorageError> {
        self.store.load(&account.id, self.today(self.clock.now()))
    }
}

/// Lock and status files take blocking `fs2` locks and fsyncs; keep them off
/// the async workers
async fn off_runtime<T, F>(work: F) -> Result<T, StorageError>
where
    F: FnOnce() -> Result<T, StorageError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .unwrap_or_else(|e| Err(StorageError::Io(std::io::Error::other(e))))
}

fn list_failure(error: &BillingError) -> AccountVerdict {
    AccountVerdict {
        outcome: AccountOutcome::Failed,
        message: format!("list subscriptions failed: {}", error),
        before: None,
        after: None,
    }
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
