// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fans a trigger out across accounts
//!
//! Every account runs as its own task; reports flow through one channel to a
//! single collector. A failing or panicking account never cancels its
//! siblings, and the run returns only when every task has finished.

use crate::report::TriggerSummary;
use crate::runner::AccountRunner;
use refill_adapters::BillingConnector;
use refill_core::{Account, Clock, IdGen, Trigger};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

pub struct Coordinator<K, C: Clock, I: IdGen> {
    runner: Arc<AccountRunner<K, C, I>>,
    accounts: Vec<Account>,
}

impl<K, C: Clock, I: IdGen> Clone for Coordinator<K, C, I> {
    fn clone(&self) -> Self {
        Self {
            runner: Arc::clone(&self.runner),
            accounts: self.accounts.clone(),
        }
    }
}

impl<K, C, I> Coordinator<K, C, I>
where
    K: BillingConnector,
    C: Clock,
    I: IdGen,
{
    /// Disabled accounts are dropped here
    pub fn new(runner: AccountRunner<K, C, I>, accounts: Vec<Account>) -> Self {
        Self {
            runner: Arc::new(runner),
            accounts: accounts.into_iter().filter(|a| a.enabled).collect(),
        }
    }

    pub fn runner(&self) -> &AccountRunner<K, C, I> {
        &self.runner
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    /// Run `trigger` for every active account and wait for all of them
    pub async fn run_trigger(&self, trigger: Trigger) -> TriggerSummary {
        tracing::info!(%trigger, accounts = self.accounts.len(), "trigger started");

        let (tx, mut rx) = mpsc::channel(self.accounts.len().max(1));
        let mut tasks = JoinSet::new();
        for account in self.accounts.iter().cloned() {
            let runner = Arc::clone(&self.runner);
            let tx = tx.clone();
            tasks.spawn(async move {
                let report = runner.run(&account, trigger).await;
                // Receiver outlives every sender
                let _ = tx.send(report).await;
            });
        }
        drop(tx);

        let collect = async {
            let mut summary = TriggerSummary::new(trigger);
            while let Some(report) = rx.recv().await {
                summary.add(report);
            }
            summary
        };
        let drain = async {
            let mut lost = 0;
            while let Some(joined) = tasks.join_next().await {
                if let Err(e) = joined {
                    tracing::error!(%trigger, error = %e, "account task ended abnormally");
                    lost += 1;
                }
            }
            lost
        };
        let (mut summary, lost) = tokio::join!(collect, drain);
        summary.add_lost(lost);

        summary.log();
        summary
    }

    /// Refresh every active account's inventory concurrently
    pub async fn refresh_all(&self) {
        let mut tasks = JoinSet::new();
        for account in self.accounts.iter().cloned() {
            let runner = Arc::clone(&self.runner);
            tasks.spawn(async move {
                if let Err(e) = runner.refresh(&account).await {
                    tracing::warn!(account = %account.id, error = %e, "inventory refresh failed");
                }
            });
        }
        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                tracing::error!(error = %e, "refresh task ended abnormally");
            }
        }
    }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
