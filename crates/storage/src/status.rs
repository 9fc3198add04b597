// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-account execution status and inventory snapshots
//!
//! Layout under the data directory:
//!
//! ```text
//! accounts/<key>/status.json
//! accounts/<key>/account.json
//! ```

use crate::json::{sanitize_key, JsonStore, StorageError};
use chrono::{DateTime, NaiveDate, Utc};
use refill_core::{ExecutionStatus, Subscription, SubscriptionId};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const STATUS_ID: &str = "status";
const SNAPSHOT_ID: &str = "account";

/// Inventory entry for one subscription
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionSnapshot {
    pub employee_name: String,
    pub employee_email: String,
    pub subscription_id: SubscriptionId,
    pub subscription_name: String,
    pub credits: f64,
    pub credit_limit: f64,
    pub reset_times: u32,
    pub last_credit_reset: Option<String>,
}

impl From<&Subscription> for SubscriptionSnapshot {
    fn from(sub: &Subscription) -> Self {
        Self {
            employee_name: sub.employee_name.clone(),
            employee_email: sub.employee_email.clone(),
            subscription_id: sub.id,
            subscription_name: sub.name.clone(),
            credits: sub.current_credits,
            credit_limit: sub.credit_limit(),
            reset_times: sub.reset_times,
            last_credit_reset: sub.last_credit_reset.clone(),
        }
    }
}

/// Last known inventory of an account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    pub last_updated: DateTime<Utc>,
    pub subscriptions: Vec<SubscriptionSnapshot>,
}

impl AccountSnapshot {
    pub fn new(subscriptions: &[Subscription], now: DateTime<Utc>) -> Self {
        Self {
            last_updated: now,
            subscriptions: subscriptions.iter().map(SubscriptionSnapshot::from).collect(),
        }
    }
}

/// Reads and writes per-account records
#[derive(Clone, Debug)]
pub struct StatusStore {
    store: JsonStore,
}

impl StatusStore {
    pub fn open(data_dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        Ok(Self {
            store: JsonStore::open(data_dir)?,
        })
    }

    /// Status for `today`. A missing file yields a fresh status; a stored
    /// status from another day is rolled over before it is returned.
    pub fn load(&self, account_id: &str, today: NaiveDate) -> Result<ExecutionStatus, StorageError> {
        match self.store.load::<ExecutionStatus>(&account_dir(account_id), STATUS_ID) {
            Ok(mut status) => {
                if status.roll_over(today) {
                    tracing::info!(account = account_id, %today, "day rollover, trigger flags cleared");
                }
                Ok(status)
            }
            Err(StorageError::NotFound { .. }) => Ok(ExecutionStatus::fresh(today)),
            Err(e) => Err(e),
        }
    }

    pub fn save(&self, account_id: &str, status: &ExecutionStatus) -> Result<(), StorageError> {
        self.store.save(&account_dir(account_id), STATUS_ID, status)
    }

    pub fn save_snapshot(&self, account_id: &str, snapshot: &AccountSnapshot) -> Result<(), StorageError> {
        self.store.save(&account_dir(account_id), SNAPSHOT_ID, snapshot)
    }

    pub fn load_snapshot(&self, account_id: &str) -> Result<AccountSnapshot, StorageError> {
        self.store.load(&account_dir(account_id), SNAPSHOT_ID)
    }

    pub fn status_path(&self, account_id: &str) -> PathBuf {
        self.store.path_for(&account_dir(account_id), STATUS_ID)
    }
}

fn account_dir(account_id: &str) -> String {
    format!("accounts/{}", sanitize_key(account_id))
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
