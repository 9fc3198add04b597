// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Run lock records and the pure acquisition decision
//!
//! A run lock serializes one trigger per account. The record on disk is the
//! only state; whether a new holder may take it depends on its age.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Unique identifier for a lock holder
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HolderId(pub String);

impl HolderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for HolderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lock configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockConfig {
    /// How long before a held lock is considered abandoned
    #[serde(with = "humantime_serde")]
    pub stale_threshold: Duration,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            stale_threshold: Duration::from_secs(10 * 60),
        }
    }
}

impl LockConfig {
    pub fn with_stale_threshold(mut self, threshold: Duration) -> Self {
        self.stale_threshold = threshold;
        self
    }
}

/// Persisted lock record
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunLockRecord {
    pub holder_id: HolderId,
    pub start_time: DateTime<Utc>,
    pub operation: String,
    pub host: String,
}

impl RunLockRecord {
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        (now - self.start_time).to_std().unwrap_or(Duration::ZERO)
    }

    /// Records from the future (clock skew) are never stale
    pub fn is_stale(&self, config: &LockConfig, now: DateTime<Utc>) -> bool {
        self.age(now) > config.stale_threshold
    }
}

/// Outcome of an acquisition attempt against the current record
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LockDecision {
    /// No record present
    Acquire,
    /// A stale record is overridden
    Reclaim { previous: RunLockRecord },
    /// Held by someone else within the staleness window
    Denied { current: RunLockRecord },
}

impl LockDecision {
    pub fn decide(
        existing: Option<RunLockRecord>,
        config: &LockConfig,
        now: DateTime<Utc>,
    ) -> Self {
        match existing {
            None => LockDecision::Acquire,
            Some(record) if record.is_stale(config, now) => {
                LockDecision::Reclaim { previous: record }
            }
            Some(record) => LockDecision::Denied { current: record },
        }
    }

    pub fn granted(&self) -> bool {
        !matches!(self, LockDecision::Denied { .. })
    }
}

#[cfg(test)]
#[path = "lock_tests.rs"]
mod tests;
