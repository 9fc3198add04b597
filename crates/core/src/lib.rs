// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! refill-core: domain model for the credit refill engine
//!
//! This crate provides:
//! - The subscription ledger model and eligibility filter
//! - Trigger and threshold rules
//! - Per-account execution status with daily rollover
//! - Run-lock records and the pure acquisition decision
//! - Clock and id abstractions for deterministic tests

pub mod account;
pub mod clock;
pub mod eligibility;
pub mod id;
pub mod lock;
pub mod outcome;
pub mod sink;
pub mod status;
pub mod subscription;
pub mod threshold;
pub mod trigger;

pub use account::{mask_api_key, Account};
pub use clock::{Clock, FakeClock, SystemClock};
pub use eligibility::{normalize_plan_name, EligibilityPolicy};
pub use id::{IdGen, SequentialIdGen, UuidIdGen};
pub use lock::{HolderId, LockConfig, LockDecision, RunLockRecord};
pub use outcome::{
    AccountOutcome, AccountVerdict, FailureKind, Outcome, ResetAttemptResult, SkipReason,
};
pub use sink::{DebugExchange, NullSink, ResponseSink};
pub use status::ExecutionStatus;
pub use subscription::{LedgerSnapshot, Subscription, SubscriptionId, SubscriptionPlan};
pub use threshold::{Threshold, ThresholdError};
pub use trigger::Trigger;
