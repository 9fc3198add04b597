// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters for the billing platform

pub mod billing;
pub mod traced;

pub use billing::{
    BillingApi, BillingConnector, BillingError, HttpBillingClient, HttpConnector, ResetAck,
    DEFAULT_TIMEOUT,
};
pub use traced::{TracedBillingApi, TracedConnector};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use billing::{BillingCall, FakeBillingApi, FakeConnector, ListStep, ResetBehavior};
