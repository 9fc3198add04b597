// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Billing platform adapters

mod http;

pub use http::{HttpBillingClient, HttpConnector, DEFAULT_TIMEOUT};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{BillingCall, FakeBillingApi, FakeConnector, ListStep, ResetBehavior};

use async_trait::async_trait;
use refill_core::{Account, Subscription, SubscriptionId};
use thiserror::Error;

/// Errors from billing operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BillingError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("remote error {code}: {message}")]
    Remote { code: String, message: String },
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid response: {0}")]
    Decode(String),
}

/// Acknowledgement of a reset request. Advisory only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetAck {
    pub success: bool,
    pub message: String,
}

/// Capability the engine needs from the billing platform
#[async_trait]
pub trait BillingApi: Clone + Send + Sync + 'static {
    /// Current ledger snapshot of every subscription on the account
    async fn list_subscriptions(&self) -> Result<Vec<Subscription>, BillingError>;

    /// Ask the platform to reset a subscription's credits
    async fn reset(&self, id: SubscriptionId) -> Result<ResetAck, BillingError>;
}

/// Builds a billing client for one account
pub trait BillingConnector: Clone + Send + Sync + 'static {
    type Api: BillingApi;

    fn connect(&self, account: &Account) -> Self::Api;
}
