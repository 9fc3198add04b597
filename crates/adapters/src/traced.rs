// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability

use crate::billing::{BillingApi, BillingConnector, BillingError, ResetAck};
use async_trait::async_trait;
use refill_core::{Account, Subscription, SubscriptionId};
use tracing::Instrument;

/// Wrapper that adds tracing to any BillingApi
#[derive(Clone)]
pub struct TracedBillingApi<B> {
    inner: B,
    account: String,
}

impl<B> TracedBillingApi<B> {
    pub fn new(inner: B, account: impl Into<String>) -> Self {
        Self {
            inner,
            account: account.into(),
        }
    }

    pub fn inner(&self) -> &B {
        &self.inner
    }
}

#[async_trait]
impl<B: BillingApi> BillingApi for TracedBillingApi<B> {
    async fn list_subscriptions(&self) -> Result<Vec<Subscription>, BillingError> {
        let span = tracing::info_span!("billing.list", account = %self.account);

        async {
            let start = std::time::Instant::now();
            let result = self.inner.list_subscriptions().await;
            let elapsed = start.elapsed();

            match &result {
                Ok(subs) => tracing::debug!(
                    count = subs.len(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "listed"
                ),
                Err(e) => tracing::error!(
                    elapsed_ms = elapsed.as_millis() as u64,
                    error = %e,
                    "list failed"
                ),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn reset(&self, id: SubscriptionId) -> Result<ResetAck, BillingError> {
        let span = tracing::info_span!("billing.reset", account = %self.account, id);

        async {
            tracing::info!("requesting reset");
            let start = std::time::Instant::now();
            let result = self.inner.reset(id).await;
            let elapsed = start.elapsed();

            match &result {
                Ok(ack) => tracing::info!(
                    success = ack.success,
                    message = %ack.message,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "reset acknowledged"
                ),
                Err(e) => tracing::error!(
                    elapsed_ms = elapsed.as_millis() as u64,
                    error = %e,
                    "reset failed"
                ),
            }
            result
        }
        .instrument(span)
        .await
    }
}

/// Connector whose clients are wrapped in [`TracedBillingApi`]
#[derive(Clone)]
pub struct TracedConnector<C> {
    inner: C,
}

impl<C> TracedConnector<C> {
    pub fn new(inner: C) -> Self {
        Self { inner }
    }
}

impl<C: BillingConnector> BillingConnector for TracedConnector<C> {
    type Api = TracedBillingApi<C::Api>;

    fn connect(&self, account: &Account) -> Self::Api {
        TracedBillingApi::new(self.inner.connect(account), account.id.clone())
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
