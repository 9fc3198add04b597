// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake billing platform for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{BillingApi, BillingConnector, BillingError, ResetAck};
use async_trait::async_trait;
use refill_core::{Account, Subscription, SubscriptionId};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

/// Recorded billing call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BillingCall {
    List,
    Reset { id: SubscriptionId },
}

/// How the fake reacts to one reset request
#[derive(Debug, Clone, PartialEq)]
pub enum ResetBehavior {
    /// Refill credits to the limit and consume one reset
    Apply,
    /// Acknowledge success without touching the ledger
    AckWithoutEffect,
    /// Consume a reset without refilling credits
    ConsumeOnly,
    /// Fail the call
    Fail(BillingError),
}

/// Scripted behavior of one listing call
#[derive(Debug, Clone, PartialEq)]
pub enum ListStep {
    /// Return the ledger unchanged
    Normal,
    /// Fail the call
    Fail(BillingError),
    /// Flip the subscription to pay-per-use before answering
    SwitchToPayPerUse(SubscriptionId),
}

#[derive(Default)]
struct State {
    ledger: Vec<Subscription>,
    resets: HashMap<SubscriptionId, VecDeque<ResetBehavior>>,
    lists: VecDeque<ListStep>,
}

/// In-memory billing platform. Resets apply by default; scripts override
/// individual calls in order.
#[derive(Clone, Default)]
pub struct FakeBillingApi {
    state: Arc<Mutex<State>>,
    calls: Arc<Mutex<Vec<BillingCall>>>,
}

impl FakeBillingApi {
    pub fn new(ledger: Vec<Subscription>) -> Self {
        let api = Self::default();
        api.state.lock().unwrap_or_else(|e| e.into_inner()).ledger = ledger;
        api
    }

    /// Queue reset behaviors for one subscription
    pub fn script_resets(&self, id: SubscriptionId, behaviors: impl IntoIterator<Item = ResetBehavior>) {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .resets
            .entry(id)
            .or_default()
            .extend(behaviors);
    }

    /// Queue listing behaviors, consumed one per call
    pub fn script_lists(&self, steps: impl IntoIterator<Item = ListStep>) {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .lists
            .extend(steps);
    }

    /// Current ledger
    pub fn ledger(&self) -> Vec<Subscription> {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .ledger
            .clone()
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<BillingCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn reset_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, BillingCall::Reset { .. }))
            .count()
    }

    fn record(&self, call: BillingCall) {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
    }
}

#[async_trait]
impl BillingApi for FakeBillingApi {
    async fn list_subscriptions(&self) -> Result<Vec<Subscription>, BillingError> {
        self.record(BillingCall::List);

        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        match state.lists.pop_front().unwrap_or(ListStep::Normal) {
            ListStep::Normal => {}
            ListStep::Fail(err) => return Err(err),
            ListStep::SwitchToPayPerUse(id) => {
                if let Some(sub) = state.ledger.iter_mut().find(|s| s.id == id) {
                    sub.plan.plan_type = "PAY_PER_USE".to_string();
                }
            }
        }
        Ok(state.ledger.clone())
    }

    async fn reset(&self, id: SubscriptionId) -> Result<ResetAck, BillingError> {
        self.record(BillingCall::Reset { id });

        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let behavior = state
            .resets
            .get_mut(&id)
            .and_then(|queue| queue.pop_front())
            .unwrap_or(ResetBehavior::Apply);

        if let ResetBehavior::Fail(err) = &behavior {
            return Err(err.clone());
        }

        let Some(sub) = state.ledger.iter_mut().find(|s| s.id == id) else {
            return Err(BillingError::Remote {
                code: "NOT_FOUND".to_string(),
                message: format!("subscription {} not found", id),
            });
        };

        match behavior {
            ResetBehavior::Apply => {
                sub.current_credits = sub.plan.credit_limit;
                sub.reset_times = sub.reset_times.saturating_sub(1);
            }
            ResetBehavior::ConsumeOnly => {
                sub.reset_times = sub.reset_times.saturating_sub(1);
            }
            ResetBehavior::AckWithoutEffect | ResetBehavior::Fail(_) => {}
        }

        Ok(ResetAck {
            success: true,
            message: "credits reset".to_string(),
        })
    }
}

/// Hands out pre-registered fakes by account id
#[derive(Clone, Default)]
pub struct FakeConnector {
    apis: Arc<Mutex<HashMap<String, FakeBillingApi>>>,
}

impl FakeConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, account_id: &str, api: FakeBillingApi) {
        self.apis
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(account_id.to_string(), api);
    }

    /// The fake serving an account; created empty on first use
    pub fn api(&self, account_id: &str) -> FakeBillingApi {
        self.apis
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entry(account_id.to_string())
            .or_default()
            .clone()
    }
}

impl BillingConnector for FakeConnector {
    type Api = FakeBillingApi;

    fn connect(&self, account: &Account) -> FakeBillingApi {
        self.api(&account.id)
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
