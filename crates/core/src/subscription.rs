// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Remote ledger snapshot of a subscription
//!
//! Field names follow the billing platform's JSON. Missing and `null` fields
//! both decode as zero values, so an upstream schema tweak never breaks listing.

use serde::{Deserialize, Deserializer, Serialize};

/// Plan type of monthly (resettable) subscriptions
pub const MONTHLY_PLAN_TYPE: &str = "MONTHLY";

/// Markers identifying pay-per-use subscriptions. Matched case-insensitively
/// against the plan type, the subscription name and the plan name.
pub const PAY_PER_USE_MARKERS: &[&str] = &["PAYGO", "PAY_PER_USE"];

/// Subscription identifier on the billing platform
pub type SubscriptionId = u64;

/// Plan a subscription belongs to
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubscriptionPlan {
    #[serde(deserialize_with = "null_as_default")]
    pub id: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub subscription_name: String,
    /// Billing type (`MONTHLY`, `PAY_PER_USE`, ...)
    #[serde(deserialize_with = "null_as_default")]
    pub plan_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub credit_limit: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub billing_cycle: String,
}

/// One subscription as reported by `list_subscriptions`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Subscription {
    #[serde(deserialize_with = "null_as_default")]
    pub id: SubscriptionId,
    #[serde(deserialize_with = "null_as_default")]
    pub employee_id: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub employee_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub employee_email: String,
    #[serde(rename = "subscriptionPlanName", deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub current_credits: f64,
    /// Remaining resets the platform still allows
    #[serde(deserialize_with = "null_as_default")]
    pub reset_times: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub is_active: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub remaining_days: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub subscription_status: String,
    pub last_credit_reset: Option<String>,
    #[serde(rename = "subscriptionPlan", deserialize_with = "null_as_default")]
    pub plan: SubscriptionPlan,
}

/// The platform sends `null` for fields it has no value for; read those as
/// the type's zero value, like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Subscription {
    /// Billing type, upper-cased and trimmed; empty when unknown
    pub fn billing_type(&self) -> String {
        self.plan.plan_type.trim().to_ascii_uppercase()
    }

    pub fn credit_limit(&self) -> f64 {
        self.plan.credit_limit
    }

    /// Balance as a percentage of the plan's credit limit.
    ///
    /// `None` when the limit is not positive; callers treat that as "no
    /// threshold applies".
    pub fn credit_percent(&self) -> Option<f64> {
        let limit = self.credit_limit();
        if limit <= 0.0 {
            return None;
        }
        Some(self.current_credits / limit * 100.0)
    }

    pub fn is_monthly(&self) -> bool {
        self.billing_type() == MONTHLY_PLAN_TYPE
    }

    /// True when any identifying field carries a pay-per-use marker
    pub fn is_pay_per_use(&self) -> bool {
        [
            self.plan.plan_type.as_str(),
            self.name.as_str(),
            self.plan.subscription_name.as_str(),
        ]
        .iter()
        .any(|field| is_pay_per_use_marker(field))
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            credits: self.current_credits,
            reset_times: self.reset_times,
        }
    }
}

fn is_pay_per_use_marker(value: &str) -> bool {
    let value = value.trim();
    PAY_PER_USE_MARKERS
        .iter()
        .any(|marker| value.eq_ignore_ascii_case(marker))
}

/// The two ledger values a reset is verified against
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub credits: f64,
    pub reset_times: u32,
}

impl LedgerSnapshot {
    /// A reset took effect when credits went up and a reset was consumed
    pub fn confirms_reset_from(&self, baseline: &LedgerSnapshot) -> bool {
        self.credits > baseline.credits && self.reset_times < baseline.reset_times
    }
}

impl std::fmt::Display for LedgerSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "credits={:.4} resets={}", self.credits, self.reset_times)
    }
}

#[cfg(test)]
#[path = "subscription_tests.rs"]
mod tests;
