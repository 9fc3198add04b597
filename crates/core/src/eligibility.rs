// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Eligibility filter: reduces a listing to reset candidates

use crate::subscription::Subscription;
use serde::{Deserialize, Serialize};

/// Per-run filter configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EligibilityPolicy {
    /// Allow-list of plan names; empty means every plan qualifies
    pub target_plans: Vec<String>,
    /// Exclude subscriptions whose billing type is known and not monthly
    pub require_monthly: bool,
}

impl EligibilityPolicy {
    pub fn new(target_plans: Vec<String>, require_monthly: bool) -> Self {
        Self {
            target_plans,
            require_monthly,
        }
    }

    /// Qualifying subscriptions, in input order
    pub fn filter(&self, subscriptions: &[Subscription]) -> Vec<Subscription> {
        let targets = self.normalized_targets();
        subscriptions
            .iter()
            .filter(|sub| self.admits(sub, &targets))
            .cloned()
            .collect()
    }

    /// Single-subscription check used by the filter and by previews
    pub fn is_eligible(&self, subscription: &Subscription) -> bool {
        self.admits(subscription, &self.normalized_targets())
    }

    /// True when the allow-list names this subscription, regardless of the
    /// other rules. Used to flag a pay-per-use plan configured as a target.
    pub fn matches_target(&self, subscription: &Subscription) -> bool {
        self.normalized_targets()
            .iter()
            .any(|target| names_match(subscription, target))
    }

    fn normalized_targets(&self) -> Vec<String> {
        self.target_plans
            .iter()
            .map(|name| normalize_plan_name(name))
            .filter(|name| !name.is_empty())
            .collect()
    }

    fn admits(&self, sub: &Subscription, targets: &[String]) -> bool {
        let billing = sub.billing_type();
        if self.require_monthly && !billing.is_empty() && !sub.is_monthly() {
            return false;
        }
        if sub.is_pay_per_use() {
            return false;
        }
        if targets.is_empty() {
            return true;
        }
        targets.iter().any(|target| names_match(sub, target))
    }
}

fn names_match(sub: &Subscription, target: &str) -> bool {
    normalize_plan_name(&sub.name) == target
        || normalize_plan_name(&sub.plan.subscription_name) == target
}

const STRIPPED_CHARS: &[char] = &[
    '（', '）', '(', ')', '-', '_', ' ', '\t', '\n', '\r', '|', '/', '\\', ':', ';', '@', '#',
    '+', ',', '，', '.',
];

/// Lower-cases a plan name and strips punctuation, separators and whitespace
pub fn normalize_plan_name(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .chars()
        .filter(|c| !STRIPPED_CHARS.contains(c))
        .collect()
}

#[cfg(test)]
#[path = "eligibility_tests.rs"]
mod tests;
