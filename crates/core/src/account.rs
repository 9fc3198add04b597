// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Billing accounts the engine acts on

use serde::{Deserialize, Serialize};
use std::fmt;

/// Credentials and identity of one billing account
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Stable identifier; keys the account's data directory
    pub id: String,
    pub api_key: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl Account {
    pub fn new(id: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            api_key: api_key.into(),
            label: None,
            enabled: true,
        }
    }

    /// Label if configured, otherwise the id
    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }

    pub fn masked_key(&self) -> String {
        mask_api_key(&self.api_key)
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("api_key", &self.masked_key())
            .field("label", &self.label)
            .field("enabled", &self.enabled)
            .finish()
    }
}

/// First eight characters followed by `****`
pub fn mask_api_key(key: &str) -> String {
    let prefix: String = key.chars().take(8).collect();
    format!("{}****", prefix)
}

#[cfg(test)]
#[path = "account_tests.rs"]
mod tests;
