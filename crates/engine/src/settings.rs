// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process-level settings shared by `refilld` and `refill`
//!
//! Sources, later wins: built-in defaults, the TOML file, `REFILL_*`
//! environment variables.

use crate::config::{ConfigError, EngineConfig};
use refill_core::Account;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_API_KEYS: &str = "REFILL_API_KEYS";
pub const ENV_BASE_URL: &str = "REFILL_BASE_URL";
pub const ENV_TIMEZONE: &str = "REFILL_TIMEZONE";
pub const ENV_DATA_DIR: &str = "REFILL_DATA_DIR";

pub const DEFAULT_BASE_URL: &str = "https://www.88code.org";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub base_url: String,
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    /// State directory; platform data dir when unset
    pub data_dir: Option<PathBuf>,
    /// Write every remote exchange under `responses/`
    pub save_responses: bool,
    pub accounts: Vec<Account>,
    #[serde(flatten)]
    pub engine: EngineConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: refill_adapters::DEFAULT_TIMEOUT,
            data_dir: None,
            save_responses: false,
            accounts: Vec::new(),
            engine: EngineConfig::default(),
        }
    }
}

impl Settings {
    /// Load from `path`, or from the default config file when it exists,
    /// then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut settings = match path {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };
        settings.apply_env(|key| std::env::var(key).ok());
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Apply `REFILL_*` overrides. `REFILL_API_KEYS` is a comma-separated
    /// list that replaces the configured accounts.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(keys) = lookup(ENV_API_KEYS) {
            let accounts: Vec<Account> = keys
                .split(',')
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .enumerate()
                .map(|(i, key)| Account::new(format!("env-{}", i + 1), key))
                .collect();
            if !accounts.is_empty() {
                self.accounts = accounts;
            }
        }
        if let Some(url) = lookup(ENV_BASE_URL).filter(|v| !v.trim().is_empty()) {
            self.base_url = url.trim().to_string();
        }
        if let Some(tz) = lookup(ENV_TIMEZONE).filter(|v| !v.trim().is_empty()) {
            self.engine.timezone = tz.trim().to_string();
        }
        if let Some(dir) = lookup(ENV_DATA_DIR).filter(|v| !v.trim().is_empty()) {
            self.data_dir = Some(PathBuf::from(dir.trim()));
        }
    }

    pub fn active_accounts(&self) -> Vec<Account> {
        self.accounts.iter().filter(|a| a.enabled).cloned().collect()
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(default_data_dir)
    }

    /// Full validation, including the engine section
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::EmptyBaseUrl);
        }
        let mut seen = HashSet::new();
        for account in &self.accounts {
            if !seen.insert(account.id.as_str()) {
                return Err(ConfigError::DuplicateAccount(account.id.clone()));
            }
            if account.enabled && account.api_key.trim().is_empty() {
                return Err(ConfigError::EmptyApiKey(account.id.clone()));
            }
        }
        if self.active_accounts().is_empty() {
            return Err(ConfigError::NoAccounts);
        }
        self.engine.validate()?;
        Ok(())
    }
}

/// `<config dir>/refill/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("refill").join("config.toml"))
}

/// `<local data dir>/refill`, or `./refill-data` when the platform has none
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("refill"))
        .unwrap_or_else(|| PathBuf::from("refill-data"))
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;
