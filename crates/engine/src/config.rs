// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine configuration: trigger times, thresholds, intervals

use chrono_tz::Tz;
use refill_core::{EligibilityPolicy, LockConfig, Threshold, ThresholdError, Trigger};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Errors that keep the engine from starting
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid time zone: {0}")]
    Timezone(String),
    #[error("invalid {trigger} trigger time {hour:02}:{minute:02}")]
    TriggerTime {
        trigger: Trigger,
        hour: u32,
        minute: u32,
    },
    #[error("invalid {trigger} threshold: {source}")]
    Threshold {
        trigger: Trigger,
        source: ThresholdError,
    },
    #[error("{0} must be greater than zero")]
    ZeroInterval(&'static str),
    #[error("no enabled accounts configured")]
    NoAccounts,
    #[error("account {0} has an empty api key")]
    EmptyApiKey(String),
    #[error("duplicate account id: {0}")]
    DuplicateAccount(String),
    #[error("base url is empty")]
    EmptyBaseUrl,
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}

/// Schedule and threshold of one trigger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerSettings {
    pub enabled: bool,
    pub hour: u32,
    pub minute: u32,
    #[serde(default)]
    pub threshold: Threshold,
}

impl TriggerSettings {
    pub fn default_for(trigger: Trigger) -> Self {
        match trigger {
            Trigger::First => Self {
                enabled: false,
                hour: 18,
                minute: 50,
                threshold: Threshold::Ceiling { percent: 83.0 },
            },
            Trigger::Second => Self {
                enabled: true,
                hour: 23,
                minute: 55,
                threshold: Threshold::Off,
            },
        }
    }

    /// `HH:MM`
    pub fn time_label(&self) -> String {
        format!("{:02}:{:02}", self.hour, self.minute)
    }
}

fn default_first() -> TriggerSettings {
    TriggerSettings::default_for(Trigger::First)
}

fn default_second() -> TriggerSettings {
    TriggerSettings::default_for(Trigger::Second)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// IANA time zone the trigger times are expressed in
    pub timezone: String,
    #[serde(default = "default_first")]
    pub first: TriggerSettings,
    #[serde(default = "default_second")]
    pub second: TriggerSettings,
    pub eligibility: EligibilityPolicy,
    /// `second` is skipped when `first` ran less than this long ago
    #[serde(with = "humantime_serde")]
    pub min_gap: Duration,
    #[serde(with = "humantime_serde")]
    pub refresh_interval: Duration,
    #[serde(with = "humantime_serde")]
    pub tick_interval: Duration,
    /// Wait between a reset request and its verification
    #[serde(with = "humantime_serde")]
    pub settle_delay: Duration,
    #[serde(with = "humantime_serde")]
    pub summary_interval: Duration,
    pub lock: LockConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            timezone: "Asia/Shanghai".to_string(),
            first: default_first(),
            second: default_second(),
            eligibility: EligibilityPolicy::default(),
            min_gap: Duration::from_secs(5 * 60 * 60),
            refresh_interval: Duration::from_secs(60 * 60),
            tick_interval: Duration::from_secs(60),
            settle_delay: Duration::from_secs(3),
            summary_interval: Duration::from_secs(5 * 60),
            lock: LockConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn trigger(&self, trigger: Trigger) -> &TriggerSettings {
        match trigger {
            Trigger::First => &self.first,
            Trigger::Second => &self.second,
        }
    }

    pub fn tz(&self) -> Result<Tz, ConfigError> {
        self.timezone
            .trim()
            .parse::<Tz>()
            .map_err(|_| ConfigError::Timezone(self.timezone.clone()))
    }

    /// Check everything the scheduler relies on; returns the parsed zone
    pub fn validate(&self) -> Result<Tz, ConfigError> {
        let tz = self.tz()?;
        for trigger in Trigger::ALL {
            let settings = self.trigger(trigger);
            if settings.hour > 23 || settings.minute > 59 {
                return Err(ConfigError::TriggerTime {
                    trigger,
                    hour: settings.hour,
                    minute: settings.minute,
                });
            }
            settings
                .threshold
                .validate()
                .map_err(|source| ConfigError::Threshold { trigger, source })?;
        }
        if self.tick_interval.is_zero() {
            return Err(ConfigError::ZeroInterval("tick_interval"));
        }
        if self.refresh_interval.is_zero() {
            return Err(ConfigError::ZeroInterval("refresh_interval"));
        }
        if self.summary_interval.is_zero() {
            return Err(ConfigError::ZeroInterval("summary_interval"));
        }
        Ok(tz)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
