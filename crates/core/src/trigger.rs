// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The two named daily reset opportunities

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two daily triggers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trigger {
    /// Early trigger; keeps one reset in reserve for `Second`
    First,
    /// Last opportunity of the day
    Second,
}

impl Trigger {
    pub const ALL: [Trigger; 2] = [Trigger::First, Trigger::Second];

    /// Minimum remaining reset count a subscription needs for this trigger
    pub fn min_reset_times(self) -> u32 {
        match self {
            Trigger::First => 2,
            Trigger::Second => 1,
        }
    }

    /// Whether the balance threshold is consulted before resetting.
    ///
    /// `Second` proceeds on reset count alone.
    pub fn applies_threshold(self) -> bool {
        matches!(self, Trigger::First)
    }

    /// Run-lock operation name, shared by scheduled and manual runs
    pub fn lock_operation(self) -> String {
        format!("{}_reset", self)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Trigger::First => "first",
            Trigger::Second => "second",
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl std::str::FromStr for Trigger {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first" => Ok(Trigger::First),
            "second" => Ok(Trigger::Second),
            _ => Err(format!("unknown trigger: {}", s)),
        }
    }
}

#[cfg(test)]
#[path = "trigger_tests.rs"]
mod tests;
