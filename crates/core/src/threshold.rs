// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Balance threshold applied before a `first` trigger reset

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Threshold mode. Ceiling and floor are mutually exclusive by construction.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum Threshold {
    /// No balance check
    #[default]
    Off,
    /// Skip when the balance percentage exceeds `percent`
    Ceiling { percent: f64 },
    /// Skip unless the balance percentage is below `percent`
    Floor { percent: f64 },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ThresholdError {
    #[error("threshold percent must be within (0, 100], got {0}")]
    OutOfRange(f64),
}

impl Threshold {
    pub fn validate(&self) -> Result<(), ThresholdError> {
        match *self {
            Threshold::Off => Ok(()),
            Threshold::Ceiling { percent } | Threshold::Floor { percent } => {
                if percent.is_finite() && percent > 0.0 && percent <= 100.0 {
                    Ok(())
                } else {
                    Err(ThresholdError::OutOfRange(percent))
                }
            }
        }
    }

    /// Whether a balance at `percent` of the limit is healthy enough to skip
    pub fn should_skip(&self, percent: f64) -> bool {
        match *self {
            Threshold::Off => false,
            Threshold::Ceiling { percent: cap } => percent > cap,
            Threshold::Floor { percent: floor } => percent >= floor,
        }
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Threshold::Off => write!(f, "off"),
            Threshold::Ceiling { percent } => write!(f, "ceiling {:.1}%", percent),
            Threshold::Floor { percent } => write!(f, "floor {:.1}%", percent),
        }
    }
}

#[cfg(test)]
#[path = "threshold_tests.rs"]
mod tests;
