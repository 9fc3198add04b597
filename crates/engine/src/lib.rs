// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Refill engine: reset execution, fan-out and scheduling

mod aggregator;
pub mod config;
mod coordinator;
mod error;
mod executor;
mod report;
mod runner;
mod scheduler;
pub mod settings;
mod wiring;

pub use aggregator::LogAggregator;
pub use config::{ConfigError, EngineConfig, TriggerSettings};
pub use coordinator::Coordinator;
pub use error::EngineError;
pub use executor::{preflight, ResetExecutor, MAX_ATTEMPTS};
pub use report::{AccountReport, AccountRun, Tally, TriggerSummary};
pub use runner::{AccountRunner, Preview, RunnerDeps};
pub use scheduler::{SchedulerHandle, TimeSlotScheduler};
pub use settings::Settings;
pub use wiring::{build_coordinator, LiveConnector, LiveCoordinator};
