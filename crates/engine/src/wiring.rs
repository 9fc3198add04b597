// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Production wiring from settings

use crate::coordinator::Coordinator;
use crate::error::EngineError;
use crate::runner::{AccountRunner, RunnerDeps};
use crate::settings::Settings;
use refill_adapters::{HttpConnector, TracedConnector};
use refill_core::{NullSink, ResponseSink, SystemClock, UuidIdGen};
use refill_storage::{FileRunLock, ResponseLog, StatusStore};
use std::sync::Arc;

pub type LiveConnector = TracedConnector<HttpConnector>;
pub type LiveCoordinator = Coordinator<LiveConnector, SystemClock, UuidIdGen>;

/// Validate settings and build the coordinator over the HTTP client
pub fn build_coordinator(settings: &Settings) -> Result<LiveCoordinator, EngineError> {
    settings.validate()?;
    let data_dir = settings.data_dir();

    let sink: Arc<dyn ResponseSink> = if settings.save_responses {
        Arc::new(ResponseLog::new(&data_dir))
    } else {
        Arc::new(NullSink)
    };
    let connector = TracedConnector::new(HttpConnector::new(
        settings.base_url.clone(),
        settings.request_timeout,
        sink,
    ));

    let runner = AccountRunner::new(
        RunnerDeps {
            connector,
            store: StatusStore::open(&data_dir)?,
            locks: FileRunLock::new(
                &data_dir,
                settings.engine.lock.clone(),
                SystemClock,
                UuidIdGen,
            ),
            clock: SystemClock,
        },
        settings.engine.clone(),
    )?;

    tracing::info!(
        data_dir = %data_dir.display(),
        base_url = %settings.base_url,
        accounts = settings.active_accounts().len(),
        "engine configured"
    );
    Ok(Coordinator::new(runner, settings.accounts.clone()))
}

#[cfg(test)]
#[path = "wiring_tests.rs"]
mod tests;
