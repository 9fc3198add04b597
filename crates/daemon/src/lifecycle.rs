// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: startup and shutdown.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use fs2::FileExt;
use refill_engine::{build_coordinator, EngineError, SchedulerHandle, Settings, TimeSlotScheduler};
use thiserror::Error;
use tracing::{info, warn};

/// Filesystem locations owned by the daemon
#[derive(Debug, Clone)]
pub struct DaemonPaths {
    /// Path to lock/PID file
    pub lock_path: PathBuf,
    /// Directory holding the daily rolling log
    pub log_dir: PathBuf,
}

impl DaemonPaths {
    pub fn under(data_dir: &Path) -> Self {
        Self {
            lock_path: data_dir.join("refilld.pid"),
            log_dir: data_dir.join("logs"),
        }
    }

    /// Log file the startup marker and startup errors are appended to
    pub fn startup_log(&self) -> PathBuf {
        self.log_dir.join("startup.log")
    }
}

/// Daemon state during operation
pub struct DaemonState {
    pub paths: DaemonPaths,
    // NOTE(lifetime): Held to maintain exclusive file lock; released on drop
    #[allow(dead_code)]
    lock_file: File,
    scheduler: SchedulerHandle,
    /// When daemon started
    pub start_time: Instant,
}

impl DaemonState {
    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    /// Stop the scheduler and release the PID file
    ///
    /// A tick in progress finishes before this returns.
    pub async fn shutdown(self) {
        info!("shutting down daemon");
        self.scheduler.shutdown().await;

        if self.paths.lock_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.paths.lock_path) {
                warn!("failed to remove PID file: {}", e);
            }
        }

        info!(
            uptime_secs = self.start_time.elapsed().as_secs(),
            "daemon shutdown complete"
        );
    }
}

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("failed to acquire lock: daemon already running?")]
    LockFailed(#[source] std::io::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Start the daemon: take the PID lock, build the engine, start the scheduler
pub fn startup(settings: &Settings, paths: &DaemonPaths) -> Result<DaemonState, LifecycleError> {
    if let Some(parent) = paths.lock_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Acquire lock file FIRST - prevents two daemons on one data dir
    let mut lock_file = std::fs::OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(&paths.lock_path)?;
    lock_file
        .try_lock_exclusive()
        .map_err(LifecycleError::LockFailed)?;

    match startup_inner(settings, &mut lock_file) {
        Ok(scheduler) => {
            info!(
                accounts = settings.active_accounts().len(),
                timezone = %settings.engine.timezone,
                "daemon started"
            );
            Ok(DaemonState {
                paths: paths.clone(),
                lock_file,
                scheduler,
                start_time: Instant::now(),
            })
        }
        Err(e) => {
            // We hold the lock, so the PID file is ours to remove
            let _ = std::fs::remove_file(&paths.lock_path);
            Err(e)
        }
    }
}

fn startup_inner(
    settings: &Settings,
    lock_file: &mut File,
) -> Result<SchedulerHandle, LifecycleError> {
    lock_file.set_len(0)?;
    writeln!(lock_file, "{}", std::process::id())?;

    // Validation happens here, before the scheduler ever ticks
    let coordinator = build_coordinator(settings)?;
    for account in coordinator.accounts() {
        info!(
            account = %account.display_name(),
            api_key = %account.masked_key(),
            "account loaded"
        );
    }

    Ok(TimeSlotScheduler::new(coordinator).start())
}

/// Startup marker prefix written to the startup log before anything else.
/// Full format: "--- refilld: starting (pid: 12345) ---"
pub const STARTUP_MARKER_PREFIX: &str = "--- refilld: starting (pid: ";

/// Append the startup marker synchronously
pub fn write_startup_marker(paths: &DaemonPaths) -> Result<(), LifecycleError> {
    std::fs::create_dir_all(&paths.log_dir)?;
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(paths.startup_log())?;
    writeln!(file, "{}{}) ---", STARTUP_MARKER_PREFIX, std::process::id())?;
    Ok(())
}

/// Write a startup error synchronously; the non-blocking writer may not flush in time
pub fn write_startup_error(paths: &DaemonPaths, error: &dyn std::fmt::Display) {
    let Ok(mut file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(paths.startup_log())
    else {
        return;
    };
    let _ = writeln!(file, "ERROR failed to start daemon: {}", error);
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
