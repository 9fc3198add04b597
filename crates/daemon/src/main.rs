// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Refill daemon (refilld)
//!
//! Background process that checks the configured time slots every tick and
//! resets subscription credits when a slot comes due.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod lifecycle;

use std::path::PathBuf;

use clap::Parser;
use refill_engine::Settings;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info};

use crate::lifecycle::{DaemonPaths, LifecycleError};

#[derive(Parser, Debug)]
#[command(name = "refilld", version, about = "Scheduled subscription credit refills")]
struct Args {
    /// Config file (defaults to the user config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the data directory for status, locks and logs
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(dir) = args.data_dir {
        settings.data_dir = Some(dir);
    }
    let paths = DaemonPaths::under(&settings.data_dir());

    // Write startup marker (before tracing setup, so it lands even if logging fails)
    lifecycle::write_startup_marker(&paths)?;
    let log_guard = setup_logging(&paths)?;

    info!(
        data_dir = %settings.data_dir().display(),
        "starting refilld"
    );

    let daemon = match lifecycle::startup(&settings, &paths) {
        Ok(d) => d,
        Err(e) => {
            // Tracing is non-blocking and may not flush in time
            lifecycle::write_startup_error(&paths, &e);
            error!("failed to start daemon: {}", e);
            drop(log_guard);
            return Err(e.into());
        }
    };

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    info!("daemon ready");
    println!("READY");

    tokio::select! {
        _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
        _ = sigint.recv() => info!("received SIGINT, shutting down"),
    }

    daemon.shutdown().await;
    info!("daemon stopped");
    Ok(())
}

fn setup_logging(
    paths: &DaemonPaths,
) -> Result<tracing_appender::non_blocking::WorkerGuard, LifecycleError> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    std::fs::create_dir_all(&paths.log_dir)?;

    let file_appender = tracing_appender::rolling::daily(&paths.log_dir, "refilld.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking))
        .with(fmt::layer().with_writer(std::io::stderr).with_ansi(false))
        .init();

    Ok(guard)
}
