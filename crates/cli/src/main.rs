// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! refill - operator CLI for the credit refill engine

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{check, status, trigger};
use refill_engine::Settings;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "refill",
    version,
    about = "refill resets subscription credits on a schedule or on demand"
)]
struct Cli {
    /// Config file (defaults to the user config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the data directory for status and locks
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one trigger now, skipping the time-of-day check
    Trigger(trigger::TriggerArgs),
    /// List inventory and preview what each trigger would do
    Check(check::CheckArgs),
    /// Show persisted execution status per account
    Status(status::StatusArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging();

    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir {
        settings.data_dir = Some(dir);
    }
    let coordinator = refill_engine::build_coordinator(&settings)?;

    match cli.command {
        Commands::Trigger(args) => trigger::handle(args, &coordinator).await,
        Commands::Check(args) => check::handle(args, &coordinator).await,
        Commands::Status(args) => status::handle(args, &coordinator),
    }
}

fn setup_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
