// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persisted execution status

use crate::output::{print_list, OutputFormat};
use clap::Args;
use refill_core::{ExecutionStatus, Trigger};
use refill_engine::LiveCoordinator;
use serde::Serialize;
use std::fmt;

#[derive(Args)]
pub struct StatusArgs {
    #[arg(long, value_enum, default_value_t)]
    pub format: OutputFormat,
}

#[derive(Serialize)]
pub(crate) struct AccountStatus {
    account: String,
    api_key: String,
    status: ExecutionStatus,
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = &self.status;
        writeln!(f, "{} ({}) on {}", self.account, self.api_key, s.today_date)?;
        for trigger in Trigger::ALL {
            match s.last_run_time(trigger).filter(|_| s.has_run(trigger)) {
                Some(at) => writeln!(f, "  {:<7} ran at {}", trigger, at.to_rfc3339())?,
                None => writeln!(f, "  {:<7} not run today", trigger)?,
            }
        }
        if s.last_reset_message.is_empty() {
            writeln!(f, "  last:   none")?;
        } else {
            let mark = if s.last_reset_success { "ok" } else { "failed" };
            writeln!(f, "  last:   {} ({})", s.last_reset_message, mark)?;
        }
        write!(f, "  consecutive failures: {}", s.consecutive_failures)?;
        if let (Some(before), Some(after)) = (s.credits_before_reset, s.credits_after_reset) {
            write!(f, "\n  credits: {:.2} -> {:.2}", before, after)?;
        }
        if let (Some(before), Some(after)) = (s.reset_times_before_reset, s.reset_times_after_reset) {
            write!(f, "\n  resets:  {} -> {}", before, after)?;
        }
        Ok(())
    }
}

pub fn handle(args: StatusArgs, coordinator: &LiveCoordinator) -> anyhow::Result<()> {
    let mut rows = Vec::new();
    for account in coordinator.accounts() {
        rows.push(AccountStatus {
            account: account.display_name().to_string(),
            api_key: account.masked_key(),
            status: coordinator.runner().status(account)?,
        });
    }

    if rows.is_empty() {
        println!("No active accounts");
        return Ok(());
    }
    print_list(&rows, args.format);
    Ok(())
}
