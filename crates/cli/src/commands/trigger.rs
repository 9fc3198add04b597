// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Manual trigger run

use anyhow::bail;
use clap::Args;
use refill_core::Trigger;
use refill_engine::LiveCoordinator;
use std::io::{BufRead, Write};

#[derive(Args)]
pub struct TriggerArgs {
    /// Which trigger to run (first or second)
    pub trigger: Trigger,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

pub async fn handle(args: TriggerArgs, coordinator: &LiveCoordinator) -> anyhow::Result<()> {
    if !args.yes {
        let prompt = format!(
            "Run the {} trigger now for {} account(s)? Type 'yes' to continue: ",
            args.trigger,
            coordinator.accounts().len()
        );
        let stdin = std::io::stdin();
        if !confirm(&prompt, stdin.lock(), std::io::stdout())? {
            println!("Aborted.");
            return Ok(());
        }
    }

    let summary = coordinator.run_trigger(args.trigger).await;
    for report in &summary.reports {
        println!("{}", report);
        for result in report.results() {
            println!("  {}", result);
        }
    }
    println!(
        "{}: {} succeeded, {} failed, {} skipped",
        summary.trigger, summary.succeeded, summary.failed, summary.skipped
    );

    if summary.failed > 0 {
        bail!("{} account(s) failed", summary.failed);
    }
    Ok(())
}

/// Ask `prompt` and accept only a literal "yes"
pub(crate) fn confirm(
    prompt: &str,
    mut input: impl BufRead,
    mut output: impl Write,
) -> std::io::Result<bool> {
    write!(output, "{}", prompt)?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("yes"))
}

#[cfg(test)]
#[path = "trigger_tests.rs"]
mod tests;
