// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Inventory and eligibility preview

use anyhow::bail;
use clap::Args;
use refill_core::{Subscription, Trigger};
use refill_engine::{preflight, LiveCoordinator, Preview};

#[derive(Args)]
pub struct CheckArgs {}

pub async fn handle(_args: CheckArgs, coordinator: &LiveCoordinator) -> anyhow::Result<()> {
    let runner = coordinator.runner();
    let second_threshold = runner.config().trigger(Trigger::Second).threshold;
    let mut unreachable = 0;

    for account in coordinator.accounts() {
        println!("{} ({})", account.display_name(), account.masked_key());
        let previews = match runner.preview(account, Trigger::First).await {
            Ok(previews) => previews,
            Err(e) => {
                println!("  list subscriptions failed: {}", e);
                unreachable += 1;
                continue;
            }
        };
        if previews.is_empty() {
            println!("  no subscriptions");
        }

        for Preview {
            subscription,
            eligible,
            skip,
        } in previews
        {
            print!("  {}", describe(&subscription));
            if !eligible {
                println!(": not eligible");
                continue;
            }
            let second = preflight(&subscription, Trigger::Second, &second_threshold);
            println!(
                ": first {}, second {}",
                verdict(skip.as_ref()),
                verdict(second.as_ref())
            );
        }
    }

    if unreachable > 0 {
        bail!("{} account(s) could not be listed", unreachable);
    }
    Ok(())
}

fn describe(sub: &Subscription) -> String {
    let percent = sub
        .credit_percent()
        .map(|p| format!(" ({:.1}%)", p))
        .unwrap_or_default();
    format!(
        "#{} {} [{}] credits {:.2}/{:.2}{}, {} reset(s) left",
        sub.id,
        sub.name,
        sub.billing_type(),
        sub.current_credits,
        sub.credit_limit(),
        percent,
        sub.reset_times
    )
}

fn verdict(skip: Option<&refill_core::SkipReason>) -> String {
    match skip {
        Some(reason) => format!("would skip ({})", reason),
        None => "would reset".to_string(),
    }
}
