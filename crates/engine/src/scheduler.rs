// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Time-slot scheduler
//!
//! On start: one inventory refresh and one trigger check, then a tick every
//! `tick_interval`. A trigger fires when the local (hour, minute) matches its
//! configured mark exactly; same-day re-runs are stopped by the persisted
//! status, not here. A process that is down at the trigger minute misses it.

use crate::coordinator::Coordinator;
use chrono::{DateTime, Timelike, Utc};
use chrono_tz::Tz;
use refill_adapters::BillingConnector;
use refill_core::{Clock, IdGen, Trigger};
use std::sync::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

pub struct TimeSlotScheduler<K, C: Clock, I: IdGen> {
    coordinator: Coordinator<K, C, I>,
    tz: Tz,
    last_refresh: Option<DateTime<Utc>>,
}

impl<K, C, I> TimeSlotScheduler<K, C, I>
where
    K: BillingConnector,
    C: Clock,
    I: IdGen,
{
    pub fn new(coordinator: Coordinator<K, C, I>) -> Self {
        let tz = coordinator.runner().tz();
        Self {
            coordinator,
            tz,
            last_refresh: None,
        }
    }

    /// Triggers whose mark equals `now`'s local hour and minute
    pub fn due_triggers(&self, now: DateTime<Utc>) -> Vec<Trigger> {
        let local = now.with_timezone(&self.tz);
        let config = self.coordinator.runner().config();
        Trigger::ALL
            .into_iter()
            .filter(|t| {
                let settings = config.trigger(*t);
                settings.enabled && settings.hour == local.hour() && settings.minute == local.minute()
            })
            .collect()
    }

    fn refresh_due(&self, now: DateTime<Utc>) -> bool {
        let interval = self.coordinator.runner().config().refresh_interval;
        match self.last_refresh {
            None => true,
            Some(last) => (now - last).to_std().map(|e| e >= interval).unwrap_or(false),
        }
    }

    /// One scheduler step; returns the triggers that fired
    pub async fn tick(&mut self) -> Vec<Trigger> {
        let now = self.coordinator.runner().clock().now();
        if self.refresh_due(now) {
            self.coordinator.refresh_all().await;
            self.last_refresh = Some(now);
        }

        let due = self.due_triggers(now);
        for trigger in &due {
            tracing::info!(%trigger, local = %now.with_timezone(&self.tz), "trigger time reached");
            self.coordinator.run_trigger(*trigger).await;
        }
        due
    }

    /// Spawn the loop on the current runtime
    pub fn start(self) -> SchedulerHandle {
        let (stop_tx, stop_rx) = watch::channel(false);
        let task = tokio::spawn(self.run(stop_rx));
        SchedulerHandle {
            stop: stop_tx,
            task: Mutex::new(Some(task)),
        }
    }

    async fn run(mut self, mut stop: watch::Receiver<bool>) {
        let config = self.coordinator.runner().config();
        tracing::info!(
            timezone = %self.tz,
            first = %describe(config.first.enabled, &config.first.time_label()),
            second = %describe(config.second.enabled, &config.second.time_label()),
            accounts = self.coordinator.accounts().len(),
            "scheduler started"
        );

        let mut interval = tokio::time::interval(config.tick_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            // The first interval tick completes immediately
            tokio::select! {
                biased;
                changed = stop.changed() => {
                    if changed.is_err() || *stop.borrow() {
                        break;
                    }
                }
                _ = interval.tick() => {
                    // A running tick is never interrupted by stop
                    self.tick().await;
                }
            }
        }

        self.coordinator.runner().aggregator().flush();
        tracing::info!("scheduler stopped");
    }
}

fn describe(enabled: bool, time: &str) -> String {
    if enabled {
        time.to_string()
    } else {
        format!("{} (disabled)", time)
    }
}

/// Control handle for a running scheduler
pub struct SchedulerHandle {
    stop: watch::Sender<bool>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl SchedulerHandle {
    /// Request a stop. Idempotent.
    pub fn stop(&self) {
        self.stop.send_replace(true);
    }

    pub fn is_running(&self) -> bool {
        self.task
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .is_some_and(|t| !t.is_finished())
    }

    /// Stop and wait for the loop to exit
    pub async fn shutdown(&self) {
        self.stop();
        let task = self.task.lock().unwrap_or_else(|e| e.into_inner()).take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                tracing::error!(error = %e, "scheduler task ended abnormally");
            }
        }
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
