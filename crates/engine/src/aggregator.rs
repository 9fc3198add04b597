// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Coalesces repetitive status lines into periodic summaries

use chrono::{DateTime, Utc};
use refill_core::Clock;
use std::sync::Mutex;
use std::time::Duration;

struct Buffer {
    lines: Vec<String>,
    last_flush: DateTime<Utc>,
}

/// Buffers lines and emits them as one `info` event once `interval` has
/// passed since the previous emission
pub struct LogAggregator<C: Clock> {
    clock: C,
    interval: Duration,
    buffer: Mutex<Buffer>,
}

impl<C: Clock> LogAggregator<C> {
    pub fn new(clock: C, interval: Duration) -> Self {
        let last_flush = clock.now();
        Self {
            clock,
            interval,
            buffer: Mutex::new(Buffer {
                lines: Vec::new(),
                last_flush,
            }),
        }
    }

    /// Buffer a line; returns the summary if this push made one due
    pub fn push(&self, line: impl Into<String>) -> Option<String> {
        let now = self.clock.now();
        let mut buffer = self.buffer.lock().unwrap_or_else(|e| e.into_inner());
        buffer.lines.push(line.into());

        let elapsed = (now - buffer.last_flush).to_std().unwrap_or(Duration::ZERO);
        if elapsed < self.interval {
            return None;
        }
        Some(emit(&mut buffer, now))
    }

    /// Emit whatever is buffered
    pub fn flush(&self) -> Option<String> {
        let now = self.clock.now();
        let mut buffer = self.buffer.lock().unwrap_or_else(|e| e.into_inner());
        if buffer.lines.is_empty() {
            return None;
        }
        Some(emit(&mut buffer, now))
    }

    pub fn pending(&self) -> usize {
        self.buffer
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .lines
            .len()
    }
}

fn emit(buffer: &mut Buffer, now: DateTime<Utc>) -> String {
    let summary = buffer.lines.join("; ");
    tracing::info!(count = buffer.lines.len(), "status summary: {}", summary);
    buffer.lines.clear();
    buffer.last_flush = now;
    summary
}

#[cfg(test)]
#[path = "aggregator_tests.rs"]
mod tests;
