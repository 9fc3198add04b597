// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Debug capture of raw remote exchanges

use chrono::{DateTime, Utc};

/// One request/response pair as seen on the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugExchange {
    pub method: String,
    pub endpoint: String,
    pub status: u16,
    pub body: String,
    pub timestamp: DateTime<Utc>,
}

/// Receives every remote exchange. Implementations must not fail the call
/// that produced the exchange.
pub trait ResponseSink: Send + Sync {
    fn save_debug_response(&self, exchange: &DebugExchange);
}

/// Sink that drops everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl ResponseSink for NullSink {
    fn save_debug_response(&self, _exchange: &DebugExchange) {}
}
