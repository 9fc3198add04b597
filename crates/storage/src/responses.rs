// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Debug dumps of remote exchanges under `responses/`

use crate::json::{sanitize_key, write_atomic};
use refill_core::{DebugExchange, ResponseSink};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Writes each exchange to
/// `responses/<METHOD>_<endpoint>_<timestamp>_<pid>-<seq>.json`
///
/// The pid and per-log sequence keep concurrent dumps of the same endpoint
/// in the same millisecond apart.
#[derive(Clone, Debug)]
pub struct ResponseLog {
    dir: PathBuf,
    seq: Arc<AtomicU64>,
}

impl ResponseLog {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            dir: data_dir.join("responses"),
            seq: Arc::new(AtomicU64::new(0)),
        }
    }

    pub(crate) fn path_for(&self, exchange: &DebugExchange, seq: u64) -> PathBuf {
        let name = format!(
            "{}_{}_{}_{}-{}.json",
            sanitize_key(&exchange.method.to_uppercase()),
            sanitize_key(&exchange.endpoint),
            exchange.timestamp.format("%Y%m%d_%H%M%S%.3f"),
            std::process::id(),
            seq,
        );
        self.dir.join(name)
    }
}

impl ResponseSink for ResponseLog {
    fn save_debug_response(&self, exchange: &DebugExchange) {
        let body = serde_json::from_str::<serde_json::Value>(&exchange.body)
            .unwrap_or_else(|_| serde_json::Value::String(exchange.body.clone()));
        let document = json!({
            "method": exchange.method,
            "endpoint": exchange.endpoint,
            "status": exchange.status,
            "timestamp": exchange.timestamp,
            "body": body,
        });

        let path = self.path_for(exchange, self.seq.fetch_add(1, Ordering::Relaxed));
        let result = serde_json::to_vec_pretty(&document)
            .map_err(std::io::Error::other)
            .and_then(|bytes| write_atomic(&path, &bytes));
        if let Err(e) = result {
            tracing::warn!(path = %path.display(), error = %e, "failed to save response dump");
        }
    }
}

#[cfg(test)]
#[path = "responses_tests.rs"]
mod tests;
