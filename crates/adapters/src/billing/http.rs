// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP billing client
//!
//! `ureq` is blocking, so every request runs on `spawn_blocking`. Every
//! exchange, success or not, is handed to the response sink.

use super::{BillingApi, BillingConnector, BillingError, ResetAck};
use async_trait::async_trait;
use chrono::Utc;
use refill_core::{Account, DebugExchange, NullSink, ResponseSink, Subscription, SubscriptionId};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const LIST_ENDPOINT: &str = "api/subscription";
const RESET_ENDPOINT: &str = "api/reset-credits";

/// Client bound to one account's API key
#[derive(Clone)]
pub struct HttpBillingClient {
    agent: ureq::Agent,
    base_url: String,
    api_key: String,
    sink: Arc<dyn ResponseSink>,
}

impl HttpBillingClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build();
        Self {
            agent: config.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            sink: Arc::new(NullSink),
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn ResponseSink>) -> Self {
        self.sink = sink;
        self
    }

    async fn post(&self, endpoint: String) -> Result<(u16, String), BillingError> {
        let agent = self.agent.clone();
        let url = format!("{}/{}", self.base_url, endpoint);
        let api_key = self.api_key.clone();

        let (status, body) = tokio::task::spawn_blocking(move || {
            let mut response = agent
                .post(&url)
                .header("Authorization", &api_key)
                .header("Content-Type", "application/json")
                .send_empty()
                .map_err(|e| BillingError::Transport(e.to_string()))?;
            let status = response.status().as_u16();
            let body = response
                .body_mut()
                .read_to_string()
                .map_err(|e| BillingError::Transport(format!("failed to read response: {}", e)))?;
            Ok::<_, BillingError>((status, body))
        })
        .await
        .map_err(|e| BillingError::Transport(format!("task join error: {}", e)))??;

        self.sink.save_debug_response(&DebugExchange {
            method: "POST".to_string(),
            endpoint,
            status,
            body: body.clone(),
            timestamp: Utc::now(),
        });

        Ok((status, body))
    }
}

#[async_trait]
impl BillingApi for HttpBillingClient {
    async fn list_subscriptions(&self) -> Result<Vec<Subscription>, BillingError> {
        let (status, body) = self.post(LIST_ENDPOINT.to_string()).await?;
        decode_subscriptions(status, &body)
    }

    async fn reset(&self, id: SubscriptionId) -> Result<ResetAck, BillingError> {
        let (status, body) = self.post(format!("{}/{}", RESET_ENDPOINT, id)).await?;
        decode_reset(status, &body)
    }
}

/// Connects accounts to one billing platform
#[derive(Clone)]
pub struct HttpConnector {
    base_url: String,
    timeout: Duration,
    sink: Arc<dyn ResponseSink>,
}

impl HttpConnector {
    pub fn new(base_url: impl Into<String>, timeout: Duration, sink: Arc<dyn ResponseSink>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout,
            sink,
        }
    }
}

impl BillingConnector for HttpConnector {
    type Api = HttpBillingClient;

    fn connect(&self, account: &Account) -> HttpBillingClient {
        HttpBillingClient::new(self.base_url.clone(), account.api_key.clone(), self.timeout)
            .with_sink(Arc::clone(&self.sink))
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    #[serde(rename = "type")]
    kind: String,
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    code: serde_json::Value,
    #[serde(default)]
    message: String,
}

impl From<ErrorDetail> for BillingError {
    fn from(detail: ErrorDetail) -> Self {
        let code = match detail.code {
            serde_json::Value::String(s) => s,
            serde_json::Value::Null => String::new(),
            other => other.to_string(),
        };
        BillingError::Remote {
            code,
            message: detail.message,
        }
    }
}

#[derive(Deserialize)]
struct ResetBody {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: String,
    #[serde(default)]
    error: Option<ErrorDetail>,
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Structured platform error if the body carries one, else a status error
pub(crate) fn error_from_body(status: u16, body: &str) -> BillingError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) if envelope.kind == "error" => envelope.error.into(),
        _ => BillingError::Status {
            status,
            body: body.to_string(),
        },
    }
}

pub(crate) fn decode_subscriptions(status: u16, body: &str) -> Result<Vec<Subscription>, BillingError> {
    if !is_success(status) {
        return Err(error_from_body(status, body));
    }
    serde_json::from_str(body).map_err(|e| BillingError::Decode(e.to_string()))
}

pub(crate) fn decode_reset(status: u16, body: &str) -> Result<ResetAck, BillingError> {
    if !is_success(status) {
        return Err(error_from_body(status, body));
    }
    match serde_json::from_str::<ResetBody>(body) {
        Ok(ResetBody {
            error: Some(detail),
            ..
        }) => Err(detail.into()),
        Ok(reset) => Ok(ResetAck {
            success: reset.success,
            message: reset.message,
        }),
        Err(_) => Ok(ResetAck {
            success: true,
            message: "reset request sent".to_string(),
        }),
    }
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
