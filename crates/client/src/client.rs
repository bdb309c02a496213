//! Blocking reqwest client (no Tokio runtime required).
//!
//! Covers both external calls: oracle auto-match and stock-sync submission.
//! One request per call; no automatic retry.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use stocksync_recon::AiSuggestions;

use crate::submission::SyncSubmission;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Oracle + sync endpoint client (blocking).
#[derive(Clone)]
pub struct SyncClient {
    http: reqwest::blocking::Client,
    oracle_url: Option<String>,
    sync_url: Option<String>,
    token: Option<String>,
}

/// Error type for boundary calls.
#[derive(Debug)]
pub enum ClientError {
    /// Endpoint URL missing from settings
    NotConfigured(String),
    /// Network error (connect, timeout, TLS)
    Network(String),
    /// HTTP error with status code
    Http(u16, String),
    /// Server rejected the request (4xx with message, or `success: false`)
    Validation(String),
    /// Body did not parse as the expected JSON shape
    MalformedResponse(String),
}

impl ClientError {
    /// Failures at the transport boundary. State on the caller's side must
    /// be left intact so the user can retry.
    pub fn is_transport_failure(&self) -> bool {
        !matches!(self, ClientError::NotConfigured(_))
    }
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientError::NotConfigured(what) => write!(f, "{} URL is not configured", what),
            ClientError::Network(msg) => write!(f, "Network error: {}", msg),
            ClientError::Http(code, msg) => write!(f, "HTTP {}: {}", code, msg),
            ClientError::Validation(msg) => write!(f, "Rejected: {}", msg),
            ClientError::MalformedResponse(msg) => write!(f, "Malformed response: {}", msg),
        }
    }
}

impl std::error::Error for ClientError {}

/// Connection options, usually filled from user settings.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub oracle_url: Option<String>,
    pub sync_url: Option<String>,
    pub token: Option<String>,
    pub timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            oracle_url: None,
            sync_url: None,
            token: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Acknowledgement from the sync endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncReceipt {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub updated: Option<u64>,
}

impl SyncClient {
    pub fn new(opts: ClientOptions) -> Result<Self, ClientError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(format!("stocksync/{}", env!("CARGO_PKG_VERSION")))
            .timeout(opts.timeout)
            .build()
            .map_err(|e| ClientError::Network(format!("cannot build HTTP client: {e}")))?;

        Ok(Self {
            http,
            oracle_url: opts.oracle_url,
            sync_url: opts.sync_url,
            token: opts.token,
        })
    }

    /// Ask the oracle for suggested correspondences for this user's shop.
    pub fn auto_match(&self, user_id: &str) -> Result<AiSuggestions, ClientError> {
        let url = self
            .oracle_url
            .as_deref()
            .ok_or_else(|| ClientError::NotConfigured("oracle".into()))?;

        let resp = self.post_json(url, &serde_json::json!({ "user_id": user_id }), None)?;
        let body = resp.text().map_err(|e| ClientError::Network(e.to_string()))?;
        let json: serde_json::Value = serde_json::from_str(&body)
            .map_err(|e| ClientError::MalformedResponse(e.to_string()))?;

        let suggestions = AiSuggestions::from_value(json)
            .map_err(|e| ClientError::MalformedResponse(e.to_string()))?;
        log::info!(
            "oracle returned {} linked, {} shopify-only, {} etsy-only suggestion(s)",
            suggestions.linked.len(),
            suggestions.shopify_only.len(),
            suggestions.etsy_only.len()
        );
        Ok(suggestions)
    }

    /// Submit original and current stock snapshots.
    ///
    /// The submission's `request_id` travels as the `Idempotency-Key` header
    /// so retries of the same attempt can be deduplicated by the receiver.
    pub fn submit_sync(&self, submission: &SyncSubmission) -> Result<SyncReceipt, ClientError> {
        let url = self
            .sync_url
            .as_deref()
            .ok_or_else(|| ClientError::NotConfigured("sync".into()))?;

        let body = serde_json::to_value(submission)
            .map_err(|e| ClientError::MalformedResponse(format!("cannot encode submission: {e}")))?;
        let resp = self.post_json(url, &body, Some(&submission.request_id))?;
        let text = resp.text().map_err(|e| ClientError::Network(e.to_string()))?;

        if text.trim().is_empty() {
            return Ok(SyncReceipt::default());
        }

        let receipt: SyncReceipt = serde_json::from_str(&text)
            .map_err(|e| ClientError::MalformedResponse(e.to_string()))?;

        if receipt.success == Some(false) {
            return Err(ClientError::Validation(
                receipt.message.unwrap_or_else(|| "sync endpoint reported failure".into()),
            ));
        }

        Ok(receipt)
    }

    // ── Internal helpers ────────────────────────────────────────────

    fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
        idempotency_key: Option<&str>,
    ) -> Result<reqwest::blocking::Response, ClientError> {
        log::debug!("POST {}", url);
        let mut req = self.http.post(url).json(body);
        if let Some(ref token) = self.token {
            req = req.bearer_auth(token);
        }
        if let Some(key) = idempotency_key {
            req = req.header("Idempotency-Key", key);
        }

        let response = req.send().map_err(|e| ClientError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let body = response.text().unwrap_or_default();
            if status == 422 || status == 400 {
                return Err(ClientError::Validation(body));
            }
            return Err(ClientError::Http(status, body));
        }

        Ok(response)
    }
}
