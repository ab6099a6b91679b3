//! HTTP feed client

use std::time::Duration;

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::{PushAck, RemoteError, RemoteSource};
use crate::config::Config;
use crate::models::{Collection, Quote};

/// `RemoteSource` backed by a JSON-over-HTTP feed
#[derive(Debug, Clone)]
pub struct HttpRemoteSource {
    client: reqwest::Client,
    url: String,
    fetch_limit: usize,
}

impl HttpRemoteSource {
    /// Create a client for the feed at `url`
    pub fn new(url: impl Into<String>, fetch_limit: usize, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("quotesync/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            url: url.into(),
            fetch_limit,
        })
    }

    /// Create a client from the application configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.remote_url.clone(),
            config.fetch_limit,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    fn unavailable(&self, reason: impl ToString) -> RemoteError {
        RemoteError::Unavailable {
            url: self.url.clone(),
            reason: reason.to_string(),
        }
    }

    fn push_failed(&self, reason: impl ToString) -> RemoteError {
        RemoteError::PushFailed {
            url: self.url.clone(),
            reason: reason.to_string(),
        }
    }
}

impl RemoteSource for HttpRemoteSource {
    async fn fetch_all(&self) -> Result<Collection, RemoteError> {
        debug!("Fetching remote quotes from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| self.unavailable(e))?;

        let status = response.status();
        if !status.is_success() {
            warn!("Remote feed {} answered {}", self.url, status);
            return Err(self.unavailable(format!("HTTP {}", status)));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| self.unavailable(format!("invalid JSON body: {}", e)))?;

        let quotes = parse_feed(&body, self.fetch_limit).map_err(|e| self.unavailable(e))?;
        info!("Fetched {} remote quote(s)", quotes.len());
        Ok(quotes)
    }

    async fn push(&self, quote: &Quote) -> Result<PushAck, RemoteError> {
        let payload = serde_json::json!({
            "title": quote.text,
            "body": quote.category,
        });

        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| self.push_failed(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(self.push_failed(format!("HTTP {}", status)));
        }

        // The ack body is informational; an unreadable one still counts as success
        let remote_id = response
            .json::<Value>()
            .await
            .ok()
            .and_then(|body| body.get("id").and_then(Value::as_u64));

        debug!("Pushed quote {:?} (remote id {:?})", quote.text, remote_id);
        Ok(PushAck { remote_id })
    }

    fn endpoint(&self) -> &str {
        &self.url
    }
}

/// Narrow a feed payload into quotes
///
/// Only the first `limit` items are considered. Items without a non-empty
/// string `title` are skipped.
pub fn parse_feed(body: &Value, limit: usize) -> std::result::Result<Collection, String> {
    let items = body
        .as_array()
        .ok_or_else(|| "expected a JSON array of items".to_string())?;

    let quotes = items
        .iter()
        .take(limit)
        .filter_map(|item| {
            let title = item.get("title").and_then(Value::as_str).map(str::trim);
            match title {
                Some(title) if !title.is_empty() => Some(Quote::from_server(title)),
                _ => {
                    debug!("Skipping remote item without a usable title");
                    None
                }
            }
        })
        .collect();

    Ok(quotes)
}
