//! Remote quote feed
//!
//! The feed is the authoritative side of a sync. It exposes a list of items
//! (each with at least a `title`) and accepts new items one at a time.
//!
//! ## Protocol
//!
//! - `GET <url>` returns a JSON array; only the first few items are used and
//!   each becomes `{ text: title, category: "Server" }`
//! - `POST <url>` with `{ "title": text, "body": category }` uploads a quote
//!
//! Fetch errors are `RemoteError::Unavailable` and mean "no remote data this
//! cycle". Push errors are `RemoteError::PushFailed` and are never retried.

mod http;
mod memory;

use std::future::Future;

use thiserror::Error;

use crate::models::{Collection, Quote};

pub use http::{parse_feed, HttpRemoteSource};
pub use memory::MemoryRemoteSource;

/// Number of remote items used per fetch
pub const DEFAULT_FETCH_LIMIT: usize = 5;

/// Errors talking to the remote feed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// Fetch failed: network error, non-2xx status or unusable payload
    #[error("Remote feed unavailable ({url}): {reason}")]
    Unavailable { url: String, reason: String },

    /// Upload of one quote failed
    #[error("Failed to push quote to {url}: {reason}")]
    PushFailed { url: String, reason: String },
}

/// Acknowledgement of an accepted push
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PushAck {
    /// Identifier the feed assigned, when it reports one
    pub remote_id: Option<u64>,
}

/// Read/write access to a quote feed
pub trait RemoteSource: Send + Sync {
    /// Fetch the remote collection, already narrowed into quotes
    fn fetch_all(&self) -> impl Future<Output = Result<Collection, RemoteError>> + Send;

    /// Upload one quote, at most once
    fn push(&self, quote: &Quote) -> impl Future<Output = Result<PushAck, RemoteError>> + Send;

    /// Human-readable location of the feed, for logs and status output
    fn endpoint(&self) -> &str;
}
