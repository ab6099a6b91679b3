//! In-process feed
//!
//! A `RemoteSource` whose items live in memory. Pushed quotes are recorded
//! but do not show up in later fetches, matching feeds that accept writes
//! without storing them.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use super::{PushAck, RemoteError, RemoteSource, DEFAULT_FETCH_LIMIT};
use crate::models::{Collection, Quote};

const MEMORY_ENDPOINT: &str = "memory://feed";

/// `RemoteSource` backed by an in-memory list of titles
#[derive(Debug)]
pub struct MemoryRemoteSource {
    feed: Mutex<Vec<String>>,
    pushed: Mutex<Vec<Quote>>,
    rejected: Mutex<HashSet<String>>,
    available: AtomicBool,
    fetch_count: AtomicUsize,
    fetch_limit: usize,
}

impl Default for MemoryRemoteSource {
    fn default() -> Self {
        Self::new(Vec::<String>::new())
    }
}

impl MemoryRemoteSource {
    /// Create a feed serving `titles`
    pub fn new<I, S>(titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            feed: Mutex::new(titles.into_iter().map(Into::into).collect()),
            pushed: Mutex::new(Vec::new()),
            rejected: Mutex::new(HashSet::new()),
            available: AtomicBool::new(true),
            fetch_count: AtomicUsize::new(0),
            fetch_limit: DEFAULT_FETCH_LIMIT,
        }
    }

    /// Simulate the feed going down or coming back
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Make pushes of the quote with this text fail
    pub fn reject_push(&self, text: impl Into<String>) {
        lock(&self.rejected).insert(text.into());
    }

    /// Replace the served titles
    pub fn set_feed<I, S>(&self, titles: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        *lock(&self.feed) = titles.into_iter().map(Into::into).collect();
    }

    /// Quotes accepted so far, in push order
    pub fn pushed(&self) -> Vec<Quote> {
        lock(&self.pushed).clone()
    }

    /// Number of fetches served or refused
    pub fn fetch_count(&self) -> usize {
        self.fetch_count.load(Ordering::SeqCst)
    }
}

impl RemoteSource for MemoryRemoteSource {
    async fn fetch_all(&self) -> Result<Collection, RemoteError> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);

        if !self.available.load(Ordering::SeqCst) {
            return Err(RemoteError::Unavailable {
                url: MEMORY_ENDPOINT.to_string(),
                reason: "feed offline".to_string(),
            });
        }

        let feed = lock(&self.feed);
        Ok(feed
            .iter()
            .take(self.fetch_limit)
            .map(|title| Quote::from_server(title.as_str()))
            .collect())
    }

    async fn push(&self, quote: &Quote) -> Result<PushAck, RemoteError> {
        if !self.available.load(Ordering::SeqCst) || lock(&self.rejected).contains(&quote.text) {
            return Err(RemoteError::PushFailed {
                url: MEMORY_ENDPOINT.to_string(),
                reason: "rejected".to_string(),
            });
        }

        let mut pushed = lock(&self.pushed);
        pushed.push(quote.clone());
        Ok(PushAck {
            remote_id: Some(pushed.len() as u64),
        })
    }

    fn endpoint(&self) -> &str {
        MEMORY_ENDPOINT
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fetch_caps_and_tags_items() {
        let feed = MemoryRemoteSource::new((0..8).map(|i| format!("title {}", i)));
        let quotes = feed.fetch_all().await.unwrap();

        assert_eq!(quotes.len(), DEFAULT_FETCH_LIMIT);
        assert!(quotes.iter().all(|q| q.category == "Server"));
        assert_eq!(feed.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_unavailable() {
        let feed = MemoryRemoteSource::new(["a"]);
        feed.set_available(false);

        assert!(matches!(
            feed.fetch_all().await,
            Err(RemoteError::Unavailable { .. })
        ));
        assert!(matches!(
            feed.push(&Quote::new("x", "y")).await,
            Err(RemoteError::PushFailed { .. })
        ));
        assert_eq!(feed.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_push_records_and_rejects() {
        let feed = MemoryRemoteSource::default();
        feed.reject_push("bad");

        let ack = feed.push(&Quote::new("good", "Life")).await.unwrap();
        assert_eq!(ack.remote_id, Some(1));
        assert!(feed.push(&Quote::new("bad", "Life")).await.is_err());

        assert_eq!(feed.pushed(), vec![Quote::new("good", "Life")]);
        // Pushed quotes are not served back
        assert!(feed.fetch_all().await.unwrap().is_empty());
    }
}
