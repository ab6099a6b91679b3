//! Session cache
//!
//! Remembers the last quote shown during this process. Not used for the
//! correctness of the collection; losing it only means nothing to restore.

use tracing::warn;

use super::kv::{KeyValueStore, MemoryKeyValue};
use crate::models::Quote;

/// Key of the last-viewed quote record
pub const LAST_QUOTE_KEY: &str = "lastQuote";

/// Volatile last-viewed quote cache
pub struct SessionCache {
    kv: Box<dyn KeyValueStore>,
}

impl Default for SessionCache {
    fn default() -> Self {
        Self::new(MemoryKeyValue::new())
    }
}

impl SessionCache {
    pub fn new(kv: impl KeyValueStore + 'static) -> Self {
        Self { kv: Box::new(kv) }
    }

    /// Record the quote that was just displayed
    pub fn set_last(&mut self, quote: &Quote) {
        let json = match serde_json::to_string(quote) {
            Ok(json) => json,
            Err(e) => {
                warn!("Failed to serialize last viewed quote: {}", e);
                return;
            }
        };

        if let Err(e) = self.kv.set(LAST_QUOTE_KEY, &json) {
            warn!("Failed to record last viewed quote: {}", e);
        }
    }

    /// The quote displayed last in this session, if any
    pub fn get_last(&self) -> Option<Quote> {
        let raw = self.kv.get(LAST_QUOTE_KEY).ok()??;
        serde_json::from_str(&raw).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_session() {
        let cache = SessionCache::default();
        assert!(cache.get_last().is_none());
    }

    #[test]
    fn test_set_and_get_last() {
        let mut cache = SessionCache::default();
        let quote = Quote::new("Carpe diem.", "Life");

        cache.set_last(&quote);
        assert_eq!(cache.get_last(), Some(quote));

        let newer = Quote::new("Memento mori.", "Life");
        cache.set_last(&newer);
        assert_eq!(cache.get_last(), Some(newer));
    }

    #[test]
    fn test_new_session_starts_empty() {
        let mut cache = SessionCache::default();
        cache.set_last(&Quote::new("Carpe diem.", "Life"));

        let restarted = SessionCache::default();
        assert!(restarted.get_last().is_none());
    }

    #[test]
    fn test_corrupt_record_reads_as_absent() {
        let mut kv = MemoryKeyValue::new();
        kv.set(LAST_QUOTE_KEY, "[1, 2").unwrap();
        let cache = SessionCache::new(kv);
        assert!(cache.get_last().is_none());
    }
}
