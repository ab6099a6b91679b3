//! Quote collection persistence
//!
//! Stores the collection and user preferences as JSON records in a
//! `KeyValueStore`. Loading never fails: an absent or unreadable collection
//! record yields the seed collection.
//!
//! Records:
//! - `quotes` - the JSON array of quotes
//! - `selectedCategory` - the active category filter (JSON string)

use std::collections::HashSet;

use tracing::{debug, warn};

use super::error::{StorageError, StorageResult};
use super::kv::KeyValueStore;
use crate::models::{Collection, Quote};

/// Key of the collection record
pub const QUOTES_KEY: &str = "quotes";

/// Key of the category filter preference
pub const SELECTED_CATEGORY_KEY: &str = "selectedCategory";

/// Durable storage for the collection and preferences
pub struct QuotePersistence {
    kv: Box<dyn KeyValueStore>,
}

impl QuotePersistence {
    /// Create a persistence handler over the given backend
    pub fn new(kv: impl KeyValueStore + 'static) -> Self {
        Self { kv: Box::new(kv) }
    }

    /// Load the collection, falling back to the seed collection
    pub fn load(&self) -> Collection {
        let raw = match self.kv.get(QUOTES_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("No stored collection, using seed quotes");
                return Collection::seed();
            }
            Err(e) => {
                warn!("Failed to read stored collection, using seed quotes: {}", e);
                return Collection::seed();
            }
        };

        let stored = match serde_json::from_str::<Collection>(&raw) {
            Ok(collection) => collection,
            Err(e) => {
                warn!("Stored collection is corrupt, using seed quotes: {}", e);
                return Collection::seed();
            }
        };

        if let Err(e) = stored.iter().try_for_each(Quote::validate) {
            warn!("Stored collection has an invalid quote, using seed quotes: {}", e);
            return Collection::seed();
        }

        dedup_texts(stored)
    }

    /// Overwrite the stored collection
    pub fn save(&mut self, collection: &Collection) -> StorageResult<()> {
        let json = serde_json::to_string(collection).map_err(|source| StorageError::Serialize {
            key: QUOTES_KEY.to_string(),
            source,
        })?;
        self.kv.set(QUOTES_KEY, &json)
    }

    /// Read a preference; absent or unreadable records read as `None`
    pub fn load_preference(&self, key: &str) -> Option<String> {
        let raw = match self.kv.get(key) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!("Failed to read preference '{}': {}", key, e);
                return None;
            }
        };

        match serde_json::from_str::<String>(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring corrupt preference '{}': {}", key, e);
                None
            }
        }
    }

    /// Write a preference
    pub fn save_preference(&mut self, key: &str, value: &str) -> StorageResult<()> {
        let json = serde_json::to_string(value).map_err(|source| StorageError::Serialize {
            key: key.to_string(),
            source,
        })?;
        self.kv.set(key, &json)
    }
}

/// Keep the first quote for each text
fn dedup_texts(collection: Collection) -> Collection {
    if !collection.has_duplicate_texts() {
        return collection;
    }

    let before = collection.len();
    let mut seen = HashSet::new();
    let deduped: Collection = collection
        .into_iter()
        .filter(|q| seen.insert(q.text.clone()))
        .collect();
    warn!(
        "Dropped {} stored quote(s) with repeated text",
        before - deduped.len()
    );
    deduped
}
