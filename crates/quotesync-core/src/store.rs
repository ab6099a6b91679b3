//! Unified storage interface
//!
//! The `QuoteStore` owns the in-memory collection and keeps it in step with:
//! - durable persistence (collection + selected category)
//! - the session cache (last viewed quote)
//! - the category index
//!
//! Every mutation writes the new collection first and only then swaps it into
//! memory, so a failed write leaves the last good state in place.
//!
//! ## Usage
//!
//! ```ignore
//! let mut store = QuoteStore::open(&config);
//!
//! store.add(Quote::from_input("Stay hungry.", "Motivation")?)?;
//! let view = store.filtered("Motivation");
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{Config, ImportPolicy};
use crate::index::{self, CategorySet, CollectionIndex, ALL_CATEGORIES};
use crate::models::{Collection, Quote, QuoteError};
use crate::storage::kv::atomic_write;
use crate::storage::{
    FileKeyValue, KeyValueStore, MemoryKeyValue, QuotePersistence, SessionCache, StorageError,
    SELECTED_CATEGORY_KEY,
};

/// Default file name for exports
pub const EXPORT_FILE_NAME: &str = "quotes.json";

/// Rejected import payloads; the collection is left unchanged
#[derive(Error, Debug)]
pub enum ImportError {
    /// The document is not valid JSON
    #[error("Error reading JSON file: {0}")]
    Malformed(String),

    /// Valid JSON, but not an array of quotes
    #[error("Invalid JSON format: {0}")]
    InvalidShape(String),
}

/// Errors from store operations
#[derive(Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    InvalidQuote(#[from] QuoteError),

    #[error("A quote with this text already exists: \"{text}\"")]
    DuplicateQuote { text: String },

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Result of an import
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub policy: ImportPolicy,
    /// Quotes that ended up in the collection
    pub imported: usize,
    /// Quotes dropped because their text was already present
    pub skipped: usize,
}

/// Owned handle to the quote collection
pub struct QuoteStore {
    collection: Collection,
    index: CollectionIndex,
    persistence: QuotePersistence,
    session: SessionCache,
    selected: Option<String>,
    location: Option<PathBuf>,
}

impl QuoteStore {
    /// Open the file-backed store in the configured data directory
    ///
    /// Never fails: unreadable data falls back to the seed collection.
    pub fn open(config: &Config) -> Self {
        let mut store = Self::with_backends(
            FileKeyValue::new(&config.data_dir),
            SessionCache::default(),
        );
        store.location = Some(config.data_dir.clone());
        store
    }

    /// Open a store over explicit backends
    pub fn with_backends(persistent: impl KeyValueStore + 'static, session: SessionCache) -> Self {
        let persistence = QuotePersistence::new(persistent);
        let collection = persistence.load();
        let index = CollectionIndex::build(&collection);
        let selected = persistence.load_preference(SELECTED_CATEGORY_KEY);

        debug!(
            "Opened store with {} quote(s), {} categories",
            collection.len(),
            index.categories().len() - 1
        );

        Self {
            collection,
            index,
            persistence,
            session,
            selected,
            location: None,
        }
    }

    /// A store that keeps nothing beyond the process
    pub fn in_memory() -> Self {
        Self::with_backends(MemoryKeyValue::new(), SessionCache::default())
    }

    /// Data directory, for file-backed stores
    pub fn location(&self) -> Option<&Path> {
        self.location.as_deref()
    }

    // ==================== Queries ====================

    pub fn quotes(&self) -> &Collection {
        &self.collection
    }

    pub fn len(&self) -> usize {
        self.collection.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collection.is_empty()
    }

    pub fn categories(&self) -> &CategorySet {
        self.index.categories()
    }

    /// Quotes per category, in index order
    pub fn category_counts(&self) -> Vec<(String, usize)> {
        self.index.counts(&self.collection)
    }

    /// Quotes in `category` (`"all"` for everything)
    pub fn filtered(&self, category: &str) -> Collection {
        index::filter(&self.collection, category)
    }

    /// Quotes in the selected category
    pub fn active_view(&self) -> Collection {
        self.filtered(self.selected_category())
    }

    // ==================== Preferences ====================

    /// The selected category; a category that no longer exists reads as `"all"`
    pub fn selected_category(&self) -> &str {
        match self.selected.as_deref() {
            Some(category) if self.categories().contains(category) => category,
            _ => ALL_CATEGORIES,
        }
    }

    /// Persist the category filter
    pub fn select_category(&mut self, category: &str) -> Result<(), StoreError> {
        self.persistence
            .save_preference(SELECTED_CATEGORY_KEY, category)?;
        self.selected = Some(category.to_string());
        Ok(())
    }

    // ==================== Session ====================

    /// Pick a random quote from the selected category and remember it
    pub fn random_quote(&mut self) -> Option<Quote> {
        let view = self.active_view();
        if view.is_empty() {
            return None;
        }

        let quote = view.get(random_index(view.len()))?.clone();
        self.session.set_last(&quote);
        Some(quote)
    }

    /// The quote displayed last in this session
    pub fn last_viewed(&self) -> Option<Quote> {
        self.session.get_last()
    }

    // ==================== Mutations ====================

    /// Append a new quote
    ///
    /// Rejects empty fields and texts that are already present.
    pub fn add(&mut self, quote: Quote) -> Result<(), StoreError> {
        quote.validate()?;
        if self.collection.contains_text(&quote.text) {
            return Err(StoreError::DuplicateQuote { text: quote.text });
        }

        let mut updated = self.collection.clone();
        updated.push(quote);
        self.commit(updated)?;
        info!("Added quote, collection now has {} quote(s)", self.len());
        Ok(())
    }

    /// Overwrite the whole collection
    pub fn replace(&mut self, collection: Collection) -> Result<(), StoreError> {
        self.commit(collection)
    }

    /// Store the result of a sync merge
    pub fn commit_merge(&mut self, merged: Collection) -> Result<(), StoreError> {
        debug!("Committing merged collection of {} quote(s)", merged.len());
        self.commit(merged)
    }

    /// Import a JSON array of quotes
    ///
    /// Texts repeated inside the payload keep their first occurrence. With
    /// `Append`, quotes whose text is already stored are skipped.
    pub fn import_json(
        &mut self,
        payload: &str,
        policy: ImportPolicy,
    ) -> Result<ImportSummary, StoreError> {
        let incoming = parse_import(payload)?;
        let total = incoming.len();

        let mut updated = match policy {
            ImportPolicy::Replace => Collection::new(),
            ImportPolicy::Append => self.collection.clone(),
        };
        let mut seen: HashSet<String> = updated.iter().map(|q| q.text.clone()).collect();

        let mut imported = 0;
        for quote in incoming {
            if seen.insert(quote.text.clone()) {
                updated.push(quote);
                imported += 1;
            }
        }

        self.commit(updated)?;

        let summary = ImportSummary {
            policy,
            imported,
            skipped: total - imported,
        };
        info!(
            "Imported {} quote(s) ({}), skipped {}",
            summary.imported, policy, summary.skipped
        );
        Ok(summary)
    }

    /// Pretty-printed JSON array of the collection
    pub fn export_json(&self) -> Result<String, StorageError> {
        serde_json::to_string_pretty(&self.collection).map_err(|source| {
            StorageError::Serialize {
                key: EXPORT_FILE_NAME.to_string(),
                source,
            }
        })
    }

    /// Write the export to `path`
    pub fn export_to(&self, path: &Path) -> Result<(), StorageError> {
        let json = self.export_json()?;
        atomic_write(path, json.as_bytes())?;
        info!("Exported {} quote(s) to {:?}", self.len(), path);
        Ok(())
    }

    /// Persist `collection`, then make it current and rebuild the index
    fn commit(&mut self, collection: Collection) -> Result<(), StoreError> {
        self.persistence.save(&collection)?;
        self.collection = collection;
        self.index.rebuild(&self.collection);
        Ok(())
    }
}

/// Parse and validate an import payload
fn parse_import(payload: &str) -> Result<Vec<Quote>, ImportError> {
    let value: Value =
        serde_json::from_str(payload).map_err(|e| ImportError::Malformed(e.to_string()))?;

    let Value::Array(items) = value else {
        return Err(ImportError::InvalidShape(
            "expected an array of quotes".to_string(),
        ));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            let quote: Quote = serde_json::from_value(item)
                .map_err(|e| ImportError::InvalidShape(format!("item {}: {}", i, e)))?;
            quote
                .validate()
                .map_err(|e| ImportError::InvalidShape(format!("item {}: {}", i, e)))?;
            Ok(quote)
        })
        .collect()
}

/// Uniform index in `0..len` (`len` must be non-zero)
fn random_index(len: usize) -> usize {
    (uuid::Uuid::new_v4().as_u128() % len as u128) as usize
}
