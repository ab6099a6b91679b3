//! Storage layer
//!
//! Handles durable and session-scoped persistence.
//!
//! ## Architecture
//!
//! - **KeyValueStore**: string records under fixed keys (file-backed or in-memory)
//! - **QuotePersistence**: the collection and preferences, durable
//! - **SessionCache**: last viewed quote, volatile

pub mod error;
pub mod kv;
pub mod persistence;
pub mod session;

pub use error::{StorageError, StorageResult};
pub use kv::{FileKeyValue, KeyValueStore, MemoryKeyValue};
pub use persistence::{QuotePersistence, QUOTES_KEY, SELECTED_CATEGORY_KEY};
pub use session::{SessionCache, LAST_QUOTE_KEY};
