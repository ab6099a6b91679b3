//! quotesync core library
//!
//! This crate provides the core of quotesync, a local-first quote collection
//! kept loosely in step with a remote quote feed.
//!
//! # Architecture
//!
//! - **Local store**: source of truth for the user, always readable offline
//! - **Remote feed**: authoritative on conflicts, merged in on every sync
//!
//! Quotes are identified by their text. On sync, remote quotes replace local
//! quotes with the same text, and quotes only known locally are uploaded.
//!
//! # Quick Start
//!
//! ```text
//! let config = Config::load()?;
//! let mut store = QuoteStore::open(&config);
//!
//! // Add a quote
//! store.add(Quote::from_input("Stay hungry.", "Motivation")?)?;
//!
//! // Query quotes
//! let motivation = store.filtered("Motivation");
//! ```
//!
//! # Modules
//!
//! - `store`: Owned collection handle (main entry point)
//! - `models`: Quote and Collection
//! - `storage`: Durable and session key/value persistence
//! - `index`: Category set and filtered views
//! - `merge`: Remote/local reconciliation
//! - `remote`: Remote feed client
//! - `sync`: Sync cycles, manual and periodic
//! - `config`: Application configuration

pub mod config;
pub mod index;
pub mod merge;
pub mod models;
pub mod remote;
pub mod storage;
pub mod store;
pub mod sync;

pub use config::{Config, ImportPolicy};
pub use index::{CategorySet, CollectionIndex, ALL_CATEGORIES};
pub use merge::{local_only, merge};
pub use models::{Collection, Quote, QuoteError, SERVER_CATEGORY};
pub use remote::{HttpRemoteSource, MemoryRemoteSource, PushAck, RemoteError, RemoteSource};
pub use storage::{SessionCache, StorageError};
pub use store::{ImportError, ImportSummary, QuoteStore, StoreError, EXPORT_FILE_NAME};
