//! Sync with the remote quote feed
//!
//! One cycle fetches the remote collection, merges it into the local one
//! (remote wins on equal text), saves the result, uploads quotes only known
//! locally and reports the outcome.
//!
//! ## Usage
//!
//! ```ignore
//! let store = Arc::new(Mutex::new(QuoteStore::open(&config)));
//! let remote = HttpRemoteSource::from_config(&config)?;
//! let coordinator = Arc::new(SyncCoordinator::new(store, remote));
//!
//! let report = coordinator.run_sync(SyncMode::Manual).await;
//! let schedule = spawn_periodic(coordinator.clone(), config.sync_interval());
//! ```

mod coordinator;
mod schedule;

pub use coordinator::{
    AddReport, SharedStore, SyncCoordinator, SyncEvent, SyncMode, SyncOutcome, SyncPolicy,
    SyncReport, SyncStatus,
};
pub use schedule::{spawn_periodic, SyncScheduleHandle};
