//! Sync coordinator
//!
//! Runs sync cycles against a `RemoteSource`:
//!
//! 1. Fetch the remote collection (on failure, treat it as empty)
//! 2. Merge it with the local collection, remote wins
//! 3. Commit the merge to the store (index rebuilt on commit)
//! 4. Push local-only quotes, best effort
//! 5. Report the outcome
//!
//! At most one cycle runs at a time. A trigger that arrives while a cycle is
//! in flight is dropped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, watch, Mutex};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::merge::{local_only, merge_with_stats};
use crate::models::{Collection, Quote};
use crate::remote::{PushAck, RemoteError, RemoteSource};
use crate::store::{QuoteStore, StoreError};

/// Store handle shared between the coordinator and the presentation layer
pub type SharedStore = Arc<Mutex<QuoteStore>>;

/// What started a cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    /// Timer tick
    Scheduled,
    /// Explicit user request
    Manual,
}

impl std::fmt::Display for SyncMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncMode::Scheduled => write!(f, "scheduled"),
            SyncMode::Manual => write!(f, "manual"),
        }
    }
}

/// Coordinator state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    Idle,
    Syncing,
}

/// Result of one cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Fetched, merged, saved and every push accepted
    Success,
    /// Merged and saved, but at least one push failed
    PartialFailure,
    /// Remote unavailable or the merge could not be saved; local data kept
    Failure,
}

/// Summary of a completed cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub mode: SyncMode,
    pub outcome: SyncOutcome,
    /// Quotes received from the remote
    pub fetched: usize,
    /// Remote quotes that were new locally
    pub new_from_remote: usize,
    /// Size of the collection after the cycle
    pub total: usize,
    /// Local-only quotes accepted by the remote
    pub pushed: usize,
    /// Error messages of rejected pushes
    pub push_failures: Vec<String>,
    /// Status line for the user
    pub message: String,
    pub finished_at: DateTime<Utc>,
}

/// Events emitted by the coordinator
#[derive(Debug, Clone)]
pub enum SyncEvent {
    /// A cycle started
    Started(SyncMode),
    /// A cycle finished
    Completed(SyncReport),
    /// A trigger was dropped because a cycle was already running
    Skipped(SyncMode),
    /// A quote was added locally; carries the push result
    QuoteAdded {
        quote: Quote,
        push: Result<PushAck, RemoteError>,
    },
}

/// Sync behavior knobs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncPolicy {
    /// Push every local-only quote on each cycle
    pub push_local_only: bool,
    /// Push even when the fetch failed; every local quote is then local-only
    pub push_on_fetch_failure: bool,
}

impl Default for SyncPolicy {
    fn default() -> Self {
        Self {
            push_local_only: true,
            push_on_fetch_failure: false,
        }
    }
}

impl SyncPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            push_local_only: config.push_local_only,
            push_on_fetch_failure: config.push_on_fetch_failure,
        }
    }
}

/// Result of the add flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddReport {
    pub quote: Quote,
    /// Best-effort upload result; the quote is stored locally either way
    pub push: Result<PushAck, RemoteError>,
}

/// Orchestrates sync cycles between a store and a remote feed
pub struct SyncCoordinator<R> {
    store: SharedStore,
    remote: R,
    policy: SyncPolicy,
    in_progress: AtomicBool,
    status: watch::Sender<SyncStatus>,
    status_rx: watch::Receiver<SyncStatus>,
    event_tx: mpsc::UnboundedSender<SyncEvent>,
    event_rx: Option<mpsc::UnboundedReceiver<SyncEvent>>,
}

impl<R: RemoteSource> SyncCoordinator<R> {
    pub fn new(store: SharedStore, remote: R) -> Self {
        let (status_tx, status_rx) = watch::channel(SyncStatus::Idle);
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        Self {
            store,
            remote,
            policy: SyncPolicy::default(),
            in_progress: AtomicBool::new(false),
            status: status_tx,
            status_rx,
            event_tx,
            event_rx: Some(event_rx),
        }
    }

    /// Set the sync policy
    pub fn with_policy(mut self, policy: SyncPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    /// Get the current status
    pub fn status(&self) -> SyncStatus {
        *self.status_rx.borrow()
    }

    /// Subscribe to status changes
    pub fn subscribe_status(&self) -> watch::Receiver<SyncStatus> {
        self.status_rx.clone()
    }

    /// Take the event receiver (can only be called once)
    pub fn take_events(&mut self) -> Option<mpsc::UnboundedReceiver<SyncEvent>> {
        self.event_rx.take()
    }

    /// Run one cycle
    ///
    /// Returns `None` when another cycle is already running; the trigger is
    /// dropped, not queued.
    pub async fn run_sync(&self, mode: SyncMode) -> Option<SyncReport> {
        let Some(_guard) = InProgressGuard::acquire(&self.in_progress) else {
            debug!("Dropping {} sync trigger, a cycle is in progress", mode);
            self.emit(SyncEvent::Skipped(mode));
            return None;
        };

        self.set_status(SyncStatus::Syncing);
        self.emit(SyncEvent::Started(mode));
        info!("Starting {} sync with {}", mode, self.remote.endpoint());

        let report = self.cycle(mode).await;

        self.set_status(SyncStatus::Idle);
        match report.outcome {
            SyncOutcome::Success => info!("{}", report.message),
            _ => warn!("{}", report.message),
        }
        self.emit(SyncEvent::Completed(report.clone()));
        Some(report)
    }

    /// Add a quote locally, then push it best-effort
    ///
    /// Only a local failure (invalid, duplicate, storage) is an error.
    pub async fn add_quote(&self, quote: Quote) -> Result<AddReport, StoreError> {
        self.store.lock().await.add(quote.clone())?;

        let push = self.remote.push(&quote).await;
        if let Err(ref e) = push {
            warn!("Quote saved locally but not uploaded: {}", e);
        }

        self.emit(SyncEvent::QuoteAdded {
            quote: quote.clone(),
            push: push.clone(),
        });
        Ok(AddReport { quote, push })
    }

    async fn cycle(&self, mode: SyncMode) -> SyncReport {
        let (remote, fetch_error) = match self.remote.fetch_all().await {
            Ok(remote) => (remote, None),
            Err(e) => {
                warn!("Fetch failed, keeping local data: {}", e);
                (Collection::new(), Some(e))
            }
        };

        // The store lock is never held across a network call
        let (to_push, new_from_remote, total, commit_error) = {
            let mut store = self.store.lock().await;
            let local = store.quotes().clone();

            let new_from_remote = remote
                .iter()
                .filter(|q| !local.contains_text(&q.text))
                .count();

            // Merging with an empty remote leaves local unchanged, nothing to commit
            let commit_error = if fetch_error.is_none() {
                let (merged, stats) = merge_with_stats(&remote, &local);
                debug!(
                    "Merged: {} from remote, {} local-only, {} local discarded",
                    stats.from_remote, stats.from_local, stats.discarded_local
                );
                store.commit_merge(merged).err()
            } else {
                None
            };

            let can_push = match (&fetch_error, &commit_error) {
                (_, Some(_)) => false,
                (Some(_), None) => self.policy.push_on_fetch_failure,
                (None, None) => true,
            };
            let to_push = if can_push && self.policy.push_local_only {
                local_only(&remote, &local)
            } else {
                Collection::new()
            };

            (to_push, new_from_remote, store.len(), commit_error)
        };

        let mut pushed = 0;
        let mut push_failures = Vec::new();
        for quote in &to_push {
            match self.remote.push(quote).await {
                Ok(_) => pushed += 1,
                Err(e) => {
                    warn!("{}", e);
                    push_failures.push(e.to_string());
                }
            }
        }

        let (outcome, message) = if let Some(e) = fetch_error {
            (
                SyncOutcome::Failure,
                format!("Sync failed, local quotes kept: {}", e),
            )
        } else if let Some(e) = commit_error {
            (
                SyncOutcome::Failure,
                format!("Sync failed, could not save merged quotes: {}", e),
            )
        } else if !push_failures.is_empty() {
            (
                SyncOutcome::PartialFailure,
                format!(
                    "Quotes synced with server, but {} of {} local quote(s) could not be uploaded.",
                    push_failures.len(),
                    to_push.len()
                ),
            )
        } else {
            (
                SyncOutcome::Success,
                format!(
                    "Quotes synced with server: {} new, {} uploaded.",
                    new_from_remote, pushed
                ),
            )
        };

        SyncReport {
            mode,
            outcome,
            fetched: remote.len(),
            new_from_remote: if outcome == SyncOutcome::Failure { 0 } else { new_from_remote },
            total,
            pushed,
            push_failures,
            message,
            finished_at: Utc::now(),
        }
    }

    fn set_status(&self, status: SyncStatus) {
        let _ = self.status.send(status);
    }

    fn emit(&self, event: SyncEvent) {
        let _ = self.event_tx.send(event);
    }
}

/// Single-flight flag, released on drop
struct InProgressGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InProgressGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for InProgressGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::MemoryRemoteSource;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;
    use tokio::sync::Notify;

    fn shared(store: QuoteStore) -> SharedStore {
        Arc::new(Mutex::new(store))
    }

    fn local_store(entries: &[(&str, &str)]) -> SharedStore {
        let mut store = QuoteStore::in_memory();
        store
            .replace(
                entries
                    .iter()
                    .map(|(text, category)| Quote::new(*text, *category))
                    .collect(),
            )
            .unwrap();
        shared(store)
    }

    /// Remote whose fetch waits until released
    struct GatedRemote {
        inner: MemoryRemoteSource,
        gate: Notify,
        fetches: AtomicUsize,
    }

    impl RemoteSource for GatedRemote {
        async fn fetch_all(&self) -> Result<Collection, RemoteError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.gate.notified().await;
            self.inner.fetch_all().await
        }

        async fn push(&self, quote: &Quote) -> Result<PushAck, RemoteError> {
            self.inner.push(quote).await
        }

        fn endpoint(&self) -> &str {
            "gated"
        }
    }

    #[tokio::test]
    async fn test_successful_cycle_merges_and_pushes() {
        let store = local_store(&[("A", "Motivation"), ("B", "Life")]);
        let coordinator = SyncCoordinator::new(store.clone(), MemoryRemoteSource::new(["A"]));

        let report = coordinator.run_sync(SyncMode::Manual).await.unwrap();
        assert_eq!(report.outcome, SyncOutcome::Success);
        assert_eq!(report.fetched, 1);
        assert_eq!(report.new_from_remote, 0);
        assert_eq!(report.pushed, 1);
        assert_eq!(report.total, 2);

        let store = store.lock().await;
        let expected: Collection = vec![Quote::new("A", "Server"), Quote::new("B", "Life")].into();
        assert_eq!(store.quotes(), &expected);
        assert!(store.categories().contains("Server"));
        assert!(!store.categories().contains("Motivation"));

        assert_eq!(coordinator.remote().pushed(), vec![Quote::new("B", "Life")]);
        assert_eq!(coordinator.status(), SyncStatus::Idle);
    }

    #[tokio::test]
    async fn test_fetch_failure_keeps_local_data() {
        let store = local_store(&[("A", "Motivation")]);
        let remote = MemoryRemoteSource::new(["X"]);
        remote.set_available(false);
        let mut coordinator = SyncCoordinator::new(store.clone(), remote);
        let mut events = coordinator.take_events().unwrap();

        let report = coordinator.run_sync(SyncMode::Scheduled).await.unwrap();
        assert_eq!(report.outcome, SyncOutcome::Failure);
        assert!(report.message.starts_with("Sync failed"));
        assert_eq!(report.pushed, 0);
        assert!(coordinator.remote().pushed().is_empty());

        let expected: Collection = vec![Quote::new("A", "Motivation")].into();
        assert_eq!(store.lock().await.quotes(), &expected);

        assert!(matches!(events.recv().await, Some(SyncEvent::Started(SyncMode::Scheduled))));
        match events.recv().await {
            Some(SyncEvent::Completed(r)) => assert_eq!(r.outcome, SyncOutcome::Failure),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_failure_pushes_when_policy_allows() {
        let store = local_store(&[("A", "Motivation"), ("B", "Life")]);
        let remote = MemoryRemoteSource::new(["X"]);
        remote.set_available(false);
        let coordinator = SyncCoordinator::new(store.clone(), remote).with_policy(SyncPolicy {
            push_on_fetch_failure: true,
            ..SyncPolicy::default()
        });

        let report = coordinator.run_sync(SyncMode::Manual).await.unwrap();
        assert_eq!(report.outcome, SyncOutcome::Failure);
        // Every local quote was offered; the offline feed refused them all
        assert_eq!(report.push_failures.len(), 2);
        assert_eq!(report.pushed, 0);
        assert_eq!(store.lock().await.len(), 2);
    }

    #[test]
    fn test_policy_from_config() {
        let config = Config {
            push_local_only: false,
            push_on_fetch_failure: true,
            ..Config::default()
        };
        assert_eq!(
            SyncPolicy::from_config(&config),
            SyncPolicy {
                push_local_only: false,
                push_on_fetch_failure: true,
            }
        );
    }

    #[tokio::test]
    async fn test_push_failure_is_partial() {
        let store = local_store(&[("B", "Life"), ("C", "Work")]);
        let remote = MemoryRemoteSource::new(["A"]);
        remote.reject_push("B");
        let coordinator = SyncCoordinator::new(store.clone(), remote);

        let report = coordinator.run_sync(SyncMode::Manual).await.unwrap();
        assert_eq!(report.outcome, SyncOutcome::PartialFailure);
        assert_eq!(report.pushed, 1);
        assert_eq!(report.push_failures.len(), 1);
        assert_eq!(report.new_from_remote, 1);

        // The merge is committed regardless
        assert_eq!(store.lock().await.len(), 3);
        assert_eq!(coordinator.remote().pushed(), vec![Quote::new("C", "Work")]);
    }

    #[tokio::test]
    async fn test_push_policy_disabled() {
        let store = local_store(&[("B", "Life")]);
        let coordinator = SyncCoordinator::new(store.clone(), MemoryRemoteSource::new(["A"]))
            .with_policy(SyncPolicy {
                push_local_only: false,
                ..SyncPolicy::default()
            });

        let report = coordinator.run_sync(SyncMode::Manual).await.unwrap();
        assert_eq!(report.outcome, SyncOutcome::Success);
        assert_eq!(report.pushed, 0);
        assert!(coordinator.remote().pushed().is_empty());
        assert_eq!(store.lock().await.len(), 2);
    }

    #[tokio::test]
    async fn test_overlapping_trigger_is_dropped() {
        let store = local_store(&[("B", "Life")]);
        let remote = GatedRemote {
            inner: MemoryRemoteSource::new(["A"]),
            gate: Notify::new(),
            fetches: AtomicUsize::new(0),
        };
        let mut coordinator = SyncCoordinator::new(store.clone(), remote);
        let mut events = coordinator.take_events().unwrap();
        let coordinator = Arc::new(coordinator);

        let mut status = coordinator.subscribe_status();
        let first = tokio::spawn({
            let coordinator = coordinator.clone();
            async move { coordinator.run_sync(SyncMode::Scheduled).await }
        });

        tokio::time::timeout(
            Duration::from_secs(5),
            status.wait_for(|s| *s == SyncStatus::Syncing),
        )
        .await
        .unwrap()
        .unwrap();

        assert!(coordinator.run_sync(SyncMode::Manual).await.is_none());
        assert!(coordinator.run_sync(SyncMode::Scheduled).await.is_none());

        coordinator.remote().gate.notify_one();
        let report = first.await.unwrap().unwrap();
        assert_eq!(report.outcome, SyncOutcome::Success);
        assert_eq!(coordinator.remote().fetches.load(Ordering::SeqCst), 1);

        let mut completed = 0;
        let mut skipped = 0;
        while let Ok(event) = events.try_recv() {
            match event {
                SyncEvent::Completed(_) => completed += 1,
                SyncEvent::Skipped(_) => skipped += 1,
                _ => {}
            }
        }
        assert_eq!(completed, 1);
        assert_eq!(skipped, 2);

        // Idle again: the next trigger runs
        coordinator.remote().gate.notify_one();
        assert!(coordinator.run_sync(SyncMode::Manual).await.is_some());
    }

    #[tokio::test]
    async fn test_add_quote_pushes() {
        let store = shared(QuoteStore::in_memory());
        let coordinator = SyncCoordinator::new(store.clone(), MemoryRemoteSource::default());

        let report = coordinator
            .add_quote(Quote::new("New one", "Work"))
            .await
            .unwrap();
        assert!(report.push.is_ok());
        assert_eq!(coordinator.remote().pushed(), vec![Quote::new("New one", "Work")]);

        let store = store.lock().await;
        assert_eq!(store.len(), 3);
        assert!(store.categories().contains("Work"));
    }

    #[tokio::test]
    async fn test_add_quote_push_failure_keeps_local() {
        let store = shared(QuoteStore::in_memory());
        let remote = MemoryRemoteSource::default();
        remote.set_available(false);
        let coordinator = SyncCoordinator::new(store.clone(), remote);

        let report = coordinator
            .add_quote(Quote::new("Offline", "Work"))
            .await
            .unwrap();
        assert!(matches!(report.push, Err(RemoteError::PushFailed { .. })));
        assert!(store.lock().await.quotes().contains_text("Offline"));
    }

    #[tokio::test]
    async fn test_add_quote_duplicate_is_not_pushed() {
        let store = local_store(&[("A", "Life")]);
        let coordinator = SyncCoordinator::new(store.clone(), MemoryRemoteSource::default());

        let err = coordinator
            .add_quote(Quote::new("A", "Other"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateQuote { .. }));
        assert!(coordinator.remote().pushed().is_empty());
    }
}
