//! Sync command handlers

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tokio::sync::Mutex;

use quotesync_core::sync::{
    spawn_periodic, SyncCoordinator, SyncEvent, SyncMode, SyncOutcome, SyncPolicy,
};
use quotesync_core::{Config, HttpRemoteSource, QuoteStore, RemoteSource};

use crate::output::Output;

/// Build a coordinator over `store` and the configured remote feed
pub fn coordinator(
    store: QuoteStore,
    config: &Config,
) -> Result<SyncCoordinator<HttpRemoteSource>> {
    let remote =
        HttpRemoteSource::from_config(config).context("Failed to create remote feed client")?;
    Ok(
        SyncCoordinator::new(Arc::new(Mutex::new(store)), remote)
            .with_policy(SyncPolicy::from_config(config)),
    )
}

fn ensure_enabled(config: &Config) -> Result<()> {
    if !config.sync_enabled {
        bail!(
            "Sync is not enabled. Enable it with:\n  \
             quotesync config set sync_enabled true"
        );
    }
    Ok(())
}

/// Run one manual sync cycle
pub async fn sync(store: QuoteStore, config: &Config, output: &Output) -> Result<()> {
    ensure_enabled(config)?;

    let coordinator = coordinator(store, config)?;
    output.message(&format!("Syncing with {}...", coordinator.remote().endpoint()));

    let Some(report) = coordinator.run_sync(SyncMode::Manual).await else {
        // Only one coordinator exists in this process
        return Ok(());
    };

    if report.outcome == SyncOutcome::Failure {
        bail!("{}", report.message);
    }
    output.print_sync_report(&report);

    Ok(())
}

/// Sync now, then every interval until Ctrl-C
pub async fn watch(
    store: QuoteStore,
    config: &Config,
    interval: Option<u64>,
    output: &Output,
) -> Result<()> {
    ensure_enabled(config)?;

    let period = interval
        .map(|secs| Duration::from_secs(secs.max(1)))
        .unwrap_or_else(|| config.sync_interval());

    let mut coordinator = coordinator(store, config)?;
    let mut events = coordinator
        .take_events()
        .context("Sync event stream already taken")?;
    let coordinator = Arc::new(coordinator);

    output.message(&format!(
        "Watching {} every {}s (Ctrl-C to stop)",
        coordinator.remote().endpoint(),
        period.as_secs()
    ));

    coordinator.run_sync(SyncMode::Manual).await;
    let schedule = spawn_periodic(coordinator.clone(), period);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = events.recv() => match event {
                Some(SyncEvent::Completed(report)) => output.print_sync_report(&report),
                Some(_) => {}
                None => break,
            },
        }
    }

    output.message("Stopping...");
    schedule.stop().await;

    // Reports from the final cycle, if one was running
    while let Ok(event) = events.try_recv() {
        if let SyncEvent::Completed(report) = event {
            output.print_sync_report(&report);
        }
    }

    Ok(())
}
