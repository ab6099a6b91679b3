//! Periodic sync
//!
//! A background task that runs a scheduled cycle every period until
//! cancelled. Cancelling stops further ticks; a cycle already running is
//! allowed to finish.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::coordinator::{SyncCoordinator, SyncMode};
use crate::remote::RemoteSource;

/// Commands sent to the schedule task
#[derive(Debug, Clone, Copy)]
enum ScheduleCommand {
    Shutdown,
}

/// Handle to a running schedule
pub struct SyncScheduleHandle {
    command_tx: mpsc::Sender<ScheduleCommand>,
    task: JoinHandle<()>,
}

impl SyncScheduleHandle {
    /// Stop scheduling further cycles
    pub fn cancel(&self) {
        let _ = self.command_tx.try_send(ScheduleCommand::Shutdown);
    }

    /// Cancel and wait for the task to exit, including any cycle in flight
    pub async fn stop(self) {
        self.cancel();
        let _ = self.task.await;
    }

    /// Whether the task has exited
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Spawn a task that runs a scheduled sync every `period`
///
/// The first cycle runs one period after spawning.
pub fn spawn_periodic<R>(
    coordinator: Arc<SyncCoordinator<R>>,
    period: Duration,
) -> SyncScheduleHandle
where
    R: RemoteSource + 'static,
{
    let (command_tx, command_rx) = mpsc::channel(4);
    let task = tokio::spawn(schedule_loop(coordinator, period, command_rx));

    SyncScheduleHandle { command_tx, task }
}

async fn schedule_loop<R>(
    coordinator: Arc<SyncCoordinator<R>>,
    period: Duration,
    mut command_rx: mpsc::Receiver<ScheduleCommand>,
) where
    R: RemoteSource + 'static,
{
    info!("Periodic sync every {:?}", period);

    loop {
        tokio::select! {
            _ = tokio::time::sleep(period) => {
                // Runs to completion; commands are only read between cycles
                if coordinator.run_sync(SyncMode::Scheduled).await.is_none() {
                    debug!("Scheduled tick skipped, previous cycle still running");
                }
            }
            cmd = command_rx.recv() => {
                if matches!(cmd, Some(ScheduleCommand::Shutdown) | None) {
                    break;
                }
            }
        }
    }

    info!("Periodic sync stopped");
}
