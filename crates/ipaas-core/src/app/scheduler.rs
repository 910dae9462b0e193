//! IndexScheduler - runs index cycles in the background with a fixed delay.
//!
//! # State
//! `Stopped -> Running -> Stopped`
//!
//! - first cycle after `initial_delay`, then `delay` between the END of one
//!   cycle and the START of the next (a slow cycle pushes the next one back)
//! - one cycle at a time; each runs in its own task so a panic only loses
//!   that cycle
//! - `stop()` interrupts sleeps and in-flight cycles alike; whatever the
//!   abandoned cycle already merged stays in the catalog

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{error, info, warn};

use crate::app::config::IndexerConfig;
use crate::app::repository::ConnectionRepository;

/// How long `stop()` waits for the loop to wind down before aborting it.
const STOP_GRACE: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// No index url; indexing stays off for the life of the process.
    Disabled,
    Started,
    /// `start()` while running is ignored.
    AlreadyRunning,
}

struct RunningIndexer {
    shutdown_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
}

pub struct IndexScheduler {
    repository: Arc<ConnectionRepository>,
    initial_delay: Duration,
    delay: Duration,
    running: Option<RunningIndexer>,
}

impl IndexScheduler {
    pub fn new(repository: Arc<ConnectionRepository>, config: &IndexerConfig) -> Self {
        Self {
            repository,
            initial_delay: config.initial_delay,
            delay: config.delay,
            running: None,
        }
    }

    pub fn repository(&self) -> &Arc<ConnectionRepository> {
        &self.repository
    }

    /// Spawn the background loop. Must be called inside a tokio runtime.
    pub fn start(&mut self) -> SchedulerState {
        let Some(index_url) = self.repository.index_url() else {
            info!(phase = "scheduler", "Nexus service not found. Indexing Nexus is not enabled");
            return SchedulerState::Disabled;
        };

        if self.is_running() {
            warn!(phase = "scheduler", index_url, "indexer already running; start ignored");
            return SchedulerState::AlreadyRunning;
        }

        info!(
            phase = "scheduler",
            index_url,
            delay_secs = self.delay.as_secs(),
            "indexing Nexus every {} seconds",
            self.delay.as_secs()
        );

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let join = tokio::spawn(index_loop(
            Arc::clone(&self.repository),
            self.initial_delay,
            self.delay,
            shutdown_rx,
        ));
        self.running = Some(RunningIndexer { shutdown_tx, join });
        SchedulerState::Started
    }

    pub fn is_running(&self) -> bool {
        self.running
            .as_ref()
            .is_some_and(|running| !running.join.is_finished())
    }

    /// Cancel the schedule, abandoning any cycle in progress. No-op when stopped.
    pub async fn stop(&mut self) {
        let Some(running) = self.running.take() else {
            return;
        };

        // ignore send error: the loop may already be gone
        let _ = running.shutdown_tx.send(true);

        let mut join = running.join;
        if tokio::time::timeout(STOP_GRACE, &mut join).await.is_err() {
            warn!(phase = "scheduler", "indexer did not stop in time; aborting");
            join.abort();
        }
        info!(phase = "scheduler", "indexing Nexus stopped");
    }
}

impl Drop for IndexScheduler {
    fn drop(&mut self) {
        if let Some(running) = self.running.take() {
            running.join.abort();
        }
    }
}

/// Aborts the wrapped task when dropped, so aborting the loop also abandons
/// its in-flight cycle.
struct AbortOnDrop(AbortHandle);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

async fn index_loop(
    repository: Arc<ConnectionRepository>,
    initial_delay: Duration,
    delay: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    if !sleep_or_shutdown(initial_delay, &mut shutdown_rx).await {
        return;
    }

    loop {
        let mut cycle = tokio::spawn({
            let repository = Arc::clone(&repository);
            async move { repository.run_index_cycle().await }
        });
        let _guard = AbortOnDrop(cycle.abort_handle());

        tokio::select! {
            _ = wait_for_shutdown(&mut shutdown_rx) => {
                info!(phase = "scheduler", "shutdown requested; abandoning in-flight cycle");
                return;
            }
            result = &mut cycle => {
                if let Err(err) = result {
                    error!(phase = "cycle", error = %err, "index cycle did not complete");
                }
            }
        }

        if !sleep_or_shutdown(delay, &mut shutdown_rx).await {
            return;
        }
    }
}

/// `true` when the full delay elapsed, `false` on shutdown.
async fn sleep_or_shutdown(delay: Duration, shutdown_rx: &mut watch::Receiver<bool>) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(delay) => true,
        _ = wait_for_shutdown(shutdown_rx) => false,
    }
}

/// Resolves once shutdown is requested or the scheduler is gone.
async fn wait_for_shutdown(shutdown_rx: &mut watch::Receiver<bool>) {
    let _ = shutdown_rx.wait_for(|stop| *stop).await;
}
