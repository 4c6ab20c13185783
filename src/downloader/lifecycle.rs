//! Active-run tracking and graceful shutdown.

use crate::error::{Error, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::PlaylistDownloader;

/// How long shutdown waits for in-flight runs
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

/// Counts one in-flight run for as long as it is alive
pub(crate) struct ActiveRun {
    counter: Arc<AtomicUsize>,
}

impl ActiveRun {
    /// Register a run, refusing it once shutdown has started
    pub(crate) fn enter(downloader: &PlaylistDownloader) -> Result<Self> {
        if !downloader.accepting_new.load(Ordering::SeqCst) {
            return Err(Error::ShuttingDown);
        }
        downloader.active_runs.fetch_add(1, Ordering::SeqCst);
        Ok(Self {
            counter: downloader.active_runs.clone(),
        })
    }
}

impl Drop for ActiveRun {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::SeqCst);
    }
}

impl PlaylistDownloader {
    /// Whether new runs are accepted
    pub fn is_accepting(&self) -> bool {
        self.accepting_new.load(Ordering::SeqCst)
    }

    /// Number of runs currently executing
    pub fn active_runs(&self) -> usize {
        self.active_runs.load(Ordering::SeqCst)
    }

    /// Gracefully shut down the downloader
    ///
    /// Stops accepting new runs, then waits (up to 30 seconds) for in-flight runs to
    /// finish. Runs still going after the timeout are left to be dropped with the
    /// process, which removes their temporary roots and kills their engine processes.
    pub async fn shutdown(&self) -> Result<()> {
        tracing::info!("Initiating graceful shutdown");
        self.accepting_new.store(false, Ordering::SeqCst);

        let wait = async {
            while self.active_runs() > 0 {
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
        };

        match tokio::time::timeout(SHUTDOWN_TIMEOUT, wait).await {
            Ok(()) => tracing::info!("All active runs completed"),
            Err(_) => tracing::warn!(
                active = self.active_runs(),
                "Timeout waiting for active runs, proceeding with shutdown"
            ),
        }

        tracing::info!("Shutdown complete");
        Ok(())
    }
}
