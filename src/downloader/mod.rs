//! Playlist downloader split into focused submodules.
//!
//! The `PlaylistDownloader` struct and its methods are organized by domain:
//! - [`run`] - The per-request state machine (validate, enumerate, download, package)
//! - [`lifecycle`] - Active-run tracking and graceful shutdown

mod lifecycle;
mod run;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

use crate::config::Config;
use crate::engine::{MediaEngine, engine_from_config};
use crate::error::{Error, Result};
use crate::types::{Capabilities, EngineCapabilitiesInfo, Event, RunId};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

/// Main downloader instance (cloneable - all fields are Arc-wrapped)
#[derive(Clone)]
pub struct PlaylistDownloader {
    /// Event broadcast channel sender (multiple subscribers supported)
    pub(crate) event_tx: tokio::sync::broadcast::Sender<Event>,
    /// Configuration (wrapped in Arc for sharing across tasks)
    pub(crate) config: Arc<Config>,
    /// External engine (trait object for pluggable implementations)
    pub(crate) engine: Arc<dyn MediaEngine>,
    /// Source of run identifiers
    pub(crate) next_run_id: Arc<AtomicU64>,
    /// Cleared once shutdown starts
    pub(crate) accepting_new: Arc<AtomicBool>,
    /// Number of runs currently executing
    pub(crate) active_runs: Arc<AtomicUsize>,
}

impl PlaylistDownloader {
    /// Create a new PlaylistDownloader instance
    ///
    /// Creates the download and temp directories and picks the engine from the
    /// `engine` section of the configuration (explicit path, PATH search, or the
    /// no-op fallback).
    pub async fn new(config: Config) -> Result<Self> {
        let engine = engine_from_config(&config.engine);
        Self::with_engine(config, engine).await
    }

    /// Create a downloader driven by a specific engine
    pub async fn with_engine(config: Config, engine: Arc<dyn MediaEngine>) -> Result<Self> {
        config.validate()?;

        // Ensure download and temp directories exist
        for dir in [&config.download.download_dir, &config.download.temp_dir] {
            tokio::fs::create_dir_all(dir).await.map_err(|e| {
                Error::Io(std::io::Error::new(
                    e.kind(),
                    format!("Failed to create directory '{}': {}", dir.display(), e),
                ))
            })?;
        }

        // Create broadcast channel with buffer size of 1000 events
        let (event_tx, _rx) = tokio::sync::broadcast::channel(1000);

        let caps = engine.capabilities();
        tracing::info!(
            engine = engine.name(),
            can_enumerate = caps.can_enumerate,
            can_download = caps.can_download,
            "Media engine initialized"
        );

        Ok(Self {
            event_tx,
            config: Arc::new(config),
            engine,
            next_run_id: Arc::new(AtomicU64::new(0)),
            accepting_new: Arc::new(AtomicBool::new(true)),
            active_runs: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Subscribe to run events
    ///
    /// Multiple subscribers are supported. Each subscriber receives all events independently.
    /// Events are buffered, but if a subscriber falls behind by more than 1000 events,
    /// it will receive a `RecvError::Lagged` error.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use playlist_dl::{Config, PlaylistDownloader};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let downloader = PlaylistDownloader::new(Config::default()).await?;
    ///
    ///     let mut events = downloader.subscribe();
    ///     tokio::spawn(async move {
    ///         while let Ok(event) = events.recv().await {
    ///             tracing::info!(?event, "playlist event");
    ///         }
    ///     });
    ///
    ///     Ok(())
    /// }
    /// ```
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Get the current configuration
    pub fn get_config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }

    /// Query which engine is in use and what it can do
    pub fn capabilities(&self) -> Capabilities {
        let caps = self.engine.capabilities();
        Capabilities {
            engine: EngineCapabilitiesInfo {
                can_enumerate: caps.can_enumerate,
                can_download: caps.can_download,
                name: self.engine.name().to_string(),
            },
            mode: self.config.download.mode,
        }
    }

    /// Emit an event to all subscribers
    ///
    /// If there are no active subscribers, the event is silently dropped.
    pub(crate) fn emit_event(&self, event: Event) {
        // send() returns Err if there are no receivers, which is fine - we just drop the event
        self.event_tx.send(event).ok();
    }

    pub(crate) fn next_run_id(&self) -> RunId {
        RunId(self.next_run_id.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Spawn the REST API server in a background task
    ///
    /// The server listens on the configured bind address (default: 127.0.0.1:8686).
    pub fn spawn_api_server(self: &Arc<Self>) -> tokio::task::JoinHandle<Result<()>> {
        let downloader = self.clone();
        let config = self.config.clone();

        tokio::spawn(async move { crate::api::start_api_server(downloader, config).await })
    }
}
