//! # playlist-dl
//!
//! Download a whole video playlist in one go, driven by an external media engine
//! (yt-dlp).
//!
//! A submitted playlist URL moves through a small, linear pipeline:
//!
//! 1. **Validate** the URL (no engine call for malformed input)
//! 2. **Enumerate** the playlist without downloading media, to learn its title and size
//! 3. **Download** every item, reporting `completed / total` progress as items finish
//! 4. **Package** (hosted mode only) the playlist folder into `<title>.zip`
//!
//! Two output modes are supported. In local mode the files stay in
//! `<download_dir>/<title>/`. In hosted mode the run works inside a private
//! temporary root that is removed when the run ends, and the zip archive is
//! handed back in memory.
//!
//! ## Quick Start
//!
//! ```no_run
//! use playlist_dl::{Config, PlaylistDownloader, PlaylistRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let downloader = PlaylistDownloader::new(Config::default()).await?;
//!
//!     // Subscribe to events
//!     let mut events = downloader.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     let summary = downloader
//!         .run(&PlaylistRequest::new(
//!             "https://www.youtube.com/playlist?list=PLrAXtmErZgOeiKm4sgNOknGvNjby9efdf",
//!         ))
//!         .await?;
//!     println!("{} of {} videos saved", summary.completed, summary.total);
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// REST API module
pub mod api;
/// Zip packaging of playlist folders
pub mod archive;
/// Configuration types
pub mod config;
/// Core downloader implementation (decomposed into focused submodules)
pub mod downloader;
/// External media engine seam (yt-dlp)
pub mod engine;
/// Error types
pub mod error;
/// Per-run progress tracking
pub mod progress;
/// User-facing submission flow and messages
pub mod session;
/// Core types and events
pub mod types;
/// Utility functions
pub mod utils;

use std::sync::Arc;

// Re-export commonly used types
pub use config::{ApiConfig, Config, DownloadConfig, EngineConfig};
pub use downloader::PlaylistDownloader;
pub use engine::{EngineCapabilities, MediaEngine, NoOpEngine, YtDlpEngine};
pub use error::{ApiError, Error, ErrorDetail, Result, ToHttpStatus};
pub use progress::{ProgressState, ProgressUpdate};
pub use session::{Message, MessageLevel, Outcome, SessionController, SessionReport};
pub use types::{
    Capabilities, Event, MediaFormat, OutputArtifact, OutputMode, PackagedArchive,
    PlaylistRequest, RunId, RunSummary, RunTrace, Stage,
};

/// Serve the REST API until a termination signal arrives, then shut down gracefully.
///
/// In-flight requests are allowed to finish, then the downloader's `shutdown()`
/// waits for any runs still executing.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// # Example
///
/// ```no_run
/// use playlist_dl::{Config, PlaylistDownloader, run_with_shutdown};
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let downloader = PlaylistDownloader::new(Config::default()).await?;
///
///     // Run with automatic signal handling
///     run_with_shutdown(Arc::new(downloader)).await?;
///
///     Ok(())
/// }
/// ```
pub async fn run_with_shutdown(downloader: Arc<PlaylistDownloader>) -> Result<()> {
    let config = downloader.get_config();
    api::start_api_server_with_shutdown(downloader.clone(), config, wait_for_signal()).await?;
    downloader.shutdown().await
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Set up signal handlers - these may fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), _) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            if let Ok(mut sigint) = signal(SignalKind::interrupt()) {
                sigint.recv().await;
                tracing::info!("Received SIGINT signal (Ctrl+C)");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
        (_, Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
                sigterm.recv().await;
                tracing::info!("Received SIGTERM signal");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}
