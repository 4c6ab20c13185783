//! Traits and types for the external media engine

use super::options::EngineOptions;
use crate::types::PlaylistMetadata;
use async_trait::async_trait;
use std::path::PathBuf;

/// Per-item event reported from inside [`MediaEngine::download`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemEvent {
    /// One media item finished (downloaded and post-processed)
    Finished {
        /// Final file path, when the engine reports it
        path: Option<PathBuf>,
    },
    /// Any other status the engine reports (ignored by the orchestrator)
    Other {
        /// Engine-specific status label
        status: String,
    },
}

/// Capabilities of an engine implementation
#[derive(Debug, Clone, Copy)]
pub struct EngineCapabilities {
    /// Can list playlist entries
    pub can_enumerate: bool,
    /// Can download media
    pub can_download: bool,
}

/// Trait for the playlist resolution and download engine
///
/// The orchestrator calls [`enumerate`](MediaEngine::enumerate) once with
/// metadata-only options, then [`download`](MediaEngine::download) once with
/// download options. Both calls are awaited to completion.
///
/// # Examples
///
/// ```no_run
/// use playlist_dl::engine::{EngineOptions, MediaEngine, YtDlpEngine};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let engine = YtDlpEngine::from_path().expect("yt-dlp not found in PATH");
/// let base = EngineOptions::base(Vec::new());
///
/// let metadata = engine
///     .enumerate("https://www.youtube.com/playlist?list=PL123", &base.for_enumeration())
///     .await?;
/// println!("{} entries", metadata.entries.len());
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait MediaEngine: Send + Sync {
    /// List the playlist's entries without downloading media
    ///
    /// # Errors
    ///
    /// Returns [`Error::Engine`](crate::Error::Engine) with the engine's own message
    /// when the playlist cannot be resolved, or
    /// [`Error::NotSupported`](crate::Error::NotSupported) when no engine is available.
    async fn enumerate(&self, url: &str, options: &EngineOptions)
    -> crate::Result<PlaylistMetadata>;

    /// Download every entry of the playlist
    ///
    /// `on_item` is invoked synchronously for each item event, in order. Items that
    /// fail individually are skipped by the engine and produce no event.
    ///
    /// # Errors
    ///
    /// Returns an error only for call-level failures (the engine could not run or
    /// aborted); no further events are delivered after that.
    async fn download(
        &self,
        url: &str,
        options: &EngineOptions,
        on_item: &mut (dyn FnMut(ItemEvent) + Send),
    ) -> crate::Result<()>;

    /// Query capabilities of this engine
    fn capabilities(&self) -> EngineCapabilities;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
