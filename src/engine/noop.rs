//! No-op engine for graceful degradation

use super::options::EngineOptions;
use super::traits::{EngineCapabilities, ItemEvent, MediaEngine};
use crate::types::PlaylistMetadata;
use async_trait::async_trait;

/// Engine used when no yt-dlp binary is available or configured
///
/// Every call returns `Error::NotSupported`, so the API server can still start and
/// report the missing dependency through `/capabilities` and per-request errors.
pub struct NoOpEngine;

const MISSING_ENGINE: &str = "playlist downloads require the external yt-dlp binary. \
     Configure ytdlp_path in config or ensure yt-dlp is in PATH.";

#[async_trait]
impl MediaEngine for NoOpEngine {
    async fn enumerate(&self, _url: &str, _options: &EngineOptions) -> crate::Result<PlaylistMetadata> {
        Err(crate::Error::NotSupported(MISSING_ENGINE.into()))
    }

    async fn download(
        &self,
        _url: &str,
        _options: &EngineOptions,
        _on_item: &mut (dyn FnMut(ItemEvent) + Send),
    ) -> crate::Result<()> {
        Err(crate::Error::NotSupported(MISSING_ENGINE.into()))
    }

    fn capabilities(&self) -> EngineCapabilities {
        EngineCapabilities {
            can_enumerate: false,
            can_download: false,
        }
    }

    fn name(&self) -> &'static str {
        "noop"
    }
}
