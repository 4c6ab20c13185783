//! External media engine
//!
//! Playlist resolution and media download are delegated to an external engine.
//! The [`MediaEngine`] trait is the seam; implementations provided:
//!
//! - [`YtDlpEngine`]: runs the external `yt-dlp` binary
//! - [`NoOpEngine`]: stub used when no binary is available
//!
//! ## Usage
//!
//! ```no_run
//! use playlist_dl::engine::{EngineOptions, MediaEngine, YtDlpEngine};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let engine = YtDlpEngine::from_path().expect("yt-dlp binary not found");
//!     let url = "https://www.youtube.com/playlist?list=PL123";
//!
//!     let base = EngineOptions::base(Vec::new());
//!     let metadata = engine.enumerate(url, &base.for_enumeration()).await?;
//!
//!     let mut done = 0;
//!     let download = base.for_download("best[ext=mp4]", Path::new("downloads/Mix"));
//!     engine.download(url, &download, &mut |_event| done += 1).await?;
//!     println!("{done}/{} items", metadata.entries.len());
//!     Ok(())
//! }
//! ```

mod cli;
mod noop;
mod options;
pub(crate) mod parser;
mod traits;

pub use cli::YtDlpEngine;
pub use noop::NoOpEngine;
pub use options::{EngineOptions, ITEM_FILENAME_TEMPLATE, Phase};
pub use traits::{EngineCapabilities, ItemEvent, MediaEngine};

use crate::config::EngineConfig;
use std::sync::Arc;

/// Pick the engine implementation for a configuration
///
/// An explicit `ytdlp_path` wins; otherwise PATH is searched when allowed, and the
/// [`NoOpEngine`] is used as a last resort.
pub fn engine_from_config(config: &EngineConfig) -> Arc<dyn MediaEngine> {
    if let Some(ref path) = config.ytdlp_path {
        Arc::new(YtDlpEngine::new(path.clone()))
    } else if config.search_path {
        YtDlpEngine::from_path()
            .map(|e| Arc::new(e) as Arc<dyn MediaEngine>)
            .unwrap_or_else(|| Arc::new(NoOpEngine))
    } else {
        Arc::new(NoOpEngine)
    }
}
