//! Application state for the API server

use crate::{Config, PlaylistDownloader};
use std::sync::Arc;

/// Shared application state accessible to all route handlers
///
/// This struct is cloned for each request (cheap Arc clone). Each request is its
/// own session: runs do not share temporary roots or progress state.
#[derive(Clone)]
pub struct AppState {
    /// The downloader every request runs through
    pub downloader: Arc<PlaylistDownloader>,

    /// Configuration (read-only)
    pub config: Arc<Config>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(downloader: Arc<PlaylistDownloader>, config: Arc<Config>) -> Self {
        Self { downloader, config }
    }
}
