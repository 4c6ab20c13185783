//! Route handlers for the REST API
//!
//! Handlers are organized by domain:
//! - [`playlists`] - Playlist submission and archive download
//! - [`system`] - Health, capabilities, events, OpenAPI

mod playlists;
mod system;

// Re-export all handlers so `routes::function_name` works
pub use playlists::*;
pub use system::*;
