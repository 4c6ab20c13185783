//! Error types for playlist-dl
//!
//! This module provides the error taxonomy for a playlist run, including:
//! - One variant per failure phase (validation, enumeration, download, packaging)
//! - HTTP status code mapping for API integration
//! - Structured error responses with machine-readable error codes

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use utoipa::ToSchema;

/// Result type alias for playlist-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for playlist-dl
///
/// Every phase of a run returns this type. The session controller matches on the
/// variant to pick the message shown to the user.
#[derive(Debug, Error)]
pub enum Error {
    /// Submitted URL does not look like a playlist URL
    #[error(
        "invalid playlist URL {url:?}: expected a URL like {}PLAYLIST_ID",
        crate::utils::PLAYLIST_URL_PREFIX
    )]
    InvalidUrl {
        /// The rejected input
        url: String,
    },

    /// The engine found no entries (empty, private or otherwise unavailable playlist)
    #[error("no entries found for playlist {url}")]
    UnavailablePlaylist {
        /// The playlist URL that yielded no entries
        url: String,
    },

    /// The external engine failed during enumeration or download
    ///
    /// The message is the engine's own failure description, passed through verbatim.
    #[error("{0}")]
    Engine(String),

    /// Archive creation failed
    #[error("failed to package {archive}: {reason}")]
    Packaging {
        /// The archive that could not be produced
        archive: PathBuf,
        /// The reason packaging failed
        reason: String,
    },

    /// A submission arrived while another run of the same session was still in flight
    #[error("a playlist download is already in progress")]
    Busy,

    /// Shutdown in progress - not accepting new runs
    #[error("shutdown in progress: not accepting new playlist runs")]
    ShuttingDown,

    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "default_title")
        key: Option<String>,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),

    /// Operation not supported (missing binary, not implemented, etc.)
    #[error("not supported: {0}")]
    NotSupported(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Build a packaging error from anything displayable
    pub(crate) fn packaging(archive: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
        Error::Packaging {
            archive: archive.into(),
            reason: reason.to_string(),
        }
    }
}

/// API error response format
///
/// This structure is returned by API endpoints when an error occurs.
///
/// # Example JSON Response
///
/// ```json
/// {
///   "error": {
///     "code": "invalid_url",
///     "message": "invalid playlist URL \"https://example.com\": ...",
///     "details": {
///       "url": "https://example.com"
///     }
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// The error details
    pub error: ErrorDetail,
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "invalid_url", "unavailable_playlist")
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional context about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with code and message
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    /// Create a "validation error" error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new("validation_error", message)
    }

    /// Create an "internal server error"
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("internal_error", message)
    }
}

/// Convert errors to HTTP status codes for API responses
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - the user must correct and resubmit
            Error::InvalidUrl { .. } => 400,
            Error::Config { .. } => 400,

            // 404 Not Found - nothing downloadable behind the URL
            Error::UnavailablePlaylist { .. } => 404,

            // 409 Conflict
            Error::Busy => 409,

            // 503 Service Unavailable
            Error::ShuttingDown => 503,

            // 502 Bad Gateway - the external engine failed
            Error::Engine(_) => 502,

            // 501 Not Implemented - no engine available
            Error::NotSupported(_) => 501,

            // 500 Internal Server Error
            Error::Packaging { .. } => 500,
            Error::Io(_) => 500,
            Error::ApiServerError(_) => 500,
            Error::Other(_) => 500,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::InvalidUrl { .. } => "invalid_url",
            Error::UnavailablePlaylist { .. } => "unavailable_playlist",
            Error::Engine(_) => "engine_error",
            Error::Packaging { .. } => "packaging_failed",
            Error::Busy => "busy",
            Error::ShuttingDown => "shutting_down",
            Error::Config { .. } => "config_error",
            Error::Io(_) => "io_error",
            Error::ApiServerError(_) => "api_server_error",
            Error::NotSupported(_) => "not_supported",
            Error::Other(_) => "internal_error",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let code = error.error_code().to_string();
        let message = error.to_string();

        let details = match &error {
            Error::InvalidUrl { url } => Some(serde_json::json!({
                "url": url,
                "expected_prefix": crate::utils::PLAYLIST_URL_PREFIX,
            })),
            Error::UnavailablePlaylist { url } => Some(serde_json::json!({ "url": url })),
            Error::Packaging { archive, .. } => Some(serde_json::json!({ "archive": archive })),
            Error::Config {
                key: Some(key), ..
            } => Some(serde_json::json!({ "key": key })),
            _ => None,
        };

        ApiError {
            error: ErrorDetail {
                code,
                message,
                details,
            },
        }
    }
}
