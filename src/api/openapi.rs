//! OpenAPI documentation and schema generation
//!
//! The specification is generated at compile time with utoipa.

use utoipa::OpenApi;

/// OpenAPI documentation for the playlist-dl REST API
///
/// The spec can be accessed via:
/// - `/openapi.json` - JSON format OpenAPI specification
/// - `/swagger-ui` - Interactive Swagger UI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "playlist-dl REST API",
        version = "0.1.0",
        description = "Download a playlist through yt-dlp and receive it as a single zip archive",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:8686", description = "Local development server")
    ),
    paths(
        // Playlists
        crate::api::routes::create_playlist_archive,

        // System
        crate::api::routes::get_capabilities,
        crate::api::routes::health_check,
        crate::api::routes::openapi_spec,
        crate::api::routes::event_stream,
    ),
    components(schemas(
        // Core types from types.rs
        crate::types::PlaylistRequest,
        crate::types::RunId,
        crate::types::Stage,
        crate::types::OutputMode,
        crate::types::MediaFormat,
        crate::types::Event,
        crate::types::Capabilities,
        crate::types::EngineCapabilitiesInfo,

        // Config types from config.rs
        crate::config::Config,
        crate::config::DownloadConfig,
        crate::config::EngineConfig,
        crate::config::ApiConfig,

        // Error types from error.rs
        crate::error::ApiError,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "playlists", description = "Playlist downloads - Submit a playlist URL, receive a zip archive"),
        (name = "system", description = "System endpoints - Health checks, capabilities, OpenAPI spec, events"),
    )
)]
pub struct ApiDoc;
