//! Playlist handlers: submit a URL, receive the zipped playlist.

use crate::api::AppState;
use crate::error::{ApiError, Error};
use crate::session::EMPTY_URL_MESSAGE;
use crate::types::{OutputArtifact, OutputMode, PackagedArchive, PlaylistRequest, RunId};
use axum::{
    Json,
    extract::State,
    http::{HeaderName, StatusCode, header},
    response::{IntoResponse, Response},
};

/// Header carrying the run identifier of a finished download
pub const RUN_ID_HEADER: &str = "x-run-id";

/// Download a playlist and return it as a zip archive
///
/// The request blocks until the whole playlist has been downloaded and packaged.
/// Progress for the run is published on `GET /events`.
#[utoipa::path(
    post,
    path = "/playlists",
    tag = "playlists",
    request_body = PlaylistRequest,
    responses(
        (status = 200, description = "Zip archive of the playlist", content_type = "application/zip"),
        (status = 400, description = "Empty or invalid playlist URL", body = ApiError),
        (status = 404, description = "Playlist is empty, private or unavailable", body = ApiError),
        (status = 500, description = "Packaging failed", body = ApiError),
        (status = 501, description = "No yt-dlp binary available", body = ApiError),
        (status = 502, description = "yt-dlp failed", body = ApiError),
        (status = 503, description = "Server is shutting down", body = ApiError)
    )
)]
pub async fn create_playlist_archive(
    State(state): State<AppState>,
    Json(request): Json<PlaylistRequest>,
) -> Response {
    let url = request.url.trim();
    if url.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiError::validation(EMPTY_URL_MESSAGE)),
        )
            .into_response();
    }

    let summary = match state
        .downloader
        .run_with_mode(&PlaylistRequest::new(url), OutputMode::Hosted)
        .await
    {
        Ok(summary) => summary,
        Err(e) => return e.into_response(),
    };

    match summary.artifact {
        OutputArtifact::Archive(archive) => archive_response(summary.run_id, archive),
        OutputArtifact::Directory { path } => Error::Other(format!(
            "run {} produced a directory ({}) instead of an archive",
            summary.run_id,
            path.display()
        ))
        .into_response(),
    }
}

fn archive_response(run_id: RunId, archive: PackagedArchive) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, archive.content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                content_disposition(&archive.filename),
            ),
            (HeaderName::from_static(RUN_ID_HEADER), run_id.to_string()),
        ],
        archive.bytes,
    )
        .into_response()
}

/// `attachment` disposition, with an RFC 5987 `filename*` for non-ASCII names
fn content_disposition(filename: &str) -> String {
    if filename.is_ascii() && !filename.chars().any(|c| c.is_ascii_control()) {
        return format!("attachment; filename=\"{}\"", filename);
    }

    let fallback: String = filename
        .chars()
        .map(|c| {
            if c.is_ascii() && !c.is_ascii_control() {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(filename)
    )
}
