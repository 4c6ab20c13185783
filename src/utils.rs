//! Utility functions for input validation and filename handling

use crate::error::{Error, Result};

/// Literal prefix every accepted playlist URL starts with
pub const PLAYLIST_URL_PREFIX: &str = "https://www.youtube.com/playlist?list=";

/// Characters that are illegal in file names on common filesystems
pub const FORBIDDEN_FILENAME_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Remove every character that is illegal in file names
///
/// Characters are deleted, not replaced. The result may be empty; callers that need
/// a usable name substitute a default (see [`playlist_title`]).
///
/// # Examples
///
/// ```
/// use playlist_dl::utils::sanitize_filename;
///
/// assert_eq!(sanitize_filename("AC/DC: Live?"), "ACDC Live");
/// assert_eq!(sanitize_filename(""), "");
/// ```
pub fn sanitize_filename(title: &str) -> String {
    title
        .chars()
        .filter(|c| !FORBIDDEN_FILENAME_CHARS.contains(c))
        .collect()
}

/// Whether `url` has the playlist URL shape
///
/// This is a prefix check only; the playlist is not looked up.
///
/// # Examples
///
/// ```
/// use playlist_dl::utils::is_playlist_url;
///
/// assert!(is_playlist_url("https://www.youtube.com/playlist?list=PL123"));
/// assert!(!is_playlist_url("https://example.com/not-a-playlist"));
/// ```
pub fn is_playlist_url(url: &str) -> bool {
    url.starts_with(PLAYLIST_URL_PREFIX)
}

/// Gate a submitted URL, returning [`Error::InvalidUrl`] on rejection
pub fn validate_playlist_url(url: &str) -> Result<()> {
    if is_playlist_url(url) {
        Ok(())
    } else {
        Err(Error::InvalidUrl {
            url: url.to_string(),
        })
    }
}

/// Directory/archive name for a playlist
///
/// Sanitizes the reported title and falls back to `default` when the title is
/// missing, nothing printable is left after sanitizing, or what is left is a
/// relative path component such as `.` or `..`.
pub fn playlist_title(reported: Option<&str>, default: &str) -> String {
    let sanitized = reported.map(sanitize_filename).unwrap_or_default();
    let trimmed = sanitized.trim();
    if is_usable_name(trimmed) {
        trimmed.to_string()
    } else {
        sanitize_filename(default).trim().to_string()
    }
}

/// Whether `name` can be joined onto a directory as one new component
///
/// Empty and dot-only names (`.`, `..`, `...`) are rejected: joined onto a
/// directory they resolve to that directory or one of its parents.
pub fn is_usable_name(name: &str) -> bool {
    !name.is_empty() && !name.chars().all(|c| c == '.')
}
