//! Parsers for yt-dlp command output

use super::traits::ItemEvent;
use crate::types::{EntryRef, PlaylistMetadata};
use serde::Deserialize;
use std::path::PathBuf;

/// Prefix of the line yt-dlp prints after each item is moved into place
pub const FINISHED_MARKER: &str = "PLDL_FINISHED|";

/// Maximum number of stderr lines kept for error messages
const STDERR_TAIL_LINES: usize = 5;

/// Shape of `yt-dlp --flat-playlist --dump-single-json`
#[derive(Debug, Deserialize)]
struct RawPlaylist {
    #[serde(default)]
    title: Option<String>,
    // Unavailable entries show up as `null`
    #[serde(default)]
    entries: Vec<Option<EntryRef>>,
}

/// Parse the JSON document printed by a flat-playlist enumeration
///
/// A document without `entries` (e.g. a single video) yields an empty entry list,
/// which the orchestrator reports as an unavailable playlist.
pub fn parse_playlist_json(stdout: &[u8]) -> crate::Result<PlaylistMetadata> {
    let raw: RawPlaylist = serde_json::from_slice(stdout).map_err(|e| {
        crate::Error::Engine(format!("yt-dlp returned invalid playlist JSON: {}", e))
    })?;

    Ok(PlaylistMetadata {
        title: raw.title.filter(|t| !t.trim().is_empty()),
        entries: raw.entries.into_iter().flatten().collect(),
    })
}

/// Interpret one stdout line of a download run
pub fn parse_download_line(line: &str) -> Option<ItemEvent> {
    let line = line.trim_end_matches(['\r', '\n']);
    if let Some(path) = line.strip_prefix(FINISHED_MARKER) {
        let path = path.trim();
        return Some(ItemEvent::Finished {
            path: (!path.is_empty() && path != "NA").then(|| PathBuf::from(path)),
        });
    }

    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    // `[download] ...`, `[Merger] ...` and friends
    trimmed
        .strip_prefix('[')
        .and_then(|rest| rest.split_once(']'))
        .map(|(status, _)| ItemEvent::Other {
            status: status.to_string(),
        })
}

/// Reduce yt-dlp stderr to a message worth showing the user
///
/// Prefers `ERROR:` lines; otherwise keeps the last few non-empty lines.
pub fn summarize_stderr(stderr: &str) -> Option<String> {
    let errors: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|l| l.starts_with("ERROR:"))
        .collect();

    let picked: Vec<&str> = if errors.is_empty() {
        let lines: Vec<&str> = stderr
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
        lines[start..].to_vec()
    } else {
        let start = errors.len().saturating_sub(STDERR_TAIL_LINES);
        errors[start..].to_vec()
    };

    (!picked.is_empty()).then(|| picked.join("\n"))
}
