//! Core types for playlist-dl

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use utoipa::ToSchema;

/// Identifier of one orchestrator run
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct RunId(pub u64);

impl RunId {
    /// Get the inner value
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl From<u64> for RunId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where finished media ends up
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    /// Files are kept in `<download_dir>/<playlist title>/`
    #[default]
    Local,
    /// Files are zipped in a temporary root and handed back as one archive
    Hosted,
}

impl std::str::FromStr for OutputMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "local" => Ok(OutputMode::Local),
            "hosted" | "zip" => Ok(OutputMode::Hosted),
            other => Err(format!("unknown output mode '{other}' (expected local or hosted)")),
        }
    }
}

/// Media format requested from the engine
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MediaFormat {
    /// Best single-file MP4 video
    Video,
    /// Compact audio-only stream
    Audio,
}

impl MediaFormat {
    /// yt-dlp format selector for this format
    pub fn selector(&self) -> &'static str {
        match self {
            MediaFormat::Video => "best[ext=mp4]",
            MediaFormat::Audio => "bestaudio[abr<=128][ext=m4a]/bestaudio[abr<=128]/bestaudio",
        }
    }
}

impl std::str::FromStr for MediaFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "video" | "mp4" => Ok(MediaFormat::Video),
            "audio" => Ok(MediaFormat::Audio),
            other => Err(format!("unknown format '{other}' (expected video or audio)")),
        }
    }
}

/// Orchestrator state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Nothing submitted yet
    #[default]
    Idle,
    /// Checking the submitted URL
    ValidatingUrl,
    /// Metadata-only enumeration of the playlist
    FetchingMetadata,
    /// Full download through the engine
    Downloading,
    /// Zipping the output directory (hosted mode only)
    Packaging,
    /// Terminal success
    Succeeded,
    /// Terminal failure
    Failed,
}

impl Stage {
    /// Whether the run is over
    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::Succeeded | Stage::Failed)
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Idle => "idle",
            Stage::ValidatingUrl => "validating_url",
            Stage::FetchingMetadata => "fetching_metadata",
            Stage::Downloading => "downloading",
            Stage::Packaging => "packaging",
            Stage::Succeeded => "succeeded",
            Stage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// What a run has reached and learned, readable after it returns
///
/// A finished run always leaves `stage` at [`Stage::Succeeded`] or
/// [`Stage::Failed`]; a failed run also records the stage it failed in.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunTrace {
    /// Current stage
    pub stage: Stage,
    /// Stage in which the run failed
    pub failed_in: Option<Stage>,
    /// Sanitized playlist title, once enumeration succeeded
    pub title: Option<String>,
    /// Number of entries, once enumeration succeeded
    pub total: Option<usize>,
}

impl RunTrace {
    /// Record a failure in the current stage
    pub(crate) fn fail(&mut self) -> Stage {
        let failed_in = self.stage;
        self.failed_in = Some(failed_in);
        self.stage = Stage::Failed;
        failed_in
    }
}

/// A user submission
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PlaylistRequest {
    /// Playlist URL as typed by the user
    pub url: String,
}

impl PlaylistRequest {
    /// Create a request
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

/// One playlist item as reported by the engine's enumeration
///
/// The orchestrator only counts these.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryRef {
    /// Engine-specific identifier
    #[serde(default)]
    pub id: Option<String>,
    /// Item title, when the engine reports one
    #[serde(default)]
    pub title: Option<String>,
    /// Item URL, when the engine reports one
    #[serde(default)]
    pub url: Option<String>,
}

/// Result of a metadata-only enumeration
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistMetadata {
    /// Playlist title (absent for some private or generated playlists)
    #[serde(default)]
    pub title: Option<String>,
    /// Ordered entries
    #[serde(default)]
    pub entries: Vec<EntryRef>,
}

/// A zip archive held in memory, ready to hand to the caller
#[derive(Clone, PartialEq, Eq)]
pub struct PackagedArchive {
    /// File name offered for retrieval (`<title>.zip`)
    pub filename: String,
    /// MIME type of `bytes`
    pub content_type: &'static str,
    /// Archive contents
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for PackagedArchive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PackagedArchive")
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// What a successful run produced
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OutputArtifact {
    /// Local mode: the playlist directory
    Directory {
        /// Directory holding the media files
        path: PathBuf,
    },
    /// Hosted mode: the packaged archive
    Archive(PackagedArchive),
}

impl OutputArtifact {
    /// Human-readable location for success messages
    pub fn location(&self) -> String {
        match self {
            OutputArtifact::Directory { path } => format!("{}/", path.display()),
            OutputArtifact::Archive(archive) => archive.filename.clone(),
        }
    }
}

/// Summary of a successful run
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunSummary {
    /// Run identifier
    pub run_id: RunId,
    /// Sanitized playlist title
    pub playlist_title: String,
    /// Number of entries reported by enumeration
    pub total: usize,
    /// Number of items the engine reported as finished
    pub completed: usize,
    /// Entries that produced no file (swallowed per-item failures)
    pub skipped: usize,
    /// Produced artifact
    pub artifact: OutputArtifact,
}

/// Event emitted during a run
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// URL received and being validated
    Validating {
        /// Run ID
        run_id: RunId,
        /// Submitted URL
        url: String,
    },

    /// Metadata-only enumeration started
    FetchingMetadata {
        /// Run ID
        run_id: RunId,
    },

    /// Enumeration finished with at least one entry
    MetadataFetched {
        /// Run ID
        run_id: RunId,
        /// Sanitized playlist title
        title: String,
        /// Number of entries
        total: usize,
    },

    /// One more item finished downloading
    Progress {
        /// Run ID
        run_id: RunId,
        /// Items finished so far
        completed: usize,
        /// Items expected
        total: usize,
        /// completed / total (0.0 to 1.0)
        fraction: f64,
        /// Rendered status line
        status: String,
    },

    /// Output directory is being zipped
    Packaging {
        /// Run ID
        run_id: RunId,
        /// Archive file name
        archive: String,
    },

    /// Run finished successfully
    Succeeded {
        /// Run ID
        run_id: RunId,
        /// Directory or archive name
        location: String,
        /// Items finished
        completed: usize,
        /// Items expected
        total: usize,
        /// Items that produced no file
        skipped: usize,
    },

    /// Run failed
    Failed {
        /// Run ID
        run_id: RunId,
        /// Stage in which the failure happened
        stage: Stage,
        /// Error message
        error: String,
    },
}

impl Event {
    /// Run this event belongs to
    pub fn run_id(&self) -> RunId {
        match self {
            Event::Validating { run_id, .. }
            | Event::FetchingMetadata { run_id }
            | Event::MetadataFetched { run_id, .. }
            | Event::Progress { run_id, .. }
            | Event::Packaging { run_id, .. }
            | Event::Succeeded { run_id, .. }
            | Event::Failed { run_id, .. } => *run_id,
        }
    }

    /// SSE event name
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Validating { .. } => "validating",
            Event::FetchingMetadata { .. } => "fetching_metadata",
            Event::MetadataFetched { .. } => "metadata_fetched",
            Event::Progress { .. } => "progress",
            Event::Packaging { .. } => "packaging",
            Event::Succeeded { .. } => "succeeded",
            Event::Failed { .. } => "failed",
        }
    }
}

/// System capabilities exposed over the API
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct Capabilities {
    /// Engine capabilities
    pub engine: EngineCapabilitiesInfo,
    /// Output mode used by this instance
    pub mode: OutputMode,
}

/// Engine capabilities as reported by the active [`MediaEngine`](crate::engine::MediaEngine)
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct EngineCapabilitiesInfo {
    /// Can list playlist entries
    pub can_enumerate: bool,
    /// Can download media
    pub can_download: bool,
    /// Engine implementation name
    pub name: String,
}
