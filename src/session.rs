//! Session controller
//!
//! Binds one submitted URL to one orchestrator run and turns the typed result into
//! the messages shown to the user. A session refuses a second submission while its
//! current run is still in flight.

use crate::downloader::PlaylistDownloader;
use crate::error::Error;
use crate::types::{OutputArtifact, OutputMode, PlaylistRequest, RunId, RunSummary, RunTrace, Stage};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Warning shown for an empty submission
pub const EMPTY_URL_MESSAGE: &str = "Please enter a playlist URL";

/// Severity of a user-facing message
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageLevel {
    /// Neutral information
    Info,
    /// Successful completion
    Success,
    /// Something the user should notice
    Warning,
    /// A failed submission
    Error,
}

/// One user-facing message
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Severity
    pub level: MessageLevel,
    /// Text as shown to the user
    pub text: String,
}

impl Message {
    fn new(level: MessageLevel, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
        }
    }
}

/// How a submission ended
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The run finished and produced an artifact
    Succeeded,
    /// The run started and failed
    Failed,
    /// No run was started (empty input or a run already in flight)
    Rejected,
}

/// Result of one [`SessionController::submit`] call
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionReport {
    /// Run identifier of a successful run
    pub run_id: Option<RunId>,
    /// How the submission ended
    pub outcome: Outcome,
    /// Stage the run ended in ([`Stage::Idle`] when no run was started)
    pub stage: Stage,
    /// Messages in display order
    pub messages: Vec<Message>,
    /// Produced artifact on success
    pub artifact: Option<OutputArtifact>,
}

impl SessionReport {
    fn rejected(message: Message) -> Self {
        Self {
            run_id: None,
            outcome: Outcome::Rejected,
            stage: Stage::Idle,
            messages: vec![message],
            artifact: None,
        }
    }

    /// Whether the submission produced an artifact
    pub fn is_success(&self) -> bool {
        self.outcome == Outcome::Succeeded
    }
}

/// Drives submissions for one user session
#[derive(Clone)]
pub struct SessionController {
    downloader: Arc<PlaylistDownloader>,
    mode: OutputMode,
    in_flight: Arc<AtomicBool>,
}

/// Clears the in-flight flag however the run ends
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl SessionController {
    /// Session running in the downloader's configured mode
    pub fn new(downloader: Arc<PlaylistDownloader>) -> Self {
        let mode = downloader.get_config().download.mode;
        Self::with_mode(downloader, mode)
    }

    /// Session running in an explicit output mode
    pub fn with_mode(downloader: Arc<PlaylistDownloader>, mode: OutputMode) -> Self {
        Self {
            downloader,
            mode,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Output mode of this session
    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Whether a run of this session is currently executing
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Run the orchestrator for `url` and report the outcome as user messages
    ///
    /// The input is trimmed first; an empty submission is rejected with a warning.
    /// A submission made while another run of this session is in flight is rejected
    /// with [`Error::Busy`].
    pub async fn submit(&self, url: &str) -> SessionReport {
        let url = url.trim();
        if url.is_empty() {
            return SessionReport::rejected(Message::new(MessageLevel::Warning, EMPTY_URL_MESSAGE));
        }

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::warn!(url, "submission rejected, a run is already in flight");
            return SessionReport::rejected(Message::new(
                MessageLevel::Error,
                error_message(&Error::Busy),
            ));
        }
        let _in_flight = InFlight(&self.in_flight);

        let mut trace = RunTrace::default();
        match self
            .downloader
            .run_traced(&PlaylistRequest::new(url), self.mode, &mut trace)
            .await
        {
            Ok(summary) => self.success_report(summary),
            Err(e) => {
                // Metadata already shown to the user stays visible above the error
                let mut messages = match (&trace.title, trace.total) {
                    (Some(title), Some(total)) => playlist_messages(title, total),
                    _ => Vec::new(),
                };
                messages.push(Message::new(MessageLevel::Error, error_message(&e)));
                SessionReport {
                    run_id: None,
                    outcome: Outcome::Failed,
                    stage: trace.stage,
                    messages,
                    artifact: None,
                }
            }
        }
    }

    fn success_report(&self, summary: RunSummary) -> SessionReport {
        let mut messages = playlist_messages(&summary.playlist_title, summary.total);
        if summary.skipped > 0 {
            messages.push(Message::new(
                MessageLevel::Warning,
                format!("Skipped {} unavailable item(s)", summary.skipped),
            ));
        }
        let done = match &summary.artifact {
            OutputArtifact::Directory { .. } => format!(
                "Download completed! Videos saved in: {}",
                summary.artifact.location()
            ),
            OutputArtifact::Archive(archive) => {
                format!("Download completed! Archive ready: {}", archive.filename)
            }
        };
        messages.push(Message::new(MessageLevel::Success, done));

        SessionReport {
            run_id: Some(summary.run_id),
            outcome: Outcome::Succeeded,
            stage: Stage::Succeeded,
            messages,
            artifact: Some(summary.artifact),
        }
    }
}

fn playlist_messages(title: &str, total: usize) -> Vec<Message> {
    vec![
        Message::new(MessageLevel::Info, format!("Playlist: {title}")),
        Message::new(MessageLevel::Info, format!("Total videos: {total}")),
    ]
}

/// User-facing text for a failed submission
pub fn error_message(error: &Error) -> String {
    match error {
        Error::InvalidUrl { .. } => format!(
            "Error: Invalid playlist URL format. Please use a URL like: {}PLAYLIST_ID",
            crate::utils::PLAYLIST_URL_PREFIX
        ),
        Error::UnavailablePlaylist { .. } => {
            "Error: No videos found in playlist or playlist is private/unavailable".to_string()
        }
        Error::Packaging { reason, .. } => {
            format!("Error: Failed to package playlist: {}", reason)
        }
        Error::Busy => "Error: A playlist download is already in progress".to_string(),
        other => format!("An error occurred: {}", other),
    }
}
