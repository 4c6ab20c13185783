//! CLI-based engine using the external yt-dlp binary

use super::options::EngineOptions;
use super::parser::{FINISHED_MARKER, parse_download_line, parse_playlist_json, summarize_stderr};
use super::traits::{EngineCapabilities, ItemEvent, MediaEngine};
use crate::error::Error;
use crate::types::PlaylistMetadata;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;

/// Engine backed by the external `yt-dlp` binary
///
/// Enumeration runs `yt-dlp --flat-playlist --dump-single-json`; downloads run
/// `yt-dlp --print after_move:...` and report one [`ItemEvent::Finished`] per item
/// moved into the output directory.
///
/// # Examples
///
/// ```no_run
/// use playlist_dl::engine::YtDlpEngine;
/// use std::path::PathBuf;
///
/// // Create with explicit path
/// let engine = YtDlpEngine::new(PathBuf::from("/usr/local/bin/yt-dlp"));
///
/// // Or auto-discover from PATH
/// let engine = YtDlpEngine::from_path().expect("yt-dlp not found in PATH");
/// ```
pub struct YtDlpEngine {
    binary_path: PathBuf,
}

impl YtDlpEngine {
    /// Create a new engine with an explicit binary path
    pub fn new(binary_path: PathBuf) -> Self {
        Self { binary_path }
    }

    /// Attempt to find yt-dlp in PATH
    pub fn from_path() -> Option<Self> {
        which::which("yt-dlp").ok().map(Self::new)
    }

    /// Path of the binary this engine runs
    pub fn binary_path(&self) -> &Path {
        &self.binary_path
    }

    fn common_args(options: &EngineOptions) -> Vec<String> {
        let mut args = Vec::new();
        if options.ignore_errors() {
            args.push("--ignore-errors".to_string());
        }
        if options.no_warnings() {
            args.push("--no-warnings".to_string());
        }
        if options.quiet() {
            args.push("--quiet".to_string());
        }
        args
    }

    /// Arguments for a metadata-only enumeration
    pub(crate) fn enumerate_args(url: &str, options: &EngineOptions) -> Vec<String> {
        let mut args = vec![
            "--flat-playlist".to_string(),
            "--dump-single-json".to_string(),
        ];
        args.extend(Self::common_args(options));
        args.extend(options.extra_args().iter().cloned());
        args.push("--".to_string());
        args.push(url.to_string());
        args
    }

    /// Arguments for a full download
    pub(crate) fn download_args(url: &str, options: &EngineOptions) -> Vec<String> {
        let mut args = Self::common_args(options);
        args.push("--newline".to_string());
        args.push("--windows-filenames".to_string());
        if let Some(format) = options.format() {
            args.push("--format".to_string());
            args.push(format.to_string());
        }
        if let Some(template) = options.output_template() {
            args.push("--output".to_string());
            args.push(template.to_string_lossy().into_owned());
        }
        args.push("--print".to_string());
        args.push(format!("after_move:{}%(filepath)s", FINISHED_MARKER));
        args.extend(options.extra_args().iter().cloned());
        args.push("--".to_string());
        args.push(url.to_string());
        args
    }

    fn command(&self, args: &[String]) -> Command {
        let mut command = Command::new(&self.binary_path);
        command
            .args(args)
            .env("PYTHONIOENCODING", "UTF-8")
            .stdin(Stdio::null())
            .kill_on_drop(true);
        command
    }
}

#[async_trait]
impl MediaEngine for YtDlpEngine {
    async fn enumerate(&self, url: &str, options: &EngineOptions) -> crate::Result<PlaylistMetadata> {
        let args = Self::enumerate_args(url, options);
        tracing::debug!(binary = %self.binary_path.display(), ?args, "running yt-dlp enumeration");

        let output = self
            .command(&args)
            .output()
            .await
            .map_err(|e| Error::Engine(format!("Failed to execute yt-dlp: {}", e)))?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() && output.stdout.iter().all(u8::is_ascii_whitespace) {
            return Err(Error::Engine(summarize_stderr(&stderr).unwrap_or_else(|| {
                format!("yt-dlp exited with {}", output.status)
            })));
        }

        match parse_playlist_json(&output.stdout) {
            Ok(metadata) => {
                if !output.status.success() {
                    tracing::warn!(
                        status = %output.status,
                        "yt-dlp enumeration reported errors, using partial result"
                    );
                }
                Ok(metadata)
            }
            Err(e) if !output.status.success() => Err(Error::Engine(
                summarize_stderr(&stderr).unwrap_or_else(|| e.to_string()),
            )),
            Err(e) => Err(e),
        }
    }

    async fn download(
        &self,
        url: &str,
        options: &EngineOptions,
        on_item: &mut (dyn FnMut(ItemEvent) + Send),
    ) -> crate::Result<()> {
        let args = Self::download_args(url, options);
        tracing::debug!(binary = %self.binary_path.display(), ?args, "running yt-dlp download");

        let mut child = self
            .command(&args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::Engine(format!("Failed to execute yt-dlp: {}", e)))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::Engine("failed to capture yt-dlp stdout".to_string()))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| Error::Engine("failed to capture yt-dlp stderr".to_string()))?;

        // Drain stderr concurrently so a chatty engine cannot block on a full pipe
        let stderr_task = tokio::spawn(async move {
            let mut buf = Vec::new();
            if let Err(e) = stderr.read_to_end(&mut buf).await {
                tracing::debug!(error = %e, "stopped reading yt-dlp stderr");
            }
            String::from_utf8_lossy(&buf).into_owned()
        });

        let mut finished = 0usize;
        let mut segments = BufReader::new(stdout).split(b'\n');
        while let Some(segment) = segments
            .next_segment()
            .await
            .map_err(|e| Error::Engine(format!("failed to read yt-dlp output: {}", e)))?
        {
            let line = String::from_utf8_lossy(&segment);
            if let Some(event) = parse_download_line(&line) {
                if matches!(event, ItemEvent::Finished { .. }) {
                    finished += 1;
                }
                on_item(event);
            }
        }

        let status = child
            .wait()
            .await
            .map_err(|e| Error::Engine(format!("failed to wait for yt-dlp: {}", e)))?;
        let stderr = stderr_task.await.unwrap_or_default();

        if status.success() {
            return Ok(());
        }

        let Some(code) = status.code() else {
            return Err(Error::Engine(format!("yt-dlp was terminated: {}", status)));
        };

        let summary = summarize_stderr(&stderr);
        if options.ignore_errors() && finished > 0 {
            tracing::warn!(
                exit_code = code,
                finished,
                errors = summary.as_deref().unwrap_or(""),
                "yt-dlp skipped some items"
            );
            return Ok(());
        }

        Err(Error::Engine(summary.unwrap_or_else(|| {
            format!("yt-dlp exited with code {}", code)
        })))
    }

    fn capabilities(&self) -> EngineCapabilities {
        EngineCapabilities {
            can_enumerate: true,
            can_download: true,
        }
    }

    fn name(&self) -> &'static str {
        "yt-dlp"
    }
}
