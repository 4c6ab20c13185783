//! Per-request state machine.
//!
//! `Idle → ValidatingUrl → FetchingMetadata → Downloading → Packaging (hosted only)
//! → Succeeded | Failed`. Every transition is broadcast as an [`Event`] and every
//! failure carries the stage it happened in.

use crate::archive::ZipPackager;
use crate::engine::{EngineOptions, ItemEvent};
use crate::error::{Error, Result};
use crate::progress::ProgressState;
use crate::types::{
    Event, OutputArtifact, OutputMode, PackagedArchive, PlaylistRequest, RunId, RunSummary,
    RunTrace, Stage,
};
use crate::utils::{playlist_title, validate_playlist_url};
use std::path::PathBuf;
use tracing::Instrument;

use super::PlaylistDownloader;
use super::lifecycle::ActiveRun;

impl PlaylistDownloader {
    /// Run one playlist request in the configured output mode
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use playlist_dl::{Config, PlaylistDownloader, PlaylistRequest};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let downloader = PlaylistDownloader::new(Config::default()).await?;
    ///     let summary = downloader
    ///         .run(&PlaylistRequest::new("https://www.youtube.com/playlist?list=PL123"))
    ///         .await?;
    ///     println!("{}/{} saved to {}", summary.completed, summary.total, summary.artifact.location());
    ///     Ok(())
    /// }
    /// ```
    pub async fn run(&self, request: &PlaylistRequest) -> Result<RunSummary> {
        self.run_with_mode(request, self.config.download.mode).await
    }

    /// Run one playlist request in an explicit output mode
    ///
    /// Emits [`Event::Failed`] with the failing stage before returning an error.
    pub async fn run_with_mode(
        &self,
        request: &PlaylistRequest,
        mode: OutputMode,
    ) -> Result<RunSummary> {
        self.run_traced(request, mode, &mut RunTrace::default()).await
    }

    /// Run one playlist request, recording its progress through the stages in `trace`
    ///
    /// When this returns, `trace.stage` is [`Stage::Succeeded`] or [`Stage::Failed`].
    /// A failed run keeps the title and entry count if enumeration got that far.
    /// A run refused during shutdown fails from [`Stage::Idle`].
    pub async fn run_traced(
        &self,
        request: &PlaylistRequest,
        mode: OutputMode,
        trace: &mut RunTrace,
    ) -> Result<RunSummary> {
        let _active = match ActiveRun::enter(self) {
            Ok(active) => active,
            Err(e) => {
                trace.fail();
                return Err(e);
            }
        };
        let run_id = self.next_run_id();

        let span = tracing::info_span!("playlist_run", run_id = %run_id, ?mode);
        let result = self
            .execute(run_id, request, mode, trace)
            .instrument(span)
            .await;
        match &result {
            Ok(summary) => {
                trace.stage = Stage::Succeeded;
                tracing::info!(
                    run_id = %run_id,
                    title = %summary.playlist_title,
                    completed = summary.completed,
                    total = summary.total,
                    skipped = summary.skipped,
                    "playlist run succeeded"
                );
                self.emit_event(Event::Succeeded {
                    run_id,
                    location: summary.artifact.location(),
                    completed: summary.completed,
                    total: summary.total,
                    skipped: summary.skipped,
                });
            }
            Err(e) => {
                let stage = trace.fail();
                tracing::error!(run_id = %run_id, %stage, error = %e, "playlist run failed");
                self.emit_event(Event::Failed {
                    run_id,
                    stage,
                    error: e.to_string(),
                });
            }
        }
        debug_assert!(trace.stage.is_terminal());
        result
    }

    async fn execute(
        &self,
        run_id: RunId,
        request: &PlaylistRequest,
        mode: OutputMode,
        trace: &mut RunTrace,
    ) -> Result<RunSummary> {
        let url = request.url.as_str();

        trace.stage = Stage::ValidatingUrl;
        self.emit_event(Event::Validating {
            run_id,
            url: url.to_string(),
        });
        validate_playlist_url(url)?;

        trace.stage = Stage::FetchingMetadata;
        self.emit_event(Event::FetchingMetadata { run_id });
        let base = EngineOptions::base(self.config.engine.extra_args.clone());
        tracing::debug!(run_id = %run_id, url, engine = self.engine.name(), "enumerating playlist");
        let metadata = self.engine.enumerate(url, &base.for_enumeration()).await?;

        let mut progress = ProgressState::new(metadata.entries.len()).ok_or_else(|| {
            Error::UnavailablePlaylist {
                url: url.to_string(),
            }
        })?;
        let title = playlist_title(
            metadata.title.as_deref(),
            &self.config.download.default_title,
        );
        tracing::info!(run_id = %run_id, %title, total = progress.total(), "playlist resolved");
        trace.title = Some(title.clone());
        trace.total = Some(progress.total());
        self.emit_event(Event::MetadataFetched {
            run_id,
            title: title.clone(),
            total: progress.total(),
        });

        trace.stage = Stage::Downloading;
        let selector = self.config.download.selector_for(mode);

        let artifact = match mode {
            OutputMode::Local => {
                let output_dir = self.config.download.download_dir.join(&title);
                tokio::fs::create_dir_all(&output_dir).await?;

                let options = base.for_download(selector, &output_dir);
                self.download_into(run_id, url, &options, &mut progress)
                    .await?;

                OutputArtifact::Directory { path: output_dir }
            }
            OutputMode::Hosted => {
                tokio::fs::create_dir_all(&self.config.download.temp_dir).await?;
                // Removed on drop, whichever way this branch exits
                let temp_root = tempfile::Builder::new()
                    .prefix("playlist-")
                    .tempdir_in(&self.config.download.temp_dir)?;
                let media_dir = temp_root.path().join(&title);
                tokio::fs::create_dir_all(&media_dir).await?;

                let options = base.for_download(selector, &media_dir);
                self.download_into(run_id, url, &options, &mut progress)
                    .await?;

                trace.stage = Stage::Packaging;
                let archive_path = temp_root.path().join(format!("{title}.zip"));
                self.emit_event(Event::Packaging {
                    run_id,
                    archive: format!("{title}.zip"),
                });
                let archive = package_directory(media_dir, archive_path).await?;

                if let Err(e) = temp_root.close() {
                    tracing::warn!(run_id = %run_id, error = %e, "failed to remove temporary root");
                }
                OutputArtifact::Archive(archive)
            }
        };

        Ok(RunSummary {
            run_id,
            playlist_title: title,
            total: progress.total(),
            completed: progress.completed(),
            skipped: progress.remaining(),
            artifact,
        })
    }

    /// Full download with the progress aggregator wired in as the item callback
    async fn download_into(
        &self,
        run_id: RunId,
        url: &str,
        options: &EngineOptions,
        progress: &mut ProgressState,
    ) -> Result<()> {
        let event_tx = &self.event_tx;
        let mut on_item = |event: ItemEvent| match event {
            ItemEvent::Finished { path } => {
                let update = progress.on_item_completed();
                tracing::info!(
                    run_id = %run_id,
                    completed = update.completed,
                    total = update.total,
                    ?path,
                    "{}",
                    update.render()
                );
                event_tx
                    .send(Event::Progress {
                        run_id,
                        completed: update.completed,
                        total: update.total,
                        fraction: update.fraction,
                        status: update.render(),
                    })
                    .ok();
            }
            ItemEvent::Other { status } => {
                tracing::trace!(run_id = %run_id, %status, "engine status");
            }
        };

        self.engine.download(url, options, &mut on_item).await
    }
}

/// Zip `media_dir` into `archive_path` off the async runtime and load the result
async fn package_directory(media_dir: PathBuf, archive_path: PathBuf) -> Result<PackagedArchive> {
    let target = archive_path.clone();
    tokio::task::spawn_blocking(move || {
        ZipPackager::package(&media_dir, &archive_path)?;
        ZipPackager::read_archive(&archive_path)
    })
    .await
    .map_err(|e| Error::packaging(target, format!("packaging task failed: {}", e)))?
}
