//! Shared test helpers: a scripted engine and downloader factory.

use crate::config::Config;
use crate::downloader::PlaylistDownloader;
use crate::engine::{EngineCapabilities, EngineOptions, ItemEvent, MediaEngine};
use crate::error::{Error, Result};
use crate::types::{EntryRef, Event, OutputMode, PlaylistMetadata};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::tempdir;

pub(crate) const PLAYLIST_URL: &str = "https://www.youtube.com/playlist?list=PLscripted";

/// Engine that plays back a fixed script instead of running yt-dlp
///
/// Each scripted item is written as `<output_dir>/Video N.mp4` before its
/// `Finished` event is reported.
pub(crate) struct ScriptedEngine {
    title: Option<String>,
    entries: usize,
    enumerate_error: Option<String>,
    /// Items actually produced by the download (defaults to `entries`)
    produced: usize,
    /// Fail the download after this many items
    fail_after: Option<(usize, String)>,
    /// Put a directory where the archive file will be created
    block_archive: bool,
    /// Never return from the download once the items are written
    hang: bool,
    pub(crate) enumerate_calls: AtomicUsize,
    pub(crate) download_calls: AtomicUsize,
    pub(crate) last_output_dir: Mutex<Option<PathBuf>>,
    pub(crate) last_format: Mutex<Option<String>>,
}

impl ScriptedEngine {
    pub(crate) fn with_items(title: Option<&str>, entries: usize) -> Self {
        Self {
            title: title.map(str::to_string),
            entries,
            enumerate_error: None,
            produced: entries,
            fail_after: None,
            block_archive: false,
            hang: false,
            enumerate_calls: AtomicUsize::new(0),
            download_calls: AtomicUsize::new(0),
            last_output_dir: Mutex::new(None),
            last_format: Mutex::new(None),
        }
    }

    pub(crate) fn failing_enumeration(message: &str) -> Self {
        Self {
            enumerate_error: Some(message.to_string()),
            ..Self::with_items(None, 0)
        }
    }

    pub(crate) fn failing_after(mut self, items: usize, message: &str) -> Self {
        self.fail_after = Some((items, message.to_string()));
        self
    }

    pub(crate) fn producing(mut self, items: usize) -> Self {
        self.produced = items;
        self
    }

    pub(crate) fn blocking_archive(mut self) -> Self {
        self.block_archive = true;
        self
    }

    pub(crate) fn hanging(mut self) -> Self {
        self.hang = true;
        self
    }

    pub(crate) fn calls(&self) -> (usize, usize) {
        (
            self.enumerate_calls.load(Ordering::SeqCst),
            self.download_calls.load(Ordering::SeqCst),
        )
    }

    pub(crate) fn output_dir(&self) -> Option<PathBuf> {
        self.last_output_dir.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaEngine for ScriptedEngine {
    async fn enumerate(&self, _url: &str, options: &EngineOptions) -> Result<PlaylistMetadata> {
        self.enumerate_calls.fetch_add(1, Ordering::SeqCst);
        assert!(options.extract_flat(), "enumeration must not download media");

        if let Some(ref message) = self.enumerate_error {
            return Err(Error::Engine(message.clone()));
        }
        Ok(PlaylistMetadata {
            title: self.title.clone(),
            entries: (1..=self.entries)
                .map(|n| EntryRef {
                    id: Some(format!("id{n}")),
                    title: Some(format!("Video {n}")),
                    url: None,
                })
                .collect(),
        })
    }

    async fn download(
        &self,
        _url: &str,
        options: &EngineOptions,
        on_item: &mut (dyn FnMut(ItemEvent) + Send),
    ) -> Result<()> {
        self.download_calls.fetch_add(1, Ordering::SeqCst);
        let output_dir = options
            .output_dir()
            .expect("download options carry an output dir")
            .to_path_buf();
        *self.last_output_dir.lock().unwrap() = Some(output_dir.clone());
        *self.last_format.lock().unwrap() = options.format().map(str::to_string);

        for n in 1..=self.produced {
            if let Some((after, ref message)) = self.fail_after {
                if n > after {
                    return Err(Error::Engine(message.clone()));
                }
            }
            let path = output_dir.join(format!("Video {n}.mp4"));
            std::fs::write(&path, format!("media {n}")).unwrap();
            on_item(ItemEvent::Other {
                status: "download".to_string(),
            });
            on_item(ItemEvent::Finished { path: Some(path) });
        }

        if self.block_archive {
            let name = output_dir.file_name().unwrap().to_string_lossy().into_owned();
            let parent = output_dir.parent().unwrap();
            std::fs::create_dir_all(parent.join(format!("{name}.zip"))).unwrap();
        }
        if self.hang {
            std::future::pending::<()>().await;
        }
        Ok(())
    }

    fn capabilities(&self) -> EngineCapabilities {
        EngineCapabilities {
            can_enumerate: true,
            can_download: true,
        }
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// Config rooted in a fresh tempdir
pub(crate) fn test_config(root: &std::path::Path, mode: OutputMode) -> Config {
    let mut config = Config::default();
    config.download.download_dir = root.join("downloads");
    config.download.temp_dir = root.join("temp");
    config.download.mode = mode;
    config
}

/// Create a downloader driven by `engine`.
/// Returns the downloader and the tempdir (which must be kept alive).
pub(crate) async fn create_test_downloader(
    engine: Arc<ScriptedEngine>,
    mode: OutputMode,
) -> (PlaylistDownloader, tempfile::TempDir) {
    let temp_dir = tempdir().unwrap();
    let config = test_config(temp_dir.path(), mode);
    let downloader = PlaylistDownloader::with_engine(config, engine)
        .await
        .unwrap();
    (downloader, temp_dir)
}

/// Everything currently buffered on a receiver
pub(crate) fn drain_events(rx: &mut tokio::sync::broadcast::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// `(completed, total)` of every progress event, in order
pub(crate) fn progress_steps(events: &[Event]) -> Vec<(usize, usize)> {
    events
        .iter()
        .filter_map(|e| match e {
            Event::Progress {
                completed, total, ..
            } => Some((*completed, *total)),
            _ => None,
        })
        .collect()
}
