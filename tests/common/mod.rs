//! Common test utilities for playlist-dl integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use playlist_dl::engine::{EngineCapabilities, EngineOptions, ItemEvent, MediaEngine};
use playlist_dl::types::{EntryRef, PlaylistMetadata};
use playlist_dl::{Config, Error, Event, OutputMode, PlaylistDownloader, Result};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::broadcast::Receiver;

pub const PLAYLIST_URL: &str = "https://www.youtube.com/playlist?list=PLintegration";

/// In-process engine: enumerates `count` tracks and writes one file per track
pub struct FakeEngine {
    pub title: Option<String>,
    pub count: usize,
    /// Tracks that fail silently (no file, no finished report)
    pub missing: Vec<usize>,
}

impl FakeEngine {
    pub fn new(title: &str, count: usize) -> Self {
        Self {
            title: Some(title.to_string()),
            count,
            missing: Vec::new(),
        }
    }
}

#[async_trait]
impl MediaEngine for FakeEngine {
    async fn enumerate(&self, _url: &str, _options: &EngineOptions) -> Result<PlaylistMetadata> {
        Ok(PlaylistMetadata {
            title: self.title.clone(),
            entries: (1..=self.count)
                .map(|n| EntryRef {
                    id: Some(format!("track-{n}")),
                    ..Default::default()
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
        let dir = options
            .output_dir()
            .ok_or_else(|| Error::Other("no output dir".into()))?
            .to_path_buf();
        for n in (1..=self.count).filter(|n| !self.missing.contains(n)) {
            let path = dir.join(format!("Track {n}.m4a"));
            tokio::fs::write(&path, format!("track {n}")).await?;
            on_item(ItemEvent::Finished { path: Some(path) });
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
        "fake"
    }
}

/// Config with every directory under `root`
pub fn config_in(root: &Path, mode: OutputMode) -> Config {
    let mut config = Config::default();
    config.download.download_dir = root.join("downloads");
    config.download.temp_dir = root.join("temp");
    config.download.mode = mode;
    config
}

/// Downloader driven by `engine`; keep the returned TempDir alive
pub async fn downloader_with(
    engine: Arc<dyn MediaEngine>,
    mode: OutputMode,
) -> (Arc<PlaylistDownloader>, TempDir) {
    let temp_dir = tempfile::tempdir().unwrap();
    let downloader = PlaylistDownloader::with_engine(config_in(temp_dir.path(), mode), engine)
        .await
        .unwrap();
    (Arc::new(downloader), temp_dir)
}

/// Everything currently buffered on a receiver
pub fn drain(rx: &mut Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Files directly inside `dir`, sorted by name
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
