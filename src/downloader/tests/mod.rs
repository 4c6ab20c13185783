use super::*;
use crate::downloader::test_helpers::{
    PLAYLIST_URL, ScriptedEngine, create_test_downloader, drain_events, progress_steps,
};
use crate::types::{OutputArtifact, OutputMode, PlaylistRequest, RunTrace, Stage};

mod run;
