use super::*;
use crate::archive::ZipPackager;
use crate::types::MediaFormat;
use std::time::Duration;

fn request() -> PlaylistRequest {
    PlaylistRequest::new(PLAYLIST_URL)
}

fn mp4_files(dir: &std::path::Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|n| n.ends_with(".mp4"))
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn invalid_url_fails_without_engine_call() {
    let engine = Arc::new(ScriptedEngine::with_items(Some("Mix"), 5));
    let (downloader, _temp) = create_test_downloader(engine.clone(), OutputMode::Local).await;
    let mut rx = downloader.subscribe();

    let result = downloader
        .run(&PlaylistRequest::new("https://example.com/not-a-playlist"))
        .await;

    assert!(matches!(result, Err(Error::InvalidUrl { .. })));
    assert_eq!(engine.calls(), (0, 0));

    let events = drain_events(&mut rx);
    match events.last().unwrap() {
        Event::Failed { stage, .. } => assert_eq!(*stage, Stage::ValidatingUrl),
        other => panic!("expected Failed event, got {other:?}"),
    }
}

#[tokio::test]
async fn zero_entries_is_unavailable_playlist() {
    let engine = Arc::new(ScriptedEngine::with_items(Some("Empty"), 0));
    let (downloader, temp) = create_test_downloader(engine.clone(), OutputMode::Local).await;
    let mut rx = downloader.subscribe();

    let result = downloader.run(&request()).await;

    match result {
        Err(Error::UnavailablePlaylist { url }) => assert_eq!(url, PLAYLIST_URL),
        other => panic!("expected UnavailablePlaylist, got {other:?}"),
    }
    assert_eq!(engine.calls(), (1, 0));
    assert!(!temp.path().join("downloads/Empty").exists());

    let events = drain_events(&mut rx);
    assert!(progress_steps(&events).is_empty());
    assert!(matches!(
        events.last(),
        Some(Event::Failed {
            stage: Stage::FetchingMetadata,
            ..
        })
    ));
}

#[tokio::test]
async fn enumeration_error_passes_engine_message_through() {
    let engine = Arc::new(ScriptedEngine::failing_enumeration(
        "ERROR: [youtube:tab] PLx: This playlist is private",
    ));
    let (downloader, _temp) = create_test_downloader(engine.clone(), OutputMode::Local).await;

    match downloader.run(&request()).await {
        Err(Error::Engine(msg)) => {
            assert_eq!(msg, "ERROR: [youtube:tab] PLx: This playlist is private")
        }
        other => panic!("expected Engine error, got {other:?}"),
    }
    assert_eq!(engine.calls(), (1, 0));
}

#[tokio::test]
async fn local_run_downloads_every_entry_with_progress() {
    let engine = Arc::new(ScriptedEngine::with_items(Some("Road: Trip?"), 5));
    let (downloader, temp) = create_test_downloader(engine.clone(), OutputMode::Local).await;
    let mut rx = downloader.subscribe();

    let summary = downloader.run(&request()).await.unwrap();

    let expected_dir = temp.path().join("downloads").join("Road Trip");
    assert_eq!(summary.playlist_title, "Road Trip");
    assert_eq!((summary.completed, summary.total, summary.skipped), (5, 5, 0));
    assert_eq!(
        summary.artifact,
        OutputArtifact::Directory {
            path: expected_dir.clone()
        }
    );
    assert_eq!(mp4_files(&expected_dir).len(), 5);
    assert_eq!(engine.output_dir().unwrap(), expected_dir);
    assert_eq!(
        engine.last_format.lock().unwrap().as_deref(),
        Some(MediaFormat::Video.selector())
    );

    let events = drain_events(&mut rx);
    assert_eq!(
        progress_steps(&events),
        vec![(1, 5), (2, 5), (3, 5), (4, 5), (5, 5)]
    );
    let statuses: Vec<&str> = events
        .iter()
        .filter_map(|e| match e {
            Event::Progress { status, .. } => Some(status.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(statuses[0], "Downloading: 1/5 videos (20.0%)");
    assert_eq!(statuses[4], "Downloading: 5/5 videos (100.0%)");

    let kinds: Vec<&str> = events.iter().map(Event::kind).collect();
    assert_eq!(kinds[..3], ["validating", "fetching_metadata", "metadata_fetched"]);
    assert_eq!(*kinds.last().unwrap(), "succeeded");
    assert!(!kinds.contains(&"packaging"));
    assert!(events.iter().all(|e| e.run_id() == summary.run_id));
}

#[tokio::test]
async fn hosted_run_returns_archive_and_removes_temp_root() {
    let engine = Arc::new(ScriptedEngine::with_items(Some("Road Trip"), 5));
    let (downloader, temp) = create_test_downloader(engine.clone(), OutputMode::Hosted).await;
    let mut rx = downloader.subscribe();

    let summary = downloader.run(&request()).await.unwrap();

    let OutputArtifact::Archive(archive) = &summary.artifact else {
        panic!("expected archive artifact, got {:?}", summary.artifact);
    };
    assert_eq!(archive.filename, "Road Trip.zip");
    assert_eq!(archive.content_type, "application/zip");
    assert_eq!(summary.artifact.location(), "Road Trip.zip");

    // Media went to <temp>/playlist-XXXX/Road Trip and that root is gone now
    let media_dir = engine.output_dir().unwrap();
    let temp_root = media_dir.parent().unwrap().to_path_buf();
    assert!(temp_root.starts_with(temp.path().join("temp")));
    assert!(
        temp_root
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("playlist-")
    );
    assert!(!temp_root.exists());
    assert_eq!(
        engine.last_format.lock().unwrap().as_deref(),
        Some(MediaFormat::Audio.selector())
    );

    // The archive holds the five downloaded files
    let check = tempfile::tempdir().unwrap();
    let zip_path = check.path().join(&archive.filename);
    std::fs::write(&zip_path, &archive.bytes).unwrap();
    let unpacked = check.path().join("unpacked");
    ZipPackager::extract(&zip_path, &unpacked).unwrap();
    assert_eq!(
        mp4_files(&unpacked),
        (1..=5).map(|n| format!("Video {n}.mp4")).collect::<Vec<_>>()
    );

    let events = drain_events(&mut rx);
    assert_eq!(progress_steps(&events).len(), 5);
    assert!(events.iter().any(|e| matches!(
        e,
        Event::Packaging { archive, .. } if archive == "Road Trip.zip"
    )));
}

#[tokio::test]
async fn engine_failure_mid_download_stops_progress() {
    let engine = Arc::new(
        ScriptedEngine::with_items(Some("Mix"), 5).failing_after(2, "ERROR: network unreachable"),
    );
    let (downloader, _temp) = create_test_downloader(engine.clone(), OutputMode::Local).await;
    let mut rx = downloader.subscribe();

    let result = downloader.run(&request()).await;

    match result {
        Err(Error::Engine(msg)) => assert_eq!(msg, "ERROR: network unreachable"),
        other => panic!("expected Engine error, got {other:?}"),
    }

    let events = drain_events(&mut rx);
    assert_eq!(progress_steps(&events), vec![(1, 5), (2, 5)]);
    match events.last().unwrap() {
        Event::Failed { stage, error, .. } => {
            assert_eq!(*stage, Stage::Downloading);
            assert_eq!(error, "ERROR: network unreachable");
        }
        other => panic!("expected Failed event, got {other:?}"),
    }
}

#[tokio::test]
async fn hosted_failure_mid_download_removes_temp_root() {
    let engine =
        Arc::new(ScriptedEngine::with_items(Some("Mix"), 5).failing_after(2, "ERROR: boom"));
    let (downloader, _temp) = create_test_downloader(engine.clone(), OutputMode::Hosted).await;

    downloader.run(&request()).await.unwrap_err();

    let temp_root = engine.output_dir().unwrap().parent().unwrap().to_path_buf();
    assert!(!temp_root.exists());
}

#[tokio::test]
async fn packaging_failure_removes_temp_root() {
    let engine = Arc::new(ScriptedEngine::with_items(Some("Mix"), 3).blocking_archive());
    let (downloader, temp) = create_test_downloader(engine.clone(), OutputMode::Hosted).await;
    let mut rx = downloader.subscribe();

    let result = downloader.run(&request()).await;

    match result {
        Err(Error::Packaging { archive, .. }) => {
            assert_eq!(archive.file_name().unwrap(), "Mix.zip")
        }
        other => panic!("expected Packaging error, got {other:?}"),
    }

    let temp_root = engine.output_dir().unwrap().parent().unwrap().to_path_buf();
    assert!(!temp_root.exists());
    // Nothing left behind under the configured temp dir
    assert_eq!(
        std::fs::read_dir(temp.path().join("temp")).unwrap().count(),
        0
    );

    let events = drain_events(&mut rx);
    assert!(matches!(
        events.last(),
        Some(Event::Failed {
            stage: Stage::Packaging,
            ..
        })
    ));
}

#[tokio::test]
async fn missing_title_falls_back_to_default() {
    let engine = Arc::new(ScriptedEngine::with_items(None, 1));
    let (downloader, temp) = create_test_downloader(engine, OutputMode::Local).await;

    let summary = downloader.run(&request()).await.unwrap();

    assert_eq!(summary.playlist_title, "YouTube_Playlist");
    assert!(temp.path().join("downloads/YouTube_Playlist").is_dir());
}

#[tokio::test]
async fn title_that_sanitizes_to_nothing_falls_back_to_default() {
    let engine = Arc::new(ScriptedEngine::with_items(Some("???"), 1));
    let (downloader, _temp) = create_test_downloader(engine, OutputMode::Local).await;

    let summary = downloader.run(&request()).await.unwrap();
    assert_eq!(summary.playlist_title, "YouTube_Playlist");
}

#[tokio::test]
async fn unavailable_items_are_reported_as_skipped() {
    let engine = Arc::new(ScriptedEngine::with_items(Some("Mix"), 5).producing(3));
    let (downloader, _temp) = create_test_downloader(engine, OutputMode::Local).await;
    let mut rx = downloader.subscribe();

    let summary = downloader.run(&request()).await.unwrap();

    assert_eq!((summary.completed, summary.total, summary.skipped), (3, 5, 2));
    let events = drain_events(&mut rx);
    assert!(matches!(
        events.last(),
        Some(Event::Succeeded {
            completed: 3,
            total: 5,
            skipped: 2,
            ..
        })
    ));
}

#[tokio::test]
async fn explicit_mode_overrides_configured_mode() {
    let engine = Arc::new(ScriptedEngine::with_items(Some("Mix"), 2));
    let (downloader, _temp) = create_test_downloader(engine, OutputMode::Local).await;

    let summary = downloader
        .run_with_mode(&request(), OutputMode::Hosted)
        .await
        .unwrap();
    assert!(matches!(summary.artifact, OutputArtifact::Archive(_)));
}

#[tokio::test]
async fn concurrent_runs_use_separate_temp_roots() {
    let engine = Arc::new(ScriptedEngine::with_items(Some("Mix"), 2));
    let (downloader, _temp) = create_test_downloader(engine, OutputMode::Hosted).await;

    let req = request();
    let (a, b) = tokio::join!(downloader.run(&req), downloader.run(&req));
    let (a, b) = (a.unwrap(), b.unwrap());
    assert_ne!(a.run_id, b.run_id);
    assert_eq!(a.artifact.location(), "Mix.zip");
    assert_eq!(b.artifact.location(), "Mix.zip");
}

#[tokio::test]
async fn dot_dot_title_stays_inside_download_dir() {
    let engine = Arc::new(ScriptedEngine::with_items(Some(".."), 2));
    let (downloader, temp) = create_test_downloader(engine.clone(), OutputMode::Local).await;

    let summary = downloader.run(&request()).await.unwrap();

    assert_eq!(summary.playlist_title, "YouTube_Playlist");
    let expected = temp.path().join("downloads/YouTube_Playlist");
    assert_eq!(engine.output_dir().unwrap(), expected);
    assert_eq!(mp4_files(&expected), vec!["Video 1.mp4", "Video 2.mp4"]);
    // Nothing written next to the download dir
    assert_eq!(mp4_files(temp.path()), Vec::<String>::new());
}

#[tokio::test]
async fn dot_dot_title_stays_inside_temp_root() {
    let engine = Arc::new(ScriptedEngine::with_items(Some(".."), 2));
    let (downloader, temp) = create_test_downloader(engine.clone(), OutputMode::Hosted).await;

    let summary = downloader.run(&request()).await.unwrap();

    match summary.artifact {
        OutputArtifact::Archive(archive) => assert_eq!(archive.filename, "YouTube_Playlist.zip"),
        other => panic!("expected archive, got {other:?}"),
    }
    let media_dir = engine.output_dir().unwrap();
    assert_eq!(media_dir.file_name().unwrap(), "YouTube_Playlist");
    assert_eq!(
        media_dir.parent().unwrap().parent().unwrap(),
        temp.path().join("temp")
    );
    assert_eq!(
        std::fs::read_dir(temp.path().join("temp")).unwrap().count(),
        0
    );
    assert_eq!(mp4_files(temp.path()), Vec::<String>::new());
}

#[tokio::test]
async fn abandoned_run_removes_temp_root_and_releases_slot() {
    let engine = Arc::new(ScriptedEngine::with_items(Some("Mix"), 3).hanging());
    let (downloader, temp) = create_test_downloader(engine.clone(), OutputMode::Hosted).await;

    let outcome =
        tokio::time::timeout(Duration::from_millis(200), downloader.run(&request())).await;
    assert!(outcome.is_err(), "run should still be waiting on the engine");

    let temp_root = engine.output_dir().unwrap().parent().unwrap().to_path_buf();
    assert!(!temp_root.exists());
    assert_eq!(
        std::fs::read_dir(temp.path().join("temp")).unwrap().count(),
        0
    );
    assert_eq!(downloader.active_runs(), 0);
}

#[tokio::test]
async fn trace_records_title_and_total_of_failed_run() {
    let engine =
        Arc::new(ScriptedEngine::with_items(Some("Mix"), 5).failing_after(2, "ERROR: boom"));
    let (downloader, _temp) = create_test_downloader(engine, OutputMode::Local).await;

    let mut trace = RunTrace::default();
    downloader
        .run_traced(&request(), OutputMode::Local, &mut trace)
        .await
        .unwrap_err();

    assert_eq!(trace.stage, Stage::Failed);
    assert_eq!(trace.failed_in, Some(Stage::Downloading));
    assert_eq!(trace.title.as_deref(), Some("Mix"));
    assert_eq!(trace.total, Some(5));
}

#[tokio::test]
async fn trace_of_invalid_url_has_no_title() {
    let engine = Arc::new(ScriptedEngine::with_items(Some("Mix"), 1));
    let (downloader, _temp) = create_test_downloader(engine, OutputMode::Local).await;

    let mut trace = RunTrace::default();
    downloader
        .run_traced(&PlaylistRequest::new("not a url"), OutputMode::Local, &mut trace)
        .await
        .unwrap_err();

    assert_eq!(trace.failed_in, Some(Stage::ValidatingUrl));
    assert!(trace.title.is_none() && trace.total.is_none());
}

#[tokio::test]
async fn trace_of_successful_run_ends_succeeded() {
    let engine = Arc::new(ScriptedEngine::with_items(Some("Mix"), 1));
    let (downloader, _temp) = create_test_downloader(engine, OutputMode::Hosted).await;

    let mut trace = RunTrace::default();
    downloader
        .run_traced(&request(), OutputMode::Hosted, &mut trace)
        .await
        .unwrap();

    assert_eq!(trace.stage, Stage::Succeeded);
    assert!(trace.failed_in.is_none());
}
