use super::*;
use crate::downloader::test_helpers::{PLAYLIST_URL, ScriptedEngine};
use crate::types::OutputMode;
use axum::body::Body;
use axum::extract::Request;
use axum::http::StatusCode;
use std::time::Duration;
use tower::ServiceExt;


/// Helper to create a test PlaylistDownloader wrapped in Arc, plus its config
async fn create_test_downloader(
    engine: ScriptedEngine,
) -> (
    Arc<PlaylistDownloader>,
    Arc<ScriptedEngine>,
    tempfile::TempDir,
) {
    let engine = Arc::new(engine);
    let (downloader, temp_dir) =
        crate::downloader::test_helpers::create_test_downloader(engine.clone(), OutputMode::Local)
            .await;
    (Arc::new(downloader), engine, temp_dir)
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

#[tokio::test]
async fn api_server_spawns_on_ephemeral_port() {
    let (downloader, _engine, _temp_dir) =
        create_test_downloader(ScriptedEngine::with_items(Some("Mix"), 1)).await;

    let mut config = (*downloader.config).clone();
    config.api.bind_address = "127.0.0.1:0".parse().unwrap(); // Port 0 = OS assigns a free port
    let config = Arc::new(config);

    let api_handle = tokio::spawn({
        let downloader = downloader.clone();
        let config = config.clone();
        async move { start_api_server(downloader, config).await }
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!api_handle.is_finished(), "server should still be serving");
    api_handle.abort();
}

#[tokio::test]
async fn spawn_api_server_method_serves_in_background() {
    let engine = Arc::new(ScriptedEngine::with_items(Some("Mix"), 1));
    let temp_dir = tempfile::tempdir().unwrap();
    let mut config = crate::downloader::test_helpers::test_config(temp_dir.path(), OutputMode::Local);
    config.api.bind_address = "127.0.0.1:0".parse().unwrap();
    let downloader = Arc::new(PlaylistDownloader::with_engine(config, engine).await.unwrap());

    let handle = downloader.spawn_api_server();

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!handle.is_finished(), "spawned server should keep running");
    handle.abort();
}

#[tokio::test]
async fn api_server_stops_when_shutdown_resolves() {
    let (downloader, _engine, _temp_dir) =
        create_test_downloader(ScriptedEngine::with_items(Some("Mix"), 1)).await;

    let mut config = (*downloader.config).clone();
    config.api.bind_address = "127.0.0.1:0".parse().unwrap();

    let (tx, rx) = tokio::sync::oneshot::channel::<()>();
    let server = tokio::spawn(start_api_server_with_shutdown(
        downloader,
        Arc::new(config),
        async move {
            rx.await.ok();
        },
    ));

    tokio::time::sleep(Duration::from_millis(50)).await;
    tx.send(()).unwrap();

    let result = tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .expect("server should stop after shutdown signal")
        .unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn bind_failure_is_reported() {
    let (downloader, _engine, _temp_dir) =
        create_test_downloader(ScriptedEngine::with_items(Some("Mix"), 1)).await;

    // Occupy a port, then ask the server to bind the same one
    let blocker = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let mut config = (*downloader.config).clone();
    config.api.bind_address = blocker.local_addr().unwrap();

    let result = start_api_server(downloader, Arc::new(config)).await;
    assert!(matches!(result, Err(crate::Error::Io(_))));
}

#[tokio::test]
async fn cors_headers_present_when_enabled() {
    let (downloader, _engine, _temp_dir) =
        create_test_downloader(ScriptedEngine::with_items(Some("Mix"), 1)).await;

    let mut config = (*downloader.config).clone();
    config.api.cors_enabled = true;
    config.api.cors_origins = vec!["*".to_string()];
    let app = create_router(downloader, Arc::new(config));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("Origin", "http://localhost:3000")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .headers()
            .contains_key("access-control-allow-origin"),
        "CORS header should be present when CORS is enabled"
    );
}

#[tokio::test]
async fn cors_headers_absent_when_disabled() {
    let (downloader, _engine, _temp_dir) =
        create_test_downloader(ScriptedEngine::with_items(Some("Mix"), 1)).await;

    let mut config = (*downloader.config).clone();
    config.api.cors_enabled = false;
    let app = create_router(downloader, Arc::new(config));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("Origin", "http://localhost:3000")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(
        !response
            .headers()
            .contains_key("access-control-allow-origin")
    );
}

#[tokio::test]
async fn cors_specific_origin_is_echoed() {
    let (downloader, _engine, _temp_dir) =
        create_test_downloader(ScriptedEngine::with_items(Some("Mix"), 1)).await;

    let mut config = (*downloader.config).clone();
    config.api.cors_origins = vec!["http://localhost:5173".to_string()];
    let app = create_router(downloader, Arc::new(config));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("Origin", "http://localhost:5173")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "http://localhost:5173"
    );
}
