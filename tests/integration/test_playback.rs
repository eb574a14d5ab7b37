//! Integration tests for playback controls over a real HTTP server.
//!
//! These tests drive the animation through the REST API and check that the
//! shared visualizer state ends where the engines say it should.

use std::net::TcpListener;
use std::time::Duration;

use sortviz_engine::{Algorithm, StepState};
use sortviz_orchestrator::{
    create_router, AppState, Config, Driver, OverrideOutcome, OverrideResponse, PlaybackSnapshot,
    PlaybackStatus,
};
use tokio::time::{sleep, timeout};

/// Helper to find an available port for testing.
fn find_available_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .expect("Failed to bind to port")
        .local_addr()
        .expect("Failed to get local addr")
        .port()
}

/// Spawns the test server and returns its base URL.
async fn spawn_test_server(config: &Config) -> (String, tokio::task::JoinHandle<()>) {
    let port = find_available_port();
    let addr = format!("127.0.0.1:{port}");

    let router = create_router(AppState::new(Driver::new(config)));
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind");

    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("Server failed");
    });

    // Give the server a moment to start
    sleep(Duration::from_millis(50)).await;

    (format!("http://{addr}"), handle)
}

fn config_with(data: &[f64], speed_ms: u64) -> Config {
    Config {
        seed_array: data.to_vec(),
        animation_speed_ms: speed_ms,
        ..Config::default()
    }
}

async fn post(base: &str, path: &str, body: serde_json::Value) -> reqwest::Response {
    reqwest::Client::new()
        .post(format!("{base}{path}"))
        .json(&body)
        .send()
        .await
        .expect("Failed to send HTTP request")
}

async fn post_snapshot(base: &str, path: &str, body: serde_json::Value) -> PlaybackSnapshot {
    let response = post(base, path, body).await;
    assert!(response.status().is_success(), "{path}: {}", response.status());
    response.json().await.expect("Failed to parse snapshot")
}

async fn get_state(base: &str) -> PlaybackSnapshot {
    reqwest::get(format!("{base}/api/state"))
        .await
        .expect("Failed to get state")
        .json()
        .await
        .expect("Failed to parse snapshot")
}

/// Polls `/api/state` until the animation stops.
async fn wait_until_stopped(base: &str) -> PlaybackSnapshot {
    timeout(Duration::from_secs(10), async {
        loop {
            let snapshot = get_state(base).await;
            if snapshot.status == PlaybackStatus::Stopped {
                return snapshot;
            }
            sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .expect("Animation did not finish")
}

// ============================================================================
// Full Runs
// ============================================================================

/// Every algorithm animates the same input to the same sorted array.
#[tokio::test]
async fn test_every_algorithm_sorts_over_http() {
    let (base, _handle) = spawn_test_server(&config_with(&[5.0, 3.0, 8.0, 1.0], 10)).await;

    for algorithm in Algorithm::ALL {
        post_snapshot(&base, "/api/reset", serde_json::json!({})).await;
        let snapshot = post_snapshot(
            &base,
            "/api/algorithm",
            serde_json::json!({ "algorithm": algorithm.id() }),
        )
        .await;
        assert_eq!(snapshot.algorithm, algorithm);

        let snapshot = post_snapshot(&base, "/api/play", serde_json::json!({})).await;
        assert_eq!(snapshot.status, PlaybackStatus::Running);

        let done = wait_until_stopped(&base).await;
        assert_eq!(done.visualizer.data, vec![1.0, 3.0, 5.0, 8.0], "{algorithm}");
        assert_eq!(done.visualizer.state, StepState::Sorted, "{algorithm}");
        assert!(done.visualizer.focus_indices.is_empty());
    }
}

/// Pause freezes the display; resume continues to the end.
#[tokio::test]
async fn test_pause_and_resume() {
    let (base, _handle) =
        spawn_test_server(&config_with(&[9.0, 8.0, 7.0, 6.0, 5.0, 4.0], 50)).await;

    post_snapshot(&base, "/api/play", serde_json::json!({})).await;
    sleep(Duration::from_millis(120)).await;

    let paused = post_snapshot(&base, "/api/pause", serde_json::json!({})).await;
    assert_eq!(paused.status, PlaybackStatus::Paused);
    sleep(Duration::from_millis(200)).await;
    assert_eq!(get_state(&base).await.visualizer, paused.visualizer);

    post_snapshot(&base, "/api/speed", serde_json::json!({ "ms": 10 })).await;
    post_snapshot(&base, "/api/play", serde_json::json!({})).await;
    let done = wait_until_stopped(&base).await;
    assert_eq!(done.visualizer.data, vec![4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
}

// ============================================================================
// Controls
// ============================================================================

/// Stop halts immediately and the display never changes afterwards.
#[tokio::test]
async fn test_stop_halts_animation() {
    let (base, _handle) =
        spawn_test_server(&config_with(&[9.0, 8.0, 7.0, 6.0, 5.0, 4.0], 100)).await;

    post_snapshot(&base, "/api/play", serde_json::json!({})).await;
    sleep(Duration::from_millis(150)).await;

    let stopped = post_snapshot(&base, "/api/stop", serde_json::json!({})).await;
    assert_eq!(stopped.status, PlaybackStatus::Stopped);
    sleep(Duration::from_millis(300)).await;
    assert_eq!(get_state(&base).await.visualizer, stopped.visualizer);
}

/// Shuffle replaces the array; reset restores the seed.
#[tokio::test]
async fn test_shuffle_and_reset() {
    let (base, _handle) = spawn_test_server(&config_with(&[3.0, 2.0, 1.0], 100)).await;

    let shuffled = post_snapshot(
        &base,
        "/api/shuffle",
        serde_json::json!({ "size": 15, "min": 1, "max": 9 }),
    )
    .await;
    assert_eq!(shuffled.visualizer.data.len(), 15);
    assert!(shuffled
        .visualizer
        .data
        .iter()
        .all(|v| (1.0..=9.0).contains(v)));

    let response = post(&base, "/api/shuffle", serde_json::json!({ "size": 0 })).await;
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json().await.expect("Failed to parse error");
    assert!(body["error"].as_str().unwrap_or_default().contains("shuffle"));

    let reset = post_snapshot(&base, "/api/reset", serde_json::json!({})).await;
    assert_eq!(reset.visualizer.data, vec![3.0, 2.0, 1.0]);
    assert_eq!(reset.visualizer.state, StepState::Idle);
}

/// Invalid input is rejected with 400 and leaves state unchanged.
#[tokio::test]
async fn test_invalid_controls_rejected() {
    let (base, _handle) = spawn_test_server(&config_with(&[3.0, 2.0, 1.0], 100)).await;
    let before = get_state(&base).await;

    let response = post(&base, "/api/speed", serde_json::json!({ "ms": 999_999 })).await;
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);

    let response = post(
        &base,
        "/api/algorithm",
        serde_json::json!({ "algorithm": "sleepSort" }),
    )
    .await;
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);

    assert_eq!(get_state(&base).await, before);
}

// ============================================================================
// Override Channel
// ============================================================================

/// Overrides are suppressed while running and applied once stopped.
#[tokio::test]
async fn test_override_respects_running_state() {
    let (base, _handle) =
        spawn_test_server(&config_with(&[9.0, 8.0, 7.0, 6.0, 5.0, 4.0], 1000)).await;
    let update = serde_json::json!({
        "focusIndices": [0, 1],
        "state": "error",
        "data": [2, 1],
        "errorCase": [2, 1]
    });

    post_snapshot(&base, "/api/play", serde_json::json!({})).await;
    let response: OverrideResponse = post(&base, "/api/override", update.clone())
        .await
        .json()
        .await
        .expect("Failed to parse override response");
    assert_eq!(response.outcome, OverrideOutcome::Suppressed);
    assert_eq!(response.snapshot.status, PlaybackStatus::Running);
    assert_ne!(response.snapshot.visualizer.data, vec![2.0, 1.0]);

    post_snapshot(&base, "/api/stop", serde_json::json!({})).await;
    let response: OverrideResponse = post(&base, "/api/override", update)
        .await
        .json()
        .await
        .expect("Failed to parse override response");
    assert_eq!(response.outcome, OverrideOutcome::Applied);
    assert_eq!(response.snapshot.visualizer.data, vec![2.0, 1.0]);
    assert_eq!(response.snapshot.visualizer.error_case, Some(vec![2.0, 1.0]));
    assert_eq!(response.snapshot.visualizer.state, StepState::Error);
}

/// Non-finite data cannot be expressed in JSON, but out-of-range focus is dropped.
#[tokio::test]
async fn test_override_drops_out_of_range_focus() {
    let (base, _handle) = spawn_test_server(&config_with(&[3.0, 2.0, 1.0], 100)).await;

    let response: OverrideResponse = post(
        &base,
        "/api/override",
        serde_json::json!({ "focusIndices": [2, 3, 40], "state": "comparing" }),
    )
    .await
    .json()
    .await
    .expect("Failed to parse override response");

    assert_eq!(response.outcome, OverrideOutcome::Applied);
    assert_eq!(response.snapshot.visualizer.focus_indices, vec![2]);
}
