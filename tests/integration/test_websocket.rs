//! Integration tests for WebSocket real-time event streaming.
//!
//! These tests validate that every applied step, playback control and
//! override reaches connected clients in order.

use std::net::TcpListener;
use std::time::Duration;

use futures::SinkExt;
use futures::StreamExt;
use sortviz_engine::{Algorithm, Step, StepState};
use sortviz_orchestrator::{
    create_router, AppState, Config, Driver, OverrideOutcome, PlaybackStatus, VisualizerEvent,
    VisualizerUpdate,
};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tungstenite::Message;

/// Helper to find an available port for testing.
fn find_available_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .expect("Failed to bind to port")
        .local_addr()
        .expect("Failed to get local addr")
        .port()
}

/// Helper type for WebSocket client
type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Spawns the test server and returns the WebSocket URL.
async fn spawn_test_server(driver: Driver) -> (String, tokio::task::JoinHandle<()>) {
    let port = find_available_port();
    let addr = format!("127.0.0.1:{port}");
    let ws_url = format!("ws://{addr}/ws");

    let router = create_router(AppState::new(driver));
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind");

    let handle = tokio::spawn(async move {
        axum::serve(listener, router).await.expect("Server failed");
    });

    // Give the server a moment to start
    tokio::time::sleep(Duration::from_millis(50)).await;

    (ws_url, handle)
}

fn driver_with(data: &[f64], speed_ms: u64) -> Driver {
    Driver::new(&Config {
        seed_array: data.to_vec(),
        animation_speed_ms: speed_ms,
        ..Config::default()
    })
}

/// Connects a WebSocket client to the given URL.
async fn connect_client(url: &str) -> WsClient {
    let (ws_stream, _) = connect_async(url)
        .await
        .expect("Failed to connect to WebSocket");
    ws_stream
}

/// Receives the next text message from the WebSocket and parses it as a
/// `VisualizerEvent`. Automatically handles ping frames by responding with pong.
async fn receive_event(client: &mut WsClient) -> VisualizerEvent {
    loop {
        let msg = timeout(Duration::from_secs(5), client.next())
            .await
            .expect("Timeout waiting for message")
            .expect("Stream ended")
            .expect("WebSocket error");

        match msg {
            Message::Text(text) => {
                return serde_json::from_str(&text).expect("Failed to parse event");
            }
            Message::Ping(data) => {
                client
                    .send(Message::Pong(data))
                    .await
                    .expect("Failed to send pong");
            }
            Message::Pong(_) => {}
            other => panic!("Expected text message, got: {other:?}"),
        }
    }
}

/// Collects events until `run_complete`, returning the steps seen on the way.
async fn collect_run(client: &mut WsClient) -> Vec<Step> {
    let mut steps = Vec::new();
    loop {
        match receive_event(client).await {
            VisualizerEvent::Step(payload) => steps.push(payload.step),
            VisualizerEvent::RunComplete(payload) => {
                assert_eq!(payload.stats.steps, steps.len() as u64);
                return steps;
            }
            _ => {}
        }
    }
}

// ============================================================================
// Connection Tests
// ============================================================================

/// Tests that a client receives the current snapshot on connection.
#[tokio::test]
async fn test_client_receives_connected_event_on_connect() {
    let (ws_url, _handle) = spawn_test_server(driver_with(&[3.0, 1.0, 2.0], 100)).await;

    let mut client = connect_client(&ws_url).await;
    let event = receive_event(&mut client).await;

    let VisualizerEvent::Connected(payload) = event else {
        panic!("Expected Connected event, got: {event:?}");
    };
    assert_eq!(payload.snapshot.status, PlaybackStatus::Stopped);
    assert_eq!(payload.snapshot.visualizer.data, vec![3.0, 1.0, 2.0]);
    assert_eq!(payload.snapshot.algorithm, Algorithm::BubbleSort);
}

// ============================================================================
// Step Stream Tests
// ============================================================================

/// The streamed steps are exactly the engine trace, in order.
#[tokio::test]
async fn test_step_stream_matches_engine_trace() {
    let input = [5.0, 3.0, 8.0, 1.0];
    let driver = driver_with(&input, 10);
    let (ws_url, _handle) = spawn_test_server(driver.clone()).await;

    let mut client = connect_client(&ws_url).await;
    receive_event(&mut client).await; // Consume connected event

    driver
        .select_algorithm(Algorithm::QuickSort)
        .await
        .expect("Failed to select algorithm");
    driver.play().await.expect("Failed to play");

    let steps = collect_run(&mut client).await;
    let expected = sortviz_engine::trace(Algorithm::QuickSort, &input).expect("Failed to trace");
    assert_eq!(steps, expected);
    assert_eq!(steps.last().map(|s| s.state), Some(StepState::Sorted));

    // The final playback event reports the stop.
    let event = receive_event(&mut client).await;
    let VisualizerEvent::Playback(payload) = event else {
        panic!("Expected Playback event, got: {event:?}");
    };
    assert_eq!(payload.status, PlaybackStatus::Stopped);
}

/// Multiple clients see the same steps.
#[tokio::test]
async fn test_multiple_clients_receive_same_steps() {
    let driver = driver_with(&[4.0, 2.0, 3.0, 1.0], 10);
    let (ws_url, _handle) = spawn_test_server(driver.clone()).await;

    let mut first = connect_client(&ws_url).await;
    let mut second = connect_client(&ws_url).await;
    receive_event(&mut first).await;
    receive_event(&mut second).await;

    driver.play().await.expect("Failed to play");

    let a = collect_run(&mut first).await;
    let b = collect_run(&mut second).await;
    assert_eq!(a, b);
    assert!(!a.is_empty());
}

// ============================================================================
// Control and Override Events
// ============================================================================

/// Controls over HTTP are echoed as playback events.
#[tokio::test]
async fn test_api_controls_trigger_playback_events() {
    let driver = driver_with(&[9.0, 8.0, 7.0, 6.0], 1000);
    let (ws_url, _handle) = spawn_test_server(driver).await;

    let mut client = connect_client(&ws_url).await;
    receive_event(&mut client).await;

    let http_url = ws_url.replace("ws://", "http://").replace("/ws", "");
    let response = reqwest::Client::new()
        .post(format!("{http_url}/api/speed"))
        .json(&serde_json::json!({ "ms": 250 }))
        .send()
        .await
        .expect("Failed to send HTTP request");
    assert!(response.status().is_success());

    let event = receive_event(&mut client).await;
    let VisualizerEvent::Playback(payload) = event else {
        panic!("Expected Playback event, got: {event:?}");
    };
    assert_eq!(payload.speed_ms, 250);
    assert_eq!(payload.status, PlaybackStatus::Stopped);
}

/// Suppressed and applied overrides are both broadcast.
#[tokio::test]
async fn test_override_events() {
    let driver = driver_with(&[9.0, 8.0, 7.0, 6.0], 1000);
    let (ws_url, _handle) = spawn_test_server(driver.clone()).await;

    let mut client = connect_client(&ws_url).await;
    receive_event(&mut client).await;

    driver.play().await.expect("Failed to play");
    let update = VisualizerUpdate {
        focus_indices: vec![1],
        state: StepState::Error,
        data: None,
        error_case: Some(vec![1.0, 0.0]),
    };
    driver.submit_external_step(update.clone()).await;
    driver.stop().await;
    driver.submit_external_step(update.clone()).await;

    let mut outcomes = Vec::new();
    while outcomes.len() < 2 {
        if let VisualizerEvent::Override(payload) = receive_event(&mut client).await {
            assert_eq!(payload.update, update);
            outcomes.push(payload.outcome);
        }
    }
    assert_eq!(
        outcomes,
        vec![OverrideOutcome::Suppressed, OverrideOutcome::Applied]
    );
}

// ============================================================================
// Disconnection Tests
// ============================================================================

/// A client closing its socket does not disturb the driver.
#[tokio::test]
async fn test_client_disconnect_is_harmless() {
    let driver = driver_with(&[3.0, 2.0, 1.0], 10);
    let (ws_url, _handle) = spawn_test_server(driver.clone()).await;

    let mut client = connect_client(&ws_url).await;
    receive_event(&mut client).await;
    client.close(None).await.expect("Failed to close");
    drop(client);

    driver.play().await.expect("Failed to play");
    tokio::time::sleep(Duration::from_millis(500)).await;
    let snapshot = driver.snapshot().await;
    assert_eq!(snapshot.status, PlaybackStatus::Stopped);
    assert_eq!(snapshot.visualizer.data, vec![1.0, 2.0, 3.0]);
}
