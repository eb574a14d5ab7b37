//! WebSocket event types and broadcasting for real-time visualizer observation.
//!
//! Every step the driver applies, every playback control and every external
//! override is broadcast to all connected clients. This is the
//! visualizer-state subscription the UI renders from.
//!
//! # Event Types
//!
//! - `connected` - Sent when a client connects, includes the current snapshot
//! - `step` - One engine step was applied
//! - `playback` - Status, algorithm or speed changed
//! - `run_complete` - The engine was exhausted
//! - `override` - An external update was applied, suppressed or rejected
//! - `error` - Something went wrong while handling a control
//!
//! # Example
//!
//! ```no_run
//! use sortviz_orchestrator::websocket::{EventBroadcaster, VisualizerEvent};
//!
//! # async fn example() {
//! let broadcaster = EventBroadcaster::new(100);
//! let mut receiver = broadcaster.subscribe();
//!
//! broadcaster.send(VisualizerEvent::error("tutor unreachable"));
//!
//! if let Ok(event) = receiver.recv().await {
//!     println!("Received: {:?}", event);
//! }
//! # }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sortviz_engine::{Algorithm, RunStats, Step};
use tokio::sync::broadcast;

use crate::playback::{OverrideOutcome, PlaybackSnapshot, PlaybackStatus};
use crate::visualizer::VisualizerUpdate;

// ============================================================================
// Event Payloads
// ============================================================================

/// Payload for the `connected` event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectedPayload {
    /// The current playback snapshot.
    pub snapshot: PlaybackSnapshot,
}

/// Payload for the `step` event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepPayload {
    /// The step that was merged into the visualizer state.
    pub step: Step,
    /// The run the step belongs to.
    pub epoch: u64,
}

/// Payload for the `playback` event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackPayload {
    /// Whether the animation is advancing.
    pub status: PlaybackStatus,
    /// The selected algorithm.
    pub algorithm: Algorithm,
    /// Delay between steps in milliseconds.
    pub speed_ms: u64,
    /// Current version of the visualizer state.
    pub epoch: u64,
}

impl From<&PlaybackSnapshot> for PlaybackPayload {
    fn from(snapshot: &PlaybackSnapshot) -> Self {
        Self {
            status: snapshot.status,
            algorithm: snapshot.algorithm,
            speed_ms: snapshot.speed_ms,
            epoch: snapshot.epoch,
        }
    }
}

/// Payload for the `run_complete` event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunCompletePayload {
    /// The algorithm that ran.
    pub algorithm: Algorithm,
    /// Counters for the run.
    pub stats: RunStats,
    /// When the run finished.
    pub timestamp: DateTime<Utc>,
}

/// Payload for the `override` event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverridePayload {
    /// What happened to the update.
    pub outcome: OverrideOutcome,
    /// The submitted update.
    pub update: VisualizerUpdate,
}

/// Payload for the `error` event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorPayload {
    /// Human-readable error message.
    pub message: String,
}

// ============================================================================
// Event Enum
// ============================================================================

/// WebSocket event types for visualizer observation.
///
/// All events are serialized as JSON objects with "event" and "payload" fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "snake_case")]
pub enum VisualizerEvent {
    /// Sent when a client connects.
    Connected(ConnectedPayload),
    /// Sent when a step is applied.
    Step(StepPayload),
    /// Sent after every playback control.
    Playback(PlaybackPayload),
    /// Sent when a run finishes.
    RunComplete(RunCompletePayload),
    /// Sent for every external update.
    Override(OverridePayload),
    /// Sent when an error occurs.
    Error(ErrorPayload),
}

impl VisualizerEvent {
    /// Creates a `Connected` event.
    #[must_use]
    pub const fn connected(snapshot: PlaybackSnapshot) -> Self {
        Self::Connected(ConnectedPayload { snapshot })
    }

    /// Creates a `Step` event.
    #[must_use]
    pub const fn step(step: Step, epoch: u64) -> Self {
        Self::Step(StepPayload { step, epoch })
    }

    /// Creates a `Playback` event from a snapshot.
    #[must_use]
    pub fn playback(snapshot: &PlaybackSnapshot) -> Self {
        Self::Playback(snapshot.into())
    }

    /// Creates a `RunComplete` event.
    #[must_use]
    pub fn run_complete(algorithm: Algorithm, stats: RunStats) -> Self {
        Self::RunComplete(RunCompletePayload {
            algorithm,
            stats,
            timestamp: Utc::now(),
        })
    }

    /// Creates an `Override` event.
    #[must_use]
    pub const fn override_outcome(outcome: OverrideOutcome, update: VisualizerUpdate) -> Self {
        Self::Override(OverridePayload { outcome, update })
    }

    /// Creates an `Error` event.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(ErrorPayload {
            message: message.into(),
        })
    }

    /// Returns the event name as a string.
    #[must_use]
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::Connected(_) => "connected",
            Self::Step(_) => "step",
            Self::Playback(_) => "playback",
            Self::RunComplete(_) => "run_complete",
            Self::Override(_) => "override",
            Self::Error(_) => "error",
        }
    }
}

// ============================================================================
// Event Broadcaster
// ============================================================================

/// Broadcasts visualizer events to all connected WebSocket clients.
///
/// Events are not persisted for disconnected clients.
#[derive(Debug, Clone)]
pub struct EventBroadcaster {
    sender: broadcast::Sender<VisualizerEvent>,
}

impl EventBroadcaster {
    /// Creates a new `EventBroadcaster` with the specified per-subscriber buffer.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Creates a new subscriber for receiving events.
    ///
    /// A subscriber that falls behind receives a `Lagged` error and misses
    /// some events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<VisualizerEvent> {
        self.sender.subscribe()
    }

    /// Broadcasts an event and returns the number of receivers.
    pub fn send(&self, event: VisualizerEvent) -> usize {
        // send() returns Err only if there are no receivers, which is fine
        self.sender.send(event).unwrap_or(0)
    }

    /// Returns the number of active subscribers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new(100)
    }
}

// ============================================================================
// WebSocket Handler
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tokio::time::interval;
use tracing::{debug, info, warn};

use crate::driver::Driver;

/// Shared state for WebSocket handlers.
#[derive(Debug, Clone)]
pub struct WsState {
    /// The driver whose events are streamed.
    pub driver: Driver,
}

impl WsState {
    /// Creates a new `WsState` streaming `driver`'s events.
    #[must_use]
    pub const fn new(driver: Driver) -> Self {
        Self { driver }
    }
}

/// WebSocket upgrade handler.
///
/// Called when a client connects to `/ws`.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<WsState>>) -> Response {
    info!("New WebSocket connection request");
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Heartbeat ping period.
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// Maximum number of missed pong responses before disconnecting.
const MAX_MISSED_PONGS: u8 = 3;

/// Handles a single WebSocket connection.
///
/// - Sends `connected` with the current snapshot immediately
/// - Forwards all broadcast events to the client
/// - Sends heartbeat pings every 30 seconds
/// - Closes the connection after 3 missed pongs
async fn handle_socket(socket: WebSocket, state: Arc<WsState>) {
    let (mut sender, mut receiver) = socket.split();

    // Subscribe before taking the snapshot so no step falls in between.
    let mut event_receiver = state.driver.events().subscribe();
    let snapshot = state.driver.snapshot().await;

    let connected_json = match serde_json::to_string(&VisualizerEvent::connected(snapshot)) {
        Ok(json) => json,
        Err(e) => {
            warn!("Failed to serialize connected event: {}", e);
            return;
        }
    };

    if sender.send(Message::Text(connected_json)).await.is_err() {
        debug!("Client disconnected before receiving connected event");
        return;
    }

    info!("WebSocket client connected, sent initial snapshot");

    let mut heartbeat_interval = interval(HEARTBEAT_INTERVAL);
    // The first tick completes immediately; skip it so the first ping is a full period away.
    heartbeat_interval.tick().await;
    let mut missed_pongs = 0u8;

    loop {
        tokio::select! {
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Pong(_))) => {
                        missed_pongs = 0;
                        debug!("Received pong from client");
                    }
                    Some(Ok(Message::Close(_))) => {
                        info!("Client requested close");
                        break;
                    }
                    Some(Ok(Message::Text(_) | Message::Binary(_))) => {
                        // Controls go through the HTTP API; ignore
                        debug!("Ignoring data message from client");
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if sender.send(Message::Pong(data)).await.is_err() {
                            debug!("Failed to send pong, client disconnected");
                            break;
                        }
                    }
                    Some(Err(e)) => {
                        debug!("WebSocket error: {}", e);
                        break;
                    }
                    None => {
                        debug!("WebSocket stream ended");
                        break;
                    }
                }
            }

            event = event_receiver.recv() => {
                match event {
                    Ok(visualizer_event) => {
                        let json = match serde_json::to_string(&visualizer_event) {
                            Ok(j) => j,
                            Err(e) => {
                                warn!("Failed to serialize event: {}", e);
                                continue;
                            }
                        };

                        if sender.send(Message::Text(json)).await.is_err() {
                            debug!("Failed to send event, client disconnected");
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!("Client lagged, missed {} events", n);
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        info!("Broadcaster closed");
                        break;
                    }
                }
            }

            _ = heartbeat_interval.tick() => {
                if sender.send(Message::Ping(vec![])).await.is_err() {
                    debug!("Failed to send ping, client disconnected");
                    break;
                }
                missed_pongs += 1;
                if missed_pongs >= MAX_MISSED_PONGS {
                    info!("Client missed {} pongs, closing connection", MAX_MISSED_PONGS);
                    break;
                }
            }
        }
    }

    info!("WebSocket client disconnected");
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use sortviz_engine::StepState;

    use super::*;
    use crate::visualizer::VisualizerState;

    fn snapshot() -> PlaybackSnapshot {
        PlaybackSnapshot {
            visualizer: VisualizerState::idle(vec![3.0, 1.0, 2.0]),
            status: PlaybackStatus::Stopped,
            algorithm: Algorithm::MergeSort,
            speed_ms: 250,
            epoch: 4,
        }
    }

    // ------------------------------------------------------------------------
    // Event Serialization Tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_connected_event_serialization() {
        let json = serde_json::to_string(&VisualizerEvent::connected(snapshot())).unwrap();
        assert!(json.contains(r#""event":"connected""#));
        assert!(json.contains(r#""snapshot""#));
        assert!(json.contains(r#""algorithm":"mergeSort""#));
        assert!(json.contains(r#""speedMs":250"#));
    }

    #[test]
    fn test_step_event_serialization() {
        let step = Step::new(vec![1.0, 2.0], vec![0, 1], StepState::Comparing);
        let json = serde_json::to_string(&VisualizerEvent::step(step, 7)).unwrap();
        assert!(json.contains(r#""event":"step""#));
        assert!(json.contains(r#""focusIndices":[0,1]"#));
        assert!(json.contains(r#""state":"comparing""#));
        assert!(json.contains(r#""epoch":7"#));
    }

    #[test]
    fn test_playback_event_serialization() {
        let json = serde_json::to_string(&VisualizerEvent::playback(&snapshot())).unwrap();
        assert!(json.contains(r#""event":"playback""#));
        assert!(json.contains(r#""status":"stopped""#));
        assert!(json.contains(r#""epoch":4"#));
    }

    #[test]
    fn test_run_complete_event_serialization() {
        let stats = RunStats {
            steps: 12,
            comparisons: 5,
            ..Default::default()
        };
        let event = VisualizerEvent::run_complete(Algorithm::HeapSort, stats);
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""event":"run_complete""#));
        assert!(json.contains(r#""algorithm":"heapSort""#));
        assert!(json.contains(r#""steps":12"#));
        assert!(json.contains(r#""timestamp""#));
    }

    #[test]
    fn test_override_event_serialization() {
        let event =
            VisualizerEvent::override_outcome(OverrideOutcome::Suppressed, VisualizerUpdate::idle());
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""event":"override""#));
        assert!(json.contains(r#""outcome":"suppressed""#));
        assert!(json.contains(r#""state":"idle""#));
    }

    #[test]
    fn test_error_event_round_trip() {
        let json = r#"{"event":"error","payload":{"message":"Something went wrong"}}"#;
        let event: VisualizerEvent = serde_json::from_str(json).unwrap();
        assert!(matches!(
            &event,
            VisualizerEvent::Error(ErrorPayload { message }) if message == "Something went wrong"
        ));
        assert_eq!(event.event_name(), "error");
    }

    #[test]
    fn test_event_names() {
        assert_eq!(VisualizerEvent::connected(snapshot()).event_name(), "connected");
        assert_eq!(VisualizerEvent::playback(&snapshot()).event_name(), "playback");
        assert_eq!(
            VisualizerEvent::run_complete(Algorithm::BubbleSort, RunStats::default()).event_name(),
            "run_complete"
        );
        assert_eq!(
            VisualizerEvent::override_outcome(OverrideOutcome::Applied, VisualizerUpdate::idle())
                .event_name(),
            "override"
        );
    }

    // ------------------------------------------------------------------------
    // Broadcaster Tests
    // ------------------------------------------------------------------------

    #[tokio::test]
    async fn test_broadcaster_send_receive() {
        let broadcaster = EventBroadcaster::new(10);
        let mut receiver = broadcaster.subscribe();

        assert_eq!(broadcaster.send(VisualizerEvent::error("boom")), 1);
        let received = receiver.recv().await.unwrap();
        assert!(matches!(received, VisualizerEvent::Error(_)));
    }

    #[tokio::test]
    async fn test_broadcaster_multiple_subscribers() {
        let broadcaster = EventBroadcaster::new(10);
        let mut receiver1 = broadcaster.subscribe();
        let mut receiver2 = broadcaster.subscribe();

        assert_eq!(broadcaster.send(VisualizerEvent::playback(&snapshot())), 2);
        assert!(matches!(receiver1.recv().await.unwrap(), VisualizerEvent::Playback(_)));
        assert!(matches!(receiver2.recv().await.unwrap(), VisualizerEvent::Playback(_)));
    }

    #[test]
    fn test_broadcaster_no_subscribers() {
        let broadcaster = EventBroadcaster::default();
        assert_eq!(broadcaster.send(VisualizerEvent::error("nobody")), 0);
        assert_eq!(broadcaster.receiver_count(), 0);
    }
}
