//! sortviz Orchestrator
//!
//! Drives the sorting engines at an animation cadence, owns the shared
//! visualizer state, and exposes it over HTTP and WebSocket. Updates from the
//! tutor enter through the same override channel as any other external step.

pub mod api;
pub mod config;
pub mod driver;
pub mod error;
pub mod playback;
pub mod shuffle;
pub mod tutor;
pub mod visualizer;
pub mod websocket;

pub use api::{
    create_router, AlgorithmRequest, AppState, ErrorResponse, OverrideResponse, SpeedRequest,
    TutorMessageRequest,
};
pub use config::{Config, ShuffleConfig, SpeedBounds, TutorConfig, CONFIG_FILE_NAME};
pub use driver::Driver;
pub use error::{Result, SortvizError, TutorErrorKind};
pub use playback::{OverrideOutcome, Playback, PlaybackSnapshot, PlaybackStatus, Tick};
pub use shuffle::ShuffleRequest;
pub use tutor::{
    ChatMessage, ChatRole, HttpTutor, TutorExchange, TutorHint, TutorRequest, TutorResponse,
    TutorService, TutorSession,
};
pub use visualizer::{VisualizerState, VisualizerStore, VisualizerUpdate};
pub use websocket::{EventBroadcaster, VisualizerEvent, WsState};
