//! The async animation driver.
//!
//! [`Driver`] is a cloneable handle around the [`Playback`] core. A single
//! ticker task per run pulls one step, publishes it, then sleeps for the
//! configured speed. Every control that ends or replaces a run aborts the
//! ticker and bumps the epoch, so a tick that was already scheduled finds a
//! stale epoch and does nothing.

use std::sync::Arc;
use std::time::Duration;

use sortviz_engine::Algorithm;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::{Config, ShuffleConfig};
use crate::error::Result;
use crate::playback::{OverrideOutcome, Playback, PlaybackSnapshot, Tick};
use crate::shuffle::{self, ShuffleRequest};
use crate::visualizer::VisualizerUpdate;
use crate::websocket::{EventBroadcaster, VisualizerEvent};

#[derive(Debug)]
struct DriverInner {
    playback: Playback,
    ticker: Option<JoinHandle<()>>,
}

impl DriverInner {
    fn cancel_ticker(&mut self) {
        if let Some(handle) = self.ticker.take() {
            handle.abort();
        }
    }
}

/// Cloneable handle to the shared playback state.
///
/// All mutation goes through one mutex, so a step's fields are always applied
/// together and controls never interleave with a tick.
#[derive(Debug, Clone)]
pub struct Driver {
    inner: Arc<Mutex<DriverInner>>,
    events: EventBroadcaster,
    shuffle: Arc<ShuffleConfig>,
}

impl Driver {
    /// Creates a stopped driver from `config`.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self::with_events(config, EventBroadcaster::new(config.event_capacity))
    }

    /// Creates a stopped driver publishing on an existing broadcaster.
    #[must_use]
    pub fn with_events(config: &Config, events: EventBroadcaster) -> Self {
        Self {
            inner: Arc::new(Mutex::new(DriverInner {
                playback: Playback::new(config),
                ticker: None,
            })),
            events,
            shuffle: Arc::new(config.shuffle.clone()),
        }
    }

    /// Returns the event broadcaster.
    #[must_use]
    pub const fn events(&self) -> &EventBroadcaster {
        &self.events
    }

    /// Returns a copy of the current playback state.
    pub async fn snapshot(&self) -> PlaybackSnapshot {
        self.inner.lock().await.playback.snapshot()
    }

    /// Starts or resumes the animation.
    pub async fn play(&self) -> Result<PlaybackSnapshot> {
        let mut inner = self.inner.lock().await;
        let was_running = inner.ticker.is_some();
        let epoch = inner.playback.play()?;
        if !was_running {
            self.spawn_ticker(&mut inner, epoch);
        }
        Ok(self.publish_playback(&inner))
    }

    /// Pauses the animation, keeping the engine's position.
    pub async fn pause(&self) -> PlaybackSnapshot {
        let mut inner = self.inner.lock().await;
        if inner.playback.pause() {
            inner.cancel_ticker();
        }
        self.publish_playback(&inner)
    }

    /// Stops the animation and discards the engine. Idempotent.
    pub async fn stop(&self) -> PlaybackSnapshot {
        let mut inner = self.inner.lock().await;
        inner.cancel_ticker();
        if inner.playback.stop() {
            self.publish_playback(&inner)
        } else {
            inner.playback.snapshot()
        }
    }

    /// Stops and restores the seed array.
    pub async fn reset(&self) -> PlaybackSnapshot {
        let mut inner = self.inner.lock().await;
        inner.cancel_ticker();
        inner.playback.reset();
        self.publish_playback(&inner)
    }

    /// Stops and shows a freshly generated random array.
    pub async fn shuffle(&self, request: ShuffleRequest) -> Result<PlaybackSnapshot> {
        let data = shuffle::generate(&request, &self.shuffle)?;
        self.load(data).await
    }

    /// Stops and shows `data`.
    pub async fn load(&self, data: Vec<f64>) -> Result<PlaybackSnapshot> {
        let mut inner = self.inner.lock().await;
        inner.playback.shuffle(data)?;
        inner.cancel_ticker();
        Ok(self.publish_playback(&inner))
    }

    /// Changes the delay between steps.
    pub async fn set_speed(&self, ms: u64) -> Result<PlaybackSnapshot> {
        let mut inner = self.inner.lock().await;
        inner.playback.set_speed(ms)?;
        Ok(self.publish_playback(&inner))
    }

    /// Selects the algorithm, rebinding a running animation.
    pub async fn select_algorithm(&self, algorithm: Algorithm) -> Result<PlaybackSnapshot> {
        let mut inner = self.inner.lock().await;
        let was_running = inner.ticker.is_some();
        let rebound = inner.playback.select_algorithm(algorithm)?;
        if was_running || rebound.is_some() {
            inner.cancel_ticker();
        }
        if let Some(epoch) = rebound {
            self.spawn_ticker(&mut inner, epoch);
        }
        Ok(self.publish_playback(&inner))
    }

    /// Submits an update from outside the animation cadence.
    ///
    /// Suppressed while the animation is running.
    pub async fn submit_external_step(&self, update: VisualizerUpdate) -> OverrideOutcome {
        let mut inner = self.inner.lock().await;
        let had_engine = inner.playback.has_engine();
        let outcome = inner.playback.submit_external(&update);
        self.events
            .send(VisualizerEvent::override_outcome(outcome, update));
        if had_engine && !inner.playback.has_engine() {
            self.publish_playback(&inner);
        }
        outcome
    }

    fn spawn_ticker(&self, inner: &mut DriverInner, epoch: u64) {
        inner.cancel_ticker();
        let shared = Arc::clone(&self.inner);
        let events = self.events.clone();
        inner.ticker = Some(tokio::spawn(run_ticker(shared, events, epoch)));
        debug!(epoch, "Spawned ticker");
    }

    fn publish_playback(&self, inner: &DriverInner) -> PlaybackSnapshot {
        let snapshot = inner.playback.snapshot();
        self.events.send(VisualizerEvent::playback(&snapshot));
        snapshot
    }
}

/// Ticks immediately, then once per speed period, until the run ends or the
/// epoch goes stale.
async fn run_ticker(inner: Arc<Mutex<DriverInner>>, events: EventBroadcaster, epoch: u64) {
    loop {
        let delay = {
            let mut guard = inner.lock().await;
            match guard.playback.tick(epoch) {
                Tick::Stale => return,
                Tick::Applied(step) => {
                    events.send(VisualizerEvent::step(step, epoch));
                    Duration::from_millis(guard.playback.speed_ms())
                }
                Tick::Finished { algorithm, stats } => {
                    // Detach our own handle; aborting it here would cancel this task.
                    drop(guard.ticker.take());
                    events.send(VisualizerEvent::run_complete(algorithm, stats));
                    events.send(VisualizerEvent::playback(&guard.playback.snapshot()));
                    info!(%algorithm, steps = stats.steps, "Animation finished");
                    return;
                }
            }
        };
        tokio::time::sleep(delay).await;
    }
}
