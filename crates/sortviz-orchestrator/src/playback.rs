//! Synchronous playback core.
//!
//! [`Playback`] owns the visualizer store, the selected algorithm and the bound
//! engine, and implements the `stopped → running ⇄ paused → stopped` state
//! machine. It never sleeps or spawns; the async [`crate::Driver`] calls
//! [`Playback::tick`] on a timer and serializes every call through one lock.

use serde::{Deserialize, Serialize};
use sortviz_engine::{Algorithm, Engine, RunStats, Step};
use tracing::{debug, info, warn};

use crate::config::{Config, SpeedBounds};
use crate::error::{Result, SortvizError};
use crate::visualizer::{VisualizerState, VisualizerStore, VisualizerUpdate};

/// Whether the animation is advancing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackStatus {
    /// No engine bound.
    #[default]
    Stopped,
    /// Engine bound and advancing on every tick.
    Running,
    /// Engine bound but not advancing.
    Paused,
}

impl std::fmt::Display for PlaybackStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stopped => write!(f, "stopped"),
            Self::Running => write!(f, "running"),
            Self::Paused => write!(f, "paused"),
        }
    }
}

/// Result of one scheduled tick.
#[derive(Debug, Clone, PartialEq)]
pub enum Tick {
    /// The tick belongs to a cancelled run; nothing changed.
    Stale,
    /// One step was merged into the visualizer state.
    Applied(Step),
    /// The engine was exhausted; playback is now stopped.
    Finished {
        /// The algorithm that ran.
        algorithm: Algorithm,
        /// Counters for the whole run.
        stats: RunStats,
    },
}

/// What happened to an external update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverrideOutcome {
    /// The update was merged into the visualizer state.
    Applied,
    /// The animation is running; the update was dropped.
    Suppressed,
    /// The update carried non-finite values and was dropped.
    Rejected,
}

impl std::fmt::Display for OverrideOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Applied => write!(f, "applied"),
            Self::Suppressed => write!(f, "suppressed"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

/// Read-only view of the playback state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackSnapshot {
    /// What the UI renders.
    pub visualizer: VisualizerState,
    /// Whether the animation is advancing.
    pub status: PlaybackStatus,
    /// The selected algorithm.
    pub algorithm: Algorithm,
    /// Delay between steps in milliseconds.
    pub speed_ms: u64,
    /// Current version of the visualizer state.
    pub epoch: u64,
}

/// The playback state machine.
#[derive(Debug)]
pub struct Playback {
    store: VisualizerStore,
    seed: Vec<f64>,
    algorithm: Algorithm,
    speed_ms: u64,
    speed_bounds: SpeedBounds,
    status: PlaybackStatus,
    engine: Option<Engine>,
}

impl Playback {
    /// Creates a stopped playback showing the configured seed array.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            store: VisualizerStore::new(config.seed_array.clone()),
            seed: config.seed_array.clone(),
            algorithm: config.default_algorithm,
            speed_ms: config.animation_speed_ms,
            speed_bounds: config.speed_bounds,
            status: PlaybackStatus::Stopped,
            engine: None,
        }
    }

    /// Returns the playback status.
    #[must_use]
    pub const fn status(&self) -> PlaybackStatus {
        self.status
    }

    /// Returns the selected algorithm.
    #[must_use]
    pub const fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Returns the delay between steps in milliseconds.
    #[must_use]
    pub const fn speed_ms(&self) -> u64 {
        self.speed_ms
    }

    /// Returns the current epoch.
    #[must_use]
    pub const fn epoch(&self) -> u64 {
        self.store.epoch()
    }

    /// Returns the current visualizer state.
    #[must_use]
    pub const fn state(&self) -> &VisualizerState {
        self.store.state()
    }

    /// Returns `true` if an engine is bound.
    #[must_use]
    pub const fn has_engine(&self) -> bool {
        self.engine.is_some()
    }

    /// Returns a copy of everything the UI needs.
    #[must_use]
    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            visualizer: self.store.state().clone(),
            status: self.status,
            algorithm: self.algorithm,
            speed_ms: self.speed_ms,
            epoch: self.store.epoch(),
        }
    }

    /// Starts or resumes the animation and returns the epoch ticks must carry.
    ///
    /// While stopped, binds a new engine against a copy of the data on
    /// screen. While paused, resumes the bound engine. While running, returns
    /// the live epoch unchanged.
    pub fn play(&mut self) -> Result<u64> {
        match self.status {
            PlaybackStatus::Running => return Ok(self.store.epoch()),
            PlaybackStatus::Paused if self.engine.is_some() => {
                info!(algorithm = %self.algorithm, "Resuming playback");
            }
            PlaybackStatus::Paused | PlaybackStatus::Stopped => {
                self.engine = Some(Engine::new(self.algorithm, &self.store.state().data)?);
                info!(
                    algorithm = %self.algorithm,
                    len = self.store.state().data.len(),
                    "Bound new engine"
                );
            }
        }
        self.status = PlaybackStatus::Running;
        Ok(self.store.bump_epoch())
    }

    /// Pauses a running animation, keeping the engine. Returns `false` if not running.
    pub fn pause(&mut self) -> bool {
        if self.status != PlaybackStatus::Running {
            return false;
        }
        self.status = PlaybackStatus::Paused;
        let epoch = self.store.bump_epoch();
        info!(epoch, "Paused playback");
        true
    }

    /// Discards the bound engine. Returns `false` if already stopped.
    pub fn stop(&mut self) -> bool {
        if self.status == PlaybackStatus::Stopped && self.engine.is_none() {
            return false;
        }
        self.engine = None;
        self.status = PlaybackStatus::Stopped;
        let epoch = self.store.bump_epoch();
        info!(epoch, "Stopped playback");
        true
    }

    /// Stops and restores the seed array.
    pub fn reset(&mut self) {
        self.stop();
        self.store.replace(self.seed.clone());
        self.store.bump_epoch();
    }

    /// Stops and shows `data` at rest.
    pub fn shuffle(&mut self, data: Vec<f64>) -> Result<()> {
        sortviz_engine::validate_values(&data)?;
        self.stop();
        self.store.replace(data);
        self.store.bump_epoch();
        Ok(())
    }

    /// Changes the delay between steps. Takes effect from the next tick.
    pub fn set_speed(&mut self, ms: u64) -> Result<()> {
        if !self.speed_bounds.contains(ms) {
            return Err(SortvizError::invalid_speed(
                ms,
                self.speed_bounds.min_ms,
                self.speed_bounds.max_ms,
            ));
        }
        self.speed_ms = ms;
        Ok(())
    }

    /// Selects the algorithm used by the next run.
    ///
    /// While running, cancels the current run and rebinds `algorithm` against
    /// the data on screen, returning the new epoch. While paused, discards the
    /// paused run and stops.
    pub fn select_algorithm(&mut self, algorithm: Algorithm) -> Result<Option<u64>> {
        let previous = std::mem::replace(&mut self.algorithm, algorithm);
        match self.status {
            PlaybackStatus::Running => {
                let engine = match Engine::new(algorithm, &self.store.state().data) {
                    Ok(engine) => engine,
                    Err(e) => {
                        self.algorithm = previous;
                        return Err(e.into());
                    }
                };
                self.engine = Some(engine);
                let epoch = self.store.bump_epoch();
                info!(from = %previous, to = %algorithm, epoch, "Rebound running engine");
                Ok(Some(epoch))
            }
            PlaybackStatus::Paused => {
                self.stop();
                Ok(None)
            }
            PlaybackStatus::Stopped => Ok(None),
        }
    }

    /// Advances the bound engine by one step if `epoch` is still current.
    pub fn tick(&mut self, epoch: u64) -> Tick {
        if epoch != self.store.epoch() || self.status != PlaybackStatus::Running {
            debug!(epoch, current = self.store.epoch(), "Ignoring stale tick");
            return Tick::Stale;
        }

        let Some(engine) = self.engine.as_mut() else {
            warn!(epoch, "Running without a bound engine");
            self.status = PlaybackStatus::Stopped;
            self.store.bump_epoch();
            return Tick::Stale;
        };

        if let Some(step) = engine.next_step() {
            self.store.apply_step(&step);
            return Tick::Applied(step);
        }

        let stats = engine.stats();
        let algorithm = engine.algorithm();
        self.engine = None;
        self.status = PlaybackStatus::Stopped;
        self.store.bump_epoch();
        info!(%algorithm, steps = stats.steps, "Run complete");
        Tick::Finished { algorithm, stats }
    }

    /// Applies an update from outside the animation cadence.
    ///
    /// Suppressed while running. Applied immediately while stopped or paused;
    /// an update that replaces the array while paused also discards the
    /// paused run.
    pub fn submit_external(&mut self, update: &VisualizerUpdate) -> OverrideOutcome {
        if self.status == PlaybackStatus::Running {
            info!("Suppressing external update while animation is running");
            return OverrideOutcome::Suppressed;
        }

        if let Err(e) = self.store.apply_update(update) {
            warn!(error = %e, "Rejecting external update");
            return OverrideOutcome::Rejected;
        }

        if update.replaces_data() && self.status == PlaybackStatus::Paused {
            self.stop();
        }
        OverrideOutcome::Applied
    }
}
