//! Configuration types for the sortviz orchestrator.
//!
//! This module provides the configuration structures that control the
//! animation driver, array shuffling, the tutor client and the event stream.

use std::path::Path;

use serde::{Deserialize, Serialize};
use sortviz_engine::{validate_values, Algorithm};

use crate::error::{Result, SortvizError};

/// The default config file name.
pub const CONFIG_FILE_NAME: &str = "sortviz.json";

/// Default array shown at start-up and restored on reset.
fn default_seed_array() -> Vec<f64> {
    vec![70.0, 30.0, 90.0, 10.0, 50.0, 80.0, 20.0, 60.0, 100.0, 40.0]
}

/// Default delay between animation steps in milliseconds.
const fn default_animation_speed_ms() -> u64 {
    500
}

/// Default fastest accepted animation speed.
const fn default_min_speed_ms() -> u64 {
    10
}

/// Default slowest accepted animation speed.
const fn default_max_speed_ms() -> u64 {
    2000
}

const fn default_min_size() -> usize {
    2
}

const fn default_max_size() -> usize {
    50
}

const fn default_min_value() -> u32 {
    10
}

const fn default_max_value() -> u32 {
    100
}

/// Default tutor base URL.
fn default_tutor_base_url() -> String {
    "http://localhost:8000".to_string()
}

/// Default tutor timeout in seconds.
const fn default_tutor_timeout_secs() -> u64 {
    30
}

/// Default number of chat turns sent to the tutor.
const fn default_history_window() -> usize {
    10
}

/// Default capacity of the event broadcast channel.
const fn default_event_capacity() -> usize {
    100
}

/// Accepts any algorithm id, case-insensitively.
fn deserialize_algorithm<'de, D>(deserializer: D) -> std::result::Result<Algorithm, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    s.parse::<Algorithm>().map_err(|_| {
        serde::de::Error::custom(format!(
            "invalid algorithm '{s}': expected one of {}",
            Algorithm::ALL.map(|a| a.id()).join(", ")
        ))
    })
}

/// Main configuration for the visualizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Array shown at start-up and restored on reset.
    #[serde(default = "default_seed_array")]
    pub seed_array: Vec<f64>,

    /// Algorithm selected at start-up.
    #[serde(default, deserialize_with = "deserialize_algorithm")]
    pub default_algorithm: Algorithm,

    /// Delay between animation steps in milliseconds.
    #[serde(default = "default_animation_speed_ms")]
    pub animation_speed_ms: u64,

    /// Accepted range for `animation_speed_ms`.
    #[serde(default)]
    pub speed_bounds: SpeedBounds,

    /// Bounds for randomly generated arrays.
    #[serde(default)]
    pub shuffle: ShuffleConfig,

    /// Tutor collaborator settings.
    #[serde(default)]
    pub tutor: TutorConfig,

    /// Capacity of the event broadcast channel.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seed_array: default_seed_array(),
            default_algorithm: Algorithm::default(),
            animation_speed_ms: default_animation_speed_ms(),
            speed_bounds: SpeedBounds::default(),
            shuffle: ShuffleConfig::default(),
            tutor: TutorConfig::default(),
            event_capacity: default_event_capacity(),
        }
    }
}

impl Config {
    /// Loads configuration from the current working directory.
    ///
    /// Looks for `sortviz.json` in the current directory. If not found,
    /// returns the default configuration.
    pub fn load() -> Result<Self> {
        let current_dir = std::env::current_dir().map_err(|e| {
            SortvizError::config_parse(
                "<current directory>",
                format!("cannot determine current directory: {e}"),
            )
        })?;
        Self::load_from_dir(&current_dir)
    }

    /// Loads configuration from `sortviz.json` in a specific directory.
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        Self::load_from_file(&dir.join(CONFIG_FILE_NAME))
    }

    /// Loads configuration from a specific file path.
    ///
    /// If the file does not exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns `SortvizError::ConfigParseError` if the file exists but contains
    /// invalid JSON or an unknown algorithm id.
    ///
    /// Returns `SortvizError::ConfigValidationError` if the values are invalid.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let config = Self::default();
                config.validate()?;
                return Ok(config);
            }
            Err(e) => {
                return Err(SortvizError::config_parse(
                    path,
                    format!("failed to read file: {e}"),
                ));
            }
        };

        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| SortvizError::config_parse(path, e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `SortvizError::ConfigValidationError` if any check fails.
    pub fn validate(&self) -> Result<()> {
        if self.seed_array.is_empty() {
            return Err(SortvizError::config_validation(
                "seedArray must not be empty",
                "Provide at least one value in seedArray in your sortviz.json",
            ));
        }

        if let Err(e) = validate_values(&self.seed_array) {
            return Err(SortvizError::config_validation(
                format!("seedArray is invalid: {e}"),
                "Use only finite numbers in seedArray",
            ));
        }

        let bounds = self.speed_bounds;
        if bounds.min_ms == 0 || bounds.min_ms > bounds.max_ms {
            return Err(SortvizError::config_validation(
                format!(
                    "speedBounds must satisfy 0 < minMs <= maxMs (got {}..{})",
                    bounds.min_ms, bounds.max_ms
                ),
                "Set speedBounds.minMs and speedBounds.maxMs in ascending order",
            ));
        }

        if !bounds.contains(self.animation_speed_ms) {
            return Err(SortvizError::config_validation(
                format!(
                    "animationSpeedMs {} is outside speedBounds {}..{}",
                    self.animation_speed_ms, bounds.min_ms, bounds.max_ms
                ),
                "Choose an animationSpeedMs within speedBounds",
            ));
        }

        let shuffle = &self.shuffle;
        if shuffle.max_size == 0 || shuffle.min_size > shuffle.max_size {
            return Err(SortvizError::config_validation(
                format!(
                    "shuffle size bounds must satisfy minSize <= maxSize and maxSize >= 1 (got {}..{})",
                    shuffle.min_size, shuffle.max_size
                ),
                "Set shuffle.minSize and shuffle.maxSize in ascending order",
            ));
        }

        if shuffle.min_value > shuffle.max_value {
            return Err(SortvizError::config_validation(
                format!(
                    "shuffle.minValue {} is greater than shuffle.maxValue {}",
                    shuffle.min_value, shuffle.max_value
                ),
                "Set shuffle.minValue and shuffle.maxValue in ascending order",
            ));
        }

        if self.tutor.timeout_secs == 0 {
            return Err(SortvizError::config_validation(
                "tutor.timeoutSecs must be greater than 0",
                "Set tutor.timeoutSecs to at least 1 second in your sortviz.json",
            ));
        }

        if self.tutor.history_window == 0 {
            return Err(SortvizError::config_validation(
                "tutor.historyWindow must be greater than 0",
                "Set tutor.historyWindow to at least 1 in your sortviz.json",
            ));
        }

        if self.tutor.enabled && self.tutor.base_url.trim().is_empty() {
            return Err(SortvizError::config_validation(
                "tutor.baseUrl must not be empty when the tutor is enabled",
                "Provide the tutor service URL in your sortviz.json",
            ));
        }

        if self.event_capacity == 0 {
            return Err(SortvizError::config_validation(
                "eventCapacity must be greater than 0",
                "Set eventCapacity to at least 1 in your sortviz.json",
            ));
        }

        Ok(())
    }
}

/// Accepted range for the animation speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeedBounds {
    /// Fastest accepted speed in milliseconds.
    #[serde(default = "default_min_speed_ms")]
    pub min_ms: u64,

    /// Slowest accepted speed in milliseconds.
    #[serde(default = "default_max_speed_ms")]
    pub max_ms: u64,
}

impl Default for SpeedBounds {
    fn default() -> Self {
        Self {
            min_ms: default_min_speed_ms(),
            max_ms: default_max_speed_ms(),
        }
    }
}

impl SpeedBounds {
    /// Returns `true` if `ms` is within the bounds.
    #[must_use]
    pub const fn contains(&self, ms: u64) -> bool {
        ms >= self.min_ms && ms <= self.max_ms
    }
}

/// Bounds for randomly generated arrays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShuffleConfig {
    /// Smallest accepted array size.
    #[serde(default = "default_min_size")]
    pub min_size: usize,

    /// Largest accepted array size.
    #[serde(default = "default_max_size")]
    pub max_size: usize,

    /// Default smallest generated value.
    #[serde(default = "default_min_value")]
    pub min_value: u32,

    /// Default largest generated value.
    #[serde(default = "default_max_value")]
    pub max_value: u32,
}

impl Default for ShuffleConfig {
    fn default() -> Self {
        Self {
            min_size: default_min_size(),
            max_size: default_max_size(),
            min_value: default_min_value(),
            max_value: default_max_value(),
        }
    }
}

/// Tutor collaborator settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TutorConfig {
    /// Whether the tutor endpoint is available.
    #[serde(default)]
    pub enabled: bool,

    /// Base URL of the tutor service.
    #[serde(default = "default_tutor_base_url")]
    pub base_url: String,

    /// Client-side timeout for one tutor round trip.
    #[serde(default = "default_tutor_timeout_secs")]
    pub timeout_secs: u64,

    /// Number of most recent chat turns sent with each request.
    #[serde(default = "default_history_window")]
    pub history_window: usize,
}

impl Default for TutorConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: default_tutor_base_url(),
            timeout_secs: default_tutor_timeout_secs(),
            history_window: default_history_window(),
        }
    }
}
