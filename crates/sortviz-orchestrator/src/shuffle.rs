//! Random array generation for the shuffle control.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::ShuffleConfig;
use crate::error::{Result, SortvizError};

/// A shuffle request from the UI.
///
/// `min` and `max` fall back to the configured value bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShuffleRequest {
    /// Number of values to generate.
    pub size: usize,
    /// Smallest value, inclusive.
    #[serde(default)]
    pub min: Option<u32>,
    /// Largest value, inclusive.
    #[serde(default)]
    pub max: Option<u32>,
}

impl ShuffleRequest {
    /// Creates a request that uses the configured value bounds.
    #[must_use]
    pub const fn new(size: usize) -> Self {
        Self {
            size,
            min: None,
            max: None,
        }
    }

    /// Checks the request against `config` and returns the resolved value range.
    pub fn resolve(&self, config: &ShuffleConfig) -> Result<(u32, u32)> {
        if self.size < config.min_size || self.size > config.max_size {
            return Err(SortvizError::invalid_shuffle(
                format!("size {} is out of range", self.size),
                config.min_size,
                config.max_size,
            ));
        }

        let min = self.min.unwrap_or(config.min_value);
        let max = self.max.unwrap_or(config.max_value);
        if min > max {
            return Err(SortvizError::invalid_shuffle(
                format!("min {min} is greater than max {max}"),
                config.min_size,
                config.max_size,
            ));
        }
        Ok((min, max))
    }
}

/// Generates `request.size` integers uniformly in the resolved range.
pub fn generate(request: &ShuffleRequest, config: &ShuffleConfig) -> Result<Vec<f64>> {
    generate_with(&mut rand::thread_rng(), request, config)
}

/// Like [`generate`], drawing from a caller-supplied generator.
pub fn generate_with<R: Rng + ?Sized>(
    rng: &mut R,
    request: &ShuffleRequest,
    config: &ShuffleConfig,
) -> Result<Vec<f64>> {
    let (min, max) = request.resolve(config)?;
    Ok((0..request.size)
        .map(|_| f64::from(rng.gen_range(min..=max)))
        .collect())
}
