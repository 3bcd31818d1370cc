//! Random perturbation used by the single-crop pipeline.
//!
//! Daily demand noise, confidence jitter and the market momentum factor all
//! draw from a [`NoiseSource`], so callers decide whether a run is reproducible.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Supplies uniform draws from `[low, high)`.
pub trait NoiseSource {
    fn sample(&mut self, low: f64, high: f64) -> f64;
}

/// Pseudo-random noise backed by a seedable generator.
#[derive(Debug, Clone)]
pub struct SeededNoise {
    rng: StdRng,
}

impl SeededNoise {
    /// Reproducible noise: the same seed yields the same draws.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Noise seeded from the operating system, for production runs.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl NoiseSource for SeededNoise {
    fn sample(&mut self, low: f64, high: f64) -> f64 {
        if high <= low {
            return low;
        }
        self.rng.gen_range(low..high)
    }
}

/// Returns the centre of every requested range: the expected value of the
/// noise, with zero variance.
#[derive(Debug, Clone, Copy, Default)]
pub struct Midpoint;

impl NoiseSource for Midpoint {
    fn sample(&mut self, low: f64, high: f64) -> f64 {
        low + (high - low) / 2.0
    }
}
