//! Uniform noise sources used by the synthetic series generators.
//!
//! Generators never reach for a global RNG; callers pass a [`NoiseSource`]
//! so that tests and previews can pin exact outputs while production code
//! uses an entropy-backed source.

use rand::rngs::{StdRng, ThreadRng};
use rand::{Rng, SeedableRng};

/// A source of uniform draws in `[0, 1)`.
pub trait NoiseSource {
    /// Returns the next uniform draw in `[0, 1)`.
    fn unit(&mut self) -> f64;

    /// Returns a uniform draw in `[min, max)`.
    fn uniform(&mut self, min: f64, max: f64) -> f64 {
        min + self.unit() * (max - min)
    }
}

impl NoiseSource for StdRng {
    fn unit(&mut self) -> f64 {
        self.random::<f64>()
    }
}

impl NoiseSource for ThreadRng {
    fn unit(&mut self) -> f64 {
        self.random::<f64>()
    }
}

/// Creates a reproducible noise source from a seed.
pub fn seeded(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Creates a noise source backed by the thread-local entropy RNG.
pub fn entropy() -> ThreadRng {
    rand::rng()
}

/// Noise source that always returns the same draw.
///
/// The value is clamped into `[0, 1)` on construction.
#[derive(Debug, Clone, Copy)]
pub struct ConstantNoise(f64);

impl ConstantNoise {
    /// Creates a constant source returning `value` on every draw.
    pub fn new(value: f64) -> Self {
        let value = if value.is_finite() { value } else { 0.0 };
        Self(value.clamp(0.0, 1.0 - f64::EPSILON))
    }

    /// Returns the constant draw.
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl NoiseSource for ConstantNoise {
    fn unit(&mut self) -> f64 {
        self.0
    }
}
