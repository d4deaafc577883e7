//! Random sources for variant allocation

use std::collections::VecDeque;

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::domain::experiment::RandomSource;

/// Uniform draws in `[0, 1)` backed by [`StdRng`]
#[derive(Debug, Clone)]
pub struct UniformSource {
    rng: StdRng,
}

impl UniformSource {
    /// Seed from operating system entropy
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible draws from a fixed seed
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for UniformSource {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for UniformSource {
    fn next_draw(&mut self) -> Option<f64> {
        Some(self.rng.gen_range(0.0..1.0))
    }
}

/// Replays a fixed list of draws, then reports exhaustion.
///
/// Values are returned as given, including ones outside `[0, 1)`.
#[derive(Debug, Clone, Default)]
pub struct SequenceSource {
    draws: VecDeque<f64>,
}

impl SequenceSource {
    pub fn new(draws: impl IntoIterator<Item = f64>) -> Self {
        Self {
            draws: draws.into_iter().collect(),
        }
    }
}

impl RandomSource for SequenceSource {
    fn next_draw(&mut self) -> Option<f64> {
        self.draws.pop_front()
    }
}
