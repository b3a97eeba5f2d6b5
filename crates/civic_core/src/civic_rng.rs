//! Deterministic RNG resource for every random draw in the civic core.
//!
//! Event density, scorer confidence, baseline snapshots, forecast points and
//! alert ids all draw from an injected `rand::Rng`. Inside the Bevy pipeline
//! that generator is `CivicRng`; outside it callers pass whatever they like
//! (tests use seeded `ChaCha8Rng` or `StepRng`).

use bevy::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::DEFAULT_SEED;

/// Systems that need randomness take `ResMut<CivicRng>` and pass `&mut rng.0`.
#[derive(Resource)]
pub struct CivicRng(pub ChaCha8Rng);

impl Default for CivicRng {
    fn default() -> Self {
        Self(ChaCha8Rng::seed_from_u64(DEFAULT_SEED))
    }
}

impl CivicRng {
    pub fn from_seed_u64(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }

    /// Split off an independent generator for work that leaves the main
    /// thread (async syncs own their RNG for the lifetime of the task).
    pub fn fork(&mut self) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.0.gen())
    }
}
