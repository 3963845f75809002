//! Seed management for asset placement.
//!
//! One master seed drives a whole run. Category `i` uses `master + i` and
//! instance `j` of that category uses `category_seed + j`. Different
//! (category, instance) pairs can alias onto the same seed; this is kept
//! so that manifests stay reproducible across versions.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::warn;

/// Upper bound (exclusive) for freshly drawn master seeds.
pub const FRESH_SEED_LIMIT: u64 = 1_000_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorldSeeds {
    /// Master seed for the run
    pub master: u64,
    /// True when no seed was supplied and `master` was drawn at random
    pub generated: bool,
}

impl WorldSeeds {
    pub fn from_master(master: u64) -> Self {
        Self { master, generated: false }
    }

    /// Use the supplied seed, or draw and report a fresh one so the run can
    /// be reproduced later.
    pub fn resolve(seed: Option<u64>) -> Self {
        match seed {
            Some(master) => Self::from_master(master),
            None => {
                let master = rand::thread_rng().gen_range(0..FRESH_SEED_LIMIT);
                warn!(seed = master, "no seed supplied, generated a fresh one");
                Self { master, generated: true }
            }
        }
    }

    /// Seed for the `index`-th requested category.
    pub fn category(&self, index: usize) -> u64 {
        category_seed(self.master, index)
    }
}

pub fn category_seed(master: u64, index: usize) -> u64 {
    master.wrapping_add(index as u64)
}

pub fn instance_seed(category_seed: u64, index: usize) -> u64 {
    category_seed.wrapping_add(index as u64)
}

/// The generator used by every seeded draw in the crate.
pub fn rng_for(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}
