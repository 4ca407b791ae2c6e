//! Deterministic random number generation.
//!
//! RULE: Nothing in the simulation may call any platform RNG.
//! Market placement is the only random decision, and it draws from a
//! single SimRng seeded from the engine's master seed. Same seed, same
//! layouts, for every initialize() in the engine's lifetime.

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

/// Mixed into the master seed so that small seeds (0, 1, 2…) still start
/// from well-separated PCG states.
const SEED_MIX: u64 = 0x9e37_79b9_7f4a_7c15;

pub struct SimRng {
    seed:  u64,
    inner: Pcg64Mcg,
}

impl SimRng {
    pub fn new(master_seed: u64) -> Self {
        Self {
            seed:  master_seed,
            inner: Pcg64Mcg::seed_from_u64(master_seed ^ SEED_MIX),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Draw a raw u64 (full range).
    pub fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    /// Roll a usize in [0, n).
    pub fn next_index_below(&mut self, n: usize) -> usize {
        assert!(n > 0, "n must be > 0");
        (self.inner.next_u64() % n as u64) as usize
    }
}
