//! Seedable random stream shared by everything that needs randomness.
//!
//! Callers take `&mut impl rand::Rng`, so tests can hand in a fixed-seed
//! `SessionRng` and replay a session exactly.

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Seed used when none is supplied.
pub const DEFAULT_SEED: u64 = 42;

/// Deterministic RNG for a rendering session.
#[derive(Debug, Clone)]
pub struct SessionRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl Default for SessionRng {
    fn default() -> Self {
        Self::from_seed_u64(DEFAULT_SEED)
    }
}

impl SessionRng {
    /// Create a new `SessionRng` seeded from the given `u64` value.
    pub fn from_seed_u64(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Seed this stream was created from.
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl RngCore for SessionRng {
    fn next_u32(&mut self) -> u32 {
        self.inner.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.inner.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.inner.try_fill_bytes(dest)
    }
}
