//! Deterministic seed hierarchy.
//!
//! A master seed is expanded into sub-seeds per `(component, symbol)` pair.
//! Sub-seeds are derived via BLAKE3 hashing, so the market model of the TWAP
//! simulator and the simulated market factor of the attributor draw from
//! independent streams regardless of the order in which they are created.

use rand::rngs::StdRng;
use rand::SeedableRng;

/// Deterministic seed hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedHierarchy {
    master_seed: u64,
}

impl SeedHierarchy {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    /// Derive a deterministic sub-seed for a `(component, symbol)` pair.
    pub fn sub_seed(&self, component: &str, symbol: &str) -> u64 {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.master_seed.to_le_bytes());
        hasher.update(component.as_bytes());
        // Separator keeps ("ab", "c") and ("a", "bc") apart.
        hasher.update(&[0u8]);
        hasher.update(symbol.as_bytes());
        let hash = hasher.finalize();
        let mut first = [0u8; 8];
        first.copy_from_slice(&hash.as_bytes()[..8]);
        u64::from_le_bytes(first)
    }

    /// Create a seeded StdRng for a `(component, symbol)` pair.
    pub fn rng_for(&self, component: &str, symbol: &str) -> StdRng {
        StdRng::seed_from_u64(self.sub_seed(component, symbol))
    }
}
