//! Random number generation for dungeon layouts
//!
//! Uses a seeded ChaCha RNG so a seed reproduces the same layout on every
//! platform. The generator is consumed strictly in algorithm order.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Layout random number generator
///
/// Wraps ChaCha8Rng for reproducible generation.
/// Note: only the seed is serialized; deserializing restarts the stream.
#[derive(Debug, Clone)]
pub struct DungeonRng {
    rng: ChaCha8Rng,
    seed: u64,
}

impl Serialize for DungeonRng {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.seed.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for DungeonRng {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let seed = u64::deserialize(deserializer)?;
        Ok(DungeonRng::new(seed))
    }
}

impl DungeonRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Get the seed used to create this RNG
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Restart the stream from the original seed
    pub fn reseed(&mut self) {
        self.rng = ChaCha8Rng::seed_from_u64(self.seed);
    }

    /// Uniform integer in `lo..=hi`
    ///
    /// Returns `lo` without consuming randomness if `hi <= lo`.
    pub fn range_inclusive(&mut self, lo: i32, hi: i32) -> i32 {
        if hi <= lo {
            return lo;
        }
        self.rng.gen_range(lo..=hi)
    }

    /// Uniform float in `[0, 1)`
    pub fn unit(&mut self) -> f32 {
        self.rng.gen_range(0.0f32..1.0)
    }

    /// Returns true when a uniform draw falls below `probability`
    ///
    /// Always consumes exactly one draw, so `0.0` and `1.0` keep the stream
    /// aligned with intermediate values.
    pub fn chance(&mut self, probability: f32) -> bool {
        self.unit() < probability
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_bounds() {
        let mut rng = DungeonRng::new(42);
        for _ in 0..1000 {
            let n = rng.range_inclusive(3, 7);
            assert!((3..=7).contains(&n));
        }
    }

    #[test]
    fn test_empty_range() {
        let mut rng = DungeonRng::new(42);
        assert_eq!(rng.range_inclusive(5, 5), 5);
        assert_eq!(rng.range_inclusive(5, 2), 5);
    }

    #[test]
    fn test_unit_bounds() {
        let mut rng = DungeonRng::new(7);
        for _ in 0..1000 {
            let f = rng.unit();
            assert!((0.0..1.0).contains(&f));
        }
    }

    #[test]
    fn test_chance_extremes() {
        let mut rng = DungeonRng::new(1);
        for _ in 0..100 {
            assert!(!rng.chance(0.0));
            assert!(rng.chance(1.0));
        }
    }

    #[test]
    fn test_reproducibility() {
        let mut rng1 = DungeonRng::new(42);
        let mut rng2 = DungeonRng::new(42);

        for _ in 0..100 {
            assert_eq!(rng1.range_inclusive(0, 100), rng2.range_inclusive(0, 100));
        }
    }

    #[test]
    fn test_reseed_restarts_stream() {
        let mut rng = DungeonRng::new(9);
        let first: Vec<i32> = (0..10).map(|_| rng.range_inclusive(0, 1000)).collect();
        rng.reseed();
        let second: Vec<i32> = (0..10).map(|_| rng.range_inclusive(0, 1000)).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_serde_keeps_seed() {
        let rng = DungeonRng::new(1234);
        let json = serde_json::to_string(&rng).unwrap();
        let back: DungeonRng = serde_json::from_str(&json).unwrap();
        assert_eq!(back.seed(), 1234);
    }
}
