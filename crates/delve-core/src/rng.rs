//! Random number generation for level layouts
//!
//! Uses a seeded ChaCha RNG so that one seed reproduces one layout.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::layout::Rotation;

/// Level random stream
///
/// Wraps ChaCha8Rng for reproducible generation.
/// Note: only the seed is serialized, a deserialized stream restarts from the beginning.
#[derive(Debug, Clone)]
pub struct LevelRng {
    rng: ChaCha8Rng,
    seed: u64,
}

// Custom serialization - only serialize seed, recreate RNG on deserialize
impl Serialize for LevelRng {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.seed.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for LevelRng {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let seed = u64::deserialize(deserializer)?;
        Ok(LevelRng::new(seed))
    }
}

impl LevelRng {
    /// Create a new stream with the given seed
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Create a new stream with a random seed
    pub fn from_entropy() -> Self {
        let seed = rand::random();
        Self::new(seed)
    }

    /// Get the seed used to create this stream
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform integer in `lo..=hi`
    ///
    /// Returns `lo` when the range is empty.
    pub fn range_inclusive(&mut self, lo: i64, hi: i64) -> i64 {
        if hi <= lo {
            return lo;
        }
        self.rng.gen_range(lo..=hi)
    }

    /// Uniform index in `0..len`, or 0 for an empty range
    pub fn index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        self.rng.gen_range(0..len)
    }

    /// Uniform float in `[0, 1)`
    pub fn unit(&mut self) -> f64 {
        self.rng.r#gen::<f64>()
    }

    /// Uniform float in `[0, max)`, or 0 when `max` is not positive
    pub fn float_in(&mut self, max: f64) -> f64 {
        if max <= 0.0 {
            return 0.0;
        }
        self.unit() * max
    }

    /// Returns true when a unit roll lands at or below `probability`
    pub fn chance(&mut self, probability: f64) -> bool {
        self.unit() <= probability
    }

    /// One of the four quarter turns about the vertical axis
    pub fn rotation(&mut self) -> Rotation {
        Rotation::from_quarter_turns(self.range_inclusive(0, 3) as i32)
    }

    /// Choose a random element from a slice
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            None
        } else {
            Some(&items[self.index(items.len())])
        }
    }
}

impl Default for LevelRng {
    fn default() -> Self {
        Self::from_entropy()
    }
}
