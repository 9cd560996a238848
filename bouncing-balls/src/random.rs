// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Per-particle random streams
//!
//! Every particle owns one [`RandomStream`]. Streams for a whole population
//! are derived from a single base seed as `base + i * STREAM_SEED_STRIDE`
//! (wrapping), and the PCG seeding step scrambles those nearby seeds into
//! unrelated states.
//!
//! Base seeds for reseeding come from a [`SeedSource`], which is seeded from
//! OS entropy unless the host pins it for reproducible runs.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Odd multiplier spacing the seeds of neighbouring particles
pub const STREAM_SEED_STRIDE: u64 = 9973;

/// Seed of the stream owned by particle `index`
pub fn stream_seed(base_seed: u64, index: usize) -> u64 {
    base_seed.wrapping_add((index as u64).wrapping_mul(STREAM_SEED_STRIDE))
}

/// Deterministic uniform float generator owned by a single particle
///
/// # Examples
///
/// ```
/// use bouncing_balls::random::RandomStream;
///
/// let mut a = RandomStream::new(42);
/// let mut b = RandomStream::new(42);
/// let x = a.next_uniform_f32(-1.0, 1.0);
/// assert_eq!(x, b.next_uniform_f32(-1.0, 1.0));
/// assert!((-1.0..1.0).contains(&x));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RandomStream {
    rng: Pcg32,
}

impl RandomStream {
    /// Create a stream from a seed
    pub fn new(seed: u64) -> Self {
        RandomStream {
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Create the stream for particle `index` of a population seeded with `base_seed`
    pub fn for_particle(base_seed: u64, index: usize) -> Self {
        RandomStream::new(stream_seed(base_seed, index))
    }

    /// Draw a uniform value in `[lower, upper)`
    ///
    /// Returns `lower` without advancing the stream when the range is empty,
    /// so a zero jitter magnitude is a valid configuration.
    pub fn next_uniform_f32(&mut self, lower: f32, upper: f32) -> f32 {
        if lower < upper {
            self.rng.random_range(lower..upper)
        } else {
            lower
        }
    }

    /// Draw a uniform value in `[0, 1)`
    pub fn next_unit_f32(&mut self) -> f32 {
        self.rng.random::<f32>()
    }
}

/// Source of base seeds for population-wide reseeding
#[derive(Debug, Clone)]
pub struct SeedSource {
    rng: Pcg32,
}

impl SeedSource {
    /// Seed source initialized from OS entropy
    pub fn from_entropy() -> Self {
        SeedSource {
            rng: Pcg32::seed_from_u64(rand::random::<u64>()),
        }
    }

    /// Seed source producing a fixed sequence of seeds
    pub fn fixed(seed: u64) -> Self {
        SeedSource {
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Next base seed; never zero
    pub fn next_seed(&mut self) -> u64 {
        self.rng.random_range(1..=u64::MAX)
    }
}

impl Default for SeedSource {
    fn default() -> Self {
        Self::from_entropy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = RandomStream::new(0xDEADBEEF);
        let mut b = RandomStream::new(0xDEADBEEF);
        for _ in 0..100 {
            assert_eq!(a.next_uniform_f32(-2.0, 2.0), b.next_uniform_f32(-2.0, 2.0));
        }
        assert_eq!(a, b);
    }

    #[test]
    fn test_values_stay_in_range() {
        let mut stream = RandomStream::new(7);
        for _ in 0..10_000 {
            let v = stream.next_uniform_f32(-0.5, 3.0);
            assert!(v >= -0.5 && v < 3.0, "out of range: {}", v);
            let u = stream.next_unit_f32();
            assert!((0.0..1.0).contains(&u));
        }
    }

    #[test]
    fn test_empty_range_returns_lower_bound() {
        let mut stream = RandomStream::new(1);
        let before = stream.clone();
        assert_eq!(stream.next_uniform_f32(0.0, 0.0), 0.0);
        assert_eq!(stream.next_uniform_f32(2.0, 1.0), 2.0);
        assert_eq!(stream, before);
    }

    #[test]
    fn test_neighbouring_particles_get_distinct_streams() {
        let mut a = RandomStream::for_particle(1, 0);
        let mut b = RandomStream::for_particle(1, 1);
        let xs: Vec<f32> = (0..8).map(|_| a.next_unit_f32()).collect();
        let ys: Vec<f32> = (0..8).map(|_| b.next_unit_f32()).collect();
        assert_ne!(xs, ys);
    }

    #[test]
    fn test_stream_seed_wraps() {
        assert_eq!(stream_seed(10, 0), 10);
        assert_eq!(stream_seed(10, 2), 10 + 2 * STREAM_SEED_STRIDE);
        assert_eq!(stream_seed(u64::MAX, 1), STREAM_SEED_STRIDE - 1);
    }

    #[test]
    fn test_fixed_seed_source_is_reproducible() {
        let mut a = SeedSource::fixed(3);
        let mut b = SeedSource::fixed(3);
        for _ in 0..10 {
            let s = a.next_seed();
            assert_ne!(s, 0);
            assert_eq!(s, b.next_seed());
        }
    }
}
