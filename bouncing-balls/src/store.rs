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
//! Columnar particle storage
//!
//! Particle state is kept as a Structure-of-Arrays: one contiguous column per
//! field instead of a vector of particle structs.
//!
//! ```text
//! positions:  [p0, p1, p2, ...]
//! velocities: [v0, v1, v2, ...]
//! streams:    [r0, r1, r2, ...]
//! ```
//!
//! A particle is nothing more than an index into these columns. The columns
//! are allocated once, always have the same length, and are never resized
//! until [`ParticleStore::dispose`] releases them.

use crate::config::{Bounds, SpeedRange};
use crate::error::{Axis, ConfigError};
use crate::random::RandomStream;
use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use std::f32::consts::TAU;

/// Mutable view of all three columns at once
///
/// Borrowing the columns separately lets the stepper zip them into one
/// parallel iterator while each task still owns exactly one slot.
pub struct ColumnsMut<'a> {
    /// Particle positions
    pub positions: &'a mut [Vec3],
    /// Particle velocities
    pub velocities: &'a mut [Vec3],
    /// Per-particle random streams
    pub streams: &'a mut [RandomStream],
}

/// Owner of all per-particle state
#[derive(Debug, Clone, Default)]
pub struct ParticleStore {
    positions: Vec<Vec3>,
    velocities: Vec<Vec3>,
    streams: Vec<RandomStream>,
}

impl ParticleStore {
    /// Allocate and populate `count` particles
    ///
    /// Positions are uniform over `bounds` shrunk by `radius` on every side,
    /// at z = 0. Velocities have a uniform random heading and a speed drawn
    /// from `speed_range`. Random streams are seeded from `seed` as well, so
    /// the whole store is reproducible from its arguments.
    ///
    /// # Errors
    ///
    /// Fails without allocating when `count` is zero, the radius is invalid,
    /// the speed range is invalid, or the radius margin leaves no room on
    /// either axis.
    pub fn initialize(
        count: usize,
        bounds: Bounds,
        radius: f32,
        speed_range: SpeedRange,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        if count == 0 {
            return Err(ConfigError::ZeroParticles);
        }
        if !(radius >= 0.0 && radius.is_finite()) {
            return Err(ConfigError::InvalidRadius(radius));
        }
        bounds.validate_margin(radius)?;
        speed_range.validate()?;

        let (x_min, x_max) = bounds.inner_range(Axis::X, radius);
        let (y_min, y_max) = bounds.inner_range(Axis::Y, radius);

        let mut rng = Pcg32::seed_from_u64(seed);
        let mut positions = Vec::with_capacity(count);
        let mut velocities = Vec::with_capacity(count);

        for _ in 0..count {
            let x = rng.random_range(x_min..x_max);
            let y = rng.random_range(y_min..y_max);
            positions.push(Vec3::new(x, y, 0.0));

            let angle = rng.random_range(0.0..TAU);
            let speed = if speed_range.min < speed_range.max {
                rng.random_range(speed_range.min..speed_range.max)
            } else {
                speed_range.min
            };
            let (sin, cos) = angle.sin_cos();
            velocities.push(Vec3::new(cos * speed, sin * speed, 0.0));
        }

        let mut store = ParticleStore {
            positions,
            velocities,
            streams: Vec::new(),
        };
        store.reinit_random_streams(rng.random::<u64>());

        log::info!(
            "Initialized {} particles in [{}, {}] x [{}, {}]",
            count,
            x_min,
            x_max,
            y_min,
            y_max
        );

        Ok(store)
    }

    /// Replace every particle's random stream
    ///
    /// Only the stream column is touched; positions and velocities are left
    /// as they are. The column keeps its length.
    pub fn reinit_random_streams(&mut self, base_seed: u64) {
        let count = self.positions.len();
        self.streams.clear();
        self.streams
            .extend((0..count).map(|i| RandomStream::for_particle(base_seed, i)));

        debug_assert_eq!(self.streams.len(), self.positions.len());
        log::debug!("Reseeded {} random streams (base seed {:#x})", count, base_seed);
    }

    /// Release all storage
    ///
    /// Safe to call more than once and on a store that was never initialized.
    pub fn dispose(&mut self) {
        if !self.is_initialized() {
            return;
        }
        let count = self.len();
        self.positions = Vec::new();
        self.velocities = Vec::new();
        self.streams = Vec::new();
        log::debug!("Released storage for {} particles", count);
    }

    /// Whether the store currently holds particles
    pub fn is_initialized(&self) -> bool {
        !self.positions.is_empty()
    }

    /// Number of particles
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Check if the store holds no particles
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Particle positions
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Particle velocities
    pub fn velocities(&self) -> &[Vec3] {
        &self.velocities
    }

    /// Per-particle random streams
    pub fn streams(&self) -> &[RandomStream] {
        &self.streams
    }

    /// Borrow all columns mutably
    pub fn columns_mut(&mut self) -> ColumnsMut<'_> {
        ColumnsMut {
            positions: &mut self.positions,
            velocities: &mut self.velocities,
            streams: &mut self.streams,
        }
    }

    /// Overwrite the state of one particle
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn set_particle(&mut self, index: usize, position: Vec3, velocity: Vec3) {
        self.positions[index] = position;
        self.velocities[index] = velocity;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_store(count: usize) -> ParticleStore {
        ParticleStore::initialize(
            count,
            Bounds::from_xyxy(-8.0, -5.0, 8.0, 5.0),
            0.05,
            SpeedRange::new(0.5, 3.0),
            0xABCDEF,
        )
        .unwrap()
    }

    #[test]
    fn test_columns_fully_populated() {
        let store = small_store(1000);
        assert_eq!(store.len(), 1000);
        assert_eq!(store.positions().len(), 1000);
        assert_eq!(store.velocities().len(), 1000);
        assert_eq!(store.streams().len(), 1000);
        assert!(store.is_initialized());
    }

    #[test]
    fn test_initial_positions_inside_margin() {
        let store = small_store(5000);
        for p in store.positions() {
            assert!(p.x >= -7.95 && p.x < 7.95, "x out of range: {}", p.x);
            assert!(p.y >= -4.95 && p.y < 4.95, "y out of range: {}", p.y);
            assert_eq!(p.z, 0.0);
        }
    }

    #[test]
    fn test_initial_speeds_in_range() {
        let store = small_store(5000);
        for v in store.velocities() {
            let speed = v.length();
            assert!(speed >= 0.5 - 1e-4 && speed <= 3.0 + 1e-4, "speed {}", speed);
            assert_eq!(v.z, 0.0);
        }
    }

    #[test]
    fn test_same_seed_same_store() {
        let a = small_store(64);
        let b = small_store(64);
        assert_eq!(a.positions(), b.positions());
        assert_eq!(a.velocities(), b.velocities());
        assert_eq!(a.streams(), b.streams());
    }

    #[test]
    fn test_fixed_speed_range() {
        let store = ParticleStore::initialize(
            10,
            Bounds::default(),
            0.05,
            SpeedRange::new(2.0, 2.0),
            1,
        )
        .unwrap();
        for v in store.velocities() {
            assert!((v.length() - 2.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_empty_placement_fails_fast() {
        let result = ParticleStore::initialize(
            10,
            Bounds::from_xyxy(0.0, 0.0, 0.1, 1.0),
            0.05,
            SpeedRange::default(),
            1,
        );
        assert!(matches!(
            result,
            Err(ConfigError::EmptyPlacementArea { axis: Axis::X, .. })
        ));
    }

    #[test]
    fn test_reinit_touches_only_streams() {
        let mut store = small_store(100);
        let positions = store.positions().to_vec();
        let velocities = store.velocities().to_vec();
        let streams = store.streams().to_vec();

        store.reinit_random_streams(12345);

        assert_eq!(store.positions(), positions.as_slice());
        assert_eq!(store.velocities(), velocities.as_slice());
        assert_ne!(store.streams(), streams.as_slice());
        assert_eq!(store.streams().len(), 100);
    }

    #[test]
    fn test_dispose_is_idempotent() {
        let mut store = small_store(10);
        store.dispose();
        assert!(!store.is_initialized());
        assert_eq!(store.len(), 0);
        assert!(store.streams().is_empty());
        store.dispose();
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_dispose_uninitialized_is_noop() {
        let mut store = ParticleStore::default();
        store.dispose();
        assert!(store.is_empty());
    }
}
