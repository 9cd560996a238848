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
//! Batched instanced-draw submission
//!
//! The renderer accepts at most [`MAX_INSTANCES_PER_BATCH`] matrices per
//! call. [`BatchRenderSubmitter`] cuts the per-frame transform buffer into
//! contiguous batches and submits them one after another on the calling
//! thread:
//!
//! ```text
//! N = 2500, K = 1023
//! [0 ............ 1023)[1023 ......... 2046)[2046 .. 2500)
//!       batch 0              batch 1          batch 2
//! ```
//!
//! Batches cover `[0, N)` exactly once, in index order, so draw order is the
//! same every frame.

use crate::error::ConfigError;
use crate::transform::InstanceTransform;
use glam::Mat4;
use std::ops::Range;

/// Hard per-call instance limit of the renderer
pub const MAX_INSTANCES_PER_BATCH: usize = 1023;

/// Opaque handle to a mesh owned by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MeshHandle(pub u32);

/// Opaque handle to a material owned by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MaterialHandle(pub u32);

/// External instanced draw primitive
///
/// Called synchronously from the thread that drives the frame; `transforms`
/// never holds more than [`MAX_INSTANCES_PER_BATCH`] matrices and is only
/// valid for the duration of the call.
pub trait InstancedRenderer {
    /// Draw `transforms.len()` instances of `mesh` with `material`
    fn submit_instanced_batch(
        &mut self,
        mesh: MeshHandle,
        material: MaterialHandle,
        transforms: &[Mat4],
    );
}

/// Renderer that draws nothing and only counts what it was given
#[derive(Debug, Clone, Default)]
pub struct NullRenderer {
    /// Number of draw calls received
    pub draw_calls: usize,
    /// Number of instances received across all calls
    pub instances: usize,
}

impl InstancedRenderer for NullRenderer {
    fn submit_instanced_batch(
        &mut self,
        _mesh: MeshHandle,
        _material: MaterialHandle,
        transforms: &[Mat4],
    ) {
        self.draw_calls += 1;
        self.instances += transforms.len();
    }
}

/// Splits transform buffers into renderer-sized batches
#[derive(Debug, Clone)]
pub struct BatchRenderSubmitter {
    capacity: usize,
    scratch: Vec<Mat4>,
}

impl BatchRenderSubmitter {
    /// Create a submitter with the given batch capacity
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBatchCapacity`] unless
    /// `1 <= capacity <= MAX_INSTANCES_PER_BATCH`.
    pub fn new(capacity: usize) -> Result<Self, ConfigError> {
        if capacity == 0 || capacity > MAX_INSTANCES_PER_BATCH {
            return Err(ConfigError::InvalidBatchCapacity(capacity));
        }
        Ok(BatchRenderSubmitter {
            capacity,
            scratch: Vec::with_capacity(capacity),
        })
    }

    /// Maximum transforms per batch
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of batches needed for `count` transforms
    pub fn batch_count(&self, count: usize) -> usize {
        count.div_ceil(self.capacity)
    }

    /// Index ranges of the batches for `count` transforms, in order
    pub fn batch_ranges(&self, count: usize) -> impl Iterator<Item = Range<usize>> {
        let capacity = self.capacity;
        (0..count)
            .step_by(capacity)
            .map(move |start| start..(start + capacity).min(count))
    }

    /// Submit every transform, one draw call per batch
    ///
    /// Each batch is expanded into a reused scratch buffer before the call.
    /// Returns the number of draw calls issued.
    pub fn submit<R: InstancedRenderer + ?Sized>(
        &mut self,
        transforms: &[InstanceTransform],
        mesh: MeshHandle,
        material: MaterialHandle,
        renderer: &mut R,
    ) -> usize {
        let mut batches = 0;
        for chunk in transforms.chunks(self.capacity) {
            self.scratch.clear();
            self.scratch.extend(chunk.iter().map(InstanceTransform::to_matrix));
            debug_assert!(self.scratch.len() <= MAX_INSTANCES_PER_BATCH);

            renderer.submit_instanced_batch(mesh, material, &self.scratch);
            batches += 1;
        }
        batches
    }
}

impl Default for BatchRenderSubmitter {
    fn default() -> Self {
        BatchRenderSubmitter {
            capacity: MAX_INSTANCES_PER_BATCH,
            scratch: Vec::with_capacity(MAX_INSTANCES_PER_BATCH),
        }
    }
}
