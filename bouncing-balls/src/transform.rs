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
//! Per-instance render transforms
//!
//! Particles are never rotated, so a transform is just a translation and a
//! uniform scale. The full 4×4 matrix is only built at the draw-call boundary.

use glam::{Mat4, Quat, Vec3};

/// Translation plus uniform scale, identity rotation
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InstanceTransform {
    /// World-space position of the instance
    pub translation: Vec3,
    /// Uniform scale applied to the mesh
    pub scale: f32,
}

impl InstanceTransform {
    /// Create a transform
    pub fn new(translation: Vec3, scale: f32) -> Self {
        InstanceTransform { translation, scale }
    }

    /// Expand to a column-major TRS matrix
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(Vec3::splat(self.scale), Quat::IDENTITY, self.translation)
    }
}

impl From<InstanceTransform> for Mat4 {
    fn from(t: InstanceTransform) -> Self {
        t.to_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    #[test]
    fn test_matrix_layout() {
        let m = InstanceTransform::new(Vec3::new(1.0, 2.0, 3.0), 0.1).to_matrix();
        assert_eq!(m.x_axis, Vec4::new(0.1, 0.0, 0.0, 0.0));
        assert_eq!(m.y_axis, Vec4::new(0.0, 0.1, 0.0, 0.0));
        assert_eq!(m.z_axis, Vec4::new(0.0, 0.0, 0.1, 0.0));
        assert_eq!(m.w_axis, Vec4::new(1.0, 2.0, 3.0, 1.0));
    }

    #[test]
    fn test_transforms_unit_point() {
        let m: Mat4 = InstanceTransform::new(Vec3::new(-4.0, 0.5, 0.0), 2.0).into();
        let p = m.transform_point3(Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(p, Vec3::new(-2.0, 2.5, 0.0));
    }
}
