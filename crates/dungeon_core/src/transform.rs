//! Render-side transform (position, rotation, scale)
//!
//! A render node's transform is never authoritative: it is rewritten from the
//! owning entity's rigid body on every frame sync.

use dungeon_math::{Quat, Vec3};
use serde::{Serialize, Deserialize};

/// Position, rotation and uniform scale of a render node
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    /// Uniform visual scale; not touched by physics sync
    pub scale: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: 1.0,
        }
    }

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::identity()
        }
    }

    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            scale: 1.0,
        }
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    /// Transform a point from local space to world space
    ///
    /// Applies scale, then rotation, then translation.
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        self.rotation.rotate(p * self.scale) + self.position
    }

    /// Column-major model matrix for a renderer
    pub fn model_matrix(&self) -> [[f32; 4]; 4] {
        let x = self.rotation.rotate(Vec3::X) * self.scale;
        let y = self.rotation.rotate(Vec3::Y) * self.scale;
        let z = self.rotation.rotate(Vec3::Z) * self.scale;
        let p = self.position;
        [
            [x.x, x.y, x.z, 0.0],
            [y.x, y.y, y.z, 0.0],
            [z.x, z.y, z.z, 0.0],
            [p.x, p.y, p.z, 1.0],
        ]
    }
}
