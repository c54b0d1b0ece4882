//! Unit quaternion for 3D orientations
//!
//! Stored as (x, y, z, w) with w the scalar part, matching the layout most
//! scene graphs expect when the orientation is copied into a render node.

use bytemuck::{Pod, Zeroable};
use serde::{Serialize, Deserialize};
use crate::Vec3;

/// Quaternion representing a rotation in 3D
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Quat {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Default for Quat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Quat {
    /// Identity rotation
    pub const IDENTITY: Self = Self { x: 0.0, y: 0.0, z: 0.0, w: 1.0 };

    /// Create a quaternion from raw components (not normalized)
    #[inline]
    pub const fn from_xyzw(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Rotation of `angle` radians around `axis`
    pub fn from_axis_angle(axis: Vec3, angle: f32) -> Self {
        let axis = axis.normalized();
        let half = angle * 0.5;
        let s = half.sin();
        Self::from_xyzw(axis.x * s, axis.y * s, axis.z * s, half.cos())
    }

    /// Rotation from Euler angles in radians, applied in X, then Y, then Z order
    pub fn from_euler_xyz(x: f32, y: f32, z: f32) -> Self {
        let (sx, cx) = (x * 0.5).sin_cos();
        let (sy, cy) = (y * 0.5).sin_cos();
        let (sz, cz) = (z * 0.5).sin_cos();

        Self {
            x: sx * cy * cz + cx * sy * sz,
            y: cx * sy * cz - sx * cy * sz,
            z: cx * cy * sz + sx * sy * cz,
            w: cx * cy * cz - sx * sy * sz,
        }
    }

    /// Squared magnitude
    #[inline]
    pub fn magnitude_squared(&self) -> f32 {
        self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w
    }

    /// Normalize to unit magnitude (identity if degenerate)
    pub fn normalize(&self) -> Self {
        let mag = self.magnitude_squared().sqrt();
        if mag > 0.0 {
            let inv = 1.0 / mag;
            Self::from_xyzw(self.x * inv, self.y * inv, self.z * inv, self.w * inv)
        } else {
            Self::IDENTITY
        }
    }

    /// Conjugate; the inverse rotation for unit quaternions
    pub fn conjugate(&self) -> Self {
        Self::from_xyzw(-self.x, -self.y, -self.z, self.w)
    }

    /// Hamilton product: applies `other` first, then `self`
    pub fn compose(&self, other: &Self) -> Self {
        Self {
            w: self.w * other.w - self.x * other.x - self.y * other.y - self.z * other.z,
            x: self.w * other.x + self.x * other.w + self.y * other.z - self.z * other.y,
            y: self.w * other.y - self.x * other.z + self.y * other.w + self.z * other.x,
            z: self.w * other.z + self.x * other.y - self.y * other.x + self.z * other.w,
        }
    }

    /// Rotate a vector
    pub fn rotate(&self, v: Vec3) -> Vec3 {
        // v' = v + 2w(q × v) + 2(q × (q × v))
        let q = Vec3::new(self.x, self.y, self.z);
        let t = q.cross(v) * 2.0;
        v + t * self.w + q.cross(t)
    }

    /// Advance the orientation by an angular velocity (rad/s) over `dt`
    pub fn integrate(&self, angular_velocity: Vec3, dt: f32) -> Self {
        let half_dt = dt * 0.5;
        let omega = Self::from_xyzw(
            angular_velocity.x * half_dt,
            angular_velocity.y * half_dt,
            angular_velocity.z * half_dt,
            0.0,
        );
        let delta = omega.compose(self);
        Self::from_xyzw(
            self.x + delta.x,
            self.y + delta.y,
            self.z + delta.z,
            self.w + delta.w,
        )
        .normalize()
    }

    /// Compare two rotations within `epsilon`, treating q and -q as equal
    pub fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        let dot = self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w;
        (dot.abs() - 1.0).abs() <= epsilon
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    const EPSILON: f32 = 1e-5;

    fn vec_approx_eq(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < EPSILON
    }

    #[test]
    fn test_identity_leaves_vector_unchanged() {
        let v = Vec3::new(1.0, 2.0, 3.0);
        assert!(vec_approx_eq(Quat::IDENTITY.rotate(v), v));
    }

    #[test]
    fn test_axis_angle_rotates_x_into_y() {
        let q = Quat::from_axis_angle(Vec3::Z, FRAC_PI_2);
        assert!(vec_approx_eq(q.rotate(Vec3::X), Vec3::Y));
    }

    #[test]
    fn test_conjugate_inverts() {
        let q = Quat::from_axis_angle(Vec3::new(1.0, 1.0, 0.0), 0.7);
        let v = Vec3::new(0.3, -2.0, 5.0);
        let back = q.conjugate().rotate(q.rotate(v));
        assert!(vec_approx_eq(back, v));
    }

    #[test]
    fn test_compose_applies_right_first() {
        let yaw = Quat::from_axis_angle(Vec3::Z, FRAC_PI_2);
        let roll = Quat::from_axis_angle(Vec3::X, FRAC_PI_2);
        // roll first: Y -> Z, then yaw leaves Z alone
        let combined = yaw.compose(&roll);
        assert!(vec_approx_eq(combined.rotate(Vec3::Y), Vec3::Z));
    }

    #[test]
    fn test_euler_single_axis_matches_axis_angle() {
        let a = Quat::from_euler_xyz(0.0, 0.0, 0.4);
        let b = Quat::from_axis_angle(Vec3::Z, 0.4);
        assert!(a.approx_eq(&b, EPSILON));
    }

    #[test]
    fn test_integrate_zero_velocity_is_noop() {
        let q = Quat::from_axis_angle(Vec3::Y, 1.0);
        assert!(q.integrate(Vec3::ZERO, 0.016).approx_eq(&q, EPSILON));
    }

    #[test]
    fn test_integrate_stays_normalized() {
        let mut q = Quat::IDENTITY;
        for _ in 0..600 {
            q = q.integrate(Vec3::new(0.0, 0.0, 3.0), 1.0 / 60.0);
        }
        assert!((q.magnitude_squared() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_normalize_degenerate_is_identity() {
        let q = Quat::from_xyzw(0.0, 0.0, 0.0, 0.0).normalize();
        assert_eq!(q, Quat::IDENTITY);
    }
}
