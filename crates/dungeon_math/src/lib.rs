//! 3D Mathematics Library
//!
//! This crate provides the vector and rotation types shared by the physics
//! engine and the scene graph of Dungeon3D.
//!
//! ## Core Types
//!
//! - [`Vec3`] - 3D vector with x, y, z components (Z is up)
//! - [`Quat`] - Unit quaternion for orientations

mod vec3;
mod quat;

pub use vec3::Vec3;
pub use quat::Quat;
