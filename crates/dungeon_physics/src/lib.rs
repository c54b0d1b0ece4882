//! Rigid body physics for Dungeon3D
//!
//! This crate provides a small fixed-step rigid body simulation:
//! - Collision shapes (spheres, boxes, planes)
//! - Pairwise collision detection with layer filtering
//! - Impulse-based response with friction and restitution
//! - Per-step contact events carrying the impact velocity along the normal

pub mod body;
pub mod collision;
pub mod material;
pub mod shapes;
pub mod world;

// Re-export commonly used types
pub use body::{BodyKey, BodyType, RigidBody};
pub use collision::{aabb_vs_aabb, aabb_vs_plane, sphere_vs_aabb, sphere_vs_plane, sphere_vs_sphere, CollisionFilter, CollisionLayer, Contact};
pub use material::PhysicsMaterial;
pub use shapes::{Aabb, Collider, Plane, Sphere};
pub use world::{ContactEvent, PhysicsConfig, PhysicsError, PhysicsWorld};
