//! Core types for Dungeon3D
//!
//! This crate couples render nodes to rigid bodies and drives them every frame:
//!
//! - [`Transform`] - Render-side position, rotation and scale
//! - [`ShapeDescriptor`] - Tagged shape selecting geometry and collider together
//! - [`RenderNode`] - Mesh or projected markup node, behind the [`SceneNode`] capability
//! - [`Entity`] - One render node plus one rigid body with a shared lifecycle
//! - [`World`] - Physics engine, scene roots and registered entities
//! - [`SceneTemplate`] - Loadable/saveable list of entity templates

mod transform;
mod shapes;
mod node;
mod entity;
mod world;
mod error;
mod scene;

pub use transform::Transform;
pub use shapes::{Geometry, ShapeDescriptor, PROJECTED_HALF_EXTENT};
pub use node::{DirtyFlags, Material, MeshNode, ProjectedNode, RenderNode, SceneLayer, SceneNode, SceneRoot, SceneRoots};
pub use entity::{CollisionEvent, CollisionHandler, Entity, EntityUpdate};
pub use world::{EntityKey, World};
pub use error::WorldError;
pub use scene::{EntityTemplate, RenderTemplate, SceneLoadError, SceneSaveError, SceneTemplate};

// Re-export commonly used types from the math and physics crates
pub use dungeon_math::{Quat, Vec3};
pub use dungeon_physics::{BodyKey, PhysicsConfig, PhysicsWorld, RigidBody};
