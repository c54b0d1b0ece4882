//! Entity: one render node coupled to one rigid body
//!
//! The body is authoritative. Positions flow physics -> render only: callers
//! move an entity through [`Entity::update`] (which writes the body) and the
//! render transform follows on the next [`Entity::sync_frame`].

use std::collections::HashSet;
use std::sync::{Arc, Weak};

use dungeon_math::{Quat, Vec3};
use dungeon_physics::{BodyKey, CollisionFilter, PhysicsWorld, RigidBody};

use crate::error::WorldError;
use crate::node::{Material, MeshNode, ProjectedNode, RenderNode, SceneNode, SceneRoots};
use crate::shapes::{ShapeDescriptor, PROJECTED_HALF_EXTENT};
use crate::world::EntityKey;
use crate::Transform;

/// Contact data delivered to a collision handler
///
/// `normal` points from `entity` toward `other`. `impact_velocity` is the
/// closing speed along the normal before the contact was resolved.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CollisionEvent {
    pub entity: EntityKey,
    pub other: EntityKey,
    pub point: Vec3,
    pub normal: Vec3,
    pub impact_velocity: f32,
}

/// Receives contact events for one or more entities
///
/// Called synchronously from [`World::step`](crate::World::step). An error
/// aborts the step and poisons the world.
pub trait CollisionHandler: Send + Sync {
    fn on_collide(&self, event: &CollisionEvent) -> anyhow::Result<()>;
}

/// Authoritative pose change for [`Entity::update`]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EntityUpdate {
    pub position: Option<Vec3>,
    pub rotation: Option<Quat>,
}

impl EntityUpdate {
    pub fn position(position: Vec3) -> Self {
        Self {
            position: Some(position),
            rotation: None,
        }
    }

    pub fn rotation(rotation: Quat) -> Self {
        Self {
            position: None,
            rotation: Some(rotation),
        }
    }
}

/// Where the entity's body currently lives
#[derive(Debug)]
enum BodySlot {
    /// Owned by the entity; not simulated
    Detached(RigidBody),
    /// Owned by a world's physics engine
    Registered(BodyKey),
}

/// An object in the scene: a render node plus the rigid body driving it
pub struct Entity {
    /// Optional name for lookup
    pub name: Option<String>,
    /// Tags for categorization (e.g. "letter", "cube")
    pub tags: HashSet<String>,
    shape: ShapeDescriptor,
    node: RenderNode,
    body: BodySlot,
    key: Option<EntityKey>,
    handler: Option<Weak<dyn CollisionHandler>>,
}

impl std::fmt::Debug for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entity")
            .field("name", &self.name)
            .field("shape", &self.shape)
            .field("node", &self.node)
            .field("body", &self.body)
            .field("key", &self.key)
            .field("has_handler", &self.handler.is_some())
            .finish()
    }
}

impl Entity {
    fn from_parts(shape: ShapeDescriptor, node: RenderNode, body: RigidBody) -> Self {
        let mut entity = Self {
            name: None,
            tags: HashSet::new(),
            shape,
            node,
            body: BodySlot::Detached(body),
            key: None,
            handler: None,
        };
        entity.sync_detached();
        entity
    }

    /// Mesh entity whose geometry and collider both come from `shape`
    ///
    /// Unknown shapes become the default cube. A mass of zero makes the body
    /// static.
    pub fn mesh(shape: ShapeDescriptor, mass: f32, position: Vec3) -> Self {
        let shape = shape.resolve();
        let body = RigidBody::new(shape.collider(position, Quat::IDENTITY), mass, position);
        let node = RenderNode::Mesh(MeshNode::from_shape(&shape, None));
        Self::from_parts(shape, node, body)
    }

    /// Projected (markup) entity with a nominal collision box
    pub fn projected(markup: impl Into<String>, mass: f32, position: Vec3) -> Self {
        let shape = ShapeDescriptor::Cube {
            size: PROJECTED_HALF_EXTENT * 2.0,
        };
        let body = RigidBody::new(ShapeDescriptor::projected_collider(position), mass, position)
            .with_filter(CollisionFilter::projected());
        let node = RenderNode::Projected(ProjectedNode::new(markup));
        Self::from_parts(shape, node, body)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Set the surface material (mesh entities only)
    pub fn with_material(mut self, material: Material) -> Self {
        match &mut self.node {
            RenderNode::Mesh(mesh) => mesh.set_material(material),
            RenderNode::Projected(_) => {
                log::warn!("Ignoring material on projected entity {:?}", self.name);
            }
        }
        self
    }

    /// Replace the markup of a projected entity
    ///
    /// Returns false, leaving the node alone, for mesh entities.
    pub fn set_markup(&mut self, markup: impl Into<String>) -> bool {
        match &mut self.node {
            RenderNode::Projected(node) => {
                node.set_markup(markup);
                true
            }
            RenderNode::Mesh(_) => {
                log::warn!("Ignoring markup on mesh entity {:?}", self.name);
                false
            }
        }
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        if let BodySlot::Detached(body) = &mut self.body {
            body.set_orientation(rotation);
        }
        self.sync_detached();
        self
    }

    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        if let BodySlot::Detached(body) = &mut self.body {
            body.velocity = velocity;
        }
        self
    }

    /// Bind a collision handler; only a weak reference is kept
    pub fn with_collision_handler(mut self, handler: &Arc<dyn CollisionHandler>) -> Self {
        self.handler = Some(Arc::downgrade(handler));
        self
    }

    pub fn shape(&self) -> &ShapeDescriptor {
        &self.shape
    }

    pub fn node(&self) -> &RenderNode {
        &self.node
    }

    pub fn node_mut(&mut self) -> &mut RenderNode {
        &mut self.node
    }

    /// Render-side transform as of the last sync
    pub fn transform(&self) -> &Transform {
        self.node.transform()
    }

    /// Key in the owning world, if registered
    pub fn key(&self) -> Option<EntityKey> {
        self.key
    }

    pub fn body_key(&self) -> Option<BodyKey> {
        match self.body {
            BodySlot::Registered(key) => Some(key),
            BodySlot::Detached(_) => None,
        }
    }

    pub fn is_registered(&self) -> bool {
        matches!(self.body, BodySlot::Registered(_))
    }

    /// Live handler, if one was bound and it is still alive
    pub fn collision_handler(&self) -> Option<Arc<dyn CollisionHandler>> {
        self.handler.as_ref().and_then(Weak::upgrade)
    }

    fn missing(&self, body: BodyKey) -> WorldError {
        WorldError::BodyMissing {
            entity: self.key.unwrap_or_default(),
            body,
        }
    }

    /// The authoritative body. `physics` is only consulted once registered.
    pub fn body<'a>(&'a self, physics: &'a PhysicsWorld) -> Result<&'a RigidBody, WorldError> {
        match &self.body {
            BodySlot::Detached(body) => Ok(body),
            BodySlot::Registered(key) => physics.get_body(*key).ok_or_else(|| self.missing(*key)),
        }
    }

    fn body_mut<'a>(&'a mut self, physics: &'a mut PhysicsWorld) -> Result<&'a mut RigidBody, WorldError> {
        match &mut self.body {
            BodySlot::Detached(body) => Ok(body),
            BodySlot::Registered(key) => {
                let key = *key;
                match physics.get_body_mut(key) {
                    Some(body) => Ok(body),
                    None => Err(WorldError::BodyMissing {
                        entity: self.key.unwrap_or_default(),
                        body: key,
                    }),
                }
            }
        }
    }

    /// Reposition the body (teleport). Velocity is kept.
    ///
    /// Returns whether the body changed; a repeated identical update is a
    /// no-op. The render transform is not touched until the next sync.
    pub fn update(&mut self, physics: &mut PhysicsWorld, update: EntityUpdate) -> Result<bool, WorldError> {
        let body = self.body_mut(physics)?;
        let mut changed = false;

        if let Some(position) = update.position {
            if body.position != position {
                body.set_position(position);
                changed = true;
            }
        }
        if let Some(rotation) = update.rotation {
            if body.orientation != rotation.normalize() {
                body.set_orientation(rotation);
                changed = true;
            }
        }

        Ok(changed)
    }

    /// Copy the body pose into the render transform
    ///
    /// Returns whether the render transform changed.
    pub fn sync_frame(&mut self, physics: &PhysicsWorld) -> Result<bool, WorldError> {
        let pose = {
            let body = self.body(physics)?;
            Transform::from_position_rotation(body.position, body.orientation)
        };
        Ok(self.node.set_transform(&pose))
    }

    fn sync_detached(&mut self) {
        if let BodySlot::Detached(body) = &self.body {
            let pose = Transform::from_position_rotation(body.position, body.orientation);
            self.node.set_transform(&pose);
        }
    }

    /// Hand the body to `physics` and attach the node under `key`
    pub(crate) fn register(
        mut self,
        key: EntityKey,
        physics: &mut PhysicsWorld,
        roots: &mut SceneRoots,
    ) -> Result<Self, WorldError> {
        let body = match self.body {
            BodySlot::Detached(body) => body,
            BodySlot::Registered(existing) => return Err(WorldError::AlreadyRegistered(existing)),
        };
        self.node.attach(roots, key);
        self.body = BodySlot::Registered(physics.add_body(body));
        self.key = Some(key);
        Ok(self)
    }

    /// Take the body back from `physics` and detach the node
    ///
    /// The node is detached even when the body turns out to be missing.
    pub(crate) fn unregister(mut self, physics: &mut PhysicsWorld, roots: &mut SceneRoots) -> Result<Self, WorldError> {
        if let Some(key) = self.key {
            self.node.detach(roots, key);
        }
        let body_key = match self.body {
            BodySlot::Registered(body_key) => body_key,
            BodySlot::Detached(_) => return Ok(self),
        };
        match physics.remove_body(body_key) {
            Some(body) => {
                self.body = BodySlot::Detached(body);
                self.key = None;
                Ok(self)
            }
            None => Err(self.missing(body_key)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::DirtyFlags;
    use crate::shapes::Geometry;

    #[test]
    fn test_mesh_entity_starts_synced() {
        let physics = PhysicsWorld::new();
        let entity = Entity::mesh(ShapeDescriptor::cube(), 1.0, Vec3::new(1.0, 2.0, 3.0));
        assert!(!entity.is_registered());
        assert_eq!(entity.transform().position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(entity.body(&physics).unwrap().position, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_unknown_shape_builds_cube() {
        let entity = Entity::mesh(ShapeDescriptor::Unknown, 1.0, Vec3::ZERO);
        assert_eq!(*entity.shape(), ShapeDescriptor::cube());
        let mesh = entity.node().as_mesh().unwrap();
        assert_eq!(mesh.geometry, Geometry::Box { width: 2.0, height: 2.0, depth: 2.0 });
    }

    #[test]
    fn test_set_markup_marks_content_dirty() {
        let mut label = Entity::projected("<h1>D</h1>", 0.0, Vec3::ZERO);
        label.node_mut().take_dirty();

        assert!(label.set_markup("<h1>E</h1>"));
        assert_eq!(label.node().as_projected().unwrap().markup, "<h1>E</h1>");
        assert!(label.node().dirty_flags().contains(DirtyFlags::CONTENT));

        let mut cube = Entity::mesh(ShapeDescriptor::cube(), 1.0, Vec3::ZERO);
        assert!(!cube.set_markup("<h1>E</h1>"));
    }

    #[test]
    fn test_projected_entity_body() {
        let physics = PhysicsWorld::new();
        let entity = Entity::projected("<h1>D</h1>", 1.0, Vec3::new(0.0, 0.0, 10.0));
        let body = entity.body(&physics).unwrap();
        assert_eq!(body.filter, CollisionFilter::projected());
        assert!(body.is_dynamic());
        assert_eq!(entity.transform().scale, crate::node::PROJECTED_VISUAL_SCALE);
    }

    #[test]
    fn test_update_writes_body_not_node() {
        let mut physics = PhysicsWorld::new();
        let mut entity = Entity::mesh(ShapeDescriptor::cube(), 1.0, Vec3::ZERO);
        entity.node_mut().take_dirty();

        let target = Vec3::new(5.0, 0.0, 0.0);
        assert!(entity.update(&mut physics, EntityUpdate::position(target)).unwrap());
        assert_eq!(entity.body(&physics).unwrap().position, target);
        assert_eq!(entity.transform().position, Vec3::ZERO);
        assert_eq!(entity.node().dirty_flags(), DirtyFlags::NONE);

        assert!(entity.sync_frame(&physics).unwrap());
        assert_eq!(entity.transform().position, target);
    }

    #[test]
    fn test_repeated_update_is_noop() {
        let mut physics = PhysicsWorld::new();
        let mut entity = Entity::mesh(ShapeDescriptor::cube(), 1.0, Vec3::ZERO);
        let upd = EntityUpdate {
            position: Some(Vec3::new(1.0, 1.0, 1.0)),
            rotation: Some(Quat::from_axis_angle(Vec3::Z, 0.5)),
        };
        assert!(entity.update(&mut physics, upd).unwrap());
        assert!(!entity.update(&mut physics, upd).unwrap());
    }

    #[test]
    fn test_sync_is_idempotent() {
        let physics = PhysicsWorld::new();
        let mut entity = Entity::mesh(ShapeDescriptor::cube(), 1.0, Vec3::ONE);
        assert!(!entity.sync_frame(&physics).unwrap());
        assert!(!entity.sync_frame(&physics).unwrap());
    }

    #[test]
    fn test_material_ignored_on_projected() {
        let entity = Entity::projected("x", 1.0, Vec3::ZERO).with_material(Material::default());
        assert!(entity.node().as_projected().is_some());
    }

    struct Noop;

    impl CollisionHandler for Noop {
        fn on_collide(&self, _event: &CollisionEvent) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_handler_is_weak() {
        let handler: Arc<dyn CollisionHandler> = Arc::new(Noop);
        let entity = Entity::mesh(ShapeDescriptor::cube(), 1.0, Vec3::ZERO).with_collision_handler(&handler);
        assert!(entity.collision_handler().is_some());
        drop(handler);
        assert!(entity.collision_handler().is_none());
    }
}
