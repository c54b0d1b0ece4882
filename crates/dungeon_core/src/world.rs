//! World: physics engine, scene roots and registered entities
//!
//! One [`World::step`] is one fixed tick: physics advances once, contact
//! events are routed to the handlers of both entities involved, and every
//! registered entity pulls its body pose into its render node.
//!
//! Any failure inside a step poisons the world. A poisoned world refuses to
//! step again and has to be rebuilt.

use std::collections::HashSet;

use dungeon_math::Vec3;
use dungeon_physics::{BodyKey, PhysicsConfig, PhysicsWorld};
use slotmap::{new_key_type, SecondaryMap, SlotMap};

use crate::entity::{CollisionEvent, Entity, EntityUpdate};
use crate::error::WorldError;
use crate::node::{SceneRoot, SceneRoots};

new_key_type! {
    /// Key to an entity registered with a [`World`]
    pub struct EntityKey;
}

pub struct World {
    physics: PhysicsWorld,
    roots: SceneRoots,
    entities: SlotMap<EntityKey, Entity>,
    /// Reverse lookup for routing contacts
    body_owner: SecondaryMap<BodyKey, EntityKey>,
    /// Keys that were disposed, to tell a double dispose from a bad key
    ///
    /// Never pruned: grows by one key per dispose for the life of the world.
    retired: HashSet<EntityKey>,
    poisoned: bool,
}

impl Default for World {
    fn default() -> Self {
        Self::with_config(PhysicsConfig::default())
    }
}

impl World {
    /// Empty world with constant gravity
    pub fn new(gravity: Vec3) -> Self {
        Self::with_config(PhysicsConfig::new(gravity))
    }

    pub fn with_config(config: PhysicsConfig) -> Self {
        Self {
            physics: PhysicsWorld::with_config(config),
            roots: SceneRoots::default(),
            entities: SlotMap::with_key(),
            body_owner: SecondaryMap::new(),
            retired: HashSet::new(),
            poisoned: false,
        }
    }

    pub fn gravity(&self) -> Vec3 {
        self.physics.config.gravity
    }

    pub fn physics(&self) -> &PhysicsWorld {
        &self.physics
    }

    /// Direct access to the physics engine
    ///
    /// Removing a body that belongs to an entity here orphans it; the next
    /// step will fail and poison the world.
    pub fn physics_mut(&mut self) -> &mut PhysicsWorld {
        &mut self.physics
    }

    pub fn scene(&self) -> &SceneRoot {
        &self.roots.scene
    }

    pub fn projected_scene(&self) -> &SceneRoot {
        &self.roots.projected
    }

    #[inline]
    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    #[inline]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn entity(&self, key: EntityKey) -> Option<&Entity> {
        self.entities.get(key)
    }

    /// Mutable access for node content (material, markup)
    pub fn entity_mut(&mut self, key: EntityKey) -> Option<&mut Entity> {
        self.entities.get_mut(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityKey, &Entity)> {
        self.entities.iter()
    }

    pub fn get_by_name(&self, name: &str) -> Option<(EntityKey, &Entity)> {
        self.entities.iter().find(|(_, e)| e.name.as_deref() == Some(name))
    }

    /// Entity owning the given body
    pub fn owner_of(&self, body: BodyKey) -> Option<EntityKey> {
        self.body_owner.get(body).copied()
    }

    /// Register an entity: its body joins the physics engine and its node
    /// is attached to the matching scene root
    pub fn spawn(&mut self, entity: Entity) -> Result<EntityKey, WorldError> {
        if self.poisoned {
            return Err(WorldError::Poisoned);
        }
        let physics = &mut self.physics;
        let roots = &mut self.roots;
        let key = self
            .entities
            .try_insert_with_key(|key| entity.register(key, physics, roots))?;

        if let Some(body) = self.entities[key].body_key() {
            self.body_owner.insert(body, key);
        }
        log::debug!("Spawned entity {:?} ({:?})", key, self.entities[key].name);
        Ok(key)
    }

    /// Unregister an entity and hand it back detached
    ///
    /// Disposing the same key twice is an error.
    pub fn dispose(&mut self, key: EntityKey) -> Result<Entity, WorldError> {
        let Some(entity) = self.entities.remove(key) else {
            return Err(if self.retired.contains(&key) {
                WorldError::DoubleDispose(key)
            } else {
                WorldError::UnknownEntity(key)
            });
        };
        self.retired.insert(key);
        if let Some(body) = entity.body_key() {
            self.body_owner.remove(body);
        }
        log::debug!("Disposed entity {:?} ({:?})", key, entity.name);
        entity.unregister(&mut self.physics, &mut self.roots)
    }

    /// Reposition an entity's body. See [`Entity::update`].
    pub fn update_entity(&mut self, key: EntityKey, update: EntityUpdate) -> Result<bool, WorldError> {
        if self.poisoned {
            return Err(WorldError::Poisoned);
        }
        match self.entities.get_mut(key) {
            Some(entity) => entity.update(&mut self.physics, update),
            None => Err(WorldError::UnknownEntity(key)),
        }
    }

    /// Advance one fixed tick
    pub fn step(&mut self, dt: f32) -> Result<(), WorldError> {
        if self.poisoned {
            return Err(WorldError::Poisoned);
        }
        self.step_inner(dt).inspect_err(|err| {
            log::error!("World poisoned: {}", err);
            self.poisoned = true;
        })
    }

    fn step_inner(&mut self, dt: f32) -> Result<(), WorldError> {
        self.check_bodies()?;
        self.physics.step(dt)?;
        self.dispatch_contacts()?;

        for entity in self.entities.values_mut() {
            entity.sync_frame(&self.physics)?;
        }
        Ok(())
    }

    /// Every registered entity must still have its body
    fn check_bodies(&self) -> Result<(), WorldError> {
        for (key, entity) in &self.entities {
            if let Some(body) = entity.body_key() {
                if !self.physics.contains(body) {
                    return Err(WorldError::BodyMissing { entity: key, body });
                }
            }
        }
        Ok(())
    }

    /// Route the last step's contacts to both entities' handlers
    fn dispatch_contacts(&self) -> Result<(), WorldError> {
        for contact in self.physics.contacts() {
            let (Some(a), Some(b)) = (self.owner_of(contact.body_a), self.owner_of(contact.body_b)) else {
                continue;
            };
            let events = [
                CollisionEvent {
                    entity: a,
                    other: b,
                    point: contact.point,
                    normal: contact.normal,
                    impact_velocity: contact.impact_velocity,
                },
                CollisionEvent {
                    entity: b,
                    other: a,
                    point: contact.point,
                    normal: -contact.normal,
                    impact_velocity: contact.impact_velocity,
                },
            ];
            for event in &events {
                let Some(handler) = self.entities.get(event.entity).and_then(|e| e.collision_handler()) else {
                    continue;
                };
                handler
                    .on_collide(event)
                    .map_err(|source| WorldError::Handler { entity: event.entity, source })?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::ShapeDescriptor;
    use crate::node::SceneNode;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn test_spawn_attaches_to_matching_root() {
        let mut world = World::default();
        let cube = world.spawn(Entity::mesh(ShapeDescriptor::cube(), 1.0, Vec3::ZERO)).unwrap();
        let label = world.spawn(Entity::projected("A", 1.0, Vec3::new(5.0, 0.0, 0.0))).unwrap();

        assert!(world.scene().contains(cube));
        assert!(world.projected_scene().contains(label));
        assert!(!world.scene().contains(label));
        assert_eq!(world.physics().body_count(), 2);
        assert!(world.entity(cube).unwrap().is_registered());
    }

    #[test]
    fn test_dispose_removes_body_and_node() {
        let mut world = World::default();
        let key = world.spawn(Entity::mesh(ShapeDescriptor::cube(), 1.0, Vec3::ZERO)).unwrap();

        let entity = world.dispose(key).unwrap();
        assert!(!entity.is_registered());
        assert!(!world.scene().contains(key));
        assert_eq!(world.physics().body_count(), 0);
        assert_eq!(world.entity_count(), 0);
    }

    #[test]
    fn test_double_dispose_is_error() {
        let mut world = World::default();
        let key = world.spawn(Entity::mesh(ShapeDescriptor::cube(), 1.0, Vec3::ZERO)).unwrap();
        world.dispose(key).unwrap();

        assert!(matches!(world.dispose(key), Err(WorldError::DoubleDispose(k)) if k == key));
    }

    #[test]
    fn test_dispose_foreign_key_is_unknown() {
        let mut other = World::default();
        let foreign = other.spawn(Entity::mesh(ShapeDescriptor::cube(), 1.0, Vec3::ZERO)).unwrap();
        let mut world = World::default();
        // Same slot, but never disposed here
        assert!(matches!(world.dispose(foreign), Err(WorldError::UnknownEntity(_))));
    }

    #[test]
    fn test_step_syncs_render_from_body() {
        let mut world = World::new(Vec3::new(0.0, 0.0, -9.8));
        let key = world.spawn(Entity::mesh(ShapeDescriptor::cube(), 1.0, Vec3::new(0.0, 0.0, 50.0))).unwrap();

        world.step(DT).unwrap();

        let entity = world.entity(key).unwrap();
        let body = entity.body(world.physics()).unwrap();
        assert!(body.position.z < 50.0);
        assert_eq!(entity.transform().position, body.position);
        assert_eq!(entity.node().transform().rotation, body.orientation);
    }

    #[test]
    fn test_update_entity_unknown_key() {
        let mut world = World::default();
        let key = world.spawn(Entity::mesh(ShapeDescriptor::cube(), 1.0, Vec3::ZERO)).unwrap();
        world.dispose(key).unwrap();
        assert!(matches!(
            world.update_entity(key, EntityUpdate::position(Vec3::ONE)),
            Err(WorldError::UnknownEntity(_))
        ));
    }

    #[test]
    fn test_invalid_timestep_poisons() {
        let mut world = World::default();
        assert!(matches!(world.step(0.0), Err(WorldError::Physics(_))));
        assert!(world.is_poisoned());
        assert!(matches!(world.step(DT), Err(WorldError::Poisoned)));
    }

    #[test]
    fn test_get_by_name() {
        let mut world = World::default();
        world
            .spawn(Entity::mesh(ShapeDescriptor::plane(), 0.0, Vec3::ZERO).with_name("ground"))
            .unwrap();
        let (_, ground) = world.get_by_name("ground").unwrap();
        assert!(ground.body(world.physics()).unwrap().is_static());
        assert!(world.get_by_name("missing").is_none());
    }
}
