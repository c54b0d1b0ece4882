//! SceneBuilder - turns scene templates into live entities
//!
//! Templates name their collision sound by string; the builder owns the
//! handlers behind those names and the fetched material palette.

use std::collections::HashMap;
use std::sync::Arc;

use dungeon_core::{
    CollisionHandler, Entity, EntityKey, EntityTemplate, Material, RenderTemplate, SceneTemplate, World, WorldError,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SceneBuildError {
    #[error("entity {entity:?} names unknown collision handler {handler:?}")]
    UnknownHandler {
        entity: Option<String>,
        handler: String,
    },
    #[error(transparent)]
    World(#[from] WorldError),
}

/// Builder for spawning scene templates into a world
///
/// # Example
/// ```ignore
/// let keys = SceneBuilder::new()
///     .with_handler("cube_impact", Arc::new(ImpactSound::cube(bank.clone())))
///     .with_materials(materials)
///     .spawn_scene(&scene, &mut world)?;
/// ```
#[derive(Default)]
pub struct SceneBuilder {
    handlers: HashMap<String, Arc<dyn CollisionHandler>>,
    materials: Vec<Material>,
}

impl SceneBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a collision handler under `name`
    ///
    /// The builder keeps the handler alive; entities only hold weak references.
    pub fn with_handler(mut self, name: impl Into<String>, handler: Arc<dyn CollisionHandler>) -> Self {
        self.handlers.insert(name.into(), handler);
        self
    }

    /// Palette for mesh entities that do not pick a material themselves
    ///
    /// The n-th such entity gets `materials[n % len]`, so the first one (the
    /// ground in the arena) always gets the first material.
    pub fn with_materials(mut self, materials: Vec<Material>) -> Self {
        self.materials = materials;
        self
    }

    pub fn handler(&self, name: &str) -> Option<&Arc<dyn CollisionHandler>> {
        self.handlers.get(name)
    }

    /// Build one detached entity; `palette_index` picks its fallback material
    pub fn entity(&self, template: &EntityTemplate, palette_index: usize) -> Result<Entity, SceneBuildError> {
        let mut entity = template.to_entity();

        if matches!(template.render, RenderTemplate::Mesh { material: None }) && !self.materials.is_empty() {
            entity = entity.with_material(self.materials[palette_index % self.materials.len()].clone());
        }

        if let Some(ref name) = template.on_collide {
            let handler = self.handlers.get(name).ok_or_else(|| SceneBuildError::UnknownHandler {
                entity: template.name.clone(),
                handler: name.clone(),
            })?;
            entity = entity.with_collision_handler(handler);
        }

        Ok(entity)
    }

    /// Spawn every entity of `scene` into `world`
    ///
    /// All templates are resolved before anything is spawned, so an unknown
    /// handler leaves the world untouched.
    pub fn spawn_scene(&self, scene: &SceneTemplate, world: &mut World) -> Result<Vec<EntityKey>, SceneBuildError> {
        let mut palette_index = 0;
        let mut entities = Vec::with_capacity(scene.entities.len());
        for template in &scene.entities {
            entities.push(self.entity(template, palette_index)?);
            if matches!(template.render, RenderTemplate::Mesh { material: None }) {
                palette_index += 1;
            }
        }

        let mut keys = Vec::with_capacity(entities.len());
        for entity in entities {
            keys.push(world.spawn(entity)?);
        }

        log::info!("Spawned scene {:?} with {} entities", scene.name, keys.len());
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dungeon_core::{CollisionEvent, ShapeDescriptor, Vec3};

    struct Silent;

    impl CollisionHandler for Silent {
        fn on_collide(&self, _event: &CollisionEvent) -> anyhow::Result<()> {
            Ok(())
        }
    }

    fn palette() -> Vec<Material> {
        vec![
            Material::new("MeshLambertMaterial", [0.5, 0.5, 0.5, 1.0]),
            Material::new("MeshPhongMaterial", [1.0, 0.0, 0.0, 1.0]),
        ]
    }

    fn scene() -> SceneTemplate {
        let mut scene = SceneTemplate::new("test");
        scene.add_entity(
            EntityTemplate::mesh(ShapeDescriptor::plane(), 0.0, Vec3::ZERO)
                .with_name("ground")
                .with_tag("static"),
        );
        scene.add_entity(
            EntityTemplate::projected("<h1>H</h1>", 1.0, Vec3::new(-20.0, 0.0, 0.0))
                .with_name("letter_0")
                .with_handler("letter_impact"),
        );
        for i in 0..3 {
            scene.add_entity(
                EntityTemplate::mesh(ShapeDescriptor::cube(), 1.0, Vec3::new(0.0, 10.0, 5.0 + 2.5 * i as f32))
                    .with_name(format!("cube_{}", i))
                    .with_tag("cube")
                    .with_handler("cube_impact"),
            );
        }
        scene
    }

    fn builder() -> SceneBuilder {
        SceneBuilder::new()
            .with_handler("cube_impact", Arc::new(Silent))
            .with_handler("letter_impact", Arc::new(Silent))
            .with_materials(palette())
    }

    #[test]
    fn test_spawn_scene() {
        let mut world = World::default();
        let keys = builder().spawn_scene(&scene(), &mut world).unwrap();

        assert_eq!(keys.len(), 5);
        assert_eq!(world.entity_count(), 5);
        assert_eq!(world.scene().len(), 4);
        assert_eq!(world.projected_scene().len(), 1);

        let (_, ground) = world.get_by_name("ground").unwrap();
        assert!(ground.has_tag("static"));
    }

    #[test]
    fn test_palette_assignment() {
        let mut world = World::default();
        builder().spawn_scene(&scene(), &mut world).unwrap();

        let material = |name: &str| {
            let (_, entity) = world.get_by_name(name).unwrap();
            entity.node().as_mesh().unwrap().material.clone().unwrap()
        };
        assert_eq!(material("ground"), palette()[0]);
        assert_eq!(material("cube_0"), palette()[1]);
        assert_eq!(material("cube_1"), palette()[0]);
    }

    #[test]
    fn test_handlers_bound() {
        let mut world = World::default();
        let builder = builder();
        builder.spawn_scene(&scene(), &mut world).unwrap();

        let (_, cube) = world.get_by_name("cube_2").unwrap();
        assert!(cube.collision_handler().is_some());
        let (_, ground) = world.get_by_name("ground").unwrap();
        assert!(ground.collision_handler().is_none());
    }

    struct Failing;

    impl CollisionHandler for Failing {
        fn on_collide(&self, _event: &CollisionEvent) -> anyhow::Result<()> {
            anyhow::bail!("impact rejected")
        }
    }

    fn failing_builder() -> SceneBuilder {
        SceneBuilder::new()
            .with_handler("cube_impact", Arc::new(Failing))
            .with_handler("letter_impact", Arc::new(Failing))
    }

    fn settle(world: &mut World) -> Result<(), WorldError> {
        for _ in 0..120 {
            world.step(1.0 / 60.0)?;
        }
        Ok(())
    }

    #[test]
    fn test_live_builder_routes_contacts() {
        let mut world = World::default();
        let builder = failing_builder();
        builder.spawn_scene(&scene(), &mut world).unwrap();

        assert!(matches!(settle(&mut world), Err(WorldError::Handler { .. })));
        assert!(world.is_poisoned());
    }

    #[test]
    fn test_dropped_builder_skips_contacts() {
        let mut world = World::default();
        failing_builder().spawn_scene(&scene(), &mut world).unwrap();

        let (_, cube) = world.get_by_name("cube_0").unwrap();
        assert!(cube.collision_handler().is_none());
        settle(&mut world).unwrap();
        assert!(!world.is_poisoned());
    }

    #[test]
    fn test_unknown_handler_spawns_nothing() {
        let mut world = World::default();
        let builder = SceneBuilder::new().with_handler("cube_impact", Arc::new(Silent));

        let result = builder.spawn_scene(&scene(), &mut world);
        assert!(matches!(result, Err(SceneBuildError::UnknownHandler { ref handler, .. }) if handler == "letter_impact"));
        assert_eq!(world.entity_count(), 0);
    }

    #[test]
    fn test_empty_palette_leaves_material_unset() {
        let mut world = World::default();
        SceneBuilder::new()
            .with_handler("cube_impact", Arc::new(Silent))
            .with_handler("letter_impact", Arc::new(Silent))
            .spawn_scene(&scene(), &mut world)
            .unwrap();

        let (_, ground) = world.get_by_name("ground").unwrap();
        assert!(ground.node().as_mesh().unwrap().material.is_none());
    }
}
