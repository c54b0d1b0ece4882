//! Scene serialization
//!
//! A [`SceneTemplate`] is a RON document listing entity templates plus the
//! world's gravity. Collision handlers cannot be serialized, so templates
//! name them (`on_collide`) and the application resolves the names.

use serde::{Serialize, Deserialize};
use std::fs;
use std::io;
use std::path::Path;

use dungeon_math::{Quat, Vec3};
use dungeon_physics::PhysicsConfig;

use crate::entity::Entity;
use crate::node::Material;
use crate::shapes::ShapeDescriptor;

/// How a templated entity is drawn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RenderTemplate {
    /// Mesh built from the entity's shape
    Mesh {
        #[serde(default)]
        material: Option<Material>,
    },
    /// Markup element; the shape is ignored in favour of the nominal box
    Projected { markup: String },
}

impl Default for RenderTemplate {
    fn default() -> Self {
        Self::Mesh { material: None }
    }
}

/// A serializable entity description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityTemplate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub shape: ShapeDescriptor,
    /// Zero makes the body static
    #[serde(default)]
    pub mass: f32,
    pub position: Vec3,
    /// Euler angles in radians, applied in XYZ order
    #[serde(default)]
    pub rotation: Option<[f32; 3]>,
    #[serde(default)]
    pub render: RenderTemplate,
    /// Name of the collision handler to bind
    #[serde(default)]
    pub on_collide: Option<String>,
}

impl EntityTemplate {
    pub fn mesh(shape: ShapeDescriptor, mass: f32, position: Vec3) -> Self {
        Self {
            name: None,
            tags: Vec::new(),
            shape,
            mass,
            position,
            rotation: None,
            render: RenderTemplate::default(),
            on_collide: None,
        }
    }

    pub fn projected(markup: impl Into<String>, mass: f32, position: Vec3) -> Self {
        Self {
            render: RenderTemplate::Projected { markup: markup.into() },
            ..Self::mesh(ShapeDescriptor::cube(), mass, position)
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn with_rotation(mut self, euler: [f32; 3]) -> Self {
        self.rotation = Some(euler);
        self
    }

    pub fn with_handler(mut self, handler: impl Into<String>) -> Self {
        self.on_collide = Some(handler.into());
        self
    }

    /// Build a detached entity (no handler bound)
    pub fn to_entity(&self) -> Entity {
        let mut entity = match &self.render {
            RenderTemplate::Mesh { material } => {
                let entity = Entity::mesh(self.shape, self.mass, self.position);
                match material {
                    Some(material) => entity.with_material(material.clone()),
                    None => entity,
                }
            }
            RenderTemplate::Projected { markup } => Entity::projected(markup.clone(), self.mass, self.position),
        };
        if let Some([x, y, z]) = self.rotation {
            entity = entity.with_rotation(Quat::from_euler_xyz(x, y, z));
        }
        if let Some(ref name) = self.name {
            entity = entity.with_name(name.clone());
        }
        for tag in &self.tags {
            entity = entity.with_tag(tag.clone());
        }
        entity
    }
}

/// A serializable scene: gravity plus entity templates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneTemplate {
    pub name: String,
    /// Gravity vector; the configured default applies when absent
    #[serde(default)]
    pub gravity: Option<Vec3>,
    pub entities: Vec<EntityTemplate>,
}

impl SceneTemplate {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            gravity: None,
            entities: Vec::new(),
        }
    }

    /// Load a scene from a RON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SceneLoadError> {
        let contents = fs::read_to_string(path)?;
        let scene = ron::from_str(&contents)?;
        Ok(scene)
    }

    /// Save a scene to a RON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SceneSaveError> {
        let pretty = ron::ser::PrettyConfig::new()
            .struct_names(true)
            .enumerate_arrays(false);
        let contents = ron::ser::to_string_pretty(self, pretty)?;
        fs::write(path, contents)?;
        Ok(())
    }

    pub fn add_entity(&mut self, entity: EntityTemplate) {
        self.entities.push(entity);
    }

    pub fn with_gravity(mut self, gravity: Vec3) -> Self {
        self.gravity = Some(gravity);
        self
    }

    /// Physics config for this scene, falling back to `default` gravity
    pub fn physics_config(&self, default: &PhysicsConfig) -> PhysicsConfig {
        PhysicsConfig::new(self.gravity.unwrap_or(default.gravity))
    }
}

/// Error loading a scene
#[derive(Debug)]
pub enum SceneLoadError {
    /// IO error (file not found, permission denied, etc.)
    Io(io::Error),
    /// Parse error (invalid RON syntax)
    Parse(ron::error::SpannedError),
}

impl From<io::Error> for SceneLoadError {
    fn from(e: io::Error) -> Self {
        SceneLoadError::Io(e)
    }
}

impl From<ron::error::SpannedError> for SceneLoadError {
    fn from(e: ron::error::SpannedError) -> Self {
        SceneLoadError::Parse(e)
    }
}

impl std::fmt::Display for SceneLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SceneLoadError::Io(e) => write!(f, "IO error: {}", e),
            SceneLoadError::Parse(e) => write!(f, "Parse error: {}", e),
        }
    }
}

impl std::error::Error for SceneLoadError {}

/// Error saving a scene
#[derive(Debug)]
pub enum SceneSaveError {
    Io(io::Error),
    Serialize(ron::Error),
}

impl From<io::Error> for SceneSaveError {
    fn from(e: io::Error) -> Self {
        SceneSaveError::Io(e)
    }
}

impl From<ron::Error> for SceneSaveError {
    fn from(e: ron::Error) -> Self {
        SceneSaveError::Serialize(e)
    }
}

impl std::fmt::Display for SceneSaveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SceneSaveError::Io(e) => write!(f, "IO error: {}", e),
            SceneSaveError::Serialize(e) => write!(f, "Serialize error: {}", e),
        }
    }
}

impl std::error::Error for SceneSaveError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::Geometry;
    use dungeon_physics::PhysicsWorld;

    #[test]
    fn test_projected_template_ignores_shape() {
        let entity = EntityTemplate::projected("<b>Q</b>", 1.0, Vec3::new(0.0, 0.0, 10.0)).to_entity();
        let node = entity.node().as_projected().unwrap();
        assert_eq!(node.markup, "<b>Q</b>");
    }

    #[test]
    fn test_template_rotation_applied_to_body() {
        let physics = PhysicsWorld::new();
        let template = EntityTemplate::mesh(ShapeDescriptor::cube(), 1.0, Vec3::ZERO).with_rotation([0.0, 0.0, 1.0]);
        let entity = template.to_entity();
        let expected = Quat::from_euler_xyz(0.0, 0.0, 1.0).normalize();
        assert!(entity.body(&physics).unwrap().orientation.approx_eq(&expected, 0.0001));
        assert_eq!(entity.transform().rotation, entity.body(&physics).unwrap().orientation);
    }

    #[test]
    fn test_physics_config_fallback() {
        let default = PhysicsConfig::default();
        let scene = SceneTemplate::new("s");
        assert_eq!(scene.physics_config(&default).gravity, Vec3::new(0.0, 0.0, -9.8));

        let scene = scene.with_gravity(Vec3::new(0.0, 0.0, -1.0));
        assert_eq!(scene.physics_config(&default).gravity, Vec3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn test_parse_scene_ron() {
        let ron_str = r#"
            SceneTemplate(
                name: "Arena",
                gravity: Some(Vec3(x: 0.0, y: 0.0, z: -9.8)),
                entities: [
                    EntityTemplate(
                        name: Some("ground"),
                        shape: (type: "Plane"),
                        position: Vec3(x: 0.0, y: 0.0, z: 0.0),
                        render: Mesh(material: Some(Material(shader: "MeshLambertMaterial", base_color: (1.0, 1.0, 1.0, 1.0)))),
                    ),
                    EntityTemplate(
                        shape: (type: "Cube", size: 2.0),
                        mass: 1.0,
                        position: Vec3(x: 0.0, y: 5.0, z: 10.0),
                        on_collide: Some("cube_impact"),
                    ),
                    EntityTemplate(
                        mass: 1.0,
                        position: Vec3(x: 1.0, y: 0.0, z: 20.0),
                        render: Projected(markup: "<h1>D</h1>"),
                    ),
                ],
            )
        "#;

        let scene: SceneTemplate = ron::from_str(ron_str).unwrap();
        assert_eq!(scene.entities.len(), 3);
        assert_eq!(scene.entities[0].shape, ShapeDescriptor::plane());
        assert_eq!(scene.entities[0].mass, 0.0);
        assert_eq!(scene.entities[1].on_collide.as_deref(), Some("cube_impact"));
        assert!(matches!(scene.entities[2].render, RenderTemplate::Projected { .. }));

        let ground = scene.entities[0].to_entity();
        let mesh = ground.node().as_mesh().unwrap();
        assert_eq!(mesh.geometry, Geometry::Plane { width: 10.0, height: 10.0, segments: 64 });
        assert_eq!(mesh.material.as_ref().unwrap().shader, "MeshLambertMaterial");
    }

    #[test]
    fn test_save_and_load_file() {
        let mut scene = SceneTemplate::new("Saved").with_gravity(Vec3::new(0.0, 0.0, -9.8));
        scene.add_entity(EntityTemplate::mesh(ShapeDescriptor::plane(), 0.0, Vec3::ZERO).with_name("ground"));
        scene.add_entity(EntityTemplate::projected("A", 1.0, Vec3::new(0.0, 0.0, 12.0)).with_handler("letter_impact"));

        let path = std::env::temp_dir().join(format!("dungeon3d_scene_{}.ron", std::process::id()));
        scene.save(&path).unwrap();
        let loaded = SceneTemplate::load(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded, scene);
    }

    #[test]
    fn test_load_missing_file() {
        let result = SceneTemplate::load("/nonexistent/scene.ron");
        assert!(matches!(result, Err(SceneLoadError::Io(_))));
    }
}
