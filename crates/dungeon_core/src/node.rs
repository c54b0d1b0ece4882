//! Render nodes and scene roots
//!
//! An entity draws itself through exactly one render node. Two kinds exist:
//! [`MeshNode`] (geometry + material, lives in the mesh scene) and
//! [`ProjectedNode`] (a flat markup element placed in 3D, lives in the
//! projected scene). Both expose the same [`SceneNode`] capability, so the
//! physics coupling in [`Entity`](crate::Entity) is written once.

use std::collections::HashSet;

use bitflags::bitflags;
use serde::{Serialize, Deserialize};

use crate::shapes::{Geometry, ShapeDescriptor};
use crate::world::EntityKey;
use crate::Transform;

bitflags! {
    /// What changed on a node since the renderer last consumed it
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct DirtyFlags: u8 {
        const NONE = 0;
        /// Position or rotation changed
        const TRANSFORM = 1 << 0;
        /// Material or markup content changed
        const CONTENT = 1 << 1;
        const ALL = Self::TRANSFORM.bits() | Self::CONTENT.bits();
    }
}

/// Surface material for a mesh node
///
/// `shader` names the material model the renderer should use (for example
/// `"MeshLambertMaterial"`); the color is the base tint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub shader: String,
    pub base_color: [f32; 4],
}

impl Default for Material {
    fn default() -> Self {
        Self {
            shader: "MeshStandardMaterial".to_string(),
            base_color: [1.0, 1.0, 1.0, 1.0],
        }
    }
}

impl Material {
    pub fn new(shader: impl Into<String>, base_color: [f32; 4]) -> Self {
        Self {
            shader: shader.into(),
            base_color,
        }
    }
}

/// Which scene root a node belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SceneLayer {
    Mesh,
    Projected,
}

/// A container of attached render nodes, addressed by entity key
#[derive(Debug)]
pub struct SceneRoot {
    layer: SceneLayer,
    nodes: HashSet<EntityKey>,
}

impl SceneRoot {
    pub fn new(layer: SceneLayer) -> Self {
        Self {
            layer,
            nodes: HashSet::new(),
        }
    }

    pub fn layer(&self) -> SceneLayer {
        self.layer
    }

    /// Attach a node; false if it was already attached
    pub fn attach(&mut self, key: EntityKey) -> bool {
        self.nodes.insert(key)
    }

    /// Detach a node; false if it was not attached
    pub fn detach(&mut self, key: EntityKey) -> bool {
        self.nodes.remove(&key)
    }

    pub fn contains(&self, key: EntityKey) -> bool {
        self.nodes.contains(&key)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = EntityKey> + '_ {
        self.nodes.iter().copied()
    }
}

/// The two scene roots owned by a world
#[derive(Debug)]
pub struct SceneRoots {
    pub scene: SceneRoot,
    pub projected: SceneRoot,
}

impl Default for SceneRoots {
    fn default() -> Self {
        Self {
            scene: SceneRoot::new(SceneLayer::Mesh),
            projected: SceneRoot::new(SceneLayer::Projected),
        }
    }
}

impl SceneRoots {
    pub fn root_mut(&mut self, layer: SceneLayer) -> &mut SceneRoot {
        match layer {
            SceneLayer::Mesh => &mut self.scene,
            SceneLayer::Projected => &mut self.projected,
        }
    }

    pub fn root(&self, layer: SceneLayer) -> &SceneRoot {
        match layer {
            SceneLayer::Mesh => &self.scene,
            SceneLayer::Projected => &self.projected,
        }
    }
}

/// Capability shared by every render node
pub trait SceneNode {
    fn transform(&self) -> &Transform;

    /// Overwrite position and rotation; returns true if anything changed.
    /// The node's own scale is kept.
    fn set_transform(&mut self, transform: &Transform) -> bool;

    fn layer(&self) -> SceneLayer;

    fn attach(&self, roots: &mut SceneRoots, key: EntityKey) -> bool {
        roots.root_mut(self.layer()).attach(key)
    }

    fn detach(&self, roots: &mut SceneRoots, key: EntityKey) -> bool {
        roots.root_mut(self.layer()).detach(key)
    }
}

/// Shared body of `set_transform` for both node kinds
fn write_pose(current: &mut Transform, dirty: &mut DirtyFlags, next: &Transform) -> bool {
    if current.position == next.position && current.rotation == next.rotation {
        return false;
    }
    current.position = next.position;
    current.rotation = next.rotation;
    *dirty |= DirtyFlags::TRANSFORM;
    true
}

/// Mesh-based render node
#[derive(Clone, Debug)]
pub struct MeshNode {
    pub geometry: Geometry,
    pub material: Option<Material>,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
    transform: Transform,
    dirty: DirtyFlags,
}

impl MeshNode {
    /// Build the mesh for a shape; the shape's visual scale is applied here
    pub fn from_shape(shape: &ShapeDescriptor, material: Option<Material>) -> Self {
        Self {
            geometry: shape.geometry(),
            material,
            cast_shadow: true,
            receive_shadow: true,
            transform: Transform::identity().with_scale(shape.visual_scale()),
            dirty: DirtyFlags::ALL,
        }
    }

    pub fn set_material(&mut self, material: Material) {
        self.material = Some(material);
        self.dirty |= DirtyFlags::CONTENT;
    }
}

/// Visual scale applied to markup elements placed in the scene
pub const PROJECTED_VISUAL_SCALE: f32 = 0.1;

/// Flat markup element positioned in 3D
#[derive(Clone, Debug)]
pub struct ProjectedNode {
    /// Markup content of the element
    pub markup: String,
    transform: Transform,
    dirty: DirtyFlags,
}

impl ProjectedNode {
    pub fn new(markup: impl Into<String>) -> Self {
        Self {
            markup: markup.into(),
            transform: Transform::identity().with_scale(PROJECTED_VISUAL_SCALE),
            dirty: DirtyFlags::ALL,
        }
    }

    pub fn set_markup(&mut self, markup: impl Into<String>) {
        self.markup = markup.into();
        self.dirty |= DirtyFlags::CONTENT;
    }
}

impl SceneNode for MeshNode {
    fn transform(&self) -> &Transform {
        &self.transform
    }

    fn set_transform(&mut self, transform: &Transform) -> bool {
        write_pose(&mut self.transform, &mut self.dirty, transform)
    }

    fn layer(&self) -> SceneLayer {
        SceneLayer::Mesh
    }
}

impl SceneNode for ProjectedNode {
    fn transform(&self) -> &Transform {
        &self.transform
    }

    fn set_transform(&mut self, transform: &Transform) -> bool {
        write_pose(&mut self.transform, &mut self.dirty, transform)
    }

    fn layer(&self) -> SceneLayer {
        SceneLayer::Projected
    }
}

/// The render node owned by an entity
#[derive(Clone, Debug)]
pub enum RenderNode {
    Mesh(MeshNode),
    Projected(ProjectedNode),
}

impl RenderNode {
    fn as_node(&self) -> &dyn SceneNode {
        match self {
            RenderNode::Mesh(n) => n,
            RenderNode::Projected(n) => n,
        }
    }

    fn as_node_mut(&mut self) -> &mut dyn SceneNode {
        match self {
            RenderNode::Mesh(n) => n,
            RenderNode::Projected(n) => n,
        }
    }

    fn dirty_mut(&mut self) -> &mut DirtyFlags {
        match self {
            RenderNode::Mesh(n) => &mut n.dirty,
            RenderNode::Projected(n) => &mut n.dirty,
        }
    }

    pub fn dirty_flags(&self) -> DirtyFlags {
        match self {
            RenderNode::Mesh(n) => n.dirty,
            RenderNode::Projected(n) => n.dirty,
        }
    }

    /// Take the dirty flags, leaving the node clean (called by the renderer)
    pub fn take_dirty(&mut self) -> DirtyFlags {
        std::mem::take(self.dirty_mut())
    }

    pub fn as_mesh(&self) -> Option<&MeshNode> {
        match self {
            RenderNode::Mesh(n) => Some(n),
            RenderNode::Projected(_) => None,
        }
    }

    pub fn as_projected(&self) -> Option<&ProjectedNode> {
        match self {
            RenderNode::Projected(n) => Some(n),
            RenderNode::Mesh(_) => None,
        }
    }
}

impl SceneNode for RenderNode {
    fn transform(&self) -> &Transform {
        self.as_node().transform()
    }

    fn set_transform(&mut self, transform: &Transform) -> bool {
        self.as_node_mut().set_transform(transform)
    }

    fn layer(&self) -> SceneLayer {
        self.as_node().layer()
    }
}
