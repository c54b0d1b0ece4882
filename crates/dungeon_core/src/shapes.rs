//! Shape descriptors
//!
//! A [`ShapeDescriptor`] picks the render geometry and the matching collision
//! shape together, so an entity can never end up with a mesh and a collider
//! that disagree. Each variant carries only the fields its pair needs.
//!
//! Unknown shapes fall back to the default cube. This is a deliberate,
//! logged policy rather than a construction error: level data written for
//! newer clients still produces a usable (if boxy) body.

use dungeon_math::{Quat, Vec3};
use dungeon_physics::{Aabb, Collider, Plane, Sphere};
use serde::{Serialize, Deserialize};

/// Half-extent of the nominal collision box used by projected entities
///
/// Markup elements have no intrinsic 3D bounds, so their footprint is a tiny
/// fixed cube regardless of how large the element is drawn.
pub const PROJECTED_HALF_EXTENT: f32 = 0.01;

/// Serializable shape selection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ShapeDescriptor {
    /// Flat ground plane facing local +Z; always static
    Plane {
        /// Side length of the visual plane before `scale`
        #[serde(default = "default_plane_size")]
        size: f32,
        /// Subdivisions along each side of the visual plane
        #[serde(default = "default_plane_segments")]
        segments: u32,
        /// Visual scale applied to the plane mesh
        #[serde(default = "default_plane_scale")]
        scale: f32,
    },
    /// Cube with the given side length
    Cube {
        #[serde(default = "default_cube_size")]
        size: f32,
    },
    /// Sphere with the given radius
    Sphere { radius: f32 },
    /// Any shape tag this build does not know
    #[serde(other)]
    Unknown,
}

fn default_plane_size() -> f32 {
    10.0
}

fn default_plane_segments() -> u32 {
    64
}

fn default_plane_scale() -> f32 {
    100.0
}

fn default_cube_size() -> f32 {
    2.0
}

impl Default for ShapeDescriptor {
    fn default() -> Self {
        Self::cube()
    }
}

/// Render geometry selected by a shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Geometry {
    Plane { width: f32, height: f32, segments: u32 },
    Box { width: f32, height: f32, depth: f32 },
    Sphere { radius: f32 },
}

impl ShapeDescriptor {
    /// The default cube (side 2)
    pub fn cube() -> Self {
        Self::Cube { size: default_cube_size() }
    }

    /// The default ground plane (10 x 10, 64 segments, scaled 100)
    pub fn plane() -> Self {
        Self::Plane {
            size: default_plane_size(),
            segments: default_plane_segments(),
            scale: default_plane_scale(),
        }
    }

    /// Apply the fallback policy: `Unknown` becomes the default cube
    pub fn resolve(self) -> Self {
        match self {
            Self::Unknown => {
                log::warn!("Unknown shape descriptor, falling back to default cube");
                Self::cube()
            }
            known => known,
        }
    }

    /// Render geometry for this shape
    pub fn geometry(&self) -> Geometry {
        match self.resolve() {
            Self::Plane { size, segments, .. } => Geometry::Plane {
                width: size,
                height: size,
                segments,
            },
            Self::Cube { size } => Geometry::Box {
                width: size,
                height: size,
                depth: size,
            },
            Self::Sphere { radius } => Geometry::Sphere { radius },
            Self::Unknown => unreachable!("resolve() never returns Unknown"),
        }
    }

    /// Visual scale applied on top of the geometry
    pub fn visual_scale(&self) -> f32 {
        match self.resolve() {
            Self::Plane { scale, .. } => scale,
            _ => 1.0,
        }
    }

    /// Collision shape matching the geometry, posed at `position`
    pub fn collider(&self, position: Vec3, orientation: Quat) -> Collider {
        match self.resolve() {
            Self::Plane { .. } => Collider::Plane(Plane::from_pose(position, orientation)),
            Self::Cube { size } => {
                Collider::Aabb(Aabb::from_center_half_extents(position, Vec3::splat(size * 0.5)))
            }
            Self::Sphere { radius } => Collider::Sphere(Sphere::new(position, radius)),
            Self::Unknown => unreachable!("resolve() never returns Unknown"),
        }
    }

    /// Nominal collision box used for projected (markup) entities
    pub fn projected_collider(position: Vec3) -> Collider {
        Collider::Aabb(Aabb::from_center_half_extents(position, Vec3::splat(PROJECTED_HALF_EXTENT)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_resolves_to_cube() {
        assert_eq!(ShapeDescriptor::Unknown.resolve(), ShapeDescriptor::cube());
        assert_eq!(
            ShapeDescriptor::Unknown.geometry(),
            Geometry::Box { width: 2.0, height: 2.0, depth: 2.0 }
        );
    }

    #[test]
    fn test_cube_collider_matches_geometry() {
        let cube = ShapeDescriptor::Cube { size: 4.0 };
        match cube.collider(Vec3::new(1.0, 1.0, 1.0), Quat::IDENTITY) {
            Collider::Aabb(b) => {
                assert_eq!(b.half_extents(), Vec3::splat(2.0));
                assert_eq!(b.center(), Vec3::ONE);
            }
            other => panic!("expected box, got {:?}", other),
        }
    }

    #[test]
    fn test_plane_geometry_and_scale() {
        let plane = ShapeDescriptor::plane();
        assert_eq!(plane.geometry(), Geometry::Plane { width: 10.0, height: 10.0, segments: 64 });
        assert_eq!(plane.visual_scale(), 100.0);
        assert!(matches!(plane.collider(Vec3::ZERO, Quat::IDENTITY), Collider::Plane(_)));
    }

    #[test]
    fn test_projected_collider_is_nominal() {
        match ShapeDescriptor::projected_collider(Vec3::ZERO) {
            Collider::Aabb(b) => assert_eq!(b.half_extents(), Vec3::splat(PROJECTED_HALF_EXTENT)),
            other => panic!("expected box, got {:?}", other),
        }
    }

    #[test]
    fn test_deserialize_unknown_tag_falls_back() {
        let shape: ShapeDescriptor = ron::from_str("(type: \"Torus\")").unwrap();
        assert_eq!(shape, ShapeDescriptor::Unknown);
        assert_eq!(shape.resolve(), ShapeDescriptor::cube());
    }

    #[test]
    fn test_deserialize_plane_defaults() {
        let shape: ShapeDescriptor = ron::from_str("(type: \"Plane\")").unwrap();
        assert_eq!(shape, ShapeDescriptor::plane());
    }
}
