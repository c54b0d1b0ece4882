//! Collision shapes
//!
//! Lightweight primitives used for collision detection. Colliders are stored
//! in world coordinates and translated together with their body.

use dungeon_math::{Quat, Vec3};

/// A sphere defined by center and radius
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
}

impl Sphere {
    /// Create a new sphere at the given center with the given radius
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Check if a point is inside or on the sphere
    pub fn contains(&self, point: Vec3) -> bool {
        (point - self.center).length_squared() <= self.radius * self.radius
    }
}

/// An axis-aligned bounding box
///
/// Box bodies collide as axis-aligned volumes; their orientation is simulated
/// and rendered but does not rotate the collision volume.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    /// Minimum corner
    pub min: Vec3,
    /// Maximum corner
    pub max: Vec3,
}

impl Aabb {
    /// Create a new AABB from min and max corners
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create an AABB centered at a position with given half-extents
    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Check if a point is inside or on the box
    pub fn contains(&self, point: Vec3) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// Closest point inside or on the box to a given point
    pub fn closest_point(&self, point: Vec3) -> Vec3 {
        point.clamp_components(self.min, self.max)
    }

    pub fn translated(&self, delta: Vec3) -> Self {
        Self {
            min: self.min + delta,
            max: self.max + delta,
        }
    }
}

/// An infinite plane: `normal · point = distance`
///
/// Points with `normal · point > distance` are above the plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Plane {
    /// Unit normal pointing to the positive side
    pub normal: Vec3,
    /// Signed distance from origin along the normal
    pub distance: f32,
}

impl Plane {
    /// Create a plane from a normal (normalized here) and distance
    pub fn new(normal: Vec3, distance: f32) -> Self {
        Self {
            normal: normal.normalized(),
            distance,
        }
    }

    /// Create a plane through `point` facing `normal`
    pub fn from_point_normal(point: Vec3, normal: Vec3) -> Self {
        let n = normal.normalized();
        Self {
            normal: n,
            distance: n.dot(point),
        }
    }

    /// Plane through `position` whose local +Z axis is rotated by `orientation`
    pub fn from_pose(position: Vec3, orientation: Quat) -> Self {
        Self::from_point_normal(position, orientation.rotate(Vec3::Z))
    }

    /// Horizontal ground plane at height `z`
    pub fn ground(z: f32) -> Self {
        Self::from_point_normal(Vec3::new(0.0, 0.0, z), Vec3::Z)
    }

    /// Signed distance from a point to the plane (positive = above)
    pub fn signed_distance(&self, point: Vec3) -> f32 {
        self.normal.dot(point) - self.distance
    }
}

/// Collider enum for storing different collision shape types
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Collider {
    Sphere(Sphere),
    Aabb(Aabb),
    Plane(Plane),
}

impl Collider {
    /// Translate the collider by a delta
    pub fn translated(&self, delta: Vec3) -> Self {
        match self {
            Collider::Sphere(s) => Collider::Sphere(Sphere::new(s.center + delta, s.radius)),
            Collider::Aabb(b) => Collider::Aabb(b.translated(delta)),
            Collider::Plane(p) => {
                Collider::Plane(Plane::new(p.normal, p.distance + p.normal.dot(delta)))
            }
        }
    }

    /// Re-seat the collider at a new pose
    ///
    /// Spheres and boxes only follow the position; planes also follow the
    /// orientation because it defines their normal.
    pub fn posed(&self, position: Vec3, orientation: Quat) -> Self {
        match self {
            Collider::Sphere(s) => Collider::Sphere(Sphere::new(position, s.radius)),
            Collider::Aabb(b) => {
                Collider::Aabb(Aabb::from_center_half_extents(position, b.half_extents()))
            }
            Collider::Plane(_) => Collider::Plane(Plane::from_pose(position, orientation)),
        }
    }

    pub fn is_plane(&self) -> bool {
        matches!(self, Collider::Plane(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_sphere_contains() {
        let sphere = Sphere::new(Vec3::ZERO, 1.0);
        assert!(sphere.contains(Vec3::new(1.0, 0.0, 0.0))); // on surface
        assert!(!sphere.contains(Vec3::new(1.1, 0.0, 0.0)));
    }

    #[test]
    fn test_aabb_from_center_half_extents() {
        let aabb = Aabb::from_center_half_extents(Vec3::new(1.0, 2.0, 3.0), Vec3::splat(1.0));
        assert_eq!(aabb.min, Vec3::new(0.0, 1.0, 2.0));
        assert_eq!(aabb.max, Vec3::new(2.0, 3.0, 4.0));
        assert_eq!(aabb.center(), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(aabb.half_extents(), Vec3::splat(1.0));
    }

    #[test]
    fn test_aabb_closest_point() {
        let aabb = Aabb::new(Vec3::ZERO, Vec3::ONE);
        assert_eq!(aabb.closest_point(Vec3::new(2.0, 0.5, 0.5)), Vec3::new(1.0, 0.5, 0.5));
    }

    #[test]
    fn test_ground_signed_distance() {
        let ground = Plane::ground(0.0);
        assert!((ground.signed_distance(Vec3::new(3.0, 4.0, 2.0)) - 2.0).abs() < 0.0001);
        assert!(ground.signed_distance(Vec3::new(0.0, 0.0, -1.0)) < 0.0);
    }

    #[test]
    fn test_plane_from_pose_rotated() {
        // Tilting +Z by 90 degrees around X makes the plane face -Y
        let plane = Plane::from_pose(Vec3::new(0.0, 5.0, 0.0), Quat::from_axis_angle(Vec3::X, FRAC_PI_2));
        assert!((plane.normal - Vec3::new(0.0, -1.0, 0.0)).length() < 0.0001);
        assert!((plane.distance + 5.0).abs() < 0.0001);
    }

    #[test]
    fn test_collider_translated_plane() {
        let moved = Collider::Plane(Plane::ground(0.0)).translated(Vec3::new(7.0, 0.0, 2.0));
        match moved {
            Collider::Plane(p) => assert!((p.distance - 2.0).abs() < 0.0001),
            _ => panic!("expected plane"),
        }
    }

    #[test]
    fn test_collider_posed_keeps_extent() {
        let aabb = Collider::Aabb(Aabb::from_center_half_extents(Vec3::ZERO, Vec3::splat(0.5)));
        match aabb.posed(Vec3::new(1.0, 1.0, 1.0), Quat::IDENTITY) {
            Collider::Aabb(b) => {
                assert_eq!(b.center(), Vec3::ONE);
                assert_eq!(b.half_extents(), Vec3::splat(0.5));
            }
            _ => panic!("expected box"),
        }
    }
}
