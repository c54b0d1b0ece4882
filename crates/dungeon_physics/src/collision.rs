//! Collision detection between spheres, boxes and planes
//!
//! Also provides collision filtering via layer masks.

use bitflags::bitflags;

use crate::shapes::{Aabb, Plane, Sphere};
use dungeon_math::Vec3;

bitflags! {
    /// Collision layers for filtering which bodies can touch
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct CollisionLayer: u32 {
        /// Default layer for props and debris
        const DEFAULT = 1 << 0;
        /// Static level geometry (ground, walls)
        const STATIC = 1 << 1;
        /// Markup elements placed in the scene
        const PROJECTED = 1 << 2;
        /// All layers
        const ALL = 0xFFFFFFFF;
    }
}

/// Collision filter determining what a body collides with
///
/// Two bodies A and B collide if `A.layer & B.mask != 0` and
/// `B.layer & A.mask != 0`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CollisionFilter {
    /// Which layer(s) this body belongs to
    pub layer: CollisionLayer,
    /// Which layer(s) this body can collide with
    pub mask: CollisionLayer,
}

impl Default for CollisionFilter {
    fn default() -> Self {
        Self {
            layer: CollisionLayer::DEFAULT,
            mask: CollisionLayer::ALL,
        }
    }
}

impl CollisionFilter {
    pub fn new(layer: CollisionLayer, mask: CollisionLayer) -> Self {
        Self { layer, mask }
    }

    /// Both filters must accept each other
    pub fn collides_with(&self, other: &Self) -> bool {
        self.layer.intersects(other.mask) && other.layer.intersects(self.mask)
    }

    /// Filter for static level geometry
    pub fn static_world() -> Self {
        Self {
            layer: CollisionLayer::STATIC,
            mask: CollisionLayer::ALL,
        }
    }

    /// Filter for projected markup elements
    pub fn projected() -> Self {
        Self {
            layer: CollisionLayer::PROJECTED,
            mask: CollisionLayer::ALL,
        }
    }
}

/// Contact information from a collision test
#[derive(Clone, Copy, Debug)]
pub struct Contact {
    /// Point of contact
    pub point: Vec3,
    /// Unit contact normal; direction depends on the test (see each function)
    pub normal: Vec3,
    /// Penetration depth (positive means overlapping)
    pub penetration: f32,
}

impl Contact {
    pub fn new(point: Vec3, normal: Vec3, penetration: f32) -> Self {
        Self {
            point,
            normal,
            penetration,
        }
    }

    pub fn is_colliding(&self) -> bool {
        self.penetration > 0.0
    }

    /// Same contact seen from the other shape
    pub fn flipped(mut self) -> Self {
        self.normal = -self.normal;
        self
    }
}

/// Sphere vs plane; normal points from the plane toward the sphere
pub fn sphere_vs_plane(sphere: &Sphere, plane: &Plane) -> Option<Contact> {
    let penetration = sphere.radius - plane.signed_distance(sphere.center);
    if penetration > 0.0 {
        let normal = plane.normal;
        let point = sphere.center - normal * sphere.radius;
        Some(Contact::new(point, normal, penetration))
    } else {
        None
    }
}

/// Box vs plane; normal points from the plane toward the box
pub fn aabb_vs_plane(aabb: &Aabb, plane: &Plane) -> Option<Contact> {
    // The corner furthest along -normal
    let deepest = aabb.center() - aabb.half_extents().component_mul(plane.normal.sign());
    let signed_dist = plane.signed_distance(deepest);

    if signed_dist < 0.0 {
        Some(Contact::new(deepest, plane.normal, -signed_dist))
    } else {
        None
    }
}

/// Sphere vs sphere; normal points from `a` toward `b`
pub fn sphere_vs_sphere(a: &Sphere, b: &Sphere) -> Option<Contact> {
    let delta = b.center - a.center;
    let dist_sq = delta.length_squared();
    let min_dist = a.radius + b.radius;

    if dist_sq < min_dist * min_dist && dist_sq > 0.0001 {
        let dist = dist_sq.sqrt();
        let normal = delta.normalized();
        let point = a.center + normal * a.radius;
        Some(Contact::new(point, normal, min_dist - dist))
    } else {
        None
    }
}

/// Sphere vs box; normal points from the box toward the sphere
pub fn sphere_vs_aabb(sphere: &Sphere, aabb: &Aabb) -> Option<Contact> {
    let closest = aabb.closest_point(sphere.center);
    let delta = sphere.center - closest;
    let dist_squared = delta.length_squared();

    if dist_squared >= sphere.radius * sphere.radius {
        return None;
    }

    let dist = dist_squared.sqrt();
    let normal = if dist > 0.0001 {
        delta.normalized()
    } else {
        // Center inside the box: leave through the nearest face
        let to_min = sphere.center - aabb.min;
        let to_max = aabb.max - sphere.center;
        let candidates = [
            (to_min.x, -Vec3::X),
            (to_max.x, Vec3::X),
            (to_min.y, -Vec3::Y),
            (to_max.y, Vec3::Y),
            (to_min.z, -Vec3::Z),
            (to_max.z, Vec3::Z),
        ];
        candidates
            .iter()
            .fold((f32::MAX, Vec3::Z), |best, &(d, n)| if d < best.0 { (d, n) } else { best })
            .1
    };

    Some(Contact::new(closest, normal, sphere.radius - dist))
}

/// Box vs box; normal points from `b` toward `a`
pub fn aabb_vs_aabb(a: &Aabb, b: &Aabb) -> Option<Contact> {
    if a.max.x < b.min.x || a.min.x > b.max.x {
        return None;
    }
    if a.max.y < b.min.y || a.min.y > b.max.y {
        return None;
    }
    if a.max.z < b.min.z || a.min.z > b.max.z {
        return None;
    }

    let overlap = Vec3::new(
        (a.max.x.min(b.max.x) - a.min.x.max(b.min.x)).max(0.0),
        (a.max.y.min(b.max.y) - a.min.y.max(b.min.y)).max(0.0),
        (a.max.z.min(b.max.z) - a.min.z.max(b.min.z)).max(0.0),
    );
    let (ca, cb) = (a.center(), b.center());

    // Separate along the axis of least overlap
    let (penetration, normal) = if overlap.x <= overlap.y && overlap.x <= overlap.z {
        (overlap.x, if ca.x < cb.x { -Vec3::X } else { Vec3::X })
    } else if overlap.y <= overlap.z {
        (overlap.y, if ca.y < cb.y { -Vec3::Y } else { Vec3::Y })
    } else {
        (overlap.z, if ca.z < cb.z { -Vec3::Z } else { Vec3::Z })
    };

    let point = a.closest_point(cb);
    Some(Contact::new(point, normal, penetration))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_default_collides() {
        let a = CollisionFilter::default();
        assert!(a.collides_with(&CollisionFilter::static_world()));
        assert!(a.collides_with(&CollisionFilter::projected()));
    }

    #[test]
    fn test_filter_asymmetric_mask_blocks() {
        let ghost = CollisionFilter::new(CollisionLayer::DEFAULT, CollisionLayer::STATIC);
        assert!(!ghost.collides_with(&CollisionFilter::projected()));
        assert!(ghost.collides_with(&CollisionFilter::static_world()));
    }

    #[test]
    fn test_sphere_vs_plane_resting_and_sunk() {
        let ground = Plane::ground(0.0);
        assert!(sphere_vs_plane(&Sphere::new(Vec3::new(0.0, 0.0, 2.0), 1.0), &ground).is_none());

        let contact = sphere_vs_plane(&Sphere::new(Vec3::new(0.0, 0.0, 0.5), 1.0), &ground)
            .expect("sphere overlaps ground");
        assert!((contact.penetration - 0.5).abs() < 0.0001);
        assert_eq!(contact.normal, Vec3::Z);
    }

    #[test]
    fn test_aabb_vs_plane() {
        let ground = Plane::ground(0.0);
        let cube = Aabb::from_center_half_extents(Vec3::new(0.0, 0.0, 0.75), Vec3::splat(1.0));
        let contact = aabb_vs_plane(&cube, &ground).expect("cube overlaps ground");
        assert!((contact.penetration - 0.25).abs() < 0.0001);
        assert_eq!(contact.normal, Vec3::Z);

        let above = Aabb::from_center_half_extents(Vec3::new(0.0, 0.0, 3.0), Vec3::splat(1.0));
        assert!(aabb_vs_plane(&above, &ground).is_none());
    }

    #[test]
    fn test_sphere_vs_sphere_normal_from_a_to_b() {
        let a = Sphere::new(Vec3::ZERO, 1.0);
        let b = Sphere::new(Vec3::new(1.5, 0.0, 0.0), 1.0);
        let contact = sphere_vs_sphere(&a, &b).expect("spheres overlap");
        assert_eq!(contact.normal, Vec3::X);
        assert!((contact.penetration - 0.5).abs() < 0.0001);
    }

    #[test]
    fn test_sphere_vs_aabb_outside_face() {
        let aabb = Aabb::from_center_half_extents(Vec3::ZERO, Vec3::splat(1.0));
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, 1.5), 1.0);
        let contact = sphere_vs_aabb(&sphere, &aabb).expect("touching top face");
        assert_eq!(contact.normal, Vec3::Z);
        assert!((contact.penetration - 0.5).abs() < 0.0001);
    }

    #[test]
    fn test_sphere_vs_aabb_center_inside_escapes_nearest_face() {
        let aabb = Aabb::from_center_half_extents(Vec3::ZERO, Vec3::splat(1.0));
        let sphere = Sphere::new(Vec3::new(0.0, 0.9, 0.0), 0.2);
        let contact = sphere_vs_aabb(&sphere, &aabb).expect("inside box");
        assert_eq!(contact.normal, Vec3::Y);
    }

    #[test]
    fn test_aabb_vs_aabb_least_overlap_axis() {
        let a = Aabb::from_center_half_extents(Vec3::new(0.0, 0.0, 1.8), Vec3::splat(1.0));
        let b = Aabb::from_center_half_extents(Vec3::ZERO, Vec3::splat(1.0));
        let contact = aabb_vs_aabb(&a, &b).expect("stacked boxes overlap");
        // a sits above b, so the normal points from b up toward a
        assert_eq!(contact.normal, Vec3::Z);
        assert!((contact.penetration - 0.2).abs() < 0.0001);
    }

    #[test]
    fn test_aabb_vs_aabb_separated() {
        let a = Aabb::from_center_half_extents(Vec3::new(5.0, 0.0, 0.0), Vec3::splat(1.0));
        let b = Aabb::from_center_half_extents(Vec3::ZERO, Vec3::splat(1.0));
        assert!(aabb_vs_aabb(&a, &b).is_none());
    }
}
