//! Rigid body types

use crate::collision::CollisionFilter;
use crate::material::PhysicsMaterial;
use crate::shapes::{Aabb, Collider, Plane, Sphere};
use dungeon_math::{Quat, Vec3};
use slotmap::new_key_type;

new_key_type! {
    /// Key to a rigid body in a [`PhysicsWorld`](crate::PhysicsWorld)
    ///
    /// Generational: once a body is removed its key never resolves again,
    /// even if the slot is reused.
    pub struct BodyKey;
}

/// How a body takes part in the simulation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BodyType {
    /// Moved by gravity, velocity and contacts
    Dynamic,
    /// Never moved by the simulation; only explicit repositioning moves it
    Static,
}

/// A rigid body with pose, velocity and a collision shape
#[derive(Clone, Debug)]
pub struct RigidBody {
    /// Position in world space
    pub position: Vec3,
    /// Orientation in world space
    pub orientation: Quat,
    /// Linear velocity (units per second)
    pub velocity: Vec3,
    /// Angular velocity (radians per second, world axes)
    pub angular_velocity: Vec3,
    mass: f32,
    body_type: BodyType,
    /// Surface used for contact response
    pub material: PhysicsMaterial,
    /// Collision shape in world coordinates
    pub collider: Collider,
    /// Layer filtering
    pub filter: CollisionFilter,
    /// Whether gravity is applied to this body
    pub affected_by_gravity: bool,
}

impl RigidBody {
    /// Create a body from a collider and a mass
    ///
    /// A mass of zero (or less) makes the body static. Plane colliders are
    /// always static.
    pub fn new(collider: Collider, mass: f32, position: Vec3) -> Self {
        let body_type = if mass > 0.0 && !collider.is_plane() {
            BodyType::Dynamic
        } else {
            BodyType::Static
        };
        let filter = match body_type {
            BodyType::Dynamic => CollisionFilter::default(),
            BodyType::Static => CollisionFilter::static_world(),
        };
        Self {
            position,
            orientation: Quat::IDENTITY,
            velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            mass: mass.max(0.0),
            body_type,
            material: PhysicsMaterial::default(),
            collider: collider.posed(position, Quat::IDENTITY),
            filter,
            affected_by_gravity: body_type == BodyType::Dynamic,
        }
    }

    /// Box body with the given half-extents
    pub fn new_box(position: Vec3, half_extents: Vec3, mass: f32) -> Self {
        Self::new(
            Collider::Aabb(Aabb::from_center_half_extents(position, half_extents)),
            mass,
            position,
        )
    }

    /// Sphere body
    pub fn new_sphere(position: Vec3, radius: f32, mass: f32) -> Self {
        Self::new(Collider::Sphere(Sphere::new(position, radius)), mass, position)
    }

    /// Infinite static plane through `position`, facing local +Z
    pub fn new_plane(position: Vec3) -> Self {
        Self::new(Collider::Plane(Plane::from_pose(position, Quat::IDENTITY)), 0.0, position)
    }

    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_angular_velocity(mut self, angular_velocity: Vec3) -> Self {
        self.angular_velocity = angular_velocity;
        self
    }

    pub fn with_material(mut self, material: PhysicsMaterial) -> Self {
        self.material = material;
        self
    }

    pub fn with_filter(mut self, filter: CollisionFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_gravity(mut self, affected: bool) -> Self {
        self.affected_by_gravity = affected && self.is_dynamic();
        self
    }

    pub fn with_orientation(mut self, orientation: Quat) -> Self {
        self.set_orientation(orientation);
        self
    }

    #[inline]
    pub fn mass(&self) -> f32 {
        self.mass
    }

    /// Inverse mass; zero for static bodies
    #[inline]
    pub fn inverse_mass(&self) -> f32 {
        match self.body_type {
            BodyType::Dynamic => 1.0 / self.mass,
            BodyType::Static => 0.0,
        }
    }

    #[inline]
    pub fn body_type(&self) -> BodyType {
        self.body_type
    }

    #[inline]
    pub fn is_static(&self) -> bool {
        self.body_type == BodyType::Static
    }

    #[inline]
    pub fn is_dynamic(&self) -> bool {
        self.body_type == BodyType::Dynamic
    }

    /// Teleport to a new position, keeping the collider in sync
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.collider = self.collider.posed(self.position, self.orientation);
    }

    /// Set a new orientation, keeping the collider in sync
    pub fn set_orientation(&mut self, orientation: Quat) {
        self.orientation = orientation.normalize();
        self.collider = self.collider.posed(self.position, self.orientation);
    }

    /// Apply a positional correction (collision resolution)
    pub fn apply_correction(&mut self, correction: Vec3) {
        self.position += correction;
        self.collider = self.collider.translated(correction);
    }

    /// Advance pose by the current velocities
    pub(crate) fn integrate(&mut self, gravity: Vec3, dt: f32) {
        if self.affected_by_gravity {
            self.velocity += gravity * dt;
        }
        let displacement = self.velocity * dt;
        self.position += displacement;
        self.collider = self.collider.translated(displacement);

        if self.angular_velocity != Vec3::ZERO {
            self.orientation = self.orientation.integrate(self.angular_velocity, dt);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_mass_box_is_static() {
        let body = RigidBody::new_box(Vec3::ZERO, Vec3::splat(1.0), 0.0);
        assert!(body.is_static());
        assert!(!body.affected_by_gravity);
        assert_eq!(body.inverse_mass(), 0.0);
    }

    #[test]
    fn test_massive_box_is_dynamic() {
        let body = RigidBody::new_box(Vec3::new(1.0, 2.0, 3.0), Vec3::splat(1.0), 2.0);
        assert!(body.is_dynamic());
        assert!(body.affected_by_gravity);
        assert_eq!(body.inverse_mass(), 0.5);
        match body.collider {
            Collider::Aabb(b) => assert_eq!(b.center(), Vec3::new(1.0, 2.0, 3.0)),
            _ => panic!("expected box collider"),
        }
    }

    #[test]
    fn test_plane_is_static_even_with_mass() {
        let body = RigidBody::new(Collider::Plane(Plane::ground(0.0)), 5.0, Vec3::ZERO);
        assert!(body.is_static());
    }

    #[test]
    fn test_set_position_moves_collider() {
        let mut body = RigidBody::new_sphere(Vec3::ZERO, 0.5, 1.0);
        body.set_position(Vec3::new(4.0, 0.0, 1.0));
        assert_eq!(body.position, Vec3::new(4.0, 0.0, 1.0));
        match body.collider {
            Collider::Sphere(s) => assert_eq!(s.center, Vec3::new(4.0, 0.0, 1.0)),
            _ => panic!("expected sphere collider"),
        }
    }

    #[test]
    fn test_set_orientation_tilts_plane() {
        let mut body = RigidBody::new_plane(Vec3::ZERO);
        body.set_orientation(Quat::from_axis_angle(Vec3::X, std::f32::consts::FRAC_PI_2));
        match body.collider {
            Collider::Plane(p) => assert!((p.normal - Vec3::new(0.0, -1.0, 0.0)).length() < 0.0001),
            _ => panic!("expected plane collider"),
        }
    }

    #[test]
    fn test_integrate_applies_gravity_then_velocity() {
        let mut body = RigidBody::new_sphere(Vec3::new(0.0, 0.0, 10.0), 0.5, 1.0);
        body.integrate(Vec3::new(0.0, 0.0, -10.0), 0.1);
        assert!((body.velocity.z + 1.0).abs() < 0.0001);
        assert!((body.position.z - 9.9).abs() < 0.0001);
    }

    #[test]
    fn test_gravity_flag_ignored_for_static() {
        let body = RigidBody::new_box(Vec3::ZERO, Vec3::splat(1.0), 0.0).with_gravity(true);
        assert!(!body.affected_by_gravity);
    }
}
