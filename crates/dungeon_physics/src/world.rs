//! Physics world and simulation

use crate::body::{BodyKey, RigidBody};
use crate::collision::{aabb_vs_aabb, aabb_vs_plane, sphere_vs_aabb, sphere_vs_plane, sphere_vs_sphere, Contact};
use crate::shapes::Collider;
use dungeon_math::Vec3;
use slotmap::SlotMap;

/// Configuration for the physics simulation
#[derive(Clone, Debug)]
pub struct PhysicsConfig {
    /// Constant gravity acceleration (Z-up world: negative Z is down)
    pub gravity: Vec3,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, 0.0, -9.8),
        }
    }
}

impl PhysicsConfig {
    pub fn new(gravity: Vec3) -> Self {
        Self { gravity }
    }
}

/// A contact produced during a step
///
/// `normal` points from `body_a` toward `body_b`. `impact_velocity` is the
/// closing speed along that normal measured before the contact was resolved;
/// positive means the bodies were approaching.
#[derive(Clone, Copy, Debug)]
pub struct ContactEvent {
    pub body_a: BodyKey,
    pub body_b: BodyKey,
    pub point: Vec3,
    pub normal: Vec3,
    pub penetration: f32,
    pub impact_velocity: f32,
}

/// Engine-level failure during a step
#[derive(Debug, thiserror::Error)]
pub enum PhysicsError {
    /// A body's pose or velocity became NaN or infinite
    #[error("body {0:?} reached a non-finite state")]
    NonFiniteState(BodyKey),
    /// A non-positive or non-finite timestep was requested
    #[error("invalid timestep {0}")]
    InvalidTimestep(f32),
}

/// The physics world containing all rigid bodies
pub struct PhysicsWorld {
    bodies: SlotMap<BodyKey, RigidBody>,
    /// Contacts found by the most recent step
    contacts: Vec<ContactEvent>,
    pub config: PhysicsConfig,
}

impl PhysicsWorld {
    pub fn new() -> Self {
        Self::with_config(PhysicsConfig::default())
    }

    pub fn with_config(config: PhysicsConfig) -> Self {
        Self {
            bodies: SlotMap::with_key(),
            contacts: Vec::new(),
            config,
        }
    }

    /// Add a body to the world and return its key
    pub fn add_body(&mut self, body: RigidBody) -> BodyKey {
        self.bodies.insert(body)
    }

    /// Remove a body and return it; `None` if the key is stale
    pub fn remove_body(&mut self, key: BodyKey) -> Option<RigidBody> {
        self.bodies.remove(key)
    }

    pub fn get_body(&self, key: BodyKey) -> Option<&RigidBody> {
        self.bodies.get(key)
    }

    pub fn get_body_mut(&mut self, key: BodyKey) -> Option<&mut RigidBody> {
        self.bodies.get_mut(key)
    }

    pub fn contains(&self, key: BodyKey) -> bool {
        self.bodies.contains_key(key)
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Contacts detected by the last call to [`step`](Self::step)
    pub fn contacts(&self) -> &[ContactEvent] {
        &self.contacts
    }

    /// Advance the simulation by one fixed timestep
    ///
    /// 1. Gravity and velocity integration for dynamic bodies
    /// 2. Pairwise contact detection, recording a [`ContactEvent`] per contact
    /// 3. Position correction and impulse response
    pub fn step(&mut self, dt: f32) -> Result<&[ContactEvent], PhysicsError> {
        if !(dt.is_finite() && dt > 0.0) {
            return Err(PhysicsError::InvalidTimestep(dt));
        }
        self.contacts.clear();

        let gravity = self.config.gravity;
        for (key, body) in &mut self.bodies {
            if !body.is_dynamic() {
                continue;
            }
            body.integrate(gravity, dt);
            if !(body.position.is_finite() && body.velocity.is_finite()) {
                log::error!("Body {:?} diverged at {:?}", key, body.position);
                return Err(PhysicsError::NonFiniteState(key));
            }
        }

        self.resolve_contacts();
        Ok(&self.contacts)
    }

    /// Contact between two colliders, normal pointing from `a` toward `b`
    fn detect(a: &Collider, b: &Collider) -> Option<Contact> {
        match (a, b) {
            (Collider::Sphere(sa), Collider::Sphere(sb)) => sphere_vs_sphere(sa, sb),
            // Plane tests report the normal from the plane toward the shape
            (Collider::Plane(p), Collider::Sphere(s)) => sphere_vs_plane(s, p),
            (Collider::Sphere(s), Collider::Plane(p)) => sphere_vs_plane(s, p).map(Contact::flipped),
            (Collider::Plane(p), Collider::Aabb(b)) => aabb_vs_plane(b, p),
            (Collider::Aabb(b), Collider::Plane(p)) => aabb_vs_plane(b, p).map(Contact::flipped),
            // sphere_vs_aabb reports the normal from the box toward the sphere
            (Collider::Sphere(s), Collider::Aabb(b)) => sphere_vs_aabb(s, b).map(Contact::flipped),
            (Collider::Aabb(b), Collider::Sphere(s)) => sphere_vs_aabb(s, b),
            // aabb_vs_aabb reports the normal from its second argument toward the first
            (Collider::Aabb(ba), Collider::Aabb(bb)) => aabb_vs_aabb(ba, bb).map(Contact::flipped),
            (Collider::Plane(_), Collider::Plane(_)) => None,
        }
    }

    fn resolve_contacts(&mut self) {
        // Collect keys first; resolution mutates bodies pairwise
        let keys: Vec<BodyKey> = self.bodies.keys().collect();

        for i in 0..keys.len() {
            for j in (i + 1)..keys.len() {
                let (key_a, key_b) = (keys[i], keys[j]);
                let (a, b) = (&self.bodies[key_a], &self.bodies[key_b]);

                if a.is_static() && b.is_static() {
                    continue;
                }
                if !a.filter.collides_with(&b.filter) {
                    continue;
                }

                let Some(contact) = Self::detect(&a.collider, &b.collider) else {
                    continue;
                };
                if !contact.is_colliding() {
                    continue;
                }

                let impact_velocity = (a.velocity - b.velocity).dot(contact.normal);
                self.contacts.push(ContactEvent {
                    body_a: key_a,
                    body_b: key_b,
                    point: contact.point,
                    normal: contact.normal,
                    penetration: contact.penetration,
                    impact_velocity,
                });
                self.resolve_pair(key_a, key_b, &contact);
            }
        }
    }

    /// Push two overlapping bodies apart and exchange an impulse
    fn resolve_pair(&mut self, key_a: BodyKey, key_b: BodyKey, contact: &Contact) {
        let inv_a = self.bodies[key_a].inverse_mass();
        let inv_b = self.bodies[key_b].inverse_mass();
        let inv_sum = inv_a + inv_b;
        if inv_sum <= 0.0 {
            return;
        }
        let n = contact.normal;

        // Positional correction split by inverse mass
        let correction = n * (contact.penetration / inv_sum);
        self.bodies[key_a].apply_correction(-correction * inv_a);
        self.bodies[key_b].apply_correction(correction * inv_b);

        let combined = self.bodies[key_a].material.combine(&self.bodies[key_b].material);
        let va = self.bodies[key_a].velocity;
        let vb = self.bodies[key_b].velocity;

        let closing = (vb - va).dot(n);
        if closing >= 0.0 {
            // Already separating
            return;
        }

        let j = -(1.0 + combined.restitution) * closing / inv_sum;
        let va = va - n * (j * inv_a);
        let vb = vb + n * (j * inv_b);

        // Friction removes a share of the relative tangential velocity
        let rel = vb - va;
        let tangent = rel - n * rel.dot(n);
        let (va, vb) = if tangent.length() > 0.0001 {
            let jt = tangent * (combined.friction / inv_sum);
            (va + jt * inv_a, vb - jt * inv_b)
        } else {
            (va, vb)
        };

        self.bodies[key_a].velocity = va;
        self.bodies[key_b].velocity = vb;
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}
