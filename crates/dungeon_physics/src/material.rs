//! Surface properties used during collision response

use serde::{Deserialize, Serialize};

/// Friction and bounciness of a body's surface
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhysicsMaterial {
    /// Friction coefficient (0.0 = frictionless, 1.0 = no sliding)
    pub friction: f32,
    /// Restitution (0.0 = no bounce, 1.0 = perfect bounce)
    pub restitution: f32,
}

impl Default for PhysicsMaterial {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl PhysicsMaterial {
    /// Default contact material: moderate friction, no bounce
    pub const DEFAULT: Self = Self {
        friction: 0.3,
        restitution: 0.0,
    };

    /// Dungeon floor stone
    pub const STONE: Self = Self {
        friction: 0.7,
        restitution: 0.05,
    };

    /// Crates and props
    pub const WOOD: Self = Self {
        friction: 0.5,
        restitution: 0.2,
    };

    pub const RUBBER: Self = Self {
        friction: 0.9,
        restitution: 0.8,
    };

    pub const ICE: Self = Self {
        friction: 0.05,
        restitution: 0.1,
    };

    /// Create a material; both values are clamped to [0.0, 1.0]
    pub fn new(friction: f32, restitution: f32) -> Self {
        Self {
            friction: friction.clamp(0.0, 1.0),
            restitution: restitution.clamp(0.0, 1.0),
        }
    }

    /// Combine two surfaces in contact
    ///
    /// Friction uses the geometric mean, restitution the maximum.
    pub fn combine(&self, other: &Self) -> Self {
        Self {
            friction: (self.friction * other.friction).sqrt(),
            restitution: self.restitution.max(other.restitution),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_clamps() {
        let m = PhysicsMaterial::new(1.5, -0.2);
        assert_eq!(m.friction, 1.0);
        assert_eq!(m.restitution, 0.0);
    }

    #[test]
    fn test_combine() {
        let c = PhysicsMaterial::new(0.4, 0.1).combine(&PhysicsMaterial::new(0.9, 0.6));
        assert!((c.friction - 0.6).abs() < 0.0001);
        assert_eq!(c.restitution, 0.6);
    }

    #[test]
    fn test_combine_is_symmetric() {
        let a = PhysicsMaterial::STONE.combine(&PhysicsMaterial::RUBBER);
        let b = PhysicsMaterial::RUBBER.combine(&PhysicsMaterial::STONE);
        assert_eq!(a, b);
    }
}
