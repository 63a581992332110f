//! Defines physical material properties.

use crate::error::{PhysicsError, PhysicsResult};

/// Surface and bulk properties of a rigid body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    /// Friction coefficient. Range [0, infinity).
    /// Combined with the other body's coefficient by averaging.
    pub friction: f32,
    /// Mass per unit area.
    pub density: f32,
}

impl Material {
    /// Creates a new material. Friction is clamped to be non-negative.
    pub fn new(friction: f32, density: f32) -> PhysicsResult<Self> {
        Ok(Material {
            friction: friction.max(0.0),
            density: Self::check_density(density)?,
        })
    }

    /// Density must be finite and strictly positive.
    pub fn check_density(density: f32) -> PhysicsResult<f32> {
        if density.is_finite() && density > 0.0 {
            Ok(density)
        } else {
            Err(PhysicsError::InvalidDensity(density))
        }
    }

    /// Coefficient used for a contact between two materials.
    pub fn mix_friction(a: f32, b: f32) -> f32 {
        (a + b) * 0.5
    }
}

impl Default for Material {
    fn default() -> Self {
        Material {
            friction: 0.1,
            density: 1.0,
        }
    }
}
