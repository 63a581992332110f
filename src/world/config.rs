//! Configuration for a physics world.
//!
//! Every setting that affects a simulation lives on the world that runs it, so
//! several worlds with different settings can coexist.

use crate::collision::dynamic_tree::DEFAULT_MARGIN;
use crate::collision::BroadphaseMode;
use crate::error::{PhysicsError, PhysicsResult};
use crate::math::Vec2;

/// Settings of the sequential-impulse contact solver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverConfig {
    /// Impulse passes over all manifolds per step.
    pub iterations: usize,
    /// Fraction of the remaining penetration turned into separating velocity per second.
    pub bias_factor: f32,
    /// Penetration left uncorrected so resting contacts stay in touch.
    pub allowed_penetration: f32,
    /// Carry accumulated impulses from one step to the next.
    pub warm_starting: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            iterations: 7,
            bias_factor: 0.05,
            allowed_penetration: 0.01,
            warm_starting: true,
        }
    }
}

impl SolverConfig {
    /// Fewer iterations for large scenes that tolerate some jitter.
    #[must_use]
    pub fn fast() -> Self {
        Self {
            iterations: 4,
            ..Default::default()
        }
    }

    /// More iterations for tall stacks.
    #[must_use]
    pub fn high_accuracy() -> Self {
        Self {
            iterations: 20,
            allowed_penetration: 0.005,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    #[must_use]
    pub fn bias_factor(mut self, bias_factor: f32) -> Self {
        self.bias_factor = bias_factor;
        self
    }

    #[must_use]
    pub fn allowed_penetration(mut self, allowed_penetration: f32) -> Self {
        self.allowed_penetration = allowed_penetration;
        self
    }

    #[must_use]
    pub fn warm_starting(mut self, enabled: bool) -> Self {
        self.warm_starting = enabled;
        self
    }

    /// Validate the solver configuration.
    pub fn validate(&self) -> PhysicsResult<()> {
        if self.iterations == 0 {
            return Err(PhysicsError::invalid_config("iterations must be at least 1"));
        }
        if !self.bias_factor.is_finite() || !(0.0..=1.0).contains(&self.bias_factor) {
            return Err(PhysicsError::invalid_config("bias_factor must be between 0 and 1"));
        }
        if !self.allowed_penetration.is_finite() || self.allowed_penetration < 0.0 {
            return Err(PhysicsError::invalid_config("allowed_penetration cannot be negative"));
        }
        Ok(())
    }
}

/// Settings of a [`crate::PhysicsWorld`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldConfig {
    pub gravity: Vec2,
    /// Multiplier applied to every `dt` passed to `step`.
    pub time_scale: f32,
    /// Margin added around bodies in the broadphase tree.
    pub aabb_margin: f32,
    pub broadphase: BroadphaseMode,
    pub solver: SolverConfig,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            gravity: Vec2::new(0.0, -9.8),
            time_scale: 1.0,
            aabb_margin: DEFAULT_MARGIN,
            broadphase: BroadphaseMode::DynamicTree,
            solver: SolverConfig::default(),
        }
    }
}

impl WorldConfig {
    #[must_use]
    pub fn gravity(mut self, gravity: Vec2) -> Self {
        self.gravity = gravity;
        self
    }

    #[must_use]
    pub fn zero_gravity(mut self) -> Self {
        self.gravity = Vec2::ZERO;
        self
    }

    #[must_use]
    pub fn time_scale(mut self, time_scale: f32) -> Self {
        self.time_scale = time_scale;
        self
    }

    #[must_use]
    pub fn aabb_margin(mut self, margin: f32) -> Self {
        self.aabb_margin = margin;
        self
    }

    #[must_use]
    pub fn broadphase(mut self, mode: BroadphaseMode) -> Self {
        self.broadphase = mode;
        self
    }

    #[must_use]
    pub fn solver(mut self, solver: SolverConfig) -> Self {
        self.solver = solver;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> PhysicsResult<()> {
        if !self.gravity.is_finite() {
            return Err(PhysicsError::invalid_config("gravity must be finite"));
        }
        if !self.time_scale.is_finite() || self.time_scale < 0.0 {
            return Err(PhysicsError::invalid_config("time_scale must be finite and non-negative"));
        }
        if !self.aabb_margin.is_finite() || self.aabb_margin < 0.0 {
            return Err(PhysicsError::invalid_config("aabb_margin must be finite and non-negative"));
        }
        self.solver.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = WorldConfig::default();
        assert_eq!(config.gravity, Vec2::new(0.0, -9.8));
        assert_eq!(config.time_scale, 1.0);
        assert_eq!(config.aabb_margin, 0.2);
        assert_eq!(config.broadphase, BroadphaseMode::DynamicTree);
        assert_eq!(config.solver.iterations, 7);
        assert_eq!(config.solver.bias_factor, 0.05);
        assert_eq!(config.solver.allowed_penetration, 0.01);
        assert!(config.solver.warm_starting);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = WorldConfig::default()
            .zero_gravity()
            .time_scale(0.5)
            .broadphase(BroadphaseMode::BruteForce)
            .solver(SolverConfig::fast().warm_starting(false));
        assert_eq!(config.gravity, Vec2::ZERO);
        assert_eq!(config.time_scale, 0.5);
        assert_eq!(config.broadphase, BroadphaseMode::BruteForce);
        assert_eq!(config.solver.iterations, 4);
        assert!(!config.solver.warm_starting);
    }

    #[test]
    fn test_presets_are_valid() {
        assert!(SolverConfig::fast().validate().is_ok());
        assert!(SolverConfig::high_accuracy().validate().is_ok());
        assert!(SolverConfig::high_accuracy().iterations > SolverConfig::default().iterations);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(SolverConfig::default().iterations(0).validate().is_err());
        assert!(SolverConfig::default().bias_factor(1.5).validate().is_err());
        assert!(SolverConfig::default().allowed_penetration(-0.1).validate().is_err());
        assert!(WorldConfig::default().time_scale(f32::NAN).validate().is_err());
        assert!(WorldConfig::default().aabb_margin(-1.0).validate().is_err());

        let err = WorldConfig::default()
            .gravity(Vec2::new(0.0, f32::INFINITY))
            .validate()
            .unwrap_err();
        assert!(matches!(err, PhysicsError::InvalidConfig(_)));
    }
}
