use crate::collision::dynamic_tree::NodeId;
use crate::common::Material;
use crate::error::PhysicsResult;
use crate::math::{Bounds, Transform, Vec2};
use crate::shapes::Shape;

/// Rigid-body state: pose, velocity, accumulated forces and mass properties.
///
/// A body with zero inverse mass and zero inverse inertia is static. It is never
/// integrated and acts as an immovable object in the contact solver.
#[derive(Debug, Clone, PartialEq)]
pub struct RigidBody {
    // Geometry
    shape: Shape,
    pub(crate) transform: Transform,
    material: Material,

    pub linear_velocity: Vec2,
    pub angular_velocity: f32, // Radians per second

    // Accumulators for forces/torques applied during a time step
    pub force: Vec2,
    pub torque: f32,

    pub gravity_scale: f32,

    mass: f32,
    inv_mass: f32,    // 0.0 for static
    inertia: f32,     // About the center of mass
    inv_inertia: f32, // 0.0 for static

    /// Tight world bounds, refreshed by the world every step.
    bounds: Bounds,
    /// Leaf of this body in the broadphase tree while it belongs to a world.
    pub(crate) proxy: Option<NodeId>,
}

impl RigidBody {
    /// Creates a dynamic body with default material (density 1, friction 0.1).
    /// The shape's local origin is its center of mass, so `position` is the
    /// world position of the center of mass.
    pub fn new(shape: impl Into<Shape>, position: Vec2, rotation: f32) -> Self {
        let shape = shape.into();
        let transform = Transform::new(position, rotation);
        let bounds = shape.world_bounds(&transform);
        let mut body = Self {
            shape,
            transform,
            material: Material::default(),
            linear_velocity: Vec2::ZERO,
            angular_velocity: 0.0,
            force: Vec2::ZERO,
            torque: 0.0,
            gravity_scale: 1.0,
            mass: 0.0,
            inv_mass: 0.0,
            inertia: 0.0,
            inv_inertia: 0.0,
            bounds,
            proxy: None,
        };
        body.recompute_mass();
        body
    }

    /// Creates a static body (infinite mass and inertia).
    pub fn new_static(shape: impl Into<Shape>, position: Vec2, rotation: f32) -> Self {
        let mut body = Self::new(shape, position, rotation);
        body.set_static();
        body
    }

    #[must_use]
    pub fn with_friction(mut self, friction: f32) -> Self {
        self.material.friction = friction.max(0.0);
        self
    }

    #[must_use]
    pub fn with_gravity_scale(mut self, gravity_scale: f32) -> Self {
        self.gravity_scale = gravity_scale;
        self
    }

    #[must_use]
    pub fn with_velocity(mut self, linear: Vec2, angular: f32) -> Self {
        self.linear_velocity = linear;
        self.angular_velocity = angular;
        self
    }

    /// Changes density and recomputes mass properties. Static bodies stay static.
    pub fn with_density(mut self, density: f32) -> PhysicsResult<Self> {
        self.material.density = Material::check_density(density)?;
        if !self.is_static() {
            self.recompute_mass();
        }
        Ok(self)
    }

    /// Replaces friction and density in one go.
    pub fn with_material(self, material: Material) -> PhysicsResult<Self> {
        self.with_friction(material.friction).with_density(material.density)
    }

    fn recompute_mass(&mut self) {
        let mass_data = self.shape.compute_mass(self.material.density);
        self.mass = mass_data.mass;
        self.inv_mass = if mass_data.mass > 0.0 { 1.0 / mass_data.mass } else { 0.0 };
        self.inertia = mass_data.inertia;
        self.inv_inertia = if mass_data.inertia > 0.0 { 1.0 / mass_data.inertia } else { 0.0 };
    }

    /// Makes the body immovable and clears its motion.
    pub fn set_static(&mut self) {
        self.mass = 0.0;
        self.inv_mass = 0.0;
        self.inertia = 0.0;
        self.inv_inertia = 0.0;
        self.linear_velocity = Vec2::ZERO;
        self.angular_velocity = 0.0;
        self.clear_accumulators();
    }

    pub fn is_static(&self) -> bool {
        self.inv_mass == 0.0 && self.inv_inertia == 0.0
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn position(&self) -> Vec2 {
        self.transform.position
    }

    pub fn rotation(&self) -> f32 {
        self.transform.rotation()
    }

    /// Teleports the body. Bounds follow immediately; the broadphase catches up on the next step.
    pub fn set_position(&mut self, position: Vec2) {
        self.transform.position = position;
        self.update_bounds();
    }

    pub fn set_rotation(&mut self, radians: f32) {
        self.transform.set_rotation(radians);
        self.update_bounds();
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    pub fn inv_mass(&self) -> f32 {
        self.inv_mass
    }

    pub fn inertia(&self) -> f32 {
        self.inertia
    }

    pub fn inv_inertia(&self) -> f32 {
        self.inv_inertia
    }

    pub fn friction(&self) -> f32 {
        self.material.friction
    }

    pub fn material(&self) -> Material {
        self.material
    }

    /// Tight world-space bounds as of the last update.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn update_bounds(&mut self) {
        self.bounds = self.shape.world_bounds(&self.transform);
    }

    /// Applies a force at the center of mass.
    pub fn apply_force(&mut self, force: Vec2) {
        self.force += force;
    }

    /// Applies a force at a specific point (in world coordinates).
    /// This generates both linear force and torque.
    pub fn apply_force_at_point(&mut self, force: Vec2, point_world: Vec2) {
        self.force += force;
        let radius_vector = point_world - self.transform.position;
        self.torque += radius_vector.cross(force);
    }

    /// Applies an instantaneous impulse at `contact_arm` (world offset from the center of mass).
    pub fn apply_impulse(&mut self, impulse: Vec2, contact_arm: Vec2) {
        self.linear_velocity += impulse * self.inv_mass;
        self.angular_velocity += self.inv_inertia * contact_arm.cross(impulse);
    }

    /// Velocity of the material point at `contact_arm` from the center of mass.
    pub fn velocity_at(&self, contact_arm: Vec2) -> Vec2 {
        self.linear_velocity + Vec2::scalar_cross(self.angular_velocity, contact_arm)
    }

    /// Should typically be called after integration in each simulation step.
    pub fn clear_accumulators(&mut self) {
        self.force = Vec2::ZERO;
        self.torque = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PhysicsError;
    use crate::shapes::{Circle, Polygon};
    use approx::assert_relative_eq;
    use std::f32::consts::PI;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_rigidbody_new_circle() {
        let radius = 2.0;
        let rb = RigidBody::new(Circle::new(radius), Vec2::new(1.0, 2.0), 0.0);
        let expected_mass = PI * radius * radius;
        let expected_inertia = 0.5 * expected_mass * radius * radius;

        assert_relative_eq!(rb.mass(), expected_mass, epsilon = EPSILON);
        assert_relative_eq!(rb.inv_mass(), 1.0 / expected_mass, epsilon = EPSILON);
        assert_relative_eq!(rb.inertia(), expected_inertia, epsilon = 1e-4);
        assert_eq!(rb.position(), Vec2::new(1.0, 2.0));
        assert_eq!(rb.rotation(), 0.0);
        assert_eq!(rb.linear_velocity, Vec2::ZERO);
        assert_eq!(rb.angular_velocity, 0.0);
        assert_eq!(rb.friction(), 0.1);
        assert_eq!(rb.gravity_scale, 1.0);
        assert!(!rb.is_static());
        assert!(rb.proxy.is_none());
    }

    #[test]
    fn test_rigidbody_new_polygon() {
        let rb = RigidBody::new(Polygon::new_box(0.5, 0.5), Vec2::ZERO, 0.0)
            .with_density(2.0)
            .unwrap();
        let expected_mass = 2.0;
        let expected_inertia = expected_mass * (1.0 + 1.0) / 12.0;
        assert_relative_eq!(rb.mass(), expected_mass, epsilon = EPSILON);
        assert_relative_eq!(rb.inertia(), expected_inertia, epsilon = EPSILON);
        assert_relative_eq!(rb.inv_inertia(), 1.0 / expected_inertia, epsilon = 1e-3);
    }

    #[test]
    fn test_with_density_rejects_invalid() {
        let rb = RigidBody::new(Circle::new(1.0), Vec2::ZERO, 0.0);
        assert_eq!(rb.clone().with_density(0.0), Err(PhysicsError::InvalidDensity(0.0)));
        assert!(rb.clone().with_density(f32::NAN).is_err());
        // Same rule as a standalone material
        let material = Material { friction: 0.2, density: 0.0 };
        assert_eq!(rb.with_material(material), Err(PhysicsError::InvalidDensity(0.0)));
        assert!(Material::new(0.2, 0.0).is_err());
    }

    #[test]
    fn test_rigidbody_new_static() {
        let pos = Vec2::new(1.0, 2.0);
        let rb = RigidBody::new_static(Circle::new(1.0), pos, 0.5);
        assert!(rb.is_static());
        assert_eq!(rb.mass(), 0.0);
        assert_eq!(rb.inv_mass(), 0.0);
        assert_eq!(rb.inv_inertia(), 0.0);
        assert_eq!(rb.position(), pos);
        assert_eq!(rb.rotation(), 0.5);
    }

    #[test]
    fn test_static_ignores_density() {
        let rb = RigidBody::new_static(Circle::new(1.0), Vec2::ZERO, 0.0)
            .with_density(5.0)
            .unwrap();
        assert!(rb.is_static());
    }

    #[test]
    fn test_builders() {
        let rb = RigidBody::new(Circle::new(1.0), Vec2::ZERO, 0.0)
            .with_friction(0.7)
            .with_gravity_scale(0.0)
            .with_velocity(Vec2::new(1.0, 0.0), 2.0);
        assert_eq!(rb.friction(), 0.7);
        assert_eq!(rb.gravity_scale, 0.0);
        assert_eq!(rb.linear_velocity, Vec2::new(1.0, 0.0));
        assert_eq!(rb.angular_velocity, 2.0);
    }

    #[test]
    fn test_set_position_updates_bounds() {
        let mut rb = RigidBody::new(Polygon::new_box(1.0, 0.5), Vec2::ZERO, 0.0);
        rb.set_position(Vec2::new(10.0, 0.0));
        assert_eq!(rb.bounds().min, Vec2::new(9.0, -0.5));
        rb.set_rotation(PI / 2.0);
        assert_relative_eq!(rb.bounds().min.y, -1.0, epsilon = EPSILON);
        assert_relative_eq!(rb.transform().matrix().m00, 0.0, epsilon = EPSILON);
    }

    #[test]
    fn test_apply_force() {
        let mut rb = RigidBody::new(Circle::new(1.0), Vec2::ZERO, 0.0);
        rb.apply_force(Vec2::new(10.0, 0.0));
        rb.apply_force(Vec2::new(0.0, 5.0));
        assert!((rb.force.x - 10.0).abs() < EPSILON);
        assert!((rb.force.y - 5.0).abs() < EPSILON);
        assert!((rb.torque - 0.0).abs() < EPSILON); // No torque from force at CoM
    }

    #[test]
    fn test_apply_force_at_point() {
        let mut rb = RigidBody::new(Circle::new(1.0), Vec2::new(5.0, 5.0), 0.0);
        let force = Vec2::new(0.0, 10.0); // Upward force
        let point_world = Vec2::new(6.0, 5.0); // Apply 1 unit right of CoM
        rb.apply_force_at_point(force, point_world);

        assert!((rb.force.y - 10.0).abs() < EPSILON);
        // r = (1,0), torque = r x F = 1*10 - 0*0 = 10
        assert!((rb.torque - 10.0).abs() < EPSILON);
    }

    #[test]
    fn test_apply_impulse() {
        let mut rb = RigidBody::new(Polygon::new_box(0.5, 0.5), Vec2::ZERO, 0.0);
        let inv_mass = rb.inv_mass();
        let inv_inertia = rb.inv_inertia();
        rb.apply_impulse(Vec2::new(0.0, 2.0), Vec2::new(0.5, 0.0));
        assert_relative_eq!(rb.linear_velocity.y, 2.0 * inv_mass, epsilon = EPSILON);
        assert_relative_eq!(rb.angular_velocity, inv_inertia * 1.0, epsilon = 1e-4);

        let mut wall = RigidBody::new_static(Circle::new(1.0), Vec2::ZERO, 0.0);
        wall.apply_impulse(Vec2::new(100.0, 0.0), Vec2::new(0.0, 1.0));
        assert_eq!(wall.linear_velocity, Vec2::ZERO);
        assert_eq!(wall.angular_velocity, 0.0);
    }

    #[test]
    fn test_velocity_at() {
        let rb = RigidBody::new(Circle::new(1.0), Vec2::ZERO, 0.0).with_velocity(Vec2::new(1.0, 0.0), 2.0);
        // w x r with r = (0,1) is (-2, 0)
        let v = rb.velocity_at(Vec2::new(0.0, 1.0));
        assert_relative_eq!(v.x, -1.0, epsilon = EPSILON);
        assert_relative_eq!(v.y, 0.0, epsilon = EPSILON);
    }

    #[test]
    fn test_clear_accumulators() {
        let mut rb = RigidBody::new(Circle::new(1.0), Vec2::ZERO, 0.0);
        rb.apply_force(Vec2::new(1.0, 1.0));
        rb.torque = 5.0;
        rb.clear_accumulators();
        assert_eq!(rb.force, Vec2::ZERO);
        assert_eq!(rb.torque, 0.0);
    }
}
