//! Semi-implicit Euler integration, split around the contact solver.
//!
//! Forces are integrated into velocities before contacts are solved, and the
//! corrected velocities are integrated into positions afterwards.

use crate::math::Vec2;
use crate::objects::rigid_body::RigidBody;

/// Integrates gravity and accumulated forces into velocity, then clears the accumulators.
pub fn integrate_forces(body: &mut RigidBody, gravity: Vec2, dt: f32) {
    if body.is_static() {
        // Static object, do not integrate
        return;
    }

    // a = g * scale + F / m
    let linear_acceleration = gravity * body.gravity_scale + body.force * body.inv_mass();
    body.linear_velocity += linear_acceleration * dt;

    let angular_acceleration = body.torque * body.inv_inertia();
    body.angular_velocity += angular_acceleration * dt;

    body.clear_accumulators();
}

/// Moves the body along its current velocity.
pub fn integrate_velocity(body: &mut RigidBody, dt: f32) {
    if body.is_static() {
        return;
    }

    body.transform.position += body.linear_velocity * dt;
    let rotation = wrap_angle(body.rotation() + body.angular_velocity * dt);
    body.transform.set_rotation(rotation);
}

/// Wraps an angle in radians to the range [-PI, PI].
pub fn wrap_angle(angle: f32) -> f32 {
    angle.sin().atan2(angle.cos())
}
