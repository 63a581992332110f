//! Velocity constraints solved by sequential impulses.

use crate::objects::{BodyHandle, BodyMap, RigidBody};
use crate::world::SolverConfig;

pub mod contact;

/// A velocity constraint between bodies of a world.
///
/// The solver calls `pre_step` once per step and then `apply_impulse`
/// `iterations` times, visiting constraints in the same order every pass.
pub trait Constraint {
    /// Computes effective masses and bias, and re-applies warm-start impulses.
    fn pre_step(&mut self, bodies: &mut BodyMap, inv_dt: f32, config: &SolverConfig);

    /// Applies one corrective impulse per contact.
    fn apply_impulse(&mut self, bodies: &mut BodyMap);
}

/// Mutable references to two distinct bodies. `None` if either handle is stale
/// or both handles are the same.
pub(crate) fn get_mutable_body_pair(
    bodies: &mut BodyMap,
    a: BodyHandle,
    b: BodyHandle,
) -> Option<(&mut RigidBody, &mut RigidBody)> {
    let [body_a, body_b] = bodies.get_disjoint_mut([a, b])?;
    Some((body_a, body_b))
}
