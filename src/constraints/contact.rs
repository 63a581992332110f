//! Non-penetration and friction constraints of a contact manifold.

use super::{get_mutable_body_pair, Constraint};
use crate::collision::Manifold;
use crate::common::Material;
use crate::math::vec2::Vec2;
use crate::objects::BodyMap;
use crate::world::SolverConfig;

impl Constraint for Manifold {
    fn pre_step(&mut self, bodies: &mut BodyMap, inv_dt: f32, config: &SolverConfig) {
        let Some((body_a, body_b)) = get_mutable_body_pair(bodies, self.body_a(), self.body_b()) else {
            return;
        };
        if body_a.is_static() && body_b.is_static() {
            return;
        }

        let normal = self.normal;
        let tangent = normal.cross_scalar(1.0);
        let inv_mass_sum = body_a.inv_mass() + body_b.inv_mass();

        for contact in self.contacts_mut() {
            let r1 = contact.position - body_a.position();
            let r2 = contact.position - body_b.position();

            // Effective mass along an axis: linear response plus angular response of both bodies
            let effective_mass = |axis: Vec2| {
                let r1n = r1.dot(axis);
                let r2n = r2.dot(axis);
                let k = inv_mass_sum
                    + body_a.inv_inertia() * (r1.dot(r1) - r1n * r1n)
                    + body_b.inv_inertia() * (r2.dot(r2) - r2n * r2n);
                if k > 0.0 {
                    1.0 / k
                } else {
                    0.0
                }
            };
            contact.normal_mass = effective_mass(normal);
            contact.tangent_mass = effective_mass(tangent);

            contact.bias =
                config.bias_factor * inv_dt * (contact.penetration - config.allowed_penetration).max(0.0);

            // Warm start
            let impulse = normal * contact.normal_impulse + tangent * contact.tangent_impulse;
            body_a.apply_impulse(-impulse, r1);
            body_b.apply_impulse(impulse, r2);
        }
    }

    fn apply_impulse(&mut self, bodies: &mut BodyMap) {
        let Some((body_a, body_b)) = get_mutable_body_pair(bodies, self.body_a(), self.body_b()) else {
            return;
        };
        if body_a.is_static() && body_b.is_static() {
            return;
        }

        let normal = self.normal;
        let tangent = normal.cross_scalar(1.0).normalize_or(Vec2::UNIT_X);
        let mu = Material::mix_friction(body_a.friction(), body_b.friction());

        for contact in self.contacts_mut() {
            let ra = contact.position - body_a.position();
            let rb = contact.position - body_b.position();

            // Normal impulse, accumulated value kept non-negative
            let relative_velocity = body_b.velocity_at(rb) - body_a.velocity_at(ra);
            let j = (-relative_velocity.dot(normal) + contact.bias) * contact.normal_mass;
            let previous = contact.normal_impulse;
            contact.normal_impulse = (previous + j).max(0.0);
            let pn = normal * (contact.normal_impulse - previous);
            body_a.apply_impulse(-pn, ra);
            body_b.apply_impulse(pn, rb);

            // Friction, clamped by the updated normal impulse
            let relative_velocity = body_b.velocity_at(rb) - body_a.velocity_at(ra);
            let jt = -relative_velocity.dot(tangent) * contact.tangent_mass;
            let max_friction = contact.normal_impulse * mu;
            let previous = contact.tangent_impulse;
            contact.tangent_impulse = (previous + jt).clamp(-max_friction, max_friction);
            let pt = tangent * (contact.tangent_impulse - previous);
            body_a.apply_impulse(-pt, ra);
            body_b.apply_impulse(pt, rb);
        }
    }
}
