use std::f32::consts::PI;

use super::{MassData, RayIntersection};
use crate::error::{PhysicsError, PhysicsResult};
use crate::math::{Bounds, Ray, Transform, Vec2};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub radius: f32,
}

impl Circle {
    /// Creates a circle.
    ///
    /// Panics if the radius is not finite and positive.
    pub fn new(radius: f32) -> Self {
        match Self::try_new(radius) {
            Ok(circle) => circle,
            Err(err) => panic!("{err}"),
        }
    }

    pub fn try_new(radius: f32) -> PhysicsResult<Self> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(PhysicsError::InvalidRadius(radius));
        }
        Ok(Self { radius })
    }

    pub fn local_bounds(&self) -> Bounds {
        Bounds::from_center(Vec2::ZERO, Vec2::new(self.radius, self.radius))
    }

    pub fn world_bounds(&self, transform: &Transform) -> Bounds {
        Bounds::from_center(transform.position, Vec2::new(self.radius, self.radius))
    }

    /// Mass and inertia of a solid disc about its center.
    pub fn compute_mass(&self, density: f32) -> MassData {
        let mass = PI * self.radius * self.radius * density;
        MassData {
            mass,
            inertia: 0.5 * mass * self.radius * self.radius,
        }
    }

    /// Nearest entry point of the ray into the circle. A ray starting inside
    /// reports no hit.
    pub fn raycast(&self, transform: &Transform, ray: &Ray, max_distance: f32) -> Option<RayIntersection> {
        let center = transform.position;
        let m = ray.origin - center;
        let b = m.dot(ray.direction);
        let c = m.magnitude_squared() - self.radius * self.radius;

        if c > 0.0 && b > 0.0 {
            return None;
        }
        let discriminant = b * b - c;
        if discriminant < 0.0 {
            return None;
        }

        let t = -b - discriminant.sqrt();
        if t < 0.0 || t > max_distance {
            return None;
        }

        let point = ray.point_at(t);
        Some(RayIntersection {
            point,
            normal: (point - center).normalize_or(-ray.direction),
            distance: t,
        })
    }
}
