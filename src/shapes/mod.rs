pub mod circle;
pub mod polygon;

// Re-export the specific shape types
pub use circle::Circle;
pub use polygon::Polygon;

use crate::math::{Bounds, Ray, Transform, Vec2};

/// Mass properties of a shape at a given density.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MassData {
    pub mass: f32,
    /// Rotational inertia about the shape's local origin (its centroid).
    pub inertia: f32,
}

/// Exact hit of a ray against a single shape, in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayIntersection {
    pub point: Vec2,
    pub normal: Vec2,
    pub distance: f32,
}

/// Enum representing the geometric shape of a rigid body.
///
/// Cloning a shape gives an independent copy, so one definition can seed any
/// number of bodies.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Circle(Circle),
    Polygon(Polygon),
}

impl Shape {
    pub fn local_bounds(&self) -> Bounds {
        match self {
            Shape::Circle(c) => c.local_bounds(),
            Shape::Polygon(p) => p.local_bounds(),
        }
    }

    pub fn world_bounds(&self, transform: &Transform) -> Bounds {
        match self {
            Shape::Circle(c) => c.world_bounds(transform),
            Shape::Polygon(p) => p.world_bounds(transform),
        }
    }

    pub fn compute_mass(&self, density: f32) -> MassData {
        match self {
            Shape::Circle(c) => c.compute_mass(density),
            Shape::Polygon(p) => p.compute_mass(density),
        }
    }

    /// Furthest local-space point along a local-space direction.
    pub fn support_point(&self, direction: Vec2) -> Vec2 {
        match self {
            Shape::Circle(c) => direction.normalize_or(Vec2::UNIT_X) * c.radius,
            Shape::Polygon(p) => p.support_point(direction),
        }
    }

    pub fn raycast(&self, transform: &Transform, ray: &Ray, max_distance: f32) -> Option<RayIntersection> {
        match self {
            Shape::Circle(c) => c.raycast(transform, ray, max_distance),
            Shape::Polygon(p) => p.raycast(transform, ray, max_distance),
        }
    }
}

impl From<Circle> for Shape {
    fn from(circle: Circle) -> Self {
        Shape::Circle(circle)
    }
}

impl From<Polygon> for Shape {
    fn from(polygon: Polygon) -> Self {
        Shape::Polygon(polygon)
    }
}
