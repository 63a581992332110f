//! Axis-aligned bounding boxes.

use super::ray::Ray;
use super::vec2::Vec2;

/// An axis-aligned box defined by its minimum and maximum corner points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl Bounds {
    /// Creates a new box. Corners are reordered so that `min <= max` per axis.
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Bounds {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// Box of half extent `half` around `center`.
    pub fn from_center(center: Vec2, half: Vec2) -> Self {
        Bounds::new(center - half, center + half)
    }

    /// Creates a box that encompasses a set of points.
    pub fn from_points(points: &[Vec2]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut bounds = Bounds { min: *first, max: *first };
        for point in rest {
            bounds.min = bounds.min.min(*point);
            bounds.max = bounds.max.max(*point);
        }
        Some(bounds)
    }

    /// Area of the box. Named after the quantity the tree minimises when choosing
    /// where to insert.
    pub fn volume(&self) -> f32 {
        ((self.max.x - self.min.x) * (self.max.y - self.min.y)).abs()
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Smallest box containing both boxes.
    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// True when `other` lies entirely inside this box (edges may touch).
    pub fn contains(&self, other: &Bounds) -> bool {
        self.min.x <= other.min.x
            && self.min.y <= other.min.y
            && self.max.x >= other.max.x
            && self.max.y >= other.max.y
    }

    /// Grows the box by `margin` on every side.
    pub fn fatten(&self, margin: f32) -> Bounds {
        let m = Vec2::new(margin, margin);
        Bounds {
            min: self.min - m,
            max: self.max + m,
        }
    }

    /// Inclusive overlap test: boxes that only touch still overlap.
    pub fn overlaps(&self, other: &Bounds) -> bool {
        if self.max.x < other.min.x || self.min.x > other.max.x {
            return false;
        }
        if self.max.y < other.min.y || self.min.y > other.max.y {
            return false;
        }
        true
    }

    /// Slab test. Returns true when the ray enters the box within `[0, max_distance]`
    /// (a ray starting inside the box counts).
    pub fn raycast(&self, ray: &Ray, max_distance: f32) -> bool {
        let mut t_min = 0.0_f32;
        let mut t_max = max_distance;

        for (origin, dir, lo, hi) in [
            (ray.origin.x, ray.direction.x, self.min.x, self.max.x),
            (ray.origin.y, ray.direction.y, self.min.y, self.max.y),
        ] {
            if dir.abs() < f32::EPSILON {
                // Parallel to this slab: must already be between its planes
                if origin < lo || origin > hi {
                    return false;
                }
                continue;
            }
            let inv = 1.0 / dir;
            let t1 = (lo - origin) * inv;
            let t2 = (hi - origin) * inv;
            t_min = t_min.max(t1.min(t2));
            t_max = t_max.min(t1.max(t2));
            if t_min > t_max {
                return false;
            }
        }
        true
    }
}
