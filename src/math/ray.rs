use super::vec2::Vec2;

/// A half-line from `origin` along a unit `direction`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec2,
    pub direction: Vec2,
}

impl Ray {
    /// Creates a ray. The direction is normalized; a zero direction falls back to +x.
    pub fn new(origin: Vec2, direction: Vec2) -> Self {
        Self {
            origin,
            direction: direction.normalize_or(Vec2::UNIT_X),
        }
    }

    /// Point at distance `t` along the ray.
    pub fn point_at(&self, t: f32) -> Vec2 {
        self.origin + self.direction * t
    }

    /// Distance along the ray to segment `a`-`b`, if it is crossed within `max_distance`.
    /// Parallel segments never report a hit.
    pub fn intersect_segment(&self, a: Vec2, b: Vec2, max_distance: f32) -> Option<f32> {
        let edge = b - a;
        let denom = self.direction.cross(edge);
        if denom.abs() < f32::EPSILON {
            return None;
        }

        let to_a = a - self.origin;
        let t = to_a.cross(edge) / denom;
        let s = to_a.cross(self.direction) / denom;

        if t >= 0.0 && t <= max_distance && (0.0..=1.0).contains(&s) {
            Some(t)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_direction_is_normalized() {
        let ray = Ray::new(Vec2::ZERO, Vec2::new(3.0, 4.0));
        assert_relative_eq!(ray.direction.magnitude(), 1.0, epsilon = 1e-6);
        assert_eq!(Ray::new(Vec2::ZERO, Vec2::ZERO).direction, Vec2::UNIT_X);
    }

    #[test]
    fn test_intersect_segment_crossing() {
        let ray = Ray::new(Vec2::ZERO, Vec2::UNIT_X);
        let t = ray
            .intersect_segment(Vec2::new(3.0, -1.0), Vec2::new(3.0, 1.0), 10.0)
            .unwrap();
        assert_relative_eq!(t, 3.0, epsilon = 1e-6);
        assert_relative_eq!(ray.point_at(t).x, 3.0, epsilon = 1e-6);
    }

    #[test]
    fn test_intersect_segment_rejects_out_of_range() {
        let ray = Ray::new(Vec2::ZERO, Vec2::UNIT_X);
        // Too far
        assert!(ray
            .intersect_segment(Vec2::new(3.0, -1.0), Vec2::new(3.0, 1.0), 2.0)
            .is_none());
        // Behind the origin
        assert!(ray
            .intersect_segment(Vec2::new(-3.0, -1.0), Vec2::new(-3.0, 1.0), 10.0)
            .is_none());
        // Misses the segment's extent
        assert!(ray
            .intersect_segment(Vec2::new(3.0, 1.0), Vec2::new(3.0, 2.0), 10.0)
            .is_none());
        // Parallel
        assert!(ray
            .intersect_segment(Vec2::new(0.0, 1.0), Vec2::new(5.0, 1.0), 10.0)
            .is_none());
    }
}
