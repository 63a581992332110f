use super::mat2::Mat2;
use super::vec2::Vec2;

/// Rigid transform: translation plus rotation, with the rotation matrix cached.
///
/// `rotation` is kept private so the cached matrix can never go stale; use
/// [`Transform::set_rotation`] to change it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec2,
    rotation: f32, // Angle in radians
    matrix: Mat2,
}

impl Transform {
    /// Creates a new transform.
    pub fn new(position: Vec2, rotation: f32) -> Self {
        Self {
            position,
            rotation,
            matrix: Mat2::from_angle(rotation),
        }
    }

    /// Creates an identity transform (no translation, no rotation).
    pub fn identity() -> Self {
        Self {
            position: Vec2::ZERO,
            rotation: 0.0,
            matrix: Mat2::IDENTITY,
        }
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn matrix(&self) -> Mat2 {
        self.matrix
    }

    pub fn set_rotation(&mut self, radians: f32) {
        self.rotation = radians;
        self.matrix = Mat2::from_angle(radians);
    }

    /// Applies the transform (rotation then translation) to a point.
    pub fn apply(&self, point: Vec2) -> Vec2 {
        self.matrix * point + self.position
    }

    /// Applies the inverse transform (inverse translation then inverse rotation) to a point.
    pub fn apply_inverse(&self, point: Vec2) -> Vec2 {
        self.matrix.transpose_mul(point - self.position)
    }

    /// Rotates a local direction into world space. Translation is ignored.
    pub fn rotate(&self, direction: Vec2) -> Vec2 {
        self.matrix * direction
    }

    /// Rotates a world direction into local space.
    pub fn inverse_rotate(&self, direction: Vec2) -> Vec2 {
        self.matrix.transpose_mul(direction)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;
    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_transform_identity() {
        let t = Transform::identity();
        assert_eq!(t.position, Vec2::ZERO);
        assert!(t.rotation().abs() < EPSILON);
        let p = Vec2::new(5.0, -3.0);
        assert_eq!(t.apply(p), p);
        assert_eq!(t.apply_inverse(p), p);
    }

    #[test]
    fn test_transform_apply_translation() {
        let t = Transform::new(Vec2::new(10.0, 5.0), 0.0);
        let tp = t.apply(Vec2::new(1.0, 2.0));
        assert!((tp.x - 11.0).abs() < EPSILON);
        assert!((tp.y - 7.0).abs() < EPSILON);
    }

    #[test]
    fn test_transform_apply_combined() {
        // Rotate (1,0) by 90 degrees to (0,1), then translate by (10,5)
        let t = Transform::new(Vec2::new(10.0, 5.0), PI / 2.0);
        let tp = t.apply(Vec2::new(1.0, 0.0));
        assert!((tp.x - 10.0).abs() < EPSILON);
        assert!((tp.y - 6.0).abs() < EPSILON);
    }

    #[test]
    fn test_transform_apply_inverse_combined() {
        let t = Transform::new(Vec2::new(10.0, 5.0), PI / 4.0);
        let p_local = Vec2::new(1.0, 1.0);
        let p_local_again = t.apply_inverse(t.apply(p_local));
        assert!((p_local_again.x - p_local.x).abs() < EPSILON);
        assert!((p_local_again.y - p_local.y).abs() < EPSILON);
    }

    #[test]
    fn test_transform_directions_ignore_translation() {
        let t = Transform::new(Vec2::new(100.0, -50.0), PI / 2.0);
        let d = t.rotate(Vec2::UNIT_X);
        assert!(d.x.abs() < EPSILON);
        assert!((d.y - 1.0).abs() < EPSILON);
        let back = t.inverse_rotate(d);
        assert!((back.x - 1.0).abs() < EPSILON);
        assert!(back.y.abs() < EPSILON);
    }

    #[test]
    fn test_set_rotation_refreshes_matrix() {
        let mut t = Transform::identity();
        t.set_rotation(PI);
        let p = t.apply(Vec2::new(1.0, 0.0));
        assert!((p.x + 1.0).abs() < EPSILON);
        assert_eq!(t.matrix(), Mat2::from_angle(PI));
    }
}
