use std::ops::Mul;

use super::vec2::Vec2;

/// A 2x2 matrix, used here only as a rotation.
///
/// The transpose of a rotation is its inverse, so world-to-local conversion is
/// `m.transpose() * v`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat2 {
    pub m00: f32,
    pub m01: f32,
    pub m10: f32,
    pub m11: f32,
}

impl Mat2 {
    pub const IDENTITY: Mat2 = Mat2 {
        m00: 1.0,
        m01: 0.0,
        m10: 0.0,
        m11: 1.0,
    };

    pub const fn new(m00: f32, m01: f32, m10: f32, m11: f32) -> Self {
        Self { m00, m01, m10, m11 }
    }

    /// Rotation matrix for a counter-clockwise angle in radians.
    pub fn from_angle(radians: f32) -> Self {
        let (sin, cos) = radians.sin_cos();
        Self::new(cos, -sin, sin, cos)
    }

    pub fn transpose(self) -> Self {
        Self::new(self.m00, self.m10, self.m01, self.m11)
    }

    /// Multiplies `transpose(self) * v` without building the transpose.
    pub fn transpose_mul(self, v: Vec2) -> Vec2 {
        Vec2::new(
            self.m00 * v.x + self.m10 * v.y,
            self.m01 * v.x + self.m11 * v.y,
        )
    }
}

impl Default for Mat2 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul<Vec2> for Mat2 {
    type Output = Vec2;

    fn mul(self, v: Vec2) -> Vec2 {
        Vec2::new(
            self.m00 * v.x + self.m01 * v.y,
            self.m10 * v.x + self.m11 * v.y,
        )
    }
}

impl Mul for Mat2 {
    type Output = Mat2;

    fn mul(self, b: Mat2) -> Mat2 {
        Mat2::new(
            self.m00 * b.m00 + self.m01 * b.m10,
            self.m00 * b.m01 + self.m01 * b.m11,
            self.m10 * b.m00 + self.m11 * b.m10,
            self.m10 * b.m01 + self.m11 * b.m11,
        )
    }
}
