//! Error types for shape construction and world configuration.

use thiserror::Error;

/// Errors reported at construction or configuration time.
///
/// Nothing inside a simulation step returns an error: numeric edge cases have
/// defined fallbacks instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PhysicsError {
    /// Circle radius is negative, zero, or not finite.
    #[error("Invalid circle radius: {0} (must be finite and positive)")]
    InvalidRadius(f32),

    /// Polygon has fewer than three vertices.
    #[error("Polygon needs at least 3 vertices, got {0}")]
    TooFewVertices(usize),

    /// A polygon vertex has a NaN or infinite coordinate.
    #[error("Polygon vertex {0} is not finite")]
    NonFiniteVertex(usize),

    /// Polygon encloses no area, or its vertices are wound clockwise.
    #[error("Polygon has signed area {0}; vertices must be counter-clockwise and non-degenerate")]
    DegeneratePolygon(f32),

    /// Two consecutive polygon vertices coincide.
    #[error("Polygon edge {0} has zero length")]
    ZeroLengthEdge(usize),

    /// The polygon turns clockwise at a vertex, so it is not convex.
    #[error("Polygon is not convex at vertex {0}")]
    NonConvexPolygon(usize),

    /// Density is zero, negative, or not finite.
    #[error("Invalid density: {0}")]
    InvalidDensity(f32),

    /// Time step is non-positive or not finite.
    #[error("Invalid timestep: {0}")]
    InvalidTimestep(f32),

    /// A configuration value is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The handle does not refer to a body in this world.
    #[error("Unknown body handle")]
    UnknownBody,
}

impl PhysicsError {
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}

/// Result type for fallible construction and configuration.
pub type PhysicsResult<T> = std::result::Result<T, PhysicsError>;
