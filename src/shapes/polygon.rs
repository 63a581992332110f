use super::{MassData, RayIntersection};
use crate::error::{PhysicsError, PhysicsResult};
use crate::math::{Bounds, Ray, Transform, Vec2};

/// Represents a convex polygon shape defined by its vertices in local space.
///
/// Vertices are counter-clockwise and re-centered at construction so the
/// centroid sits on the local origin. `normals[i]` is the outward normal of the
/// edge from `vertices[i]` to `vertices[i + 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    vertices: Vec<Vec2>,
    normals: Vec<Vec2>,
}

impl Polygon {
    /// Creates a new polygon from counter-clockwise vertices.
    ///
    /// Panics on fewer than 3 vertices, non-finite coordinates, repeated
    /// consecutive vertices, or a clockwise, zero-area or non-convex outline.
    pub fn new(vertices: Vec<Vec2>) -> Self {
        match Self::try_new(vertices) {
            Ok(polygon) => polygon,
            Err(err) => panic!("{err}"),
        }
    }

    pub fn try_new(mut vertices: Vec<Vec2>) -> PhysicsResult<Self> {
        if vertices.len() < 3 {
            return Err(PhysicsError::TooFewVertices(vertices.len()));
        }
        if let Some(index) = vertices.iter().position(|v| !v.is_finite()) {
            return Err(PhysicsError::NonFiniteVertex(index));
        }

        let n = vertices.len();
        let edge = |i: usize| vertices[(i + 1) % n] - vertices[i];
        if let Some(index) = (0..n).find(|&i| edge(i).magnitude_squared() <= f32::EPSILON * f32::EPSILON) {
            return Err(PhysicsError::ZeroLengthEdge(index));
        }

        let area = signed_area(&vertices);
        if !(area > 1e-8) {
            return Err(PhysicsError::DegeneratePolygon(area));
        }

        // Every turn must be counter-clockwise; straight runs are allowed
        let reflex = (0..n).find(|&i| {
            let (e0, e1) = (edge(i), edge((i + 1) % n));
            e0.cross(e1) < -1e-6 * e0.magnitude() * e1.magnitude()
        });
        if let Some(i) = reflex {
            return Err(PhysicsError::NonConvexPolygon((i + 1) % n));
        }

        let centroid = calculate_centroid(&vertices, area);
        for v in vertices.iter_mut() {
            *v -= centroid;
        }

        let normals = edge_normals(&vertices);
        Ok(Polygon { vertices, normals })
    }

    /// Axis-aligned box with the given half extents, centered on the origin.
    pub fn new_box(half_width: f32, half_height: f32) -> Self {
        match Self::try_new_box(half_width, half_height) {
            Ok(polygon) => polygon,
            Err(err) => panic!("{err}"),
        }
    }

    pub fn try_new_box(half_width: f32, half_height: f32) -> PhysicsResult<Self> {
        Self::try_new(vec![
            Vec2::new(-half_width, -half_height),
            Vec2::new(half_width, -half_height),
            Vec2::new(half_width, half_height),
            Vec2::new(-half_width, half_height),
        ])
    }

    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }

    pub fn normals(&self) -> &[Vec2] {
        &self.normals
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Vertex `i`, wrapping around.
    pub fn vertex(&self, i: usize) -> Vec2 {
        self.vertices[i % self.vertices.len()]
    }

    /// Calculates the area of the polygon using the Shoelace formula.
    pub fn area(&self) -> f32 {
        signed_area(&self.vertices)
    }

    /// Furthest vertex along `direction`, in local space.
    pub fn support_point(&self, direction: Vec2) -> Vec2 {
        let mut support = self.vertices[0];
        let mut max_projection = support.dot(direction);
        for &vertex in &self.vertices[1..] {
            let projection = vertex.dot(direction);
            if projection > max_projection {
                max_projection = projection;
                support = vertex;
            }
        }
        support
    }

    pub fn local_bounds(&self) -> Bounds {
        let mut bounds = Bounds { min: self.vertices[0], max: self.vertices[0] };
        for &v in &self.vertices[1..] {
            bounds.min = bounds.min.min(v);
            bounds.max = bounds.max.max(v);
        }
        bounds
    }

    pub fn world_bounds(&self, transform: &Transform) -> Bounds {
        let first = transform.rotate(self.vertices[0]);
        let mut bounds = Bounds { min: first, max: first };
        for &v in &self.vertices[1..] {
            let rotated = transform.rotate(v);
            bounds.min = bounds.min.min(rotated);
            bounds.max = bounds.max.max(rotated);
        }
        bounds.min += transform.position;
        bounds.max += transform.position;
        bounds
    }

    /// Mass and inertia about the centroid. Vertices are already centered, so the
    /// origin formula gives the centroidal inertia directly.
    pub fn compute_mass(&self, density: f32) -> MassData {
        let n = self.vertices.len();
        let mut inertia_sum = 0.0;
        for i in 0..n {
            let v1 = self.vertices[i];
            let v2 = self.vertices[(i + 1) % n];
            let cross_prod = v1.cross(v2);
            inertia_sum += cross_prod * (v1.magnitude_squared() + v1.dot(v2) + v2.magnitude_squared());
        }

        MassData {
            mass: self.area() * density,
            inertia: (inertia_sum / 12.0 * density).max(0.0),
        }
    }

    /// Nearest edge crossed by the ray. A ray starting inside reports no hit.
    pub fn raycast(&self, transform: &Transform, ray: &Ray, max_distance: f32) -> Option<RayIntersection> {
        let local_origin = transform.apply_inverse(ray.origin);
        let inside = self
            .vertices
            .iter()
            .zip(&self.normals)
            .all(|(&v, &n)| n.dot(local_origin - v) <= 0.0);
        if inside {
            return None;
        }

        let n = self.vertices.len();
        let mut best: Option<RayIntersection> = None;
        for i in 0..n {
            let a = transform.apply(self.vertices[i]);
            let b = transform.apply(self.vertices[(i + 1) % n]);
            let Some(t) = ray.intersect_segment(a, b, max_distance) else {
                continue;
            };
            if best.map_or(true, |hit| t < hit.distance) {
                best = Some(RayIntersection {
                    point: ray.point_at(t),
                    normal: transform.rotate(self.normals[i]),
                    distance: t,
                });
            }
        }
        best
    }
}

fn signed_area(vertices: &[Vec2]) -> f32 {
    let n = vertices.len();
    let mut area = 0.0;
    for i in 0..n {
        area += vertices[i].cross(vertices[(i + 1) % n]);
    }
    area / 2.0
}

/// Area-weighted centroid, fanned from the first vertex.
fn calculate_centroid(vertices: &[Vec2], area: f32) -> Vec2 {
    let origin = vertices[0];
    let mut centroid = Vec2::ZERO;

    for i in 1..(vertices.len() - 1) {
        let v2 = vertices[i];
        let v3 = vertices[i + 1];
        let triangle_area = (v2 - origin).cross(v3 - origin) / 2.0;
        centroid += (origin + v2 + v3) / 3.0 * triangle_area;
    }

    centroid / area
}

/// Outward normals for counter-clockwise edges.
fn edge_normals(vertices: &[Vec2]) -> Vec<Vec2> {
    let n = vertices.len();
    (0..n)
        .map(|i| {
            let edge = vertices[(i + 1) % n] - vertices[i];
            edge.cross_scalar(1.0).normalize()
        })
        .collect()
}
