//! Exact contact generation for each ordered pair of shape kinds.
//!
//! Every routine works in world space and reports the normal pointing from the
//! first shape toward the second.

use crate::math::{Transform, Vec2};
use crate::shapes::{Circle, Polygon, Shape};

/// Relative and absolute tolerance used when choosing the reference face, so
/// near-equal penetrations do not flip the face from one step to the next.
const BIAS_RELATIVE: f32 = 0.95;
const BIAS_ABSOLUTE: f32 = 0.01;

/// One point of contact in world space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ContactPoint {
    pub position: Vec2,
    /// Depth of overlap along the normal, positive when penetrating.
    pub penetration: f32,
}

/// Output of the narrow phase for one pair: a normal and one or two points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactGeometry {
    pub normal: Vec2,
    points: [ContactPoint; 2],
    count: usize,
}

impl ContactGeometry {
    fn single(normal: Vec2, point: ContactPoint) -> Self {
        Self {
            normal,
            points: [point, ContactPoint::default()],
            count: 1,
        }
    }

    pub fn points(&self) -> &[ContactPoint] {
        &self.points[..self.count]
    }

    pub fn count(&self) -> usize {
        self.count
    }

    fn flipped(mut self) -> Self {
        self.normal = -self.normal;
        self
    }
}

/// Computes contact geometry between two posed shapes, or `None` when they do
/// not touch.
pub fn collide(shape_a: &Shape, xf_a: &Transform, shape_b: &Shape, xf_b: &Transform) -> Option<ContactGeometry> {
    match (shape_a, shape_b) {
        (Shape::Circle(a), Shape::Circle(b)) => check_circle_circle(a, xf_a, b, xf_b),
        (Shape::Circle(a), Shape::Polygon(b)) => check_circle_polygon(a, xf_a, b, xf_b),
        (Shape::Polygon(a), Shape::Circle(b)) => check_circle_polygon(b, xf_b, a, xf_a).map(ContactGeometry::flipped),
        (Shape::Polygon(a), Shape::Polygon(b)) => check_polygon_polygon(a, xf_a, b, xf_b),
    }
}

/// Checks for collision between two circles.
pub fn check_circle_circle(a: &Circle, xf_a: &Transform, b: &Circle, xf_b: &Transform) -> Option<ContactGeometry> {
    let dist_vec = xf_b.position - xf_a.position;
    let radii_sum = a.radius + b.radius;

    if dist_vec.magnitude_squared() > radii_sum * radii_sum {
        return None;
    }

    let distance = dist_vec.magnitude();
    let geometry = if distance != 0.0 {
        let normal = dist_vec * (1.0 / distance);
        ContactGeometry::single(
            normal,
            ContactPoint {
                position: xf_a.position + normal * a.radius,
                penetration: radii_sum - distance,
            },
        )
    } else {
        // Concentric: pick a fixed axis
        ContactGeometry::single(
            Vec2::UNIT_Y,
            ContactPoint {
                position: xf_a.position,
                penetration: a.radius,
            },
        )
    };
    Some(geometry)
}

/// Checks for collision between a circle (first) and a polygon (second).
pub fn check_circle_polygon(
    circle: &Circle,
    xf_c: &Transform,
    polygon: &Polygon,
    xf_p: &Transform,
) -> Option<ContactGeometry> {
    let radius = circle.radius;
    let center = xf_p.apply_inverse(xf_c.position);
    let vertices = polygon.vertices();
    let normals = polygon.normals();

    // Edge of greatest separation from the center
    let mut separation = f32::MIN;
    let mut face = 0;
    for (i, (&v, &n)) in vertices.iter().zip(normals).enumerate() {
        let s = n.dot(center - v);
        if s > radius {
            return None;
        }
        if s > separation {
            separation = s;
            face = i;
        }
    }

    let v1 = vertices[face];
    let v2 = polygon.vertex(face + 1);

    // Center inside the polygon
    if separation < f32::EPSILON {
        let normal = -xf_p.rotate(normals[face]);
        return Some(ContactGeometry::single(
            normal,
            ContactPoint {
                position: xf_c.position + normal * radius,
                penetration: radius,
            },
        ));
    }

    let penetration = radius - separation;
    let dot1 = (center - v1).dot(v2 - v1);
    let dot2 = (center - v2).dot(v1 - v2);

    let vertex_contact = |vertex: Vec2| {
        if center.distance_squared(vertex) > radius * radius {
            return None;
        }
        let normal = xf_p.rotate(vertex - center).normalize_or(-xf_p.rotate(normals[face]));
        Some(ContactGeometry::single(
            normal,
            ContactPoint {
                position: xf_p.apply(vertex),
                penetration,
            },
        ))
    };

    if dot1 <= 0.0 {
        vertex_contact(v1)
    } else if dot2 <= 0.0 {
        vertex_contact(v2)
    } else {
        let n = normals[face];
        if (center - v1).dot(n) > radius {
            return None;
        }
        let normal = -xf_p.rotate(n);
        Some(ContactGeometry::single(
            normal,
            ContactPoint {
                position: xf_c.position + normal * radius,
                penetration,
            },
        ))
    }
}

/// Separating-axis test between two polygons with reference-face clipping.
pub fn check_polygon_polygon(a: &Polygon, xf_a: &Transform, b: &Polygon, xf_b: &Transform) -> Option<ContactGeometry> {
    let (penetration_a, face_a) = find_axis_least_penetration(a, xf_a, b, xf_b);
    if penetration_a >= 0.0 {
        return None;
    }
    let (penetration_b, face_b) = find_axis_least_penetration(b, xf_b, a, xf_a);
    if penetration_b >= 0.0 {
        return None;
    }

    let (reference, xf_ref, incident, xf_inc, ref_index, flip) = if bias_greater_than(penetration_a, penetration_b) {
        (a, xf_a, b, xf_b, face_a, false)
    } else {
        (b, xf_b, a, xf_a, face_b, true)
    };

    let incident_face = find_incident_face(reference, xf_ref, incident, xf_inc, ref_index);

    let v1 = xf_ref.apply(reference.vertex(ref_index));
    let v2 = xf_ref.apply(reference.vertex(ref_index + 1));
    let ref_normal = (v2 - v1).normalize_or(Vec2::UNIT_X).cross_scalar(1.0);
    let ref_c = ref_normal.dot(v1);

    let incident_face = clip_to_reference_face(v1, v2, incident_face)?;

    let mut geometry = ContactGeometry {
        normal: if flip { -ref_normal } else { ref_normal },
        points: [ContactPoint::default(); 2],
        count: 0,
    };

    // Keep points behind the reference face
    for point in incident_face {
        let separation = ref_normal.dot(point) - ref_c;
        if separation <= 0.0 {
            geometry.points[geometry.count] = ContactPoint {
                position: point,
                penetration: -separation,
            };
            geometry.count += 1;
        }
    }

    (geometry.count > 0).then_some(geometry)
}

fn bias_greater_than(a: f32, b: f32) -> bool {
    a >= b * BIAS_RELATIVE + a * BIAS_ABSOLUTE
}

/// Face of `a` with the greatest separation from `b`, as `(separation, face)`.
/// A negative separation means the shapes overlap along that face normal.
fn find_axis_least_penetration(a: &Polygon, xf_a: &Transform, b: &Polygon, xf_b: &Transform) -> (f32, usize) {
    let mut best_distance = f32::MIN;
    let mut best_face = 0;

    for (i, (&vertex, &normal)) in a.vertices().iter().zip(a.normals()).enumerate() {
        // Face normal and vertex of A in B's local space
        let n = xf_b.inverse_rotate(xf_a.rotate(normal));
        let support = b.support_point(-n);
        let v = xf_b.apply_inverse(xf_a.apply(vertex));

        let d = (support - v).dot(n);
        if d > best_distance {
            best_distance = d;
            best_face = i;
        }
    }

    (best_distance, best_face)
}

/// World-space endpoints of the incident face most anti-parallel to the reference normal.
fn find_incident_face(
    reference: &Polygon,
    xf_ref: &Transform,
    incident: &Polygon,
    xf_inc: &Transform,
    ref_index: usize,
) -> [Vec2; 2] {
    let n = xf_inc.inverse_rotate(xf_ref.rotate(reference.normals()[ref_index]));

    let mut incident_index = 0;
    let mut min_dot = f32::MAX;
    for (i, &normal) in incident.normals().iter().enumerate() {
        let dot = n.dot(normal);
        if dot < min_dot {
            min_dot = dot;
            incident_index = i;
        }
    }

    [
        xf_inc.apply(incident.vertex(incident_index)),
        xf_inc.apply(incident.vertex(incident_index + 1)),
    ]
}

/// Clips the incident face to the slab between the side planes of the
/// reference face `v1 -> v2`. `None` when fewer than two points survive
/// either plane, which floating point error can cause on nearly touching
/// corners.
fn clip_to_reference_face(v1: Vec2, v2: Vec2, mut incident_face: [Vec2; 2]) -> Option<[Vec2; 2]> {
    let side_normal = (v2 - v1).normalize_or(Vec2::UNIT_X);
    let neg_side = -side_normal.dot(v1);
    let pos_side = side_normal.dot(v2);

    if clip(-side_normal, neg_side, &mut incident_face) < 2 {
        return None;
    }
    if clip(side_normal, pos_side, &mut incident_face) < 2 {
        return None;
    }
    Some(incident_face)
}

/// Clips a segment against the half-plane `n·p <= c`. Returns the number of
/// points written back into `face`.
fn clip(n: Vec2, c: f32, face: &mut [Vec2; 2]) -> usize {
    let mut out = *face;
    let mut count = 0;

    let d1 = n.dot(face[0]) - c;
    let d2 = n.dot(face[1]) - c;

    if d1 <= 0.0 {
        out[count] = face[0];
        count += 1;
    }
    if d2 <= 0.0 {
        out[count] = face[1];
        count += 1;
    }

    // Endpoints on opposite sides: add the crossing point
    if d1 * d2 < 0.0 {
        let t = d1 / (d1 - d2);
        out[count] = face[0] + (face[1] - face[0]) * t;
        count += 1;
    }

    *face = out;
    count
}
