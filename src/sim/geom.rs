//! Collision predicates for circles and rotated rectangles
//!
//! Everything here is analytic and allocation-free; the sim calls these inside
//! O(n²) scans over small fixed pools, so each test must stay cheap.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// A circle positioned in some frame (world space, or relative to a body
/// center for bounding-circle clusters).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f32,
}

impl Circle {
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Rotate around the origin by `angle_deg` and scale uniformly.
    ///
    /// Used to bring a body-relative bounding circle into world space:
    /// `relative.transformed(body_angle, body_scale).offset(body_pos)`.
    pub fn transformed(&self, angle_deg: f32, scale: f32) -> Self {
        let rot = Vec2::from_angle(angle_deg.to_radians());
        Self {
            center: rot.rotate(self.center) * scale,
            radius: self.radius * scale,
        }
    }

    pub fn offset(&self, by: Vec2) -> Self {
        Self {
            center: self.center + by,
            radius: self.radius,
        }
    }

    pub fn overlaps(&self, other: &Circle) -> bool {
        circles_overlap(self.center, self.radius, other.center, other.radius)
    }
}

/// Circle-circle overlap via squared distance
#[inline]
pub fn circles_overlap(c1: Vec2, r1: f32, c2: Vec2, r2: f32) -> bool {
    let r = r1 + r2;
    c1.distance_squared(c2) < r * r
}

/// Axis-aligned point-in-rectangle test (`size` is full extents)
#[inline]
pub fn point_in_rect(point: Vec2, rect_center: Vec2, size: Vec2) -> bool {
    let d = (point - rect_center).abs();
    d.x <= size.x / 2.0 && d.y <= size.y / 2.0
}

/// Circle vs rotated rectangle.
///
/// The circle center is rotated into the rectangle's local (unrotated) frame
/// by applying the inverse rotation about the rectangle center, then tested
/// against an axis-aligned circle/rect overlap.
pub fn circle_rect_overlap(
    rect_center: Vec2,
    rect_angle_deg: f32,
    size: Vec2,
    circle_center: Vec2,
    radius: f32,
) -> bool {
    let inv = Vec2::from_angle(-rect_angle_deg.to_radians());
    let local = inv.rotate(circle_center - rect_center);

    let half = size / 2.0;
    let closest = local.clamp(-half, half);
    local.distance_squared(closest) < radius * radius
}

/// A rectangle with a world-space center and a rotation about that center
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OrientedRect {
    pub center: Vec2,
    /// Full extents (width, height) before rotation
    pub size: Vec2,
    pub angle_deg: f32,
}

impl OrientedRect {
    pub fn new(center: Vec2, size: Vec2, angle_deg: f32) -> Self {
        Self {
            center,
            size,
            angle_deg,
        }
    }

    /// The four world-space corners (half-extents rotated by the body angle)
    pub fn corners(&self) -> [Vec2; 4] {
        let rot = Vec2::from_angle(self.angle_deg.to_radians());
        let half = self.size / 2.0;
        [
            self.center + rot.rotate(Vec2::new(-half.x, -half.y)),
            self.center + rot.rotate(Vec2::new(half.x, -half.y)),
            self.center + rot.rotate(Vec2::new(half.x, half.y)),
            self.center + rot.rotate(Vec2::new(-half.x, half.y)),
        ]
    }

    pub fn overlaps_circle(&self, circle_center: Vec2, radius: f32) -> bool {
        circle_rect_overlap(self.center, self.angle_deg, self.size, circle_center, radius)
    }
}

/// Segment-segment intersection (proper and touching)
pub fn segments_intersect(a1: Vec2, a2: Vec2, b1: Vec2, b2: Vec2) -> bool {
    let d1 = a2 - a1;
    let d2 = b2 - b1;
    let denom = d1.perp_dot(d2);

    if denom.abs() < 1e-6 {
        // Parallel segments are treated as non-intersecting; the surrounding
        // corner-ray sweep covers the degenerate overlap cases well enough
        return false;
    }

    let diff = b1 - a1;
    let t = diff.perp_dot(d2) / denom;
    let u = diff.perp_dot(d1) / denom;

    (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u)
}

/// Rotated-rectangle vs rotated-rectangle overlap.
///
/// Declares a collision if any ray from one rectangle's center to one of its
/// own corners crosses an edge of the other rectangle, tested symmetrically.
/// This is an intentional approximation, not a separating-axis test: it can
/// miss configurations where one body sits entirely inside the other's edge
/// region without any center ray crossing. It is only used for small, thin,
/// fast bodies (mutual projectile destruction, laser beams) where the
/// false-negative rate is part of the shipped balance. Do not "fix" it.
pub fn rotated_rects_overlap(a: &OrientedRect, b: &OrientedRect) -> bool {
    half_overlap(a, b) || half_overlap(b, a)
}

/// One direction of the symmetric test: rays of `a` against edges of `b`
fn half_overlap(a: &OrientedRect, b: &OrientedRect) -> bool {
    let a_corners = a.corners();
    let b_corners = b.corners();

    for corner in a_corners {
        for i in 0..4 {
            let e1 = b_corners[i];
            let e2 = b_corners[(i + 1) % 4];
            if segments_intersect(a.center, corner, e1, e2) {
                return true;
            }
        }
    }

    false
}

/// Standard vector reflection about a surface normal: v' = v - 2(v·n)n
#[inline]
pub fn reflect(v: Vec2, normal: Vec2) -> Vec2 {
    v - 2.0 * v.dot(normal) * normal
}
