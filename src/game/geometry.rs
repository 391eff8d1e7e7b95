//! 2D primitives in screen space (pixels, y down).

use std::f32::consts::PI;

use glam::Vec2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub a: Vec2,
    pub b: Vec2,
    pub c: Vec2,
}

impl Triangle {
    pub const fn new(a: Vec2, b: Vec2, c: Vec2) -> Self {
        Self { a, b, c }
    }

    pub fn points(&self) -> [Vec2; 3] {
        [self.a, self.b, self.c]
    }

    pub fn map(&self, f: impl Fn(Vec2) -> Vec2) -> Self {
        Self::new(f(self.a), f(self.b), f(self.c))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Vec2,
    pub end: Vec2,
}

impl Segment {
    pub const fn new(start: Vec2, end: Vec2) -> Self {
        Self { start, end }
    }

    pub fn midpoint(&self) -> Vec2 {
        (self.start + self.end) * 0.5
    }
}

/// Rotate `p` about the origin by `angle` radians.
pub fn rotate(p: Vec2, angle: f32) -> Vec2 {
    let (sin, cos) = angle.sin_cos();
    Vec2::new(p.x * cos - p.y * sin, p.x * sin + p.y * cos)
}

pub fn from_polar(radius: f32, angle: f32) -> Vec2 {
    Vec2::new(radius * angle.cos(), radius * angle.sin())
}

pub fn lerp<T>(a: T, b: T, t: f32) -> T
where
    T: std::ops::Mul<f32, Output = T> + std::ops::Add<Output = T>,
{
    a * (1.0 - t) + b * t
}

/// Sine ease-in-out on [0, 1].
pub fn ease(t: f32) -> f32 {
    ((PI * (t - 0.5)).sin() + 1.0) / 2.0
}

fn projection(points: &[Vec2], axis: Vec2) -> (f32, f32) {
    points.iter().fold((f32::MAX, f32::MIN), |(lo, hi), p| {
        let d = p.dot(axis);
        (lo.min(d), hi.max(d))
    })
}

fn separated_along_edges(shape: &[Vec2], a: &[Vec2], b: &[Vec2]) -> bool {
    let n = shape.len();
    (0..n).any(|i| {
        let edge = shape[(i + 1) % n] - shape[i];
        if edge.length_squared() <= f32::EPSILON {
            return false;
        }
        let axis = edge.perp();
        let (a_lo, a_hi) = projection(a, axis);
        let (b_lo, b_hi) = projection(b, axis);
        a_hi < b_lo || b_hi < a_lo
    })
}

/// Separating-axis test for convex point sets. Touching counts as overlap.
fn convex_overlap(a: &[Vec2], b: &[Vec2]) -> bool {
    !separated_along_edges(a, a, b) && !separated_along_edges(b, a, b)
}

pub fn triangle_overlaps(t1: &Triangle, t2: &Triangle) -> bool {
    convex_overlap(&t1.points(), &t2.points())
}

pub fn segment_overlaps_triangle(segment: &Segment, t: &Triangle) -> bool {
    convex_overlap(&[segment.start, segment.end], &t.points())
}

pub fn contains_point(t: &Triangle, p: Vec2) -> bool {
    let d1 = (t.b - t.a).perp_dot(p - t.a);
    let d2 = (t.c - t.b).perp_dot(p - t.b);
    let d3 = (t.a - t.c).perp_dot(p - t.c);
    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
    !(has_neg && has_pos)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tri(points: [(f32, f32); 3]) -> Triangle {
        Triangle::new(
            Vec2::from(points[0]),
            Vec2::from(points[1]),
            Vec2::from(points[2]),
        )
    }

    #[test]
    fn rotate_quarter_turn() {
        let p = rotate(Vec2::new(1.0, 0.0), PI / 2.0);
        assert!((p - Vec2::new(0.0, 1.0)).length() < 1e-6);
    }

    #[test]
    fn ease_endpoints() {
        assert!(ease(0.0).abs() < 1e-6);
        assert!((ease(0.5) - 0.5).abs() < 1e-6);
        assert!((ease(1.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn overlapping_triangles() {
        let a = tri([(0.0, 0.0), (10.0, 0.0), (0.0, 10.0)]);
        let b = tri([(2.0, 2.0), (12.0, 2.0), (2.0, 12.0)]);
        assert!(triangle_overlaps(&a, &b));
    }

    #[test]
    fn separated_triangles() {
        let a = tri([(0.0, 0.0), (10.0, 0.0), (0.0, 10.0)]);
        let b = tri([(6.0, 6.0), (16.0, 6.0), (6.0, 16.0)]);
        assert!(!triangle_overlaps(&a, &b));
    }

    #[test]
    fn touching_counts() {
        let a = tri([(0.0, 0.0), (10.0, 0.0), (0.0, 10.0)]);
        let b = tri([(10.0, 0.0), (20.0, 0.0), (20.0, 10.0)]);
        assert!(triangle_overlaps(&a, &b));
    }

    #[test]
    fn contained_triangle_overlaps() {
        let outer = tri([(0.0, 0.0), (100.0, 0.0), (0.0, 100.0)]);
        let inner = tri([(5.0, 5.0), (6.0, 5.0), (5.0, 6.0)]);
        assert!(triangle_overlaps(&outer, &inner));
        assert!(triangle_overlaps(&inner, &outer));
    }

    #[test]
    fn segment_through_triangle() {
        let t = tri([(0.0, 0.0), (10.0, 0.0), (0.0, 10.0)]);
        let crossing = Segment::new(Vec2::new(-5.0, 2.0), Vec2::new(20.0, 2.0));
        let missing = Segment::new(Vec2::new(-5.0, 20.0), Vec2::new(20.0, 20.0));
        assert!(segment_overlaps_triangle(&crossing, &t));
        assert!(!segment_overlaps_triangle(&missing, &t));
    }

    #[test]
    fn point_containment() {
        let t = tri([(0.0, 0.0), (10.0, 0.0), (0.0, 10.0)]);
        assert!(contains_point(&t, Vec2::new(1.0, 1.0)));
        assert!(contains_point(&t, Vec2::new(5.0, 0.0)));
        assert!(!contains_point(&t, Vec2::new(8.0, 8.0)));
    }
}
