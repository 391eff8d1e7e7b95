//! Shape prototypes and the `Shape` component.
//!
//! A prototype holds triangles and weapon mount points in shape space (radius
//! 8, origin at the centre). A `Shape` places a prototype in the world with a
//! scale, rotation and position and caches the resulting triangles.

use std::collections::HashMap;
use std::f32::consts::PI;
use std::sync::Arc;

use glam::Vec2;

use crate::engine::graphics::{Canvas, Color};
use crate::game::geometry::{self, Triangle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Triangle,
    Square,
    Cursor,
    Pentagon,
    Star5_2,
    Star6_2,
    Star7_3,
    Star8_2,
    Star9_3,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 9] = [
        ShapeKind::Triangle,
        ShapeKind::Square,
        ShapeKind::Cursor,
        ShapeKind::Pentagon,
        ShapeKind::Star5_2,
        ShapeKind::Star6_2,
        ShapeKind::Star7_3,
        ShapeKind::Star8_2,
        ShapeKind::Star9_3,
    ];
}

/// Player shapes in upgrade order. Each step adds one weapon point.
pub const SHAPE_PROGRESSION: [ShapeKind; 7] = [
    ShapeKind::Triangle,
    ShapeKind::Square,
    ShapeKind::Pentagon,
    ShapeKind::Star6_2,
    ShapeKind::Star7_3,
    ShapeKind::Star8_2,
    ShapeKind::Star9_3,
];

const RADIUS: f32 = 8.0;

#[derive(Debug, Clone)]
pub struct Prototype {
    pub kind: ShapeKind,
    pub tris: Vec<Triangle>,
    pub weapon_points: Vec<Vec2>,
}

/// Points of a regular n-gon, starting at the top and going clockwise.
fn ring(n: usize) -> Vec<Vec2> {
    (0..n)
        .map(|i| {
            let angle = (90.0 - 360.0 / n as f32 * i as f32) * PI / 180.0;
            Vec2::new(-RADIUS * angle.cos(), -RADIUS * angle.sin())
        })
        .collect()
}

fn tri(p: &[Vec2], a: usize, b: usize, c: usize) -> Triangle {
    Triangle::new(p[a], p[b], p[c])
}

/// Triangles `(i, i + step, origin)` around the whole ring.
fn fan(p: &[Vec2], step: usize) -> Vec<Triangle> {
    let n = p.len();
    (0..n)
        .map(|i| Triangle::new(p[i], p[(i + step) % n], Vec2::ZERO))
        .collect()
}

impl Prototype {
    pub fn build(kind: ShapeKind) -> Self {
        let (tris, weapon_points) = match kind {
            ShapeKind::Triangle => {
                let p = ring(6);
                (vec![tri(&p, 0, 2, 4)], p.iter().step_by(2).copied().collect())
            }
            ShapeKind::Square => {
                let p = ring(8);
                (
                    vec![tri(&p, 1, 3, 5), tri(&p, 5, 7, 1)],
                    p.iter().skip(1).step_by(2).copied().collect(),
                )
            }
            ShapeKind::Cursor => (
                vec![
                    Triangle::new(Vec2::new(0.0, -8.0), Vec2::new(8.0, 8.0), Vec2::ZERO),
                    Triangle::new(Vec2::new(0.0, -8.0), Vec2::ZERO, Vec2::new(-8.0, 8.0)),
                ],
                Vec::new(),
            ),
            ShapeKind::Pentagon => {
                let p = ring(5);
                (fan(&p, 1), p)
            }
            ShapeKind::Star5_2 => {
                let p = ring(5);
                (fan(&p, 2), p)
            }
            ShapeKind::Star6_2 => {
                let p = ring(6);
                (vec![tri(&p, 0, 2, 4), tri(&p, 1, 3, 5)], p)
            }
            ShapeKind::Star7_3 => {
                let p = ring(7);
                (fan(&p, 3), p)
            }
            ShapeKind::Star8_2 => {
                let p = ring(8);
                (
                    vec![
                        tri(&p, 0, 2, 4),
                        tri(&p, 1, 3, 5),
                        tri(&p, 4, 6, 0),
                        tri(&p, 5, 7, 1),
                    ],
                    p,
                )
            }
            ShapeKind::Star9_3 => {
                let p = ring(9);
                (vec![tri(&p, 0, 3, 6), tri(&p, 1, 4, 7), tri(&p, 2, 5, 8)], p)
            }
        };

        Self {
            kind,
            tris,
            weapon_points,
        }
    }
}

/// Every prototype, built once and shared.
#[derive(Debug, Clone)]
pub struct PrototypeLibrary {
    prototypes: HashMap<ShapeKind, Arc<Prototype>>,
}

impl PrototypeLibrary {
    pub fn new() -> Self {
        let prototypes = ShapeKind::ALL
            .iter()
            .map(|&kind| (kind, Arc::new(Prototype::build(kind))))
            .collect();
        Self { prototypes }
    }

    pub fn get(&self, kind: ShapeKind) -> Arc<Prototype> {
        match self.prototypes.get(&kind) {
            Some(prototype) => prototype.clone(),
            None => Arc::new(Prototype::build(kind)),
        }
    }

    /// A positioned shape of `kind`.
    pub fn shape(&self, kind: ShapeKind, position: Vec2) -> Shape {
        let mut shape = Shape::new(self.get(kind));
        shape.move_to(position);
        shape
    }
}

impl Default for PrototypeLibrary {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub struct Shape {
    prototype: Arc<Prototype>,
    tris: Vec<Triangle>,
    pub scale: f32,
    pub theta: f32,
    pub position: Vec2,
    pub color: Color,
}

impl Shape {
    pub fn new(prototype: Arc<Prototype>) -> Self {
        let tris = prototype.tris.clone();
        Self {
            prototype,
            tris,
            scale: 1.0,
            theta: 0.0,
            position: Vec2::ZERO,
            color: Color::MAGENTA,
        }
    }

    pub fn kind(&self) -> ShapeKind {
        self.prototype.kind
    }

    pub fn tris(&self) -> &[Triangle] {
        &self.tris
    }

    /// Shape space to world space.
    fn transform(&self, p: Vec2) -> Vec2 {
        geometry::rotate(p, self.theta) * self.scale + self.position
    }

    pub fn move_to(&mut self, position: Vec2) {
        self.position = position;
        let tris = self
            .prototype
            .tris
            .iter()
            .map(|t| t.map(|p| self.transform(p)))
            .collect();
        self.tris = tris;
    }

    /// Recompute the world triangles after changing scale or rotation.
    pub fn refresh(&mut self) {
        self.move_to(self.position);
    }

    pub fn set_prototype(&mut self, prototype: Arc<Prototype>) {
        self.prototype = prototype;
        self.refresh();
    }

    pub fn weapon_points(&self) -> Vec<Vec2> {
        self.prototype
            .weapon_points
            .iter()
            .map(|&p| self.transform(p))
            .collect()
    }

    pub fn weapon_point_count(&self) -> usize {
        self.prototype.weapon_points.len()
    }

    pub fn intersects(&self, other: &Shape) -> bool {
        other
            .tris
            .iter()
            .any(|t| self.tris.iter().any(|s| geometry::triangle_overlaps(t, s)))
    }

    pub fn draw(&self, canvas: &mut Canvas) {
        for t in &self.tris {
            canvas.fill_triangle(t.a, t.b, t.c, self.color);
        }
    }
}

/// Next player shape after a boss kill, if any remain.
pub fn next_progression(current: &Shape) -> Option<ShapeKind> {
    let index = current.weapon_point_count().checked_sub(2)?;
    SHAPE_PROGRESSION.get(index).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weapon_point_counts() {
        let library = PrototypeLibrary::new();
        let counts: Vec<usize> = ShapeKind::ALL
            .iter()
            .map(|&kind| library.get(kind).weapon_points.len())
            .collect();
        assert_eq!(counts, vec![3, 4, 0, 5, 5, 6, 7, 8, 9]);
    }

    #[test]
    fn triangle_points_up() {
        let proto = Prototype::build(ShapeKind::Triangle);
        let top = proto.weapon_points[0];
        assert!(top.x.abs() < 1e-5);
        assert!((top.y + 8.0).abs() < 1e-5);
    }

    #[test]
    fn move_to_scales_and_translates() {
        let library = PrototypeLibrary::new();
        let mut shape = Shape::new(library.get(ShapeKind::Triangle));
        shape.scale = 4.0;
        shape.move_to(Vec2::new(640.0, 480.0));
        let top = shape.weapon_points()[0];
        assert!((top - Vec2::new(640.0, 448.0)).length() < 1e-3);
        assert!((shape.tris()[0].a - top).length() < 1e-3);
    }

    #[test]
    fn intersects_when_overlapping() {
        let library = PrototypeLibrary::new();
        let a = library.shape(ShapeKind::Square, Vec2::new(100.0, 100.0));
        let b = library.shape(ShapeKind::Square, Vec2::new(105.0, 100.0));
        let c = library.shape(ShapeKind::Square, Vec2::new(200.0, 100.0));
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn progression_adds_a_weapon_point() {
        let library = PrototypeLibrary::new();
        let mut shape = library.shape(ShapeKind::Triangle, Vec2::ZERO);
        let mut counts = vec![shape.weapon_point_count()];
        while let Some(next) = next_progression(&shape) {
            shape.set_prototype(library.get(next));
            counts.push(shape.weapon_point_count());
        }
        assert_eq!(counts, vec![3, 4, 5, 6, 7, 8, 9]);
    }
}
