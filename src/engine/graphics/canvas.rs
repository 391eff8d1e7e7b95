//! CPU-side draw list.
//!
//! Everything the game draws in a frame lands here as coloured triangles in
//! logical screen coordinates. The game layer is drawn first and the UI layer
//! on top of it.

use glam::Vec2;

use super::color::Color;
use super::font;
use super::vertex::Vertex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Game,
    Ui,
}

pub struct Canvas {
    size: Vec2,
    clear_color: Color,
    target: Layer,
    game: Vec<Vertex>,
    ui: Vec<Vertex>,
}

impl Canvas {
    pub fn new(size: Vec2) -> Self {
        Self {
            size,
            clear_color: Color::BLACK,
            target: Layer::Game,
            game: Vec::new(),
            ui: Vec::new(),
        }
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn clear_color(&self) -> Color {
        self.clear_color
    }

    pub fn layer(&self) -> Layer {
        self.target
    }

    /// Select the layer subsequent draw calls write to.
    pub fn set_layer(&mut self, layer: Layer) {
        self.target = layer;
    }

    /// Drop everything drawn so far and draw onto the game layer.
    pub fn begin_frame(&mut self) {
        self.game.clear();
        self.ui.clear();
        self.target = Layer::Game;
    }

    /// Fill the background with `color`. Triangles already queued stay.
    pub fn clear(&mut self, color: Color) {
        self.clear_color = color;
    }

    fn target_mut(&mut self) -> &mut Vec<Vertex> {
        match self.target {
            Layer::Game => &mut self.game,
            Layer::Ui => &mut self.ui,
        }
    }

    pub fn fill_triangle(&mut self, a: Vec2, b: Vec2, c: Vec2, color: Color) {
        if color.a == 0 {
            return;
        }
        let color = color.to_array();
        let target = self.target_mut();
        for p in [a, b, c] {
            target.push(Vertex {
                position: p.to_array(),
                color,
            });
        }
    }

    pub fn fill_rect(&mut self, pos: Vec2, size: Vec2, color: Color) {
        let tl = pos;
        let tr = pos + Vec2::new(size.x, 0.0);
        let bl = pos + Vec2::new(0.0, size.y);
        let br = pos + size;
        self.fill_triangle(tl, tr, br, color);
        self.fill_triangle(br, bl, tl, color);
    }

    /// One pixel wide line.
    pub fn draw_line(&mut self, start: Vec2, end: Vec2, color: Color) {
        let dir = end - start;
        if dir.length_squared() <= f32::EPSILON {
            self.fill_rect(start, Vec2::ONE, color);
            return;
        }
        let half = dir.normalize().perp() * 0.5;
        self.fill_triangle(start + half, end + half, end - half, color);
        self.fill_triangle(end - half, start - half, start + half, color);
    }

    pub fn draw_string(&mut self, pos: Vec2, text: &str, color: Color, scale: Vec2) {
        let mut cursor = pos;
        for c in text.chars() {
            if c == '\n' {
                cursor.x = pos.x;
                cursor.y += font::CELL_SIZE * scale.y;
                continue;
            }
            for (row, col, len) in font::glyph_runs(c) {
                let offset = Vec2::new((col + 1) as f32, row as f32) * scale;
                let run = Vec2::new(len as f32, 1.0) * scale;
                self.fill_rect(cursor + offset, run, color);
            }
            cursor.x += font::CELL_SIZE * scale.x;
        }
    }

    /// Size of `text` at scale 1. Multiply by the draw scale.
    pub fn text_size(text: &str) -> Vec2 {
        let lines = text.split('\n');
        let (mut width, mut height) = (0usize, 0usize);
        for line in lines {
            width = width.max(line.chars().count());
            height += 1;
        }
        Vec2::new(width as f32, height as f32) * font::CELL_SIZE
    }

    pub fn game_vertices(&self) -> &[Vertex] {
        &self.game
    }

    pub fn ui_vertices(&self) -> &[Vertex] {
        &self.ui
    }

    /// Game layer followed by the UI layer.
    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.game.iter().chain(self.ui.iter())
    }

    pub fn vertex_count(&self) -> usize {
        self.game.len() + self.ui.len()
    }
}
