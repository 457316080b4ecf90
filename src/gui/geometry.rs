//! Geometry producers
//!
//! A [`GeometryProducer`] fills a canvas each frame by pushing vertices into a
//! [`VertexBatch`], which forwards them to the canvas's streaming buffer.

use crate::core::{color, ColorVertex, CommandList, StreamingVertexBuffer};
use glam::Vec2;

/// Push access to a streaming buffer for the duration of one frame.
pub struct VertexBatch<'a> {
    buffer: &'a mut StreamingVertexBuffer<ColorVertex>,
    commands: &'a mut CommandList,
    pushed: usize,
}

impl<'a> VertexBatch<'a> {
    pub fn new(
        buffer: &'a mut StreamingVertexBuffer<ColorVertex>,
        commands: &'a mut CommandList,
    ) -> Self {
        Self {
            buffer,
            commands,
            pushed: 0,
        }
    }

    pub fn push(&mut self, vertex: ColorVertex) {
        self.buffer.push(self.commands, vertex);
        self.pushed += 1;
    }

    pub fn extend<I>(&mut self, vertices: I)
    where
        I: IntoIterator<Item = ColorVertex>,
    {
        for vertex in vertices {
            self.push(vertex);
        }
    }

    pub fn triangle(&mut self, a: Vec2, b: Vec2, c: Vec2, color: [f32; 4]) {
        for p in [a, b, c] {
            self.push(ColorVertex::new(p.to_array(), color));
        }
    }

    /// Axis-aligned rectangle as two triangles (six vertices).
    pub fn quad(&mut self, min: Vec2, size: Vec2, color: [f32; 4]) {
        let max = min + size;
        let top_right = Vec2::new(max.x, min.y);
        let bottom_left = Vec2::new(min.x, max.y);
        self.triangle(min, bottom_left, max, color);
        self.triangle(min, max, top_right, color);
    }

    /// Vertices pushed through this batch.
    pub fn pushed(&self) -> usize {
        self.pushed
    }
}

/// Something that emits vertices into a canvas every frame.
pub trait GeometryProducer {
    /// Push this frame's geometry. `size` is the canvas size in pixels.
    fn produce(&mut self, batch: &mut VertexBatch<'_>, size: Vec2);
}

impl<F> GeometryProducer for F
where
    F: FnMut(&mut VertexBatch<'_>, Vec2),
{
    fn produce(&mut self, batch: &mut VertexBatch<'_>, size: Vec2) {
        self(batch, size)
    }
}

/// A grid of colored quads.
#[derive(Debug, Clone)]
pub struct QuadGrid {
    pub columns: u32,
    pub rows: u32,
    pub origin: Vec2,
    pub cell: Vec2,
    pub gap: f32,
    /// Cycled through in row-major order.
    pub colors: Vec<[f32; 4]>,
}

impl QuadGrid {
    pub fn new(columns: u32, rows: u32) -> Self {
        Self {
            columns,
            rows,
            origin: Vec2::splat(8.0),
            cell: Vec2::splat(32.0),
            gap: 8.0,
            colors: vec![color::RED, color::GREEN, color::BLUE, color::YELLOW],
        }
    }

    pub fn cell(mut self, cell: Vec2) -> Self {
        self.cell = cell;
        self
    }

    pub fn gap(mut self, gap: f32) -> Self {
        self.gap = gap;
        self
    }

    pub fn origin(mut self, origin: Vec2) -> Self {
        self.origin = origin;
        self
    }

    pub fn colors(mut self, colors: Vec<[f32; 4]>) -> Self {
        self.colors = colors;
        self
    }

    /// Vertices produced per frame.
    pub fn vertex_count(&self) -> usize {
        self.columns as usize * self.rows as usize * 6
    }
}

impl GeometryProducer for QuadGrid {
    fn produce(&mut self, batch: &mut VertexBatch<'_>, _size: Vec2) {
        let stride = self.cell + Vec2::splat(self.gap);
        for row in 0..self.rows {
            for column in 0..self.columns {
                let index = (row * self.columns + column) as usize;
                let color = if self.colors.is_empty() {
                    color::WHITE
                } else {
                    self.colors[index % self.colors.len()]
                };
                let min = self.origin + stride * Vec2::new(column as f32, row as f32);
                batch.quad(min, self.cell, color);
            }
        }
    }
}
