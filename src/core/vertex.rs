//! Vertex types
//!
//! Fixed-layout vertex records for streamed UI geometry.

use crate::core::device::{VertexAttributeDesc, VertexLayoutDesc};
use bytemuck::{Pod, Zeroable};

/// A vertex type that can be streamed to the GPU.
pub trait Vertex: Pod {
    /// Buffer layout of this vertex type.
    fn layout() -> VertexLayoutDesc;
}

/// 2D vertex with position and RGBA color.
/// Positions are in surface pixels, origin top-left.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct ColorVertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl ColorVertex {
    pub const SIZE: u64 = std::mem::size_of::<ColorVertex>() as u64;

    pub const fn new(position: [f32; 2], color: [f32; 4]) -> Self {
        Self { position, color }
    }
}

impl Vertex for ColorVertex {
    fn layout() -> VertexLayoutDesc {
        VertexLayoutDesc {
            stride: Self::SIZE,
            attributes: vec![
                // position
                VertexAttributeDesc {
                    location: 0,
                    offset: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                // color
                VertexAttributeDesc {
                    location: 1,
                    offset: std::mem::size_of::<[f32; 2]>() as u64,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Named RGBA colors.
pub mod color {
    pub const TRANSPARENT: [f32; 4] = [0.0, 0.0, 0.0, 0.0];
    pub const BLACK: [f32; 4] = [0.0, 0.0, 0.0, 1.0];
    pub const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
    pub const RED: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
    pub const GREEN: [f32; 4] = [0.0, 1.0, 0.0, 1.0];
    pub const BLUE: [f32; 4] = [0.0, 0.0, 1.0, 1.0];
    pub const YELLOW: [f32; 4] = [1.0, 1.0, 0.0, 1.0];
}
