//! Canvas settings
//!
//! Configuration for canvas creation.

use crate::core::{color, BlendState, CullState};
use crate::gui::projection::ClipSpace;

/// Settings for creating a canvas.
#[derive(Debug, Clone)]
pub struct CanvasSettings {
    /// Label used for the canvas and its device objects.
    pub label: String,
    /// Vertices the streaming buffer holds before it flushes.
    pub capacity: usize,
    /// Color the target is cleared to every frame.
    pub clear_color: [f32; 4],
    /// Color format of the target.
    pub format: wgpu::TextureFormat,
    pub blend: BlendState,
    pub cull: CullState,
    /// Clip-space convention of the device the canvas renders with.
    pub clip_space: ClipSpace,
}

impl Default for CanvasSettings {
    fn default() -> Self {
        Self {
            label: "canvas".to_string(),
            capacity: 1024,
            clear_color: color::BLACK,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            blend: BlendState::default(),
            cull: CullState::default(),
            clip_space: ClipSpace::default(),
        }
    }
}

impl CanvasSettings {
    /// Create new canvas settings with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the label.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Set the streaming buffer capacity, in vertices.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Set the clear color.
    pub fn clear_color(mut self, clear_color: [f32; 4]) -> Self {
        self.clear_color = clear_color;
        self
    }

    /// Set the target color format.
    pub fn format(mut self, format: wgpu::TextureFormat) -> Self {
        self.format = format;
        self
    }

    pub fn blend(mut self, blend: BlendState) -> Self {
        self.blend = blend;
        self
    }

    pub fn cull(mut self, cull: CullState) -> Self {
        self.cull = cull;
        self
    }

    /// Set the clip-space convention.
    pub fn clip_space(mut self, clip_space: ClipSpace) -> Self {
        self.clip_space = clip_space;
        self
    }
}
