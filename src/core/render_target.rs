//! Offscreen render targets
//!
//! Color textures that UI surfaces render into before the host shows them.

use crate::context::WgpuContext;
use crate::core::device::TargetDesc;

/// A color texture a surface renders into.
pub struct OffscreenTarget {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    size: wgpu::Extent3d,
    format: wgpu::TextureFormat,
    label: Option<String>,
}

impl OffscreenTarget {
    /// Usage of every offscreen target: rendered to, then sampled or copied by the host.
    pub const USAGE: wgpu::TextureUsages = wgpu::TextureUsages::RENDER_ATTACHMENT
        .union(wgpu::TextureUsages::TEXTURE_BINDING)
        .union(wgpu::TextureUsages::COPY_SRC);

    /// Create a new target. Zero dimensions are clamped to one texel.
    pub fn new(ctx: &WgpuContext, desc: &TargetDesc) -> Self {
        let size = wgpu::Extent3d {
            width: desc.width.max(1),
            height: desc.height.max(1),
            depth_or_array_layers: 1,
        };
        let (texture, view) = Self::create_texture(ctx, size, desc.format, desc.label.as_deref());

        Self {
            texture,
            view,
            size,
            format: desc.format,
            label: desc.label.clone(),
        }
    }

    fn create_texture(
        ctx: &WgpuContext,
        size: wgpu::Extent3d,
        format: wgpu::TextureFormat,
        label: Option<&str>,
    ) -> (wgpu::Texture, wgpu::TextureView) {
        let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label,
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: Self::USAGE,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        (texture, view)
    }

    /// Recreate the texture if the size changed. Returns whether it did.
    pub fn resize(&mut self, ctx: &WgpuContext, width: u32, height: u32) -> bool {
        let width = width.max(1);
        let height = height.max(1);
        if self.size.width == width && self.size.height == height {
            return false;
        }

        self.texture.destroy();
        self.size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let (texture, view) =
            Self::create_texture(ctx, self.size, self.format, self.label.as_deref());
        self.texture = texture;
        self.view = view;
        true
    }

    /// Begin a render pass, clearing first when `clear` is set.
    pub fn begin_render_pass<'e>(
        &self,
        encoder: &'e mut wgpu::CommandEncoder,
        clear: Option<[f32; 4]>,
    ) -> wgpu::RenderPass<'e> {
        let load = match clear {
            Some([r, g, b, a]) => wgpu::LoadOp::Clear(wgpu::Color {
                r: r as f64,
                g: g as f64,
                b: b as f64,
                a: a as f64,
            }),
            None => wgpu::LoadOp::Load,
        };

        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: self.label.as_deref(),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &self.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        })
    }

    /// Get the texture.
    pub fn texture(&self) -> &wgpu::Texture {
        &self.texture
    }

    /// Get the texture view.
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    /// Get the target size.
    pub fn size(&self) -> (u32, u32) {
        (self.size.width, self.size.height)
    }

    /// Get the texture format.
    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    /// Release the texture memory now instead of at drop.
    pub fn destroy(&self) {
        self.texture.destroy();
    }
}
