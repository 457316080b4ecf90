//! Device abstraction
//!
//! Handles, descriptors and the [`RenderDevice`] trait every backend implements.
//! Descriptors reuse plain wgpu enums (formats, usages, topology) so that a
//! headless backend can describe exactly what the wgpu backend would create.

use crate::core::command::CommandList;
use crate::core::render_states::{BlendState, CullState};
use thiserror::Error;

/// Device-level failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GpuError {
    #[error("failed to create buffer: {0}")]
    BufferCreationFailed(String),
    #[error("failed to create resource layout: {0}")]
    LayoutCreationFailed(String),
    #[error("failed to create shader: {0}")]
    ShaderCreationFailed(String),
    #[error("failed to create pipeline: {0}")]
    PipelineCreationFailed(String),
    #[error("failed to create resource set: {0}")]
    ResourceSetCreationFailed(String),
    #[error("failed to create render target: {0}")]
    TargetCreationFailed(String),
    #[error("vertex capacity must be greater than zero")]
    InvalidCapacity,
    #[error("unknown {kind} handle {id}")]
    UnknownHandle { kind: &'static str, id: u64 },
    #[error("command stream error: {0}")]
    Stream(String),
}

pub type GpuResult<T> = Result<T, GpuError>;

/// Handle to a device buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle(pub(crate) u64);

/// Handle to a resource layout (bind group layout).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayoutHandle(pub(crate) u64);

/// Handle to a compiled shader stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderHandle(pub(crate) u64);

/// Handle to a render pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PipelineHandle(pub(crate) u64);

/// Handle to a resource set (bind group).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceSetHandle(pub(crate) u64);

/// Handle to an offscreen color target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetHandle(pub(crate) u64);

/// Any disposable device object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceHandle {
    Buffer(BufferHandle),
    Layout(LayoutHandle),
    Shader(ShaderHandle),
    Pipeline(PipelineHandle),
    ResourceSet(ResourceSetHandle),
    Target(TargetHandle),
}

impl ResourceHandle {
    /// Short name of the resource kind, used in logs and errors.
    pub fn kind(&self) -> &'static str {
        match self {
            ResourceHandle::Buffer(_) => "buffer",
            ResourceHandle::Layout(_) => "layout",
            ResourceHandle::Shader(_) => "shader",
            ResourceHandle::Pipeline(_) => "pipeline",
            ResourceHandle::ResourceSet(_) => "resource set",
            ResourceHandle::Target(_) => "target",
        }
    }

    /// Raw id of the underlying handle.
    pub fn id(&self) -> u64 {
        match *self {
            ResourceHandle::Buffer(h) => h.0,
            ResourceHandle::Layout(h) => h.0,
            ResourceHandle::Shader(h) => h.0,
            ResourceHandle::Pipeline(h) => h.0,
            ResourceHandle::ResourceSet(h) => h.0,
            ResourceHandle::Target(h) => h.0,
        }
    }
}

macro_rules! impl_resource_handle {
    ($($handle:ident => $variant:ident),* $(,)?) => {
        $(
            impl From<$handle> for ResourceHandle {
                fn from(handle: $handle) -> Self {
                    ResourceHandle::$variant(handle)
                }
            }
        )*
    };
}

impl_resource_handle! {
    BufferHandle => Buffer,
    LayoutHandle => Layout,
    ShaderHandle => Shader,
    PipelineHandle => Pipeline,
    ResourceSetHandle => ResourceSet,
    TargetHandle => Target,
}

/// Buffer creation parameters.
#[derive(Debug, Clone)]
pub struct BufferDesc {
    pub label: Option<String>,
    pub size: u64,
    pub usage: wgpu::BufferUsages,
}

impl BufferDesc {
    /// A vertex buffer that is rewritten every frame.
    pub fn vertex(label: &str, size: u64) -> Self {
        Self {
            label: Some(label.to_string()),
            size,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        }
    }

    /// A uniform buffer that is rewritten every frame.
    pub fn uniform(label: &str, size: u64) -> Self {
        Self {
            label: Some(label.to_string()),
            size,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        }
    }
}

/// Kind of resource bound at a layout slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    UniformBuffer,
}

/// One binding of a resource layout.
#[derive(Debug, Clone)]
pub struct LayoutEntry {
    pub name: String,
    pub binding: u32,
    pub kind: ResourceKind,
    pub visibility: wgpu::ShaderStages,
}

/// Resource layout creation parameters.
#[derive(Debug, Clone, Default)]
pub struct ResourceLayoutDesc {
    pub label: Option<String>,
    pub entries: Vec<LayoutEntry>,
}

/// Resource set creation parameters: one buffer per layout entry, in order.
#[derive(Debug, Clone)]
pub struct ResourceSetDesc {
    pub label: Option<String>,
    pub layout: LayoutHandle,
    pub buffers: Vec<BufferHandle>,
}

/// Source and entry point of one shader stage (WGSL).
#[derive(Debug, Clone)]
pub struct ShaderStageDesc {
    pub source: String,
    pub entry_point: String,
}

/// Vertex and fragment stage pair.
#[derive(Debug, Clone)]
pub struct ShaderSetDesc {
    pub label: Option<String>,
    pub vertex: ShaderStageDesc,
    pub fragment: ShaderStageDesc,
}

/// Attribute of a vertex layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttributeDesc {
    pub location: u32,
    pub offset: u64,
    pub format: wgpu::VertexFormat,
}

/// Vertex buffer layout without borrowed data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexLayoutDesc {
    pub stride: u64,
    pub attributes: Vec<VertexAttributeDesc>,
}

/// Render pipeline creation parameters.
#[derive(Debug, Clone)]
pub struct PipelineDesc {
    pub label: Option<String>,
    /// Vertex and fragment shaders, as returned by [`RenderDevice::create_shader_set`].
    pub shaders: Vec<ShaderHandle>,
    pub vertex_layout: VertexLayoutDesc,
    pub layouts: Vec<LayoutHandle>,
    pub color_format: wgpu::TextureFormat,
    pub blend: BlendState,
    pub cull: CullState,
    pub topology: wgpu::PrimitiveTopology,
}

/// Offscreen color target creation parameters.
#[derive(Debug, Clone)]
pub struct TargetDesc {
    pub label: Option<String>,
    pub width: u32,
    pub height: u32,
    pub format: wgpu::TextureFormat,
}

/// A graphics device able to create resources and execute command lists.
///
/// All methods take `&mut self`: a device is driven by a single render thread.
pub trait RenderDevice {
    /// Create a buffer.
    fn create_buffer(&mut self, desc: &BufferDesc) -> GpuResult<BufferHandle>;

    /// Create a resource layout.
    fn create_resource_layout(&mut self, desc: &ResourceLayoutDesc) -> GpuResult<LayoutHandle>;

    /// Compile a shader set. Returns the vertex stage first, then the fragment stage.
    fn create_shader_set(&mut self, desc: &ShaderSetDesc) -> GpuResult<Vec<ShaderHandle>>;

    /// Create a render pipeline.
    fn create_pipeline(&mut self, desc: &PipelineDesc) -> GpuResult<PipelineHandle>;

    /// Create a resource set binding buffers to a layout.
    fn create_resource_set(&mut self, desc: &ResourceSetDesc) -> GpuResult<ResourceSetHandle>;

    /// Create an offscreen color target.
    fn create_render_target(&mut self, desc: &TargetDesc) -> GpuResult<TargetHandle>;

    /// Output description of a target, for pipeline compatibility.
    fn output_format(&self, target: TargetHandle) -> GpuResult<wgpu::TextureFormat>;

    /// Execute a recorded command list.
    fn submit(&mut self, commands: CommandList) -> GpuResult<()>;

    /// Release a device object.
    fn destroy(&mut self, handle: ResourceHandle);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_conversion() {
        let handle: ResourceHandle = BufferHandle(7).into();
        assert_eq!(handle, ResourceHandle::Buffer(BufferHandle(7)));
        assert_eq!(handle.kind(), "buffer");
        assert_eq!(handle.id(), 7);
    }

    #[test]
    fn test_buffer_desc_usage() {
        let desc = BufferDesc::uniform("projection", 64);
        assert!(desc.usage.contains(wgpu::BufferUsages::UNIFORM));
        assert!(desc.usage.contains(wgpu::BufferUsages::COPY_DST));
        assert_eq!(desc.size, 64);
    }
}
