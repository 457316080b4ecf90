//! Core rendering abstractions
//!
//! Device handles, recorded command lists, resource ownership and the
//! streaming vertex buffer. Two devices implement [`RenderDevice`]: the wgpu
//! backend and a headless recorder.

pub mod buffer;
pub mod command;
pub mod device;
pub mod recording;
pub mod render_states;
pub mod render_target;
pub mod resources;
pub mod vertex;
pub mod wgpu_device;

pub use buffer::{StreamingVertexBuffer, UniformBuffer};
pub use command::{Command, CommandList, Upload};
pub use device::{
    BufferDesc, BufferHandle, GpuError, GpuResult, LayoutEntry, LayoutHandle, PipelineDesc,
    PipelineHandle, RenderDevice, ResourceHandle, ResourceKind, ResourceLayoutDesc,
    ResourceSetDesc, ResourceSetHandle, ShaderHandle, ShaderSetDesc, ShaderStageDesc, TargetDesc,
    TargetHandle, VertexAttributeDesc, VertexLayoutDesc,
};
pub use recording::RecordingDevice;
pub use render_states::{BlendState, CullState};
pub use render_target::OffscreenTarget;
pub use resources::ResourceGroup;
pub use vertex::{color, ColorVertex, Vertex};
pub use wgpu_device::WgpuDevice;
