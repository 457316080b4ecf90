//! Rein UI
//!
//! Immediate-mode UI rendering on top of a retained wgpu pipeline.
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! 1. **context** - Core wgpu wrapper (Device, Queue)
//! 2. **core** - Device handles, command lists, resource groups and the
//!    streaming vertex buffer, with a wgpu device and a headless recording device
//! 3. **gui** - Component tree, scoped brackets and the canvas surface
//!
//! A frame is recorded into a [`CommandList`] and executed by a [`RenderDevice`]:
//!
//! ```ignore
//! let mut device = WgpuDevice::new(WgpuContext::new_blocking()?);
//! let mut canvas = Canvas::new(&mut device, CanvasSettings::new(), || Vec2::new(640.0, 480.0))?
//!     .with_producer(QuadGrid::new(4, 4));
//! canvas.draw(&mut device, &mut ui)?;
//! canvas.destroy(&mut device);
//! ```

pub mod context;
pub mod core;
pub mod gui;

// Re-export commonly used types
pub use context::WgpuContext;

pub use core::{
    color, BlendState, ColorVertex, Command, CommandList, CullState, GpuError, GpuResult,
    RecordingDevice, RenderDevice, ResourceGroup, ResourceHandle, StreamingVertexBuffer,
    UniformBuffer, Vertex, WgpuDevice,
};

pub use gui::{
    Canvas, CanvasContent, CanvasSettings, ClipSpace, GeometryProducer, ImmediateUi, MenuItem,
    QuadGrid, RenderError, RenderResult, ScopeGuard, ScopeKind, ScopedContainer, ScriptedUi,
    UiComponent, UiContainer, UiMenu, VertexBatch,
};

// Re-export glam for convenience
pub use glam;
