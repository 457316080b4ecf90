//! Headless recording device
//!
//! Allocates handles without touching a GPU and records everything it is asked
//! to do. Useful for tests, benchmarks and for inspecting the frames a surface
//! produces.

use crate::core::command::{Command, CommandList};
use crate::core::device::{
    BufferDesc, BufferHandle, GpuError, GpuResult, LayoutHandle, PipelineDesc, PipelineHandle,
    RenderDevice, ResourceHandle, ResourceLayoutDesc, ResourceSetDesc, ResourceSetHandle,
    ShaderHandle, ShaderSetDesc, TargetDesc, TargetHandle,
};
use std::collections::{HashMap, HashSet};

/// Device that records creations, submissions and releases.
#[derive(Debug, Default)]
pub struct RecordingDevice {
    next_id: u64,
    creations: u64,
    fail_at: Option<u64>,
    live: HashSet<ResourceHandle>,
    created: Vec<ResourceHandle>,
    destroyed: Vec<ResourceHandle>,
    buffer_sizes: HashMap<BufferHandle, u64>,
    targets: HashMap<TargetHandle, TargetDesc>,
    submitted: Vec<CommandList>,
}

impl RecordingDevice {
    /// Create an empty device.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the `n`-th creation call (1-based, counted from now) fail.
    pub fn fail_on_creation(&mut self, n: u64) {
        self.fail_at = Some(self.creations + n);
    }

    /// Handles created so far, in creation order.
    pub fn created(&self) -> &[ResourceHandle] {
        &self.created
    }

    /// Handles released so far, in release order.
    pub fn destroyed(&self) -> &[ResourceHandle] {
        &self.destroyed
    }

    /// Number of handles created and not yet released.
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Check whether `handle` was created and not yet destroyed.
    pub fn is_live<H: Into<ResourceHandle>>(&self, handle: H) -> bool {
        self.live.contains(&handle.into())
    }

    /// Size in bytes a buffer was created with.
    pub fn buffer_size(&self, buffer: BufferHandle) -> Option<u64> {
        self.buffer_sizes.get(&buffer).copied()
    }

    /// Current size of a target, including resizes recorded by submitted lists.
    pub fn target_size(&self, target: TargetHandle) -> Option<(u32, u32)> {
        self.targets
            .get(&target)
            .map(|desc| (desc.width, desc.height))
    }

    /// Submitted command lists, in order.
    pub fn submitted(&self) -> &[CommandList] {
        &self.submitted
    }

    /// The most recent submission.
    pub fn last_submission(&self) -> Option<&CommandList> {
        self.submitted.last()
    }

    fn allocate<H>(&mut self, kind: &'static str, make: impl FnOnce(u64) -> H) -> GpuResult<H>
    where
        H: Into<ResourceHandle> + Copy,
    {
        self.creations += 1;
        if self.fail_at == Some(self.creations) {
            self.fail_at = None;
            return Err(GpuError::Stream(format!("injected failure creating {kind}")));
        }

        self.next_id += 1;
        let handle = make(self.next_id);
        self.live.insert(handle.into());
        self.created.push(handle.into());
        Ok(handle)
    }

    fn check_live<H: Into<ResourceHandle>>(&self, handle: H) -> GpuResult<()> {
        let handle = handle.into();
        if self.live.contains(&handle) {
            Ok(())
        } else {
            Err(GpuError::UnknownHandle {
                kind: handle.kind(),
                id: handle.id(),
            })
        }
    }
}

impl RenderDevice for RecordingDevice {
    fn create_buffer(&mut self, desc: &BufferDesc) -> GpuResult<BufferHandle> {
        let buffer = self
            .allocate("buffer", BufferHandle)
            .map_err(|e| GpuError::BufferCreationFailed(e.to_string()))?;
        self.buffer_sizes.insert(buffer, desc.size);
        Ok(buffer)
    }

    fn create_resource_layout(&mut self, _desc: &ResourceLayoutDesc) -> GpuResult<LayoutHandle> {
        self.allocate("layout", LayoutHandle)
            .map_err(|e| GpuError::LayoutCreationFailed(e.to_string()))
    }

    fn create_shader_set(&mut self, _desc: &ShaderSetDesc) -> GpuResult<Vec<ShaderHandle>> {
        let vertex = self
            .allocate("vertex shader", ShaderHandle)
            .map_err(|e| GpuError::ShaderCreationFailed(e.to_string()))?;
        let fragment = match self.allocate("fragment shader", ShaderHandle) {
            Ok(fragment) => fragment,
            Err(e) => {
                self.destroy(vertex.into());
                return Err(GpuError::ShaderCreationFailed(e.to_string()));
            }
        };
        Ok(vec![vertex, fragment])
    }

    fn create_pipeline(&mut self, desc: &PipelineDesc) -> GpuResult<PipelineHandle> {
        for shader in &desc.shaders {
            self.check_live(*shader)?;
        }
        for layout in &desc.layouts {
            self.check_live(*layout)?;
        }
        self.allocate("pipeline", PipelineHandle)
            .map_err(|e| GpuError::PipelineCreationFailed(e.to_string()))
    }

    fn create_resource_set(&mut self, desc: &ResourceSetDesc) -> GpuResult<ResourceSetHandle> {
        self.check_live(desc.layout)?;
        for buffer in &desc.buffers {
            self.check_live(*buffer)?;
        }
        self.allocate("resource set", ResourceSetHandle)
            .map_err(|e| GpuError::ResourceSetCreationFailed(e.to_string()))
    }

    fn create_render_target(&mut self, desc: &TargetDesc) -> GpuResult<TargetHandle> {
        let target = self
            .allocate("target", TargetHandle)
            .map_err(|e| GpuError::TargetCreationFailed(e.to_string()))?;
        self.targets.insert(target, desc.clone());
        Ok(target)
    }

    fn output_format(&self, target: TargetHandle) -> GpuResult<wgpu::TextureFormat> {
        self.targets
            .get(&target)
            .map(|desc| desc.format)
            .ok_or(GpuError::UnknownHandle {
                kind: "target",
                id: target.0,
            })
    }

    fn submit(&mut self, commands: CommandList) -> GpuResult<()> {
        for command in commands.commands() {
            match command {
                Command::SetTarget(target) => self.check_live(*target)?,
                Command::ResizeTarget {
                    target,
                    width,
                    height,
                } => {
                    self.check_live(*target)?;
                    if let Some(desc) = self.targets.get_mut(target) {
                        desc.width = *width;
                        desc.height = *height;
                    }
                }
                Command::UpdateBuffer {
                    buffer,
                    offset,
                    data,
                } => {
                    self.check_live(*buffer)?;
                    let size = self.buffer_sizes.get(buffer).copied().unwrap_or(0);
                    if offset + data.len() as u64 > size {
                        return Err(GpuError::Stream(format!(
                            "update of {} bytes at offset {} overflows buffer of {} bytes",
                            data.len(),
                            offset,
                            size
                        )));
                    }
                }
                Command::SetPipeline(pipeline) => self.check_live(*pipeline)?,
                Command::SetResourceSet { set, .. } => self.check_live(*set)?,
                Command::SetVertexBuffer { buffer, .. } => self.check_live(*buffer)?,
                Command::Clear(_) | Command::Draw(_) => {}
            }
        }
        self.submitted.push(commands);
        Ok(())
    }

    /// # Panics
    ///
    /// Panics when a handle is released twice or was never created here.
    fn destroy(&mut self, handle: ResourceHandle) {
        assert!(
            self.live.remove(&handle),
            "{} {} released twice or never created",
            handle.kind(),
            handle.id()
        );
        if let ResourceHandle::Buffer(buffer) = handle {
            self.buffer_sizes.remove(&buffer);
        }
        if let ResourceHandle::Target(target) = handle {
            self.targets.remove(&target);
        }
        self.destroyed.push(handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_injected_failure() {
        let mut device = RecordingDevice::new();
        device.fail_on_creation(2);
        assert!(device.create_buffer(&BufferDesc::uniform("a", 4)).is_ok());
        assert!(matches!(
            device.create_buffer(&BufferDesc::uniform("b", 4)),
            Err(GpuError::BufferCreationFailed(_))
        ));
        assert!(device.create_buffer(&BufferDesc::uniform("c", 4)).is_ok());
        assert_eq!(device.live_count(), 2);
    }

    #[test]
    fn test_submit_rejects_overflowing_update() {
        let mut device = RecordingDevice::new();
        let buffer = device.create_buffer(&BufferDesc::vertex("v", 8)).unwrap();
        let mut list = CommandList::default();
        list.update_buffer(buffer, 4, &[0; 8]);
        assert!(device.submit(list).is_err());
        assert!(device.submitted().is_empty());
    }

    #[test]
    #[should_panic(expected = "released twice")]
    fn test_double_destroy_panics() {
        let mut device = RecordingDevice::new();
        let buffer = device.create_buffer(&BufferDesc::vertex("v", 8)).unwrap();
        device.destroy(buffer.into());
        device.destroy(buffer.into());
    }
}
