//! GPU buffer abstractions
//!
//! [`StreamingVertexBuffer`] batches per-frame vertices into a fixed-size device
//! buffer; [`UniformBuffer`] is a typed uniform rewritten through the command list.

use crate::core::command::CommandList;
use crate::core::device::{BufferDesc, BufferHandle, GpuError, GpuResult, RenderDevice};
use crate::core::resources::ResourceGroup;
use bytemuck::Pod;
use std::marker::PhantomData;

/// Fixed-capacity vertex buffer with push/flush batching.
///
/// Vertices are staged on the host. A flush records an upload of the staged
/// vertices followed by a draw of exactly those vertices, so one device buffer
/// serves any number of batches in a frame.
///
/// A push that fills the staging array flushes on its own. Whatever is pending
/// when the producer is done must be flushed by the caller before the frame is
/// submitted, otherwise it is never drawn:
///
/// ```ignore
/// batch.reset();
/// for v in vertices {
///     batch.push(&mut commands, v);
/// }
/// batch.flush(&mut commands); // trailing flush
/// ```
pub struct StreamingVertexBuffer<V> {
    buffer: BufferHandle,
    staging: Vec<V>,
    capacity: usize,
    flushes: u64,
    label: String,
}

impl<V: Pod> StreamingVertexBuffer<V> {
    /// Create a streaming buffer holding up to `capacity` vertices.
    pub fn new<D>(device: &mut D, capacity: usize, label: &str) -> GpuResult<Self>
    where
        D: RenderDevice + ?Sized,
    {
        if capacity == 0 {
            return Err(GpuError::InvalidCapacity);
        }
        let buffer = device.create_buffer(&BufferDesc::vertex(label, Self::byte_size(capacity)))?;
        tracing::debug!(
            "created streaming buffer '{}' for {} vertices",
            label,
            capacity
        );

        Ok(Self {
            buffer,
            staging: Vec::with_capacity(capacity),
            capacity,
            flushes: 0,
            label: label.to_string(),
        })
    }

    fn byte_size(capacity: usize) -> u64 {
        (capacity * std::mem::size_of::<V>()) as u64
    }

    /// Drop pending vertices without uploading them. No GPU work.
    pub fn reset(&mut self) {
        self.staging.clear();
    }

    /// Stage one vertex, flushing when the staging array becomes full.
    pub fn push(&mut self, commands: &mut CommandList, vertex: V) {
        assert!(
            self.staging.len() < self.capacity,
            "streaming buffer '{}' overran its capacity of {}",
            self.label,
            self.capacity
        );
        self.staging.push(vertex);
        if self.staging.len() == self.capacity {
            self.flush(commands);
        }
    }

    /// Stage a sequence of vertices, draining in capacity-sized uploads.
    pub fn extend<I>(&mut self, commands: &mut CommandList, vertices: I)
    where
        I: IntoIterator<Item = V>,
    {
        for vertex in vertices {
            self.push(commands, vertex);
        }
    }

    /// Upload and draw the pending vertices. Does nothing when none are pending.
    pub fn flush(&mut self, commands: &mut CommandList) {
        if self.staging.is_empty() {
            return;
        }

        let count = self.staging.len() as u32;
        commands.update_buffer(self.buffer, 0, bytemuck::cast_slice(&self.staging));
        commands.set_vertex_buffer(0, self.buffer);
        commands.draw(0..count);

        self.flushes += 1;
        self.staging.clear();
        tracing::trace!("flushed {} vertices from '{}'", count, self.label);
    }

    /// Replace the device buffer with one of a new capacity.
    ///
    /// Pending vertices are discarded, also when the capacity is unchanged. The
    /// buffer keeps its release position in `resources`.
    ///
    /// # Panics
    ///
    /// Panics if `resources` does not own the current buffer.
    pub fn recreate<D>(
        &mut self,
        device: &mut D,
        resources: &mut ResourceGroup,
        capacity: usize,
    ) -> GpuResult<()>
    where
        D: RenderDevice + ?Sized,
    {
        if capacity == 0 {
            return Err(GpuError::InvalidCapacity);
        }
        assert!(
            resources.contains(self.buffer),
            "streaming buffer '{}' is not owned by resource group '{}'",
            self.label,
            resources.label()
        );
        self.staging.clear();
        if capacity == self.capacity {
            return Ok(());
        }

        let buffer =
            device.create_buffer(&BufferDesc::vertex(&self.label, Self::byte_size(capacity)))?;
        self.buffer = resources.replace(device, self.buffer, buffer);
        self.capacity = capacity;
        self.staging = Vec::with_capacity(capacity);
        tracing::debug!(
            "recreated streaming buffer '{}' for {} vertices",
            self.label,
            capacity
        );
        Ok(())
    }

    /// Number of staged, not yet uploaded vertices.
    pub fn count(&self) -> usize {
        self.staging.len()
    }

    /// Get the capacity in vertices.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Check whether no vertices are pending.
    pub fn is_empty(&self) -> bool {
        self.staging.is_empty()
    }

    /// Total flushes since creation.
    pub fn flushes(&self) -> u64 {
        self.flushes
    }

    /// The device buffer.
    pub fn buffer(&self) -> BufferHandle {
        self.buffer
    }
}

/// A typed uniform buffer.
pub struct UniformBuffer<T> {
    buffer: BufferHandle,
    _marker: PhantomData<T>,
}

impl<T: Pod> UniformBuffer<T> {
    /// Create a uniform buffer sized for one `T`.
    pub fn new<D>(device: &mut D, label: &str) -> GpuResult<Self>
    where
        D: RenderDevice + ?Sized,
    {
        let size = std::mem::size_of::<T>() as u64;
        let buffer = device.create_buffer(&BufferDesc::uniform(label, size))?;
        Ok(Self {
            buffer,
            _marker: PhantomData,
        })
    }

    /// Record an update of the buffer contents.
    pub fn update(&self, commands: &mut CommandList, data: &T) {
        commands.update_buffer(self.buffer, 0, bytemuck::bytes_of(data));
    }

    /// The device buffer.
    pub fn buffer(&self) -> BufferHandle {
        self.buffer
    }
}
