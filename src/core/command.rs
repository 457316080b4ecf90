//! Recorded command stream
//!
//! A [`CommandList`] is the ordered record of GPU work for one surface frame.
//! Nothing executes until a [`RenderDevice`](crate::core::RenderDevice) replays it.

use crate::core::device::{BufferHandle, PipelineHandle, ResourceSetHandle, TargetHandle};
use std::ops::Range;

/// A single recorded command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Direct subsequent draws into a color target.
    SetTarget(TargetHandle),
    /// Make sure a target has the given size, recreating its texture if needed.
    ResizeTarget {
        target: TargetHandle,
        width: u32,
        height: u32,
    },
    /// Clear the current target.
    Clear([f32; 4]),
    /// Copy bytes into a buffer at an offset.
    UpdateBuffer {
        buffer: BufferHandle,
        offset: u64,
        data: Vec<u8>,
    },
    SetPipeline(PipelineHandle),
    SetResourceSet {
        slot: u32,
        set: ResourceSetHandle,
    },
    SetVertexBuffer {
        slot: u32,
        buffer: BufferHandle,
    },
    Draw(Range<u32>),
}

/// Upload recorded by [`CommandList::update_buffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Upload<'a> {
    pub buffer: BufferHandle,
    pub offset: u64,
    pub data: &'a [u8],
}

impl Upload<'_> {
    /// Decode the uploaded bytes as a sequence of `T`.
    pub fn read<T: bytemuck::Pod>(&self) -> Vec<T> {
        self.data
            .chunks_exact(std::mem::size_of::<T>())
            .map(bytemuck::pod_read_unaligned)
            .collect()
    }
}

/// Ordered list of commands for one frame.
#[derive(Debug, Clone, Default)]
pub struct CommandList {
    label: Option<String>,
    commands: Vec<Command>,
}

impl CommandList {
    /// Create an empty command list.
    pub fn new(label: Option<&str>) -> Self {
        Self {
            label: label.map(str::to_string),
            commands: Vec::new(),
        }
    }

    /// Get the debug label, if any.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Record a switch to `target`.
    pub fn set_target(&mut self, target: TargetHandle) {
        self.commands.push(Command::SetTarget(target));
    }

    /// Record a resize of `target` to `width` x `height` pixels.
    pub fn resize_target(&mut self, target: TargetHandle, width: u32, height: u32) {
        self.commands.push(Command::ResizeTarget {
            target,
            width,
            height,
        });
    }

    /// Record a clear of the current target.
    pub fn clear(&mut self, color: [f32; 4]) {
        self.commands.push(Command::Clear(color));
    }

    /// Record a buffer update. The bytes are copied into the list.
    pub fn update_buffer(&mut self, buffer: BufferHandle, offset: u64, data: &[u8]) {
        self.commands.push(Command::UpdateBuffer {
            buffer,
            offset,
            data: data.to_vec(),
        });
    }

    /// Record a pipeline bind.
    pub fn set_pipeline(&mut self, pipeline: PipelineHandle) {
        self.commands.push(Command::SetPipeline(pipeline));
    }

    /// Record a resource set bind at `slot`.
    pub fn set_resource_set(&mut self, slot: u32, set: ResourceSetHandle) {
        self.commands.push(Command::SetResourceSet { slot, set });
    }

    /// Record a vertex buffer bind at `slot`.
    pub fn set_vertex_buffer(&mut self, slot: u32, buffer: BufferHandle) {
        self.commands
            .push(Command::SetVertexBuffer { slot, buffer });
    }

    /// Record a non-indexed draw of `vertices`.
    pub fn draw(&mut self, vertices: Range<u32>) {
        self.commands.push(Command::Draw(vertices));
    }

    /// Recorded commands, in order.
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Buffer updates, in order.
    pub fn uploads(&self) -> impl Iterator<Item = Upload<'_>> {
        self.commands.iter().filter_map(|command| match command {
            Command::UpdateBuffer {
                buffer,
                offset,
                data,
            } => Some(Upload {
                buffer: *buffer,
                offset: *offset,
                data,
            }),
            _ => None,
        })
    }

    /// Buffer updates targeting one buffer, in order.
    pub fn uploads_to(&self, buffer: BufferHandle) -> impl Iterator<Item = Upload<'_>> {
        self.uploads().filter(move |upload| upload.buffer == buffer)
    }

    /// Number of recorded draw commands.
    pub fn draw_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|command| matches!(command, Command::Draw(_)))
            .count()
    }

    /// Get the number of recorded commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Check whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Take the recorded commands, leaving the list empty.
    pub fn take(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }
}

impl IntoIterator for CommandList {
    type Item = Command;
    type IntoIter = std::vec::IntoIter<Command>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.into_iter()
    }
}
