//! wgpu render device
//!
//! Maps handles to wgpu objects and replays command lists into a command
//! encoder. Uploads are staged and copied between render-pass segments, so a
//! buffer rewritten several times in one list is drawn with the contents it had
//! at each point of the recording.

use crate::context::WgpuContext;
use crate::core::command::{Command, CommandList};
use crate::core::device::{
    BufferDesc, BufferHandle, GpuError, GpuResult, LayoutHandle, PipelineDesc, PipelineHandle,
    RenderDevice, ResourceHandle, ResourceKind, ResourceLayoutDesc, ResourceSetDesc,
    ResourceSetHandle, ShaderHandle, ShaderSetDesc, ShaderStageDesc, TargetDesc, TargetHandle,
};
use crate::core::render_target::OffscreenTarget;
use std::collections::{BTreeMap, HashMap};
use wgpu::util::DeviceExt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Vertex,
    Fragment,
}

struct ShaderEntry {
    module: wgpu::ShaderModule,
    entry_point: String,
    stage: Stage,
}

/// Bindings in effect while replaying; re-applied at the start of every pass.
#[derive(Default)]
struct Bindings {
    target: Option<TargetHandle>,
    clear: Option<[f32; 4]>,
    pipeline: Option<PipelineHandle>,
    sets: BTreeMap<u32, ResourceSetHandle>,
    vertex_buffers: BTreeMap<u32, BufferHandle>,
}

/// Render device backed by wgpu.
pub struct WgpuDevice {
    ctx: WgpuContext,
    next_id: u64,
    buffers: HashMap<BufferHandle, wgpu::Buffer>,
    layouts: HashMap<LayoutHandle, wgpu::BindGroupLayout>,
    shaders: HashMap<ShaderHandle, ShaderEntry>,
    pipelines: HashMap<PipelineHandle, wgpu::RenderPipeline>,
    sets: HashMap<ResourceSetHandle, wgpu::BindGroup>,
    targets: HashMap<TargetHandle, OffscreenTarget>,
}

impl WgpuDevice {
    /// Create a device on top of a wgpu context.
    pub fn new(ctx: WgpuContext) -> Self {
        Self {
            ctx,
            next_id: 0,
            buffers: HashMap::new(),
            layouts: HashMap::new(),
            shaders: HashMap::new(),
            pipelines: HashMap::new(),
            sets: HashMap::new(),
            targets: HashMap::new(),
        }
    }

    /// Get the wgpu context.
    pub fn context(&self) -> &WgpuContext {
        &self.ctx
    }

    /// Get an offscreen target, e.g. to show its view in the host UI.
    pub fn target(&self, target: TargetHandle) -> Option<&OffscreenTarget> {
        self.targets.get(&target)
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn unknown(handle: impl Into<ResourceHandle>) -> GpuError {
        let handle = handle.into();
        GpuError::UnknownHandle {
            kind: handle.kind(),
            id: handle.id(),
        }
    }

    fn buffer(&self, handle: BufferHandle) -> GpuResult<&wgpu::Buffer> {
        self.buffers
            .get(&handle)
            .ok_or_else(|| Self::unknown(handle))
    }

    fn layout(&self, handle: LayoutHandle) -> GpuResult<&wgpu::BindGroupLayout> {
        self.layouts
            .get(&handle)
            .ok_or_else(|| Self::unknown(handle))
    }

    fn pipeline(&self, handle: PipelineHandle) -> GpuResult<&wgpu::RenderPipeline> {
        self.pipelines
            .get(&handle)
            .ok_or_else(|| Self::unknown(handle))
    }

    fn bind_group(&self, handle: ResourceSetHandle) -> GpuResult<&wgpu::BindGroup> {
        self.sets.get(&handle).ok_or_else(|| Self::unknown(handle))
    }

    fn compile(
        &mut self,
        label: Option<&str>,
        desc: &ShaderStageDesc,
        stage: Stage,
    ) -> GpuResult<ShaderHandle> {
        if desc.source.trim().is_empty() {
            let message = format!("{stage:?} stage has no source");
            return Err(GpuError::ShaderCreationFailed(message));
        }
        let module = self
            .ctx
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label,
                source: wgpu::ShaderSource::Wgsl(desc.source.as_str().into()),
            });
        let handle = ShaderHandle(self.next_id());
        self.shaders.insert(
            handle,
            ShaderEntry {
                module,
                entry_point: desc.entry_point.clone(),
                stage,
            },
        );
        Ok(handle)
    }

    fn find_stage(&self, shaders: &[ShaderHandle], stage: Stage) -> GpuResult<&ShaderEntry> {
        shaders
            .iter()
            .filter_map(|handle| self.shaders.get(handle))
            .find(|entry| entry.stage == stage)
            .ok_or_else(|| GpuError::PipelineCreationFailed(format!("missing {stage:?} shader")))
    }

    /// Record a staged copy of `data` into `buffer` at `offset`.
    fn encode_upload(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        buffer: BufferHandle,
        offset: u64,
        data: &[u8],
    ) -> GpuResult<()> {
        let target = self.buffer(buffer)?;
        if data.is_empty() {
            return Ok(());
        }
        let size = data.len() as u64;
        let align = wgpu::COPY_BUFFER_ALIGNMENT;
        if !offset.is_multiple_of(align) || !size.is_multiple_of(align) {
            return Err(GpuError::Stream(format!(
                "upload of {size} bytes at offset {offset} is not {align}-byte aligned"
            )));
        }
        if offset + size > target.size() {
            return Err(GpuError::Stream(format!(
                "upload of {} bytes at offset {} overflows buffer of {} bytes",
                size,
                offset,
                target.size()
            )));
        }

        let staging = self
            .ctx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("rein-ui upload"),
                contents: data,
                usage: wgpu::BufferUsages::COPY_SRC,
            });
        encoder.copy_buffer_to_buffer(&staging, 0, target, offset, size);
        Ok(())
    }

    /// Run the pass-level commands of one segment.
    ///
    /// A pass is only opened when there is something to draw, or when a pending
    /// clear has to land before the target changes.
    fn encode_pass(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        bindings: &mut Bindings,
        segment: &mut Vec<Command>,
        force_clear: bool,
    ) -> GpuResult<()> {
        let has_draw = segment
            .iter()
            .any(|command| matches!(command, Command::Draw(_)));
        let needs_clear = force_clear && bindings.clear.is_some();

        if !has_draw && !needs_clear {
            for command in segment.drain(..) {
                Self::track(bindings, &command);
            }
            return Ok(());
        }

        let target_handle = bindings
            .target
            .ok_or_else(|| GpuError::Stream("draw recorded before a target was set".into()))?;
        let target = self
            .targets
            .get(&target_handle)
            .ok_or_else(|| Self::unknown(target_handle))?;

        let mut pass = target.begin_render_pass(encoder, bindings.clear.take());

        if let Some(pipeline) = bindings.pipeline {
            pass.set_pipeline(self.pipeline(pipeline)?);
        }
        for (slot, set) in &bindings.sets {
            pass.set_bind_group(*slot, self.bind_group(*set)?, &[]);
        }
        for (slot, buffer) in &bindings.vertex_buffers {
            pass.set_vertex_buffer(*slot, self.buffer(*buffer)?.slice(..));
        }

        for command in segment.drain(..) {
            Self::track(bindings, &command);
            match command {
                Command::SetPipeline(pipeline) => {
                    pass.set_pipeline(self.pipeline(pipeline)?);
                }
                Command::SetResourceSet { slot, set } => {
                    pass.set_bind_group(slot, self.bind_group(set)?, &[]);
                }
                Command::SetVertexBuffer { slot, buffer } => {
                    pass.set_vertex_buffer(slot, self.buffer(buffer)?.slice(..));
                }
                Command::Draw(vertices) => {
                    if bindings.pipeline.is_none() {
                        return Err(GpuError::Stream("draw recorded without a pipeline".into()));
                    }
                    pass.draw(vertices, 0..1);
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn track(bindings: &mut Bindings, command: &Command) {
        match command {
            Command::SetPipeline(pipeline) => bindings.pipeline = Some(*pipeline),
            Command::SetResourceSet { slot, set } => {
                bindings.sets.insert(*slot, *set);
            }
            Command::SetVertexBuffer { slot, buffer } => {
                bindings.vertex_buffers.insert(*slot, *buffer);
            }
            _ => {}
        }
    }
}

impl RenderDevice for WgpuDevice {
    fn create_buffer(&mut self, desc: &BufferDesc) -> GpuResult<BufferHandle> {
        if desc.size == 0 {
            return Err(GpuError::BufferCreationFailed("zero-sized buffer".into()));
        }
        let size = desc.size.next_multiple_of(wgpu::COPY_BUFFER_ALIGNMENT);
        let buffer = self.ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: desc.label.as_deref(),
            size,
            usage: desc.usage,
            mapped_at_creation: false,
        });
        let handle = BufferHandle(self.next_id());
        self.buffers.insert(handle, buffer);
        Ok(handle)
    }

    fn create_resource_layout(&mut self, desc: &ResourceLayoutDesc) -> GpuResult<LayoutHandle> {
        let entries: Vec<wgpu::BindGroupLayoutEntry> = desc
            .entries
            .iter()
            .map(|entry| wgpu::BindGroupLayoutEntry {
                binding: entry.binding,
                visibility: entry.visibility,
                ty: match entry.kind {
                    ResourceKind::UniformBuffer => wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                },
                count: None,
            })
            .collect();

        let layout = self
            .ctx
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: desc.label.as_deref(),
                entries: &entries,
            });
        let handle = LayoutHandle(self.next_id());
        self.layouts.insert(handle, layout);
        Ok(handle)
    }

    fn create_shader_set(&mut self, desc: &ShaderSetDesc) -> GpuResult<Vec<ShaderHandle>> {
        let label = desc.label.as_deref();
        let vertex = self.compile(label, &desc.vertex, Stage::Vertex)?;
        let fragment = match self.compile(label, &desc.fragment, Stage::Fragment) {
            Ok(fragment) => fragment,
            Err(err) => {
                self.destroy(vertex.into());
                return Err(err);
            }
        };
        Ok(vec![vertex, fragment])
    }

    fn create_pipeline(&mut self, desc: &PipelineDesc) -> GpuResult<PipelineHandle> {
        let vertex = self.find_stage(&desc.shaders, Stage::Vertex)?;
        let fragment = self.find_stage(&desc.shaders, Stage::Fragment)?;

        let layouts = desc
            .layouts
            .iter()
            .map(|handle| self.layout(*handle))
            .collect::<GpuResult<Vec<_>>>()?;

        let label = desc.label.as_deref();
        let pipeline_layout =
            self.ctx
                .device
                .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                    label,
                    bind_group_layouts: &layouts,
                    immediate_size: 0,
                });

        let attributes: Vec<wgpu::VertexAttribute> = desc
            .vertex_layout
            .attributes
            .iter()
            .map(|attribute| wgpu::VertexAttribute {
                format: attribute.format,
                offset: attribute.offset,
                shader_location: attribute.location,
            })
            .collect();

        let pipeline = self
            .ctx
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label,
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &vertex.module,
                    entry_point: Some(vertex.entry_point.as_str()),
                    buffers: &[wgpu::VertexBufferLayout {
                        array_stride: desc.vertex_layout.stride,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &attributes,
                    }],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &fragment.module,
                    entry_point: Some(fragment.entry_point.as_str()),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: desc.color_format,
                        blend: desc.blend.to_wgpu(),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: desc.topology,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: desc.cull.to_wgpu(),
                    unclipped_depth: false,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    conservative: false,
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState {
                    count: 1,
                    mask: !0,
                    alpha_to_coverage_enabled: false,
                },
                multiview_mask: None,
                cache: None,
            });

        let handle = PipelineHandle(self.next_id());
        self.pipelines.insert(handle, pipeline);
        Ok(handle)
    }

    fn create_resource_set(&mut self, desc: &ResourceSetDesc) -> GpuResult<ResourceSetHandle> {
        let layout = self.layout(desc.layout)?;

        let entries = desc
            .buffers
            .iter()
            .enumerate()
            .map(|(binding, handle)| {
                Ok(wgpu::BindGroupEntry {
                    binding: binding as u32,
                    resource: self.buffer(*handle)?.as_entire_binding(),
                })
            })
            .collect::<GpuResult<Vec<_>>>()?;

        let bind_group = self
            .ctx
            .device
            .create_bind_group(&wgpu::BindGroupDescriptor {
                label: desc.label.as_deref(),
                layout,
                entries: &entries,
            });
        let handle = ResourceSetHandle(self.next_id());
        self.sets.insert(handle, bind_group);
        Ok(handle)
    }

    fn create_render_target(&mut self, desc: &TargetDesc) -> GpuResult<TargetHandle> {
        let limit = self.ctx.device.limits().max_texture_dimension_2d;
        if desc.width > limit || desc.height > limit {
            return Err(GpuError::TargetCreationFailed(format!(
                "{}x{} exceeds the device limit of {}",
                desc.width, desc.height, limit
            )));
        }
        let target = OffscreenTarget::new(&self.ctx, desc);
        let handle = TargetHandle(self.next_id());
        self.targets.insert(handle, target);
        Ok(handle)
    }

    fn output_format(&self, target: TargetHandle) -> GpuResult<wgpu::TextureFormat> {
        self.targets
            .get(&target)
            .map(OffscreenTarget::format)
            .ok_or_else(|| Self::unknown(target))
    }

    fn submit(&mut self, commands: CommandList) -> GpuResult<()> {
        let mut encoder = self.ctx.create_encoder(commands.label());
        let mut bindings = Bindings::default();
        let mut segment = Vec::new();

        for command in commands {
            match command {
                Command::SetTarget(target) => {
                    self.encode_pass(&mut encoder, &mut bindings, &mut segment, true)?;
                    bindings.target = Some(target);
                }
                Command::ResizeTarget {
                    target,
                    width,
                    height,
                } => {
                    self.encode_pass(&mut encoder, &mut bindings, &mut segment, false)?;
                    let ctx = self.ctx.clone();
                    let offscreen = self
                        .targets
                        .get_mut(&target)
                        .ok_or_else(|| Self::unknown(target))?;
                    if offscreen.resize(&ctx, width, height) {
                        tracing::debug!("resized target {} to {}x{}", target.0, width, height);
                    }
                }
                Command::Clear(color) => {
                    self.encode_pass(&mut encoder, &mut bindings, &mut segment, false)?;
                    bindings.clear = Some(color);
                }
                Command::UpdateBuffer {
                    buffer,
                    offset,
                    data,
                } => {
                    self.encode_pass(&mut encoder, &mut bindings, &mut segment, false)?;
                    self.encode_upload(&mut encoder, buffer, offset, &data)?;
                }
                pass_command => segment.push(pass_command),
            }
        }
        self.encode_pass(&mut encoder, &mut bindings, &mut segment, true)?;

        self.ctx.submit([encoder.finish()]);
        Ok(())
    }

    fn destroy(&mut self, handle: ResourceHandle) {
        let released = match handle {
            ResourceHandle::Buffer(h) => self.buffers.remove(&h).map(|b| b.destroy()).is_some(),
            ResourceHandle::Layout(h) => self.layouts.remove(&h).is_some(),
            ResourceHandle::Shader(h) => self.shaders.remove(&h).is_some(),
            ResourceHandle::Pipeline(h) => self.pipelines.remove(&h).is_some(),
            ResourceHandle::ResourceSet(h) => self.sets.remove(&h).is_some(),
            ResourceHandle::Target(h) => self.targets.remove(&h).map(|t| t.destroy()).is_some(),
        };
        if !released {
            tracing::warn!("release of unknown {} {}", handle.kind(), handle.id());
        }
    }
}
