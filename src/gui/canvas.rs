//! Canvas surface
//!
//! A [`Canvas`] owns an offscreen target, the pipeline that draws into it and
//! every device object both need. Each frame it clears the target, uploads a
//! fresh projection, binds its pipeline and then lets its content fill the
//! target: either a [`GeometryProducer`] streaming vertices or a component tree.

use crate::core::{
    BufferHandle, ColorVertex, CommandList, GpuError, GpuResult, LayoutEntry, PipelineDesc,
    PipelineHandle, RenderDevice, ResourceGroup, ResourceKind, ResourceLayoutDesc, ResourceSetDesc,
    ResourceSetHandle, ShaderSetDesc, ShaderStageDesc, StreamingVertexBuffer, TargetDesc,
    TargetHandle, UniformBuffer, Vertex,
};
use crate::gui::component::{RenderResult, UiComponent};
use crate::gui::container::UiContainer;
use crate::gui::geometry::{GeometryProducer, VertexBatch};
use crate::gui::projection::projection;
use crate::gui::settings::CanvasSettings;
use crate::gui::ui::ImmediateUi;
use glam::Vec2;

/// WGSL source of the canvas pipeline.
pub const CANVAS_SHADER: &str = include_str!("../shaders/canvas.wgsl");

/// What fills a canvas each frame.
pub enum CanvasContent {
    /// Nothing; the target is only cleared.
    Empty,
    Producer(Box<dyn GeometryProducer>),
    Tree(UiContainer),
}

/// Device objects created together with a canvas.
struct CanvasParts {
    target: TargetHandle,
    pipeline: PipelineHandle,
    resource_set: ResourceSetHandle,
    projection: UniformBuffer<[[f32; 4]; 4]>,
    batch: StreamingVertexBuffer<ColorVertex>,
}

/// An offscreen drawing surface shown inside the UI.
pub struct Canvas {
    settings: CanvasSettings,
    size: Box<dyn FnMut() -> Vec2>,
    resources: ResourceGroup,
    parts: CanvasParts,
    content: CanvasContent,
    frames: u64,
}

impl Canvas {
    /// Create a canvas sized by `size`, which is queried once per frame.
    ///
    /// If any device object fails to create, the ones already created are
    /// released before the error is returned.
    pub fn new<D>(
        device: &mut D,
        settings: CanvasSettings,
        size: impl FnMut() -> Vec2 + 'static,
    ) -> GpuResult<Self>
    where
        D: RenderDevice + ?Sized,
    {
        if settings.capacity == 0 {
            return Err(GpuError::InvalidCapacity);
        }
        let mut size = size;
        let (width, height) = pixel_size(size());

        let (resources, parts) =
            ResourceGroup::try_build(device, settings.label.clone(), |device, group| {
                let label = settings.label.as_str();

                let target = group.add(device.create_render_target(&TargetDesc {
                    label: Some(format!("{label} target")),
                    width,
                    height,
                    format: settings.format,
                })?);
                let color_format = device.output_format(target)?;

                let projection =
                    UniformBuffer::<[[f32; 4]; 4]>::new(device, &format!("{label} projection"))?;
                group.add(projection.buffer());

                let layout = group.add(device.create_resource_layout(&ResourceLayoutDesc {
                    label: Some(format!("{label} layout")),
                    entries: vec![LayoutEntry {
                        name: "projection".to_string(),
                        binding: 0,
                        kind: ResourceKind::UniformBuffer,
                        visibility: wgpu::ShaderStages::VERTEX,
                    }],
                })?);

                let shaders = group.add_many(device.create_shader_set(&ShaderSetDesc {
                    label: Some(format!("{label} shaders")),
                    vertex: ShaderStageDesc {
                        source: CANVAS_SHADER.to_string(),
                        entry_point: "vs_main".to_string(),
                    },
                    fragment: ShaderStageDesc {
                        source: CANVAS_SHADER.to_string(),
                        entry_point: "fs_main".to_string(),
                    },
                })?);

                let pipeline = group.add(device.create_pipeline(&PipelineDesc {
                    label: Some(format!("{label} pipeline")),
                    shaders,
                    vertex_layout: ColorVertex::layout(),
                    layouts: vec![layout],
                    color_format,
                    blend: settings.blend,
                    cull: settings.cull,
                    topology: wgpu::PrimitiveTopology::TriangleList,
                })?);

                let resource_set = group.add(device.create_resource_set(&ResourceSetDesc {
                    label: Some(format!("{label} resources")),
                    layout,
                    buffers: vec![projection.buffer()],
                })?);

                let batch = StreamingVertexBuffer::new(
                    device,
                    settings.capacity,
                    &format!("{label} vertices"),
                )?;
                group.add(batch.buffer());

                Ok(CanvasParts {
                    target,
                    pipeline,
                    resource_set,
                    projection,
                    batch,
                })
            })?;

        tracing::debug!(
            "created canvas '{}' ({}x{}, {} device objects)",
            settings.label,
            width,
            height,
            resources.len()
        );

        Ok(Self {
            settings,
            size: Box::new(size),
            resources,
            parts,
            content: CanvasContent::Empty,
            frames: 0,
        })
    }

    /// Fill the canvas with streamed geometry.
    pub fn with_producer(mut self, producer: impl GeometryProducer + 'static) -> Self {
        self.content = CanvasContent::Producer(Box::new(producer));
        self
    }

    /// Fill the canvas with a component tree.
    pub fn with_tree(mut self, root: UiContainer) -> Self {
        self.content = CanvasContent::Tree(root);
        self
    }

    /// Replace what fills the canvas from the next frame on.
    pub fn set_content(&mut self, content: CanvasContent) {
        self.content = content;
    }

    /// Get the canvas content.
    pub fn content_mut(&mut self) -> &mut CanvasContent {
        &mut self.content
    }

    /// Record one frame into `commands` without showing it.
    pub fn record_frame(
        &mut self,
        ui: &mut dyn ImmediateUi,
        commands: &mut CommandList,
    ) -> RenderResult<Vec2> {
        let size = (self.size)();
        let (width, height) = pixel_size(size);
        let parts = &mut self.parts;

        commands.resize_target(parts.target, width, height);
        commands.set_target(parts.target);
        commands.clear(self.settings.clear_color);

        let pixels = Vec2::new(width as f32, height as f32);
        let matrix = projection(pixels, self.settings.clip_space).to_cols_array_2d();
        parts.projection.update(commands, &matrix);

        commands.set_pipeline(parts.pipeline);
        commands.set_resource_set(0, parts.resource_set);

        match &mut self.content {
            CanvasContent::Empty => {}
            CanvasContent::Producer(producer) => {
                parts.batch.reset();
                let mut batch = VertexBatch::new(&mut parts.batch, commands);
                producer.produce(&mut batch, pixels);
                parts.batch.flush(commands);
            }
            CanvasContent::Tree(root) => root.render(ui, commands)?,
        }

        self.frames += 1;
        tracing::trace!(
            "recorded frame {} of canvas '{}'",
            self.frames,
            self.settings.label
        );
        Ok(size)
    }

    /// Render a frame and submit it to `device` on its own command list.
    pub fn draw<D>(&mut self, device: &mut D, ui: &mut dyn ImmediateUi) -> RenderResult<()>
    where
        D: RenderDevice + ?Sized,
    {
        let mut commands = CommandList::new(Some(&self.settings.label));
        self.render(ui, &mut commands)?;
        device.submit(commands)?;
        Ok(())
    }

    /// Change the streaming buffer capacity. Takes effect from the next frame.
    pub fn set_capacity<D>(&mut self, device: &mut D, capacity: usize) -> GpuResult<()>
    where
        D: RenderDevice + ?Sized,
    {
        self.parts
            .batch
            .recreate(device, &mut self.resources, capacity)?;
        self.settings.capacity = capacity;
        Ok(())
    }

    /// Set the color the target is cleared to each frame.
    pub fn set_clear_color(&mut self, color: [f32; 4]) {
        self.settings.clear_color = color;
    }

    /// Release every device object of the canvas, newest first.
    pub fn destroy<D>(mut self, device: &mut D)
    where
        D: RenderDevice + ?Sized,
    {
        tracing::debug!("destroying canvas '{}'", self.settings.label);
        self.resources.dispose(device);
    }

    /// Get the canvas label.
    pub fn label(&self) -> &str {
        &self.settings.label
    }

    /// Get the canvas settings.
    pub fn settings(&self) -> &CanvasSettings {
        &self.settings
    }

    /// Get the offscreen target.
    pub fn target(&self) -> TargetHandle {
        self.parts.target
    }

    /// Get the canvas pipeline.
    pub fn pipeline(&self) -> PipelineHandle {
        self.parts.pipeline
    }

    /// Get the resource set bound at slot 0.
    pub fn resource_set(&self) -> ResourceSetHandle {
        self.parts.resource_set
    }

    /// Get the projection uniform buffer.
    pub fn projection_buffer(&self) -> BufferHandle {
        self.parts.projection.buffer()
    }

    /// Get the streaming vertex buffer.
    pub fn batch(&self) -> &StreamingVertexBuffer<ColorVertex> {
        &self.parts.batch
    }

    /// Get the device objects owned by the canvas.
    pub fn resources(&self) -> &ResourceGroup {
        &self.resources
    }

    /// Frames recorded since creation.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl UiComponent for Canvas {
    /// Record a frame into the canvas target, then show the target in the UI.
    fn render(&mut self, ui: &mut dyn ImmediateUi, commands: &mut CommandList) -> RenderResult<()> {
        let size = self.record_frame(ui, commands)?;
        ui.show_target(self.parts.target, size.to_array());
        Ok(())
    }
}

/// Target size in whole pixels, at least one in each direction.
fn pixel_size(size: Vec2) -> (u32, u32) {
    let size = size.max(Vec2::ONE).ceil();
    (size.x as u32, size.y as u32)
}
