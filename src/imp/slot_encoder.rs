// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
An executor for encoder-based native APIs with flat slot tables.

State setters only record what they were given and mark it dirty. The state is applied
to the native encoder immediately before the next draw or dispatch, in this order:

1. pipeline state, when the pipeline changed
2. viewports
3. scissor rects, when the pipeline enables the scissor test
4. dirty resource sets, one native call per resource
5. dirty vertex buffers

Native encoders carry no state across their lifetime, so opening a render encoder marks
everything dirty again.

At most one encoder is open. Render commands open a render encoder, copies open a blit
encoder (or a compute encoder for copies the blit path cannot express), and dispatches
open a compute encoder; switching ends the open encoder first.
*/

use crate::bindings::bound::BoundResourceCache;
use crate::bindings::dirty_tracking::DirtySlots;
use crate::bindings::layout::{ResourceBindingInfo, SlotClass};
use crate::bindings::resource_set::ResourceSet;
use crate::bindings::resources::{BindableResource, DeviceBuffer, Texture};
use crate::bindings::visible_to::ShaderStages;
use crate::command::{
    BufferCopy, DispatchArgs, DrawArgs, DrawIndexedArgs, Error, Executor, IndexFormat,
    IndirectArgs, TextureCopy, illegal_value,
};
use crate::device::{Completion, Device, DeviceFeatures};
use crate::imp::native::{EncoderKind, IndexedDraw, NativeEncoderApi, RenderStage};
use crate::pass::{LoadAction, RenderPassDescription, RgbaFloat, ScissorRect, Viewport};
use crate::pipeline::{Pipeline, PrimitiveTopology};
use crate::staging::{StagingBlock, StagingError, StagingMemoryPool};
use logwise::privacy::LogIt;
use std::sync::Arc;

/// When a render pass opens its native encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EncoderLifecycle {
    /// The encoder opens when the pass begins.
    #[default]
    Immediate,
    /// The encoder opens at the first draw, so clears recorded before it become load
    /// actions of the encoder. A pass ended before any draw and without clears opens no
    /// encoder at all.
    Deferred,
}

#[derive(Debug, Clone)]
struct VertexBufferBinding {
    buffer: DeviceBuffer,
    offset: u32,
}

#[derive(Debug, Clone)]
struct IndexBufferBinding {
    buffer: DeviceBuffer,
    format: IndexFormat,
    offset: u32,
}

/// Translates abstract commands into encoder-based native calls.
#[derive(Debug)]
pub struct SlotEncoderExecutor<A: NativeEncoderApi> {
    native: A,
    lifecycle: EncoderLifecycle,
    features: DeviceFeatures,
    staging: Arc<StagingMemoryPool>,
    //blocks read by recorded copies; returned once execution completes
    held_blocks: Vec<StagingBlock>,
    open: Option<EncoderKind>,
    pass: Option<RenderPassDescription>,
    graphics_pipeline: Option<Pipeline>,
    pipeline_dirty: bool,
    compute_pipeline: Option<Pipeline>,
    compute_pipeline_dirty: bool,
    viewports: Vec<Viewport>,
    viewports_dirty: bool,
    scissor_rects: Vec<ScissorRect>,
    scissor_rects_dirty: bool,
    graphics_sets: BoundResourceCache,
    graphics_sets_dirty: DirtySlots,
    compute_sets: BoundResourceCache,
    compute_sets_dirty: DirtySlots,
    vertex_buffers: Vec<Option<VertexBufferBinding>>,
    vertex_buffers_dirty: DirtySlots,
    index_buffer: Option<IndexBufferBinding>,
}

impl<A: NativeEncoderApi> SlotEncoderExecutor<A> {
    pub fn new(native: A, lifecycle: EncoderLifecycle, device: &Device) -> Self {
        SlotEncoderExecutor {
            native,
            lifecycle,
            features: *device.features(),
            staging: device.staging_pool().clone(),
            held_blocks: Vec::new(),
            open: None,
            pass: None,
            graphics_pipeline: None,
            pipeline_dirty: false,
            compute_pipeline: None,
            compute_pipeline_dirty: false,
            viewports: Vec::new(),
            viewports_dirty: false,
            scissor_rects: Vec::new(),
            scissor_rects_dirty: false,
            graphics_sets: BoundResourceCache::new(),
            graphics_sets_dirty: DirtySlots::new(),
            compute_sets: BoundResourceCache::new(),
            compute_sets_dirty: DirtySlots::new(),
            vertex_buffers: Vec::new(),
            vertex_buffers_dirty: DirtySlots::new(),
            index_buffer: None,
        }
    }

    pub fn native(&self) -> &A {
        &self.native
    }
    pub fn native_mut(&mut self) -> &mut A {
        &mut self.native
    }
    pub fn lifecycle(&self) -> EncoderLifecycle {
        self.lifecycle
    }
    /// The kind of the open encoder.
    pub fn open_encoder(&self) -> Option<EncoderKind> {
        self.open
    }
    /// Number of staging blocks waiting for the current execution to complete.
    pub fn held_staging_blocks(&self) -> usize {
        self.held_blocks.len()
    }

    fn end_open_encoder(&mut self) {
        if let Some(kind) = self.open.take() {
            logwise::trace_sync!("Ending {kind} encoder", kind = LogIt(&kind));
            self.native.end_encoder(kind);
        }
    }

    /// Makes a blit or compute encoder the open one.
    fn ensure_encoder(&mut self, kind: EncoderKind) {
        if self.open == Some(kind) {
            return;
        }
        self.end_open_encoder();
        logwise::trace_sync!("Opening {kind} encoder", kind = LogIt(&kind));
        match kind {
            EncoderKind::Blit => self.native.open_blit_encoder(),
            EncoderKind::Compute => {
                self.native.open_compute_encoder();
                self.compute_pipeline_dirty = self.compute_pipeline.is_some();
                self.compute_sets_dirty.mark_all_dirty();
            }
            EncoderKind::Render => illegal_value("encoder kind without a pass", kind),
        }
        self.open = Some(kind);
    }

    fn open_render_encoder(&mut self) {
        if self.pass.is_none() {
            return;
        }
        self.end_open_encoder();
        let Some(pass) = self.pass.as_mut() else {
            return;
        };
        logwise::trace_sync!(
            "Opening render encoder for {framebuffer}",
            framebuffer = LogIt(&pass.framebuffer.id())
        );
        self.native.open_render_encoder(pass);
        //later encoders of this pass continue from what this one produced
        for color in &mut pass.color_attachments {
            color.load = LoadAction::Load;
        }
        let has_stencil = pass
            .framebuffer
            .depth_target()
            .is_some_and(|d| d.target.format().has_stencil());
        if let Some(depth) = &mut pass.depth_attachment {
            depth.load = LoadAction::Load;
            if has_stencil {
                depth.stencil_load = LoadAction::Load;
            }
        }
        self.open = Some(EncoderKind::Render);
        self.pipeline_dirty = self.graphics_pipeline.is_some();
        self.viewports_dirty = true;
        self.scissor_rects_dirty = true;
        self.graphics_sets_dirty.mark_all_dirty();
        self.vertex_buffers_dirty.mark_all_dirty();
    }

    /// Opens the render encoder of the current pass if needed. `false` outside a pass.
    fn ensure_render_encoder(&mut self) -> bool {
        if self.open == Some(EncoderKind::Render) {
            return true;
        }
        if self.pass.is_none() {
            return false;
        }
        self.open_render_encoder();
        true
    }

    fn has_pending_clears(&self) -> bool {
        self.pass.as_ref().is_some_and(|pass| {
            pass.color_attachments
                .iter()
                .any(|c| c.load == LoadAction::Clear)
                || pass.depth_attachment.as_ref().is_some_and(|d| {
                    d.load == LoadAction::Clear || d.stencil_load == LoadAction::Clear
                })
        })
    }

    /// Clears fold into the load actions of the next render encoder of this pass.
    fn fold_clear(&mut self, fold: impl FnOnce(&mut RenderPassDescription)) {
        let was_open = self.open == Some(EncoderKind::Render);
        if was_open {
            self.end_open_encoder();
        }
        if let Some(pass) = self.pass.as_mut() {
            fold(pass);
        }
        if was_open && self.lifecycle == EncoderLifecycle::Immediate {
            self.open_render_encoder();
        }
    }

    fn topology(&self) -> PrimitiveTopology {
        self.graphics_pipeline
            .as_ref()
            .and_then(|p| p.graphics_description())
            .map(|g| g.topology)
            .unwrap_or_default()
    }

    /// Applies dirty render state. `false` when there is nothing to draw with.
    fn pre_draw(&mut self) -> bool {
        if !self.ensure_render_encoder() {
            logwise::warn_sync!("Draw outside a render pass was dropped");
            return false;
        }
        let Some(pipeline) = self.graphics_pipeline.clone() else {
            logwise::warn_sync!("Draw without a graphics pipeline was dropped");
            return false;
        };
        if self.pipeline_dirty {
            self.flush_pipeline_state(&pipeline);
            self.pipeline_dirty = false;
        }
        if self.viewports_dirty {
            if self.features.multiple_viewports {
                self.native.set_viewports(&self.viewports);
            } else {
                for viewport in &self.viewports {
                    self.native.set_viewport(*viewport);
                }
            }
            self.viewports_dirty = false;
        }
        if self.scissor_rects_dirty && pipeline.scissor_test_enabled() {
            if self.features.multiple_viewports {
                self.native.set_scissor_rects(&self.scissor_rects);
            } else {
                for rect in &self.scissor_rects {
                    self.native.set_scissor_rect(*rect);
                }
            }
            self.scissor_rects_dirty = false;
        }
        for slot in self.graphics_sets_dirty.take_dirty() {
            self.activate_graphics_set(&pipeline, slot);
        }
        let model = pipeline.binding_model();
        let non_vertex_buffers = pipeline.non_vertex_buffer_count();
        for index in self.vertex_buffers_dirty.take_dirty() {
            if let Some(Some(binding)) = self.vertex_buffers.get(index) {
                self.native.set_render_buffer(
                    RenderStage::Vertex,
                    &binding.buffer,
                    binding.offset,
                    model.vertex_buffer_slot(index as u32, non_vertex_buffers),
                );
            }
        }
        true
    }

    fn flush_pipeline_state(&mut self, pipeline: &Pipeline) {
        let Some(description) = pipeline.graphics_description() else {
            illegal_value("pipeline at the graphics bind point", pipeline.name());
        };
        self.native.set_render_pipeline_state(pipeline);
        self.native.set_cull_mode(description.rasterizer.cull_mode);
        self.native.set_front_facing(description.rasterizer.front_face);
        self.native.set_triangle_fill_mode(description.rasterizer.fill_mode);
        self.native.set_blend_color(description.blend_color);
        let has_depth = self
            .pass
            .as_ref()
            .is_some_and(|p| p.framebuffer.depth_target().is_some());
        if has_depth {
            self.native.set_depth_stencil_state(description.depth_stencil);
            self.native
                .set_depth_clip_enabled(description.rasterizer.depth_clip_enabled);
            self.native
                .set_stencil_reference(description.depth_stencil.stencil_reference);
        }
    }

    fn activate_graphics_set(&mut self, pipeline: &Pipeline, slot: usize) {
        if slot >= pipeline.resource_layouts().len() {
            return;
        }
        let Some(info) = self.graphics_sets.get(slot) else {
            return;
        };
        let bases = pipeline.slot_bases();
        let buffer_base = bases.base(slot, SlotClass::Buffer);
        let texture_base = bases.base(slot, SlotClass::Texture);
        let sampler_base = bases.base(slot, SlotClass::Sampler);
        let model = pipeline.binding_model();
        let vertex_buffers = pipeline.vertex_buffer_count();
        let native = &mut self.native;
        for_each_binding(&info.set, &info.offsets, |resource, element_slot, stages, class, dynamic_offset| {
            let render_stages = [
                (ShaderStages::VERTEX, RenderStage::Vertex),
                (ShaderStages::FRAGMENT, RenderStage::Fragment),
            ];
            for (flag, stage) in render_stages {
                if !stages.contains(flag) {
                    continue;
                }
                match class {
                    SlotClass::Buffer => {
                        let Some(range) = resource.buffer_range() else {
                            illegal_value("resource in a buffer element", resource);
                        };
                        let native_slot = match stage {
                            RenderStage::Vertex => {
                                model.vertex_stage_buffer_slot(element_slot, buffer_base, vertex_buffers)
                            }
                            RenderStage::Fragment => model.other_stage_buffer_slot(element_slot, buffer_base),
                        };
                        native.set_render_buffer(
                            stage,
                            &range.buffer,
                            range.offset + dynamic_offset,
                            native_slot,
                        );
                    }
                    SlotClass::Texture => {
                        native.set_render_texture(stage, resource, element_slot + texture_base)
                    }
                    SlotClass::Sampler => {
                        let BindableResource::Sampler(sampler) = resource else {
                            illegal_value("resource in a sampler element", resource);
                        };
                        native.set_render_sampler(stage, sampler, element_slot + sampler_base);
                    }
                }
            }
        });
    }

    fn activate_compute_set(&mut self, pipeline: &Pipeline, slot: usize) {
        if slot >= pipeline.resource_layouts().len() {
            return;
        }
        let Some(info) = self.compute_sets.get(slot) else {
            return;
        };
        let bases = pipeline.slot_bases();
        let buffer_base = bases.base(slot, SlotClass::Buffer);
        let texture_base = bases.base(slot, SlotClass::Texture);
        let sampler_base = bases.base(slot, SlotClass::Sampler);
        let native = &mut self.native;
        for_each_binding(&info.set, &info.offsets, |resource, element_slot, stages, class, dynamic_offset| {
            if !stages.contains(ShaderStages::COMPUTE) {
                return;
            }
            match class {
                SlotClass::Buffer => {
                    let Some(range) = resource.buffer_range() else {
                        illegal_value("resource in a buffer element", resource);
                    };
                    native.set_compute_buffer(
                        &range.buffer,
                        range.offset + dynamic_offset,
                        element_slot + buffer_base,
                    );
                }
                SlotClass::Texture => native.set_compute_texture(resource, element_slot + texture_base),
                SlotClass::Sampler => {
                    let BindableResource::Sampler(sampler) = resource else {
                        illegal_value("resource in a sampler element", resource);
                    };
                    native.set_compute_sampler(sampler, element_slot + sampler_base);
                }
            }
        });
    }

    /// Applies dirty compute state on a compute encoder.
    fn pre_dispatch(&mut self) -> Option<Pipeline> {
        self.ensure_encoder(EncoderKind::Compute);
        let pipeline = self.compute_pipeline.clone()?;
        if self.compute_pipeline_dirty {
            self.native.set_compute_pipeline_state(&pipeline);
            self.compute_pipeline_dirty = false;
        }
        for slot in self.compute_sets_dirty.take_dirty() {
            self.activate_compute_set(&pipeline, slot);
        }
        Some(pipeline)
    }
}

/// Calls `bind(resource, slot, stages, class, dynamic_offset)` for every used element of `set`.
///
/// Dynamic offsets are consumed in element order by the dynamic elements alone.
fn for_each_binding(
    set: &ResourceSet,
    offsets: &[u32],
    mut bind: impl FnMut(&BindableResource, u32, ShaderStages, SlotClass, u32),
) {
    let layout = set.layout();
    let mut dynamic_offsets = offsets.iter().copied();
    for (index, (element, resource)) in layout.elements().iter().zip(set.resources()).enumerate() {
        let dynamic_offset = if element.is_dynamic() {
            dynamic_offsets.next().unwrap_or(0)
        } else {
            0
        };
        if let ResourceBindingInfo::Used {
            slot, stages, kind, ..
        } = layout.binding_info(index)
        {
            bind(resource, slot, stages, kind.slot_class(), dynamic_offset);
        }
    }
}

fn compute_thread_group_size(pipeline: &Pipeline) -> (u32, u32, u32) {
    pipeline
        .compute_description()
        .map(|c| c.thread_group_size)
        .unwrap_or((1, 1, 1))
}

impl<A: NativeEncoderApi> Executor for SlotEncoderExecutor<A> {
    fn begin(&mut self) {
        self.native.begin_command_buffer();
        self.open = None;
        self.pass = None;
        self.graphics_pipeline = None;
        self.pipeline_dirty = false;
        self.compute_pipeline = None;
        self.compute_pipeline_dirty = false;
        self.viewports.clear();
        self.scissor_rects.clear();
        self.graphics_sets.clear();
        self.graphics_sets_dirty.reset(0);
        self.compute_sets.clear();
        self.compute_sets_dirty.reset(0);
        self.vertex_buffers.clear();
        self.vertex_buffers_dirty.reset(0);
        self.index_buffer = None;
    }

    fn end(&mut self) -> Result<(), Error> {
        self.end_open_encoder();
        Ok(())
    }

    fn submit(&mut self, completion: Completion) -> Result<(), Error> {
        self.native.commit(completion)
    }

    fn execution_completed(&mut self) {
        for block in self.held_blocks.drain(..) {
            self.staging.free(block);
        }
    }

    fn begin_render_pass(&mut self, pass: &RenderPassDescription) {
        self.end_open_encoder();
        let framebuffer = &pass.framebuffer;
        let count = framebuffer.viewport_count();
        self.viewports = vec![framebuffer.full_viewport(); count];
        self.scissor_rects = vec![framebuffer.full_scissor_rect(); count];
        self.viewports_dirty = true;
        self.scissor_rects_dirty = true;
        self.pass = Some(pass.clone());
        if self.lifecycle == EncoderLifecycle::Immediate {
            self.open_render_encoder();
        }
    }

    fn end_render_pass(&mut self) {
        if self.open != Some(EncoderKind::Render) {
            if self.has_pending_clears() {
                //the clears still have to land
                self.open_render_encoder();
            } else {
                logwise::trace_sync!("Render pass skipped before any draw");
            }
        }
        self.end_open_encoder();
        self.pass = None;
    }

    fn clear_color_target(&mut self, index: u32, color: RgbaFloat) {
        self.fold_clear(|pass| {
            if let Some(attachment) = pass.color_attachments.get_mut(index as usize) {
                attachment.load = LoadAction::Clear;
                attachment.clear_color = color;
            }
        });
    }

    fn clear_depth_stencil(&mut self, depth: f32, stencil: u8) {
        self.fold_clear(|pass| {
            let has_stencil = pass
                .framebuffer
                .depth_target()
                .is_some_and(|d| d.target.format().has_stencil());
            if let Some(attachment) = pass.depth_attachment.as_mut() {
                attachment.load = LoadAction::Clear;
                attachment.clear_depth = depth;
                if has_stencil {
                    attachment.stencil_load = LoadAction::Clear;
                    attachment.clear_stencil = stencil;
                }
            }
        });
    }

    fn set_pipeline(&mut self, pipeline: &Pipeline) {
        let layouts = pipeline.resource_layouts().len();
        if pipeline.is_compute() {
            self.compute_pipeline = Some(pipeline.clone());
            self.compute_pipeline_dirty = true;
            self.compute_sets.clear();
            self.compute_sets_dirty.reset(layouts);
        } else {
            self.graphics_pipeline = Some(pipeline.clone());
            self.pipeline_dirty = true;
            self.graphics_sets.clear();
            self.graphics_sets_dirty.reset(layouts);
            //vertex buffer slots depend on the pipeline's buffer counts
            self.vertex_buffers_dirty.mark_all_dirty();
            self.scissor_rects_dirty = true;
        }
    }

    fn set_vertex_buffer(&mut self, index: u32, buffer: &DeviceBuffer, offset: u32) {
        let index = index as usize;
        if self.vertex_buffers.len() <= index {
            self.vertex_buffers.resize(index + 1, None);
        }
        self.vertex_buffers[index] = Some(VertexBufferBinding {
            buffer: buffer.clone(),
            offset,
        });
        self.vertex_buffers_dirty.mark_dirty(index);
    }

    fn set_index_buffer(&mut self, buffer: &DeviceBuffer, format: IndexFormat, offset: u32) {
        self.index_buffer = Some(IndexBufferBinding {
            buffer: buffer.clone(),
            format,
            offset,
        });
    }

    fn set_graphics_resource_set(&mut self, slot: u32, set: &ResourceSet, dynamic_offsets: &[u32]) {
        self.graphics_sets.bind(slot as usize, set, dynamic_offsets);
        self.graphics_sets_dirty.mark_dirty(slot as usize);
    }

    fn set_compute_resource_set(&mut self, slot: u32, set: &ResourceSet, dynamic_offsets: &[u32]) {
        self.compute_sets.bind(slot as usize, set, dynamic_offsets);
        self.compute_sets_dirty.mark_dirty(slot as usize);
    }

    fn set_viewport(&mut self, index: u32, viewport: Viewport) {
        if let Some(slot) = self.viewports.get_mut(index as usize) {
            *slot = viewport;
            self.viewports_dirty = true;
        }
    }

    fn set_scissor_rect(&mut self, index: u32, rect: ScissorRect) {
        if let Some(slot) = self.scissor_rects.get_mut(index as usize) {
            *slot = rect;
            self.scissor_rects_dirty = true;
        }
    }

    fn draw(&mut self, args: DrawArgs) {
        if self.pre_draw() {
            let topology = self.topology();
            self.native.draw_primitives(topology, args);
        }
    }

    fn draw_indexed(&mut self, args: DrawIndexedArgs) {
        if !self.pre_draw() {
            return;
        }
        let Some(index_buffer) = self.index_buffer.clone() else {
            logwise::warn_sync!("Indexed draw without an index buffer was dropped");
            return;
        };
        let draw = IndexedDraw {
            topology: self.topology(),
            index_count: args.index_count,
            format: index_buffer.format,
            index_buffer: &index_buffer.buffer,
            index_buffer_offset: index_buffer.format.size() * args.index_start + index_buffer.offset,
            instance_count: args.instance_count,
            base_vertex: args.vertex_offset,
            base_instance: args.instance_start,
        };
        self.native.draw_indexed_primitives(&draw);
    }

    fn draw_indirect(&mut self, args: &IndirectArgs) {
        if !self.pre_draw() {
            return;
        }
        let topology = self.topology();
        for offset in args.record_offsets() {
            self.native.draw_primitives_indirect(topology, &args.buffer, offset);
        }
    }

    fn draw_indexed_indirect(&mut self, args: &IndirectArgs) {
        if !self.pre_draw() {
            return;
        }
        let Some(index_buffer) = self.index_buffer.clone() else {
            logwise::warn_sync!("Indexed draw without an index buffer was dropped");
            return;
        };
        let topology = self.topology();
        for offset in args.record_offsets() {
            self.native.draw_indexed_primitives_indirect(
                topology,
                index_buffer.format,
                &index_buffer.buffer,
                index_buffer.offset,
                &args.buffer,
                offset,
            );
        }
    }

    fn dispatch(&mut self, args: DispatchArgs) {
        if let Some(pipeline) = self.pre_dispatch() {
            self.native
                .dispatch_threadgroups(args, compute_thread_group_size(&pipeline));
        }
    }

    fn dispatch_indirect(&mut self, buffer: &DeviceBuffer, offset: u32) {
        if let Some(pipeline) = self.pre_dispatch() {
            self.native.dispatch_threadgroups_indirect(
                buffer,
                offset,
                compute_thread_group_size(&pipeline),
            );
        }
    }

    fn copy_buffer(&mut self, copy: &BufferCopy) {
        if copy.is_aligned() {
            self.ensure_encoder(EncoderKind::Blit);
            self.native.copy_buffer(copy);
        } else {
            self.ensure_encoder(EncoderKind::Compute);
            self.native.copy_buffer_with_kernel(copy);
            //the copy kernel replaced the user's compute state
            self.compute_pipeline_dirty = self.compute_pipeline.is_some();
            self.compute_sets_dirty.mark_all_dirty();
        }
    }

    fn copy_texture(&mut self, copy: &TextureCopy) {
        self.ensure_encoder(EncoderKind::Blit);
        self.native.copy_texture(copy);
    }

    fn resolve_texture(&mut self, source: &Texture, destination: &Texture) {
        self.end_open_encoder();
        self.native.resolve_texture(source, destination);
    }

    fn update_buffer(&mut self, buffer: &DeviceBuffer, offset: u32, data: &[u8]) -> Result<(), Error> {
        let size = u32::try_from(data.len()).map_err(|_| StagingError::OutOfMemory { size: u32::MAX })?;
        let mut block = self.staging.rent(size)?;
        block.bytes_mut().copy_from_slice(data);
        self.ensure_encoder(EncoderKind::Blit);
        self.native.copy_from_staging(&block, buffer, offset);
        self.held_blocks.push(block);
        Ok(())
    }

    fn generate_mipmaps(&mut self, texture: &Texture) {
        self.ensure_encoder(EncoderKind::Blit);
        self.native.generate_mipmaps(texture);
    }

    fn memory_barrier(&mut self) {
        match self.open {
            Some(kind @ (EncoderKind::Render | EncoderKind::Compute)) => self.native.memory_barrier(kind),
            //blit encoders are ordered, and separate encoders are ordered by the command buffer
            Some(EncoderKind::Blit) | None => {}
        }
    }

    fn push_debug_group(&mut self, name: &str) {
        self.native.push_debug_group(self.open, name);
    }

    fn pop_debug_group(&mut self) {
        self.native.pop_debug_group(self.open);
    }

    fn insert_debug_marker(&mut self, name: &str) {
        self.native.insert_debug_marker(self.open, name);
    }
}
