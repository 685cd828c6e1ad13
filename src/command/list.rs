// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! The validating command list.
//!
//! Every operation checks the recording state machine first, then the operation's own
//! preconditions, and only then forwards to the executor. Checks are skipped entirely
//! when [`VALIDATE_USAGE`] is off or the list was created without validation; misuse is
//! then undefined rather than reported.

use crate::bindings::bound::BoundResourceCache;
use crate::bindings::layout::ResourceLayout;
use crate::bindings::resource_set::ResourceSet;
use crate::bindings::resources::{DeviceBuffer, Texture};
use crate::bindings::visible_to::{BufferUsage, TextureUsage};
use crate::command::execution_tracking::ExecutionTracker;
use crate::command::executor::{
    BufferCopy, DispatchArgs, DrawArgs, DrawIndexedArgs, Executor, INDIRECT_DISPATCH_SIZE,
    INDIRECT_DRAW_INDEXED_SIZE, INDIRECT_DRAW_SIZE, IndexFormat, IndirectArgs, TextureCopy,
};
use crate::command::{Error, RecordingState, UsageError, VALIDATE_USAGE};
use crate::device::{DeviceFeatures, DeviceLimits};
use crate::pass::{Framebuffer, RenderPassDescription, RgbaFloat, ScissorRect, Viewport};
use crate::pipeline::Pipeline;
use logwise::privacy::LogIt;
use std::sync::Arc;

/// Options a command list is created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommandListDescription {
    /// Whether the list may be begun again once its execution completed.
    pub reusable: bool,
    /// Whether usage validation runs for this list. Has no effect when the
    /// `validate_usage` feature is off.
    pub validation: bool,
}

impl Default for CommandListDescription {
    fn default() -> Self {
        CommandListDescription {
            reusable: false,
            validation: true,
        }
    }
}

impl CommandListDescription {
    pub fn reusable() -> Self {
        CommandListDescription {
            reusable: true,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone)]
struct BoundIndexBuffer {
    buffer: DeviceBuffer,
    format: IndexFormat,
    offset: u32,
}

/// Records commands into an executor.
///
/// Owned by one recording thread between [`begin`](Self::begin) and [`end`](Self::end).
#[derive(Debug)]
pub struct CommandList<E: Executor> {
    name: String,
    description: CommandListDescription,
    features: DeviceFeatures,
    limits: DeviceLimits,
    execution: Arc<ExecutionTracker>,
    executor: E,
    framebuffer: Option<Framebuffer>,
    graphics_pipeline: Option<Pipeline>,
    compute_pipeline: Option<Pipeline>,
    graphics_sets: BoundResourceCache,
    compute_sets: BoundResourceCache,
    index_buffer: Option<BoundIndexBuffer>,
    debug_groups: u32,
}

impl<E: Executor> CommandList<E> {
    pub(crate) fn new(
        description: CommandListDescription,
        executor: E,
        features: DeviceFeatures,
        limits: DeviceLimits,
        name: &str,
    ) -> Self {
        CommandList {
            name: name.to_string(),
            description,
            features,
            limits,
            execution: Arc::new(ExecutionTracker::new()),
            executor,
            framebuffer: None,
            graphics_pipeline: None,
            compute_pipeline: None,
            graphics_sets: BoundResourceCache::new(),
            compute_sets: BoundResourceCache::new(),
            index_buffer: None,
            debug_groups: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn description(&self) -> &CommandListDescription {
        &self.description
    }
    pub fn state(&self) -> RecordingState {
        self.execution.state()
    }
    pub fn executor(&self) -> &E {
        &self.executor
    }
    pub fn executor_mut(&mut self) -> &mut E {
        &mut self.executor
    }
    /// The framebuffer of the open render pass.
    pub fn framebuffer(&self) -> Option<&Framebuffer> {
        self.framebuffer.as_ref()
    }
    pub fn graphics_pipeline(&self) -> Option<&Pipeline> {
        self.graphics_pipeline.as_ref()
    }
    pub fn compute_pipeline(&self) -> Option<&Pipeline> {
        self.compute_pipeline.as_ref()
    }
    pub(crate) fn execution(&self) -> &Arc<ExecutionTracker> {
        &self.execution
    }

    #[inline]
    fn validating(&self) -> bool {
        VALIDATE_USAGE && self.description.validation
    }

    fn check_recording(&self, operation: &'static str) -> Result<(), UsageError> {
        let state = self.execution.state();
        if state != RecordingState::Recording {
            return Err(UsageError::InvalidState { operation, state });
        }
        Ok(())
    }

    fn check_in_pass(&self, operation: &'static str) -> Result<&Framebuffer, UsageError> {
        self.check_recording(operation)?;
        self.framebuffer
            .as_ref()
            .ok_or(UsageError::RenderPassRequired { operation })
    }

    fn check_outside_pass(&self, operation: &'static str) -> Result<(), UsageError> {
        self.check_recording(operation)?;
        if self.framebuffer.is_some() {
            return Err(UsageError::RenderPassOpen { operation });
        }
        Ok(())
    }

    /// Starts recording.
    ///
    /// Valid on a new list, or on a reusable list whose previous execution completed.
    /// Every per-recording cache is reset.
    pub fn begin(&mut self) -> Result<(), UsageError> {
        let state = self.execution.state();
        if self.validating() {
            match state {
                RecordingState::Initial => {}
                RecordingState::Completed if self.description.reusable => {}
                RecordingState::Completed => return Err(UsageError::NotReusable),
                _ => {
                    return Err(UsageError::InvalidState {
                        operation: "begin",
                        state,
                    });
                }
            }
        }
        if state == RecordingState::Completed {
            self.executor.execution_completed();
        }
        logwise::info_sync!("Begin recording {name}", name = LogIt(&self.name));
        self.framebuffer = None;
        self.graphics_pipeline = None;
        self.compute_pipeline = None;
        self.graphics_sets.clear();
        self.compute_sets.clear();
        self.index_buffer = None;
        self.debug_groups = 0;
        self.execution.set(RecordingState::Recording);
        self.executor.begin();
        Ok(())
    }

    /// Finishes recording; the list can then be submitted.
    pub fn end(&mut self) -> Result<(), Error> {
        if self.validating() {
            self.check_outside_pass("end")?;
        }
        self.executor.end()?;
        self.execution.set(RecordingState::Recorded);
        logwise::info_sync!("End recording {name}", name = LogIt(&self.name));
        Ok(())
    }

    /// Disposes the list. Held executor resources of a completed execution are released.
    pub fn dispose(&mut self) {
        if self.execution.state() == RecordingState::Completed {
            self.executor.execution_completed();
        }
        self.execution.set(RecordingState::Disposed);
    }

    pub fn begin_render_pass(&mut self, pass: &RenderPassDescription) -> Result<(), UsageError> {
        if self.validating() {
            self.check_outside_pass("begin_render_pass")?;
            let color_targets = pass.framebuffer.color_targets().len();
            if pass.color_attachments.len() != color_targets {
                return Err(UsageError::InvalidDescription(
                    "a render pass needs one color attachment action per color target",
                ));
            }
            if pass.depth_attachment.is_some() != pass.framebuffer.depth_target().is_some() {
                return Err(UsageError::InvalidDescription(
                    "a render pass needs a depth attachment action exactly when the framebuffer has a depth target",
                ));
            }
            if pass.resolve_targets.len() > color_targets {
                return Err(UsageError::ResolveTargetCount {
                    resolve_targets: pass.resolve_targets.len(),
                    color_targets,
                });
            }
            for target in &pass.resolve_targets {
                if target.sample_count().count() != 1 {
                    return Err(UsageError::Multisampled {
                        texture: target.id(),
                        samples: target.sample_count().count(),
                    });
                }
            }
        }
        self.framebuffer = Some(pass.framebuffer.clone());
        self.executor.begin_render_pass(pass);
        Ok(())
    }

    pub fn end_render_pass(&mut self) -> Result<(), UsageError> {
        if self.validating() {
            self.check_in_pass("end_render_pass")?;
        }
        self.framebuffer = None;
        self.executor.end_render_pass();
        Ok(())
    }

    /// Clears color target `index` of the open pass.
    pub fn clear_color_target(&mut self, index: u32, color: RgbaFloat) -> Result<(), UsageError> {
        if self.validating() {
            let framebuffer = self.check_in_pass("clear_color_target")?;
            let count = framebuffer.color_targets().len();
            if index as usize >= count {
                return Err(UsageError::ColorTargetOutOfRange { index, count });
            }
        }
        self.executor.clear_color_target(index, color);
        Ok(())
    }

    pub fn clear_depth_stencil(&mut self, depth: f32, stencil: u8) -> Result<(), UsageError> {
        if self.validating() {
            let framebuffer = self.check_in_pass("clear_depth_stencil")?;
            if framebuffer.depth_target().is_none() {
                return Err(UsageError::NoDepthTarget);
            }
        }
        self.executor.clear_depth_stencil(depth, stencil);
        Ok(())
    }

    /// Binds a pipeline to its bind point.
    ///
    /// A graphics pipeline requires an open render pass and persists across passes until
    /// replaced. Changing the pipeline forgets the resource sets bound at its bind point.
    pub fn set_pipeline(&mut self, pipeline: &Pipeline) -> Result<(), UsageError> {
        if self.validating() {
            if pipeline.is_compute() {
                self.check_recording("set_pipeline")?;
                if !self.features.compute_shader {
                    return Err(UsageError::UnsupportedFeature("compute shaders"));
                }
            } else {
                self.check_in_pass("set_pipeline")?;
            }
        }
        let current = if pipeline.is_compute() {
            &mut self.compute_pipeline
        } else {
            &mut self.graphics_pipeline
        };
        if current.as_ref() == Some(pipeline) {
            return Ok(());
        }
        *current = Some(pipeline.clone());
        if pipeline.is_compute() {
            self.compute_sets.clear();
        } else {
            self.graphics_sets.clear();
        }
        self.executor.set_pipeline(pipeline);
        Ok(())
    }

    pub fn set_vertex_buffer(
        &mut self,
        index: u32,
        buffer: &DeviceBuffer,
        offset: u32,
    ) -> Result<(), UsageError> {
        if self.validating() {
            self.check_in_pass("set_vertex_buffer")?;
            require_buffer_usage(buffer, BufferUsage::VERTEX)?;
        }
        self.executor.set_vertex_buffer(index, buffer, offset);
        Ok(())
    }

    pub fn set_index_buffer(
        &mut self,
        buffer: &DeviceBuffer,
        format: IndexFormat,
        offset: u32,
    ) -> Result<(), UsageError> {
        if self.validating() {
            self.check_in_pass("set_index_buffer")?;
            require_buffer_usage(buffer, BufferUsage::INDEX)?;
        }
        self.index_buffer = Some(BoundIndexBuffer {
            buffer: buffer.clone(),
            format,
            offset,
        });
        self.executor.set_index_buffer(buffer, format, offset);
        Ok(())
    }

    /// Binds `set` to `slot` of the graphics pipeline.
    ///
    /// `dynamic_offsets` holds one offset per dynamic element of the set's layout, in
    /// element order. Rebinding the identical set with identical offsets is skipped.
    pub fn set_graphics_resource_set(
        &mut self,
        slot: u32,
        set: &ResourceSet,
        dynamic_offsets: &[u32],
    ) -> Result<(), UsageError> {
        if self.validating() {
            self.check_recording("set_graphics_resource_set")?;
            let pipeline = self
                .graphics_pipeline
                .as_ref()
                .ok_or(UsageError::NoGraphicsPipeline {
                    operation: "set_graphics_resource_set",
                })?;
            validate_set_binding(&self.limits, pipeline.resource_layouts(), slot, set, dynamic_offsets)?;
        }
        if self.graphics_sets.bind(slot as usize, set, dynamic_offsets) {
            self.executor.set_graphics_resource_set(slot, set, dynamic_offsets);
        } else {
            logwise::debuginternal_sync!(
                "Skipping redundant graphics bind at slot {slot}",
                slot = LogIt(&slot)
            );
        }
        Ok(())
    }

    /// Binds `set` to `slot` of the compute pipeline.
    pub fn set_compute_resource_set(
        &mut self,
        slot: u32,
        set: &ResourceSet,
        dynamic_offsets: &[u32],
    ) -> Result<(), UsageError> {
        if self.validating() {
            self.check_recording("set_compute_resource_set")?;
            let pipeline = self
                .compute_pipeline
                .as_ref()
                .ok_or(UsageError::NoComputePipeline {
                    operation: "set_compute_resource_set",
                })?;
            validate_set_binding(&self.limits, pipeline.resource_layouts(), slot, set, dynamic_offsets)?;
        }
        if self.compute_sets.bind(slot as usize, set, dynamic_offsets) {
            self.executor.set_compute_resource_set(slot, set, dynamic_offsets);
        } else {
            logwise::debuginternal_sync!(
                "Skipping redundant compute bind at slot {slot}",
                slot = LogIt(&slot)
            );
        }
        Ok(())
    }

    fn check_viewport_index(&self, operation: &'static str, index: u32) -> Result<(), UsageError> {
        let framebuffer = self.check_in_pass(operation)?;
        let count = framebuffer.viewport_count();
        if index as usize >= count {
            return Err(UsageError::ViewportIndexOutOfRange { index, count });
        }
        if index > 0 && !self.features.multiple_viewports {
            return Err(UsageError::UnsupportedFeature("multiple viewports"));
        }
        Ok(())
    }

    pub fn set_viewport(&mut self, index: u32, viewport: Viewport) -> Result<(), UsageError> {
        if self.validating() {
            self.check_viewport_index("set_viewport", index)?;
        }
        self.executor.set_viewport(index, viewport);
        Ok(())
    }

    pub fn set_scissor_rect(&mut self, index: u32, rect: ScissorRect) -> Result<(), UsageError> {
        if self.validating() {
            self.check_viewport_index("set_scissor_rect", index)?;
        }
        self.executor.set_scissor_rect(index, rect);
        Ok(())
    }

    fn check_pre_draw(&self, operation: &'static str) -> Result<(), UsageError> {
        let framebuffer = self.check_in_pass(operation)?;
        let pipeline = self
            .graphics_pipeline
            .as_ref()
            .ok_or(UsageError::NoGraphicsPipeline { operation })?;
        if pipeline.outputs() != Some(framebuffer.output_description()) {
            return Err(UsageError::IncompatibleOutput {
                pipeline: pipeline.id(),
                framebuffer: framebuffer.id(),
            });
        }
        Ok(())
    }

    fn check_base_instance(&self, instance_start: u32) -> Result<(), UsageError> {
        if instance_start != 0 && !self.features.draw_base_instance {
            return Err(UsageError::UnsupportedFeature("draw base instance"));
        }
        Ok(())
    }

    pub fn draw(&mut self, args: DrawArgs) -> Result<(), UsageError> {
        if self.validating() {
            self.check_pre_draw("draw")?;
            self.check_base_instance(args.instance_start)?;
        }
        self.executor.draw(args);
        Ok(())
    }

    pub fn draw_indexed(&mut self, args: DrawIndexedArgs) -> Result<(), UsageError> {
        if self.validating() {
            self.check_pre_draw("draw_indexed")?;
            let index_buffer = self.index_buffer.as_ref().ok_or(UsageError::NoIndexBuffer)?;
            let needed = (args.index_start as u64 + args.index_count as u64)
                * index_buffer.format.size() as u64
                + index_buffer.offset as u64;
            if needed > index_buffer.buffer.size() as u64 {
                return Err(UsageError::IndexBufferTooSmall {
                    buffer: index_buffer.buffer.id(),
                    needed,
                    capacity: index_buffer.buffer.size(),
                });
            }
            if args.vertex_offset != 0 && !self.features.draw_base_vertex {
                return Err(UsageError::UnsupportedFeature("draw base vertex"));
            }
            self.check_base_instance(args.instance_start)?;
        }
        self.executor.draw_indexed(args);
        Ok(())
    }

    fn check_indirect(&self, args: &IndirectArgs, record_size: u32) -> Result<(), UsageError> {
        if !self.features.draw_indirect {
            return Err(UsageError::UnsupportedFeature("indirect drawing"));
        }
        require_buffer_usage(&args.buffer, BufferUsage::INDIRECT)?;
        if args.offset % 4 != 0 {
            return Err(UsageError::MisalignedIndirectOffset {
                offset: args.offset,
            });
        }
        if args.stride % 4 != 0 || args.stride < record_size {
            return Err(UsageError::InvalidIndirectStride {
                stride: args.stride,
                minimum: record_size,
            });
        }
        let end = args.end(record_size);
        if end > u64::from(args.buffer.size()) {
            return Err(UsageError::IndirectOutOfBounds {
                buffer: args.buffer.id(),
                draw_count: args.draw_count,
                end,
                capacity: args.buffer.size(),
            });
        }
        Ok(())
    }

    /// Issues `args.draw_count` draws whose arguments are read from `args.buffer`.
    pub fn draw_indirect(&mut self, args: &IndirectArgs) -> Result<(), UsageError> {
        if self.validating() {
            self.check_pre_draw("draw_indirect")?;
            self.check_indirect(args, INDIRECT_DRAW_SIZE)?;
        }
        self.executor.draw_indirect(args);
        Ok(())
    }

    pub fn draw_indexed_indirect(&mut self, args: &IndirectArgs) -> Result<(), UsageError> {
        if self.validating() {
            self.check_pre_draw("draw_indexed_indirect")?;
            self.check_indirect(args, INDIRECT_DRAW_INDEXED_SIZE)?;
            if self.index_buffer.is_none() {
                return Err(UsageError::NoIndexBuffer);
            }
        }
        self.executor.draw_indexed_indirect(args);
        Ok(())
    }

    fn check_pre_dispatch(&self, operation: &'static str) -> Result<(), UsageError> {
        self.check_outside_pass(operation)?;
        if !self.features.compute_shader {
            return Err(UsageError::UnsupportedFeature("compute shaders"));
        }
        if self.compute_pipeline.is_none() {
            return Err(UsageError::NoComputePipeline { operation });
        }
        Ok(())
    }

    pub fn dispatch(&mut self, args: DispatchArgs) -> Result<(), UsageError> {
        if self.validating() {
            self.check_pre_dispatch("dispatch")?;
        }
        self.executor.dispatch(args);
        Ok(())
    }

    pub fn dispatch_indirect(&mut self, buffer: &DeviceBuffer, offset: u32) -> Result<(), UsageError> {
        if self.validating() {
            self.check_pre_dispatch("dispatch_indirect")?;
            require_buffer_usage(buffer, BufferUsage::INDIRECT)?;
            if offset % 4 != 0 {
                return Err(UsageError::MisalignedIndirectOffset { offset });
            }
            let end = u64::from(offset) + u64::from(INDIRECT_DISPATCH_SIZE);
            if end > u64::from(buffer.size()) {
                return Err(UsageError::IndirectOutOfBounds {
                    buffer: buffer.id(),
                    draw_count: 1,
                    end,
                    capacity: buffer.size(),
                });
            }
        }
        self.executor.dispatch_indirect(buffer, offset);
        Ok(())
    }

    /// Copies bytes between buffers. A zero-length copy records nothing.
    pub fn copy_buffer(&mut self, copy: &BufferCopy) -> Result<(), UsageError> {
        if self.validating() {
            self.check_outside_pass("copy_buffer")?;
            if copy.size != 0 && !copy.is_aligned() && !self.features.unaligned_buffer_copy {
                return Err(UsageError::UnsupportedFeature("unaligned buffer copies"));
            }
            check_buffer_span("source", &copy.source, copy.source_offset, copy.size)?;
            check_buffer_span(
                "destination",
                &copy.destination,
                copy.destination_offset,
                copy.size,
            )?;
        }
        if copy.size == 0 {
            return Ok(());
        }
        self.executor.copy_buffer(copy);
        Ok(())
    }

    pub fn copy_texture(&mut self, copy: &TextureCopy) -> Result<(), UsageError> {
        if self.validating() {
            self.check_outside_pass("copy_texture")?;
            if copy.width == 0 || copy.height == 0 || copy.depth == 0 || copy.layer_count == 0 {
                return Err(UsageError::EmptyCopyRegion);
            }
            check_texture_region(
                "source",
                &copy.source,
                copy.source_origin,
                copy.source_mip_level,
                copy.source_base_array_layer,
                copy,
            )?;
            check_texture_region(
                "destination",
                &copy.destination,
                copy.destination_origin,
                copy.destination_mip_level,
                copy.destination_base_array_layer,
                copy,
            )?;
            if copy.source.format() != copy.destination.format() {
                return Err(UsageError::FormatMismatch {
                    source_format: copy.source.format(),
                    destination_format: copy.destination.format(),
                });
            }
        }
        self.executor.copy_texture(copy);
        Ok(())
    }

    /// Resolves a multisampled texture into a single-sampled one.
    pub fn resolve_texture(&mut self, source: &Texture, destination: &Texture) -> Result<(), UsageError> {
        if self.validating() {
            self.check_outside_pass("resolve_texture")?;
            if source.sample_count().count() == 1 {
                return Err(UsageError::NotMultisampled {
                    texture: source.id(),
                });
            }
            if destination.sample_count().count() != 1 {
                return Err(UsageError::Multisampled {
                    texture: destination.id(),
                    samples: destination.sample_count().count(),
                });
            }
        }
        self.executor.resolve_texture(source, destination);
        Ok(())
    }

    /// Writes `data` into `buffer` at `offset`. An empty update records nothing.
    pub fn update_buffer(&mut self, buffer: &DeviceBuffer, offset: u32, data: &[u8]) -> Result<(), Error> {
        let size = u32::try_from(data.len()).unwrap_or(u32::MAX);
        if self.validating() {
            self.check_outside_pass("update_buffer")?;
            check_buffer_span("updated", buffer, offset, size)?;
        }
        if size == 0 {
            return Ok(());
        }
        self.executor.update_buffer(buffer, offset, data)
    }

    /// Writes a slice of plain values into `buffer` at `offset`.
    pub fn update_buffer_with<T: bytemuck::Pod>(
        &mut self,
        buffer: &DeviceBuffer,
        offset: u32,
        values: &[T],
    ) -> Result<(), Error> {
        self.update_buffer(buffer, offset, bytemuck::cast_slice(values))
    }

    /// Fills every mip level of `texture` from its first level.
    ///
    /// A texture with a single level records nothing.
    pub fn generate_mipmaps(&mut self, texture: &Texture) -> Result<(), UsageError> {
        if self.validating() {
            self.check_outside_pass("generate_mipmaps")?;
            if !texture.usage().contains(TextureUsage::GENERATE_MIPMAPS) {
                return Err(UsageError::MissingTextureUsage {
                    texture: texture.id(),
                    required: TextureUsage::GENERATE_MIPMAPS,
                });
            }
            if !self.features.mipmap_generation {
                return Err(UsageError::UnsupportedFeature("mipmap generation"));
            }
        }
        if texture.mip_levels() <= 1 {
            return Ok(());
        }
        self.executor.generate_mipmaps(texture);
        Ok(())
    }

    pub fn memory_barrier(&mut self) -> Result<(), UsageError> {
        if self.validating() {
            self.check_outside_pass("memory_barrier")?;
        }
        self.executor.memory_barrier();
        Ok(())
    }

    pub fn push_debug_group(&mut self, name: &str) -> Result<(), UsageError> {
        if self.validating() {
            self.check_recording("push_debug_group")?;
        }
        self.debug_groups += 1;
        self.executor.push_debug_group(name);
        Ok(())
    }

    pub fn pop_debug_group(&mut self) -> Result<(), UsageError> {
        if self.validating() {
            self.check_recording("pop_debug_group")?;
            if self.debug_groups == 0 {
                return Err(UsageError::DebugGroupUnderflow);
            }
        }
        self.debug_groups = self.debug_groups.saturating_sub(1);
        self.executor.pop_debug_group();
        Ok(())
    }

    pub fn insert_debug_marker(&mut self, name: &str) -> Result<(), UsageError> {
        if self.validating() {
            self.check_recording("insert_debug_marker")?;
        }
        self.executor.insert_debug_marker(name);
        Ok(())
    }
}

fn require_buffer_usage(buffer: &DeviceBuffer, required: BufferUsage) -> Result<(), UsageError> {
    if !buffer.usage().contains(required) {
        return Err(UsageError::MissingBufferUsage {
            buffer: buffer.id(),
            required,
        });
    }
    Ok(())
}

fn check_buffer_span(
    role: &'static str,
    buffer: &DeviceBuffer,
    offset: u32,
    size: u32,
) -> Result<(), UsageError> {
    if offset as u64 + size as u64 > buffer.size() as u64 {
        return Err(UsageError::CopyOutOfBounds {
            role,
            buffer: buffer.id(),
            offset,
            size,
            capacity: buffer.size(),
        });
    }
    Ok(())
}

fn check_texture_region(
    role: &'static str,
    texture: &Texture,
    origin: (u32, u32, u32),
    mip_level: u32,
    base_array_layer: u32,
    copy: &TextureCopy,
) -> Result<(), UsageError> {
    if mip_level >= texture.mip_levels() {
        return Err(UsageError::MipLevelOutOfRange {
            role,
            level: mip_level,
            levels: texture.mip_levels(),
        });
    }
    let layers = if texture.usage().contains(TextureUsage::CUBEMAP) {
        texture.array_layers() * 6
    } else {
        texture.array_layers()
    };
    if base_array_layer as u64 + copy.layer_count as u64 > layers as u64 {
        return Err(UsageError::ArrayLayersOutOfRange {
            role,
            base: base_array_layer,
            count: copy.layer_count,
            layers,
        });
    }
    //compressed levels are addressed in whole blocks
    let block = texture.format().block_size();
    let round = |v: u32| v.div_ceil(block) * block;
    let (width, height, depth) = texture.mip_dimensions(mip_level);
    let fits = |origin: u32, extent: u32, limit: u32| origin as u64 + extent as u64 <= limit as u64;
    if !fits(origin.0, copy.width, round(width))
        || !fits(origin.1, copy.height, round(height))
        || !fits(origin.2, copy.depth, depth)
    {
        return Err(UsageError::InvalidCopyRegion {
            role,
            texture: texture.id(),
        });
    }
    Ok(())
}

/// Checks a resource set against the pipeline layout at `slot`.
fn validate_set_binding(
    limits: &DeviceLimits,
    layouts: &[ResourceLayout],
    slot: u32,
    set: &ResourceSet,
    dynamic_offsets: &[u32],
) -> Result<(), UsageError> {
    let expected = layouts
        .get(slot as usize)
        .ok_or(UsageError::ResourceSetSlotOutOfRange {
            slot,
            layouts: layouts.len(),
        })?;
    let expected_elements = expected.elements();
    let actual_elements = set.layout().elements();
    if expected_elements.len() != actual_elements.len() {
        return Err(UsageError::ResourceSetElementCount {
            slot,
            expected: expected_elements.len(),
            actual: actual_elements.len(),
        });
    }
    for (element, (e, a)) in expected_elements.iter().zip(actual_elements).enumerate() {
        if e.kind != a.kind {
            return Err(UsageError::ResourceSetElementKind {
                slot,
                element,
                expected: e.kind,
                actual: a.kind,
            });
        }
    }
    let dynamic_count = set.layout().dynamic_count();
    if dynamic_count as usize != dynamic_offsets.len() {
        return Err(UsageError::DynamicOffsetCount {
            expected: dynamic_count,
            actual: dynamic_offsets.len(),
        });
    }
    let dynamic_elements = actual_elements
        .iter()
        .zip(set.resources())
        .enumerate()
        .filter(|(_, (e, _))| e.is_dynamic());
    for ((element, (e, resource)), dynamic_offset) in dynamic_elements.zip(dynamic_offsets) {
        let alignment = limits.alignment_for(e.kind);
        let range_offset = resource.buffer_range().map(|r| r.offset).unwrap_or(0);
        let offset = range_offset.wrapping_add(*dynamic_offset);
        if offset % alignment != 0 {
            return Err(UsageError::MisalignedDynamicOffset {
                element,
                offset,
                alignment,
            });
        }
    }
    Ok(())
}
