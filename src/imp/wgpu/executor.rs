// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
An executor over wgpu command encoders.

wgpu render passes are described up front, so a render pass opens at its first draw, the
same way the deferred slot encoder does: clears recorded before it become load
operations. Pass state (pipeline, bind groups, buffers, viewport and scissor rect) is
applied as it is set while a pass is open, and replayed whenever a pass reopens.

Graphics and compute pipelines need their native wgpu pipeline attached with
[`attach_render_pipeline`](super::attach_render_pipeline) or
[`attach_compute_pipeline`](super::attach_compute_pipeline). Resource sets become bind
groups built against the native pipeline's layout, one binding per layout element.
*/

use crate::bindings::resource_set::ResourceSet;
use crate::bindings::resources::{DeviceBuffer, Texture};
use crate::command::{
    BufferCopy, DispatchArgs, DrawArgs, DrawIndexedArgs, Error, Executor, IndexFormat,
    IndirectArgs, TextureCopy, UsageError,
};
use crate::device::Completion;
use crate::imp::wgpu::WgpuContext;
use crate::imp::wgpu::resources::NativeResources;
use crate::pass::{LoadAction, RenderPassDescription, RgbaFloat, ScissorRect, StoreAction, Viewport};
use crate::pipeline::Pipeline;
use logwise::privacy::LogIt;
use smallvec::SmallVec;
use std::fmt::Debug;
use wgpu::util::DeviceExt;

enum ActivePass {
    None,
    Render(wgpu::RenderPass<'static>),
    Compute(wgpu::ComputePass<'static>),
}

impl Debug for ActivePass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActivePass::None => write!(f, "None"),
            ActivePass::Render(_) => write!(f, "Render"),
            ActivePass::Compute(_) => write!(f, "Compute"),
        }
    }
}

#[derive(Debug)]
struct BoundGroup {
    group: wgpu::BindGroup,
    offsets: SmallVec<[u32; 4]>,
}

#[derive(Debug)]
struct IndexBinding {
    buffer: wgpu::Buffer,
    format: IndexFormat,
    offset: u64,
}

const fn color(color: RgbaFloat) -> wgpu::Color {
    wgpu::Color {
        r: color.r as f64,
        g: color.g as f64,
        b: color.b as f64,
        a: color.a as f64,
    }
}

fn load_op<V>(load: LoadAction, clear: V) -> wgpu::LoadOp<V> {
    match load {
        LoadAction::Clear => wgpu::LoadOp::Clear(clear),
        LoadAction::Load | LoadAction::DontCare => wgpu::LoadOp::Load,
    }
}

fn store_op(store: StoreAction) -> wgpu::StoreOp {
    if store.stores() {
        wgpu::StoreOp::Store
    } else {
        wgpu::StoreOp::Discard
    }
}

fn apply_render_pipeline(render: &mut wgpu::RenderPass<'static>, pipeline: &Pipeline) {
    let (Some(native), Some(description)) = (
        pipeline.native::<wgpu::RenderPipeline>(),
        pipeline.graphics_description(),
    ) else {
        return;
    };
    render.set_pipeline(native);
    render.set_blend_constant(color(description.blend_color));
    render.set_stencil_reference(description.depth_stencil.stencil_reference);
}

/// Records abstract commands into a wgpu command encoder.
#[derive(Debug)]
pub struct WgpuExecutor {
    context: WgpuContext,
    natives: NativeResources,
    encoder: Option<wgpu::CommandEncoder>,
    finished: Option<wgpu::CommandBuffer>,
    active: ActivePass,
    pass: Option<RenderPassDescription>,
    graphics_pipeline: Option<Pipeline>,
    compute_pipeline: Option<Pipeline>,
    graphics_groups: Vec<Option<BoundGroup>>,
    compute_groups: Vec<Option<BoundGroup>>,
    vertex_buffers: Vec<Option<(wgpu::Buffer, u64)>>,
    index_buffer: Option<IndexBinding>,
    viewport: Option<Viewport>,
    scissor_rect: Option<ScissorRect>,
    //upload sources read by the recorded commands
    held_uploads: Vec<wgpu::Buffer>,
}

impl WgpuExecutor {
    pub fn new(context: &WgpuContext) -> Self {
        WgpuExecutor {
            context: context.clone(),
            natives: NativeResources::default(),
            encoder: None,
            finished: None,
            active: ActivePass::None,
            pass: None,
            graphics_pipeline: None,
            compute_pipeline: None,
            graphics_groups: Vec::new(),
            compute_groups: Vec::new(),
            vertex_buffers: Vec::new(),
            index_buffer: None,
            viewport: None,
            scissor_rect: None,
            held_uploads: Vec::new(),
        }
    }

    pub fn context(&self) -> &WgpuContext {
        &self.context
    }

    fn end_active(&mut self) {
        match std::mem::replace(&mut self.active, ActivePass::None) {
            ActivePass::None => {}
            ActivePass::Render(render) => {
                logwise::trace_sync!("Ending wgpu render pass");
                drop(render);
            }
            ActivePass::Compute(compute) => {
                logwise::trace_sync!("Ending wgpu compute pass");
                drop(compute);
            }
        }
    }

    fn open_render_pass(&mut self) {
        self.end_active();
        let (Some(encoder), Some(pass)) = (self.encoder.as_mut(), self.pass.as_mut()) else {
            return;
        };
        let device = self.context.device();
        let framebuffer = pass.framebuffer.clone();
        logwise::trace_sync!(
            "Opening wgpu render pass for {framebuffer}",
            framebuffer = LogIt(&framebuffer.id())
        );
        let color_views: Vec<wgpu::TextureView> = framebuffer
            .color_targets()
            .iter()
            .map(|attachment| self.natives.attachment_view(device, attachment))
            .collect();
        let resolve_views: Vec<wgpu::TextureView> = pass
            .resolve_targets
            .iter()
            .map(|texture| self.natives.resolve_view(device, texture))
            .collect();
        let depth_view = framebuffer
            .depth_target()
            .map(|attachment| self.natives.attachment_view(device, attachment));
        let has_stencil = framebuffer
            .depth_target()
            .is_some_and(|d| d.target.format().has_stencil());

        let color_attachments: Vec<Option<wgpu::RenderPassColorAttachment<'_>>> = color_views
            .iter()
            .zip(&pass.color_attachments)
            .enumerate()
            .map(|(index, (view, action))| {
                Some(wgpu::RenderPassColorAttachment {
                    view,
                    depth_slice: None,
                    resolve_target: resolve_views.get(index),
                    ops: wgpu::Operations {
                        load: load_op(action.load, color(action.clear_color)),
                        store: store_op(action.store),
                    },
                })
            })
            .collect();
        let depth_stencil_attachment = depth_view.as_ref().zip(pass.depth_attachment.as_ref()).map(
            |(view, action)| wgpu::RenderPassDepthStencilAttachment {
                view,
                depth_ops: Some(wgpu::Operations {
                    load: load_op(action.load, action.clear_depth),
                    store: store_op(action.store),
                }),
                stencil_ops: has_stencil.then(|| wgpu::Operations {
                    load: load_op(action.stencil_load, u32::from(action.clear_stencil)),
                    store: store_op(action.stencil_store),
                }),
            },
        );
        let render = encoder
            .begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some(framebuffer.name()),
                color_attachments: &color_attachments,
                depth_stencil_attachment,
                timestamp_writes: None,
                occlusion_query_set: None,
            })
            .forget_lifetime();

        //a reopened pass continues from what the previous one produced
        for action in &mut pass.color_attachments {
            action.load = LoadAction::Load;
        }
        if let Some(depth) = &mut pass.depth_attachment {
            depth.load = LoadAction::Load;
            depth.stencil_load = LoadAction::Load;
        }
        self.active = ActivePass::Render(render);
        self.replay_render_state();
    }

    fn replay_render_state(&mut self) {
        let ActivePass::Render(render) = &mut self.active else {
            return;
        };
        if let Some(pipeline) = &self.graphics_pipeline {
            apply_render_pipeline(render, pipeline);
        }
        for (slot, bound) in self.graphics_groups.iter().enumerate() {
            if let Some(bound) = bound {
                render.set_bind_group(slot as u32, &bound.group, &bound.offsets);
            }
        }
        for (index, binding) in self.vertex_buffers.iter().enumerate() {
            if let Some((buffer, offset)) = binding {
                render.set_vertex_buffer(index as u32, buffer.slice(*offset..));
            }
        }
        if let Some(index) = &self.index_buffer {
            render.set_index_buffer(index.buffer.slice(index.offset..), index.format.wgpu_format());
        }
        if let Some(v) = self.viewport {
            render.set_viewport(v.x, v.y, v.width, v.height, v.min_depth, v.max_depth);
        }
        if let Some(r) = self.scissor_rect {
            render.set_scissor_rect(r.x, r.y, r.width, r.height);
        }
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

    /// The render pass to draw into. `None` outside a pass or without a native pipeline.
    fn pre_draw(&mut self) -> Option<&mut wgpu::RenderPass<'static>> {
        self.pass.as_ref()?;
        let has_native = self
            .graphics_pipeline
            .as_ref()
            .is_some_and(|p| p.native::<wgpu::RenderPipeline>().is_some());
        if !has_native {
            logwise::warn_sync!("Draw without a native wgpu pipeline was dropped");
            return None;
        }
        if !matches!(self.active, ActivePass::Render(_)) {
            self.open_render_pass();
        }
        match &mut self.active {
            ActivePass::Render(render) => Some(render),
            _ => None,
        }
    }

    fn pre_dispatch(&mut self) -> Option<&mut wgpu::ComputePass<'static>> {
        let has_native = self
            .compute_pipeline
            .as_ref()
            .is_some_and(|p| p.native::<wgpu::ComputePipeline>().is_some());
        if !has_native {
            logwise::warn_sync!("Dispatch without a native wgpu pipeline was dropped");
            return None;
        }
        if !matches!(self.active, ActivePass::Compute(_)) {
            self.end_active();
            let encoder = self.encoder.as_mut()?;
            let mut compute = encoder
                .begin_compute_pass(&wgpu::ComputePassDescriptor {
                    label: None,
                    timestamp_writes: None,
                })
                .forget_lifetime();
            if let Some(native) = self
                .compute_pipeline
                .as_ref()
                .and_then(|p| p.native::<wgpu::ComputePipeline>())
            {
                compute.set_pipeline(native);
            }
            for (slot, bound) in self.compute_groups.iter().enumerate() {
                if let Some(bound) = bound {
                    compute.set_bind_group(slot as u32, &bound.group, &bound.offsets);
                }
            }
            self.active = ActivePass::Compute(compute);
        }
        match &mut self.active {
            ActivePass::Compute(compute) => Some(compute),
            _ => None,
        }
    }

    /// The encoder, with no pass open on it.
    fn transfer_encoder(&mut self) -> Option<&mut wgpu::CommandEncoder> {
        self.end_active();
        self.encoder.as_mut()
    }

    fn bind_group(&mut self, pipeline: Option<&Pipeline>, slot: u32, set: &ResourceSet, offsets: &[u32]) -> Option<BoundGroup> {
        let layout = match pipeline {
            Some(p) if p.is_compute() => p.native::<wgpu::ComputePipeline>()?.get_bind_group_layout(slot),
            Some(p) => p.native::<wgpu::RenderPipeline>()?.get_bind_group_layout(slot),
            None => return None,
        };
        Some(BoundGroup {
            group: self.natives.bind_group(self.context.device(), &layout, set),
            offsets: offsets.iter().copied().collect(),
        })
    }
}

fn store_group(groups: &mut Vec<Option<BoundGroup>>, slot: u32, group: BoundGroup) {
    let slot = slot as usize;
    if groups.len() <= slot {
        groups.resize_with(slot + 1, || None);
    }
    groups[slot] = Some(group);
}

impl Executor for WgpuExecutor {
    fn begin(&mut self) {
        self.end_active();
        self.encoder = Some(
            self.context
                .device()
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("slots_and_passes command list"),
                }),
        );
        self.finished = None;
        self.pass = None;
        self.graphics_pipeline = None;
        self.compute_pipeline = None;
        self.graphics_groups.clear();
        self.compute_groups.clear();
        self.vertex_buffers.clear();
        self.index_buffer = None;
        self.viewport = None;
        self.scissor_rect = None;
    }

    fn end(&mut self) -> Result<(), Error> {
        self.end_active();
        if let Some(encoder) = self.encoder.take() {
            self.finished = Some(encoder.finish());
        }
        Ok(())
    }

    fn submit(&mut self, completion: Completion) -> Result<(), Error> {
        let Some(commands) = self.finished.take() else {
            completion.signal();
            return Ok(());
        };
        let queue = self.context.queue();
        queue.submit(std::iter::once(commands));
        queue.on_submitted_work_done(move || completion.signal());
        self.context.set_needs_poll();
        Ok(())
    }

    fn execution_completed(&mut self) {
        self.held_uploads.clear();
    }

    fn begin_render_pass(&mut self, pass: &RenderPassDescription) {
        self.end_active();
        self.pass = Some(pass.clone());
        self.viewport = Some(pass.framebuffer.full_viewport());
        self.scissor_rect = Some(pass.framebuffer.full_scissor_rect());
    }

    fn end_render_pass(&mut self) {
        if !matches!(self.active, ActivePass::Render(_)) && self.has_pending_clears() {
            //the clears still have to land
            self.open_render_pass();
        }
        self.end_active();
        self.pass = None;
    }

    fn clear_color_target(&mut self, index: u32, color: RgbaFloat) {
        if matches!(self.active, ActivePass::Render(_)) {
            self.end_active();
        }
        if let Some(action) = self
            .pass
            .as_mut()
            .and_then(|p| p.color_attachments.get_mut(index as usize))
        {
            action.load = LoadAction::Clear;
            action.clear_color = color;
        }
    }

    fn clear_depth_stencil(&mut self, depth: f32, stencil: u8) {
        if matches!(self.active, ActivePass::Render(_)) {
            self.end_active();
        }
        let Some(pass) = self.pass.as_mut() else {
            return;
        };
        let has_stencil = pass
            .framebuffer
            .depth_target()
            .is_some_and(|d| d.target.format().has_stencil());
        if let Some(action) = pass.depth_attachment.as_mut() {
            action.load = LoadAction::Clear;
            action.clear_depth = depth;
            if has_stencil {
                action.stencil_load = LoadAction::Clear;
                action.clear_stencil = stencil;
            }
        }
    }

    fn set_pipeline(&mut self, pipeline: &Pipeline) {
        if pipeline.is_compute() {
            if pipeline.native::<wgpu::ComputePipeline>().is_none() {
                logwise::warn_sync!("Compute pipeline {name} has no native wgpu pipeline", name = pipeline.name());
            }
            self.compute_pipeline = Some(pipeline.clone());
            self.compute_groups.clear();
            if let (ActivePass::Compute(compute), Some(native)) =
                (&mut self.active, pipeline.native::<wgpu::ComputePipeline>())
            {
                compute.set_pipeline(native);
            }
        } else {
            if pipeline.native::<wgpu::RenderPipeline>().is_none() {
                logwise::warn_sync!("Graphics pipeline {name} has no native wgpu pipeline", name = pipeline.name());
            }
            self.graphics_pipeline = Some(pipeline.clone());
            self.graphics_groups.clear();
            if let ActivePass::Render(render) = &mut self.active {
                apply_render_pipeline(render, pipeline);
            }
        }
    }

    fn set_vertex_buffer(&mut self, index: u32, buffer: &DeviceBuffer, offset: u32) {
        let native = self.natives.buffer(self.context.device(), buffer);
        let offset = u64::from(offset);
        if let ActivePass::Render(render) = &mut self.active {
            render.set_vertex_buffer(index, native.slice(offset..));
        }
        let index = index as usize;
        if self.vertex_buffers.len() <= index {
            self.vertex_buffers.resize(index + 1, None);
        }
        self.vertex_buffers[index] = Some((native, offset));
    }

    fn set_index_buffer(&mut self, buffer: &DeviceBuffer, format: IndexFormat, offset: u32) {
        let native = self.natives.buffer(self.context.device(), buffer);
        let binding = IndexBinding {
            buffer: native,
            format,
            offset: u64::from(offset),
        };
        if let ActivePass::Render(render) = &mut self.active {
            render.set_index_buffer(binding.buffer.slice(binding.offset..), format.wgpu_format());
        }
        self.index_buffer = Some(binding);
    }

    fn set_graphics_resource_set(&mut self, slot: u32, set: &ResourceSet, dynamic_offsets: &[u32]) {
        let pipeline = self.graphics_pipeline.clone();
        let Some(bound) = self.bind_group(pipeline.as_ref(), slot, set, dynamic_offsets) else {
            logwise::warn_sync!("Resource set {name} has no native layout to bind to", name = set.name());
            return;
        };
        if let ActivePass::Render(render) = &mut self.active {
            render.set_bind_group(slot, &bound.group, &bound.offsets);
        }
        store_group(&mut self.graphics_groups, slot, bound);
    }

    fn set_compute_resource_set(&mut self, slot: u32, set: &ResourceSet, dynamic_offsets: &[u32]) {
        let pipeline = self.compute_pipeline.clone();
        let Some(bound) = self.bind_group(pipeline.as_ref(), slot, set, dynamic_offsets) else {
            logwise::warn_sync!("Resource set {name} has no native layout to bind to", name = set.name());
            return;
        };
        if let ActivePass::Compute(compute) = &mut self.active {
            compute.set_bind_group(slot, &bound.group, &bound.offsets);
        }
        store_group(&mut self.compute_groups, slot, bound);
    }

    fn set_viewport(&mut self, index: u32, viewport: Viewport) {
        if index != 0 {
            return;
        }
        if let ActivePass::Render(render) = &mut self.active {
            let v = viewport;
            render.set_viewport(v.x, v.y, v.width, v.height, v.min_depth, v.max_depth);
        }
        self.viewport = Some(viewport);
    }

    fn set_scissor_rect(&mut self, index: u32, rect: ScissorRect) {
        if index != 0 {
            return;
        }
        if let ActivePass::Render(render) = &mut self.active {
            render.set_scissor_rect(rect.x, rect.y, rect.width, rect.height);
        }
        self.scissor_rect = Some(rect);
    }

    fn draw(&mut self, args: DrawArgs) {
        if let Some(render) = self.pre_draw() {
            render.draw(
                args.vertex_start..args.vertex_start + args.vertex_count,
                args.instance_start..args.instance_start + args.instance_count,
            );
        }
    }

    fn draw_indexed(&mut self, args: DrawIndexedArgs) {
        if let Some(render) = self.pre_draw() {
            render.draw_indexed(
                args.index_start..args.index_start + args.index_count,
                args.vertex_offset,
                args.instance_start..args.instance_start + args.instance_count,
            );
        }
    }

    fn draw_indirect(&mut self, args: &IndirectArgs) {
        let buffer = self.natives.buffer(self.context.device(), &args.buffer);
        if let Some(render) = self.pre_draw() {
            for offset in args.record_offsets() {
                render.draw_indirect(&buffer, u64::from(offset));
            }
        }
    }

    fn draw_indexed_indirect(&mut self, args: &IndirectArgs) {
        let buffer = self.natives.buffer(self.context.device(), &args.buffer);
        if let Some(render) = self.pre_draw() {
            for offset in args.record_offsets() {
                render.draw_indexed_indirect(&buffer, u64::from(offset));
            }
        }
    }

    fn dispatch(&mut self, args: DispatchArgs) {
        if let Some(compute) = self.pre_dispatch() {
            compute.dispatch_workgroups(args.group_count_x, args.group_count_y, args.group_count_z);
        }
    }

    fn dispatch_indirect(&mut self, buffer: &DeviceBuffer, offset: u32) {
        let buffer = self.natives.buffer(self.context.device(), buffer);
        if let Some(compute) = self.pre_dispatch() {
            compute.dispatch_workgroups_indirect(&buffer, u64::from(offset));
        }
    }

    fn copy_buffer(&mut self, copy: &BufferCopy) {
        if !copy.is_aligned() {
            logwise::warn_sync!(
                "Unaligned buffer copy of {size} bytes is not supported by wgpu and was dropped",
                size = copy.size
            );
            return;
        }
        let device = self.context.device().clone();
        let source = self.natives.buffer(&device, &copy.source);
        let destination = self.natives.buffer(&device, &copy.destination);
        if let Some(encoder) = self.transfer_encoder() {
            encoder.copy_buffer_to_buffer(
                &source,
                u64::from(copy.source_offset),
                &destination,
                u64::from(copy.destination_offset),
                u64::from(copy.size),
            );
        }
    }

    fn copy_texture(&mut self, copy: &TextureCopy) {
        let device = self.context.device().clone();
        let source = self.natives.texture(&device, &copy.source);
        let destination = self.natives.texture(&device, &copy.destination);
        let is_3d = copy.source.description().depth > 1;
        let (source_z, destination_z, depth_or_array_layers) = if is_3d {
            (copy.source_origin.2, copy.destination_origin.2, copy.depth)
        } else {
            (
                copy.source_base_array_layer,
                copy.destination_base_array_layer,
                copy.layer_count,
            )
        };
        if let Some(encoder) = self.transfer_encoder() {
            encoder.copy_texture_to_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &source,
                    mip_level: copy.source_mip_level,
                    origin: wgpu::Origin3d {
                        x: copy.source_origin.0,
                        y: copy.source_origin.1,
                        z: source_z,
                    },
                    aspect: wgpu::TextureAspect::All,
                },
                wgpu::TexelCopyTextureInfo {
                    texture: &destination,
                    mip_level: copy.destination_mip_level,
                    origin: wgpu::Origin3d {
                        x: copy.destination_origin.0,
                        y: copy.destination_origin.1,
                        z: destination_z,
                    },
                    aspect: wgpu::TextureAspect::All,
                },
                wgpu::Extent3d {
                    width: copy.width,
                    height: copy.height,
                    depth_or_array_layers,
                },
            );
        }
    }

    fn resolve_texture(&mut self, source: &Texture, destination: &Texture) {
        let device = self.context.device().clone();
        let source_view = self.natives.resolve_view(&device, source);
        let destination_view = self.natives.resolve_view(&device, destination);
        if let Some(encoder) = self.transfer_encoder() {
            //a pass that only loads the source and resolves it
            let resolve = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("resolve"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &source_view,
                    depth_slice: None,
                    resolve_target: Some(&destination_view),
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            drop(resolve);
        }
    }

    fn update_buffer(&mut self, buffer: &DeviceBuffer, offset: u32, data: &[u8]) -> Result<(), Error> {
        let alignment = wgpu::COPY_BUFFER_ALIGNMENT;
        if u64::from(offset) % alignment != 0 || data.len() as u64 % alignment != 0 {
            return Err(UsageError::UnsupportedFeature("buffer updates not aligned to 4 bytes").into());
        }
        let device = self.context.device().clone();
        let destination = self.natives.buffer(&device, buffer);
        let upload = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("update_buffer upload"),
            contents: data,
            usage: wgpu::BufferUsages::COPY_SRC,
        });
        if let Some(encoder) = self.transfer_encoder() {
            encoder.copy_buffer_to_buffer(&upload, 0, &destination, u64::from(offset), data.len() as u64);
        }
        self.held_uploads.push(upload);
        Ok(())
    }

    fn generate_mipmaps(&mut self, texture: &Texture) {
        logwise::warn_sync!(
            "Mipmap generation for {texture} is not supported by wgpu and was dropped",
            texture = texture.name()
        );
    }

    fn memory_barrier(&mut self) {
        //wgpu orders dependent commands itself
        logwise::trace_sync!("Memory barrier left to wgpu");
    }

    fn push_debug_group(&mut self, name: &str) {
        if self.pass.is_some() {
            if let Some(render) = self.render_pass_for_markers() {
                render.push_debug_group(name);
            }
        } else if let Some(encoder) = self.transfer_encoder() {
            encoder.push_debug_group(name);
        }
    }

    fn pop_debug_group(&mut self) {
        if self.pass.is_some() {
            if let Some(render) = self.render_pass_for_markers() {
                render.pop_debug_group();
            }
        } else if let Some(encoder) = self.transfer_encoder() {
            encoder.pop_debug_group();
        }
    }

    fn insert_debug_marker(&mut self, name: &str) {
        if self.pass.is_some() {
            if let Some(render) = self.render_pass_for_markers() {
                render.insert_debug_marker(name);
            }
        } else if let Some(encoder) = self.transfer_encoder() {
            encoder.insert_debug_marker(name);
        }
    }
}

impl WgpuExecutor {
    /// Inside a render pass, debug groups and markers go to the wgpu render pass.
    fn render_pass_for_markers(&mut self) -> Option<&mut wgpu::RenderPass<'static>> {
        if !matches!(self.active, ActivePass::Render(_)) {
            self.open_render_pass();
        }
        match &mut self.active {
            ActivePass::Render(render) => Some(render),
            _ => None,
        }
    }
}
