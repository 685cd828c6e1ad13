// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! A native API that records calls instead of issuing them.
//!
//! This is the backend used when no GPU backend is compiled in. Resources are reduced to
//! their ids, so recordings compare equal across runs that create resources in the same
//! order.

use crate::bindings::resources::{BindableResource, DeviceBuffer, ResourceId, Sampler, Texture};
use crate::command::{BufferCopy, DispatchArgs, DrawArgs, Error, IndexFormat, TextureCopy};
use crate::device::Completion;
use crate::imp::native::{EncoderKind, IndexedDraw, NativeEncoderApi, RenderStage};
use crate::pass::{LoadAction, RenderPassDescription, RgbaFloat, ScissorRect, Viewport};
use crate::pipeline::{
    DepthStencilState, FaceCullMode, FrontFace, Pipeline, PolygonFillMode, PrimitiveTopology,
};
use crate::staging::{StagingBlock, StagingBlockId};

/// Load actions an encoder was opened with.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedPass {
    pub framebuffer: ResourceId,
    pub color_loads: Vec<(LoadAction, RgbaFloat)>,
    pub depth_load: Option<(LoadAction, f32)>,
    pub resolve_targets: Vec<ResourceId>,
}

/// One native call.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeCall {
    BeginCommandBuffer,
    Commit,
    OpenRenderEncoder(RecordedPass),
    OpenBlitEncoder,
    OpenComputeEncoder,
    EndEncoder(EncoderKind),
    SetRenderPipelineState(ResourceId),
    SetCullMode(FaceCullMode),
    SetFrontFacing(FrontFace),
    SetTriangleFillMode(PolygonFillMode),
    SetBlendColor(RgbaFloat),
    SetDepthStencilState(DepthStencilState),
    SetDepthClipEnabled(bool),
    SetStencilReference(u32),
    SetViewports(Vec<Viewport>),
    SetViewport(Viewport),
    SetScissorRects(Vec<ScissorRect>),
    SetScissorRect(ScissorRect),
    SetRenderBuffer { stage: RenderStage, buffer: ResourceId, offset: u32, slot: u32 },
    SetRenderTexture { stage: RenderStage, texture: ResourceId, slot: u32 },
    SetRenderSampler { stage: RenderStage, sampler: ResourceId, slot: u32 },
    DrawPrimitives { topology: PrimitiveTopology, args: DrawArgs },
    DrawIndexedPrimitives {
        topology: PrimitiveTopology,
        index_count: u32,
        format: IndexFormat,
        index_buffer: ResourceId,
        index_buffer_offset: u32,
        instance_count: u32,
        base_vertex: i32,
        base_instance: u32,
    },
    DrawPrimitivesIndirect { topology: PrimitiveTopology, buffer: ResourceId, offset: u32 },
    DrawIndexedPrimitivesIndirect {
        topology: PrimitiveTopology,
        format: IndexFormat,
        index_buffer: ResourceId,
        index_buffer_offset: u32,
        indirect_buffer: ResourceId,
        indirect_offset: u32,
    },
    SetComputePipelineState(ResourceId),
    SetComputeBuffer { buffer: ResourceId, offset: u32, slot: u32 },
    SetComputeTexture { texture: ResourceId, slot: u32 },
    SetComputeSampler { sampler: ResourceId, slot: u32 },
    DispatchThreadgroups { args: DispatchArgs, thread_group_size: (u32, u32, u32) },
    DispatchThreadgroupsIndirect { buffer: ResourceId, offset: u32, thread_group_size: (u32, u32, u32) },
    CopyBufferWithKernel { source: ResourceId, destination: ResourceId, size: u32 },
    CopyBuffer { source: ResourceId, destination: ResourceId, size: u32 },
    CopyFromStaging { block: StagingBlockId, destination: ResourceId, offset: u32, data: Vec<u8> },
    CopyTexture { source: ResourceId, destination: ResourceId },
    GenerateMipmaps(ResourceId),
    ResolveTexture { source: ResourceId, destination: ResourceId },
    MemoryBarrier(EncoderKind),
    PushDebugGroup { target: Option<EncoderKind>, name: String },
    PopDebugGroup { target: Option<EncoderKind> },
    InsertDebugMarker { target: Option<EncoderKind>, name: String },
}

impl NativeCall {
    pub fn is_encoder_open(&self) -> bool {
        matches!(
            self,
            NativeCall::OpenRenderEncoder(_) | NativeCall::OpenBlitEncoder | NativeCall::OpenComputeEncoder
        )
    }
}

/// Records native calls.
///
/// By default committed work completes at once. [`RecordingEncoder::deferred_completion`]
/// keeps it executing until [`complete_all`](RecordingEncoder::complete_all).
#[derive(Debug)]
pub struct RecordingEncoder {
    calls: Vec<NativeCall>,
    auto_complete: bool,
    in_flight: Vec<Completion>,
}

impl Default for RecordingEncoder {
    fn default() -> Self {
        RecordingEncoder {
            calls: Vec::new(),
            auto_complete: true,
            in_flight: Vec::new(),
        }
    }
}

impl RecordingEncoder {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn deferred_completion() -> Self {
        RecordingEncoder {
            auto_complete: false,
            ..Self::default()
        }
    }
    pub fn calls(&self) -> &[NativeCall] {
        &self.calls
    }
    pub fn count(&self, predicate: impl Fn(&NativeCall) -> bool) -> usize {
        self.calls.iter().filter(|c| predicate(c)).count()
    }
    pub fn clear(&mut self) {
        self.calls.clear();
    }
    /// Number of committed command buffers not completed yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }
    /// Completes every committed command buffer.
    pub fn complete_all(&mut self) {
        for completion in self.in_flight.drain(..) {
            completion.signal();
        }
    }
}

impl NativeEncoderApi for RecordingEncoder {
    fn begin_command_buffer(&mut self) {
        self.calls.push(NativeCall::BeginCommandBuffer);
    }
    fn commit(&mut self, completion: Completion) -> Result<(), Error> {
        self.calls.push(NativeCall::Commit);
        if self.auto_complete {
            completion.signal();
        } else {
            self.in_flight.push(completion);
        }
        Ok(())
    }
    fn open_render_encoder(&mut self, pass: &RenderPassDescription) {
        self.calls.push(NativeCall::OpenRenderEncoder(RecordedPass {
            framebuffer: pass.framebuffer.id(),
            color_loads: pass
                .color_attachments
                .iter()
                .map(|c| (c.load, c.clear_color))
                .collect(),
            depth_load: pass.depth_attachment.map(|d| (d.load, d.clear_depth)),
            resolve_targets: pass.resolve_targets.iter().map(|t| t.id()).collect(),
        }));
    }
    fn open_blit_encoder(&mut self) {
        self.calls.push(NativeCall::OpenBlitEncoder);
    }
    fn open_compute_encoder(&mut self) {
        self.calls.push(NativeCall::OpenComputeEncoder);
    }
    fn end_encoder(&mut self, kind: EncoderKind) {
        self.calls.push(NativeCall::EndEncoder(kind));
    }
    fn set_render_pipeline_state(&mut self, pipeline: &Pipeline) {
        self.calls.push(NativeCall::SetRenderPipelineState(pipeline.id()));
    }
    fn set_cull_mode(&mut self, mode: FaceCullMode) {
        self.calls.push(NativeCall::SetCullMode(mode));
    }
    fn set_front_facing(&mut self, winding: FrontFace) {
        self.calls.push(NativeCall::SetFrontFacing(winding));
    }
    fn set_triangle_fill_mode(&mut self, mode: PolygonFillMode) {
        self.calls.push(NativeCall::SetTriangleFillMode(mode));
    }
    fn set_blend_color(&mut self, color: RgbaFloat) {
        self.calls.push(NativeCall::SetBlendColor(color));
    }
    fn set_depth_stencil_state(&mut self, state: DepthStencilState) {
        self.calls.push(NativeCall::SetDepthStencilState(state));
    }
    fn set_depth_clip_enabled(&mut self, enabled: bool) {
        self.calls.push(NativeCall::SetDepthClipEnabled(enabled));
    }
    fn set_stencil_reference(&mut self, reference: u32) {
        self.calls.push(NativeCall::SetStencilReference(reference));
    }
    fn set_viewports(&mut self, viewports: &[Viewport]) {
        self.calls.push(NativeCall::SetViewports(viewports.to_vec()));
    }
    fn set_viewport(&mut self, viewport: Viewport) {
        self.calls.push(NativeCall::SetViewport(viewport));
    }
    fn set_scissor_rects(&mut self, rects: &[ScissorRect]) {
        self.calls.push(NativeCall::SetScissorRects(rects.to_vec()));
    }
    fn set_scissor_rect(&mut self, rect: ScissorRect) {
        self.calls.push(NativeCall::SetScissorRect(rect));
    }
    fn set_render_buffer(&mut self, stage: RenderStage, buffer: &DeviceBuffer, offset: u32, slot: u32) {
        self.calls.push(NativeCall::SetRenderBuffer {
            stage,
            buffer: buffer.id(),
            offset,
            slot,
        });
    }
    fn set_render_texture(&mut self, stage: RenderStage, texture: &BindableResource, slot: u32) {
        self.calls.push(NativeCall::SetRenderTexture {
            stage,
            texture: texture.id(),
            slot,
        });
    }
    fn set_render_sampler(&mut self, stage: RenderStage, sampler: &Sampler, slot: u32) {
        self.calls.push(NativeCall::SetRenderSampler {
            stage,
            sampler: sampler.id(),
            slot,
        });
    }
    fn draw_primitives(&mut self, topology: PrimitiveTopology, args: DrawArgs) {
        self.calls.push(NativeCall::DrawPrimitives { topology, args });
    }
    fn draw_indexed_primitives(&mut self, draw: &IndexedDraw<'_>) {
        self.calls.push(NativeCall::DrawIndexedPrimitives {
            topology: draw.topology,
            index_count: draw.index_count,
            format: draw.format,
            index_buffer: draw.index_buffer.id(),
            index_buffer_offset: draw.index_buffer_offset,
            instance_count: draw.instance_count,
            base_vertex: draw.base_vertex,
            base_instance: draw.base_instance,
        });
    }
    fn draw_primitives_indirect(&mut self, topology: PrimitiveTopology, buffer: &DeviceBuffer, offset: u32) {
        self.calls.push(NativeCall::DrawPrimitivesIndirect {
            topology,
            buffer: buffer.id(),
            offset,
        });
    }
    fn draw_indexed_primitives_indirect(
        &mut self,
        topology: PrimitiveTopology,
        format: IndexFormat,
        index_buffer: &DeviceBuffer,
        index_buffer_offset: u32,
        indirect_buffer: &DeviceBuffer,
        indirect_offset: u32,
    ) {
        self.calls.push(NativeCall::DrawIndexedPrimitivesIndirect {
            topology,
            format,
            index_buffer: index_buffer.id(),
            index_buffer_offset,
            indirect_buffer: indirect_buffer.id(),
            indirect_offset,
        });
    }
    fn set_compute_pipeline_state(&mut self, pipeline: &Pipeline) {
        self.calls.push(NativeCall::SetComputePipelineState(pipeline.id()));
    }
    fn set_compute_buffer(&mut self, buffer: &DeviceBuffer, offset: u32, slot: u32) {
        self.calls.push(NativeCall::SetComputeBuffer {
            buffer: buffer.id(),
            offset,
            slot,
        });
    }
    fn set_compute_texture(&mut self, texture: &BindableResource, slot: u32) {
        self.calls.push(NativeCall::SetComputeTexture {
            texture: texture.id(),
            slot,
        });
    }
    fn set_compute_sampler(&mut self, sampler: &Sampler, slot: u32) {
        self.calls.push(NativeCall::SetComputeSampler {
            sampler: sampler.id(),
            slot,
        });
    }
    fn dispatch_threadgroups(&mut self, args: DispatchArgs, thread_group_size: (u32, u32, u32)) {
        self.calls.push(NativeCall::DispatchThreadgroups {
            args,
            thread_group_size,
        });
    }
    fn dispatch_threadgroups_indirect(
        &mut self,
        buffer: &DeviceBuffer,
        offset: u32,
        thread_group_size: (u32, u32, u32),
    ) {
        self.calls.push(NativeCall::DispatchThreadgroupsIndirect {
            buffer: buffer.id(),
            offset,
            thread_group_size,
        });
    }
    fn copy_buffer_with_kernel(&mut self, copy: &BufferCopy) {
        self.calls.push(NativeCall::CopyBufferWithKernel {
            source: copy.source.id(),
            destination: copy.destination.id(),
            size: copy.size,
        });
    }
    fn copy_buffer(&mut self, copy: &BufferCopy) {
        self.calls.push(NativeCall::CopyBuffer {
            source: copy.source.id(),
            destination: copy.destination.id(),
            size: copy.size,
        });
    }
    fn copy_from_staging(&mut self, block: &StagingBlock, destination: &DeviceBuffer, offset: u32) {
        self.calls.push(NativeCall::CopyFromStaging {
            block: block.id(),
            destination: destination.id(),
            offset,
            data: block.bytes().to_vec(),
        });
    }
    fn copy_texture(&mut self, copy: &TextureCopy) {
        self.calls.push(NativeCall::CopyTexture {
            source: copy.source.id(),
            destination: copy.destination.id(),
        });
    }
    fn generate_mipmaps(&mut self, texture: &Texture) {
        self.calls.push(NativeCall::GenerateMipmaps(texture.id()));
    }
    fn resolve_texture(&mut self, source: &Texture, destination: &Texture) {
        self.calls.push(NativeCall::ResolveTexture {
            source: source.id(),
            destination: destination.id(),
        });
    }
    fn memory_barrier(&mut self, kind: EncoderKind) {
        self.calls.push(NativeCall::MemoryBarrier(kind));
    }
    fn push_debug_group(&mut self, target: Option<EncoderKind>, name: &str) {
        self.calls.push(NativeCall::PushDebugGroup {
            target,
            name: name.to_string(),
        });
    }
    fn pop_debug_group(&mut self, target: Option<EncoderKind>) {
        self.calls.push(NativeCall::PopDebugGroup { target });
    }
    fn insert_debug_marker(&mut self, target: Option<EncoderKind>, name: &str) {
        self.calls.push(NativeCall::InsertDebugMarker {
            target,
            name: name.to_string(),
        });
    }
}
