// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! An executor that only records what it is asked to do.
//!
//! Useful to observe exactly which calls survive validation and bind diffing.

use crate::bindings::resource_set::ResourceSet;
use crate::bindings::resources::{DeviceBuffer, ResourceId, Texture};
use crate::command::executor::{
    BufferCopy, DispatchArgs, DrawArgs, DrawIndexedArgs, Executor, IndexFormat, IndirectArgs,
    TextureCopy,
};
use crate::command::Error;
use crate::device::Completion;
use crate::pass::{RenderPassDescription, RgbaFloat, ScissorRect, Viewport};
use crate::pipeline::Pipeline;

/// One executor-level call, with resources reduced to their ids.
#[derive(Debug, Clone, PartialEq)]
pub enum SpyCall {
    Begin,
    End,
    Submit,
    ExecutionCompleted,
    BeginRenderPass { framebuffer: ResourceId },
    EndRenderPass,
    ClearColorTarget { index: u32, color: RgbaFloat },
    ClearDepthStencil { depth: f32, stencil: u8 },
    SetPipeline { pipeline: ResourceId },
    SetVertexBuffer { index: u32, buffer: ResourceId, offset: u32 },
    SetIndexBuffer { buffer: ResourceId, format: IndexFormat, offset: u32 },
    SetGraphicsResourceSet { slot: u32, set: ResourceId, dynamic_offsets: Vec<u32> },
    SetComputeResourceSet { slot: u32, set: ResourceId, dynamic_offsets: Vec<u32> },
    SetViewport { index: u32, viewport: Viewport },
    SetScissorRect { index: u32, rect: ScissorRect },
    Draw(DrawArgs),
    DrawIndexed(DrawIndexedArgs),
    DrawIndirect { buffer: ResourceId, offset: u32, draw_count: u32, stride: u32 },
    DrawIndexedIndirect { buffer: ResourceId, offset: u32, draw_count: u32, stride: u32 },
    Dispatch(DispatchArgs),
    DispatchIndirect { buffer: ResourceId, offset: u32 },
    CopyBuffer { source: ResourceId, destination: ResourceId, size: u32 },
    CopyTexture { source: ResourceId, destination: ResourceId },
    ResolveTexture { source: ResourceId, destination: ResourceId },
    UpdateBuffer { buffer: ResourceId, offset: u32, data: Vec<u8> },
    GenerateMipmaps { texture: ResourceId },
    MemoryBarrier,
    PushDebugGroup(String),
    PopDebugGroup,
    InsertDebugMarker(String),
}

/// Records every call it receives.
///
/// Submitted work completes immediately unless the spy was created with
/// [`SpyExecutor::holding`], in which case completions wait for
/// [`complete_pending`](SpyExecutor::complete_pending).
#[derive(Debug, Default)]
pub struct SpyExecutor {
    calls: Vec<SpyCall>,
    hold_completions: bool,
    pending: Vec<Completion>,
}

impl SpyExecutor {
    pub fn new() -> Self {
        Self::default()
    }
    /// A spy that keeps submissions executing until told otherwise.
    pub fn holding() -> Self {
        SpyExecutor {
            hold_completions: true,
            ..Self::default()
        }
    }
    pub fn calls(&self) -> &[SpyCall] {
        &self.calls
    }
    /// Number of recorded calls matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&SpyCall) -> bool) -> usize {
        self.calls.iter().filter(|c| predicate(c)).count()
    }
    pub fn clear(&mut self) {
        self.calls.clear();
    }
    /// Completes every held submission.
    pub fn complete_pending(&mut self) {
        for completion in self.pending.drain(..) {
            completion.signal();
        }
    }
}

impl Executor for SpyExecutor {
    fn begin(&mut self) {
        self.calls.push(SpyCall::Begin);
    }
    fn end(&mut self) -> Result<(), Error> {
        self.calls.push(SpyCall::End);
        Ok(())
    }
    fn submit(&mut self, completion: Completion) -> Result<(), Error> {
        self.calls.push(SpyCall::Submit);
        if self.hold_completions {
            self.pending.push(completion);
        } else {
            completion.signal();
        }
        Ok(())
    }
    fn execution_completed(&mut self) {
        self.calls.push(SpyCall::ExecutionCompleted);
    }
    fn begin_render_pass(&mut self, pass: &RenderPassDescription) {
        self.calls.push(SpyCall::BeginRenderPass {
            framebuffer: pass.framebuffer.id(),
        });
    }
    fn end_render_pass(&mut self) {
        self.calls.push(SpyCall::EndRenderPass);
    }
    fn clear_color_target(&mut self, index: u32, color: RgbaFloat) {
        self.calls.push(SpyCall::ClearColorTarget { index, color });
    }
    fn clear_depth_stencil(&mut self, depth: f32, stencil: u8) {
        self.calls.push(SpyCall::ClearDepthStencil { depth, stencil });
    }
    fn set_pipeline(&mut self, pipeline: &Pipeline) {
        self.calls.push(SpyCall::SetPipeline {
            pipeline: pipeline.id(),
        });
    }
    fn set_vertex_buffer(&mut self, index: u32, buffer: &DeviceBuffer, offset: u32) {
        self.calls.push(SpyCall::SetVertexBuffer {
            index,
            buffer: buffer.id(),
            offset,
        });
    }
    fn set_index_buffer(&mut self, buffer: &DeviceBuffer, format: IndexFormat, offset: u32) {
        self.calls.push(SpyCall::SetIndexBuffer {
            buffer: buffer.id(),
            format,
            offset,
        });
    }
    fn set_graphics_resource_set(&mut self, slot: u32, set: &ResourceSet, dynamic_offsets: &[u32]) {
        self.calls.push(SpyCall::SetGraphicsResourceSet {
            slot,
            set: set.id(),
            dynamic_offsets: dynamic_offsets.to_vec(),
        });
    }
    fn set_compute_resource_set(&mut self, slot: u32, set: &ResourceSet, dynamic_offsets: &[u32]) {
        self.calls.push(SpyCall::SetComputeResourceSet {
            slot,
            set: set.id(),
            dynamic_offsets: dynamic_offsets.to_vec(),
        });
    }
    fn set_viewport(&mut self, index: u32, viewport: Viewport) {
        self.calls.push(SpyCall::SetViewport { index, viewport });
    }
    fn set_scissor_rect(&mut self, index: u32, rect: ScissorRect) {
        self.calls.push(SpyCall::SetScissorRect { index, rect });
    }
    fn draw(&mut self, args: DrawArgs) {
        self.calls.push(SpyCall::Draw(args));
    }
    fn draw_indexed(&mut self, args: DrawIndexedArgs) {
        self.calls.push(SpyCall::DrawIndexed(args));
    }
    fn draw_indirect(&mut self, args: &IndirectArgs) {
        self.calls.push(SpyCall::DrawIndirect {
            buffer: args.buffer.id(),
            offset: args.offset,
            draw_count: args.draw_count,
            stride: args.stride,
        });
    }
    fn draw_indexed_indirect(&mut self, args: &IndirectArgs) {
        self.calls.push(SpyCall::DrawIndexedIndirect {
            buffer: args.buffer.id(),
            offset: args.offset,
            draw_count: args.draw_count,
            stride: args.stride,
        });
    }
    fn dispatch(&mut self, args: DispatchArgs) {
        self.calls.push(SpyCall::Dispatch(args));
    }
    fn dispatch_indirect(&mut self, buffer: &DeviceBuffer, offset: u32) {
        self.calls.push(SpyCall::DispatchIndirect {
            buffer: buffer.id(),
            offset,
        });
    }
    fn copy_buffer(&mut self, copy: &BufferCopy) {
        self.calls.push(SpyCall::CopyBuffer {
            source: copy.source.id(),
            destination: copy.destination.id(),
            size: copy.size,
        });
    }
    fn copy_texture(&mut self, copy: &TextureCopy) {
        self.calls.push(SpyCall::CopyTexture {
            source: copy.source.id(),
            destination: copy.destination.id(),
        });
    }
    fn resolve_texture(&mut self, source: &Texture, destination: &Texture) {
        self.calls.push(SpyCall::ResolveTexture {
            source: source.id(),
            destination: destination.id(),
        });
    }
    fn update_buffer(&mut self, buffer: &DeviceBuffer, offset: u32, data: &[u8]) -> Result<(), Error> {
        self.calls.push(SpyCall::UpdateBuffer {
            buffer: buffer.id(),
            offset,
            data: data.to_vec(),
        });
        Ok(())
    }
    fn generate_mipmaps(&mut self, texture: &Texture) {
        self.calls.push(SpyCall::GenerateMipmaps {
            texture: texture.id(),
        });
    }
    fn memory_barrier(&mut self) {
        self.calls.push(SpyCall::MemoryBarrier);
    }
    fn push_debug_group(&mut self, name: &str) {
        self.calls.push(SpyCall::PushDebugGroup(name.to_string()));
    }
    fn pop_debug_group(&mut self) {
        self.calls.push(SpyCall::PopDebugGroup);
    }
    fn insert_debug_marker(&mut self, name: &str) {
        self.calls.push(SpyCall::InsertDebugMarker(name.to_string()));
    }
}
