// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! The native surface the slot-encoder executor drives.
//!
//! This is modelled on encoder-based APIs: a command buffer hosts a sequence of render,
//! blit and compute encoders, at most one open at a time, and every encoder starts with
//! no state. Buffers, textures and samplers are bound to flat per-stage slot numbers.

use crate::bindings::resources::{BindableResource, DeviceBuffer, Sampler, Texture};
use crate::command::{BufferCopy, DispatchArgs, DrawArgs, Error, IndexFormat, TextureCopy};
use crate::device::Completion;
use crate::pass::{RenderPassDescription, RgbaFloat, ScissorRect, Viewport};
use crate::pipeline::{
    DepthStencilState, FaceCullMode, FrontFace, Pipeline, PolygonFillMode, PrimitiveTopology,
};
use crate::staging::StagingBlock;

/// Kind of an open encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EncoderKind {
    Render,
    Blit,
    Compute,
}

/// Shader stage functions a render encoder binds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderStage {
    Vertex,
    Fragment,
}

/// An indexed draw, with the index buffer offset already resolved.
#[derive(Debug, Clone)]
pub struct IndexedDraw<'a> {
    pub topology: PrimitiveTopology,
    pub index_count: u32,
    pub format: IndexFormat,
    pub index_buffer: &'a DeviceBuffer,
    /// Byte offset of the first index: the index size times the first index, plus the
    /// offset the index buffer was bound at.
    pub index_buffer_offset: u32,
    pub instance_count: u32,
    pub base_vertex: i32,
    pub base_instance: u32,
}

/// The native API of an encoder-based backend.
pub trait NativeEncoderApi {
    /// Starts a new command buffer.
    fn begin_command_buffer(&mut self);
    /// Commits the current command buffer; `completion` is signaled when it finished.
    fn commit(&mut self, completion: Completion) -> Result<(), Error>;

    fn open_render_encoder(&mut self, pass: &RenderPassDescription);
    fn open_blit_encoder(&mut self);
    fn open_compute_encoder(&mut self);
    fn end_encoder(&mut self, kind: EncoderKind);

    fn set_render_pipeline_state(&mut self, pipeline: &Pipeline);
    fn set_cull_mode(&mut self, mode: FaceCullMode);
    fn set_front_facing(&mut self, winding: FrontFace);
    fn set_triangle_fill_mode(&mut self, mode: PolygonFillMode);
    fn set_blend_color(&mut self, color: RgbaFloat);
    fn set_depth_stencil_state(&mut self, state: DepthStencilState);
    fn set_depth_clip_enabled(&mut self, enabled: bool);
    fn set_stencil_reference(&mut self, reference: u32);
    /// Sets every viewport in one call.
    fn set_viewports(&mut self, viewports: &[Viewport]);
    fn set_viewport(&mut self, viewport: Viewport);
    /// Sets every scissor rect in one call.
    fn set_scissor_rects(&mut self, rects: &[ScissorRect]);
    fn set_scissor_rect(&mut self, rect: ScissorRect);

    fn set_render_buffer(&mut self, stage: RenderStage, buffer: &DeviceBuffer, offset: u32, slot: u32);
    /// `texture` is a texture or a texture view.
    fn set_render_texture(&mut self, stage: RenderStage, texture: &BindableResource, slot: u32);
    fn set_render_sampler(&mut self, stage: RenderStage, sampler: &Sampler, slot: u32);

    fn draw_primitives(&mut self, topology: PrimitiveTopology, args: DrawArgs);
    fn draw_indexed_primitives(&mut self, draw: &IndexedDraw<'_>);
    fn draw_primitives_indirect(&mut self, topology: PrimitiveTopology, buffer: &DeviceBuffer, offset: u32);
    fn draw_indexed_primitives_indirect(
        &mut self,
        topology: PrimitiveTopology,
        format: IndexFormat,
        index_buffer: &DeviceBuffer,
        index_buffer_offset: u32,
        indirect_buffer: &DeviceBuffer,
        indirect_offset: u32,
    );

    fn set_compute_pipeline_state(&mut self, pipeline: &Pipeline);
    fn set_compute_buffer(&mut self, buffer: &DeviceBuffer, offset: u32, slot: u32);
    fn set_compute_texture(&mut self, texture: &BindableResource, slot: u32);
    fn set_compute_sampler(&mut self, sampler: &Sampler, slot: u32);
    fn dispatch_threadgroups(&mut self, args: DispatchArgs, thread_group_size: (u32, u32, u32));
    fn dispatch_threadgroups_indirect(
        &mut self,
        buffer: &DeviceBuffer,
        offset: u32,
        thread_group_size: (u32, u32, u32),
    );
    /// Copies bytes with a compute kernel; used for copies the blit path cannot do.
    ///
    /// Replaces the compute pipeline state and the bindings it uses.
    fn copy_buffer_with_kernel(&mut self, copy: &BufferCopy);

    fn copy_buffer(&mut self, copy: &BufferCopy);
    fn copy_from_staging(&mut self, block: &StagingBlock, destination: &DeviceBuffer, offset: u32);
    fn copy_texture(&mut self, copy: &TextureCopy);
    fn generate_mipmaps(&mut self, texture: &Texture);
    /// Encodes a pass of its own that resolves `source` into `destination`.
    fn resolve_texture(&mut self, source: &Texture, destination: &Texture);

    fn memory_barrier(&mut self, kind: EncoderKind);

    /// `target` is the open encoder, or `None` for the command buffer itself.
    fn push_debug_group(&mut self, target: Option<EncoderKind>, name: &str);
    fn pop_debug_group(&mut self, target: Option<EncoderKind>);
    fn insert_debug_marker(&mut self, target: Option<EncoderKind>, name: &str);
}
