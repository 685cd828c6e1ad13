// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! The backend executor contract.
//!
//! [`CommandList`](super::CommandList) validates and de-duplicates every call, then
//! forwards it to an [`Executor`]. Executors translate the abstract commands into native
//! work; they may assume every call they receive already passed validation.

use crate::bindings::resource_set::ResourceSet;
use crate::bindings::resources::{DeviceBuffer, Texture};
use crate::command::Error;
use crate::device::Completion;
use crate::pass::{RenderPassDescription, RgbaFloat, ScissorRect, Viewport};
use crate::pipeline::Pipeline;

/// Width of one index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexFormat {
    UInt16,
    UInt32,
}

impl IndexFormat {
    pub fn size(self) -> u32 {
        match self {
            IndexFormat::UInt16 => 2,
            IndexFormat::UInt32 => 4,
        }
    }
}

/// Arguments of a non-indexed draw, in the layout indirect buffers use.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DrawArgs {
    pub vertex_count: u32,
    pub instance_count: u32,
    pub vertex_start: u32,
    pub instance_start: u32,
}

impl DrawArgs {
    /// One instance of `vertex_count` vertices starting at 0.
    pub const fn new(vertex_count: u32) -> Self {
        DrawArgs {
            vertex_count,
            instance_count: 1,
            vertex_start: 0,
            instance_start: 0,
        }
    }
}

/// Arguments of an indexed draw, in the layout indirect buffers use.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DrawIndexedArgs {
    pub index_count: u32,
    pub instance_count: u32,
    pub index_start: u32,
    pub vertex_offset: i32,
    pub instance_start: u32,
}

impl DrawIndexedArgs {
    /// One instance of `index_count` indices starting at 0.
    pub const fn new(index_count: u32) -> Self {
        DrawIndexedArgs {
            index_count,
            instance_count: 1,
            index_start: 0,
            vertex_offset: 0,
            instance_start: 0,
        }
    }
}

/// Arguments of a dispatch, in the layout indirect buffers use.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DispatchArgs {
    pub group_count_x: u32,
    pub group_count_y: u32,
    pub group_count_z: u32,
}

impl DispatchArgs {
    pub const fn new(group_count_x: u32, group_count_y: u32, group_count_z: u32) -> Self {
        DispatchArgs {
            group_count_x,
            group_count_y,
            group_count_z,
        }
    }
}

/// Size in bytes of one indirect draw record.
pub const INDIRECT_DRAW_SIZE: u32 = std::mem::size_of::<DrawArgs>() as u32;
/// Size in bytes of one indirect indexed-draw record.
pub const INDIRECT_DRAW_INDEXED_SIZE: u32 = std::mem::size_of::<DrawIndexedArgs>() as u32;
/// Size in bytes of one indirect dispatch record.
pub const INDIRECT_DISPATCH_SIZE: u32 = std::mem::size_of::<DispatchArgs>() as u32;

/// A sequence of indirect draws read from a buffer.
#[derive(Debug, Clone)]
pub struct IndirectArgs {
    pub buffer: DeviceBuffer,
    pub offset: u32,
    pub draw_count: u32,
    pub stride: u32,
}

impl IndirectArgs {
    /// Byte offset of each record, stopping at the first one past `u32::MAX`.
    pub fn record_offsets(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.draw_count).map_while(move |i| {
            let offset = u64::from(self.offset) + u64::from(i) * u64::from(self.stride);
            u32::try_from(offset).ok()
        })
    }

    /// One past the last byte read when each record is `record_size` bytes.
    pub fn end(&self, record_size: u32) -> u64 {
        match self.draw_count {
            0 => u64::from(self.offset),
            n => {
                u64::from(self.offset)
                    + u64::from(n - 1) * u64::from(self.stride)
                    + u64::from(record_size)
            }
        }
    }
}

/// One buffer-to-buffer copy.
#[derive(Debug, Clone)]
pub struct BufferCopy {
    pub source: DeviceBuffer,
    pub source_offset: u32,
    pub destination: DeviceBuffer,
    pub destination_offset: u32,
    pub size: u32,
}

impl BufferCopy {
    /// Whether offsets and size are all multiples of 4.
    pub fn is_aligned(&self) -> bool {
        (self.source_offset | self.destination_offset | self.size) % 4 == 0
    }
}

/// One texture-to-texture copy of a region.
#[derive(Debug, Clone)]
pub struct TextureCopy {
    pub source: Texture,
    pub source_origin: (u32, u32, u32),
    pub source_mip_level: u32,
    pub source_base_array_layer: u32,
    pub destination: Texture,
    pub destination_origin: (u32, u32, u32),
    pub destination_mip_level: u32,
    pub destination_base_array_layer: u32,
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    pub layer_count: u32,
}

impl TextureCopy {
    /// Copies one whole mip level and array layer between equally sized textures.
    pub fn level(source: &Texture, destination: &Texture, mip_level: u32, array_layer: u32) -> Self {
        let (width, height, depth) = source.mip_dimensions(mip_level);
        TextureCopy {
            source: source.clone(),
            source_origin: (0, 0, 0),
            source_mip_level: mip_level,
            source_base_array_layer: array_layer,
            destination: destination.clone(),
            destination_origin: (0, 0, 0),
            destination_mip_level: mip_level,
            destination_base_array_layer: array_layer,
            width,
            height,
            depth,
            layer_count: 1,
        }
    }
}

/// Native translation of the recording API.
///
/// One method per abstract command. Implemented independently by each backend; the
/// validating wrapper composes around it.
pub trait Executor {
    /// Recording begins; every per-recording cache is reset.
    fn begin(&mut self);
    /// Recording ends; any open encoder is closed.
    fn end(&mut self) -> Result<(), Error>;
    /// Hands the recorded work to the device. `completion` is signaled once it finished.
    fn submit(&mut self, completion: Completion) -> Result<(), Error>;
    /// The previously submitted work finished; resources held for it can be released.
    fn execution_completed(&mut self);

    fn begin_render_pass(&mut self, pass: &RenderPassDescription);
    fn end_render_pass(&mut self);
    fn clear_color_target(&mut self, index: u32, color: RgbaFloat);
    fn clear_depth_stencil(&mut self, depth: f32, stencil: u8);

    fn set_pipeline(&mut self, pipeline: &Pipeline);
    fn set_vertex_buffer(&mut self, index: u32, buffer: &DeviceBuffer, offset: u32);
    fn set_index_buffer(&mut self, buffer: &DeviceBuffer, format: IndexFormat, offset: u32);
    fn set_graphics_resource_set(&mut self, slot: u32, set: &ResourceSet, dynamic_offsets: &[u32]);
    fn set_compute_resource_set(&mut self, slot: u32, set: &ResourceSet, dynamic_offsets: &[u32]);
    fn set_viewport(&mut self, index: u32, viewport: Viewport);
    fn set_scissor_rect(&mut self, index: u32, rect: ScissorRect);

    fn draw(&mut self, args: DrawArgs);
    fn draw_indexed(&mut self, args: DrawIndexedArgs);
    fn draw_indirect(&mut self, args: &IndirectArgs);
    fn draw_indexed_indirect(&mut self, args: &IndirectArgs);
    fn dispatch(&mut self, args: DispatchArgs);
    fn dispatch_indirect(&mut self, buffer: &DeviceBuffer, offset: u32);

    fn copy_buffer(&mut self, copy: &BufferCopy);
    fn copy_texture(&mut self, copy: &TextureCopy);
    fn resolve_texture(&mut self, source: &Texture, destination: &Texture);
    fn update_buffer(&mut self, buffer: &DeviceBuffer, offset: u32, data: &[u8]) -> Result<(), Error>;
    fn generate_mipmaps(&mut self, texture: &Texture);
    fn memory_barrier(&mut self);

    fn push_debug_group(&mut self, name: &str);
    fn pop_debug_group(&mut self);
    fn insert_debug_marker(&mut self, name: &str);
}
