// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Usage validation policy and its errors.

use crate::bindings::layout::ResourceKind;
use crate::bindings::resources::ResourceId;
use crate::bindings::visible_to::{BufferUsage, TextureUsage};
use crate::pixel_formats::PixelFormat;
use std::fmt::Debug;

/// Whether usage validation is compiled in.
///
/// Resolved from the `validate_usage` feature. Every validated operation tests this
/// constant first, so an unchecked build drops the checks entirely.
pub const VALIDATE_USAGE: bool = cfg!(feature = "validate_usage");

/// Recording state of a command list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordingState {
    /// Created, or reset, and never begun.
    Initial,
    /// Between `begin` and `end`.
    Recording,
    /// Ended and waiting to be submitted.
    Recorded,
    /// Submitted and not yet completed by the device.
    Executing,
    /// Execution finished.
    Completed,
    Disposed,
}

/// Misuse of the recording API.
#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum UsageError {
    #[error("{operation} is not valid while the command list is {state:?}")]
    InvalidState {
        operation: &'static str,
        state: RecordingState,
    },
    #[error("the command list was not created as reusable and has already executed")]
    NotReusable,
    #[error("{operation} requires an open render pass")]
    RenderPassRequired { operation: &'static str },
    #[error("{operation} cannot be called while a render pass is open")]
    RenderPassOpen { operation: &'static str },
    #[error("a graphics pipeline must be bound before {operation}")]
    NoGraphicsPipeline { operation: &'static str },
    #[error("a compute pipeline must be bound before {operation}")]
    NoComputePipeline { operation: &'static str },
    #[error("cannot bind a resource set to slot {slot}; the pipeline only has {layouts} resource layouts")]
    ResourceSetSlotOutOfRange { slot: u32, layouts: usize },
    #[error("cannot bind a resource set to slot {slot}; it has {actual} elements but the pipeline expects {expected}")]
    ResourceSetElementCount {
        slot: u32,
        expected: usize,
        actual: usize,
    },
    #[error("cannot bind a resource set to slot {slot}; element {element} is a {actual} but the pipeline expects a {expected}")]
    ResourceSetElementKind {
        slot: u32,
        element: usize,
        expected: ResourceKind,
        actual: ResourceKind,
    },
    #[error("{expected} dynamic offsets were expected, but {actual} were provided")]
    DynamicOffsetCount { expected: u32, actual: usize },
    #[error("the effective offset {offset} of element {element} is not a multiple of {alignment}")]
    MisalignedDynamicOffset {
        element: usize,
        offset: u32,
        alignment: u32,
    },
    #[error("the layout has {expected} elements but {actual} resources were provided")]
    ResourceSetArity { expected: usize, actual: usize },
    #[error("element {index} expects a {expected}, but {actual} was provided")]
    ResourceKindMismatch {
        index: usize,
        expected: ResourceKind,
        actual: String,
    },
    #[error("the buffer range of element {index} starts at {offset}, which is not a multiple of {alignment}")]
    MisalignedBufferRange {
        index: usize,
        offset: u32,
        alignment: u32,
    },
    #[error("the range {offset}+{size} exceeds the {capacity} bytes of buffer {buffer}")]
    BufferRangeOutOfBounds {
        buffer: ResourceId,
        offset: u32,
        size: u32,
        capacity: u32,
    },
    #[error("{0} is not supported by this device")]
    UnsupportedFeature(&'static str),
    #[error("buffer {buffer} was not created with {required:?} usage")]
    MissingBufferUsage {
        buffer: ResourceId,
        required: BufferUsage,
    },
    #[error("texture {texture} was not created with {required:?} usage")]
    MissingTextureUsage {
        texture: ResourceId,
        required: TextureUsage,
    },
    #[error("the indirect offset {offset} must be a multiple of 4")]
    MisalignedIndirectOffset { offset: u32 },
    #[error("the indirect stride {stride} must be a multiple of 4 and at least {minimum}")]
    InvalidIndirectStride { stride: u32, minimum: u32 },
    #[error("{draw_count} indirect records end at byte {end}, past the {capacity} bytes of buffer {buffer}")]
    IndirectOutOfBounds {
        buffer: ResourceId,
        draw_count: u32,
        end: u64,
        capacity: u32,
    },
    #[error("an index buffer must be bound before drawing indexed")]
    NoIndexBuffer,
    #[error("the draw needs {needed} bytes of index data but index buffer {buffer} only has {capacity}")]
    IndexBufferTooSmall {
        buffer: ResourceId,
        needed: u64,
        capacity: u32,
    },
    #[error("the output description of pipeline {pipeline} is not compatible with framebuffer {framebuffer}")]
    IncompatibleOutput {
        pipeline: ResourceId,
        framebuffer: ResourceId,
    },
    #[error("{index} is out of range for the {count} viewports of the framebuffer")]
    ViewportIndexOutOfRange { index: u32, count: usize },
    #[error("color target {index} is out of range for a framebuffer with {count} color targets")]
    ColorTargetOutOfRange { index: u32, count: usize },
    #[error("the framebuffer has no depth target")]
    NoDepthTarget,
    #[error("{resolve_targets} resolve targets were given for {color_targets} color targets")]
    ResolveTargetCount {
        resolve_targets: usize,
        color_targets: usize,
    },
    #[error("the {role} buffer {buffer} is not large enough for {size} bytes at offset {offset} (capacity {capacity})")]
    CopyOutOfBounds {
        role: &'static str,
        buffer: ResourceId,
        offset: u32,
        size: u32,
        capacity: u32,
    },
    #[error("the copy region is empty")]
    EmptyCopyRegion,
    #[error("the copy region is not valid for the {role} texture {texture}")]
    InvalidCopyRegion {
        role: &'static str,
        texture: ResourceId,
    },
    #[error("mip level {level} is out of range for the {role} texture, which has {levels}")]
    MipLevelOutOfRange {
        role: &'static str,
        level: u32,
        levels: u32,
    },
    #[error("layers {base}..{base}+{count} are out of range for the {role} texture, which has {layers}")]
    ArrayLayersOutOfRange {
        role: &'static str,
        base: u32,
        count: u32,
        layers: u32,
    },
    #[error("cannot copy from {source_format:?} to {destination_format:?}")]
    FormatMismatch {
        source_format: PixelFormat,
        destination_format: PixelFormat,
    },
    #[error("texture {texture} must be multisampled")]
    NotMultisampled { texture: ResourceId },
    #[error("texture {texture} must not be multisampled; it has {samples} samples")]
    Multisampled { texture: ResourceId, samples: u32 },
    #[error("pop_debug_group without a matching push_debug_group")]
    DebugGroupUnderflow,
    #[error("invalid description: {0}")]
    InvalidDescription(&'static str),
    #[error("semaphore {semaphore} {problem}")]
    SemaphoreMisuse {
        semaphore: ResourceId,
        problem: &'static str,
    },
}

/// Reports a value no kind-dispatch was written for.
///
/// Present in every configuration; this is a version-skew or incomplete-backend bug,
/// never a recoverable condition.
#[cold]
#[track_caller]
pub fn illegal_value<T: Debug>(what: &str, value: T) -> ! {
    panic!("illegal {what}: {value:?}")
}
