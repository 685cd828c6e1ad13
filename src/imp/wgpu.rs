// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! The wgpu backend.

mod context;
mod error;
mod executor;
mod resources;

pub use context::WgpuContext;
pub use error::Error;
pub use executor::WgpuExecutor;

use crate::pipeline::Pipeline;

/// Attaches the native render pipeline `pipeline` draws with.
///
/// Returns `false` if a native was attached already.
pub fn attach_render_pipeline(pipeline: &Pipeline, native: wgpu::RenderPipeline) -> bool {
    debug_assert!(!pipeline.is_compute());
    pipeline.attach_native(native)
}

/// Attaches the native compute pipeline `pipeline` dispatches with.
pub fn attach_compute_pipeline(pipeline: &Pipeline, native: wgpu::ComputePipeline) -> bool {
    debug_assert!(pipeline.is_compute());
    pipeline.attach_native(native)
}
