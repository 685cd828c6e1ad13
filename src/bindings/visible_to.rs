// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Resource visibility and usage declarations.
//!
//! This module provides the flag sets that describe how GPU resources will be accessed
//! by the rest of the pipeline. They are declared once, when a resource is created, and
//! consulted later by the recording layer to reject commands the resource was never
//! created for (binding a buffer without [`BufferUsage::VERTEX`] as a vertex buffer,
//! drawing indirectly from a buffer without [`BufferUsage::INDIRECT`], and so on).
//!
//! # Overview
//!
//! - [`ShaderStages`] - Which shader stages can see a binding
//! - [`BufferUsage`] - How a buffer will be used on the GPU
//! - [`TextureUsage`] - How a texture will be used on the GPU
//!
//! # Examples
//!
//! ```
//! use slots_and_passes::bindings::visible_to::{BufferUsage, ShaderStages};
//!
//! // A buffer holding draw arguments that is also written by a compute pass
//! let usage = BufferUsage::INDIRECT | BufferUsage::STRUCTURED_READ_WRITE;
//! assert!(usage.contains(BufferUsage::INDIRECT));
//!
//! // A uniform block shared by both graphics stages
//! let stages = ShaderStages::VERTEX | ShaderStages::FRAGMENT;
//! assert!(!stages.contains(ShaderStages::COMPUTE));
//! ```

bitflags::bitflags! {
    /// Describes which shader stages a binding is visible to.
    ///
    /// A layout element can be visible to several stages at once; flat-slot backends
    /// bind the resource once per visible stage.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
    pub struct ShaderStages: u8 {
        /// The vertex stage.
        const VERTEX = 1 << 0;
        /// The geometry stage.
        const GEOMETRY = 1 << 1;
        /// The tessellation control stage.
        const TESSELLATION_CONTROL = 1 << 2;
        /// The tessellation evaluation stage.
        const TESSELLATION_EVALUATION = 1 << 3;
        /// The fragment stage.
        const FRAGMENT = 1 << 4;
        /// The compute stage.
        const COMPUTE = 1 << 5;
    }
}

bitflags::bitflags! {
    /// Describes how a buffer will be used on the GPU.
    ///
    /// Commands check these flags before using a buffer in a given role.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
    pub struct BufferUsage: u8 {
        /// The buffer can be bound as a vertex buffer.
        const VERTEX = 1 << 0;
        /// The buffer can be bound as an index buffer.
        const INDEX = 1 << 1;
        /// The buffer can back a uniform binding.
        const UNIFORM = 1 << 2;
        /// The buffer can back a read-only structured binding.
        const STRUCTURED_READ_ONLY = 1 << 3;
        /// The buffer can back a read-write structured binding.
        const STRUCTURED_READ_WRITE = 1 << 4;
        /// The buffer can be the source of indirect draw or dispatch arguments.
        const INDIRECT = 1 << 5;
        /// The buffer is CPU-visible and can be mapped.
        const STAGING = 1 << 6;
        /// The buffer is expected to be updated frequently from the CPU.
        const DYNAMIC = 1 << 7;
    }
}

bitflags::bitflags! {
    /// Describes how a texture will be used on the GPU.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
    pub struct TextureUsage: u8 {
        /// The texture can be sampled by shaders.
        const SAMPLED = 1 << 0;
        /// The texture can be read and written as a storage image.
        const STORAGE = 1 << 1;
        /// The texture can be a color attachment of a framebuffer.
        const RENDER_TARGET = 1 << 2;
        /// The texture can be the depth/stencil attachment of a framebuffer.
        const DEPTH_STENCIL = 1 << 3;
        /// The texture is a cubemap.
        const CUBEMAP = 1 << 4;
        /// The texture is CPU-visible and can be mapped.
        const STAGING = 1 << 5;
        /// The texture's mip chain can be generated on the GPU.
        const GENERATE_MIPMAPS = 1 << 6;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_compose() {
        let usage = BufferUsage::VERTEX | BufferUsage::INDEX;
        assert!(usage.contains(BufferUsage::VERTEX));
        assert!(!usage.contains(BufferUsage::INDIRECT));
        assert!(ShaderStages::all().contains(ShaderStages::COMPUTE));
        assert!(TextureUsage::empty().is_empty());
    }
}
