// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Pixel format vocabulary for textures and attachments.
//!
//! Attachments and textures are described with a [`PixelFormat`]. The recording layer
//! only needs a handful of properties from a format: whether it is a depth/stencil
//! format, whether it is block-compressed, and how many bytes a texel (or block) takes.
//! Complete per-backend format tables are provided by the backends themselves.
//!
//! # Examples
//!
//! ```
//! use slots_and_passes::pixel_formats::PixelFormat;
//!
//! assert!(PixelFormat::D24UNormS8UInt.is_depth_stencil());
//! assert_eq!(PixelFormat::RGBA8UNorm.block_size(), 1);
//! assert_eq!(PixelFormat::BC1RGBAUNorm.block_size(), 4);
//! ```

/// A texel format.
///
/// Unlike the strongly-typed CPU pixel types an application may use, this is a plain
/// value: pipelines and framebuffers compare formats at runtime to decide whether they
/// are compatible.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum PixelFormat {
    R8UNorm,
    R16Float,
    R32Float,
    R32SInt,
    RG32Float,
    RGBA8UNorm,
    RGBA8UNormSRGB,
    BGRA8UNorm,
    BGRA8UNormSRGB,
    RGBA16UNorm,
    RGBA16Float,
    RGBA32Float,
    /// 32-bit float depth.
    D32Float,
    /// 24-bit normalized depth with 8-bit stencil.
    D24UNormS8UInt,
    /// 32-bit float depth with 8-bit stencil.
    D32FloatS8UInt,
    /// BC1 block compression, 4x4 texels per 8 byte block.
    BC1RGBAUNorm,
    /// BC3 block compression, 4x4 texels per 16 byte block.
    BC3UNorm,
}

impl PixelFormat {
    /// Whether the format carries depth (and possibly stencil) data.
    pub const fn is_depth_stencil(self) -> bool {
        matches!(
            self,
            PixelFormat::D32Float | PixelFormat::D24UNormS8UInt | PixelFormat::D32FloatS8UInt
        )
    }

    /// Whether the format has a stencil component.
    pub const fn has_stencil(self) -> bool {
        matches!(self, PixelFormat::D24UNormS8UInt | PixelFormat::D32FloatS8UInt)
    }

    /// Whether the format is block-compressed.
    pub const fn is_compressed(self) -> bool {
        matches!(self, PixelFormat::BC1RGBAUNorm | PixelFormat::BC3UNorm)
    }

    /// Edge length, in texels, of one addressable block.
    ///
    /// Uncompressed formats have a block size of 1.
    pub const fn block_size(self) -> u32 {
        if self.is_compressed() { 4 } else { 1 }
    }

    /// Size in bytes of one block (one texel for uncompressed formats).
    pub const fn bytes_per_block(self) -> u32 {
        match self {
            PixelFormat::R8UNorm => 1,
            PixelFormat::R16Float => 2,
            PixelFormat::R32Float | PixelFormat::R32SInt => 4,
            PixelFormat::RG32Float => 8,
            PixelFormat::RGBA8UNorm
            | PixelFormat::RGBA8UNormSRGB
            | PixelFormat::BGRA8UNorm
            | PixelFormat::BGRA8UNormSRGB => 4,
            PixelFormat::RGBA16UNorm | PixelFormat::RGBA16Float => 8,
            PixelFormat::RGBA32Float => 16,
            PixelFormat::D32Float | PixelFormat::D24UNormS8UInt => 4,
            PixelFormat::D32FloatS8UInt => 8,
            PixelFormat::BC1RGBAUNorm => 8,
            PixelFormat::BC3UNorm => 16,
        }
    }
}
