// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Sampler descriptions.

/// How texture coordinates outside `[0, 1]` are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SamplerAddressMode {
    Wrap,
    Mirror,
    Clamp,
    Border,
}

/// Texel filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SamplerFilter {
    ///Nearest texel for minification, magnification and mip selection.
    Point,
    ///Linear interpolation everywhere.
    Linear,
    ///Anisotropic filtering; requires the sampler anisotropy device feature.
    Anisotropic,
}

/// Depth comparison performed by comparison samplers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonKind {
    Never,
    Less,
    Equal,
    LessEqual,
    Greater,
    NotEqual,
    GreaterEqual,
    Always,
}

/// Describes a sampler to create.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplerDescription {
    pub address_mode_u: SamplerAddressMode,
    pub address_mode_v: SamplerAddressMode,
    pub address_mode_w: SamplerAddressMode,
    pub filter: SamplerFilter,
    pub comparison: Option<ComparisonKind>,
    pub max_anisotropy: u32,
    pub min_lod: f32,
    pub max_lod: f32,
    pub lod_bias: f32,
}

impl Default for SamplerDescription {
    ///A linear, wrapping sampler over every mip level.
    fn default() -> Self {
        SamplerDescription {
            address_mode_u: SamplerAddressMode::Wrap,
            address_mode_v: SamplerAddressMode::Wrap,
            address_mode_w: SamplerAddressMode::Wrap,
            filter: SamplerFilter::Linear,
            comparison: None,
            max_anisotropy: 1,
            min_lod: 0.0,
            max_lod: f32::MAX,
            lod_bias: 0.0,
        }
    }
}

impl SamplerDescription {
    /// A point-filtered sampler clamping to the edge.
    pub fn point_clamp() -> Self {
        SamplerDescription {
            address_mode_u: SamplerAddressMode::Clamp,
            address_mode_v: SamplerAddressMode::Clamp,
            address_mode_w: SamplerAddressMode::Clamp,
            filter: SamplerFilter::Point,
            ..Default::default()
        }
    }
}
