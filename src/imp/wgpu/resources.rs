// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Native wgpu objects behind the crate's resource handles.
//!
//! Natives are created the first time a command touches a handle and live as long as the
//! executor that created them.

use crate::bindings::layout::{ResourceBindingInfo, SlotClass};
use crate::bindings::resource_set::ResourceSet;
use crate::bindings::resources::{BindableResource, DeviceBuffer, ResourceId, Sampler, Texture, TextureView};
use crate::bindings::sampler::{ComparisonKind, SamplerAddressMode, SamplerFilter};
use crate::bindings::visible_to::{BufferUsage, TextureUsage};
use crate::command::IndexFormat;
use crate::pass::FramebufferAttachment;
use crate::pixel_formats::PixelFormat;
use std::collections::HashMap;
use std::num::NonZeroU64;

impl PixelFormat {
    pub const fn wgpu_format(self) -> wgpu::TextureFormat {
        match self {
            PixelFormat::R8UNorm => wgpu::TextureFormat::R8Unorm,
            PixelFormat::R16Float => wgpu::TextureFormat::R16Float,
            PixelFormat::R32Float => wgpu::TextureFormat::R32Float,
            PixelFormat::R32SInt => wgpu::TextureFormat::R32Sint,
            PixelFormat::RG32Float => wgpu::TextureFormat::Rg32Float,
            PixelFormat::RGBA8UNorm => wgpu::TextureFormat::Rgba8Unorm,
            PixelFormat::RGBA8UNormSRGB => wgpu::TextureFormat::Rgba8UnormSrgb,
            PixelFormat::BGRA8UNorm => wgpu::TextureFormat::Bgra8Unorm,
            PixelFormat::BGRA8UNormSRGB => wgpu::TextureFormat::Bgra8UnormSrgb,
            PixelFormat::RGBA16UNorm => wgpu::TextureFormat::Rgba16Unorm,
            PixelFormat::RGBA16Float => wgpu::TextureFormat::Rgba16Float,
            PixelFormat::RGBA32Float => wgpu::TextureFormat::Rgba32Float,
            PixelFormat::D32Float => wgpu::TextureFormat::Depth32Float,
            PixelFormat::D24UNormS8UInt => wgpu::TextureFormat::Depth24PlusStencil8,
            PixelFormat::D32FloatS8UInt => wgpu::TextureFormat::Depth32FloatStencil8,
            PixelFormat::BC1RGBAUNorm => wgpu::TextureFormat::Bc1RgbaUnorm,
            PixelFormat::BC3UNorm => wgpu::TextureFormat::Bc3RgbaUnorm,
        }
    }
}

impl BufferUsage {
    /// Converts this usage to wgpu usage flags. Every buffer is a copy source and destination.
    pub fn wgpu_usage(self) -> wgpu::BufferUsages {
        let mut usage = wgpu::BufferUsages::COPY_SRC | wgpu::BufferUsages::COPY_DST;
        if self.contains(BufferUsage::VERTEX) {
            usage |= wgpu::BufferUsages::VERTEX;
        }
        if self.contains(BufferUsage::INDEX) {
            usage |= wgpu::BufferUsages::INDEX;
        }
        if self.contains(BufferUsage::UNIFORM) {
            usage |= wgpu::BufferUsages::UNIFORM;
        }
        if self.intersects(BufferUsage::STRUCTURED_READ_ONLY | BufferUsage::STRUCTURED_READ_WRITE) {
            usage |= wgpu::BufferUsages::STORAGE;
        }
        if self.contains(BufferUsage::INDIRECT) {
            usage |= wgpu::BufferUsages::INDIRECT;
        }
        usage
    }
}

impl TextureUsage {
    pub fn wgpu_usage(self) -> wgpu::TextureUsages {
        let mut usage = wgpu::TextureUsages::COPY_SRC | wgpu::TextureUsages::COPY_DST;
        if self.contains(TextureUsage::SAMPLED) {
            usage |= wgpu::TextureUsages::TEXTURE_BINDING;
        }
        if self.contains(TextureUsage::STORAGE) {
            usage |= wgpu::TextureUsages::STORAGE_BINDING;
        }
        if self.intersects(TextureUsage::RENDER_TARGET | TextureUsage::DEPTH_STENCIL) {
            usage |= wgpu::TextureUsages::RENDER_ATTACHMENT;
        }
        usage
    }
}

impl IndexFormat {
    pub const fn wgpu_format(self) -> wgpu::IndexFormat {
        match self {
            IndexFormat::UInt16 => wgpu::IndexFormat::Uint16,
            IndexFormat::UInt32 => wgpu::IndexFormat::Uint32,
        }
    }
}

const fn address_mode(mode: SamplerAddressMode) -> wgpu::AddressMode {
    match mode {
        SamplerAddressMode::Wrap => wgpu::AddressMode::Repeat,
        SamplerAddressMode::Mirror => wgpu::AddressMode::MirrorRepeat,
        SamplerAddressMode::Clamp => wgpu::AddressMode::ClampToEdge,
        SamplerAddressMode::Border => wgpu::AddressMode::ClampToBorder,
    }
}

const fn compare_function(kind: ComparisonKind) -> wgpu::CompareFunction {
    match kind {
        ComparisonKind::Never => wgpu::CompareFunction::Never,
        ComparisonKind::Less => wgpu::CompareFunction::Less,
        ComparisonKind::Equal => wgpu::CompareFunction::Equal,
        ComparisonKind::LessEqual => wgpu::CompareFunction::LessEqual,
        ComparisonKind::Greater => wgpu::CompareFunction::Greater,
        ComparisonKind::NotEqual => wgpu::CompareFunction::NotEqual,
        ComparisonKind::GreaterEqual => wgpu::CompareFunction::GreaterEqual,
        ComparisonKind::Always => wgpu::CompareFunction::Always,
    }
}

/// A bind group entry resolved to natives.
enum NativeBinding {
    Buffer {
        buffer: wgpu::Buffer,
        offset: u64,
        size: Option<NonZeroU64>,
    },
    View(wgpu::TextureView),
    Sampler(wgpu::Sampler),
}

#[derive(Debug, Default)]
pub(crate) struct NativeResources {
    buffers: HashMap<ResourceId, wgpu::Buffer>,
    textures: HashMap<ResourceId, wgpu::Texture>,
    views: HashMap<ResourceId, wgpu::TextureView>,
    attachment_views: HashMap<(ResourceId, u32, u32), wgpu::TextureView>,
    samplers: HashMap<ResourceId, wgpu::Sampler>,
}

impl NativeResources {
    pub(crate) fn buffer(&mut self, device: &wgpu::Device, buffer: &DeviceBuffer) -> wgpu::Buffer {
        self.buffers
            .entry(buffer.id())
            .or_insert_with(|| {
                logwise::trace_sync!("Creating native buffer {name}", name = buffer.name());
                device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some(buffer.name()),
                    //wgpu copies move whole 4 byte words
                    size: u64::from(buffer.size()).next_multiple_of(wgpu::COPY_BUFFER_ALIGNMENT),
                    usage: buffer.usage().wgpu_usage(),
                    mapped_at_creation: false,
                })
            })
            .clone()
    }

    pub(crate) fn texture(&mut self, device: &wgpu::Device, texture: &Texture) -> wgpu::Texture {
        self.textures
            .entry(texture.id())
            .or_insert_with(|| {
                logwise::trace_sync!("Creating native texture {name}", name = texture.name());
                let description = texture.description();
                let (dimension, depth_or_array_layers) = if description.depth > 1 {
                    (wgpu::TextureDimension::D3, description.depth)
                } else if description.usage.contains(TextureUsage::CUBEMAP) {
                    (wgpu::TextureDimension::D2, texture.array_layers() * 6)
                } else {
                    (wgpu::TextureDimension::D2, texture.array_layers())
                };
                device.create_texture(&wgpu::TextureDescriptor {
                    label: Some(texture.name()),
                    size: wgpu::Extent3d {
                        width: description.width,
                        height: description.height,
                        depth_or_array_layers,
                    },
                    mip_level_count: description.mip_levels,
                    sample_count: description.sample_count.count(),
                    dimension,
                    format: description.format.wgpu_format(),
                    usage: description.usage.wgpu_usage(),
                    view_formats: &[],
                })
            })
            .clone()
    }

    /// A view over every level and layer of `texture`.
    fn full_view(&mut self, device: &wgpu::Device, texture: &Texture) -> wgpu::TextureView {
        if let Some(view) = self.views.get(&texture.id()) {
            return view.clone();
        }
        let view = self
            .texture(device, texture)
            .create_view(&wgpu::TextureViewDescriptor::default());
        self.views.insert(texture.id(), view.clone());
        view
    }

    fn view(&mut self, device: &wgpu::Device, view: &TextureView) -> wgpu::TextureView {
        if let Some(native) = self.views.get(&view.id()) {
            return native.clone();
        }
        let description = view.description();
        let native = self
            .texture(device, view.target())
            .create_view(&wgpu::TextureViewDescriptor {
                label: Some(view.name()),
                format: Some(view.format().wgpu_format()),
                base_mip_level: description.base_mip_level,
                mip_level_count: Some(description.mip_levels),
                base_array_layer: description.base_array_layer,
                array_layer_count: Some(description.array_layers),
                ..Default::default()
            });
        self.views.insert(view.id(), native.clone());
        native
    }

    /// The single-level, single-layer view a render pass draws into.
    pub(crate) fn attachment_view(
        &mut self,
        device: &wgpu::Device,
        attachment: &FramebufferAttachment,
    ) -> wgpu::TextureView {
        let key = (attachment.target.id(), attachment.mip_level, attachment.array_layer);
        if let Some(view) = self.attachment_views.get(&key) {
            return view.clone();
        }
        let view = self
            .texture(device, &attachment.target)
            .create_view(&wgpu::TextureViewDescriptor {
                dimension: Some(wgpu::TextureViewDimension::D2),
                base_mip_level: attachment.mip_level,
                mip_level_count: Some(1),
                base_array_layer: attachment.array_layer,
                array_layer_count: Some(1),
                ..Default::default()
            });
        self.attachment_views.insert(key, view.clone());
        view
    }

    pub(crate) fn resolve_view(&mut self, device: &wgpu::Device, texture: &Texture) -> wgpu::TextureView {
        self.attachment_view(device, &FramebufferAttachment::new(texture))
    }

    fn sampler(&mut self, device: &wgpu::Device, sampler: &Sampler) -> wgpu::Sampler {
        self.samplers
            .entry(sampler.id())
            .or_insert_with(|| {
                let description = sampler.description();
                let (filter, anisotropy_clamp) = match description.filter {
                    SamplerFilter::Point => (wgpu::FilterMode::Nearest, 1),
                    SamplerFilter::Linear => (wgpu::FilterMode::Linear, 1),
                    SamplerFilter::Anisotropic => (
                        wgpu::FilterMode::Linear,
                        description.max_anisotropy.clamp(1, 16) as u16,
                    ),
                };
                device.create_sampler(&wgpu::SamplerDescriptor {
                    label: Some(sampler.name()),
                    address_mode_u: address_mode(description.address_mode_u),
                    address_mode_v: address_mode(description.address_mode_v),
                    address_mode_w: address_mode(description.address_mode_w),
                    mag_filter: filter,
                    min_filter: filter,
                    mipmap_filter: filter,
                    lod_min_clamp: description.min_lod,
                    lod_max_clamp: description.max_lod.min(32.0),
                    compare: description.comparison.map(compare_function),
                    anisotropy_clamp,
                    border_color: None,
                })
            })
            .clone()
    }

    /// Creates a bind group for `set`. Bindings are numbered by element index.
    pub(crate) fn bind_group(
        &mut self,
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        set: &ResourceSet,
    ) -> wgpu::BindGroup {
        let set_layout = set.layout();
        let mut natives = Vec::with_capacity(set.resources().len());
        for (index, resource) in set.resources().iter().enumerate() {
            let ResourceBindingInfo::Used { kind, .. } = set_layout.binding_info(index) else {
                continue;
            };
            let native = match (kind.slot_class(), resource) {
                (SlotClass::Buffer, resource) => {
                    let Some(range) = resource.buffer_range() else {
                        continue;
                    };
                    NativeBinding::Buffer {
                        buffer: self.buffer(device, &range.buffer),
                        offset: u64::from(range.offset),
                        size: NonZeroU64::new(u64::from(range.size)),
                    }
                }
                (SlotClass::Texture, BindableResource::Texture(texture)) => {
                    NativeBinding::View(self.full_view(device, texture))
                }
                (SlotClass::Texture, BindableResource::TextureView(view)) => {
                    NativeBinding::View(self.view(device, view))
                }
                (SlotClass::Sampler, BindableResource::Sampler(sampler)) => {
                    NativeBinding::Sampler(self.sampler(device, sampler))
                }
                _ => continue,
            };
            natives.push((index as u32, native));
        }
        let entries: Vec<wgpu::BindGroupEntry<'_>> = natives
            .iter()
            .map(|(binding, native)| wgpu::BindGroupEntry {
                binding: *binding,
                resource: match native {
                    NativeBinding::Buffer {
                        buffer,
                        offset,
                        size,
                    } => wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                        buffer,
                        offset: *offset,
                        size: *size,
                    }),
                    NativeBinding::View(view) => wgpu::BindingResource::TextureView(view),
                    NativeBinding::Sampler(sampler) => wgpu::BindingResource::Sampler(sampler),
                },
            })
            .collect();
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(set.name()),
            layout,
            entries: &entries,
        })
    }
}
