// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Resource handles.
//!
//! Buffers, textures, texture views and samplers are cheap, clonable handles around
//! shared immutable state. Two handles are equal when they refer to the same
//! underlying resource; the recording layer relies on this identity to decide whether
//! a rebind can be skipped.

use crate::bindings::sampler::SamplerDescription;
use crate::bindings::visible_to::{BufferUsage, TextureUsage};
use crate::pixel_formats::PixelFormat;
use std::any::Any;
use std::fmt::{Debug, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

static NEXT_RESOURCE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a resource.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(u64);

impl ResourceId {
    pub(crate) fn next() -> Self {
        ResourceId(NEXT_RESOURCE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl Display for ResourceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Storage for the native object a backend associates with a pipeline.
#[derive(Default)]
pub(crate) struct NativeSlot(OnceLock<Box<dyn Any + Send + Sync>>);

impl NativeSlot {
    pub(crate) fn attach<T: Any + Send + Sync>(&self, native: T) -> bool {
        self.0.set(Box::new(native)).is_ok()
    }
    pub(crate) fn get<T: Any>(&self) -> Option<&T> {
        self.0.get().and_then(|b| b.downcast_ref::<T>())
    }
}

impl Debug for NativeSlot {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.0.get().is_some() {
            f.write_str("NativeSlot(attached)")
        } else {
            f.write_str("NativeSlot(empty)")
        }
    }
}

macro_rules! handle_identity {
    ($t:ident) => {
        impl PartialEq for $t {
            fn eq(&self, other: &Self) -> bool {
                Arc::ptr_eq(&self.0, &other.0)
            }
        }
        impl Eq for $t {}
        impl Hash for $t {
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.0.id.hash(state);
            }
        }
        impl $t {
            /// The resource's identity.
            pub fn id(&self) -> ResourceId {
                self.0.id
            }
            /// The debug name given at creation.
            pub fn name(&self) -> &str {
                &self.0.name
            }
        }
    };
}

/// Describes a buffer to create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferDescription {
    /// Size in bytes.
    pub size: u32,
    pub usage: BufferUsage,
    /// Element stride for structured buffers, 0 otherwise.
    pub structure_byte_stride: u32,
}

impl BufferDescription {
    pub fn new(size: u32, usage: BufferUsage) -> Self {
        BufferDescription {
            size,
            usage,
            structure_byte_stride: 0,
        }
    }
}

#[derive(Debug)]
struct BufferShared {
    id: ResourceId,
    name: String,
    description: BufferDescription,
}

/// A device-resident buffer.
#[derive(Debug, Clone)]
pub struct DeviceBuffer(Arc<BufferShared>);
handle_identity!(DeviceBuffer);

impl DeviceBuffer {
    pub(crate) fn new(description: BufferDescription, name: &str) -> Self {
        DeviceBuffer(Arc::new(BufferShared {
            id: ResourceId::next(),
            name: name.to_string(),
            description,
        }))
    }
    /// Capacity in bytes.
    pub fn size(&self) -> u32 {
        self.0.description.size
    }
    pub fn usage(&self) -> BufferUsage {
        self.0.description.usage
    }
    pub fn description(&self) -> &BufferDescription {
        &self.0.description
    }
}

/// A byte range of a buffer, bindable in place of the whole buffer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceBufferRange {
    pub buffer: DeviceBuffer,
    pub offset: u32,
    pub size: u32,
}

impl DeviceBufferRange {
    pub fn new(buffer: DeviceBuffer, offset: u32, size: u32) -> Self {
        DeviceBufferRange {
            buffer,
            offset,
            size,
        }
    }
}

/// Multisample count of a texture.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SampleCount {
    One,
    Two,
    Four,
    Eight,
    Sixteen,
}

impl SampleCount {
    pub fn count(self) -> u32 {
        match self {
            SampleCount::One => 1,
            SampleCount::Two => 2,
            SampleCount::Four => 4,
            SampleCount::Eight => 8,
            SampleCount::Sixteen => 16,
        }
    }
}

/// Describes a texture to create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureDescription {
    pub width: u32,
    pub height: u32,
    /// Depth of a 3D texture, 1 otherwise.
    pub depth: u32,
    pub mip_levels: u32,
    pub array_layers: u32,
    pub format: PixelFormat,
    pub usage: TextureUsage,
    pub sample_count: SampleCount,
}

impl TextureDescription {
    /// A single-sampled 2D texture with one mip level and one layer.
    pub fn texture_2d(width: u32, height: u32, format: PixelFormat, usage: TextureUsage) -> Self {
        TextureDescription {
            width,
            height,
            depth: 1,
            mip_levels: 1,
            array_layers: 1,
            format,
            usage,
            sample_count: SampleCount::One,
        }
    }
}

#[derive(Debug)]
struct TextureShared {
    id: ResourceId,
    name: String,
    description: TextureDescription,
}

/// A device-resident texture.
#[derive(Debug, Clone)]
pub struct Texture(Arc<TextureShared>);
handle_identity!(Texture);

impl Texture {
    pub(crate) fn new(description: TextureDescription, name: &str) -> Self {
        Texture(Arc::new(TextureShared {
            id: ResourceId::next(),
            name: name.to_string(),
            description,
        }))
    }
    pub fn description(&self) -> &TextureDescription {
        &self.0.description
    }
    pub fn format(&self) -> PixelFormat {
        self.0.description.format
    }
    pub fn usage(&self) -> TextureUsage {
        self.0.description.usage
    }
    pub fn mip_levels(&self) -> u32 {
        self.0.description.mip_levels
    }
    pub fn array_layers(&self) -> u32 {
        self.0.description.array_layers
    }
    pub fn sample_count(&self) -> SampleCount {
        self.0.description.sample_count
    }
    /// Dimensions `(width, height, depth)` of the given mip level.
    ///
    /// Each level halves the previous one, never going below 1.
    pub fn mip_dimensions(&self, mip_level: u32) -> (u32, u32, u32) {
        let d = &self.0.description;
        let shrink = |v: u32| v.checked_shr(mip_level).unwrap_or(0).max(1);
        (shrink(d.width), shrink(d.height), shrink(d.depth))
    }
}

/// Describes a view of a texture.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextureViewDescription {
    pub target: Texture,
    pub base_mip_level: u32,
    pub mip_levels: u32,
    pub base_array_layer: u32,
    pub array_layers: u32,
    /// Reinterprets the target with another format; `None` keeps the target's format.
    pub format: Option<PixelFormat>,
}

impl TextureViewDescription {
    /// A view of every mip level and layer of `target`.
    pub fn full(target: &Texture) -> Self {
        TextureViewDescription {
            target: target.clone(),
            base_mip_level: 0,
            mip_levels: target.mip_levels(),
            base_array_layer: 0,
            array_layers: target.array_layers(),
            format: None,
        }
    }
}

#[derive(Debug)]
struct TextureViewShared {
    id: ResourceId,
    name: String,
    description: TextureViewDescription,
}

/// A shader-visible view of a texture.
#[derive(Debug, Clone)]
pub struct TextureView(Arc<TextureViewShared>);
handle_identity!(TextureView);

impl TextureView {
    pub(crate) fn new(description: TextureViewDescription, name: &str) -> Self {
        TextureView(Arc::new(TextureViewShared {
            id: ResourceId::next(),
            name: name.to_string(),
            description,
        }))
    }
    pub fn target(&self) -> &Texture {
        &self.0.description.target
    }
    pub fn description(&self) -> &TextureViewDescription {
        &self.0.description
    }
    pub fn format(&self) -> PixelFormat {
        self.0
            .description
            .format
            .unwrap_or_else(|| self.0.description.target.format())
    }
}

#[derive(Debug)]
struct SamplerShared {
    id: ResourceId,
    name: String,
    description: SamplerDescription,
}

/// Sampler state.
#[derive(Debug, Clone)]
pub struct Sampler(Arc<SamplerShared>);
handle_identity!(Sampler);

impl Sampler {
    pub(crate) fn new(description: SamplerDescription, name: &str) -> Self {
        Sampler(Arc::new(SamplerShared {
            id: ResourceId::next(),
            name: name.to_string(),
            description,
        }))
    }
    pub fn description(&self) -> &SamplerDescription {
        &self.0.description
    }
}

/// Anything that can be an element of a resource set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BindableResource {
    Buffer(DeviceBuffer),
    BufferRange(DeviceBufferRange),
    /// A texture bound through an implicit view of all of its levels and layers.
    Texture(Texture),
    TextureView(TextureView),
    Sampler(Sampler),
}

impl BindableResource {
    /// The buffer range this resource addresses, if it is a buffer.
    ///
    /// A whole buffer is the range starting at 0 spanning its size.
    pub fn buffer_range(&self) -> Option<DeviceBufferRange> {
        match self {
            BindableResource::Buffer(b) => Some(DeviceBufferRange::new(b.clone(), 0, b.size())),
            BindableResource::BufferRange(r) => Some(r.clone()),
            _ => None,
        }
    }
    /// Identity of the underlying resource.
    pub fn id(&self) -> ResourceId {
        match self {
            BindableResource::Buffer(b) => b.id(),
            BindableResource::BufferRange(r) => r.buffer.id(),
            BindableResource::Texture(t) => t.id(),
            BindableResource::TextureView(v) => v.id(),
            BindableResource::Sampler(s) => s.id(),
        }
    }
}

impl From<DeviceBuffer> for BindableResource {
    fn from(value: DeviceBuffer) -> Self {
        BindableResource::Buffer(value)
    }
}
impl From<DeviceBufferRange> for BindableResource {
    fn from(value: DeviceBufferRange) -> Self {
        BindableResource::BufferRange(value)
    }
}
impl From<Texture> for BindableResource {
    fn from(value: Texture) -> Self {
        BindableResource::Texture(value)
    }
}
impl From<TextureView> for BindableResource {
    fn from(value: TextureView) -> Self {
        BindableResource::TextureView(value)
    }
}
impl From<Sampler> for BindableResource {
    fn from(value: Sampler) -> Self {
        BindableResource::Sampler(value)
    }
}
