// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Resource sets: concrete resources conforming to a layout.

use crate::bindings::layout::{ResourceKind, ResourceLayout};
use crate::bindings::resources::{BindableResource, ResourceId};
use crate::bindings::visible_to::{BufferUsage, TextureUsage};
use crate::command::UsageError;
use crate::device::{DeviceFeatures, DeviceLimits};
use std::sync::Arc;

/// Describes a resource set to create.
#[derive(Debug, Clone)]
pub struct ResourceSetDescription {
    pub layout: ResourceLayout,
    /// One resource per layout element, in layout order.
    pub resources: Vec<BindableResource>,
}

impl ResourceSetDescription {
    pub fn new(layout: &ResourceLayout, resources: Vec<BindableResource>) -> Self {
        ResourceSetDescription {
            layout: layout.clone(),
            resources,
        }
    }
}

#[derive(Debug)]
struct ResourceSetShared {
    id: ResourceId,
    name: String,
    layout: ResourceLayout,
    resources: Box<[BindableResource]>,
}

/// An immutable list of resources bound together.
///
/// Equality is identity: two sets with the same contents created separately are
/// different sets.
#[derive(Debug, Clone)]
pub struct ResourceSet(Arc<ResourceSetShared>);

impl PartialEq for ResourceSet {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}
impl Eq for ResourceSet {}

impl ResourceSet {
    pub(crate) fn new(description: ResourceSetDescription, name: &str) -> Self {
        ResourceSet(Arc::new(ResourceSetShared {
            id: ResourceId::next(),
            name: name.to_string(),
            layout: description.layout,
            resources: description.resources.into_boxed_slice(),
        }))
    }
    pub fn id(&self) -> ResourceId {
        self.0.id
    }
    pub fn name(&self) -> &str {
        &self.0.name
    }
    pub fn layout(&self) -> &ResourceLayout {
        &self.0.layout
    }
    pub fn resources(&self) -> &[BindableResource] {
        &self.0.resources
    }
}

/// Checks that a resource set description conforms to its layout.
///
/// Arity must match, and each resource must be of the element's kind and carry the
/// usage that kind requires.
pub(crate) fn validate_resource_set(
    description: &ResourceSetDescription,
    features: &DeviceFeatures,
    limits: &DeviceLimits,
) -> Result<(), UsageError> {
    let elements = description.layout.elements();
    if elements.len() != description.resources.len() {
        return Err(UsageError::ResourceSetArity {
            expected: elements.len(),
            actual: description.resources.len(),
        });
    }
    for (index, (element, resource)) in elements.iter().zip(&description.resources).enumerate() {
        let mismatch = || UsageError::ResourceKindMismatch {
            index,
            expected: element.kind,
            actual: describe(resource),
        };
        match element.kind {
            ResourceKind::UniformBuffer
            | ResourceKind::StructuredBufferReadOnly
            | ResourceKind::StructuredBufferReadWrite => {
                let range = resource.buffer_range().ok_or_else(mismatch)?;
                let required = match element.kind {
                    ResourceKind::UniformBuffer => BufferUsage::UNIFORM,
                    ResourceKind::StructuredBufferReadOnly => {
                        BufferUsage::STRUCTURED_READ_ONLY | BufferUsage::STRUCTURED_READ_WRITE
                    }
                    _ => BufferUsage::STRUCTURED_READ_WRITE,
                };
                if !range.buffer.usage().intersects(required) {
                    return Err(mismatch());
                }
                if let BindableResource::BufferRange(r) = resource {
                    if !features.buffer_range_binding {
                        return Err(UsageError::UnsupportedFeature("buffer range binding"));
                    }
                    let alignment = limits.alignment_for(element.kind);
                    if r.offset % alignment != 0 {
                        return Err(UsageError::MisalignedBufferRange {
                            index,
                            offset: r.offset,
                            alignment,
                        });
                    }
                    if r.offset as u64 + r.size as u64 > r.buffer.size() as u64 {
                        return Err(UsageError::BufferRangeOutOfBounds {
                            buffer: r.buffer.id(),
                            offset: r.offset,
                            size: r.size,
                            capacity: r.buffer.size(),
                        });
                    }
                }
            }
            ResourceKind::TextureReadOnly | ResourceKind::TextureReadWrite => {
                let usage = match resource {
                    BindableResource::Texture(t) => t.usage(),
                    BindableResource::TextureView(v) => v.target().usage(),
                    _ => return Err(mismatch()),
                };
                let required = if element.kind == ResourceKind::TextureReadOnly {
                    TextureUsage::SAMPLED
                } else {
                    TextureUsage::STORAGE
                };
                if !usage.contains(required) {
                    return Err(mismatch());
                }
            }
            ResourceKind::Sampler => {
                if !matches!(resource, BindableResource::Sampler(_)) {
                    return Err(mismatch());
                }
            }
        }
    }
    Ok(())
}

fn describe(resource: &BindableResource) -> String {
    match resource {
        BindableResource::Buffer(b) => format!("buffer {} ({:?})", b.id(), b.usage()),
        BindableResource::BufferRange(r) => {
            format!("buffer range of {} ({:?})", r.buffer.id(), r.buffer.usage())
        }
        BindableResource::Texture(t) => format!("texture {} ({:?})", t.id(), t.usage()),
        BindableResource::TextureView(v) => {
            format!("texture view {} ({:?})", v.id(), v.target().usage())
        }
        BindableResource::Sampler(s) => format!("sampler {}", s.id()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings::layout::{ResourceLayoutDescription, ResourceLayoutElement};
    use crate::bindings::resources::{BufferDescription, DeviceBuffer, DeviceBufferRange};
    use crate::bindings::sampler::SamplerDescription;
    use crate::bindings::visible_to::ShaderStages;
    use crate::bindings::resources::Sampler;

    fn layout() -> ResourceLayout {
        ResourceLayout::new(ResourceLayoutDescription::new(vec![
            ResourceLayoutElement::new("u", ResourceKind::UniformBuffer, ShaderStages::VERTEX),
            ResourceLayoutElement::new("s", ResourceKind::Sampler, ShaderStages::FRAGMENT),
        ]))
    }

    #[test]
    fn test_conforming_set() {
        let buffer = DeviceBuffer::new(BufferDescription::new(256, BufferUsage::UNIFORM), "u");
        let sampler = Sampler::new(SamplerDescription::default(), "s");
        let d = ResourceSetDescription::new(&layout(), vec![buffer.into(), sampler.into()]);
        assert!(validate_resource_set(&d, &DeviceFeatures::all(), &DeviceLimits::default()).is_ok());
    }

    #[test]
    fn test_arity_and_kind() {
        let buffer = DeviceBuffer::new(BufferDescription::new(256, BufferUsage::UNIFORM), "u");
        let d = ResourceSetDescription::new(&layout(), vec![buffer.clone().into()]);
        assert!(matches!(
            validate_resource_set(&d, &DeviceFeatures::all(), &DeviceLimits::default()),
            Err(UsageError::ResourceSetArity { expected: 2, actual: 1 })
        ));
        let d = ResourceSetDescription::new(&layout(), vec![buffer.clone().into(), buffer.into()]);
        assert!(matches!(
            validate_resource_set(&d, &DeviceFeatures::all(), &DeviceLimits::default()),
            Err(UsageError::ResourceKindMismatch { index: 1, .. })
        ));
    }

    #[test]
    fn test_misaligned_range() {
        let buffer = DeviceBuffer::new(BufferDescription::new(1024, BufferUsage::UNIFORM), "u");
        let sampler = Sampler::new(SamplerDescription::default(), "s");
        let range = DeviceBufferRange::new(buffer, 100, 64);
        let d = ResourceSetDescription::new(&layout(), vec![range.into(), sampler.into()]);
        assert!(matches!(
            validate_resource_set(&d, &DeviceFeatures::all(), &DeviceLimits::default()),
            Err(UsageError::MisalignedBufferRange { offset: 100, alignment: 256, .. })
        ));
    }
}
