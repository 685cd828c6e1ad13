// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Resource layouts and flat slot allocation.
//!
//! A [`ResourceLayout`] is the immutable schema a resource set is created against: an
//! ordered list of elements, each with a kind, a shader-stage visibility and a
//! dynamic-binding flag.
//!
//! Flat-slot native APIs (one buffer table, one texture table and one sampler table per
//! stage) need every element mapped onto a per-kind slot number. The layout computes that
//! mapping once, at creation, by walking its elements with three independent counters.
//! When a pipeline combines several layouts, each layout's slots are offset by the
//! per-kind counts of the layouts preceding it; see [`SlotBases`].
//!
//! # Example
//!
//! ```
//! use slots_and_passes::bindings::layout::{ResourceKind, ResourceLayoutDescription, ResourceLayoutElement, SlotClass};
//! use slots_and_passes::bindings::visible_to::ShaderStages;
//!
//! let description = ResourceLayoutDescription::new(vec![
//!     ResourceLayoutElement::new("camera", ResourceKind::UniformBuffer, ShaderStages::VERTEX),
//!     ResourceLayoutElement::new("albedo", ResourceKind::TextureReadOnly, ShaderStages::FRAGMENT),
//!     ResourceLayoutElement::new("albedo_sampler", ResourceKind::Sampler, ShaderStages::FRAGMENT),
//!     ResourceLayoutElement::new("lights", ResourceKind::StructuredBufferReadOnly, ShaderStages::FRAGMENT),
//! ]);
//! let layout = slots_and_passes::bindings::layout::ResourceLayout::new(description);
//! assert_eq!(layout.count(SlotClass::Buffer), 2);
//! assert_eq!(layout.binding_info(3).slot(), Some(1));
//! ```

use crate::bindings::visible_to::ShaderStages;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// The kind of resource a layout element expects.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    UniformBuffer,
    StructuredBufferReadOnly,
    StructuredBufferReadWrite,
    TextureReadOnly,
    TextureReadWrite,
    Sampler,
}

impl ResourceKind {
    /// The native slot table this kind is numbered in.
    pub fn slot_class(self) -> SlotClass {
        match self {
            ResourceKind::UniformBuffer
            | ResourceKind::StructuredBufferReadOnly
            | ResourceKind::StructuredBufferReadWrite => SlotClass::Buffer,
            ResourceKind::TextureReadOnly | ResourceKind::TextureReadWrite => SlotClass::Texture,
            ResourceKind::Sampler => SlotClass::Sampler,
        }
    }
    pub fn is_buffer(self) -> bool {
        self.slot_class() == SlotClass::Buffer
    }
}

impl Display for ResourceKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ResourceKind::UniformBuffer => "uniform buffer",
            ResourceKind::StructuredBufferReadOnly => "read-only structured buffer",
            ResourceKind::StructuredBufferReadWrite => "read-write structured buffer",
            ResourceKind::TextureReadOnly => "read-only texture",
            ResourceKind::TextureReadWrite => "read-write texture",
            ResourceKind::Sampler => "sampler",
        };
        f.write_str(s)
    }
}

/// One of the three independently numbered native slot tables.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum SlotClass {
    Buffer,
    Texture,
    Sampler,
}

impl SlotClass {
    fn index(self) -> usize {
        match self {
            SlotClass::Buffer => 0,
            SlotClass::Texture => 1,
            SlotClass::Sampler => 2,
        }
    }
}

bitflags::bitflags! {
    /// Per-element options.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
    pub struct ElementOptions: u8 {
        /// The buffer element takes a dynamic offset at bind time.
        const DYNAMIC_BINDING = 1 << 0;
    }
}

/// One element of a layout.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceLayoutElement {
    pub name: String,
    pub kind: ResourceKind,
    /// Stages the element is visible to.  An element visible to no stage is padding.
    pub stages: ShaderStages,
    pub options: ElementOptions,
}

impl ResourceLayoutElement {
    pub fn new(name: &str, kind: ResourceKind, stages: ShaderStages) -> Self {
        ResourceLayoutElement {
            name: name.to_string(),
            kind,
            stages,
            options: ElementOptions::empty(),
        }
    }
    /// A buffer element that takes a dynamic offset at bind time.
    pub fn dynamic(name: &str, kind: ResourceKind, stages: ShaderStages) -> Self {
        ResourceLayoutElement {
            options: ElementOptions::DYNAMIC_BINDING,
            ..Self::new(name, kind, stages)
        }
    }
    /// A padding element occupying a position without consuming a slot.
    pub fn unused(name: &str, kind: ResourceKind) -> Self {
        Self::new(name, kind, ShaderStages::empty())
    }
    pub fn is_unused(&self) -> bool {
        self.stages.is_empty()
    }
    /// Whether the element takes a dynamic offset. Padding never does.
    pub fn is_dynamic(&self) -> bool {
        !self.is_unused() && self.options.contains(ElementOptions::DYNAMIC_BINDING)
    }
}

/// Describes a layout to create.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceLayoutDescription {
    pub elements: Vec<ResourceLayoutElement>,
}

impl ResourceLayoutDescription {
    pub fn new(elements: Vec<ResourceLayoutElement>) -> Self {
        ResourceLayoutDescription { elements }
    }
}

/// Where an element lands in its slot table.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ResourceBindingInfo {
    Unused,
    Used {
        slot: u32,
        stages: ShaderStages,
        kind: ResourceKind,
        dynamic: bool,
    },
}

impl ResourceBindingInfo {
    /// The element's slot within its own layout, `None` for padding.
    pub fn slot(&self) -> Option<u32> {
        match self {
            ResourceBindingInfo::Unused => None,
            ResourceBindingInfo::Used { slot, .. } => Some(*slot),
        }
    }
}

#[derive(Debug)]
struct LayoutShared {
    description: ResourceLayoutDescription,
    binding_infos: Box<[ResourceBindingInfo]>,
    counts: [u32; 3],
    dynamic_count: u32,
}

/// An immutable resource layout with its computed slot assignment.
///
/// Cloning is cheap; clones compare equal.
#[derive(Debug, Clone)]
pub struct ResourceLayout(Arc<LayoutShared>);

impl PartialEq for ResourceLayout {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}
impl Eq for ResourceLayout {}

impl ResourceLayout {
    /// Creates a layout, assigning every used element the next slot of its kind.
    pub fn new(description: ResourceLayoutDescription) -> Self {
        let mut counts = [0u32; 3];
        let mut dynamic_count = 0;
        let binding_infos = description
            .elements
            .iter()
            .map(|element| {
                if element.is_unused() {
                    return ResourceBindingInfo::Unused;
                }
                let counter = &mut counts[element.kind.slot_class().index()];
                let slot = *counter;
                *counter += 1;
                if element.is_dynamic() {
                    dynamic_count += 1;
                }
                ResourceBindingInfo::Used {
                    slot,
                    stages: element.stages,
                    kind: element.kind,
                    dynamic: element.is_dynamic(),
                }
            })
            .collect();
        ResourceLayout(Arc::new(LayoutShared {
            description,
            binding_infos,
            counts,
            dynamic_count,
        }))
    }

    pub fn elements(&self) -> &[ResourceLayoutElement] {
        &self.0.description.elements
    }

    /// Binding info for the element at `index`; out-of-range indices read as unused.
    pub fn binding_info(&self, index: usize) -> ResourceBindingInfo {
        self.0
            .binding_infos
            .get(index)
            .copied()
            .unwrap_or(ResourceBindingInfo::Unused)
    }

    /// Number of slots this layout consumes in the given table.
    pub fn count(&self, class: SlotClass) -> u32 {
        self.0.counts[class.index()]
    }

    /// Number of elements taking a dynamic offset.
    pub fn dynamic_count(&self) -> u32 {
        self.0.dynamic_count
    }

    /// Whether two layouts declare the same element kinds, in the same order.
    pub fn is_compatible_with(&self, other: &ResourceLayout) -> bool {
        self == other
            || (self.elements().len() == other.elements().len()
                && self
                    .elements()
                    .iter()
                    .zip(other.elements())
                    .all(|(a, b)| a.kind == b.kind))
    }
}

/// Cross-set slot bases for an ordered list of layouts.
///
/// `base(set, class)` is the sum of `class` counts over every layout before `set`.
/// Computed per pipeline, since pipelines can combine different layouts.
#[derive(Debug)]
pub struct SlotBases<'a> {
    layouts: &'a [ResourceLayout],
}

impl<'a> SlotBases<'a> {
    pub fn new(layouts: &'a [ResourceLayout]) -> Self {
        SlotBases { layouts }
    }

    pub fn base(&self, set: usize, class: SlotClass) -> u32 {
        self.layouts
            .iter()
            .take(set)
            .map(|layout| layout.count(class))
            .sum()
    }

    /// Total slots consumed in `class` by every layout.
    pub fn total(&self, class: SlotClass) -> u32 {
        self.base(self.layouts.len(), class)
    }
}
