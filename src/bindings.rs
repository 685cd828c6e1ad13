// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*! Defines binding types: resources, layouts, resource sets and the caches that track them. */

pub mod visible_to;
pub mod sampler;
pub mod resources;
pub mod layout;
pub mod bind_style;
pub mod resource_set;
pub mod bound;
pub(crate) mod dirty_tracking;

pub use bind_style::BindingModel;
pub use layout::{ResourceKind, ResourceLayout, ResourceLayoutDescription, ResourceLayoutElement};
pub use resource_set::{ResourceSet, ResourceSetDescription};
pub use resources::{BindableResource, DeviceBuffer, DeviceBufferRange, Sampler, Texture, TextureView};
