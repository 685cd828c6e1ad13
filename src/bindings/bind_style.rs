// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Defines how vertex buffers share the native buffer table with other buffers.
//!
//! Flat-slot native APIs expose one buffer table per stage. The vertex stage's table
//! holds both vertex buffers and the buffers of every resource set, so one of the two
//! groups has to be placed after the other. [`BindingModel`] picks the order:
//!
//! - **Default**: vertex buffers occupy the low range `0..vertex_buffer_count`, and set
//!   buffers visible to the vertex stage start right after them.
//! - **Improved**: set buffers keep the same numbering in every stage, and vertex buffers
//!   are appended after all of them.
//!
//! This is a numbering policy only; the slot walk of the layouts is identical in both
//! models.
//!
//! # Example
//!
//! ```
//! use slots_and_passes::bindings::bind_style::BindingModel;
//!
//! // five set buffers in total, two vertex buffers, the bound set starting at buffer base 3
//! assert_eq!(BindingModel::Default.vertex_buffer_slot(1, 5), 1);
//! assert_eq!(BindingModel::Improved.vertex_buffer_slot(1, 5), 6);
//! assert_eq!(BindingModel::Default.vertex_stage_buffer_slot(0, 3, 2), 5);
//! assert_eq!(BindingModel::Improved.vertex_stage_buffer_slot(0, 3, 2), 3);
//! ```

/// Vertex buffer placement policy of a graphics pipeline.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum BindingModel {
    /// Vertex buffers first, then set buffers.
    #[default]
    Default,
    /// Set buffers first, then vertex buffers.
    Improved,
}

impl BindingModel {
    /// Native buffer slot of vertex buffer `index`.
    ///
    /// # Parameters
    /// * `index` - The vertex buffer index, as passed when binding it.
    /// * `non_vertex_buffer_count` - Total buffer slots consumed by every layout of the pipeline.
    pub fn vertex_buffer_slot(self, index: u32, non_vertex_buffer_count: u32) -> u32 {
        match self {
            BindingModel::Default => index,
            BindingModel::Improved => non_vertex_buffer_count + index,
        }
    }

    /// Native vertex-stage buffer slot of a resource-set buffer.
    ///
    /// # Parameters
    /// * `slot` - The element's slot within its own layout.
    /// * `base` - The buffer base of the set the element belongs to.
    /// * `vertex_buffer_count` - Number of vertex buffers the pipeline declares.
    pub fn vertex_stage_buffer_slot(self, slot: u32, base: u32, vertex_buffer_count: u32) -> u32 {
        match self {
            BindingModel::Default => slot + vertex_buffer_count + base,
            BindingModel::Improved => slot + base,
        }
    }

    /// Native buffer slot of a resource-set buffer in stages that have no vertex buffers.
    pub fn other_stage_buffer_slot(self, slot: u32, base: u32) -> u32 {
        slot + base
    }
}
