// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Graphics and compute pipelines.
//!
//! Shaders are compiled by the backend, outside this crate; a [`Pipeline`] carries the
//! state the recording layer and the executors consult: resource layouts, vertex buffer
//! count, rasterizer and depth-stencil state, blend color and the output description.

use crate::bindings::bind_style::BindingModel;
use crate::bindings::layout::{ResourceLayout, SlotClass, SlotBases};
use crate::bindings::resources::{NativeSlot, ResourceId};
use crate::bindings::sampler::ComparisonKind;
use crate::pass::{OutputDescription, RgbaFloat};
use std::any::Any;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FaceCullMode {
    #[default]
    Back,
    Front,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PolygonFillMode {
    #[default]
    Solid,
    Wireframe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FrontFace {
    #[default]
    Clockwise,
    CounterClockwise,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PrimitiveTopology {
    #[default]
    TriangleList,
    TriangleStrip,
    LineList,
    LineStrip,
    PointList,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RasterizerState {
    pub cull_mode: FaceCullMode,
    pub fill_mode: PolygonFillMode,
    pub front_face: FrontFace,
    pub depth_clip_enabled: bool,
    pub scissor_test_enabled: bool,
}

impl Default for RasterizerState {
    fn default() -> Self {
        RasterizerState {
            cull_mode: FaceCullMode::Back,
            fill_mode: PolygonFillMode::Solid,
            front_face: FrontFace::Clockwise,
            depth_clip_enabled: true,
            scissor_test_enabled: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DepthStencilState {
    pub depth_test_enabled: bool,
    pub depth_write_enabled: bool,
    pub depth_comparison: ComparisonKind,
    pub stencil_test_enabled: bool,
    pub stencil_reference: u32,
}

impl Default for DepthStencilState {
    fn default() -> Self {
        DepthStencilState {
            depth_test_enabled: true,
            depth_write_enabled: true,
            depth_comparison: ComparisonKind::LessEqual,
            stencil_test_enabled: false,
            stencil_reference: 0,
        }
    }
}

/// How one vertex buffer is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexLayoutDescription {
    /// Bytes between consecutive vertices.
    pub stride: u32,
    /// 0 for per-vertex data, otherwise the number of instances sharing one element.
    pub instance_step_rate: u32,
}

#[derive(Debug, Clone)]
pub struct GraphicsPipelineDescription {
    pub blend_color: RgbaFloat,
    pub depth_stencil: DepthStencilState,
    pub rasterizer: RasterizerState,
    pub topology: PrimitiveTopology,
    /// One entry per vertex buffer.
    pub vertex_layouts: Vec<VertexLayoutDescription>,
    pub resource_layouts: Vec<ResourceLayout>,
    pub outputs: OutputDescription,
    pub binding_model: BindingModel,
}

impl GraphicsPipelineDescription {
    /// Default fixed-function state rendering into `outputs`.
    pub fn new(
        resource_layouts: Vec<ResourceLayout>,
        vertex_layouts: Vec<VertexLayoutDescription>,
        outputs: OutputDescription,
    ) -> Self {
        GraphicsPipelineDescription {
            blend_color: RgbaFloat::CLEAR,
            depth_stencil: DepthStencilState::default(),
            rasterizer: RasterizerState::default(),
            topology: PrimitiveTopology::TriangleList,
            vertex_layouts,
            resource_layouts,
            outputs,
            binding_model: BindingModel::Default,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ComputePipelineDescription {
    pub resource_layouts: Vec<ResourceLayout>,
    pub thread_group_size: (u32, u32, u32),
}

#[derive(Debug)]
enum PipelineKind {
    Graphics(GraphicsPipelineDescription),
    Compute(ComputePipelineDescription),
}

#[derive(Debug)]
struct PipelineShared {
    id: ResourceId,
    name: String,
    kind: PipelineKind,
    native: NativeSlot,
}

/// A graphics or compute pipeline.
#[derive(Debug, Clone)]
pub struct Pipeline(Arc<PipelineShared>);

impl PartialEq for Pipeline {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}
impl Eq for Pipeline {}

impl Pipeline {
    pub(crate) fn graphics(description: GraphicsPipelineDescription, name: &str) -> Self {
        Self::with_kind(PipelineKind::Graphics(description), name)
    }
    pub(crate) fn compute(description: ComputePipelineDescription, name: &str) -> Self {
        Self::with_kind(PipelineKind::Compute(description), name)
    }
    fn with_kind(kind: PipelineKind, name: &str) -> Self {
        Pipeline(Arc::new(PipelineShared {
            id: ResourceId::next(),
            name: name.to_string(),
            kind,
            native: NativeSlot::default(),
        }))
    }
    pub fn id(&self) -> ResourceId {
        self.0.id
    }
    pub fn name(&self) -> &str {
        &self.0.name
    }
    pub fn is_compute(&self) -> bool {
        matches!(self.0.kind, PipelineKind::Compute(_))
    }
    /// The graphics description, `None` for compute pipelines.
    pub fn graphics_description(&self) -> Option<&GraphicsPipelineDescription> {
        match &self.0.kind {
            PipelineKind::Graphics(g) => Some(g),
            PipelineKind::Compute(_) => None,
        }
    }
    pub fn compute_description(&self) -> Option<&ComputePipelineDescription> {
        match &self.0.kind {
            PipelineKind::Graphics(_) => None,
            PipelineKind::Compute(c) => Some(c),
        }
    }
    pub fn resource_layouts(&self) -> &[ResourceLayout] {
        match &self.0.kind {
            PipelineKind::Graphics(g) => &g.resource_layouts,
            PipelineKind::Compute(c) => &c.resource_layouts,
        }
    }
    /// Slot bases of this pipeline's layouts.
    pub fn slot_bases(&self) -> SlotBases<'_> {
        SlotBases::new(self.resource_layouts())
    }
    /// Number of vertex buffers, 0 for compute pipelines.
    pub fn vertex_buffer_count(&self) -> u32 {
        self.graphics_description()
            .map(|g| g.vertex_layouts.len() as u32)
            .unwrap_or(0)
    }
    /// Buffer slots consumed by every resource layout.
    pub fn non_vertex_buffer_count(&self) -> u32 {
        self.slot_bases().total(SlotClass::Buffer)
    }
    pub fn binding_model(&self) -> BindingModel {
        self.graphics_description()
            .map(|g| g.binding_model)
            .unwrap_or_default()
    }
    pub fn scissor_test_enabled(&self) -> bool {
        self.graphics_description()
            .map(|g| g.rasterizer.scissor_test_enabled)
            .unwrap_or(false)
    }
    pub fn outputs(&self) -> Option<&OutputDescription> {
        self.graphics_description().map(|g| &g.outputs)
    }
    #[allow(dead_code)] //only the wgpu backend attaches natives
    pub(crate) fn attach_native<T: Any + Send + Sync>(&self, native: T) -> bool {
        self.0.native.attach(native)
    }
    #[allow(dead_code)] //only the wgpu backend attaches natives
    pub(crate) fn native<T: Any>(&self) -> Option<&T> {
        self.0.native.get::<T>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings::layout::{ResourceKind, ResourceLayoutDescription, ResourceLayoutElement};
    use crate::bindings::resources::SampleCount;
    use crate::bindings::visible_to::ShaderStages;
    use crate::pixel_formats::PixelFormat;

    #[test]
    fn test_buffer_counts() {
        let layout = ResourceLayout::new(ResourceLayoutDescription::new(vec![
            ResourceLayoutElement::new("a", ResourceKind::UniformBuffer, ShaderStages::VERTEX),
            ResourceLayoutElement::new("b", ResourceKind::UniformBuffer, ShaderStages::VERTEX),
        ]));
        let p = Pipeline::graphics(
            GraphicsPipelineDescription::new(
                vec![layout.clone(), layout],
                vec![VertexLayoutDescription {
                    stride: 12,
                    instance_step_rate: 0,
                }],
                OutputDescription {
                    color_formats: vec![PixelFormat::RGBA8UNorm],
                    depth_format: None,
                    sample_count: SampleCount::One,
                },
            ),
            "p",
        );
        assert!(!p.is_compute());
        assert_eq!(p.non_vertex_buffer_count(), 4);
        assert_eq!(p.vertex_buffer_count(), 1);
        assert_eq!(p.slot_bases().base(1, SlotClass::Buffer), 2);
    }
}
