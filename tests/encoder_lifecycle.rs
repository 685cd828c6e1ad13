// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Native encoder lifecycle of the slot-encoder executor, observed through the recording backend.

use slots_and_passes::bindings::bind_style::BindingModel;
use slots_and_passes::bindings::layout::{
    ElementOptions, ResourceKind, ResourceLayoutDescription, ResourceLayoutElement,
};
use slots_and_passes::bindings::resource_set::ResourceSetDescription;
use slots_and_passes::bindings::resources::{BufferDescription, DeviceBuffer, TextureDescription};
use slots_and_passes::bindings::sampler::SamplerDescription;
use slots_and_passes::bindings::visible_to::{BufferUsage, ShaderStages, TextureUsage};
use slots_and_passes::bindings::ResourceLayout;
use slots_and_passes::command::{
    BufferCopy, CommandList, CommandListDescription, DispatchArgs, DrawArgs, DrawIndexedArgs,
    IndexFormat, RecordingState,
};
use slots_and_passes::device::{Device, DeviceFeatures, DeviceLimits, SubmitInfo};
use slots_and_passes::imp::{
    EncoderKind, EncoderLifecycle, NativeCall, RecordedPass, RecordingEncoder, RenderStage,
    SlotEncoderExecutor,
};
use slots_and_passes::pass::{
    Framebuffer, FramebufferAttachment, FramebufferDescription, LoadAction, RenderPassDescription,
    RgbaFloat, ScissorRect, StoreAction,
};
use slots_and_passes::pipeline::{
    ComputePipelineDescription, FaceCullMode, FrontFace, GraphicsPipelineDescription, Pipeline,
    PolygonFillMode, PrimitiveTopology, VertexLayoutDescription,
};
use slots_and_passes::pixel_formats::PixelFormat;

type List = CommandList<SlotEncoderExecutor<RecordingEncoder>>;

fn device() -> Device {
    Device::new(DeviceFeatures::all(), DeviceLimits::default())
}

fn framebuffer(device: &Device) -> Framebuffer {
    let factory = device.factory();
    let target = factory
        .create_texture(
            TextureDescription::texture_2d(32, 32, PixelFormat::BGRA8UNorm, TextureUsage::RENDER_TARGET),
            "color",
        )
        .unwrap();
    factory
        .create_framebuffer(
            FramebufferDescription::new(vec![FramebufferAttachment::new(&target)], None),
            "framebuffer",
        )
        .unwrap()
}

fn pipeline(device: &Device, framebuffer: &Framebuffer, layouts: Vec<ResourceLayout>) -> Pipeline {
    device
        .factory()
        .create_graphics_pipeline(
            GraphicsPipelineDescription::new(
                layouts,
                vec![VertexLayoutDescription {
                    stride: 12,
                    instance_step_rate: 0,
                }],
                framebuffer.output_description().clone(),
            ),
            "pipeline",
        )
        .unwrap()
}

fn list(device: &Device, lifecycle: EncoderLifecycle, description: CommandListDescription) -> List {
    let executor = SlotEncoderExecutor::new(RecordingEncoder::new(), lifecycle, device);
    device
        .factory()
        .create_command_list(description, executor, "list")
}

fn calls(list: &List) -> &[NativeCall] {
    list.executor().native().calls()
}

fn opened(list: &List) -> usize {
    list.executor().native().count(NativeCall::is_encoder_open)
}

fn render_encoders(list: &List) -> Vec<RecordedPass> {
    calls(list)
        .iter()
        .filter_map(|c| match c {
            NativeCall::OpenRenderEncoder(pass) => Some(pass.clone()),
            _ => None,
        })
        .collect()
}

#[test]
fn draws_flush_state_once_per_encoder() {
    let device = device();
    let framebuffer = framebuffer(&device);
    let pipeline = pipeline(&device, &framebuffer, Vec::new());
    let mut list = list(&device, EncoderLifecycle::Immediate, CommandListDescription::default());
    list.begin().unwrap();
    list.begin_render_pass(&RenderPassDescription::load(&framebuffer))
        .unwrap();
    list.set_pipeline(&pipeline).unwrap();
    list.draw(DrawArgs::new(3)).unwrap();
    list.draw(DrawArgs::new(6)).unwrap();
    list.end_render_pass().unwrap();
    list.end().unwrap();
    device.submit(&mut list, SubmitInfo::default()).unwrap();
    assert_eq!(list.state(), RecordingState::Completed);

    let expected = vec![
        NativeCall::BeginCommandBuffer,
        NativeCall::OpenRenderEncoder(RecordedPass {
            framebuffer: framebuffer.id(),
            color_loads: vec![(LoadAction::Load, RgbaFloat::CLEAR)],
            depth_load: None,
            resolve_targets: Vec::new(),
        }),
        NativeCall::SetRenderPipelineState(pipeline.id()),
        NativeCall::SetCullMode(FaceCullMode::Back),
        NativeCall::SetFrontFacing(FrontFace::Clockwise),
        NativeCall::SetTriangleFillMode(PolygonFillMode::Solid),
        NativeCall::SetBlendColor(RgbaFloat::CLEAR),
        NativeCall::SetViewports(vec![framebuffer.full_viewport()]),
        NativeCall::DrawPrimitives {
            topology: PrimitiveTopology::TriangleList,
            args: DrawArgs::new(3),
        },
        NativeCall::DrawPrimitives {
            topology: PrimitiveTopology::TriangleList,
            args: DrawArgs::new(6),
        },
        NativeCall::EndEncoder(EncoderKind::Render),
        NativeCall::Commit,
    ];
    assert_eq!(calls(&list), expected.as_slice());
}

#[test]
fn cleared_pass_with_one_draw() {
    let device = device();
    let framebuffer = framebuffer(&device);
    let pipeline = pipeline(&device, &framebuffer, Vec::new());
    let vertices = device
        .factory()
        .create_buffer(BufferDescription::new(36, BufferUsage::VERTEX), "triangle");
    for lifecycle in [EncoderLifecycle::Immediate, EncoderLifecycle::Deferred] {
        let mut list = list(&device, lifecycle, CommandListDescription::default());
        list.begin().unwrap();
        list.begin_render_pass(&RenderPassDescription::new(
            &framebuffer,
            LoadAction::Clear,
            StoreAction::Store,
            RgbaFloat::RED,
            1.0,
        ))
        .unwrap();
        list.set_pipeline(&pipeline).unwrap();
        list.set_vertex_buffer(0, &vertices, 0).unwrap();
        list.draw(DrawArgs::new(3)).unwrap();
        list.end_render_pass().unwrap();
        list.end().unwrap();

        let native = list.executor().native();
        assert_eq!(native.count(NativeCall::is_encoder_open), 1);
        assert_eq!(
            native.count(|c| matches!(c, NativeCall::EndEncoder(_))),
            1
        );
        assert_eq!(
            native.count(|c| matches!(c, NativeCall::SetRenderPipelineState(_))),
            1
        );
        assert_eq!(render_encoders(&list)[0].color_loads, vec![(LoadAction::Clear, RgbaFloat::RED)]);
        //only the vertex buffer is bound; no resource set was set
        assert_eq!(
            native.count(|c| matches!(
                c,
                NativeCall::SetRenderBuffer { .. }
                    | NativeCall::SetRenderTexture { .. }
                    | NativeCall::SetRenderSampler { .. }
            )),
            1
        );
        assert_eq!(native.count(|c| matches!(c, NativeCall::DrawPrimitives { .. })), 1);
    }
}

#[test]
fn deferred_pass_without_draws_opens_nothing() {
    let device = device();
    let framebuffer = framebuffer(&device);
    let mut list = list(&device, EncoderLifecycle::Deferred, CommandListDescription::default());
    list.begin().unwrap();
    list.begin_render_pass(&RenderPassDescription::load(&framebuffer))
        .unwrap();
    list.end_render_pass().unwrap();
    list.end().unwrap();
    assert_eq!(opened(&list), 0);
    assert_eq!(calls(&list), &[NativeCall::BeginCommandBuffer]);
}

#[test]
fn immediate_pass_without_draws_still_opens() {
    let device = device();
    let framebuffer = framebuffer(&device);
    let mut list = list(&device, EncoderLifecycle::Immediate, CommandListDescription::default());
    list.begin().unwrap();
    list.begin_render_pass(&RenderPassDescription::load(&framebuffer))
        .unwrap();
    list.end_render_pass().unwrap();
    assert_eq!(opened(&list), 1);
    assert_eq!(
        calls(&list).last(),
        Some(&NativeCall::EndEncoder(EncoderKind::Render))
    );
}

#[test]
fn deferred_clears_become_load_actions() {
    let device = device();
    let framebuffer = framebuffer(&device);
    let pipeline = pipeline(&device, &framebuffer, Vec::new());
    let mut list = list(&device, EncoderLifecycle::Deferred, CommandListDescription::default());
    list.begin().unwrap();
    list.begin_render_pass(&RenderPassDescription::new(
        &framebuffer,
        LoadAction::DontCare,
        StoreAction::Store,
        RgbaFloat::CLEAR,
        1.0,
    ))
    .unwrap();
    list.clear_color_target(0, RgbaFloat::RED).unwrap();
    list.set_pipeline(&pipeline).unwrap();
    list.draw(DrawArgs::new(3)).unwrap();
    list.end_render_pass().unwrap();

    let encoders = render_encoders(&list);
    assert_eq!(encoders.len(), 1);
    assert_eq!(encoders[0].color_loads, vec![(LoadAction::Clear, RgbaFloat::RED)]);
}

#[test]
fn deferred_clear_without_draw_still_lands() {
    let device = device();
    let framebuffer = framebuffer(&device);
    let mut list = list(&device, EncoderLifecycle::Deferred, CommandListDescription::default());
    list.begin().unwrap();
    list.begin_render_pass(&RenderPassDescription::load(&framebuffer))
        .unwrap();
    list.clear_color_target(0, RgbaFloat::BLACK).unwrap();
    list.end_render_pass().unwrap();
    assert_eq!(
        &calls(&list)[1..],
        &[
            NativeCall::OpenRenderEncoder(RecordedPass {
                framebuffer: framebuffer.id(),
                color_loads: vec![(LoadAction::Clear, RgbaFloat::BLACK)],
                depth_load: None,
                resolve_targets: Vec::new(),
            }),
            NativeCall::EndEncoder(EncoderKind::Render),
        ]
    );
}

#[test]
fn immediate_clear_reopens_the_encoder() {
    let device = device();
    let framebuffer = framebuffer(&device);
    let pipeline = pipeline(&device, &framebuffer, Vec::new());
    let mut list = list(&device, EncoderLifecycle::Immediate, CommandListDescription::default());
    list.begin().unwrap();
    list.begin_render_pass(&RenderPassDescription::new(
        &framebuffer,
        LoadAction::Clear,
        StoreAction::Store,
        RgbaFloat::RED,
        1.0,
    ))
    .unwrap();
    list.set_pipeline(&pipeline).unwrap();
    list.draw(DrawArgs::new(3)).unwrap();
    list.clear_color_target(0, RgbaFloat::BLACK).unwrap();
    list.draw(DrawArgs::new(3)).unwrap();
    list.end_render_pass().unwrap();

    let encoders = render_encoders(&list);
    assert_eq!(encoders.len(), 2);
    assert_eq!(encoders[0].color_loads, vec![(LoadAction::Clear, RgbaFloat::RED)]);
    assert_eq!(encoders[1].color_loads, vec![(LoadAction::Clear, RgbaFloat::BLACK)]);
    //a fresh encoder has no state
    let pipeline_sets = list
        .executor()
        .native()
        .count(|c| matches!(c, NativeCall::SetRenderPipelineState(_)));
    assert_eq!(pipeline_sets, 2);
}

#[test]
fn pipeline_persists_across_passes() {
    let device = device();
    let framebuffer = framebuffer(&device);
    let pipeline = pipeline(&device, &framebuffer, Vec::new());
    let mut list = list(&device, EncoderLifecycle::Deferred, CommandListDescription::default());
    list.begin().unwrap();
    for _ in 0..2 {
        list.begin_render_pass(&RenderPassDescription::load(&framebuffer))
            .unwrap();
        list.set_pipeline(&pipeline).unwrap();
        list.draw(DrawArgs::new(3)).unwrap();
        list.end_render_pass().unwrap();
    }
    assert_eq!(render_encoders(&list).len(), 2);
    let pipeline_sets = list
        .executor()
        .native()
        .count(|c| matches!(c, NativeCall::SetRenderPipelineState(_)));
    assert_eq!(pipeline_sets, 2);
}

#[test]
fn scissor_rects_follow_the_pipeline() {
    let device = device();
    let framebuffer = framebuffer(&device);
    let mut description = GraphicsPipelineDescription::new(
        Vec::new(),
        Vec::new(),
        framebuffer.output_description().clone(),
    );
    description.rasterizer.scissor_test_enabled = true;
    let scissored = device
        .factory()
        .create_graphics_pipeline(description, "scissored")
        .unwrap();
    let rect = ScissorRect::new(4, 4, 8, 8);
    let mut list = list(&device, EncoderLifecycle::Deferred, CommandListDescription::default());
    list.begin().unwrap();
    list.begin_render_pass(&RenderPassDescription::load(&framebuffer))
        .unwrap();
    list.set_pipeline(&scissored).unwrap();
    list.set_scissor_rect(0, rect).unwrap();
    list.draw(DrawArgs::new(3)).unwrap();
    let tail = calls(&list)
        .iter()
        .rev()
        .take(3)
        .cloned()
        .collect::<Vec<_>>();
    assert_eq!(
        tail,
        vec![
            NativeCall::DrawPrimitives {
                topology: PrimitiveTopology::TriangleList,
                args: DrawArgs::new(3),
            },
            NativeCall::SetScissorRects(vec![rect]),
            NativeCall::SetViewports(vec![framebuffer.full_viewport()]),
        ]
    );
}

#[test]
fn resource_sets_bind_to_flat_slots() {
    let device = device();
    let factory = device.factory();
    let framebuffer = framebuffer(&device);
    let shared = factory.create_resource_layout(ResourceLayoutDescription::new(vec![
        ResourceLayoutElement::new(
            "camera",
            ResourceKind::UniformBuffer,
            ShaderStages::VERTEX | ShaderStages::FRAGMENT,
        ),
        ResourceLayoutElement::new("albedo", ResourceKind::TextureReadOnly, ShaderStages::FRAGMENT),
        ResourceLayoutElement::new("linear", ResourceKind::Sampler, ShaderStages::FRAGMENT),
    ]));
    let material = factory.create_resource_layout(ResourceLayoutDescription::new(vec![
        ResourceLayoutElement::new("material", ResourceKind::UniformBuffer, ShaderStages::FRAGMENT),
    ]));
    let pipeline = pipeline(&device, &framebuffer, vec![shared.clone(), material.clone()]);

    let camera = factory.create_buffer(BufferDescription::new(256, BufferUsage::UNIFORM), "camera");
    let albedo = factory
        .create_texture(
            TextureDescription::texture_2d(16, 16, PixelFormat::RGBA8UNorm, TextureUsage::SAMPLED),
            "albedo",
        )
        .unwrap();
    let sampler = factory
        .create_sampler(SamplerDescription::default(), "linear")
        .unwrap();
    let parameters = factory.create_buffer(BufferDescription::new(256, BufferUsage::UNIFORM), "material");
    let vertices = factory.create_buffer(BufferDescription::new(1200, BufferUsage::VERTEX), "vertices");
    let shared_set = factory
        .create_resource_set(
            ResourceSetDescription::new(
                &shared,
                vec![camera.clone().into(), albedo.clone().into(), sampler.clone().into()],
            ),
            "shared",
        )
        .unwrap();
    let material_set = factory
        .create_resource_set(
            ResourceSetDescription::new(&material, vec![parameters.clone().into()]),
            "material",
        )
        .unwrap();

    let mut list = list(&device, EncoderLifecycle::Deferred, CommandListDescription::default());
    list.begin().unwrap();
    list.begin_render_pass(&RenderPassDescription::load(&framebuffer))
        .unwrap();
    list.set_pipeline(&pipeline).unwrap();
    list.set_graphics_resource_set(0, &shared_set, &[]).unwrap();
    list.set_graphics_resource_set(1, &material_set, &[]).unwrap();
    list.set_vertex_buffer(0, &vertices, 0).unwrap();
    list.draw(DrawArgs::new(3)).unwrap();

    let bindings: Vec<NativeCall> = calls(&list)
        .iter()
        .filter(|c| {
            matches!(
                c,
                NativeCall::SetRenderBuffer { .. }
                    | NativeCall::SetRenderTexture { .. }
                    | NativeCall::SetRenderSampler { .. }
            )
        })
        .cloned()
        .collect();
    //the vertex buffer occupies vertex slot 0, so vertex-stage set buffers start at 1
    assert_eq!(
        bindings,
        vec![
            NativeCall::SetRenderBuffer {
                stage: RenderStage::Vertex,
                buffer: camera.id(),
                offset: 0,
                slot: 1,
            },
            NativeCall::SetRenderBuffer {
                stage: RenderStage::Fragment,
                buffer: camera.id(),
                offset: 0,
                slot: 0,
            },
            NativeCall::SetRenderTexture {
                stage: RenderStage::Fragment,
                texture: albedo.id(),
                slot: 0,
            },
            NativeCall::SetRenderSampler {
                stage: RenderStage::Fragment,
                sampler: sampler.id(),
                slot: 0,
            },
            NativeCall::SetRenderBuffer {
                stage: RenderStage::Fragment,
                buffer: parameters.id(),
                offset: 0,
                slot: 1,
            },
            NativeCall::SetRenderBuffer {
                stage: RenderStage::Vertex,
                buffer: vertices.id(),
                offset: 0,
                slot: 0,
            },
        ]
    );

    //bound state is clean until something changes
    let before = calls(&list).len();
    list.draw(DrawArgs::new(3)).unwrap();
    assert_eq!(calls(&list).len(), before + 1);
}

#[test]
fn indexed_draws_resolve_the_index_offset() {
    let device = device();
    let framebuffer = framebuffer(&device);
    let pipeline = pipeline(&device, &framebuffer, Vec::new());
    let indices = device
        .factory()
        .create_buffer(BufferDescription::new(64, BufferUsage::INDEX), "indices");
    let mut list = list(&device, EncoderLifecycle::Deferred, CommandListDescription::default());
    list.begin().unwrap();
    list.begin_render_pass(&RenderPassDescription::load(&framebuffer))
        .unwrap();
    list.set_pipeline(&pipeline).unwrap();
    list.set_index_buffer(&indices, IndexFormat::UInt16, 4).unwrap();
    list.draw_indexed(DrawIndexedArgs {
        index_count: 6,
        instance_count: 2,
        index_start: 3,
        vertex_offset: 0,
        instance_start: 0,
    })
    .unwrap();
    assert_eq!(
        calls(&list).last(),
        Some(&NativeCall::DrawIndexedPrimitives {
            topology: PrimitiveTopology::TriangleList,
            index_count: 6,
            format: IndexFormat::UInt16,
            index_buffer: indices.id(),
            index_buffer_offset: 10,
            instance_count: 2,
            base_vertex: 0,
            base_instance: 0,
        })
    );
}

#[test]
fn unaligned_copies_use_the_compute_kernel() {
    let device = device();
    let factory = device.factory();
    let compute = factory
        .create_compute_pipeline(
            ComputePipelineDescription {
                resource_layouts: Vec::new(),
                thread_group_size: (64, 1, 1),
            },
            "reduce",
        )
        .unwrap();
    let source = factory.create_buffer(BufferDescription::new(64, BufferUsage::STAGING), "source");
    let destination = factory.create_buffer(
        BufferDescription::new(64, BufferUsage::STRUCTURED_READ_WRITE),
        "destination",
    );
    let copy = |size| BufferCopy {
        source: source.clone(),
        source_offset: 0,
        destination: destination.clone(),
        destination_offset: 0,
        size,
    };
    let mut list = list(&device, EncoderLifecycle::Deferred, CommandListDescription::default());
    list.begin().unwrap();
    list.set_pipeline(&compute).unwrap();
    list.dispatch(DispatchArgs::new(4, 1, 1)).unwrap();
    list.copy_buffer(&copy(6)).unwrap();
    list.dispatch(DispatchArgs::new(4, 1, 1)).unwrap();
    list.copy_buffer(&copy(16)).unwrap();
    list.end().unwrap();

    let dispatch = NativeCall::DispatchThreadgroups {
        args: DispatchArgs::new(4, 1, 1),
        thread_group_size: (64, 1, 1),
    };
    assert_eq!(
        calls(&list),
        &[
            NativeCall::BeginCommandBuffer,
            NativeCall::OpenComputeEncoder,
            NativeCall::SetComputePipelineState(compute.id()),
            dispatch.clone(),
            NativeCall::CopyBufferWithKernel {
                source: source.id(),
                destination: destination.id(),
                size: 6,
            },
            //the kernel replaced the pipeline state
            NativeCall::SetComputePipelineState(compute.id()),
            dispatch,
            NativeCall::EndEncoder(EncoderKind::Compute),
            NativeCall::OpenBlitEncoder,
            NativeCall::CopyBuffer {
                source: source.id(),
                destination: destination.id(),
                size: 16,
            },
            NativeCall::EndEncoder(EncoderKind::Blit),
        ]
    );
}

#[test]
fn updates_hold_staging_until_completion() {
    let device = device();
    let buffer: DeviceBuffer = device
        .factory()
        .create_buffer(BufferDescription::new(64, BufferUsage::UNIFORM), "uniforms");
    let executor = SlotEncoderExecutor::new(
        RecordingEncoder::deferred_completion(),
        EncoderLifecycle::Deferred,
        &device,
    );
    let mut list = device
        .factory()
        .create_command_list(CommandListDescription::reusable(), executor, "uploads");
    list.begin().unwrap();
    list.update_buffer_with(&buffer, 16, &[7u32, 9u32]).unwrap();
    list.end().unwrap();
    device.submit(&mut list, SubmitInfo::default()).unwrap();

    let mut expected_data = 7u32.to_ne_bytes().to_vec();
    expected_data.extend_from_slice(&9u32.to_ne_bytes());
    let first_block = match &calls(&list)[2] {
        NativeCall::CopyFromStaging {
            block,
            destination,
            offset,
            data,
        } => {
            assert_eq!(*destination, buffer.id());
            assert_eq!(*offset, 16);
            assert_eq!(data, &expected_data);
            *block
        }
        other => panic!("expected a staging copy, got {other:?}"),
    };
    assert_eq!(list.state(), RecordingState::Executing);
    assert_eq!(list.executor().held_staging_blocks(), 1);
    assert_eq!(device.staging_pool().free_count(), 0);

    list.executor_mut().native_mut().complete_all();
    assert_eq!(list.state(), RecordingState::Completed);
    //released when the list is begun again
    list.begin().unwrap();
    assert_eq!(list.executor().held_staging_blocks(), 0);
    assert_eq!(device.staging_pool().free_count(), 1);
    list.update_buffer(&buffer, 0, &[1, 2, 3, 4]).unwrap();
    let reused = list
        .executor()
        .native()
        .calls()
        .iter()
        .any(|c| matches!(c, NativeCall::CopyFromStaging { block, .. } if *block == first_block));
    assert!(reused);
}

#[test]
fn barriers_only_reach_compute_encoders() {
    let device = device();
    let factory = device.factory();
    let compute = factory
        .create_compute_pipeline(
            ComputePipelineDescription {
                resource_layouts: Vec::new(),
                thread_group_size: (1, 1, 1),
            },
            "compute",
        )
        .unwrap();
    let a = factory.create_buffer(BufferDescription::new(16, BufferUsage::STAGING), "a");
    let b = factory.create_buffer(BufferDescription::new(16, BufferUsage::STAGING), "b");
    let mut list = list(&device, EncoderLifecycle::Deferred, CommandListDescription::default());
    list.begin().unwrap();
    list.memory_barrier().unwrap();
    list.copy_buffer(&BufferCopy {
        source: a,
        source_offset: 0,
        destination: b,
        destination_offset: 0,
        size: 16,
    })
    .unwrap();
    list.memory_barrier().unwrap();
    assert_eq!(
        list.executor()
            .native()
            .count(|c| matches!(c, NativeCall::MemoryBarrier(_))),
        0
    );
    list.set_pipeline(&compute).unwrap();
    list.dispatch(DispatchArgs::new(1, 1, 1)).unwrap();
    list.memory_barrier().unwrap();
    assert_eq!(
        calls(&list).last(),
        Some(&NativeCall::MemoryBarrier(EncoderKind::Compute))
    );
}

#[test]
fn debug_groups_target_the_open_encoder() {
    let device = device();
    let compute = device
        .factory()
        .create_compute_pipeline(
            ComputePipelineDescription {
                resource_layouts: Vec::new(),
                thread_group_size: (1, 1, 1),
            },
            "compute",
        )
        .unwrap();
    let mut list = list(&device, EncoderLifecycle::Deferred, CommandListDescription::default());
    list.begin().unwrap();
    list.push_debug_group("frame").unwrap();
    list.set_pipeline(&compute).unwrap();
    list.dispatch(DispatchArgs::new(1, 1, 1)).unwrap();
    list.insert_debug_marker("dispatched").unwrap();
    list.pop_debug_group().unwrap();
    let debug: Vec<NativeCall> = calls(&list)
        .iter()
        .filter(|c| {
            matches!(
                c,
                NativeCall::PushDebugGroup { .. }
                    | NativeCall::PopDebugGroup { .. }
                    | NativeCall::InsertDebugMarker { .. }
            )
        })
        .cloned()
        .collect();
    assert_eq!(
        debug,
        vec![
            NativeCall::PushDebugGroup {
                target: None,
                name: "frame".to_string(),
            },
            NativeCall::InsertDebugMarker {
                target: Some(EncoderKind::Compute),
                name: "dispatched".to_string(),
            },
            NativeCall::PopDebugGroup {
                target: Some(EncoderKind::Compute),
            },
        ]
    );
}

fn render_binds(list: &List) -> Vec<NativeCall> {
    calls(list)
        .iter()
        .filter(|c| {
            matches!(
                c,
                NativeCall::SetRenderBuffer { .. }
                    | NativeCall::SetRenderTexture { .. }
                    | NativeCall::SetRenderSampler { .. }
            )
        })
        .cloned()
        .collect()
}

#[test]
fn padding_elements_take_no_dynamic_offset() {
    let device = device();
    let factory = device.factory();
    let framebuffer = framebuffer(&device);
    let mut pad = ResourceLayoutElement::unused("pad", ResourceKind::UniformBuffer);
    pad.options = ElementOptions::DYNAMIC_BINDING;
    let layout = factory.create_resource_layout(ResourceLayoutDescription::new(vec![
        pad,
        ResourceLayoutElement::dynamic("camera", ResourceKind::UniformBuffer, ShaderStages::VERTEX),
    ]));
    let pipeline = pipeline(&device, &framebuffer, vec![layout.clone()]);
    let filler = factory.create_buffer(BufferDescription::new(256, BufferUsage::UNIFORM), "filler");
    let camera = factory.create_buffer(BufferDescription::new(1024, BufferUsage::UNIFORM), "camera");
    let set = factory
        .create_resource_set(
            ResourceSetDescription::new(&layout, vec![filler.into(), camera.clone().into()]),
            "padded",
        )
        .unwrap();

    let mut list = list(&device, EncoderLifecycle::Deferred, CommandListDescription::default());
    list.begin().unwrap();
    list.begin_render_pass(&RenderPassDescription::load(&framebuffer))
        .unwrap();
    list.set_pipeline(&pipeline).unwrap();
    list.set_graphics_resource_set(0, &set, &[512]).unwrap();
    list.draw(DrawArgs::new(3)).unwrap();
    //the one vertex buffer the pipeline declares holds vertex slot 0
    assert_eq!(
        render_binds(&list),
        vec![NativeCall::SetRenderBuffer {
            stage: RenderStage::Vertex,
            buffer: camera.id(),
            offset: 512,
            slot: 1,
        }]
    );
}

#[test]
fn improved_model_appends_vertex_buffers() {
    let device = device();
    let factory = device.factory();
    let framebuffer = framebuffer(&device);
    let layout = factory.create_resource_layout(ResourceLayoutDescription::new(vec![
        ResourceLayoutElement::new(
            "camera",
            ResourceKind::UniformBuffer,
            ShaderStages::VERTEX | ShaderStages::FRAGMENT,
        ),
    ]));
    let mut description = GraphicsPipelineDescription::new(
        vec![layout.clone()],
        vec![VertexLayoutDescription {
            stride: 12,
            instance_step_rate: 0,
        }],
        framebuffer.output_description().clone(),
    );
    description.binding_model = BindingModel::Improved;
    let improved = factory
        .create_graphics_pipeline(description, "improved")
        .unwrap();
    let camera = factory.create_buffer(BufferDescription::new(256, BufferUsage::UNIFORM), "camera");
    let vertices = factory.create_buffer(BufferDescription::new(360, BufferUsage::VERTEX), "vertices");
    let set = factory
        .create_resource_set(
            ResourceSetDescription::new(&layout, vec![camera.clone().into()]),
            "camera",
        )
        .unwrap();

    let mut list = list(&device, EncoderLifecycle::Deferred, CommandListDescription::default());
    list.begin().unwrap();
    list.begin_render_pass(&RenderPassDescription::load(&framebuffer))
        .unwrap();
    list.set_pipeline(&improved).unwrap();
    list.set_graphics_resource_set(0, &set, &[]).unwrap();
    list.set_vertex_buffer(0, &vertices, 0).unwrap();
    list.draw(DrawArgs::new(3)).unwrap();
    //set buffers keep the same slot in every stage; vertex buffers come after them
    assert_eq!(
        render_binds(&list),
        vec![
            NativeCall::SetRenderBuffer {
                stage: RenderStage::Vertex,
                buffer: camera.id(),
                offset: 0,
                slot: 0,
            },
            NativeCall::SetRenderBuffer {
                stage: RenderStage::Fragment,
                buffer: camera.id(),
                offset: 0,
                slot: 0,
            },
            NativeCall::SetRenderBuffer {
                stage: RenderStage::Vertex,
                buffer: vertices.id(),
                offset: 0,
                slot: 1,
            },
        ]
    );
}

#[test]
fn compute_sets_bind_through_compute_slot_bases() {
    let device = device();
    let factory = device.factory();
    let inputs = factory.create_resource_layout(ResourceLayoutDescription::new(vec![
        ResourceLayoutElement::new("params", ResourceKind::UniformBuffer, ShaderStages::COMPUTE),
        ResourceLayoutElement::new("source", ResourceKind::TextureReadOnly, ShaderStages::COMPUTE),
        //invisible to compute, so never bound by a dispatch
        ResourceLayoutElement::new("debug", ResourceKind::UniformBuffer, ShaderStages::FRAGMENT),
    ]));
    let outputs = factory.create_resource_layout(ResourceLayoutDescription::new(vec![
        ResourceLayoutElement::new(
            "histogram",
            ResourceKind::StructuredBufferReadWrite,
            ShaderStages::COMPUTE,
        ),
        ResourceLayoutElement::new("nearest", ResourceKind::Sampler, ShaderStages::COMPUTE),
    ]));
    let compute = factory
        .create_compute_pipeline(
            ComputePipelineDescription {
                resource_layouts: vec![inputs.clone(), outputs.clone()],
                thread_group_size: (8, 8, 1),
            },
            "histogram",
        )
        .unwrap();
    let params = factory.create_buffer(BufferDescription::new(256, BufferUsage::UNIFORM), "params");
    let debug = factory.create_buffer(BufferDescription::new(256, BufferUsage::UNIFORM), "debug");
    let source = factory
        .create_texture(
            TextureDescription::texture_2d(64, 64, PixelFormat::RGBA8UNorm, TextureUsage::SAMPLED),
            "source",
        )
        .unwrap();
    let histogram = factory.create_buffer(
        BufferDescription::new(1024, BufferUsage::STRUCTURED_READ_WRITE),
        "histogram",
    );
    let nearest = factory
        .create_sampler(SamplerDescription::default(), "nearest")
        .unwrap();
    let input_set = factory
        .create_resource_set(
            ResourceSetDescription::new(
                &inputs,
                vec![params.clone().into(), source.clone().into(), debug.into()],
            ),
            "inputs",
        )
        .unwrap();
    let output_set = factory
        .create_resource_set(
            ResourceSetDescription::new(&outputs, vec![histogram.clone().into(), nearest.clone().into()]),
            "outputs",
        )
        .unwrap();

    let mut list = list(&device, EncoderLifecycle::Deferred, CommandListDescription::default());
    list.begin().unwrap();
    list.set_pipeline(&compute).unwrap();
    list.set_compute_resource_set(0, &input_set, &[]).unwrap();
    list.set_compute_resource_set(1, &output_set, &[]).unwrap();
    list.dispatch(DispatchArgs::new(8, 8, 1)).unwrap();
    //a rebind of the same sets changes nothing
    list.set_compute_resource_set(1, &output_set, &[]).unwrap();
    list.dispatch(DispatchArgs::new(8, 8, 1)).unwrap();

    let dispatch = NativeCall::DispatchThreadgroups {
        args: DispatchArgs::new(8, 8, 1),
        thread_group_size: (8, 8, 1),
    };
    assert_eq!(
        &calls(&list)[1..],
        &[
            NativeCall::OpenComputeEncoder,
            NativeCall::SetComputePipelineState(compute.id()),
            NativeCall::SetComputeBuffer {
                buffer: params.id(),
                offset: 0,
                slot: 0,
            },
            NativeCall::SetComputeTexture {
                texture: source.id(),
                slot: 0,
            },
            //the second set starts after the two buffers of the first
            NativeCall::SetComputeBuffer {
                buffer: histogram.id(),
                offset: 0,
                slot: 2,
            },
            NativeCall::SetComputeSampler {
                sampler: nearest.id(),
                slot: 0,
            },
            dispatch.clone(),
            dispatch,
        ]
    );
}
