// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Recording-state transitions and pass-scoped validation, observed through the spy executor.

use slots_and_passes::bindings::layout::{ResourceKind, ResourceLayoutDescription, ResourceLayoutElement};
use slots_and_passes::bindings::resource_set::ResourceSetDescription;
use slots_and_passes::bindings::resources::{BufferDescription, DeviceBuffer, DeviceBufferRange, TextureDescription};
use slots_and_passes::bindings::visible_to::{BufferUsage, ShaderStages, TextureUsage};
use slots_and_passes::command::{
    BufferCopy, CommandList, CommandListDescription, DispatchArgs, DrawArgs, Error, RecordingState,
    SpyCall, SpyExecutor, UsageError,
};
use slots_and_passes::device::{Device, DeviceFeatures, DeviceLimits, SubmitInfo};
use slots_and_passes::pass::{
    Framebuffer, FramebufferAttachment, FramebufferDescription, RenderPassDescription, Viewport,
};
use slots_and_passes::pipeline::{
    ComputePipelineDescription, GraphicsPipelineDescription, Pipeline, VertexLayoutDescription,
};
use slots_and_passes::pixel_formats::PixelFormat;

struct Scene {
    device: Device,
    framebuffer: Framebuffer,
    pipeline: Pipeline,
    compute: Pipeline,
    vertices: DeviceBuffer,
    scratch: DeviceBuffer,
}

fn scene() -> Scene {
    let device = Device::new(DeviceFeatures::all(), DeviceLimits::default());
    let factory = device.factory();
    let target = factory
        .create_texture(
            TextureDescription::texture_2d(64, 64, PixelFormat::RGBA8UNorm, TextureUsage::RENDER_TARGET),
            "target",
        )
        .unwrap();
    let framebuffer = factory
        .create_framebuffer(
            FramebufferDescription::new(vec![FramebufferAttachment::new(&target)], None),
            "framebuffer",
        )
        .unwrap();
    let uniforms = factory.create_resource_layout(ResourceLayoutDescription::new(vec![
        ResourceLayoutElement::dynamic("camera", ResourceKind::UniformBuffer, ShaderStages::VERTEX),
    ]));
    let pipeline = factory
        .create_graphics_pipeline(
            GraphicsPipelineDescription::new(
                vec![uniforms],
                vec![VertexLayoutDescription {
                    stride: 16,
                    instance_step_rate: 0,
                }],
                framebuffer.output_description().clone(),
            ),
            "triangles",
        )
        .unwrap();
    let compute = factory
        .create_compute_pipeline(
            ComputePipelineDescription {
                resource_layouts: Vec::new(),
                thread_group_size: (8, 8, 1),
            },
            "compute",
        )
        .unwrap();
    let vertices = factory.create_buffer(BufferDescription::new(1024, BufferUsage::VERTEX), "vertices");
    let scratch = factory.create_buffer(BufferDescription::new(1024, BufferUsage::STAGING), "scratch");
    Scene {
        device,
        framebuffer,
        pipeline,
        compute,
        vertices,
        scratch,
    }
}

fn list(scene: &Scene, description: CommandListDescription) -> CommandList<SpyExecutor> {
    scene
        .device
        .factory()
        .create_command_list(description, SpyExecutor::new(), "list")
}

#[test]
fn one_shot_lifecycle() {
    let scene = scene();
    let mut list = list(&scene, CommandListDescription::default());
    assert_eq!(list.state(), RecordingState::Initial);
    list.begin().unwrap();
    assert_eq!(list.state(), RecordingState::Recording);
    assert!(matches!(
        list.begin(),
        Err(UsageError::InvalidState {
            operation: "begin",
            state: RecordingState::Recording
        })
    ));
    list.end().unwrap();
    assert_eq!(list.state(), RecordingState::Recorded);
    scene.device.submit(&mut list, SubmitInfo::default()).unwrap();
    assert_eq!(list.state(), RecordingState::Completed);
    assert_eq!(list.begin(), Err(UsageError::NotReusable));
}

#[test]
fn reusable_list_releases_previous_execution() {
    let scene = scene();
    let mut list = list(&scene, CommandListDescription::reusable());
    list.begin().unwrap();
    list.end().unwrap();
    scene.device.submit(&mut list, SubmitInfo::default()).unwrap();
    list.begin().unwrap();
    assert_eq!(list.state(), RecordingState::Recording);
    assert_eq!(
        list.executor().count(|c| *c == SpyCall::ExecutionCompleted),
        1
    );
}

#[test]
fn submit_requires_a_recorded_list() {
    let scene = scene();
    let mut list = list(&scene, CommandListDescription::default());
    list.begin().unwrap();
    let err = scene.device.submit(&mut list, SubmitInfo::default()).unwrap_err();
    assert_eq!(
        err,
        Error::Usage(UsageError::InvalidState {
            operation: "submit",
            state: RecordingState::Recording
        })
    );
}

#[test]
fn executing_until_the_backend_completes() {
    let scene = scene();
    let mut list = scene.device.factory().create_command_list(
        CommandListDescription::default(),
        SpyExecutor::holding(),
        "held",
    );
    let fence = scene.device.factory().create_fence(false);
    list.begin().unwrap();
    list.end().unwrap();
    scene
        .device
        .submit(&mut list, SubmitInfo::with_fence(&fence))
        .unwrap();
    assert_eq!(list.state(), RecordingState::Executing);
    assert_eq!(scene.device.pending_submissions(), 1);
    assert!(!fence.is_signaled());
    list.executor_mut().complete_pending();
    assert_eq!(list.state(), RecordingState::Completed);
    assert!(fence.is_signaled());
    scene.device.wait_for_idle();
    assert_eq!(scene.device.pending_submissions(), 0);
}

#[test]
fn render_commands_need_a_pass() {
    let scene = scene();
    let mut list = list(&scene, CommandListDescription::default());
    list.begin().unwrap();
    assert!(matches!(
        list.draw(DrawArgs::new(3)),
        Err(UsageError::RenderPassRequired { operation: "draw" })
    ));
    assert!(matches!(
        list.set_viewport(0, Viewport::new(0.0, 0.0, 8.0, 8.0, 0.0, 1.0)),
        Err(UsageError::RenderPassRequired { .. })
    ));
    assert!(matches!(
        list.set_vertex_buffer(0, &scene.vertices, 0),
        Err(UsageError::RenderPassRequired { .. })
    ));
    assert!(matches!(
        list.set_pipeline(&scene.pipeline),
        Err(UsageError::RenderPassRequired { .. })
    ));
    assert_eq!(list.executor().calls(), &[SpyCall::Begin]);
}

#[test]
fn transfer_and_compute_commands_refuse_a_pass() {
    let scene = scene();
    let mut list = list(&scene, CommandListDescription::default());
    list.begin().unwrap();
    list.set_pipeline(&scene.compute).unwrap();
    list.begin_render_pass(&RenderPassDescription::load(&scene.framebuffer))
        .unwrap();
    assert!(matches!(
        list.dispatch(DispatchArgs::new(1, 1, 1)),
        Err(UsageError::RenderPassOpen { operation: "dispatch" })
    ));
    let copy = BufferCopy {
        source: scene.scratch.clone(),
        source_offset: 0,
        destination: scene.vertices.clone(),
        destination_offset: 0,
        size: 16,
    };
    assert!(matches!(
        list.copy_buffer(&copy),
        Err(UsageError::RenderPassOpen { operation: "copy_buffer" })
    ));
    assert!(matches!(list.end(), Err(Error::Usage(UsageError::RenderPassOpen { .. }))));
    list.end_render_pass().unwrap();
    list.dispatch(DispatchArgs::new(1, 1, 1)).unwrap();
    list.copy_buffer(&copy).unwrap();
    list.end().unwrap();
}

#[test]
fn identical_rebind_reaches_the_executor_once() {
    let scene = scene();
    let factory = scene.device.factory();
    let camera = factory.create_buffer(BufferDescription::new(1024, BufferUsage::UNIFORM), "camera");
    let set = factory
        .create_resource_set(
            ResourceSetDescription::new(&scene.pipeline.resource_layouts()[0], vec![camera.into()]),
            "camera set",
        )
        .unwrap();
    let mut list = list(&scene, CommandListDescription::default());
    list.begin().unwrap();
    list.begin_render_pass(&RenderPassDescription::load(&scene.framebuffer))
        .unwrap();
    list.set_pipeline(&scene.pipeline).unwrap();
    list.set_graphics_resource_set(0, &set, &[256]).unwrap();
    list.set_graphics_resource_set(0, &set, &[256]).unwrap();
    let binds = |list: &CommandList<SpyExecutor>| {
        list.executor()
            .count(|c| matches!(c, SpyCall::SetGraphicsResourceSet { .. }))
    };
    assert_eq!(binds(&list), 1);
    //a different offset is a different binding
    list.set_graphics_resource_set(0, &set, &[512]).unwrap();
    assert_eq!(binds(&list), 2);
    //rebinding the pipeline is skipped, so the cache survives
    list.set_pipeline(&scene.pipeline).unwrap();
    list.set_graphics_resource_set(0, &set, &[512]).unwrap();
    assert_eq!(binds(&list), 2);
}

#[test]
fn dynamic_offsets_respect_alignment() {
    let scene = scene();
    let factory = scene.device.factory();
    let camera = factory.create_buffer(BufferDescription::new(2048, BufferUsage::UNIFORM), "camera");
    let set = factory
        .create_resource_set(
            ResourceSetDescription::new(
                &scene.pipeline.resource_layouts()[0],
                vec![DeviceBufferRange::new(camera, 256, 256).into()],
            ),
            "camera set",
        )
        .unwrap();
    let mut list = list(&scene, CommandListDescription::default());
    list.begin().unwrap();
    list.begin_render_pass(&RenderPassDescription::load(&scene.framebuffer))
        .unwrap();
    list.set_pipeline(&scene.pipeline).unwrap();
    list.set_graphics_resource_set(0, &set, &[256]).unwrap();
    assert!(matches!(
        list.set_graphics_resource_set(0, &set, &[255]),
        Err(UsageError::MisalignedDynamicOffset {
            element: 0,
            offset: 511,
            alignment: 256
        })
    ));
    assert!(matches!(
        list.set_graphics_resource_set(0, &set, &[]),
        Err(UsageError::DynamicOffsetCount {
            expected: 1,
            actual: 0
        })
    ));
}

#[test]
fn unchecked_lists_skip_validation() {
    let scene = scene();
    let mut list = list(
        &scene,
        CommandListDescription {
            validation: false,
            ..CommandListDescription::default()
        },
    );
    list.begin().unwrap();
    //forwarded without a pass; the executor decides what to do with it
    list.draw(DrawArgs::new(3)).unwrap();
    assert_eq!(list.executor().count(|c| matches!(c, SpyCall::Draw(_))), 1);
}

#[test]
fn debug_groups_balance() {
    let scene = scene();
    let mut list = list(&scene, CommandListDescription::default());
    list.begin().unwrap();
    assert_eq!(list.pop_debug_group(), Err(UsageError::DebugGroupUnderflow));
    list.push_debug_group("shadows").unwrap();
    list.insert_debug_marker("cascade 0").unwrap();
    list.pop_debug_group().unwrap();
    assert_eq!(
        &list.executor().calls()[1..],
        &[
            SpyCall::PushDebugGroup("shadows".to_string()),
            SpyCall::InsertDebugMarker("cascade 0".to_string()),
            SpyCall::PopDebugGroup,
        ]
    );
}

#[test]
fn semaphores_pair_signals_with_waits() {
    let scene = scene();
    let semaphore = scene.device.factory().create_semaphore();
    let mut first = list(&scene, CommandListDescription::default());
    first.begin().unwrap();
    first.end().unwrap();
    let mut second = list(&scene, CommandListDescription::default());
    second.begin().unwrap();
    second.end().unwrap();

    let waiting = SubmitInfo {
        wait_semaphores: vec![semaphore.clone()],
        ..SubmitInfo::default()
    };
    assert!(matches!(
        scene.device.submit(&mut second, waiting.clone()),
        Err(Error::Usage(UsageError::SemaphoreMisuse { .. }))
    ));
    let signaling = SubmitInfo {
        signal_semaphores: vec![semaphore.clone()],
        ..SubmitInfo::default()
    };
    scene.device.submit(&mut first, signaling).unwrap();
    scene.device.submit(&mut second, waiting).unwrap();
}

#[test]
fn updates_stay_inside_the_buffer() {
    let scene = scene();
    let mut list = list(&scene, CommandListDescription::default());
    list.begin().unwrap();
    assert_eq!(
        list.update_buffer(&scene.scratch, 1020, &[0; 8]),
        Err(Error::Usage(UsageError::CopyOutOfBounds {
            role: "updated",
            buffer: scene.scratch.id(),
            offset: 1020,
            size: 8,
            capacity: 1024,
        }))
    );
    list.update_buffer(&scene.scratch, 512, &[]).unwrap();
    assert_eq!(
        list.executor().count(|c| matches!(c, SpyCall::UpdateBuffer { .. })),
        0
    );
    list.update_buffer(&scene.scratch, 1016, &[1; 8]).unwrap();
    assert_eq!(
        list.executor().calls().last(),
        Some(&SpyCall::UpdateBuffer {
            buffer: scene.scratch.id(),
            offset: 1016,
            data: vec![1; 8],
        })
    );
}

#[test]
fn copies_stay_inside_both_buffers() {
    let scene = scene();
    let small = scene
        .device
        .factory()
        .create_buffer(BufferDescription::new(64, BufferUsage::STAGING), "small");
    let copy = |source_offset, size| BufferCopy {
        source: scene.scratch.clone(),
        source_offset,
        destination: small.clone(),
        destination_offset: 0,
        size,
    };
    let mut list = list(&scene, CommandListDescription::default());
    list.begin().unwrap();
    assert_eq!(
        list.copy_buffer(&copy(1000, 32)),
        Err(UsageError::CopyOutOfBounds {
            role: "source",
            buffer: scene.scratch.id(),
            offset: 1000,
            size: 32,
            capacity: 1024,
        })
    );
    assert_eq!(
        list.copy_buffer(&copy(0, 128)),
        Err(UsageError::CopyOutOfBounds {
            role: "destination",
            buffer: small.id(),
            offset: 0,
            size: 128,
            capacity: 64,
        })
    );
    list.copy_buffer(&copy(0, 0)).unwrap();
    assert_eq!(list.executor().count(|c| matches!(c, SpyCall::CopyBuffer { .. })), 0);
    list.copy_buffer(&copy(960, 64)).unwrap();
    assert_eq!(
        list.executor().calls().last(),
        Some(&SpyCall::CopyBuffer {
            source: scene.scratch.id(),
            destination: small.id(),
            size: 64,
        })
    );
}

#[test]
fn unaligned_copies_are_a_feature() {
    let features = DeviceFeatures {
        unaligned_buffer_copy: false,
        ..DeviceFeatures::all()
    };
    let device = Device::new(features, DeviceLimits::default());
    let factory = device.factory();
    let a = factory.create_buffer(BufferDescription::new(64, BufferUsage::STAGING), "a");
    let b = factory.create_buffer(BufferDescription::new(64, BufferUsage::STAGING), "b");
    let copy = |source_offset, size| BufferCopy {
        source: a.clone(),
        source_offset,
        destination: b.clone(),
        destination_offset: 0,
        size,
    };
    let mut list = factory.create_command_list(
        CommandListDescription::default(),
        SpyExecutor::new(),
        "aligned only",
    );
    list.begin().unwrap();
    assert_eq!(
        list.copy_buffer(&copy(0, 6)),
        Err(UsageError::UnsupportedFeature("unaligned buffer copies"))
    );
    assert_eq!(
        list.copy_buffer(&copy(2, 8)),
        Err(UsageError::UnsupportedFeature("unaligned buffer copies"))
    );
    //an empty copy records nothing, wherever it points
    list.copy_buffer(&copy(2, 0)).unwrap();
    list.copy_buffer(&copy(4, 8)).unwrap();
    assert_eq!(list.executor().count(|c| matches!(c, SpyCall::CopyBuffer { .. })), 1);
}
