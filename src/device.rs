// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
The device: feature flags, limits, resource creation and submission.

A [`Device`] does not own a native device; backends are executors handed to each
command list. It owns the state shared by every list recorded against it: the staging
pool, the semaphore-usage validator and the count of submissions in flight.

```
use slots_and_passes::device::{Device, DeviceFeatures, DeviceLimits};
use slots_and_passes::bindings::resources::BufferDescription;
use slots_and_passes::bindings::visible_to::BufferUsage;

let device = Device::new(DeviceFeatures::all(), DeviceLimits::default());
let buffer = device.factory().create_buffer(BufferDescription::new(256, BufferUsage::UNIFORM), "uniforms");
assert_eq!(buffer.size(), 256);
device.wait_for_idle();
```
*/

mod factory;
mod sync;

pub use factory::ResourceFactory;
pub use sync::{Completion, Fence, FenceError, Semaphore, SemaphoreUsageValidator};

use crate::bindings::layout::ResourceKind;
use crate::command::execution_tracking::ExecutionTracker;
use crate::command::{CommandList, Error, Executor, RecordingState, UsageError, VALIDATE_USAGE};
use crate::staging::StagingMemoryPool;
use logwise::privacy::LogIt;
use std::sync::Arc;
use sync::SubmissionTracker;

/// Optional capabilities of the device.
///
/// Operations that need a capability the device lacks fail with
/// [`UsageError::UnsupportedFeature`] rather than degrading silently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DeviceFeatures {
    pub compute_shader: bool,
    pub draw_indirect: bool,
    pub multiple_viewports: bool,
    pub buffer_range_binding: bool,
    pub independent_blend: bool,
    pub structured_buffer: bool,
    pub sampler_anisotropy: bool,
    pub draw_base_vertex: bool,
    pub draw_base_instance: bool,
    pub fill_mode_wireframe: bool,
    pub mipmap_generation: bool,
    /// Buffer copies whose offsets or size are not multiples of 4.
    pub unaligned_buffer_copy: bool,
}

impl DeviceFeatures {
    /// Every feature supported.
    pub const fn all() -> Self {
        DeviceFeatures {
            compute_shader: true,
            draw_indirect: true,
            multiple_viewports: true,
            buffer_range_binding: true,
            independent_blend: true,
            structured_buffer: true,
            sampler_anisotropy: true,
            draw_base_vertex: true,
            draw_base_instance: true,
            fill_mode_wireframe: true,
            mipmap_generation: true,
            unaligned_buffer_copy: true,
        }
    }
    /// No optional feature.
    pub const fn none() -> Self {
        DeviceFeatures {
            compute_shader: false,
            draw_indirect: false,
            multiple_viewports: false,
            buffer_range_binding: false,
            independent_blend: false,
            structured_buffer: false,
            sampler_anisotropy: false,
            draw_base_vertex: false,
            draw_base_instance: false,
            fill_mode_wireframe: false,
            mipmap_generation: false,
            unaligned_buffer_copy: false,
        }
    }
}

/// Numeric limits of the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceLimits {
    pub uniform_buffer_min_offset_alignment: u32,
    pub structured_buffer_min_offset_alignment: u32,
}

impl Default for DeviceLimits {
    fn default() -> Self {
        DeviceLimits {
            uniform_buffer_min_offset_alignment: 256,
            structured_buffer_min_offset_alignment: 256,
        }
    }
}

impl DeviceLimits {
    /// Minimum offset alignment of buffer bindings of `kind`; 1 for non-buffer kinds.
    pub fn alignment_for(&self, kind: ResourceKind) -> u32 {
        match kind {
            ResourceKind::UniformBuffer => self.uniform_buffer_min_offset_alignment,
            ResourceKind::StructuredBufferReadOnly | ResourceKind::StructuredBufferReadWrite => {
                self.structured_buffer_min_offset_alignment
            }
            ResourceKind::TextureReadOnly
            | ResourceKind::TextureReadWrite
            | ResourceKind::Sampler => 1,
        }
    }
}

/// Synchronization attached to one submission.
#[derive(Debug, Clone, Default)]
pub struct SubmitInfo {
    /// Signaled once the submitted work completes.
    pub fence: Option<Fence>,
    /// Semaphores the submission waits on before executing.
    pub wait_semaphores: Vec<Semaphore>,
    /// Semaphores the submission signals when done.
    pub signal_semaphores: Vec<Semaphore>,
}

impl SubmitInfo {
    pub fn with_fence(fence: &Fence) -> Self {
        SubmitInfo {
            fence: Some(fence.clone()),
            ..Default::default()
        }
    }
}

/// Device-level state shared by every command list recorded against it.
#[derive(Debug)]
pub struct Device {
    features: DeviceFeatures,
    limits: DeviceLimits,
    staging: Arc<StagingMemoryPool>,
    submissions: Arc<SubmissionTracker>,
    semaphores: SemaphoreUsageValidator,
}

impl Device {
    pub fn new(features: DeviceFeatures, limits: DeviceLimits) -> Self {
        logwise::info_sync!(
            "Creating device with features {features}",
            features = LogIt(&features)
        );
        Device {
            features,
            limits,
            staging: Arc::new(StagingMemoryPool::new()),
            submissions: Arc::new(SubmissionTracker::default()),
            semaphores: SemaphoreUsageValidator::default(),
        }
    }
    pub fn features(&self) -> &DeviceFeatures {
        &self.features
    }
    pub fn limits(&self) -> &DeviceLimits {
        &self.limits
    }
    /// Creates resources against this device.
    pub fn factory(&self) -> ResourceFactory<'_> {
        ResourceFactory::new(self)
    }
    /// The staging pool shared by every executor of this device.
    pub fn staging_pool(&self) -> &Arc<StagingMemoryPool> {
        &self.staging
    }
    /// Number of submissions that have not completed yet.
    pub fn pending_submissions(&self) -> u64 {
        self.submissions.pending()
    }

    /// Hands an ended command list to its executor for execution.
    ///
    /// The list moves to [`RecordingState::Executing`] until the executor signals the
    /// [`Completion`] it receives.
    pub fn submit<E: Executor>(
        &self,
        list: &mut CommandList<E>,
        info: SubmitInfo,
    ) -> Result<(), Error> {
        let execution: Arc<ExecutionTracker> = list.execution().clone();
        if VALIDATE_USAGE && list.description().validation {
            let state = execution.state();
            if state != RecordingState::Recorded {
                return Err(UsageError::InvalidState {
                    operation: "submit",
                    state,
                }
                .into());
            }
            for semaphore in &info.wait_semaphores {
                self.semaphores.wait(semaphore)?;
            }
            for semaphore in &info.signal_semaphores {
                self.semaphores.signal(semaphore)?;
            }
        }
        logwise::info_sync!(
            "Submitting command list {name}",
            name = LogIt(&list.name())
        );
        execution.set(RecordingState::Executing);
        let completion = Completion::new(execution, self.submissions.clone(), info.fence);
        list.executor_mut().submit(completion)
    }

    /// Blocks until every submitted command list has completed.
    pub fn wait_for_idle(&self) {
        if self.submissions.pending() == 0 {
            return;
        }
        let interval = logwise::perfwarn_begin!("Device::wait_for_idle");
        self.submissions.wait_for_idle();
        drop(interval);
    }
}
