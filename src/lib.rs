// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*! slots_and_passes records GPU commands against an abstract executor and translates them
for encoder-based native APIs.

The crate sits between an application and a native graphics API and takes care of the
parts every backend gets wrong in its own way:

| Concern                | Where                                   | What it does                                                                  |
|------------------------|-----------------------------------------|-------------------------------------------------------------------------------|
| Recording state        | [`command::CommandList`]                | Initial, recording, recorded, executing, completed; validated transitions     |
| Usage validation       | [`command::UsageError`]                 | Every command is checked against pass state, features, usages and layouts     |
| Redundant binds        | [`bindings::bound::BoundResourceCache`] | A rebind of the same set with the same dynamic offsets never reaches a backend |
| Slot allocation        | [`bindings::layout`]                    | Flat buffer, texture and sampler tables per pipeline                          |
| Encoder lifecycle      | [`imp::SlotEncoderExecutor`]            | One open encoder at a time, lazily flushed state, folded clears               |
| Upload memory          | [`staging::StagingMemoryPool`]          | Best-fit reuse of CPU-visible blocks                                          |
| Synchronization        | [`device`]                              | Fences, semaphore usage checks, submission tracking, wait for idle             |

# Recording

A [`command::CommandList`] wraps an [`command::Executor`]. Commands are validated and
then forwarded, so an executor only ever sees legal, non-redundant work.

```
use slots_and_passes::command::{CommandListDescription, RecordingState};
use slots_and_passes::device::{Device, DeviceFeatures, DeviceLimits, SubmitInfo};
use slots_and_passes::imp::{EncoderLifecycle, RecordingEncoder, SlotEncoderExecutor};

let device = Device::new(DeviceFeatures::all(), DeviceLimits::default());
let executor = SlotEncoderExecutor::new(RecordingEncoder::new(), EncoderLifecycle::Deferred, &device);
let mut list = device
    .factory()
    .create_command_list(CommandListDescription::default(), executor, "frame");
list.begin().unwrap();
list.push_debug_group("frame").unwrap();
list.pop_debug_group().unwrap();
list.end().unwrap();
device.submit(&mut list, SubmitInfo::default()).unwrap();
device.wait_for_idle();
assert_eq!(list.state(), RecordingState::Completed);
```

# Backends

The [`imp::RecordingEncoder`] backend records native calls and needs no GPU. With the
`backend_wgpu` feature, `imp::wgpu` provides an executor over [wgpu](https://wgpu.rs).
*/

logwise::declare_logging_domain!();

pub mod bindings;
pub mod command;
pub mod device;
pub mod imp;
pub mod pass;
pub mod pipeline;
pub mod pixel_formats;
pub mod staging;
