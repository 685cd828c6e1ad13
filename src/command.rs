// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
Command recording.

A [`CommandList`] is the backend-agnostic recording surface. It owns an [`Executor`]
and forwards every command to it after validating the call against the recording
state machine and the device's features. Resource-set binds are diffed against a
per-slot [`BoundResourceCache`](crate::bindings::bound::BoundResourceCache), so an
identical rebind never reaches the executor.

```
use slots_and_passes::command::{CommandListDescription, RecordingState, SpyExecutor};
use slots_and_passes::device::{Device, DeviceFeatures, DeviceLimits};

let device = Device::new(DeviceFeatures::all(), DeviceLimits::default());
let mut list = device.factory().create_command_list(CommandListDescription::default(), SpyExecutor::new(), "list");
list.begin().unwrap();
list.end().unwrap();
assert_eq!(list.state(), RecordingState::Recorded);
```
*/

pub(crate) mod execution_tracking;
mod executor;
mod list;
mod spy;
mod validation;

pub use executor::{
    BufferCopy, DispatchArgs, DrawArgs, DrawIndexedArgs, Executor, INDIRECT_DISPATCH_SIZE,
    INDIRECT_DRAW_INDEXED_SIZE, INDIRECT_DRAW_SIZE, IndexFormat, IndirectArgs, TextureCopy,
};
pub use list::{CommandList, CommandListDescription};
pub use spy::{SpyCall, SpyExecutor};
pub use validation::{RecordingState, UsageError, VALIDATE_USAGE, illegal_value};

use crate::staging::StagingError;

/// Errors returned by recording operations.
#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Usage(#[from] UsageError),
    #[error(transparent)]
    Staging(#[from] StagingError),
}
