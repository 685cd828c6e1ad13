// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("can't create the wgpu device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
    #[error("can't spawn the wgpu poll thread: {0}")]
    PollThread(#[source] std::io::Error),
}
