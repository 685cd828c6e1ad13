// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
use crate::device::{DeviceFeatures, DeviceLimits};
use crate::imp::wgpu::Error;
use std::sync::Arc;
#[cfg(not(target_arch = "wasm32"))]
use std::sync::atomic::{AtomicBool, Ordering};
#[cfg(not(target_arch = "wasm32"))]
use std::sync::mpsc::{self, Receiver, Sender};
#[cfg(not(target_arch = "wasm32"))]
use std::thread::{self, JoinHandle};
#[cfg(not(target_arch = "wasm32"))]
use wgpu::PollType;
use wgpu::{Limits, Trace};

#[derive(Debug)]
struct ContextResources {
    device: wgpu::Device,
    queue: wgpu::Queue,
    #[cfg(not(target_arch = "wasm32"))]
    poll_thread: Option<JoinHandle<()>>,
    #[cfg(not(target_arch = "wasm32"))]
    poll_shutdown: Arc<AtomicBool>,
    #[cfg(not(target_arch = "wasm32"))]
    poll_trigger: Sender<()>,
}

/// A wgpu device and queue, plus the machinery that drives their completion callbacks.
///
/// Cloning shares the same device.
#[derive(Debug, Clone)]
pub struct WgpuContext {
    resources: Arc<ContextResources>,
}

impl WgpuContext {
    /// Requests a device from `adapter`.
    pub async fn request(adapter: &wgpu::Adapter) -> Result<Self, Error> {
        let mut limits = Limits::downlevel_webgl2_defaults();
        //webGL enforces these, and the defaults are small
        limits.max_texture_dimension_1d = 4096;
        limits.max_texture_dimension_2d = 4096;
        let descriptor = wgpu::DeviceDescriptor {
            label: Some("slots_and_passes device"),
            required_features: adapter.features() & wgpu::Features::POLYGON_MODE_LINE,
            required_limits: limits,
            memory_hints: Default::default(),
            trace: Trace::Off,
        };
        let (device, queue) = adapter.request_device(&descriptor).await?;
        Self::new(device, queue)
    }

    /// Wraps a device the application created itself.
    pub fn new(device: wgpu::Device, queue: wgpu::Queue) -> Result<Self, Error> {
        #[cfg(not(target_arch = "wasm32"))]
        {
            let poll_device = device.clone();
            let poll_shutdown = Arc::new(AtomicBool::new(false));
            let shutdown_clone = poll_shutdown.clone();
            let (poll_sender, poll_receiver): (Sender<()>, Receiver<()>) = mpsc::channel();
            let poll_thread = thread::Builder::new()
                .name("wgpu_poll".to_string())
                .spawn(move || {
                    while !shutdown_clone.load(Ordering::Relaxed) {
                        match poll_receiver.recv() {
                            //poll until the queue is empty
                            Ok(_) => {
                                let _ = poll_device.poll(PollType::Wait);
                            }
                            Err(_) => break,
                        }
                    }
                })
                .map_err(Error::PollThread)?;
            Ok(WgpuContext {
                resources: Arc::new(ContextResources {
                    device,
                    queue,
                    poll_thread: Some(poll_thread),
                    poll_shutdown,
                    poll_trigger: poll_sender,
                }),
            })
        }
        #[cfg(target_arch = "wasm32")]
        {
            //the browser drives callbacks from its own event loop
            Ok(WgpuContext {
                resources: Arc::new(ContextResources { device, queue }),
            })
        }
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.resources.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.resources.queue
    }

    /// Wakes the poll thread so completion callbacks of submitted work run.
    pub fn set_needs_poll(&self) {
        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = self.resources.poll_trigger.send(());
        }
    }

    /// The features this device supports.
    pub fn device_features(&self) -> DeviceFeatures {
        let native = self.resources.device.features();
        DeviceFeatures {
            compute_shader: true,
            draw_indirect: true,
            //a render pass has a single viewport and scissor rect
            multiple_viewports: false,
            buffer_range_binding: true,
            independent_blend: true,
            structured_buffer: true,
            sampler_anisotropy: true,
            draw_base_vertex: true,
            draw_base_instance: true,
            fill_mode_wireframe: native.contains(wgpu::Features::POLYGON_MODE_LINE),
            mipmap_generation: false,
            //copy_buffer_to_buffer needs 4-byte aligned offsets and sizes
            unaligned_buffer_copy: false,
        }
    }

    pub fn device_limits(&self) -> DeviceLimits {
        let native = self.resources.device.limits();
        DeviceLimits {
            uniform_buffer_min_offset_alignment: native.min_uniform_buffer_offset_alignment,
            structured_buffer_min_offset_alignment: native.min_storage_buffer_offset_alignment,
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Drop for ContextResources {
    fn drop(&mut self) {
        self.poll_shutdown.store(true, Ordering::Relaxed);
        //wake the thread so it observes the shutdown
        let _ = self.poll_trigger.send(());
        if let Some(handle) = self.poll_thread.take() {
            let _ = handle.join();
        }
    }
}
