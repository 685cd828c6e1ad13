// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Native backends.
//!
//! [`SlotEncoderExecutor`] drives any encoder-based API implementing [`NativeEncoderApi`].
//! [`RecordingEncoder`] is such an API that only records what it was asked to do; it is
//! the backend used without a GPU. The wgpu executor is available behind the
//! `backend_wgpu` feature.

mod native;
mod record;
mod slot_encoder;
#[cfg(feature = "backend_wgpu")]
pub mod wgpu;

pub use native::{EncoderKind, IndexedDraw, NativeEncoderApi, RenderStage};
pub use record::{NativeCall, RecordedPass, RecordingEncoder};
pub use slot_encoder::{EncoderLifecycle, SlotEncoderExecutor};
