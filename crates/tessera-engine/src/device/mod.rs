//! GPU device + surface management.
//!
//! This module is responsible for:
//! - acquiring surface, adapter, device, surface configuration and pipeline once,
//!   in order, on a background thread
//! - publishing the finished [`GpuContext`] behind a readiness signal
//! - acquiring, encoding and submitting frames through the [`Platform`] seam

mod error;
mod init;
mod initialize;
mod manager;
mod platform;
mod slots;
mod surface;
mod wgpu_platform;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{BoxError, GpuError, Resource};
pub use init::GpuInit;
pub use initialize::initialize;
pub use manager::{GpuContextManager, InitState, READY_POLL_INTERVAL, Readiness};
pub use platform::{PipelineDesc, Platform};
pub use slots::{ContextSlots, GpuContext};
pub use wgpu_platform::{WgpuDevice, WgpuFrame, WgpuPlatform};
