//! GPU Compute Backend for reaction-diffusion stepping.
//!
//! Provides GPU-accelerated simulation using WebGPU (wgpu).

mod propagator;

pub use propagator::GpuPropagator;

/// Error type for GPU operations.
#[derive(Debug, thiserror::Error)]
pub enum GpuError {
    #[error("No suitable GPU adapter found")]
    NoAdapter,

    #[error("Failed to request GPU device: {0}")]
    DeviceRequest(#[from] wgpu::RequestDeviceError),

    #[error("Buffer mapping failed: {0}")]
    BufferMap(#[from] wgpu::BufferAsyncError),

    #[error("GPU readback did not complete")]
    Readback,

    #[error("Grid of {bytes} bytes exceeds the device storage limit of {limit} bytes")]
    GridTooLarge { bytes: u64, limit: u64 },
}
