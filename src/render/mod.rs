//! Render module - Color mapping, post-processing and frame export.

mod export;
mod palette;
mod pipeline;
mod recorder;

pub use export::*;
pub use palette::*;
pub use pipeline::*;
pub use recorder::*;

/// Errors raised while encoding rendered frames.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Failed to encode frame: {0}")]
    Encode(#[from] image::ImageError),

    #[error("Frame buffer does not match {width}x{height}")]
    FrameSize { width: usize, height: usize },
}
