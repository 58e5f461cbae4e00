//! Persist module - Saved-state documents and named quick saves.

#[cfg(not(target_arch = "wasm32"))]
mod quick_save;
mod state_file;

#[cfg(not(target_arch = "wasm32"))]
pub use quick_save::*;
pub use state_file::*;

/// Errors raised while reading or writing persisted data.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("Invalid state JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported state version {0}")]
    UnsupportedVersion(u32),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Saved grid has {actual} floats, expected {expected}")]
    GridLength { expected: usize, actual: usize },
}
