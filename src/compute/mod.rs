//! Compute module - Numerical computation for reaction-diffusion.

mod brush;
mod grid;
mod kernel;
mod propagator;
mod seeder;
mod stats;

#[cfg(not(target_arch = "wasm32"))]
pub mod gpu;

pub use brush::*;
pub use grid::*;
pub use kernel::*;
pub use propagator::*;
pub use seeder::*;
pub use stats::*;
