//! Schema module - Configuration, seed and preset types for reaction-diffusion simulations.

mod config;
mod preset;
mod seed;

pub use config::*;
pub use preset::*;
pub use seed::*;
