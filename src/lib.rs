//! Turing Patterns - Interactive reaction-diffusion simulation.
//!
//! This crate simulates two-species reaction-diffusion systems (Gray-Scott,
//! FitzHugh-Nagumo and Gierer-Meinhardt) on a double-buffered 2D grid, with
//! brush editing, procedural and image seeding, a color/post-processing
//! render pipeline and versioned state files.
//!
//! # Architecture
//!
//! - `schema`: Configuration, seed, brush and preset types
//! - `compute`: Grid, stencil kernel, CPU/GPU propagators, brush, seeder, stats
//! - `render`: Palettes, post-processing pipeline, PNG export, frame recorder
//! - `persist`: Saved-state documents and quick saves
//! - `simulation`: The [`Simulation`] facade tying them together
//!
//! # Example
//!
//! ```rust,no_run
//! use turing_patterns::{
//!     schema::{BrushMode, BrushStroke, SeedMode, SeedSpec, SimulationConfig},
//!     Simulation,
//! };
//!
//! let config = SimulationConfig {
//!     width: 256,
//!     height: 256,
//!     seed: SeedSpec::new(SeedMode::RandomSpots, 42.0),
//!     ..Default::default()
//! };
//! let mut sim = Simulation::new(config)?;
//!
//! sim.apply_brush(&BrushStroke::new(0.5, 0.5, 0.05, 1.0, BrushMode::AddActivator));
//! sim.step_n(1000)?;
//!
//! println!("Coverage: {}%", sim.stats_report().coverage);
//! let png = sim.export_frame()?;
//! # Ok::<(), turing_patterns::SimulationError>(())
//! ```

pub mod compute;
pub mod persist;
pub mod render;
pub mod schema;
pub mod simulation;

// WebAssembly bindings (only for wasm32 target)
#[cfg(target_arch = "wasm32")]
pub mod wasm;

// Re-export commonly used types
pub use compute::{CpuPropagator, Propagator, SimulationState, SimulationStats};
pub use schema::{SeedMode, SeedSpec, SimulationConfig, SimulationParams};
pub use simulation::{Simulation, SimulationError};
