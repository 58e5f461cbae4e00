//! CPU Propagator - advances the double-buffered state with the shared kernel.

use crate::schema::SimulationParams;

#[cfg(not(target_arch = "wasm32"))]
use rayon::prelude::*;

use super::{SimulationState, StepKernel};

/// Backend seam for stepping the simulation.
///
/// Implementations must read only the current buffer and write only the
/// scratch buffer, then flip, so results do not depend on evaluation order.
pub trait Propagator {
    /// Advance the state by `steps` timesteps with the given parameters.
    fn run(
        &mut self,
        state: &mut SimulationState,
        params: &SimulationParams,
        steps: u64,
    ) -> Result<(), PropagatorError>;

    /// Advance the state by one timestep.
    fn step(
        &mut self,
        state: &mut SimulationState,
        params: &SimulationParams,
    ) -> Result<(), PropagatorError> {
        self.run(state, params, 1)
    }

    /// Short backend name for logs.
    fn name(&self) -> &'static str;
}

/// Errors raised while stepping on a backend.
#[derive(Debug, thiserror::Error)]
pub enum PropagatorError {
    #[cfg(not(target_arch = "wasm32"))]
    #[error("GPU step failed: {0}")]
    Gpu(#[from] super::gpu::GpuError),
}

/// CPU-based reaction-diffusion propagator.
#[derive(Debug, Default, Clone, Copy)]
pub struct CpuPropagator;

impl CpuPropagator {
    /// Create new propagator.
    pub fn new() -> Self {
        Self
    }

    /// Perform one simulation step.
    pub fn step_state(&self, state: &mut SimulationState, params: &SimulationParams) {
        let kernel = StepKernel::new(params);
        let width = state.width;
        let height = state.height;

        let (read, write) = state.split();

        #[cfg(not(target_arch = "wasm32"))]
        {
            // Native: rows are independent, each reads only the previous buffer
            write
                .par_chunks_mut(width)
                .enumerate()
                .for_each(|(y, row)| kernel.update_row(read, width, height, y, row));
        }

        #[cfg(target_arch = "wasm32")]
        {
            for (y, row) in write.chunks_mut(width).enumerate() {
                kernel.update_row(read, width, height, y, row);
            }
        }

        state.swap();
        state.advance(params.dt);
    }
}

impl Propagator for CpuPropagator {
    fn run(
        &mut self,
        state: &mut SimulationState,
        params: &SimulationParams,
        steps: u64,
    ) -> Result<(), PropagatorError> {
        for _ in 0..steps {
            self.step_state(state, params);
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "cpu"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::{Cell, Seeder};
    use crate::schema::{Boundary, Model, SeedMode, SeedSpec};

    fn seeded(width: usize, height: usize, spec: SeedSpec) -> SimulationState {
        let mut state = SimulationState::new(width, height).unwrap();
        let cells = Seeder::new(width, height).generate(spec);
        state.fill_both(&cells).unwrap();
        state
    }

    #[test]
    fn test_clear_grid_stays_at_baseline() {
        let params = SimulationParams {
            model: Model::GrayScott,
            feed: 0.055,
            kill: 0.062,
            dt: 1.0,
            du: 1.0,
            dv: 0.5,
            boundary: Boundary::Wrap,
            ..Default::default()
        };
        let mut state = seeded(4, 4, SeedSpec::new(SeedMode::Clear, 0.0));
        let mut propagator = CpuPropagator::new();
        propagator.run(&mut state, &params, 100).unwrap();

        assert_eq!(state.step, 100);
        for cell in state.current() {
            assert_eq!(cell.u, 1.0);
            assert_eq!(cell.v, 0.0);
        }
    }

    #[test]
    fn test_clear_grid_stable_every_model_and_boundary() {
        for boundary in [Boundary::Wrap, Boundary::Reflect, Boundary::Fixed] {
            let params = SimulationParams {
                boundary,
                ..Default::default()
            };
            let mut state = seeded(7, 5, SeedSpec::new(SeedMode::Clear, 0.0));
            CpuPropagator::new().run(&mut state, &params, 20).unwrap();
            assert!(state.current().iter().all(|c| c.u == 1.0 && c.v == 0.0));
        }
    }

    #[test]
    fn test_deterministic_runs() {
        let params = SimulationParams::default();
        let spec = SeedSpec::new(SeedMode::RandomSpots, 4242.0);

        let mut a = seeded(48, 32, spec);
        let mut b = seeded(48, 32, spec);
        CpuPropagator::new().run(&mut a, &params, 50).unwrap();
        CpuPropagator::new().run(&mut b, &params, 50).unwrap();

        assert_eq!(a.current(), b.current());
    }

    #[test]
    fn test_obstacles_frozen() {
        let params = SimulationParams::default();
        let mut state = seeded(16, 16, SeedSpec::new(SeedMode::CenterSquare, 7.0));
        let mut cells = state.current().to_vec();
        for y in 6..10 {
            cells[y * 16 + 8] = Cell::new(0.3, 0.6, 1.0);
        }
        state.fill_both(&cells).unwrap();

        CpuPropagator::new().run(&mut state, &params, 25).unwrap();

        for y in 6..10 {
            assert_eq!(state.get(8, y), Cell::new(0.3, 0.6, 1.0));
        }
    }

    #[test]
    fn test_pattern_grows_from_center_seed() {
        let params = SimulationParams::default();
        let mut state = seeded(64, 64, SeedSpec::new(SeedMode::CenterSquare, 1.0));
        CpuPropagator::new().run(&mut state, &params, 200).unwrap();

        let active = state.current().iter().filter(|c| c.v > 0.1).count();
        assert!(active > 0, "reaction died out");
        assert!(state
            .current()
            .iter()
            .all(|c| (0.0..=1.0).contains(&c.u) && (0.0..=1.0).contains(&c.v)));
    }

    #[test]
    fn test_step_flips_buffer() {
        let mut state = seeded(4, 4, SeedSpec::new(SeedMode::Clear, 0.0));
        let before = state.current_index();
        CpuPropagator::new()
            .step(&mut state, &SimulationParams::default())
            .unwrap();
        assert_ne!(state.current_index(), before);
        assert_eq!(state.step, 1);
    }
}
