//! Simulation facade - owns the state, parameters, backend and render targets.
//!
//! Every mutating operation takes `&mut self`, so stepping, brushing, seeding
//! and resizing can never interleave.

#[cfg(not(target_arch = "wasm32"))]
use std::sync::mpsc;

use crate::compute::{
    BrushPath, CpuPropagator, GridError, ImageSeed, Propagator, PropagatorError, SeedError, Seeder,
    SimulationState, SimulationStats, StatsReport, apply_brush,
};
use crate::persist::{PersistError, SavedState};
use crate::render::{Frame, RenderError, RenderPipeline, export_png};
use crate::schema::{
    BrushStroke, ConfigError, ParamsPatch, Preset, RandomParams, RenderSettings, SeedSpec,
    SimulationConfig, SimulationParams, random_gray_scott,
};

/// Errors surfaced by [`Simulation`].
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Grid(#[from] GridError),

    #[error(transparent)]
    Propagator(#[from] PropagatorError),

    #[error(transparent)]
    Seed(#[from] SeedError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Persist(#[from] PersistError),
}

/// An image decode running on a worker thread.
#[cfg(not(target_arch = "wasm32"))]
struct PendingImage {
    rx: mpsc::Receiver<Result<ImageSeed, SeedError>>,
    width: usize,
    height: usize,
}

/// A running reaction-diffusion simulation.
pub struct Simulation {
    config: SimulationConfig,
    params: SimulationParams,
    render_settings: RenderSettings,
    state: SimulationState,
    propagator: Box<dyn Propagator>,
    pipeline: RenderPipeline,
    seed_spec: SeedSpec,
    brush_path: BrushPath,
    #[cfg(not(target_arch = "wasm32"))]
    pending_image: Option<PendingImage>,
}

impl Simulation {
    /// Create a CPU-backed simulation seeded from `config.seed`.
    pub fn new(config: SimulationConfig) -> Result<Self, SimulationError> {
        Self::with_propagator(config, Box::new(CpuPropagator::new()))
    }

    /// Create a simulation stepped by the given backend.
    pub fn with_propagator(
        config: SimulationConfig,
        propagator: Box<dyn Propagator>,
    ) -> Result<Self, SimulationError> {
        config.validate()?;
        let state = SimulationState::new(config.width, config.height)?;

        log::info!(
            "Creating {}x{} simulation ({} backend)",
            config.width,
            config.height,
            propagator.name()
        );

        let mut sim = Self {
            params: config.params,
            render_settings: config.render.clone(),
            seed_spec: config.seed,
            state,
            propagator,
            pipeline: RenderPipeline::new(config.width, config.height),
            brush_path: BrushPath::new(),
            #[cfg(not(target_arch = "wasm32"))]
            pending_image: None,
            config,
        };
        sim.seed(sim.seed_spec)?;
        Ok(sim)
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn width(&self) -> usize {
        self.state.width
    }

    pub fn height(&self) -> usize {
        self.state.height
    }

    /// Seed spec of the last procedural seed.
    pub fn seed_spec(&self) -> SeedSpec {
        self.seed_spec
    }

    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    /// Merge a partial parameter update. Values are not range-checked.
    pub fn set_params(&mut self, patch: &ParamsPatch) {
        self.params.apply(patch);
        log::debug!("Parameters now {:?}", self.params);
    }

    pub fn render_settings(&self) -> &RenderSettings {
        &self.render_settings
    }

    pub fn set_render_settings(&mut self, settings: RenderSettings) {
        self.render_settings = settings;
    }

    /// Replace the grid with a procedural initial state.
    ///
    /// Discards any pending image decode.
    pub fn seed(&mut self, spec: SeedSpec) -> Result<(), SimulationError> {
        let cells = Seeder::new(self.state.width, self.state.height).generate(spec);
        self.state.fill_both(&cells)?;
        self.seed_spec = spec;
        self.discard_pending_image();
        log::info!("Seeded with {:?} (value {})", spec.mode, spec.value);
        Ok(())
    }

    pub fn step(&mut self) -> Result<(), SimulationError> {
        self.propagator.step(&mut self.state, &self.params)?;
        Ok(())
    }

    pub fn step_n(&mut self, steps: u64) -> Result<(), SimulationError> {
        if steps == 0 {
            return Ok(());
        }
        self.propagator.run(&mut self.state, &self.params, steps)?;
        log::debug!(
            "Ran {} steps on {} (step {})",
            steps,
            self.propagator.name(),
            self.state.step
        );
        Ok(())
    }

    /// Run one frame's worth of steps (`stepsPerFrame`).
    pub fn advance_frame(&mut self) -> Result<(), SimulationError> {
        self.step_n(self.params.steps_per_frame as u64)
    }

    /// Stamp the brush once.
    pub fn apply_brush(&mut self, stroke: &BrushStroke) {
        apply_brush(&mut self.state, stroke);
    }

    /// Start a drag stroke and stamp its first point.
    pub fn begin_stroke(&mut self, stroke: &BrushStroke) {
        let (x, y) = self.brush_path.begin(stroke.x, stroke.y);
        apply_brush(&mut self.state, &stroke.at(x, y));
    }

    /// Continue a drag stroke, stamping evenly spaced points along the segment.
    ///
    /// Does nothing unless a stroke was begun.
    pub fn continue_stroke(&mut self, stroke: &BrushStroke) {
        for (x, y) in self.brush_path.move_to(stroke.x, stroke.y, stroke.radius) {
            apply_brush(&mut self.state, &stroke.at(x, y));
        }
    }

    pub fn end_stroke(&mut self) {
        self.brush_path.end();
    }

    /// Reallocate the grid and reseed it with the last seed spec.
    ///
    /// A no-op when the size is unchanged. On allocation failure the current
    /// grid is kept.
    pub fn resize(&mut self, width: usize, height: usize) -> Result<(), SimulationError> {
        if width == self.state.width && height == self.state.height {
            return Ok(());
        }
        let state = SimulationState::new(width, height)?;

        log::info!(
            "Resizing {}x{} -> {}x{}",
            self.state.width,
            self.state.height,
            width,
            height
        );
        self.state = state;
        self.config.width = width;
        self.config.height = height;
        self.brush_path.end();
        self.seed(self.seed_spec)
    }

    /// Flat `(u, v, obstacle, reserved)` copy of the current grid.
    pub fn read_state(&self) -> Vec<f32> {
        self.state.to_flat()
    }

    /// Replace the grid from a flat array. The grid is untouched on error.
    pub fn write_state(&mut self, data: &[f32]) -> Result<(), SimulationError> {
        let cells = self.state.cells_from_flat(data)?;
        self.state.fill_both(&cells)?;
        Ok(())
    }

    pub fn compute_stats(&self) -> SimulationStats {
        SimulationStats::from_state(&self.state)
    }

    pub fn stats_report(&self) -> StatsReport {
        self.compute_stats().report()
    }

    /// Decode an image and use it as the initial state.
    ///
    /// On decode failure the current grid is kept.
    pub fn seed_from_image(&mut self, bytes: &[u8]) -> Result<(), SimulationError> {
        let seed = ImageSeed::from_bytes(bytes, self.state.width, self.state.height)
            .inspect_err(|e| log::warn!("Image seed rejected: {}", e))?;
        self.commit_image(&seed)
    }

    fn commit_image(&mut self, seed: &ImageSeed) -> Result<(), SimulationError> {
        self.state.fill_both(&seed.to_cells())?;
        self.discard_pending_image();
        log::info!("Seeded from {}x{} image", self.state.width, self.state.height);
        Ok(())
    }

    /// Start decoding an image on a worker thread.
    ///
    /// The result is committed by [`Simulation::poll_image_seed`]. Replaces any
    /// earlier pending decode.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_image_seed(&mut self, bytes: Vec<u8>) {
        let (tx, rx) = mpsc::channel();
        let (width, height) = (self.state.width, self.state.height);
        std::thread::spawn(move || {
            let _ = tx.send(ImageSeed::from_bytes(&bytes, width, height));
        });
        self.pending_image = Some(PendingImage { rx, width, height });
    }

    /// Commit a finished image decode, if one is ready.
    ///
    /// Returns `Ok(true)` when the grid was replaced. Call between frames.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn poll_image_seed(&mut self) -> Result<bool, SimulationError> {
        let Some(pending) = &self.pending_image else {
            return Ok(false);
        };

        let result = match pending.rx.try_recv() {
            Ok(result) => result,
            Err(mpsc::TryRecvError::Empty) => return Ok(false),
            Err(mpsc::TryRecvError::Disconnected) => Err(SeedError::WorkerLost),
        };
        let stale = (pending.width, pending.height) != (self.state.width, self.state.height);
        self.pending_image = None;

        match result {
            Ok(seed) if !stale => {
                self.commit_image(&seed)?;
                Ok(true)
            }
            Ok(_) => Ok(false),
            Err(e) => {
                log::warn!("Image seed rejected: {}", e);
                Err(e.into())
            }
        }
    }

    /// True while a background image decode is outstanding.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn has_pending_image(&self) -> bool {
        self.pending_image.is_some()
    }

    fn discard_pending_image(&mut self) {
        #[cfg(not(target_arch = "wasm32"))]
        {
            self.pending_image = None;
        }
    }

    /// Serialize the parameters and grid as a version 1 state document.
    pub fn save_state(&self) -> Result<String, SimulationError> {
        let saved = SavedState::new(self.params.into(), Some(self.state.to_flat()));
        Ok(saved.to_json()?)
    }

    /// Load a state document. Nothing changes unless the whole document is valid.
    pub fn load_saved(&mut self, json: &str) -> Result<(), SimulationError> {
        let saved = SavedState::from_json(json).inspect_err(|e| log::warn!("State load rejected: {}", e))?;

        let cells = match &saved.grid {
            Some(grid) => Some(self.state.cells_from_flat(grid).map_err(|_| {
                let err = PersistError::GridLength {
                    expected: self.state.grid_size() * crate::compute::CELL_FLOATS,
                    actual: grid.len(),
                };
                log::warn!("State load rejected: {}", err);
                err
            })?),
            None => None,
        };

        self.params.apply(&saved.params);
        if let Some(cells) = cells {
            self.state.fill_both(&cells)?;
            self.discard_pending_image();
        }
        log::info!("Loaded state saved at {}", saved.timestamp);
        Ok(())
    }

    /// Apply a built-in preset and reseed with its preferred mode.
    pub fn apply_preset(&mut self, key: &str) -> Result<(), SimulationError> {
        let preset = Preset::find(key).ok_or_else(|| ConfigError::UnknownPreset(key.to_string()))?;
        self.set_params(&preset.params_patch());
        self.seed(SeedSpec::new(preset.seed_mode, self.seed_spec.value))
    }

    /// Apply randomly chosen Gray-Scott parameters and reseed.
    pub fn apply_random(&mut self, seed: u64) -> Result<RandomParams, SimulationError> {
        let random = random_gray_scott(seed);
        self.set_params(&random.params_patch());
        self.seed(SeedSpec::new(random.seed_mode, self.seed_spec.value))?;
        Ok(random)
    }

    /// Render the current grid through the color and post-processing stages.
    pub fn render(&mut self) -> &Frame {
        self.pipeline.render(&self.state, &self.render_settings)
    }

    /// Render and encode the frame as PNG.
    pub fn export_frame(&mut self) -> Result<Vec<u8>, SimulationError> {
        Ok(export_png(self.render())?)
    }
}
