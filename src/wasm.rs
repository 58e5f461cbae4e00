//! WebAssembly bindings for Turing Patterns.
//!
//! Provides a thin wrapper around [`Simulation`] for browser environments.
//! Enum-valued arguments use the numeric ids of the control surface.

use wasm_bindgen::prelude::*;

use crate::{
    schema::{
        BrushMode, BrushStroke, PRESETS, ParamsPatch, RenderSettings, SeedMode, SeedSpec,
        SimulationConfig,
    },
    simulation::Simulation,
};

/// Initialize WASM module with panic hook and logging.
#[wasm_bindgen(start)]
pub fn init() {
    // Set panic hook for better error messages in browser
    console_error_panic_hook::set_once();

    // Initialize WASM logger
    wasm_logger::init(wasm_logger::Config::default());
}

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn stroke(x: f32, y: f32, radius: f32, strength: f32, mode: u8) -> Result<BrushStroke, JsValue> {
    let mode = BrushMode::try_from(mode).map_err(js_error)?;
    Ok(BrushStroke::new(x, y, radius, strength, mode))
}

/// WebAssembly wrapper for a reaction-diffusion simulation.
#[wasm_bindgen]
pub struct WasmSimulation {
    sim: Simulation,
}

#[wasm_bindgen]
impl WasmSimulation {
    /// Create a simulation from a JSON `SimulationConfig`.
    ///
    /// An empty string uses the defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<WasmSimulation, JsValue> {
        let config: SimulationConfig = if config_json.trim().is_empty() {
            SimulationConfig::default()
        } else {
            serde_json::from_str(config_json)
                .map_err(|e| JsValue::from_str(&format!("Invalid config JSON: {e}")))?
        };
        let sim = Simulation::new(config).map_err(js_error)?;
        Ok(WasmSimulation { sim })
    }

    /// Merge a partial parameter object (`{ feed, kill, Du, Dv, dt, model, boundary, stepsPerFrame }`).
    #[wasm_bindgen(js_name = setParams)]
    pub fn set_params(&mut self, patch: JsValue) -> Result<(), JsValue> {
        let patch: ParamsPatch = serde_wasm_bindgen::from_value(patch).map_err(js_error)?;
        self.sim.set_params(&patch);
        Ok(())
    }

    #[wasm_bindgen(js_name = getParams)]
    pub fn get_params(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(self.sim.params()).map_err(js_error)
    }

    #[wasm_bindgen(js_name = setRenderSettings)]
    pub fn set_render_settings(&mut self, settings: JsValue) -> Result<(), JsValue> {
        let settings: RenderSettings = serde_wasm_bindgen::from_value(settings).map_err(js_error)?;
        self.sim.set_render_settings(settings);
        Ok(())
    }

    #[wasm_bindgen]
    pub fn seed(&mut self, mode: u8, value: f32) -> Result<(), JsValue> {
        let mode = SeedMode::try_from(mode).map_err(js_error)?;
        self.sim.seed(SeedSpec::new(mode, value)).map_err(js_error)
    }

    #[wasm_bindgen]
    pub fn step(&mut self) -> Result<(), JsValue> {
        self.sim.step().map_err(js_error)
    }

    #[wasm_bindgen(js_name = stepN)]
    pub fn step_n(&mut self, count: u32) -> Result<(), JsValue> {
        self.sim.step_n(count as u64).map_err(js_error)
    }

    /// Run `stepsPerFrame` steps.
    #[wasm_bindgen(js_name = advanceFrame)]
    pub fn advance_frame(&mut self) -> Result<(), JsValue> {
        self.sim.advance_frame().map_err(js_error)
    }

    #[wasm_bindgen(js_name = applyBrush)]
    pub fn apply_brush(
        &mut self,
        x: f32,
        y: f32,
        radius: f32,
        strength: f32,
        mode: u8,
    ) -> Result<(), JsValue> {
        self.sim.apply_brush(&stroke(x, y, radius, strength, mode)?);
        Ok(())
    }

    #[wasm_bindgen(js_name = beginStroke)]
    pub fn begin_stroke(
        &mut self,
        x: f32,
        y: f32,
        radius: f32,
        strength: f32,
        mode: u8,
    ) -> Result<(), JsValue> {
        self.sim.begin_stroke(&stroke(x, y, radius, strength, mode)?);
        Ok(())
    }

    #[wasm_bindgen(js_name = continueStroke)]
    pub fn continue_stroke(
        &mut self,
        x: f32,
        y: f32,
        radius: f32,
        strength: f32,
        mode: u8,
    ) -> Result<(), JsValue> {
        self.sim.continue_stroke(&stroke(x, y, radius, strength, mode)?);
        Ok(())
    }

    #[wasm_bindgen(js_name = endStroke)]
    pub fn end_stroke(&mut self) {
        self.sim.end_stroke();
    }

    #[wasm_bindgen]
    pub fn resize(&mut self, width: usize, height: usize) -> Result<(), JsValue> {
        self.sim.resize(width, height).map_err(js_error)
    }

    #[wasm_bindgen(js_name = readState)]
    pub fn read_state(&self) -> Vec<f32> {
        self.sim.read_state()
    }

    #[wasm_bindgen(js_name = writeState)]
    pub fn write_state(&mut self, data: &[f32]) -> Result<(), JsValue> {
        self.sim.write_state(data).map_err(js_error)
    }

    /// Formatted statistics. Never throws; failures report `available: false`.
    #[wasm_bindgen(js_name = computeStats)]
    pub fn compute_stats(&self) -> JsValue {
        let report = self.sim.stats_report();
        serde_wasm_bindgen::to_value(&report).unwrap_or(JsValue::NULL)
    }

    /// Render the grid and return RGBA8 pixels, top row first.
    #[wasm_bindgen]
    pub fn render(&mut self) -> Vec<u8> {
        self.sim.render().to_rgba8()
    }

    /// Render the grid and return PNG bytes.
    #[wasm_bindgen(js_name = exportFrame)]
    pub fn export_frame(&mut self) -> Result<Vec<u8>, JsValue> {
        self.sim.export_frame().map_err(js_error)
    }

    #[wasm_bindgen(js_name = saveState)]
    pub fn save_state(&self) -> Result<String, JsValue> {
        self.sim.save_state().map_err(js_error)
    }

    #[wasm_bindgen(js_name = loadState)]
    pub fn load_state(&mut self, json: &str) -> Result<(), JsValue> {
        self.sim.load_saved(json).map_err(js_error)
    }

    /// Decode a png or jpeg and use it as the initial state.
    #[wasm_bindgen(js_name = seedFromImage)]
    pub fn seed_from_image(&mut self, bytes: &[u8]) -> Result<(), JsValue> {
        self.sim.seed_from_image(bytes).map_err(js_error)
    }

    #[wasm_bindgen(js_name = applyPreset)]
    pub fn apply_preset(&mut self, key: &str) -> Result<(), JsValue> {
        self.sim.apply_preset(key).map_err(js_error)
    }

    /// Apply random Gray-Scott parameters; returns `{ seed, feed, kill, seed_mode }`.
    #[wasm_bindgen(js_name = applyRandom)]
    pub fn apply_random(&mut self, seed: u32) -> Result<JsValue, JsValue> {
        let random = self.sim.apply_random(seed as u64).map_err(js_error)?;
        serde_wasm_bindgen::to_value(&random).map_err(js_error)
    }

    #[wasm_bindgen(js_name = getStep)]
    pub fn get_step(&self) -> u64 {
        self.sim.state().step
    }

    #[wasm_bindgen(js_name = getWidth)]
    pub fn get_width(&self) -> usize {
        self.sim.width()
    }

    #[wasm_bindgen(js_name = getHeight)]
    pub fn get_height(&self) -> usize {
        self.sim.height()
    }
}

/// Preset keys in menu order.
#[wasm_bindgen(js_name = presetKeys)]
pub fn preset_keys() -> Vec<String> {
    PRESETS.iter().map(|p| p.key.to_string()).collect()
}
