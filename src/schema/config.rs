//! Configuration types for reaction-diffusion parameters and rendering.

use serde::{Deserialize, Serialize};

use super::SeedSpec;

/// Reaction model evaluated by the kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Model {
    #[default]
    GrayScott = 0,
    FitzHughNagumo = 1,
    GiererMeinhardt = 2,
}

impl TryFrom<u8> for Model {
    type Error = ConfigError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        match id {
            0 => Ok(Model::GrayScott),
            1 => Ok(Model::FitzHughNagumo),
            2 => Ok(Model::GiererMeinhardt),
            _ => Err(ConfigError::UnknownId { kind: "model", id }),
        }
    }
}

impl From<Model> for u8 {
    fn from(model: Model) -> Self {
        model as u8
    }
}

/// How neighbors outside the grid are fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Boundary {
    /// Toroidal wraparound.
    #[default]
    Wrap = 0,
    /// Mirror across the edge (zero flux).
    Reflect = 1,
    /// Constant `(u=1, v=0)` outside the grid.
    Fixed = 2,
}

impl TryFrom<u8> for Boundary {
    type Error = ConfigError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        match id {
            0 => Ok(Boundary::Wrap),
            1 => Ok(Boundary::Reflect),
            2 => Ok(Boundary::Fixed),
            _ => Err(ConfigError::UnknownId { kind: "boundary", id }),
        }
    }
}

impl From<Boundary> for u8 {
    fn from(boundary: Boundary) -> Self {
        boundary as u8
    }
}

/// Live simulation parameters.
///
/// Values are never range-checked: out-of-range feed/kill simply produce
/// different (possibly unstable) patterns.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationParams {
    pub model: Model,
    /// Activator diffusion rate.
    #[serde(rename = "Du")]
    pub du: f32,
    /// Inhibitor diffusion rate.
    #[serde(rename = "Dv")]
    pub dv: f32,
    /// Feed rate (epsilon for FitzHugh-Nagumo, rho/10 for Gierer-Meinhardt).
    pub feed: f32,
    /// Kill rate (a1 for FitzHugh-Nagumo, mu/10 for Gierer-Meinhardt).
    pub kill: f32,
    /// Time step.
    pub dt: f32,
    pub boundary: Boundary,
    /// Steps taken per rendered frame.
    #[serde(rename = "stepsPerFrame")]
    pub steps_per_frame: u32,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            model: Model::GrayScott,
            du: 1.0,
            dv: 0.5,
            feed: 0.055,
            kill: 0.062,
            dt: 1.0,
            boundary: Boundary::Wrap,
            steps_per_frame: 8,
        }
    }
}

impl SimulationParams {
    /// Merge a partial update into these parameters.
    pub fn apply(&mut self, patch: &ParamsPatch) {
        if let Some(model) = patch.model {
            self.model = model;
        }
        if let Some(du) = patch.du {
            self.du = du;
        }
        if let Some(dv) = patch.dv {
            self.dv = dv;
        }
        if let Some(feed) = patch.feed {
            self.feed = feed;
        }
        if let Some(kill) = patch.kill {
            self.kill = kill;
        }
        if let Some(dt) = patch.dt {
            self.dt = dt;
        }
        if let Some(boundary) = patch.boundary {
            self.boundary = boundary;
        }
        if let Some(steps) = patch.steps_per_frame {
            self.steps_per_frame = steps;
        }
    }
}

/// Partial parameter update. Absent fields leave the live value untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParamsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<Model>,
    #[serde(rename = "Du", skip_serializing_if = "Option::is_none")]
    pub du: Option<f32>,
    #[serde(rename = "Dv", skip_serializing_if = "Option::is_none")]
    pub dv: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feed: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kill: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dt: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boundary: Option<Boundary>,
    #[serde(rename = "stepsPerFrame", skip_serializing_if = "Option::is_none")]
    pub steps_per_frame: Option<u32>,
}

impl From<SimulationParams> for ParamsPatch {
    fn from(params: SimulationParams) -> Self {
        Self {
            model: Some(params.model),
            du: Some(params.du),
            dv: Some(params.dv),
            feed: Some(params.feed),
            kill: Some(params.kill),
            dt: Some(params.dt),
            boundary: Some(params.boundary),
            steps_per_frame: Some(params.steps_per_frame),
        }
    }
}

/// Color palette applied to the inhibitor channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Palette {
    #[default]
    HeatMap = 0,
    Neon = 1,
    Grayscale = 2,
    Inverted = 3,
    Ocean = 4,
    Forest = 5,
    Sunset = 6,
    Plasma = 7,
    /// User-defined multi-stop gradient.
    Custom = 8,
}

impl TryFrom<u8> for Palette {
    type Error = ConfigError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        match id {
            0 => Ok(Palette::HeatMap),
            1 => Ok(Palette::Neon),
            2 => Ok(Palette::Grayscale),
            3 => Ok(Palette::Inverted),
            4 => Ok(Palette::Ocean),
            5 => Ok(Palette::Forest),
            6 => Ok(Palette::Sunset),
            7 => Ok(Palette::Plasma),
            8 => Ok(Palette::Custom),
            _ => Err(ConfigError::UnknownId { kind: "palette", id }),
        }
    }
}

impl From<Palette> for u8 {
    fn from(palette: Palette) -> Self {
        palette as u8
    }
}

/// Maximum number of custom gradient stops honored by the renderer.
pub const MAX_COLOR_STOPS: usize = 6;

/// Presentation settings. Never affect the simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderSettings {
    pub palette: Palette,
    pub brightness: f32,
    pub contrast: f32,
    pub saturation: f32,
    pub show_obstacles: bool,
    pub bloom_enabled: bool,
    pub bloom_strength: f32,
    /// Spacing between blur taps, in texels.
    pub bloom_radius: f32,
    pub edge_enabled: bool,
    pub edge_strength: f32,
    /// Custom gradient stops (RGB in [0,1]); only the first six are used.
    pub custom_colors: Vec<[f32; 3]>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            palette: Palette::HeatMap,
            brightness: 0.0,
            contrast: 1.0,
            saturation: 1.0,
            show_obstacles: true,
            bloom_enabled: false,
            bloom_strength: 0.3,
            bloom_radius: 2.0,
            edge_enabled: false,
            edge_strength: 0.5,
            custom_colors: vec![[0.0, 0.0, 0.0], [0.0, 0.5, 1.0], [1.0, 1.0, 1.0]],
        }
    }
}

impl RenderSettings {
    /// Custom stops actually used by the gradient.
    pub fn color_stops(&self) -> &[[f32; 3]] {
        let n = self.custom_colors.len().min(MAX_COLOR_STOPS);
        &self.custom_colors[..n]
    }

    /// True when any post-processing stage runs.
    pub fn needs_post_processing(&self) -> bool {
        self.bloom_enabled || self.edge_enabled
    }
}

/// Top-level simulation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Grid width in cells.
    pub width: usize,
    /// Grid height in cells.
    pub height: usize,
    /// Initial condition.
    #[serde(default)]
    pub seed: SeedSpec,
    #[serde(default)]
    pub params: SimulationParams,
    #[serde(default)]
    pub render: RenderSettings,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            width: 512,
            height: 512,
            seed: SeedSpec::default(),
            params: SimulationParams::default(),
            render: RenderSettings::default(),
        }
    }
}

impl SimulationConfig {
    /// Get total grid size (width * height).
    #[inline]
    pub fn grid_size(&self) -> usize {
        self.width * self.height
    }

    /// Validate configuration parameters.
    ///
    /// Only the grid shape is checked; numeric parameters are free.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::InvalidDimensions);
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Grid dimensions (width, height) must be non-zero")]
    InvalidDimensions,
    #[error("Unknown {kind} id {id}")]
    UnknownId { kind: &'static str, id: u8 },
    #[error("Unknown preset '{0}'")]
    UnknownPreset(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_json_uses_numeric_ids() {
        let params = SimulationParams {
            model: Model::GiererMeinhardt,
            boundary: Boundary::Fixed,
            ..Default::default()
        };
        let json = serde_json::to_value(params).unwrap();
        assert_eq!(json["model"], 2);
        assert_eq!(json["boundary"], 2);
        assert_eq!(json["stepsPerFrame"], 8);
        assert!(json.get("Du").is_some());
    }

    #[test]
    fn test_unknown_model_id_rejected() {
        let result: Result<SimulationParams, _> = serde_json::from_str(
            r#"{"model":7,"Du":1,"Dv":0.5,"feed":0.05,"kill":0.06,"dt":1,"boundary":0,"stepsPerFrame":8}"#,
        );
        assert!(result.is_err());
        assert!(Model::try_from(3).is_err());
    }

    #[test]
    fn test_patch_merges_only_present_fields() {
        let mut params = SimulationParams::default();
        let patch: ParamsPatch = serde_json::from_str(r#"{"feed":0.034,"boundary":1}"#).unwrap();
        params.apply(&patch);

        assert_eq!(params.feed, 0.034);
        assert_eq!(params.boundary, Boundary::Reflect);
        assert_eq!(params.kill, 0.062);
        assert_eq!(params.model, Model::GrayScott);
    }

    #[test]
    fn test_out_of_range_values_accepted() {
        let mut params = SimulationParams::default();
        params.apply(&ParamsPatch {
            feed: Some(-3.0),
            dt: Some(50.0),
            ..Default::default()
        });
        assert_eq!(params.feed, -3.0);
        assert_eq!(params.dt, 50.0);
    }

    #[test]
    fn test_color_stops_capped() {
        let settings = RenderSettings {
            custom_colors: vec![[0.5; 3]; 9],
            ..Default::default()
        };
        assert_eq!(settings.color_stops().len(), MAX_COLOR_STOPS);
    }

    #[test]
    fn test_validate_rejects_empty_grid() {
        let config = SimulationConfig {
            width: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDimensions)
        ));
    }

    #[test]
    fn test_needs_post_processing() {
        let mut settings = RenderSettings::default();
        assert!(!settings.needs_post_processing());
        settings.edge_enabled = true;
        assert!(settings.needs_post_processing());
        settings.edge_enabled = false;
        settings.bloom_enabled = true;
        assert!(settings.needs_post_processing());
    }
}
