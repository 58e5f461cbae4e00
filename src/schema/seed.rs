//! Seed types for initializing reaction-diffusion simulations.

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Procedural initial condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum SeedMode {
    /// Small square of (0.5, 0.25) at the grid center, jittered baseline elsewhere.
    #[default]
    CenterSquare = 0,
    /// About twenty circular spots, jittered baseline elsewhere.
    RandomSpots = 1,
    /// Sparse randomized cells over a clean baseline.
    RandomNoise = 2,
    /// Exactly (1, 0) everywhere.
    Clear = 3,
}

impl TryFrom<u8> for SeedMode {
    type Error = ConfigError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        match id {
            0 => Ok(SeedMode::CenterSquare),
            1 => Ok(SeedMode::RandomSpots),
            2 => Ok(SeedMode::RandomNoise),
            3 => Ok(SeedMode::Clear),
            _ => Err(ConfigError::UnknownId { kind: "seed mode", id }),
        }
    }
}

impl From<SeedMode> for u8 {
    fn from(mode: SeedMode) -> Self {
        mode as u8
    }
}

/// Complete seed specification: a mode plus the hash seed value.
///
/// The same spec always produces the same initial state for a given grid size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeedSpec {
    pub mode: SeedMode,
    pub value: f32,
}

impl Default for SeedSpec {
    fn default() -> Self {
        Self {
            mode: SeedMode::CenterSquare,
            value: 0.0,
        }
    }
}

impl SeedSpec {
    pub fn new(mode: SeedMode, value: f32) -> Self {
        Self { mode, value }
    }
}

/// Brush editing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum BrushMode {
    #[default]
    AddActivator = 0,
    AddInhibitor = 1,
    /// Blend back toward the unseeded state and clear obstacles.
    Erase = 2,
    PlaceObstacle = 3,
    RemoveObstacle = 4,
}

impl TryFrom<u8> for BrushMode {
    type Error = ConfigError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        match id {
            0 => Ok(BrushMode::AddActivator),
            1 => Ok(BrushMode::AddInhibitor),
            2 => Ok(BrushMode::Erase),
            3 => Ok(BrushMode::PlaceObstacle),
            4 => Ok(BrushMode::RemoveObstacle),
            _ => Err(ConfigError::UnknownId { kind: "brush mode", id }),
        }
    }
}

impl From<BrushMode> for u8 {
    fn from(mode: BrushMode) -> Self {
        mode as u8
    }
}

/// A single brush stamp. Applied immediately and discarded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrushStroke {
    /// Center in normalized coordinates; y = 0 is the bottom row.
    pub x: f32,
    pub y: f32,
    /// Radius in normalized (height-relative) units.
    pub radius: f32,
    pub strength: f32,
    pub mode: BrushMode,
}

impl BrushStroke {
    pub fn new(x: f32, y: f32, radius: f32, strength: f32, mode: BrushMode) -> Self {
        Self {
            x,
            y,
            radius,
            strength,
            mode,
        }
    }

    /// Same stroke moved to another position.
    pub fn at(&self, x: f32, y: f32) -> Self {
        Self { x, y, ..*self }
    }

    /// Same stroke with another mode.
    pub fn with_mode(&self, mode: BrushMode) -> Self {
        Self { mode, ..*self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_spec_roundtrip_ids() {
        let spec = SeedSpec::new(SeedMode::RandomNoise, 1234.0);
        let json = serde_json::to_string(&spec).unwrap();
        assert_eq!(json, r#"{"mode":2,"value":1234.0}"#);
        let back: SeedSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(back, spec);
    }

    #[test]
    fn test_brush_mode_ids() {
        assert_eq!(BrushMode::try_from(4).unwrap(), BrushMode::RemoveObstacle);
        assert!(BrushMode::try_from(5).is_err());
        assert!(SeedMode::try_from(4).is_err());
    }
}
