//! Versioned saved-state documents.

use serde::{Deserialize, Serialize};

use crate::schema::ParamsPatch;

use super::PersistError;

/// The only saved-state version this crate reads and writes.
pub const STATE_VERSION: u32 = 1;

/// A saved simulation: parameters plus an optional flattened grid.
///
/// `grid` holds `width * height * 4` floats in cell order `(u, v, obstacle, reserved)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedState {
    pub version: u32,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
    pub params: ParamsPatch,
    #[serde(default)]
    pub grid: Option<Vec<f32>>,
}

impl SavedState {
    /// New document stamped with the current time.
    pub fn new(params: ParamsPatch, grid: Option<Vec<f32>>) -> Self {
        Self {
            version: STATE_VERSION,
            timestamp: now_millis(),
            params,
            grid,
        }
    }

    pub fn to_json(&self) -> Result<String, PersistError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a document, rejecting unknown versions.
    pub fn from_json(json: &str) -> Result<Self, PersistError> {
        let state: SavedState = serde_json::from_str(json)?;
        if state.version != STATE_VERSION {
            return Err(PersistError::UnsupportedVersion(state.version));
        }
        Ok(state)
    }
}

/// Current wall-clock time in milliseconds since the Unix epoch.
#[cfg(not(target_arch = "wasm32"))]
pub fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Current wall-clock time in milliseconds since the Unix epoch.
#[cfg(target_arch = "wasm32")]
pub fn now_millis() -> u64 {
    js_sys::Date::now() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Model, SimulationParams};

    #[test]
    fn test_json_field_names() {
        let saved = SavedState {
            version: 1,
            timestamp: 1_700_000_000_000,
            params: ParamsPatch {
                feed: Some(0.03),
                ..Default::default()
            },
            grid: None,
        };
        let value: serde_json::Value = serde_json::from_str(&saved.to_json().unwrap()).unwrap();
        assert_eq!(value["version"], 1);
        assert_eq!(value["timestamp"], 1_700_000_000_000u64);
        assert!(value["grid"].is_null());
        assert!(value["params"].get("kill").is_none());
    }

    #[test]
    fn test_reads_document_with_full_params() {
        let json = r#"{
            "version": 1,
            "timestamp": 5,
            "params": {"model": 1, "Du": 1.0, "Dv": 0.5, "feed": 0.02, "kill": 0.05,
                       "dt": 0.5, "boundary": 0, "stepsPerFrame": 4},
            "grid": [1.0, 0.0, 0.0, 1.0]
        }"#;
        let saved = SavedState::from_json(json).unwrap();
        let mut params = SimulationParams::default();
        params.apply(&saved.params);
        assert_eq!(params.model, Model::FitzHughNagumo);
        assert_eq!(params.steps_per_frame, 4);
        assert_eq!(saved.grid.as_deref(), Some(&[1.0, 0.0, 0.0, 1.0][..]));
    }

    #[test]
    fn test_missing_grid_is_none() {
        let saved = SavedState::from_json(r#"{"version":1,"timestamp":0,"params":{}}"#).unwrap();
        assert!(saved.grid.is_none());
        assert_eq!(saved.params, ParamsPatch::default());
    }

    #[test]
    fn test_rejects_other_versions() {
        let err = SavedState::from_json(r#"{"version":2,"timestamp":0,"params":{}}"#).unwrap_err();
        assert!(matches!(err, PersistError::UnsupportedVersion(2)));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(
            SavedState::from_json("{not json"),
            Err(PersistError::Json(_))
        ));
    }

    #[test]
    fn test_new_is_current_version() {
        let saved = SavedState::new(SimulationParams::default().into(), None);
        assert_eq!(saved.version, STATE_VERSION);
        assert!(saved.timestamp > 0);
    }
}
