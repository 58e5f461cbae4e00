//! Grid statistics: coverage, inhibitor range and histogram entropy.

use serde::Serialize;

use super::SimulationState;

/// Number of inhibitor histogram bins used for the entropy estimate.
pub const ENTROPY_BINS: usize = 32;

/// Statistics over non-obstacle cells of the current buffer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationStats {
    pub iteration: u64,
    pub mean_u: f32,
    pub mean_v: f32,
    /// Mean inhibitor as a percentage.
    pub coverage: f32,
    /// Shannon entropy (bits) of the 32-bin inhibitor histogram.
    pub entropy: f32,
    pub min_v: f32,
    pub max_v: f32,
}

impl SimulationStats {
    /// Compute statistics from state.
    ///
    /// With no open cells the means, coverage and entropy are zero and the
    /// range is reported as `[1, 0]`.
    pub fn from_state(state: &SimulationState) -> Self {
        let mut sum_u = 0.0f64;
        let mut sum_v = 0.0f64;
        let mut min_v = 1.0f32;
        let mut max_v = 0.0f32;
        let mut count = 0usize;
        let mut histogram = [0usize; ENTROPY_BINS];

        for cell in state.current().iter().filter(|c| !c.is_obstacle()) {
            sum_u += cell.u as f64;
            sum_v += cell.v as f64;
            min_v = min_v.min(cell.v);
            max_v = max_v.max(cell.v);
            let bin = ((cell.v * ENTROPY_BINS as f32).floor().max(0.0) as usize).min(ENTROPY_BINS - 1);
            histogram[bin] += 1;
            count += 1;
        }

        if count == 0 {
            return Self {
                iteration: state.step,
                mean_u: 0.0,
                mean_v: 0.0,
                coverage: 0.0,
                entropy: 0.0,
                min_v,
                max_v,
            };
        }

        let n = count as f64;
        let entropy = histogram
            .iter()
            .filter(|&&h| h > 0)
            .map(|&h| {
                let p = h as f64 / n;
                -p * p.log2()
            })
            .sum::<f64>();

        Self {
            iteration: state.step,
            mean_u: (sum_u / n) as f32,
            mean_v: (sum_v / n) as f32,
            coverage: (sum_v / n * 100.0) as f32,
            entropy: entropy.max(0.0) as f32,
            min_v,
            max_v,
        }
    }

    /// Formatted report for display.
    pub fn report(&self) -> StatsReport {
        StatsReport {
            iteration: self.iteration,
            mean_u: format!("{:.4}", self.mean_u),
            mean_v: format!("{:.4}", self.mean_v),
            coverage: format!("{:.1}", self.coverage),
            entropy: format!("{:.3}", self.entropy),
            min_v: format!("{:.4}", self.min_v),
            max_v: format!("{:.4}", self.max_v),
            available: true,
        }
    }
}

/// Display strings for the statistics panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsReport {
    pub iteration: u64,
    pub mean_u: String,
    pub mean_v: String,
    pub coverage: String,
    pub entropy: String,
    pub min_v: String,
    pub max_v: String,
    pub available: bool,
}

impl StatsReport {
    /// Placeholder shown when statistics could not be computed.
    pub fn unavailable() -> Self {
        let dash = || "-".to_string();
        Self {
            iteration: 0,
            mean_u: dash(),
            mean_v: dash(),
            coverage: dash(),
            entropy: dash(),
            min_v: dash(),
            max_v: dash(),
            available: false,
        }
    }
}
