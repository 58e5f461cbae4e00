//! Brush perturbation - localized, falloff-weighted edits of the live state.

use crate::schema::{BrushMode, BrushStroke};

use super::{Cell, SimulationState};

/// Fraction of the brush radius inside which the falloff is at full strength.
const INNER_RADIUS: f32 = 0.3;

/// Resampling spacing along a stroke, as a fraction of the brush radius.
const PATH_SPACING: f32 = 0.3;

/// GLSL-style smoothstep. Works with `edge0 > edge1` (inverted ramp).
#[inline]
fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

#[inline]
fn mix(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}

/// Falloff weight of the stroke at normalized distance `dist`.
#[inline]
pub fn influence(stroke: &BrushStroke, dist: f32) -> f32 {
    // Inside the core the ramp is flat; also keeps an infinite radius finite
    if dist <= stroke.radius * INNER_RADIUS {
        return stroke.strength;
    }
    smoothstep(stroke.radius, stroke.radius * INNER_RADIUS, dist) * stroke.strength
}

/// Blend one cell toward the mode's target.
#[inline]
pub fn blend(cell: Cell, mode: BrushMode, influence: f32) -> Cell {
    let mut out = cell;
    match mode {
        BrushMode::AddActivator => {
            out.v = mix(cell.v, 1.0, influence);
            out.u = mix(cell.u, 0.5, influence * 0.5);
        }
        BrushMode::AddInhibitor => {
            out.u = mix(cell.u, 1.0, influence);
            out.v = mix(cell.v, 0.0, influence);
        }
        BrushMode::Erase => {
            out.u = mix(cell.u, 1.0, influence);
            out.v = mix(cell.v, 0.0, influence);
            out.obstacle = mix(cell.obstacle, 0.0, influence);
        }
        BrushMode::PlaceObstacle => out.obstacle = mix(cell.obstacle, 1.0, influence),
        BrushMode::RemoveObstacle => out.obstacle = mix(cell.obstacle, 0.0, influence),
    }
    out.clamped()
}

/// Apply one brush stamp: write the edited grid into the scratch buffer and flip.
///
/// Distances are aspect corrected, so the radius is measured in units of the
/// grid height in both directions. Cells outside the stamp are copied
/// through verbatim.
pub fn apply_brush(state: &mut SimulationState, stroke: &BrushStroke) {
    let width = state.width;
    let height = state.height;
    let (read, write) = state.split();
    write.copy_from_slice(read);

    if stroke.radius > 0.0 && stroke.strength > 0.0 {
        let w = width as f32;
        let h = height as f32;
        let aspect = w / h;

        // Pixel bounding box of the stamp, capped to the grid extent
        let extent = width.max(height) as f32;
        let reach = ((stroke.radius * h).ceil().min(extent) as isize).saturating_add(1);
        let cx = (stroke.x * w).floor() as isize;
        let cy = (stroke.y * h).floor() as isize;
        let x0 = cx.saturating_sub(reach).max(0);
        let x1 = cx.saturating_add(reach).min(width as isize - 1);
        let y0 = cy.saturating_sub(reach).max(0);
        let y1 = cy.saturating_add(reach).min(height as isize - 1);

        for y in y0..=y1 {
            let dy = (y as f32 + 0.5) / h - stroke.y;
            for x in x0..=x1 {
                let dx = ((x as f32 + 0.5) / w - stroke.x) * aspect;
                let weight = influence(stroke, (dx * dx + dy * dy).sqrt());
                if weight > 0.0 {
                    let i = y as usize * width + x as usize;
                    write[i] = blend(read[i], stroke.mode, weight);
                }
            }
        }
    }

    state.swap();
}

/// Resamples continuous pointer movement into evenly spaced brush stamps.
#[derive(Debug, Default, Clone)]
pub struct BrushPath {
    last: Option<(f32, f32)>,
}

impl BrushPath {
    pub fn new() -> Self {
        Self::default()
    }

    /// True between `begin` and `end`.
    pub fn is_drawing(&self) -> bool {
        self.last.is_some()
    }

    /// Start a stroke; the returned point is stamped immediately.
    pub fn begin(&mut self, x: f32, y: f32) -> (f32, f32) {
        self.last = Some((x, y));
        (x, y)
    }

    /// Points to stamp when the pointer moves to (x, y).
    ///
    /// Gaps wider than 30% of the radius are filled with evenly spaced
    /// intermediate stamps ending at (x, y). Empty when no stroke is active.
    pub fn move_to(&mut self, x: f32, y: f32, radius: f32) -> Vec<(f32, f32)> {
        let Some((lx, ly)) = self.last else {
            return Vec::new();
        };
        self.last = Some((x, y));

        let dx = x - lx;
        let dy = y - ly;
        let dist = (dx * dx + dy * dy).sqrt();
        let step_size = radius * PATH_SPACING;

        if step_size > 0.0 && dist > step_size {
            let steps = (dist / step_size).ceil() as usize;
            (1..=steps)
                .map(|i| {
                    let t = i as f32 / steps as f32;
                    (lx + dx * t, ly + dy * t)
                })
                .collect()
        } else {
            vec![(x, y)]
        }
    }

    /// Finish the stroke.
    pub fn end(&mut self) {
        self.last = None;
    }
}
