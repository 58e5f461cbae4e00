//! Double-buffered simulation state.
//!
//! Two equal-sized grids of [`Cell`]s alternate between the "current" (read)
//! role and the scratch (write) role. Every step or brush stamp writes the
//! scratch buffer from the current one and then flips the index, so no cell
//! ever observes another cell's new value within a step.

/// Number of `f32` values per cell in flat state arrays.
pub const CELL_FLOATS: usize = 4;

/// One grid cell: activator, inhibitor, obstacle flag and a reserved slot.
///
/// Layout matches a `vec4<f32>` so buffers can be shared with the GPU as-is.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Cell {
    /// Activator concentration (u).
    pub u: f32,
    /// Inhibitor concentration (v).
    pub v: f32,
    /// Obstacle flag; > 0.5 means blocked.
    pub obstacle: f32,
    /// Unused by the simulation, carried through state files.
    pub reserved: f32,
}

impl Cell {
    /// The neutral, unseeded state.
    pub const BASELINE: Cell = Cell::new(1.0, 0.0, 0.0);

    #[inline]
    pub const fn new(u: f32, v: f32, obstacle: f32) -> Self {
        Self {
            u,
            v,
            obstacle,
            reserved: 1.0,
        }
    }

    #[inline]
    pub fn is_obstacle(&self) -> bool {
        self.obstacle > 0.5
    }

    /// Clamp all simulated channels to [0, 1]. NaN channels fall back to the baseline.
    #[inline]
    pub fn clamped(self) -> Self {
        Self {
            u: unit_or(self.u, Cell::BASELINE.u),
            v: unit_or(self.v, Cell::BASELINE.v),
            obstacle: unit_or(self.obstacle, Cell::BASELINE.obstacle),
            reserved: self.reserved,
        }
    }
}

/// Clamp `x` to [0, 1], mapping NaN to `fallback`.
///
/// `f32::clamp` passes NaN through, and a single NaN cell spreads through
/// the Laplacian to the whole grid.
#[inline]
pub fn unit_or(x: f32, fallback: f32) -> f32 {
    if x.is_nan() { fallback } else { x.clamp(0.0, 1.0) }
}

impl Default for Cell {
    fn default() -> Self {
        Cell::BASELINE
    }
}

/// Grid allocation and shape errors.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    #[error("Grid dimensions must be non-zero (got {width}x{height})")]
    InvalidDimensions { width: usize, height: usize },
    #[error("Cannot allocate a {width}x{height} grid")]
    Allocation { width: usize, height: usize },
    #[error("State data has {actual} values, expected {expected}")]
    LengthMismatch { expected: usize, actual: usize },
}

/// Simulation state container.
///
/// Data is stored row-major with indexing `y * width + x`; `y = 0` is the
/// bottom row.
#[derive(Debug, Clone)]
pub struct SimulationState {
    buffers: [Vec<Cell>; 2],
    current: usize,
    /// Grid width.
    pub width: usize,
    /// Grid height.
    pub height: usize,
    /// Accumulated simulated time (sum of dt).
    pub time: f32,
    /// Step count since the last seed.
    pub step: u64,
}

impl SimulationState {
    /// Allocate a state filled with the baseline cell.
    ///
    /// Allocation failure is reported instead of aborting so that an
    /// oversized grid surfaces before any step runs.
    pub fn new(width: usize, height: usize) -> Result<Self, GridError> {
        let buffers = [
            allocate_buffer(width, height)?,
            allocate_buffer(width, height)?,
        ];
        Ok(Self {
            buffers,
            current: 0,
            width,
            height,
            time: 0.0,
            step: 0,
        })
    }

    /// Get total grid size (width * height).
    #[inline]
    pub fn grid_size(&self) -> usize {
        self.width * self.height
    }

    /// Convert (x, y) coordinates to flat index.
    #[inline]
    pub fn idx(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    /// Index of the buffer currently holding the authoritative state.
    #[inline]
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// The authoritative state.
    #[inline]
    pub fn current(&self) -> &[Cell] {
        &self.buffers[self.current]
    }

    /// Get cell at (x, y).
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Cell {
        self.current()[self.idx(x, y)]
    }

    /// Borrow the current buffer for reading and the scratch buffer for writing.
    pub fn split(&mut self) -> (&[Cell], &mut [Cell]) {
        let [a, b] = &mut self.buffers;
        if self.current == 0 {
            (a.as_slice(), b.as_mut_slice())
        } else {
            (b.as_slice(), a.as_mut_slice())
        }
    }

    /// Make the scratch buffer current.
    #[inline]
    pub fn swap(&mut self) {
        self.current = 1 - self.current;
    }

    /// Record one completed step.
    pub(crate) fn advance(&mut self, dt: f32) {
        self.time += dt;
        self.step += 1;
    }

    /// Overwrite both buffers with the same content and reset the counters.
    ///
    /// Used by seeding and state loading so the first render and the first
    /// step see consistent data.
    pub fn fill_both(&mut self, cells: &[Cell]) -> Result<(), GridError> {
        if cells.len() != self.grid_size() {
            return Err(GridError::LengthMismatch {
                expected: self.grid_size(),
                actual: cells.len(),
            });
        }
        for buffer in &mut self.buffers {
            buffer.copy_from_slice(cells);
        }
        self.step = 0;
        self.time = 0.0;
        Ok(())
    }

    /// Flat `(u, v, obstacle, reserved)` copy of the current buffer, row-major.
    pub fn to_flat(&self) -> Vec<f32> {
        bytemuck::cast_slice(self.current()).to_vec()
    }

    /// Parse a flat `(u, v, obstacle, reserved)` array into cells, clamping
    /// the simulated channels.
    pub fn cells_from_flat(&self, data: &[f32]) -> Result<Vec<Cell>, GridError> {
        let expected = self.grid_size() * CELL_FLOATS;
        if data.len() != expected {
            return Err(GridError::LengthMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(data
            .chunks_exact(CELL_FLOATS)
            .map(|c| {
                Cell {
                    u: c[0],
                    v: c[1],
                    obstacle: c[2],
                    reserved: c[3],
                }
                .clamped()
            })
            .collect())
    }
}

fn allocate_buffer(width: usize, height: usize) -> Result<Vec<Cell>, GridError> {
    if width == 0 || height == 0 {
        return Err(GridError::InvalidDimensions { width, height });
    }
    let len = width
        .checked_mul(height)
        .ok_or(GridError::Allocation { width, height })?;
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(len)
        .map_err(|_| GridError::Allocation { width, height })?;
    buffer.resize(len, Cell::BASELINE);
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_baseline() {
        let state = SimulationState::new(8, 4).unwrap();
        assert_eq!(state.grid_size(), 32);
        assert!(state.current().iter().all(|&c| c == Cell::BASELINE));
        assert_eq!(state.step, 0);
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert!(matches!(
            SimulationState::new(0, 4),
            Err(GridError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_huge_grid_reports_allocation_failure() {
        let result = SimulationState::new(usize::MAX / 2, 3);
        assert!(matches!(result, Err(GridError::Allocation { .. })));
    }

    #[test]
    fn test_split_and_swap() {
        let mut state = SimulationState::new(2, 2).unwrap();
        {
            let (_, scratch) = state.split();
            scratch[0] = Cell::new(0.5, 0.5, 0.0);
        }
        assert_eq!(state.current()[0], Cell::BASELINE);
        state.swap();
        assert_eq!(state.current()[0], Cell::new(0.5, 0.5, 0.0));
        assert_eq!(state.current_index(), 1);
    }

    #[test]
    fn test_fill_both_resets_counters() {
        let mut state = SimulationState::new(2, 2).unwrap();
        state.advance(1.0);
        let cells = vec![Cell::new(0.2, 0.3, 0.0); 4];
        state.fill_both(&cells).unwrap();
        assert_eq!(state.step, 0);
        assert_eq!(state.current(), cells.as_slice());
        state.swap();
        assert_eq!(state.current(), cells.as_slice());
    }

    #[test]
    fn test_flat_roundtrip() {
        let mut state = SimulationState::new(3, 2).unwrap();
        let cells: Vec<Cell> = (0..6)
            .map(|i| Cell::new(i as f32 / 6.0, 1.0 - i as f32 / 6.0, (i % 2) as f32))
            .collect();
        state.fill_both(&cells).unwrap();

        let flat = state.to_flat();
        assert_eq!(flat.len(), 24);
        let back = state.cells_from_flat(&flat).unwrap();
        assert_eq!(back, cells);
    }

    #[test]
    fn test_flat_nan_falls_back_to_baseline() {
        let state = SimulationState::new(2, 1).unwrap();
        let flat = [f32::NAN, f32::NAN, f32::NAN, 1.0, 2.0, -1.0, f32::INFINITY, 1.0];
        let cells = state.cells_from_flat(&flat).unwrap();
        assert_eq!(cells[0], Cell::BASELINE);
        assert_eq!(cells[1], Cell::new(1.0, 0.0, 1.0));
    }

    #[test]
    fn test_unit_or() {
        assert_eq!(unit_or(f32::NAN, 0.25), 0.25);
        assert_eq!(unit_or(f32::NEG_INFINITY, 0.25), 0.0);
        assert_eq!(unit_or(0.5, 0.25), 0.5);
    }

    #[test]
    fn test_flat_length_checked() {
        let state = SimulationState::new(3, 2).unwrap();
        assert!(matches!(
            state.cells_from_flat(&[0.0; 5]),
            Err(GridError::LengthMismatch { expected: 24, actual: 5 })
        ));
    }
}
