//! Per-cell update rule shared by all reaction models.
//!
//! A weighted 9-point Laplacian feeds one of three reaction terms, integrated
//! with forward Euler and clamped to [0, 1]. Obstacle cells are copied
//! through unchanged.

use crate::schema::{Boundary, Model, SimulationParams};

use super::{Cell, unit_or};

/// Laplacian weight of the four edge-adjacent neighbors.
pub const LAPLACIAN_EDGE: f32 = 0.2;
/// Laplacian weight of the four corner neighbors.
pub const LAPLACIAN_CORNER: f32 = 0.05;
/// Laplacian weight of the center cell.
pub const LAPLACIAN_CENTER: f32 = -1.0;

/// Value seen outside the grid under [`Boundary::Fixed`].
pub const FIXED_BOUNDARY_CELL: Cell = Cell::BASELINE;

/// The eight neighbors of a cell, fetched under a boundary rule.
///
/// Order: top-left, top, top-right, left, right, bottom-left, bottom, bottom-right
/// where "top" is `y + 1`.
#[derive(Debug, Clone, Copy)]
pub struct Neighborhood {
    pub cells: [Cell; 8],
}

const EDGE_SLOTS: [usize; 4] = [1, 3, 4, 6];
const CORNER_SLOTS: [usize; 4] = [0, 2, 5, 7];
const OFFSETS: [(isize, isize); 8] = [
    (-1, 1),
    (0, 1),
    (1, 1),
    (-1, 0),
    (1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

impl Neighborhood {
    /// Gather the neighbors of (x, y).
    pub fn gather(
        grid: &[Cell],
        width: usize,
        height: usize,
        x: usize,
        y: usize,
        boundary: Boundary,
    ) -> Self {
        let mut cells = [Cell::BASELINE; 8];
        for (slot, &(dx, dy)) in cells.iter_mut().zip(OFFSETS.iter()) {
            *slot = fetch(
                grid,
                width,
                height,
                x as isize + dx,
                y as isize + dy,
                boundary,
            );
        }
        Self { cells }
    }

    /// Laplacian of (u, v) at the center cell.
    #[inline]
    pub fn laplacian(&self, center: Cell) -> (f32, f32) {
        let mut edge_u = 0.0f32;
        let mut edge_v = 0.0f32;
        for &i in &EDGE_SLOTS {
            edge_u += self.cells[i].u;
            edge_v += self.cells[i].v;
        }
        let mut corner_u = 0.0f32;
        let mut corner_v = 0.0f32;
        for &i in &CORNER_SLOTS {
            corner_u += self.cells[i].u;
            corner_v += self.cells[i].v;
        }
        (
            LAPLACIAN_EDGE * edge_u + LAPLACIAN_CORNER * corner_u + LAPLACIAN_CENTER * center.u,
            LAPLACIAN_EDGE * edge_v + LAPLACIAN_CORNER * corner_v + LAPLACIAN_CENTER * center.v,
        )
    }
}

/// Fetch a cell, resolving out-of-range coordinates with the boundary rule.
#[inline]
pub fn fetch(
    grid: &[Cell],
    width: usize,
    height: usize,
    x: isize,
    y: isize,
    boundary: Boundary,
) -> Cell {
    let w = width as isize;
    let h = height as isize;
    let (x, y) = match boundary {
        Boundary::Wrap => (x.rem_euclid(w), y.rem_euclid(h)),
        Boundary::Reflect => (reflect(x, w), reflect(y, h)),
        Boundary::Fixed => {
            if x < 0 || x >= w || y < 0 || y >= h {
                return FIXED_BOUNDARY_CELL;
            }
            (x, y)
        }
    };
    grid[y as usize * width + x as usize]
}

/// Mirror an index across the grid edge (edge cell repeated).
#[inline]
fn reflect(i: isize, n: isize) -> isize {
    let mirrored = if i < 0 {
        -i - 1
    } else if i >= n {
        2 * n - i - 1
    } else {
        i
    };
    mirrored.clamp(0, n - 1)
}

/// Reaction term resolved once per step from the live parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reaction {
    GrayScott { feed: f32, kill: f32 },
    FitzHughNagumo { epsilon: f32, a1: f32 },
    GiererMeinhardt { rho: f32, mu: f32, rho0: f32, nu: f32 },
}

impl Reaction {
    /// Interpret the shared feed/kill sliders for the selected model.
    pub fn from_params(params: &SimulationParams) -> Self {
        match params.model {
            Model::GrayScott => Reaction::GrayScott {
                feed: params.feed,
                kill: params.kill,
            },
            Model::FitzHughNagumo => Reaction::FitzHughNagumo {
                epsilon: params.feed,
                a1: params.kill,
            },
            Model::GiererMeinhardt => {
                let mu = params.kill * 10.0;
                Reaction::GiererMeinhardt {
                    rho: params.feed * 10.0,
                    mu,
                    rho0: 0.001,
                    nu: mu * 1.5,
                }
            }
        }
    }

    /// Reaction contribution to (du, dv) at concentrations (u, v).
    #[inline]
    pub fn rates(&self, u: f32, v: f32) -> (f32, f32) {
        match *self {
            Reaction::GrayScott { feed, kill } => {
                let uvv = u * v * v;
                (-uvv + feed * (1.0 - u), uvv - (feed + kill) * v)
            }
            Reaction::FitzHughNagumo { epsilon, a1 } => (u - u * u * u - v, epsilon * (u - a1 * v)),
            Reaction::GiererMeinhardt { rho, mu, rho0, nu } => {
                let uu = u * u;
                (rho * uu / (v + 0.001) - mu * u + rho0, rho * uu - nu * v)
            }
        }
    }
}

/// Everything the kernel needs for one step, resolved once.
#[derive(Debug, Clone, Copy)]
pub struct StepKernel {
    pub reaction: Reaction,
    pub du: f32,
    pub dv: f32,
    pub dt: f32,
    pub boundary: Boundary,
}

impl StepKernel {
    pub fn new(params: &SimulationParams) -> Self {
        Self {
            reaction: Reaction::from_params(params),
            du: params.du,
            dv: params.dv,
            dt: params.dt,
            boundary: params.boundary,
        }
    }

    /// New value of cell (x, y), reading only from `grid`.
    #[inline]
    pub fn update_cell(&self, grid: &[Cell], width: usize, height: usize, x: usize, y: usize) -> Cell {
        let center = grid[y * width + x];
        if center.is_obstacle() {
            return center;
        }

        let neighbors = Neighborhood::gather(grid, width, height, x, y, self.boundary);
        let (lap_u, lap_v) = neighbors.laplacian(center);
        let (react_u, react_v) = self.reaction.rates(center.u, center.v);

        let du = self.du * lap_u + react_u;
        let dv = self.dv * lap_v + react_v;

        Cell {
            u: unit_or(center.u + self.dt * du, Cell::BASELINE.u),
            v: unit_or(center.v + self.dt * dv, Cell::BASELINE.v),
            obstacle: center.obstacle,
            reserved: center.reserved,
        }
    }

    /// Compute one output row.
    pub fn update_row(&self, grid: &[Cell], width: usize, height: usize, y: usize, out: &mut [Cell]) {
        for (x, cell) in out.iter_mut().enumerate() {
            *cell = self.update_cell(grid, width, height, x, y);
        }
    }
}
