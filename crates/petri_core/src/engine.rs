//! # Automaton Engine
//!
//! Advances a [`Grid`] by one generation.
//!
//! ## Rule (B3/S23)
//!
//! ```text
//! alive now, 2 or 3 live neighbors  -> alive   (survival)
//! dead now, exactly 3 live neighbors -> alive   (birth)
//! anything else                      -> dead
//! ```
//!
//! Every step reads the current grid and writes a brand new one, so a
//! reader holding the previous generation never observes a half-written
//! state.

use crate::error::GridResult;
use crate::grid::Grid;

/// Something that turns one generation into the next.
///
/// The driver is generic over this trait so a run can be exercised with an
/// instrumented or failing engine.
pub trait Automaton: Send + 'static {
    /// Computes the next generation.
    ///
    /// Must not modify `grid` and must return a grid of the same shape.
    /// A panic here fails the current run when unwinding is enabled; under
    /// `panic = "abort"` it ends the process.
    ///
    /// # Errors
    ///
    /// Implementations report malformed input as a [`GridError`].
    fn step(&self, grid: &Grid) -> GridResult<Grid>;
}

/// The standard Conway rule on an 8-neighborhood.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConwayEngine;

impl ConwayEngine {
    /// Creates the engine.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Next state of one cell.
    #[inline]
    #[must_use]
    pub const fn next_state(alive: bool, live_neighbors: u8) -> bool {
        matches!((alive, live_neighbors), (true, 2 | 3) | (false, 3))
    }
}

impl Automaton for ConwayEngine {
    fn step(&self, grid: &Grid) -> GridResult<Grid> {
        Ok(step(grid))
    }
}

/// Computes the next generation with the Conway rule.
#[must_use]
pub fn step(grid: &Grid) -> Grid {
    grid.map_cells(ConwayEngine::next_state)
}
