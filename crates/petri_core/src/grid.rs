//! # Grid
//!
//! Cell state for exactly one generation.
//!
//! ## Layout
//!
//! ```text
//!   x ->  0   1   2   ...  width-1
//! y  0  [ . | # | . | ... | . ]     cells[y * width + x]
//! |  1  [ . | # | . | ... | . ]
//! v  2  [ . | # | . | ... | . ]
//! ```
//!
//! ## Topology
//!
//! The neighbor count at the grid edge depends on [`Topology`]:
//!
//! - `Toroidal`: the left edge touches the right edge, the top touches the
//!   bottom. `is_alive` wraps any coordinate the same way.
//! - `Bounded`: cells beyond the edge do not exist and count as dead.
//!   `is_alive` rejects out-of-range coordinates.
//!
//! A grid is never rewritten by the automaton. Mutation is only available
//! while seeding a fresh grid, before it is handed to the engine.

use serde::{Deserialize, Serialize};

use crate::error::{GridError, GridResult};

/// Offsets of the 8 neighbors of a cell, as (dx, dy).
pub const NEIGHBOR_OFFSETS: [(i64, i64); 8] = [
    (-1, -1), (0, -1), (1, -1),
    (-1, 0),           (1, 0),
    (-1, 1),  (0, 1),  (1, 1),
];

/// How neighbor lookup treats the grid edge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Topology {
    /// Edges wrap around.
    #[default]
    Toroidal,
    /// Nothing exists beyond the edge.
    Bounded,
}

/// One generation of a 2-state cellular automaton.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Grid {
    width: usize,
    height: usize,
    topology: Topology,
    cells: Vec<bool>,
}

impl Grid {
    /// Creates an empty toroidal grid.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidDimensions`] if either dimension is zero.
    pub fn new(width: usize, height: usize) -> GridResult<Self> {
        Self::with_topology(width, height, Topology::Toroidal)
    }

    /// Creates an empty grid with an explicit topology.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidDimensions`] if either dimension is zero
    /// or the cell count overflows `usize`.
    pub fn with_topology(width: usize, height: usize, topology: Topology) -> GridResult<Self> {
        let len = match width.checked_mul(height) {
            Some(len) if len > 0 => len,
            _ => return Err(GridError::InvalidDimensions { width, height }),
        };
        Ok(Self {
            width,
            height,
            topology,
            cells: vec![false; len],
        })
    }

    /// Creates a grid with the given cells alive.
    ///
    /// # Errors
    ///
    /// Fails on zero dimensions or on any coordinate outside the grid.
    pub fn from_cells<I>(width: usize, height: usize, topology: Topology, alive: I) -> GridResult<Self>
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        let mut grid = Self::with_topology(width, height, topology)?;
        for (x, y) in alive {
            grid.set_alive(x, y, true)?;
        }
        Ok(grid)
    }

    /// Parses a grid from text rows, `#` alive and `.` dead.
    ///
    /// ```rust,ignore
    /// let blinker = Grid::from_rows(Topology::Bounded, &[
    ///     ".....",
    ///     ".###.",
    ///     ".....",
    /// ])?;
    /// ```
    ///
    /// # Errors
    ///
    /// Fails on empty input, rows of different widths, or any other character.
    pub fn from_rows(topology: Topology, rows: &[&str]) -> GridResult<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.chars().count());
        let mut grid = Self::with_topology(width, height, topology)?;

        for (y, row) in rows.iter().enumerate() {
            let found = row.chars().count();
            if found != width {
                return Err(GridError::RaggedRows { row: y, expected: width, found });
            }
            for (x, c) in row.chars().enumerate() {
                match c {
                    '#' => grid.cells[y * width + x] = true,
                    '.' => {}
                    found => return Err(GridError::InvalidPatternChar { row: y, column: x, found }),
                }
            }
        }
        Ok(grid)
    }

    /// Returns the width in cells.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Returns the height in cells.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Returns the edge policy.
    #[inline]
    #[must_use]
    pub const fn topology(&self) -> Topology {
        self.topology
    }

    /// Sets a single cell. Only meant for seeding a fresh grid.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfRange`] for coordinates outside the grid,
    /// whatever the topology.
    pub fn set_alive(&mut self, x: usize, y: usize, alive: bool) -> GridResult<()> {
        if x >= self.width || y >= self.height {
            return Err(self.out_of_range(to_i64(x), to_i64(y)));
        }
        self.cells[y * self.width + x] = alive;
        Ok(())
    }

    /// Returns whether the cell at `(x, y)` is alive.
    ///
    /// On a toroidal grid any coordinate is accepted and wrapped, so
    /// `is_alive(-1, 0)` reads the last column.
    ///
    /// # Errors
    ///
    /// On a bounded grid, returns [`GridError::OutOfRange`] when `(x, y)` is
    /// outside `[0, width) x [0, height)`.
    pub fn is_alive(&self, x: i64, y: i64) -> GridResult<bool> {
        self.resolve(x, y)
            .map(|index| self.cells[index])
            .ok_or_else(|| self.out_of_range(x, y))
    }

    /// Reads an in-range cell. Callers iterate `0..width` x `0..height`.
    #[inline]
    pub(crate) fn get(&self, x: usize, y: usize) -> bool {
        self.cells[y * self.width + x]
    }

    /// Counts live cells among the 8 neighbors of `(x, y)`.
    ///
    /// On a torus narrower than 3 cells the same cell can be reached through
    /// more than one offset and is counted once per offset.
    #[must_use]
    pub fn live_neighbors(&self, x: usize, y: usize) -> u8 {
        let (x, y) = (to_i64(x), to_i64(y));
        let mut count = 0u8;
        for (dx, dy) in NEIGHBOR_OFFSETS {
            if let Some(index) = self.resolve(x + dx, y + dy) {
                count += u8::from(self.cells[index]);
            }
        }
        count
    }

    /// Number of live cells.
    #[must_use]
    pub fn population(&self) -> usize {
        self.cells.iter().filter(|&&alive| alive).count()
    }

    /// Iterates the coordinates of live cells in row-major order.
    pub fn alive_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let width = self.width;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, &alive)| alive)
            .map(move |(i, _)| (i % width, i / width))
    }

    /// Builds the next-generation grid from a per-cell rule.
    ///
    /// The rule sees the current state and the neighbor count of every cell;
    /// `self` is only read.
    pub(crate) fn map_cells<F>(&self, mut rule: F) -> Self
    where
        F: FnMut(bool, u8) -> bool,
    {
        let mut cells = Vec::with_capacity(self.cells.len());
        for y in 0..self.height {
            for x in 0..self.width {
                cells.push(rule(self.get(x, y), self.live_neighbors(x, y)));
            }
        }
        Self {
            width: self.width,
            height: self.height,
            topology: self.topology,
            cells,
        }
    }

    /// Maps a possibly out-of-range coordinate to a cell index.
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    fn resolve(&self, x: i64, y: i64) -> Option<usize> {
        let (w, h) = (to_i64(self.width), to_i64(self.height));
        let (x, y) = match self.topology {
            Topology::Toroidal => (x.rem_euclid(w), y.rem_euclid(h)),
            Topology::Bounded => {
                if !(0..w).contains(&x) || !(0..h).contains(&y) {
                    return None;
                }
                (x, y)
            }
        };
        // Both are now within [0, dim), so the casts are lossless.
        Some(y as usize * self.width + x as usize)
    }

    fn out_of_range(&self, x: i64, y: i64) -> GridError {
        GridError::OutOfRange {
            x,
            y,
            width: self.width,
            height: self.height,
        }
    }
}

impl std::fmt::Display for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for y in 0..self.height {
            for x in 0..self.width {
                f.write_str(if self.get(x, y) { "#" } else { "." })?;
            }
            if y + 1 < self.height {
                f.write_str("\n")?;
            }
        }
        Ok(())
    }
}

#[inline]
#[allow(clippy::cast_possible_wrap)]
const fn to_i64(v: usize) -> i64 {
    v as i64
}
