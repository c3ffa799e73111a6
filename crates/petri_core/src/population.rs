//! # Initial Population
//!
//! Decides what a fresh grid looks like at generation 0.
//!
//! ## Policies
//!
//! - `Empty`: every cell dead.
//! - `Random`: each cell alive with probability `density`, drawn from a
//!   ChaCha8 stream. The stream is seeded with `seed + run_index`, so
//!   consecutive runs differ while any single run can be replayed.
//! - `Pattern`: a named pattern from [`PATTERNS`], centred on the grid.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::{GridError, GridResult};
use crate::grid::{Grid, Topology};

/// A named starting pattern.
#[derive(Clone, Copy, Debug)]
pub struct Pattern {
    /// Catalog name.
    pub name: &'static str,
    /// Rows of `#` (alive) and `.` (dead), all the same width.
    pub rows: &'static [&'static str],
}

impl Pattern {
    /// Bounding-box width.
    #[must_use]
    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, |r| r.len())
    }

    /// Bounding-box height.
    #[must_use]
    pub const fn height(&self) -> usize {
        self.rows.len()
    }

    /// Iterates live cell offsets relative to the top-left corner.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.rows.iter().enumerate().flat_map(|(y, row)| {
            row.bytes()
                .enumerate()
                .filter(|&(_, b)| b == b'#')
                .map(move |(x, _)| (x, y))
        })
    }
}

/// Built-in pattern catalog.
pub const PATTERNS: &[Pattern] = &[
    Pattern {
        name: "glider",
        rows: &[".#.", "..#", "###"],
    },
    Pattern {
        name: "blinker",
        rows: &["###"],
    },
    Pattern {
        name: "toad",
        rows: &[".###", "###."],
    },
    Pattern {
        name: "beacon",
        rows: &["##..", "##..", "..##", "..##"],
    },
    Pattern {
        name: "pulsar",
        rows: &[
            "..###...###..",
            ".............",
            "#....#.#....#",
            "#....#.#....#",
            "#....#.#....#",
            "..###...###..",
            ".............",
            "..###...###..",
            "#....#.#....#",
            "#....#.#....#",
            "#....#.#....#",
            ".............",
            "..###...###..",
        ],
    },
    Pattern {
        name: "r-pentomino",
        rows: &[".##", "##.", ".#."],
    },
    Pattern {
        name: "gosper-glider-gun",
        rows: &[
            "........................#...........",
            "......................#.#...........",
            "............##......##............##",
            "...........#...#....##............##",
            "##........#.....#...##..............",
            "##........#...#.##....#.#...........",
            "..........#.....#.......#...........",
            "...........#...#....................",
            "............##......................",
        ],
    },
];

/// Looks up a catalog pattern. Case, `_` and spaces are ignored in favour
/// of the canonical `kebab-case` name.
#[must_use]
pub fn find_pattern(name: &str) -> Option<&'static Pattern> {
    let wanted: String = name
        .trim()
        .chars()
        .map(|c| if c == '_' || c == ' ' { '-' } else { c.to_ascii_lowercase() })
        .collect();
    PATTERNS.iter().find(|p| p.name == wanted)
}

/// Initial-population policy for a fresh run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Population {
    /// All cells dead.
    Empty,
    /// Seeded random fill.
    Random {
        /// Base seed; the run index is added to it.
        seed: u64,
        /// Probability of a cell starting alive, in `[0, 1]`.
        density: f64,
    },
    /// A catalog pattern centred on the grid.
    Pattern {
        /// Catalog name, see [`PATTERNS`].
        name: String,
    },
}

impl Default for Population {
    fn default() -> Self {
        Self::Random {
            seed: 42,
            density: 0.33,
        }
    }
}

impl Population {
    /// Builds generation 0 for run number `run_index`.
    ///
    /// # Errors
    ///
    /// Fails on zero dimensions, an unknown pattern name, or a pattern
    /// larger than the grid.
    pub fn populate(
        &self,
        width: usize,
        height: usize,
        topology: Topology,
        run_index: u64,
    ) -> GridResult<Grid> {
        let mut grid = Grid::with_topology(width, height, topology)?;

        match self {
            Self::Empty => {}
            Self::Random { seed, density } => {
                let p = if density.is_nan() { 0.0 } else { density.clamp(0.0, 1.0) };
                let mut rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(run_index));
                for y in 0..height {
                    for x in 0..width {
                        if rng.gen_bool(p) {
                            grid.set_alive(x, y, true)?;
                        }
                    }
                }
            }
            Self::Pattern { name } => {
                let pattern =
                    find_pattern(name).ok_or_else(|| GridError::UnknownPattern(name.clone()))?;
                let (pw, ph) = (pattern.width(), pattern.height());
                if pw > width || ph > height {
                    return Err(GridError::PatternTooLarge {
                        name: pattern.name,
                        pattern_width: pw,
                        pattern_height: ph,
                        width,
                        height,
                    });
                }
                let (ox, oy) = ((width - pw) / 2, (height - ph) / 2);
                for (x, y) in pattern.cells() {
                    grid.set_alive(ox + x, oy + y, true)?;
                }
            }
        }

        Ok(grid)
    }
}
