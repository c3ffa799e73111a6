//! # PETRI Core
//!
//! The automaton half of PETRI: a 2-D binary grid, the Conway step rule,
//! initial-population policies and a grid-to-pixels renderer.
//!
//! ## Design Principles
//!
//! 1. **Immutable generations** - `step` returns a new grid, the input is never touched
//! 2. **Explicit edges** - every grid carries its [`Topology`]
//! 3. **Deterministic** - same grid in, same grid out; random seeding is seeded
//!
//! ## Example
//!
//! ```rust,ignore
//! use petri_core::{Grid, Topology, step};
//!
//! let blinker = Grid::from_rows(Topology::Bounded, &[".....", ".###.", "....."])?;
//! let next = step(&blinker);
//! assert_eq!(next.to_string(), "..#..\n..#..\n..#..");
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod engine;
pub mod error;
pub mod grid;
pub mod population;
pub mod render;

pub use engine::{step, Automaton, ConwayEngine};
pub use error::{GridError, GridResult, RenderError};
pub use grid::{Grid, Topology};
pub use population::{find_pattern, Pattern, Population, PATTERNS};
pub use render::{Frame, Palette, PaletteStyle, Renderer, Rgba};
