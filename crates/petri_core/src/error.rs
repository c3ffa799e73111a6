//! # Core Error Types
//!
//! All errors that can occur while building, querying, stepping or
//! rendering a grid.

use thiserror::Error;

/// Errors that can occur on grid construction, query and step.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    /// A grid needs at least one column and one row, and a cell count that
    /// fits in `usize`.
    #[error("invalid grid dimensions: {width}x{height}")]
    InvalidDimensions {
        /// Requested width.
        width: usize,
        /// Requested height.
        height: usize,
    },

    /// Coordinate outside a bounded grid.
    #[error("coordinate ({x}, {y}) outside {width}x{height} grid")]
    OutOfRange {
        /// Column queried.
        x: i64,
        /// Row queried.
        y: i64,
        /// Grid width.
        width: usize,
        /// Grid height.
        height: usize,
    },

    /// Pattern rows of different lengths.
    #[error("pattern row {row} has {found} columns, expected {expected}")]
    RaggedRows {
        /// Offending row index.
        row: usize,
        /// Width of the first row.
        expected: usize,
        /// Width of the offending row.
        found: usize,
    },

    /// Pattern text contained something other than `#` or `.`.
    #[error("invalid pattern character {found:?} at row {row}, column {column}")]
    InvalidPatternChar {
        /// Row index.
        row: usize,
        /// Column index.
        column: usize,
        /// The character found.
        found: char,
    },

    /// An automaton produced a grid whose shape differs from its input.
    #[error("step changed grid shape from {expected:?} to {found:?}")]
    DimensionMismatch {
        /// (width, height) going in.
        expected: (usize, usize),
        /// (width, height) coming out.
        found: (usize, usize),
    },

    /// Named pattern not in the catalog.
    #[error("unknown pattern: {0}")]
    UnknownPattern(String),

    /// Pattern does not fit on the grid.
    #[error("pattern {name} ({pattern_width}x{pattern_height}) does not fit a {width}x{height} grid")]
    PatternTooLarge {
        /// Pattern name.
        name: &'static str,
        /// Pattern bounding-box width.
        pattern_width: usize,
        /// Pattern bounding-box height.
        pattern_height: usize,
        /// Grid width.
        width: usize,
        /// Grid height.
        height: usize,
    },
}

/// Result type for grid operations.
pub type GridResult<T> = Result<T, GridError>;

/// Errors that can occur when configuring the renderer.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderError {
    /// Scale must be at least one pixel per cell.
    #[error("invalid render scale: {0}")]
    InvalidScale(u32),
}
