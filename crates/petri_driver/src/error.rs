//! # Driver Error Types

use std::path::PathBuf;

use petri_core::{GridError, RenderError};
use thiserror::Error;

/// Errors loading or validating a [`SimulationConfig`](crate::SimulationConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// File that was opened.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for this schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Values parse but make no sense together.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Errors raised by the simulation driver.
///
/// Only construction and shutdown surface these to the caller. Failures
/// inside a run end that run and are reported through the surface.
#[derive(Error, Debug)]
pub enum DriverError {
    /// Bad configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Grid construction or step failed.
    #[error("engine failure: {0}")]
    Grid(#[from] GridError),

    /// Renderer could not be built.
    #[error("renderer failure: {0}")]
    Render(#[from] RenderError),

    /// The OS refused to start the worker thread.
    #[error("failed to spawn simulation worker: {0}")]
    WorkerSpawn(#[source] std::io::Error),

    /// The worker thread panicked.
    #[error("simulation worker panicked")]
    WorkerPanicked,
}

/// Result type for driver operations.
pub type DriverResult<T> = Result<T, DriverError>;
