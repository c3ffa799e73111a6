//! # PETRI
//!
//! A Conway automaton driven by start/reset signals: one bounded, paced,
//! cancellable run at a time, rendered frame by frame.
//!
//! ## Crates
//!
//! ```text
//! ┌────────────────────────────┐      ┌────────────────────────────┐
//! │ petri_core                 │      │ petri_driver               │
//! │  • Grid, Topology          │<─────│  • ControlQueue (cap 1)    │
//! │  • ConwayEngine / step     │      │  • Simulation worker       │
//! │  • Population              │      │  • SimulationConfig (TOML) │
//! │  • Renderer, Frame         │      │  • DisplaySurface          │
//! └────────────────────────────┘      └─────────────┬──────────────┘
//!                                                   │
//!                               petri: LogSurface, petri_headless
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use petri::{ConwayEngine, LogSurface, Simulation, SimulationConfig};
//!
//! let surface = Arc::new(LogSurface::new());
//! let sim = Simulation::spawn(SimulationConfig::default(), ConwayEngine, surface.clone())?;
//! surface.fire(0); // Start
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod log_surface;

pub use petri_core as core;
pub use petri_driver as driver;

pub use log_surface::LogSurface;
pub use petri_core::{
    step, Automaton, ConwayEngine, Frame, Grid, GridError, Population, Renderer, Topology,
};
pub use petri_driver::{
    ControlSignal, DisplaySurface, DriverError, RunOutcome, RunReport, RunState, Simulation,
    SimulationConfig, UiUpdate,
};
