//! # PETRI Driver
//!
//! Runs the automaton on a background worker, driven by a single-slot
//! control queue and rendered frame by frame to a display surface.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐  code   ┌───────────────┐  try_receive  ┌──────────────┐
//! │   Surface    │────────>│ Control Queue │──────────────>│    Worker    │
//! │ (GUI bridge) │         │   (cap 1)     │               │ Idle/Running │
//! │              │<────────┴───────────────┴───────────────│              │
//! └──────────────┘   UiUpdate, Frame (fire-and-forget)     └──────┬───────┘
//!                                                                 │
//!                                                  step / render  │
//!                                                     petri_core  ▼
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use petri_core::ConwayEngine;
//! use petri_driver::{ControlSignal, NullSurface, Simulation, SimulationConfig};
//!
//! let sim = Simulation::spawn(SimulationConfig::default(), ConwayEngine, Arc::new(NullSurface))?;
//! sim.sender().send(ControlSignal::Start);
//! // ... 50 generations at 10 per second ...
//! sim.shutdown()?;
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod control;
pub mod driver;
pub mod error;
pub mod surface;

pub use config::{SimulationConfig, MAX_DISPLAY_PIXELS};
pub use control::{ControlQueue, ControlReceiver, ControlSender, ControlSignal};
pub use driver::{RunOutcome, RunReport, RunState, Simulation};
pub use error::{ConfigError, DriverError, DriverResult};
pub use surface::{DisplaySurface, NullSurface, SignalHandler, UiUpdate};
