//! # Display Surface
//!
//! The driver's view of the outside world: where control signals come
//! from, where control-state changes go, where frames are shown.
//!
//! Everything here is fire-and-forget from the driver's side. A surface
//! that fails to apply an update must swallow the failure; nothing flows
//! back into the simulation.

use petri_core::Frame;

use crate::driver::RunOutcome;

/// Callback the surface invokes with a wire code when the user issues a
/// command (`0` start, `1` reset).
pub type SignalHandler = Box<dyn Fn(i64) + Send + Sync>;

/// Control-state change the surface should reflect.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UiUpdate {
    /// Driver is up: the start control accepts input.
    ControlsReady,
    /// A run began: start control reads "Stop", reset control enabled.
    RunStarted {
        /// Index of the run, starting at 0.
        run: u64,
    },
    /// A run ended: start control reads "Start", reset control disabled.
    RunEnded {
        /// Index of the run.
        run: u64,
        /// Generations completed.
        generations: u64,
        /// Why the run ended.
        outcome: RunOutcome,
    },
    /// The field was cleared by a reset while idle.
    FieldCleared,
}

/// External display/control surface (GUI bridge, headless logger, test probe).
pub trait DisplaySurface: Send + Sync {
    /// Registers the driver's ingestion point under `name`. Called exactly
    /// once per simulation.
    fn register_signal_handler(&self, name: &str, handler: SignalHandler);

    /// Applies a control-state change.
    fn eval_ui_update(&self, update: &UiUpdate);

    /// Shows a frame under the image name `name`.
    fn upload_frame(&self, name: &str, frame: &Frame);
}

/// Surface that discards everything. Signals can only be sent through
/// [`Simulation::sender`](crate::Simulation::sender).
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSurface;

impl DisplaySurface for NullSurface {
    fn register_signal_handler(&self, _name: &str, _handler: SignalHandler) {}

    fn eval_ui_update(&self, _update: &UiUpdate) {}

    fn upload_frame(&self, _name: &str, _frame: &Frame) {}
}
