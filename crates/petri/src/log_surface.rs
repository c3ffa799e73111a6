//! # Logging Surface
//!
//! A [`DisplaySurface`] with no screen. Control-state changes are logged
//! at `info`, frames at `trace`, and the registered handler is kept so a
//! caller can press the buttons with [`LogSurface::fire`].

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use petri_core::Frame;
use petri_driver::{DisplaySurface, SignalHandler, UiUpdate};

/// Headless surface that traces every call.
#[derive(Default)]
pub struct LogSurface {
    handler: Mutex<Option<SignalHandler>>,
    frames: AtomicU64,
}

impl LogSurface {
    /// Creates a surface with no handler registered.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Invokes the registered handler with `code`, as a button click would.
    ///
    /// Returns `false` if no handler has been registered yet.
    pub fn fire(&self, code: i64) -> bool {
        match self.handler.lock().as_ref() {
            Some(handler) => {
                handler(code);
                true
            }
            None => {
                tracing::warn!(code, "no signal handler registered");
                false
            }
        }
    }

    /// Frames uploaded so far, blank frames included.
    #[must_use]
    pub fn frames_uploaded(&self) -> u64 {
        self.frames.load(Ordering::Relaxed)
    }
}

impl DisplaySurface for LogSurface {
    fn register_signal_handler(&self, name: &str, handler: SignalHandler) {
        let mut slot = self.handler.lock();
        if slot.is_some() {
            tracing::warn!(name, "replacing signal handler");
        }
        *slot = Some(handler);
        tracing::info!(name, "signal handler registered");
    }

    fn eval_ui_update(&self, update: &UiUpdate) {
        match update {
            UiUpdate::ControlsReady => tracing::info!("controls ready"),
            UiUpdate::RunStarted { run } => {
                tracing::info!(run, "[Stop] reset enabled");
            }
            UiUpdate::RunEnded {
                run,
                generations,
                outcome,
            } => {
                tracing::info!(run, generations, ?outcome, "[Start] reset disabled");
            }
            UiUpdate::FieldCleared => tracing::info!("field cleared"),
        }
    }

    fn upload_frame(&self, name: &str, frame: &Frame) {
        let count = self.frames.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::trace!(
            name,
            count,
            width = frame.width(),
            height = frame.height(),
            bytes = frame.as_bytes().len(),
            "frame uploaded"
        );
    }
}
