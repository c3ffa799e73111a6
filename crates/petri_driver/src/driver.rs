//! # Simulation Driver
//!
//! Turns control signals into bounded, paced, cancellable runs on a
//! background worker thread.
//!
//! ## State Machine
//!
//! ```text
//!            Start                        budget exhausted
//!   ┌──────┐ ─────────────────────> ┌─────────┐ ─┐ any signal
//!   │ Idle │                        │ Running │  │ failure / panic
//!   └──────┘ <───────────────────── └─────────┘ <┘
//!     │  ^
//!     └──┘ Reset: clear the field
//! ```
//!
//! ## Run Loop
//!
//! ```text
//! populate gen 0 ─> ┌─ step ─> render ─> upload ─> sleep(pacing) ─> poll ─┐
//!                   └──────────────── signal? no, budget left ────────────┘
//! ```
//!
//! A stop request is only seen at the poll point, so the worst-case
//! cancellation latency is one step plus one pacing interval.
//!
//! ## Ownership
//!
//! The worker owns the run state, the generation counter and the grid.
//! [`Simulation`] only reads mirrors of them; the control queue is the one
//! way in.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use petri_core::{Automaton, Frame, Grid, GridError, Renderer};

use crate::config::SimulationConfig;
use crate::control::{ControlQueue, ControlReceiver, ControlSender, ControlSignal};
use crate::error::{DriverError, DriverResult};
use crate::surface::{DisplaySurface, UiUpdate};

/// Run/idle state of the driver.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RunState {
    /// Waiting for a start signal.
    Idle = 0,
    /// Inside the paced generation loop.
    Running = 1,
}

impl RunState {
    const fn from_u8(v: u8) -> Self {
        if v == Self::Running as u8 {
            Self::Running
        } else {
            Self::Idle
        }
    }
}

/// Why a run ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// Generation budget used up.
    Exhausted,
    /// A signal arrived during the run.
    Stopped,
    /// The simulation was shut down mid-run.
    ShutDown,
    /// Grid construction or a step failed.
    Failed(String),
}

/// Summary of one finished run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunReport {
    /// Index of the run, starting at 0.
    pub run: u64,
    /// Generations completed before the run ended.
    pub generations: u64,
    /// Why the run ended.
    pub outcome: RunOutcome,
    /// Wall time from start to end.
    pub elapsed: Duration,
}

/// Read-only mirrors published by the worker.
#[derive(Default)]
struct Status {
    run_state: AtomicU8,
    generation: AtomicU64,
    runs_completed: AtomicU64,
    last_report: Mutex<Option<RunReport>>,
    shutdown: AtomicBool,
}

/// Handle to a running simulation.
///
/// Dropping the handle shuts the worker down and joins it.
pub struct Simulation {
    sender: ControlSender,
    status: Arc<Status>,
    worker: Option<JoinHandle<()>>,
}

impl Simulation {
    /// Validates `config`, wires the control queue into `surface` and starts
    /// the worker in the `Idle` state.
    ///
    /// Before returning, the signal handler is registered under
    /// `config.command_name`, the controls are marked ready and a blank frame
    /// is uploaded.
    ///
    /// # Errors
    ///
    /// Fails on an invalid config or if the worker thread cannot be spawned.
    pub fn spawn<A: Automaton>(
        config: SimulationConfig,
        engine: A,
        surface: Arc<dyn DisplaySurface>,
    ) -> DriverResult<Self> {
        config.validate()?;
        let renderer = Renderer::new(config.scale, config.render_palette())?;
        let (sender, control) = ControlQueue::new();
        let status = Arc::new(Status::default());

        let handler_sender = sender.clone();
        surface.register_signal_handler(
            &config.command_name,
            Box::new(move |code| {
                tracing::debug!(code, "command received");
                handler_sender.send_code(code);
            }),
        );

        let worker = Worker {
            config,
            engine,
            renderer,
            surface,
            control,
            status: Arc::clone(&status),
            run_state: RunState::Idle,
            generation: 0,
            runs: 0,
        };
        worker.surface.eval_ui_update(&UiUpdate::ControlsReady);
        worker.upload_blank();

        let handle = thread::Builder::new()
            .name("petri-driver".into())
            .spawn(move || worker.run())
            .map_err(DriverError::WorkerSpawn)?;

        Ok(Self {
            sender,
            status,
            worker: Some(handle),
        })
    }

    /// A sender for control signals, for callers that bypass the surface.
    #[must_use]
    pub fn sender(&self) -> ControlSender {
        self.sender.clone()
    }

    /// Current run state as last published by the worker.
    #[must_use]
    pub fn run_state(&self) -> RunState {
        RunState::from_u8(self.status.run_state.load(Ordering::Acquire))
    }

    /// Generation of the active run; 0 while idle.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.status.generation.load(Ordering::Acquire)
    }

    /// Number of runs that have ended.
    #[must_use]
    pub fn runs_completed(&self) -> u64 {
        self.status.runs_completed.load(Ordering::Acquire)
    }

    /// Report of the most recent finished run.
    #[must_use]
    pub fn last_report(&self) -> Option<RunReport> {
        self.status.last_report.lock().clone()
    }

    /// Whether the worker thread is still running. `false` after shutdown
    /// or if the worker died outside a run.
    #[must_use]
    pub fn is_worker_alive(&self) -> bool {
        self.worker.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Asks the worker to exit at its next poll point and waits for it.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::WorkerPanicked`] if the worker panicked.
    pub fn shutdown(mut self) -> DriverResult<()> {
        self.stop_worker()
    }

    fn stop_worker(&mut self) -> DriverResult<()> {
        self.status.shutdown.store(true, Ordering::Release);
        match self.worker.take() {
            Some(handle) => handle.join().map_err(|_| DriverError::WorkerPanicked),
            None => Ok(()),
        }
    }
}

impl Drop for Simulation {
    fn drop(&mut self) {
        if let Err(e) = self.stop_worker() {
            tracing::error!("{e}");
        }
    }
}

/// State owned by the background thread.
struct Worker<A: Automaton> {
    config: SimulationConfig,
    engine: A,
    renderer: Renderer,
    surface: Arc<dyn DisplaySurface>,
    control: ControlReceiver,
    status: Arc<Status>,
    run_state: RunState,
    generation: u64,
    runs: u64,
}

impl<A: Automaton> Worker<A> {
    fn run(mut self) {
        tracing::info!(
            grid = ?self.config.grid_size(),
            max_generations = self.config.max_generations,
            "simulation worker started"
        );

        while !self.shutdown_requested() {
            match self.control.try_receive() {
                Some(ControlSignal::Start) => self.execute_run(),
                Some(ControlSignal::Reset) => self.clear_field(),
                None => thread::sleep(self.config.idle_poll()),
            }
        }

        tracing::info!(runs = self.runs, "simulation worker stopped");
    }

    /// One full `Idle -> Running -> Idle` cycle.
    fn execute_run(&mut self) {
        debug_assert_eq!(self.run_state, RunState::Idle);
        let run = self.runs;
        self.runs += 1;
        let started = Instant::now();

        self.set_generation(0);
        self.enter(RunState::Running);
        tracing::info!(run, "starting run");
        self.surface.eval_ui_update(&UiUpdate::RunStarted { run });

        let outcome = match panic::catch_unwind(AssertUnwindSafe(|| self.generations(run))) {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => {
                tracing::error!(run, generation = self.generation, "run failed: {e}");
                RunOutcome::Failed(e.to_string())
            }
            Err(payload) => {
                let reason = format!("engine panicked: {}", panic_message(payload.as_ref()));
                tracing::error!(run, generation = self.generation, "run failed: {reason}");
                RunOutcome::Failed(reason)
            }
        };

        let report = RunReport {
            run,
            generations: self.generation,
            outcome,
            elapsed: started.elapsed(),
        };
        tracing::info!(
            run,
            generations = report.generations,
            outcome = ?report.outcome,
            elapsed_ms = u64::try_from(report.elapsed.as_millis()).unwrap_or(u64::MAX),
            "ending run"
        );

        self.set_generation(0);
        self.enter(RunState::Idle);
        *self.status.last_report.lock() = Some(report.clone());
        self.status.runs_completed.fetch_add(1, Ordering::AcqRel);

        self.surface.eval_ui_update(&UiUpdate::RunEnded {
            run,
            generations: report.generations,
            outcome: report.outcome,
        });
    }

    /// The paced loop. Returns how the run ended; `Err` only for grid and
    /// engine failures.
    fn generations(&mut self, run: u64) -> DriverResult<RunOutcome> {
        let (width, height) = self.config.grid_size();
        let mut grid = self
            .config
            .population
            .populate(width, height, self.config.topology, run)?;
        tracing::debug!(run, population = grid.population(), "generation 0 seeded");

        for _ in 0..self.config.max_generations {
            grid = self.advance(&grid)?;
            self.set_generation(self.generation + 1);

            let frame = self.renderer.render(&grid);
            self.surface.upload_frame(&self.config.image_name, &frame);
            tracing::debug!(
                generation = self.generation,
                population = grid.population(),
                "frame uploaded"
            );

            thread::sleep(self.config.pacing());

            if self.shutdown_requested() {
                return Ok(RunOutcome::ShutDown);
            }
            if let Some(signal) = self.control.try_receive() {
                tracing::info!(?signal, generation = self.generation, "got an exit signal");
                return Ok(RunOutcome::Stopped);
            }
        }

        Ok(RunOutcome::Exhausted)
    }

    /// Steps once and checks the engine kept the grid's shape.
    fn advance(&self, grid: &Grid) -> DriverResult<Grid> {
        let next = self.engine.step(grid)?;
        let (expected, found) = (
            (grid.width(), grid.height()),
            (next.width(), next.height()),
        );
        if expected != found {
            return Err(GridError::DimensionMismatch { expected, found }.into());
        }
        Ok(next)
    }

    fn clear_field(&self) {
        tracing::info!("reset while idle, clearing field");
        self.upload_blank();
        self.surface.eval_ui_update(&UiUpdate::FieldCleared);
    }

    fn upload_blank(&self) {
        let (width, height) = self.config.grid_size();
        let scale = self.renderer.scale();
        let frame = Frame::blank(width * scale, height * scale, self.renderer.palette().background);
        self.surface.upload_frame(&self.config.image_name, &frame);
    }

    fn enter(&mut self, state: RunState) {
        self.run_state = state;
        self.status.run_state.store(state as u8, Ordering::Release);
    }

    fn set_generation(&mut self, generation: u64) {
        self.generation = generation;
        self.status.generation.store(generation, Ordering::Release);
    }

    fn shutdown_requested(&self) -> bool {
        self.status.shutdown.load(Ordering::Acquire)
    }
}

/// Text of a panic payload, if it carries one.
fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string payload")
}
