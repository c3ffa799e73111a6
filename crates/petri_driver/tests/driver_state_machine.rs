//! # Driver State Machine Tests
//!
//! Drives a real worker through a recording surface: start, budget
//! exhaustion, early stop, reset, and failed runs.
//!
//! Run with: cargo test --package petri_driver --test driver_state_machine

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;
use petri_core::{Automaton, ConwayEngine, Frame, Grid, GridResult, Population};
use petri_driver::{
    DisplaySurface, DriverError, RunOutcome, RunState, SignalHandler, Simulation,
    SimulationConfig, UiUpdate,
};

const WAIT: Duration = Duration::from_secs(5);

// ============================================================================
// TEST DOUBLES
// ============================================================================

/// Surface that records everything and lets the test press buttons.
struct RecordingSurface {
    handler: Mutex<Option<SignalHandler>>,
    registrations: Mutex<Vec<String>>,
    updates: Sender<UiUpdate>,
    frames: AtomicUsize,
    last_frame: Mutex<Option<(String, Frame)>>,
}

impl RecordingSurface {
    fn new() -> (Arc<Self>, Receiver<UiUpdate>) {
        let (updates, rx) = unbounded();
        let surface = Arc::new(Self {
            handler: Mutex::new(None),
            registrations: Mutex::new(Vec::new()),
            updates,
            frames: AtomicUsize::new(0),
            last_frame: Mutex::new(None),
        });
        (surface, rx)
    }

    /// Simulates the user clicking a control bound to `code`.
    fn press(&self, code: i64) {
        let handler = self.handler.lock();
        (handler.as_ref().expect("no handler registered"))(code);
    }

    fn frame_count(&self) -> usize {
        self.frames.load(Ordering::SeqCst)
    }
}

impl DisplaySurface for RecordingSurface {
    fn register_signal_handler(&self, name: &str, handler: SignalHandler) {
        self.registrations.lock().push(name.to_string());
        *self.handler.lock() = Some(handler);
    }

    fn eval_ui_update(&self, update: &UiUpdate) {
        let _ = self.updates.send(update.clone());
    }

    fn upload_frame(&self, name: &str, frame: &Frame) {
        self.frames.fetch_add(1, Ordering::SeqCst);
        *self.last_frame.lock() = Some((name.to_string(), frame.clone()));
    }
}

/// Conway engine that counts its steps.
struct CountingEngine {
    steps: Arc<AtomicUsize>,
}

impl Automaton for CountingEngine {
    fn step(&self, grid: &Grid) -> GridResult<Grid> {
        self.steps.fetch_add(1, Ordering::SeqCst);
        ConwayEngine.step(grid)
    }
}

/// Fails exactly once, on call number `fail_on` (1-based).
struct FailOnceEngine {
    fail_on: usize,
    calls: AtomicUsize,
}

impl Automaton for FailOnceEngine {
    fn step(&self, grid: &Grid) -> GridResult<Grid> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call == self.fail_on {
            return Err(petri_core::GridError::UnknownPattern("injected".into()));
        }
        ConwayEngine.step(grid)
    }
}

/// Panics on its first step, then behaves.
struct PanicOnceEngine {
    calls: AtomicUsize,
}

impl Automaton for PanicOnceEngine {
    fn step(&self, grid: &Grid) -> GridResult<Grid> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            panic!("engine blew up");
        }
        ConwayEngine.step(grid)
    }
}

/// Surface whose run-start handling panics, taking the worker down.
struct FaultySurface;

impl DisplaySurface for FaultySurface {
    fn register_signal_handler(&self, _name: &str, handler: SignalHandler) {
        // Press Start as soon as the handler exists.
        handler(0);
    }

    fn eval_ui_update(&self, update: &UiUpdate) {
        if matches!(update, UiUpdate::RunStarted { .. }) {
            panic!("surface went away");
        }
    }

    fn upload_frame(&self, _name: &str, _frame: &Frame) {}
}

/// Returns a grid of the wrong shape.
struct ShrinkingEngine;

impl Automaton for ShrinkingEngine {
    fn step(&self, _grid: &Grid) -> GridResult<Grid> {
        Grid::new(1, 1)
    }
}

fn test_config() -> SimulationConfig {
    SimulationConfig::default()
        .with_display(60, 45)
        .with_scale(3)
        .with_pacing_ms(1)
        .with_idle_poll_ms(1)
}

fn next_update(rx: &Receiver<UiUpdate>) -> UiUpdate {
    rx.recv_timeout(WAIT).expect("no UI update within timeout")
}

fn wait_for_run_end(rx: &Receiver<UiUpdate>) -> (u64, u64, RunOutcome) {
    let deadline = Instant::now() + WAIT;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match rx.recv_timeout(remaining).expect("run did not end") {
            UiUpdate::RunEnded { run, generations, outcome } => return (run, generations, outcome),
            _ => continue,
        }
    }
}

// ============================================================================
// STARTUP
// ============================================================================

#[test]
fn startup_registers_handler_and_readies_controls() {
    let (surface, rx) = RecordingSurface::new();
    let sim = Simulation::spawn(test_config(), ConwayEngine, surface.clone()).unwrap();

    assert_eq!(*surface.registrations.lock(), vec!["controlchannel".to_string()]);
    assert_eq!(next_update(&rx), UiUpdate::ControlsReady);

    let (name, frame) = surface.last_frame.lock().clone().unwrap();
    assert_eq!(name, ".limage");
    assert_eq!((frame.width(), frame.height()), (60, 45));
    assert_eq!(surface.frame_count(), 1);
    assert_eq!(sim.run_state(), RunState::Idle);

    sim.shutdown().unwrap();
}

// ============================================================================
// RUNS
// ============================================================================

#[test]
fn start_runs_exactly_the_generation_budget() {
    let (surface, rx) = RecordingSurface::new();
    let steps = Arc::new(AtomicUsize::new(0));
    let engine = CountingEngine { steps: Arc::clone(&steps) };
    let sim = Simulation::spawn(test_config().with_max_generations(5), engine, surface.clone())
        .unwrap();
    assert_eq!(next_update(&rx), UiUpdate::ControlsReady);

    surface.press(0);
    assert_eq!(next_update(&rx), UiUpdate::RunStarted { run: 0 });
    assert_eq!(
        next_update(&rx),
        UiUpdate::RunEnded { run: 0, generations: 5, outcome: RunOutcome::Exhausted }
    );

    assert_eq!(steps.load(Ordering::SeqCst), 5);
    assert_eq!(surface.frame_count(), 1 + 5);
    assert_eq!(sim.run_state(), RunState::Idle);
    assert_eq!(sim.generation(), 0);
    assert_eq!(sim.runs_completed(), 1);

    // A second start begins a fresh run with a fresh counter.
    surface.press(0);
    assert_eq!(next_update(&rx), UiUpdate::RunStarted { run: 1 });
    assert_eq!(wait_for_run_end(&rx), (1, 5, RunOutcome::Exhausted));
    assert_eq!(steps.load(Ordering::SeqCst), 10);

    sim.shutdown().unwrap();
}

#[test]
fn frames_match_grid_times_scale() {
    let (surface, rx) = RecordingSurface::new();
    let config = test_config()
        .with_max_generations(1)
        .with_population(Population::Pattern { name: "blinker".into() });
    let sim = Simulation::spawn(config, ConwayEngine, surface.clone()).unwrap();

    surface.press(0);
    wait_for_run_end(&rx);

    let (_, frame) = surface.last_frame.lock().clone().unwrap();
    // 60x45 display at scale 3 is a 20x15 grid.
    assert_eq!((frame.width(), frame.height()), (60, 45));
    sim.shutdown().unwrap();
}

#[test]
fn stop_signal_cancels_within_one_generation_and_pacing() {
    const PACING_MS: u64 = 10;

    let (surface, rx) = RecordingSurface::new();
    let config = test_config()
        .with_max_generations(10_000)
        .with_pacing_ms(PACING_MS);
    let sim = Simulation::spawn(config, ConwayEngine, surface.clone()).unwrap();
    assert_eq!(next_update(&rx), UiUpdate::ControlsReady);

    surface.press(0);
    assert_eq!(next_update(&rx), UiUpdate::RunStarted { run: 0 });
    thread::sleep(Duration::from_millis(100));
    assert_eq!(sim.run_state(), RunState::Running);

    let issued = Instant::now();
    surface.press(0);
    let (_, generations, outcome) = wait_for_run_end(&rx);
    let latency = issued.elapsed();

    assert_eq!(outcome, RunOutcome::Stopped);
    assert!(generations > 0 && generations < 10_000);
    // One 20x15 step is far below a millisecond; the rest is scheduler slack.
    assert!(
        latency < Duration::from_millis(PACING_MS + 150),
        "stop took {latency:?}"
    );
    assert_eq!(sim.run_state(), RunState::Idle);

    sim.shutdown().unwrap();
}

#[test]
fn reset_while_running_stops_the_run() {
    let (surface, rx) = RecordingSurface::new();
    let sim = Simulation::spawn(
        test_config().with_max_generations(100_000),
        ConwayEngine,
        surface.clone(),
    )
    .unwrap();

    surface.press(0);
    assert_eq!(next_update(&rx), UiUpdate::ControlsReady);
    assert_eq!(next_update(&rx), UiUpdate::RunStarted { run: 0 });
    surface.press(1);

    let (_, _, outcome) = wait_for_run_end(&rx);
    assert_eq!(outcome, RunOutcome::Stopped);
    sim.shutdown().unwrap();
}

#[test]
fn reset_while_idle_clears_the_field() {
    let (surface, rx) = RecordingSurface::new();
    let sim = Simulation::spawn(test_config(), ConwayEngine, surface.clone()).unwrap();
    assert_eq!(next_update(&rx), UiUpdate::ControlsReady);
    let frames_before = surface.frame_count();

    surface.press(1);
    assert_eq!(next_update(&rx), UiUpdate::FieldCleared);

    assert_eq!(surface.frame_count(), frames_before + 1);
    let (_, frame) = surface.last_frame.lock().clone().unwrap();
    assert!(frame.as_bytes().chunks(4).all(|px| px == [0, 0, 0, 255]));
    assert_eq!(sim.run_state(), RunState::Idle);
    assert_eq!(sim.runs_completed(), 0);

    sim.shutdown().unwrap();
}

#[test]
fn unknown_code_is_ignored() {
    let (surface, rx) = RecordingSurface::new();
    let sim = Simulation::spawn(test_config(), ConwayEngine, surface.clone()).unwrap();
    assert_eq!(next_update(&rx), UiUpdate::ControlsReady);

    surface.press(9);
    assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
    assert_eq!(sim.run_state(), RunState::Idle);
    assert_eq!(sim.runs_completed(), 0);

    sim.shutdown().unwrap();
}

// ============================================================================
// FAILURES
// ============================================================================

#[test]
fn engine_failure_ends_run_and_worker_survives() {
    let (surface, rx) = RecordingSurface::new();
    let engine = FailOnceEngine { fail_on: 3, calls: AtomicUsize::new(0) };
    let sim = Simulation::spawn(test_config().with_max_generations(5), engine, surface.clone())
        .unwrap();

    surface.press(0);
    let (run, generations, outcome) = wait_for_run_end(&rx);
    assert_eq!((run, generations), (0, 2));
    assert!(matches!(outcome, RunOutcome::Failed(ref reason) if reason.contains("injected")));
    assert_eq!(sim.run_state(), RunState::Idle);

    surface.press(0);
    assert_eq!(wait_for_run_end(&rx), (1, 5, RunOutcome::Exhausted));

    sim.shutdown().unwrap();
}

#[test]
fn engine_changing_grid_shape_fails_the_run() {
    let (surface, rx) = RecordingSurface::new();
    let sim = Simulation::spawn(test_config(), ShrinkingEngine, surface.clone()).unwrap();

    surface.press(0);
    let (_, generations, outcome) = wait_for_run_end(&rx);
    assert_eq!(generations, 0);
    assert!(matches!(outcome, RunOutcome::Failed(ref reason) if reason.contains("shape")));
    assert_eq!(sim.last_report().map(|r| r.outcome), Some(outcome));

    sim.shutdown().unwrap();
}

#[test]
fn pattern_too_large_fails_the_run_and_returns_to_idle() {
    let (surface, rx) = RecordingSurface::new();
    // 60x45 at scale 3 is a 20x15 grid; the gun is 36x9.
    let config = test_config()
        .with_population(Population::Pattern { name: "gosper-glider-gun".into() });
    config.validate().unwrap();
    let sim = Simulation::spawn(config, ConwayEngine, surface.clone()).unwrap();
    assert_eq!(next_update(&rx), UiUpdate::ControlsReady);

    surface.press(0);
    assert_eq!(next_update(&rx), UiUpdate::RunStarted { run: 0 });
    let (run, generations, outcome) = wait_for_run_end(&rx);
    assert_eq!((run, generations), (0, 0));
    assert!(
        matches!(outcome, RunOutcome::Failed(ref reason) if reason.contains("36x9")),
        "{outcome:?}"
    );
    assert_eq!(sim.run_state(), RunState::Idle);
    // Only the startup blank frame: nothing was rendered.
    assert_eq!(surface.frame_count(), 1);

    // The worker still takes a fresh start.
    surface.press(0);
    assert_eq!(next_update(&rx), UiUpdate::RunStarted { run: 1 });
    let (run, _, outcome) = wait_for_run_end(&rx);
    assert_eq!(run, 1);
    assert!(matches!(outcome, RunOutcome::Failed(_)));
    assert!(sim.is_worker_alive());

    sim.shutdown().unwrap();
}

#[test]
fn engine_panic_fails_the_run_and_worker_survives() {
    let (surface, rx) = RecordingSurface::new();
    let engine = PanicOnceEngine { calls: AtomicUsize::new(0) };
    let sim = Simulation::spawn(test_config().with_max_generations(3), engine, surface.clone())
        .unwrap();

    surface.press(0);
    let (_, generations, outcome) = wait_for_run_end(&rx);
    assert_eq!(generations, 0);
    assert!(
        matches!(outcome, RunOutcome::Failed(ref reason) if reason.contains("engine blew up")),
        "{outcome:?}"
    );
    assert!(sim.is_worker_alive());

    surface.press(0);
    assert_eq!(wait_for_run_end(&rx), (1, 3, RunOutcome::Exhausted));

    sim.shutdown().unwrap();
}

#[test]
fn dead_worker_is_reported() {
    let sim = Simulation::spawn(test_config(), ConwayEngine, Arc::new(FaultySurface)).unwrap();

    let deadline = Instant::now() + WAIT;
    while sim.is_worker_alive() {
        assert!(Instant::now() < deadline, "worker outlived its surface");
        thread::sleep(Duration::from_millis(1));
    }
    assert_eq!(sim.runs_completed(), 0);
    assert!(matches!(sim.shutdown(), Err(DriverError::WorkerPanicked)));
}
