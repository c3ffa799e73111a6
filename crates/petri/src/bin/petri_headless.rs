//! # PETRI Headless Runner
//!
//! Runs the simulation with no display: control-state changes and frames
//! go to the log, and Start is pressed through the registered handler.
//!
//! ## Usage
//!
//! ```bash
//! petri_headless --config petri.toml --runs 3
//! RUST_LOG=petri_driver=debug petri_headless
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use petri::{ControlSignal, ConwayEngine, LogSurface, Simulation, SimulationConfig};
use tracing_subscriber::EnvFilter;

fn main() {
    println!("╔══════════════════════════════════════════════════════════════════╗");
    println!("║         PETRI HEADLESS                                           ║");
    println!("╚══════════════════════════════════════════════════════════════════╝");
    println!();

    let args: Vec<String> = std::env::args().collect();
    let mut config_path: Option<PathBuf> = None;
    let mut runs = 1u64;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--runs" | "-n" => {
                if i + 1 < args.len() {
                    runs = args[i + 1].parse().unwrap_or(1);
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Usage: petri_headless [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --config <PATH>   TOML config (default: built-in defaults)");
                println!("  -n, --runs <N>        Runs to execute back to back (default: 1)");
                println!("  -h, --help            Show this help");
                println!();
                println!("Log level is read from RUST_LOG (default: info).");
                return;
            }
            other => {
                eprintln!("unknown argument: {other} (try --help)");
                std::process::exit(2);
            }
        }
        i += 1;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_thread_names(true)
        .init();

    let config = match &config_path {
        Some(path) => SimulationConfig::from_file(path),
        None => Ok(SimulationConfig::default()),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => fail(&e),
    };

    let (width, height) = config.grid_size();
    println!("  Grid:        {width}x{height} ({:?})", config.topology);
    println!("  Generations: {} per run", config.max_generations);
    println!("  Pacing:      {} ms", config.pacing_ms);
    println!("  Population:  {:?}", config.population);
    println!();

    let idle_poll = config.idle_poll();
    let surface = Arc::new(LogSurface::new());
    let sim = match Simulation::spawn(config, ConwayEngine, surface.clone()) {
        Ok(sim) => sim,
        Err(e) => fail(&e),
    };

    for run in 0..runs {
        if !surface.fire(ControlSignal::Start.code()) {
            fail(&"surface has no signal handler");
        }
        while sim.runs_completed() <= run {
            if !sim.is_worker_alive() {
                fail(&"simulation worker exited unexpectedly");
            }
            thread::sleep(idle_poll);
        }
        if let Some(report) = sim.last_report() {
            println!(
                "  run {:>3}: {:>5} generations  {:?}  in {:?}",
                report.run, report.generations, report.outcome, report.elapsed
            );
        }
    }

    println!();
    println!("  Frames uploaded: {}", surface.frames_uploaded());

    if let Err(e) = sim.shutdown() {
        fail(&e);
    }
}

fn fail(error: &dyn std::fmt::Display) -> ! {
    tracing::error!("{error}");
    eprintln!("   ✗ FATAL: {error}");
    std::process::exit(1);
}
