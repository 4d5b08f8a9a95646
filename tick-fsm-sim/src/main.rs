use std::io::Write;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use tick_fsm_sim::sketches::{BlinkSketch, CurtainSketch, LatchSketch, TrafficLightSketch};
use tick_fsm_sim::{SimConfig, Simulation, Sketch, parse_presses};

#[derive(Parser)]
#[command(name = "tick-fsm-sim")]
#[command(about = "Run a tick-fsm demo sketch on a simulated board")]
struct Cli {
    #[command(subcommand)]
    sketch: Sketches,

    /// Simulated time to run for
    #[arg(long, global = true, env = "TICK_FSM_DURATION_MS", default_value_t = 20_000)]
    duration_ms: u64,

    /// Simulated time added after every loop iteration
    #[arg(long, global = true, default_value_t = 1)]
    step_ms: u64,

    /// Do not write state-change diagnostics to serial
    #[arg(long, global = true)]
    quiet: bool,

    /// Button presses, e.g. `open@500,stop@3000+400` (button@millis[+hold])
    #[arg(long, global = true)]
    press: Vec<String>,

    /// Print a JSON report instead of the serial stream
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Sketches {
    /// LED blinks for two seconds, rests for two seconds
    Blink,
    /// Set/reset buttons latch an LED
    Latch,
    /// Six-phase traffic light with a reset button
    TrafficLight,
    /// Curtain motor driven by open/close/stop buttons
    Curtain,
}

fn main() -> Result<()> {
    // Reads RUST_LOG, defaulting to info
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = SimConfig {
        step_ms: cli.step_ms,
        diagnostics: !cli.quiet,
        presses: parse_presses(&cli.press.join(",")).context("parsing --press")?,
        record_serial: cli.json,
    };

    match cli.sketch {
        Sketches::Blink => run::<BlinkSketch>(&cli, &config),
        Sketches::Latch => run::<LatchSketch>(&cli, &config),
        Sketches::TrafficLight => run::<TrafficLightSketch>(&cli, &config),
        Sketches::Curtain => run::<CurtainSketch>(&cli, &config),
    }
}

fn run<S: Sketch>(cli: &Cli, config: &SimConfig) -> Result<()> {
    let mut sim = Simulation::<S>::new(config)?;
    tracing::info!(
        sketch = S::NAME,
        duration_ms = cli.duration_ms,
        step_ms = config.step_ms,
        presses = config.presses.len(),
        "Starting simulation"
    );

    let mut stdout = std::io::stdout().lock();
    while sim.board().millis() < cli.duration_ms {
        sim.step();
        if !cli.json {
            for line in sim.board().drain_serial() {
                writeln!(stdout, "{line}")?;
            }
        }
    }

    let report = sim.report();
    tracing::info!(
        elapsed_ms = report.elapsed_ms,
        final_state = report.final_state.as_deref().unwrap_or("<none>"),
        "Simulation finished"
    );

    if cli.json {
        serde_json::to_writer_pretty(&mut stdout, &report)?;
        writeln!(stdout)?;
    }
    Ok(())
}
