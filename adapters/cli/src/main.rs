#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs the savanna ecosystem in a terminal.
//!
//! The simulation ticks on its own worker thread while this thread reads
//! single-letter commands from standard input: `p` pauses, `r` resumes, `s`
//! steps one tick while paused and `q` stops. Closing the input stops the run.

mod render;

use std::fs;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::info;
use savanna_core::{Command, Preset, SimulationConfig};
use savanna_simulation::{spawn, Frame, RunSettings, Simulation, SimulationHandle};

const POLL_INTERVAL: Duration = Duration::from_millis(100);
const STEP_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Parser)]
#[command(name = "savanna")]
#[command(version)]
#[command(about = "Grid ecosystem of grass, herbivores and predators")]
struct Cli {
    /// Built-in map and population preset.
    #[arg(long, value_enum, default_value_t = PresetArg::Small)]
    preset: PresetArg,

    /// TOML configuration used instead of the preset; missing keys take
    /// their default values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Random seed for reproducible runs.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Milliseconds between ticks (default 3000, at most 60000).
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Stop after this many ticks; 0 runs until `q` (at most 10000).
    #[arg(long, default_value_t = 0)]
    max_ticks: u64,

    /// Start paused; use `s` to advance one tick at a time.
    #[arg(long)]
    paused: bool,

    /// Draw the whole grid after each tick instead of a one-line summary.
    #[arg(long)]
    map: bool,

    /// Print the final report as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum PresetArg {
    Small,
    Medium,
    Large,
}

impl From<PresetArg> for Preset {
    fn from(value: PresetArg) -> Self {
        match value {
            PresetArg::Small => Self::Small,
            PresetArg::Medium => Self::Medium,
            PresetArg::Large => Self::Large,
        }
    }
}

/// Entry point for the savanna command-line interface.
fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = load_config(&cli)?;
    let settings = run_settings(&cli);
    let simulation =
        Simulation::new(&config, settings.seed()).context("failed to build the simulation")?;

    let (width, height) = (config.map.width, config.map.height);
    let draw_map = cli.map;
    let observer = move |frame: &Frame| {
        if draw_map {
            println!("{}", render::grid(frame, width, height));
        } else {
            println!("{}", render::summary(frame));
        }
    };

    println!("{}", render::summary(&simulation.frame()));
    println!("commands: p = pause, r = resume, s = step, q = quit");

    let handle = spawn(simulation, settings, observer)?;
    drive(&handle)?;
    let report = handle.join().context("simulation ended with an error")?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render::report(&report));
    }
    Ok(())
}

fn load_config(cli: &Cli) -> Result<SimulationConfig> {
    match &cli.config {
        Some(path) => read_config(path),
        None => Ok(Preset::from(cli.preset).config()),
    }
}

fn read_config(path: &Path) -> Result<SimulationConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let config = parse_config(&text).with_context(|| format!("invalid {}", path.display()))?;
    info!("loaded configuration from {}", path.display());
    Ok(config)
}

fn parse_config(text: &str) -> Result<SimulationConfig> {
    let config: SimulationConfig = toml::from_str(text)?;
    config.validate()?;
    Ok(config)
}

fn run_settings(cli: &Cli) -> RunSettings {
    let settings = RunSettings::new()
        .with_max_ticks(cli.max_ticks)
        .with_start_paused(cli.paused)
        .with_seed(cli.seed);
    match cli.delay_ms {
        Some(millis) => settings.with_delay(Duration::from_millis(millis)),
        None => settings,
    }
}

/// Feeds console commands to the worker until it finishes or is told to quit.
fn drive(handle: &SimulationHandle) -> Result<()> {
    let (sender, lines) = mpsc::channel();
    let _ = thread::Builder::new()
        .name("savanna-stdin".to_owned())
        .spawn(move || read_lines(&sender))
        .context("failed to start the input reader")?;
    pump(handle, &lines);
    Ok(())
}

fn read_lines(sender: &Sender<String>) {
    for line in io::stdin().lock().lines() {
        let Ok(line) = line else {
            break;
        };
        if sender.send(line).is_err() {
            break;
        }
    }
}

fn pump(handle: &SimulationHandle, lines: &Receiver<String>) {
    while !handle.is_finished() {
        match lines.recv_timeout(POLL_INTERVAL) {
            Ok(line) => {
                if !apply(handle, line.trim()) {
                    break;
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                info!("input closed, stopping");
                handle.stop();
                break;
            }
        }
    }
}

/// Applies one console command. Returns `false` once the run should end.
fn apply(handle: &SimulationHandle, input: &str) -> bool {
    match input {
        "p" => {
            if handle.send(Command::Pause) {
                println!("paused at tick {}", handle.tick());
            } else {
                println!("already paused");
            }
        }
        "r" => {
            if handle.send(Command::Resume) {
                println!("resumed");
            } else {
                println!("not paused");
            }
        }
        "s" => match handle.step_and_wait(STEP_TIMEOUT) {
            Some(frame) => println!("stepped to tick {}", frame.tick),
            None if !handle.is_paused() => println!("pause first (p) to step"),
            None => println!("tick still running, it will be shown when it completes"),
        },
        "q" => {
            let _ = handle.send(Command::Stop);
            return false;
        }
        "" => {}
        other => println!("unknown command {other:?}; use p, r, s or q"),
    }
    true
}
