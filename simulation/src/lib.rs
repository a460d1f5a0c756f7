#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Tick loop, pause/step controller and the handle used to drive them.
//!
//! [`Simulation`] owns the grid, the turn pipeline, the statistics and the
//! random source. [`spawn`] moves it onto a dedicated worker thread gated by a
//! [`Controller`]; the returned [`SimulationHandle`] issues commands and reads
//! published [`Frame`]s without ever blocking on a running tick.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{error, info};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use savanna_core::{Command, ConfigError, Event, GridError, IdGenerator, SimulationConfig};
use savanna_system_analytics::{Statistics, StatsReport};
use savanna_system_spawning::populate;
use savanna_system_turn::Pipeline;
use savanna_world::{query, World};
use thiserror::Error;

mod controller;
mod frame;
mod settings;

pub use controller::{Controller, Permission};
pub use frame::{Frame, FrameBoard, Observer};
pub use settings::{RunSettings, DEFAULT_DELAY, MAX_DELAY, MAX_TICKS_LIMIT};

/// Failures that end a run.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// The configuration was rejected before the world was built.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    /// The grid reported a programming error; its invariants can no longer be trusted.
    #[error("grid invariant violated: {0}")]
    Grid(#[from] GridError),
    /// The worker thread could not be started.
    #[error("failed to start the simulation worker: {0}")]
    Spawn(#[from] std::io::Error),
    /// The worker thread panicked.
    #[error("simulation worker panicked")]
    WorkerPanicked,
}

/// Grid, pipeline, statistics and random source advanced one tick at a time.
#[derive(Debug)]
pub struct Simulation {
    world: World,
    pipeline: Pipeline,
    stats: Statistics,
    rng: ChaCha8Rng,
    tick: u64,
}

impl Simulation {
    /// Validates `config`, builds and populates the world, and captures the
    /// starting population.
    pub fn new(config: &SimulationConfig, seed: u64) -> Result<Self, SimulationError> {
        config.validate()?;
        let mut world = World::from_config(&config.map)?;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut ids = IdGenerator::new();
        let _ = populate(&mut world, config, &mut ids, &mut rng)?;

        Ok(Self::from_parts(world, Pipeline::standard(&config.grass), rng))
    }

    /// Wraps an already populated world.
    #[must_use]
    pub fn with_world(world: World, pipeline: Pipeline, seed: u64) -> Self {
        Self::from_parts(world, pipeline, ChaCha8Rng::seed_from_u64(seed))
    }

    fn from_parts(world: World, pipeline: Pipeline, rng: ChaCha8Rng) -> Self {
        let mut stats = Statistics::new();
        stats.capture_initial(&world);
        Self {
            world,
            pipeline,
            stats,
            rng,
            tick: 0,
        }
    }

    /// Current grid.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Statistics gathered so far.
    #[must_use]
    pub fn stats(&self) -> &Statistics {
        &self.stats
    }

    /// Number of ticks applied.
    #[must_use]
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Applies one tick, feeds its events to the statistics and returns them.
    pub fn next_turn(&mut self) -> Result<Vec<Event>, GridError> {
        let events = self.pipeline.run_tick(&mut self.world, &mut self.rng)?;
        self.stats.handle(&events);
        self.tick += 1;
        let _ = self.stats.consistency_check(&self.world);
        Ok(events)
    }

    /// Read-only copy of the current state for observers.
    #[must_use]
    pub fn frame(&self) -> Frame {
        Frame {
            tick: self.tick,
            step: 0,
            occupants: query::occupants(&self.world),
            stats: self.report(),
        }
    }

    /// Statistics summary as of the current tick.
    #[must_use]
    pub fn report(&self) -> StatsReport {
        self.stats.report(self.tick)
    }
}

/// Moves `simulation` onto a worker thread and starts the tick loop.
pub fn spawn<O>(
    simulation: Simulation,
    settings: RunSettings,
    observer: O,
) -> Result<SimulationHandle, SimulationError>
where
    O: Observer + 'static,
{
    let controller = Arc::new(Controller::new(settings.start_paused()));
    let board = Arc::new(FrameBoard::new());

    let worker = {
        let controller = Arc::clone(&controller);
        let board = Arc::clone(&board);
        thread::Builder::new()
            .name("savanna-worker".to_owned())
            .spawn(move || run(simulation, settings, &controller, &board, observer))?
    };

    Ok(SimulationHandle {
        controller,
        board,
        worker: Some(worker),
    })
}

fn run<O>(
    mut simulation: Simulation,
    settings: RunSettings,
    controller: &Controller,
    board: &FrameBoard,
    mut observer: O,
) -> Result<StatsReport, SimulationError>
where
    O: Observer,
{
    let _ = board.publish(simulation.frame());
    info!(
        "simulation started: delay={:?}, max_ticks={}, paused={}",
        settings.delay(),
        settings.max_ticks(),
        settings.start_paused()
    );

    let outcome = loop {
        if controller.await_permission() == Permission::Stop {
            break Ok(());
        }
        if let Err(grid_error) = simulation.next_turn() {
            error!("tick {} aborted: {grid_error}", simulation.tick() + 1);
            break Err(SimulationError::from(grid_error));
        }

        let mut frame = simulation.frame();
        frame.step = controller.steps_taken();
        let frame = board.publish(frame);
        observer.on_tick(&frame);

        if settings.limit_reached(simulation.tick()) {
            info!("tick limit {} reached", settings.max_ticks());
            break Ok(());
        }
        if controller.rest(settings.delay()) == Permission::Stop {
            break Ok(());
        }
    };

    controller.stop();
    board.close();
    info!("simulation stopped after {} ticks", simulation.tick());
    outcome.map(|()| simulation.report())
}

/// Command-side handle to a running simulation.
///
/// Dropping the handle stops the worker and waits for it.
#[derive(Debug)]
pub struct SimulationHandle {
    controller: Arc<Controller>,
    board: Arc<FrameBoard>,
    worker: Option<JoinHandle<Result<StatsReport, SimulationError>>>,
}

impl SimulationHandle {
    /// Applies a control command. Returns `false` when it had no effect.
    pub fn send(&self, command: Command) -> bool {
        match command {
            Command::Pause => self.controller.pause(),
            Command::Resume => self.controller.resume(),
            Command::Step => self.controller.request_one_step().is_some(),
            Command::Stop => {
                self.controller.stop();
                true
            }
        }
    }

    /// Requests a single tick and waits up to `timeout` for it to be published.
    ///
    /// The wait is keyed to the step ticket, so a tick already in flight when
    /// the request arrives does not satisfy it. Returns `None` if the
    /// controller is not paused or the stepped tick did not complete in time;
    /// the worker is not cancelled.
    pub fn step_and_wait(&self, timeout: Duration) -> Option<Arc<Frame>> {
        let ticket = self.controller.request_one_step()?;
        self.board.await_step(ticket, timeout)
    }

    /// Ticks applied so far.
    #[must_use]
    pub fn tick(&self) -> u64 {
        self.board.tick()
    }

    /// Reports whether the controller is paused.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.controller.is_paused()
    }

    /// Reports whether the worker has left its loop.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.worker.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Stops the worker after any in-flight tick.
    pub fn stop(&self) {
        self.controller.stop();
    }

    /// Waits for the worker and returns the final statistics.
    pub fn join(mut self) -> Result<StatsReport, SimulationError> {
        self.finish()
    }

    fn finish(&mut self) -> Result<StatsReport, SimulationError> {
        let Some(worker) = self.worker.take() else {
            return Err(SimulationError::WorkerPanicked);
        };
        worker
            .join()
            .unwrap_or(Err(SimulationError::WorkerPanicked))
    }
}

impl Drop for SimulationHandle {
    fn drop(&mut self) {
        if self.worker.is_some() {
            self.controller.stop();
            let _ = self.finish();
        }
    }
}
