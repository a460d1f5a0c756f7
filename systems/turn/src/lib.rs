#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Fixed-order turn pipeline that advances the grid by one tick.
//!
//! Every tick runs [`Aging`], [`Movement`], [`BookkeepingReset`], [`Cleanup`]
//! and [`Regrowth`] in that order. Steps hold no per-tick state; whatever they
//! observe is reported as [`Event`]s collected in the [`TurnContext`].

use std::fmt;

use log::trace;
use rand::RngCore;
use savanna_core::{Event, GrassConfig, GridError};
use savanna_world::World;

mod aging;
mod bookkeeping;
mod cleanup;
mod movement;
mod regrowth;

pub use aging::Aging;
pub use bookkeeping::BookkeepingReset;
pub use cleanup::Cleanup;
pub use movement::Movement;
pub use regrowth::Regrowth;

/// Per-tick scratch shared by every step: the random source and the event log.
pub struct TurnContext<'a> {
    rng: &'a mut dyn RngCore,
    events: Vec<Event>,
}

impl<'a> TurnContext<'a> {
    /// Creates a context drawing randomness from `rng`.
    pub fn new(rng: &'a mut dyn RngCore) -> Self {
        Self {
            rng,
            events: Vec::new(),
        }
    }

    /// Random source for the current tick.
    pub fn rng(&mut self) -> &mut dyn RngCore {
        &mut *self.rng
    }

    /// Appends an event to the tick's log.
    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Events emitted so far.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Consumes the context, yielding the tick's events in emission order.
    #[must_use]
    pub fn into_events(self) -> Vec<Event> {
        self.events
    }
}

impl fmt::Debug for TurnContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TurnContext")
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}

/// One stage of the tick.
pub trait TurnStep: Send + fmt::Debug {
    /// Stable name used in logs.
    fn name(&self) -> &'static str;

    /// Applies the stage to the grid.
    ///
    /// Errors are grid programming errors; the caller must abandon the run.
    fn apply(&mut self, world: &mut World, ctx: &mut TurnContext<'_>) -> Result<(), GridError>;
}

/// Ordered collection of turn steps.
#[derive(Debug)]
pub struct Pipeline {
    steps: Vec<Box<dyn TurnStep>>,
}

impl Pipeline {
    /// Creates a pipeline running `steps` in the given order.
    #[must_use]
    pub fn new(steps: Vec<Box<dyn TurnStep>>) -> Self {
        Self { steps }
    }

    /// The standard tick: aging, movement, bookkeeping reset, cleanup, regrowth.
    #[must_use]
    pub fn standard(grass: &GrassConfig) -> Self {
        Self::new(vec![
            Box::new(Aging),
            Box::new(Movement),
            Box::new(BookkeepingReset),
            Box::new(Cleanup),
            Box::new(Regrowth::from_config(grass)),
        ])
    }

    /// Names of the steps in execution order.
    pub fn step_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.steps.iter().map(|step| step.name())
    }

    /// Runs every step once and returns the events they emitted.
    pub fn run_tick(
        &mut self,
        world: &mut World,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<Event>, GridError> {
        let mut ctx = TurnContext::new(rng);
        for step in &mut self.steps {
            let before = ctx.events().len();
            step.apply(world, &mut ctx)?;
            trace!(
                "{} emitted {} events",
                step.name(),
                ctx.events().len() - before
            );
        }
        Ok(ctx.into_events())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_pipeline_runs_in_fixed_order() {
        let pipeline = Pipeline::standard(&GrassConfig::default());
        let names: Vec<_> = pipeline.step_names().collect();
        assert_eq!(
            names,
            vec!["aging", "movement", "bookkeeping_reset", "cleanup", "regrowth"]
        );
    }
}
