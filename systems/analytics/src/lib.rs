#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Population statistics fed by turn events.
//!
//! Deaths can be observed by aging, by movement and by cleanup, so death
//! registration is keyed by creature identity and counts each creature once.

use std::collections::{BTreeMap, HashSet};

use log::{debug, info, warn};
use savanna_core::{CreatureId, DeathReason, Entity, Event, Species};
use savanna_world::World;

mod report;

pub use report::{SpeciesCounts, StatsReport};

/// Monotonic counters describing how the population evolved.
#[derive(Clone, Debug, Default)]
pub struct Statistics {
    initial: SpeciesCounts,
    starved: SpeciesCounts,
    killed_by_predator: u64,
    kills_by_predator: BTreeMap<CreatureId, u64>,
    grass_by_herbivore: BTreeMap<CreatureId, u64>,
    grass_grown: u64,
    moves: u64,
    blocked_moves: u64,
    counted_deaths: HashSet<CreatureId>,
}

impl Statistics {
    /// Creates empty statistics.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the starting population and seeds the per-creature tallies.
    pub fn capture_initial(&mut self, world: &World) {
        self.initial = SpeciesCounts::default();
        for (_, entity) in world.iter() {
            let Some(id) = entity.creature_id() else {
                continue;
            };
            match entity {
                Entity::Herbivore(_) => {
                    self.initial.herbivores += 1;
                    let _ = self.grass_by_herbivore.entry(id).or_insert(0);
                }
                Entity::Predator(_) => {
                    self.initial.predators += 1;
                    let _ = self.kills_by_predator.entry(id).or_insert(0);
                }
                _ => {}
            }
        }
        info!(
            "initial population: {} herbivores, {} predators",
            self.initial.herbivores, self.initial.predators
        );
    }

    /// Counts a death once per creature.
    ///
    /// The first registration of a predator kill also credits the killer.
    /// Returns `false` when the creature had already been counted.
    pub fn register_death(
        &mut self,
        creature: CreatureId,
        species: Species,
        reason: DeathReason,
        killed_by: Option<CreatureId>,
    ) -> bool {
        if !self.counted_deaths.insert(creature) {
            return false;
        }

        match (species, reason) {
            (Species::Herbivore, DeathReason::Starvation) => self.starved.herbivores += 1,
            (Species::Predator, DeathReason::Starvation) => self.starved.predators += 1,
            (Species::Herbivore, DeathReason::KilledByPredator) => {
                self.killed_by_predator += 1;
                if let Some(predator) = killed_by {
                    *self.kills_by_predator.entry(predator).or_insert(0) += 1;
                }
            }
            (Species::Predator, DeathReason::KilledByPredator) => {
                warn!("predator {creature} reported as killed by a predator");
            }
        }
        debug!("registered death of {species} {creature}: {reason:?}");
        true
    }

    /// Credits one eaten grass cell to `herbivore`.
    pub fn register_grass_eaten(&mut self, herbivore: CreatureId) {
        *self.grass_by_herbivore.entry(herbivore).or_insert(0) += 1;
    }

    /// Folds a tick's events into the counters.
    pub fn handle(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::CreatureDied {
                    creature,
                    species,
                    reason,
                    killed_by,
                } => {
                    let _ = self.register_death(*creature, *species, *reason, *killed_by);
                }
                Event::GrassEaten { herbivore } => self.register_grass_eaten(*herbivore),
                Event::GrassGrown { .. } => self.grass_grown += 1,
                Event::CreatureMoved { .. } => self.moves += 1,
                Event::MoveBlocked { .. } => self.blocked_moves += 1,
            }
        }
    }

    /// Reports whether `creature` has already been counted as dead.
    #[must_use]
    pub fn is_registered_dead(&self, creature: CreatureId) -> bool {
        self.counted_deaths.contains(&creature)
    }

    /// Compares the counters against the grid and logs every mismatch.
    ///
    /// Returns `true` when everything adds up. Never fails the run.
    pub fn consistency_check(&self, world: &World) -> bool {
        let mut left = SpeciesCounts::default();
        for (location, entity) in world.iter() {
            let Some(creature) = entity.creature() else {
                continue;
            };
            if creature.is_dead() {
                debug!(
                    "corpse {} left at {location} with hp={} reason={:?}",
                    creature.id(),
                    creature.hp(),
                    creature.death_reason()
                );
            }
            match entity.species() {
                Some(Species::Herbivore) => left.herbivores += 1,
                Some(Species::Predator) => left.predators += 1,
                None => {}
            }
        }

        let dead = self.dead();
        let mut consistent = true;
        for (name, initial, remaining, died) in [
            ("herbivores", self.initial.herbivores, left.herbivores, dead.herbivores),
            ("predators", self.initial.predators, left.predators, dead.predators),
        ] {
            if remaining + died != initial {
                warn!(
                    "{name}: initial={initial}, left={remaining}, dead={died}, sum={}",
                    remaining + died
                );
                consistent = false;
            }
        }

        let credited: u64 = self.kills_by_predator.values().sum();
        if credited != self.killed_by_predator {
            warn!(
                "per-predator kills sum to {credited} but {} herbivores were killed",
                self.killed_by_predator
            );
            consistent = false;
        }
        consistent
    }

    /// Deaths counted so far per species.
    #[must_use]
    pub fn dead(&self) -> SpeciesCounts {
        SpeciesCounts {
            herbivores: self.starved.herbivores + self.killed_by_predator,
            predators: self.starved.predators,
        }
    }

    /// Population at capture time.
    #[must_use]
    pub const fn initial(&self) -> SpeciesCounts {
        self.initial
    }

    /// Starvation deaths per species.
    #[must_use]
    pub const fn starved(&self) -> SpeciesCounts {
        self.starved
    }

    /// Herbivores killed by predators.
    #[must_use]
    pub const fn killed_by_predator(&self) -> u64 {
        self.killed_by_predator
    }

    /// Kills credited to each predator.
    #[must_use]
    pub fn kills_by_predator(&self) -> &BTreeMap<CreatureId, u64> {
        &self.kills_by_predator
    }

    /// Grass cells eaten by each herbivore.
    #[must_use]
    pub fn grass_by_herbivore(&self) -> &BTreeMap<CreatureId, u64> {
        &self.grass_by_herbivore
    }

    /// Builds a serializable summary.
    #[must_use]
    pub fn report(&self, tick: u64) -> StatsReport {
        let dead = self.dead();
        StatsReport {
            tick,
            initial: self.initial,
            left: SpeciesCounts {
                herbivores: self.initial.herbivores.saturating_sub(dead.herbivores),
                predators: self.initial.predators.saturating_sub(dead.predators),
            },
            starved: self.starved,
            killed_by_predator: self.killed_by_predator,
            grass_eaten: self.grass_by_herbivore.values().sum(),
            grass_grown: self.grass_grown,
            moves: self.moves,
            blocked_moves: self.blocked_moves,
            kills_by_predator: self
                .kills_by_predator
                .iter()
                .map(|(id, kills)| (id.get(), *kills))
                .collect(),
            grass_by_herbivore: self
                .grass_by_herbivore
                .iter()
                .map(|(id, meals)| (id.get(), *meals))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_registration_changes_nothing() {
        let mut stats = Statistics::new();
        let id = CreatureId::new(3);
        assert!(stats.register_death(id, Species::Herbivore, DeathReason::Starvation, None));
        assert!(!stats.register_death(id, Species::Herbivore, DeathReason::Starvation, None));
        assert!(!stats.register_death(
            id,
            Species::Herbivore,
            DeathReason::KilledByPredator,
            Some(CreatureId::new(9))
        ));

        assert_eq!(stats.starved().herbivores, 1);
        assert_eq!(stats.killed_by_predator(), 0);
        assert!(stats.kills_by_predator().is_empty());
        assert!(stats.is_registered_dead(id));
    }
}
