#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Savanna ecosystem simulation.
//!
//! This crate defines the vocabulary every other crate speaks: grid
//! [`Location`]s, the closed [`Entity`] enumeration with its capability table,
//! creature identities handed out by an explicit [`IdGenerator`], the control
//! [`Command`]s an operator may issue, and the [`Event`] stream the turn
//! pipeline publishes for statistics and observers.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod config;

pub use config::{
    ConfigError, CreaturesConfig, GrassConfig, MapConfig, ObstaclesConfig, Preset,
    SimulationConfig,
};

/// Location of a single grid cell expressed as a signed column/row pair.
///
/// Coordinates are signed so neighbour arithmetic may step off the grid; the
/// grid store rejects such locations instead of wrapping them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location {
    // Row first so the derived order is row-major.
    y: i32,
    x: i32,
}

impl Location {
    /// Creates a new grid location.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Zero-based column of the location.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Zero-based row of the location.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Returns the location shifted by the provided deltas.
    #[must_use]
    pub const fn offset(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.x.saturating_add(dx), self.y.saturating_add(dy))
    }

    /// Four orthogonal neighbours in planning order: +x, -x, +y, -y.
    #[must_use]
    pub const fn cardinal_neighbors(&self) -> [Location; 4] {
        [
            self.offset(1, 0),
            self.offset(-1, 0),
            self.offset(0, 1),
            self.offset(0, -1),
        ]
    }

    /// The eight cells surrounding the location, orthogonal ones first.
    #[must_use]
    pub const fn surrounding(&self) -> [Location; 8] {
        [
            self.offset(1, 0),
            self.offset(-1, 0),
            self.offset(0, 1),
            self.offset(0, -1),
            self.offset(1, 1),
            self.offset(-1, -1),
            self.offset(1, -1),
            self.offset(-1, 1),
        ]
    }

    /// Computes the Manhattan distance between two locations.
    #[must_use]
    pub fn manhattan_distance(self, other: Location) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Unique identifier assigned to a creature.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CreatureId(u32);

impl CreatureId {
    /// Creates a new creature identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for CreatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonic source of creature identities.
///
/// The generator is owned by whoever builds the world and passed explicitly
/// into creature construction, so tests can pin identities.
#[derive(Clone, Debug)]
pub struct IdGenerator {
    next: u32,
}

impl IdGenerator {
    /// Creates a generator whose first identity is `1`.
    #[must_use]
    pub const fn new() -> Self {
        Self::starting_at(1)
    }

    /// Creates a generator whose first identity is `first`.
    #[must_use]
    pub const fn starting_at(first: u32) -> Self {
        Self { next: first }
    }

    /// Hands out the next identity.
    pub fn next_id(&mut self) -> CreatureId {
        let id = CreatureId::new(self.next);
        self.next = self.next.wrapping_add(1);
        id
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Mobile species living on the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Species {
    /// Grass eater that flees from predators.
    Herbivore,
    /// Hunter that attacks herbivores.
    Predator,
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Herbivore => f.write_str("herbivore"),
            Self::Predator => f.write_str("predator"),
        }
    }
}

/// Tagged cause of a creature's death.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeathReason {
    /// Health ran out through aging.
    Starvation,
    /// Health was taken by a predator's attack.
    KilledByPredator,
}

/// Inclusive bounds that every grass nutrition value stays within.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NutritionRange {
    /// Smallest nutrition a grass cell may carry.
    pub min: u32,
    /// Largest nutrition a grass cell may carry.
    pub max: u32,
}

impl NutritionRange {
    /// Creates a new nutrition range.
    #[must_use]
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// Clamps a nutrition value into the range.
    #[must_use]
    pub fn clamp(&self, value: u32) -> u32 {
        value.max(self.min).min(self.max)
    }

    /// Draws a uniformly distributed nutrition value from the range.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        if self.max <= self.min {
            return self.min;
        }
        rng.gen_range(self.min..=self.max)
    }
}

impl Default for NutritionRange {
    fn default() -> Self {
        Self::new(7, 12)
    }
}

/// Plant cell that herbivores consume.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grass {
    nutrition: u32,
    range: NutritionRange,
    eaten_by: Option<CreatureId>,
}

impl Grass {
    /// Creates grass with the provided nutrition clamped into `range`.
    #[must_use]
    pub fn new(nutrition: u32, range: NutritionRange) -> Self {
        Self {
            nutrition: range.clamp(nutrition),
            range,
            eaten_by: None,
        }
    }

    /// Creates grass with a nutrition value drawn from `range`.
    pub fn random<R: Rng + ?Sized>(range: NutritionRange, rng: &mut R) -> Self {
        Self::new(range.sample(rng), range)
    }

    /// Nutrition the grass provides when eaten.
    #[must_use]
    pub const fn nutrition(&self) -> u32 {
        self.nutrition
    }

    /// Herbivore that consumed the grass this tick, if any.
    #[must_use]
    pub const fn eaten_by(&self) -> Option<CreatureId> {
        self.eaten_by
    }

    /// Marks the grass as consumed by `herbivore`.
    pub fn mark_eaten(&mut self, herbivore: CreatureId) {
        self.eaten_by = Some(herbivore);
    }
}

/// State shared by every mobile creature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Creature {
    id: CreatureId,
    speed: u32,
    hp: u32,
    death_reason: Option<DeathReason>,
    turns_lived: u32,
}

impl Creature {
    /// Creates a living creature. A zero speed is raised to one step per tick.
    #[must_use]
    pub fn new(id: CreatureId, speed: u32, hp: u32) -> Self {
        Self {
            id,
            speed: speed.max(1),
            hp,
            death_reason: None,
            turns_lived: 0,
        }
    }

    /// Identity assigned at creation.
    #[must_use]
    pub const fn id(&self) -> CreatureId {
        self.id
    }

    /// Number of sub-steps the creature may take per tick.
    #[must_use]
    pub const fn speed(&self) -> u32 {
        self.speed
    }

    /// Remaining health.
    #[must_use]
    pub const fn hp(&self) -> u32 {
        self.hp
    }

    /// Recorded cause of death, if the creature died.
    #[must_use]
    pub const fn death_reason(&self) -> Option<DeathReason> {
        self.death_reason
    }

    /// Number of ticks the creature has aged through.
    #[must_use]
    pub const fn turns_lived(&self) -> u32 {
        self.turns_lived
    }

    /// Reports whether the creature is dead but possibly not yet removed.
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.hp == 0 || self.death_reason.is_some()
    }

    /// Reports whether the creature is still alive.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        !self.is_dead()
    }

    /// Ages the creature by one tick.
    ///
    /// Returns `true` when this call caused the creature to starve.
    pub fn age(&mut self) -> bool {
        self.turns_lived = self.turns_lived.saturating_add(1);
        self.hp = self.hp.saturating_sub(1);
        if self.hp == 0 && self.death_reason.is_none() {
            self.death_reason = Some(DeathReason::Starvation);
            return true;
        }
        false
    }

    /// Restores health.
    pub fn heal(&mut self, amount: u32) {
        self.hp = self.hp.saturating_add(amount);
    }

    /// Removes health, flooring at zero, and returns the health before the hit.
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        let before = self.hp;
        self.hp = self.hp.saturating_sub(amount);
        before
    }
}

/// Grass-eating creature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Herbivore {
    creature: Creature,
    consumed_grass: u32,
    killed_by: Option<CreatureId>,
}

impl Herbivore {
    /// Speed range used for randomly generated herbivores.
    pub const SPEED_RANGE: (u32, u32) = (1, 3);
    /// Health range used for randomly generated herbivores.
    pub const HP_RANGE: (u32, u32) = (10, 20);

    /// Creates a herbivore with explicit traits.
    #[must_use]
    pub fn new(id: CreatureId, speed: u32, hp: u32) -> Self {
        Self {
            creature: Creature::new(id, speed, hp),
            consumed_grass: 0,
            killed_by: None,
        }
    }

    /// Creates a herbivore with traits drawn from the default ranges.
    pub fn random<R: Rng + ?Sized>(id: CreatureId, rng: &mut R) -> Self {
        let speed = rng.gen_range(Self::SPEED_RANGE.0..=Self::SPEED_RANGE.1);
        let hp = rng.gen_range(Self::HP_RANGE.0..=Self::HP_RANGE.1);
        Self::new(id, speed, hp)
    }

    /// Shared creature state.
    #[must_use]
    pub const fn creature(&self) -> &Creature {
        &self.creature
    }

    /// Mutable shared creature state.
    pub fn creature_mut(&mut self) -> &mut Creature {
        &mut self.creature
    }

    /// Grass cells eaten during the current tick.
    #[must_use]
    pub const fn consumed_grass(&self) -> u32 {
        self.consumed_grass
    }

    /// Predator credited with the kill, set only on death.
    #[must_use]
    pub const fn killed_by(&self) -> Option<CreatureId> {
        self.killed_by
    }

    /// Applies a meal worth `gain` health.
    pub fn record_meal(&mut self, gain: u32) {
        self.creature.heal(gain);
        self.consumed_grass = self.consumed_grass.saturating_add(1);
    }

    /// Clears the per-tick meal counter.
    pub fn reset_consumed_grass(&mut self) {
        self.consumed_grass = 0;
    }

    /// Records a kill by `predator`.
    ///
    /// The death reason and killer are set together, and only once; returns
    /// `false` if the herbivore already carried a death reason.
    pub fn mark_killed(&mut self, predator: CreatureId) -> bool {
        if self.creature.death_reason.is_some() {
            return false;
        }
        self.creature.death_reason = Some(DeathReason::KilledByPredator);
        self.killed_by = Some(predator);
        true
    }
}

/// Hunting creature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Predator {
    creature: Creature,
    attack_strength: u32,
}

impl Predator {
    /// Speed range used for randomly generated predators.
    pub const SPEED_RANGE: (u32, u32) = (1, 4);
    /// Health range used for randomly generated predators.
    pub const HP_RANGE: (u32, u32) = (15, 25);
    /// Attack range used for randomly generated predators.
    pub const ATTACK_RANGE: (u32, u32) = (5, 15);

    /// Creates a predator with explicit traits. Attack strength is at least one.
    #[must_use]
    pub fn new(id: CreatureId, speed: u32, hp: u32, attack_strength: u32) -> Self {
        Self {
            creature: Creature::new(id, speed, hp),
            attack_strength: attack_strength.max(1),
        }
    }

    /// Creates a predator with traits drawn from the default ranges.
    pub fn random<R: Rng + ?Sized>(id: CreatureId, rng: &mut R) -> Self {
        let speed = rng.gen_range(Self::SPEED_RANGE.0..=Self::SPEED_RANGE.1);
        let hp = rng.gen_range(Self::HP_RANGE.0..=Self::HP_RANGE.1);
        let attack = rng.gen_range(Self::ATTACK_RANGE.0..=Self::ATTACK_RANGE.1);
        Self::new(id, speed, hp, attack)
    }

    /// Shared creature state.
    #[must_use]
    pub const fn creature(&self) -> &Creature {
        &self.creature
    }

    /// Mutable shared creature state.
    pub fn creature_mut(&mut self) -> &mut Creature {
        &mut self.creature
    }

    /// Damage dealt by a single attack.
    #[must_use]
    pub const fn attack_strength(&self) -> u32 {
        self.attack_strength
    }
}

/// Fieldless discriminant of an [`Entity`], handy for counting and display.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    /// Plant cell.
    Grass,
    /// Immovable stone.
    Rock,
    /// Immovable tree.
    Tree,
    /// Grass eater.
    Herbivore,
    /// Hunter.
    Predator,
}

/// Anything that may occupy a grid cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Entity {
    /// Plant cell that regrows.
    Grass(Grass),
    /// Inert blocker.
    Rock,
    /// Inert blocker.
    Tree,
    /// Grass-eating creature.
    Herbivore(Herbivore),
    /// Hunting creature.
    Predator(Predator),
}

impl Entity {
    /// Discriminant of the entity.
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        match self {
            Self::Grass(_) => EntityKind::Grass,
            Self::Rock => EntityKind::Rock,
            Self::Tree => EntityKind::Tree,
            Self::Herbivore(_) => EntityKind::Herbivore,
            Self::Predator(_) => EntityKind::Predator,
        }
    }

    /// Rocks and trees block every creature.
    #[must_use]
    pub const fn is_hard_obstacle(&self) -> bool {
        matches!(self, Self::Rock | Self::Tree)
    }

    /// Reports whether the entity is a grass cell, eaten or not.
    #[must_use]
    pub const fn is_grass(&self) -> bool {
        matches!(self, Self::Grass(_))
    }

    /// Reports whether the entity is grass nobody has eaten this tick.
    #[must_use]
    pub const fn is_uneaten_grass(&self) -> bool {
        matches!(self, Self::Grass(grass) if grass.eaten_by.is_none())
    }

    /// Reports whether the entity is a creature that is still alive.
    #[must_use]
    pub fn is_live_creature(&self) -> bool {
        self.creature().map_or(false, Creature::is_alive)
    }

    /// Reports whether the entity is a creature that already died.
    #[must_use]
    pub fn is_dead_creature(&self) -> bool {
        self.creature().map_or(false, Creature::is_dead)
    }

    /// Only live herbivores can be attacked.
    #[must_use]
    pub fn can_be_attacked(&self) -> bool {
        matches!(self, Self::Herbivore(herbivore) if herbivore.creature.is_alive())
    }

    /// Rocks, trees and grass shape navigation; their churn bumps the grid version.
    #[must_use]
    pub const fn affects_navigation(&self) -> bool {
        matches!(self, Self::Rock | Self::Tree | Self::Grass(_))
    }

    /// Species of the entity, if it is a creature.
    #[must_use]
    pub const fn species(&self) -> Option<Species> {
        match self {
            Self::Herbivore(_) => Some(Species::Herbivore),
            Self::Predator(_) => Some(Species::Predator),
            _ => None,
        }
    }

    /// Shared creature state, if the entity is a creature.
    #[must_use]
    pub const fn creature(&self) -> Option<&Creature> {
        match self {
            Self::Herbivore(herbivore) => Some(&herbivore.creature),
            Self::Predator(predator) => Some(&predator.creature),
            _ => None,
        }
    }

    /// Mutable shared creature state, if the entity is a creature.
    pub fn creature_mut(&mut self) -> Option<&mut Creature> {
        match self {
            Self::Herbivore(herbivore) => Some(&mut herbivore.creature),
            Self::Predator(predator) => Some(&mut predator.creature),
            _ => None,
        }
    }

    /// Identity of the entity, if it is a creature.
    #[must_use]
    pub fn creature_id(&self) -> Option<CreatureId> {
        self.creature().map(Creature::id)
    }
}

/// Control signals an operator may send to a running simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    /// Halts the tick loop before the next tick.
    Pause,
    /// Lets the tick loop run freely again.
    Resume,
    /// Runs exactly one tick while paused.
    Step,
    /// Terminates the tick loop after any in-flight tick.
    Stop,
}

/// Facts published by the turn pipeline while applying a tick.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// A creature was observed dead. May be published more than once per creature.
    CreatureDied {
        /// Identity of the dead creature.
        creature: CreatureId,
        /// Species of the dead creature.
        species: Species,
        /// Recorded cause of death.
        reason: DeathReason,
        /// Predator credited with the kill, when killed.
        killed_by: Option<CreatureId>,
    },
    /// A creature relocated during movement.
    CreatureMoved {
        /// Identity of the creature.
        creature: CreatureId,
        /// Cell the creature left.
        from: Location,
        /// Cell the creature now occupies.
        to: Location,
    },
    /// A creature's planned move lost a conflict and it stayed put.
    MoveBlocked {
        /// Identity of the creature.
        creature: CreatureId,
        /// Cell the creature stayed on.
        at: Location,
        /// Cell the creature wanted to enter.
        wanted: Location,
    },
    /// A herbivore finished eating a grass cell.
    GrassEaten {
        /// Identity of the herbivore.
        herbivore: CreatureId,
    },
    /// Regrowth placed a new grass cell.
    GrassGrown {
        /// Cell of the new grass.
        location: Location,
    },
}

/// Programming errors raised by the grid store.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum GridError {
    /// The location lies outside the grid.
    #[error("location {location} is outside the {width}x{height} grid")]
    OutOfBounds {
        /// Offending location.
        location: Location,
        /// Grid width.
        width: u32,
        /// Grid height.
        height: u32,
    },
    /// The grid was configured without any cells.
    #[error("grid dimensions must be positive, got {width}x{height}")]
    InvalidDimensions {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },
    /// The occupancy ratio lies outside `(0, 1]`.
    #[error("occupancy ratio must lie in (0, 1], got {0}")]
    InvalidOccupancyRatio(f64),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn cardinal_neighbors_follow_planning_order() {
        let origin = Location::new(2, 2);
        assert_eq!(
            origin.cardinal_neighbors(),
            [
                Location::new(3, 2),
                Location::new(1, 2),
                Location::new(2, 3),
                Location::new(2, 1),
            ]
        );
    }

    #[test]
    fn id_generator_is_monotonic_and_injectable() {
        let mut ids = IdGenerator::starting_at(40);
        assert_eq!(ids.next_id(), CreatureId::new(40));
        assert_eq!(ids.next_id(), CreatureId::new(41));
        assert_eq!(IdGenerator::default().next_id(), CreatureId::new(1));
    }

    #[test]
    fn grass_nutrition_stays_within_bounds() {
        let range = NutritionRange::new(7, 12);
        assert_eq!(Grass::new(40, range).nutrition(), 12);
        assert_eq!(Grass::new(0, range).nutrition(), 7);

        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..64 {
            let nutrition = Grass::random(range, &mut rng).nutrition();
            assert!((7..=12).contains(&nutrition));
        }
    }

    #[test]
    fn aging_starves_exactly_once() {
        let mut creature = Creature::new(CreatureId::new(1), 1, 2);
        assert!(!creature.age());
        assert!(creature.age());
        assert_eq!(creature.death_reason(), Some(DeathReason::Starvation));
        assert!(!creature.age(), "already dead creatures do not starve again");
        assert_eq!(creature.hp(), 0);
        assert_eq!(creature.turns_lived(), 3);
    }

    #[test]
    fn kill_is_recorded_once_with_killer() {
        let mut herbivore = Herbivore::new(CreatureId::new(3), 1, 5);
        assert!(herbivore.mark_killed(CreatureId::new(9)));
        assert!(!herbivore.mark_killed(CreatureId::new(10)));
        assert_eq!(herbivore.killed_by(), Some(CreatureId::new(9)));
        assert_eq!(
            herbivore.creature().death_reason(),
            Some(DeathReason::KilledByPredator)
        );
    }

    #[test]
    fn capability_table_matches_variants() {
        let grass = Entity::Grass(Grass::new(8, NutritionRange::default()));
        let herbivore = Entity::Herbivore(Herbivore::new(CreatureId::new(1), 1, 3));
        let dead = Entity::Predator(Predator::new(CreatureId::new(2), 1, 0, 5));

        assert!(Entity::Rock.is_hard_obstacle());
        assert!(Entity::Tree.affects_navigation());
        assert!(grass.is_uneaten_grass() && grass.affects_navigation());
        assert!(herbivore.can_be_attacked() && herbivore.is_live_creature());
        assert!(!herbivore.affects_navigation());
        assert!(dead.is_dead_creature() && !dead.can_be_attacked());
        assert_eq!(dead.species(), Some(Species::Predator));
        assert_eq!(Entity::Rock.creature_id(), None);
    }

    #[test]
    fn damage_floors_at_zero() {
        let mut creature = Creature::new(CreatureId::new(1), 2, 5);
        assert_eq!(creature.take_damage(20), 5);
        assert_eq!(creature.hp(), 0);
        assert!(creature.is_dead());
    }

    #[test]
    fn events_serialize_for_observers() {
        let event = Event::GrassGrown {
            location: Location::new(3, 4),
        };
        let json = serde_json::to_string(&event).expect("serialize");
        let restored: Event = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(restored, event);
    }
}
