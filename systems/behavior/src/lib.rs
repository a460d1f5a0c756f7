#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Per-species decision logic that picks where each creature ends its tick.
//!
//! Decisions run against the live grid but never relocate anyone: the mover
//! stays on its origin cell while it walks a virtual position forward, and the
//! turn pipeline applies the returned destination afterwards. Side effects that
//! belong to the decision itself (grass marked eaten, damage dealt, health
//! gained) are written straight into the grid.

use rand::Rng;
use savanna_core::{Entity, Location, Species};
use savanna_world::{navigation::Mover, World};

pub mod herbivore;
pub mod predator;

/// Computes the destination of the live creature standing on `origin`.
///
/// Returns `origin` when the cell holds no live creature.
pub fn plan_move<R>(world: &mut World, origin: Location, rng: &mut R) -> Location
where
    R: Rng + ?Sized,
{
    let species = world
        .get(origin)
        .filter(|entity| entity.is_live_creature())
        .and_then(Entity::species);

    match species {
        Some(Species::Herbivore) => herbivore::plan_move(world, origin, rng),
        Some(Species::Predator) => predator::plan_move(world, origin, rng),
        None => origin,
    }
}

/// Reports whether `mover` may end a step on `cell`.
///
/// Herbivores may enter empty cells and grass. Predators may enter empty
/// cells and herbivores, live ones to attack and dead ones to clear away.
/// The mover's own cell always counts as empty.
#[must_use]
pub fn can_move_into(world: &World, cell: Location, mover: Mover) -> bool {
    if !world.contains(cell) {
        return false;
    }

    match world.get(cell) {
        None => true,
        Some(entity) if entity.creature_id() == Some(mover.id()) => true,
        Some(Entity::Rock | Entity::Tree) => false,
        Some(Entity::Grass(_)) => mover.species() == Species::Herbivore,
        Some(Entity::Herbivore(_)) => mover.species() == Species::Predator,
        Some(Entity::Predator(_)) => false,
    }
}

/// Takes one uniformly chosen in-bounds orthogonal step, or stays put when the
/// chosen cell cannot be entered.
fn random_step<R>(world: &World, current: Location, mover: Mover, rng: &mut R) -> Location
where
    R: Rng + ?Sized,
{
    let candidates: Vec<Location> = current
        .cardinal_neighbors()
        .into_iter()
        .filter(|cell| world.contains(*cell))
        .collect();
    if candidates.is_empty() {
        return current;
    }

    let choice = candidates[rng.gen_range(0..candidates.len())];
    if can_move_into(world, choice, mover) {
        choice
    } else {
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use savanna_core::{CreatureId, Grass, Herbivore, NutritionRange, Predator};

    #[test]
    fn move_rules_differ_per_species() {
        let mut world = World::new(5, 1, 1.0).expect("world");
        world
            .place(
                Location::new(0, 0),
                Entity::Grass(Grass::new(8, NutritionRange::default())),
            )
            .expect("place");
        world
            .place(
                Location::new(1, 0),
                Entity::Herbivore(Herbivore::new(CreatureId::new(2), 1, 5)),
            )
            .expect("place");
        world
            .place(
                Location::new(2, 0),
                Entity::Predator(Predator::new(CreatureId::new(3), 1, 5, 5)),
            )
            .expect("place");
        world.place(Location::new(3, 0), Entity::Rock).expect("place");

        let grazer = Mover::new(CreatureId::new(2), Species::Herbivore);
        let hunter = Mover::new(CreatureId::new(3), Species::Predator);

        assert!(can_move_into(&world, Location::new(0, 0), grazer));
        assert!(!can_move_into(&world, Location::new(0, 0), hunter));
        assert!(can_move_into(&world, Location::new(1, 0), grazer));
        assert!(can_move_into(&world, Location::new(1, 0), hunter));
        assert!(!can_move_into(&world, Location::new(2, 0), grazer));
        assert!(can_move_into(&world, Location::new(2, 0), hunter));
        assert!(!can_move_into(&world, Location::new(3, 0), hunter));
        assert!(can_move_into(&world, Location::new(4, 0), grazer));
        assert!(!can_move_into(&world, Location::new(5, 0), grazer));
    }

    #[test]
    fn random_step_stays_on_the_grid() {
        let world = World::new(1, 2, 1.0).expect("world");
        let mover = Mover::new(CreatureId::new(1), Species::Herbivore);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..32 {
            assert_eq!(
                random_step(&world, Location::new(0, 0), mover, &mut rng),
                Location::new(0, 1)
            );
        }
    }

    #[test]
    fn dead_or_missing_creatures_do_not_move() {
        let mut world = World::new(3, 3, 1.0).expect("world");
        world
            .place(
                Location::new(1, 1),
                Entity::Herbivore(Herbivore::new(CreatureId::new(1), 2, 0)),
            )
            .expect("place");
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        assert_eq!(plan_move(&mut world, Location::new(1, 1), &mut rng), Location::new(1, 1));
        assert_eq!(plan_move(&mut world, Location::new(0, 0), &mut rng), Location::new(0, 0));
    }
}
