//! Herbivores flee adjacent predators, then graze towards the nearest grass.

use log::debug;
use rand::Rng;
use savanna_core::{Entity, Location, Species};
use savanna_world::{
    navigation::{find_nearest, Mover},
    World,
};

use crate::{can_move_into, random_step};

/// Plans the herbivore on `origin` for one tick and returns its destination.
///
/// Each sub-step first looks for an adjacent predator and runs away from it.
/// Without a threat the herbivore walks one cell along the shortest path to
/// uneaten grass and eats on arrival, which ends its movement. If no grass is
/// reachable it takes a single random step instead.
pub fn plan_move<R>(world: &mut World, origin: Location, rng: &mut R) -> Location
where
    R: Rng + ?Sized,
{
    let Some(Entity::Herbivore(herbivore)) = world.get(origin) else {
        return origin;
    };
    let mover = Mover::new(herbivore.creature().id(), Species::Herbivore);
    let speed = herbivore.creature().speed();

    let mut current = origin;
    for _ in 0..speed {
        if let Some(threat) = adjacent_predator(world, current) {
            let Some(escape) = escape_cell(world, current, threat, mover) else {
                debug!("{} is cornered at {current}", mover.id());
                break;
            };
            current = escape;
            if eat(world, origin, current, mover, rng) {
                break;
            }
            continue;
        }

        let path = find_nearest(world, current, mover, Entity::is_uneaten_grass).path_from(current);
        let Some(&next) = path.get(1) else {
            if path.is_empty() {
                current = random_step(world, current, mover, rng);
            }
            break;
        };

        if !can_move_into(world, next, mover) {
            break;
        }
        current = next;
        if eat(world, origin, current, mover, rng) {
            break;
        }
    }

    current
}

/// First live predator among the four neighbours, in planning order.
fn adjacent_predator(world: &World, cell: Location) -> Option<Location> {
    cell.cardinal_neighbors().into_iter().find(|neighbor| {
        world.get(*neighbor).map_or(false, |entity| {
            entity.species() == Some(Species::Predator) && entity.is_live_creature()
        })
    })
}

/// Step directly away from `threat`, or sideways when that is blocked.
fn escape_cell(world: &World, current: Location, threat: Location, mover: Mover) -> Option<Location> {
    let candidates = if threat.y() != current.y() {
        let away = (current.y() - threat.y()).signum();
        [(0, away), (1, 0), (-1, 0)]
    } else {
        let away = (current.x() - threat.x()).signum();
        [(away, 0), (0, 1), (0, -1)]
    };

    candidates
        .into_iter()
        .map(|(dx, dy)| current.offset(dx, dy))
        .find(|cell| can_move_into(world, *cell, mover))
}

/// Eats uneaten grass on `cell`, crediting the herbivore standing on `origin`.
fn eat<R>(world: &mut World, origin: Location, cell: Location, mover: Mover, rng: &mut R) -> bool
where
    R: Rng + ?Sized,
{
    let Some(Entity::Grass(grass)) = world.get_mut(cell) else {
        return false;
    };
    if grass.eaten_by().is_some() {
        return false;
    }

    let nutrition = grass.nutrition();
    let gain = rng.gen_range((nutrition / 2).max(1)..=nutrition.max(1));
    grass.mark_eaten(mover.id());

    if let Some(Entity::Herbivore(herbivore)) = world.get_mut(origin) {
        herbivore.record_meal(gain);
    }
    debug!("{} ate grass at {cell} for {gain} hp", mover.id());
    true
}
