//! Predators chase the nearest live herbivore and attack it on contact.

use log::debug;
use rand::Rng;
use savanna_core::{Entity, Location, Species};
use savanna_world::{
    navigation::{find_nearest, Mover},
    World,
};

use crate::{can_move_into, random_step};

/// Plans the predator on `origin` for one tick and returns its destination.
///
/// The predator re-plans before every sub-step. Reaching a live herbivore
/// triggers an attack that ends the tick: on a kill the predator finishes on
/// the victim's cell, otherwise it stays where it struck from.
pub fn plan_move<R>(world: &mut World, origin: Location, rng: &mut R) -> Location
where
    R: Rng + ?Sized,
{
    let Some(Entity::Predator(predator)) = world.get(origin) else {
        return origin;
    };
    let mover = Mover::new(predator.creature().id(), Species::Predator);
    let speed = predator.creature().speed();
    let attack_strength = predator.attack_strength();

    let mut current = origin;
    for _ in 0..speed {
        let search = find_nearest(world, current, mover, Entity::can_be_attacked);
        let Some(goal) = search.goal else {
            current = random_step(world, current, mover, rng);
            break;
        };

        let path = search.path_from(current);
        let Some(&next) = path.get(1) else {
            break;
        };

        if next == goal {
            if attack(world, origin, goal, mover, attack_strength, rng) {
                current = goal;
            }
            break;
        }

        if !can_move_into(world, next, mover) {
            break;
        }
        current = next;
    }

    current
}

/// Strikes the herbivore on `target` and reports whether it died.
fn attack<R>(
    world: &mut World,
    origin: Location,
    target: Location,
    mover: Mover,
    attack_strength: u32,
    rng: &mut R,
) -> bool
where
    R: Rng + ?Sized,
{
    let Some(Entity::Herbivore(victim)) = world.get_mut(target) else {
        return false;
    };
    if victim.creature().is_dead() {
        return false;
    }

    let hp_before = victim.creature_mut().take_damage(attack_strength);
    if victim.creature().hp() > 0 {
        debug!(
            "{} hit {} for {attack_strength}, {} hp left",
            mover.id(),
            victim.creature().id(),
            victim.creature().hp()
        );
        return false;
    }
    let victim_id = victim.creature().id();
    let _ = victim.mark_killed(mover.id());

    let low = (attack_strength / 2).max(1);
    let high = low.max(hp_before / 2);
    let gain = rng.gen_range(low..=high);
    if let Some(Entity::Predator(predator)) = world.get_mut(origin) {
        predator.creature_mut().heal(gain);
    }
    debug!("{} killed {victim_id} at {target} and healed {gain}", mover.id());
    true
}
