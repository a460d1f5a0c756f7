use std::collections::HashSet;

use log::debug;
use savanna_core::{CreatureId, Entity, Event, GridError, Location, Species};
use savanna_system_behavior::plan_move;
use savanna_world::{query, World};

use crate::{cleanup::removal_event, TurnContext, TurnStep};

/// Decides every creature's destination, then applies the moves in creature
/// identity order against a reservation ledger.
///
/// Decisions see the grid as it stood before any relocation this tick. The
/// application pass resolves what the decisions could not see: a destination
/// reserved by an earlier move, or occupied by a creature that did not leave,
/// leaves the mover where it was.
#[derive(Clone, Copy, Debug, Default)]
pub struct Movement;

#[derive(Clone, Copy, Debug)]
struct PlannedMove {
    creature: CreatureId,
    species: Species,
    origin: Location,
    destination: Location,
}

impl TurnStep for Movement {
    fn name(&self) -> &'static str {
        "movement"
    }

    fn apply(&mut self, world: &mut World, ctx: &mut TurnContext<'_>) -> Result<(), GridError> {
        let snapshot = query::live_creatures(world);
        let mut plans = Vec::with_capacity(snapshot.len());

        for creature in snapshot {
            if !is_alive_at(world, creature.location, creature.id) {
                continue;
            }
            let destination = plan_move(world, creature.location, ctx.rng());
            plans.push(PlannedMove {
                creature: creature.id,
                species: creature.species,
                origin: creature.location,
                destination,
            });
        }

        let mut reserved = HashSet::new();
        for plan in plans {
            apply_move(world, plan, &mut reserved, ctx)?;
        }
        Ok(())
    }
}

fn is_alive_at(world: &World, location: Location, creature: CreatureId) -> bool {
    world.get(location).map_or(false, |entity| {
        entity.creature_id() == Some(creature) && entity.is_live_creature()
    })
}

fn apply_move(
    world: &mut World,
    plan: PlannedMove,
    reserved: &mut HashSet<Location>,
    ctx: &mut TurnContext<'_>,
) -> Result<(), GridError> {
    // Killed after deciding; the corpse stays for the killer or for cleanup.
    if plan.destination == plan.origin || !is_alive_at(world, plan.origin, plan.creature) {
        return Ok(());
    }

    if reserved.contains(&plan.destination) {
        block(plan, ctx);
        return Ok(());
    }

    let clear = match world.get(plan.destination) {
        None => false,
        Some(Entity::Herbivore(victim))
            if plan.species == Species::Predator && victim.killed_by() == Some(plan.creature) =>
        {
            true
        }
        Some(Entity::Grass(grass))
            if plan.species == Species::Herbivore && grass.eaten_by() == Some(plan.creature) =>
        {
            true
        }
        Some(entity) if entity.is_dead_creature() => true,
        Some(_) => {
            block(plan, ctx);
            return Ok(());
        }
    };

    if clear {
        if let Some(event) = world.remove(plan.destination).as_ref().and_then(removal_event) {
            ctx.emit(event);
        }
    }

    let Some(mover) = world.remove(plan.origin) else {
        return Ok(());
    };
    world.place(plan.destination, mover)?;
    let _ = reserved.insert(plan.destination);

    debug!(
        "{} {} moved {} -> {}",
        plan.species, plan.creature, plan.origin, plan.destination
    );
    ctx.emit(Event::CreatureMoved {
        creature: plan.creature,
        from: plan.origin,
        to: plan.destination,
    });
    Ok(())
}

fn block(plan: PlannedMove, ctx: &mut TurnContext<'_>) {
    debug!(
        "{} {} stays at {}, {} is taken",
        plan.species, plan.creature, plan.origin, plan.destination
    );
    ctx.emit(Event::MoveBlocked {
        creature: plan.creature,
        at: plan.origin,
        wanted: plan.destination,
    });
}
