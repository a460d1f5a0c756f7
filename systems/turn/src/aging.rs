use log::debug;
use savanna_core::{DeathReason, Event, GridError};
use savanna_world::World;

use crate::{TurnContext, TurnStep};

/// Every living creature loses one health point; those reaching zero starve.
#[derive(Clone, Copy, Debug, Default)]
pub struct Aging;

impl TurnStep for Aging {
    fn name(&self) -> &'static str {
        "aging"
    }

    fn apply(&mut self, world: &mut World, ctx: &mut TurnContext<'_>) -> Result<(), GridError> {
        for (location, entity) in world.iter_mut() {
            let Some(species) = entity.species() else {
                continue;
            };
            let Some(creature) = entity.creature_mut() else {
                continue;
            };
            if creature.is_dead() || !creature.age() {
                continue;
            }

            debug!(
                "{species} {} starved at {location} after {} turns",
                creature.id(),
                creature.turns_lived()
            );
            ctx.emit(Event::CreatureDied {
                creature: creature.id(),
                species,
                reason: DeathReason::Starvation,
                killed_by: None,
            });
        }
        Ok(())
    }
}
