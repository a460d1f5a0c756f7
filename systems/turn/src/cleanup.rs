use log::debug;
use savanna_core::{DeathReason, Entity, Event, GridError, Location, Species};
use savanna_world::World;

use crate::{TurnContext, TurnStep};

/// Removes dead creatures and eaten grass from the grid.
///
/// Each removal is reported so statistics can credit kills and meals that the
/// movement step did not already account for.
#[derive(Clone, Copy, Debug, Default)]
pub struct Cleanup;

impl TurnStep for Cleanup {
    fn name(&self) -> &'static str {
        "cleanup"
    }

    fn apply(&mut self, world: &mut World, ctx: &mut TurnContext<'_>) -> Result<(), GridError> {
        let doomed: Vec<Location> = world
            .iter()
            .filter(|(_, entity)| {
                entity.is_dead_creature()
                    || matches!(entity, Entity::Grass(grass) if grass.eaten_by().is_some())
            })
            .map(|(location, _)| location)
            .collect();

        let removed = doomed.len();
        for location in doomed {
            let Some(entity) = world.remove(location) else {
                continue;
            };
            if let Some(event) = removal_event(&entity) {
                ctx.emit(event);
            }
        }

        if removed > 0 {
            debug!("cleanup removed {removed} entities, {} cells occupied", world.occupied());
        }
        Ok(())
    }
}

/// Event describing the removal of a corpse or an eaten grass cell.
pub(crate) fn removal_event(entity: &Entity) -> Option<Event> {
    match entity {
        Entity::Grass(grass) => grass
            .eaten_by()
            .map(|herbivore| Event::GrassEaten { herbivore }),
        Entity::Herbivore(herbivore) => Some(Event::CreatureDied {
            creature: herbivore.creature().id(),
            species: Species::Herbivore,
            reason: herbivore
                .creature()
                .death_reason()
                .unwrap_or(DeathReason::Starvation),
            killed_by: herbivore.killed_by(),
        }),
        Entity::Predator(predator) => Some(Event::CreatureDied {
            creature: predator.creature().id(),
            species: Species::Predator,
            reason: predator
                .creature()
                .death_reason()
                .unwrap_or(DeathReason::Starvation),
            killed_by: None,
        }),
        Entity::Rock | Entity::Tree => None,
    }
}
