use savanna_core::{Entity, GridError};
use savanna_world::World;

use crate::{TurnContext, TurnStep};

/// Clears the per-tick meal counters.
#[derive(Clone, Copy, Debug, Default)]
pub struct BookkeepingReset;

impl TurnStep for BookkeepingReset {
    fn name(&self) -> &'static str {
        "bookkeeping_reset"
    }

    fn apply(&mut self, world: &mut World, _ctx: &mut TurnContext<'_>) -> Result<(), GridError> {
        for (_, entity) in world.iter_mut() {
            if let Entity::Herbivore(herbivore) = entity {
                herbivore.reset_consumed_grass();
            }
        }
        Ok(())
    }
}
