use log::debug;
use savanna_core::{Entity, EntityKind, Event, Grass, GrassConfig, GridError, Location, NutritionRange};
use savanna_world::World;

use crate::{TurnContext, TurnStep};

/// Spawns new grass on empty cells that have no grass among their eight
/// surrounding cells.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Regrowth {
    cap_share: f64,
    regen_share: f64,
    min_spawn_per_tick: usize,
    nutrition: NutritionRange,
}

impl Regrowth {
    /// Creates a regrowth step with explicit tuning.
    #[must_use]
    pub fn new(
        cap_share: f64,
        regen_share: f64,
        min_spawn_per_tick: usize,
        nutrition: NutritionRange,
    ) -> Self {
        Self {
            cap_share,
            regen_share,
            min_spawn_per_tick,
            nutrition,
        }
    }

    /// Creates a regrowth step from the grass configuration.
    #[must_use]
    pub fn from_config(config: &GrassConfig) -> Self {
        Self::new(
            config.cap_share,
            config.regen_share,
            usize::try_from(config.min_spawn_per_tick).unwrap_or(usize::MAX),
            config.nutrition,
        )
    }

    /// Number of grass cells the next application will try to place.
    #[must_use]
    pub fn quota(&self, world: &World) -> usize {
        let grass_room = world
            .cap_for_share(self.cap_share)
            .saturating_sub(world.count(EntityKind::Grass));
        let pressure = world
            .cap_for_share(self.regen_share)
            .max(self.min_spawn_per_tick);
        grass_room.min(pressure).min(world.room_under_cap())
    }
}

impl TurnStep for Regrowth {
    fn name(&self) -> &'static str {
        "regrowth"
    }

    fn apply(&mut self, world: &mut World, ctx: &mut TurnContext<'_>) -> Result<(), GridError> {
        let quota = self.quota(world);
        if quota == 0 {
            return Ok(());
        }

        let mut chosen: Vec<Location> = Vec::with_capacity(quota);
        for candidate in world.random_empty_locations(ctx.rng()) {
            if chosen.len() == quota {
                break;
            }
            let crowded = candidate.surrounding().into_iter().any(|neighbor| {
                chosen.contains(&neighbor)
                    || world.get(neighbor).map_or(false, Entity::is_grass)
            });
            if !crowded {
                chosen.push(candidate);
            }
        }

        for location in &chosen {
            let grass = Grass::random(self.nutrition, ctx.rng());
            world.place(*location, Entity::Grass(grass))?;
            ctx.emit(Event::GrassGrown {
                location: *location,
            });
        }

        debug!("regrowth placed {} of {quota} grass cells", chosen.len());
        Ok(())
    }
}
