#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! World initialization: obstacles, grass, herbivores and predators.
//!
//! Each pass places `min(requested, category cap, room under the map cap)`
//! entities on uniformly shuffled empty cells and logs when the request had to
//! be truncated.

use std::fmt;

use log::info;
use rand::Rng;
use savanna_core::{
    CreaturesConfig, Entity, EntityKind, Grass, GrassConfig, GridError, Herbivore, IdGenerator,
    ObstaclesConfig, Predator, SimulationConfig,
};
use savanna_world::World;

/// Category of entities placed by one initialization pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Category {
    /// Rocks and trees.
    Obstacles,
    /// Grass cells.
    Grass,
    /// Herbivores.
    Herbivores,
    /// Predators.
    Predators,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Obstacles => "obstacles",
            Self::Grass => "grass",
            Self::Herbivores => "herbivores",
            Self::Predators => "predators",
        })
    }
}

/// What a single pass asked for and what it actually placed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PassReport {
    /// Category of the pass.
    pub category: Category,
    /// Entities requested by the configuration.
    pub requested: usize,
    /// Entities placed on the grid.
    pub placed: usize,
}

impl PassReport {
    /// Reports whether fewer entities were placed than requested.
    #[must_use]
    pub const fn truncated(&self) -> bool {
        self.placed < self.requested
    }
}

/// Runs every initialization pass in order: obstacles, grass, herbivores,
/// predators.
pub fn populate<R>(
    world: &mut World,
    config: &SimulationConfig,
    ids: &mut IdGenerator,
    rng: &mut R,
) -> Result<Vec<PassReport>, GridError>
where
    R: Rng + ?Sized,
{
    Ok(vec![
        place_obstacles(world, &config.obstacles, rng)?,
        place_grass(world, &config.grass, rng)?,
        place_herbivores(world, &config.creatures, ids, rng)?,
        place_predators(world, &config.creatures, ids, rng)?,
    ])
}

/// Places rocks and trees, alternating between the two.
pub fn place_obstacles<R>(
    world: &mut World,
    config: &ObstaclesConfig,
    rng: &mut R,
) -> Result<PassReport, GridError>
where
    R: Rng + ?Sized,
{
    let present = world.count(EntityKind::Rock) + world.count(EntityKind::Tree);
    place(
        world,
        Category::Obstacles,
        config.count,
        config.cap_share,
        present,
        rng,
        |index, _| {
            if index % 2 == 0 {
                Entity::Rock
            } else {
                Entity::Tree
            }
        },
    )
}

/// Places grass with nutrition drawn from the configured range.
pub fn place_grass<R>(
    world: &mut World,
    config: &GrassConfig,
    rng: &mut R,
) -> Result<PassReport, GridError>
where
    R: Rng + ?Sized,
{
    let present = world.count(EntityKind::Grass);
    let nutrition = config.nutrition;
    place(
        world,
        Category::Grass,
        config.initial_count,
        config.cap_share,
        present,
        rng,
        |_, rng| Entity::Grass(Grass::random(nutrition, rng)),
    )
}

/// Places herbivores with random traits and fresh identities.
pub fn place_herbivores<R>(
    world: &mut World,
    config: &CreaturesConfig,
    ids: &mut IdGenerator,
    rng: &mut R,
) -> Result<PassReport, GridError>
where
    R: Rng + ?Sized,
{
    let present = world.count(EntityKind::Herbivore);
    place(
        world,
        Category::Herbivores,
        config.herbivores,
        config.herbivore_cap_share,
        present,
        rng,
        |_, rng| Entity::Herbivore(Herbivore::random(ids.next_id(), rng)),
    )
}

/// Places predators with random traits and fresh identities.
pub fn place_predators<R>(
    world: &mut World,
    config: &CreaturesConfig,
    ids: &mut IdGenerator,
    rng: &mut R,
) -> Result<PassReport, GridError>
where
    R: Rng + ?Sized,
{
    let present = world.count(EntityKind::Predator);
    place(
        world,
        Category::Predators,
        config.predators,
        config.predator_cap_share,
        present,
        rng,
        |_, rng| Entity::Predator(Predator::random(ids.next_id(), rng)),
    )
}

fn place<R, F>(
    world: &mut World,
    category: Category,
    requested: u32,
    share: f64,
    present: usize,
    rng: &mut R,
    mut make: F,
) -> Result<PassReport, GridError>
where
    R: Rng + ?Sized,
    F: FnMut(usize, &mut R) -> Entity,
{
    let requested = usize::try_from(requested).unwrap_or(usize::MAX);
    let category_room = world.cap_for_share(share).saturating_sub(present);
    let allowed = requested.min(category_room).min(world.room_under_cap());

    let cells: Vec<_> = world.random_empty_locations(rng).take(allowed).collect();
    for (index, cell) in cells.iter().enumerate() {
        world.place(*cell, make(index, rng))?;
    }

    let report = PassReport {
        category,
        requested,
        placed: cells.len(),
    };
    if report.truncated() {
        info!(
            "{category}: placed {} of {requested} requested (category room {category_room}, map room {})",
            report.placed,
            world.room_under_cap() + report.placed
        );
    } else {
        info!("{category}: placed {}", report.placed);
    }
    Ok(report)
}
