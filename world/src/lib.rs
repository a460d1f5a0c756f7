#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative grid state for the Savanna simulation.
//!
//! The [`World`] is a sparse store mapping in-bounds [`Location`]s to at most
//! one [`Entity`] each. Systems mutate it only through [`World::place`] and
//! [`World::remove`]; everything else reads through accessors or the
//! [`query`] module.

use std::collections::BTreeMap;

use rand::Rng;
use savanna_core::{Entity, EntityKind, GridError, Location, MapConfig};

pub mod navigation;

/// Sparse grid of entities plus its capacity bookkeeping.
#[derive(Clone, Debug)]
pub struct World {
    width: u32,
    height: u32,
    occupancy_ratio: f64,
    cells: BTreeMap<Location, Entity>,
    version: u64,
}

impl World {
    /// Creates an empty world with the provided dimensions and occupancy cap.
    pub fn new(width: u32, height: u32, occupancy_ratio: f64) -> Result<Self, GridError> {
        if width == 0 || height == 0 || i32::try_from(width).is_err() || i32::try_from(height).is_err()
        {
            return Err(GridError::InvalidDimensions { width, height });
        }
        if !(occupancy_ratio > 0.0 && occupancy_ratio <= 1.0) {
            return Err(GridError::InvalidOccupancyRatio(occupancy_ratio));
        }

        Ok(Self {
            width,
            height,
            occupancy_ratio,
            cells: BTreeMap::new(),
            version: 0,
        })
    }

    /// Creates an empty world described by a map configuration.
    pub fn from_config(config: &MapConfig) -> Result<Self, GridError> {
        Self::new(config.width, config.height, config.occupancy_ratio)
    }

    /// Number of columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Total number of cells on the grid.
    #[must_use]
    pub fn capacity(&self) -> usize {
        let cells = u64::from(self.width) * u64::from(self.height);
        usize::try_from(cells).unwrap_or(usize::MAX)
    }

    /// Number of occupied cells.
    #[must_use]
    pub fn occupied(&self) -> usize {
        self.cells.len()
    }

    /// Counter bumped whenever rocks, trees, or grass are added or removed.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Reports whether the location lies on the grid.
    #[must_use]
    pub fn contains(&self, location: Location) -> bool {
        location.x() >= 0
            && location.y() >= 0
            && (location.x() as u32) < self.width
            && (location.y() as u32) < self.height
    }

    /// Places `entity` at `location`, replacing any previous occupant.
    pub fn place(&mut self, location: Location, entity: Entity) -> Result<(), GridError> {
        if !self.contains(location) {
            return Err(GridError::OutOfBounds {
                location,
                width: self.width,
                height: self.height,
            });
        }

        let bumps = entity.affects_navigation();
        let replaced = self.cells.insert(location, entity);
        if bumps || replaced.as_ref().map_or(false, Entity::affects_navigation) {
            self.bump_version();
        }
        Ok(())
    }

    /// Removes and returns the occupant of `location`, if any.
    pub fn remove(&mut self, location: Location) -> Option<Entity> {
        let removed = self.cells.remove(&location)?;
        if removed.affects_navigation() {
            self.bump_version();
        }
        Some(removed)
    }

    /// Returns the occupant of `location`, if any.
    #[must_use]
    pub fn get(&self, location: Location) -> Option<&Entity> {
        self.cells.get(&location)
    }

    /// Returns mutable access to the occupant of `location`, if any.
    ///
    /// Callers must not turn the occupant into a different variant; use
    /// [`World::place`] for that so the version counter stays accurate.
    pub fn get_mut(&mut self, location: Location) -> Option<&mut Entity> {
        self.cells.get_mut(&location)
    }

    /// Iterates over every occupied cell in ascending location order.
    pub fn iter(&self) -> impl Iterator<Item = (Location, &Entity)> {
        self.cells.iter().map(|(location, entity)| (*location, entity))
    }

    /// Iterates mutably over every occupied cell in ascending location order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Location, &mut Entity)> {
        self.cells
            .iter_mut()
            .map(|(location, entity)| (*location, entity))
    }

    /// Counts the entities of the provided kind.
    #[must_use]
    pub fn count(&self, kind: EntityKind) -> usize {
        self.cells
            .values()
            .filter(|entity| entity.kind() == kind)
            .count()
    }

    /// Cells still available before the occupancy cap is reached.
    #[must_use]
    pub fn room_under_cap(&self) -> usize {
        self.cap_for_share(self.occupancy_ratio)
            .saturating_sub(self.occupied())
    }

    /// Number of cells corresponding to `share` of the grid, rounded down.
    #[must_use]
    pub fn cap_for_share(&self, share: f64) -> usize {
        let cap = (self.capacity() as f64 * share).floor();
        if cap <= 0.0 {
            0
        } else {
            cap as usize
        }
    }

    /// Produces every currently empty cell exactly once in shuffled order.
    ///
    /// The candidate set is captured when called, and shuffling happens lazily
    /// as the sequence is consumed. Call again to observe later changes.
    pub fn random_empty_locations<'r, R>(&self, rng: &'r mut R) -> EmptyLocations<'r, R>
    where
        R: Rng + ?Sized,
    {
        let mut cells = Vec::with_capacity(self.capacity().saturating_sub(self.occupied()));
        for y in 0..self.height as i32 {
            for x in 0..self.width as i32 {
                let location = Location::new(x, y);
                if !self.cells.contains_key(&location) {
                    cells.push(location);
                }
            }
        }

        EmptyLocations {
            remaining: cells.len(),
            cells,
            rng,
        }
    }

    fn bump_version(&mut self) {
        self.version = self.version.wrapping_add(1);
    }
}

/// Lazily shuffled sequence of empty cells produced by
/// [`World::random_empty_locations`].
#[derive(Debug)]
pub struct EmptyLocations<'r, R: ?Sized> {
    cells: Vec<Location>,
    remaining: usize,
    rng: &'r mut R,
}

impl<R> Iterator for EmptyLocations<'_, R>
where
    R: Rng + ?Sized,
{
    type Item = Location;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let pick = self.rng.gen_range(0..self.remaining);
        self.remaining -= 1;
        self.cells.swap(pick, self.remaining);
        Some(self.cells[self.remaining])
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<R> ExactSizeIterator for EmptyLocations<'_, R> where R: Rng + ?Sized {}

/// Query functions that provide read-only views of the world state.
pub mod query {
    use savanna_core::{CreatureId, Entity, EntityKind, Location, Species};

    use super::World;

    /// Entity counts captured at a single point in time.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct Population {
        /// Grass cells, eaten or not.
        pub grass: usize,
        /// Rocks and trees.
        pub obstacles: usize,
        /// Herbivores, alive or awaiting cleanup.
        pub herbivores: usize,
        /// Predators, alive or awaiting cleanup.
        pub predators: usize,
    }

    /// Position and identity of a creature that was alive when captured.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct CreatureSnapshot {
        /// Identity of the creature.
        pub id: CreatureId,
        /// Species of the creature.
        pub species: Species,
        /// Cell the creature occupied.
        pub location: Location,
    }

    /// Captures every living creature, ordered by ascending identity.
    #[must_use]
    pub fn live_creatures(world: &World) -> Vec<CreatureSnapshot> {
        let mut snapshots: Vec<CreatureSnapshot> = world
            .iter()
            .filter(|(_, entity)| entity.is_live_creature())
            .filter_map(|(location, entity)| {
                Some(CreatureSnapshot {
                    id: entity.creature_id()?,
                    species: entity.species()?,
                    location,
                })
            })
            .collect();
        snapshots.sort_by_key(|snapshot| snapshot.id);
        snapshots
    }

    /// Finds the cell currently holding the creature with the provided identity.
    #[must_use]
    pub fn locate(world: &World, id: CreatureId) -> Option<Location> {
        world
            .iter()
            .find(|(_, entity)| entity.creature_id() == Some(id))
            .map(|(location, _)| location)
    }

    /// Clones every occupant in ascending location order for observers.
    #[must_use]
    pub fn occupants(world: &World) -> Vec<(Location, Entity)> {
        world
            .iter()
            .map(|(location, entity)| (location, entity.clone()))
            .collect()
    }

    /// Counts the population of every entity kind.
    #[must_use]
    pub fn population(world: &World) -> Population {
        Population {
            grass: world.count(EntityKind::Grass),
            obstacles: world.count(EntityKind::Rock) + world.count(EntityKind::Tree),
            herbivores: world.count(EntityKind::Herbivore),
            predators: world.count(EntityKind::Predator),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use savanna_core::{CreatureId, Grass, Herbivore, NutritionRange};

    fn grass() -> Entity {
        Entity::Grass(Grass::new(9, NutritionRange::default()))
    }

    #[test]
    fn place_rejects_out_of_bounds() {
        let mut world = World::new(3, 2, 0.5).expect("world");
        let error = world
            .place(Location::new(3, 0), Entity::Rock)
            .expect_err("outside grid");
        assert!(matches!(error, GridError::OutOfBounds { .. }));
        assert!(world.place(Location::new(-1, 1), Entity::Rock).is_err());
        assert_eq!(world.occupied(), 0);
    }

    #[test]
    fn place_overwrites_and_remove_is_idempotent() {
        let mut world = World::new(4, 4, 0.5).expect("world");
        let cell = Location::new(1, 1);
        world.place(cell, Entity::Rock).expect("place rock");
        world.place(cell, Entity::Tree).expect("place tree");
        assert_eq!(world.get(cell), Some(&Entity::Tree));
        assert_eq!(world.occupied(), 1);

        assert_eq!(world.remove(cell), Some(Entity::Tree));
        assert_eq!(world.remove(cell), None);
        assert!(world.get(cell).is_none());
    }

    #[test]
    fn version_tracks_navigation_relevant_changes_only() {
        let mut world = World::new(4, 4, 0.5).expect("world");
        let herbivore = Entity::Herbivore(Herbivore::new(CreatureId::new(1), 1, 5));

        world.place(Location::new(0, 0), herbivore).expect("place");
        assert_eq!(world.version(), 0, "creatures do not affect the version");
        let _ = world.remove(Location::new(0, 0));
        assert_eq!(world.version(), 0);

        world.place(Location::new(1, 0), grass()).expect("place grass");
        assert_eq!(world.version(), 1);
        let _ = world.remove(Location::new(1, 0));
        assert_eq!(world.version(), 2);
        let _ = world.remove(Location::new(1, 0));
        assert_eq!(world.version(), 2, "removing nothing changes nothing");
    }

    #[test]
    fn room_under_cap_floors_at_zero() {
        let mut world = World::new(4, 4, 0.25).expect("world");
        assert_eq!(world.room_under_cap(), 4);
        for x in 0..4 {
            world.place(Location::new(x, 0), Entity::Rock).expect("place");
        }
        world.place(Location::new(0, 1), Entity::Rock).expect("place");
        assert_eq!(world.room_under_cap(), 0);
    }

    #[test]
    fn random_empty_locations_cover_each_empty_cell_once() {
        let mut world = World::new(5, 4, 0.5).expect("world");
        world.place(Location::new(2, 2), Entity::Rock).expect("place");
        let mut rng = ChaCha8Rng::seed_from_u64(11);

        let mut cells: Vec<Location> = world.random_empty_locations(&mut rng).collect();
        assert_eq!(cells.len(), 19);
        assert!(!cells.contains(&Location::new(2, 2)));
        cells.sort();
        cells.dedup();
        assert_eq!(cells.len(), 19);

        world.place(Location::new(0, 0), Entity::Tree).expect("place");
        assert_eq!(world.random_empty_locations(&mut rng).len(), 18);
    }

    #[test]
    fn rejects_degenerate_configuration() {
        assert!(matches!(
            World::new(0, 3, 0.5),
            Err(GridError::InvalidDimensions { .. })
        ));
        assert!(matches!(
            World::new(3, 3, 1.5),
            Err(GridError::InvalidOccupancyRatio(_))
        ));
    }

    #[test]
    fn live_creatures_are_ordered_by_identity() {
        let mut world = World::new(4, 4, 0.5).expect("world");
        world
            .place(
                Location::new(0, 0),
                Entity::Herbivore(Herbivore::new(CreatureId::new(7), 1, 5)),
            )
            .expect("place");
        world
            .place(
                Location::new(3, 3),
                Entity::Herbivore(Herbivore::new(CreatureId::new(2), 1, 5)),
            )
            .expect("place");
        world
            .place(
                Location::new(1, 1),
                Entity::Herbivore(Herbivore::new(CreatureId::new(4), 1, 0)),
            )
            .expect("place");

        let ids: Vec<u32> = query::live_creatures(&world)
            .iter()
            .map(|snapshot| snapshot.id.get())
            .collect();
        assert_eq!(ids, vec![2, 7]);
        assert_eq!(
            query::locate(&world, CreatureId::new(4)),
            Some(Location::new(1, 1))
        );
    }
}
