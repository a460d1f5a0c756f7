//! Breadth-first path planning over the sparse grid.
//!
//! [`find_nearest`] explores the four orthogonal neighbours of each visited
//! cell in a fixed order and stops at the first cell whose occupant satisfies
//! the goal predicate. Passability depends on who is moving, which is why the
//! search takes a [`Mover`].

use std::collections::{HashMap, HashSet, VecDeque};

use savanna_core::{CreatureId, Entity, Location, Species};

use crate::World;

/// Identity and species of the creature a search is planned for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Mover {
    id: CreatureId,
    species: Species,
}

impl Mover {
    /// Creates a mover description.
    #[must_use]
    pub const fn new(id: CreatureId, species: Species) -> Self {
        Self { id, species }
    }

    /// Identity of the moving creature.
    #[must_use]
    pub const fn id(&self) -> CreatureId {
        self.id
    }

    /// Species of the moving creature.
    #[must_use]
    pub const fn species(&self) -> Species {
        self.species
    }
}

/// Predecessor links recorded while the search expanded.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PredecessorMap {
    links: HashMap<Location, Location>,
}

impl PredecessorMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `cell` was first reached from `from`.
    pub fn link(&mut self, cell: Location, from: Location) {
        let _ = self.links.insert(cell, from);
    }

    /// Cell from which `cell` was reached, if any.
    #[must_use]
    pub fn predecessor(&self, cell: Location) -> Option<Location> {
        self.links.get(&cell).copied()
    }

    /// Number of recorded links.
    #[must_use]
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Reports whether no links were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

/// Outcome of [`find_nearest`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathSearch {
    /// Links from every reached cell back towards the start.
    pub predecessors: PredecessorMap,
    /// Nearest matching cell, or `None` when nothing reachable matched.
    pub goal: Option<Location>,
}

impl PathSearch {
    /// Cells from the start to the goal, both inclusive, or empty on a miss.
    #[must_use]
    pub fn path_from(&self, start: Location) -> Vec<Location> {
        reconstruct_path(&self.predecessors, start, self.goal)
    }
}

/// Searches outward from `start` for the nearest cell whose occupant satisfies
/// `matches`.
///
/// A matching occupant on `start` itself yields a one-node result. A matching
/// neighbour ends the search even when the mover could not pass through it;
/// every other neighbour is explored only if it is go-through passable.
pub fn find_nearest<F>(world: &World, start: Location, mover: Mover, matches: F) -> PathSearch
where
    F: Fn(&Entity) -> bool,
{
    let mut predecessors = PredecessorMap::new();

    if world.get(start).map_or(false, &matches) {
        return PathSearch {
            predecessors,
            goal: Some(start),
        };
    }

    let mut visited = HashSet::new();
    let _ = visited.insert(start);
    let mut queue = VecDeque::new();
    queue.push_back(start);

    while let Some(cell) = queue.pop_front() {
        for neighbor in cell.cardinal_neighbors() {
            if !world.contains(neighbor) || visited.contains(&neighbor) {
                continue;
            }

            if world.get(neighbor).map_or(false, &matches) {
                predecessors.link(neighbor, cell);
                return PathSearch {
                    predecessors,
                    goal: Some(neighbor),
                };
            }

            if !is_go_through_passable(world, neighbor, mover) {
                continue;
            }

            let _ = visited.insert(neighbor);
            predecessors.link(neighbor, cell);
            queue.push_back(neighbor);
        }
    }

    PathSearch {
        predecessors,
        goal: None,
    }
}

/// Reports whether `mover` may traverse `cell` as a mid-path step.
#[must_use]
pub fn is_go_through_passable(world: &World, cell: Location, mover: Mover) -> bool {
    if !world.contains(cell) {
        return false;
    }

    match world.get(cell) {
        None => true,
        Some(entity) if entity.creature_id() == Some(mover.id) => true,
        Some(Entity::Rock | Entity::Tree) => false,
        Some(Entity::Grass(_)) => mover.species == Species::Herbivore,
        Some(entity) => entity.is_dead_creature(),
    }
}

/// Walks the predecessor chain back from `goal` to `start`.
///
/// Returns the path in travel order, or an empty vector when `goal` is `None`
/// or the chain never reaches `start`.
#[must_use]
pub fn reconstruct_path(
    predecessors: &PredecessorMap,
    start: Location,
    goal: Option<Location>,
) -> Vec<Location> {
    let Some(goal) = goal else {
        return Vec::new();
    };

    let mut path = vec![goal];
    let mut current = goal;
    while current != start {
        // A well-formed chain is never longer than the number of links.
        if path.len() > predecessors.len() + 1 {
            return Vec::new();
        }
        let Some(previous) = predecessors.predecessor(current) else {
            return Vec::new();
        };
        path.push(previous);
        current = previous;
    }

    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use savanna_core::{Grass, Herbivore, NutritionRange, Predator};

    fn grass() -> Entity {
        Entity::Grass(Grass::new(10, NutritionRange::default()))
    }

    fn herbivore(id: u32, hp: u32) -> Entity {
        Entity::Herbivore(Herbivore::new(CreatureId::new(id), 1, hp))
    }

    fn grazer(id: u32) -> Mover {
        Mover::new(CreatureId::new(id), Species::Herbivore)
    }

    fn hunter(id: u32) -> Mover {
        Mover::new(CreatureId::new(id), Species::Predator)
    }

    #[test]
    fn start_occupant_match_is_trivial() {
        let mut world = World::new(3, 3, 1.0).expect("world");
        world.place(Location::new(1, 1), grass()).expect("place");

        let search = find_nearest(&world, Location::new(1, 1), grazer(1), Entity::is_uneaten_grass);
        assert_eq!(search.goal, Some(Location::new(1, 1)));
        assert!(search.predecessors.is_empty());
        assert_eq!(search.path_from(Location::new(1, 1)), vec![Location::new(1, 1)]);
    }

    #[test]
    fn finds_straight_path_and_round_trips() {
        let mut world = World::new(5, 5, 1.0).expect("world");
        world.place(Location::new(2, 4), grass()).expect("place");
        let start = Location::new(2, 2);

        let search = find_nearest(&world, start, grazer(1), Entity::is_uneaten_grass);
        assert_eq!(search.goal, Some(Location::new(2, 4)));
        assert_eq!(
            search.path_from(start),
            vec![start, Location::new(2, 3), Location::new(2, 4)]
        );
    }

    #[test]
    fn matching_neighbour_need_not_be_passable() {
        let mut world = World::new(3, 1, 1.0).expect("world");
        world.place(Location::new(1, 0), herbivore(2, 5)).expect("place");

        let search = find_nearest(&world, Location::new(0, 0), hunter(1), Entity::can_be_attacked);
        assert_eq!(search.goal, Some(Location::new(1, 0)));
    }

    #[test]
    fn predators_route_around_grass_and_herbivores_cross_it() {
        let mut world = World::new(3, 3, 1.0).expect("world");
        for y in 0..3 {
            world.place(Location::new(1, y), grass()).expect("place");
        }
        world.place(Location::new(2, 1), Entity::Tree).expect("place");

        let target = |entity: &Entity| entity.kind() == savanna_core::EntityKind::Tree;
        let blocked = find_nearest(&world, Location::new(0, 1), hunter(1), target);
        assert_eq!(blocked.goal, None);
        assert!(blocked.path_from(Location::new(0, 1)).is_empty());

        let crossed = find_nearest(&world, Location::new(0, 1), grazer(1), target);
        assert_eq!(crossed.goal, Some(Location::new(2, 1)));
        assert_eq!(crossed.path_from(Location::new(0, 1)).len(), 3);
    }

    #[test]
    fn passability_table() {
        let mut world = World::new(6, 1, 1.0).expect("world");
        world.place(Location::new(0, 0), Entity::Rock).expect("place");
        world.place(Location::new(1, 0), herbivore(7, 5)).expect("place");
        world.place(Location::new(2, 0), herbivore(8, 0)).expect("place");
        world.place(Location::new(3, 0), grass()).expect("place");
        world
            .place(
                Location::new(4, 0),
                Entity::Predator(Predator::new(CreatureId::new(9), 1, 5, 5)),
            )
            .expect("place");

        assert!(!is_go_through_passable(&world, Location::new(0, 0), grazer(1)));
        assert!(!is_go_through_passable(&world, Location::new(1, 0), hunter(1)));
        assert!(is_go_through_passable(&world, Location::new(1, 0), grazer(7)));
        assert!(is_go_through_passable(&world, Location::new(2, 0), hunter(1)));
        assert!(is_go_through_passable(&world, Location::new(3, 0), grazer(1)));
        assert!(!is_go_through_passable(&world, Location::new(3, 0), hunter(1)));
        assert!(!is_go_through_passable(&world, Location::new(4, 0), grazer(1)));
        assert!(is_go_through_passable(&world, Location::new(5, 0), hunter(1)));
        assert!(!is_go_through_passable(&world, Location::new(6, 0), hunter(1)));
    }

    #[test]
    fn first_match_follows_neighbour_order() {
        let mut world = World::new(3, 3, 1.0).expect("world");
        world.place(Location::new(0, 1), grass()).expect("place");
        world.place(Location::new(2, 1), grass()).expect("place");

        let search = find_nearest(&world, Location::new(1, 1), grazer(1), Entity::is_uneaten_grass);
        assert_eq!(search.goal, Some(Location::new(2, 1)));
    }

    #[test]
    fn broken_or_cyclic_chains_yield_no_path() {
        let mut links = PredecessorMap::new();
        links.link(Location::new(3, 0), Location::new(2, 0));
        assert!(reconstruct_path(&links, Location::new(0, 0), Some(Location::new(3, 0))).is_empty());

        links.link(Location::new(2, 0), Location::new(3, 0));
        assert!(reconstruct_path(&links, Location::new(0, 0), Some(Location::new(3, 0))).is_empty());
        assert!(reconstruct_path(&links, Location::new(0, 0), None).is_empty());
    }

    #[test]
    fn every_reached_goal_round_trips() {
        let mut world = World::new(7, 7, 1.0).expect("world");
        for (x, y) in [(1, 1), (1, 2), (1, 3), (3, 3), (4, 3), (5, 5)] {
            world.place(Location::new(x, y), Entity::Rock).expect("place");
        }
        world.place(Location::new(6, 6), grass()).expect("place");

        for y in 0..7 {
            for x in 0..7 {
                let start = Location::new(x, y);
                if world.get(start).map_or(false, Entity::is_hard_obstacle) {
                    continue;
                }
                let search = find_nearest(&world, start, grazer(1), Entity::is_uneaten_grass);
                let path = search.path_from(start);
                match search.goal {
                    Some(goal) => {
                        assert_eq!(path.first(), Some(&start));
                        assert_eq!(path.last(), Some(&goal));
                        for pair in path.windows(2) {
                            assert_eq!(pair[0].manhattan_distance(pair[1]), 1);
                        }
                    }
                    None => assert!(path.is_empty()),
                }
            }
        }
    }
}
