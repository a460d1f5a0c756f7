use std::collections::BTreeMap;

use serde::Serialize;

/// Pair of per-species counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SpeciesCounts {
    /// Herbivore count.
    pub herbivores: u64,
    /// Predator count.
    pub predators: u64,
}

/// Snapshot of the statistics, published with every frame and printed at
/// shutdown.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StatsReport {
    /// Tick the report was taken after.
    pub tick: u64,
    /// Population at start.
    pub initial: SpeciesCounts,
    /// Creatures not yet counted as dead.
    pub left: SpeciesCounts,
    /// Starvation deaths.
    pub starved: SpeciesCounts,
    /// Herbivores killed by predators.
    pub killed_by_predator: u64,
    /// Grass cells eaten in total.
    pub grass_eaten: u64,
    /// Grass cells grown by regrowth.
    pub grass_grown: u64,
    /// Relocations applied.
    pub moves: u64,
    /// Moves that lost a conflict.
    pub blocked_moves: u64,
    /// Kills per predator identity.
    pub kills_by_predator: BTreeMap<u32, u64>,
    /// Meals per herbivore identity.
    pub grass_by_herbivore: BTreeMap<u32, u64>,
}
