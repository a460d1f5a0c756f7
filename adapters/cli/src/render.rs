//! Plain-text views of frames and reports.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use savanna_core::{Creature, Entity, Location};
use savanna_simulation::Frame;
use savanna_system_analytics::StatsReport;

/// One-line population summary for a frame.
pub(crate) fn summary(frame: &Frame) -> String {
    let grass = frame
        .occupants
        .iter()
        .filter(|(_, entity)| entity.is_grass())
        .count();
    let oldest = frame
        .occupants
        .iter()
        .filter_map(|(_, entity)| entity.creature())
        .filter(|creature| creature.is_alive())
        .map(Creature::turns_lived)
        .max()
        .unwrap_or(0);
    let stats = &frame.stats;
    format!(
        "tick {:>4} | grass {:>3} | herbivores {:>3}/{:<3} | predators {:>3}/{:<3} | starved {} | hunted {} | oldest {}",
        frame.tick,
        grass,
        stats.left.herbivores,
        stats.initial.herbivores,
        stats.left.predators,
        stats.initial.predators,
        stats.starved.herbivores + stats.starved.predators,
        stats.killed_by_predator,
        oldest,
    )
}

fn glyph(entity: &Entity) -> char {
    match entity {
        Entity::Grass(grass) if grass.eaten_by().is_some() => ',',
        Entity::Grass(_) => '"',
        Entity::Rock => '#',
        Entity::Tree => 'T',
        _ if entity.is_dead_creature() => 'x',
        Entity::Herbivore(_) => 'h',
        Entity::Predator(_) => 'P',
    }
}

/// Full grid drawing followed by the summary line.
pub(crate) fn grid(frame: &Frame, width: u32, height: u32) -> String {
    let cells: BTreeMap<Location, char> = frame
        .occupants
        .iter()
        .map(|(location, entity)| (*location, glyph(entity)))
        .collect();

    let mut out = String::new();
    for y in 0..i32::try_from(height).unwrap_or(i32::MAX) {
        for x in 0..i32::try_from(width).unwrap_or(i32::MAX) {
            out.push(cells.get(&Location::new(x, y)).copied().unwrap_or('.'));
        }
        out.push('\n');
    }
    out.push_str(&summary(frame));
    out
}

/// Human-readable final report.
pub(crate) fn report(report: &StatsReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== final report after {} ticks ==", report.tick);
    let _ = writeln!(
        out,
        "herbivores: {} at start, {} left, {} starved, {} hunted",
        report.initial.herbivores,
        report.left.herbivores,
        report.starved.herbivores,
        report.killed_by_predator
    );
    let _ = writeln!(
        out,
        "predators:  {} at start, {} left, {} starved",
        report.initial.predators, report.left.predators, report.starved.predators
    );
    let _ = writeln!(
        out,
        "grass: {} eaten, {} regrown; moves: {} applied, {} blocked",
        report.grass_eaten, report.grass_grown, report.moves, report.blocked_moves
    );

    let _ = writeln!(out, "kills per predator:");
    for (predator, kills) in &report.kills_by_predator {
        let _ = writeln!(out, "  #{predator}: {kills}");
    }
    let _ = writeln!(out, "grass eaten per herbivore:");
    for (herbivore, meals) in &report.grass_by_herbivore {
        let _ = writeln!(out, "  #{herbivore}: {meals}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use savanna_core::{CreatureId, Grass, Herbivore, NutritionRange, Predator};
    use savanna_system_analytics::SpeciesCounts;

    fn frame() -> Frame {
        let mut dead = Herbivore::new(CreatureId::new(3), 1, 4);
        let _ = dead.mark_killed(CreatureId::new(2));
        for _ in 0..6 {
            let _ = dead.creature_mut().age();
        }
        let mut grazer = Herbivore::new(CreatureId::new(1), 1, 10);
        for _ in 0..2 {
            let _ = grazer.creature_mut().age();
        }
        Frame {
            tick: 7,
            step: 0,
            occupants: vec![
                (
                    Location::new(1, 0),
                    Entity::Grass(Grass::new(9, NutritionRange::default())),
                ),
                (Location::new(0, 1), Entity::Rock),
                (
                    Location::new(2, 1),
                    Entity::Herbivore(grazer),
                ),
                (
                    Location::new(0, 2),
                    Entity::Predator(Predator::new(CreatureId::new(2), 1, 20, 10)),
                ),
                (Location::new(1, 2), Entity::Herbivore(dead)),
            ],
            stats: StatsReport {
                tick: 7,
                initial: SpeciesCounts {
                    herbivores: 2,
                    predators: 1,
                },
                left: SpeciesCounts {
                    herbivores: 1,
                    predators: 1,
                },
                killed_by_predator: 1,
                ..StatsReport::default()
            },
        }
    }

    #[test]
    fn grid_draws_every_row() {
        let drawing = grid(&frame(), 3, 3);
        let rows: Vec<&str> = drawing.lines().collect();
        assert_eq!(rows[0], ".\".");
        assert_eq!(rows[1], "#.h");
        assert_eq!(rows[2], "Px.");
        assert!(rows[3].starts_with("tick    7 | grass   1"));
    }

    #[test]
    fn summary_shows_the_oldest_living_creature() {
        let line = summary(&frame());
        assert!(line.ends_with("| hunted 1 | oldest 2"), "{line}");
    }

    #[test]
    fn report_lists_per_creature_tallies() {
        let mut stats = frame().stats;
        let _ = stats.kills_by_predator.insert(2, 1);
        let _ = stats.grass_by_herbivore.insert(1, 3);

        let text = report(&stats);
        assert!(text.contains("2 at start, 1 left, 0 starved, 1 hunted"));
        assert!(text.contains("  #2: 1"));
        assert!(text.contains("  #1: 3"));
    }
}
