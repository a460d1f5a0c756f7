use savanna_core::{CreatureId, DeathReason, Entity, Event, Herbivore, Location, Predator, Species};
use savanna_system_analytics::{SpeciesCounts, Statistics};
use savanna_world::World;

fn seeded_world() -> World {
    let mut world = World::new(4, 4, 1.0).expect("world");
    world
        .place(
            Location::new(0, 0),
            Entity::Predator(Predator::new(CreatureId::new(1), 1, 20, 20)),
        )
        .expect("place");
    world
        .place(
            Location::new(0, 1),
            Entity::Herbivore(Herbivore::new(CreatureId::new(2), 1, 5)),
        )
        .expect("place");
    world
        .place(
            Location::new(3, 3),
            Entity::Herbivore(Herbivore::new(CreatureId::new(3), 1, 5)),
        )
        .expect("place");
    world
}

fn kill(creature: u32, killer: u32) -> Event {
    Event::CreatureDied {
        creature: CreatureId::new(creature),
        species: Species::Herbivore,
        reason: DeathReason::KilledByPredator,
        killed_by: Some(CreatureId::new(killer)),
    }
}

#[test]
fn kill_observed_by_movement_and_cleanup_counts_once() {
    let mut world = seeded_world();
    let mut stats = Statistics::new();
    stats.capture_initial(&world);
    assert_eq!(
        stats.initial(),
        SpeciesCounts {
            herbivores: 2,
            predators: 1
        }
    );

    stats.handle(&[kill(2, 1), Event::GrassEaten { herbivore: CreatureId::new(3) }]);
    stats.handle(&[kill(2, 1)]);
    let _ = world.remove(Location::new(0, 1));

    assert_eq!(stats.killed_by_predator(), 1);
    assert_eq!(stats.kills_by_predator().get(&CreatureId::new(1)), Some(&1));
    assert_eq!(stats.grass_by_herbivore().get(&CreatureId::new(3)), Some(&1));
    assert!(stats.consistency_check(&world));

    let report = stats.report(7);
    assert_eq!(report.tick, 7);
    assert_eq!(
        report.left,
        SpeciesCounts {
            herbivores: 1,
            predators: 1
        }
    );
    assert_eq!(report.grass_eaten, 1);
    assert_eq!(report.kills_by_predator.get(&1), Some(&1));
}

#[test]
fn starvation_after_being_counted_is_ignored() {
    let mut stats = Statistics::new();
    stats.capture_initial(&seeded_world());
    stats.handle(&[Event::CreatureDied {
        creature: CreatureId::new(1),
        species: Species::Predator,
        reason: DeathReason::Starvation,
        killed_by: None,
    }]);
    stats.handle(&[Event::CreatureDied {
        creature: CreatureId::new(1),
        species: Species::Predator,
        reason: DeathReason::Starvation,
        killed_by: None,
    }]);

    assert_eq!(
        stats.starved(),
        SpeciesCounts {
            herbivores: 0,
            predators: 1
        }
    );
    assert_eq!(stats.dead().predators, 1);
}

#[test]
fn mismatch_is_reported_not_fatal() {
    let world = seeded_world();
    let mut stats = Statistics::new();
    stats.capture_initial(&world);
    stats.handle(&[kill(3, 1)]);

    assert!(!stats.consistency_check(&world), "dead herbivore is still on the grid");
}

#[test]
fn report_serializes_for_the_final_summary() {
    let mut stats = Statistics::new();
    stats.capture_initial(&seeded_world());
    stats.handle(&[
        kill(2, 1),
        Event::GrassGrown {
            location: Location::new(1, 1),
        },
        Event::MoveBlocked {
            creature: CreatureId::new(3),
            at: Location::new(3, 3),
            wanted: Location::new(3, 2),
        },
    ]);

    let json = serde_json::to_value(stats.report(3)).expect("serialize");
    assert_eq!(json["killed_by_predator"], 1);
    assert_eq!(json["grass_grown"], 1);
    assert_eq!(json["blocked_moves"], 1);
    assert_eq!(json["initial"]["herbivores"], 2);
    assert_eq!(json["kills_by_predator"]["1"], 1);
    assert_eq!(json["grass_by_herbivore"]["2"], 0);
}
