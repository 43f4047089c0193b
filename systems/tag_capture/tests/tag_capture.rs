use std::time::Duration;

use glam::Vec3;
use proptest::prelude::*;
use snare_core::{
    BlockPos, CaptureStrategy, CaptureTag, Command, CreatureId, CreatureKind, CreatureSnapshot,
    CreatureView, Event, ItemStack, ReleaseReason, TrapId, TrapState, TrapView,
};
use snare_system_tag_capture::{capture_probability, Config, TagCapture};
use snare_world::{self as world, query, World, WorldConfig};

const ELK: CreatureId = CreatureId::new(40);
const PLAYER: CreatureId = CreatureId::new(1);

fn trap_id() -> TrapId {
    TrapId::at(BlockPos::new(10, 0, 10))
}

fn elk(trap_chance: f32) -> CreatureSnapshot {
    CreatureSnapshot {
        id: ELK,
        kind: CreatureKind::Animal {
            species: "elk".to_owned(),
        },
        position: Vec3::new(12.0, 0.0, 10.0),
        velocity: Vec3::ZERO,
        moving: false,
        alive: true,
        health: Some(100.0),
        trap_chance,
        mounted_on: None,
        capture_tag: None,
        tiredness: 0.0,
        walk_speed_modifier: 0.0,
    }
}

fn snapped() -> Event {
    Event::TrapSnapped {
        trap: trap_id(),
        creature: ELK,
        strategy: CaptureStrategy::Tag,
    }
}

fn scan(system: &mut TagCapture, creatures: &CreatureView) -> Vec<Command> {
    let mut commands = Vec::new();
    let world = tag_world(1.0e6);
    system.handle(
        &[Event::TimeAdvanced {
            dt: Duration::from_millis(500),
        }],
        &query::trap_view(&world),
        creatures,
        &mut commands,
    );
    commands
}

fn tag_world(elk_health: f32) -> World {
    let mut world = World::with_config(WorldConfig {
        strategy: CaptureStrategy::Tag,
        ..WorldConfig::default()
    });
    let mut events = Vec::new();
    let setup = [
        Command::PlaceTrap {
            position: trap_id().position(),
            material: "steel".to_owned(),
            rotation_y_deg: 180.0,
        },
        Command::SpawnCreature {
            id: PLAYER,
            kind: CreatureKind::Player {
                uid: "uid-1".to_owned(),
            },
            position: Vec3::ZERO,
            health: Some(15.0),
            trap_chance: 0.5,
        },
        Command::SpawnCreature {
            id: ELK,
            kind: CreatureKind::Animal {
                species: "elk".to_owned(),
            },
            position: Vec3::new(12.0, 0.0, 10.0),
            health: Some(elk_health),
            trap_chance: -1.0,
        },
    ];
    for command in setup {
        world::apply(&mut world, command, &mut events);
    }
    world
}

#[test]
fn capture_rate_matches_escape_chance() {
    let creatures = CreatureView::from_snapshots(vec![elk(0.9)]);
    let traps = TrapView::default();
    let mut system = TagCapture::new(Config::new(Duration::from_millis(500), 0x5eed_cafe));
    let samples = 20_000;
    let mut captures = 0usize;

    for _ in 0..samples {
        let mut commands = Vec::new();
        system.handle(&[snapped()], &traps, &creatures, &mut commands);
        captures += commands
            .iter()
            .filter(|command| matches!(command, Command::TagCreature { .. }))
            .count();
    }

    let rate = captures as f64 / f64::from(samples);
    let expected = capture_probability(0.9);
    assert!(
        (rate - expected).abs() < 0.01,
        "capture rate {rate} too far from {expected}"
    );
}

#[test]
fn mount_snaps_are_not_rolled() {
    let creatures = CreatureView::from_snapshots(vec![elk(-1.0)]);
    let mut system = TagCapture::new(Config::new(Duration::from_millis(500), 7));
    let mut commands = Vec::new();

    system.handle(
        &[Event::TrapSnapped {
            trap: trap_id(),
            creature: ELK,
            strategy: CaptureStrategy::Mount,
        }],
        &TrapView::default(),
        &creatures,
        &mut commands,
    );

    assert!(commands.is_empty());
}

#[test]
fn dead_captive_is_released_on_scan() {
    let mut dead = elk(0.0);
    dead.alive = false;
    dead.capture_tag = Some(CaptureTag::new(trap_id()));
    let mut system = TagCapture::new(Config::new(Duration::from_millis(500), 7));

    let commands = scan(&mut system, &CreatureView::from_snapshots(vec![dead]));

    assert_eq!(
        commands,
        vec![Command::ReleaseCreature {
            trap: trap_id(),
            reason: ReleaseReason::Died,
        }]
    );
}

#[test]
fn captive_outside_radius_is_missed() {
    let mut far = elk(0.0);
    far.position = Vec3::new(40.0, 0.0, 10.0);
    far.capture_tag = Some(CaptureTag::new(trap_id()));
    let mut system = TagCapture::new(Config::new(Duration::from_millis(500), 7));

    let commands = scan(&mut system, &CreatureView::from_snapshots(vec![far]));

    assert!(commands.is_empty());
}

#[test]
fn moving_captive_always_struggles_when_chance_is_certain() {
    let mut runner = elk(0.0);
    runner.moving = true;
    runner.velocity = Vec3::new(0.0, 0.0, 3.0);
    runner.capture_tag = Some(CaptureTag::new(trap_id()));
    let mut system = TagCapture::new(
        Config::new(Duration::from_millis(500), 7).with_struggle_chance(1.0),
    );

    let commands = scan(&mut system, &CreatureView::from_snapshots(vec![runner]));

    assert_eq!(commands.len(), 2);
    assert_eq!(commands[0], Command::Struggle { trap: trap_id() });
    match &commands[1] {
        Command::PullCreature { creature, velocity } => {
            assert_eq!(*creature, ELK);
            assert!(velocity.z < 3.0);
        }
        other => panic!("unexpected command emitted: {other:?}"),
    }
}

#[test]
fn tagged_elk_is_worn_down_through_the_world() {
    let mut world = tag_world(1.0e6);
    let mut system = TagCapture::new(
        Config::new(Duration::from_millis(500), 99).with_struggle_chance(1.0),
    );
    let mut events = Vec::new();
    for command in [
        Command::Interact {
            trap: trap_id(),
            player: PLAYER,
            careful: true,
            held: None,
        },
        Command::Interact {
            trap: trap_id(),
            player: PLAYER,
            careful: true,
            held: Some(ItemStack {
                code: "game:grain-rye".to_owned(),
                quantity: 2,
                nutrition: None,
                food_tags: vec!["grain".to_owned()],
            }),
        },
        Command::ConsumeBait {
            trap: trap_id(),
            creature: ELK,
        },
    ] {
        world::apply(&mut world, command, &mut events);
    }

    let mut pending = vec![Command::Tick {
        dt: Duration::from_millis(50),
    }];
    for _ in 0..8 {
        let mut round_events = Vec::new();
        for command in pending.drain(..) {
            world::apply(&mut world, command, &mut round_events);
        }
        system.handle(
            &round_events,
            &query::trap_view(&world),
            &query::creature_view(&world),
            &mut pending,
        );
        world::apply(
            &mut world,
            Command::UpdateCreature {
                id: ELK,
                position: Vec3::new(12.0, 0.0, 10.0),
                velocity: Vec3::X,
                moving: true,
            },
            &mut round_events,
        );
        pending.push(Command::Tick {
            dt: Duration::from_millis(500),
        });
    }

    let trap = query::trap_view(&world)
        .get(trap_id())
        .cloned()
        .expect("trap exists");
    assert_eq!(trap.state, TrapState::Closed);
    assert_eq!(trap.captured, Some(ELK));
    assert!(trap.damage > 1.0);
    let elk = query::creature_view(&world)
        .get(ELK)
        .cloned()
        .expect("elk exists");
    assert_eq!(elk.capture_tag, Some(CaptureTag::new(trap_id())));
    assert!(elk.health.is_some_and(|health| health < 1.0e6 - 150.0));
}

proptest! {
    #[test]
    fn capture_probability_stays_in_unit_interval(trap_chance in proptest::num::f32::ANY) {
        let probability = capture_probability(trap_chance);
        prop_assert!((0.0..=1.0).contains(&probability));
    }
}
