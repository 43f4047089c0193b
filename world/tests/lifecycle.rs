use std::time::Duration;

use glam::Vec3;
use proptest::prelude::*;
use snare_core::{
    BlockPos, CaptureStrategy, Command, CreatureId, CreatureKind, Event, FoodCategory, ItemStack,
    TrapId, TrapState,
};
use snare_world::{apply, query, FoodSource, Mountable, PointOfInterest, World, WorldConfig};

const PLAYER: CreatureId = CreatureId::new(1);
const HARE: CreatureId = CreatureId::new(2);

fn trap_id() -> TrapId {
    TrapId::at(BlockPos::new(3, 1, -2))
}

fn berries() -> ItemStack {
    ItemStack {
        code: "game:fruit-blueberry".to_owned(),
        quantity: 12,
        nutrition: Some(FoodCategory::Fruit),
        food_tags: Vec::new(),
    }
}

fn copper_world(strategy: CaptureStrategy, hare_health: f32) -> World {
    let mut world = World::with_config(WorldConfig {
        strategy,
        ..WorldConfig::default()
    });
    let mut events = Vec::new();
    for command in [
        Command::PlaceTrap {
            position: trap_id().position(),
            material: "copper".to_owned(),
            rotation_y_deg: 0.0,
        },
        Command::SpawnCreature {
            id: PLAYER,
            kind: CreatureKind::Player {
                uid: "uid-1".to_owned(),
            },
            position: Vec3::new(4.0, 1.0, -2.0),
            health: Some(15.0),
            trap_chance: 0.5,
        },
        Command::SpawnCreature {
            id: HARE,
            kind: CreatureKind::Animal {
                species: "hare-arctic".to_owned(),
            },
            position: Vec3::new(6.0, 1.0, -2.0),
            health: Some(hare_health),
            trap_chance: 0.5,
        },
    ] {
        apply(&mut world, command, &mut events);
    }
    world
}

fn interact(world: &mut World, careful: bool, held: Option<ItemStack>) -> bool {
    let mut events = Vec::new();
    apply(
        world,
        Command::Interact {
            trap: trap_id(),
            player: PLAYER,
            careful,
            held,
        },
        &mut events,
    );
    events
        .iter()
        .any(|event| matches!(event, Event::InteractionResolved { handled: true, .. }))
}

fn tick(world: &mut World, dt: Duration, events: &mut Vec<Event>) {
    apply(world, Command::Tick { dt }, events);
}

fn snapshot(world: &World) -> snare_core::TrapSnapshot {
    query::trap(world, trap_id())
        .expect("trap is placed")
        .snapshot()
}

#[test]
fn copper_trap_baited_and_sprung_by_a_creature() {
    let mut world = copper_world(CaptureStrategy::Mount, 20.0);

    assert!(interact(&mut world, true, None));
    assert_eq!(snapshot(&world).state, TrapState::Open);

    assert!(interact(&mut world, true, Some(berries())));
    let armed = snapshot(&world);
    assert_eq!(armed.state, TrapState::Baited);
    assert_eq!(armed.bait.as_ref().map(|bait| bait.quantity), Some(1));

    let hare = query::creature_view(&world)
        .get(HARE)
        .cloned()
        .expect("hare spawned");
    let mut commands = Vec::new();
    {
        let handle = query::trap(&world, trap_id()).expect("trap is placed");
        assert_eq!(handle.kind(), "food");
        assert!(handle.is_suitable(&hare, &Default::default()));
        let portion = handle.consume_one_portion(HARE, &mut commands);
        assert!((portion - 1.0).abs() < f32::EPSILON);
    }

    let mut events = Vec::new();
    for command in commands {
        apply(&mut world, command, &mut events);
    }
    assert_eq!(snapshot(&world).state, TrapState::Baited);

    tick(&mut world, Duration::from_millis(50), &mut events);

    let sprung = snapshot(&world);
    assert_eq!(sprung.state, TrapState::Closed);
    assert!(sprung.bait.is_none());
    assert!((sprung.damage - 1.0).abs() < f32::EPSILON);
    assert_eq!(sprung.captured, Some(HARE));

    let hare = query::creature_view(&world)
        .get(HARE)
        .cloned()
        .expect("hare alive");
    assert_eq!(hare.health, Some(13.0));
    assert!(events.contains(&Event::CreatureDamaged {
        creature: HARE,
        amount: 7.0,
        health: 13.0,
    }));

    let handle = query::trap(&world, trap_id()).expect("trap is placed");
    assert_eq!(handle.mounted_by(), Some(HARE));
    assert_eq!(handle.kind(), "nothing");
}

#[test]
fn fifty_struggles_destroy_a_copper_trap_for_good() {
    let mut world = copper_world(CaptureStrategy::Mount, 1.0e6);
    assert!(interact(&mut world, true, None));
    assert!(interact(&mut world, true, Some(berries())));

    let mut events = Vec::new();
    apply(
        &mut world,
        Command::ConsumeBait {
            trap: trap_id(),
            creature: HARE,
        },
        &mut events,
    );
    tick(&mut world, Duration::from_millis(50), &mut events);
    assert!((snapshot(&world).damage - 1.0).abs() < f32::EPSILON);

    for _ in 1..50 {
        tick(&mut world, Duration::from_secs(1), &mut events);
        apply(&mut world, Command::Struggle { trap: trap_id() }, &mut events);
    }

    let broken = snapshot(&world);
    assert_eq!(broken.state, TrapState::Destroyed);
    assert!((broken.damage - 50.0).abs() < f32::EPSILON);
    assert_eq!(broken.captured, None);
    assert_eq!(
        broken.destroyed_descriptor.as_deref(),
        Some("creature-harearctic")
    );
    assert_eq!(
        events
            .iter()
            .filter(|event| matches!(event, Event::TrapDestroyed { .. }))
            .count(),
        1
    );

    for attempt in 0..10 {
        assert!(interact(&mut world, attempt % 2 == 0, Some(berries())));
        assert_eq!(snapshot(&world).state, TrapState::Destroyed);
    }
    assert_eq!(
        query::trap(&world, trap_id())
            .expect("trap is placed")
            .describe(),
        "Destroyed by creature-harearctic"
    );
}

#[test]
fn save_and_load_restores_the_capture() {
    let mut world = copper_world(CaptureStrategy::Mount, 20.0);
    assert!(interact(&mut world, true, None));
    assert!(interact(&mut world, true, Some(berries())));
    let mut events = Vec::new();
    apply(
        &mut world,
        Command::ConsumeBait {
            trap: trap_id(),
            creature: HARE,
        },
        &mut events,
    );
    tick(&mut world, Duration::from_millis(50), &mut events);
    let before = snapshot(&world);

    let tree = query::save_trap(&world, trap_id()).expect("trap is placed");
    apply(&mut world, Command::UnloadTrap { trap: trap_id() }, &mut events);
    assert!(query::trap(&world, trap_id()).is_none());
    assert_eq!(
        query::creature_view(&world)
            .get(HARE)
            .and_then(|hare| hare.mounted_on),
        None
    );

    apply(
        &mut world,
        Command::LoadTrap {
            position: trap_id().position(),
            material: "copper".to_owned(),
            tree,
        },
        &mut events,
    );

    let after = snapshot(&world);
    assert_eq!(after.state, before.state);
    assert!((after.damage - before.damage).abs() < f32::EPSILON);
    assert_eq!(after.captured, Some(HARE));
    assert!(query::is_registered_poi(&world, trap_id()));
}

#[test]
fn loading_a_capture_of_an_unknown_creature_drops_it() {
    let mut world = copper_world(CaptureStrategy::Mount, 20.0);
    let mut tree = snare_core::AttributeTree::new();
    tree.set(
        snare_world::persistence::STATE_KEY,
        snare_core::AttributeValue::String("closed".to_owned()),
    );
    tree.set(
        snare_world::persistence::MOUNTED_ENTITY_KEY,
        snare_core::AttributeValue::Long(999),
    );
    let mut events = Vec::new();

    apply(
        &mut world,
        Command::LoadTrap {
            position: BlockPos::new(20, 0, 0),
            material: "iron".to_owned(),
            tree,
        },
        &mut events,
    );

    let loaded = query::trap(&world, TrapId::at(BlockPos::new(20, 0, 0)))
        .expect("trap is loaded")
        .snapshot();
    assert_eq!(loaded.state, TrapState::Closed);
    assert_eq!(loaded.captured, None);
}

#[derive(Clone, Debug)]
enum Touch {
    Careful,
    CarefulWithFood,
    Careless,
    HareEats,
    Tick,
    Struggle,
}

fn touch() -> impl Strategy<Value = Touch> {
    prop_oneof![
        Just(Touch::Careful),
        Just(Touch::CarefulWithFood),
        Just(Touch::Careless),
        Just(Touch::HareEats),
        Just(Touch::Tick),
        Just(Touch::Struggle),
    ]
}

fn perform(world: &mut World, touch: &Touch) {
    let mut events = Vec::new();
    let command = match touch {
        Touch::Careful => Command::Interact {
            trap: trap_id(),
            player: PLAYER,
            careful: true,
            held: None,
        },
        Touch::CarefulWithFood => Command::Interact {
            trap: trap_id(),
            player: PLAYER,
            careful: true,
            held: Some(berries()),
        },
        Touch::Careless => Command::Interact {
            trap: trap_id(),
            player: PLAYER,
            careful: false,
            held: None,
        },
        Touch::HareEats => Command::ConsumeBait {
            trap: trap_id(),
            creature: HARE,
        },
        Touch::Tick => Command::Tick {
            dt: Duration::from_millis(700),
        },
        Touch::Struggle => Command::Struggle { trap: trap_id() },
    };
    apply(world, command, &mut events);
}

proptest! {
    #[test]
    fn trap_invariants_hold_for_any_touch_sequence(
        strategy in prop_oneof![Just(CaptureStrategy::Mount), Just(CaptureStrategy::Tag)],
        touches in proptest::collection::vec(touch(), 0..120),
    ) {
        let mut world = copper_world(strategy, 1.0e6);
        let mut destroyed = false;

        for touch in &touches {
            perform(&mut world, touch);
            let trap = snapshot(&world);

            prop_assert!(trap.damage >= 0.0);
            prop_assert!(trap.damage <= trap.max_durability);
            prop_assert_eq!(trap.bait.is_some(), trap.state == TrapState::Baited);
            if destroyed {
                prop_assert_eq!(trap.state, TrapState::Destroyed);
                prop_assert!(trap.destroyed_descriptor.is_some());
            }
            destroyed = trap.state == TrapState::Destroyed;

            let holders = query::creature_view(&world)
                .iter()
                .filter(|creature| {
                    creature.mounted_on == Some(trap_id())
                        || creature.capture_tag.is_some_and(|tag| tag.trap() == trap_id())
                })
                .count();
            prop_assert!(holders <= 1);
            prop_assert_eq!(holders == 1, trap.captured.is_some());
        }
    }
}
