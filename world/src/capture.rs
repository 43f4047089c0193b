//! The only place where a trap and its captive are linked or unlinked.
//!
//! A capture consists of two references that must agree: the trap's
//! `captured` slot and the creature's back-reference (`mounted_on` for the
//! mount strategy, `capture_tag` for the tag strategy). [`attach`] sets both
//! and [`release`] clears both, so no other code touches either side.

use snare_core::{CaptureStrategy, CaptureTag, Event, ReleaseReason};

use crate::{
    creatures::{Creature, CreatureRegistry, CRIPPLED_WALK_SPEED},
    traps::Trap,
};

/// Links `creature` to `trap`. Returns `false` without side effects when either
/// side is already part of a capture or the creature is dead.
pub(crate) fn attach(
    trap: &mut Trap,
    creature: &mut Creature,
    strategy: CaptureStrategy,
    stat_key: &str,
    out_events: &mut Vec<Event>,
) -> bool {
    if trap.captured.is_some() || creature.is_held() || !creature.alive {
        return false;
    }

    match strategy {
        CaptureStrategy::Mount => {
            creature.mounted_on = Some(trap.id);
            creature.position = trap.id.mount_point();
            creature.velocity = glam::Vec3::ZERO;
            creature.set_walk_speed_modifier(stat_key, CRIPPLED_WALK_SPEED);
        }
        CaptureStrategy::Tag => {
            creature.capture_tag = Some(CaptureTag::new(trap.id));
        }
    }

    trap.captured = Some(creature.id);
    trap.last_captor = Some(creature.kind.descriptor());
    tracing::debug!(trap = %trap.id, creature = creature.id.get(), ?strategy, "creature captured");
    out_events.push(Event::CreatureCaptured {
        trap: trap.id,
        creature: creature.id,
        strategy,
    });
    true
}

/// Ends whatever capture `trap` holds. Calling it on an empty trap is a no-op.
pub(crate) fn release(
    trap: &mut Trap,
    creatures: &mut CreatureRegistry,
    reason: ReleaseReason,
    stat_key: &str,
    out_events: &mut Vec<Event>,
) {
    let Some(creature_id) = trap.captured.take() else {
        return;
    };

    if let Some(creature) = creatures.get_mut(creature_id) {
        if creature.mounted_on == Some(trap.id) {
            creature.mounted_on = None;
            creature.remove_walk_speed_modifier(stat_key);
        }
        if creature
            .capture_tag
            .is_some_and(|tag| tag.trap() == trap.id)
        {
            creature.capture_tag = None;
        }
    }

    tracing::debug!(trap = %trap.id, creature = creature_id.get(), ?reason, "creature released");
    out_events.push(Event::CreatureReleased {
        trap: trap.id,
        creature: creature_id,
        reason,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use snare_core::{BlockPos, CreatureId, CreatureKind, DurabilitySpec, TrapId};

    const KEY: &str = "snare:trapped";

    fn trap(x: i32) -> Trap {
        Trap::new(
            TrapId::at(BlockPos::new(x, 0, 0)),
            "copper".to_owned(),
            DurabilitySpec::new(50, 7.0),
            0.0,
        )
    }

    fn hare() -> Creature {
        Creature::new(
            CreatureId::new(3),
            CreatureKind::Animal {
                species: "hare".to_owned(),
            },
            Vec3::new(4.0, 0.0, 4.0),
            Some(5.0),
            0.5,
        )
    }

    #[test]
    fn mount_pins_creature_and_cripples_walk_speed() {
        let mut trap = trap(0);
        let mut creature = hare();
        let mut events = Vec::new();

        assert!(attach(&mut trap, &mut creature, CaptureStrategy::Mount, KEY, &mut events));
        assert_eq!(trap.captured, Some(creature.id));
        assert_eq!(creature.mounted_on, Some(trap.id));
        assert_eq!(creature.position, trap.id.mount_point());
        assert!(creature.snapshot().walk_speed_modifier < 0.0);
        assert_eq!(trap.last_captor.as_deref(), Some("creature-hare"));
    }

    #[test]
    fn second_capture_is_refused() {
        let mut first = trap(0);
        let mut second = trap(1);
        let mut creature = hare();
        let mut other = hare();
        other.id = CreatureId::new(4);
        let mut events = Vec::new();

        assert!(attach(&mut first, &mut creature, CaptureStrategy::Tag, KEY, &mut events));
        assert!(!attach(&mut second, &mut creature, CaptureStrategy::Tag, KEY, &mut events));
        assert!(!attach(&mut first, &mut other, CaptureStrategy::Tag, KEY, &mut events));
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn release_clears_both_sides_and_is_idempotent() {
        let mut trap = trap(0);
        let mut registry = CreatureRegistry::default();
        let mut creature = hare();
        let mut events = Vec::new();
        assert!(attach(&mut trap, &mut creature, CaptureStrategy::Mount, KEY, &mut events));
        let id = creature.id;
        registry.insert(creature);

        release(&mut trap, &mut registry, ReleaseReason::TrapOpened, KEY, &mut events);
        release(&mut trap, &mut registry, ReleaseReason::TrapOpened, KEY, &mut events);

        let creature = registry.get(id).expect("creature kept");
        assert!(trap.captured.is_none());
        assert!(creature.mounted_on.is_none());
        assert!(creature.snapshot().walk_speed_modifier.abs() < f32::EPSILON);
        let releases = events
            .iter()
            .filter(|event| matches!(event, Event::CreatureReleased { .. }))
            .count();
        assert_eq!(releases, 1);
    }
}
