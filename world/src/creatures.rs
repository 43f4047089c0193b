//! Mirror of the host creatures the traps interact with.

use std::collections::BTreeMap;

use glam::Vec3;
use snare_core::{CaptureTag, CreatureId, CreatureKind, CreatureSnapshot, TrapId};

/// Walk speed modifier that removes all walking speed.
pub(crate) const CRIPPLED_WALK_SPEED: f32 = -1.0;

const PLAYER_TIREDNESS: f32 = 1.0;
const ANIMAL_TIREDNESS: f32 = 4.0;

/// Result of applying damage to a creature.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum DamageOutcome {
    /// The creature has no health capability or is already dead.
    Ignored,
    /// The creature survived with the given health.
    Hurt(f32),
    /// The hit was lethal.
    Killed,
}

#[derive(Clone, Debug)]
pub(crate) struct Creature {
    pub(crate) id: CreatureId,
    pub(crate) kind: CreatureKind,
    pub(crate) position: Vec3,
    pub(crate) velocity: Vec3,
    pub(crate) moving: bool,
    pub(crate) alive: bool,
    pub(crate) health: Option<f32>,
    pub(crate) trap_chance: f32,
    pub(crate) tiredness: f32,
    pub(crate) mounted_on: Option<TrapId>,
    pub(crate) capture_tag: Option<CaptureTag>,
    pub(crate) death_cause: Option<String>,
    walk_speed_modifiers: BTreeMap<String, f32>,
}

impl Creature {
    pub(crate) fn new(
        id: CreatureId,
        kind: CreatureKind,
        position: Vec3,
        health: Option<f32>,
        trap_chance: f32,
    ) -> Self {
        Self {
            id,
            kind,
            position,
            velocity: Vec3::ZERO,
            moving: false,
            alive: true,
            health,
            trap_chance,
            tiredness: 0.0,
            mounted_on: None,
            capture_tag: None,
            death_cause: None,
            walk_speed_modifiers: BTreeMap::new(),
        }
    }

    /// Reports whether a trap already holds the creature by either strategy.
    pub(crate) fn is_held(&self) -> bool {
        self.mounted_on.is_some() || self.capture_tag.is_some()
    }

    /// Applies damage. A lethal hit records `cause` and marks the creature dead.
    pub(crate) fn apply_damage(&mut self, amount: f32, cause: &str) -> DamageOutcome {
        if !self.alive {
            return DamageOutcome::Ignored;
        }
        let Some(health) = self.health.as_mut() else {
            return DamageOutcome::Ignored;
        };

        let amount = if amount.is_finite() { amount.max(0.0) } else { 0.0 };
        if *health - amount <= 0.0 {
            *health = 0.0;
            self.alive = false;
            self.death_cause = Some(cause.to_owned());
            return DamageOutcome::Killed;
        }
        *health -= amount;
        DamageOutcome::Hurt(*health)
    }

    /// Adds the tiredness cost of one struggle.
    pub(crate) fn add_struggle_tiredness(&mut self) {
        self.tiredness += if self.kind.is_player() {
            PLAYER_TIREDNESS
        } else {
            ANIMAL_TIREDNESS
        };
    }

    pub(crate) fn set_walk_speed_modifier(&mut self, key: &str, value: f32) {
        let _ = self.walk_speed_modifiers.insert(key.to_owned(), value);
    }

    pub(crate) fn remove_walk_speed_modifier(&mut self, key: &str) {
        let _ = self.walk_speed_modifiers.remove(key);
    }

    pub(crate) fn snapshot(&self) -> CreatureSnapshot {
        CreatureSnapshot {
            id: self.id,
            kind: self.kind.clone(),
            position: self.position,
            velocity: self.velocity,
            moving: self.moving,
            alive: self.alive,
            health: self.health,
            trap_chance: self.trap_chance,
            mounted_on: self.mounted_on,
            capture_tag: self.capture_tag,
            tiredness: self.tiredness,
            walk_speed_modifier: self.walk_speed_modifiers.values().sum(),
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct CreatureRegistry {
    entries: BTreeMap<CreatureId, Creature>,
}

impl CreatureRegistry {
    pub(crate) fn insert(&mut self, creature: Creature) {
        let _ = self.entries.insert(creature.id, creature);
    }

    pub(crate) fn remove(&mut self, creature: CreatureId) -> Option<Creature> {
        self.entries.remove(&creature)
    }

    pub(crate) fn get(&self, creature: CreatureId) -> Option<&Creature> {
        self.entries.get(&creature)
    }

    pub(crate) fn get_mut(&mut self, creature: CreatureId) -> Option<&mut Creature> {
        self.entries.get_mut(&creature)
    }

    /// Finds the entity of the player with the given account identifier.
    pub(crate) fn player_by_uid(&self, uid: &str) -> Option<CreatureId> {
        self.entries.values().find_map(|creature| match &creature.kind {
            CreatureKind::Player { uid: candidate } if candidate == uid => Some(creature.id),
            _ => None,
        })
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Creature> {
        self.entries.values()
    }
}
