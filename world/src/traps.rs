//! Authoritative trap state management utilities.

use std::{collections::BTreeMap, time::Duration};

use snare_core::{
    CreatureId, DamageAccumulator, DurabilitySpec, ItemStack, TrapId, TrapSnapshot, TrapState,
};

/// Descriptor recorded when a trap breaks without ever holding anything.
pub(crate) const WEAR_DESCRIPTOR: &str = "wear";

/// State of a single trap stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct Trap {
    pub(crate) id: TrapId,
    pub(crate) material: String,
    pub(crate) durability: DurabilitySpec,
    pub(crate) rotation_y_deg: f32,
    pub(crate) wear: DamageAccumulator,
    /// Creature currently held. Only ever set or cleared by the capture module.
    pub(crate) captured: Option<CreatureId>,
    /// Descriptor of the most recent captive, used if the trap later breaks.
    pub(crate) last_captor: Option<String>,
    pub(crate) last_struggle_wear_at: Option<Duration>,
    state: TrapState,
    bait: Option<ItemStack>,
    destroyed_descriptor: Option<String>,
}

impl Trap {
    /// Creates a freshly placed, closed trap with no wear.
    pub(crate) fn new(
        id: TrapId,
        material: String,
        durability: DurabilitySpec,
        rotation_y_deg: f32,
    ) -> Self {
        Self {
            id,
            material,
            durability,
            rotation_y_deg,
            wear: DamageAccumulator::new(durability.max_durability() as f32),
            captured: None,
            last_captor: None,
            last_struggle_wear_at: None,
            state: TrapState::Closed,
            bait: None,
            destroyed_descriptor: None,
        }
    }

    pub(crate) fn state(&self) -> TrapState {
        self.state
    }

    pub(crate) fn bait(&self) -> Option<&ItemStack> {
        self.bait.as_ref()
    }

    pub(crate) fn destroyed_descriptor(&self) -> Option<&str> {
        self.destroyed_descriptor.as_deref()
    }

    /// Moves the state machine, returning the previous state when it changed.
    ///
    /// `Destroyed` is absorbing and the bait slot empties on every state other
    /// than `Baited`. Callers release captives before leaving `Closed`.
    pub(crate) fn set_state(&mut self, next: TrapState) -> Option<TrapState> {
        if self.state == TrapState::Destroyed {
            return None;
        }
        if next != TrapState::Baited {
            self.bait = None;
        }
        if self.state == next {
            return None;
        }
        let previous = self.state;
        self.state = next;
        Some(previous)
    }

    /// Puts a single unit of bait into the slot. Only valid while `Open`.
    pub(crate) fn arm(&mut self, bait: ItemStack) -> Option<TrapState> {
        if self.state != TrapState::Open {
            return None;
        }
        let previous = self.set_state(TrapState::Baited);
        self.bait = Some(bait);
        previous
    }

    /// Removes the bait without changing state. Callers transition afterwards.
    pub(crate) fn take_bait(&mut self) -> Option<ItemStack> {
        self.bait.take()
    }

    /// Records the destruction cause. The first descriptor sticks.
    pub(crate) fn record_destruction(&mut self, descriptor: String) {
        self.wear.saturate();
        if self.destroyed_descriptor.is_none() {
            self.destroyed_descriptor = Some(descriptor);
        }
    }

    /// Restores a descriptor read back from persisted attributes.
    pub(crate) fn restore_descriptor(&mut self, descriptor: Option<String>) {
        if self.destroyed_descriptor.is_none() {
            self.destroyed_descriptor = descriptor;
        }
    }

    pub(crate) fn snapshot(&self) -> TrapSnapshot {
        TrapSnapshot {
            id: self.id,
            material: self.material.clone(),
            state: self.state,
            damage: self.wear.damage(),
            max_durability: self.wear.max(),
            snap_damage: self.durability.snap_damage(),
            rotation_y_deg: self.rotation_y_deg,
            captured: self.captured,
            bait: self.bait.clone(),
            destroyed_descriptor: self.destroyed_descriptor.clone(),
        }
    }

    /// Block-info text shown to players looking at the trap.
    pub(crate) fn describe(&self) -> String {
        if self.state == TrapState::Destroyed {
            return match &self.destroyed_descriptor {
                Some(descriptor) => format!("Destroyed by {descriptor}"),
                None => "Destroyed".to_owned(),
            };
        }

        let mut text = format!(
            "Durability: {}/{}\n",
            self.wear.remaining().round(),
            self.wear.max().round()
        );
        if let Some(bait) = &self.bait {
            text.push_str(&format!("Bait: {}\n", bait.code));
        }
        text.push_str(self.state.name());
        text
    }
}

/// Registry that stores traps keyed by their block.
#[derive(Debug, Default)]
pub(crate) struct TrapRegistry {
    entries: BTreeMap<TrapId, Trap>,
}

impl TrapRegistry {
    pub(crate) fn contains(&self, trap: TrapId) -> bool {
        self.entries.contains_key(&trap)
    }

    pub(crate) fn insert(&mut self, trap: Trap) {
        let _ = self.entries.insert(trap.id, trap);
    }

    pub(crate) fn remove(&mut self, trap: TrapId) -> Option<Trap> {
        self.entries.remove(&trap)
    }

    pub(crate) fn get(&self, trap: TrapId) -> Option<&Trap> {
        self.entries.get(&trap)
    }

    pub(crate) fn get_mut(&mut self, trap: TrapId) -> Option<&mut Trap> {
        self.entries.get_mut(&trap)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Trap> {
        self.entries.values()
    }
}
