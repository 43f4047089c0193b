//! Capabilities the trap exposes to the host's creature AI and mount system.

use std::collections::BTreeSet;

use glam::Vec3;
use snare_core::{
    Command, CreatureDiet, CreatureId, CreatureSnapshot, TrapId, TrapSnapshot, TrapState,
};

use crate::traps::Trap;

/// Portion size reported for every bite of bait.
pub const PORTION_SIZE: f32 = 1.0;

/// Something creature AI can locate spatially.
pub trait PointOfInterest {
    /// World position of the point of interest.
    fn position(&self) -> Vec3;

    /// Short type label. `"food"` while bait is present, `"nothing"` otherwise.
    fn kind(&self) -> &'static str;
}

/// Something a creature can eat from.
pub trait FoodSource: PointOfInterest {
    /// Reports whether `creature` with `diet` would eat here.
    fn is_suitable(&self, creature: &CreatureSnapshot, diet: &CreatureDiet) -> bool;

    /// Records that `creature` ate one portion and returns the portion size.
    ///
    /// Callers iterate the AI's own structures while calling this, so the
    /// resulting snap is only queued as a command; the world applies it on its
    /// next tick.
    fn consume_one_portion(&self, creature: CreatureId, out: &mut Vec<Command>) -> f32;
}

/// Something a creature can be attached to.
pub trait Mountable {
    /// Where the mounted creature is held.
    fn mount_position(&self) -> Vec3;

    /// Animation the host should play on the mounted creature.
    fn suggested_animation(&self) -> &'static str;

    /// Whether the mounted creature steers the mount.
    fn can_control(&self) -> bool;

    /// Creature currently attached.
    fn mounted_by(&self) -> Option<CreatureId>;
}

/// Borrowed, read-only handle onto a single trap.
#[derive(Clone, Copy, Debug)]
pub struct TrapHandle<'a> {
    trap: &'a Trap,
}

impl<'a> TrapHandle<'a> {
    pub(crate) fn new(trap: &'a Trap) -> Self {
        Self { trap }
    }

    /// Identifier of the trap.
    #[must_use]
    pub fn id(&self) -> TrapId {
        self.trap.id
    }

    /// Current state of the trap.
    #[must_use]
    pub fn state(&self) -> TrapState {
        self.trap.state()
    }

    /// Full snapshot of the trap.
    #[must_use]
    pub fn snapshot(&self) -> TrapSnapshot {
        self.trap.snapshot()
    }

    /// Block-info text shown to players.
    #[must_use]
    pub fn describe(&self) -> String {
        self.trap.describe()
    }
}

impl PointOfInterest for TrapHandle<'_> {
    fn position(&self) -> Vec3 {
        self.trap.id.center()
    }

    fn kind(&self) -> &'static str {
        if self.trap.bait().is_some() {
            "food"
        } else {
            "nothing"
        }
    }
}

impl FoodSource for TrapHandle<'_> {
    fn is_suitable(&self, creature: &CreatureSnapshot, diet: &CreatureDiet) -> bool {
        if self.trap.state() != TrapState::Baited || !creature.alive {
            return false;
        }
        if diet.food_tags.is_empty() {
            return true;
        }
        self.trap.bait().is_some_and(|bait| diet.matches(bait))
    }

    fn consume_one_portion(&self, creature: CreatureId, out: &mut Vec<Command>) -> f32 {
        out.push(Command::ConsumeBait {
            trap: self.trap.id,
            creature,
        });
        PORTION_SIZE
    }
}

impl Mountable for TrapHandle<'_> {
    fn mount_position(&self) -> Vec3 {
        self.trap.id.mount_point()
    }

    fn suggested_animation(&self) -> &'static str {
        "stand"
    }

    fn can_control(&self) -> bool {
        false
    }

    fn mounted_by(&self) -> Option<CreatureId> {
        self.trap.captured
    }
}

/// Set of traps currently advertised to creature AI.
#[derive(Debug, Default)]
pub(crate) struct PoiRegistry {
    entries: BTreeSet<TrapId>,
}

impl PoiRegistry {
    /// Returns `true` when the trap was not registered before.
    pub(crate) fn add(&mut self, trap: TrapId) -> bool {
        self.entries.insert(trap)
    }

    /// Returns `true` when the trap was registered.
    pub(crate) fn remove(&mut self, trap: TrapId) -> bool {
        self.entries.remove(&trap)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = TrapId> + '_ {
        self.entries.iter().copied()
    }
}
