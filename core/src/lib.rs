#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Snare trap simulation.
//!
//! This crate defines the message surface that connects the host adapter, the
//! authoritative world, and pure systems. The adapter submits [`Command`]
//! values describing desired mutations, the world executes those commands via
//! its `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.

mod damage;
mod durability;

use std::{collections::BTreeMap, fmt, time::Duration};

use glam::Vec3;
use serde::{Deserialize, Serialize};

pub use damage::{DamageAccumulator, CAP_TOLERANCE};
pub use durability::{DurabilitySpec, DurabilityTable};

/// Sound played whenever the jaws close or the trap wears under a struggle.
pub const SNAP_SOUND: &str = "game:sounds/effect/anvilhit1";
/// Sound played when the trap breaks beyond repair.
pub const BREAK_SOUND: &str = "game:sounds/effect/anvilhit3";

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Places a fresh, closed trap at the provided block.
    PlaceTrap {
        /// Block that will host the trap.
        position: BlockPos,
        /// Material variant key looked up in the durability table.
        material: String,
        /// Visual yaw of the trap in degrees.
        rotation_y_deg: f32,
    },
    /// Restores a trap from its persisted attribute tree.
    LoadTrap {
        /// Block that hosts the trap.
        position: BlockPos,
        /// Material variant key looked up in the durability table.
        material: String,
        /// Attributes previously produced by the persistence codec.
        tree: AttributeTree,
    },
    /// Removes a trap because its block was broken or removed.
    RemoveTrap {
        /// Trap being removed.
        trap: TrapId,
    },
    /// Unloads a trap whose chunk left memory.
    UnloadTrap {
        /// Trap being unloaded.
        trap: TrapId,
    },
    /// Registers a creature with the world mirror.
    SpawnCreature {
        /// Identifier assigned by the host.
        id: CreatureId,
        /// Whether the creature is a player or an animal.
        kind: CreatureKind,
        /// Initial world position.
        position: Vec3,
        /// Starting health, or `None` when the creature cannot be damaged.
        health: Option<f32>,
        /// Species property that lowers the odds of a tag capture.
        trap_chance: f32,
    },
    /// Mirrors host-side locomotion state for a creature.
    UpdateCreature {
        /// Creature being updated.
        id: CreatureId,
        /// Current world position.
        position: Vec3,
        /// Current velocity.
        velocity: Vec3,
        /// Whether a locomotion animation is active.
        moving: bool,
    },
    /// Reports that the host killed a creature.
    MarkCreatureDead {
        /// Creature that died.
        id: CreatureId,
    },
    /// Removes a creature from the world mirror.
    DespawnCreature {
        /// Creature leaving the world.
        id: CreatureId,
    },
    /// A player used the trap block.
    Interact {
        /// Trap the player interacted with.
        trap: TrapId,
        /// Player entity performing the interaction.
        player: CreatureId,
        /// Whether the player was sneaking or sitting on the floor.
        careful: bool,
        /// Item stack in the player's active hotbar slot.
        held: Option<ItemStack>,
    },
    /// A creature ate from the bait. Queued and resolved on the next tick.
    ConsumeBait {
        /// Trap whose bait was eaten.
        trap: TrapId,
        /// Creature that ate.
        creature: CreatureId,
    },
    /// A mounted creature tried to walk, which counts as struggling.
    MoveIntent {
        /// Creature whose locomotion input was intercepted.
        creature: CreatureId,
    },
    /// The creature held by a trap struggles against the jaws.
    Struggle {
        /// Trap holding the creature.
        trap: TrapId,
    },
    /// Attaches a capture tag after a successful capture roll.
    TagCreature {
        /// Trap that snapped on the creature.
        trap: TrapId,
        /// Creature receiving the tag.
        creature: CreatureId,
    },
    /// Overrides a tagged creature's velocity with the trap's pull.
    PullCreature {
        /// Creature being pulled.
        creature: CreatureId,
        /// Velocity after blending in the pull.
        velocity: Vec3,
    },
    /// Releases whatever creature the trap currently holds.
    ReleaseCreature {
        /// Trap letting go.
        trap: TrapId,
        /// Why the capture ended.
        reason: ReleaseReason,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that a trap now exists at the given block.
    TrapPlaced {
        /// Newly placed or loaded trap.
        trap: TrapId,
        /// Material variant of the trap.
        material: String,
    },
    /// Reports that a placement or load request was rejected.
    PlacementRejected {
        /// Block named in the request.
        position: BlockPos,
        /// Specific reason the request failed.
        reason: PlacementError,
    },
    /// Confirms that a trap left the world permanently.
    TrapRemoved {
        /// Trap that was removed.
        trap: TrapId,
    },
    /// Confirms that a trap was unloaded.
    TrapUnloaded {
        /// Trap that was unloaded.
        trap: TrapId,
    },
    /// Announces a state machine transition.
    TrapStateChanged {
        /// Trap that transitioned.
        trap: TrapId,
        /// State before the transition.
        from: TrapState,
        /// State after the transition.
        to: TrapState,
    },
    /// The trap's mesh no longer reflects its state.
    MeshInvalidated {
        /// Trap that needs redrawing.
        trap: TrapId,
    },
    /// The trap joined the point-of-interest registry.
    PoiAdded {
        /// Registered trap.
        trap: TrapId,
    },
    /// The trap left the point-of-interest registry.
    PoiRemoved {
        /// Deregistered trap.
        trap: TrapId,
    },
    /// One unit of the player's held stack became bait.
    BaitPlaced {
        /// Trap that was armed.
        trap: TrapId,
        /// Player whose held stack shrinks by one unit.
        player: CreatureId,
        /// The single unit now sitting in the bait slot.
        bait: ItemStack,
    },
    /// The player took the bait back out of an armed trap.
    BaitReturned {
        /// Trap that was disarmed.
        trap: TrapId,
        /// Player receiving the stack.
        player: CreatureId,
        /// Stack handed back.
        bait: ItemStack,
    },
    /// Reports whether an interaction had any effect.
    InteractionResolved {
        /// Trap the player touched.
        trap: TrapId,
        /// Player that touched it.
        player: CreatureId,
        /// Whether the host should treat the interaction as handled.
        handled: bool,
    },
    /// A bait consumption was queued for the next tick.
    SnapQueued {
        /// Trap that will snap.
        trap: TrapId,
        /// Creature it will snap on.
        creature: CreatureId,
    },
    /// The jaws closed on a creature or player.
    TrapSnapped {
        /// Trap that snapped.
        trap: TrapId,
        /// Creature caught in the jaws.
        creature: CreatureId,
        /// Capture strategy active for the world.
        strategy: CaptureStrategy,
    },
    /// A creature lost health to a trap.
    CreatureDamaged {
        /// Creature that was hurt.
        creature: CreatureId,
        /// Damage applied.
        amount: f32,
        /// Health left after the hit.
        health: f32,
    },
    /// A creature died.
    CreatureKilled {
        /// Creature that died.
        creature: CreatureId,
        /// Death cause recorded on the creature, if a trap killed it.
        cause: Option<String>,
    },
    /// A trap took hold of a creature.
    CreatureCaptured {
        /// Trap holding the creature.
        trap: TrapId,
        /// Captured creature.
        creature: CreatureId,
        /// How the creature is held.
        strategy: CaptureStrategy,
    },
    /// A trap let go of a creature.
    CreatureReleased {
        /// Trap that held the creature.
        trap: TrapId,
        /// Creature that is free again.
        creature: CreatureId,
        /// Why the capture ended.
        reason: ReleaseReason,
    },
    /// The trap absorbed wear.
    TrapWorn {
        /// Trap that wore down.
        trap: TrapId,
        /// Accumulated wear after the hit.
        damage: f32,
        /// Wear at which the trap breaks.
        max_durability: f32,
    },
    /// The trap broke beyond repair.
    TrapDestroyed {
        /// Trap that broke.
        trap: TrapId,
        /// Human-readable cause recorded once on destruction.
        descriptor: String,
    },
    /// Fire-and-forget sound request.
    SoundRequested {
        /// Asset identifier of the sound.
        asset: &'static str,
        /// World position the sound originates from.
        position: Vec3,
    },
}

/// Integer block coordinate in the host world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockPos {
    x: i32,
    y: i32,
    z: i32,
}

impl BlockPos {
    /// Creates a new block coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// East-west coordinate.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Vertical coordinate.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// North-south coordinate.
    #[must_use]
    pub const fn z(&self) -> i32 {
        self.z
    }

    /// Minimum corner of the block in world units.
    #[must_use]
    pub fn corner(&self) -> Vec3 {
        Vec3::new(self.x as f32, self.y as f32, self.z as f32)
    }
}

/// Unique identifier of a trap. A block hosts at most one trap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TrapId(BlockPos);

impl TrapId {
    /// Identifier of the trap hosted by `position`.
    #[must_use]
    pub const fn at(position: BlockPos) -> Self {
        Self(position)
    }

    /// Block hosting the trap.
    #[must_use]
    pub const fn position(&self) -> BlockPos {
        self.0
    }

    /// Centre of the jaws: sound origin, point of interest, and pull target.
    #[must_use]
    pub fn center(&self) -> Vec3 {
        self.0.corner() + Vec3::new(0.5, 0.25, 0.5)
    }

    /// Where a mounted creature stands.
    #[must_use]
    pub fn mount_point(&self) -> Vec3 {
        self.0.corner() + Vec3::new(0.5, 0.0, 0.5)
    }
}

impl fmt::Display for TrapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "trap@{},{},{}", self.0.x, self.0.y, self.0.z)
    }
}

/// Unique identifier assigned to a creature by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CreatureId(u64);

impl CreatureId {
    /// Creates a new creature identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

/// Distinguishes players from other creatures.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CreatureKind {
    /// A player-controlled entity.
    Player {
        /// Stable account identifier of the player.
        uid: String,
    },
    /// Any other creature.
    Animal {
        /// Species code, e.g. `wolf-male`.
        species: String,
    },
}

impl CreatureKind {
    /// Reports whether the creature is player-controlled.
    #[must_use]
    pub fn is_player(&self) -> bool {
        matches!(self, Self::Player { .. })
    }

    /// Human-readable label used when recording what broke a trap.
    #[must_use]
    pub fn descriptor(&self) -> String {
        match self {
            Self::Player { .. } => "player".to_owned(),
            Self::Animal { species } => format!("creature-{}", species.replace('-', "")),
        }
    }
}

/// Finite states of the trap.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum TrapState {
    /// Jaws shut, possibly holding a creature.
    #[default]
    Closed,
    /// Jaws open without bait.
    Open,
    /// Jaws open with bait in the slot.
    Baited,
    /// Broken beyond repair. Absorbing.
    Destroyed,
}

impl TrapState {
    const ALL: [Self; 4] = [Self::Closed, Self::Open, Self::Baited, Self::Destroyed];

    /// Stable ordinal used by the persisted `trapState` attribute.
    #[must_use]
    pub const fn ordinal(self) -> i32 {
        match self {
            Self::Closed => 0,
            Self::Open => 1,
            Self::Baited => 2,
            Self::Destroyed => 3,
        }
    }

    /// Inverse of [`TrapState::ordinal`].
    #[must_use]
    pub fn from_ordinal(ordinal: i32) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|state| state.ordinal() == ordinal)
    }

    /// Case-insensitive parse of a state name.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|state| state.name().eq_ignore_ascii_case(name.trim()))
    }

    /// Canonical name of the state.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Closed => "Closed",
            Self::Open => "Open",
            Self::Baited => "Baited",
            Self::Destroyed => "Destroyed",
        }
    }

    /// Reports whether the jaws are open and waiting.
    #[must_use]
    pub const fn is_armed(self) -> bool {
        matches!(self, Self::Open | Self::Baited)
    }
}

impl fmt::Display for TrapState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a snapped trap holds on to its victim.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureStrategy {
    /// The trap mounts the creature and owns its position.
    #[default]
    Mount,
    /// The creature keeps its position and is held through a capture tag.
    Tag,
}

/// Back-reference stored on a creature held by the tag strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CaptureTag {
    trap: TrapId,
}

impl CaptureTag {
    /// Creates a tag pointing at `trap`.
    #[must_use]
    pub const fn new(trap: TrapId) -> Self {
        Self { trap }
    }

    /// Trap that holds the tagged creature.
    #[must_use]
    pub const fn trap(&self) -> TrapId {
        self.trap
    }
}

/// Reasons a capture can end.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReleaseReason {
    /// The captured creature died.
    Died,
    /// A player opened the trap.
    TrapOpened,
    /// The trap broke.
    TrapDestroyed,
    /// The trap block was removed.
    TrapRemoved,
    /// The trap's chunk unloaded.
    TrapUnloaded,
    /// The creature left the world.
    Despawned,
    /// The host let the creature go.
    Escaped,
}

/// Reasons a placement or load request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementError {
    /// The material key is not in the durability table.
    UnknownMaterial,
    /// Another trap already occupies the block.
    Occupied,
}

/// Nutrition category of an edible item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FoodCategory {
    /// Fruit.
    Fruit,
    /// Vegetables.
    Vegetable,
    /// Protein such as meat or fish.
    Protein,
    /// Grain.
    Grain,
    /// Dairy.
    Dairy,
}

/// Minimal item stack description needed to evaluate bait.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemStack {
    /// Item code, e.g. `game:redmeat-raw`.
    pub code: String,
    /// Number of units in the stack.
    pub quantity: u32,
    /// Nutrition category, when the item is edible.
    pub nutrition: Option<FoodCategory>,
    /// Food tags advertised by the item.
    pub food_tags: Vec<String>,
}

impl ItemStack {
    /// Reports whether the item has a food classification.
    #[must_use]
    pub fn is_food(&self) -> bool {
        self.nutrition.is_some() || !self.food_tags.is_empty()
    }

    /// Copy of this stack holding exactly one unit.
    #[must_use]
    pub fn single_unit(&self) -> Self {
        Self {
            quantity: 1,
            ..self.clone()
        }
    }
}

/// What a creature is willing to eat.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatureDiet {
    /// Nutrition categories the creature eats.
    pub food_categories: Vec<FoodCategory>,
    /// Food tags the creature eats.
    pub food_tags: Vec<String>,
}

impl CreatureDiet {
    /// Reports whether the diet accepts the provided stack.
    #[must_use]
    pub fn matches(&self, stack: &ItemStack) -> bool {
        let category_match = stack
            .nutrition
            .is_some_and(|category| self.food_categories.contains(&category));
        let tag_match = stack
            .food_tags
            .iter()
            .any(|tag| self.food_tags.iter().any(|wanted| wanted == tag));
        category_match || tag_match
    }
}

/// Value stored under a single key of an [`AttributeTree`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    /// 32-bit float.
    Float(f32),
    /// 32-bit integer.
    Int(i32),
    /// 64-bit integer.
    Long(i64),
    /// UTF-8 string.
    String(String),
}

/// Flat key/value container exchanged with the host's persistence layer.
///
/// Only keys and value kinds are defined here; how the host encodes the tree
/// on disk or on the wire is its own business.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributeTree {
    entries: BTreeMap<String, AttributeValue>,
}

impl AttributeTree {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under `key`, replacing any previous value.
    pub fn set(&mut self, key: &str, value: AttributeValue) {
        let _ = self.entries.insert(key.to_owned(), value);
    }

    /// Raw value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.entries.get(key)
    }

    /// Removes `key`, returning whatever it held.
    pub fn remove(&mut self, key: &str) -> Option<AttributeValue> {
        self.entries.remove(key)
    }

    /// Reads a numeric value as a float. Integers widen.
    #[must_use]
    pub fn get_float(&self, key: &str) -> Option<f32> {
        match self.get(key)? {
            AttributeValue::Float(value) => Some(*value),
            AttributeValue::Int(value) => Some(*value as f32),
            AttributeValue::Long(value) => Some(*value as f32),
            AttributeValue::String(_) => None,
        }
    }

    /// Reads a numeric value as a 64-bit integer. Floats are not coerced.
    #[must_use]
    pub fn get_long(&self, key: &str) -> Option<i64> {
        match self.get(key)? {
            AttributeValue::Int(value) => Some(i64::from(*value)),
            AttributeValue::Long(value) => Some(*value),
            AttributeValue::Float(_) | AttributeValue::String(_) => None,
        }
    }

    /// Reads a string value.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.get(key)? {
            AttributeValue::String(value) => Some(value),
            _ => None,
        }
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether the tree holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Converts irregular tick deltas into a whole number of fixed-interval passes.
#[derive(Clone, Copy, Debug)]
pub struct PassTimer {
    interval: Duration,
    accumulator: Duration,
}

impl PassTimer {
    /// Creates a timer that fires once per `interval` of simulated time.
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            accumulator: Duration::ZERO,
        }
    }

    /// Interval between passes.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Accumulates `dt` and returns how many passes became due.
    ///
    /// A zero interval never fires.
    pub fn advance(&mut self, dt: Duration) -> u32 {
        if self.interval.is_zero() {
            return 0;
        }

        self.accumulator = self.accumulator.saturating_add(dt);
        let interval = self.interval.as_nanos();
        let accumulated = self.accumulator.as_nanos();
        let remainder = accumulated % interval;
        self.accumulator = Duration::new(
            u64::try_from(remainder / NANOS_PER_SEC).unwrap_or(u64::MAX),
            u32::try_from(remainder % NANOS_PER_SEC).unwrap_or(0),
        );
        // Saturates rather than wrapping.
        u32::try_from(accumulated / interval).unwrap_or(u32::MAX)
    }

    /// Discards partially accumulated time.
    pub fn reset(&mut self) {
        self.accumulator = Duration::ZERO;
    }
}

/// Immutable representation of a single trap's state used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct TrapSnapshot {
    /// Trap identifier.
    pub id: TrapId,
    /// Material variant.
    pub material: String,
    /// Current state.
    pub state: TrapState,
    /// Accumulated wear.
    pub damage: f32,
    /// Wear at which the trap breaks.
    pub max_durability: f32,
    /// Damage the jaws deal on a snap.
    pub snap_damage: f32,
    /// Visual yaw in degrees.
    pub rotation_y_deg: f32,
    /// Creature currently held, if any.
    pub captured: Option<CreatureId>,
    /// Bait sitting in the slot.
    pub bait: Option<ItemStack>,
    /// Recorded destruction cause.
    pub destroyed_descriptor: Option<String>,
}

/// Read-only snapshot describing all traps within the world.
#[derive(Clone, Debug, Default)]
pub struct TrapView {
    snapshots: Vec<TrapSnapshot>,
}

impl TrapView {
    /// Creates a new trap view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TrapSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured trap snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &TrapSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot of a single trap.
    #[must_use]
    pub fn get(&self, trap: TrapId) -> Option<&TrapSnapshot> {
        self.snapshots
            .binary_search_by_key(&trap, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TrapSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single creature used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct CreatureSnapshot {
    /// Creature identifier.
    pub id: CreatureId,
    /// Player or animal.
    pub kind: CreatureKind,
    /// World position.
    pub position: Vec3,
    /// Velocity.
    pub velocity: Vec3,
    /// Whether a locomotion animation is active.
    pub moving: bool,
    /// Whether the creature is alive.
    pub alive: bool,
    /// Health, when the creature has a health capability.
    pub health: Option<f32>,
    /// Species property lowering the odds of a tag capture.
    pub trap_chance: f32,
    /// Trap the creature is mounted on.
    pub mounted_on: Option<TrapId>,
    /// Capture tag attached to the creature.
    pub capture_tag: Option<CaptureTag>,
    /// Accumulated tiredness.
    pub tiredness: f32,
    /// Sum of all walk speed modifiers.
    pub walk_speed_modifier: f32,
}

/// Read-only snapshot describing all creatures known to the world.
#[derive(Clone, Debug, Default)]
pub struct CreatureView {
    snapshots: Vec<CreatureSnapshot>,
}

impl CreatureView {
    /// Creates a new creature view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<CreatureSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the creature snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &CreatureSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up a single creature.
    #[must_use]
    pub fn get(&self, creature: CreatureId) -> Option<&CreatureSnapshot> {
        self.snapshots
            .binary_search_by_key(&creature, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Creatures within `radius` of `center`, in identifier order.
    pub fn within(&self, center: Vec3, radius: f32) -> impl Iterator<Item = &CreatureSnapshot> {
        let radius_squared = radius * radius;
        self.snapshots
            .iter()
            .filter(move |snapshot| snapshot.position.distance_squared(center) <= radius_squared)
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<CreatureSnapshot> {
        self.snapshots
    }
}
