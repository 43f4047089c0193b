#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Snare traps.

mod capture;
mod creatures;
pub mod persistence;
mod poi;
mod tasks;
mod traps;

use std::time::Duration;

use snare_core::{
    BlockPos, CaptureStrategy, Command, CreatureId, DamageAccumulator, DurabilityTable, Event,
    ItemStack, PlacementError, ReleaseReason, TrapId, TrapState, BREAK_SOUND, SNAP_SOUND,
};

use crate::{
    creatures::{Creature, CreatureRegistry, DamageOutcome},
    persistence::{PersistedCapture, PersistedTrap},
    poi::PoiRegistry,
    tasks::{DeferredTask, MainThreadQueue},
    traps::{Trap, TrapRegistry, WEAR_DESCRIPTOR},
};

pub use poi::{FoodSource, Mountable, PointOfInterest, TrapHandle, PORTION_SIZE};

const DEFAULT_STRUGGLE_COOLDOWN: Duration = Duration::from_secs(1);
const DEFAULT_TAG_DAMAGE_SCALE: f32 = 10.0;
const DEFAULT_STAT_NAMESPACE: &str = "snare";
/// Fraction of the snap damage dealt to a captive on every struggle.
const STRUGGLE_DAMAGE_FRACTION: f32 = 0.1;
/// Wear the trap absorbs per snap and per struggle.
const WEAR_PER_HIT: f32 = 1.0;

/// Tunables applied to every trap in a world.
#[derive(Clone, Debug)]
pub struct WorldConfig {
    /// Material lookup for durability and snap damage.
    pub durability: DurabilityTable,
    /// How snapped traps hold their victims.
    pub strategy: CaptureStrategy,
    /// Minimum simulated time between two struggle-induced wear hits (mount strategy).
    pub struggle_cooldown: Duration,
    /// Multiplier on creature damage under the tag strategy.
    pub tag_damage_scale: f32,
    /// Namespace that scopes the walk speed modifier key.
    pub stat_namespace: String,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            durability: DurabilityTable::builtin(),
            strategy: CaptureStrategy::Mount,
            struggle_cooldown: DEFAULT_STRUGGLE_COOLDOWN,
            tag_damage_scale: DEFAULT_TAG_DAMAGE_SCALE,
            stat_namespace: DEFAULT_STAT_NAMESPACE.to_owned(),
        }
    }
}

impl WorldConfig {
    fn creature_damage_scale(&self) -> f32 {
        match self.strategy {
            CaptureStrategy::Mount => 1.0,
            CaptureStrategy::Tag => self.tag_damage_scale,
        }
    }
}

/// Represents the authoritative trap world state.
#[derive(Debug)]
pub struct World {
    config: WorldConfig,
    stat_key: String,
    traps: TrapRegistry,
    creatures: CreatureRegistry,
    pois: PoiRegistry,
    tasks: MainThreadQueue,
    clock: Duration,
}

impl World {
    /// Creates an empty world with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(WorldConfig::default())
    }

    /// Creates an empty world using the supplied configuration.
    #[must_use]
    pub fn with_config(config: WorldConfig) -> Self {
        let stat_key = format!("{}:trapped", config.stat_namespace);
        Self {
            config,
            stat_key,
            traps: TrapRegistry::default(),
            creatures: CreatureRegistry::default(),
            pois: PoiRegistry::default(),
            tasks: MainThreadQueue::default(),
            clock: Duration::ZERO,
        }
    }

    fn transition(&mut self, trap: TrapId, next: TrapState, out_events: &mut Vec<Event>) {
        let Some(record) = self.traps.get_mut(trap) else {
            return;
        };
        if record.state() == TrapState::Destroyed {
            return;
        }

        let reason = match next {
            TrapState::Closed => None,
            TrapState::Destroyed => Some(ReleaseReason::TrapDestroyed),
            TrapState::Open | TrapState::Baited => Some(ReleaseReason::TrapOpened),
        };
        if let Some(reason) = reason {
            capture::release(record, &mut self.creatures, reason, &self.stat_key, out_events);
        }

        if let Some(from) = record.set_state(next) {
            tracing::debug!(trap = %trap, %from, to = %next, "trap state changed");
            out_events.push(Event::TrapStateChanged {
                trap,
                from,
                to: next,
            });
            out_events.push(Event::MeshInvalidated { trap });
        }
    }

    fn wear(&mut self, trap: TrapId, out_events: &mut Vec<Event>) {
        let Some(record) = self.traps.get_mut(trap) else {
            return;
        };
        if record.state() == TrapState::Destroyed {
            return;
        }

        let reached_cap = record.wear.add(WEAR_PER_HIT);
        out_events.push(Event::TrapWorn {
            trap,
            damage: record.wear.damage(),
            max_durability: record.wear.max(),
        });
        out_events.push(Event::SoundRequested {
            asset: SNAP_SOUND,
            position: trap.center(),
        });

        if reached_cap || record.wear.is_at_cap() {
            self.destroy(trap, out_events);
        }
    }

    fn destroy(&mut self, trap: TrapId, out_events: &mut Vec<Event>) {
        let Some(record) = self.traps.get(trap) else {
            return;
        };
        if record.state() == TrapState::Destroyed {
            return;
        }
        let descriptor = record
            .last_captor
            .clone()
            .unwrap_or_else(|| WEAR_DESCRIPTOR.to_owned());

        self.transition(trap, TrapState::Destroyed, out_events);

        let Some(record) = self.traps.get_mut(trap) else {
            return;
        };
        record.record_destruction(descriptor);
        let descriptor = record
            .destroyed_descriptor()
            .unwrap_or(WEAR_DESCRIPTOR)
            .to_owned();
        tracing::info!(trap = %trap, %descriptor, "trap destroyed");
        out_events.push(Event::TrapDestroyed { trap, descriptor });
        out_events.push(Event::SoundRequested {
            asset: BREAK_SOUND,
            position: trap.center(),
        });
    }

    /// Deals damage to a creature on behalf of a trap, releasing it on death.
    fn hurt_creature(
        &mut self,
        trap: TrapId,
        creature: CreatureId,
        amount: f32,
        out_events: &mut Vec<Event>,
    ) {
        let Some(record) = self.traps.get(trap) else {
            return;
        };
        let cause = format!("trap-{}", record.material);
        let Some(victim) = self.creatures.get_mut(creature) else {
            return;
        };

        match victim.apply_damage(amount, &cause) {
            DamageOutcome::Ignored => {}
            DamageOutcome::Hurt(health) => out_events.push(Event::CreatureDamaged {
                creature,
                amount,
                health,
            }),
            DamageOutcome::Killed => {
                out_events.push(Event::CreatureDamaged {
                    creature,
                    amount,
                    health: 0.0,
                });
                out_events.push(Event::CreatureKilled {
                    creature,
                    cause: Some(cause),
                });
                self.release_everywhere(creature, ReleaseReason::Died, out_events);
            }
        }
    }

    /// Ends any capture involving `creature`, wherever it is held.
    fn release_everywhere(
        &mut self,
        creature: CreatureId,
        reason: ReleaseReason,
        out_events: &mut Vec<Event>,
    ) {
        let Some(victim) = self.creatures.get(creature) else {
            return;
        };
        let holders = [
            victim.mounted_on,
            victim.capture_tag.map(|tag| tag.trap()),
        ];

        for trap in holders.into_iter().flatten() {
            if let Some(record) = self.traps.get_mut(trap) {
                if record.captured == Some(creature) {
                    capture::release(record, &mut self.creatures, reason, &self.stat_key, out_events);
                }
            }
        }
    }

    /// Closes an armed trap on `creature`. Returns whether the jaws closed.
    fn snap_closed(
        &mut self,
        trap: TrapId,
        creature: CreatureId,
        out_events: &mut Vec<Event>,
    ) -> bool {
        let Some(record) = self.traps.get(trap) else {
            return false;
        };
        if !record.state().is_armed() {
            return false;
        }
        if !self.creatures.get(creature).is_some_and(|victim| victim.alive) {
            tracing::debug!(trap = %trap, creature = creature.get(), "snap target gone");
            return false;
        }
        let snap_damage = record.durability.snap_damage() * self.config.creature_damage_scale();

        self.transition(trap, TrapState::Closed, out_events);
        out_events.push(Event::TrapSnapped {
            trap,
            creature,
            strategy: self.config.strategy,
        });
        self.hurt_creature(trap, creature, snap_damage, out_events);

        if self.config.strategy == CaptureStrategy::Mount {
            if let (Some(record), Some(victim)) =
                (self.traps.get_mut(trap), self.creatures.get_mut(creature))
            {
                let _ = capture::attach(
                    record,
                    victim,
                    CaptureStrategy::Mount,
                    &self.stat_key,
                    out_events,
                );
            }
        }

        self.wear(trap, out_events);
        true
    }

    /// Closes an armed trap with nobody the world can hurt or hold.
    fn spring_empty(&mut self, trap: TrapId, out_events: &mut Vec<Event>) {
        tracing::debug!(trap = %trap, "trap sprung by an untracked toucher");
        self.transition(trap, TrapState::Closed, out_events);
        self.wear(trap, out_events);
    }

    fn struggle(&mut self, trap: TrapId, out_events: &mut Vec<Event>) {
        let Some(record) = self.traps.get(trap) else {
            return;
        };
        if record.state() != TrapState::Closed {
            return;
        }
        let Some(captive) = record.captured else {
            return;
        };
        if !self.creatures.get(captive).is_some_and(|victim| victim.alive) {
            return;
        }
        let damage = record.durability.snap_damage()
            * STRUGGLE_DAMAGE_FRACTION
            * self.config.creature_damage_scale();

        let wear_due = match self.config.strategy {
            CaptureStrategy::Tag => true,
            CaptureStrategy::Mount => record
                .last_struggle_wear_at
                .map_or(true, |last| {
                    self.clock.saturating_sub(last) >= self.config.struggle_cooldown
                }),
        };

        if let Some(victim) = self.creatures.get_mut(captive) {
            victim.add_struggle_tiredness();
        }
        self.hurt_creature(trap, captive, damage, out_events);

        if wear_due {
            if let Some(record) = self.traps.get_mut(trap) {
                record.last_struggle_wear_at = Some(self.clock);
            }
            self.wear(trap, out_events);
        }
    }

    fn interact(
        &mut self,
        trap: TrapId,
        player: CreatureId,
        careful: bool,
        held: Option<ItemStack>,
        out_events: &mut Vec<Event>,
    ) -> bool {
        let Some(record) = self.traps.get(trap) else {
            return false;
        };

        match record.state() {
            TrapState::Destroyed => true,
            TrapState::Closed if careful => {
                self.transition(trap, TrapState::Open, out_events);
                true
            }
            TrapState::Closed => false,
            TrapState::Open | TrapState::Baited if !careful => {
                if self.creatures.get(player).is_none() {
                    self.spring_empty(trap, out_events);
                    return true;
                }
                self.snap_closed(trap, player, out_events)
            }
            TrapState::Open => {
                let Some(bait) = held
                    .filter(|stack| stack.quantity > 0 && stack.is_food())
                    .map(|stack| stack.single_unit())
                else {
                    return false;
                };
                let Some(record) = self.traps.get_mut(trap) else {
                    return false;
                };
                if let Some(from) = record.arm(bait.clone()) {
                    out_events.push(Event::TrapStateChanged {
                        trap,
                        from,
                        to: TrapState::Baited,
                    });
                    out_events.push(Event::MeshInvalidated { trap });
                }
                out_events.push(Event::BaitPlaced {
                    trap,
                    player,
                    bait,
                });
                true
            }
            TrapState::Baited => {
                let bait = self.traps.get_mut(trap).and_then(Trap::take_bait);
                if let Some(bait) = bait {
                    out_events.push(Event::BaitReturned {
                        trap,
                        player,
                        bait,
                    });
                }
                self.transition(trap, TrapState::Open, out_events);
                true
            }
        }
    }

    fn place(&mut self, trap: Trap, out_events: &mut Vec<Event>) {
        let id = trap.id;
        let material = trap.material.clone();
        self.traps.insert(trap);
        out_events.push(Event::TrapPlaced { trap: id, material });
        if self.pois.add(id) {
            out_events.push(Event::PoiAdded { trap: id });
        }
    }

    fn check_placement(&self, position: BlockPos, material: &str) -> Result<Trap, PlacementError> {
        let id = TrapId::at(position);
        if self.traps.contains(id) {
            return Err(PlacementError::Occupied);
        }
        let durability = self
            .config
            .durability
            .lookup(material)
            .ok_or(PlacementError::UnknownMaterial)?;
        Ok(Trap::new(id, material.to_owned(), durability, 0.0))
    }

    fn restore(&mut self, mut trap: Trap, persisted: PersistedTrap, out_events: &mut Vec<Event>) {
        let id = trap.id;
        trap.rotation_y_deg = persisted.rotation_y_deg;
        trap.wear = DamageAccumulator::with_damage(trap.wear.max(), persisted.damage);
        trap.restore_descriptor(persisted.destroyed_descriptor);
        match persisted.state {
            TrapState::Baited => {
                let _ = trap.set_state(TrapState::Open);
                if let Some(bait) = persisted.bait {
                    let _ = trap.arm(bait);
                }
            }
            state => {
                let _ = trap.set_state(state);
            }
        }
        if trap.state() == TrapState::Destroyed {
            let descriptor = trap
                .last_captor
                .clone()
                .unwrap_or_else(|| WEAR_DESCRIPTOR.to_owned());
            trap.record_destruction(descriptor);
        }
        self.place(trap, out_events);

        if let Some(capture) = persisted.captured {
            self.reattach(id, capture, out_events);
        }
    }

    fn reattach(&mut self, trap: TrapId, capture: PersistedCapture, out_events: &mut Vec<Event>) {
        let creature = match &capture.player_uid {
            Some(uid) => self.creatures.player_by_uid(uid),
            None => Some(capture.entity).filter(|id| self.creatures.get(*id).is_some()),
        };
        let strategy = self.config.strategy;

        let attached = match (self.traps.get_mut(trap), creature) {
            (Some(record), Some(creature)) if record.state() == TrapState::Closed => self
                .creatures
                .get_mut(creature)
                .is_some_and(|victim| {
                    capture::attach(record, victim, strategy, &self.stat_key, out_events)
                }),
            _ => false,
        };

        if !attached {
            tracing::warn!(
                trap = %trap,
                entity = capture.entity.get(),
                "dropping persisted capture that could not be restored"
            );
        }
    }

    fn detach_trap(&mut self, trap: TrapId, reason: ReleaseReason, out_events: &mut Vec<Event>) -> bool {
        let Some(mut record) = self.traps.remove(trap) else {
            return false;
        };
        capture::release(&mut record, &mut self.creatures, reason, &self.stat_key, out_events);
        if self.pois.remove(trap) {
            out_events.push(Event::PoiRemoved { trap });
        }
        true
    }

    fn drain_deferred(&mut self, out_events: &mut Vec<Event>) {
        for task in self.tasks.take_batch() {
            match task {
                DeferredTask::Snap { trap, creature } => {
                    let baited = self
                        .traps
                        .get(trap)
                        .is_some_and(|record| record.state() == TrapState::Baited);
                    if !baited {
                        tracing::debug!(trap = %trap, "bait gone before queued snap ran");
                        continue;
                    }
                    let _ = self.snap_closed(trap, creature, out_events);
                }
            }
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            world.clock = world.clock.saturating_add(dt);
            world.drain_deferred(out_events);
            out_events.push(Event::TimeAdvanced { dt });
        }
        Command::PlaceTrap {
            position,
            material,
            rotation_y_deg,
        } => match world.check_placement(position, &material) {
            Ok(mut trap) => {
                trap.rotation_y_deg = rotation_y_deg;
                world.place(trap, out_events);
            }
            Err(reason) => out_events.push(Event::PlacementRejected { position, reason }),
        },
        Command::LoadTrap {
            position,
            material,
            tree,
        } => match world.check_placement(position, &material) {
            Ok(trap) => {
                let decoded = persistence::decode(&tree, trap.wear.max());
                for issue in &decoded.issues {
                    tracing::warn!(trap = %trap.id, %issue, "persisted trap attribute ignored");
                }
                world.restore(trap, decoded.trap, out_events);
            }
            Err(reason) => out_events.push(Event::PlacementRejected { position, reason }),
        },
        Command::RemoveTrap { trap } => {
            if world.detach_trap(trap, ReleaseReason::TrapRemoved, out_events) {
                out_events.push(Event::TrapRemoved { trap });
            }
        }
        Command::UnloadTrap { trap } => {
            if world.detach_trap(trap, ReleaseReason::TrapUnloaded, out_events) {
                out_events.push(Event::TrapUnloaded { trap });
            }
        }
        Command::SpawnCreature {
            id,
            kind,
            position,
            health,
            trap_chance,
        } => {
            world.release_everywhere(id, ReleaseReason::Despawned, out_events);
            world
                .creatures
                .insert(Creature::new(id, kind, position, health, trap_chance));
        }
        Command::UpdateCreature {
            id,
            position,
            velocity,
            moving,
        } => {
            if let Some(creature) = world.creatures.get_mut(id) {
                creature.moving = moving;
                if creature.mounted_on.is_none() {
                    creature.position = position;
                    creature.velocity = velocity;
                }
            }
        }
        Command::MarkCreatureDead { id } => {
            let Some(creature) = world.creatures.get_mut(id) else {
                return;
            };
            if !creature.alive {
                return;
            }
            creature.alive = false;
            out_events.push(Event::CreatureKilled {
                creature: id,
                cause: creature.death_cause.clone(),
            });
            world.release_everywhere(id, ReleaseReason::Died, out_events);
        }
        Command::DespawnCreature { id } => {
            world.release_everywhere(id, ReleaseReason::Despawned, out_events);
            let _ = world.creatures.remove(id);
        }
        Command::Interact {
            trap,
            player,
            careful,
            held,
        } => {
            let handled = world.interact(trap, player, careful, held, out_events);
            out_events.push(Event::InteractionResolved {
                trap,
                player,
                handled,
            });
        }
        Command::ConsumeBait { trap, creature } => {
            world.tasks.push(DeferredTask::Snap { trap, creature });
            out_events.push(Event::SnapQueued { trap, creature });
        }
        Command::MoveIntent { creature } => {
            if let Some(trap) = world.creatures.get(creature).and_then(|c| c.mounted_on) {
                world.struggle(trap, out_events);
            }
        }
        Command::Struggle { trap } => world.struggle(trap, out_events),
        Command::TagCreature { trap, creature } => {
            if let (Some(record), Some(victim)) =
                (world.traps.get_mut(trap), world.creatures.get_mut(creature))
            {
                if record.state() == TrapState::Closed {
                    let _ = capture::attach(
                        record,
                        victim,
                        CaptureStrategy::Tag,
                        &world.stat_key,
                        out_events,
                    );
                }
            }
        }
        Command::PullCreature { creature, velocity } => {
            if let Some(victim) = world.creatures.get_mut(creature) {
                if victim.alive && victim.capture_tag.is_some() {
                    victim.velocity = velocity;
                }
            }
        }
        Command::ReleaseCreature { trap, reason } => {
            if let Some(record) = world.traps.get_mut(trap) {
                capture::release(record, &mut world.creatures, reason, &world.stat_key, out_events);
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use glam::Vec3;
    use snare_core::{
        AttributeTree, CaptureStrategy, CreatureKind, CreatureView, TrapId, TrapView,
    };

    use super::{
        persistence::{self, PersistedCapture, PersistedTrap},
        PointOfInterest, TrapHandle, World, WorldConfig,
    };

    /// Configuration the world was built with.
    #[must_use]
    pub fn config(world: &World) -> &WorldConfig {
        &world.config
    }

    /// Capture strategy active in the world.
    #[must_use]
    pub fn strategy(world: &World) -> CaptureStrategy {
        world.config.strategy
    }

    /// Total simulated time elapsed.
    #[must_use]
    pub fn clock(world: &World) -> Duration {
        world.clock
    }

    /// Number of deferred tasks waiting for the next tick.
    #[must_use]
    pub fn pending_tasks(world: &World) -> usize {
        world.tasks.len()
    }

    /// Captures a read-only view of every trap.
    #[must_use]
    pub fn trap_view(world: &World) -> TrapView {
        TrapView::from_snapshots(world.traps.iter().map(|trap| trap.snapshot()).collect())
    }

    /// Captures a read-only view of every creature.
    #[must_use]
    pub fn creature_view(world: &World) -> CreatureView {
        CreatureView::from_snapshots(
            world
                .creatures
                .iter()
                .map(|creature| creature.snapshot())
                .collect(),
        )
    }

    /// Borrowed handle onto a single trap.
    #[must_use]
    pub fn trap(world: &World, trap: TrapId) -> Option<TrapHandle<'_>> {
        world.traps.get(trap).map(TrapHandle::new)
    }

    /// Registered points of interest within `radius` of `center`.
    #[must_use]
    pub fn points_of_interest(world: &World, center: Vec3, radius: f32) -> Vec<TrapHandle<'_>> {
        let radius_squared = radius * radius;
        world
            .pois
            .iter()
            .filter_map(|id| world.traps.get(id).map(TrapHandle::new))
            .filter(|handle| handle.position().distance_squared(center) <= radius_squared)
            .collect()
    }

    /// Whether the trap is advertised to creature AI.
    #[must_use]
    pub fn is_registered_poi(world: &World, trap: TrapId) -> bool {
        world.pois.iter().any(|id| id == trap)
    }

    /// Serialises a trap into the host's attribute tree.
    #[must_use]
    pub fn save_trap(world: &World, trap: TrapId) -> Option<AttributeTree> {
        let record = world.traps.get(trap)?;
        let captured = record.captured.map(|entity| PersistedCapture {
            entity,
            player_uid: world
                .creatures
                .get(entity)
                .and_then(|creature| match &creature.kind {
                    CreatureKind::Player { uid } => Some(uid.clone()),
                    CreatureKind::Animal { .. } => None,
                }),
        });

        Some(persistence::encode(&PersistedTrap {
            rotation_y_deg: record.rotation_y_deg,
            damage: record.wear.damage(),
            state: record.state(),
            captured,
            destroyed_descriptor: record.destroyed_descriptor().map(str::to_owned),
            bait: record.bait().cloned(),
        }))
    }
}
