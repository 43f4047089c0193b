#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Host adapter that plugs Snare traps into a world engine.
//!
//! The engine owns the clock, the block and entity registries and every
//! presentation concern. [`TrapHost`] turns its callbacks into world commands,
//! runs the capture system selected by the configuration, and forwards the
//! resulting side effects through [`HostEffects`].

mod config;
mod effects;

use std::time::Duration;

use snare_core::{
    AttributeTree, BlockPos, CaptureStrategy, Command, CreatureId, Event, ItemStack,
    PlacementError, TrapId,
};
use snare_system_mount_capture::MountCapture;
use snare_system_tag_capture::TagCapture;
use snare_world::{self as world, query, World};

pub use config::{ConfigError, HostConfig, MaterialConfig};
pub use effects::{dispatch, HostEffects};

/// Upper bound on system/world feedback rounds per host callback.
const MAX_PUMP_ROUNDS: usize = 8;

#[derive(Debug)]
enum CaptureSystem {
    Mount(MountCapture),
    Tag(TagCapture),
}

impl CaptureSystem {
    fn handle(&mut self, events: &[Event], world: &World, out: &mut Vec<Command>) {
        let traps = query::trap_view(world);
        let creatures = query::creature_view(world);
        match self {
            Self::Mount(system) => system.handle(events, &traps, &creatures, out),
            Self::Tag(system) => system.handle(events, &traps, &creatures, out),
        }
    }
}

/// Drives the trap world from host callbacks.
#[derive(Debug)]
pub struct TrapHost<E> {
    world: World,
    system: CaptureSystem,
    tick_interval: Duration,
    effects: E,
}

impl<E: HostEffects> TrapHost<E> {
    /// Builds the world and capture system described by `config`.
    pub fn new(config: &HostConfig, effects: E) -> Self {
        let system = match config.strategy {
            CaptureStrategy::Mount => CaptureSystem::Mount(MountCapture::new(config.mount_config())),
            CaptureStrategy::Tag => CaptureSystem::Tag(TagCapture::new(config.tag_config())),
        };
        tracing::debug!(
            strategy = ?config.strategy,
            interval_ms = config.slow_tick_interval_ms,
            "trap host ready"
        );
        Self {
            world: World::with_config(config.world_config()),
            system,
            tick_interval: config.slow_tick_interval(),
            effects,
        }
    }

    /// Interval at which the host should register the tick listener.
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    /// Read-only access to the world for queries.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Side-effect sink supplied at construction.
    #[must_use]
    pub fn effects(&self) -> &E {
        &self.effects
    }

    /// Tick listener callback. Tolerates irregular `dt`.
    pub fn on_tick(&mut self, dt: Duration) -> Vec<Event> {
        self.submit(Command::Tick { dt })
    }

    /// Applies a single command and lets the capture system react to it.
    pub fn submit(&mut self, command: Command) -> Vec<Event> {
        self.submit_all(vec![command])
    }

    /// Applies a batch of commands, for example the ones produced by
    /// [`snare_world::FoodSource::consume_one_portion`] during an AI pass.
    pub fn submit_all(&mut self, commands: Vec<Command>) -> Vec<Event> {
        let mut pending = commands;
        let mut emitted = Vec::new();

        for _ in 0..MAX_PUMP_ROUNDS {
            if pending.is_empty() {
                break;
            }
            let mut events = Vec::new();
            for command in pending.drain(..) {
                world::apply(&mut self.world, command, &mut events);
            }
            dispatch(&events, &mut self.effects);
            self.system.handle(&events, &self.world, &mut pending);
            emitted.append(&mut events);
        }

        if !pending.is_empty() {
            tracing::warn!(
                dropped = pending.len(),
                "capture system kept producing commands; dropping the remainder"
            );
        }
        emitted
    }

    /// Player interaction callback. Returns whether the host should treat the
    /// interaction as handled.
    pub fn interact(
        &mut self,
        trap: TrapId,
        player: CreatureId,
        careful: bool,
        held: Option<ItemStack>,
    ) -> bool {
        let events = self.submit(Command::Interact {
            trap,
            player,
            careful,
            held,
        });
        events.iter().any(|event| {
            matches!(
                event,
                Event::InteractionResolved { trap: resolved, handled: true, .. } if *resolved == trap
            )
        })
    }

    /// Block placement callback.
    pub fn place(
        &mut self,
        position: BlockPos,
        material: &str,
        rotation_y_deg: f32,
    ) -> Result<TrapId, PlacementError> {
        let events = self.submit(Command::PlaceTrap {
            position,
            material: material.to_owned(),
            rotation_y_deg,
        });
        placement_result(&events, position)
    }

    /// Block load callback: recreates a trap from its persisted attributes.
    pub fn load(
        &mut self,
        position: BlockPos,
        material: &str,
        tree: AttributeTree,
    ) -> Result<TrapId, PlacementError> {
        let events = self.submit(Command::LoadTrap {
            position,
            material: material.to_owned(),
            tree,
        });
        placement_result(&events, position)
    }

    /// Block save callback.
    #[must_use]
    pub fn save(&self, trap: TrapId) -> Option<AttributeTree> {
        query::save_trap(&self.world, trap)
    }

    /// Block removal callback.
    pub fn remove(&mut self, trap: TrapId) -> Vec<Event> {
        self.submit(Command::RemoveTrap { trap })
    }

    /// Chunk unload callback.
    pub fn unload(&mut self, trap: TrapId) -> Vec<Event> {
        self.submit(Command::UnloadTrap { trap })
    }
}

fn placement_result(events: &[Event], position: BlockPos) -> Result<TrapId, PlacementError> {
    let id = TrapId::at(position);
    for event in events {
        match event {
            Event::PlacementRejected {
                position: rejected,
                reason,
            } if *rejected == position => return Err(*reason),
            Event::TrapPlaced { trap, .. } if *trap == id => return Ok(id),
            _ => {}
        }
    }
    Err(PlacementError::Occupied)
}
