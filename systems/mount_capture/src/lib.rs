#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Slow-tick system that supervises creatures mounted in closed traps.
//!
//! The world pins a mounted creature to its trap. This system watches those
//! captives on a fixed cadence and asks the world to release the dead and the
//! vanished, and to let the living struggle whenever they try to walk away.

use std::time::Duration;

use snare_core::{
    Command, CreatureView, Event, PassTimer, ReleaseReason, TrapState, TrapView,
};

/// Configuration parameters required to construct the mount capture system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    slow_tick_interval: Duration,
}

impl Config {
    /// Creates a configuration that inspects captives once per `slow_tick_interval`.
    #[must_use]
    pub const fn new(slow_tick_interval: Duration) -> Self {
        Self { slow_tick_interval }
    }
}

/// Pure system that emits struggle and release commands for mounted captives.
#[derive(Debug)]
pub struct MountCapture {
    timer: PassTimer,
}

impl MountCapture {
    /// Creates a new mount capture system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            timer: PassTimer::new(config.slow_tick_interval),
        }
    }

    /// Consumes events and immutable views to emit capture upkeep commands.
    pub fn handle(
        &mut self,
        events: &[Event],
        traps: &TrapView,
        creatures: &CreatureView,
        out: &mut Vec<Command>,
    ) {
        let mut passes = 0;
        for event in events {
            if let Event::TimeAdvanced { dt } = event {
                passes += self.timer.advance(*dt);
            }
        }

        // Several elapsed intervals collapse into one pass; the world's
        // struggle cooldown bounds wear independently of the cadence.
        if passes == 0 {
            return;
        }

        for trap in traps.iter() {
            if trap.state != TrapState::Closed {
                continue;
            }
            let Some(captive) = trap.captured else {
                continue;
            };

            match creatures.get(captive) {
                None => out.push(Command::ReleaseCreature {
                    trap: trap.id,
                    reason: ReleaseReason::Despawned,
                }),
                Some(creature) if !creature.alive => out.push(Command::ReleaseCreature {
                    trap: trap.id,
                    reason: ReleaseReason::Died,
                }),
                Some(creature) if creature.moving && creature.mounted_on == Some(trap.id) => {
                    out.push(Command::Struggle { trap: trap.id });
                }
                Some(_) => {}
            }
        }
    }
}
