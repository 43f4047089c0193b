#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Tag-based capture system.
//!
//! Creatures caught by a tag-strategy trap keep their own physics. Instead of
//! pinning them, this system rolls whether a snap leaves a capture tag on the
//! victim, then periodically scans the neighbourhood of every trap: tagged
//! captives that died are released, moving ones may struggle, and all of them
//! are pulled back towards the jaws.

use std::time::Duration;

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use snare_core::{
    CaptureStrategy, Command, CreatureId, CreatureView, Event, PassTimer, ReleaseReason, TrapId,
    TrapView,
};

const DEFAULT_SEARCH_RADIUS: f32 = 5.0;
const DEFAULT_PULL_FACTOR: f32 = 0.1;
const DEFAULT_PULL_FALLOFF: f32 = 0.2;
const DEFAULT_STRUGGLE_CHANCE: f64 = 0.5;
/// Subtracted from the species escape chance before rolling a capture.
const CAPTURE_MARGIN: f64 = 0.05;

/// Configuration parameters required to construct the tag capture system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    scan_interval: Duration,
    rng_seed: u64,
    search_radius: f32,
    pull_factor: f32,
    pull_falloff: f32,
    struggle_chance: f64,
}

impl Config {
    /// Creates a configuration with the default scan radius and pull.
    #[must_use]
    pub const fn new(scan_interval: Duration, rng_seed: u64) -> Self {
        Self {
            scan_interval,
            rng_seed,
            search_radius: DEFAULT_SEARCH_RADIUS,
            pull_factor: DEFAULT_PULL_FACTOR,
            pull_falloff: DEFAULT_PULL_FALLOFF,
            struggle_chance: DEFAULT_STRUGGLE_CHANCE,
        }
    }

    /// Overrides the radius searched around each trap for tagged creatures.
    #[must_use]
    pub fn with_search_radius(mut self, search_radius: f32) -> Self {
        self.search_radius = search_radius;
        self
    }

    /// Overrides the interpolation factor used when pulling captives.
    #[must_use]
    pub fn with_pull_factor(mut self, pull_factor: f32) -> Self {
        self.pull_factor = pull_factor;
        self
    }

    /// Overrides the per-pass probability that a moving captive struggles.
    #[must_use]
    pub fn with_struggle_chance(mut self, struggle_chance: f64) -> Self {
        self.struggle_chance = struggle_chance;
        self
    }
}

/// Probability that a snap tags a creature whose species has `trap_chance`.
///
/// Non-finite inputs never capture.
#[must_use]
pub fn capture_probability(trap_chance: f32) -> f64 {
    let probability = 1.0 - f64::from(trap_chance) - CAPTURE_MARGIN;
    if probability.is_finite() {
        probability.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Velocity of a captive after one pull towards `anchor`.
///
/// The attraction weakens linearly with distance (`falloff` per unit) and is
/// blended into the current velocity by `factor`, so repeated passes settle the
/// captive instead of teleporting it.
#[must_use]
pub fn pull_velocity(velocity: Vec3, position: Vec3, anchor: Vec3, falloff: f32, factor: f32) -> Vec3 {
    let offset = anchor - position;
    let strength = (1.0 - offset.length() * falloff).max(0.0);
    velocity.lerp(offset.normalize_or_zero() * strength, factor)
}

/// Pure system that rolls tag captures and drives tagged captives.
#[derive(Debug)]
pub struct TagCapture {
    config: Config,
    timer: PassTimer,
    rng: ChaCha8Rng,
}

impl TagCapture {
    /// Creates a new tag capture system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            timer: PassTimer::new(config.scan_interval),
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Consumes events and immutable views to emit tag, struggle, pull and
    /// release commands.
    pub fn handle(
        &mut self,
        events: &[Event],
        traps: &TrapView,
        creatures: &CreatureView,
        out: &mut Vec<Command>,
    ) {
        let mut passes = 0;
        for event in events {
            match event {
                Event::TrapSnapped {
                    trap,
                    creature,
                    strategy: CaptureStrategy::Tag,
                } => self.roll_capture(*trap, *creature, creatures, out),
                Event::TimeAdvanced { dt } => passes += self.timer.advance(*dt),
                _ => {}
            }
        }

        if passes > 0 {
            self.scan(traps, creatures, out);
        }
    }

    fn roll_capture(
        &mut self,
        trap: TrapId,
        creature: CreatureId,
        creatures: &CreatureView,
        out: &mut Vec<Command>,
    ) {
        let Some(victim) = creatures.get(creature) else {
            return;
        };
        if !victim.alive || victim.capture_tag.is_some() {
            return;
        }
        if self.rng.gen_bool(capture_probability(victim.trap_chance)) {
            out.push(Command::TagCreature { trap, creature });
        }
    }

    fn scan(&mut self, traps: &TrapView, creatures: &CreatureView, out: &mut Vec<Command>) {
        for trap in traps.iter() {
            let anchor = trap.id.center();
            let captives = creatures
                .within(anchor, self.config.search_radius)
                .filter(|creature| creature.capture_tag.is_some_and(|tag| tag.trap() == trap.id));

            for captive in captives {
                if !captive.alive {
                    out.push(Command::ReleaseCreature {
                        trap: trap.id,
                        reason: ReleaseReason::Died,
                    });
                    continue;
                }

                if captive.moving && self.rng.gen::<f64>() < self.config.struggle_chance {
                    out.push(Command::Struggle { trap: trap.id });
                }
                out.push(Command::PullCreature {
                    creature: captive.id,
                    velocity: pull_velocity(
                        captive.velocity,
                        captive.position,
                        anchor,
                        self.config.pull_falloff,
                        self.config.pull_factor,
                    ),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_probability_is_clamped() {
        assert!((capture_probability(0.9) - 0.05).abs() < 1.0e-6);
        assert!((capture_probability(0.5) - 0.45).abs() < 1.0e-6);
        assert_eq!(capture_probability(1.5), 0.0);
        assert_eq!(capture_probability(-3.0), 1.0);
        assert_eq!(capture_probability(f32::NAN), 0.0);
    }

    #[test]
    fn pull_fades_out_at_the_search_radius() {
        let velocity = Vec3::new(0.0, 0.0, 2.0);
        let pulled = pull_velocity(velocity, Vec3::new(5.0, 0.0, 0.0), Vec3::ZERO, 0.2, 0.1);
        assert!((pulled - velocity * 0.9).length() < 1.0e-5);
    }

    #[test]
    fn pull_blends_towards_anchor() {
        let pulled = pull_velocity(Vec3::ZERO, Vec3::new(2.5, 0.0, 0.0), Vec3::ZERO, 0.2, 0.1);
        assert!((pulled - Vec3::new(-0.05, 0.0, 0.0)).length() < 1.0e-5);
    }

    #[test]
    fn pull_at_anchor_only_damps() {
        let pulled = pull_velocity(Vec3::X, Vec3::ONE, Vec3::ONE, 0.2, 0.1);
        assert!((pulled - Vec3::X * 0.9).length() < 1.0e-5);
    }
}
