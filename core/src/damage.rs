//! Saturating wear counter used by every trap.

use serde::{Deserialize, Serialize};

/// Distance from the cap inside which accumulated wear counts as "at cap".
///
/// Wear may accrue in fractional steps, so exact equality is never used.
pub const CAP_TOLERANCE: f32 = 1.0e-3;

/// Bounded wear counter: `0 <= damage <= max` at all times.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DamageAccumulator {
    damage: f32,
    max: f32,
}

impl DamageAccumulator {
    /// Creates an accumulator with no wear.
    #[must_use]
    pub fn new(max: f32) -> Self {
        Self::with_damage(max, 0.0)
    }

    /// Creates an accumulator seeded with previously recorded wear.
    ///
    /// Out-of-range and non-finite values are clamped into `0..=max`.
    #[must_use]
    pub fn with_damage(max: f32, damage: f32) -> Self {
        let max = sanitize(max);
        Self {
            damage: sanitize(damage).min(max),
            max,
        }
    }

    /// Adds wear, clamping at the cap.
    ///
    /// Returns `true` only for the call that brings the counter to its cap.
    pub fn add(&mut self, amount: f32) -> bool {
        let was_at_cap = self.is_at_cap();
        self.damage = (self.damage + sanitize(amount)).min(self.max);
        !was_at_cap && self.is_at_cap()
    }

    /// Forces the counter to its cap.
    pub fn saturate(&mut self) {
        self.damage = self.max;
    }

    /// Reports whether the counter reached its cap within [`CAP_TOLERANCE`].
    #[must_use]
    pub fn is_at_cap(&self) -> bool {
        self.damage >= self.max - CAP_TOLERANCE
    }

    /// Current wear.
    #[must_use]
    pub const fn damage(&self) -> f32 {
        self.damage
    }

    /// Wear at which the owner breaks.
    #[must_use]
    pub const fn max(&self) -> f32 {
        self.max
    }

    /// Wear left before the cap, never negative.
    #[must_use]
    pub fn remaining(&self) -> f32 {
        (self.max - self.damage).max(0.0)
    }
}

fn sanitize(value: f32) -> f32 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}
