//! Static durability data keyed by trap material.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Durability parameters shared by every trap forged from one material.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DurabilitySpec {
    max_durability: u32,
    snap_damage: f32,
}

impl DurabilitySpec {
    /// Creates a new durability descriptor.
    #[must_use]
    pub const fn new(max_durability: u32, snap_damage: f32) -> Self {
        Self {
            max_durability,
            snap_damage,
        }
    }

    /// Amount of wear the trap absorbs before it breaks for good.
    #[must_use]
    pub const fn max_durability(&self) -> u32 {
        self.max_durability
    }

    /// Damage dealt to whatever the trap snaps shut on.
    #[must_use]
    pub const fn snap_damage(&self) -> f32 {
        self.snap_damage
    }
}

const BUILTIN_MATERIALS: [(&str, DurabilitySpec); 7] = [
    ("copper", DurabilitySpec::new(50, 7.0)),
    ("tinbronze", DurabilitySpec::new(75, 9.0)),
    ("bismuthbronze", DurabilitySpec::new(75, 9.0)),
    ("blackbronze", DurabilitySpec::new(100, 10.0)),
    ("iron", DurabilitySpec::new(150, 12.0)),
    ("meteoriciron", DurabilitySpec::new(175, 13.0)),
    ("steel", DurabilitySpec::new(250, 15.0)),
];

/// Immutable lookup from material variant to durability parameters.
///
/// The table is assembled once, before the world starts, and offers no way to
/// mutate entries afterwards. Adapters that want custom materials layer them on
/// top of [`DurabilityTable::builtin`] through [`DurabilityTable::with_overrides`].
#[derive(Clone, Debug, PartialEq)]
pub struct DurabilityTable {
    entries: BTreeMap<String, DurabilitySpec>,
}

impl DurabilityTable {
    /// Table containing the stock metal variants.
    #[must_use]
    pub fn builtin() -> Self {
        Self::from_entries(
            BUILTIN_MATERIALS
                .iter()
                .map(|(key, spec)| ((*key).to_owned(), *spec)),
        )
    }

    /// Builds a table from explicit entries. Later duplicates win.
    #[must_use]
    pub fn from_entries(entries: impl IntoIterator<Item = (String, DurabilitySpec)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Consumes the table, returning a new one with `overrides` layered on top.
    #[must_use]
    pub fn with_overrides(
        self,
        overrides: impl IntoIterator<Item = (String, DurabilitySpec)>,
    ) -> Self {
        let mut entries = self.entries;
        entries.extend(overrides);
        Self { entries }
    }

    /// Looks up the parameters registered for `material`.
    #[must_use]
    pub fn lookup(&self, material: &str) -> Option<DurabilitySpec> {
        self.entries.get(material).copied()
    }

    /// Iterator over registered material keys in sorted order.
    pub fn materials(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl Default for DurabilityTable {
    fn default() -> Self {
        Self::builtin()
    }
}
