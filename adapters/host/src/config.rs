//! TOML configuration for the host adapter.

use std::{collections::BTreeMap, fs, path::Path, time::Duration};

use anyhow::Context;
use serde::Deserialize;
use snare_core::{CaptureStrategy, DurabilitySpec, DurabilityTable};
use snare_system_mount_capture::Config as MountConfig;
use snare_system_tag_capture::Config as TagConfig;
use snare_world::WorldConfig;
use thiserror::Error;

/// Errors raised while reading a host configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document is not valid TOML or does not match the expected shape.
    #[error("failed to parse trap configuration")]
    Parse(#[from] toml::de::Error),
    /// An interval that drives a periodic pass was zero.
    #[error("`{field}` must be greater than zero")]
    ZeroInterval {
        /// Offending key.
        field: &'static str,
    },
    /// A material entry cannot produce a usable trap.
    #[error("material `{material}` is invalid: {reason}")]
    InvalidMaterial {
        /// Material key.
        material: String,
        /// What is wrong with it.
        reason: &'static str,
    },
    /// A tunable was negative or not a finite number.
    #[error("`{field}` must be a finite, non-negative number")]
    InvalidTunable {
        /// Offending key.
        field: &'static str,
    },
    /// The stat namespace was blank.
    #[error("`stat_namespace` must not be empty")]
    EmptyNamespace,
}

/// Durability override for a single material variant.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct MaterialConfig {
    /// Wear the trap absorbs before breaking.
    pub max_durability: u32,
    /// Damage dealt on snap.
    pub snap_damage: f32,
}

/// Settings read by the host adapter at startup.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HostConfig {
    /// Capture strategy for every trap in the world.
    pub strategy: CaptureStrategy,
    /// Interval of the host tick listener, in milliseconds.
    pub slow_tick_interval_ms: u64,
    /// Interval of the tag strategy's neighbourhood scan, in milliseconds.
    pub tag_scan_interval_ms: u64,
    /// Minimum time between struggle wear hits, in milliseconds.
    pub struggle_cooldown_ms: u64,
    /// Creature damage multiplier applied under the tag strategy.
    pub tag_damage_scale: f32,
    /// Radius scanned around each trap for tagged creatures.
    pub tag_search_radius: f32,
    /// Interpolation factor of the tag strategy's pull.
    pub tag_pull_factor: f32,
    /// Seed for the tag strategy's capture and struggle rolls.
    pub rng_seed: u64,
    /// Namespace of the walk speed modifier applied to mounted creatures.
    pub stat_namespace: String,
    /// Materials added to, or overriding, the built-in durability table.
    pub materials: BTreeMap<String, MaterialConfig>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            strategy: CaptureStrategy::Mount,
            slow_tick_interval_ms: 50,
            tag_scan_interval_ms: 500,
            struggle_cooldown_ms: 1_000,
            tag_damage_scale: 10.0,
            tag_search_radius: 5.0,
            tag_pull_factor: 0.1,
            rng_seed: 0x7e57_ab1e,
            stat_namespace: "snare".to_owned(),
            materials: BTreeMap::new(),
        }
    }
}

impl HostConfig {
    /// Parses and validates a configuration document.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates the configuration stored at `path`.
    pub fn from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read trap configuration at {}", path.display()))?;
        let config = Self::from_toml_str(&contents)
            .with_context(|| format!("invalid trap configuration in {}", path.display()))?;
        tracing::info!(
            path = %path.display(),
            strategy = ?config.strategy,
            materials = config.materials.len(),
            "loaded trap configuration"
        );
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("slow_tick_interval_ms", self.slow_tick_interval_ms),
            ("tag_scan_interval_ms", self.tag_scan_interval_ms),
        ] {
            if value == 0 {
                return Err(ConfigError::ZeroInterval { field });
            }
        }

        for (field, value) in [
            ("tag_damage_scale", self.tag_damage_scale),
            ("tag_search_radius", self.tag_search_radius),
            ("tag_pull_factor", self.tag_pull_factor),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidTunable { field });
            }
        }

        if self.stat_namespace.trim().is_empty() {
            return Err(ConfigError::EmptyNamespace);
        }

        for (material, entry) in &self.materials {
            let reason = if entry.max_durability == 0 {
                Some("max_durability must be greater than zero")
            } else if !entry.snap_damage.is_finite() || entry.snap_damage < 0.0 {
                Some("snap_damage must be a finite, non-negative number")
            } else {
                None
            };
            if let Some(reason) = reason {
                return Err(ConfigError::InvalidMaterial {
                    material: material.clone(),
                    reason,
                });
            }
        }
        Ok(())
    }

    /// Interval at which the host should call the tick listener.
    #[must_use]
    pub fn slow_tick_interval(&self) -> Duration {
        Duration::from_millis(self.slow_tick_interval_ms)
    }

    /// Built-in durability table with the configured materials layered on top.
    #[must_use]
    pub fn durability_table(&self) -> DurabilityTable {
        DurabilityTable::builtin().with_overrides(self.materials.iter().map(|(key, entry)| {
            (
                key.clone(),
                DurabilitySpec::new(entry.max_durability, entry.snap_damage),
            )
        }))
    }

    /// World tunables derived from this configuration.
    #[must_use]
    pub fn world_config(&self) -> WorldConfig {
        WorldConfig {
            durability: self.durability_table(),
            strategy: self.strategy,
            struggle_cooldown: Duration::from_millis(self.struggle_cooldown_ms),
            tag_damage_scale: self.tag_damage_scale,
            stat_namespace: self.stat_namespace.clone(),
        }
    }

    /// Configuration of the mount strategy's slow tick.
    #[must_use]
    pub fn mount_config(&self) -> MountConfig {
        MountConfig::new(self.slow_tick_interval())
    }

    /// Configuration of the tag strategy's scan.
    #[must_use]
    pub fn tag_config(&self) -> TagConfig {
        TagConfig::new(Duration::from_millis(self.tag_scan_interval_ms), self.rng_seed)
            .with_search_radius(self.tag_search_radius)
            .with_pull_factor(self.tag_pull_factor)
    }
}
