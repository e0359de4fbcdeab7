//! Combat configuration and the tower stat table.
//!
//! Both are loaded once and validated up front. The per-tick code assumes a
//! validated table and never re-checks it.
//!
//! # Example
//!
//! ```
//! use rampart_core::config::StatTable;
//!
//! let table = StatTable::from_json_str(r#"{
//!     "arrow": {
//!         "cost": 50,
//!         "levels": [
//!             { "damage": 10, "range": 3, "fire_rate": 0.8, "proj_speed": 400, "upgrade_cost": 0 }
//!         ]
//!     }
//! }"#).unwrap();
//!
//! assert_eq!(table.get("arrow").unwrap().cost, 50);
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::source::Modifiers;

/// Built-in stat table shipped with the crate.
const BUILTIN_TOWERS: &str = include_str!("../data/towers.json");

// =============================================================================
// Combat Config
// =============================================================================

/// Heavy-round splash scaling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeavyConfig {
    /// Splash radius multiplier for heavy rounds
    pub radius_multiplier: f32,
    /// Additional radius multiplier when a heavy round crits
    pub crit_radius_multiplier: f32,
    /// Splash damage multiplier for heavy rounds
    pub damage_multiplier: f32,
}

impl Default for HeavyConfig {
    fn default() -> Self {
        Self {
            radius_multiplier: 1.5,
            crit_radius_multiplier: 1.25,
            damage_multiplier: 1.0,
        }
    }
}

/// Global combat settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Size of one grid cell in pixels
    pub cell_size: f32,
    /// Fraction of `total_invested` refunded on sale, in whole thousandths
    pub sell_refund: f32,
    /// Heavy-round scaling
    pub heavy: HeavyConfig,
    /// Cosmetic muzzle-flash duration in seconds
    pub muzzle_flash: f32,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            cell_size: 40.0,
            sell_refund: 0.7,
            heavy: HeavyConfig::default(),
            muzzle_flash: 0.1,
        }
    }
}

impl CombatConfig {
    /// Parses and validates a combat config from JSON. Missing fields take
    /// their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] on malformed JSON or out-of-range settings.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// The sell refund as an exact integer fraction of 1000.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn refund_per_mille(&self) -> u32 {
        (f64::from(self.sell_refund) * 1000.0).round().clamp(0.0, 1000.0) as u32
    }

    /// Checks that every setting is in range.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidSetting`] for the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let bad = |field, value, reason| ConfigError::InvalidSetting {
            field,
            value,
            reason,
        };
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(bad("cell_size", self.cell_size, "must be positive"));
        }
        if !(0.0..1.0).contains(&self.sell_refund) {
            return Err(bad("sell_refund", self.sell_refund, "must be in [0, 1)"));
        }
        let scaled = f64::from(self.sell_refund) * 1000.0;
        if (scaled - scaled.round()).abs() > 1e-4 {
            return Err(bad(
                "sell_refund",
                self.sell_refund,
                "must be a whole number of thousandths",
            ));
        }
        if !(self.heavy.radius_multiplier.is_finite() && self.heavy.radius_multiplier > 0.0) {
            return Err(bad(
                "heavy.radius_multiplier",
                self.heavy.radius_multiplier,
                "must be positive",
            ));
        }
        if !(self.heavy.crit_radius_multiplier.is_finite()
            && self.heavy.crit_radius_multiplier > 0.0)
        {
            return Err(bad(
                "heavy.crit_radius_multiplier",
                self.heavy.crit_radius_multiplier,
                "must be positive",
            ));
        }
        if !(self.heavy.damage_multiplier.is_finite() && self.heavy.damage_multiplier >= 0.0) {
            return Err(bad(
                "heavy.damage_multiplier",
                self.heavy.damage_multiplier,
                "must be non-negative",
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Stat Table
// =============================================================================

/// Stats for one level of a tower type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelStats {
    /// Damage per hit
    pub damage: f32,
    /// Targeting range in cells
    pub range: f32,
    /// Seconds between shots
    pub fire_rate: f32,
    /// Projectile speed in pixels per second
    pub proj_speed: f32,
    /// Gold paid to reach this level (ignored for level 0)
    #[serde(default)]
    pub upgrade_cost: u32,
    /// Optional modifiers, flattened into the level entry
    #[serde(flatten)]
    pub modifiers: Modifiers,
}

/// A tower type: base cost plus its level table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TowerSpec {
    /// Placement cost
    pub cost: u32,
    /// Level table, index 0 is the placed tower
    pub levels: Vec<LevelStats>,
}

impl TowerSpec {
    /// Number of levels in the table.
    #[must_use]
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Stats for `level`, if it exists.
    #[must_use]
    pub fn level(&self, level: usize) -> Option<&LevelStats> {
        self.levels.get(level)
    }

    fn validate(&self, kind: &str) -> Result<(), ConfigError> {
        if self.levels.is_empty() {
            return Err(ConfigError::NoLevels {
                kind: kind.to_string(),
            });
        }
        if self.cost == 0 {
            return Err(ConfigError::ZeroCost {
                kind: kind.to_string(),
            });
        }
        for (level, stats) in self.levels.iter().enumerate() {
            validate_level(kind, level, stats)?;
        }
        Ok(())
    }
}

fn validate_level(kind: &str, level: usize, stats: &LevelStats) -> Result<(), ConfigError> {
    let check = |field: &'static str, value: f32, ok: bool, reason: &'static str| {
        if value.is_finite() && ok {
            Ok(())
        } else {
            Err(ConfigError::InvalidStat {
                kind: kind.to_string(),
                level,
                field,
                value,
                reason,
            })
        }
    };
    let m = &stats.modifiers;

    check("damage", stats.damage, stats.damage >= 0.0, "must be non-negative")?;
    check("range", stats.range, stats.range > 0.0, "must be positive")?;
    check("fire_rate", stats.fire_rate, stats.fire_rate > 0.0, "must be positive")?;
    check(
        "proj_speed",
        stats.proj_speed,
        stats.proj_speed > 0.0,
        "must be positive",
    )?;
    check(
        "crit_chance",
        m.crit_chance,
        (0.0..=1.0).contains(&m.crit_chance),
        "must be in [0, 1]",
    )?;
    check(
        "shock_chance",
        m.shock_chance,
        (0.0..=1.0).contains(&m.shock_chance),
        "must be in [0, 1]",
    )?;
    check(
        "crit_multiplier",
        m.crit_multiplier,
        m.crit_multiplier >= 1.0,
        "must be at least 1",
    )?;
    check(
        "chain_decay",
        m.chain_decay,
        m.chain_decay >= 0.0,
        "must be non-negative",
    )?;

    for (field, value) in [
        ("splash_radius", m.splash_radius),
        ("slow_factor", m.slow_factor),
        ("slow_duration", m.slow_duration),
        ("chain_range", m.chain_range),
        ("burn_damage", m.burn_damage),
        ("burn_duration", m.burn_duration),
        ("overcharge", m.overcharge),
        ("shock_duration", m.shock_duration),
        ("armor_shred", m.armor_shred),
        ("armor_shred_duration", m.armor_shred_duration),
        ("scorch_dps", m.scorch_dps),
        ("scorch_duration", m.scorch_duration),
        ("knockback", m.knockback),
    ] {
        check(field, value, value >= 0.0, "must be non-negative")?;
    }

    if m.chain_count > 0 || m.fork_count > 0 {
        check(
            "chain_range",
            m.chain_range,
            m.chain_range > 0.0,
            "must be positive for chain and fork towers",
        )?;
    }
    Ok(())
}

/// Tower type key to [`TowerSpec`] lookup.
///
/// Specs are shared (`Arc`) so each placed tower can hold its own handle and
/// recompute stats without going back through the table.
#[derive(Debug, Clone, Default)]
pub struct StatTable {
    specs: BTreeMap<String, Arc<TowerSpec>>,
}

impl StatTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses and validates a table from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] on malformed JSON or the first invalid entry.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let raw: BTreeMap<String, TowerSpec> = serde_json::from_str(json)?;
        let mut table = Self::new();
        for (kind, spec) in raw {
            table.insert(kind, spec)?;
        }
        Ok(table)
    }

    /// The default table embedded in the crate.
    ///
    /// # Errors
    ///
    /// Only fails if the embedded data is broken, which the test suite guards.
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::from_json_str(BUILTIN_TOWERS)
    }

    /// Validates and inserts a tower type, replacing any previous entry.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `spec` is invalid; the table is unchanged.
    pub fn insert(&mut self, kind: impl Into<String>, spec: TowerSpec) -> Result<(), ConfigError> {
        let kind = kind.into();
        spec.validate(&kind)?;
        self.specs.insert(kind, Arc::new(spec));
        Ok(())
    }

    /// Looks up a tower type.
    #[must_use]
    pub fn get(&self, kind: &str) -> Option<&Arc<TowerSpec>> {
        self.specs.get(kind)
    }

    /// Tower type keys in sorted order.
    pub fn kinds(&self) -> impl Iterator<Item = &str> + '_ {
        self.specs.keys().map(String::as_str)
    }

    /// Number of tower types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Returns true if the table has no tower types.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}
