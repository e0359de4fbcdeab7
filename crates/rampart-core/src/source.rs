//! The projectile-source capability set.
//!
//! Anything that fires a projectile (a [`Tower`](crate::tower::Tower), a
//! player-controlled unit, a scripted hazard) describes its shot with a plain
//! [`ProjectileSource`] value. The projectile copies it at spawn time, so later
//! changes to the firing entity never reach a projectile already in flight.

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Attribution for damage and per-source effect ownership.
///
/// `kind` is the stat-table key for towers (`"arrow"`, `"missile"`) or any
/// caller-chosen label for other attackers (`"hero"`). `id` is unique within
/// its kind.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SourceTag {
    /// Type key of the source
    pub kind: String,
    /// Instance id of the source
    pub id: u32,
}

impl SourceTag {
    /// Creates a new source tag.
    #[must_use]
    pub fn new(kind: impl Into<String>, id: u32) -> Self {
        Self {
            kind: kind.into(),
            id,
        }
    }
}

impl fmt::Display for SourceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.kind, self.id)
    }
}

/// Optional modifier fields carried by a shot.
///
/// Every field defaults to zero or to its neutral value when absent from a
/// stat table. Radii (`splash_radius`, `chain_range`) are in grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    /// Splash radius in cells; `> 0` selects splash delivery
    pub splash_radius: f32,
    /// Speed multiplier applied by a slow (e.g. 0.5 halves speed)
    pub slow_factor: f32,
    /// Slow duration in seconds
    pub slow_duration: f32,
    /// Number of sequential chain hops; `> 0` selects chain delivery
    pub chain_count: u32,
    /// Hop range in cells, shared by chain and fork-chain
    pub chain_range: f32,
    /// Damage multiplier per chain hop
    pub chain_decay: f32,
    /// Probability in `[0, 1]` of a critical hit
    pub crit_chance: f32,
    /// Damage multiplier on a critical hit
    pub crit_multiplier: f32,
    /// Burn damage per second
    pub burn_damage: f32,
    /// Burn duration in seconds
    pub burn_duration: f32,
    /// Maximum distinct fork-chain hits; `> 0` selects fork delivery
    pub fork_count: u32,
    /// Maximum fork-chain wave depth (wave 0 is the primary target)
    pub fork_depth: u32,
    /// Per-hit damage amplification of the fork-chain
    pub overcharge: f32,
    /// Probability in `[0, 1]` of shocking each fork-chain hit
    pub shock_chance: f32,
    /// Shock duration in seconds
    pub shock_duration: f32,
    /// Armor removed by a heavy splash
    pub armor_shred: f32,
    /// Armor-shred duration in seconds
    pub armor_shred_duration: f32,
    /// Damage per second of a scorch zone left by a heavy splash
    pub scorch_dps: f32,
    /// Scorch zone lifetime in seconds
    pub scorch_duration: f32,
    /// Path-progress displacement applied by a splash
    pub knockback: f32,
    /// Heavy ("missile") round flag
    pub missile: bool,
}

impl Default for Modifiers {
    fn default() -> Self {
        Self {
            splash_radius: 0.0,
            slow_factor: 0.0,
            slow_duration: 0.0,
            chain_count: 0,
            chain_range: 0.0,
            chain_decay: 1.0,
            crit_chance: 0.0,
            crit_multiplier: 1.0,
            burn_damage: 0.0,
            burn_duration: 0.0,
            fork_count: 0,
            fork_depth: 0,
            overcharge: 0.0,
            shock_chance: 0.0,
            shock_duration: 0.0,
            armor_shred: 0.0,
            armor_shred_duration: 0.0,
            scorch_dps: 0.0,
            scorch_duration: 0.0,
            knockback: 0.0,
            missile: false,
        }
    }
}

/// Everything a projectile needs from whoever fired it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectileSource {
    /// Muzzle position in pixels
    pub position: Vec2,
    /// Base damage per hit
    pub damage: f32,
    /// Projectile speed in pixels per second
    pub proj_speed: f32,
    /// Optional modifier payload
    pub modifiers: Modifiers,
    /// Damage attribution
    pub tag: SourceTag,
}

impl ProjectileSource {
    /// Creates a source with no modifiers.
    #[must_use]
    pub fn new(tag: SourceTag, position: Vec2, damage: f32, proj_speed: f32) -> Self {
        Self {
            position,
            damage,
            proj_speed,
            modifiers: Modifiers::default(),
            tag,
        }
    }

    /// Replaces the modifier payload.
    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}
