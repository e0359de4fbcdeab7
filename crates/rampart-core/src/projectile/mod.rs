//! Homing projectiles.
//!
//! A [`Projectile`] is single-use. It homes toward its target's last known
//! position, refreshing that position while the target lives, and on arrival
//! resolves exactly one impact through [`delivery`](crate::delivery). A target
//! that dies mid-flight does not cancel the shot: the projectile finishes at
//! the last known point and area effects still land there.
//!
//! The [`ProjectileManager`] owns the live set and the scorch zones heavy
//! rounds leave behind.

mod manager;
mod zone;

pub use manager::ProjectileManager;
pub use zone::ScorchZone;

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::delivery::{self, DeliveryReport, Impact, ImpactContext};
use crate::enemy::{living, EnemyId, EnemySnapshot};
use crate::source::{Modifiers, ProjectileSource, SourceTag};

/// Unique identifier for a projectile.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProjectileId(u64);

impl ProjectileId {
    /// Creates a new `ProjectileId` from a raw value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for ProjectileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ProjectileId({})", self.0)
    }
}

impl fmt::Display for ProjectileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A projectile in flight.
///
/// The payload (damage, modifiers, attribution) is copied from the source at
/// spawn, so later changes to the firing tower never reach it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    id: ProjectileId,
    position: Vec2,
    target: EnemyId,
    last_known: Vec2,
    speed: f32,
    damage: f32,
    modifiers: Modifiers,
    tag: SourceTag,
    heavy: bool,
    angle: f32,
    spent: bool,
}

impl Projectile {
    /// Creates a projectile at the source's position aimed at `target`.
    #[must_use]
    pub fn new(
        id: ProjectileId,
        source: &ProjectileSource,
        target: &EnemySnapshot,
        heavy: bool,
    ) -> Self {
        let aim = target.position - source.position;
        Self {
            id,
            position: source.position,
            target: target.id,
            last_known: target.position,
            speed: source.proj_speed,
            damage: source.damage,
            modifiers: source.modifiers,
            tag: source.tag.clone(),
            heavy,
            angle: aim.y.atan2(aim.x),
            spent: false,
        }
    }

    /// Identifier.
    #[must_use]
    pub const fn id(&self) -> ProjectileId {
        self.id
    }

    /// Current position in pixels.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Enemy the projectile was fired at.
    #[must_use]
    pub const fn target(&self) -> EnemyId {
        self.target
    }

    /// Cached target position used for homing.
    #[must_use]
    pub const fn last_known(&self) -> Vec2 {
        self.last_known
    }

    /// Damage before crits and falloff.
    #[must_use]
    pub const fn damage(&self) -> f32 {
        self.damage
    }

    /// Modifier payload copied at spawn.
    #[must_use]
    pub const fn modifiers(&self) -> &Modifiers {
        &self.modifiers
    }

    /// Damage attribution.
    #[must_use]
    pub const fn tag(&self) -> &SourceTag {
        &self.tag
    }

    /// Heavy round flag.
    #[must_use]
    pub const fn is_heavy(&self) -> bool {
        self.heavy
    }

    /// Facing angle in radians.
    #[must_use]
    pub const fn angle(&self) -> f32 {
        self.angle
    }

    /// True once the impact has resolved.
    #[must_use]
    pub const fn is_spent(&self) -> bool {
        self.spent
    }

    /// Advances the projectile by `dt` seconds.
    ///
    /// Returns the delivery report on the tick the projectile arrives. A
    /// spent projectile never moves or resolves again.
    pub fn update(&mut self, dt: f32, ctx: &mut ImpactContext<'_>) -> Option<DeliveryReport> {
        if self.spent {
            return None;
        }
        if let Some(target) = living(&*ctx.enemies, self.target) {
            self.last_known = target.position;
        }

        let to_target = self.last_known - self.position;
        let distance = to_target.length();
        let step = self.speed * dt;

        if distance <= step {
            self.position = self.last_known;
            self.spent = true;
            return Some(delivery::resolve(&self.impact(), ctx));
        }

        self.position += to_target / distance * step;
        self.angle = to_target.y.atan2(to_target.x);
        trace!(projectile = %self.id, x = self.position.x, y = self.position.y, "projectile advanced");
        None
    }

    fn impact(&self) -> Impact<'_> {
        Impact {
            projectile: self.id,
            position: self.position,
            target: self.target,
            damage: self.damage,
            modifiers: &self.modifiers,
            tag: &self.tag,
            heavy: self.heavy,
        }
    }
}
