//! Damage delivery algorithms.
//!
//! Every impact runs exactly one algorithm, picked from the projectile's
//! modifier payload in fixed precedence order:
//!
//! | Priority | Kind                  | Selected when      |
//! |----------|-----------------------|--------------------|
//! | 1        | [`DeliveryKind::Splash`] | `splash_radius > 0` |
//! | 2        | [`DeliveryKind::Fork`]   | `fork_count > 0`    |
//! | 3        | [`DeliveryKind::Chain`]  | `chain_count > 0`   |
//! | 4        | [`DeliveryKind::Direct`] | otherwise           |
//!
//! A payload carrying several of these still runs only the first. Before the
//! algorithm runs, a crit roll may multiply the damage.
//!
//! All damage goes through [`deal_damage`], which reports the amount the
//! enemy collaborator actually took as a `DamageDealt` event.

mod chain;
mod direct;
mod fork;
mod splash;

pub use splash::falloff;

use std::collections::BTreeSet;

use glam::Vec2;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::CombatConfig;
use crate::enemy::{living, Enemies, EnemyId};
use crate::event::{CombatEvent, EventSink, HitFlags, StatusKind};
use crate::projectile::{ProjectileId, ScorchZone};
use crate::source::{Modifiers, SourceTag};

/// Which algorithm resolved an impact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeliveryKind {
    /// Single target, optional slow and burn
    Direct,
    /// Radial falloff around the impact point
    Splash,
    /// Breadth-first, capped, amplifying arcs
    Fork,
    /// Sequential hops with decay
    Chain,
}

impl DeliveryKind {
    /// Picks the algorithm for `modifiers`.
    ///
    /// # Example
    ///
    /// ```
    /// use rampart_core::delivery::DeliveryKind;
    /// use rampart_core::source::Modifiers;
    ///
    /// let both = Modifiers { splash_radius: 1.0, chain_count: 3, ..Modifiers::default() };
    /// assert_eq!(DeliveryKind::select(&both), DeliveryKind::Splash);
    /// assert_eq!(DeliveryKind::select(&Modifiers::default()), DeliveryKind::Direct);
    /// ```
    #[must_use]
    pub fn select(modifiers: &Modifiers) -> Self {
        if modifiers.splash_radius > 0.0 {
            Self::Splash
        } else if modifiers.fork_count > 0 {
            Self::Fork
        } else if modifiers.chain_count > 0 {
            Self::Chain
        } else {
            Self::Direct
        }
    }
}

/// One arriving projectile, as seen by the delivery algorithms.
#[derive(Debug, Clone, Copy)]
pub struct Impact<'a> {
    /// Arriving projectile
    pub projectile: ProjectileId,
    /// Impact point
    pub position: Vec2,
    /// Primary target (may be dead by now)
    pub target: EnemyId,
    /// Base damage before crits
    pub damage: f32,
    /// Modifier payload
    pub modifiers: &'a Modifiers,
    /// Damage attribution
    pub tag: &'a SourceTag,
    /// Heavy round
    pub heavy: bool,
}

/// Mutable collaborators an impact needs.
pub struct ImpactContext<'a> {
    /// Enemy collaborator
    pub enemies: &'a mut dyn Enemies,
    /// Crit and shock rolls
    pub rng: &'a mut dyn RngCore,
    /// Cell size and heavy scaling
    pub config: &'a CombatConfig,
    /// Event receiver
    pub sink: &'a mut dyn EventSink,
}

impl<'a> ImpactContext<'a> {
    /// Bundles the collaborators.
    pub fn new(
        enemies: &'a mut dyn Enemies,
        rng: &'a mut dyn RngCore,
        config: &'a CombatConfig,
        sink: &'a mut dyn EventSink,
    ) -> Self {
        Self {
            enemies,
            rng,
            config,
            sink,
        }
    }

    /// Rolls `chance`. No draw is made when `chance` is not positive.
    pub(crate) fn roll(&mut self, chance: f32) -> bool {
        chance > 0.0 && self.rng.gen::<f32>() < chance
    }

    /// Damages `target` on behalf of `source` and reports the dealt amount.
    pub(crate) fn damage(&mut self, source: &SourceTag, target: EnemyId, amount: f32) -> f32 {
        deal_damage(self.enemies, self.sink, source, target, amount)
    }

    /// Records a status request.
    pub(crate) fn status(&mut self, target: EnemyId, status: StatusKind) {
        self.sink.record(CombatEvent::StatusApplied { target, status });
    }
}

/// Result of one impact.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DeliveryReport {
    /// Distinct enemies damaged, in hit order
    pub hits: Vec<EnemyId>,
    /// Zone to ignite, from a heavy splash
    pub scorch: Option<ScorchZone>,
}

/// Applies `amount` to `target` and records the damage actually dealt.
pub(crate) fn deal_damage(
    enemies: &mut dyn Enemies,
    sink: &mut dyn EventSink,
    source: &SourceTag,
    target: EnemyId,
    amount: f32,
) -> f32 {
    let dealt = enemies.take_damage(target, amount);
    if dealt > 0.0 {
        sink.record(CombatEvent::DamageDealt {
            source: source.clone(),
            target,
            amount: dealt,
        });
    }
    dealt
}

/// Resolves one impact: crit roll, then the selected algorithm.
pub fn resolve(impact: &Impact<'_>, ctx: &mut ImpactContext<'_>) -> DeliveryReport {
    let modifiers = impact.modifiers;
    let mut flags = HitFlags::empty();
    flags.set(HitFlags::HEAVY, impact.heavy);
    if living(&*ctx.enemies, impact.target).is_none() {
        flags |= HitFlags::PHANTOM;
    }

    let mut damage = impact.damage;
    if ctx.roll(modifiers.crit_chance) {
        damage *= modifiers.crit_multiplier;
        flags |= HitFlags::CRITICAL;
        ctx.sink.record(CombatEvent::CriticalHit {
            projectile: impact.projectile,
            position: impact.position,
            damage,
        });
    }

    let kind = DeliveryKind::select(modifiers);
    let strike = Strike {
        impact,
        damage,
        critical: flags.contains(HitFlags::CRITICAL),
    };
    let report = match kind {
        DeliveryKind::Splash => splash::deliver(&strike, ctx),
        DeliveryKind::Fork => fork::deliver(&strike, ctx),
        DeliveryKind::Chain => chain::deliver(&strike, ctx),
        DeliveryKind::Direct => direct::deliver(&strike, ctx),
    };

    debug!(
        projectile = %impact.projectile,
        source = %impact.tag,
        delivery = ?kind,
        hits = report.hits.len(),
        "impact resolved"
    );
    ctx.sink.record(CombatEvent::Impact {
        projectile: impact.projectile,
        position: impact.position,
        delivery: kind,
        hits: report.hits.len(),
        flags,
    });
    report
}

/// An impact after the crit roll.
struct Strike<'i, 'a> {
    impact: &'i Impact<'a>,
    damage: f32,
    critical: bool,
}

impl Strike<'_, '_> {
    fn modifiers(&self) -> &Modifiers {
        self.impact.modifiers
    }

    fn tag(&self) -> &SourceTag {
        self.impact.tag
    }
}

/// Nearest living enemy to `from` within `radius_px`, skipping `exclude`.
/// The first candidate in id order wins ties.
fn nearest(
    enemies: &dyn Enemies,
    from: Vec2,
    radius_px: f32,
    exclude: &BTreeSet<EnemyId>,
) -> Option<EnemyId> {
    enemies
        .enemies_near(from, radius_px, exclude)
        .into_iter()
        .fold(None, |best: Option<(EnemyId, f32)>, enemy| {
            let d = from.distance_squared(enemy.position);
            match best {
                Some((_, best_d)) if d >= best_d => best,
                _ => Some((enemy.id, d)),
            }
        })
        .map(|(id, _)| id)
}
