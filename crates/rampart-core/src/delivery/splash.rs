//! Radial splash with linear falloff.
//!
//! Damage is full at the impact point and falls linearly to half at the
//! effective radius. Heavy rounds widen the radius (more on a crit), scale the
//! damage, shred armor and may leave a scorch zone.

use std::collections::BTreeSet;

use tracing::trace;

use super::{DeliveryReport, ImpactContext, Strike};
use crate::event::{CombatEvent, StatusKind};
use crate::projectile::ScorchZone;

/// Damage fraction at `distance` from the centre of a splash of `radius`.
///
/// Clamped to `[0.5, 1.0]`.
///
/// # Example
///
/// ```
/// use rampart_core::delivery::falloff;
///
/// assert_eq!(falloff(0.0, 40.0), 1.0);
/// assert_eq!(falloff(20.0, 40.0), 0.75);
/// assert_eq!(falloff(40.0, 40.0), 0.5);
/// ```
#[must_use]
pub fn falloff(distance: f32, radius: f32) -> f32 {
    if radius <= 0.0 {
        return 1.0;
    }
    (1.0 - 0.5 * (distance / radius)).clamp(0.5, 1.0)
}

pub(super) fn deliver(strike: &Strike<'_, '_>, ctx: &mut ImpactContext<'_>) -> DeliveryReport {
    let m = *strike.modifiers();
    let impact = strike.impact;
    let heavy = ctx.config.heavy;

    let mut radius = m.splash_radius * ctx.config.cell_size;
    let mut damage = strike.damage;
    if impact.heavy {
        radius *= heavy.radius_multiplier;
        if strike.critical {
            radius *= heavy.crit_radius_multiplier;
        }
        damage *= heavy.damage_multiplier;
    }

    let victims = ctx
        .enemies
        .enemies_near(impact.position, radius, &BTreeSet::new());
    ctx.sink.record(CombatEvent::Explosion {
        position: impact.position,
        radius,
        heavy: impact.heavy,
        hits: victims.len(),
    });

    let mut report = DeliveryReport::default();
    for victim in &victims {
        let scale = falloff(impact.position.distance(victim.position), radius);
        let dealt = ctx.damage(strike.tag(), victim.id, damage * scale);
        trace!(target = %victim.id, scale, dealt, "splash hit");
        report.hits.push(victim.id);

        if impact.heavy && m.armor_shred > 0.0 && m.armor_shred_duration > 0.0 {
            ctx.enemies
                .apply_armor_shred(victim.id, m.armor_shred, m.armor_shred_duration);
            ctx.status(victim.id, StatusKind::ArmorShred);
        }
        if m.knockback > 0.0
            && ctx
                .enemies
                .apply_knockback(victim.id, m.knockback, strike.tag())
        {
            ctx.status(victim.id, StatusKind::Knockback);
        }
    }

    if impact.heavy && m.scorch_dps > 0.0 && m.scorch_duration > 0.0 {
        report.scorch = Some(ScorchZone {
            source: strike.tag().clone(),
            position: impact.position,
            radius,
            dps: m.scorch_dps,
            remaining: m.scorch_duration,
        });
    }
    report
}
