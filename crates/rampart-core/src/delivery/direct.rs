//! Single-target delivery with optional slow and burn.

use super::{DeliveryReport, ImpactContext, Strike};
use crate::enemy::living;
use crate::event::StatusKind;

pub(super) fn deliver(strike: &Strike<'_, '_>, ctx: &mut ImpactContext<'_>) -> DeliveryReport {
    let m = strike.modifiers();
    let target = strike.impact.target;
    let mut report = DeliveryReport::default();

    if living(&*ctx.enemies, target).is_none() {
        return report;
    }
    ctx.damage(strike.tag(), target, strike.damage);
    report.hits.push(target);

    if m.slow_factor > 0.0 && m.slow_duration > 0.0 {
        ctx.enemies.apply_slow(target, m.slow_factor, m.slow_duration);
        ctx.status(target, StatusKind::Slow);
    }
    if m.burn_damage > 0.0 && m.burn_duration > 0.0 {
        ctx.enemies
            .apply_burn(target, m.burn_damage, m.burn_duration, strike.tag());
        ctx.status(target, StatusKind::Burn);
    }
    report
}
