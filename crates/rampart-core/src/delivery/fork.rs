//! Fork-chain: breadth-first arcs with per-hit amplification.
//!
//! Wave 0 is the primary target. Each struck enemy contributes its unhit
//! neighbours within `chain_range` to the next wave. Propagation stops at
//! `fork_depth` waves past the primary or at `fork_count` distinct hits,
//! whichever comes first. The n-th hit of the whole impact deals
//! `damage * (1 + overcharge * (n - 1))`.

use std::collections::BTreeSet;

use tracing::trace;

use super::{DeliveryReport, ImpactContext, Strike};
use crate::enemy::{living, EnemyId};
use crate::event::{CombatEvent, StatusKind};

/// Damage of the `hit_index`-th (1-based) fork hit.
#[allow(clippy::cast_precision_loss)]
pub(super) fn amplified(base: f32, overcharge: f32, hit_index: usize) -> f32 {
    base * (1.0 + overcharge * (hit_index.saturating_sub(1)) as f32)
}

pub(super) fn deliver(strike: &Strike<'_, '_>, ctx: &mut ImpactContext<'_>) -> DeliveryReport {
    let m = *strike.modifiers();
    let cap = m.fork_count as usize;
    let arc_range = m.chain_range * ctx.config.cell_size;

    let mut report = DeliveryReport::default();
    let mut hit: BTreeSet<EnemyId> = BTreeSet::new();
    let mut wave = vec![strike.impact.target];

    for depth in 0..=m.fork_depth {
        if wave.is_empty() || report.hits.len() >= cap {
            break;
        }
        let mut next_wave = Vec::new();
        let mut queued = BTreeSet::new();

        for id in wave {
            if report.hits.len() >= cap {
                break;
            }
            if hit.contains(&id) {
                continue;
            }
            let Some(snapshot) = living(&*ctx.enemies, id) else {
                continue;
            };

            hit.insert(id);
            report.hits.push(id);
            let hit_index = report.hits.len();
            let damage = amplified(strike.damage, m.overcharge, hit_index);
            let dealt = ctx.damage(strike.tag(), id, damage);
            trace!(target = %id, depth, hit_index, dealt, "fork arc");
            ctx.sink.record(CombatEvent::ForkArc {
                target: id,
                wave: depth,
                hit_index: u32::try_from(hit_index).unwrap_or(u32::MAX),
                damage,
            });

            if ctx.roll(m.shock_chance) {
                ctx.enemies.apply_shock(id, m.shock_duration);
                ctx.status(id, StatusKind::Shock);
            }

            for neighbour in ctx.enemies.enemies_near(snapshot.position, arc_range, &hit) {
                if queued.insert(neighbour.id) {
                    next_wave.push(neighbour.id);
                }
            }
        }
        wave = next_wave;
    }
    report
}
