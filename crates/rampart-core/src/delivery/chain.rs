//! Sequential chain: one path, decaying damage.

use std::collections::BTreeSet;

use tracing::trace;

use super::{nearest, DeliveryReport, ImpactContext, Strike};
use crate::enemy::living;
use crate::event::CombatEvent;

pub(super) fn deliver(strike: &Strike<'_, '_>, ctx: &mut ImpactContext<'_>) -> DeliveryReport {
    let m = strike.modifiers();
    let hop_range = m.chain_range * ctx.config.cell_size;

    let mut report = DeliveryReport::default();
    let mut hit = BTreeSet::new();
    let mut current = Some(strike.impact.target);
    let mut damage = strike.damage;

    for _ in 0..m.chain_count {
        let Some(snapshot) = current.and_then(|id| living(&*ctx.enemies, id)) else {
            break;
        };
        ctx.damage(strike.tag(), snapshot.id, damage);
        hit.insert(snapshot.id);
        report.hits.push(snapshot.id);
        if report.hits.len() >= m.chain_count as usize {
            break;
        }

        let next = nearest(&*ctx.enemies, snapshot.position, hop_range, &hit);
        damage *= m.chain_decay;
        if let Some(to) = next {
            trace!(from = %snapshot.id, %to, damage, "chain hop");
            ctx.sink.record(CombatEvent::ChainHop {
                from: snapshot.id,
                to,
                damage,
            });
        }
        current = next;
    }
    report
}

#[cfg(test)]
mod tests {
    use super::super::{resolve, Impact};
    use super::*;
    use crate::arena::Arena;
    use crate::config::CombatConfig;
    use crate::enemy::{Enemies, EnemyId};
    use crate::event::EventLog;
    use crate::projectile::ProjectileId;
    use crate::source::{Modifiers, SourceTag};
    use glam::Vec2;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn zap(arena: &mut Arena, target: EnemyId, count: u32, decay: f32) -> (DeliveryReport, EventLog) {
        let tag = SourceTag::new("lightning", 0);
        let modifiers = Modifiers {
            chain_count: count,
            chain_range: 1.5,
            chain_decay: decay,
            ..Modifiers::default()
        };
        let impact = Impact {
            projectile: ProjectileId::new(0),
            position: Vec2::ZERO,
            target,
            damage: 10.0,
            modifiers: &modifiers,
            tag: &tag,
            heavy: false,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut log = EventLog::new();
        let config = CombatConfig::default();
        let mut ctx = ImpactContext::new(arena, &mut rng, &config, &mut log);
        let report = resolve(&impact, &mut ctx);
        (report, log)
    }

    #[test]
    fn hops_nearest_first_with_decay() {
        let mut arena = Arena::new();
        let a = arena.spawn(Vec2::ZERO, 100.0);
        let far = arena.spawn(Vec2::new(0.0, 40.0), 100.0);
        let near = arena.spawn(Vec2::new(30.0, 0.0), 100.0);

        let (report, log) = zap(&mut arena, a, 3, 0.5);

        assert_eq!(report.hits, vec![a, near, far]);
        assert_eq!(log.damage_to(a).collect::<Vec<_>>(), vec![10.0]);
        assert_eq!(log.damage_to(near).collect::<Vec<_>>(), vec![5.0]);
        assert_eq!(log.damage_to(far).collect::<Vec<_>>(), vec![2.5]);
    }

    #[test]
    fn last_hit_reports_no_further_hop() {
        let mut arena = Arena::new();
        let a = arena.spawn(Vec2::ZERO, 100.0);
        let b = arena.spawn(Vec2::new(30.0, 0.0), 100.0);
        let c = arena.spawn(Vec2::new(60.0, 0.0), 100.0);
        arena.spawn(Vec2::new(90.0, 0.0), 100.0);

        let (report, log) = zap(&mut arena, a, 2, 0.5);

        assert_eq!(report.hits, vec![a, b]);
        let hops: Vec<_> = log
            .events()
            .iter()
            .filter_map(|e| match e {
                CombatEvent::ChainHop { from, to, .. } => Some((*from, *to)),
                _ => None,
            })
            .collect();
        assert_eq!(hops, vec![(a, b)]);
        assert_eq!(arena.get(c).unwrap().hp, 100.0);
    }

    #[test]
    fn stops_when_no_enemy_is_in_range() {
        let mut arena = Arena::new();
        let a = arena.spawn(Vec2::ZERO, 100.0);
        arena.spawn(Vec2::new(500.0, 0.0), 100.0);

        let (report, _) = zap(&mut arena, a, 5, 0.7);
        assert_eq!(report.hits, vec![a]);
    }

    #[test]
    fn never_revisits_an_enemy() {
        let mut arena = Arena::new();
        let a = arena.spawn(Vec2::ZERO, 100.0);
        let b = arena.spawn(Vec2::new(20.0, 0.0), 100.0);

        let (report, _) = zap(&mut arena, a, 6, 1.0);
        assert_eq!(report.hits, vec![a, b]);
    }

    #[test]
    fn dead_primary_yields_no_hits() {
        let mut arena = Arena::new();
        let a = arena.spawn(Vec2::ZERO, 1.0);
        arena.spawn(Vec2::new(20.0, 0.0), 100.0);
        arena.get_mut(a).unwrap().hp = 0.0;

        let (report, _) = zap(&mut arena, a, 3, 0.7);
        assert!(report.hits.is_empty());
    }
}
