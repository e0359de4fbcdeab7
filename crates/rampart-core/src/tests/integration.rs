//! End-to-end tests of placement, firing, flight and delivery.

use glam::Vec2;

use crate::arena::Arena;
use crate::config::CombatConfig;
use crate::economy::Treasury;
use crate::enemy::Enemies;
use crate::event::{CombatEvent, EventLog, HitFlags};
use crate::simulation::Simulation;
use crate::source::{Modifiers, ProjectileSource, SourceTag};
use crate::tower::FireState;

use super::helpers::{builtin_sim, init_tracing, open_map, place, run, spawn_row, table_with};

fn count(log: &EventLog, pred: impl Fn(&CombatEvent) -> bool) -> usize {
    log.events().iter().filter(|e| pred(e)).count()
}

// =============================================================================
// Economy Scenarios
// =============================================================================

#[test]
fn placing_on_a_free_cell_charges_once() {
    init_tracing();
    let mut sim = builtin_sim(0);
    let mut gold = Treasury::new(80);
    let mut log = EventLog::new();

    let placed = sim
        .registry_mut()
        .place("arrow", 4, 2, &mut gold, &open_map, &mut log);
    assert!(placed.is_some());
    assert_eq!(gold.gold(), 30);
    assert!(sim.registry().get_tower_at(4, 2).is_some());

    let again = sim
        .registry_mut()
        .place("arrow", 4, 2, &mut gold, &open_map, &mut log);
    assert!(again.is_none());
    assert_eq!(gold.gold(), 30);
    assert_eq!(sim.registry().len(), 1);
}

#[test]
fn upgrade_at_last_level_is_refused_without_mutation() {
    let mut sim = builtin_sim(0);
    let mut gold = Treasury::new(10_000);
    let mut log = EventLog::new();
    let id = place(&mut sim, "frost", 0, 0);

    assert!(sim.registry_mut().upgrade_tower(id, &mut gold, &mut log));
    assert!(sim.registry_mut().upgrade_tower(id, &mut gold, &mut log));
    let before = gold.gold();
    let invested = sim.registry().get(id).unwrap().total_invested();

    assert!(!sim.registry_mut().upgrade_tower(id, &mut gold, &mut log));
    let tower = sim.registry().get(id).unwrap();
    assert_eq!(tower.level(), 2);
    assert_eq!(tower.total_invested(), invested);
    assert_eq!(gold.gold(), before);
}

#[test]
fn sale_after_upgrades_refunds_seventy_percent() {
    let mut sim = builtin_sim(0);
    let mut gold = Treasury::new(1000);
    let mut log = EventLog::new();
    let id = sim
        .registry_mut()
        .place("lightning", 0, 0, &mut gold, &open_map, &mut log)
        .unwrap();
    sim.registry_mut().upgrade_tower(id, &mut gold, &mut log);
    // 120 + 110 = 230 invested, floor(230 * 0.7) = 161
    let refund = sim.registry_mut().sell(id, &mut gold, &mut log);

    assert_eq!(refund, Some(161));
    assert_eq!(gold.gold(), 1000 - 230 + 161);
    assert!(sim.registry().get_tower_at(0, 0).is_none());
}

// =============================================================================
// Delivery Scenarios
// =============================================================================

#[test]
fn direct_hit_removes_damage_and_projectile() {
    let mut sim = builtin_sim(0);
    let mut arena = Arena::new();
    let target = arena.spawn(Vec2::new(50.0, 0.0), 25.0);
    let source = ProjectileSource::new(SourceTag::new("hero", 0), Vec2::ZERO, 10.0, 600.0);
    let mut log = EventLog::new();

    sim.spawn_projectile(&source, target, false, &arena, &mut log);
    run(&mut sim, &mut arena, &mut log, 0.1, 1);

    assert_eq!(arena.get(target).unwrap().hp, 15.0);
    assert!(sim.projectiles().is_empty());
}

#[test]
fn splash_edge_takes_exactly_half() {
    let mut sim = builtin_sim(0);
    let mut arena = Arena::new();
    let primary = arena.spawn(Vec2::new(200.0, 200.0), 100.0);
    let edge = arena.spawn(Vec2::new(240.0, 200.0), 100.0);
    let source = ProjectileSource::new(SourceTag::new("bomb", 0), Vec2::new(200.0, 150.0), 20.0, 1000.0)
        .with_modifiers(Modifiers {
            splash_radius: 1.0,
            ..Modifiers::default()
        });
    let mut log = EventLog::new();

    sim.spawn_projectile(&source, primary, false, &arena, &mut log);
    run(&mut sim, &mut arena, &mut log, 0.1, 1);

    assert_eq!(log.damage_to(primary).collect::<Vec<_>>(), vec![20.0]);
    assert_eq!(log.damage_to(edge).collect::<Vec<_>>(), vec![10.0]);
}

#[test]
fn chain_tower_decays_along_a_line() {
    let table = table_with(
        "zapper",
        r#"{"cost": 10, "levels": [{"damage": 10, "range": 3, "fire_rate": 5, "proj_speed": 2000,
            "chain_count": 3, "chain_range": 1.0, "chain_decay": 0.7}]}"#,
    );
    let mut sim = Simulation::new(0, table, CombatConfig::default());
    place(&mut sim, "zapper", 0, 0);
    let mut arena = Arena::new();
    let line = spawn_row(&mut arena, Vec2::new(60.0, 20.0), 30.0, 3, 100.0);
    let mut log = EventLog::new();

    run(&mut sim, &mut arena, &mut log, 0.1, 1);

    let dealt: Vec<f32> = line.iter().flat_map(|id| log.damage_to(*id)).collect();
    assert_eq!(dealt.len(), 3);
    for (got, want) in dealt.iter().zip([10.0, 7.0, 4.9]) {
        assert!((got - want).abs() < 1e-4, "got {got}, want {want}");
    }
    assert_eq!(
        count(&log, |e| matches!(e, CombatEvent::ChainHop { .. })),
        2
    );
}

#[test]
fn phantom_splash_lands_at_last_known_position() {
    let mut sim = builtin_sim(0);
    place(&mut sim, "cannon", 0, 0);
    let mut arena = Arena::new();
    let doomed = arena.spawn(Vec2::new(100.0, 20.0), 500.0);
    let bystander = arena.spawn(Vec2::new(110.0, 20.0), 500.0);
    let mut log = EventLog::new();

    // Cannon fires at the furthest-along enemy; both have zero progress, so
    // the first in id order.
    run(&mut sim, &mut arena, &mut log, 0.05, 1);
    assert_eq!(sim.projectiles().len(), 1);

    arena.take_damage(doomed, 1000.0);
    arena.get_mut(doomed).unwrap().position = Vec2::new(900.0, 900.0);
    run(&mut sim, &mut arena, &mut log, 0.05, 10);

    assert!(log.damage_to(bystander).next().is_some());
    assert!(log.events().iter().any(|e| matches!(
        e,
        CombatEvent::Impact { flags, .. } if flags.contains(HitFlags::PHANTOM)
    )));
}

// =============================================================================
// Tick Ordering
// =============================================================================

#[test]
fn point_blank_shot_lands_in_the_firing_tick() {
    let mut sim = builtin_sim(0);
    let tower = place(&mut sim, "arrow", 0, 0);
    let mut arena = Arena::new();
    // 40px from the tower centre; arrow flies 42px in 0.1s.
    let target = arena.spawn(Vec2::new(60.0, 20.0), 100.0);
    let mut log = EventLog::new();

    run(&mut sim, &mut arena, &mut log, 0.1, 1);

    assert_eq!(
        sim.registry().get(tower).unwrap().fire_state(),
        FireState::Firing
    );
    assert_eq!(arena.get(target).unwrap().hp, 90.0);
    assert!(sim.projectiles().is_empty());
}

#[test]
fn towers_retarget_when_the_target_leaves_range() {
    let mut sim = builtin_sim(0);
    let tower = place(&mut sim, "sniper", 0, 0);
    let mut arena = Arena::new();
    let a = arena.spawn(Vec2::new(100.0, 20.0), 10_000.0);
    let b = arena.spawn(Vec2::new(140.0, 20.0), 10_000.0);
    arena.get_mut(a).unwrap().progress = 2.0;
    let mut log = EventLog::new();

    run(&mut sim, &mut arena, &mut log, 0.1, 1);
    assert_eq!(sim.registry().get(tower).unwrap().target(), Some(a));

    arena.get_mut(a).unwrap().position = Vec2::new(5000.0, 20.0);
    run(&mut sim, &mut arena, &mut log, 0.1, 1);
    assert_eq!(sim.registry().get(tower).unwrap().target(), Some(b));
}

#[test]
fn missile_battery_ignites_scorch_and_burns_next_tick() {
    let mut sim = builtin_sim(3);
    let tower = place(&mut sim, "missile", 0, 0);
    let mut arena = Arena::new();
    let target = arena.spawn(Vec2::new(80.0, 20.0), 10_000.0);
    let mut log = EventLog::new();

    run(&mut sim, &mut arena, &mut log, 0.05, 12);

    assert_eq!(
        count(&log, |e| matches!(e, CombatEvent::ScorchIgnited { .. })),
        1
    );
    assert_eq!(sim.projectiles().zones().len(), 1);
    let tag = sim.registry().get(tower).unwrap().tag();
    let splash = 40.0;
    assert!(log.damage_by(&tag) > splash);
    assert!(arena.enemy(target).unwrap().shred().is_some());
}

#[test]
fn stale_stats_do_not_reach_projectiles_in_flight() {
    let mut sim = builtin_sim(0);
    let mut gold = Treasury::new(10_000);
    let tower = place(&mut sim, "cannon", 0, 0);
    let mut arena = Arena::new();
    let target = arena.spawn(Vec2::new(100.0, 20.0), 10_000.0);
    let mut log = EventLog::new();

    run(&mut sim, &mut arena, &mut log, 0.01, 1);
    sim.registry_mut().upgrade_tower(tower, &mut gold, &mut log);
    run(&mut sim, &mut arena, &mut log, 0.01, 40);

    assert_eq!(log.damage_to(target).collect::<Vec<_>>(), vec![22.0]);
}
