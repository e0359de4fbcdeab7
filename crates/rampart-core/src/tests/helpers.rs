//! Test helper functions for setting up simulations and enemies.

use glam::Vec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::arena::Arena;
use crate::config::{CombatConfig, StatTable};
use crate::delivery::{resolve, DeliveryReport, Impact, ImpactContext};
use crate::economy::Treasury;
use crate::enemy::EnemyId;
use crate::event::EventLog;
use crate::projectile::ProjectileId;
use crate::simulation::Simulation;
use crate::source::{Modifiers, SourceTag};
use crate::tower::TowerId;

// =============================================================================
// Tracing
// =============================================================================

/// Installs a test-writer subscriber once per process. Later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}

// =============================================================================
// Setup
// =============================================================================

/// Every cell is buildable.
pub fn open_map(_gx: i32, _gy: i32) -> bool {
    true
}

/// Simulation with the built-in table and default config.
pub fn builtin_sim(seed: u64) -> Simulation {
    Simulation::builtin(seed).expect("builtin table is valid")
}

/// Places `kind` on `(gx, gy)` with plenty of gold.
pub fn place(sim: &mut Simulation, kind: &str, gx: i32, gy: i32) -> TowerId {
    let mut gold = Treasury::new(10_000);
    sim.registry_mut()
        .place(kind, gx, gy, &mut gold, &open_map, &mut EventLog::new())
        .expect("placement succeeds")
}

/// Spawns a row of enemies `spacing` pixels apart starting at `start`.
pub fn spawn_row(arena: &mut Arena, start: Vec2, spacing: f32, count: usize, hp: f32) -> Vec<EnemyId> {
    (0..count)
        .map(|i| {
            #[allow(clippy::cast_precision_loss)]
            let offset = Vec2::new(spacing * i as f32, 0.0);
            arena.spawn(start + offset, hp)
        })
        .collect()
}

/// Runs `ticks` steps of `dt` seconds.
pub fn run(sim: &mut Simulation, arena: &mut Arena, log: &mut EventLog, dt: f32, ticks: usize) {
    for _ in 0..ticks {
        sim.step(dt, arena, log);
    }
}

// =============================================================================
// Direct Impact Resolution
// =============================================================================

/// Resolves one impact at the target's position with base damage `damage`.
pub fn strike(
    arena: &mut Arena,
    target: EnemyId,
    damage: f32,
    modifiers: &Modifiers,
    seed: u64,
) -> (DeliveryReport, EventLog) {
    let tag = SourceTag::new("probe", 0);
    let position = arena.enemy(target).map_or(Vec2::ZERO, |e| e.position);
    let impact = Impact {
        projectile: ProjectileId::new(0),
        position,
        target,
        damage,
        modifiers,
        tag: &tag,
        heavy: false,
    };
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut log = EventLog::new();
    let config = CombatConfig::default();
    let mut ctx = ImpactContext::new(arena, &mut rng, &config, &mut log);
    let report = resolve(&impact, &mut ctx);
    (report, log)
}

/// Stat table holding only `kind` with the given JSON spec.
pub fn table_with(kind: &str, spec_json: &str) -> StatTable {
    StatTable::from_json_str(&format!("{{\"{kind}\": {spec_json}}}")).expect("valid test table")
}
