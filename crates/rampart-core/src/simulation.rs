//! Tick orchestration.
//!
//! The `Simulation` owns the tower registry, the projectile manager and a
//! seeded RNG, and advances them in a fixed order each step:
//!
//! 1. **TOWERS**: every tower updates in id order and may spawn projectiles
//! 2. **PROJECTILES**: scorch zones burn, every projectile (including those
//!    spawned in phase 1) advances, arrivals resolve, spent ones are reaped
//! 3. **ADVANCE**: the tick counter increments
//!
//! Enemies stay with the caller and are passed into each step. Status timers
//! on an [`Arena`](crate::arena::Arena) are the caller's to advance with
//! [`Arena::tick_statuses`](crate::arena::Arena::tick_statuses).
//!
//! # Determinism
//!
//! Crit and shock rolls draw from a `ChaCha8Rng` seeded with the master seed,
//! towers update in id order and enemy queries return ascending ids. Two
//! simulations with the same seed, inputs and enemy collaborator produce
//! identical event streams.
//!
//! # Example
//!
//! ```
//! use glam::Vec2;
//! use rampart_core::arena::Arena;
//! use rampart_core::economy::Treasury;
//! use rampart_core::event::EventLog;
//! use rampart_core::simulation::Simulation;
//!
//! let mut sim = Simulation::builtin(42).unwrap();
//! let mut gold = Treasury::new(100);
//! let mut log = EventLog::new();
//! let open = |_gx: i32, _gy: i32| true;
//! sim.registry_mut().place("arrow", 0, 0, &mut gold, &open, &mut log);
//!
//! let mut arena = Arena::new();
//! arena.spawn(Vec2::new(60.0, 20.0), 30.0);
//!
//! for _ in 0..10 {
//!     sim.step(0.05, &mut arena, &mut log);
//! }
//! assert_eq!(sim.tick(), 10);
//! assert!(arena.iter().next().unwrap().hp < 30.0);
//! ```

use std::fmt;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::config::{CombatConfig, StatTable};
use crate::enemy::{living, Enemies, EnemyId};
use crate::error::ConfigError;
use crate::event::{CombatEvent, EventSink};
use crate::projectile::{ProjectileId, ProjectileManager};
use crate::registry::TowerRegistry;
use crate::source::ProjectileSource;

/// The combat core for one battle.
pub struct Simulation {
    registry: TowerRegistry,
    projectiles: ProjectileManager,
    rng: ChaCha8Rng,
    master_seed: u64,
    tick: u64,
}

impl fmt::Debug for Simulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulation")
            .field("towers", &self.registry.len())
            .field("projectiles", &self.projectiles.len())
            .field("master_seed", &self.master_seed)
            .field("tick", &self.tick)
            .finish_non_exhaustive()
    }
}

impl Simulation {
    /// Creates a simulation over a validated stat table.
    ///
    /// # Arguments
    ///
    /// * `seed` - Master seed for crit and shock rolls
    /// * `table` - Tower types available for placement
    /// * `config` - Global combat settings
    #[must_use]
    pub fn new(seed: u64, table: StatTable, config: CombatConfig) -> Self {
        Self {
            registry: TowerRegistry::new(table, config),
            projectiles: ProjectileManager::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            master_seed: seed,
            tick: 0,
        }
    }

    /// Creates a simulation with the built-in tower table and default config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the embedded table fails validation.
    pub fn builtin(seed: u64) -> Result<Self, ConfigError> {
        Ok(Self::new(seed, StatTable::builtin()?, CombatConfig::default()))
    }

    /// Runs one tick: towers, then projectiles.
    pub fn step(&mut self, dt: f32, enemies: &mut dyn Enemies, sink: &mut dyn EventSink) {
        self.registry
            .update(dt, &*enemies, &mut self.projectiles, sink);
        let config = *self.registry.config();
        self.projectiles
            .update(dt, enemies, &mut self.rng, &config, sink);
        self.tick += 1;
    }

    /// Fires a projectile from a non-tower attacker.
    ///
    /// Returns `None` if `target` is not a living enemy. The projectile is
    /// advanced by the next [`step`](Self::step).
    pub fn spawn_projectile(
        &mut self,
        source: &ProjectileSource,
        target: EnemyId,
        heavy: bool,
        enemies: &dyn Enemies,
        sink: &mut dyn EventSink,
    ) -> Option<ProjectileId> {
        let snapshot = living(enemies, target)?;
        let projectile = self.projectiles.spawn(source, &snapshot, heavy);
        debug!(%projectile, source = %source.tag, %target, heavy, "projectile spawned");
        sink.record(CombatEvent::ProjectileFired {
            projectile,
            source: source.tag.clone(),
            target,
            heavy,
        });
        Some(projectile)
    }

    /// Tower registry.
    #[must_use]
    pub fn registry(&self) -> &TowerRegistry {
        &self.registry
    }

    /// Mutable tower registry, for placement, upgrades and sales.
    #[must_use]
    pub fn registry_mut(&mut self) -> &mut TowerRegistry {
        &mut self.registry
    }

    /// Projectile manager.
    #[must_use]
    pub fn projectiles(&self) -> &ProjectileManager {
        &self.projectiles
    }

    /// Global combat settings.
    #[must_use]
    pub fn config(&self) -> &CombatConfig {
        self.registry.config()
    }

    /// Ticks run so far.
    #[must_use]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Master seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.master_seed
    }

    /// Clears towers and projectiles and reseeds the RNG from the master
    /// seed. The tick counter restarts at zero.
    pub fn reset(&mut self) {
        self.registry.reset();
        self.projectiles.clear();
        self.rng = ChaCha8Rng::seed_from_u64(self.master_seed);
        self.tick = 0;
    }
}
