//! Placed towers and their fire state machine.
//!
//! A [`Tower`] holds the stats of its current level, a cooldown timer and a
//! target mode. Every tick it re-runs target selection against the live enemy
//! set (there is no hard lock), faces whatever it picked, and fires once the
//! cooldown has run out.
//!
//! # State Machine
//!
//! ```text
//! Idle ──target found──▶ Acquiring ──cooldown ≤ 0──▶ Firing
//!  ▲                        │                          │
//!  └──────no target─────────┴───────cooldown reset─────┘
//! ```
//!
//! There is no terminal state. [`Tower::fire_state`] reports the state the
//! last update ended in.

use std::fmt;
use std::sync::Arc;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{CombatConfig, LevelStats, TowerSpec};
use crate::enemy::{Enemies, EnemyId};
use crate::event::{CombatEvent, EventSink};
use crate::projectile::ProjectileManager;
use crate::source::{ProjectileSource, SourceTag};
use crate::targeting::{select_target, TargetMode};

// =============================================================================
// Identifiers
// =============================================================================

/// Unique identifier for a placed tower.
///
/// Ids come from a counter owned by the
/// [`TowerRegistry`](crate::registry::TowerRegistry) and are never reused
/// until the registry is reset.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new `TowerId` from a raw value.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for TowerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TowerId({})", self.0)
    }
}

impl fmt::Display for TowerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for TowerId {
    fn from(id: u32) -> Self {
        Self::new(id)
    }
}

/// A grid cell.
///
/// # Example
///
/// ```
/// use rampart_core::tower::CellCoord;
///
/// let cell = CellCoord::new(3, 4);
/// assert_eq!(cell.to_string(), "(3, 4)");
/// assert_eq!(cell.center(40.0).x, 140.0);
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CellCoord {
    /// Column
    pub gx: i32,
    /// Row
    pub gy: i32,
}

impl CellCoord {
    /// Creates a cell coordinate.
    #[must_use]
    pub const fn new(gx: i32, gy: i32) -> Self {
        Self { gx, gy }
    }

    /// World position of the cell centre in pixels.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn center(self, cell_size: f32) -> Vec2 {
        Vec2::new(
            (self.gx as f32 + 0.5) * cell_size,
            (self.gy as f32 + 0.5) * cell_size,
        )
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.gx, self.gy)
    }
}

// =============================================================================
// Tower
// =============================================================================

/// Where the fire state machine ended its last update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FireState {
    /// No target in range
    #[default]
    Idle,
    /// Target held, waiting on cooldown
    Acquiring,
    /// Fired this tick
    Firing,
}

/// A placed tower.
#[derive(Debug, Clone)]
pub struct Tower {
    id: TowerId,
    kind: String,
    spec: Arc<TowerSpec>,
    cell: CellCoord,
    position: Vec2,
    level: usize,
    total_invested: u32,
    stats: LevelStats,
    cooldown: f32,
    flash: f32,
    angle: f32,
    target_mode: TargetMode,
    target: Option<EnemyId>,
    fire_state: FireState,
}

impl Tower {
    /// Builds a level-0 tower on `cell`.
    ///
    /// `total_invested` starts at the type's base cost and the cooldown at
    /// zero, so a tower fires on the first tick it has a target. Returns
    /// `None` if `spec` has no levels.
    #[must_use]
    pub fn new(
        id: TowerId,
        kind: impl Into<String>,
        spec: Arc<TowerSpec>,
        cell: CellCoord,
        cell_size: f32,
    ) -> Option<Self> {
        let stats = *spec.level(0)?;
        Some(Self {
            id,
            kind: kind.into(),
            total_invested: spec.cost,
            spec,
            cell,
            position: cell.center(cell_size),
            level: 0,
            stats,
            cooldown: 0.0,
            flash: 0.0,
            angle: 0.0,
            target_mode: TargetMode::default(),
            target: None,
            fire_state: FireState::Idle,
        })
    }

    /// Identifier.
    #[must_use]
    pub const fn id(&self) -> TowerId {
        self.id
    }

    /// Stat-table key.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Occupied cell.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        self.cell
    }

    /// World position (cell centre).
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Zero-based level.
    #[must_use]
    pub const fn level(&self) -> usize {
        self.level
    }

    /// Base cost plus every paid upgrade.
    #[must_use]
    pub const fn total_invested(&self) -> u32 {
        self.total_invested
    }

    /// Stats of the current level.
    #[must_use]
    pub const fn stats(&self) -> &LevelStats {
        &self.stats
    }

    /// Seconds until the next shot is allowed.
    #[must_use]
    pub const fn cooldown(&self) -> f32 {
        self.cooldown
    }

    /// Facing angle in radians.
    #[must_use]
    pub const fn angle(&self) -> f32 {
        self.angle
    }

    /// Current target mode.
    #[must_use]
    pub const fn target_mode(&self) -> TargetMode {
        self.target_mode
    }

    /// Sets the target mode.
    pub fn set_target_mode(&mut self, mode: TargetMode) {
        self.target_mode = mode;
    }

    /// Advances to the next target mode and returns it.
    pub fn cycle_target_mode(&mut self) -> TargetMode {
        self.target_mode = self.target_mode.next();
        self.target_mode
    }

    /// Target picked by the last update.
    #[must_use]
    pub const fn target(&self) -> Option<EnemyId> {
        self.target
    }

    /// State the last update ended in.
    #[must_use]
    pub const fn fire_state(&self) -> FireState {
        self.fire_state
    }

    /// True while the cosmetic muzzle flash is showing.
    #[must_use]
    pub fn is_flashing(&self) -> bool {
        self.flash > 0.0
    }

    /// Attribution tag for projectiles fired by this tower.
    #[must_use]
    pub fn tag(&self) -> SourceTag {
        SourceTag::new(self.kind.clone(), self.id.get())
    }

    /// Snapshot of the shot this tower would fire right now.
    #[must_use]
    pub fn as_source(&self) -> ProjectileSource {
        ProjectileSource::new(
            self.tag(),
            self.position,
            self.stats.damage,
            self.stats.proj_speed,
        )
        .with_modifiers(self.stats.modifiers)
    }

    /// Cost of the next level, or `None` at max level.
    #[must_use]
    pub fn next_upgrade_cost(&self) -> Option<u32> {
        self.spec.level(self.level + 1).map(|next| next.upgrade_cost)
    }

    /// Returns true if no further level exists.
    #[must_use]
    pub fn is_max_level(&self) -> bool {
        self.level + 1 >= self.spec.level_count()
    }

    /// Gold returned on sale: `floor(total_invested * per_mille / 1000)`.
    ///
    /// See [`CombatConfig::refund_per_mille`](crate::config::CombatConfig::refund_per_mille).
    /// Values above 1000 are treated as a full refund.
    ///
    /// # Example
    ///
    /// ```
    /// use std::sync::Arc;
    /// use rampart_core::config::StatTable;
    /// use rampart_core::tower::{CellCoord, Tower, TowerId};
    ///
    /// let table = StatTable::builtin().unwrap();
    /// let spec = Arc::clone(table.get("arrow").unwrap());
    /// let tower = Tower::new(TowerId::new(0), "arrow", spec, CellCoord::new(0, 0), 40.0).unwrap();
    ///
    /// assert_eq!(tower.sell_value(700), 35);
    /// ```
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn sell_value(&self, per_mille: u32) -> u32 {
        let per_mille = u64::from(per_mille.min(1000));
        (u64::from(self.total_invested) * per_mille / 1000) as u32
    }

    /// Moves to the next level and recomputes stats.
    ///
    /// Adds the new level's upgrade cost to `total_invested`. Returns `false`
    /// and changes nothing at max level. Payment is the registry's concern.
    pub fn upgrade(&mut self) -> bool {
        let Some(next) = self.spec.level(self.level + 1).copied() else {
            return false;
        };
        self.level += 1;
        self.total_invested += next.upgrade_cost;
        self.stats = next;
        true
    }

    /// Runs one tick of the fire state machine.
    ///
    /// # Arguments
    ///
    /// * `dt` - Seconds since the last tick
    /// * `enemies` - Live enemy set to target from
    /// * `config` - Cell size and cosmetic timings
    /// * `projectiles` - Where fired projectiles go
    /// * `sink` - Receives `ProjectileFired`
    pub fn update(
        &mut self,
        dt: f32,
        enemies: &dyn Enemies,
        config: &CombatConfig,
        projectiles: &mut ProjectileManager,
        sink: &mut dyn EventSink,
    ) {
        self.cooldown = (self.cooldown - dt).max(0.0);
        self.flash = (self.flash - dt).max(0.0);

        let candidates =
            enemies.enemies_in_range(self.position, self.stats.range, config.cell_size);
        let picked = select_target(
            &candidates,
            self.position,
            self.stats.range,
            config.cell_size,
            self.target_mode,
        );
        self.target = picked.map(|enemy| enemy.id);

        let Some(enemy) = picked else {
            self.fire_state = FireState::Idle;
            return;
        };

        let facing = enemy.position - self.position;
        self.angle = facing.y.atan2(facing.x);

        if self.cooldown > 0.0 {
            self.fire_state = FireState::Acquiring;
            return;
        }

        let source = self.as_source();
        let heavy = source.modifiers.missile;
        let projectile = projectiles.spawn(&source, &enemy, heavy);
        debug!(tower = %self.id, kind = %self.kind, target = %enemy.id, %projectile, "tower fired");
        sink.record(CombatEvent::ProjectileFired {
            projectile,
            source: source.tag,
            target: enemy.id,
            heavy,
        });

        self.cooldown = self.stats.fire_rate;
        self.flash = config.muzzle_flash;
        self.fire_state = FireState::Firing;
    }
}
