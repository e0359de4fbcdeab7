//! Tower ownership, placement economics and grid occupancy.
//!
//! The `TowerRegistry` owns every [`Tower`] and a cell → tower index. Towers
//! live in a `BTreeMap` keyed by id so updates run in placement order, and
//! ids come from a monotonically increasing counter that only [`reset`]
//! rewinds.
//!
//! Expected rejections (occupied cell, max level, not enough gold) are plain
//! results: [`place`] returns `Option`, [`upgrade_tower`] returns `bool`. The
//! `try_*` forms return the reason.
//!
//! [`reset`]: TowerRegistry::reset
//! [`place`]: TowerRegistry::place
//! [`upgrade_tower`]: TowerRegistry::upgrade_tower

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use crate::config::{CombatConfig, StatTable};
use crate::economy::{BuildMap, Economy};
use crate::enemy::Enemies;
use crate::error::{PlacementError, UpgradeError};
use crate::event::{CombatEvent, EventSink};
use crate::projectile::ProjectileManager;
use crate::tower::{CellCoord, Tower, TowerId};

/// Owner of all placed towers.
#[derive(Debug, Clone)]
pub struct TowerRegistry {
    towers: BTreeMap<TowerId, Tower>,
    cells: BTreeMap<CellCoord, TowerId>,
    next_id: u32,
    table: StatTable,
    config: CombatConfig,
}

impl TowerRegistry {
    /// Creates an empty registry over a validated stat table.
    #[must_use]
    pub fn new(table: StatTable, config: CombatConfig) -> Self {
        Self {
            towers: BTreeMap::new(),
            cells: BTreeMap::new(),
            next_id: 0,
            table,
            config,
        }
    }

    /// The stat table towers are built from.
    #[must_use]
    pub fn table(&self) -> &StatTable {
        &self.table
    }

    /// Global combat settings.
    #[must_use]
    pub fn config(&self) -> &CombatConfig {
        &self.config
    }

    // =========================================================================
    // Placement
    // =========================================================================

    /// Places a tower of type `kind` on cell `(gx, gy)` and charges its cost.
    ///
    /// Checks run in order: known type, buildable cell, free cell, funds.
    /// On any rejection nothing is mutated.
    ///
    /// # Errors
    ///
    /// Returns the first [`PlacementError`] that applies.
    pub fn try_place(
        &mut self,
        kind: &str,
        gx: i32,
        gy: i32,
        economy: &mut dyn Economy,
        map: &dyn BuildMap,
        sink: &mut dyn EventSink,
    ) -> Result<TowerId, PlacementError> {
        let cell = CellCoord::new(gx, gy);
        let spec = self
            .table
            .get(kind)
            .ok_or_else(|| PlacementError::UnknownTowerType(kind.to_string()))?;
        if !map.is_buildable(gx, gy) {
            return Err(PlacementError::NotBuildable(cell));
        }
        if let Some(&tower) = self.cells.get(&cell) {
            return Err(PlacementError::Occupied { cell, tower });
        }
        if !economy.can_afford(spec.cost) {
            return Err(PlacementError::InsufficientFunds { cost: spec.cost });
        }

        let id = TowerId::new(self.next_id);
        let tower = Tower::new(id, kind, Arc::clone(spec), cell, self.config.cell_size)
            .ok_or_else(|| PlacementError::UnknownTowerType(kind.to_string()))?;
        let cost = spec.cost;

        self.next_id += 1;
        economy.spend_gold(cost);
        self.towers.insert(id, tower);
        self.cells.insert(cell, id);

        debug!(tower = %id, kind, %cell, cost, "tower placed");
        sink.record(CombatEvent::TowerPlaced {
            tower: id,
            kind: kind.to_string(),
            cell,
            cost,
        });
        Ok(id)
    }

    /// Sentinel form of [`try_place`](Self::try_place): `None` on rejection.
    pub fn place(
        &mut self,
        kind: &str,
        gx: i32,
        gy: i32,
        economy: &mut dyn Economy,
        map: &dyn BuildMap,
        sink: &mut dyn EventSink,
    ) -> Option<TowerId> {
        self.try_place(kind, gx, gy, economy, map, sink)
            .map_err(|err| debug!(kind, gx, gy, %err, "placement rejected"))
            .ok()
    }

    // =========================================================================
    // Sale and Upgrade
    // =========================================================================

    /// Removes a tower, frees its cell and credits the refund.
    ///
    /// Returns the refund, or `None` if the registry does not track `id`.
    pub fn sell(
        &mut self,
        id: TowerId,
        economy: &mut dyn Economy,
        sink: &mut dyn EventSink,
    ) -> Option<u32> {
        let tower = self.towers.remove(&id)?;
        self.cells.remove(&tower.cell());
        let refund = tower.sell_value(self.config.refund_per_mille());
        economy.add_gold(refund);

        debug!(tower = %id, cell = %tower.cell(), refund, "tower sold");
        sink.record(CombatEvent::TowerSold {
            tower: id,
            cell: tower.cell(),
            refund,
        });
        Some(refund)
    }

    /// Pays for and applies the next level of tower `id`.
    ///
    /// Returns the new level.
    ///
    /// # Errors
    ///
    /// [`UpgradeError`] if the tower is unknown, at max level, or the
    /// economy cannot pay. Nothing is mutated on error.
    pub fn try_upgrade(
        &mut self,
        id: TowerId,
        economy: &mut dyn Economy,
        sink: &mut dyn EventSink,
    ) -> Result<usize, UpgradeError> {
        let tower = self
            .towers
            .get_mut(&id)
            .ok_or(UpgradeError::UnknownTower(id))?;
        let cost = tower.next_upgrade_cost().ok_or(UpgradeError::MaxLevel(id))?;
        if !economy.can_afford(cost) {
            return Err(UpgradeError::InsufficientFunds { cost });
        }
        if !tower.upgrade() {
            return Err(UpgradeError::MaxLevel(id));
        }
        economy.spend_gold(cost);

        let level = tower.level();
        debug!(tower = %id, level, cost, "tower upgraded");
        sink.record(CombatEvent::TowerUpgraded {
            tower: id,
            level,
            cost,
        });
        Ok(level)
    }

    /// Sentinel form of [`try_upgrade`](Self::try_upgrade).
    pub fn upgrade_tower(
        &mut self,
        id: TowerId,
        economy: &mut dyn Economy,
        sink: &mut dyn EventSink,
    ) -> bool {
        self.try_upgrade(id, economy, sink)
            .map_err(|err| debug!(tower = %id, %err, "upgrade rejected"))
            .is_ok()
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Tower standing on `(gx, gy)`, if any.
    #[must_use]
    pub fn get_tower_at(&self, gx: i32, gy: i32) -> Option<&Tower> {
        self.cells
            .get(&CellCoord::new(gx, gy))
            .and_then(|id| self.towers.get(id))
    }

    /// Tower by id.
    #[must_use]
    pub fn get(&self, id: TowerId) -> Option<&Tower> {
        self.towers.get(&id)
    }

    /// Mutable tower by id, for target-mode changes.
    #[must_use]
    pub fn get_mut(&mut self, id: TowerId) -> Option<&mut Tower> {
        self.towers.get_mut(&id)
    }

    /// Towers in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Tower> + '_ {
        self.towers.values()
    }

    /// Number of placed towers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.towers.len()
    }

    /// Returns true if no towers are placed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.towers.is_empty()
    }

    /// Removes every tower and rewinds the id counter. No refunds are paid.
    pub fn reset(&mut self) {
        self.towers.clear();
        self.cells.clear();
        self.next_id = 0;
    }

    // =========================================================================
    // Tick
    // =========================================================================

    /// Updates every tower in id order.
    pub fn update(
        &mut self,
        dt: f32,
        enemies: &dyn Enemies,
        projectiles: &mut ProjectileManager,
        sink: &mut dyn EventSink,
    ) {
        for tower in self.towers.values_mut() {
            tower.update(dt, enemies, &self.config, projectiles, sink);
        }
    }
}
