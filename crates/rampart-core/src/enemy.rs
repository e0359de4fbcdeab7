//! The enemy collaborator contract.
//!
//! The combat core never owns or moves enemies. It reads them through
//! [`EnemySnapshot`] values and mutates them through the [`Enemies`] trait.
//! [`Arena`](crate::arena::Arena) is the in-memory implementation used by
//! tests and simple embedders.
//!
//! # Ordering
//!
//! Spatial queries return enemies in ascending [`EnemyId`] order. Gameplay does
//! not depend on it, but targeting and chain tie-breaks take the first
//! candidate encountered, so a stable order keeps runs reproducible.

use std::collections::BTreeSet;
use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::source::SourceTag;

/// Unique identifier for an enemy.
///
/// # Example
///
/// ```
/// use rampart_core::enemy::EnemyId;
///
/// let a = EnemyId::new(1);
/// let b = EnemyId::new(2);
/// assert!(a < b);
/// assert_eq!(a.get(), 1);
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new `EnemyId` from a raw value.
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

impl fmt::Debug for EnemyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EnemyId({})", self.0)
    }
}

impl fmt::Display for EnemyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for EnemyId {
    fn from(id: u32) -> Self {
        Self::new(id)
    }
}

/// Read-only view of one enemy at the moment it was queried.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemySnapshot {
    /// Identifier
    pub id: EnemyId,
    /// False once the enemy died or left the field
    pub alive: bool,
    /// World position in pixels
    pub position: Vec2,
    /// Current hit points
    pub hp: f32,
    /// Collision radius in pixels
    pub radius: f32,
    /// Distance travelled toward the goal; larger is further along
    pub progress: f32,
}

/// Query and mutation contract for the live enemy set.
///
/// Queries return only living enemies, in ascending id order, and skip any id
/// in `exclude`. Mutators on an unknown or dead id do nothing; `take_damage`
/// then reports zero.
pub trait Enemies {
    /// Looks up one enemy, alive or not.
    fn get(&self, id: EnemyId) -> Option<EnemySnapshot>;

    /// Living enemies within `radius_px` pixels of `center`.
    fn enemies_near(
        &self,
        center: Vec2,
        radius_px: f32,
        exclude: &BTreeSet<EnemyId>,
    ) -> Vec<EnemySnapshot>;

    /// Living enemies within `radius_cells` grid cells of `center`.
    fn enemies_in_range(
        &self,
        center: Vec2,
        radius_cells: f32,
        cell_size: f32,
    ) -> Vec<EnemySnapshot> {
        self.enemies_near(center, radius_cells * cell_size, &BTreeSet::new())
    }

    /// Applies damage and returns the amount actually dealt after
    /// mitigation.
    fn take_damage(&mut self, id: EnemyId, amount: f32) -> f32;

    /// Slows movement to `factor` of normal speed for `duration` seconds.
    fn apply_slow(&mut self, id: EnemyId, factor: f32, duration: f32);

    /// Sets a damage-over-time effect owned by `source`.
    fn apply_burn(&mut self, id: EnemyId, dps: f32, duration: f32, source: &SourceTag);

    /// Stuns for `duration` seconds.
    fn apply_shock(&mut self, id: EnemyId, duration: f32);

    /// Reduces armor by `amount` for `duration` seconds.
    fn apply_armor_shred(&mut self, id: EnemyId, amount: f32, duration: f32);

    /// Pushes the enemy back `distance` along its path, once per source.
    ///
    /// Returns `false` if the enemy is gone or `source` already pushed it.
    fn apply_knockback(&mut self, id: EnemyId, distance: f32, source: &SourceTag) -> bool;
}

/// Returns the living snapshot for `id`, if any.
pub(crate) fn living(enemies: &dyn Enemies, id: EnemyId) -> Option<EnemySnapshot> {
    enemies.get(id).filter(|snapshot| snapshot.alive)
}
