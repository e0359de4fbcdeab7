//! In-memory enemy collaborator.
//!
//! The `Arena` stores enemies with deterministic iteration order (`BTreeMap`)
//! and implements [`Enemies`] on top of them. It also keeps the status
//! bookkeeping the combat core requests (slow, burn, shock, armor shred,
//! knockback) and advances those timers on demand. Enemy movement and pathing
//! stay with the embedder: move enemies with [`Arena::get_mut`] between ticks.
//!
//! # Example
//!
//! ```
//! use rampart_core::arena::Arena;
//! use rampart_core::enemy::Enemies;
//! use glam::Vec2;
//!
//! let mut arena = Arena::new();
//! let grunt = arena.spawn(Vec2::new(100.0, 40.0), 25.0);
//!
//! let dealt = arena.take_damage(grunt, 10.0);
//! assert_eq!(dealt, 10.0);
//! assert_eq!(arena.get(grunt).unwrap().hp, 15.0);
//! ```

use std::collections::{BTreeMap, BTreeSet};

use bitflags::bitflags;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::enemy::{Enemies, EnemyId, EnemySnapshot};
use crate::event::{CombatEvent, EventSink};
use crate::source::SourceTag;

/// Collision radius given to enemies spawned without one.
pub const DEFAULT_ENEMY_RADIUS: f32 = 10.0;

bitflags! {
    /// Active status effects on an enemy.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct StatusFlags: u8 {
        /// Movement is slowed
        const SLOWED = 0b0000_0001;
        /// At least one burn is active
        const BURNING = 0b0000_0010;
        /// Stunned
        const SHOCKED = 0b0000_0100;
        /// Armor is reduced
        const SHREDDED = 0b0000_1000;
    }
}

/// A timed magnitude (slow factor, shred amount, burn dps).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimedEffect {
    /// Effect strength
    pub magnitude: f32,
    /// Seconds left
    pub remaining: f32,
}

/// One enemy as stored by the arena.
#[derive(Debug, Clone, PartialEq)]
pub struct Enemy {
    id: EnemyId,
    /// World position in pixels
    pub position: Vec2,
    /// Current hit points
    pub hp: f32,
    /// Maximum hit points
    pub max_hp: f32,
    /// Collision radius in pixels
    pub radius: f32,
    /// Path progress toward the goal
    pub progress: f32,
    /// Fractional damage reduction in `[0, 1]`
    pub armor: f32,
    /// Set when the enemy left the field without dying
    pub escaped: bool,
    slow: Option<TimedEffect>,
    shred: Option<TimedEffect>,
    shock_remaining: f32,
    burns: BTreeMap<SourceTag, TimedEffect>,
    knocked_by: BTreeSet<SourceTag>,
}

impl Enemy {
    fn new(id: EnemyId, position: Vec2, hp: f32) -> Self {
        Self {
            id,
            position,
            hp,
            max_hp: hp,
            radius: DEFAULT_ENEMY_RADIUS,
            progress: 0.0,
            armor: 0.0,
            escaped: false,
            slow: None,
            shred: None,
            shock_remaining: 0.0,
            burns: BTreeMap::new(),
            knocked_by: BTreeSet::new(),
        }
    }

    /// Identifier assigned at spawn.
    #[must_use]
    pub const fn id(&self) -> EnemyId {
        self.id
    }

    /// Alive means positive HP and still on the field.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.hp > 0.0 && !self.escaped
    }

    /// Armor after shred, clamped to `[0, 1]`.
    #[must_use]
    pub fn effective_armor(&self) -> f32 {
        let shred = self.shred.map_or(0.0, |s| s.magnitude);
        (self.armor - shred).clamp(0.0, 1.0)
    }

    /// Speed multiplier from the active slow (1.0 when not slowed, 0.0 when
    /// shocked).
    #[must_use]
    pub fn speed_multiplier(&self) -> f32 {
        if self.shock_remaining > 0.0 {
            return 0.0;
        }
        self.slow.map_or(1.0, |s| s.magnitude)
    }

    /// Active burn owned by `source`.
    #[must_use]
    pub fn burn_from(&self, source: &SourceTag) -> Option<TimedEffect> {
        self.burns.get(source).copied()
    }

    /// Active slow, if any.
    #[must_use]
    pub fn slow(&self) -> Option<TimedEffect> {
        self.slow
    }

    /// Active armor shred, if any.
    #[must_use]
    pub fn shred(&self) -> Option<TimedEffect> {
        self.shred
    }

    /// Seconds of stun left.
    #[must_use]
    pub fn shock_remaining(&self) -> f32 {
        self.shock_remaining
    }

    /// Currently active status effects.
    #[must_use]
    pub fn status_flags(&self) -> StatusFlags {
        let mut flags = StatusFlags::empty();
        flags.set(StatusFlags::SLOWED, self.slow.is_some());
        flags.set(StatusFlags::BURNING, !self.burns.is_empty());
        flags.set(StatusFlags::SHOCKED, self.shock_remaining > 0.0);
        flags.set(StatusFlags::SHREDDED, self.shred.is_some());
        flags
    }

    fn snapshot(&self) -> EnemySnapshot {
        EnemySnapshot {
            id: self.id,
            alive: self.is_alive(),
            position: self.position,
            hp: self.hp,
            radius: self.radius,
            progress: self.progress,
        }
    }

    fn mitigate_and_apply(&mut self, amount: f32) -> f32 {
        if !self.is_alive() || amount <= 0.0 {
            return 0.0;
        }
        let dealt = (amount * (1.0 - self.effective_armor())).min(self.hp);
        self.hp -= dealt;
        dealt
    }
}

/// Strongest-wins merge with the longer duration, shared by slow and shred.
fn merge_strongest(
    current: Option<TimedEffect>,
    incoming: TimedEffect,
    stronger: impl Fn(f32, f32) -> bool,
) -> TimedEffect {
    match current {
        Some(existing) => TimedEffect {
            magnitude: if stronger(incoming.magnitude, existing.magnitude) {
                incoming.magnitude
            } else {
                existing.magnitude
            },
            remaining: existing.remaining.max(incoming.remaining),
        },
        None => incoming,
    }
}

/// Enemy storage implementing the [`Enemies`] contract.
#[derive(Debug, Clone, Default)]
pub struct Arena {
    next_id: u32,
    enemies: BTreeMap<EnemyId, Enemy>,
}

impl Arena {
    /// Creates an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns an enemy with full health and default radius, armor and
    /// progress.
    pub fn spawn(&mut self, position: Vec2, hp: f32) -> EnemyId {
        let id = EnemyId::new(self.next_id);
        self.next_id += 1;
        self.enemies.insert(id, Enemy::new(id, position, hp));
        id
    }

    /// Removes an enemy entirely.
    pub fn despawn(&mut self, id: EnemyId) -> Option<Enemy> {
        self.enemies.remove(&id)
    }

    /// Removes every dead or escaped enemy and returns their ids.
    pub fn reap(&mut self) -> Vec<EnemyId> {
        let gone: Vec<EnemyId> = self
            .enemies
            .values()
            .filter(|enemy| !enemy.is_alive())
            .map(Enemy::id)
            .collect();
        for id in &gone {
            self.enemies.remove(id);
        }
        gone
    }

    /// Stored enemy by id.
    #[must_use]
    pub fn enemy(&self, id: EnemyId) -> Option<&Enemy> {
        self.enemies.get(&id)
    }

    /// Mutable access for the embedder's movement code.
    #[must_use]
    pub fn get_mut(&mut self, id: EnemyId) -> Option<&mut Enemy> {
        self.enemies.get_mut(&id)
    }

    /// Enemies in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &Enemy> + '_ {
        self.enemies.values()
    }

    /// Number of stored enemies, dead ones included until reaped.
    #[must_use]
    pub fn len(&self) -> usize {
        self.enemies.len()
    }

    /// Returns true if no enemies are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.enemies.is_empty()
    }

    /// Number of living enemies.
    #[must_use]
    pub fn living_count(&self) -> usize {
        self.enemies.values().filter(|e| e.is_alive()).count()
    }

    /// Advances status timers and applies burn damage.
    ///
    /// Burn damage is attributed to the burning source through `sink`.
    pub fn tick_statuses(&mut self, dt: f32, sink: &mut dyn EventSink) {
        for enemy in self.enemies.values_mut() {
            if !enemy.is_alive() {
                continue;
            }

            let burns: Vec<(SourceTag, f32)> = enemy
                .burns
                .iter()
                .map(|(source, burn)| (source.clone(), burn.magnitude * dt.min(burn.remaining)))
                .collect();
            for (source, amount) in burns {
                let dealt = enemy.mitigate_and_apply(amount);
                if dealt > 0.0 {
                    sink.record(CombatEvent::DamageDealt {
                        source,
                        target: enemy.id,
                        amount: dealt,
                    });
                }
            }

            enemy.burns.retain(|_, burn| {
                burn.remaining -= dt;
                burn.remaining > 0.0
            });
            enemy.slow = enemy
                .slow
                .map(|s| TimedEffect {
                    remaining: s.remaining - dt,
                    ..s
                })
                .filter(|s| s.remaining > 0.0);
            enemy.shred = enemy
                .shred
                .map(|s| TimedEffect {
                    remaining: s.remaining - dt,
                    ..s
                })
                .filter(|s| s.remaining > 0.0);
            enemy.shock_remaining = (enemy.shock_remaining - dt).max(0.0);
        }
    }

    fn living_mut(&mut self, id: EnemyId) -> Option<&mut Enemy> {
        self.enemies.get_mut(&id).filter(|enemy| enemy.is_alive())
    }
}

impl Enemies for Arena {
    fn get(&self, id: EnemyId) -> Option<EnemySnapshot> {
        self.enemies.get(&id).map(Enemy::snapshot)
    }

    fn enemies_near(
        &self,
        center: Vec2,
        radius_px: f32,
        exclude: &BTreeSet<EnemyId>,
    ) -> Vec<EnemySnapshot> {
        let radius_sq = radius_px * radius_px;
        self.enemies
            .values()
            .filter(|enemy| enemy.is_alive() && !exclude.contains(&enemy.id))
            .filter(|enemy| center.distance_squared(enemy.position) <= radius_sq)
            .map(Enemy::snapshot)
            .collect()
    }

    fn take_damage(&mut self, id: EnemyId, amount: f32) -> f32 {
        self.living_mut(id)
            .map_or(0.0, |enemy| enemy.mitigate_and_apply(amount))
    }

    fn apply_slow(&mut self, id: EnemyId, factor: f32, duration: f32) {
        if let Some(enemy) = self.living_mut(id) {
            let incoming = TimedEffect {
                magnitude: factor.clamp(0.0, 1.0),
                remaining: duration,
            };
            // Lower factor is the stronger slow.
            enemy.slow = Some(merge_strongest(enemy.slow, incoming, |a, b| a < b));
        }
    }

    fn apply_burn(&mut self, id: EnemyId, dps: f32, duration: f32, source: &SourceTag) {
        if let Some(enemy) = self.living_mut(id) {
            trace!(enemy = %id, %source, dps, duration, "burn applied");
            enemy.burns.insert(
                source.clone(),
                TimedEffect {
                    magnitude: dps,
                    remaining: duration,
                },
            );
        }
    }

    fn apply_shock(&mut self, id: EnemyId, duration: f32) {
        if let Some(enemy) = self.living_mut(id) {
            enemy.shock_remaining = enemy.shock_remaining.max(duration);
        }
    }

    fn apply_armor_shred(&mut self, id: EnemyId, amount: f32, duration: f32) {
        if let Some(enemy) = self.living_mut(id) {
            let incoming = TimedEffect {
                magnitude: amount,
                remaining: duration,
            };
            enemy.shred = Some(merge_strongest(enemy.shred, incoming, |a, b| a > b));
        }
    }

    fn apply_knockback(&mut self, id: EnemyId, distance: f32, source: &SourceTag) -> bool {
        let Some(enemy) = self.living_mut(id) else {
            return false;
        };
        if !enemy.knocked_by.insert(source.clone()) {
            return false;
        }
        enemy.progress = (enemy.progress - distance).max(0.0);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventLog;

    fn tag(id: u32) -> SourceTag {
        SourceTag::new("flame", id)
    }

    mod lifecycle_tests {
        use super::*;

        #[test]
        fn ids_are_monotonic() {
            let mut arena = Arena::new();
            let a = arena.spawn(Vec2::ZERO, 10.0);
            let b = arena.spawn(Vec2::ZERO, 10.0);
            assert!(a < b);
            arena.despawn(a);
            let c = arena.spawn(Vec2::ZERO, 10.0);
            assert!(b < c);
        }

        #[test]
        fn reap_removes_dead_and_escaped() {
            let mut arena = Arena::new();
            let dead = arena.spawn(Vec2::ZERO, 5.0);
            let escaped = arena.spawn(Vec2::ZERO, 5.0);
            let alive = arena.spawn(Vec2::ZERO, 5.0);
            arena.take_damage(dead, 50.0);
            arena.get_mut(escaped).unwrap().escaped = true;

            let gone = arena.reap();
            assert_eq!(gone, vec![dead, escaped]);
            assert_eq!(arena.len(), 1);
            assert!(arena.enemy(alive).is_some());
        }
    }

    mod query_tests {
        use super::*;

        #[test]
        fn enemies_near_is_sorted_and_filtered() {
            let mut arena = Arena::new();
            let a = arena.spawn(Vec2::new(10.0, 0.0), 5.0);
            arena.spawn(Vec2::new(100.0, 0.0), 5.0);
            let c = arena.spawn(Vec2::new(0.0, 20.0), 5.0);
            let d = arena.spawn(Vec2::new(5.0, 5.0), 5.0);
            arena.take_damage(d, 10.0);

            let near = arena.enemies_near(Vec2::ZERO, 20.0, &BTreeSet::new());
            let ids: Vec<_> = near.iter().map(|s| s.id).collect();
            assert_eq!(ids, vec![a, c]);
        }

        #[test]
        fn enemies_near_honours_exclusions() {
            let mut arena = Arena::new();
            let a = arena.spawn(Vec2::ZERO, 5.0);
            let b = arena.spawn(Vec2::ZERO, 5.0);
            let exclude: BTreeSet<_> = [a].into_iter().collect();

            let near = arena.enemies_near(Vec2::ZERO, 1.0, &exclude);
            assert_eq!(near.len(), 1);
            assert_eq!(near[0].id, b);
        }

        #[test]
        fn enemies_in_range_scales_by_cell_size() {
            let mut arena = Arena::new();
            arena.spawn(Vec2::new(90.0, 0.0), 5.0);

            assert_eq!(arena.enemies_in_range(Vec2::ZERO, 2.0, 40.0).len(), 0);
            assert_eq!(arena.enemies_in_range(Vec2::ZERO, 2.5, 40.0).len(), 1);
        }

        #[test]
        fn boundary_distance_is_inside() {
            let mut arena = Arena::new();
            arena.spawn(Vec2::new(30.0, 40.0), 5.0);
            assert_eq!(
                arena.enemies_near(Vec2::ZERO, 50.0, &BTreeSet::new()).len(),
                1
            );
        }
    }

    mod damage_tests {
        use super::*;

        #[test]
        fn armor_reduces_damage() {
            let mut arena = Arena::new();
            let id = arena.spawn(Vec2::ZERO, 100.0);
            arena.get_mut(id).unwrap().armor = 0.25;

            let dealt = arena.take_damage(id, 40.0);
            assert!((dealt - 30.0).abs() < 1e-5);
            assert!((arena.get(id).unwrap().hp - 70.0).abs() < 1e-5);
        }

        #[test]
        fn shred_lowers_armor() {
            let mut arena = Arena::new();
            let id = arena.spawn(Vec2::ZERO, 100.0);
            arena.get_mut(id).unwrap().armor = 0.3;
            arena.apply_armor_shred(id, 0.2, 2.0);

            let dealt = arena.take_damage(id, 10.0);
            assert!((dealt - 9.0).abs() < 1e-5);
        }

        #[test]
        fn overkill_reports_remaining_hp() {
            let mut arena = Arena::new();
            let id = arena.spawn(Vec2::ZERO, 6.0);
            assert!((arena.take_damage(id, 10.0) - 6.0).abs() < 1e-6);
            assert!(!arena.get(id).unwrap().alive);
            assert_eq!(arena.take_damage(id, 10.0), 0.0);
        }

        #[test]
        fn unknown_enemy_takes_no_damage() {
            let mut arena = Arena::new();
            assert_eq!(arena.take_damage(EnemyId::new(42), 10.0), 0.0);
        }
    }

    mod status_tests {
        use super::*;

        #[test]
        fn strongest_slow_wins_with_longest_duration() {
            let mut arena = Arena::new();
            let id = arena.spawn(Vec2::ZERO, 10.0);
            arena.apply_slow(id, 0.5, 1.0);
            arena.apply_slow(id, 0.7, 3.0);

            let slow = arena.enemy(id).unwrap().slow().unwrap();
            assert!((slow.magnitude - 0.5).abs() < 1e-6);
            assert!((slow.remaining - 3.0).abs() < 1e-6);
        }

        #[test]
        fn burns_from_the_same_source_refresh() {
            let mut arena = Arena::new();
            let id = arena.spawn(Vec2::ZERO, 100.0);
            arena.apply_burn(id, 5.0, 2.0, &tag(1));
            arena.apply_burn(id, 8.0, 1.0, &tag(1));
            arena.apply_burn(id, 3.0, 2.0, &tag(2));

            let enemy = arena.enemy(id).unwrap();
            assert!((enemy.burn_from(&tag(1)).unwrap().magnitude - 8.0).abs() < 1e-6);
            assert!(enemy.burn_from(&tag(2)).is_some());
        }

        #[test]
        fn burn_ticks_and_attributes_damage() {
            let mut arena = Arena::new();
            let id = arena.spawn(Vec2::ZERO, 100.0);
            arena.apply_burn(id, 10.0, 1.0, &tag(1));
            let mut log = EventLog::new();

            arena.tick_statuses(0.5, &mut log);
            arena.tick_statuses(0.5, &mut log);
            arena.tick_statuses(0.5, &mut log);

            assert!((arena.get(id).unwrap().hp - 90.0).abs() < 1e-4);
            assert!((log.damage_by(&tag(1)) - 10.0).abs() < 1e-4);
            assert!(!arena
                .enemy(id)
                .unwrap()
                .status_flags()
                .contains(StatusFlags::BURNING));
        }

        #[test]
        fn shock_stops_movement_until_expired() {
            let mut arena = Arena::new();
            let id = arena.spawn(Vec2::ZERO, 10.0);
            arena.apply_shock(id, 0.5);
            assert_eq!(arena.enemy(id).unwrap().speed_multiplier(), 0.0);

            arena.tick_statuses(0.6, &mut EventLog::new());
            assert_eq!(arena.enemy(id).unwrap().speed_multiplier(), 1.0);
        }

        #[test]
        fn knockback_applies_once_per_source() {
            let mut arena = Arena::new();
            let id = arena.spawn(Vec2::ZERO, 10.0);
            arena.get_mut(id).unwrap().progress = 5.0;

            assert!(arena.apply_knockback(id, 1.0, &tag(1)));
            assert!(!arena.apply_knockback(id, 1.0, &tag(1)));
            assert!(arena.apply_knockback(id, 1.0, &tag(2)));

            assert!((arena.get(id).unwrap().progress - 3.0).abs() < 1e-6);
        }

        #[test]
        fn knockback_clamps_at_path_start() {
            let mut arena = Arena::new();
            let id = arena.spawn(Vec2::ZERO, 10.0);
            arena.get_mut(id).unwrap().progress = 0.5;
            assert!(arena.apply_knockback(id, 2.0, &tag(1)));
            assert_eq!(arena.get(id).unwrap().progress, 0.0);
        }

        #[test]
        fn statuses_on_dead_enemies_are_ignored() {
            let mut arena = Arena::new();
            let id = arena.spawn(Vec2::ZERO, 1.0);
            arena.take_damage(id, 5.0);
            arena.apply_slow(id, 0.5, 1.0);
            assert!(arena.enemy(id).unwrap().status_flags().is_empty());
        }
    }
}
