//! Combat events and the sinks that receive them.
//!
//! Events are the side-effect surface of the core: particle spawns, sounds,
//! screen-shake and scoring hang off them. They are emitted at fixed points
//! (fire, crit, explosion, hop, sale, upgrade) but are not part of the
//! simulation state. Damage attribution for scoring travels as
//! [`CombatEvent::DamageDealt`].

use std::collections::BTreeMap;

use bitflags::bitflags;
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::delivery::DeliveryKind;
use crate::enemy::EnemyId;
use crate::projectile::ProjectileId;
use crate::source::SourceTag;
use crate::tower::{CellCoord, TowerId};

bitflags! {
    /// Feedback flags attached to an impact.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct HitFlags: u8 {
        /// Damage was multiplied by a critical roll
        const CRITICAL = 0b0000_0001;
        /// The projectile was a heavy round
        const HEAVY = 0b0000_0010;
        /// The original target was gone at arrival
        const PHANTOM = 0b0000_0100;
    }
}

/// Status effects the core can request from the enemy collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusKind {
    /// Movement slow
    Slow,
    /// Damage over time
    Burn,
    /// Stun
    Shock,
    /// Armor reduction
    ArmorShred,
    /// One-time displacement along the path
    Knockback,
}

/// Something observable that happened during a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CombatEvent {
    /// A tower was placed and paid for.
    TowerPlaced {
        /// New tower
        tower: TowerId,
        /// Tower type key
        kind: String,
        /// Occupied cell
        cell: CellCoord,
        /// Gold spent
        cost: u32,
    },
    /// A tower reached a new level.
    TowerUpgraded {
        /// Upgraded tower
        tower: TowerId,
        /// Level after the upgrade
        level: usize,
        /// Gold spent
        cost: u32,
    },
    /// A tower was sold and removed.
    TowerSold {
        /// Removed tower
        tower: TowerId,
        /// Cell freed by the sale
        cell: CellCoord,
        /// Gold credited
        refund: u32,
    },
    /// A projectile left its source.
    ProjectileFired {
        /// New projectile
        projectile: ProjectileId,
        /// Firing source
        source: SourceTag,
        /// Acquired target
        target: EnemyId,
        /// Heavy round
        heavy: bool,
    },
    /// An impact rolled a critical hit.
    CriticalHit {
        /// Projectile that crit
        projectile: ProjectileId,
        /// Impact point
        position: Vec2,
        /// Damage after the multiplier
        damage: f32,
    },
    /// A splash detonated.
    Explosion {
        /// Impact point
        position: Vec2,
        /// Effective radius in pixels
        radius: f32,
        /// Heavy round
        heavy: bool,
        /// Number of enemies inside the radius
        hits: usize,
    },
    /// A sequential chain jumped between two enemies.
    ChainHop {
        /// Enemy the hop left from
        from: EnemyId,
        /// Enemy the hop landed on
        to: EnemyId,
        /// Damage the landing enemy will take
        damage: f32,
    },
    /// A fork-chain arc reached an enemy.
    ForkArc {
        /// Enemy that was struck
        target: EnemyId,
        /// Breadth-first wave index (0 is the primary target)
        wave: u32,
        /// 1-based global hit index
        hit_index: u32,
        /// Damage applied
        damage: f32,
    },
    /// A status effect was requested on an enemy.
    StatusApplied {
        /// Affected enemy
        target: EnemyId,
        /// Effect kind
        status: StatusKind,
    },
    /// Damage reached an enemy.
    DamageDealt {
        /// Attribution
        source: SourceTag,
        /// Damaged enemy
        target: EnemyId,
        /// Damage actually dealt, as reported by the collaborator
        amount: f32,
    },
    /// A heavy splash left a burning area behind.
    ScorchIgnited {
        /// Owning source
        source: SourceTag,
        /// Zone centre
        position: Vec2,
        /// Zone radius in pixels
        radius: f32,
        /// Damage per second
        dps: f32,
        /// Lifetime in seconds
        duration: f32,
    },
    /// A projectile finished its impact resolution.
    Impact {
        /// Resolved projectile
        projectile: ProjectileId,
        /// Impact point
        position: Vec2,
        /// Algorithm that ran
        delivery: DeliveryKind,
        /// Distinct enemies damaged
        hits: usize,
        /// Feedback flags
        flags: HitFlags,
    },
}

/// Receiver for combat events.
pub trait EventSink {
    /// Records one event.
    fn record(&mut self, event: CombatEvent);
}

/// Sink that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn record(&mut self, _event: CombatEvent) {}
}

/// Sink that keeps every event and aggregates damage per source.
///
/// # Example
///
/// ```
/// use rampart_core::event::{CombatEvent, EventLog, EventSink};
/// use rampart_core::enemy::EnemyId;
/// use rampart_core::source::SourceTag;
///
/// let mut log = EventLog::new();
/// log.record(CombatEvent::DamageDealt {
///     source: SourceTag::new("arrow", 0),
///     target: EnemyId::new(1),
///     amount: 10.0,
/// });
///
/// assert_eq!(log.damage_by(&SourceTag::new("arrow", 0)), 10.0);
/// assert_eq!(log.take_events().len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<CombatEvent>,
    damage_by_source: BTreeMap<SourceTag, f32>,
}

impl EventLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded events in emission order.
    #[must_use]
    pub fn events(&self) -> &[CombatEvent] {
        &self.events
    }

    /// Drains the recorded events. Damage totals are kept.
    pub fn take_events(&mut self) -> Vec<CombatEvent> {
        std::mem::take(&mut self.events)
    }

    /// Total damage attributed to `source` since creation.
    #[must_use]
    pub fn damage_by(&self, source: &SourceTag) -> f32 {
        self.damage_by_source.get(source).copied().unwrap_or(0.0)
    }

    /// Damage totals for every source that dealt damage, in source order.
    #[must_use]
    pub fn damage_totals(&self) -> &BTreeMap<SourceTag, f32> {
        &self.damage_by_source
    }

    /// Number of recorded events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns true if no events are recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Damage events aimed at `target`, in order.
    pub fn damage_to(&self, target: EnemyId) -> impl Iterator<Item = f32> + '_ {
        self.events.iter().filter_map(move |event| match event {
            CombatEvent::DamageDealt {
                target: t, amount, ..
            } if *t == target => Some(*amount),
            _ => None,
        })
    }
}

impl EventSink for EventLog {
    fn record(&mut self, event: CombatEvent) {
        if let CombatEvent::DamageDealt { source, amount, .. } = &event {
            *self.damage_by_source.entry(source.clone()).or_insert(0.0) += *amount;
        }
        self.events.push(event);
    }
}
