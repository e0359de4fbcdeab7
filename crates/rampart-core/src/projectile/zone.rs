//! Scorch zones left behind by heavy splash hits.

use std::collections::BTreeSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::delivery::deal_damage;
use crate::enemy::Enemies;
use crate::event::EventSink;
use crate::source::SourceTag;

/// A burning circle that damages every living enemy inside it each tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScorchZone {
    /// Owning source; a source owns at most one zone
    pub source: SourceTag,
    /// Centre in pixels
    pub position: Vec2,
    /// Radius in pixels
    pub radius: f32,
    /// Damage per second
    pub dps: f32,
    /// Seconds left
    pub remaining: f32,
}

impl ScorchZone {
    /// Returns true while the zone still burns.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.remaining > 0.0
    }

    /// Burns for `dt` seconds (capped at the remaining lifetime).
    pub(crate) fn tick(&mut self, dt: f32, enemies: &mut dyn Enemies, sink: &mut dyn EventSink) {
        let burn = dt.min(self.remaining);
        if burn > 0.0 {
            let inside = enemies.enemies_near(self.position, self.radius, &BTreeSet::new());
            for enemy in inside {
                deal_damage(enemies, sink, &self.source, enemy.id, self.dps * burn);
            }
        }
        self.remaining -= dt;
    }
}
