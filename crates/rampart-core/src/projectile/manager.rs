//! Owner of the live projectile set.

use rand::RngCore;
use tracing::debug;

use crate::config::CombatConfig;
use crate::delivery::ImpactContext;
use crate::enemy::{Enemies, EnemySnapshot};
use crate::event::{CombatEvent, EventSink};
use crate::source::ProjectileSource;

use super::{Projectile, ProjectileId, ScorchZone};

/// Spawns, advances and reaps projectiles.
///
/// # Update Order
///
/// 1. Scorch zones burn (a zone ignited this tick first burns next tick).
/// 2. Every live projectile advances in spawn order; arrivals resolve their
///    impact.
/// 3. Spent projectiles are reaped in a post-pass, then newly ignited zones
///    are installed.
///
/// Projectiles spawned before [`update`](Self::update) in the same tick are
/// advanced by it, so a fast shot fired at point-blank range lands on the tick
/// it was fired.
#[derive(Debug, Clone, Default)]
pub struct ProjectileManager {
    live: Vec<Projectile>,
    zones: Vec<ScorchZone>,
    next_id: u64,
}

impl ProjectileManager {
    /// Creates an empty manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Launches a projectile from `source` at `target`.
    ///
    /// Any projectile source works here: towers pass
    /// [`Tower::as_source`](crate::tower::Tower::as_source), other attackers
    /// build a [`ProjectileSource`] directly.
    pub fn spawn(
        &mut self,
        source: &ProjectileSource,
        target: &EnemySnapshot,
        heavy: bool,
    ) -> ProjectileId {
        let id = ProjectileId::new(self.next_id);
        self.next_id += 1;
        self.live.push(Projectile::new(id, source, target, heavy));
        id
    }

    /// Runs one tick.
    ///
    /// # Arguments
    ///
    /// * `dt` - Seconds since the last tick
    /// * `enemies` - Enemy collaborator receiving damage and statuses
    /// * `rng` - Source of crit and shock rolls
    /// * `config` - Cell size and heavy-round scaling
    /// * `sink` - Receives combat events
    pub fn update(
        &mut self,
        dt: f32,
        enemies: &mut dyn Enemies,
        rng: &mut dyn RngCore,
        config: &CombatConfig,
        sink: &mut dyn EventSink,
    ) {
        for zone in &mut self.zones {
            zone.tick(dt, enemies, sink);
        }
        self.zones.retain(ScorchZone::is_active);

        let mut ignited = Vec::new();
        let mut ctx = ImpactContext::new(enemies, rng, config, sink);
        for projectile in &mut self.live {
            if let Some(report) = projectile.update(dt, &mut ctx) {
                ignited.extend(report.scorch);
            }
        }

        self.live.retain(|projectile| !projectile.is_spent());

        for zone in ignited {
            debug!(source = %zone.source, radius = zone.radius, dps = zone.dps, "scorch ignited");
            ctx.sink.record(CombatEvent::ScorchIgnited {
                source: zone.source.clone(),
                position: zone.position,
                radius: zone.radius,
                dps: zone.dps,
                duration: zone.remaining,
            });
            self.zones.retain(|existing| existing.source != zone.source);
            self.zones.push(zone);
        }
    }

    /// Live projectiles in spawn order.
    #[must_use]
    pub fn projectiles(&self) -> &[Projectile] {
        &self.live
    }

    /// Projectile by id, while it is live.
    #[must_use]
    pub fn get(&self, id: ProjectileId) -> Option<&Projectile> {
        self.live.iter().find(|projectile| projectile.id() == id)
    }

    /// Active scorch zones.
    #[must_use]
    pub fn zones(&self) -> &[ScorchZone] {
        &self.zones
    }

    /// Number of live projectiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live.len()
    }

    /// Returns true if no projectile is in flight.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Drops every projectile and zone. The id counter keeps running.
    pub fn clear(&mut self) {
        self.live.clear();
        self.zones.clear();
    }
}
