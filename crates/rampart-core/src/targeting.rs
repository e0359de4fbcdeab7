//! Target selection.
//!
//! [`select_target`] is a pure function: it filters candidates to those alive
//! and in range, then reduces them with the comparison for the chosen
//! [`TargetMode`]. The reduction is a left fold with a strict comparison, so
//! the first candidate in iteration order wins every tie.

use std::fmt;
use std::str::FromStr;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::enemy::EnemySnapshot;

/// Strategy a tower uses to pick among enemies in range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetMode {
    /// Furthest along the path
    #[default]
    First,
    /// Nearest to the tower
    Closest,
    /// Most hit points
    Strongest,
    /// Fewest hit points
    Weakest,
}

impl TargetMode {
    /// All modes in cycling order.
    pub const ALL: [Self; 4] = [Self::First, Self::Closest, Self::Strongest, Self::Weakest];

    /// The mode after this one, wrapping back to `First`.
    ///
    /// # Example
    ///
    /// ```
    /// use rampart_core::targeting::TargetMode;
    ///
    /// assert_eq!(TargetMode::First.next(), TargetMode::Closest);
    /// assert_eq!(TargetMode::Weakest.next(), TargetMode::First);
    /// ```
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::First => Self::Closest,
            Self::Closest => Self::Strongest,
            Self::Strongest => Self::Weakest,
            Self::Weakest => Self::First,
        }
    }

    /// Lowercase name used in config files.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::First => "first",
            Self::Closest => "closest",
            Self::Strongest => "strongest",
            Self::Weakest => "weakest",
        }
    }

    /// Returns true if `candidate` should replace `best`.
    fn prefers(self, candidate: &EnemySnapshot, best: &EnemySnapshot, origin: Vec2) -> bool {
        match self {
            Self::First => candidate.progress > best.progress,
            Self::Closest => {
                origin.distance_squared(candidate.position) < origin.distance_squared(best.position)
            }
            Self::Strongest => candidate.hp > best.hp,
            Self::Weakest => candidate.hp < best.hp,
        }
    }
}

impl fmt::Display for TargetMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown [`TargetMode`] name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown target mode: {0}")]
pub struct ParseTargetModeError(String);

impl FromStr for TargetMode {
    type Err = ParseTargetModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.name() == s)
            .ok_or_else(|| ParseTargetModeError(s.to_string()))
    }
}

/// Picks a target among `candidates`.
///
/// Only living candidates within `range_cells * cell_size` pixels of `origin`
/// are considered. Ties keep the earliest candidate.
///
/// # Example
///
/// ```
/// use glam::Vec2;
/// use rampart_core::enemy::{EnemyId, EnemySnapshot};
/// use rampart_core::targeting::{select_target, TargetMode};
///
/// let enemy = |id, x, progress| EnemySnapshot {
///     id: EnemyId::new(id),
///     alive: true,
///     position: Vec2::new(x, 0.0),
///     hp: 10.0,
///     radius: 8.0,
///     progress,
/// };
/// let candidates = [enemy(0, 40.0, 1.0), enemy(1, 80.0, 3.0), enemy(2, 400.0, 9.0)];
///
/// let picked = select_target(&candidates, Vec2::ZERO, 3.0, 40.0, TargetMode::First);
/// assert_eq!(picked.map(|e| e.id), Some(EnemyId::new(1)));
/// ```
#[must_use]
pub fn select_target(
    candidates: &[EnemySnapshot],
    origin: Vec2,
    range_cells: f32,
    cell_size: f32,
    mode: TargetMode,
) -> Option<EnemySnapshot> {
    let range_px = range_cells * cell_size;
    let range_sq = range_px * range_px;

    candidates
        .iter()
        .filter(|enemy| enemy.alive && origin.distance_squared(enemy.position) <= range_sq)
        .fold(None, |best: Option<&EnemySnapshot>, candidate| match best {
            Some(current) if !mode.prefers(candidate, current, origin) => Some(current),
            _ => Some(candidate),
        })
        .copied()
}
