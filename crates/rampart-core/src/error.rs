//! Error types for configuration loading and registry operations.
//!
//! Expected negative outcomes (occupied cells, max-level upgrades) are
//! ordinary results in the public API: the sentinel-returning operations
//! (`place`, `upgrade_tower`) wrap the typed `try_*` variants that return
//! these errors.

use thiserror::Error;

use crate::tower::{CellCoord, TowerId};

/// Errors raised while loading or validating combat configuration.
///
/// These are load-time failures. Nothing in the per-tick path produces them.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The JSON document could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// A tower type declares no levels.
    #[error("tower type `{kind}` has no levels")]
    NoLevels {
        /// Offending tower type key
        kind: String,
    },

    /// A tower type has a zero placement cost.
    #[error("tower type `{kind}` has zero cost")]
    ZeroCost {
        /// Offending tower type key
        kind: String,
    },

    /// A level entry carries an out-of-range value.
    #[error("tower type `{kind}` level {level}: {field} = {value} ({reason})")]
    InvalidStat {
        /// Offending tower type key
        kind: String,
        /// Zero-based level index
        level: usize,
        /// Field name as written in the stat table
        field: &'static str,
        /// Value that failed validation
        value: f32,
        /// Human-readable constraint
        reason: &'static str,
    },

    /// A global combat setting is out of range.
    #[error("combat config: {field} = {value} ({reason})")]
    InvalidSetting {
        /// Field name
        field: &'static str,
        /// Value that failed validation
        value: f32,
        /// Human-readable constraint
        reason: &'static str,
    },
}

/// Reasons a tower placement is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlacementError {
    /// The stat table has no entry for the requested type.
    #[error("unknown tower type `{0}`")]
    UnknownTowerType(String),

    /// The map reports the cell as not buildable.
    #[error("cell {0} is not buildable")]
    NotBuildable(CellCoord),

    /// Another tower already stands on the cell.
    #[error("cell {cell} is occupied by tower {tower}")]
    Occupied {
        /// Requested cell
        cell: CellCoord,
        /// Tower already occupying it
        tower: TowerId,
    },

    /// The economy cannot cover the placement cost.
    #[error("cannot afford {cost} gold")]
    InsufficientFunds {
        /// Placement cost
        cost: u32,
    },
}

/// Reasons a tower upgrade is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpgradeError {
    /// The registry does not track this tower.
    #[error("tower {0} is not registered")]
    UnknownTower(TowerId),

    /// The tower is already at its last level.
    #[error("tower {0} is at max level")]
    MaxLevel(TowerId),

    /// The economy cannot cover the upgrade cost.
    #[error("cannot afford upgrade costing {cost} gold")]
    InsufficientFunds {
        /// Upgrade cost
        cost: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placement_error_messages_name_the_cell() {
        let err = PlacementError::Occupied {
            cell: CellCoord::new(3, 4),
            tower: TowerId::new(7),
        };
        assert_eq!(err.to_string(), "cell (3, 4) is occupied by tower 7");
    }

    #[test]
    fn parse_errors_convert_from_serde_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: ConfigError = json_err.into();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().starts_with("failed to parse configuration"));
    }

    #[test]
    fn invalid_stat_reports_field_and_level() {
        let err = ConfigError::InvalidStat {
            kind: "arrow".to_string(),
            level: 2,
            field: "fire_rate",
            value: 0.0,
            reason: "must be positive",
        };
        assert_eq!(
            err.to_string(),
            "tower type `arrow` level 2: fire_rate = 0 (must be positive)"
        );
    }
}
