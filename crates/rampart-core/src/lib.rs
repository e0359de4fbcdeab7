//! # Rampart Core
//!
//! Combat-resolution core for a grid-based tower-defense simulation.
//!
//! This crate decides who gets shot, how projectiles travel and how damage and
//! status effects land. Rendering, input, audio, pathing and enemy movement
//! live outside; enemies are reached only through the [`enemy::Enemies`]
//! trait.
//!
//! ## Architecture
//!
//! - **Targeting**: pure selection over in-range enemies ([`targeting`])
//! - **Towers**: level stats and a fire state machine ([`tower`]), owned by a
//!   registry that handles placement economics and grid occupancy
//!   ([`registry`])
//! - **Projectiles**: homing, single-impact shots with last-known-position
//!   fallback ([`projectile`])
//! - **Delivery**: direct, splash, chain and fork-chain damage
//!   ([`delivery`])
//! - **Simulation**: fixed tick order and a seeded RNG ([`simulation`])
//!
//! ## Usage
//!
//! ```
//! use glam::Vec2;
//! use rampart_core::arena::Arena;
//! use rampart_core::economy::Treasury;
//! use rampart_core::event::EventLog;
//! use rampart_core::simulation::Simulation;
//!
//! let mut sim = Simulation::builtin(7)?;
//! let mut gold = Treasury::new(200);
//! let mut log = EventLog::new();
//! let buildable = |gx: i32, gy: i32| gx >= 0 && gy >= 0;
//!
//! let tower = sim
//!     .registry_mut()
//!     .place("cannon", 2, 2, &mut gold, &buildable, &mut log)
//!     .expect("cell is free and affordable");
//!
//! let mut arena = Arena::new();
//! arena.spawn(Vec2::new(140.0, 100.0), 80.0);
//! for _ in 0..30 {
//!     sim.step(1.0 / 30.0, &mut arena, &mut log);
//! }
//!
//! assert!(log.damage_by(&sim.registry().get(tower).unwrap().tag()) > 0.0);
//! # Ok::<(), rampart_core::error::ConfigError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

// Collaborators
pub mod arena;
pub mod economy;
pub mod enemy;

// Configuration and shared types
pub mod config;
pub mod error;
pub mod event;
pub mod source;

// Combat core
pub mod delivery;
pub mod projectile;
pub mod registry;
pub mod simulation;
pub mod targeting;
pub mod tower;

#[cfg(test)]
mod tests;
