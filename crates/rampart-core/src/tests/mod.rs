//! Crate-level tests that exercise several modules together.
//!
//! - `helpers.rs`: factories and test tracing setup
//! - `integration.rs`: placement, firing and impact scenarios end to end
//! - `determinism.rs`: same seed and inputs produce identical event logs
//! - `properties.rs`: `proptest` properties of flight and delivery

mod helpers;
mod integration;
