//! Simulation engine for SPACE KILLER.
//!
//! Owns the hecs ECS world, drives the level script, runs the per-tick
//! systems in a fixed order and produces `GameStateSnapshot`s.

pub mod clock;
pub mod engine;
pub mod error;
pub mod host;
pub mod level_script;
pub mod mask;
pub mod scripts;
pub mod squadrons;
pub mod systems;
pub mod world_setup;

pub use engine::{SimConfig, SimulationEngine};
pub use error::SimError;
pub use spacekiller_core as core;

#[cfg(test)]
mod tests;
