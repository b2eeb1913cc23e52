//! Per-tick systems, run by `SimulationEngine` in a fixed order:
//! motion, movement, effects, collision/combat, squadron sweep, attack,
//! cleanup.

pub mod attack;
pub mod cleanup;
pub mod collision;
pub mod combat;
pub mod effects;
pub mod motion;
pub mod movement;
pub mod snapshot;
pub mod squadron;
