//! Player commands sent from the frontend to the simulation.
//!
//! Commands are queued and processed at the next tick boundary.

use serde::{Deserialize, Serialize};

use crate::enums::Level;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlayerCommand {
    // --- Flow ---
    /// Start (or restart) a level from its script start.
    StartLevel { level: Level },
    /// Pause the simulation and the pausable clock.
    Pause,
    /// Resume the simulation.
    Resume,
    /// Continue after game over, if continues remain.
    ContinueWithExtraLife,
    /// Leave the level and go back to the menu.
    Quit,

    // --- Ship control ---
    /// Move the player ship by (dx, dy), clamped to the screen.
    Move { dx: f32, dy: f32 },
    /// Fire according to the current power level.
    Fire,
    /// Detonate a bomb: every enemy on screen takes an explosion hit.
    DropBomb,
}
