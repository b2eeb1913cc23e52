//! Game state snapshot: the visible state handed to the frontend each tick.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::events::GameEvent;
use crate::types::{Position, SimTime};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameStateSnapshot {
    pub time: SimTime,
    pub phase: GamePhase,
    pub level: Level,
    /// Current level script clock (seconds, may be negative in the lead-in).
    pub script_time: f32,
    pub player: PlayerView,
    pub enemies: Vec<EnemyView>,
    pub squadrons: u32,
    pub pickups: u32,
    pub bullets: u32,
    pub events: Vec<GameEvent>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerView {
    pub position: Position,
    pub lives: u32,
    pub bombs: u32,
    pub score: u32,
    pub power_level: PowerLevel,
    pub shielded: bool,
    pub invulnerable: bool,
    pub level_finished: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyView {
    pub kind: ShipKind,
    pub position: Position,
    pub health: u32,
    pub max_health: u32,
    pub tinted: bool,
    pub exploding: bool,
}
