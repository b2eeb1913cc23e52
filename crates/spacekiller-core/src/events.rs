//! Events emitted by the simulation for the host (audio, services, UI).
//!
//! Every collaborator call made during a tick is also recorded here and
//! returned in the snapshot, so a frontend can replay them.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::types::Position;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GameEvent {
    /// Sound effect to play.
    Sound { sound: SoundId, volume: Option<f32> },
    /// Player score changed.
    ScoreUpdated { delta: u32, total: u32 },
    /// Player lost a life.
    LifeLost { remaining: u32 },
    /// Player picked up a bomb.
    BombObtained { bombs: u32 },
    /// Lives and bombs were restored after a continue.
    LivesAndBombsRestored { lives: u32, bombs: u32 },
    /// Achievement unlocked.
    AchievementUnlocked { achievement: Achievement },
    /// Final score submitted to the score service.
    ScoreSubmitted { score: u32 },
    /// A squadron was wiped out and its reward dispatched.
    SquadronBonus { bonus: u32, position: Position },
    /// Boss crossed its low-health threshold.
    BossTinted,
    /// Camera shake request.
    ScreenShake { intensity: f32, duration: f32 },
    /// Level complete; the host moves on to `next`.
    NextLevel { from: Level, next: Level },
    /// Host should show a screen.
    GoToScreen { screen: Screen },
}
