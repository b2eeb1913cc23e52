//! Seams to the collaborators the core calls into: the player bookkeeping
//! listener and the game host (sound, score service, stage transitions).

use spacekiller_core::components::Player;
use spacekiller_core::enums::{Achievement, Level, Screen, SoundId};
use spacekiller_core::events::GameEvent;

/// Owns score and life bookkeeping for the player.
pub trait PlayerListener {
    fn update_score(&mut self, player: &mut Player, delta: u32);
    fn lose_live(&mut self, player: &mut Player);
    fn new_bomb_obtained(&mut self, player: &mut Player);
    fn update_lives_and_bombs_after_continue(&mut self, player: &mut Player);
}

/// Host services. Every method is fire-and-forget; the defaults do nothing.
pub trait GameHost {
    fn play_sound(&mut self, _sound: SoundId, _volume: Option<f32>) {}
    fn unlock_achievement(&mut self, _achievement: Achievement) {}
    fn submit_score(&mut self, _score: u32) {}
    fn next_level(&mut self, _from: Level, _next: Level) {}
    fn go_to_screen(&mut self, _screen: Screen) {}
}

/// Host that ignores every call (headless runs and tests).
#[derive(Debug, Default)]
pub struct NullHost;

impl GameHost for NullHost {}

/// Forward one recorded event to the matching host call.
pub fn dispatch(host: &mut dyn GameHost, event: &GameEvent) {
    match *event {
        GameEvent::Sound { sound, volume } => host.play_sound(sound, volume),
        GameEvent::AchievementUnlocked { achievement } => host.unlock_achievement(achievement),
        GameEvent::ScoreSubmitted { score } => host.submit_score(score),
        GameEvent::NextLevel { from, next } => host.next_level(from, next),
        GameEvent::GoToScreen { screen } => host.go_to_screen(screen),
        _ => {}
    }
}

/// Standard bookkeeping: lives, bombs and score live on the `Player`
/// component. Losing a life also drops one power level.
#[derive(Debug, Clone)]
pub struct DefaultPlayerListener {
    /// Lives restored by a continue.
    pub lives: u32,
    /// Bombs restored by a continue.
    pub bombs: u32,
}

impl DefaultPlayerListener {
    pub fn new(lives: u32, bombs: u32) -> Self {
        Self { lives, bombs }
    }
}

impl PlayerListener for DefaultPlayerListener {
    fn update_score(&mut self, player: &mut Player, delta: u32) {
        player.score = player.score.saturating_add(delta);
    }

    fn lose_live(&mut self, player: &mut Player) {
        player.lives = player.lives.saturating_sub(1);
        player.power_level = player.power_level.previous();
        if player.lives == 0 {
            player.game_over = true;
        }
    }

    fn new_bomb_obtained(&mut self, player: &mut Player) {
        player.bombs += 1;
    }

    fn update_lives_and_bombs_after_continue(&mut self, player: &mut Player) {
        player.lives = self.lives;
        player.bombs = self.bombs;
        player.game_over = false;
    }
}
