//! ECS components for hecs entities.
//!
//! Components are plain data. The few methods here only enforce a
//! component's own invariants (health clamping, squadron membership);
//! game logic lives in systems.

use hecs::Entity;
use serde::{Deserialize, Serialize};

use crate::enums::{PowerLevel, ShipKind};
use crate::types::Position;

/// Any enemy: saucer, ship, asteroid, laser ship, tank or boss.
/// Kinds differ only by the stats and flags set here.
#[derive(Debug, Clone)]
pub struct Enemy {
    pub kind: ShipKind,
    pub points: u32,
    pub health: u32,
    pub max_health: u32,
    pub bullet_velocity: f32,
    pub is_boss: bool,
    pub is_tank: bool,
    pub is_laser_ship: bool,
    pub can_attack: bool,
    /// Owning squadron. A relation only: the squadron's lifetime is governed
    /// by its member set, never by this handle.
    pub squadron: Option<Entity>,
}

impl Enemy {
    pub fn new(kind: ShipKind, bullet_velocity: f32, can_attack: bool) -> Self {
        let stats = kind.stats();
        Self {
            kind,
            points: stats.points,
            health: stats.health,
            max_health: stats.health,
            bullet_velocity,
            is_boss: kind == ShipKind::Boss,
            is_tank: kind == ShipKind::Tank,
            is_laser_ship: kind == ShipKind::LaserShip,
            can_attack,
            squadron: None,
        }
    }

    pub fn is_dead(&self) -> bool {
        self.health == 0
    }

    /// Remaining health as a fraction of max health (0.0 - 1.0).
    pub fn remaining_fraction(&self) -> f32 {
        if self.max_health == 0 {
            return 0.0;
        }
        self.health as f32 / self.max_health as f32
    }

    /// Apply `damage`, saturating at zero.
    pub fn hit(&mut self, damage: u32) {
        self.health = self.health.saturating_sub(damage).min(self.max_health);
    }
}

/// A formation of enemies sharing a collective destruction reward.
#[derive(Debug, Clone, Default)]
pub struct Squadron {
    pub members: Vec<Entity>,
    pub power_up_after_destruction: bool,
    pub display_bonus: bool,
    pub score_bonus: u32,
    /// Where the most recently removed member was; rewards spawn here.
    pub last_killed_position: Position,
    /// Raised by the attack system while a member is winding up a shot.
    pub attack_pending: bool,
}

impl Squadron {
    pub fn new(power_up_after_destruction: bool, display_bonus: bool, score_bonus: u32) -> Self {
        Self {
            power_up_after_destruction,
            display_bonus,
            score_bonus,
            ..Default::default()
        }
    }

    pub fn add_members(&mut self, entities: &[Entity]) {
        for &entity in entities {
            if !self.members.contains(&entity) {
                self.members.push(entity);
            }
        }
    }

    /// Drop `entity` from the member set. Returns false if it was not a member.
    pub fn remove_member(&mut self, entity: Entity, at: Position) -> bool {
        match self.members.iter().position(|&m| m == entity) {
            Some(index) => {
                self.members.swap_remove(index);
                self.last_killed_position = at;
                true
            }
            None => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Player state. Score and lives are mutated through the player listener.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub lives: u32,
    pub bombs: u32,
    pub score: u32,
    pub power_level: PowerLevel,
    pub enemies_killed: u32,
    pub laser_ships_killed: u32,
    pub continues: u32,
    /// Script second the level restarts from after a continue.
    pub checkpoint_second: i32,
    pub game_over: bool,
}

impl Player {
    pub fn new(lives: u32, bombs: u32, continues: u32) -> Self {
        Self {
            lives,
            bombs,
            score: 0,
            power_level: PowerLevel::Normal,
            enemies_killed: 0,
            laser_ships_killed: 0,
            continues,
            checkpoint_second: 0,
            game_over: false,
        }
    }
}

/// Marks a bullet fired by the player.
#[derive(Debug, Clone, Copy)]
pub struct PlayerBullet;

/// A bullet fired by an enemy. While it is in flight it keeps the
/// shooter's squadron attack outstanding.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnemyBullet {
    pub squadron: Option<Entity>,
}

/// Pickup raising the player's power level.
#[derive(Debug, Clone, Copy)]
pub struct PowerUp;

/// Pickup granting a temporary shield.
#[derive(Debug, Clone, Copy)]
pub struct ShieldUp;

/// Pickup granting an extra bomb.
#[derive(Debug, Clone, Copy)]
pub struct BombUp;

/// Entity is removed once it drifts off screen.
#[derive(Debug, Clone, Copy)]
pub struct Removable;

/// Short-lived explosion visual.
#[derive(Debug, Clone, Copy)]
pub struct Explosion {
    pub remaining_secs: f32,
}

/// Shield surrounding the player.
#[derive(Debug, Clone, Copy)]
pub struct Shield {
    pub remaining_secs: f32,
}

/// Floating squadron bonus text; removed by a scheduled task.
#[derive(Debug, Clone, Copy)]
pub struct ScoreText {
    pub value: u32,
}

/// Player ignores hits. `None` lasts until explicitly removed.
#[derive(Debug, Clone, Copy)]
pub struct Invulnerable {
    pub remaining_secs: Option<f32>,
}

/// Blinks the entity's sprite: visible/hidden every `half_period` seconds.
#[derive(Debug, Clone, Copy)]
pub struct Flicker {
    pub half_period: f32,
    pub elapsed: f32,
    pub visible: bool,
}

impl Flicker {
    pub fn new(half_period: f32) -> Self {
        Self {
            half_period,
            elapsed: 0.0,
            visible: true,
        }
    }
}

/// The boss crossed the low-health threshold and is tinted red.
#[derive(Debug, Clone, Copy)]
pub struct BossTint;

/// Boss is playing its death choreography.
#[derive(Debug, Clone, Copy)]
pub struct BossExploding {
    pub elapsed: f32,
    pub duration: f32,
}

/// Player finished the level; hits and input are ignored.
#[derive(Debug, Clone, Copy)]
pub struct LevelFinished;

/// Enemy decided to fire and is winding up.
#[derive(Debug, Clone, Copy)]
pub struct AttackWindup {
    pub remaining_secs: f32,
}
