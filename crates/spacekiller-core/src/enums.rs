//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

use crate::types::Hitbox;

/// Player weapon level, in escalation order.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum PowerLevel {
    #[default]
    Normal,
    Double,
    Triple,
    TripleVeryFast,
}

impl PowerLevel {
    /// One step up, saturating at `TripleVeryFast`.
    pub fn next(self) -> Self {
        match self {
            PowerLevel::Normal => PowerLevel::Double,
            PowerLevel::Double => PowerLevel::Triple,
            PowerLevel::Triple | PowerLevel::TripleVeryFast => PowerLevel::TripleVeryFast,
        }
    }

    /// One step down, saturating at `Normal`.
    pub fn previous(self) -> Self {
        match self {
            PowerLevel::Normal | PowerLevel::Double => PowerLevel::Normal,
            PowerLevel::Triple => PowerLevel::Double,
            PowerLevel::TripleVeryFast => PowerLevel::Triple,
        }
    }

    /// Bullets fired per shot.
    pub fn bullet_count(self) -> usize {
        match self {
            PowerLevel::Normal => 1,
            PowerLevel::Double => 2,
            PowerLevel::Triple | PowerLevel::TripleVeryFast => 3,
        }
    }
}

/// Enemy kinds. All share a single `Enemy` component; the kind only selects
/// stats and flags at spawn time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShipKind {
    Soucoupe,
    Ship,
    Asteroid,
    LaserShip,
    Tank,
    Boss,
}

/// Spawn-time stats for a ship kind.
#[derive(Debug, Clone, Copy)]
pub struct ShipStats {
    pub points: u32,
    pub health: u32,
    pub hitbox: Hitbox,
}

impl ShipKind {
    pub fn stats(self) -> ShipStats {
        let (points, health, w, h) = match self {
            ShipKind::Soucoupe => (100, 1, 32.0, 32.0),
            ShipKind::Ship => (200, 2, 32.0, 32.0),
            ShipKind::Asteroid => (50, 3, 40.0, 40.0),
            ShipKind::LaserShip => (300, 6, 48.0, 48.0),
            ShipKind::Tank => (500, 10, 48.0, 48.0),
            ShipKind::Boss => (500, 100, 128.0, 96.0),
        };
        ShipStats {
            points,
            health,
            hitbox: Hitbox::new(w, h),
        }
    }
}

/// Motion-type tag of a squadron formation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MotionKind {
    LinearX,
    LinearY,
    LinearXY,
    SemiCircle,
    BezierSpline,
    CatmullRomSpline,
    ArrowUp,
    ArrowDown,
    BossMove,
}

/// Game levels, played in a loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Level {
    #[default]
    Level1,
    Level2,
    Level3,
}

impl Level {
    pub fn next(self) -> Self {
        match self {
            Level::Level1 => Level::Level2,
            Level::Level2 => Level::Level3,
            Level::Level3 => Level::Level1,
        }
    }

    /// Achievement unlocked by killing this level's boss.
    pub fn boss_achievement(self) -> Achievement {
        match self {
            Level::Level1 => Achievement::KillBoss,
            Level::Level2 => Achievement::KillBoss2,
            Level::Level3 => Achievement::KillBoss3,
        }
    }
}

/// Achievements reported to the score service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Achievement {
    Kill50Enemies,
    Kill100Enemies,
    Kill500Enemies,
    KillLaserShip,
    Kill5LaserShips,
    KillBoss,
    KillBoss2,
    KillBoss3,
}

/// Sound effects the simulation asks the host to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundId {
    Explosion,
    BossFinished,
    PowerUp,
    PowerUpVoice,
    ShieldUp,
    BombUp,
    ShieldBullet,
    PlayerFire,
    EnemyFire,
    GameOver,
}

/// Screens the stage host can be asked to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Screen {
    Menu,
    GameOver,
}

/// Top-level game phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    #[default]
    MainMenu,
    Active,
    Paused,
    GameOver,
}

