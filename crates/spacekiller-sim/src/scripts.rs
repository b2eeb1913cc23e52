//! Built-in level scripts.

use glam::Vec2;

use spacekiller_core::constants::{SCREEN_HEIGHT, SCREEN_WIDTH};
use spacekiller_core::enums::{Level, ShipKind};
use spacekiller_paths::formation::MotionSpec;

use crate::level_script::{ScriptCommand, ScriptEntry};
use crate::squadrons::SquadronSpec;

const W: f32 = SCREEN_WIDTH;
const H: f32 = SCREEN_HEIGHT;

/// Script entries for `level`. Later levels reuse the same choreography
/// with faster ships and bullets.
pub fn entries(level: Level) -> Vec<ScriptEntry> {
    match level {
        Level::Level1 => level_one(1.0),
        Level::Level2 => level_two(1.2),
        Level::Level3 => {
            let mut entries = level_one(1.4);
            entries.extend(level_two(1.4).into_iter().map(|mut e| {
                // Level 3 plays both waves back to back; the second half
                // starts after the first boss slot.
                e.second += 40;
                e
            }));
            entries.retain(|e| !is_boss(e) || e.second > 40);
            entries
        }
    }
}

fn is_boss(entry: &ScriptEntry) -> bool {
    matches!(&entry.command, ScriptCommand::Squadron(spec) if spec.ship == ShipKind::Boss)
}

fn level_one(speed: f32) -> Vec<ScriptEntry> {
    let v = |base: f32| base * speed;
    vec![
        ScriptEntry::squadron(
            0,
            SquadronSpec::new(ShipKind::Soucoupe, 5, MotionSpec::LinearY { x: 60.0, y: H }, v(150.0)),
        ),
        ScriptEntry::squadron(
            2,
            SquadronSpec::new(ShipKind::Soucoupe, 5, MotionSpec::LinearY { x: W - 92.0, y: H }, v(150.0))
                .with_bonus(500),
        ),
        ScriptEntry::squadron(
            5,
            SquadronSpec::new(ShipKind::Ship, 7, MotionSpec::ArrowDown, v(120.0))
                .with_bullet_velocity(v(200.0)),
        ),
        ScriptEntry::squadron(
            9,
            SquadronSpec::new(ShipKind::Soucoupe, 5, MotionSpec::SemiCircle { x: 0.0, y: H }, v(200.0))
                .with_power_up(),
        ),
        ScriptEntry::squadron(
            13,
            SquadronSpec::new(
                ShipKind::Asteroid,
                4,
                MotionSpec::LinearX {
                    x: -40.0,
                    y: 420.0,
                    direction: 1.0,
                },
                v(100.0),
            ),
        ),
        ScriptEntry::new(15, ScriptCommand::Checkpoint),
        ScriptEntry::new(16, ScriptCommand::BombUp { x: W / 2.0 }),
        ScriptEntry::squadron(
            17,
            SquadronSpec::new(
                ShipKind::Ship,
                4,
                MotionSpec::BezierSpline {
                    control_points: vec![
                        Vec2::new(20.0, H),
                        Vec2::new(W, H * 0.6),
                        Vec2::new(0.0, H * 0.3),
                        Vec2::new(W - 40.0, -60.0),
                    ],
                },
                v(160.0),
            )
            .with_power_up()
            .with_bonus(1000),
        ),
        ScriptEntry::squadron(
            21,
            SquadronSpec::new(ShipKind::LaserShip, 1, MotionSpec::LinearY { x: W / 2.0 - 24.0, y: H }, v(60.0))
                .with_bullet_velocity(v(250.0)),
        ),
        ScriptEntry::squadron(
            28,
            SquadronSpec::new(ShipKind::Boss, 1, MotionSpec::BossMove, v(80.0))
                .with_bullet_velocity(v(220.0)),
        ),
    ]
}

fn level_two(speed: f32) -> Vec<ScriptEntry> {
    let v = |base: f32| base * speed;
    vec![
        ScriptEntry::squadron(
            0,
            SquadronSpec::new(
                ShipKind::Ship,
                5,
                MotionSpec::CatmullRomSpline {
                    control_points: vec![
                        Vec2::new(W - 40.0, H),
                        Vec2::new(40.0, H * 0.7),
                        Vec2::new(W - 40.0, H * 0.4),
                        Vec2::new(40.0, -60.0),
                    ],
                },
                v(150.0),
            )
            .with_power_up(),
        ),
        ScriptEntry::squadron(
            4,
            SquadronSpec::new(ShipKind::Soucoupe, 7, MotionSpec::ArrowUp, v(130.0)).with_bonus(700),
        ),
        ScriptEntry::squadron(
            8,
            SquadronSpec::new(
                ShipKind::Soucoupe,
                6,
                MotionSpec::LinearX {
                    x: W,
                    y: 480.0,
                    direction: -1.0,
                },
                v(180.0),
            ),
        ),
        ScriptEntry::squadron(
            11,
            SquadronSpec::new(
                ShipKind::Ship,
                3,
                MotionSpec::LinearXY {
                    start: Vec2::new(0.0, H),
                    end: Vec2::new(W, -60.0),
                },
                v(140.0),
            )
            .with_power_up(),
        ),
        ScriptEntry::new(14, ScriptCommand::Checkpoint),
        ScriptEntry::squadron(
            15,
            SquadronSpec::new(ShipKind::Tank, 1, MotionSpec::LinearY { x: 40.0, y: H }, v(50.0))
                .with_bullet_velocity(v(200.0)),
        ),
        ScriptEntry::new(17, ScriptCommand::BombUp { x: 80.0 }),
        ScriptEntry::squadron(
            19,
            SquadronSpec::new(ShipKind::LaserShip, 1, MotionSpec::LinearY { x: W - 88.0, y: H }, v(60.0))
                .with_bullet_velocity(v(250.0)),
        ),
        ScriptEntry::squadron(
            23,
            SquadronSpec::new(ShipKind::Ship, 7, MotionSpec::ArrowDown, v(140.0)).with_power_up(),
        ),
        ScriptEntry::squadron(
            30,
            SquadronSpec::new(ShipKind::Boss, 1, MotionSpec::BossMove, v(90.0))
                .with_bullet_velocity(v(240.0)),
        ),
    ]
}
