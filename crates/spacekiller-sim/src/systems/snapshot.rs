//! Snapshot system: builds a `GameStateSnapshot` from the ECS world.

use hecs::{Entity, World};

use spacekiller_core::components::*;
use spacekiller_core::enums::{GamePhase, Level};
use spacekiller_core::events::GameEvent;
use spacekiller_core::state::{EnemyView, GameStateSnapshot, PlayerView};
use spacekiller_core::types::{Position, SimTime};

use crate::systems::combat::has;

pub fn build_snapshot(
    world: &World,
    player: Entity,
    time: &SimTime,
    phase: GamePhase,
    level: Level,
    script_time: f32,
    events: Vec<GameEvent>,
) -> GameStateSnapshot {
    GameStateSnapshot {
        time: *time,
        phase,
        level,
        script_time,
        player: build_player(world, player),
        enemies: build_enemies(world),
        squadrons: world.query::<&Squadron>().iter().count() as u32,
        pickups: (world.query::<&PowerUp>().iter().count()
            + world.query::<&ShieldUp>().iter().count()
            + world.query::<&BombUp>().iter().count()) as u32,
        bullets: (world.query::<&PlayerBullet>().iter().count()
            + world.query::<&EnemyBullet>().iter().count()) as u32,
        events,
    }
}

fn build_player(world: &World, player: Entity) -> PlayerView {
    let Ok(p) = world.get::<&Player>(player) else {
        return PlayerView::default();
    };
    PlayerView {
        position: world
            .get::<&Position>(player)
            .map(|pos| *pos)
            .unwrap_or_default(),
        lives: p.lives,
        bombs: p.bombs,
        score: p.score,
        power_level: p.power_level,
        shielded: world.query::<&Shield>().iter().next().is_some(),
        invulnerable: has::<Invulnerable>(world, player),
        level_finished: has::<LevelFinished>(world, player),
    }
}

fn build_enemies(world: &World) -> Vec<EnemyView> {
    world
        .query::<(&Enemy, &Position, Option<&BossTint>, Option<&BossExploding>)>()
        .iter()
        .map(|(_, (enemy, pos, tint, exploding))| EnemyView {
            kind: enemy.kind,
            position: *pos,
            health: enemy.health,
            max_health: enemy.max_health,
            tinted: tint.is_some(),
            exploding: exploding.is_some(),
        })
        .collect()
}
