//! Entity spawn factories for setting up the simulation world.
//!
//! Every factory returns the spawned entity. Removal goes through
//! `remove_entity`, which stops an entity's motion before despawning it.

use glam::Vec2;
use hecs::{Entity, World};

use spacekiller_core::components::*;
use spacekiller_core::constants::*;
use spacekiller_core::enums::{PowerLevel, ShipKind};
use spacekiller_core::path::{MotionPath, PathFollower, Repeat, Waypoint};
use spacekiller_core::types::{Hitbox, Position, Velocity};

/// Spawn the player ship at its origin.
pub fn spawn_player(world: &mut World, player: Player) -> Entity {
    world.spawn((
        player,
        Position::new(PLAYER_ORIGIN_X, PLAYER_ORIGIN_Y),
        Hitbox::new(PLAYER_SIZE, PLAYER_SIZE),
    ))
}

/// Spawn one enemy following `path` from `start`.
pub fn spawn_enemy(
    world: &mut World,
    enemy: Enemy,
    start: Position,
    path: MotionPath,
) -> Entity {
    let hitbox = enemy.kind.stats().hitbox;
    world.spawn((enemy, start, hitbox, PathFollower::new(path)))
}

/// Spawn an explosion visual centred on `center`.
pub fn spawn_explosion(world: &mut World, center: Position) -> Entity {
    let half = EXPLOSION_SIZE / 2.0;
    world.spawn((
        Explosion {
            remaining_secs: EXPLOSION_LIFETIME,
        },
        Position::new(center.x - half, center.y - half),
        Hitbox::new(EXPLOSION_SIZE, EXPLOSION_SIZE),
    ))
}

/// Pickups drift straight down to `PICKUP_FLOOR_Y`, then disappear.
fn drifting_pickup(at: Position) -> (Position, Hitbox, PathFollower) {
    let floor = Position::new(at.x, PICKUP_FLOOR_Y);
    let path = MotionPath {
        origin: at,
        waypoints: vec![Waypoint::new(floor, PICKUP_DRIFT_SECS)],
        repeat: Repeat::Once,
    };
    (at, Hitbox::new(PICKUP_SIZE, PICKUP_SIZE), PathFollower::new(path))
}

pub fn spawn_power_up(world: &mut World, at: Position) -> Entity {
    let (pos, hitbox, follower) = drifting_pickup(at);
    world.spawn((PowerUp, pos, hitbox, follower))
}

pub fn spawn_shield_up(world: &mut World, at: Position) -> Entity {
    let (pos, hitbox, follower) = drifting_pickup(at);
    world.spawn((ShieldUp, pos, hitbox, follower))
}

pub fn spawn_bomb_up(world: &mut World, at: Position) -> Entity {
    let (pos, hitbox, follower) = drifting_pickup(at);
    world.spawn((BombUp, pos, hitbox, follower))
}

/// Floating bonus text. The caller schedules its removal.
pub fn spawn_score_text(world: &mut World, at: Position, value: u32) -> Entity {
    world.spawn((ScoreText { value }, at))
}

/// Shield bubble centred on the player. Replaces any existing shield.
pub fn spawn_shield(world: &mut World, player_center: Position) -> Entity {
    let existing: Vec<Entity> = world
        .query_mut::<&Shield>()
        .into_iter()
        .map(|(e, _)| e)
        .collect();
    for entity in existing {
        let _ = world.despawn(entity);
    }
    let half = SHIELD_SIZE / 2.0;
    world.spawn((
        Shield {
            remaining_secs: SHIELD_LIFETIME,
        },
        Position::new(player_center.x - half, player_center.y - half),
        Hitbox::new(SHIELD_SIZE, SHIELD_SIZE),
    ))
}

/// Fire a volley upward from the nose of the player ship.
pub fn spawn_player_bullets(
    world: &mut World,
    player_pos: Position,
    power: PowerLevel,
) -> Vec<Entity> {
    let speed = match power {
        PowerLevel::TripleVeryFast => PLAYER_BULLET_VELOCITY_FAST,
        _ => PLAYER_BULLET_VELOCITY,
    };
    let nose = Vec2::new(
        player_pos.x + PLAYER_SIZE / 2.0 - BULLET_SIZE / 2.0,
        player_pos.y + PLAYER_SIZE,
    );

    // (x offset, angle from vertical in degrees)
    let pattern: &[(f32, f32)] = match power.bullet_count() {
        1 => &[(0.0, 0.0)],
        2 => &[(-BULLET_SIZE, 0.0), (BULLET_SIZE, 0.0)],
        _ => &[
            (0.0, -PLAYER_BULLET_SPREAD),
            (0.0, 0.0),
            (0.0, PLAYER_BULLET_SPREAD),
        ],
    };

    pattern
        .iter()
        .map(|&(dx, angle)| {
            let dir = Vec2::from_angle(-angle.to_radians()).rotate(Vec2::Y);
            world.spawn((
                PlayerBullet,
                Removable,
                Position::new(nose.x + dx, nose.y),
                Velocity::from(dir * speed),
                Hitbox::new(BULLET_SIZE, BULLET_SIZE),
            ))
        })
        .collect()
}

/// Spawn one enemy bullet centred on `from` with the given velocity.
pub fn spawn_enemy_bullet(
    world: &mut World,
    from: Position,
    velocity: Vec2,
    squadron: Option<Entity>,
) -> Entity {
    let half = BULLET_SIZE / 2.0;
    world.spawn((
        EnemyBullet { squadron },
        Removable,
        Position::new(from.x - half, from.y - half),
        Velocity::from(velocity),
        Hitbox::new(BULLET_SIZE, BULLET_SIZE),
    ))
}

/// Enemy for a squadron slot. Saucers and ships only sometimes shoot.
pub fn enemy_for(kind: ShipKind, bullet_velocity: f32, coin: bool) -> Enemy {
    let can_attack = match kind {
        ShipKind::Soucoupe | ShipKind::Ship => coin,
        ShipKind::Asteroid => false,
        ShipKind::LaserShip | ShipKind::Tank | ShipKind::Boss => true,
    };
    Enemy::new(kind, bullet_velocity, can_attack)
}

/// Stop any motion the entity is running. Safe to call repeatedly.
pub fn cancel_motion(world: &mut World, entity: Entity) {
    let _ = world.remove_one::<PathFollower>(entity);
}

/// Stop the entity's motion, then despawn it. Returns false if the entity
/// was already gone.
pub fn remove_entity(world: &mut World, entity: Entity) -> bool {
    cancel_motion(world, entity);
    world.despawn(entity).is_ok()
}
