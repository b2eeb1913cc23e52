//! Enemy attack intents.
//!
//! An enemy that decides to fire first winds up, then releases an aimed
//! bullet. While any member of a squadron is winding up, the squadron's
//! `attack_pending` flag is raised.

use glam::Vec2;
use hecs::{Entity, World};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use spacekiller_core::components::*;
use spacekiller_core::constants::*;
use spacekiller_core::enums::SoundId;
use spacekiller_core::events::GameEvent;
use spacekiller_core::types::{Hitbox, Position};

use crate::systems::combat::on_screen;
use crate::world_setup;

pub fn run(
    world: &mut World,
    rng: &mut ChaCha8Rng,
    player: Entity,
    dt: f32,
    events: &mut Vec<GameEvent>,
) {
    let target = match (world.get::<&Position>(player), world.get::<&Hitbox>(player)) {
        (Ok(pos), Ok(hitbox)) => Some(hitbox.center(&pos)),
        _ => None,
    };

    // Release shots whose wind-up is over.
    let mut ready = Vec::new();
    for (entity, windup) in world.query_mut::<&mut AttackWindup>() {
        windup.remaining_secs -= dt;
        if windup.remaining_secs <= 0.0 {
            ready.push(entity);
        }
    }
    for shooter in ready {
        let _ = world.remove_one::<AttackWindup>(shooter);
        if let Some(target) = target {
            fire(world, rng, shooter, target, events);
        }
    }

    // Roll new attacks.
    if target.is_some() {
        let mut starting = Vec::new();
        for (entity, (enemy, pos, hitbox)) in world
            .query::<(&Enemy, &Position, &Hitbox)>()
            .without::<&AttackWindup>()
            .without::<&BossExploding>()
            .iter()
        {
            if !enemy.can_attack || enemy.is_dead() || !on_screen(pos, hitbox) {
                continue;
            }
            let per_sec = if enemy.is_boss {
                BOSS_FIRE_CHANCE_PER_SEC
            } else {
                ENEMY_FIRE_CHANCE_PER_SEC
            };
            if rng.gen_bool((per_sec * dt as f64).clamp(0.0, 1.0)) {
                starting.push(entity);
            }
        }
        for entity in starting {
            let _ = world.insert_one(
                entity,
                AttackWindup {
                    remaining_secs: ATTACK_WINDUP_SECS,
                },
            );
        }
    }

    refresh_pending(world);
}

/// Recompute every squadron's `attack_pending` flag: a live member is
/// winding up, or one of the squadron's shots is still in flight. A
/// wind-up dies with its member.
pub fn refresh_pending(world: &mut World) {
    for (_entity, squadron) in world.query_mut::<&mut Squadron>() {
        squadron.attack_pending = false;
    }
    let mut pending: Vec<Entity> = world
        .query::<(&Enemy, &AttackWindup)>()
        .iter()
        .filter_map(|(_, (enemy, _))| enemy.squadron)
        .collect();
    pending.extend(
        world
            .query::<&EnemyBullet>()
            .iter()
            .filter_map(|(_, bullet)| bullet.squadron),
    );
    for squadron in pending {
        if let Ok(mut s) = world.get::<&mut Squadron>(squadron) {
            s.attack_pending = true;
        }
    }
}

fn fire(
    world: &mut World,
    rng: &mut ChaCha8Rng,
    shooter: Entity,
    target: Position,
    events: &mut Vec<GameEvent>,
) {
    let Ok((origin, speed, is_boss, squadron)) = world
        .query_one_mut::<(&Enemy, &Position, &Hitbox)>(shooter)
        .map(|(enemy, pos, hitbox)| {
            (hitbox.center(pos), enemy.bullet_velocity, enemy.is_boss, enemy.squadron)
        })
    else {
        return;
    };

    let aim = (target.to_vec2() - origin.to_vec2())
        .try_normalize()
        .unwrap_or(Vec2::NEG_Y);

    let angles: Vec<f32> = if is_boss {
        vec![-BOSS_FAN_ANGLE_DEG, 0.0, BOSS_FAN_ANGLE_DEG]
    } else {
        vec![rng.gen_range(-ENEMY_BULLET_SPREAD_DEG..=ENEMY_BULLET_SPREAD_DEG)]
    };
    for angle in angles {
        let dir = Vec2::from_angle(angle.to_radians()).rotate(aim);
        world_setup::spawn_enemy_bullet(world, origin, dir * speed, squadron);
    }
    events.push(GameEvent::Sound {
        sound: SoundId::EnemyFire,
        volume: None,
    });
}
