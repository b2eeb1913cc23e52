//! Timed visual state: explosions, shields, invulnerability and flicker.

use hecs::{Entity, World};

use spacekiller_core::components::*;
use spacekiller_core::constants::SHIELD_SIZE;
use spacekiller_core::types::{Hitbox, Position};

pub fn run(world: &mut World, player: Entity, dt: f32, despawn_buffer: &mut Vec<Entity>) {
    despawn_buffer.clear();

    for (entity, explosion) in world.query_mut::<&mut Explosion>() {
        explosion.remaining_secs -= dt;
        if explosion.remaining_secs <= 0.0 {
            despawn_buffer.push(entity);
        }
    }

    // Shields follow the player.
    let player_center = match (world.get::<&Position>(player), world.get::<&Hitbox>(player)) {
        (Ok(pos), Ok(hitbox)) => Some(hitbox.center(&pos)),
        _ => None,
    };
    for (entity, (shield, pos)) in world.query_mut::<(&mut Shield, &mut Position)>() {
        shield.remaining_secs -= dt;
        if shield.remaining_secs <= 0.0 || player_center.is_none() {
            despawn_buffer.push(entity);
        } else if let Some(center) = player_center {
            pos.x = center.x - SHIELD_SIZE / 2.0;
            pos.y = center.y - SHIELD_SIZE / 2.0;
        }
    }

    for entity in despawn_buffer.drain(..) {
        let _ = world.despawn(entity);
    }

    let mut expired = Vec::new();
    for (entity, invulnerable) in world.query_mut::<&mut Invulnerable>() {
        if let Some(remaining) = invulnerable.remaining_secs.as_mut() {
            *remaining -= dt;
            if *remaining <= 0.0 {
                expired.push(entity);
            }
        }
    }
    for entity in expired {
        let _ = world.remove_one::<Invulnerable>(entity);
        let _ = world.remove_one::<Flicker>(entity);
    }

    for (_entity, flicker) in world.query_mut::<&mut Flicker>() {
        if flicker.half_period <= 0.0 {
            continue;
        }
        flicker.elapsed += dt;
        while flicker.elapsed >= flicker.half_period {
            flicker.elapsed -= flicker.half_period;
            flicker.visible = !flicker.visible;
        }
    }
}
