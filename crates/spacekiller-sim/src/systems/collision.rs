//! Collision detection: axis-aligned box overlaps, refined by per-pixel
//! opacity masks for bullets hitting enemy kinds that have one.
//!
//! Detection only reads the world; `apply` hands each contact to the
//! matching combat resolver in detection order.

use hecs::{Entity, World};

use spacekiller_core::components::*;
use spacekiller_core::enums::ShipKind;
use spacekiller_core::types::{Hitbox, Position};

use crate::mask::MaskStore;
use crate::systems::combat::{self, CombatContext, HitSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collision {
    EnemyHitByBullet { enemy: Entity, bullet: Entity },
    PlayerHitByEnemyBody { enemy: Entity },
    PlayerHitByEnemyBullet { bullet: Entity },
    BulletStoppedByShield { bullet: Entity },
    EnemyHitByShield { enemy: Entity },
    PowerUp(Entity),
    ShieldUp(Entity),
    BombUp(Entity),
}

struct Target {
    entity: Entity,
    kind: ShipKind,
    is_boss: bool,
    pos: Position,
    hitbox: Hitbox,
}

/// Find every contact this tick.
pub fn detect(world: &World, player: Entity, masks: &mut MaskStore) -> Vec<Collision> {
    let mut out = Vec::new();

    let targets: Vec<Target> = world
        .query::<(&Enemy, &Position, &Hitbox)>()
        .without::<&BossExploding>()
        .iter()
        .filter(|(_, (enemy, _, _))| !enemy.is_dead())
        .map(|(entity, (enemy, pos, hitbox))| Target {
            entity,
            kind: enemy.kind,
            is_boss: enemy.is_boss,
            pos: *pos,
            hitbox: *hitbox,
        })
        .collect();

    // Each bullet hits at most one enemy.
    for (bullet, (_, pos, hitbox)) in world
        .query::<(&PlayerBullet, &Position, &Hitbox)>()
        .iter()
    {
        let hit = targets.iter().find(|t| {
            hitbox.overlaps(pos, &t.hitbox, &t.pos)
                && opaque_under(masks, t, &hitbox.center(pos))
        });
        if let Some(target) = hit {
            out.push(Collision::EnemyHitByBullet {
                enemy: target.entity,
                bullet,
            });
        }
    }

    let (player_pos, player_box) =
        match (world.get::<&Position>(player), world.get::<&Hitbox>(player)) {
            (Ok(pos), Ok(hitbox)) => (*pos, *hitbox),
            _ => return out,
        };
    let protected = combat::player_protected(world, player);
    let shield: Option<(Position, Hitbox)> = world
        .query::<(&Shield, &Position, &Hitbox)>()
        .iter()
        .next()
        .map(|(_, (_, p, h))| (*p, *h));

    for (bullet, (_, pos, hitbox)) in world
        .query::<(&EnemyBullet, &Position, &Hitbox)>()
        .iter()
    {
        if let Some((shield_pos, shield_box)) = &shield {
            if hitbox.overlaps(pos, shield_box, shield_pos) {
                out.push(Collision::BulletStoppedByShield { bullet });
                continue;
            }
        }
        if !protected && hitbox.overlaps(pos, &player_box, &player_pos) {
            out.push(Collision::PlayerHitByEnemyBullet { bullet });
        }
    }

    match &shield {
        Some((shield_pos, shield_box)) => {
            for t in targets.iter().filter(|t| !t.is_boss) {
                if t.hitbox.overlaps(&t.pos, shield_box, shield_pos) {
                    out.push(Collision::EnemyHitByShield { enemy: t.entity });
                }
            }
        }
        None if !protected => {
            if let Some(t) = targets
                .iter()
                .find(|t| t.hitbox.overlaps(&t.pos, &player_box, &player_pos))
            {
                out.push(Collision::PlayerHitByEnemyBody { enemy: t.entity });
            }
        }
        None => {}
    }

    let game_over = world.get::<&Player>(player).map_or(true, |p| p.game_over);
    if !game_over {
        let touches = |pos: &Position, hitbox: &Hitbox| hitbox.overlaps(pos, &player_box, &player_pos);
        for (e, (_, pos, hitbox)) in world.query::<(&PowerUp, &Position, &Hitbox)>().iter() {
            if touches(pos, hitbox) {
                out.push(Collision::PowerUp(e));
            }
        }
        for (e, (_, pos, hitbox)) in world.query::<(&ShieldUp, &Position, &Hitbox)>().iter() {
            if touches(pos, hitbox) {
                out.push(Collision::ShieldUp(e));
            }
        }
        for (e, (_, pos, hitbox)) in world.query::<(&BombUp, &Position, &Hitbox)>().iter() {
            if touches(pos, hitbox) {
                out.push(Collision::BombUp(e));
            }
        }
    }

    out
}

/// Mask check at `point`. Kinds without a mask are solid.
fn opaque_under(masks: &mut MaskStore, target: &Target, point: &Position) -> bool {
    let Some(loader) = masks.get_mut(&target.kind) else {
        return true;
    };
    let u = (point.x - target.pos.x) / target.hitbox.width;
    let v = (point.y - target.pos.y) / target.hitbox.height;
    loader.get().is_opaque_at(u.clamp(0.0, 1.0), v.clamp(0.0, 1.0))
}

/// Hand each contact to its resolver.
pub fn apply(world: &mut World, ctx: &mut CombatContext, collisions: &[Collision]) {
    for &collision in collisions {
        match collision {
            Collision::EnemyHitByBullet { enemy, bullet } => {
                // The bullet may already have been spent this tick.
                if world.contains(bullet) {
                    combat::resolve_hit(world, ctx, enemy, HitSource::Bullet(bullet));
                }
            }
            Collision::PlayerHitByEnemyBody { enemy } => {
                combat::player_hit_by_enemy_body(world, ctx, enemy)
            }
            Collision::PlayerHitByEnemyBullet { bullet } => {
                combat::player_hit_by_enemy_bullet(world, ctx, bullet)
            }
            Collision::BulletStoppedByShield { bullet } => {
                combat::bullet_stopped_by_shield(world, ctx, bullet)
            }
            Collision::EnemyHitByShield { enemy } => combat::enemy_hit_by_shield(world, ctx, enemy),
            Collision::PowerUp(pickup) => combat::collect_power_up(world, ctx, pickup),
            Collision::ShieldUp(pickup) => combat::collect_shield_up(world, ctx, pickup),
            Collision::BombUp(pickup) => combat::collect_bomb_up(world, ctx, pickup),
        }
    }
}
