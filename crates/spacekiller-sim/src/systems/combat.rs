//! Combat resolution: hits on enemies, hits on the player, pickups,
//! shield contacts and the boss death sequence.
//!
//! Every resolver takes entity handles that may have gone stale since the
//! collision was detected; a missing or already dead entity is a no-op.

use hecs::{Component, Entity, World};
use tracing::{debug, info};

use spacekiller_core::components::*;
use spacekiller_core::constants::*;
use spacekiller_core::enums::{Achievement, PowerLevel, SoundId};
use spacekiller_core::events::GameEvent;
use spacekiller_core::path::{MotionPath, PathFollower, Repeat, Waypoint};
use spacekiller_core::types::{Hitbox, Position};

use crate::clock::{Scheduler, TimedTask};
use crate::host::PlayerListener;
use crate::squadrons;
use crate::world_setup;

/// Collaborators a resolver may call into during a tick.
pub struct CombatContext<'a> {
    pub player: Entity,
    pub listener: &'a mut dyn PlayerListener,
    pub scheduler: &'a mut Scheduler,
    pub events: &'a mut Vec<GameEvent>,
}

impl CombatContext<'_> {
    pub fn sound(&mut self, sound: SoundId) {
        self.events.push(GameEvent::Sound {
            sound,
            volume: None,
        });
    }

    pub fn shake(&mut self, (intensity, duration): (f32, f32)) {
        self.events
            .push(GameEvent::ScreenShake { intensity, duration });
    }
}

/// What dealt the damage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitSource {
    /// A player bullet, consumed by the hit.
    Bullet(Entity),
    /// A bomb blast or explosion chain.
    Explosion,
}

impl HitSource {
    pub fn damage(self) -> u32 {
        match self {
            HitSource::Bullet(_) => 1,
            HitSource::Explosion => HIT_EXPLOSION,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// Enemy missing, dead or already exploding.
    Ignored,
    Damaged,
    Killed,
    /// The boss died and its death sequence started.
    BossDown,
}

pub(crate) fn has<T: Component>(world: &World, entity: Entity) -> bool {
    world.entity(entity).is_ok_and(|e| e.has::<T>())
}

/// Add `delta` to the player's score through the listener.
pub fn award_score(world: &mut World, ctx: &mut CombatContext, delta: u32) {
    let Ok(mut player) = world.get::<&mut Player>(ctx.player) else {
        return;
    };
    ctx.listener.update_score(&mut player, delta);
    let total = player.score;
    drop(player);
    ctx.events.push(GameEvent::ScoreUpdated { delta, total });
}

/// Apply one hit to `enemy`.
pub fn resolve_hit(
    world: &mut World,
    ctx: &mut CombatContext,
    enemy: Entity,
    source: HitSource,
) -> HitOutcome {
    let Some((is_boss, points, before, center)) = hittable(world, enemy) else {
        return HitOutcome::Ignored;
    };

    ctx.sound(SoundId::Explosion);
    let bullet_center = match source {
        HitSource::Bullet(bullet) => world
            .query_one_mut::<(&Position, &Hitbox)>(bullet)
            .ok()
            .map(|(pos, hitbox)| hitbox.center(pos)),
        HitSource::Explosion => None,
    };
    world_setup::spawn_explosion(world, bullet_center.unwrap_or(center));
    if let HitSource::Bullet(bullet) = source {
        let _ = world.despawn(bullet);
    }

    let damage = source.damage();
    award_score(world, ctx, points * damage);

    let (after, dead) = match world.get::<&mut Enemy>(enemy) {
        Ok(mut e) => {
            e.hit(damage);
            (e.remaining_fraction(), e.is_dead())
        }
        Err(_) => return HitOutcome::Ignored,
    };

    if is_boss
        && before >= BOSS_TINT_THRESHOLD
        && after < BOSS_TINT_THRESHOLD
        && !has::<BossTint>(world, enemy)
    {
        let _ = world.insert_one(enemy, BossTint);
        ctx.events.push(GameEvent::BossTinted);
    }

    if dead {
        on_enemy_killed(world, ctx, enemy)
    } else {
        HitOutcome::Damaged
    }
}

/// (is_boss, points, remaining fraction, centre) of a live, hittable enemy.
fn hittable(world: &World, enemy: Entity) -> Option<(bool, u32, f32, Position)> {
    if has::<BossExploding>(world, enemy) {
        return None;
    }
    let e = world.get::<&Enemy>(enemy).ok()?;
    if e.is_dead() {
        return None;
    }
    let pos = *world.get::<&Position>(enemy).ok()?;
    let hitbox = *world.get::<&Hitbox>(enemy).ok()?;
    Some((
        e.is_boss,
        e.points,
        e.remaining_fraction(),
        hitbox.center(&pos),
    ))
}

fn on_enemy_killed(world: &mut World, ctx: &mut CombatContext, enemy: Entity) -> HitOutcome {
    let Ok((is_boss, is_tank, is_laser_ship)) = world
        .get::<&Enemy>(enemy)
        .map(|e| (e.is_boss, e.is_tank, e.is_laser_ship))
    else {
        return HitOutcome::Ignored;
    };

    if is_laser_ship || is_tank {
        ctx.shake(HEAVY_KILL_SHAKE);
    }
    count_kill(world, ctx, is_laser_ship);

    world_setup::cancel_motion(world, enemy);
    squadrons::detach_member(world, enemy);

    if is_boss {
        start_boss_death(world, ctx, enemy);
        HitOutcome::BossDown
    } else {
        let _ = world.despawn(enemy);
        HitOutcome::Killed
    }
}

/// Bump kill counters and unlock any achievement whose threshold was hit.
fn count_kill(world: &mut World, ctx: &mut CombatContext, laser_ship: bool) {
    let level_finished = has::<LevelFinished>(world, ctx.player);
    let Ok(mut player) = world.get::<&mut Player>(ctx.player) else {
        return;
    };
    if !level_finished {
        player.enemies_killed += 1;
    }
    if laser_ship {
        player.laser_ships_killed += 1;
    }

    let kills = [
        Achievement::Kill50Enemies,
        Achievement::Kill100Enemies,
        Achievement::Kill500Enemies,
    ];
    for (threshold, achievement) in KILL_ACHIEVEMENT_THRESHOLDS.into_iter().zip(kills) {
        if !level_finished && player.enemies_killed == threshold {
            ctx.events
                .push(GameEvent::AchievementUnlocked { achievement });
        }
    }
    let lasers = [Achievement::KillLaserShip, Achievement::Kill5LaserShips];
    for (threshold, achievement) in LASER_SHIP_ACHIEVEMENT_THRESHOLDS.into_iter().zip(lasers) {
        if laser_ship && player.laser_ships_killed == threshold {
            ctx.events
                .push(GameEvent::AchievementUnlocked { achievement });
        }
    }
}

/// Boss death: the player becomes invulnerable and flickers while the
/// boss drifts to the centre of the screen, flickering, before it is
/// removed by `advance_boss_deaths`.
fn start_boss_death(world: &mut World, ctx: &mut CombatContext, boss: Entity) {
    ctx.sound(SoundId::BossFinished);
    ctx.shake(BIG_SHAKE);
    let _ = world.insert(
        ctx.player,
        (
            Invulnerable {
                remaining_secs: None,
            },
            Flicker::new(FLICKER_HALF_PERIOD),
        ),
    );

    let Ok((pos, hitbox)) = world
        .query_one_mut::<(&Position, &Hitbox)>(boss)
        .map(|(p, h)| (*p, *h))
    else {
        return;
    };
    let centre = Position::new(
        SCREEN_WIDTH / 2.0 - hitbox.width / 2.0,
        SCREEN_HEIGHT / 2.0 - hitbox.height / 2.0,
    );
    let drift = MotionPath {
        origin: pos,
        waypoints: vec![Waypoint::new(centre, BOSS_DEATH_MOVE_SECS)],
        repeat: Repeat::Once,
    };
    let flicker_secs = FLICKER_HALF_PERIOD * (BOSS_DEATH_FLICKER_REPEATS + 1) as f32;
    let _ = world.insert(
        boss,
        (
            BossExploding {
                elapsed: 0.0,
                duration: BOSS_DEATH_MOVE_SECS.max(flicker_secs),
            },
            Flicker::new(FLICKER_HALF_PERIOD),
            PathFollower::new(drift),
        ),
    );
    info!("boss destroyed, death sequence started");
}

/// Step running boss death sequences; a finished boss is removed and the
/// level-finished mark is scheduled.
pub fn advance_boss_deaths(world: &mut World, ctx: &mut CombatContext, dt: f32) {
    let mut done = Vec::new();
    for (entity, exploding) in world.query_mut::<&mut BossExploding>() {
        exploding.elapsed += dt;
        if exploding.elapsed >= exploding.duration {
            done.push(entity);
        }
    }
    for boss in done {
        world_setup::remove_entity(world, boss);
        ctx.scheduler
            .schedule(LEVEL_FINISHED_DELAY, TimedTask::MarkLevelFinished);
        debug!("boss removed");
    }
}

/// Whether the player currently ignores hits.
pub fn player_protected(world: &World, player: Entity) -> bool {
    has::<Invulnerable>(world, player)
        || has::<LevelFinished>(world, player)
        || world.get::<&Player>(player).map_or(true, |p| p.game_over)
}

/// An enemy ship rammed the player. The enemy survives.
pub fn player_hit_by_enemy_body(world: &mut World, ctx: &mut CombatContext, enemy: Entity) {
    if !world.contains(enemy) {
        return;
    }
    player_hit(world, ctx);
}

/// An enemy bullet reached the player; the bullet is consumed.
pub fn player_hit_by_enemy_bullet(world: &mut World, ctx: &mut CombatContext, bullet: Entity) {
    if !world.contains(bullet) || player_protected(world, ctx.player) {
        return;
    }
    let _ = world.despawn(bullet);
    player_hit(world, ctx);
}

fn player_hit(world: &mut World, ctx: &mut CombatContext) {
    if player_protected(world, ctx.player) {
        return;
    }
    let Ok((pos, hitbox)) = world
        .query_one_mut::<(&Position, &Hitbox)>(ctx.player)
        .map(|(p, h)| (*p, *h))
    else {
        return;
    };
    ctx.sound(SoundId::Explosion);
    world_setup::spawn_explosion(world, hitbox.center(&pos));

    let (remaining, game_over, score) = {
        let Ok(mut player) = world.get::<&mut Player>(ctx.player) else {
            return;
        };
        ctx.listener.lose_live(&mut player);
        (player.lives, player.game_over, player.score)
    };
    ctx.events.push(GameEvent::LifeLost { remaining });

    if game_over {
        ctx.sound(SoundId::GameOver);
        ctx.events.push(GameEvent::ScoreSubmitted { score });
        info!(score, "game over");
    } else {
        let _ = world.insert(
            ctx.player,
            (
                Invulnerable {
                    remaining_secs: Some(RESPAWN_INVULNERABILITY),
                },
                Flicker::new(FLICKER_HALF_PERIOD),
            ),
        );
    }
}

pub fn collect_power_up(world: &mut World, ctx: &mut CombatContext, pickup: Entity) {
    if !world_setup::remove_entity(world, pickup) {
        return;
    }
    let Ok(mut player) = world.get::<&mut Player>(ctx.player) else {
        return;
    };
    let voice = player.power_level != PowerLevel::TripleVeryFast;
    player.power_level = player.power_level.next();
    drop(player);
    ctx.sound(SoundId::PowerUp);
    if voice {
        ctx.sound(SoundId::PowerUpVoice);
    }
}

pub fn collect_shield_up(world: &mut World, ctx: &mut CombatContext, pickup: Entity) {
    if !world_setup::remove_entity(world, pickup) {
        return;
    }
    let Ok((pos, hitbox)) = world
        .query_one_mut::<(&Position, &Hitbox)>(ctx.player)
        .map(|(p, h)| (*p, *h))
    else {
        return;
    };
    ctx.sound(SoundId::ShieldUp);
    world_setup::spawn_shield(world, hitbox.center(&pos));
}

pub fn collect_bomb_up(world: &mut World, ctx: &mut CombatContext, pickup: Entity) {
    if !world_setup::remove_entity(world, pickup) {
        return;
    }
    let Ok(mut player) = world.get::<&mut Player>(ctx.player) else {
        return;
    };
    ctx.listener.new_bomb_obtained(&mut player);
    let bombs = player.bombs;
    drop(player);
    ctx.sound(SoundId::BombUp);
    ctx.events.push(GameEvent::BombObtained { bombs });
}

/// The shield absorbs an enemy bullet.
pub fn bullet_stopped_by_shield(world: &mut World, ctx: &mut CombatContext, bullet: Entity) {
    if world.despawn(bullet).is_ok() {
        ctx.sound(SoundId::ShieldBullet);
    }
}

/// An enemy body ran into the shield and is destroyed outright.
pub fn enemy_hit_by_shield(world: &mut World, ctx: &mut CombatContext, enemy: Entity) {
    let Some((is_boss, _, _, center)) = hittable(world, enemy) else {
        return;
    };
    if is_boss {
        return;
    }
    ctx.sound(SoundId::Explosion);
    world_setup::spawn_explosion(world, center);
    world_setup::cancel_motion(world, enemy);
    squadrons::detach_member(world, enemy);
    let _ = world.despawn(enemy);
}

/// Detonate a bomb: every live enemy on screen takes an explosion hit.
/// Returns false when the player has no bomb left.
pub fn drop_bomb(world: &mut World, ctx: &mut CombatContext) -> bool {
    {
        let Ok(mut player) = world.get::<&mut Player>(ctx.player) else {
            return false;
        };
        if player.bombs == 0 {
            return false;
        }
        player.bombs -= 1;
    }
    ctx.shake(BIG_SHAKE);

    let targets: Vec<Entity> = world
        .query::<(&Enemy, &Position, &Hitbox)>()
        .iter()
        .filter(|(_, (_, pos, hitbox))| on_screen(pos, hitbox))
        .map(|(entity, _)| entity)
        .collect();
    for enemy in targets {
        resolve_hit(world, ctx, enemy, HitSource::Explosion);
    }
    true
}

/// Whether any part of the box is inside the screen.
pub fn on_screen(pos: &Position, hitbox: &Hitbox) -> bool {
    pos.x + hitbox.width > 0.0
        && pos.x < SCREEN_WIDTH
        && pos.y + hitbox.height > 0.0
        && pos.y < SCREEN_HEIGHT
}
