//! Tests for the simulation engine, squadron lifecycle, combat resolution
//! and the level script driver.

use std::cell::RefCell;
use std::rc::Rc;

use hecs::{Entity, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use spacekiller_core::commands::PlayerCommand;
use spacekiller_core::components::*;
use spacekiller_core::constants::*;
use spacekiller_core::enums::*;
use spacekiller_core::error::FormationError;
use spacekiller_core::events::GameEvent;
use spacekiller_core::path::{MotionPath, Repeat, Waypoint};
use spacekiller_core::types::{Hitbox, Position, Velocity};
use spacekiller_paths::formation::MotionSpec;

use crate::clock::{Scheduler, TimedTask};
use crate::engine::{SimConfig, SimulationEngine};
use crate::error::SimError;
use crate::host::{DefaultPlayerListener, GameHost};
use crate::level_script::{LevelScript, ScriptCommand, ScriptEntry};
use crate::mask::{MaskLoader, MaskStore, OpacityMask};
use crate::squadrons::{self, SquadronSpec};
use crate::systems::collision::{self, Collision};
use crate::systems::combat::{self, CombatContext, HitOutcome, HitSource};
use crate::systems::{attack, motion, squadron};
use crate::world_setup;

/// A world with a player and every collaborator a resolver needs.
struct Harness {
    world: World,
    rng: ChaCha8Rng,
    scheduler: Scheduler,
    events: Vec<GameEvent>,
    listener: DefaultPlayerListener,
    player: Entity,
}

impl Harness {
    fn new() -> Self {
        let mut world = World::new();
        let player = world_setup::spawn_player(&mut world, Player::new(3, 2, 2));
        Self {
            world,
            rng: ChaCha8Rng::seed_from_u64(7),
            scheduler: Scheduler::new(),
            events: Vec::new(),
            listener: DefaultPlayerListener::new(3, 2),
            player,
        }
    }

    fn split(&mut self) -> (&mut World, &mut ChaCha8Rng, CombatContext<'_>) {
        (
            &mut self.world,
            &mut self.rng,
            CombatContext {
                player: self.player,
                listener: &mut self.listener,
                scheduler: &mut self.scheduler,
                events: &mut self.events,
            },
        )
    }

    fn hit(&mut self, enemy: Entity, source: HitSource) -> HitOutcome {
        let (world, _, mut ctx) = self.split();
        combat::resolve_hit(world, &mut ctx, enemy, source)
    }

    fn sweep(&mut self) {
        let (world, rng, mut ctx) = self.split();
        squadron::run(world, rng, &mut ctx);
    }

    fn score(&self) -> u32 {
        self.world.get::<&Player>(self.player).map_or(0, |p| p.score)
    }

    fn count<T: hecs::Component>(&self) -> usize {
        self.world.query::<&T>().iter().count()
    }

    fn count_events(&self, pred: impl Fn(&GameEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

/// A stationary enemy parked at `at`.
fn enemy_at(world: &mut World, enemy: Enemy, at: Position) -> Entity {
    let path = MotionPath {
        origin: at,
        waypoints: vec![Waypoint::new(at, 1000.0)],
        repeat: Repeat::Once,
    };
    world_setup::spawn_enemy(world, enemy, at, path)
}

fn bullet_at(world: &mut World, at: Position) -> Entity {
    world.spawn((
        PlayerBullet,
        Removable,
        at,
        Velocity::new(0.0, 0.0),
        Hitbox::new(BULLET_SIZE, BULLET_SIZE),
    ))
}

fn squadron_members(world: &World, squadron: Entity) -> Vec<Entity> {
    world
        .get::<&Squadron>(squadron)
        .map(|s| s.members.clone())
        .unwrap_or_default()
}

fn collect_events(engine: &mut SimulationEngine, ticks: usize, into: &mut Vec<GameEvent>) {
    for _ in 0..ticks {
        let snapshot = engine.tick().unwrap();
        into.extend(snapshot.events);
    }
}

// ---- Squadron creation ----

#[test]
fn test_create_squadron_links_members() {
    let mut h = Harness::new();
    let spec = SquadronSpec::new(ShipKind::Soucoupe, 5, MotionSpec::LinearY { x: 60.0, y: SCREEN_HEIGHT }, 150.0);
    let squadron = squadrons::create_squadron(&mut h.world, &mut h.rng, &spec).unwrap();

    let members = squadron_members(&h.world, squadron);
    assert_eq!(members.len(), 5);
    for member in members {
        let enemy = h.world.get::<&Enemy>(member).unwrap();
        assert_eq!(enemy.squadron, Some(squadron));
        assert_eq!(enemy.kind, ShipKind::Soucoupe);
        let pos = h.world.get::<&Position>(member).unwrap();
        assert!(pos.y >= SCREEN_HEIGHT, "members start above the screen");
    }
}

#[test]
fn test_create_squadron_rejects_bad_formation_without_spawning() {
    let mut h = Harness::new();
    let before = h.world.len();
    let spec = SquadronSpec::new(ShipKind::Ship, 5, MotionSpec::ArrowUp, 100.0);
    let err = squadrons::create_squadron(&mut h.world, &mut h.rng, &spec).unwrap_err();
    assert_eq!(
        err,
        FormationError::MemberCount {
            motion: MotionKind::ArrowUp,
            expected: 7,
            actual: 5
        }
    );
    assert_eq!(h.world.len(), before, "nothing spawned on error");
}

#[test]
fn test_asteroids_never_attack() {
    let mut h = Harness::new();
    let spec = SquadronSpec::new(
        ShipKind::Asteroid,
        6,
        MotionSpec::LinearX {
            x: -40.0,
            y: 300.0,
            direction: 1.0,
        },
        100.0,
    );
    let squadron = squadrons::create_squadron(&mut h.world, &mut h.rng, &spec).unwrap();
    for member in squadron_members(&h.world, squadron) {
        assert!(!h.world.get::<&Enemy>(member).unwrap().can_attack);
    }
}

// ---- Motion & path completion ----

#[test]
fn test_arrow_up_squadron_leaves_screen_and_is_finalized() {
    let mut h = Harness::new();
    let velocity = 640.0;
    let spec = SquadronSpec::new(ShipKind::Ship, 7, MotionSpec::ArrowUp, velocity);
    let squadron = squadrons::create_squadron(&mut h.world, &mut h.rng, &spec).unwrap();
    let members = squadron_members(&h.world, squadron);
    assert_eq!(members.len(), 7);

    let traversal = TRAVERSAL_SCREENS * SCREEN_HEIGHT / velocity;
    let ticks = (traversal / DT).ceil() as usize + 1;
    let mut buffer = Vec::new();
    for _ in 0..ticks {
        motion::run(&mut h.world, DT, &mut buffer);
        h.sweep();
    }

    for member in members {
        assert!(!h.world.contains(member), "member still alive after traversal");
    }
    assert!(!h.world.contains(squadron), "squadron entity should be gone");
    assert_eq!(h.count::<PowerUp>() + h.count::<ShieldUp>(), 0);
}

#[test]
fn test_escaped_member_cancels_power_up() {
    let mut h = Harness::new();
    let spec = SquadronSpec::new(ShipKind::Soucoupe, 2, MotionSpec::LinearY { x: 60.0, y: SCREEN_HEIGHT }, 960.0)
        .with_power_up();
    let squadron = squadrons::create_squadron(&mut h.world, &mut h.rng, &spec).unwrap();
    let members = squadron_members(&h.world, squadron);

    // Shoot one member down, let the other fly off.
    assert_eq!(h.hit(members[0], HitSource::Explosion), HitOutcome::Killed);
    let mut buffer = Vec::new();
    for _ in 0..200 {
        motion::run(&mut h.world, DT, &mut buffer);
    }
    h.sweep();

    assert!(!h.world.contains(squadron));
    assert_eq!(h.count::<PowerUp>() + h.count::<ShieldUp>(), 0);
}

// ---- Squadron rewards ----

#[test]
fn test_squadron_reward_fires_once_when_members_die_in_same_tick() {
    let mut h = Harness::new();
    let spec = SquadronSpec::new(ShipKind::Soucoupe, 3, MotionSpec::LinearY { x: 60.0, y: 300.0 }, 100.0)
        .with_power_up()
        .with_bonus(500);
    let squadron = squadrons::create_squadron(&mut h.world, &mut h.rng, &spec).unwrap();

    for member in squadron_members(&h.world, squadron) {
        assert_eq!(h.hit(member, HitSource::Explosion), HitOutcome::Killed);
    }
    let score_before_sweep = h.score();
    h.sweep();
    h.sweep();

    assert!(!h.world.contains(squadron));
    assert_eq!(h.count_events(|e| matches!(e, GameEvent::SquadronBonus { .. })), 1);
    assert_eq!(h.score(), score_before_sweep + 500);
    assert_eq!(h.count::<PowerUp>() + h.count::<ShieldUp>(), 1);
    assert_eq!(h.count::<ScoreText>(), 1);
    assert_eq!(h.scheduler.pending_count(), 1);
}

#[test]
fn test_score_text_removed_after_lifetime() {
    let mut h = Harness::new();
    let spec = SquadronSpec::new(ShipKind::Soucoupe, 1, MotionSpec::LinearY { x: 60.0, y: 300.0 }, 100.0)
        .with_bonus(100);
    let squadron = squadrons::create_squadron(&mut h.world, &mut h.rng, &spec).unwrap();
    let member = squadron_members(&h.world, squadron)[0];
    h.hit(member, HitSource::Explosion);
    h.sweep();
    assert_eq!(h.count::<ScoreText>(), 1);

    assert!(h.scheduler.advance(SCORE_TEXT_LIFETIME - 0.1).is_empty());
    let due = h.scheduler.advance(0.2);
    assert_eq!(due.len(), 1);
    let TimedTask::RemoveEntity(text) = due[0] else {
        panic!("expected a removal task, got {:?}", due[0]);
    };
    assert!(world_setup::remove_entity(&mut h.world, text));
    assert_eq!(h.count::<ScoreText>(), 0);
}

#[test]
fn test_reward_paid_when_shooter_dies_mid_windup() {
    let mut h = Harness::new();
    let spec = SquadronSpec::new(ShipKind::Ship, 1, MotionSpec::LinearY { x: 60.0, y: 300.0 }, 100.0)
        .with_bonus(500);
    let squadron = squadrons::create_squadron(&mut h.world, &mut h.rng, &spec).unwrap();
    let members = squadron_members(&h.world, squadron);

    h.world
        .insert_one(members[0], AttackWindup { remaining_secs: 0.3 })
        .unwrap();
    attack::refresh_pending(&mut h.world);
    assert!(h.world.get::<&Squadron>(squadron).unwrap().attack_pending);

    h.hit(members[0], HitSource::Explosion);
    h.sweep();

    assert!(!h.world.contains(squadron));
    assert_eq!(h.count_events(|e| matches!(e, GameEvent::SquadronBonus { .. })), 1);
}

#[test]
fn test_reward_withheld_while_shot_in_flight() {
    let mut h = Harness::new();
    let spec = SquadronSpec::new(ShipKind::Ship, 2, MotionSpec::LinearY { x: 60.0, y: 300.0 }, 100.0)
        .with_power_up()
        .with_bonus(500);
    let squadron = squadrons::create_squadron(&mut h.world, &mut h.rng, &spec).unwrap();
    let members = squadron_members(&h.world, squadron);

    // Release a finished wind-up so the shot leaves the ship.
    h.world.get::<&mut Enemy>(members[0]).unwrap().can_attack = false;
    h.world
        .insert_one(members[0], AttackWindup { remaining_secs: 0.0 })
        .unwrap();
    attack::run(&mut h.world, &mut h.rng, h.player, DT, &mut h.events);
    assert_eq!(h.count::<EnemyBullet>(), 1);

    for member in members {
        h.hit(member, HitSource::Explosion);
    }
    h.sweep();

    assert!(!h.world.contains(squadron), "squadron is still finalized");
    assert_eq!(h.count_events(|e| matches!(e, GameEvent::SquadronBonus { .. })), 0);
    assert_eq!(h.count::<PowerUp>() + h.count::<ShieldUp>(), 0);
}

#[test]
fn test_surviving_windup_keeps_attack_pending() {
    let mut h = Harness::new();
    let spec = SquadronSpec::new(ShipKind::Ship, 2, MotionSpec::LinearY { x: 60.0, y: 300.0 }, 100.0)
        .with_bonus(500);
    let squadron = squadrons::create_squadron(&mut h.world, &mut h.rng, &spec).unwrap();
    let members = squadron_members(&h.world, squadron);

    h.world
        .insert_one(members[1], AttackWindup { remaining_secs: 1.0 })
        .unwrap();
    h.hit(members[0], HitSource::Explosion);
    h.sweep();

    assert!(h.world.contains(squadron));
    assert!(h.world.get::<&Squadron>(squadron).unwrap().attack_pending);

    h.hit(members[1], HitSource::Explosion);
    h.sweep();
    assert!(!h.world.contains(squadron));
    assert_eq!(h.count_events(|e| matches!(e, GameEvent::SquadronBonus { .. })), 1);
}

// ---- Combat resolution ----

#[test]
fn test_three_bullet_hits_kill_asteroid() {
    let mut h = Harness::new();
    let spec = SquadronSpec::new(ShipKind::Asteroid, 2, MotionSpec::LinearY { x: 60.0, y: 300.0 }, 100.0);
    let squadron = squadrons::create_squadron(&mut h.world, &mut h.rng, &spec).unwrap();
    let target = squadron_members(&h.world, squadron)[0];
    let at = *h.world.get::<&Position>(target).unwrap();
    let points = ShipKind::Asteroid.stats().points;

    let mut outcomes = Vec::new();
    for _ in 0..3 {
        let bullet = bullet_at(&mut h.world, at);
        outcomes.push(h.hit(target, HitSource::Bullet(bullet)));
        assert!(!h.world.contains(bullet), "bullet is consumed");
    }

    assert_eq!(
        outcomes,
        vec![HitOutcome::Damaged, HitOutcome::Damaged, HitOutcome::Killed]
    );
    assert_eq!(h.score(), 3 * points);
    assert!(!h.world.contains(target));
    assert!(!squadron_members(&h.world, squadron).contains(&target));
    assert_eq!(h.count::<Explosion>(), 3);
}

#[test]
fn test_hit_on_dead_enemy_is_noop() {
    let mut h = Harness::new();
    let mut enemy = Enemy::new(ShipKind::Ship, 100.0, false);
    enemy.health = 0;
    let target = enemy_at(&mut h.world, enemy, Position::new(100.0, 300.0));
    let bullet = bullet_at(&mut h.world, Position::new(100.0, 300.0));

    assert_eq!(h.hit(target, HitSource::Bullet(bullet)), HitOutcome::Ignored);
    assert_eq!(h.score(), 0);
    assert!(h.events.is_empty());
    assert!(h.world.contains(bullet), "bullet untouched");
    assert_eq!(h.count::<Explosion>(), 0);
    assert_eq!(h.world.get::<&Enemy>(target).unwrap().health, 0);
}

#[test]
fn test_hit_on_despawned_enemy_is_noop() {
    let mut h = Harness::new();
    let target = enemy_at(
        &mut h.world,
        Enemy::new(ShipKind::Ship, 100.0, false),
        Position::new(100.0, 300.0),
    );
    h.world.despawn(target).unwrap();
    assert_eq!(h.hit(target, HitSource::Explosion), HitOutcome::Ignored);
    assert!(h.events.is_empty());
}

#[test]
fn test_boss_tint_triggers_once() {
    let mut h = Harness::new();
    let mut boss = Enemy::new(ShipKind::Boss, 100.0, true);
    boss.max_health = 10;
    boss.health = 3;
    let at = Position::new(100.0, 400.0);
    let boss = enemy_at(&mut h.world, boss, at);

    let tints = |h: &Harness| h.count_events(|e| matches!(e, GameEvent::BossTinted));

    let bullet = bullet_at(&mut h.world, at);
    assert_eq!(h.hit(boss, HitSource::Bullet(bullet)), HitOutcome::Damaged);
    assert_eq!(tints(&h), 1, "0.30 -> 0.20 crosses the threshold");
    assert!(h.world.get::<&BossTint>(boss).is_ok());

    let bullet = bullet_at(&mut h.world, at);
    assert_eq!(h.hit(boss, HitSource::Bullet(bullet)), HitOutcome::Damaged);
    assert_eq!(tints(&h), 1, "0.20 -> 0.10 must not re-trigger");
}

#[test]
fn test_boss_explodes_before_removal() {
    let mut h = Harness::new();
    let mut enemy = Enemy::new(ShipKind::Boss, 100.0, true);
    enemy.health = 1;
    let boss = enemy_at(&mut h.world, enemy, Position::new(100.0, 400.0));

    assert_eq!(h.hit(boss, HitSource::Explosion), HitOutcome::BossDown);
    assert!(h.world.contains(boss), "boss is exploding, not removed");
    assert!(h.world.get::<&BossExploding>(boss).is_ok());
    assert!(h.world.get::<&Invulnerable>(h.player).is_ok());
    assert_eq!(
        h.count_events(|e| matches!(
            e,
            GameEvent::Sound {
                sound: SoundId::BossFinished,
                ..
            }
        )),
        1
    );

    // Further hits while exploding are ignored.
    assert_eq!(h.hit(boss, HitSource::Explosion), HitOutcome::Ignored);

    let duration = h.world.get::<&BossExploding>(boss).unwrap().duration;
    {
        let (world, _, mut ctx) = h.split();
        combat::advance_boss_deaths(world, &mut ctx, duration - 0.1);
    }
    assert!(h.world.contains(boss));
    {
        let (world, _, mut ctx) = h.split();
        combat::advance_boss_deaths(world, &mut ctx, 0.2);
    }
    assert!(!h.world.contains(boss));
    assert_eq!(h.scheduler.pending_count(), 1, "level finish is scheduled");
}

#[test]
fn test_kill_counter_unlocks_achievement_at_threshold() {
    let mut h = Harness::new();
    h.world.get::<&mut Player>(h.player).unwrap().enemies_killed = 49;
    let target = enemy_at(
        &mut h.world,
        Enemy::new(ShipKind::LaserShip, 100.0, true),
        Position::new(100.0, 300.0),
    );
    h.world.get::<&mut Enemy>(target).unwrap().health = 1;

    assert_eq!(h.hit(target, HitSource::Explosion), HitOutcome::Killed);
    let unlocked: Vec<Achievement> = h
        .events
        .iter()
        .filter_map(|e| match e {
            GameEvent::AchievementUnlocked { achievement } => Some(*achievement),
            _ => None,
        })
        .collect();
    assert_eq!(
        unlocked,
        vec![Achievement::Kill50Enemies, Achievement::KillLaserShip]
    );
    assert_eq!(h.count_events(|e| matches!(e, GameEvent::ScreenShake { .. })), 1);
}

#[test]
fn test_player_hit_by_bullet_loses_life_once() {
    let mut h = Harness::new();
    let at = *h.world.get::<&Position>(h.player).unwrap();
    let first = world_setup::spawn_enemy_bullet(&mut h.world, at, glam::Vec2::ZERO, None);
    let second = world_setup::spawn_enemy_bullet(&mut h.world, at, glam::Vec2::ZERO, None);
    {
        let (world, _, mut ctx) = h.split();
        combat::player_hit_by_enemy_bullet(world, &mut ctx, first);
        combat::player_hit_by_enemy_bullet(world, &mut ctx, second);
    }

    let player = Player::clone(&h.world.get::<&Player>(h.player).unwrap());
    assert_eq!(player.lives, 2);
    assert!(!h.world.contains(first));
    assert!(h.world.contains(second), "invulnerable player ignores the bullet");
    assert!(h.world.get::<&Invulnerable>(h.player).is_ok());
    assert_eq!(h.count_events(|e| matches!(e, GameEvent::LifeLost { remaining: 2 })), 1);
}

#[test]
fn test_losing_life_drops_power_level() {
    let mut h = Harness::new();
    h.world.get::<&mut Player>(h.player).unwrap().power_level = PowerLevel::Triple;
    let enemy = enemy_at(
        &mut h.world,
        Enemy::new(ShipKind::Ship, 100.0, false),
        Position::new(PLAYER_ORIGIN_X, PLAYER_ORIGIN_Y),
    );
    {
        let (world, _, mut ctx) = h.split();
        combat::player_hit_by_enemy_body(world, &mut ctx, enemy);
    }
    let player = Player::clone(&h.world.get::<&Player>(h.player).unwrap());
    assert_eq!(player.power_level, PowerLevel::Double);
    assert!(h.world.contains(enemy), "rammer survives");
}

#[test]
fn test_power_up_voice_only_below_max() {
    let mut h = Harness::new();
    let voices = |h: &Harness| {
        h.count_events(|e| {
            matches!(
                e,
                GameEvent::Sound {
                    sound: SoundId::PowerUpVoice,
                    ..
                }
            )
        })
    };

    for _ in 0..4 {
        let pickup = world_setup::spawn_power_up(&mut h.world, Position::new(10.0, 300.0));
        let (world, _, mut ctx) = h.split();
        combat::collect_power_up(world, &mut ctx, pickup);
        assert!(!world.contains(pickup));
    }
    let level = h.world.get::<&Player>(h.player).unwrap().power_level;
    assert_eq!(level, PowerLevel::TripleVeryFast);
    assert_eq!(voices(&h), 3, "no voice once already at the top level");
}

#[test]
fn test_bomb_up_and_shield_up_pickups() {
    let mut h = Harness::new();
    let at = Position::new(10.0, 300.0);
    let power = world_setup::spawn_power_up(&mut h.world, at);
    let bomb = world_setup::spawn_bomb_up(&mut h.world, at);
    let shield = world_setup::spawn_shield_up(&mut h.world, at);

    let first_sound = |events: &[GameEvent]| {
        events.iter().find_map(|e| match *e {
            GameEvent::Sound { sound, .. } => Some(sound),
            _ => None,
        })
    };
    let mut sounds = Vec::new();
    {
        let (world, _, mut ctx) = h.split();
        combat::collect_power_up(world, &mut ctx, power);
        sounds.push(first_sound(&ctx.events[..]));
        let seen = ctx.events.len();
        combat::collect_bomb_up(world, &mut ctx, bomb);
        sounds.push(first_sound(&ctx.events[seen..]));
        let seen = ctx.events.len();
        combat::collect_shield_up(world, &mut ctx, shield);
        sounds.push(first_sound(&ctx.events[seen..]));

        // Stale pickup handles are ignored.
        let seen = ctx.events.len();
        combat::collect_bomb_up(world, &mut ctx, bomb);
        assert_eq!(ctx.events.len(), seen);
    }
    assert_eq!(
        sounds,
        vec![Some(SoundId::PowerUp), Some(SoundId::BombUp), Some(SoundId::ShieldUp)]
    );
    assert_eq!(h.world.get::<&Player>(h.player).unwrap().bombs, 3);
    assert_eq!(h.count::<Shield>(), 1);
    assert_eq!(h.count::<PowerUp>() + h.count::<BombUp>() + h.count::<ShieldUp>(), 0);
}

#[test]
fn test_drop_bomb_hits_enemies_on_screen_only() {
    let mut h = Harness::new();
    let visible = enemy_at(
        &mut h.world,
        Enemy::new(ShipKind::Tank, 100.0, true),
        Position::new(100.0, 300.0),
    );
    let hidden = enemy_at(
        &mut h.world,
        Enemy::new(ShipKind::Tank, 100.0, true),
        Position::new(100.0, SCREEN_HEIGHT + 100.0),
    );
    {
        let (world, _, mut ctx) = h.split();
        assert!(combat::drop_bomb(world, &mut ctx));
    }
    let tank_health = ShipKind::Tank.stats().health;
    assert_eq!(
        h.world.get::<&Enemy>(visible).unwrap().health,
        tank_health - HIT_EXPLOSION
    );
    assert_eq!(h.world.get::<&Enemy>(hidden).unwrap().health, tank_health);
    assert_eq!(h.world.get::<&Player>(h.player).unwrap().bombs, 1);

    h.world.get::<&mut Player>(h.player).unwrap().bombs = 0;
    let (world, _, mut ctx) = h.split();
    assert!(!combat::drop_bomb(world, &mut ctx));
}

#[test]
fn test_cancel_motion_is_idempotent() {
    let mut h = Harness::new();
    let pickup = world_setup::spawn_power_up(&mut h.world, Position::new(10.0, 300.0));
    world_setup::cancel_motion(&mut h.world, pickup);
    world_setup::cancel_motion(&mut h.world, pickup);
    assert!(world_setup::remove_entity(&mut h.world, pickup));
    world_setup::cancel_motion(&mut h.world, pickup);
    assert!(!world_setup::remove_entity(&mut h.world, pickup));
}

// ---- Collision detection ----

#[test]
fn test_shield_stops_bullets_and_rammers_but_not_boss() {
    let mut h = Harness::new();
    let player_pos = *h.world.get::<&Position>(h.player).unwrap();
    let center = Hitbox::new(PLAYER_SIZE, PLAYER_SIZE).center(&player_pos);
    world_setup::spawn_shield(&mut h.world, center);

    let bullet = world_setup::spawn_enemy_bullet(&mut h.world, center, glam::Vec2::ZERO, None);
    let rammer = enemy_at(&mut h.world, Enemy::new(ShipKind::Ship, 100.0, false), player_pos);
    let boss = enemy_at(&mut h.world, Enemy::new(ShipKind::Boss, 100.0, true), player_pos);

    let mut masks = MaskStore::new();
    let collisions = collision::detect(&h.world, h.player, &mut masks);
    assert!(collisions.contains(&Collision::BulletStoppedByShield { bullet }));
    assert!(collisions.contains(&Collision::EnemyHitByShield { enemy: rammer }));
    assert!(!collisions.contains(&Collision::EnemyHitByShield { enemy: boss }));
    assert!(!collisions
        .iter()
        .any(|c| matches!(c, Collision::PlayerHitByEnemyBody { .. } | Collision::PlayerHitByEnemyBullet { .. })));

    {
        let (world, _, mut ctx) = h.split();
        collision::apply(world, &mut ctx, &collisions);
    }
    assert!(!h.world.contains(bullet));
    assert!(!h.world.contains(rammer));
    assert!(h.world.contains(boss));
    assert_eq!(h.world.get::<&Player>(h.player).unwrap().lives, 3);
}

#[test]
fn test_bullet_hits_only_one_enemy() {
    let mut h = Harness::new();
    let at = Position::new(100.0, 300.0);
    let a = enemy_at(&mut h.world, Enemy::new(ShipKind::Tank, 100.0, false), at);
    let b = enemy_at(&mut h.world, Enemy::new(ShipKind::Tank, 100.0, false), at);
    bullet_at(&mut h.world, Position::new(110.0, 310.0));

    let collisions = collision::detect(&h.world, h.player, &mut MaskStore::new());
    let hits: Vec<Entity> = collisions
        .iter()
        .filter_map(|c| match c {
            Collision::EnemyHitByBullet { enemy, .. } => Some(*enemy),
            _ => None,
        })
        .collect();
    assert_eq!(hits.len(), 1);
    assert!(hits[0] == a || hits[0] == b);
}

#[test]
fn test_mask_refines_bullet_collision() {
    let mut h = Harness::new();
    let at = Position::new(100.0, 300.0);
    enemy_at(&mut h.world, Enemy::new(ShipKind::Ship, 100.0, false), at);
    // Bullet centre over the lower-left quarter of the ship.
    bullet_at(&mut h.world, Position::new(100.0, 300.0));

    // Only the top half of the 2x2 sprite is opaque.
    let rgba = vec![
        0, 0, 0, 255, 0, 0, 0, 255, //
        0, 0, 0, 0, 0, 0, 0, 0,
    ];
    let mut masks = MaskStore::new();
    masks.insert(ShipKind::Ship, MaskLoader::spawn(2, 2, rgba, 0));
    let collisions = collision::detect(&h.world, h.player, &mut masks);
    assert!(collisions.is_empty(), "transparent pixel must not collide");

    let mut masks = MaskStore::new();
    masks.insert(ShipKind::Ship, MaskLoader::ready(OpacityMask::solid(2, 2)));
    let collisions = collision::detect(&h.world, h.player, &mut masks);
    assert_eq!(collisions.len(), 1);
}

#[test]
fn test_mask_loader_blocks_until_built() {
    let rgba: Vec<u8> = (0..16u8).flat_map(|i| [0, 0, 0, i * 16]).collect();
    let mut loader = MaskLoader::spawn(4, 4, rgba, 127);
    let mask = loader.get();
    assert_eq!((mask.width(), mask.height()), (4, 4));
    assert!(!mask.is_opaque(0, 0));
    assert!(mask.is_opaque(3, 3));
    assert!(loader.is_ready());
}

// ---- Attack intents ----

#[test]
fn test_windup_releases_aimed_bullet() {
    let mut h = Harness::new();
    let shooter = enemy_at(
        &mut h.world,
        Enemy::new(ShipKind::Ship, 200.0, false),
        Position::new(100.0, 500.0),
    );
    // A shooter that cannot start new attacks still releases a wound-up shot.
    h.world
        .insert_one(shooter, AttackWindup { remaining_secs: DT / 2.0 })
        .unwrap();

    attack::run(&mut h.world, &mut h.rng, h.player, DT, &mut h.events);

    assert!(h.world.get::<&AttackWindup>(shooter).is_err());
    let bullets: Vec<Velocity> = h
        .world
        .query::<(&EnemyBullet, &Velocity)>()
        .iter()
        .map(|(_, (_, v))| *v)
        .collect();
    assert_eq!(bullets.len(), 1);
    assert!(bullets[0].y < 0.0, "aimed down at the player");
    assert!((bullets[0].speed() - 200.0).abs() < 1e-2);
    assert!(h
        .events
        .iter()
        .any(|e| matches!(e, GameEvent::Sound { sound: SoundId::EnemyFire, .. })));
}

#[test]
fn test_boss_fires_three_bullet_fan() {
    let mut h = Harness::new();
    let boss = enemy_at(
        &mut h.world,
        Enemy::new(ShipKind::Boss, 200.0, false),
        Position::new(100.0, 500.0),
    );
    h.world
        .insert_one(boss, AttackWindup { remaining_secs: 0.0 })
        .unwrap();
    attack::run(&mut h.world, &mut h.rng, h.player, DT, &mut h.events);
    assert_eq!(h.count::<EnemyBullet>(), 3);
}

// ---- Clock ----

#[test]
fn test_scheduler_pause_freezes_tasks() {
    let mut scheduler = Scheduler::new();
    scheduler.schedule(1.0, TimedTask::AdvanceLevel);
    scheduler.pause();
    assert!(scheduler.advance(5.0).is_empty());
    scheduler.resume();
    assert!(scheduler.advance(0.5).is_empty());
    assert_eq!(scheduler.advance(0.6), vec![TimedTask::AdvanceLevel]);
    assert_eq!(scheduler.pending_count(), 0);
}

#[test]
fn test_scheduler_returns_due_tasks_in_order() {
    let mut scheduler = Scheduler::new();
    scheduler.schedule(2.0, TimedTask::AdvanceLevel);
    scheduler.schedule(1.0, TimedTask::MarkLevelFinished);
    assert_eq!(
        scheduler.advance(3.0),
        vec![TimedTask::MarkLevelFinished, TimedTask::AdvanceLevel]
    );
}

// ---- Level script ----

fn checkpoint_script() -> LevelScript {
    LevelScript::new(
        Level::Level1,
        vec![
            ScriptEntry::new(0, ScriptCommand::BombUp { x: 10.0 }),
            ScriptEntry::new(2, ScriptCommand::Checkpoint),
        ],
        -3.0,
    )
}

#[test]
fn test_level_script_issues_each_second_once() {
    let mut script = checkpoint_script();
    assert_eq!(script.advance(2.5), vec![-2, -1]);
    assert!(script.advance(0.4).is_empty());
    assert_eq!(script.advance(0.6), vec![0]);
    assert_eq!(script.advance(2.5), vec![1, 2, 3]);
    assert_eq!(script.commands_at(0).count(), 1);
    assert_eq!(script.last_second(), Some(2));
}

#[test]
fn test_level_script_rewind_reissues_checkpoint() {
    let mut script = checkpoint_script();
    script.advance(8.0);
    script.rewind_to(2);
    assert_eq!(script.advance(0.1), vec![2]);
    assert!(script.advance(0.1).is_empty());
}

#[test]
fn test_builtin_scripts_form_valid_squadrons() {
    for level in [Level::Level1, Level::Level2, Level::Level3] {
        let mut world = World::new();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let script = LevelScript::for_level(level, SCRIPT_START_SECS);
        let last = script.last_second().unwrap();
        let mut bosses = 0;
        for second in 0..=last {
            for command in script.commands_at(second) {
                if let ScriptCommand::Squadron(spec) = command {
                    squadrons::create_squadron(&mut world, &mut rng, spec)
                        .unwrap_or_else(|e| panic!("{level:?} second {second}: {e}"));
                    if spec.ship == ShipKind::Boss {
                        bosses += 1;
                    }
                }
            }
        }
        assert_eq!(bosses, 1, "{level:?} has exactly one boss");
    }
}

// ---- Engine ----

#[test]
fn test_determinism_same_seed() {
    let config = SimConfig {
        seed: 12345,
        ..Default::default()
    };
    let mut engine_a = SimulationEngine::new(config.clone());
    let mut engine_b = SimulationEngine::new(config);
    engine_a.queue_command(PlayerCommand::StartLevel { level: Level::Level1 });
    engine_b.queue_command(PlayerCommand::StartLevel { level: Level::Level1 });

    for tick in 0..900 {
        if tick % 15 == 0 {
            engine_a.queue_command(PlayerCommand::Fire);
            engine_b.queue_command(PlayerCommand::Fire);
        }
        let json_a = serde_json::to_string(&engine_a.tick().unwrap()).unwrap();
        let json_b = serde_json::to_string(&engine_b.tick().unwrap()).unwrap();
        assert_eq!(json_a, json_b, "snapshots diverged at tick {tick}");
    }
}

#[test]
fn test_engine_waits_in_menu_until_started() {
    let mut engine = SimulationEngine::new(SimConfig::default());
    let snapshot = engine.tick().unwrap();
    assert_eq!(snapshot.phase, GamePhase::MainMenu);
    assert_eq!(snapshot.time.tick, 0);

    engine.queue_command(PlayerCommand::StartLevel { level: Level::Level2 });
    let snapshot = engine.tick().unwrap();
    assert_eq!(snapshot.phase, GamePhase::Active);
    assert_eq!(snapshot.level, Level::Level2);
    assert!(snapshot.script_time > SCRIPT_START_SECS);
}

#[test]
fn test_script_spawns_first_squadron_at_second_zero() {
    let mut engine = SimulationEngine::new(SimConfig::default());
    engine.start();
    let mut squadrons = 0;
    for _ in 0..(2.9 / DT) as usize {
        squadrons = engine.tick().unwrap().squadrons;
    }
    assert_eq!(squadrons, 0, "lead-in spawns nothing");
    for _ in 0..(0.2 / DT) as usize {
        squadrons = engine.tick().unwrap().squadrons;
    }
    assert_eq!(squadrons, 1);
}

#[test]
fn test_pause_freezes_script_clock() {
    let mut engine = SimulationEngine::new(SimConfig::default());
    engine.start();
    engine.tick().unwrap();
    let before = engine.script_time();
    engine.queue_command(PlayerCommand::Pause);
    for _ in 0..120 {
        assert_eq!(engine.tick().unwrap().phase, GamePhase::Paused);
    }
    assert_eq!(engine.script_time(), before);
    assert!(engine.scheduler().is_paused());

    engine.queue_command(PlayerCommand::Resume);
    engine.tick().unwrap();
    assert!(engine.script_time() > before);
}

#[test]
fn test_formation_error_aborts_step() {
    let mut engine = SimulationEngine::new(SimConfig::default());
    engine.start();
    engine.set_script(LevelScript::new(
        Level::Level1,
        vec![ScriptEntry::squadron(
            0,
            SquadronSpec::new(ShipKind::Boss, 2, MotionSpec::BossMove, 80.0),
        )],
        -0.01,
    ));
    let err = engine.step(0.02).unwrap_err();
    assert!(matches!(
        err,
        SimError::Formation(FormationError::MemberCount { expected: 1, actual: 2, .. })
    ));
}

#[test]
fn test_move_is_clamped_to_screen() {
    let mut engine = SimulationEngine::new(SimConfig::default());
    engine.start();
    engine.queue_command(PlayerCommand::Move {
        dx: -10_000.0,
        dy: 10_000.0,
    });
    let snapshot = engine.tick().unwrap();
    assert_eq!(snapshot.player.position.x, 0.0);
    assert_eq!(snapshot.player.position.y, SCREEN_HEIGHT - PLAYER_SIZE);
}

#[test]
fn test_fire_spawns_bullets_by_power_level() {
    let mut engine = SimulationEngine::new(SimConfig::default());
    engine.start();
    engine.queue_command(PlayerCommand::Fire);
    assert_eq!(engine.tick().unwrap().bullets, 1);

    let player = engine.player();
    engine
        .world_mut()
        .get::<&mut Player>(player)
        .unwrap()
        .power_level = PowerLevel::Triple;
    engine.queue_command(PlayerCommand::Fire);
    assert_eq!(engine.tick().unwrap().bullets, 4);
}

#[test]
fn test_game_over_then_continue() {
    let mut engine = SimulationEngine::new(SimConfig {
        lives: 1,
        ..Default::default()
    });
    engine.start();
    let player = engine.player();
    let at = *engine.world().get::<&Position>(player).unwrap();
    world_setup::spawn_enemy_bullet(engine.world_mut(), at, glam::Vec2::ZERO, None);

    let snapshot = engine.tick().unwrap();
    assert_eq!(snapshot.phase, GamePhase::GameOver);
    assert!(snapshot
        .events
        .iter()
        .any(|e| matches!(e, GameEvent::ScoreSubmitted { .. })));
    let game_over_screen =
        |e: &GameEvent| matches!(e, GameEvent::GoToScreen { screen: Screen::GameOver });
    assert_eq!(snapshot.events.iter().filter(|e| game_over_screen(*e)).count(), 1);
    let snapshot = engine.tick().unwrap();
    assert!(!snapshot.events.iter().any(game_over_screen));

    engine.queue_command(PlayerCommand::ContinueWithExtraLife);
    let snapshot = engine.tick().unwrap();
    assert_eq!(snapshot.phase, GamePhase::Active);
    assert_eq!(snapshot.player.lives, 1);
    assert_eq!(snapshot.player.score, 0);
    assert!(snapshot.player.invulnerable);
    assert_eq!(engine.player_state().unwrap().continues, PLAYER_CONTINUES - 1);
}

#[test]
fn test_boss_death_sequence_advances_level() {
    let mut engine = SimulationEngine::new(SimConfig::default());
    engine.start();
    let squadron = engine
        .spawn_squadron(&SquadronSpec::new(ShipKind::Boss, 1, MotionSpec::BossMove, 80.0))
        .unwrap();
    let boss = squadron_members(engine.world(), squadron)[0];
    let at = *engine.world().get::<&Position>(boss).unwrap();
    engine.world_mut().get::<&mut Enemy>(boss).unwrap().health = 1;
    bullet_at(engine.world_mut(), Position::new(at.x + 40.0, at.y + 10.0));

    let mut events = Vec::new();
    collect_events(&mut engine, 1, &mut events);
    assert!(engine.world().get::<&BossExploding>(boss).is_ok());

    // Pausing freezes the sequence.
    engine.queue_command(PlayerCommand::Pause);
    collect_events(&mut engine, 600, &mut events);
    engine.queue_command(PlayerCommand::Resume);
    assert!(engine.world().contains(boss));

    collect_events(&mut engine, (5.0 / DT) as usize, &mut events);
    assert!(engine.world().contains(boss), "still exploding");
    collect_events(&mut engine, (0.5 / DT) as usize, &mut events);
    assert!(!engine.world().contains(boss));

    collect_events(&mut engine, (LEVEL_FINISHED_DELAY / DT) as usize + 5, &mut events);
    let player = engine.player();
    assert!(engine.world().get::<&LevelFinished>(player).is_ok());

    collect_events(&mut engine, (NEXT_LEVEL_DELAY / DT) as usize + 5, &mut events);
    assert_eq!(engine.level(), Level::Level2);
    assert!(events.contains(&GameEvent::NextLevel {
        from: Level::Level1,
        next: Level::Level2
    }));
    assert!(events.contains(&GameEvent::AchievementUnlocked {
        achievement: Achievement::KillBoss
    }));
    let player = engine.player();
    assert!(engine.world().get::<&LevelFinished>(player).is_err());
}

#[derive(Default)]
struct RecordingHost {
    calls: Rc<RefCell<Vec<String>>>,
}

impl GameHost for RecordingHost {
    fn play_sound(&mut self, sound: SoundId, _volume: Option<f32>) {
        self.calls.borrow_mut().push(format!("sound:{sound:?}"));
    }

    fn go_to_screen(&mut self, screen: Screen) {
        self.calls.borrow_mut().push(format!("screen:{screen:?}"));
    }
}

#[test]
fn test_host_receives_dispatched_calls() {
    let host = RecordingHost::default();
    let calls = Rc::clone(&host.calls);
    let mut engine = SimulationEngine::new(SimConfig::default()).with_host(Box::new(host));
    engine.start();
    engine.queue_command(PlayerCommand::Fire);
    engine.tick().unwrap();
    engine.queue_command(PlayerCommand::Quit);
    let snapshot = engine.tick().unwrap();

    assert_eq!(snapshot.phase, GamePhase::MainMenu);
    assert_eq!(
        *calls.borrow(),
        vec!["sound:PlayerFire".to_string(), "screen:Menu".to_string()]
    );
}

#[test]
fn test_config_from_json() {
    let config = SimConfig::from_json(r#"{ "seed": 9, "level": "Level3" }"#).unwrap();
    assert_eq!(config.seed, 9);
    assert_eq!(config.level, Level::Level3);
    assert_eq!(config.lives, PLAYER_LIVES);

    let err = SimConfig::from_json("{ not json").unwrap_err();
    assert!(matches!(err, SimError::Config(_)));
}
