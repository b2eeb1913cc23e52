//! Squadron creation and membership bookkeeping.

use hecs::{Entity, World};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use spacekiller_core::components::{Enemy, Squadron};
use spacekiller_core::error::FormationError;
use spacekiller_core::enums::ShipKind;
use spacekiller_core::types::Position;
use spacekiller_paths::formation::{self, MotionSpec};

use crate::world_setup;

/// Everything needed to put a squadron on screen.
#[derive(Debug, Clone, PartialEq)]
pub struct SquadronSpec {
    pub ship: ShipKind,
    pub members: usize,
    pub motion: MotionSpec,
    pub velocity: f32,
    pub bullet_velocity: f32,
    pub power_up: bool,
    pub display_bonus: bool,
    pub bonus: u32,
}

impl SquadronSpec {
    pub fn new(ship: ShipKind, members: usize, motion: MotionSpec, velocity: f32) -> Self {
        Self {
            ship,
            members,
            motion,
            velocity,
            bullet_velocity: DEFAULT_BULLET_VELOCITY,
            power_up: false,
            display_bonus: false,
            bonus: 0,
        }
    }

    /// Drop a power-up or shield-up where the last member died.
    pub fn with_power_up(mut self) -> Self {
        self.power_up = true;
        self
    }

    /// Award and display `bonus` once every member has been shot down.
    pub fn with_bonus(mut self, bonus: u32) -> Self {
        self.display_bonus = true;
        self.bonus = bonus;
        self
    }

    pub fn with_bullet_velocity(mut self, bullet_velocity: f32) -> Self {
        self.bullet_velocity = bullet_velocity;
        self
    }
}

/// Enemy bullet speed when a script does not set one (pixels/second).
pub const DEFAULT_BULLET_VELOCITY: f32 = 200.0;

/// Lay out the formation and spawn the squadron with all its members.
///
/// The formation is validated before anything is spawned, so a bad
/// parameter set leaves the world untouched.
pub fn create_squadron(
    world: &mut World,
    rng: &mut ChaCha8Rng,
    spec: &SquadronSpec,
) -> Result<Entity, FormationError> {
    let hitbox = spec.ship.stats().hitbox;
    let placements = formation::form(&spec.motion, spec.velocity, &vec![hitbox; spec.members])?;

    let squadron = world.spawn((Squadron::new(spec.power_up, spec.display_bonus, spec.bonus),));

    let mut members = Vec::with_capacity(placements.len());
    for placement in placements {
        let mut enemy = world_setup::enemy_for(spec.ship, spec.bullet_velocity, rng.gen_bool(0.5));
        enemy.squadron = Some(squadron);
        members.push(world_setup::spawn_enemy(
            world,
            enemy,
            placement.start,
            placement.path,
        ));
    }

    if let Ok(mut s) = world.get::<&mut Squadron>(squadron) {
        s.add_members(&members);
    }

    debug!(
        ship = ?spec.ship,
        motion = ?spec.motion.kind(),
        members = members.len(),
        "squadron created"
    );
    Ok(squadron)
}

/// Unlink a member from its squadron, recording where it was. Returns the
/// squadron it belonged to. Idempotent: a second call finds no squadron.
pub fn detach_member(world: &mut World, enemy: Entity) -> Option<Entity> {
    let (squadron, at) = {
        let mut e = world.get::<&mut Enemy>(enemy).ok()?;
        let squadron = e.squadron.take()?;
        let at = world.get::<&Position>(enemy).map(|p| *p).unwrap_or_default();
        (squadron, at)
    };
    if let Ok(mut s) = world.get::<&mut Squadron>(squadron) {
        s.remove_member(enemy, at);
    }
    Some(squadron)
}

/// A member left the screen alive: the squadron no longer earns its
/// power-up, then the member is detached.
pub fn detach_escaped_member(world: &mut World, enemy: Entity) -> Option<Entity> {
    let squadron = world.get::<&Enemy>(enemy).ok()?.squadron?;
    if let Ok(mut s) = world.get::<&mut Squadron>(squadron) {
        s.power_up_after_destruction = false;
    }
    detach_member(world, enemy)
}
