//! Motion system: steps every `PathFollower` and places its entity.
//!
//! Path-driven entities never go through velocity integration. An entity
//! whose path completes is removed; an enemy leaving this way also costs
//! its squadron the power-up reward.

use hecs::{Entity, World};

use spacekiller_core::components::{BossExploding, Enemy};
use spacekiller_core::path::PathFollower;
use spacekiller_core::types::Position;

use crate::squadrons;
use crate::systems::combat::has;
use crate::world_setup;

pub fn run(world: &mut World, dt: f32, finished: &mut Vec<Entity>) {
    finished.clear();

    for (entity, (pos, follower)) in world.query_mut::<(&mut Position, &mut PathFollower)>() {
        *pos = follower.advance(dt);
        if follower.finished {
            finished.push(entity);
        }
    }

    for entity in finished.drain(..) {
        if has::<BossExploding>(world, entity) {
            // The death drift ends in place; the sequence removes the boss.
            world_setup::cancel_motion(world, entity);
            continue;
        }
        if has::<Enemy>(world, entity) {
            squadrons::detach_escaped_member(world, entity);
        }
        world_setup::remove_entity(world, entity);
    }
}
