//! Movement system: integrates velocity into position for free-moving
//! entities (bullets). Path-driven entities are skipped.

use hecs::World;

use spacekiller_core::path::PathFollower;
use spacekiller_core::types::{Position, Velocity};

pub fn run(world: &mut World, dt: f32) {
    for (_entity, (pos, vel)) in world
        .query_mut::<(&mut Position, &Velocity)>()
        .without::<&PathFollower>()
    {
        pos.x += vel.x * dt;
        pos.y += vel.y * dt;
    }
}
