//! Cleanup system: removes free-moving entities that left the screen.

use hecs::{Entity, World};

use spacekiller_core::components::Removable;
use spacekiller_core::constants::{OOB_MARGIN, SCREEN_HEIGHT, SCREEN_WIDTH};
use spacekiller_core::types::Position;

/// Uses a pre-allocated buffer to avoid per-tick allocation.
pub fn run(world: &mut World, despawn_buffer: &mut Vec<Entity>) {
    despawn_buffer.clear();

    for (entity, (pos, _removable)) in world.query_mut::<(&Position, &Removable)>() {
        let outside = pos.x < -OOB_MARGIN
            || pos.x > SCREEN_WIDTH + OOB_MARGIN
            || pos.y < -OOB_MARGIN
            || pos.y > SCREEN_HEIGHT + OOB_MARGIN;
        if outside {
            despawn_buffer.push(entity);
        }
    }

    for entity in despawn_buffer.drain(..) {
        let _ = world.despawn(entity);
    }
}
