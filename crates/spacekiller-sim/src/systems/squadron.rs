//! Squadron sweep: finalizes every squadron whose member set is empty.
//!
//! A finalized squadron is despawned, so it can never be finalized twice.
//! Rewards are withheld while one of its attacks is still outstanding.

use hecs::{Entity, World};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use spacekiller_core::components::Squadron;
use spacekiller_core::constants::SCORE_TEXT_LIFETIME;
use spacekiller_core::events::GameEvent;

use crate::clock::TimedTask;
use crate::systems::attack;
use crate::systems::combat::{self, CombatContext};
use crate::world_setup;

pub fn run(world: &mut World, rng: &mut ChaCha8Rng, ctx: &mut CombatContext) {
    attack::refresh_pending(world);
    let finished: Vec<(Entity, Squadron)> = world
        .query::<&Squadron>()
        .iter()
        .filter(|(_, squadron)| squadron.is_empty())
        .map(|(entity, squadron)| (entity, squadron.clone()))
        .collect();

    for (entity, squadron) in finished {
        let _ = world.despawn(entity);
        if squadron.attack_pending {
            debug!("squadron finalized with an attack pending, no reward");
            continue;
        }
        reward(world, rng, ctx, &squadron);
    }
}

fn reward(world: &mut World, rng: &mut ChaCha8Rng, ctx: &mut CombatContext, squadron: &Squadron) {
    let at = squadron.last_killed_position;

    if squadron.power_up_after_destruction {
        if rng.gen_bool(0.5) {
            world_setup::spawn_power_up(world, at);
        } else {
            world_setup::spawn_shield_up(world, at);
        }
    }

    if squadron.display_bonus {
        combat::award_score(world, ctx, squadron.score_bonus);
        let text = world_setup::spawn_score_text(world, at, squadron.score_bonus);
        ctx.scheduler
            .schedule(SCORE_TEXT_LIFETIME, TimedTask::RemoveEntity(text));
        ctx.events.push(GameEvent::SquadronBonus {
            bonus: squadron.score_bonus,
            position: at,
        });
    }

    debug!(
        power_up = squadron.power_up_after_destruction,
        bonus = squadron.score_bonus,
        "squadron destroyed"
    );
}
