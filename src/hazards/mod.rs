//! Hazard domain: the oscillating hammer, both monster kinds, and static
//! traps. Everything here talks to the rest of the game through shared
//! events; the only direct component dependency is the physics layer.

use bevy::prelude::*;

use crate::shared::*;

mod hammer;
mod large_monster;
mod small_monster;
mod trap;

pub use hammer::{spawn_hammer, Hammer, HammerPhase};
pub use large_monster::{spawn_large_monster, LargeMonster, LargeState, SmashFrame};
pub use small_monster::{monster_touch_player, spawn_small_monster, MonsterState, SmallMonster};
pub use trap::{spawn_trap, Trap};

pub struct HazardsPlugin;

impl Plugin for HazardsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (
                (hammer::hammer_tick, hammer::hammer_contact).chain(),
                small_monster::small_monster_ai,
                small_monster::monster_touch_player,
                large_monster::large_monster_tick,
                trap::trap_touch_player,
            )
                .in_set(TickSet::Hazards)
                .run_if(in_state(GameState::Playing)),
        )
        // Carry-protocol reactions read events sent by the interact
        // dispatch, so they live in the post-interact bucket.
        .add_systems(
            Update,
            (
                small_monster::flattened_gains_carryable,
                small_monster::monster_carry_sync,
            )
                .in_set(TickSet::Carry)
                .run_if(in_state(GameState::Playing)),
        );
    }
}
