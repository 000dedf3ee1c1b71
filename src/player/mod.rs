mod flatten;
mod interaction;
mod movement;
mod spawn;

pub use flatten::apply_flatten;
pub use flatten::handle_flatten_events;
pub use interaction::player_interact;
pub use movement::player_movement;
pub use spawn::spawn_player;

use bevy::prelude::*;

use crate::shared::*;

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (
                movement::player_movement.in_set(TickSet::Movement),
                flatten::handle_flatten_events.in_set(TickSet::Contact),
                interaction::player_interact.in_set(TickSet::Interact),
            )
                .run_if(in_state(GameState::Playing)),
        );
    }
}
