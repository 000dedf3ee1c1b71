//! Static traps. Touching one fails the level; a one-shot trap disables
//! itself after firing so the game-over handler decides what happens next.

use bevy::prelude::*;

use crate::physics::{aabb_overlap, Collider, LayerMask};
use crate::shared::*;

#[derive(Component, Debug, Clone)]
pub struct Trap {
    pub disable_on_hit: bool,
    pub armed: bool,
}

pub fn spawn_trap(commands: &mut Commands, pos: Vec2, disable_on_hit: bool) -> Entity {
    let half = Vec2::new(0.4, 0.2);
    commands
        .spawn((
            Trap {
                disable_on_hit,
                armed: true,
            },
            Collider::new(half, LayerMask::HAZARD),
            Sprite {
                color: Color::srgb(0.6, 0.1, 0.1),
                custom_size: Some(half * 2.0),
                ..default()
            },
            Transform::from_translation(pos.extend(3.0)),
            Visibility::default(),
            LevelEntity,
        ))
        .id()
}

pub fn trap_touch_player(
    mut traps: Query<(&mut Trap, &Transform, &Collider, &mut Sprite)>,
    player_query: Query<(&Transform, &Collider), (With<Player>, Without<Trap>)>,
    mut game_over: EventWriter<GameOverEvent>,
) {
    let Ok((player_tf, player_col)) = player_query.get_single() else {
        return;
    };
    let player_center = player_col.center(player_tf.translation);

    for (mut trap, transform, collider, mut sprite) in traps.iter_mut() {
        if !trap.armed || !collider.enabled {
            continue;
        }
        if aabb_overlap(
            collider.center(transform.translation),
            collider.half,
            player_center,
            player_col.half,
        ) {
            game_over.send(GameOverEvent {
                cause: FailCause::Trap,
            });
            if trap.disable_on_hit {
                trap.armed = false;
                sprite.color = Color::srgb(0.3, 0.2, 0.2);
            }
        }
    }
}
