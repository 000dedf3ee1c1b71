//! Level lifecycle: parsing the embedded stage set, building a stage when
//! play begins, watching the exit doors, and routing fail / clear / restart
//! transitions between game states.

use bevy::prelude::*;

use crate::doors::spawn_door;
use crate::hazards::{spawn_hammer, spawn_large_monster, spawn_small_monster, spawn_trap};
use crate::input::PlayerInput;
use crate::keys::spawn_key;
use crate::player::spawn_player;
use crate::shared::*;
use crate::world::{spawn_fireflies, spawn_platform};

mod levels;

pub use levels::{LevelDef, LevelRegistry};

pub struct LevelPlugin;

impl Plugin for LevelPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<LevelRegistry>()
            .init_resource::<CurrentLevel>()
            .add_systems(OnEnter(GameState::Loading), load_stage_set)
            .add_systems(OnEnter(GameState::MainMenu), despawn_level)
            .add_systems(OnEnter(GameState::Playing), spawn_level)
            .add_systems(
                Update,
                (poll_doors, handle_game_over)
                    .in_set(TickSet::Progress)
                    .run_if(in_state(GameState::Playing)),
            )
            .add_systems(
                Update,
                (
                    main_menu_input.run_if(in_state(GameState::MainMenu)),
                    game_over_input.run_if(in_state(GameState::GameOver)),
                    level_complete_input.run_if(in_state(GameState::LevelComplete)),
                ),
            );
    }
}

fn load_stage_set(
    mut registry: ResMut<LevelRegistry>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    info!("LevelPlugin: loading embedded stages…");
    levels::load_levels(&mut registry);
    info!(
        "LevelPlugin: {} stages ready. Transitioning to MainMenu.",
        registry.len()
    );
    next_state.set(GameState::MainMenu);
}

fn despawn_level(mut commands: Commands, level_entities: Query<Entity, With<LevelEntity>>) {
    for entity in level_entities.iter() {
        commands.entity(entity).despawn_recursive();
    }
}

/// Tear down whatever is left of the previous attempt and build the current
/// stage from its definition. Runs on every entry into Playing, so restart
/// and advance are the same code path.
fn spawn_level(
    mut commands: Commands,
    registry: Res<LevelRegistry>,
    current: Res<CurrentLevel>,
    level_entities: Query<Entity, With<LevelEntity>>,
    mut next_state: ResMut<NextState<GameState>>,
    mut music: EventWriter<PlayMusicEvent>,
) {
    for entity in level_entities.iter() {
        commands.entity(entity).despawn_recursive();
    }

    let Some(def) = registry.get(current.0) else {
        error!(
            "No stage at index {} ({} available); returning to menu",
            current.0,
            registry.len()
        );
        next_state.set(GameState::MainMenu);
        return;
    };
    info!("Building stage {} '{}'", current.0 + 1, def.name);

    let boundary = Boundary {
        left: def.bounds.left,
        right: def.bounds.right,
        bottom: def.bounds.bottom,
        top: def.bounds.top,
    };

    spawn_player(&mut commands, vec2(def.player_spawn));
    for platform in &def.platforms {
        spawn_platform(&mut commands, vec2(platform.pos), vec2(platform.half));
    }
    for key in &def.keys {
        spawn_key(&mut commands, key.kind, key.blocking, vec2(key.pos));
    }
    for door in &def.doors {
        spawn_door(&mut commands, door.kind, door.required, vec2(door.pos));
    }
    for hammer in &def.hammers {
        spawn_hammer(
            &mut commands,
            vec2(hammer.top),
            vec2(hammer.bottom),
            hammer.travel_time,
            hammer.pause_time,
        );
    }
    for monster in &def.small_monsters {
        spawn_small_monster(&mut commands, vec2(monster.pos), monster.left_x, monster.right_x);
    }
    for monster in &def.large_monsters {
        spawn_large_monster(
            &mut commands,
            vec2(monster.pos),
            monster.detect_radius,
            monster.smash_offset,
        );
    }
    for trap in &def.traps {
        spawn_trap(&mut commands, vec2(trap.pos), trap.disable_on_hit);
    }
    spawn_fireflies(&mut commands, &boundary, def.fireflies);

    commands.insert_resource(boundary);
    music.send(PlayMusicEvent {
        track_id: "gameplay".to_string(),
    });
}

fn vec2(p: (f32, f32)) -> Vec2 {
    Vec2::new(p.0, p.1)
}

/// The stage is cleared the moment every door is open. Deposits made earlier
/// this tick are visible here, so a final deposit clears immediately.
pub fn poll_doors(
    doors: Query<&Door>,
    mut complete: EventWriter<LevelCompleteEvent>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    if doors.is_empty() || !doors.iter().all(Door::is_open) {
        return;
    }
    info!("All doors open — stage clear");
    complete.send(LevelCompleteEvent);
    next_state.set(GameState::LevelComplete);
}

pub fn handle_game_over(
    mut events: EventReader<GameOverEvent>,
    mut sfx: EventWriter<PlaySfxEvent>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    let Some(cause) = events.read().next().map(|e| e.cause) else {
        return;
    };
    events.clear();
    warn!("Stage failed: {cause:?}");
    sfx.send(PlaySfxEvent {
        sfx_id: "game_over".to_string(),
    });
    next_state.set(GameState::GameOver);
}

fn main_menu_input(
    input: Res<PlayerInput>,
    mut current: ResMut<CurrentLevel>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    if input.confirm || input.jump {
        current.0 = 0;
        next_state.set(GameState::Playing);
    }
}

fn game_over_input(input: Res<PlayerInput>, mut next_state: ResMut<NextState<GameState>>) {
    if input.restart {
        next_state.set(GameState::Playing);
    } else if input.confirm {
        next_state.set(GameState::MainMenu);
    }
}

fn level_complete_input(
    input: Res<PlayerInput>,
    registry: Res<LevelRegistry>,
    mut current: ResMut<CurrentLevel>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    if !input.confirm {
        return;
    }
    if current.0 + 1 < registry.len() {
        current.0 += 1;
        next_state.set(GameState::Playing);
    } else {
        info!("All stages cleared");
        current.0 = 0;
        next_state.set(GameState::MainMenu);
    }
}
