use bevy::prelude::*;

use crate::shared::*;

pub struct AudioPlugin;

impl Plugin for AudioPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<MusicState>()
            .add_systems(OnEnter(GameState::MainMenu), start_menu_music)
            .add_systems(
                Update,
                (play_notification_sfx, handle_play_sfx, handle_play_music).chain(),
            );
    }
}

/// Tracks the currently playing music entity.
#[derive(Resource, Default)]
pub struct MusicState {
    pub current_track: Option<Entity>,
    pub current_track_id: String,
}

/// Maps SFX IDs (sent by other domains) to actual audio file paths.
fn sfx_path(sfx_id: &str) -> Option<&'static str> {
    match sfx_id {
        "pickup" => Some("audio/sfx/sfx_coin_single1.ogg"),
        "drop" => Some("audio/sfx/sfx_sounds_interaction5.ogg"),
        "deposit" => Some("audio/sfx/sfx_menu_select1.ogg"),
        "door_open" => Some("audio/sfx/sfx_movement_dooropen1.ogg"),
        "key_break" => Some("audio/sfx/sfx_sounds_impact5.ogg"),
        "flatten" => Some("audio/sfx/sfx_damage_hit1.ogg"),
        "smash" => Some("audio/sfx/sfx_sounds_impact1.ogg"),
        "jump" => Some("audio/sfx/sfx_movement_jump1.ogg"),
        "game_over" => Some("audio/sfx/sfx_sounds_error1.ogg"),
        "level_complete" => Some("audio/sfx/sfx_sounds_fanfare1.ogg"),
        _ => None,
    }
}

/// Maps music track IDs to actual audio file paths.
fn music_path(track_id: &str) -> Option<&'static str> {
    match track_id {
        "menu" => Some("audio/music/pixel_1.ogg"),
        "gameplay" => Some("audio/music/pixel_2.ogg"),
        _ => None,
    }
}

/// Turn gameplay notifications into sound requests. The emitting domains
/// announce the fact; what it sounds like is decided here.
pub fn play_notification_sfx(
    mut flattened: EventReader<PlayerFlattenedEvent>,
    mut doors_opened: EventReader<DoorOpenedEvent>,
    mut stages_cleared: EventReader<LevelCompleteEvent>,
    mut sfx: EventWriter<PlaySfxEvent>,
) {
    if !flattened.is_empty() {
        flattened.clear();
        sfx.send(PlaySfxEvent {
            sfx_id: "flatten".to_string(),
        });
    }
    for _ in doors_opened.read() {
        sfx.send(PlaySfxEvent {
            sfx_id: "door_open".to_string(),
        });
    }
    if !stages_cleared.is_empty() {
        stages_cleared.clear();
        sfx.send(PlaySfxEvent {
            sfx_id: "level_complete".to_string(),
        });
    }
}

/// Listen for PlaySfxEvent and spawn one-shot audio sources that auto-despawn.
fn handle_play_sfx(
    mut events: EventReader<PlaySfxEvent>,
    mut commands: Commands,
    asset_server: Res<AssetServer>,
) {
    for event in events.read() {
        if let Some(path) = sfx_path(&event.sfx_id) {
            commands.spawn((
                AudioPlayer::new(asset_server.load(path)),
                PlaybackSettings::DESPAWN,
            ));
        }
    }
}

/// Listen for PlayMusicEvent, stop the current track, and start a new one.
/// Requesting the track that is already playing is a no-op, so a restart
/// does not hiccup the music.
fn handle_play_music(
    mut events: EventReader<PlayMusicEvent>,
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    mut music_state: ResMut<MusicState>,
) {
    for event in events.read() {
        if music_state.current_track.is_some()
            && music_state.current_track_id == event.track_id
        {
            continue;
        }

        if let Some(entity) = music_state.current_track {
            commands.entity(entity).despawn_recursive();
        }

        if let Some(path) = music_path(&event.track_id) {
            let entity = commands
                .spawn((
                    AudioPlayer::new(asset_server.load(path)),
                    PlaybackSettings::LOOP,
                ))
                .id();
            music_state.current_track = Some(entity);
            music_state.current_track_id = event.track_id.clone();
        } else {
            music_state.current_track = None;
            music_state.current_track_id.clear();
        }
    }
}

fn start_menu_music(mut music_events: EventWriter<PlayMusicEvent>) {
    music_events.send(PlayMusicEvent {
        track_id: "menu".to_string(),
    });
}
