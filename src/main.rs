use bevy::prelude::*;
use bevy::window::{PresentMode, WindowResolution};

use flatling::shared::*;
use flatling::{audio, carry, doors, hazards, input, keys, level, physics, player, ui, world};

fn main() {
    App::new()
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "Flatling".into(),
                        resolution: WindowResolution::new(SCREEN_WIDTH, SCREEN_HEIGHT),
                        present_mode: PresentMode::AutoVsync,
                        resizable: true,
                        ..default()
                    }),
                    ..default()
                })
                .set(ImagePlugin::default_nearest()),
        )
        // Game state
        .init_state::<GameState>()
        // Shared resources
        .init_resource::<Boundary>()
        // Tick ordering: movement commits positions, hazards and contact
        // react to them, interaction consumes input, the carry bucket
        // applies pickup/drop/deposit reactions and re-seats held items,
        // and progression polls the end-of-tick world.
        .configure_sets(
            Update,
            (
                TickSet::Movement,
                TickSet::Hazards,
                TickSet::Contact,
                TickSet::Interact,
                TickSet::Carry,
                TickSet::Progress,
            )
                .chain(),
        )
        // Events
        .add_event::<PickedUpEvent>()
        .add_event::<DroppedEvent>()
        .add_event::<FlattenPlayerEvent>()
        .add_event::<PlayerFlattenedEvent>()
        .add_event::<KeyBreakEvent>()
        .add_event::<DoorOpenedEvent>()
        .add_event::<GameOverEvent>()
        .add_event::<LevelCompleteEvent>()
        .add_event::<PlaySfxEvent>()
        .add_event::<PlayMusicEvent>()
        // Domain plugins
        .add_plugins(input::InputPlugin)
        .add_plugins(physics::PhysicsPlugin)
        .add_plugins(player::PlayerPlugin)
        .add_plugins(carry::CarryPlugin)
        .add_plugins(keys::KeyPlugin)
        .add_plugins(doors::DoorPlugin)
        .add_plugins(hazards::HazardsPlugin)
        .add_plugins(level::LevelPlugin)
        .add_plugins(world::WorldPlugin)
        .add_plugins(audio::AudioPlugin)
        .add_plugins(ui::UiPlugin)
        // Camera
        .add_systems(Startup, setup_camera)
        .run();
}

fn setup_camera(mut commands: Commands) {
    commands.spawn((
        Camera2d,
        Transform::from_scale(Vec3::splat(1.0 / PIXELS_PER_UNIT))
            .with_translation(Vec3::new(0.0, 4.0, 999.0)),
    ));
}
