//! Menus and gameplay overlays. Every screen is a full-window root node
//! spawned on state entry and despawned on exit; the state transitions
//! themselves live in the level domain.

use bevy::prelude::*;

use crate::level::LevelRegistry;
use crate::shared::*;

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(GameState::MainMenu), spawn_main_menu)
            .add_systems(OnExit(GameState::MainMenu), despawn_screen::<MainMenuRoot>)
            .add_systems(OnEnter(GameState::Playing), spawn_hud)
            .add_systems(OnExit(GameState::Playing), despawn_screen::<HudRoot>)
            .add_systems(OnEnter(GameState::GameOver), spawn_game_over)
            .add_systems(OnExit(GameState::GameOver), despawn_screen::<GameOverRoot>)
            .add_systems(OnEnter(GameState::LevelComplete), spawn_level_complete)
            .add_systems(
                OnExit(GameState::LevelComplete),
                despawn_screen::<LevelCompleteRoot>,
            );
    }
}

#[derive(Component)]
pub struct MainMenuRoot;

#[derive(Component)]
pub struct HudRoot;

#[derive(Component)]
pub struct GameOverRoot;

#[derive(Component)]
pub struct LevelCompleteRoot;

fn despawn_screen<T: Component>(mut commands: Commands, query: Query<Entity, With<T>>) {
    for entity in &query {
        commands.entity(entity).despawn_recursive();
    }
}

fn overlay_root() -> Node {
    Node {
        width: Val::Percent(100.0),
        height: Val::Percent(100.0),
        justify_content: JustifyContent::Center,
        align_items: AlignItems::Center,
        flex_direction: FlexDirection::Column,
        row_gap: Val::Px(24.0),
        ..default()
    }
}

fn spawn_main_menu(mut commands: Commands) {
    commands
        .spawn((
            MainMenuRoot,
            overlay_root(),
            BackgroundColor(Color::srgb(0.07, 0.09, 0.14)),
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new("FLATLING"),
                TextFont {
                    font_size: 56.0,
                    ..default()
                },
                TextColor(Color::srgb(1.0, 0.85, 0.4)),
            ));
            parent.spawn((
                Text::new("Carry the keys. Mind the hammer."),
                TextFont {
                    font_size: 18.0,
                    ..default()
                },
                TextColor(Color::srgb(0.6, 0.7, 0.8)),
            ));
            parent.spawn((
                Text::new("Press Enter to Start"),
                TextFont {
                    font_size: 24.0,
                    ..default()
                },
                TextColor(Color::WHITE),
            ));
        });
}

fn spawn_hud(mut commands: Commands, registry: Res<LevelRegistry>, current: Res<CurrentLevel>) {
    let banner = registry
        .get(current.0)
        .map(|def| format!("Stage {} — {}", current.0 + 1, def.name))
        .unwrap_or_default();

    commands
        .spawn((
            HudRoot,
            Node {
                width: Val::Percent(100.0),
                padding: UiRect::all(Val::Px(10.0)),
                justify_content: JustifyContent::Center,
                ..default()
            },
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new(banner),
                TextFont {
                    font_size: 18.0,
                    ..default()
                },
                TextColor(Color::srgba(1.0, 1.0, 1.0, 0.7)),
            ));
        });
}

fn spawn_game_over(mut commands: Commands) {
    commands
        .spawn((
            GameOverRoot,
            overlay_root(),
            BackgroundColor(Color::srgba(0.1, 0.02, 0.02, 0.85)),
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new("Game Over!"),
                TextFont {
                    font_size: 48.0,
                    ..default()
                },
                TextColor(Color::srgb(0.9, 0.25, 0.2)),
            ));
            parent.spawn((
                Text::new("Press R to Restart — Enter for Menu"),
                TextFont {
                    font_size: 20.0,
                    ..default()
                },
                TextColor(Color::WHITE),
            ));
        });
}

fn spawn_level_complete(
    mut commands: Commands,
    registry: Res<LevelRegistry>,
    current: Res<CurrentLevel>,
) {
    let last = current.0 + 1 >= registry.len();
    let prompt = if last {
        "That was the last stage — Enter for Menu"
    } else {
        "Press Enter for the Next Stage"
    };

    commands
        .spawn((
            LevelCompleteRoot,
            overlay_root(),
            BackgroundColor(Color::srgba(0.02, 0.08, 0.04, 0.85)),
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new("Stage Clear!"),
                TextFont {
                    font_size: 48.0,
                    ..default()
                },
                TextColor(Color::srgb(0.4, 0.9, 0.4)),
            ));
            parent.spawn((
                Text::new(prompt),
                TextFont {
                    font_size: 20.0,
                    ..default()
                },
                TextColor(Color::WHITE),
            ));
        });
}
