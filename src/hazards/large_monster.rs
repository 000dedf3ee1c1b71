//! Large monster: Idle → Warning → Smashing → Cooldown.
//!
//! Warning is a pure telegraph (color only, no motion). Smashing drives the
//! body down to a target offset and back, and the hit zone is live only
//! while the stroke is at the bottom. Carrying a flattened small monster
//! makes the player invisible to the detection check.

use bevy::prelude::*;

use crate::physics::{aabb_overlap, circle_aabb_overlap, Collider, LayerMask};
use crate::shared::*;

use super::small_monster::SmallMonster;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LargeState {
    Idle,
    Warning,
    Smashing,
    Cooldown,
}

/// Fractions of the smash stroke spent descending / at the bottom /
/// ascending. The hit zone is live only during the bottom fraction.
const DESCEND_FRACTION: f32 = 0.3;
const BOTTOM_FRACTION: f32 = 0.4;

#[derive(Component, Debug, Clone)]
pub struct LargeMonster {
    pub state: LargeState,
    pub detect_radius: f32,
    pub warning_duration: f32,
    pub smash_duration: f32,
    pub cooldown: f32,
    /// Downward displacement at the full stroke.
    pub smash_offset: f32,
    pub rest_y: f32,
    elapsed: f32,
}

/// One tick's worth of output: vertical displacement from rest and whether
/// the smash zone is currently live.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmashFrame {
    pub offset_y: f32,
    pub zone_active: bool,
}

impl LargeMonster {
    pub fn new(rest_y: f32, detect_radius: f32, smash_offset: f32) -> Self {
        Self {
            state: LargeState::Idle,
            detect_radius,
            warning_duration: 0.6,
            smash_duration: 0.9,
            cooldown: 1.2,
            smash_offset,
            rest_y,
            elapsed: 0.0,
        }
    }

    /// Advance the attack machine. `trigger` is "player detected and not
    /// immune" and is only consulted while Idle — a started sequence always
    /// runs to completion.
    pub fn tick(&mut self, dt: f32, trigger: bool) -> SmashFrame {
        match self.state {
            LargeState::Idle => {
                if trigger {
                    self.state = LargeState::Warning;
                    self.elapsed = 0.0;
                }
                SmashFrame {
                    offset_y: 0.0,
                    zone_active: false,
                }
            }
            LargeState::Warning => {
                self.elapsed += dt;
                if self.elapsed >= self.warning_duration {
                    self.state = LargeState::Smashing;
                    self.elapsed = 0.0;
                }
                SmashFrame {
                    offset_y: 0.0,
                    zone_active: false,
                }
            }
            LargeState::Smashing => {
                self.elapsed += dt;
                let u = (self.elapsed / self.smash_duration).min(1.0);
                let (frac, at_bottom) = stroke(u);
                if self.elapsed >= self.smash_duration {
                    self.state = LargeState::Cooldown;
                    self.elapsed = 0.0;
                }
                SmashFrame {
                    offset_y: -self.smash_offset * frac,
                    zone_active: at_bottom,
                }
            }
            LargeState::Cooldown => {
                self.elapsed += dt;
                if self.elapsed >= self.cooldown {
                    self.state = LargeState::Idle;
                    self.elapsed = 0.0;
                }
                SmashFrame {
                    offset_y: 0.0,
                    zone_active: false,
                }
            }
        }
    }
}

/// Normalised stroke shape: descend, hold at the bottom, ascend.
fn stroke(u: f32) -> (f32, bool) {
    if u < DESCEND_FRACTION {
        (u / DESCEND_FRACTION, false)
    } else if u < DESCEND_FRACTION + BOTTOM_FRACTION {
        (1.0, true)
    } else {
        (((1.0 - u) / (1.0 - DESCEND_FRACTION - BOTTOM_FRACTION)).max(0.0), false)
    }
}

const NORMAL_COLOR: Color = Color::srgb(0.35, 0.3, 0.5);
const WARNING_COLOR: Color = Color::srgb(1.0, 0.7, 0.2);

pub fn spawn_large_monster(
    commands: &mut Commands,
    pos: Vec2,
    detect_radius: f32,
    smash_offset: f32,
) -> Entity {
    let half = Vec2::new(0.8, 0.8);
    commands
        .spawn((
            LargeMonster::new(pos.y, detect_radius, smash_offset),
            Collider::new(half, LayerMask::HAZARD),
            Sprite {
                color: NORMAL_COLOR,
                custom_size: Some(half * 2.0),
                ..default()
            },
            Transform::from_translation(pos.extend(6.0)),
            Visibility::default(),
            LevelEntity,
        ))
        .id()
}

pub fn large_monster_tick(
    time: Res<Time>,
    mut monsters: Query<(&mut LargeMonster, &mut Transform, &mut Sprite, &Collider)>,
    player_query: Query<
        (&Transform, &Collider, &CarrySlot),
        (With<Player>, Without<LargeMonster>),
    >,
    mut small_monsters: Query<
        (&mut SmallMonster, &Transform, &Collider),
        Without<LargeMonster>,
    >,
    mut game_over: EventWriter<GameOverEvent>,
    mut sfx: EventWriter<PlaySfxEvent>,
) {
    let dt = time.delta_secs();
    if dt <= 0.0 {
        return;
    }

    let player = player_query.get_single().ok();

    for (mut monster, mut transform, mut sprite, collider) in monsters.iter_mut() {
        let trigger = player.as_ref().is_some_and(|(player_tf, player_col, slot)| {
            // Carrying a flattened small monster grants immunity.
            let immune = slot
                .0
                .is_some_and(|item| small_monsters.get(item).is_ok());
            !immune
                && circle_aabb_overlap(
                    Vec2::new(transform.translation.x, monster.rest_y),
                    monster.detect_radius,
                    player_col.center(player_tf.translation),
                    player_col.half,
                )
        });

        let was = monster.state;
        let frame = monster.tick(dt, trigger);
        transform.translation.y = monster.rest_y + frame.offset_y;
        sprite.color = if monster.state == LargeState::Warning {
            WARNING_COLOR
        } else {
            NORMAL_COLOR
        };
        if was != LargeState::Smashing && monster.state == LargeState::Smashing {
            sfx.send(PlaySfxEvent {
                sfx_id: "smash".to_string(),
            });
        }

        if !frame.zone_active {
            continue;
        }

        // The displaced body is the smash zone while the stroke is at the
        // bottom: a player overlapping it fails the level, and any small
        // monster caught under it is flattened.
        let zone_center = collider.center(transform.translation);
        if let Some((player_tf, player_col, _)) = player.as_ref() {
            if aabb_overlap(
                zone_center,
                collider.half,
                player_col.center(player_tf.translation),
                player_col.half,
            ) {
                game_over.send(GameOverEvent {
                    cause: FailCause::Smashed,
                });
            }
        }
        for (mut small, small_tf, small_col) in small_monsters.iter_mut() {
            if aabb_overlap(
                zone_center,
                collider.half,
                small_col.center(small_tf.translation),
                small_col.half,
            ) {
                small.flatten();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monster() -> LargeMonster {
        LargeMonster::new(0.0, 6.0, 2.0)
    }

    #[test]
    fn idle_holds_until_triggered() {
        let mut m = monster();
        for _ in 0..100 {
            let frame = m.tick(0.016, false);
            assert_eq!(m.state, LargeState::Idle);
            assert_eq!(frame.offset_y, 0.0);
            assert!(!frame.zone_active);
        }
    }

    #[test]
    fn full_attack_sequence_and_rearm() {
        let mut m = monster();
        m.tick(0.01, true);
        assert_eq!(m.state, LargeState::Warning);

        // Warning is a fixed telegraph with no motion.
        let frame = m.tick(m.warning_duration / 2.0, true);
        assert_eq!(frame.offset_y, 0.0);

        m.tick(m.warning_duration, false);
        assert_eq!(m.state, LargeState::Smashing);

        // Bottom of the stroke: full offset, zone live.
        let frame = m.tick(m.smash_duration * 0.5, false);
        assert_eq!(m.state, LargeState::Smashing);
        assert!(frame.zone_active);
        assert!((frame.offset_y - -m.smash_offset).abs() < 1e-6);

        m.tick(m.smash_duration, false);
        assert_eq!(m.state, LargeState::Cooldown);

        // Cooldown ignores the player entirely.
        m.tick(m.cooldown / 2.0, true);
        assert_eq!(m.state, LargeState::Cooldown);
        m.tick(m.cooldown, true);
        assert_eq!(m.state, LargeState::Idle);
    }

    #[test]
    fn zone_is_inactive_while_descending_and_ascending() {
        let mut m = monster();
        m.state = LargeState::Smashing;
        let frame = m.tick(m.smash_duration * 0.1, false);
        assert!(!frame.zone_active, "descending");
        let frame = m.tick(m.smash_duration * 0.75, false);
        assert!(!frame.zone_active, "ascending");
    }

    #[test]
    fn stroke_shape_is_down_hold_up() {
        assert_eq!(stroke(0.0).0, 0.0);
        assert_eq!(stroke(0.15), (0.5, false));
        assert_eq!(stroke(0.5), (1.0, true));
        let (frac, active) = stroke(0.85);
        assert!(!active);
        assert!((frac - 0.5).abs() < 1e-6);
        assert_eq!(stroke(1.0), (0.0, false));
    }
}
