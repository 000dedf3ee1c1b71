//! The oscillating hammer: a kinematic actor cycling between two fixed
//! points forever. Timing lives in a plain state machine advanced by
//! `tick(dt)`, so the cycle can be unit-tested with exact steps.
//!
//! Contact effects: a grounded player is flattened permanently (the hammer
//! never causes game over) and a carried Normal key breaks; loose keys the
//! hammer passes over break too (held keys are excluded on that path so a
//! key is never broken twice in one contact).

use bevy::prelude::*;

use crate::physics::{aabb_overlap, Collider, LayerMask};
use crate::shared::*;

use super::small_monster::SmallMonster;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HammerPhase {
    MovingToBottom,
    PausedAtBottom,
    MovingToTop,
    PausedAtTop,
}

/// Purely periodic; carries no player-dependent state.
#[derive(Component, Debug, Clone)]
pub struct Hammer {
    top: Vec2,
    bottom: Vec2,
    travel_time: f32,
    pause_time: f32,
    phase: HammerPhase,
    elapsed: f32,
}

impl Hammer {
    /// Missing or degenerate configuration is fatal to this entity only:
    /// the caller logs and skips spawning the component.
    pub fn new(top: Vec2, bottom: Vec2, travel_time: f32, pause_time: f32) -> Result<Self, &'static str> {
        if travel_time <= 0.0 {
            return Err("travel_time must be positive");
        }
        if pause_time < 0.0 {
            return Err("pause_time must not be negative");
        }
        if top == bottom {
            return Err("top and bottom endpoints coincide");
        }
        Ok(Self {
            top,
            bottom,
            travel_time,
            pause_time,
            phase: HammerPhase::MovingToBottom,
            elapsed: 0.0,
        })
    }

    pub fn phase(&self) -> HammerPhase {
        self.phase
    }

    pub fn position(&self) -> Vec2 {
        match self.phase {
            HammerPhase::MovingToBottom => {
                self.top.lerp(self.bottom, self.elapsed / self.travel_time)
            }
            HammerPhase::PausedAtBottom => self.bottom,
            HammerPhase::MovingToTop => {
                self.bottom.lerp(self.top, self.elapsed / self.travel_time)
            }
            HammerPhase::PausedAtTop => self.top,
        }
    }

    /// Advance the cycle. Large `dt` rolls across phase boundaries with the
    /// leftover time, so timing never drifts.
    pub fn tick(&mut self, dt: f32) {
        let mut remaining = dt;
        while remaining > 0.0 {
            let phase_len = match self.phase {
                HammerPhase::MovingToBottom | HammerPhase::MovingToTop => self.travel_time,
                HammerPhase::PausedAtBottom | HammerPhase::PausedAtTop => self.pause_time,
            };
            let left_in_phase = phase_len - self.elapsed;
            if remaining < left_in_phase {
                self.elapsed += remaining;
                break;
            }
            remaining -= left_in_phase;
            self.elapsed = 0.0;
            self.phase = match self.phase {
                HammerPhase::MovingToBottom => HammerPhase::PausedAtBottom,
                HammerPhase::PausedAtBottom => HammerPhase::MovingToTop,
                HammerPhase::MovingToTop => HammerPhase::PausedAtTop,
                HammerPhase::PausedAtTop => HammerPhase::MovingToBottom,
            };
        }
    }
}

/// Edge-detection state for player contact so the flatten/break effects
/// fire once per touch, not every overlapping frame.
#[derive(Component, Debug, Default)]
pub struct HammerContactState {
    touching_player: bool,
}

pub fn spawn_hammer(
    commands: &mut Commands,
    top: Vec2,
    bottom: Vec2,
    travel_time: f32,
    pause_time: f32,
) -> Option<Entity> {
    let hammer = match Hammer::new(top, bottom, travel_time, pause_time) {
        Ok(h) => h,
        Err(reason) => {
            error!("Hammer disabled: {reason}");
            return None;
        }
    };
    let half = Vec2::new(0.6, 0.45);
    Some(
        commands
            .spawn((
                hammer,
                HammerContactState::default(),
                Collider::new(half, LayerMask::HAZARD),
                Sprite {
                    color: Color::srgb(0.6, 0.6, 0.65),
                    custom_size: Some(half * 2.0),
                    ..default()
                },
                Transform::from_translation(top.extend(6.0)),
                Visibility::default(),
                LevelEntity,
            ))
            .id(),
    )
}

pub fn hammer_tick(time: Res<Time>, mut hammers: Query<(&mut Hammer, &mut Transform)>) {
    let dt = time.delta_secs();
    for (mut hammer, mut transform) in hammers.iter_mut() {
        hammer.tick(dt);
        let pos = hammer.position();
        transform.translation.x = pos.x;
        transform.translation.y = pos.y;
    }
}

pub fn hammer_contact(
    mut hammers: Query<(&Transform, &Collider, &mut HammerContactState), With<Hammer>>,
    player_query: Query<(&Transform, &PlayerBody, &Collider, &CarrySlot), With<Player>>,
    keys: Query<(Entity, &Key, &Transform, &Collider, &Carryable), Without<Hammer>>,
    mut monsters: Query<(&Transform, &Collider, &mut SmallMonster), Without<Hammer>>,
    mut flatten_player: EventWriter<FlattenPlayerEvent>,
    mut break_key: EventWriter<KeyBreakEvent>,
    mut sfx: EventWriter<PlaySfxEvent>,
) {
    for (hammer_tf, hammer_col, mut contact) in hammers.iter_mut() {
        let hammer_center = hammer_col.center(hammer_tf.translation);

        // Player: flatten on first contact while grounded; a carried Normal
        // key breaks in the same blow.
        if let Ok((player_tf, body, player_col, slot)) = player_query.get_single() {
            let overlapping = aabb_overlap(
                hammer_center,
                hammer_col.half,
                player_col.center(player_tf.translation),
                player_col.half,
            );
            if overlapping && !contact.touching_player {
                contact.touching_player = true;
                if body.grounded {
                    if let Some(item) = slot.0 {
                        if let Ok((_, key, _, _, carryable)) = keys.get(item) {
                            if key.kind == KeyKind::Normal && carryable.held {
                                break_key.send(KeyBreakEvent { key: item });
                            }
                        }
                    }
                    flatten_player.send(FlattenPlayerEvent { permanent: true });
                }
            } else if !overlapping {
                contact.touching_player = false;
            }
        }

        // Loose keys under the hammer break. Held keys are handled on the
        // player-contact path above.
        for (entity, _, key_tf, key_col, carryable) in keys.iter() {
            if carryable.held || !key_col.enabled {
                continue;
            }
            if aabb_overlap(
                hammer_center,
                hammer_col.half,
                key_col.center(key_tf.translation),
                key_col.half,
            ) {
                break_key.send(KeyBreakEvent { key: entity });
            }
        }

        // Small monsters get flattened.
        for (monster_tf, monster_col, mut monster) in monsters.iter_mut() {
            if aabb_overlap(
                hammer_center,
                hammer_col.half,
                monster_col.center(monster_tf.translation),
                monster_col.half,
            ) && monster.flatten()
            {
                sfx.send(PlaySfxEvent {
                    sfx_id: "flatten".to_string(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hammer() -> Hammer {
        Hammer::new(Vec2::new(0.0, 3.0), Vec2::new(0.0, 0.0), 1.0, 0.7).unwrap()
    }

    #[test]
    fn cycle_returns_to_top_after_one_round_trip() {
        let mut h = hammer();
        let start = h.position();
        assert_eq!(start, Vec2::new(0.0, 3.0));

        // One full round trip: 2 * (travel + pause) = 3.4 s.
        let steps = 340;
        for _ in 0..steps {
            h.tick(3.4 / steps as f32);
        }
        assert!((h.position() - start).length() < 1e-3);
    }

    #[test]
    fn phase_sequence_is_fixed() {
        let mut h = hammer();
        assert_eq!(h.phase(), HammerPhase::MovingToBottom);
        h.tick(1.0);
        assert_eq!(h.phase(), HammerPhase::PausedAtBottom);
        assert_eq!(h.position(), Vec2::ZERO);
        h.tick(0.7);
        assert_eq!(h.phase(), HammerPhase::MovingToTop);
        h.tick(1.0);
        assert_eq!(h.phase(), HammerPhase::PausedAtTop);
        h.tick(0.7);
        assert_eq!(h.phase(), HammerPhase::MovingToBottom);
    }

    #[test]
    fn midpoint_of_travel_is_linearly_interpolated() {
        let mut h = hammer();
        h.tick(0.5);
        assert!((h.position().y - 1.5).abs() < 1e-6);
    }

    #[test]
    fn oversized_dt_rolls_across_phase_boundaries() {
        let mut h = hammer();
        h.tick(1.5); // 1.0 travel + 0.5 into the bottom pause
        assert_eq!(h.phase(), HammerPhase::PausedAtBottom);
        // 0.2 pause left + 1.0 up + 0.7 pause + 1.0 down + 0.7 pause + 1.0 up
        // = 4.6, leaving 0.4 inside the top pause.
        h.tick(5.0);
        assert_eq!(h.phase(), HammerPhase::PausedAtTop);
        assert_eq!(h.position(), Vec2::new(0.0, 3.0));
    }

    #[test]
    fn degenerate_configuration_is_rejected() {
        assert!(Hammer::new(Vec2::ZERO, Vec2::ZERO, 1.0, 0.7).is_err());
        assert!(Hammer::new(Vec2::Y, Vec2::ZERO, 0.0, 0.7).is_err());
        assert!(Hammer::new(Vec2::Y, Vec2::ZERO, 1.0, -0.1).is_err());
    }
}
