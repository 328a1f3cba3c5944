use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Direction flags sampled from input once per update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveInput {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

impl MoveInput {
    /// Unit-length direction on the ground plane, or zero when idle.
    ///
    /// `up` moves toward smaller depth, `down` toward larger depth.
    pub fn direction(&self) -> Vec2 {
        let axis = |neg: bool, pos: bool| (pos as i8 - neg as i8) as f32;
        Vec2::new(axis(self.left, self.right), axis(self.up, self.down)).normalize_or_zero()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerState {
    #[default]
    Idle,
    Walk,
}

/// The player avatar: ground position, facing angle, and walk state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Player {
    /// Ground x and depth, same convention as [`tileworld_common::Item::position`].
    pub position: Vec2,
    /// Facing angle in radians, `atan2(depth, x)` of the last movement.
    pub angle: f32,
    pub state: PlayerState,
    /// World units per second.
    pub speed: f32,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            angle: 0.0,
            state: PlayerState::Idle,
            speed: 4.0,
        }
    }
}

impl Player {
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Advance the player by `dt` seconds of input. Angle is kept while idle.
    pub fn update(&mut self, input: MoveInput, dt: f32) {
        let velocity = input.direction();
        if velocity == Vec2::ZERO {
            self.state = PlayerState::Idle;
            return;
        }
        self.angle = velocity.y.atan2(velocity.x);
        self.position += velocity * self.speed * dt;
        self.state = PlayerState::Walk;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_input_keeps_position() {
        let mut p = Player::at(Vec2::new(1.0, 1.0));
        p.update(MoveInput::default(), 1.0);
        assert_eq!(p.position, Vec2::new(1.0, 1.0));
        assert_eq!(p.state, PlayerState::Idle);
    }

    #[test]
    fn diagonal_is_normalized() {
        let mut p = Player::default();
        p.update(
            MoveInput {
                right: true,
                down: true,
                ..MoveInput::default()
            },
            1.0,
        );
        assert!((p.position.length() - p.speed).abs() < 1e-5);
        assert!((p.angle - std::f32::consts::FRAC_PI_4).abs() < 1e-5);
        assert_eq!(p.state, PlayerState::Walk);
    }

    #[test]
    fn opposite_keys_cancel() {
        let mut p = Player::default();
        p.angle = 1.0;
        p.update(
            MoveInput {
                left: true,
                right: true,
                ..MoveInput::default()
            },
            1.0,
        );
        assert_eq!(p.position, Vec2::ZERO);
        assert_eq!(p.angle, 1.0);
        assert_eq!(p.state, PlayerState::Idle);
    }
}
