//! Player sprite-sheet cell selection.
//!
//! The sheet has three walk frames per row and one row per facing. Time is
//! passed in explicitly so the same inputs always pick the same cell.

use std::time::Duration;
use tileworld_kernel::PlayerState;

/// How long each walk frame is shown.
pub const FRAME_TIME: Duration = Duration::from_millis(250);

/// Column sequence of the walk cycle.
const WALK_CYCLE: [u32; 4] = [0, 1, 2, 1];

/// Column shown while standing still.
const IDLE_COLUMN: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpriteCell {
    pub column: u32,
    pub row: u32,
}

impl SpriteCell {
    /// Pick the sheet cell for a player in `state` facing `angle` radians at
    /// `elapsed` time since start.
    pub fn for_player(state: PlayerState, angle: f32, elapsed: Duration) -> Self {
        let column = match state {
            PlayerState::Walk => {
                let frame = elapsed.as_millis() / FRAME_TIME.as_millis();
                WALK_CYCLE[(frame % WALK_CYCLE.len() as u128) as usize]
            }
            PlayerState::Idle => IDLE_COLUMN,
        };
        Self {
            column,
            row: facing_row(angle),
        }
    }
}

/// Sheet row for a facing angle: quarter-turn sectors centred on the axes.
/// Both sides of the +/-PI wrap land in the same (left-facing) sector.
fn facing_row(angle: f32) -> u32 {
    let sector = ((angle.to_degrees() + 180.0 + 45.0) / 90.0).floor() as i32;
    match sector.rem_euclid(4) {
        0 => 1,
        1 => 3,
        2 => 2,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn walk_cycle_advances_every_quarter_second() {
        let columns: Vec<u32> = (0..5)
            .map(|i| {
                let elapsed = FRAME_TIME * i + Duration::from_millis(10);
                SpriteCell::for_player(PlayerState::Walk, 0.0, elapsed).column
            })
            .collect();
        assert_eq!(columns, vec![0, 1, 2, 1, 0]);
    }

    #[test]
    fn idle_uses_middle_column() {
        for ms in [0, 260, 777, 1_000] {
            let cell = SpriteCell::for_player(PlayerState::Idle, 0.0, Duration::from_millis(ms));
            assert_eq!(cell.column, IDLE_COLUMN);
        }
    }

    #[test]
    fn facing_rows() {
        // +x (right)
        assert_eq!(facing_row(0.0), 2);
        // +depth (toward the viewer)
        assert_eq!(facing_row(FRAC_PI_2), 0);
        // -depth (away)
        assert_eq!(facing_row(-FRAC_PI_2), 3);
        // -x (left), reached from either side of the wrap
        assert_eq!(facing_row(PI), 1);
        assert_eq!(facing_row(-PI + 0.01), 1);
    }
}
