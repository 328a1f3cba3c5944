//! World Kernel: terrain grid, items, and the player.
//!
//! # Invariants
//! - Grid shape is fixed once built; only cell contents change.
//! - All mutations flow through explicit operations between frames.
//! - Renderers read the world, never mutate it.

mod grid;
mod level;
mod player;
pub mod world;

pub use grid::{Grid, MAX_CELLS};
pub use level::{Level, Patch};
pub use player::{MoveInput, Player, PlayerState};
pub use world::World;

/// Errors from building or mutating the world.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("level parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("cell ({x}, {z}) is outside the {width}x{height} grid")]
    OutOfBounds {
        x: u32,
        z: u32,
        width: u32,
        height: u32,
    },
    #[error("grid {width}x{height} exceeds the limit of {max} cells")]
    GridTooLarge { width: u32, height: u32, max: u64 },
}

pub fn crate_info() -> &'static str {
    "tileworld-kernel v0.1.0"
}
