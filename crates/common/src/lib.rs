//! Shared value types for the tileworld workspace.
//!
//! Everything here is plain data: the world model owns it, renderers read it.

mod types;

pub use types::{CellType, GridCoord, Item, ItemKind, TextureHandle, UnknownCellType};

pub fn crate_info() -> &'static str {
    "tileworld-common v0.1.0"
}
