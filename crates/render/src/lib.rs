//! Rendering core: renderer-agnostic terrain and billboard planning.
//!
//! # Invariants
//! - Renderer cannot mutate world truth directly.
//! - The terrain mesh is built once at load and never changes shape.
//! - Load-time errors surface before any frame is planned.
//! - Billboards are planned back to front; there is no depth test.
//!
//! # Output
//! Renderers emit a [`FramePlan`]: an ordered list of [`DrawCommand`]s with no
//! GPU objects in it. A backend (see `tileworld-render-wgpu`) executes the
//! plan; tests and tools inspect it directly.

pub mod billboard;
mod camera;
mod command;
mod error;
pub mod mesh;
mod renderer;
pub mod sprite;
mod terrain;
mod texture;

pub use billboard::ItemBillboardRenderer;
pub use camera::{Camera, CameraMatrices};
pub use command::{BlendMode, DrawCommand, FramePlan, draw_count};
pub use error::RenderError;
pub use mesh::{GridMesh, Vertex};
pub use renderer::{DebugTextRenderer, Renderer, SceneRenderer, TREE_TEXTURE};
pub use terrain::{CLEAR_COLOR, TerrainRenderer};
pub use texture::{CellTextureResolver, TerrainTextureMapping, TextureLookup};

pub fn crate_info() -> &'static str {
    "tileworld-render v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}
