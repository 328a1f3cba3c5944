use crate::mesh::Vertex;
use glam::Mat4;
use serde::Serialize;
use tileworld_common::{GridCoord, ItemKind, TextureHandle};

/// Color blending for subsequent draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BlendMode {
    Opaque,
    /// Standard source-over alpha blending.
    Alpha,
}

/// One step of a frame, in execution order.
///
/// The render core produces these; a backend executes them. Nothing here
/// refers to GPU objects, so plans can be compared, logged and serialized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DrawCommand {
    /// Clear the target surface.
    Clear { color: [f32; 4] },
    SetBlend(BlendMode),
    /// Shared transform state for the terrain draws that follow.
    SetTransforms {
        world: Mat4,
        view: Mat4,
        projection: Mat4,
    },
    /// Draw one terrain cell from the static grid mesh.
    DrawCell {
        cell: GridCoord,
        texture: TextureHandle,
        first_index: u32,
        index_count: u32,
    },
    /// Draw a billboard quad: `vertices` in item-local space, placed by `world`.
    DrawBillboard {
        kind: ItemKind,
        texture: TextureHandle,
        world: Mat4,
        vertices: [Vertex; 6],
    },
}

/// Ordered command list for one frame.
pub type FramePlan = Vec<DrawCommand>;

/// Count of draw commands (cells plus billboards) in a plan.
pub fn draw_count(plan: &[DrawCommand]) -> usize {
    plan.iter()
        .filter(|c| {
            matches!(
                c,
                DrawCommand::DrawCell { .. } | DrawCommand::DrawBillboard { .. }
            )
        })
        .count()
}
