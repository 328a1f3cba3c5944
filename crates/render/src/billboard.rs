use crate::command::DrawCommand;
use crate::mesh::Vertex;
use glam::{Mat4, Vec3};
use tileworld_common::{Item, ItemKind, TextureHandle};

/// Billboards face +Z; they do not turn toward the camera.
const FACING: [f32; 3] = [0.0, 0.0, 1.0];

/// Unit card standing on the ground, centred on the local origin, as two
/// triangles.
pub const LOCAL_QUAD: [Vertex; 6] = [
    Vertex::new([-0.5, 1.0, 0.0], FACING, [0.0, 0.0]),
    Vertex::new([0.5, 1.0, 0.0], FACING, [1.0, 0.0]),
    Vertex::new([0.5, 0.0, 0.0], FACING, [1.0, 1.0]),
    Vertex::new([-0.5, 1.0, 0.0], FACING, [0.0, 0.0]),
    Vertex::new([0.5, 0.0, 0.0], FACING, [1.0, 1.0]),
    Vertex::new([-0.5, 0.0, 0.0], FACING, [0.0, 1.0]),
];

/// Top-edge vertices of [`LOCAL_QUAD`].
const TOP_EDGE: [usize; 3] = [0, 1, 3];

pub const TREE_HEIGHT: f32 = 2.0;

/// Draws world items as flat cards, farthest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemBillboardRenderer {
    tree_texture: TextureHandle,
}

impl ItemBillboardRenderer {
    pub fn new(tree_texture: TextureHandle) -> Self {
        Self { tree_texture }
    }

    /// Append billboard commands for `items` to `out`.
    ///
    /// Items are visited in ascending depth so nearer cards paint over
    /// farther ones. Equal depths keep their order in `items`.
    pub fn draw(&self, items: &[Item], out: &mut Vec<DrawCommand>) {
        for item in depth_sorted(items) {
            match item.kind {
                ItemKind::Tree => out.push(self.tree(item)),
                // Prop and player cards are not drawn yet.
                ItemKind::Box | ItemKind::Player => {}
                ItemKind::Unknown => {
                    tracing::trace!(
                        x = item.position.x,
                        depth = item.depth(),
                        "skipping unknown item"
                    );
                }
            }
        }
    }

    fn tree(&self, item: &Item) -> DrawCommand {
        let mut vertices = LOCAL_QUAD;
        for i in TOP_EDGE {
            vertices[i].position[1] = TREE_HEIGHT;
        }
        DrawCommand::DrawBillboard {
            kind: ItemKind::Tree,
            texture: self.tree_texture,
            world: cell_centred(item),
            vertices,
        }
    }
}

/// Items ordered back to front. Stable, so ties keep list order.
pub fn depth_sorted(items: &[Item]) -> Vec<&Item> {
    let mut sorted: Vec<&Item> = items.iter().collect();
    sorted.sort_by(|a, b| a.depth().total_cmp(&b.depth()));
    sorted
}

/// Translation placing a card in the middle of the cell it occupies.
fn cell_centred(item: &Item) -> Mat4 {
    Mat4::from_translation(Vec3::new(
        item.position.x + 0.5,
        0.0,
        item.depth() + 0.5,
    ))
}
