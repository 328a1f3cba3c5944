use crate::camera::Camera;
use crate::command::{BlendMode, DrawCommand};
use crate::mesh::GridMesh;
use crate::texture::CellTextureResolver;
use glam::Mat4;
use tileworld_common::GridCoord;
use tileworld_kernel::Grid;

/// Cornflower blue.
pub const CLEAR_COLOR: [f32; 4] = [0.392, 0.584, 0.929, 1.0];

/// Draws the terrain grid, one textured cell at a time.
///
/// Owns the static mesh built at load and the projection captured at load.
/// The live grid is borrowed per frame so terraformed cell types show up on
/// the next draw.
///
/// Cells are drawn in row-major order with one draw each, not grouped by
/// texture. Grouping would cut texture rebinds without changing the image.
#[derive(Debug, Clone)]
pub struct TerrainRenderer {
    mesh: GridMesh,
    resolver: CellTextureResolver,
    projection: Mat4,
}

impl TerrainRenderer {
    pub fn new(mesh: GridMesh, resolver: CellTextureResolver, projection: Mat4) -> Self {
        Self {
            mesh,
            resolver,
            projection,
        }
    }

    pub fn mesh(&self) -> &GridMesh {
        &self.mesh
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    /// Replace the projection, e.g. after the host surface was resized.
    pub fn set_projection(&mut self, projection: Mat4) {
        self.projection = projection;
    }

    /// Append this frame's terrain commands to `out`.
    ///
    /// A cell whose texture cannot be resolved is skipped with a warning; the
    /// rest of the frame still draws.
    pub fn draw(&self, grid: &Grid, camera: &dyn Camera, out: &mut Vec<DrawCommand>) {
        let _span = tracing::info_span!("terrain_draw").entered();

        out.push(DrawCommand::Clear {
            color: CLEAR_COLOR,
        });
        out.push(DrawCommand::SetBlend(BlendMode::Alpha));
        out.push(DrawCommand::SetTransforms {
            world: Mat4::IDENTITY,
            view: camera.view(),
            projection: self.projection,
        });

        if (grid.width(), grid.height()) != (self.mesh.width(), self.mesh.height()) {
            tracing::warn!(
                grid_width = grid.width(),
                grid_height = grid.height(),
                mesh_width = self.mesh.width(),
                mesh_height = self.mesh.height(),
                "grid shape differs from terrain mesh; drawing the overlap"
            );
        }

        for z in 0..self.mesh.height() {
            for x in 0..self.mesh.width() {
                let Some(ty) = grid.cell(x, z) else {
                    continue;
                };
                let Some(range) = self.mesh.cell_index_range(x, z) else {
                    continue;
                };
                match self.resolver.resolve(ty) {
                    Ok(texture) => out.push(DrawCommand::DrawCell {
                        cell: GridCoord::new(x, z),
                        texture,
                        first_index: range.start,
                        index_count: range.end - range.start,
                    }),
                    Err(e) => tracing::warn!(x, z, "skipping terrain cell: {e}"),
                }
            }
        }
    }
}
