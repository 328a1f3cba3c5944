use crate::billboard::{ItemBillboardRenderer, depth_sorted};
use crate::camera::Camera;
use crate::command::FramePlan;
use crate::mesh::GridMesh;
use crate::sprite::SpriteCell;
use crate::terrain::TerrainRenderer;
use crate::texture::{CellTextureResolver, TerrainTextureMapping, TextureLookup};
use crate::RenderError;
use std::collections::BTreeMap;
use std::time::Duration;
use tileworld_common::CellType;
use tileworld_kernel::{Grid, World};

/// Logical texture name of the tree billboard.
pub const TREE_TEXTURE: &str = "tree";

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The renderer reads world state, a camera, and the time since start, then
/// produces output. It never mutates the world.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame from the given world state and camera.
    fn render(&self, world: &World, camera: &dyn Camera, elapsed: Duration) -> Self::Output;
}

/// Terrain followed by billboards, as a draw-command plan.
#[derive(Debug, Clone)]
pub struct SceneRenderer {
    terrain: TerrainRenderer,
    items: ItemBillboardRenderer,
}

impl SceneRenderer {
    /// Load-time setup: build the grid mesh, resolve terrain textures, and
    /// look up the item textures. Any failure is returned here, before a
    /// frame is ever planned.
    pub fn load(
        grid: &Grid,
        textures: &dyn TextureLookup,
        mapping: &TerrainTextureMapping,
        camera: &dyn Camera,
    ) -> Result<Self, RenderError> {
        let mesh = GridMesh::build(grid.width(), grid.height())?;
        let resolver = CellTextureResolver::new(mapping, textures)?;
        let tree = textures.lookup(TREE_TEXTURE).ok_or_else(|| {
            RenderError::Configuration(format!("item texture `{TREE_TEXTURE}` is not loaded"))
        })?;

        tracing::debug!(
            width = grid.width(),
            height = grid.height(),
            "scene renderer loaded"
        );
        Ok(Self {
            terrain: TerrainRenderer::new(mesh, resolver, camera.projection()),
            items: ItemBillboardRenderer::new(tree),
        })
    }

    pub fn mesh(&self) -> &GridMesh {
        self.terrain.mesh()
    }

    /// Adopt a new projection after the host surface changed size.
    pub fn set_projection(&mut self, camera: &dyn Camera) {
        self.terrain.set_projection(camera.projection());
    }
}

impl Renderer for SceneRenderer {
    type Output = FramePlan;

    fn render(&self, world: &World, camera: &dyn Camera, _elapsed: Duration) -> FramePlan {
        let mut plan = Vec::with_capacity(world.grid().cell_count() + world.items().len() + 3);
        self.terrain.draw(world.grid(), camera, &mut plan);
        self.items.draw(world.items(), &mut plan);
        plan
    }
}

/// Debug text renderer.
///
/// Produces a human-readable summary of what a frame would show. Useful for
/// CLI output, logging, and testing the render interface without a GPU.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, world: &World, camera: &dyn Camera, elapsed: Duration) -> String {
        let grid = world.grid();
        let mut histogram: BTreeMap<CellType, usize> = BTreeMap::new();
        for (_, ty) in grid.iter() {
            *histogram.entry(ty).or_default() += 1;
        }

        let mut out = String::new();
        out.push_str(&format!(
            "=== Frame (t={:.3}s) ===\n",
            elapsed.as_secs_f32()
        ));
        out.push_str(&format!("Grid: {}x{}\n", grid.width(), grid.height()));
        for (ty, count) in &histogram {
            out.push_str(&format!("  {ty}: {count}\n"));
        }

        let eye = camera.view().inverse().w_axis;
        out.push_str(&format!(
            "Camera: eye=({:.1}, {:.1}, {:.1})\n",
            eye.x, eye.y, eye.z
        ));

        out.push_str(&format!("Items (draw order): {}\n", world.items().len()));
        for item in depth_sorted(world.items()) {
            out.push_str(&format!(
                "  {:?} at ({:.2}, {:.2})\n",
                item.kind,
                item.position.x,
                item.depth()
            ));
        }

        let player = world.player();
        let sprite = SpriteCell::for_player(player.state, player.angle, elapsed);
        out.push_str(&format!(
            "Player: {:?} sprite=({}, {})\n",
            player.state, sprite.column, sprite.row
        ));

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraMatrices;
    use crate::command::DrawCommand;
    use glam::{Mat4, Vec2, Vec3};
    use tileworld_common::{Item, ItemKind, TextureHandle};
    use tileworld_kernel::Player;

    fn textures() -> BTreeMap<String, TextureHandle> {
        [("grass", 0), ("sand", 1), ("tree", 2)]
            .into_iter()
            .map(|(n, h)| (n.to_string(), TextureHandle(h)))
            .collect()
    }

    fn camera() -> CameraMatrices {
        CameraMatrices {
            view: Mat4::look_at_rh(Vec3::new(3.0, 6.0, 9.0), Vec3::new(3.0, 0.0, 3.0), Vec3::Y),
            projection: Mat4::perspective_rh(1.0, 16.0 / 9.0, 0.1, 100.0),
        }
    }

    fn world() -> World {
        World::new(
            Grid::new(3, 3, CellType::Grass),
            vec![
                Item::new(ItemKind::Tree, 2.0, 5.0),
                Item::new(ItemKind::Unknown, 0.0, 2.0),
                Item::new(ItemKind::Tree, 1.0, 1.0),
                Item::new(ItemKind::Box, 0.0, 4.0),
                Item::new(ItemKind::Tree, 0.0, 3.0),
            ],
            Player::at(Vec2::new(1.0, 1.5)),
        )
    }

    fn scene() -> SceneRenderer {
        SceneRenderer::load(
            world().grid(),
            &textures(),
            &TerrainTextureMapping::default(),
            &camera(),
        )
        .unwrap()
    }

    #[test]
    fn plan_is_terrain_then_sorted_billboards() {
        let plan = scene().render(&world(), &camera(), Duration::ZERO);
        assert!(matches!(plan[0], DrawCommand::Clear { .. }));

        let first_billboard = plan
            .iter()
            .position(|c| matches!(c, DrawCommand::DrawBillboard { .. }))
            .unwrap();
        assert_eq!(first_billboard, 3 + 9);
        assert!(plan[..first_billboard]
            .iter()
            .skip(3)
            .all(|c| matches!(c, DrawCommand::DrawCell { .. })));

        let depths: Vec<f32> = plan[first_billboard..]
            .iter()
            .map(|c| match c {
                DrawCommand::DrawBillboard { world, .. } => world.w_axis.z,
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(depths, vec![1.5, 3.5, 5.5]);
    }

    #[test]
    fn unknown_items_never_reach_the_plan() {
        let plan = scene().render(&world(), &camera(), Duration::ZERO);
        assert!(!plan.iter().any(|c| matches!(
            c,
            DrawCommand::DrawBillboard {
                kind: ItemKind::Unknown | ItemKind::Box | ItemKind::Player,
                ..
            }
        )));
    }

    #[test]
    fn repeated_frames_are_identical() {
        let scene = scene();
        let world = world();
        let a = scene.render(&world, &camera(), Duration::from_millis(16));
        let b = scene.render(&world, &camera(), Duration::from_millis(16));
        assert_eq!(a, b);
    }

    #[test]
    fn projection_is_fixed_until_resized() {
        let mut scene = scene();
        let wide = CameraMatrices {
            projection: Mat4::perspective_rh(1.0, 3.0, 0.1, 100.0),
            ..camera()
        };

        let plan = scene.render(&world(), &wide, Duration::ZERO);
        assert!(matches!(
            plan[2],
            DrawCommand::SetTransforms { projection, .. } if projection == camera().projection
        ));

        scene.set_projection(&wide);
        let plan = scene.render(&world(), &wide, Duration::ZERO);
        assert!(matches!(
            plan[2],
            DrawCommand::SetTransforms { projection, .. } if projection == wide.projection
        ));
    }

    #[test]
    fn load_fails_without_tree_texture() {
        let mut textures = textures();
        textures.remove("tree");
        let err = SceneRenderer::load(
            world().grid(),
            &textures,
            &TerrainTextureMapping::default(),
            &camera(),
        )
        .unwrap_err();
        assert!(matches!(err, RenderError::Configuration(msg) if msg.contains("tree")));
    }

    #[test]
    fn load_fails_for_oversized_grid() {
        let grid = Grid::new(200, 200, CellType::Grass);
        let err = SceneRenderer::load(
            &grid,
            &textures(),
            &TerrainTextureMapping::default(),
            &camera(),
        )
        .unwrap_err();
        assert!(matches!(err, RenderError::CapacityExceeded { .. }));
    }

    #[test]
    fn plan_serializes_to_json() {
        let plan = scene().render(&world(), &camera(), Duration::ZERO);
        let json = serde_json::to_string(&plan).unwrap();
        assert!(json.contains("DrawCell"));
        assert!(json.contains("DrawBillboard"));
    }

    #[test]
    fn debug_renderer_summarizes_frame() {
        let output =
            DebugTextRenderer::new().render(&world(), &camera(), Duration::from_millis(500));
        assert!(output.contains("t=0.500s"));
        assert!(output.contains("Grid: 3x3"));
        assert!(output.contains("grass: 9"));
        assert!(output.contains("Items (draw order): 6"));
        assert!(output.contains("Player: Idle sprite=(1, 2)"));
    }

    #[test]
    fn debug_renderer_lists_items_back_to_front() {
        let output = DebugTextRenderer::new().render(&world(), &camera(), Duration::ZERO);
        let tree_near = output.find("Tree at (1.00, 1.00)").unwrap();
        let unknown = output.find("Unknown at (0.00, 2.00)").unwrap();
        let tree_far = output.find("Tree at (2.00, 5.00)").unwrap();
        assert!(tree_near < unknown && unknown < tree_far);
    }
}
