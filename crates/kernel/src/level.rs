use crate::{Grid, Player, World, WorldError};
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tileworld_common::{CellType, Item, ItemKind};

/// A rectangle of cells overriding the level's fill type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patch {
    pub cell: CellType,
    pub x: u32,
    pub z: u32,
    pub width: u32,
    pub height: u32,
}

/// Level description as stored in YAML.
///
/// ```yaml
/// width: 8
/// height: 4
/// fill: grass
/// patches:
///   - { cell: sand, x: 2, z: 1, width: 3, height: 2 }
/// items:
///   - { kind: tree, position: [3.0, 2.0] }
///   - { kind: player, position: [1.0, 1.0] }
/// ```
///
/// Unknown cell names are a parse error. Unknown item kinds load as
/// [`ItemKind::Unknown`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub width: u32,
    pub height: u32,
    #[serde(default = "default_fill")]
    pub fill: CellType,
    #[serde(default)]
    pub patches: Vec<Patch>,
    #[serde(default)]
    pub items: Vec<Item>,
}

fn default_fill() -> CellType {
    CellType::Grass
}

impl Level {
    pub fn from_yaml(src: &str) -> Result<Self, WorldError> {
        Ok(serde_yaml::from_str(src)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, WorldError> {
        let src = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&src)
    }

    pub fn to_yaml(&self) -> Result<String, WorldError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Build the world. The first `player` item places the player; without
    /// one the player starts at the grid centre.
    pub fn into_world(self) -> Result<World, WorldError> {
        let mut grid = Grid::try_new(self.width, self.height, self.fill)?;
        for patch in &self.patches {
            grid.fill_rect(patch.x, patch.z, patch.width, patch.height, patch.cell)?;
        }

        let start = self
            .items
            .iter()
            .find(|item| item.kind == ItemKind::Player)
            .map(|item| item.position)
            .unwrap_or_else(|| Vec2::new(self.width as f32, self.height as f32) * 0.5);

        tracing::debug!(
            width = self.width,
            height = self.height,
            items = self.items.len(),
            "level loaded"
        );
        Ok(World::new(grid, self.items, Player::at(start)))
    }

    /// Built-in 24x24 demo: grass with a sand beach strip and a sand
    /// clearing, trees along the rows, and one box.
    pub fn demo() -> Self {
        let mut items = Vec::new();
        for z in (2..22).step_by(4) {
            for x in (1..16).step_by(3) {
                let jitter = ((x * 7 + z * 13) % 5) as f32 * 0.1;
                items.push(Item::new(ItemKind::Tree, x as f32 + jitter, z as f32));
            }
        }
        items.push(Item::new(ItemKind::Box, 11.0, 11.0));
        items.push(Item::new(ItemKind::Player, 12.0, 12.0));

        Self {
            width: 24,
            height: 24,
            fill: CellType::Grass,
            patches: vec![
                Patch {
                    cell: CellType::Sand,
                    x: 18,
                    z: 0,
                    width: 6,
                    height: 24,
                },
                Patch {
                    cell: CellType::Sand,
                    x: 9,
                    z: 9,
                    width: 5,
                    height: 5,
                },
            ],
            items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"
width: 8
height: 4
fill: grass
patches:
  - { cell: sand, x: 2, z: 1, width: 3, height: 2 }
items:
  - { kind: tree, position: [3.0, 2.0] }
  - { kind: player, position: [1.0, 1.0] }
  - { kind: windmill, position: [5.0, 0.0] }
"#;

    #[test]
    fn parse_sample_level() {
        let level = Level::from_yaml(SAMPLE).unwrap();
        assert_eq!(level.width, 8);
        assert_eq!(level.patches.len(), 1);
        assert_eq!(level.items[2].kind, ItemKind::Unknown);
    }

    #[test]
    fn sample_level_builds_world() {
        let world = Level::from_yaml(SAMPLE).unwrap().into_world().unwrap();
        assert_eq!(world.grid().cell(2, 1), Some(CellType::Sand));
        assert_eq!(world.grid().cell(4, 2), Some(CellType::Sand));
        assert_eq!(world.grid().cell(5, 2), Some(CellType::Grass));
        assert_eq!(world.player().position, Vec2::new(1.0, 1.0));
        // tree + windmill + player mirror
        assert_eq!(world.items().len(), 3);
    }

    #[test]
    fn unknown_cell_type_fails_to_parse() {
        let src = "width: 2\nheight: 2\nfill: lava\n";
        assert!(matches!(Level::from_yaml(src), Err(WorldError::Yaml(_))));
    }

    #[test]
    fn patch_outside_grid_fails() {
        let src = r#"
width: 4
height: 4
patches:
  - { cell: sand, x: 3, z: 3, width: 2, height: 1 }
"#;
        let level = Level::from_yaml(src).unwrap();
        assert!(matches!(
            level.into_world(),
            Err(WorldError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn oversized_level_is_refused_before_allocating() {
        let level = Level::from_yaml("width: 4294967295\nheight: 4294967295\n").unwrap();
        assert!(matches!(
            level.into_world(),
            Err(WorldError::GridTooLarge { width: 4294967295, height: 4294967295, .. })
        ));

        let level = Level::from_yaml("width: 65536\nheight: 65536\n").unwrap();
        assert!(matches!(
            level.into_world(),
            Err(WorldError::GridTooLarge { .. })
        ));
    }

    #[test]
    fn player_defaults_to_centre() {
        let world = Level::from_yaml("width: 6\nheight: 4\n")
            .unwrap()
            .into_world()
            .unwrap();
        assert_eq!(world.player().position, Vec2::new(3.0, 2.0));
    }

    #[test]
    fn load_from_file() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(SAMPLE.as_bytes()).unwrap();
        let level = Level::load(tmp.path()).unwrap();
        assert_eq!(level.height, 4);
    }

    #[test]
    fn demo_level_round_trips_through_yaml() {
        let demo = Level::demo();
        let yaml = demo.to_yaml().unwrap();
        assert_eq!(Level::from_yaml(&yaml).unwrap(), demo);
        let world = demo.into_world().unwrap();
        assert_eq!(world.grid().cell_count(), 24 * 24);
    }
}
