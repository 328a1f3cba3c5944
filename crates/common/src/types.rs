use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Semantic type of a terrain cell. Controls which texture the cell is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellType {
    Grass,
    Sand,
}

impl CellType {
    /// Every declared cell type, in declaration order.
    pub const ALL: [CellType; 2] = [CellType::Grass, CellType::Sand];

    pub fn name(self) -> &'static str {
        match self {
            CellType::Grass => "grass",
            CellType::Sand => "sand",
        }
    }
}

impl fmt::Display for CellType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A cell type name that does not match any declared [`CellType`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown cell type `{0}`")]
pub struct UnknownCellType(pub String);

impl FromStr for CellType {
    type Err = UnknownCellType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CellType::ALL
            .into_iter()
            .find(|ty| ty.name() == s)
            .ok_or_else(|| UnknownCellType(s.to_string()))
    }
}

/// Integer coordinate of a terrain cell: `0 <= x < width`, `0 <= z < height`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCoord {
    pub x: u32,
    pub z: u32,
}

impl GridCoord {
    pub fn new(x: u32, z: u32) -> Self {
        Self { x, z }
    }
}

/// Variant tag of a world item.
///
/// `Unknown` catches item kinds written by newer tools; renderers skip it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Tree,
    Box,
    Player,
    #[serde(other)]
    Unknown,
}

/// A dynamic world item.
///
/// `position.x` is the ground-plane x coordinate. `position.y` is the depth
/// coordinate: it is both the world Z of the item and its draw-order key.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub kind: ItemKind,
    pub position: Vec2,
}

impl Item {
    pub fn new(kind: ItemKind, x: f32, depth: f32) -> Self {
        Self {
            kind,
            position: Vec2::new(x, depth),
        }
    }

    pub fn depth(&self) -> f32 {
        self.position.y
    }
}

/// Opaque handle to a decoded texture owned by the asset store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TextureHandle(pub u32);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_type_names_round_trip() {
        for ty in CellType::ALL {
            assert_eq!(ty.name().parse::<CellType>(), Ok(ty));
        }
    }

    #[test]
    fn unknown_cell_type_is_rejected() {
        let err = "lava".parse::<CellType>().unwrap_err();
        assert_eq!(err, UnknownCellType("lava".into()));
        assert!(err.to_string().contains("lava"));
    }

    #[test]
    fn item_depth_is_position_y() {
        let item = Item::new(ItemKind::Tree, 3.0, 7.5);
        assert_eq!(item.depth(), 7.5);
        assert_eq!(item.position.x, 3.0);
    }

    #[test]
    fn unrecognised_item_kind_deserializes_as_unknown() {
        let kind: ItemKind = serde_json::from_str("\"dragon\"").unwrap();
        assert_eq!(kind, ItemKind::Unknown);
        let kind: ItemKind = serde_json::from_str("\"tree\"").unwrap();
        assert_eq!(kind, ItemKind::Tree);
    }
}
