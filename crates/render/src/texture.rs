use crate::RenderError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tileworld_common::{CellType, TextureHandle};

/// Source of already-decoded textures, addressed by logical name.
pub trait TextureLookup {
    fn lookup(&self, name: &str) -> Option<TextureHandle>;
}

impl TextureLookup for BTreeMap<String, TextureHandle> {
    fn lookup(&self, name: &str) -> Option<TextureHandle> {
        self.get(name).copied()
    }
}

impl TextureLookup for HashMap<String, TextureHandle> {
    fn lookup(&self, name: &str) -> Option<TextureHandle> {
        self.get(name).copied()
    }
}

/// Cell-type name to logical texture name, as written in YAML:
///
/// ```yaml
/// grass: grass
/// sand: sand
/// ```
///
/// Keys stay strings until resolution, where an unknown cell type name
/// becomes a [`RenderError::Configuration`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TerrainTextureMapping(pub BTreeMap<String, String>);

impl Default for TerrainTextureMapping {
    fn default() -> Self {
        Self(
            CellType::ALL
                .iter()
                .map(|ty| (ty.name().to_string(), ty.name().to_string()))
                .collect(),
        )
    }
}

impl TerrainTextureMapping {
    pub fn from_yaml(src: &str) -> Result<Self, RenderError> {
        serde_yaml::from_str(src)
            .map_err(|e| RenderError::config(format!("terrain texture mapping: {e}")))
    }
}

/// Maps a cell type to the texture bound before drawing that cell.
///
/// Built once at load and total over [`CellType::ALL`]; there is no fallback
/// texture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellTextureResolver {
    table: BTreeMap<CellType, TextureHandle>,
}

impl CellTextureResolver {
    /// Resolve every mapping entry against `textures`.
    ///
    /// Fails when an entry names an unknown cell type, when a named texture is
    /// not available, or when a declared cell type has no entry.
    pub fn new(
        mapping: &TerrainTextureMapping,
        textures: &dyn TextureLookup,
    ) -> Result<Self, RenderError> {
        let mut table = BTreeMap::new();
        for (cell, texture) in &mapping.0 {
            let ty: CellType = cell
                .parse()
                .map_err(|e| RenderError::config(format!("terrain texture mapping: {e}")))?;
            let handle = textures.lookup(texture).ok_or_else(|| {
                RenderError::config(format!(
                    "texture `{texture}` for cell type `{ty}` is not loaded"
                ))
            })?;
            table.insert(ty, handle);
        }

        if let Some(missing) = CellType::ALL.iter().find(|ty| !table.contains_key(*ty)) {
            return Err(RenderError::config(format!(
                "no texture mapped for cell type `{missing}`"
            )));
        }
        Ok(Self { table })
    }

    /// Default mapping: each cell type uses the texture of the same name.
    pub fn with_default_mapping(textures: &dyn TextureLookup) -> Result<Self, RenderError> {
        Self::new(&TerrainTextureMapping::default(), textures)
    }

    pub fn resolve(&self, ty: CellType) -> Result<TextureHandle, RenderError> {
        self.table
            .get(&ty)
            .copied()
            .ok_or_else(|| RenderError::config(format!("no texture mapped for cell type `{ty}`")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn textures() -> BTreeMap<String, TextureHandle> {
        [("grass", 0), ("sand", 1), ("tree", 2), ("dune", 3)]
            .into_iter()
            .map(|(n, h)| (n.to_string(), TextureHandle(h)))
            .collect()
    }

    #[test]
    fn default_mapping_is_total() {
        let resolver = CellTextureResolver::with_default_mapping(&textures()).unwrap();
        for ty in CellType::ALL {
            assert!(resolver.resolve(ty).is_ok(), "{ty} unresolved");
        }
        assert_eq!(resolver.resolve(CellType::Grass), Ok(TextureHandle(0)));
        assert_eq!(resolver.resolve(CellType::Sand), Ok(TextureHandle(1)));
    }

    #[test]
    fn mapping_can_redirect_textures() {
        let mapping = TerrainTextureMapping::from_yaml("grass: grass\nsand: dune\n").unwrap();
        let resolver = CellTextureResolver::new(&mapping, &textures()).unwrap();
        assert_eq!(resolver.resolve(CellType::Sand), Ok(TextureHandle(3)));
    }

    #[test]
    fn unknown_cell_type_is_a_configuration_error() {
        let mapping =
            TerrainTextureMapping::from_yaml("grass: grass\nsand: sand\nlava: grass\n").unwrap();
        let err = CellTextureResolver::new(&mapping, &textures()).unwrap_err();
        assert!(matches!(&err, RenderError::Configuration(msg) if msg.contains("lava")));
    }

    #[test]
    fn unmapped_cell_type_is_a_configuration_error() {
        let mapping = TerrainTextureMapping::from_yaml("grass: grass\n").unwrap();
        let err = CellTextureResolver::new(&mapping, &textures()).unwrap_err();
        assert!(matches!(&err, RenderError::Configuration(msg) if msg.contains("sand")));
    }

    #[test]
    fn missing_texture_is_a_configuration_error() {
        let only_grass: BTreeMap<String, TextureHandle> =
            [("grass".to_string(), TextureHandle(0))].into_iter().collect();
        let err = CellTextureResolver::with_default_mapping(&only_grass).unwrap_err();
        assert!(matches!(err, RenderError::Configuration(_)));
    }

    #[test]
    fn malformed_mapping_is_a_configuration_error() {
        assert!(matches!(
            TerrainTextureMapping::from_yaml("- grass\n- sand\n"),
            Err(RenderError::Configuration(_))
        ));
    }
}
