//! Texture store: decoded RGBA8 images addressed by logical name.
//!
//! The renderer consumes textures by handle, never by pixels or file paths.
//! Handles are dense indices in registration order so backends can keep
//! their GPU resources in a plain `Vec`.

mod procedural;

use std::collections::BTreeMap;
use tileworld_common::TextureHandle;
use tileworld_render::TextureLookup;

pub use procedural::{grass, sand, tree};

/// A decoded RGBA8 image, row-major, top row first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl TextureImage {
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Self {
        Self {
            width,
            height,
            rgba,
        }
    }

    fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * 4
    }
}

/// Errors from asset operations.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error(
        "texture `{name}` is {width}x{height} but carries {actual} bytes (expected {expected})"
    )]
    InvalidImage {
        name: String,
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    #[error("texture `{0}` has zero size")]
    EmptyImage(String),
}

#[derive(Debug, Clone, Default)]
pub struct TextureStore {
    names: BTreeMap<String, TextureHandle>,
    entries: Vec<(String, TextureImage)>,
}

impl TextureStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store with the procedural `grass`, `sand` and `tree` textures.
    pub fn with_builtin() -> Self {
        let mut store = Self::new();
        for (name, image) in [("grass", grass()), ("sand", sand()), ("tree", tree())] {
            // Built-in images are generated at their declared size.
            if let Err(e) = store.register(name, image) {
                tracing::error!("built-in texture rejected: {e}");
            }
        }
        store
    }

    /// Register an image under `name`. Registering an existing name replaces
    /// the pixels and keeps the handle.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        image: TextureImage,
    ) -> Result<TextureHandle, AssetError> {
        let name = name.into();
        if image.width == 0 || image.height == 0 {
            return Err(AssetError::EmptyImage(name));
        }
        if image.rgba.len() != image.expected_len() {
            return Err(AssetError::InvalidImage {
                expected: image.expected_len(),
                actual: image.rgba.len(),
                width: image.width,
                height: image.height,
                name,
            });
        }

        if let Some(&handle) = self.names.get(&name) {
            self.entries[handle.0 as usize].1 = image;
            tracing::debug!(name = %name, handle = handle.0, "texture replaced");
            return Ok(handle);
        }

        let handle = TextureHandle(self.entries.len() as u32);
        tracing::debug!(name = %name, handle = handle.0, "texture registered");
        self.names.insert(name.clone(), handle);
        self.entries.push((name, image));
        Ok(handle)
    }

    pub fn handle(&self, name: &str) -> Option<TextureHandle> {
        self.names.get(name).copied()
    }

    pub fn get(&self, handle: TextureHandle) -> Option<&TextureImage> {
        self.entries.get(handle.0 as usize).map(|(_, image)| image)
    }

    pub fn name(&self, handle: TextureHandle) -> Option<&str> {
        self.entries
            .get(handle.0 as usize)
            .map(|(name, _)| name.as_str())
    }

    /// Images in handle order.
    pub fn iter(&self) -> impl Iterator<Item = (TextureHandle, &TextureImage)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, (_, image))| (TextureHandle(i as u32), image))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TextureLookup for TextureStore {
    fn lookup(&self, name: &str) -> Option<TextureHandle> {
        self.handle(name)
    }
}

pub fn crate_info() -> &'static str {
    "tileworld-assets v0.1.0"
}
