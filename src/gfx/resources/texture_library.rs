//! Image loading and the texture table nodes refer to by id
//!
//! Images are decoded with `image` at scene load; GPU textures are created
//! later by `upload`. Slots 0 and 1 always hold the checkerboard and the
//! flat normal map used when a node has no texture of its own.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::AssetError;
use crate::gfx::resources::texture_resource::TextureResource;

pub type TextureId = usize;

/// Decoded RGBA8 pixels
#[derive(Debug, Clone, PartialEq)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl ImageData {
    pub fn load(path: &Path) -> Result<Self, AssetError> {
        let image = image::open(path)
            .map_err(|source| AssetError::Image {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgba8();
        let (width, height) = image.dimensions();
        Ok(Self {
            width,
            height,
            rgba: image.into_raw(),
        })
    }

    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        Self {
            width,
            height,
            rgba: rgba
                .iter()
                .copied()
                .cycle()
                .take((width * height * 4) as usize)
                .collect(),
        }
    }

    /// Black and white checkerboard with `cells` squares per side.
    pub fn checkerboard(size: u32, cells: u32) -> Self {
        let cell = (size / cells.max(1)).max(1);
        let mut rgba = Vec::with_capacity((size * size * 4) as usize);
        for y in 0..size {
            for x in 0..size {
                let value = if ((x / cell) + (y / cell)) % 2 == 0 {
                    255
                } else {
                    40
                };
                rgba.extend_from_slice(&[value, value, value, 255]);
            }
        }
        Self {
            width: size,
            height: size,
            rgba,
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = ((y * self.width + x) * 4) as usize;
        [self.rgba[i], self.rgba[i + 1], self.rgba[i + 2], self.rgba[i + 3]]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureKind {
    /// sRGB colour
    Albedo,
    /// Linear tangent-space normals
    NormalMap,
}

struct TextureEntry {
    label: String,
    image: ImageData,
    kind: TextureKind,
}

pub struct TextureLibrary {
    entries: Vec<TextureEntry>,
    by_path: HashMap<PathBuf, TextureId>,
    gpu: Vec<TextureResource>,
}

impl Default for TextureLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl TextureLibrary {
    pub const CHECKERBOARD: TextureId = 0;
    pub const FLAT_NORMAL: TextureId = 1;

    pub fn new() -> Self {
        let mut library = Self {
            entries: Vec::new(),
            by_path: HashMap::new(),
            gpu: Vec::new(),
        };
        library.add(
            "checkerboard",
            ImageData::checkerboard(256, 8),
            TextureKind::Albedo,
        );
        library.add(
            "flat normal",
            ImageData::solid(4, 4, [128, 128, 255, 255]),
            TextureKind::NormalMap,
        );
        library
    }

    pub fn add(&mut self, label: impl Into<String>, image: ImageData, kind: TextureKind) -> TextureId {
        self.entries.push(TextureEntry {
            label: label.into(),
            image,
            kind,
        });
        self.entries.len() - 1
    }

    /// Loads `path` once; later calls with the same path share the id.
    ///
    /// Failures are logged and yield `None`, so the caller falls back to
    /// the defaults.
    pub fn load(&mut self, path: &Path, kind: TextureKind) -> Option<TextureId> {
        if let Some(id) = self.by_path.get(path) {
            return Some(*id);
        }
        match ImageData::load(path) {
            Ok(image) => {
                log::debug!(
                    "loaded texture '{}' ({}x{})",
                    path.display(),
                    image.width,
                    image.height
                );
                let id = self.add(path.display().to_string(), image, kind);
                self.by_path.insert(path.to_path_buf(), id);
                Some(id)
            }
            Err(err) => {
                log::warn!("{err}; using fallback texture");
                None
            }
        }
    }

    pub fn image(&self, id: TextureId) -> &ImageData {
        &self.entries[id].image
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Creates GPU textures for every image not yet uploaded.
    pub fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue) {
        for entry in &self.entries[self.gpu.len()..] {
            self.gpu.push(TextureResource::create_from_rgba_data(
                device,
                queue,
                &entry.image.rgba,
                entry.image.width,
                entry.image.height,
                &entry.label,
                entry.kind == TextureKind::Albedo,
                wgpu::AddressMode::Repeat,
            ));
        }
    }

    /// GPU texture for `id`; `None` before `upload`.
    pub fn gpu(&self, id: TextureId) -> Option<&TextureResource> {
        self.gpu.get(id)
    }
}
