//! Image references and their preloading.
//!
//! Style values hold image *references* (URLs or paths). An [`ImageSource`]
//! turns a reference into encoded bytes; [`preload`] fetches and decodes every
//! image an export needs before anything is drawn. A reference that fails is
//! logged and left out, so the element it belongs to is simply not drawn.

use crate::error::{RenderError, Result};
use resvg::tiny_skia::{IntSize, Pixmap};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub trait ImageSource {
    /// Encoded bytes (PNG, JPEG, WebP, GIF) behind `reference`.
    fn fetch(&self, reference: &str) -> Result<Vec<u8>>;
}

/// Resolves references against a local asset root.
///
/// `/textures/texture.jpg` and `textures/texture.jpg` both resolve to
/// `<root>/textures/texture.jpg`; `file://` URLs and existing absolute paths
/// are read as-is. Remote and inline references are not supported here.
#[derive(Debug, Clone)]
pub struct FsImageSource {
    root: PathBuf,
}

impl FsImageSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, reference: &str) -> Result<PathBuf> {
        let unsupported = |reason: &str| RenderError::Asset {
            reference: reference.to_string(),
            reason: reason.to_string(),
        };
        if reference.starts_with("data:") {
            return Err(unsupported("inline image data is not loaded from disk"));
        }
        if reference.starts_with("http://")
            || reference.starts_with("https://")
            || reference.starts_with("//")
        {
            return Err(unsupported("remote references need a network image source"));
        }
        if let Some(path) = reference.strip_prefix("file://") {
            return Ok(PathBuf::from(path));
        }
        let as_path = Path::new(reference);
        if as_path.is_absolute() && as_path.exists() {
            return Ok(as_path.to_path_buf());
        }
        Ok(self.root.join(reference.trim_start_matches('/')))
    }
}

impl ImageSource for FsImageSource {
    fn fetch(&self, reference: &str) -> Result<Vec<u8>> {
        let path = self.resolve(reference)?;
        std::fs::read(&path).map_err(|e| RenderError::Asset {
            reference: reference.to_string(),
            reason: format!("{}: {e}", path.display()),
        })
    }
}

/// Fixed set of in-memory images keyed by reference.
#[derive(Debug, Clone, Default)]
pub struct MemoryImageSource {
    images: HashMap<String, Vec<u8>>,
}

impl MemoryImageSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, reference: impl Into<String>, bytes: Vec<u8>) {
        self.images.insert(reference.into(), bytes);
    }

    pub fn with(mut self, reference: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.insert(reference, bytes);
        self
    }
}

impl ImageSource for MemoryImageSource {
    fn fetch(&self, reference: &str) -> Result<Vec<u8>> {
        self.images
            .get(reference)
            .cloned()
            .ok_or_else(|| RenderError::Asset {
                reference: reference.to_string(),
                reason: "not found".to_string(),
            })
    }
}

/// Decode encoded image bytes into a premultiplied pixmap.
pub fn decode_image(reference: &str, bytes: &[u8]) -> Result<Pixmap> {
    let rgba = image::load_from_memory(bytes)
        .map_err(|source| RenderError::Decode {
            reference: reference.to_string(),
            source,
        })?
        .to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut data = rgba.into_raw();
    premultiply_rgba8_in_place(&mut data);

    let size = IntSize::from_wh(width, height).ok_or_else(|| RenderError::Asset {
        reference: reference.to_string(),
        reason: "image has no pixels".to_string(),
    })?;
    Pixmap::from_vec(data, size).ok_or_else(|| RenderError::Asset {
        reference: reference.to_string(),
        reason: format!("{width}×{height} does not fit a pixmap"),
    })
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

/// Decoded images of one export, keyed by reference.
#[derive(Default)]
pub struct LoadedImages {
    images: HashMap<String, Pixmap>,
    failed: Vec<String>,
}

impl LoadedImages {
    pub fn get(&self, reference: &str) -> Option<&Pixmap> {
        self.images.get(reference)
    }

    /// References that could not be loaded.
    pub fn failed(&self) -> &[String] {
        &self.failed
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

/// Fetch and decode every reference. Never fails as a whole.
pub fn preload<'a>(
    source: &dyn ImageSource,
    references: impl IntoIterator<Item = &'a str>,
) -> LoadedImages {
    let mut loaded = LoadedImages::default();
    for reference in references {
        if loaded.images.contains_key(reference) || loaded.failed.iter().any(|f| f == reference) {
            continue;
        }
        match source
            .fetch(reference)
            .and_then(|bytes| decode_image(reference, &bytes))
        {
            Ok(pixmap) => {
                log::debug!(
                    "preloaded {reference} ({}×{})",
                    pixmap.width(),
                    pixmap.height()
                );
                loaded.images.insert(reference.to_string(), pixmap);
            }
            Err(e) => {
                log::warn!("continuing without image: {e}");
                loaded.failed.push(reference.to_string());
            }
        }
    }
    loaded
}
