//! Full-resolution frame export.
//!
//! `plan → preload → attach surface → paint → encode → deliver`. The surface
//! is held by an [`OffscreenSurface`] guard, so it is detached from its host
//! on every path out of the export, including errors. Every failure leaves
//! as a single [`ExportError`].

use crate::assets::{ImageSource, LoadedImages, preload};
use crate::error::{ExportError, RenderError, Result};
use crate::plan::ExportPlan;
use crate::raster::Rasterizer;
use pc_core::{ExportScale, Frame, FrameId, PREVIEW_SCALE};
use resvg::tiny_skia::Pixmap;
use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Shared texture used by text overlays.
pub const DEFAULT_TEXTURE: &str = "/textures/texture.jpg";

#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Scale the frames were authored at.
    pub preview_scale: f64,
    /// Reference of the texture image used by text overlays.
    pub texture_reference: String,
    /// Extra directories scanned for fonts.
    pub font_dirs: Vec<PathBuf>,
    pub load_system_fonts: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            preview_scale: PREVIEW_SCALE,
            texture_reference: DEFAULT_TEXTURE.to_string(),
            font_dirs: Vec::new(),
            load_system_fonts: true,
        }
    }
}

// ─── Off-screen surface ─────────────────────────────────────────────────

/// Owner of the (single) off-screen export surface.
#[derive(Debug, Default)]
pub struct OffscreenHost {
    attached: Cell<Option<FrameId>>,
    attach_count: Cell<u64>,
}

impl OffscreenHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frame whose surface is currently attached.
    pub fn attached(&self) -> Option<FrameId> {
        self.attached.get()
    }

    pub fn is_attached(&self) -> bool {
        self.attached.get().is_some()
    }

    /// Number of surfaces attached over the host's lifetime.
    pub fn attach_count(&self) -> u64 {
        self.attach_count.get()
    }

    /// Attach a transparent `width × height` surface for `frame`.
    pub fn attach(&self, frame: FrameId, width: u32, height: u32) -> Result<OffscreenSurface<'_>> {
        if let Some(current) = self.attached.get() {
            return Err(RenderError::Busy(current));
        }
        let pixmap = Pixmap::new(width, height).ok_or(RenderError::Surface(width, height))?;
        self.attached.set(Some(frame));
        self.attach_count.set(self.attach_count.get() + 1);
        log::debug!("attached {width}×{height} export surface for {frame}");
        Ok(OffscreenSurface { host: self, pixmap })
    }
}

/// An attached export surface. Detaches on drop.
pub struct OffscreenSurface<'h> {
    host: &'h OffscreenHost,
    pub pixmap: Pixmap,
}

impl Drop for OffscreenSurface<'_> {
    fn drop(&mut self) {
        if let Some(frame) = self.host.attached.take() {
            log::debug!("detached export surface for {frame}");
        }
    }
}

// ─── Output ─────────────────────────────────────────────────────────────

/// An encoded export.
#[derive(Debug, Clone)]
pub struct ExportOutput {
    pub file_name: String,
    pub width: u32,
    pub height: u32,
    pub png: Vec<u8>,
    /// Image references that could not be loaded and were left out.
    pub skipped_images: Vec<String>,
}

/// Where finished exports go.
pub trait ExportSink {
    fn deliver(&mut self, file_name: &str, png: &[u8]) -> Result<()>;
}

/// Writes each export as a file into a directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            written: Vec::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

/// Path separators and other characters that cannot appear in a file name.
fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

impl ExportSink for DirectorySink {
    fn deliver(&mut self, file_name: &str, png: &[u8]) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(sanitize_file_name(file_name));
        std::fs::write(&path, png)?;
        log::info!("wrote {}", path.display());
        self.written.push(path);
        Ok(())
    }
}

/// Keeps exports in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub files: Vec<(String, Vec<u8>)>,
}

impl ExportSink for MemorySink {
    fn deliver(&mut self, file_name: &str, png: &[u8]) -> Result<()> {
        self.files.push((file_name.to_string(), png.to_vec()));
        Ok(())
    }
}

// ─── Renderer ───────────────────────────────────────────────────────────

pub struct ExportRenderer {
    config: ExportConfig,
    scale: ExportScale,
    rasterizer: Rasterizer,
    host: OffscreenHost,
}

impl ExportRenderer {
    pub fn new(config: ExportConfig) -> Self {
        let mut db = usvg::fontdb::Database::new();
        if config.load_system_fonts {
            db.load_system_fonts();
        }
        for dir in &config.font_dirs {
            db.load_fonts_dir(dir);
        }
        log::debug!("export font database has {} faces", db.len());

        Self {
            scale: ExportScale::from_preview(config.preview_scale),
            rasterizer: Rasterizer::new(Arc::new(db)),
            host: OffscreenHost::new(),
            config,
        }
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    pub fn scale(&self) -> ExportScale {
        self.scale
    }

    pub fn host(&self) -> &OffscreenHost {
        &self.host
    }

    /// Lay out `frame` at full resolution without drawing it.
    pub fn plan(&self, frame: &Frame) -> ExportPlan {
        ExportPlan::build(frame, self.scale, &self.config.texture_reference)
    }

    /// Render `frame` to PNG bytes.
    pub fn render(&self, frame: &Frame, images: &dyn ImageSource) -> Result<ExportOutput, ExportError> {
        let plan = self.plan(frame);
        self.render_plan(&plan, images).map_err(|source| {
            log::error!("export of {} failed: {source}", plan.frame_id);
            ExportError {
                file_name: plan.file_name.clone(),
                source,
            }
        })
    }

    /// Render `frame` and hand the PNG to `sink`.
    pub fn export(
        &self,
        frame: &Frame,
        images: &dyn ImageSource,
        sink: &mut dyn ExportSink,
    ) -> Result<ExportOutput, ExportError> {
        let output = self.render(frame, images)?;
        sink.deliver(&output.file_name, &output.png)
            .map_err(|source| ExportError {
                file_name: output.file_name.clone(),
                source,
            })?;
        Ok(output)
    }

    fn render_plan(&self, plan: &ExportPlan, images: &dyn ImageSource) -> Result<ExportOutput> {
        let loaded: LoadedImages = preload(images, plan.image_references());

        let mut surface = self.host.attach(plan.frame_id, plan.width, plan.height)?;
        self.rasterizer.paint(&mut surface.pixmap, plan, &loaded)?;
        let png = surface
            .pixmap
            .encode_png()
            .map_err(|e| RenderError::Encode(e.to_string()))?;
        drop(surface);

        log::info!(
            "exported {} ({}×{}, {} bytes)",
            plan.file_name,
            plan.width,
            plan.height,
            png.len()
        );
        Ok(ExportOutput {
            file_name: plan.file_name.clone(),
            width: plan.width,
            height: plan.height,
            png,
            skipped_images: loaded.failed().to_vec(),
        })
    }
}
