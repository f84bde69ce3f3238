//! Rasterization of an export plan onto a tiny-skia pixmap.
//!
//! Layers, bottom to top:
//! 1. image background (base fill, then the image cover-fitted and centred),
//! 2. the vector document from [`crate::svg::compose`],
//! 3. texture overlays, multiplied into the glyphs of their text block,
//! 4. the logo, contain-fitted into its corner box.
//!
//! Missing images skip their layer; they never fail the export.

use crate::assets::LoadedImages;
use crate::error::Result;
use crate::plan::{BackgroundPlan, ExportPlan, TextPlan};
use crate::svg;
use kurbo::Rect;
use resvg::tiny_skia::{
    self, BlendMode, FilterQuality, Mask, MaskType, Pixmap, PixmapPaint, Transform,
};
use std::sync::Arc;

fn skia_color(color: pc_core::Color) -> tiny_skia::Color {
    let [r, g, b, a] = color.to_rgba8();
    tiny_skia::Color::from_rgba8(r, g, b, a)
}

/// Transform drawing an `image` so it covers `dest`, centred.
fn cover(image: &Pixmap, dest: Rect) -> Transform {
    let (iw, ih) = (f64::from(image.width()), f64::from(image.height()));
    let scale = (dest.width() / iw).max(dest.height() / ih);
    let (w, h) = (iw * scale, ih * scale);
    let tx = dest.x0 + (dest.width() - w) / 2.0;
    let ty = dest.y0 + (dest.height() - h) / 2.0;
    Transform::from_row(scale as f32, 0.0, 0.0, scale as f32, tx as f32, ty as f32)
}

/// Transform drawing an `image` stretched into `dest`.
fn place(image: &Pixmap, dest: Rect) -> Transform {
    let sx = dest.width() / f64::from(image.width());
    let sy = dest.height() / f64::from(image.height());
    Transform::from_row(
        sx as f32,
        0.0,
        0.0,
        sy as f32,
        dest.x0 as f32,
        dest.y0 as f32,
    )
}

fn pixmap_paint(opacity: f64, blend_mode: BlendMode) -> PixmapPaint {
    PixmapPaint {
        opacity: opacity.clamp(0.0, 1.0) as f32,
        blend_mode,
        quality: FilterQuality::Bicubic,
    }
}

pub struct Rasterizer {
    options: usvg::Options<'static>,
}

impl Rasterizer {
    pub fn new(fontdb: Arc<usvg::fontdb::Database>) -> Self {
        Self {
            options: usvg::Options {
                fontdb,
                ..Default::default()
            },
        }
    }

    fn render_svg(&self, document: &str, target: &mut Pixmap) -> Result<()> {
        let tree = usvg::Tree::from_str(document, &self.options)?;
        resvg::render(&tree, Transform::identity(), &mut target.as_mut());
        Ok(())
    }

    /// Draw `plan` onto `pixmap`, which must already be `plan.width × plan.height`.
    pub fn paint(&self, pixmap: &mut Pixmap, plan: &ExportPlan, images: &LoadedImages) -> Result<()> {
        let bounds = plan.bounds();

        if let BackgroundPlan::Image { reference, base } = &plan.background {
            pixmap.fill(skia_color(*base));
            match images.get(reference) {
                Some(image) => pixmap.draw_pixmap(
                    0,
                    0,
                    image.as_ref(),
                    &pixmap_paint(1.0, BlendMode::SourceOver),
                    cover(image, bounds),
                    None,
                ),
                None => log::warn!("background image {reference} missing, using base fill"),
            }
        }

        self.render_svg(&svg::compose(plan), pixmap)?;

        if let Some(texture) = plan.texture_reference.as_deref().and_then(|r| images.get(r)) {
            for text in plan.texts.iter().filter(|t| t.texture.is_some()) {
                self.paint_texture(pixmap, plan, text, texture)?;
            }
        }

        if let Some(logo) = &plan.logo {
            match images.get(&logo.reference) {
                Some(image) => {
                    let dest = logo.fit(f64::from(image.width()), f64::from(image.height()));
                    pixmap.draw_pixmap(
                        0,
                        0,
                        image.as_ref(),
                        &pixmap_paint(logo.opacity, BlendMode::SourceOver),
                        place(image, dest),
                        None,
                    );
                }
                None => log::warn!("logo {} missing, exporting without it", logo.reference),
            }
        }
        Ok(())
    }

    fn paint_texture(
        &self,
        pixmap: &mut Pixmap,
        plan: &ExportPlan,
        text: &TextPlan,
        texture: &Pixmap,
    ) -> Result<()> {
        let Some(overlay) = text.texture else {
            return Ok(());
        };
        let mut glyphs = Pixmap::new(plan.width, plan.height)
            .ok_or(crate::error::RenderError::Surface(plan.width, plan.height))?;
        self.render_svg(&svg::glyph_mask(plan, text), &mut glyphs)?;
        let mask = Mask::from_pixmap(glyphs.as_ref(), MaskType::Alpha);

        // Tile keeps the texture's aspect ratio and is centred on the block.
        let tile_w = overlay.tile_width;
        let tile_h = tile_w * f64::from(texture.height()) / f64::from(texture.width());
        let center = text.bounds.center();
        let dest = Rect::new(
            center.x - tile_w / 2.0,
            center.y - tile_h / 2.0,
            center.x + tile_w / 2.0,
            center.y + tile_h / 2.0,
        );
        pixmap.draw_pixmap(
            0,
            0,
            texture.as_ref(),
            &pixmap_paint(overlay.opacity, BlendMode::Multiply),
            place(texture, dest),
            Some(&mask),
        );
        Ok(())
    }
}
