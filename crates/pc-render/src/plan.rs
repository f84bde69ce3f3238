//! The off-screen export plan.
//!
//! An [`ExportPlan`] is a frame laid out at its archetype's true pixel size
//! with every preview-pixel metric already multiplied by the export factor.
//! Building it is pure; drawing it is the rasterizer's job.
//!
//! Layout follows the canvas preview:
//! - header block vertically centred at 19 % of the height,
//! - subtext starting at 25 % when a call-to-action exists, otherwise
//!   centred at 83.33 %,
//! - call-to-action bottom edge at 80 %, aligned like the header,
//! - logo inset into one corner.

use crate::background::normalized_stops;
use kurbo::Rect;
use pc_core::style::{Alignment, BackgroundMode, GradientKind, LogoCorner, TextFill};
use pc_core::{Color, ExportScale, Frame, FrameId, StyleDict, StyleKey, TextRole};

/// Preview-pixel layout constants. All go through the export factor.
pub mod metrics {
    pub const TEXT_PADDING: f64 = 24.0;
    pub const CTA_FONT_SIZE: f64 = 14.0;
    pub const CTA_PADDING_Y: f64 = 12.0;
    pub const CTA_PADDING_X: f64 = 24.0;
    pub const CTA_RADIUS: f64 = 8.0;
    pub const LOGO_MAX_WIDTH: f64 = 40.0;
    pub const LOGO_MAX_HEIGHT: f64 = 30.0;
    pub const LOGO_INSET_Y: f64 = 8.0;
    pub const LOGO_INSET_X: f64 = 6.0;
    pub const LOGO_PADDING: f64 = 2.0;
    /// Texture tile width as a fraction of the text block width, before scaling.
    pub const TEXTURE_TILE: f64 = 0.4;
}

const HEADER_CENTER: f64 = 0.19;
const SUBTEXT_TOP_WITH_CTA: f64 = 0.25;
const SUBTEXT_CENTER: f64 = 0.8333;
const CTA_BOTTOM: f64 = 0.80;
const CTA_LINE_HEIGHT: f64 = 1.2;

/// Average advance of a glyph as a fraction of the font size, used to wrap
/// lines before the real shaper sees them.
const GLYPH_ADVANCE: f64 = 0.55;
const GLYPH_ADVANCE_BOLD: f64 = 0.6;
/// Ascent of the first baseline below the top of its line box, as a fraction
/// of the font size.
const ASCENT: f64 = 0.8;

#[derive(Debug, Clone, PartialEq)]
pub enum BackgroundPlan {
    Solid(Color),
    Linear {
        start: Color,
        end: Color,
        stops: (f64, f64),
        /// CSS angle (stored angle + 180°).
        css_angle: f64,
    },
    Radial {
        start: Color,
        end: Color,
        stops: (f64, f64),
    },
    /// Cover-fit image over a base fill.
    Image { reference: String, base: Color },
}

#[derive(Debug, Clone, PartialEq)]
pub enum TextPaint {
    Solid(Color),
    /// Two-stop 135° gradient across the text box.
    Gradient(Color, Color),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokePlan {
    pub width: f64,
    pub color: Color,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowPlan {
    pub dx: f64,
    pub dy: f64,
    pub blur: f64,
    pub color: Color,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TexturePlan {
    pub opacity: f64,
    /// Tile width in export pixels; the tile is centred on the text box.
    pub tile_width: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextPlan {
    pub role: TextRole,
    pub lines: Vec<String>,
    pub font_size: f64,
    pub font_weight: u16,
    /// `None` means the default sans-serif stack.
    pub font_family: Option<String>,
    /// Line box height in pixels.
    pub line_height: f64,
    pub align: Alignment,
    /// x of the text anchor (left edge, centre or right edge).
    pub anchor_x: f64,
    /// Text box: padded block width by total line height.
    pub bounds: Rect,
    pub paint: TextPaint,
    pub stroke: Option<StrokePlan>,
    pub shadow: Option<ShadowPlan>,
    pub texture: Option<TexturePlan>,
    pub opacity: f64,
}

impl TextPlan {
    /// Baseline of line `i`.
    pub fn baseline(&self, i: usize) -> f64 {
        let leading = (self.line_height - self.font_size) / 2.0;
        self.bounds.y0 + i as f64 * self.line_height + leading + self.font_size * ASCENT
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CtaPlan {
    pub text: String,
    pub font_size: f64,
    pub rect: Rect,
    pub radius: f64,
    pub fill: Color,
    pub text_color: Color,
}

impl CtaPlan {
    pub fn baseline(&self) -> f64 {
        let line = self.font_size * CTA_LINE_HEIGHT;
        let top = self.rect.center().y - line / 2.0;
        top + (line - self.font_size) / 2.0 + self.font_size * ASCENT
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogoPlan {
    pub reference: String,
    /// Content box the image is contain-fitted into.
    pub content: Rect,
    pub corner: LogoCorner,
    pub opacity: f64,
}

impl LogoPlan {
    /// Destination of an `iw × ih` image: contain-fit, hugging the corner.
    pub fn fit(&self, iw: f64, ih: f64) -> Rect {
        let scale = (self.content.width() / iw).min(self.content.height() / ih);
        let (w, h) = (iw * scale, ih * scale);
        let x = if self.corner.is_left() {
            self.content.x0
        } else {
            self.content.x1 - w
        };
        let y = if self.corner.is_top() {
            self.content.y0
        } else {
            self.content.y1 - h
        };
        Rect::new(x, y, x + w, y + h)
    }
}

/// A frame laid out for export.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportPlan {
    pub frame_id: FrameId,
    pub file_name: String,
    pub width: u32,
    pub height: u32,
    pub background: BackgroundPlan,
    /// Header then subtext, when visible.
    pub texts: Vec<TextPlan>,
    pub cta: Option<CtaPlan>,
    pub logo: Option<LogoPlan>,
    /// Shared texture image, when any text block uses it.
    pub texture_reference: Option<String>,
}

impl ExportPlan {
    pub fn build(frame: &Frame, scale: ExportScale, texture_reference: &str) -> Self {
        let width = frame.archetype.width;
        let height = frame.archetype.height;
        let styles = scale.scale_style(&frame.styles);
        let layout = Layout {
            w: f64::from(width),
            h: f64::from(height),
            padding: scale.px(metrics::TEXT_PADDING),
            scale,
        };

        let has_cta = !styles.text(StyleKey::CtaText).is_empty();
        let texts: Vec<TextPlan> = [TextRole::Header, TextRole::Subtext]
            .into_iter()
            .filter(|role| styles.text_visible(*role))
            .map(|role| layout.text(&styles, role, has_cta))
            .collect();

        let texture_reference = texts
            .iter()
            .any(|t| t.texture.is_some())
            .then(|| texture_reference.to_string());

        Self {
            frame_id: frame.id,
            file_name: frame.export_file_name(),
            width,
            height,
            background: background(&styles),
            cta: has_cta.then(|| layout.cta(&styles)),
            logo: layout.logo(&styles),
            texts,
            texture_reference,
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }

    pub fn text(&self, role: TextRole) -> Option<&TextPlan> {
        self.texts.iter().find(|t| t.role == role)
    }

    /// Every image the export needs, in draw order.
    pub fn image_references(&self) -> Vec<&str> {
        let mut refs = Vec::new();
        if let BackgroundPlan::Image { reference, .. } = &self.background {
            refs.push(reference.as_str());
        }
        if let Some(texture) = &self.texture_reference {
            refs.push(texture.as_str());
        }
        if let Some(logo) = &self.logo {
            refs.push(logo.reference.as_str());
        }
        refs
    }
}

fn background(styles: &StyleDict) -> BackgroundPlan {
    let solid = Color::parse_or(styles.text(StyleKey::BackgroundColor), "#ffffff");
    let start = || Color::parse_or(styles.text(StyleKey::BackgroundGradientStart), "#3b82f6");
    let end = || Color::parse_or(styles.text(StyleKey::BackgroundGradientEnd), "#8b5cf6");
    let (s, e) = styles.gradient_stops();
    let stops = normalized_stops(s, e);

    match styles.background_mode() {
        BackgroundMode::Gradient => match styles.gradient_kind() {
            GradientKind::Radial => BackgroundPlan::Radial {
                start: start(),
                end: end(),
                stops,
            },
            GradientKind::Linear => BackgroundPlan::Linear {
                start: start(),
                end: end(),
                stops,
                css_angle: styles.num(StyleKey::BackgroundGradientAngle) + 180.0,
            },
        },
        BackgroundMode::Image if !styles.text(StyleKey::BackgroundImage).is_empty() => {
            BackgroundPlan::Image {
                reference: styles.text(StyleKey::BackgroundImage).to_string(),
                base: Color::WHITE,
            }
        }
        _ => BackgroundPlan::Solid(solid),
    }
}

struct Layout {
    w: f64,
    h: f64,
    padding: f64,
    scale: ExportScale,
}

impl Layout {
    fn anchor_x(&self, align: Alignment, offset_x: f64) -> f64 {
        offset_x
            + match align {
                Alignment::Left => self.padding,
                Alignment::Center => self.w / 2.0,
                Alignment::Right => self.w - self.padding,
            }
    }

    fn text(&self, styles: &StyleDict, role: TextRole, has_cta: bool) -> TextPlan {
        let block = styles.text_block(role);
        let (bold, default_color) = match role {
            TextRole::Header => (true, "#000000"),
            TextRole::Subtext => (false, "#666666"),
        };
        let font_size = block.font_size.max(1.0);
        let line_height = font_size * block.line_height.max(0.1);
        let advance = if bold { GLYPH_ADVANCE_BOLD } else { GLYPH_ADVANCE };
        let available = (self.w - 2.0 * self.padding).max(font_size);
        let lines = wrap_text(block.text, available, font_size * advance);
        let text_height = lines.len() as f64 * line_height;

        let (off_x, off_y) = block.offset;
        let top = match role {
            TextRole::Header => self.h * HEADER_CENTER - text_height / 2.0,
            TextRole::Subtext if has_cta => self.h * SUBTEXT_TOP_WITH_CTA + self.padding,
            TextRole::Subtext => self.h * SUBTEXT_CENTER - text_height / 2.0,
        } + off_y;
        let bounds = Rect::new(
            self.padding + off_x,
            top,
            self.w - self.padding + off_x,
            top + text_height,
        );

        let paint = match block.fill {
            TextFill::Gradient { start, end } => TextPaint::Gradient(
                Color::parse_or(start, default_color),
                Color::parse_or(end, default_color),
            ),
            TextFill::Color(c) => TextPaint::Solid(Color::parse_or(c, default_color)),
        };

        TextPlan {
            role,
            lines,
            font_size,
            font_weight: if bold { 700 } else { 400 },
            font_family: match block.font_family.trim() {
                "" | "inherit" => None,
                family => Some(family.to_string()),
            },
            line_height,
            align: block.alignment,
            anchor_x: self.anchor_x(block.alignment, off_x),
            bounds,
            paint,
            stroke: block.stroke.map(|s| StrokePlan {
                width: s.width,
                color: Color::parse_or(s.color, "#000000"),
            }),
            shadow: block.shadow.map(|s| ShadowPlan {
                dx: s.x,
                dy: s.y,
                blur: s.blur.max(0.0),
                color: Color::parse_or(s.color, "#000000"),
            }),
            texture: block.texture.map(|opacity| TexturePlan {
                opacity,
                tile_width: bounds.width() * self.scale.raw(metrics::TEXTURE_TILE),
            }),
            opacity: block.opacity,
        }
    }

    fn cta(&self, styles: &StyleDict) -> CtaPlan {
        let text = styles.text(StyleKey::CtaText).to_string();
        let font_size = self.scale.px(metrics::CTA_FONT_SIZE);
        let pad_x = self.scale.px(metrics::CTA_PADDING_X);
        let pad_y = self.scale.px(metrics::CTA_PADDING_Y);
        let width = text.chars().count() as f64 * font_size * GLYPH_ADVANCE + 2.0 * pad_x;
        let height = font_size * CTA_LINE_HEIGHT + 2.0 * pad_y;

        let align = styles.alignment(TextRole::Header);
        let off_x = styles.num(StyleKey::CtaOffsetX);
        let off_y = styles.num(StyleKey::CtaOffsetY);
        let x0 = match align {
            Alignment::Left => self.padding,
            Alignment::Center => (self.w - width) / 2.0,
            Alignment::Right => self.w - self.padding - width,
        } + off_x;
        let y1 = self.h * CTA_BOTTOM + off_y;

        CtaPlan {
            text,
            font_size,
            rect: Rect::new(x0, y1 - height, x0 + width, y1),
            radius: self.scale.px(metrics::CTA_RADIUS),
            fill: Color::parse_or(styles.text(StyleKey::CtaButtonColor), "#3b82f6"),
            text_color: Color::parse_or(styles.text(StyleKey::CtaTextColor), "#ffffff"),
        }
    }

    fn logo(&self, styles: &StyleDict) -> Option<LogoPlan> {
        let reference = styles.text(StyleKey::LogoImage);
        if reference.is_empty() || !styles.flag(StyleKey::LogoVisible) {
            return None;
        }
        let corner = styles.logo_corner();
        let max_w = self.scale.px(metrics::LOGO_MAX_WIDTH);
        let max_h = self.scale.px(metrics::LOGO_MAX_HEIGHT);
        let inset_x = self.scale.px(metrics::LOGO_INSET_X);
        let inset_y = self.scale.px(metrics::LOGO_INSET_Y);
        let pad = self.scale.px(metrics::LOGO_PADDING);

        let x0 = if corner.is_left() {
            inset_x
        } else {
            self.w - inset_x - max_w
        };
        let y0 = if corner.is_top() {
            inset_y
        } else {
            self.h - inset_y - max_h
        };
        Some(LogoPlan {
            reference: reference.to_string(),
            content: Rect::new(x0 + pad, y0 + pad, x0 + max_w - pad, y0 + max_h - pad),
            corner,
            opacity: styles.num(StyleKey::LogoOpacity).clamp(0.0, 1.0),
        })
    }
}

/// Greedy word wrap against an estimated glyph advance. Explicit newlines
/// are kept; a word longer than the line stays on a line of its own.
pub fn wrap_text(text: &str, max_width: f64, advance: f64) -> Vec<String> {
    let max_chars = ((max_width / advance.max(f64::EPSILON)).floor() as usize).max(1);
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let needed = if line.is_empty() {
                word.chars().count()
            } else {
                line.chars().count() + 1 + word.chars().count()
            };
            if needed > max_chars && !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(word);
        }
        lines.push(line);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use pc_core::FrameStore;

    fn frame_with(styles: &[(StyleKey, pc_core::StyleValue)]) -> Frame {
        let mut store = FrameStore::new();
        let id = store.add("instagram-post").unwrap();
        for (key, value) in styles {
            store.set_style(id, *key, value.clone()).unwrap();
        }
        store.get(id).unwrap().clone()
    }

    #[test]
    fn header_font_is_rescaled() {
        let frame = frame_with(&[(StyleKey::HeaderText, "Sale".into())]);
        let plan = ExportPlan::build(&frame, ExportScale::default(), "/t.jpg");
        assert_eq!((plan.width, plan.height), (1080, 1080));
        let header = plan.text(TextRole::Header).unwrap();
        assert_eq!(header.font_size, 107.0);
        assert_eq!(header.lines, vec!["Sale".to_string()]);
        assert_eq!(header.font_weight, 700);
        // Centred on 19 % of the height.
        assert!((header.bounds.center().y - 1080.0 * 0.19).abs() < 1e-9);
        assert_eq!(header.bounds.x0, 80.0);
        assert!(plan.texture_reference.is_none());
    }

    #[test]
    fn subtext_moves_up_when_cta_present() {
        let without = frame_with(&[(StyleKey::Subtext, "Details".into())]);
        let plan = ExportPlan::build(&without, ExportScale::default(), "/t.jpg");
        let sub = plan.text(TextRole::Subtext).unwrap();
        assert!((sub.bounds.center().y - 1080.0 * 0.8333).abs() < 1e-9);
        assert!(plan.cta.is_none());

        let with = frame_with(&[
            (StyleKey::Subtext, "Details".into()),
            (StyleKey::CtaText, "Shop".into()),
        ]);
        let plan = ExportPlan::build(&with, ExportScale::default(), "/t.jpg");
        let sub = plan.text(TextRole::Subtext).unwrap();
        assert_eq!(sub.bounds.y0, 1080.0 * 0.25 + 80.0);
        let cta = plan.cta.as_ref().unwrap();
        assert_eq!(cta.rect.y1, 864.0);
        assert_eq!(cta.font_size, 47.0);
        assert_eq!(cta.radius, 27.0);
    }

    #[test]
    fn hidden_or_empty_text_is_skipped() {
        let frame = frame_with(&[
            (StyleKey::HeaderText, "Hidden".into()),
            (StyleKey::HeaderVisible, false.into()),
        ]);
        let plan = ExportPlan::build(&frame, ExportScale::default(), "/t.jpg");
        assert!(plan.texts.is_empty());
    }

    #[test]
    fn background_modes() {
        let frame = frame_with(&[
            (StyleKey::BackgroundType, "gradient".into()),
            (StyleKey::BackgroundGradientAngle, 90.0.into()),
        ]);
        let plan = ExportPlan::build(&frame, ExportScale::default(), "/t.jpg");
        assert!(matches!(
            plan.background,
            BackgroundPlan::Linear { css_angle, stops, .. }
                if css_angle == 270.0 && stops == (0.0, 100.0)
        ));

        // Image mode without an image falls back to the solid colour.
        let frame = frame_with(&[
            (StyleKey::BackgroundType, "image".into()),
            (StyleKey::BackgroundColor, "#112233".into()),
        ]);
        let plan = ExportPlan::build(&frame, ExportScale::default(), "/t.jpg");
        assert_eq!(
            plan.background,
            BackgroundPlan::Solid(Color::from_hex("#112233").unwrap())
        );
    }

    #[test]
    fn logo_hugs_its_corner() {
        let frame = frame_with(&[
            (StyleKey::LogoImage, "/logo.png".into()),
            (StyleKey::LogoPosition, "bottom-left".into()),
        ]);
        let plan = ExportPlan::build(&frame, ExportScale::default(), "/t.jpg");
        let logo = plan.logo.as_ref().unwrap();
        // inset 20 + padding 7; box 133 × 100.
        assert_eq!(logo.content.x0, 27.0);
        assert_eq!(logo.content.y1, 1080.0 - 27.0 - 7.0);
        let fit = logo.fit(200.0, 100.0);
        assert_eq!(fit.x0, 27.0);
        assert_eq!(fit.y1, logo.content.y1);
        assert!((fit.width() - logo.content.width()).abs() < 1e-9);
        assert_eq!(plan.image_references(), vec!["/logo.png"]);
    }

    #[test]
    fn texture_tile_scales_with_block() {
        let frame = frame_with(&[
            (StyleKey::HeaderText, "Grit".into()),
            (StyleKey::HeaderTextureOverlay, true.into()),
        ]);
        let plan = ExportPlan::build(&frame, ExportScale::default(), "/textures/texture.jpg");
        let header = plan.text(TextRole::Header).unwrap();
        let texture = header.texture.unwrap();
        assert!((texture.tile_width - header.bounds.width() * 0.4 / 0.3).abs() < 1e-6);
        assert_eq!(plan.texture_reference.as_deref(), Some("/textures/texture.jpg"));
    }

    #[test]
    fn wrap_breaks_on_words() {
        let lines = wrap_text("Big summer sale today", 10.0 * 10.0, 10.0);
        assert_eq!(lines, vec!["Big summer", "sale today"]);
        assert_eq!(wrap_text("a\nb", 1000.0, 10.0), vec!["a", "b"]);
        assert_eq!(wrap_text("unbreakableword", 50.0, 10.0), vec!["unbreakableword"]);
    }
}
