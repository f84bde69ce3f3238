//! Preview ↔ export scaling.
//!
//! Frames are authored on a preview drawn at [`PREVIEW_SCALE`] of their true
//! size. Every pixel-valued style is authored in preview pixels, so export
//! multiplies each one by `1 / PREVIEW_SCALE` and rounds to whole pixels.

use crate::style::{StyleDefault, StyleDict, StyleKey, StyleValue, Unit};

/// Scale at which frames are drawn on the canvas.
pub const PREVIEW_SCALE: f64 = 0.3;

/// Multiplier from preview pixels to export pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportScale {
    factor: f64,
}

impl Default for ExportScale {
    fn default() -> Self {
        Self::from_preview(PREVIEW_SCALE)
    }
}

impl ExportScale {
    pub fn from_preview(preview_scale: f64) -> Self {
        let preview_scale = if preview_scale > 0.0 && preview_scale.is_finite() {
            preview_scale
        } else {
            log::warn!("invalid preview scale {preview_scale}, using {PREVIEW_SCALE}");
            PREVIEW_SCALE
        };
        Self {
            factor: 1.0 / preview_scale,
        }
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    /// A preview-pixel metric at export resolution, rounded.
    pub fn px(&self, preview_px: f64) -> f64 {
        (preview_px * self.factor).round()
    }

    /// Unrounded multiply, for sizes derived from other sizes.
    pub fn raw(&self, preview_px: f64) -> f64 {
        preview_px * self.factor
    }

    /// Copy of `styles` with every pixel-unit key rescaled.
    ///
    /// Keys that are unset but carry a non-zero default (font sizes) are
    /// materialized so the export never falls back to a preview-sized default.
    /// Zero-default keys stay unset; presence is meaningful for some of them
    /// (a shadow exists only once one of its metrics is set).
    pub fn scale_style(&self, styles: &StyleDict) -> StyleDict {
        let mut out = styles.clone();
        for &key in StyleKey::ALL.iter().filter(|k| k.unit() == Unit::Px) {
            let value = match (styles.get(key), key.default_value()) {
                (Some(StyleValue::Num(n)), _) => *n,
                (None, StyleDefault::Num(d)) if d != 0.0 => d,
                _ => continue,
            };
            // Kind is fixed by the key, so this insert cannot fail.
            let _ = out.set(key, self.px(value));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_font_exports_at_107() {
        let scale = ExportScale::default();
        assert_eq!(scale.px(32.0), 107.0);
        assert_eq!(scale.px(16.0), 53.0);
        assert_eq!(scale.px(24.0), 80.0);
    }

    #[test]
    fn scale_style_touches_only_pixel_keys() {
        let mut dict = StyleDict::new();
        dict.set(StyleKey::HeaderFontSize, 32.0).unwrap();
        dict.set(StyleKey::HeaderTextShadowBlur, 3.0).unwrap();
        dict.set(StyleKey::HeaderLineHeight, 1.2).unwrap();
        dict.set(StyleKey::BackgroundGradientAngle, 45.0).unwrap();

        let scaled = ExportScale::default().scale_style(&dict);
        assert_eq!(scaled.num(StyleKey::HeaderFontSize), 107.0);
        assert_eq!(scaled.num(StyleKey::HeaderTextShadowBlur), 10.0);
        assert_eq!(scaled.num(StyleKey::HeaderLineHeight), 1.2);
        assert_eq!(scaled.num(StyleKey::BackgroundGradientAngle), 45.0);
        // Unset default font size is materialized.
        assert_eq!(scaled.num(StyleKey::SubtextFontSize), 53.0);
        // Unset zero-default metrics stay unset.
        assert!(!scaled.is_set(StyleKey::HeaderTextShadowX));
    }

    #[test]
    fn invalid_preview_scale_falls_back() {
        assert_eq!(ExportScale::from_preview(0.0), ExportScale::default());
    }
}
