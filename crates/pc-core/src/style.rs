//! Per-frame style dictionary.
//!
//! A flat map from [`StyleKey`] to a primitive [`StyleValue`]. The key set is
//! closed: every key carries its persisted name, its documented default (which
//! also fixes its value kind) and its unit. Pixel-unit keys are the ones the
//! export transform rescales, so adding a key forces a decision on all three.
//!
//! Absent keys read as their default. Writes replace exactly one key and only
//! check the value kind; range clamping belongs to the widget producing the
//! value.

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Value kind of a style key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Str,
    Num,
    Bool,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ValueKind::Str => "string",
            ValueKind::Num => "number",
            ValueKind::Bool => "boolean",
        })
    }
}

/// Whether a key holds a preview-pixel metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    /// Unitless, color, text, percentage or angle.
    Plain,
    /// Authored in preview pixels; rescaled on export.
    Px,
}

/// Documented default of a key. The variant also fixes the key's kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StyleDefault {
    Str(&'static str),
    Num(f64),
    Bool(bool),
}

impl StyleDefault {
    pub fn kind(self) -> ValueKind {
        match self {
            StyleDefault::Str(_) => ValueKind::Str,
            StyleDefault::Num(_) => ValueKind::Num,
            StyleDefault::Bool(_) => ValueKind::Bool,
        }
    }

    pub fn to_value(self) -> StyleValue {
        match self {
            StyleDefault::Str(s) => StyleValue::Str(s.to_string()),
            StyleDefault::Num(n) => StyleValue::Num(n),
            StyleDefault::Bool(b) => StyleValue::Bool(b),
        }
    }
}

macro_rules! style_keys {
    ($( $variant:ident => $name:literal, $default:expr, $unit:ident; )*) => {
        /// Every style property a frame can carry.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum StyleKey {
            $( $variant, )*
        }

        impl StyleKey {
            pub const ALL: &'static [StyleKey] = &[ $( StyleKey::$variant, )* ];

            /// Persisted (camelCase) name.
            pub fn name(self) -> &'static str {
                match self {
                    $( StyleKey::$variant => $name, )*
                }
            }

            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $( $name => Some(StyleKey::$variant), )*
                    _ => None,
                }
            }

            pub fn default_value(self) -> StyleDefault {
                use StyleDefault::*;
                match self {
                    $( StyleKey::$variant => $default, )*
                }
            }

            pub fn unit(self) -> Unit {
                match self {
                    $( StyleKey::$variant => Unit::$unit, )*
                }
            }
        }
    };
}

style_keys! {
    // Background
    BackgroundType => "backgroundType", Str("solid"), Plain;
    BackgroundAiPrompt => "backgroundAIPrompt", Str(""), Plain;
    BackgroundColor => "backgroundColor", Str("#ffffff"), Plain;
    BackgroundGradientStart => "backgroundGradientStart", Str("#3b82f6"), Plain;
    BackgroundGradientEnd => "backgroundGradientEnd", Str("#8b5cf6"), Plain;
    BackgroundGradientType => "backgroundGradientType", Str("linear"), Plain;
    BackgroundGradientAngle => "backgroundGradientAngle", Num(0.0), Plain;
    BackgroundGradientStartStop => "backgroundGradientStartStop", Num(0.0), Plain;
    BackgroundGradientEndStop => "backgroundGradientEndStop", Num(100.0), Plain;
    BackgroundImage => "backgroundImage", Str(""), Plain;

    // Header text block
    HeaderText => "headerText", Str(""), Plain;
    HeaderFontSize => "headerFontSize", Num(32.0), Px;
    HeaderColor => "headerColor", Str("#000000"), Plain;
    HeaderGradientStart => "headerGradientStart", Str(""), Plain;
    HeaderGradientEnd => "headerGradientEnd", Str(""), Plain;
    HeaderUseGradient => "headerUseGradient", Bool(false), Plain;
    HeaderTextureOverlay => "headerTextureOverlay", Bool(false), Plain;
    HeaderTextureOverlayOpacity => "headerTextureOverlayOpacity", Num(1.0), Plain;
    HeaderStrokeColor => "headerStrokeColor", Str(""), Plain;
    HeaderStrokeWidth => "headerStrokeWidth", Num(0.0), Px;
    HeaderTextShadowX => "headerTextShadowX", Num(0.0), Px;
    HeaderTextShadowY => "headerTextShadowY", Num(0.0), Px;
    HeaderTextShadowBlur => "headerTextShadowBlur", Num(0.0), Px;
    HeaderTextShadowColor => "headerTextShadowColor", Str("#000000"), Plain;
    HeaderAlignment => "headerAlignment", Str("center"), Plain;
    HeaderFontFamily => "headerFontFamily", Str("inherit"), Plain;
    HeaderLineHeight => "headerLineHeight", Num(1.2), Plain;
    HeaderOpacity => "headerOpacity", Num(1.0), Plain;
    HeaderVisible => "headerVisible", Bool(true), Plain;
    HeaderOffsetX => "headerOffsetX", Num(0.0), Px;
    HeaderOffsetY => "headerOffsetY", Num(0.0), Px;

    // Subtext block
    Subtext => "subtext", Str(""), Plain;
    SubtextFontSize => "subtextFontSize", Num(16.0), Px;
    SubtextColor => "subtextColor", Str("#666666"), Plain;
    SubtextGradientStart => "subtextGradientStart", Str(""), Plain;
    SubtextGradientEnd => "subtextGradientEnd", Str(""), Plain;
    SubtextUseGradient => "subtextUseGradient", Bool(false), Plain;
    SubtextTextureOverlay => "subtextTextureOverlay", Bool(false), Plain;
    SubtextTextureOverlayOpacity => "subtextTextureOverlayOpacity", Num(1.0), Plain;
    SubtextStrokeColor => "subtextStrokeColor", Str(""), Plain;
    SubtextStrokeWidth => "subtextStrokeWidth", Num(0.0), Px;
    SubtextTextShadowX => "subtextTextShadowX", Num(0.0), Px;
    SubtextTextShadowY => "subtextTextShadowY", Num(0.0), Px;
    SubtextTextShadowBlur => "subtextTextShadowBlur", Num(0.0), Px;
    SubtextTextShadowColor => "subtextTextShadowColor", Str("#000000"), Plain;
    SubtextAlignment => "subtextAlignment", Str(""), Plain;
    SubtextFontFamily => "subtextFontFamily", Str("inherit"), Plain;
    SubtextLineHeight => "subtextLineHeight", Num(1.5), Plain;
    SubtextOpacity => "subtextOpacity", Num(1.0), Plain;
    SubtextVisible => "subtextVisible", Bool(true), Plain;
    SubtextOffsetX => "subtextOffsetX", Num(0.0), Px;
    SubtextOffsetY => "subtextOffsetY", Num(0.0), Px;

    // Call to action
    CtaText => "ctaText", Str(""), Plain;
    CtaButtonColor => "ctaButtonColor", Str("#3b82f6"), Plain;
    CtaTextColor => "ctaTextColor", Str("#ffffff"), Plain;
    CtaLink => "ctaLink", Str(""), Plain;
    CtaOffsetX => "ctaOffsetX", Num(0.0), Px;
    CtaOffsetY => "ctaOffsetY", Num(0.0), Px;

    // Caption overlay
    CaptionVisible => "captionVisible", Bool(false), Plain;
    CaptionText => "captionText", Str(""), Plain;

    // Logo
    LogoImage => "logoImage", Str(""), Plain;
    LogoVisible => "logoVisible", Bool(true), Plain;
    LogoPosition => "logoPosition", Str("top-right"), Plain;
    LogoOpacity => "logoOpacity", Num(1.0), Plain;
}

impl StyleKey {
    pub fn kind(self) -> ValueKind {
        self.default_value().kind()
    }

    /// Keys whose string values may carry image references (and therefore
    /// inline image data that must never be persisted).
    pub fn holds_image(self) -> bool {
        matches!(self, StyleKey::BackgroundImage | StyleKey::LogoImage)
    }
}

impl fmt::Display for StyleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A primitive style value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StyleValue {
    Bool(bool),
    Num(f64),
    Str(String),
}

impl StyleValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            StyleValue::Str(_) => ValueKind::Str,
            StyleValue::Num(_) => ValueKind::Num,
            StyleValue::Bool(_) => ValueKind::Bool,
        }
    }

    pub fn as_num(&self) -> Option<f64> {
        match self {
            StyleValue::Num(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            StyleValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            StyleValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<f64> for StyleValue {
    fn from(n: f64) -> Self {
        StyleValue::Num(n)
    }
}

impl From<bool> for StyleValue {
    fn from(b: bool) -> Self {
        StyleValue::Bool(b)
    }
}

impl From<&str> for StyleValue {
    fn from(s: &str) -> Self {
        StyleValue::Str(s.to_string())
    }
}

impl From<String> for StyleValue {
    fn from(s: String) -> Self {
        StyleValue::Str(s)
    }
}

// ─── Enum views ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackgroundMode {
    Solid,
    Gradient,
    Image,
    /// Waiting on an AI-generated image; renders as the solid color.
    AiPrompt,
}

impl BackgroundMode {
    pub fn parse(s: &str) -> Self {
        match s {
            "gradient" => Self::Gradient,
            "image" => Self::Image,
            "ai" => Self::AiPrompt,
            _ => Self::Solid,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Solid => "solid",
            Self::Gradient => "gradient",
            Self::Image => "image",
            Self::AiPrompt => "ai",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradientKind {
    Linear,
    Radial,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Center,
    Right,
}

impl Alignment {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "left" => Some(Self::Left),
            "center" => Some(Self::Center),
            "right" => Some(Self::Right),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoCorner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl LogoCorner {
    pub fn parse(s: &str) -> Self {
        match s {
            "top-left" => Self::TopLeft,
            "bottom-left" => Self::BottomLeft,
            "bottom-right" => Self::BottomRight,
            _ => Self::TopRight,
        }
    }

    pub fn is_top(self) -> bool {
        matches!(self, Self::TopLeft | Self::TopRight)
    }

    pub fn is_left(self) -> bool {
        matches!(self, Self::TopLeft | Self::BottomLeft)
    }
}

// ─── Text block key sets ────────────────────────────────────────────────

/// Which text block of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextRole {
    Header,
    Subtext,
}

/// The keys that make up one text block.
#[derive(Debug)]
pub struct TextKeys {
    pub text: StyleKey,
    pub font_size: StyleKey,
    pub color: StyleKey,
    pub gradient_start: StyleKey,
    pub gradient_end: StyleKey,
    pub use_gradient: StyleKey,
    pub texture: StyleKey,
    pub texture_opacity: StyleKey,
    pub stroke_color: StyleKey,
    pub stroke_width: StyleKey,
    pub shadow_x: StyleKey,
    pub shadow_y: StyleKey,
    pub shadow_blur: StyleKey,
    pub shadow_color: StyleKey,
    pub alignment: StyleKey,
    pub font_family: StyleKey,
    pub line_height: StyleKey,
    pub opacity: StyleKey,
    pub visible: StyleKey,
    pub offset_x: StyleKey,
    pub offset_y: StyleKey,
}

static HEADER_KEYS: TextKeys = TextKeys {
    text: StyleKey::HeaderText,
    font_size: StyleKey::HeaderFontSize,
    color: StyleKey::HeaderColor,
    gradient_start: StyleKey::HeaderGradientStart,
    gradient_end: StyleKey::HeaderGradientEnd,
    use_gradient: StyleKey::HeaderUseGradient,
    texture: StyleKey::HeaderTextureOverlay,
    texture_opacity: StyleKey::HeaderTextureOverlayOpacity,
    stroke_color: StyleKey::HeaderStrokeColor,
    stroke_width: StyleKey::HeaderStrokeWidth,
    shadow_x: StyleKey::HeaderTextShadowX,
    shadow_y: StyleKey::HeaderTextShadowY,
    shadow_blur: StyleKey::HeaderTextShadowBlur,
    shadow_color: StyleKey::HeaderTextShadowColor,
    alignment: StyleKey::HeaderAlignment,
    font_family: StyleKey::HeaderFontFamily,
    line_height: StyleKey::HeaderLineHeight,
    opacity: StyleKey::HeaderOpacity,
    visible: StyleKey::HeaderVisible,
    offset_x: StyleKey::HeaderOffsetX,
    offset_y: StyleKey::HeaderOffsetY,
};

static SUBTEXT_KEYS: TextKeys = TextKeys {
    text: StyleKey::Subtext,
    font_size: StyleKey::SubtextFontSize,
    color: StyleKey::SubtextColor,
    gradient_start: StyleKey::SubtextGradientStart,
    gradient_end: StyleKey::SubtextGradientEnd,
    use_gradient: StyleKey::SubtextUseGradient,
    texture: StyleKey::SubtextTextureOverlay,
    texture_opacity: StyleKey::SubtextTextureOverlayOpacity,
    stroke_color: StyleKey::SubtextStrokeColor,
    stroke_width: StyleKey::SubtextStrokeWidth,
    shadow_x: StyleKey::SubtextTextShadowX,
    shadow_y: StyleKey::SubtextTextShadowY,
    shadow_blur: StyleKey::SubtextTextShadowBlur,
    shadow_color: StyleKey::SubtextTextShadowColor,
    alignment: StyleKey::SubtextAlignment,
    font_family: StyleKey::SubtextFontFamily,
    line_height: StyleKey::SubtextLineHeight,
    opacity: StyleKey::SubtextOpacity,
    visible: StyleKey::SubtextVisible,
    offset_x: StyleKey::SubtextOffsetX,
    offset_y: StyleKey::SubtextOffsetY,
};

impl TextRole {
    pub fn keys(self) -> &'static TextKeys {
        match self {
            TextRole::Header => &HEADER_KEYS,
            TextRole::Subtext => &SUBTEXT_KEYS,
        }
    }
}

/// Text fill: plain color or a two-stop 135° gradient.
#[derive(Debug, Clone, PartialEq)]
pub enum TextFill<'a> {
    Color(&'a str),
    Gradient { start: &'a str, end: &'a str },
}

/// Drop shadow of a text block (values in the dictionary's units).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextShadow<'a> {
    pub x: f64,
    pub y: f64,
    pub blur: f64,
    pub color: &'a str,
}

/// Outline stroke of a text block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStroke<'a> {
    pub width: f64,
    pub color: &'a str,
}

/// Resolved view of one text block, defaults applied.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlockStyle<'a> {
    pub role: TextRole,
    pub text: &'a str,
    pub font_size: f64,
    pub fill: TextFill<'a>,
    pub font_family: &'a str,
    pub line_height: f64,
    pub alignment: Alignment,
    pub stroke: Option<TextStroke<'a>>,
    pub shadow: Option<TextShadow<'a>>,
    /// Texture overlay opacity, when the overlay is enabled.
    pub texture: Option<f64>,
    pub opacity: f64,
    pub offset: (f64, f64),
}

// ─── Dictionary ─────────────────────────────────────────────────────────

/// The per-frame style dictionary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleDict {
    values: BTreeMap<StyleKey, StyleValue>,
}

impl StyleDict {
    pub fn new() -> Self {
        Self::default()
    }

    /// The explicit starting values of a freshly added frame.
    pub fn frame_defaults() -> Self {
        let mut dict = Self::new();
        for key in [
            StyleKey::BackgroundType,
            StyleKey::BackgroundColor,
            StyleKey::BackgroundGradientStart,
            StyleKey::BackgroundGradientEnd,
            StyleKey::BackgroundGradientStartStop,
            StyleKey::BackgroundGradientEndStop,
            StyleKey::BackgroundGradientType,
            StyleKey::BackgroundGradientAngle,
            StyleKey::HeaderAlignment,
        ] {
            dict.values.insert(key, key.default_value().to_value());
        }
        dict
    }

    /// Raw stored value, without default filling.
    pub fn get(&self, key: StyleKey) -> Option<&StyleValue> {
        self.values.get(&key)
    }

    /// Stored value or the key's documented default.
    pub fn value(&self, key: StyleKey) -> StyleValue {
        self.values
            .get(&key)
            .cloned()
            .unwrap_or_else(|| key.default_value().to_value())
    }

    pub fn is_set(&self, key: StyleKey) -> bool {
        self.values.contains_key(&key)
    }

    /// Replace exactly one key. Fails only when the value kind does not
    /// match the key. Returns the previous value.
    pub fn set(
        &mut self,
        key: StyleKey,
        value: impl Into<StyleValue>,
    ) -> Result<Option<StyleValue>, CoreError> {
        let value = value.into();
        if value.kind() != key.kind() {
            return Err(CoreError::StyleKind {
                key,
                expected: key.kind(),
                found: value.kind(),
            });
        }
        if matches!(value, StyleValue::Num(n) if !n.is_finite()) {
            return Err(CoreError::NonFinite { key });
        }
        Ok(self.values.insert(key, value))
    }

    pub fn remove(&mut self, key: StyleKey) -> Option<StyleValue> {
        self.values.remove(&key)
    }

    /// Shallow merge: every key present in `patch` overwrites ours.
    pub fn merge(&mut self, patch: &StyleDict) {
        for (key, value) in &patch.values {
            self.values.insert(*key, value.clone());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (StyleKey, &StyleValue)> {
        self.values.iter().map(|(k, v)| (*k, v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    // ─── Typed reads (defaults applied) ─────────────────────────────────

    pub fn num(&self, key: StyleKey) -> f64 {
        match self.values.get(&key) {
            Some(StyleValue::Num(n)) => *n,
            _ => match key.default_value() {
                StyleDefault::Num(n) => n,
                _ => 0.0,
            },
        }
    }

    pub fn text(&self, key: StyleKey) -> &str {
        match self.values.get(&key) {
            Some(StyleValue::Str(s)) => s,
            _ => match key.default_value() {
                StyleDefault::Str(s) => s,
                _ => "",
            },
        }
    }

    pub fn flag(&self, key: StyleKey) -> bool {
        match self.values.get(&key) {
            Some(StyleValue::Bool(b)) => *b,
            _ => matches!(key.default_value(), StyleDefault::Bool(true)),
        }
    }

    pub fn background_mode(&self) -> BackgroundMode {
        BackgroundMode::parse(self.text(StyleKey::BackgroundType))
    }

    pub fn gradient_kind(&self) -> GradientKind {
        match self.text(StyleKey::BackgroundGradientType) {
            "radial" => GradientKind::Radial,
            _ => GradientKind::Linear,
        }
    }

    pub fn logo_corner(&self) -> LogoCorner {
        LogoCorner::parse(self.text(StyleKey::LogoPosition))
    }

    /// `(start, end)` gradient stop percentages as stored.
    pub fn gradient_stops(&self) -> (f64, f64) {
        (
            self.num(StyleKey::BackgroundGradientStartStop),
            self.num(StyleKey::BackgroundGradientEndStop),
        )
    }

    pub fn alignment(&self, role: TextRole) -> Alignment {
        let header = Alignment::parse(self.text(StyleKey::HeaderAlignment));
        match role {
            TextRole::Header => header.unwrap_or(Alignment::Center),
            TextRole::Subtext => Alignment::parse(self.text(StyleKey::SubtextAlignment))
                .or(header)
                .unwrap_or(Alignment::Center),
        }
    }

    /// Whether a text block is shown: it needs text and must not be hidden.
    pub fn text_visible(&self, role: TextRole) -> bool {
        let keys = role.keys();
        !self.text(keys.text).is_empty() && self.flag(keys.visible)
    }

    /// Resolved view of a text block. Stroke needs both width and color;
    /// shadow exists once any of its metrics has been set.
    pub fn text_block(&self, role: TextRole) -> TextBlockStyle<'_> {
        let k = role.keys();

        let fill = if self.flag(k.use_gradient)
            && !self.text(k.gradient_start).is_empty()
            && !self.text(k.gradient_end).is_empty()
        {
            TextFill::Gradient {
                start: self.text(k.gradient_start),
                end: self.text(k.gradient_end),
            }
        } else {
            TextFill::Color(self.text(k.color))
        };

        let stroke_width = self.num(k.stroke_width);
        let stroke = (stroke_width > 0.0 && !self.text(k.stroke_color).is_empty()).then(|| {
            TextStroke {
                width: stroke_width,
                color: self.text(k.stroke_color),
            }
        });

        let shadow = (self.is_set(k.shadow_x) || self.is_set(k.shadow_y) || self.is_set(k.shadow_blur))
            .then(|| TextShadow {
                x: self.num(k.shadow_x),
                y: self.num(k.shadow_y),
                blur: self.num(k.shadow_blur),
                color: self.text(k.shadow_color),
            });

        TextBlockStyle {
            role,
            text: self.text(k.text),
            font_size: self.num(k.font_size),
            fill,
            font_family: self.text(k.font_family),
            line_height: self.num(k.line_height),
            alignment: self.alignment(role),
            stroke,
            shadow,
            texture: self
                .flag(k.texture)
                .then(|| self.num(k.texture_opacity).clamp(0.0, 1.0)),
            opacity: self.num(k.opacity).clamp(0.0, 1.0),
            offset: (self.num(k.offset_x), self.num(k.offset_y)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_names_roundtrip() {
        for key in StyleKey::ALL {
            assert_eq!(StyleKey::from_name(key.name()), Some(*key), "{key:?}");
        }
        assert_eq!(StyleKey::from_name("fontWeight"), None);
    }

    #[test]
    fn absent_keys_read_as_documented_defaults() {
        let dict = StyleDict::new();
        assert_eq!(dict.num(StyleKey::HeaderFontSize), 32.0);
        assert_eq!(dict.num(StyleKey::SubtextFontSize), 16.0);
        assert_eq!(dict.text(StyleKey::HeaderAlignment), "center");
        assert!(dict.flag(StyleKey::HeaderVisible));
        assert!(!dict.flag(StyleKey::CaptionVisible));
        assert_eq!(dict.value(StyleKey::LogoPosition), StyleValue::from("top-right"));
    }

    #[test]
    fn set_replaces_exactly_one_key() {
        let mut dict = StyleDict::frame_defaults();
        let before = dict.clone();
        dict.set(StyleKey::HeaderFontSize, 48.0).unwrap();
        assert_eq!(dict.num(StyleKey::HeaderFontSize), 48.0);
        for (key, value) in before.iter() {
            assert_eq!(dict.get(key), Some(value));
        }
        assert_eq!(dict.len(), before.len() + 1);
    }

    #[test]
    fn set_rejects_wrong_kind() {
        let mut dict = StyleDict::new();
        let err = dict.set(StyleKey::HeaderFontSize, "big").unwrap_err();
        assert!(matches!(err, CoreError::StyleKind { .. }));
        assert!(dict.set(StyleKey::HeaderVisible, 1.0).is_err());
        assert!(dict.set(StyleKey::HeaderFontSize, f64::NAN).is_err());
        assert!(dict.is_empty());
    }

    #[test]
    fn percentages_are_not_clamped_on_write() {
        let mut dict = StyleDict::new();
        dict.set(StyleKey::BackgroundGradientEndStop, 140.0).unwrap();
        assert_eq!(dict.gradient_stops(), (0.0, 140.0));
    }

    #[test]
    fn switching_background_mode_keeps_other_keys() {
        let mut dict = StyleDict::frame_defaults();
        dict.set(StyleKey::BackgroundImage, "https://cdn.example/bg.png").unwrap();
        dict.set(StyleKey::BackgroundType, "image").unwrap();
        dict.set(StyleKey::BackgroundType, "gradient").unwrap();
        dict.set(StyleKey::BackgroundType, "image").unwrap();
        assert_eq!(dict.background_mode(), BackgroundMode::Image);
        assert_eq!(dict.text(StyleKey::BackgroundImage), "https://cdn.example/bg.png");
        assert_eq!(dict.text(StyleKey::BackgroundGradientStart), "#3b82f6");
    }

    #[test]
    fn subtext_alignment_falls_back_to_header() {
        let mut dict = StyleDict::new();
        dict.set(StyleKey::HeaderAlignment, "right").unwrap();
        assert_eq!(dict.alignment(TextRole::Subtext), Alignment::Right);
        dict.set(StyleKey::SubtextAlignment, "left").unwrap();
        assert_eq!(dict.alignment(TextRole::Subtext), Alignment::Left);
    }

    #[test]
    fn text_block_effects_need_their_inputs() {
        let mut dict = StyleDict::new();
        dict.set(StyleKey::HeaderText, "Sale").unwrap();
        dict.set(StyleKey::HeaderStrokeWidth, 2.0).unwrap();
        let block = dict.text_block(TextRole::Header);
        assert_eq!(block.stroke, None, "stroke without color is ignored");
        assert_eq!(block.shadow, None);

        dict.set(StyleKey::HeaderStrokeColor, "#ff0000").unwrap();
        dict.set(StyleKey::HeaderTextShadowBlur, 4.0).unwrap();
        dict.set(StyleKey::HeaderUseGradient, true).unwrap();
        let block = dict.text_block(TextRole::Header);
        assert_eq!(block.stroke.unwrap().width, 2.0);
        let shadow = block.shadow.unwrap();
        assert_eq!((shadow.x, shadow.y, shadow.blur), (0.0, 0.0, 4.0));
        // Gradient fill needs both stops; falls back to the plain color.
        assert_eq!(block.fill, TextFill::Color("#000000"));
    }

    #[test]
    fn merge_is_shallow() {
        let mut dict = StyleDict::frame_defaults();
        let mut patch = StyleDict::new();
        patch.set(StyleKey::BackgroundColor, "#000000").unwrap();
        patch.set(StyleKey::CtaText, "Shop now").unwrap();
        dict.merge(&patch);
        assert_eq!(dict.text(StyleKey::BackgroundColor), "#000000");
        assert_eq!(dict.text(StyleKey::CtaText), "Shop now");
        assert_eq!(dict.text(StyleKey::BackgroundGradientEnd), "#8b5cf6");
    }
}
