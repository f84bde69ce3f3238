//! CSS color values as authored in the style dictionary.
//!
//! Style values hold colors as free-form strings (whatever the color input
//! produced). Anything that leaves the dictionary for rendering goes through
//! [`Color::parse_css`] so only normalized values reach the export document.

use serde::{Deserialize, Serialize};

/// RGBA color. Stored as 4 × f32 [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

/// Helper to parse a single hex digit.
pub fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Color {
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::rgba(
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            a as f32 / 255.0,
        )
    }

    /// Parse a hex color string: `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA`.
    /// The string may optionally start with `#`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let bytes = hex.as_bytes();

        match bytes.len() {
            3 | 4 => {
                let mut ch = [15u8; 4];
                for (slot, b) in ch.iter_mut().zip(bytes) {
                    *slot = hex_val(*b)?;
                }
                Some(Self::from_rgba8(ch[0] * 17, ch[1] * 17, ch[2] * 17, ch[3] * 17))
            }
            6 | 8 => {
                let mut ch = [255u8; 4];
                for (slot, pair) in ch.iter_mut().zip(bytes.chunks(2)) {
                    *slot = hex_val(pair[0])? << 4 | hex_val(pair[1])?;
                }
                Some(Self::from_rgba8(ch[0], ch[1], ch[2], ch[3]))
            }
            _ => None,
        }
    }

    /// Parse the subset of CSS color syntax the style inputs produce:
    /// hex, `rgb()`/`rgba()` and a handful of keywords.
    pub fn parse_css(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.starts_with('#') {
            return Self::from_hex(value);
        }

        let lower = value.to_ascii_lowercase();
        if let Some(args) = lower
            .strip_prefix("rgba(")
            .or_else(|| lower.strip_prefix("rgb("))
            .and_then(|rest| rest.strip_suffix(')'))
        {
            let parts: Vec<&str> = args
                .split([',', ' ', '/'])
                .filter(|p| !p.is_empty())
                .collect();
            if parts.len() != 3 && parts.len() != 4 {
                return None;
            }
            let channel = |s: &str| -> Option<u8> {
                let v: f32 = s.parse().ok()?;
                Some(v.clamp(0.0, 255.0).round() as u8)
            };
            let alpha = match parts.get(3) {
                Some(s) => s.parse::<f32>().ok()?.clamp(0.0, 1.0),
                None => 1.0,
            };
            let mut c = Self::from_rgba8(channel(parts[0])?, channel(parts[1])?, channel(parts[2])?, 255);
            c.a = alpha;
            return Some(c);
        }

        match lower.as_str() {
            "black" => Some(Self::BLACK),
            "white" => Some(Self::WHITE),
            "transparent" => Some(Self::TRANSPARENT),
            "red" => Some(Self::from_rgba8(255, 0, 0, 255)),
            "green" => Some(Self::from_rgba8(0, 128, 0, 255)),
            "blue" => Some(Self::from_rgba8(0, 0, 255, 255)),
            "gray" | "grey" => Some(Self::from_rgba8(128, 128, 128, 255)),
            _ => {
                // Bare hex as typed into a text field without the '#'.
                if lower.len() == 6 || lower.len() == 3 {
                    Self::from_hex(&lower)
                } else {
                    None
                }
            }
        }
    }

    /// Parse `value`, or fall back to `fallback` (which must itself be valid hex).
    pub fn parse_or(value: &str, fallback: &str) -> Self {
        Self::parse_css(value)
            .or_else(|| {
                if !value.is_empty() {
                    log::warn!("unparseable color {value:?}, using {fallback}");
                }
                Self::from_hex(fallback)
            })
            .unwrap_or(Self::BLACK)
    }

    pub fn to_rgba8(&self) -> [u8; 4] {
        [
            (self.r * 255.0).round() as u8,
            (self.g * 255.0).round() as u8,
            (self.b * 255.0).round() as u8,
            (self.a * 255.0).round() as u8,
        ]
    }

    /// Emit `#RRGGBB` (the alpha channel is emitted separately as an opacity).
    pub fn to_hex_rgb(&self) -> String {
        let [r, g, b, _] = self.to_rgba8();
        format!("#{r:02X}{g:02X}{b:02X}")
    }

    /// Emit as shortest valid hex string (`#RRGGBB` when opaque, else `#RRGGBBAA`).
    pub fn to_hex(&self) -> String {
        let [r, g, b, a] = self.to_rgba8();
        if a == 255 {
            format!("#{r:02X}{g:02X}{b:02X}")
        } else {
            format!("#{r:02X}{g:02X}{b:02X}{a:02X}")
        }
    }
}
