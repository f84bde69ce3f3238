//! Frame persistence: the stored frame shape and its conversions.
//!
//! Frames are stored as a JSON array inside a single string field
//! (`framesJson`). Saving drops anything that must not reach storage:
//! inline `data:image…` payloads and non-primitive style values. Loading is
//! tolerant: an unknown archetype degrades to the default one, unknown style
//! keys are skipped and numeric keys stored as numeric strings are coerced.

use crate::error::PersistError;
use crate::frame::{Connections, Frame, FrameContent, Position};
use crate::id::FrameId;
use crate::registry::FrameRegistry;
use crate::style::{StyleDict, StyleKey, StyleValue, ValueKind};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Inline image payloads are never persisted.
pub fn is_inline_image(value: &str) -> bool {
    value.starts_with("data:image")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct StoredContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StoredConnections {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child_ids: Option<Vec<String>>,
}

/// One frame as it appears in `framesJson`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredFrame {
    pub id: String,
    pub type_id: String,
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<StoredContent>,
    #[serde(default)]
    pub styles: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connections: Option<StoredConnections>,
}

impl StoredFrame {
    pub fn from_frame(frame: &Frame) -> Self {
        let content = StoredContent {
            image: frame
                .content
                .image
                .clone()
                .filter(|image| !is_inline_image(image)),
            text: frame.content.text.clone(),
        };

        let styles = frame
            .styles
            .iter()
            .filter_map(|(key, value)| {
                let json = match value {
                    StyleValue::Str(s) if key.holds_image() && is_inline_image(s) => return None,
                    StyleValue::Str(s) => Value::String(s.clone()),
                    StyleValue::Num(n) => Value::from(*n),
                    StyleValue::Bool(b) => Value::Bool(*b),
                };
                Some((key.name().to_string(), json))
            })
            .collect();

        let connections = (!frame.connections.is_empty()).then(|| StoredConnections {
            parent_id: frame.connections.parent_id.map(|p| p.to_string()),
            child_ids: Some(
                frame
                    .connections
                    .child_ids
                    .iter()
                    .map(|c| c.to_string())
                    .collect(),
            ),
        });

        Self {
            id: frame.id.to_string(),
            type_id: frame.archetype.id.to_string(),
            x: frame.position.x,
            y: frame.position.y,
            name: Some(frame.name.clone()),
            content: Some(content),
            styles,
            connections,
        }
    }

    pub fn into_frame(self) -> Frame {
        let archetype = FrameRegistry::builtin().resolve_or_default(&self.type_id);
        let id = FrameId::intern(&self.id);

        let mut styles = StyleDict::new();
        for (name, value) in &self.styles {
            let Some(key) = StyleKey::from_name(name) else {
                log::debug!("frame {id}: skipping unknown style key {name:?}");
                continue;
            };
            match coerce(key, value) {
                Some(v) => {
                    // coerce() only yields values of the key's kind.
                    let _ = styles.set(key, v);
                }
                None => log::warn!("frame {id}: dropping {name} = {value}"),
            }
        }

        let content = self.content.unwrap_or_default();
        let connections = self.connections.unwrap_or_default();
        Frame {
            id,
            archetype,
            position: Position::new(self.x, self.y),
            name: self.name.unwrap_or_default(),
            content: FrameContent {
                image: content.image,
                text: content.text,
            },
            styles,
            connections: Connections {
                parent_id: connections.parent_id.as_deref().map(FrameId::intern),
                child_ids: connections
                    .child_ids
                    .unwrap_or_default()
                    .iter()
                    .map(|c| FrameId::intern(c))
                    .collect(),
            },
        }
    }
}

/// Map a stored JSON value onto a key's kind, if it can be.
fn coerce(key: StyleKey, value: &Value) -> Option<StyleValue> {
    match (key.kind(), value) {
        (ValueKind::Str, Value::String(s)) => Some(StyleValue::Str(s.clone())),
        (ValueKind::Num, Value::Number(n)) => n.as_f64().map(StyleValue::Num),
        (ValueKind::Num, Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(StyleValue::Num),
        (ValueKind::Bool, Value::Bool(b)) => Some(StyleValue::Bool(*b)),
        _ => None,
    }
}

/// Encode frames into the `framesJson` payload.
pub fn encode_frames(frames: &[Frame]) -> Result<String, PersistError> {
    let stored: Vec<StoredFrame> = frames.iter().map(StoredFrame::from_frame).collect();
    Ok(serde_json::to_string(&stored)?)
}

/// Decode a `framesJson` payload.
pub fn decode_frames(json: &str) -> Result<Vec<Frame>, PersistError> {
    let stored: Vec<StoredFrame> = serde_json::from_str(json)?;
    Ok(stored.into_iter().map(StoredFrame::into_frame).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::FrameStore;

    #[test]
    fn save_strips_inline_images() {
        let mut store = FrameStore::new();
        let id = store.add("instagram-post").unwrap();
        store
            .set_style(id, StyleKey::BackgroundImage, "data:image/png;base64,AAAA")
            .unwrap();
        store
            .set_style(id, StyleKey::LogoImage, "https://cdn.example/logo.png")
            .unwrap();
        store
            .set_content(
                id,
                FrameContent {
                    image: Some("data:image/jpeg;base64,BBBB".into()),
                    text: Some("hello".into()),
                },
            )
            .unwrap();

        let stored = StoredFrame::from_frame(store.get(id).unwrap());
        assert!(!stored.styles.contains_key("backgroundImage"));
        assert_eq!(
            stored.styles.get("logoImage"),
            Some(&Value::String("https://cdn.example/logo.png".into()))
        );
        let content = stored.content.unwrap();
        assert_eq!(content.image, None);
        assert_eq!(content.text.as_deref(), Some("hello"));
    }

    #[test]
    fn load_coerces_and_skips() {
        let json = r##"[{
            "id": "frame-a",
            "typeId": "instagram-post",
            "x": 10, "y": 20,
            "styles": {
                "headerFontSize": "40",
                "headerText": "Sale",
                "fontWeight": "bold",
                "headerVisible": "yes"
            }
        }]"##;
        let frames = decode_frames(json).unwrap();
        let styles = &frames[0].styles;
        assert_eq!(styles.get(StyleKey::HeaderFontSize), Some(&StyleValue::Num(40.0)));
        assert_eq!(styles.text(StyleKey::HeaderText), "Sale");
        assert!(!styles.is_set(StyleKey::HeaderVisible));
        assert_eq!(styles.len(), 2);
    }

    #[test]
    fn unknown_archetype_degrades() {
        let json = r#"[{"id":"f","typeId":"tiktok-video","x":0,"y":0}]"#;
        let frames = decode_frames(json).unwrap();
        assert_eq!(frames[0].archetype.id, "instagram-story");
    }

    #[test]
    fn malformed_payload_is_an_error() {
        assert!(matches!(decode_frames("{oops"), Err(PersistError::Json(_))));
    }
}
