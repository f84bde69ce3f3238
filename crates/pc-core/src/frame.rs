use crate::id::FrameId;
use crate::registry::FrameArchetype;
use crate::scale::PREVIEW_SCALE;
use crate::style::{StyleDict, StyleKey};
use smallvec::SmallVec;

/// Canvas-space position of a frame's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Clamp both coordinates to the non-negative quadrant.
    pub fn clamped(self) -> Self {
        Self {
            x: self.x.max(0.0),
            y: self.y.max(0.0),
        }
    }
}

/// Free-form frame content.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FrameContent {
    pub image: Option<String>,
    pub text: Option<String>,
}

pub type ChildIds = SmallVec<[FrameId; 4]>;

/// Derivation links of a frame.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Connections {
    pub parent_id: Option<FrameId>,
    pub child_ids: ChildIds,
}

impl Connections {
    pub fn is_empty(&self) -> bool {
        self.parent_id.is_none() && self.child_ids.is_empty()
    }
}

/// A platform-shaped design surface on the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub id: FrameId,
    pub archetype: FrameArchetype,
    pub position: Position,
    pub name: String,
    pub content: FrameContent,
    pub styles: StyleDict,
    pub connections: Connections,
}

impl Frame {
    pub fn new(id: FrameId, archetype: FrameArchetype, name: impl Into<String>) -> Self {
        Self {
            id,
            archetype,
            position: Position::default(),
            name: name.into(),
            content: FrameContent::default(),
            styles: StyleDict::frame_defaults(),
            connections: Connections::default(),
        }
    }

    /// Size of the frame body as drawn on the canvas.
    pub fn preview_size(&self) -> (f64, f64) {
        (
            f64::from(self.archetype.width) * PREVIEW_SCALE,
            f64::from(self.archetype.height) * PREVIEW_SCALE,
        )
    }

    pub fn caption_visible(&self) -> bool {
        self.styles.flag(StyleKey::CaptionVisible)
    }

    /// File name of an exported raster of this frame.
    pub fn export_file_name(&self) -> String {
        let stem = if self.name.is_empty() {
            self.archetype.name
        } else {
            self.name.as_str()
        };
        format!("{stem}-{}.png", self.id)
    }
}

/// Partial update of a frame. Styles are merged shallowly; every other field
/// replaces the current value when present.
#[derive(Debug, Clone, Default)]
pub struct FramePatch {
    pub name: Option<String>,
    pub position: Option<Position>,
    pub content: Option<FrameContent>,
    pub styles: StyleDict,
}

impl FramePatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.position.is_none()
            && self.content.is_none()
            && self.styles.is_empty()
    }
}
