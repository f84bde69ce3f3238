//! The frame store: single source of truth for every frame on the canvas.
//!
//! All mutations go through [`FrameStore::apply`] (or the thin helpers on top
//! of it) so the revision counter moves exactly once per successful change.
//! Hosts compare revisions to decide when to re-render.

use crate::error::{CoreError, Result};
use crate::frame::{Frame, FrameContent, FramePatch, Position};
use crate::id::FrameId;
use crate::registry::{FrameArchetype, FrameRegistry};
use crate::style::{StyleKey, StyleValue};
use std::collections::HashSet;

/// Caption seeded on companion frames.
pub const COMPANION_CAPTION: &str = "This is a longer caption for the Reddit post. \
Reddit posts typically have more detailed captions that provide context, explanations, \
or additional information about the content. This allows users to better understand \
the post and engage with the community through discussions and comments.";

const ADD_ORIGIN: f64 = 100.0;
const ADD_STEP: f64 = 50.0;
const COMPANION_GAP: f64 = 100.0;

/// A single change to the store.
#[derive(Debug, Clone)]
pub enum FrameMutation {
    SetStyle {
        id: FrameId,
        key: StyleKey,
        value: StyleValue,
    },
    Update {
        id: FrameId,
        patch: FramePatch,
    },
    Move {
        id: FrameId,
        to: Position,
    },
    Delete {
        id: FrameId,
    },
    Select(Option<FrameId>),
}

#[derive(Debug, Default)]
pub struct FrameStore {
    /// Frames in creation order (later frames draw on top).
    frames: Vec<Frame>,
    selected: Option<FrameId>,
    revision: u64,
}

impl FrameStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from loaded frames. Duplicate ids keep their first
    /// occurrence; references to frames that do not exist are dropped.
    pub fn from_frames(frames: impl IntoIterator<Item = Frame>) -> Self {
        let mut seen = HashSet::new();
        let mut kept = Vec::new();
        for frame in frames {
            if seen.insert(frame.id) {
                kept.push(frame);
            } else {
                log::warn!("dropping duplicate frame {}", frame.id);
            }
        }

        for frame in &mut kept {
            let conns = &mut frame.connections;
            if let Some(parent) = conns.parent_id {
                if !seen.contains(&parent) || parent == frame.id {
                    log::warn!("frame {} references missing parent {parent}", frame.id);
                    conns.parent_id = None;
                }
            }
            let before = conns.child_ids.len();
            let own = frame.id;
            conns.child_ids.retain(|c| seen.contains(c) && *c != own);
            if conns.child_ids.len() != before {
                log::warn!("frame {own} listed {} missing children", before - conns.child_ids.len());
            }
        }

        Self {
            frames: kept,
            selected: None,
            revision: 0,
        }
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn get(&self, id: FrameId) -> Option<&Frame> {
        self.frames.iter().find(|f| f.id == id)
    }

    pub fn contains(&self, id: FrameId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn selected(&self) -> Option<FrameId> {
        self.selected
    }

    pub fn selected_frame(&self) -> Option<&Frame> {
        self.selected.and_then(|id| self.get(id))
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn get_mut(&mut self, id: FrameId) -> Result<&mut Frame> {
        self.frames
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or(CoreError::UnknownFrame(id))
    }

    fn bump(&mut self) {
        self.revision += 1;
    }

    /// An id not used by any frame in the store.
    pub fn fresh_id(&self) -> FrameId {
        loop {
            let id = FrameId::generate();
            if !self.contains(id) {
                return id;
            }
        }
    }

    fn count_of(&self, archetype: &FrameArchetype) -> usize {
        self.frames
            .iter()
            .filter(|f| f.archetype.id == archetype.id)
            .count()
    }

    fn archetype(id: &str) -> Result<FrameArchetype> {
        FrameRegistry::builtin()
            .get(id)
            .ok_or_else(|| CoreError::UnknownArchetype(id.to_string()))
    }

    // ─── Creation ────────────────────────────────────────────────────────

    /// Add a frame of `archetype_id` with default styles, staggered from the
    /// origin by the number of existing frames. The new frame is selected.
    pub fn add(&mut self, archetype_id: &str) -> Result<FrameId> {
        let archetype = Self::archetype(archetype_id)?;
        let n = self.frames.len() as f64;
        let name = format!("{}-{}", archetype.name_prefix(), self.count_of(&archetype) + 1);

        let mut frame = Frame::new(self.fresh_id(), archetype, name);
        frame.position = Position::new(ADD_ORIGIN + n * ADD_STEP, ADD_ORIGIN + n * ADD_STEP);
        let id = frame.id;

        log::debug!("add frame {id} ({}) at {:?}", archetype.id, frame.position);
        self.frames.push(frame);
        self.selected = Some(id);
        self.bump();
        Ok(id)
    }

    /// Add a frame derived from `source`, placed to its right and linked as
    /// its child. The new frame shows a caption and is selected.
    pub fn add_companion(&mut self, source: FrameId, archetype_id: &str) -> Result<FrameId> {
        let archetype = Self::archetype(archetype_id)?;
        let src = self.get(source).ok_or(CoreError::UnknownFrame(source))?;
        let (src_width, _) = src.preview_size();
        let position = Position::new(src.position.x + src_width + COMPANION_GAP, src.position.y);

        let name = if archetype.id == "reddit-post" {
            format!("reddit-post-{}", self.count_of(&archetype) + 1)
        } else {
            format!("{}-{}", archetype.id, self.count_of(&archetype) + 1)
        };

        let mut frame = Frame::new(self.fresh_id(), archetype, name);
        frame.position = position;
        frame.styles.set(StyleKey::CaptionVisible, true)?;
        frame.styles.set(StyleKey::CaptionText, COMPANION_CAPTION)?;
        frame.connections.parent_id = Some(source);
        let id = frame.id;

        self.get_mut(source)?.connections.child_ids.push(id);
        log::debug!("add companion {id} ({}) of {source}", archetype.id);
        self.frames.push(frame);
        self.selected = Some(id);
        self.bump();
        Ok(id)
    }

    // ─── Mutation ────────────────────────────────────────────────────────

    /// Apply one mutation. On error the store is unchanged.
    pub fn apply(&mut self, mutation: FrameMutation) -> Result<()> {
        match mutation {
            FrameMutation::SetStyle { id, key, value } => {
                self.get_mut(id)?.styles.set(key, value)?;
            }
            FrameMutation::Update { id, patch } => {
                let frame = self.get_mut(id)?;
                let FramePatch {
                    name,
                    position,
                    content,
                    styles,
                } = patch;
                frame.styles.merge(&styles);
                if let Some(name) = name {
                    frame.name = name;
                }
                if let Some(position) = position {
                    frame.position = position;
                }
                if let Some(content) = content {
                    frame.content = content;
                }
            }
            FrameMutation::Move { id, to } => {
                self.get_mut(id)?.position = to.clamped();
            }
            FrameMutation::Delete { id } => {
                self.remove(id)?;
            }
            FrameMutation::Select(id) => {
                if let Some(id) = id {
                    if !self.contains(id) {
                        return Err(CoreError::UnknownFrame(id));
                    }
                }
                if self.selected == id {
                    return Ok(());
                }
                self.selected = id;
            }
        }
        self.bump();
        Ok(())
    }

    pub fn set_style(&mut self, id: FrameId, key: StyleKey, value: impl Into<StyleValue>) -> Result<()> {
        self.apply(FrameMutation::SetStyle {
            id,
            key,
            value: value.into(),
        })
    }

    pub fn update(&mut self, id: FrameId, patch: FramePatch) -> Result<()> {
        self.apply(FrameMutation::Update { id, patch })
    }

    pub fn set_content(&mut self, id: FrameId, content: FrameContent) -> Result<()> {
        self.update(
            id,
            FramePatch {
                content: Some(content),
                ..FramePatch::default()
            },
        )
    }

    /// Commit a position (clamped to x, y ≥ 0).
    pub fn move_frame(&mut self, id: FrameId, to: Position) -> Result<()> {
        self.apply(FrameMutation::Move { id, to })
    }

    pub fn delete(&mut self, id: FrameId) -> Result<()> {
        self.apply(FrameMutation::Delete { id })
    }

    pub fn select(&mut self, id: Option<FrameId>) -> Result<()> {
        self.apply(FrameMutation::Select(id))
    }

    /// Drop every frame (new project).
    pub fn clear(&mut self) {
        self.frames.clear();
        self.selected = None;
        self.bump();
    }

    /// Replace the whole frame set (project load).
    pub fn replace(&mut self, other: FrameStore) {
        self.frames = other.frames;
        self.selected = None;
        self.bump();
    }

    /// Remove a frame, prune it from its parent's children and orphan its
    /// own children. Children are never deleted along with it.
    fn remove(&mut self, id: FrameId) -> Result<Frame> {
        let index = self
            .frames
            .iter()
            .position(|f| f.id == id)
            .ok_or(CoreError::UnknownFrame(id))?;
        let removed = self.frames.remove(index);

        for frame in &mut self.frames {
            frame.connections.child_ids.retain(|c| *c != id);
            if frame.connections.parent_id == Some(id) {
                frame.connections.parent_id = None;
            }
        }
        if self.selected == Some(id) {
            self.selected = None;
        }
        log::debug!("deleted frame {id}");
        Ok(removed)
    }
}
