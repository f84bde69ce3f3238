//! Ephemeral per-frame presentation overrides.
//!
//! A drag writes the live position of the frame it moves here instead of
//! into the store. Everything that draws a frame (frame bodies, connection
//! curves) reads positions through [`PresentationOverrides::position_of`], so
//! the preview tracks the pointer while the store still holds the committed
//! value. The override is cleared in the same step that commits to the store.

use crate::frame::{Frame, Position};
use crate::id::FrameId;
use crate::store::FrameStore;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct PresentationOverrides {
    positions: HashMap<FrameId, Position>,
}

impl PresentationOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_position(&mut self, id: FrameId, position: Position) {
        self.positions.insert(id, position);
    }

    pub fn clear(&mut self, id: FrameId) -> Option<Position> {
        self.positions.remove(&id)
    }

    pub fn get(&self, id: FrameId) -> Option<Position> {
        self.positions.get(&id).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Displayed position: the override if one is live, else the stored one.
    pub fn position_of(&self, frame: &Frame) -> Position {
        self.get(frame.id).unwrap_or(frame.position)
    }

    /// Visual translate of a frame relative to its stored position.
    pub fn translate_of(&self, frame: &Frame) -> (f64, f64) {
        match self.get(frame.id) {
            Some(p) => (p.x - frame.position.x, p.y - frame.position.y),
            None => (0.0, 0.0),
        }
    }

    /// Displayed positions of every frame in store order.
    pub fn resolve(&self, store: &FrameStore) -> Vec<(FrameId, Position)> {
        store
            .frames()
            .iter()
            .map(|f| (f.id, self.position_of(f)))
            .collect()
    }
}
