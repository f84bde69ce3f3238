//! Frame drag engine.
//!
//! While a drag runs, the live position goes to [`PresentationOverrides`]
//! and the store is left alone. Pointer moves are only queued; the queued
//! pointer is applied once per animation-frame tick. Pointer-up applies what
//! is still queued, clears the override and commits to the store, once.

use crate::error::Result;
use crate::session::SessionGuard;
use kurbo::{Point, Vec2};
use pc_core::{Frame, FrameId, FrameStore, Position, PresentationOverrides};

/// How a drag ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragOutcome {
    pub frame: FrameId,
    pub from: Position,
    pub to: Position,
    /// `false` when the live position never changed; the pointer-up is then
    /// a plain click.
    pub moved: bool,
}

#[derive(Debug)]
pub struct DragSession {
    _guard: SessionGuard,
    frame: FrameId,
    offset: Vec2,
    origin: Position,
    live: Position,
    pending: Option<Point>,
    moved: bool,
}

impl DragSession {
    /// Start dragging `frame`. `pointer` is in drag space
    /// ([`crate::viewport::Viewport::drag_point`]).
    pub fn begin(guard: SessionGuard, frame: &Frame, pointer: Point) -> Self {
        let offset = pointer - Point::new(frame.position.x, frame.position.y);
        log::debug!("drag {} from ({}, {})", frame.id, frame.position.x, frame.position.y);
        Self {
            _guard: guard,
            frame: frame.id,
            offset,
            origin: frame.position,
            live: frame.position,
            pending: None,
            moved: false,
        }
    }

    pub fn frame_id(&self) -> FrameId {
        self.frame
    }

    pub fn origin(&self) -> Position {
        self.origin
    }

    pub fn live(&self) -> Position {
        self.live
    }

    pub fn moved(&self) -> bool {
        self.moved
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Queue the latest pointer, replacing any earlier one.
    pub fn queue(&mut self, pointer: Point) {
        self.pending = Some(pointer);
    }

    /// Apply the queued pointer, if any. Returns the new live position.
    pub fn flush(&mut self, overrides: &mut PresentationOverrides) -> Option<Position> {
        let pointer = self.pending.take()?;
        let candidate = pointer - self.offset;
        let live = Position::new(candidate.x, candidate.y).clamped();
        if live != self.live {
            self.moved = true;
        }
        self.live = live;
        overrides.set_position(self.frame, live);
        log::trace!("drag {} live at ({}, {})", self.frame, live.x, live.y);
        Some(live)
    }

    /// End the drag. The override is cleared and, if the frame moved, its
    /// position is committed to the store in one mutation.
    pub fn finish(
        mut self,
        store: &mut FrameStore,
        overrides: &mut PresentationOverrides,
    ) -> Result<DragOutcome> {
        self.flush(overrides);
        overrides.clear(self.frame);
        let outcome = DragOutcome {
            frame: self.frame,
            from: self.origin,
            to: self.live,
            moved: self.moved,
        };
        if self.moved {
            store.move_frame(self.frame, self.live)?;
            log::debug!(
                "drag {} committed at ({}, {})",
                self.frame,
                self.live.x,
                self.live.y
            );
        }
        Ok(outcome)
    }

    /// Abandon the drag without touching the store.
    pub fn cancel(self, overrides: &mut PresentationOverrides) {
        overrides.clear(self.frame);
        log::debug!("drag {} cancelled", self.frame);
    }
}
