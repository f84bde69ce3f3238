//! The shared interaction slot.
//!
//! At most one pointer interaction runs at a time. Starting one acquires the
//! slot and returns a [`SessionGuard`]; the slot frees itself when the guard
//! drops, however the interaction ends.

use crate::error::{EditorError, Result};
use std::cell::Cell;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionKind {
    Pan,
    FrameDrag,
    GradientHandle,
    AnglePicker,
    SidebarResize,
}

#[derive(Debug, Clone, Default)]
pub struct SessionSlot {
    active: Rc<Cell<Option<InteractionKind>>>,
}

impl SessionSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<InteractionKind> {
        self.active.get()
    }

    pub fn is_idle(&self) -> bool {
        self.active.get().is_none()
    }

    pub fn acquire(&self, kind: InteractionKind) -> Result<SessionGuard> {
        if let Some(active) = self.active.get() {
            return Err(EditorError::SessionBusy {
                active,
                requested: kind,
            });
        }
        self.active.set(Some(kind));
        log::debug!("{kind:?} session started");
        Ok(SessionGuard {
            slot: Rc::clone(&self.active),
            kind,
        })
    }
}

/// Proof that an interaction holds the slot.
#[derive(Debug)]
pub struct SessionGuard {
    slot: Rc<Cell<Option<InteractionKind>>>,
    kind: InteractionKind,
}

impl SessionGuard {
    pub fn kind(&self) -> InteractionKind {
        self.kind
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.slot.set(None);
        log::debug!("{:?} session ended", self.kind);
    }
}
