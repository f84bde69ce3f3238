use crate::id::FrameId;
use crate::style::{StyleKey, ValueKind};

/// Errors raised by store and style mutations.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("style key `{key}` expects a {expected}, got a {found}")]
    StyleKind {
        key: StyleKey,
        expected: ValueKind,
        found: ValueKind,
    },

    #[error("style key `{key}` must be a finite number")]
    NonFinite { key: StyleKey },

    #[error("unknown frame {0}")]
    UnknownFrame(FrameId),

    #[error("unknown frame archetype `{0}`")]
    UnknownArchetype(String),
}

/// Errors raised while encoding, decoding or storing projects.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("malformed frames payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("repository I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("project `{0}` not found")]
    ProjectNotFound(String),

    #[error("project title must not be empty")]
    EmptyTitle,
}

pub type Result<T, E = CoreError> = std::result::Result<T, E>;
