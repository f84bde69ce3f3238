use crate::session::InteractionKind;
use pc_core::{CoreError, PersistError};
use pc_render::ExportError;

/// Failures reported by an external collaborator (prompt, image or upload
/// service). The editor state is left untouched when one of these occurs.
#[derive(Debug, thiserror::Error)]
pub enum CollabError {
    #[error("{service} is unavailable: {reason}")]
    Unavailable {
        service: &'static str,
        reason: String,
    },

    #[error("{service} failed: {reason}")]
    Failed {
        service: &'static str,
        reason: String,
    },

    #[error("{service} returned no result")]
    Empty { service: &'static str },
}

#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("enter an idea before generating a prompt")]
    EmptyPrompt,

    #[error("generate a prompt first before generating an image")]
    MissingImagePrompt,

    #[error("please select an image file (got `{0}`)")]
    NotAnImage(String),

    #[error("`{0}` is not a valid link")]
    InvalidLink(String),

    #[error("no frame is selected")]
    NoSelection,

    #[error("add at least one frame before saving")]
    NothingToSave,

    #[error("cannot start {requested:?} while {active:?} is in progress")]
    SessionBusy {
        active: InteractionKind,
        requested: InteractionKind,
    },

    #[error("an export is already running")]
    ExportInProgress,

    #[error(transparent)]
    Collab(#[from] CollabError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Persist(#[from] PersistError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

impl EditorError {
    /// Rejected before anything was mutated or any collaborator was called.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            EditorError::EmptyPrompt
                | EditorError::MissingImagePrompt
                | EditorError::NotAnImage(_)
                | EditorError::InvalidLink(_)
                | EditorError::NoSelection
                | EditorError::NothingToSave
        )
    }
}

pub type Result<T, E = EditorError> = std::result::Result<T, E>;
