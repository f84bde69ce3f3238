pub mod color;
pub mod connections;
pub mod error;
pub mod frame;
pub mod id;
pub mod persist;
pub mod presentation;
pub mod registry;
pub mod repository;
pub mod scale;
pub mod store;
pub mod style;

pub use color::Color;
pub use connections::ConnectionGraph;
pub use error::{CoreError, PersistError, Result};
pub use frame::{ChildIds, Connections, Frame, FrameContent, FramePatch, Position};
pub use id::FrameId;
pub use persist::{StoredFrame, decode_frames, encode_frames, is_inline_image};
pub use presentation::PresentationOverrides;
pub use registry::{FrameArchetype, FrameRegistry, Platform};
pub use repository::{
    JsonFileRepository, MemoryRepository, ProjectDraft, ProjectRepository, SavedProject,
};
pub use scale::{ExportScale, PREVIEW_SCALE};
pub use store::{FrameMutation, FrameStore};
pub use style::{StyleDict, StyleKey, StyleValue, TextRole};
