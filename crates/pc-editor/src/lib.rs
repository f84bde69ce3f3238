pub mod canvas;
pub mod collab;
pub mod config;
pub mod drag;
pub mod error;
pub mod gradient;
pub mod input;
pub mod session;
pub mod shortcuts;
pub mod sidebar;
pub mod viewport;

pub use canvas::{CanvasEditor, EditorResponse, ExportTicket, ImageSlot, Notice, NoticeLevel};
pub use collab::{BrandContext, ImageService, PromptService, RawImage, UploadService};
pub use config::EditorConfig;
pub use error::{CollabError, EditorError, Result};
pub use input::{InputEvent, Modifiers, PointerButton};
pub use session::{InteractionKind, SessionSlot};
