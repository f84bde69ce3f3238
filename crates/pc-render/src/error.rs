use pc_core::FrameId;

/// Low-level failures of the export pipeline.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("image `{reference}` is unavailable: {reason}")]
    Asset { reference: String, reason: String },

    #[error("cannot decode image `{reference}`: {source}")]
    Decode {
        reference: String,
        #[source]
        source: image::ImageError,
    },

    #[error("invalid export document: {0}")]
    Svg(#[from] usvg::Error),

    #[error("cannot allocate a {0}×{1} surface")]
    Surface(u32, u32),

    #[error("an export surface is already attached for frame {0}")]
    Busy(FrameId),

    #[error("PNG encoding failed: {0}")]
    Encode(String),

    #[error("cannot write export: {0}")]
    Io(#[from] std::io::Error),
}

/// The single user-facing failure of an export.
#[derive(Debug, thiserror::Error)]
#[error("Failed to export {file_name}: {source}")]
pub struct ExportError {
    pub file_name: String,
    #[source]
    pub source: RenderError,
}

impl ExportError {
    /// Message shown to the user, once.
    pub fn message(&self) -> String {
        self.to_string()
    }
}

pub type Result<T, E = RenderError> = std::result::Result<T, E>;
