pub mod assets;
pub mod background;
pub mod connect;
pub mod error;
pub mod export;
pub mod plan;
pub mod raster;
pub mod svg;

pub use assets::{FsImageSource, ImageSource, MemoryImageSource};
pub use connect::{ConnectionPath, connection_paths, connections_svg};
pub use error::{ExportError, RenderError};
pub use export::{
    DirectorySink, ExportConfig, ExportOutput, ExportRenderer, ExportSink, MemorySink,
    OffscreenHost,
};
pub use plan::ExportPlan;
