//! Backend error types.

use thiserror::Error;

use crate::gpu::GpuError;
use crate::ui::ViewportId;

/// Failure of a backend operation.
#[derive(Error, Debug)]
pub enum BackendError {
    /// The UI context already has a renderer backend registered.
    #[error("a renderer backend is already initialized ({0})")]
    AlreadyInitialized(&'static str),

    /// The graphics API failed to create or update a resource.
    #[error("GPU error: {0}")]
    Gpu(#[from] GpuError),

    /// Font atlas pixels do not describe a `width x height` RGBA32 image.
    #[error("font atlas is {width}x{height} but holds {len} bytes")]
    InvalidFontAtlas { width: u32, height: u32, len: usize },

    /// The shader pipeline lacks the descriptor group the font bundle is made from.
    #[error("shader pipeline has no descriptor group {0}")]
    MissingDescriptorGroup(u32),

    /// No renderer resources are registered for the viewport.
    #[error("unknown viewport {0:?}")]
    UnknownViewport(ViewportId),

    /// The UI platform layer reported a null or malformed native window handle.
    #[error("invalid native window handle {0:#x}")]
    InvalidNativeHandle(usize),

    /// The main window's platform kind has no secondary-window mapping.
    #[error("unsupported platform: {0}")]
    UnsupportedPlatform(&'static str),
}

/// Result type alias for backend operations.
pub type Result<T> = std::result::Result<T, BackendError>;
