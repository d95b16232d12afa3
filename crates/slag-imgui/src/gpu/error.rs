use thiserror::Error;

/// Failure reported by the graphics API.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GpuError {
    /// Device or host memory exhausted while allocating a resource.
    #[error("out of memory allocating {what}")]
    OutOfMemory { what: &'static str },

    /// Zero-sized allocation request.
    #[error("cannot allocate an empty {what}")]
    ZeroSized { what: &'static str },

    /// Write or bind outside a buffer's allocated range.
    #[error("buffer access out of bounds: offset {offset} + {len} bytes exceeds size {size}")]
    OutOfBounds { offset: u64, len: u64, size: u64 },

    /// Pixel data does not match the texture description.
    #[error("texture data mismatch: expected {expected} bytes, got {actual}")]
    TextureDataMismatch { expected: usize, actual: usize },

    /// Presentation surface could not be created for the target.
    #[error("surface error: {0}")]
    Surface(String),

    /// Command recorded in the wrong command-buffer state.
    #[error("invalid command buffer state: {0}")]
    InvalidState(&'static str),
}

/// Result type alias for graphics API calls.
pub type GpuResult<T> = std::result::Result<T, GpuError>;
