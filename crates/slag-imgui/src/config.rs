//! Backend configuration.

use crate::gpu::{ClearColor, PresentMode};

/// Tunables of the renderer backend.
///
/// Defaults match what secondary UI windows need: triple buffering, mailbox
/// presentation and an opaque black clear.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Frames in flight of every swapchain the backend creates.
    pub frames_in_flight: usize,

    /// Present mode of every swapchain the backend creates.
    pub present_mode: PresentMode,

    /// Clear color applied to secondary windows before UI geometry is drawn.
    pub clear_color: ClearColor,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            frames_in_flight: 3,
            present_mode: PresentMode::Mailbox,
            clear_color: ClearColor::black(),
        }
    }
}
