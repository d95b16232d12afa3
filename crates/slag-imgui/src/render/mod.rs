//! Draw-data translation.
//!
//! Turns one frame of UI draw data into buffer uploads and recorded draw
//! commands on a command buffer. Nothing here begins, ends or submits command
//! buffers; that is the caller's job.

mod buffers;
mod clip;
mod state;
mod textures;
mod translate;

pub use buffers::{FrameSlots, SlotBuffers, MIN_BUFFER_BYTES};
pub use clip::project_clip_rect;
pub use state::RenderState;
pub use textures::TextureRegistry;
pub use translate::{DrawDataTranslator, ProjectionConstants, TranslateStats};

use crate::gpu::{Api, Extent2d};

/// Where a translation is recorded (command buffer + active frame slot).
pub struct RenderTarget<'a, A: Api> {
    pub command_buffer: &'a mut A::CommandBuffer,
    /// Frame-in-flight index of the frame being recorded.
    pub frame_index: usize,
    /// Framebuffer size in physical pixels.
    pub extent: Extent2d,
}

impl<'a, A: Api> RenderTarget<'a, A> {
    #[inline]
    pub fn new(command_buffer: &'a mut A::CommandBuffer, frame_index: usize, extent: Extent2d) -> Self {
        Self {
            command_buffer,
            frame_index,
            extent,
        }
    }
}
