use crate::coords::Vec2;
use crate::platform::NativeHandle;

use super::DrawData;

/// Identity of a UI viewport (one OS window).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ViewportId(pub u32);

impl ViewportId {
    /// Id the UI library gives its main viewport.
    pub const MAIN: ViewportId = ViewportId(0x1111_1111);
}

/// Viewport object handed to the renderer lifecycle hooks.
#[derive(Debug, Clone)]
pub struct PlatformViewport {
    pub id: ViewportId,
    pub native_handle: NativeHandle,
    pub pos: Vec2,
    pub size: Vec2,
    /// Draw data produced for this viewport in the current frame.
    pub draw_data: DrawData,
}

impl PlatformViewport {
    pub fn new(id: ViewportId, native_handle: NativeHandle, pos: Vec2, size: Vec2) -> Self {
        Self {
            id,
            native_handle,
            pos,
            size,
            draw_data: DrawData::new(id, pos, size),
        }
    }

    /// Window size in whole pixels, negative sizes clamped to zero.
    pub fn pixel_size(&self) -> (u32, u32) {
        Self::size_in_pixels(self.size)
    }

    /// Swapchain dimensions for a window of `size` UI units; negative sizes
    /// clamp to zero.
    pub fn size_in_pixels(size: Vec2) -> (u32, u32) {
        (size.x.max(0.0) as u32, size.y.max(0.0) as u32)
    }
}
