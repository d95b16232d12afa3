use bitflags::bitflags;

use super::TextureId;

bitflags! {
    /// Capabilities a backend advertises to the UI library.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct BackendFlags: u32 {
        const HAS_GAMEPAD = 1 << 0;
        const HAS_MOUSE_CURSORS = 1 << 1;
        const HAS_SET_MOUSE_POS = 1 << 2;
        /// The renderer honours `DrawCmd::vtx_offset`, allowing meshes over 64k vertices.
        const RENDERER_HAS_VTX_OFFSET = 1 << 3;
        const PLATFORM_HAS_VIEWPORTS = 1 << 10;
        /// The renderer implements the multi-viewport lifecycle hooks.
        const RENDERER_HAS_VIEWPORTS = 1 << 12;
    }
}

/// Font atlas as rasterized by the UI library.
#[derive(Debug, Clone, Default)]
pub struct FontAtlas {
    pub width: u32,
    pub height: u32,
    /// RGBA32 pixels, row-major, `width * height * 4` bytes.
    pub pixels: Vec<u8>,
    /// Texture id the UI library stamps into commands that sample the atlas.
    pub tex_id: TextureId,
}

impl FontAtlas {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self {
            width,
            height,
            pixels,
            tex_id: TextureId::NULL,
        }
    }

    /// Pixels and dimensions of the atlas as 4-channel 8-bit data.
    pub fn tex_data_as_rgba32(&self) -> (&[u8], u32, u32) {
        (&self.pixels, self.width, self.height)
    }
}

/// Backend-facing part of the UI library's IO block.
#[derive(Debug, Clone, Default)]
pub struct Io {
    /// Name of the registered renderer backend; `Some` while one is active.
    pub backend_renderer_name: Option<&'static str>,
    pub backend_flags: BackendFlags,
    pub fonts: FontAtlas,
}

impl Io {
    pub fn new(fonts: FontAtlas) -> Self {
        Self {
            fonts,
            ..Self::default()
        }
    }
}
