use std::fmt;
use std::mem::offset_of;
use std::rc::Rc;

use bytemuck::{Pod, Zeroable};

use crate::coords::{Rect, Vec2};
use crate::gpu::{VertexAttribute, VertexFormat};
use crate::render::RenderState;

use super::ViewportId;

/// Index element type of draw lists.
pub type DrawIdx = u16;

/// Opaque texture-binding handle carried by draw commands.
///
/// The backend resolves it to a descriptor bundle when drawing. Who owns the
/// bundle depends on who registered it: the backend for [`TextureId::FONT`], the
/// host application for everything else.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u64);

impl TextureId {
    pub const NULL: TextureId = TextureId(0);
    /// Reserved for the font atlas bundle owned by the backend.
    pub const FONT: TextureId = TextureId(1);
}

/// One UI vertex as laid out in the vertex buffer.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct DrawVert {
    pub pos: [f32; 2],
    pub uv: [f32; 2],
    /// Packed RGBA8, red in the low byte.
    pub col: u32,
}

impl DrawVert {
    pub const STRIDE: u64 = std::mem::size_of::<DrawVert>() as u64;

    /// Vertex layout for building the UI pipeline (binding 0).
    pub const ATTRIBUTES: [VertexAttribute; 3] = [
        VertexAttribute { format: VertexFormat::Float32x2, offset: offset_of!(DrawVert, pos) as u32, location: 0 },
        VertexAttribute { format: VertexFormat::Float32x2, offset: offset_of!(DrawVert, uv) as u32, location: 1 },
        VertexAttribute { format: VertexFormat::Uint32, offset: offset_of!(DrawVert, col) as u32, location: 2 },
    ];

    #[inline]
    pub const fn new(pos: [f32; 2], uv: [f32; 2], col: u32) -> Self {
        Self { pos, uv, col }
    }
}

/// Callback slot of a draw command.
#[derive(Clone)]
pub enum DrawCallback {
    /// Sentinel asking the renderer to re-establish its default render state.
    ResetRenderState,
    /// Host code run in place of a draw, in command order. It may record its own
    /// GPU work through the [`RenderState`].
    User(Rc<dyn Fn(&DrawList, &DrawCmd, &mut RenderState<'_>)>),
}

impl fmt::Debug for DrawCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrawCallback::ResetRenderState => f.write_str("ResetRenderState"),
            DrawCallback::User(_) => f.write_str("User(..)"),
        }
    }
}

/// One draw call (or callback) within a draw list.
#[derive(Debug, Clone)]
pub struct DrawCmd {
    /// Clip rectangle in UI units, `(x1, y1, x2, y2)`.
    pub clip_rect: Rect,
    pub texture_id: TextureId,
    /// First vertex of this command, relative to the start of its draw list.
    pub vtx_offset: u32,
    /// First index of this command, relative to the start of its draw list.
    pub idx_offset: u32,
    pub elem_count: u32,
    pub callback: Option<DrawCallback>,
}

impl DrawCmd {
    pub fn new(clip_rect: Rect, texture_id: TextureId, idx_offset: u32, elem_count: u32) -> Self {
        Self {
            clip_rect,
            texture_id,
            vtx_offset: 0,
            idx_offset,
            elem_count,
            callback: None,
        }
    }

    pub fn callback(callback: DrawCallback) -> Self {
        Self {
            clip_rect: Rect::default(),
            texture_id: TextureId::NULL,
            vtx_offset: 0,
            idx_offset: 0,
            elem_count: 0,
            callback: Some(callback),
        }
    }
}

/// Geometry and commands produced by one UI layer.
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    pub vtx_buffer: Vec<DrawVert>,
    pub idx_buffer: Vec<DrawIdx>,
    pub cmd_buffer: Vec<DrawCmd>,
    /// Vertex that new indices are relative to; moves forward whenever the
    /// next quad would not be addressable with a `DrawIdx`.
    vtx_base: u32,
}

impl DrawList {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an axis-aligned textured quad.
    ///
    /// Extends the last command when clip rect and texture match, otherwise opens
    /// a new command. Past 64k vertices a new command is opened with a
    /// `vtx_offset` so its indices stay in range.
    pub fn add_rect(&mut self, rect: Rect, uv: Rect, col: u32, clip_rect: Rect, texture_id: TextureId) {
        self.reserve_vertices(4);
        let base = (self.vtx_buffer.len() as u32 - self.vtx_base) as DrawIdx;
        self.vtx_buffer.extend_from_slice(&[
            DrawVert::new([rect.min.x, rect.min.y], [uv.min.x, uv.min.y], col),
            DrawVert::new([rect.max.x, rect.min.y], [uv.max.x, uv.min.y], col),
            DrawVert::new([rect.max.x, rect.max.y], [uv.max.x, uv.max.y], col),
            DrawVert::new([rect.min.x, rect.max.y], [uv.min.x, uv.max.y], col),
        ]);
        self.push_indices(&[base, base + 1, base + 2, base, base + 2, base + 3], clip_rect, texture_id);
    }

    /// Vertex the indices passed to [`push_indices`](Self::push_indices) are
    /// relative to.
    #[inline]
    pub fn vtx_base(&self) -> u32 {
        self.vtx_base
    }

    /// Moves the vertex base to the end of the vertex buffer if `count` more
    /// vertices would overflow `DrawIdx` relative to the current one.
    pub fn reserve_vertices(&mut self, count: u32) {
        let len = self.vtx_buffer.len() as u32;
        if len - self.vtx_base + count > DrawIdx::MAX as u32 + 1 {
            self.vtx_base = len;
        }
    }

    /// Appends raw indices, relative to [`vtx_base`](Self::vtx_base), to the
    /// current command (or a new one).
    pub fn push_indices(&mut self, indices: &[DrawIdx], clip_rect: Rect, texture_id: TextureId) {
        let idx_offset = self.idx_buffer.len() as u32;
        self.idx_buffer.extend_from_slice(indices);

        match self.cmd_buffer.last_mut() {
            Some(last)
                if last.callback.is_none()
                    && last.clip_rect == clip_rect
                    && last.texture_id == texture_id
                    && last.vtx_offset == self.vtx_base
                    && last.idx_offset + last.elem_count == idx_offset =>
            {
                last.elem_count += indices.len() as u32;
            }
            _ => {
                let mut cmd = DrawCmd::new(clip_rect, texture_id, idx_offset, indices.len() as u32);
                cmd.vtx_offset = self.vtx_base;
                self.cmd_buffer.push(cmd);
            }
        }
    }

    pub fn add_callback(&mut self, callback: DrawCallback) {
        self.cmd_buffer.push(DrawCmd::callback(callback));
    }
}

/// Everything to render for one viewport in one frame.
#[derive(Debug, Clone)]
pub struct DrawData {
    pub draw_lists: Vec<DrawList>,
    /// Top-left of the viewport in UI units.
    pub display_pos: Vec2,
    pub display_size: Vec2,
    /// Physical pixels per UI unit.
    pub framebuffer_scale: Vec2,
    pub owner_viewport: ViewportId,
}

impl DrawData {
    pub fn new(owner_viewport: ViewportId, display_pos: Vec2, display_size: Vec2) -> Self {
        Self {
            draw_lists: Vec::new(),
            display_pos,
            display_size,
            framebuffer_scale: Vec2::splat(1.0),
            owner_viewport,
        }
    }

    pub fn total_vtx_count(&self) -> usize {
        self.draw_lists.iter().map(|l| l.vtx_buffer.len()).sum()
    }

    pub fn total_idx_count(&self) -> usize {
        self.draw_lists.iter().map(|l| l.idx_buffer.len()).sum()
    }
}
