use std::mem::size_of;

use bytemuck::{Pod, Zeroable};

use crate::coords::Vec2;
use crate::error::Result;
use crate::gpu::{
    Api, Buffer, CommandBuffer, Extent2d, IndexType, ScissorRect, ShaderStages, VertexBinding,
    ViewportRect,
};
use crate::ui::{DrawCallback, DrawData, DrawIdx, DrawVert};

use super::{project_clip_rect, RenderState, SlotBuffers, TextureRegistry};

// ── push constants ────────────────────────────────────────────────────────

/// Vertex-stage push constants mapping UI units to NDC.
///
/// `ndc = pos * scale + translate`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct ProjectionConstants {
    pub scale: [f32; 2],
    pub translate: [f32; 2],
}

impl ProjectionConstants {
    pub const SCALE_OFFSET: u32 = 0;
    pub const TRANSLATE_OFFSET: u32 = 8;

    pub fn new(display_pos: Vec2, display_size: Vec2) -> Self {
        let scale = [2.0 / display_size.x, 2.0 / display_size.y];
        let translate = [
            -1.0 - display_pos.x * scale[0],
            -1.0 - display_pos.y * scale[1],
        ];
        Self { scale, translate }
    }
}

// ── stats ─────────────────────────────────────────────────────────────────

/// What one translation recorded.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct TranslateStats {
    pub draws: u32,
    /// Commands dropped because their clip rect was empty after clamping.
    pub skipped_clip: u32,
    /// Commands dropped because their texture id had no bundle.
    pub skipped_texture: u32,
    pub callbacks: u32,
    pub vertex_bytes: u64,
    pub index_bytes: u64,
}

// ── translator ────────────────────────────────────────────────────────────

/// Records one frame of draw data onto a command buffer.
pub struct DrawDataTranslator<'a, A: Api> {
    device: &'a A::Device,
    pipeline: &'a A::Pipeline,
    textures: &'a TextureRegistry<A>,
}

impl<'a, A: Api> DrawDataTranslator<'a, A> {
    pub fn new(device: &'a A::Device, pipeline: &'a A::Pipeline, textures: &'a TextureRegistry<A>) -> Self {
        Self {
            device,
            pipeline,
            textures,
        }
    }

    /// Uploads the geometry of `draw_data` into `buffers` and records its draws.
    ///
    /// `buffers` must belong to the frame slot `cmd` is recorded for. The
    /// command buffer has to be recording; it is left recording.
    pub fn translate(
        &self,
        draw_data: &DrawData,
        cmd: &mut A::CommandBuffer,
        buffers: &mut SlotBuffers<A>,
        extent: Extent2d,
    ) -> Result<TranslateStats> {
        let mut stats = TranslateStats::default();

        let total_vtx = draw_data.total_vtx_count();
        if total_vtx == 0 {
            return Ok(stats);
        }

        stats.vertex_bytes = (total_vtx * size_of::<DrawVert>()) as u64;
        stats.index_bytes = (draw_data.total_idx_count() * size_of::<DrawIdx>()) as u64;
        buffers.ensure_capacity(self.device, stats.vertex_bytes, stats.index_bytes)?;

        let Some((vertex_buffer, index_buffer)) = buffers.pair_mut() else {
            return Ok(stats);
        };

        let mut vtx_dst = 0u64;
        let mut idx_dst = 0u64;
        for list in &draw_data.draw_lists {
            let vtx_bytes: &[u8] = bytemuck::cast_slice(&list.vtx_buffer);
            let idx_bytes: &[u8] = bytemuck::cast_slice(&list.idx_buffer);
            vertex_buffer.update(vtx_dst, vtx_bytes)?;
            index_buffer.update(idx_dst, idx_bytes)?;
            vtx_dst += vtx_bytes.len() as u64;
            idx_dst += idx_bytes.len() as u64;
        }

        let (vertex_buffer, index_buffer) = (&*vertex_buffer, &*index_buffer);
        self.setup_render_state(draw_data, cmd, vertex_buffer, index_buffer, extent);

        let mut warned_texture = false;
        let mut global_vtx = 0u32;
        let mut global_idx = 0u32;

        for list in &draw_data.draw_lists {
            for draw in &list.cmd_buffer {
                if let Some(callback) = &draw.callback {
                    stats.callbacks += 1;
                    match callback {
                        DrawCallback::ResetRenderState => {
                            self.setup_render_state(draw_data, cmd, vertex_buffer, index_buffer, extent);
                        }
                        DrawCallback::User(f) => {
                            let mut state = RenderState::new::<A>(cmd, self.pipeline);
                            f(list, draw, &mut state);
                        }
                    }
                    continue;
                }

                let Some(scissor) = project_clip_rect(
                    draw.clip_rect,
                    draw_data.display_pos,
                    draw_data.framebuffer_scale,
                    extent,
                ) else {
                    stats.skipped_clip += 1;
                    continue;
                };

                let Some(bundle) = self.textures.get(draw.texture_id) else {
                    if !warned_texture {
                        log::warn!("no descriptor bundle for {:?}; draw skipped", draw.texture_id);
                        warned_texture = true;
                    }
                    stats.skipped_texture += 1;
                    continue;
                };

                cmd.set_scissor(scissor);
                cmd.bind_graphics_descriptor_bundle(self.pipeline, 0, bundle);
                cmd.draw_indexed(
                    draw.elem_count,
                    1,
                    draw.idx_offset + global_idx,
                    (draw.vtx_offset + global_vtx) as i32,
                    0,
                );
                stats.draws += 1;
            }

            global_vtx += list.vtx_buffer.len() as u32;
            global_idx += list.idx_buffer.len() as u32;
        }

        cmd.set_scissor(ScissorRect::full(extent));
        Ok(stats)
    }

    fn setup_render_state(
        &self,
        draw_data: &DrawData,
        cmd: &mut A::CommandBuffer,
        vertex_buffer: &A::Buffer,
        index_buffer: &A::Buffer,
        extent: Extent2d,
    ) {
        cmd.bind_graphics_pipeline(self.pipeline);
        cmd.bind_vertex_buffers(
            0,
            &[VertexBinding {
                buffer: vertex_buffer,
                offset: 0,
                size: vertex_buffer.size(),
                stride: DrawVert::STRIDE,
            }],
        );
        cmd.bind_index_buffer(index_buffer, IndexType::for_size(size_of::<DrawIdx>()), 0);
        cmd.set_viewport(ViewportRect::full(extent));

        let pc = ProjectionConstants::new(draw_data.display_pos, draw_data.display_size);
        cmd.push_constants(
            self.pipeline,
            ShaderStages::VERTEX,
            ProjectionConstants::SCALE_OFFSET,
            bytemuck::bytes_of(&pc.scale),
        );
        cmd.push_constants(
            self.pipeline,
            ShaderStages::VERTEX,
            ProjectionConstants::TRANSLATE_OFFSET,
            bytemuck::bytes_of(&pc.translate),
        );
    }
}
