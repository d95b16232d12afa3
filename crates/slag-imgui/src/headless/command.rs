use std::rc::Rc;

use crate::gpu::{
    Attachment, BarrierAccess, ClearColor, CommandBuffer, GpuError, GpuResult, ImageBarrier,
    IndexType, PipelineStages, QueueKind, ScissorRect, ShaderStages, TextureLayout, VertexBinding,
    ViewportRect,
};

use super::device::DeviceShared;
use super::{
    HeadlessApi, HeadlessBuffer, HeadlessDescriptorBundle, HeadlessDescriptorPool, HeadlessPipeline,
};

/// Color or depth attachment as recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct AttachmentRecord {
    pub texture: u64,
    pub layout: TextureLayout,
    pub clear_on_load: bool,
    pub clear: ClearColor,
}

impl AttachmentRecord {
    fn from_attachment(a: &Attachment<'_, HeadlessApi>) -> Self {
        Self {
            texture: a.texture.id(),
            layout: a.layout,
            clear_on_load: a.clear_on_load,
            clear: a.clear,
        }
    }
}

/// One recorded command. Resources are referenced by id.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Begin,
    End,
    BindDescriptorPool {
        pool: u64,
        generation: u64,
    },
    Barrier {
        texture: u64,
        old_layout: TextureLayout,
        new_layout: TextureLayout,
        access_before: BarrierAccess,
        access_after: BarrierAccess,
        sync_before: PipelineStages,
        sync_after: PipelineStages,
    },
    BeginRendering {
        colors: Vec<AttachmentRecord>,
        depth: Option<AttachmentRecord>,
        area: ScissorRect,
    },
    EndRendering,
    BindPipeline {
        pipeline: u64,
    },
    BindVertexBuffer {
        binding: u32,
        buffer: u64,
        offset: u64,
        size: u64,
        stride: u64,
    },
    BindIndexBuffer {
        buffer: u64,
        index_type: IndexType,
        offset: u64,
    },
    BindDescriptorBundle {
        pipeline: u64,
        index: u32,
        bundle: u64,
    },
    SetViewport(ViewportRect),
    SetScissor(ScissorRect),
    PushConstants {
        stages: ShaderStages,
        offset: u32,
        data: Vec<u8>,
    },
    DrawIndexed {
        index_count: u32,
        instance_count: u32,
        first_index: u32,
        vertex_offset: i32,
        first_instance: u32,
    },
}

/// Command buffer that keeps what was recorded into it.
///
/// `begin` starts a fresh log.
#[derive(Debug)]
pub struct HeadlessCommandBuffer {
    id: u64,
    queue: QueueKind,
    recording: bool,
    commands: Vec<Command>,
    shared: Rc<DeviceShared>,
}

impl HeadlessCommandBuffer {
    pub(super) fn new(shared: Rc<DeviceShared>, queue: QueueKind) -> Self {
        Self {
            id: shared.next_id(),
            queue,
            recording: false,
            commands: Vec::new(),
            shared,
        }
    }

    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[inline]
    pub fn queue_kind(&self) -> QueueKind {
        self.queue
    }

    #[inline]
    pub fn is_recording(&self) -> bool {
        self.recording
    }

    #[inline]
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    fn record(&mut self, command: Command) {
        if !self.recording {
            log::warn!("command buffer {}: {:?} recorded outside begin/end", self.id, command);
        }
        self.commands.push(command);
    }
}

impl CommandBuffer<HeadlessApi> for HeadlessCommandBuffer {
    fn begin(&mut self) -> GpuResult<()> {
        if self.recording {
            return Err(GpuError::InvalidState("begin while recording"));
        }
        self.recording = true;
        self.commands.clear();
        self.commands.push(Command::Begin);
        Ok(())
    }

    fn end(&mut self) -> GpuResult<()> {
        if !self.recording {
            return Err(GpuError::InvalidState("end without begin"));
        }
        self.commands.push(Command::End);
        self.recording = false;
        Ok(())
    }

    fn bind_descriptor_pool(&mut self, pool: &HeadlessDescriptorPool) {
        self.record(Command::BindDescriptorPool {
            pool: pool.id(),
            generation: pool.generation(),
        });
    }

    fn insert_barrier(&mut self, barrier: &ImageBarrier<'_, HeadlessApi>) {
        self.record(Command::Barrier {
            texture: barrier.texture.id(),
            old_layout: barrier.old_layout,
            new_layout: barrier.new_layout,
            access_before: barrier.access_before,
            access_after: barrier.access_after,
            sync_before: barrier.sync_before,
            sync_after: barrier.sync_after,
        });
    }

    fn begin_rendering(
        &mut self,
        colors: &[Attachment<'_, HeadlessApi>],
        depth: Option<&Attachment<'_, HeadlessApi>>,
        area: ScissorRect,
    ) {
        self.record(Command::BeginRendering {
            colors: colors.iter().map(AttachmentRecord::from_attachment).collect(),
            depth: depth.map(AttachmentRecord::from_attachment),
            area,
        });
    }

    fn end_rendering(&mut self) {
        self.record(Command::EndRendering);
    }

    fn bind_graphics_pipeline(&mut self, pipeline: &HeadlessPipeline) {
        self.record(Command::BindPipeline { pipeline: pipeline.id() });
    }

    fn bind_vertex_buffers(&mut self, first_binding: u32, bindings: &[VertexBinding<'_, HeadlessApi>]) {
        for (i, b) in bindings.iter().enumerate() {
            self.record(Command::BindVertexBuffer {
                binding: first_binding + i as u32,
                buffer: b.buffer.id(),
                offset: b.offset,
                size: b.size,
                stride: b.stride,
            });
        }
    }

    fn bind_index_buffer(&mut self, buffer: &HeadlessBuffer, index_type: IndexType, offset: u64) {
        self.record(Command::BindIndexBuffer {
            buffer: buffer.id(),
            index_type,
            offset,
        });
    }

    fn bind_graphics_descriptor_bundle(
        &mut self,
        pipeline: &HeadlessPipeline,
        index: u32,
        bundle: &HeadlessDescriptorBundle,
    ) {
        self.record(Command::BindDescriptorBundle {
            pipeline: pipeline.id(),
            index,
            bundle: bundle.id(),
        });
    }

    fn set_viewport(&mut self, viewport: ViewportRect) {
        self.record(Command::SetViewport(viewport));
    }

    fn set_scissor(&mut self, scissor: ScissorRect) {
        self.record(Command::SetScissor(scissor));
    }

    fn push_constants(&mut self, _pipeline: &HeadlessPipeline, stages: ShaderStages, offset: u32, data: &[u8]) {
        self.record(Command::PushConstants {
            stages,
            offset,
            data: data.to_vec(),
        });
    }

    fn draw_indexed(
        &mut self,
        index_count: u32,
        instance_count: u32,
        first_index: u32,
        vertex_offset: i32,
        first_instance: u32,
    ) {
        self.record(Command::DrawIndexed {
            index_count,
            instance_count,
            first_index,
            vertex_offset,
            first_instance,
        });
    }

    fn wait_until_finished(&self) {
        self.shared.bump(|s| s.waits += 1);
    }

    fn is_finished(&self) -> bool {
        true
    }
}

impl Drop for HeadlessCommandBuffer {
    fn drop(&mut self) {
        self.shared.bump(|s| s.command_buffers_destroyed += 1);
    }
}
