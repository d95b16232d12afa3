use super::{
    Api, BarrierAccess, ClearColor, GpuResult, IndexType, PipelineStages, ScissorRect,
    ShaderStages, TextureLayout, ViewportRect,
};

/// Layout transition of one texture between pipeline stages.
pub struct ImageBarrier<'a, A: Api> {
    pub texture: &'a A::Texture,
    pub old_layout: TextureLayout,
    pub new_layout: TextureLayout,
    pub access_before: BarrierAccess,
    pub access_after: BarrierAccess,
    pub sync_before: PipelineStages,
    pub sync_after: PipelineStages,
}

/// Color target of a dynamic rendering pass.
pub struct Attachment<'a, A: Api> {
    pub texture: &'a A::Texture,
    pub layout: TextureLayout,
    pub clear_on_load: bool,
    pub clear: ClearColor,
}

/// One vertex-buffer binding.
pub struct VertexBinding<'a, A: Api> {
    pub buffer: &'a A::Buffer,
    pub offset: u64,
    pub size: u64,
    pub stride: u64,
}

/// Records GPU work for later submission on a queue.
///
/// Recording calls are only valid between `begin` and `end`. Implementations may
/// report misuse through the `begin`/`end` results; the per-command methods do
/// not fail.
pub trait CommandBuffer<A: Api> {
    fn begin(&mut self) -> GpuResult<()>;
    fn end(&mut self) -> GpuResult<()>;

    fn bind_descriptor_pool(&mut self, pool: &A::DescriptorPool);
    fn insert_barrier(&mut self, barrier: &ImageBarrier<'_, A>);

    fn begin_rendering(
        &mut self,
        colors: &[Attachment<'_, A>],
        depth: Option<&Attachment<'_, A>>,
        area: ScissorRect,
    );
    fn end_rendering(&mut self);

    fn bind_graphics_pipeline(&mut self, pipeline: &A::Pipeline);
    fn bind_vertex_buffers(&mut self, first_binding: u32, bindings: &[VertexBinding<'_, A>]);
    fn bind_index_buffer(&mut self, buffer: &A::Buffer, index_type: IndexType, offset: u64);
    fn bind_graphics_descriptor_bundle(
        &mut self,
        pipeline: &A::Pipeline,
        index: u32,
        bundle: &A::DescriptorBundle,
    );

    fn set_viewport(&mut self, viewport: ViewportRect);
    fn set_scissor(&mut self, scissor: ScissorRect);
    fn push_constants(
        &mut self,
        pipeline: &A::Pipeline,
        stages: ShaderStages,
        offset: u32,
        data: &[u8],
    );

    fn draw_indexed(
        &mut self,
        index_count: u32,
        instance_count: u32,
        first_index: u32,
        vertex_offset: i32,
        first_instance: u32,
    );

    /// Blocks until the last submission of this command buffer has executed.
    fn wait_until_finished(&self);
    fn is_finished(&self) -> bool;
}
