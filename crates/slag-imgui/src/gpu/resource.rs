use super::{Api, GpuResult, TextureLayout};

/// Linear GPU memory. Dropping the buffer destroys it.
pub trait Buffer {
    /// Allocated size in bytes.
    fn size(&self) -> u64;

    /// Copies `data` into the buffer at byte `offset`.
    ///
    /// Only valid for host-visible buffers. Writes are visible to the GPU for any
    /// command buffer submitted after this call returns.
    fn update(&mut self, offset: u64, data: &[u8]) -> GpuResult<()>;
}

/// Sampled or renderable image. Dropping the texture destroys it.
pub trait Texture {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
}

/// Compiled graphics pipeline supplied by the host.
pub trait ShaderPipeline<A: Api> {
    /// Layout of the descriptor group bound at `index`.
    fn descriptor_group(&self, index: u32) -> Option<&A::DescriptorGroup>;
}

/// Allocator for descriptor bundles.
///
/// Bundles are scoped to the pool that made them: after `reset` every bundle it
/// handed out is invalid.
pub trait DescriptorPool<A: Api> {
    fn make_bundle(&self, group: &A::DescriptorGroup) -> GpuResult<A::DescriptorBundle>;

    fn reset(&self);
}

/// Shader-visible resource bindings for one descriptor group.
pub trait DescriptorBundle<A: Api> {
    fn set_sampler_and_texture(
        &mut self,
        binding: u32,
        array_element: u32,
        texture: &A::Texture,
        layout: TextureLayout,
        sampler: &A::Sampler,
    );
}
