use crate::platform::PresentationTarget;

use super::{
    Api, BufferAccess, BufferUsage, FrameResourceFactory, GpuResult, QueueKind,
    SwapchainDescriptor, TextureDescriptor,
};

/// Resource factory of the graphics API.
///
/// Handles are cheap to clone; every clone refers to the same device.
pub trait Device<A: Api>: Clone {
    fn create_buffer(&self, size: u64, access: BufferAccess, usage: BufferUsage) -> GpuResult<A::Buffer>;

    /// Creates a texture and uploads `pixels` into mip level 0.
    fn create_texture(&self, desc: &TextureDescriptor, pixels: &[u8]) -> GpuResult<A::Texture>;

    fn create_command_buffer(&self, queue: QueueKind) -> GpuResult<A::CommandBuffer>;

    fn create_descriptor_pool(&self) -> GpuResult<A::DescriptorPool>;

    /// Creates a swapchain presenting to `target`. `factory` is invoked once per slot.
    fn create_swapchain(
        &self,
        target: &PresentationTarget,
        desc: &SwapchainDescriptor,
        factory: Box<dyn FrameResourceFactory<A>>,
    ) -> GpuResult<A::Swapchain>;

    fn graphics_queue(&self) -> &A::Queue;
}

/// Submission endpoint.
pub trait Queue<A: Api> {
    /// Submits recorded command buffers.
    ///
    /// When `signal` is given, the frame is marked in use until the submission
    /// completes; acquiring that slot again waits for it.
    fn submit(&self, command_buffers: &[&A::CommandBuffer], signal: Option<&A::Frame>) -> GpuResult<()>;
}
