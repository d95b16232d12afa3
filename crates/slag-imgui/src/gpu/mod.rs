//! Capability surface of the graphics API.
//!
//! The backend never talks to a concrete API. Everything it needs (buffers,
//! textures, descriptor pools and bundles, command buffers, swapchains, queues)
//! is reached through the traits below, tied together by [`Api`].
//!
//! Ownership conventions:
//! - buffers, textures, command buffers and swapchains are owned values; dropping
//!   them destroys the GPU object
//! - pipelines, samplers, descriptor pools and bundles are shared handles (`Clone`)
//!   owned by whoever created them

mod command;
mod device;
mod error;
mod resource;
mod swapchain;
mod types;

pub use command::{Attachment, CommandBuffer, ImageBarrier, VertexBinding};
pub use device::{Device, Queue};
pub use error::{GpuError, GpuResult};
pub use resource::{Buffer, DescriptorBundle, DescriptorPool, ShaderPipeline, Texture};
pub use swapchain::{Frame, FrameResourceFactory, FrameResources, FrameTarget, Swapchain};
pub use types::{
    BarrierAccess, BufferAccess, BufferUsage, ClearColor, Extent2d, IndexType, PipelineStages,
    PixelFormat, PresentMode, QueueKind, ScissorRect, ShaderStages, SwapchainDescriptor,
    TextureDescriptor, TextureLayout, TextureUsage, VertexAttribute, VertexFormat, ViewportRect,
};

/// Binds the associated types of one graphics API implementation together.
pub trait Api: Sized + 'static {
    type Device: Device<Self>;
    type Queue: Queue<Self>;
    type Buffer: Buffer;
    type Texture: Texture;
    type Sampler: Clone;
    type Pipeline: ShaderPipeline<Self> + Clone + 'static;
    /// Layout of one descriptor group of a pipeline.
    type DescriptorGroup;
    type DescriptorPool: DescriptorPool<Self> + Clone;
    type DescriptorBundle: DescriptorBundle<Self> + Clone;
    type CommandBuffer: CommandBuffer<Self> + 'static;
    type Swapchain: Swapchain<Self>;
    type Frame: Frame<Self>;
}
