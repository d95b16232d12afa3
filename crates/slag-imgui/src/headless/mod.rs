//! Recording implementation of the graphics API.
//!
//! `HeadlessApi` executes nothing. Buffers keep their bytes, command buffers
//! keep a [`Command`] log, queues keep every submission and the device counts
//! allocations. Submissions complete immediately.
//!
//! Everything is single-threaded (`Rc`/`Cell`), like the backend itself.

mod buffer;
mod command;
mod descriptor;
mod device;
mod swapchain;

pub use buffer::{HeadlessBuffer, HeadlessSampler, HeadlessTexture};
pub use command::{AttachmentRecord, Command, HeadlessCommandBuffer};
pub use descriptor::{
    BundleBinding, HeadlessDescriptorBundle, HeadlessDescriptorGroup, HeadlessDescriptorPool,
    HeadlessPipeline,
};
pub use device::{DeviceStats, HeadlessDevice, HeadlessQueue, Submission};
pub use swapchain::{HeadlessFrame, HeadlessSwapchain};

use crate::gpu::Api;

/// Marker type binding the headless resources together.
#[derive(Debug, Copy, Clone)]
pub enum HeadlessApi {}

impl Api for HeadlessApi {
    type Device = HeadlessDevice;
    type Queue = HeadlessQueue;
    type Buffer = HeadlessBuffer;
    type Texture = HeadlessTexture;
    type Sampler = HeadlessSampler;
    type Pipeline = HeadlessPipeline;
    type DescriptorGroup = HeadlessDescriptorGroup;
    type DescriptorPool = HeadlessDescriptorPool;
    type DescriptorBundle = HeadlessDescriptorBundle;
    type CommandBuffer = HeadlessCommandBuffer;
    type Swapchain = HeadlessSwapchain;
    type Frame = HeadlessFrame;
}
