use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::gpu::{
    BufferAccess, BufferUsage, Device, FrameResourceFactory, GpuError, GpuResult, Queue, QueueKind,
    SwapchainDescriptor, TextureDescriptor, VertexAttribute,
};
use crate::platform::PresentationTarget;

use super::{
    Command, HeadlessApi, HeadlessBuffer, HeadlessCommandBuffer, HeadlessDescriptorGroup,
    HeadlessDescriptorPool, HeadlessFrame, HeadlessPipeline, HeadlessSampler, HeadlessSwapchain,
    HeadlessTexture,
};

/// Allocation counters of a headless device.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct DeviceStats {
    pub buffers_created: u64,
    pub buffers_destroyed: u64,
    pub textures_created: u64,
    pub textures_destroyed: u64,
    pub swapchains_created: u64,
    pub swapchains_destroyed: u64,
    pub command_buffers_created: u64,
    pub command_buffers_destroyed: u64,
    pub pools_created: u64,
    pub bundles_created: u64,
    pub submissions: u64,
    /// Calls to `wait_until_finished` on any command buffer.
    pub waits: u64,
}

impl DeviceStats {
    pub fn live_buffers(&self) -> u64 {
        self.buffers_created - self.buffers_destroyed
    }

    pub fn live_textures(&self) -> u64 {
        self.textures_created - self.textures_destroyed
    }

    pub fn live_swapchains(&self) -> u64 {
        self.swapchains_created - self.swapchains_destroyed
    }
}

/// State shared by the device and every object it created.
#[derive(Debug, Default)]
pub(super) struct DeviceShared {
    next_id: Cell<u64>,
    stats: Cell<DeviceStats>,
    fail_next: Cell<bool>,
}

impl DeviceShared {
    pub(super) fn next_id(&self) -> u64 {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        id
    }

    pub(super) fn bump(&self, f: impl FnOnce(&mut DeviceStats)) {
        let mut stats = self.stats.get();
        f(&mut stats);
        self.stats.set(stats);
    }

    fn check_allocation(&self, what: &'static str) -> GpuResult<()> {
        if self.fail_next.replace(false) {
            return Err(GpuError::OutOfMemory { what });
        }
        Ok(())
    }
}

/// One queue submission as seen by the headless queue.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub command_buffers: Vec<u64>,
    /// Commands of all submitted buffers, in submission order.
    pub commands: Vec<Command>,
    /// Id of the frame passed as completion token.
    pub frame: Option<u64>,
}

/// Headless graphics queue. Submissions complete immediately.
#[derive(Debug)]
pub struct HeadlessQueue {
    shared: Rc<DeviceShared>,
    submissions: RefCell<Vec<Submission>>,
}

impl HeadlessQueue {
    pub fn submissions(&self) -> Vec<Submission> {
        self.submissions.borrow().clone()
    }

    pub fn take_submissions(&self) -> Vec<Submission> {
        self.submissions.take()
    }
}

impl Queue<HeadlessApi> for HeadlessQueue {
    fn submit(&self, command_buffers: &[&HeadlessCommandBuffer], signal: Option<&HeadlessFrame>) -> GpuResult<()> {
        if command_buffers.iter().any(|cb| cb.is_recording()) {
            return Err(GpuError::InvalidState("submit while recording"));
        }

        let submission = Submission {
            command_buffers: command_buffers.iter().map(|cb| cb.id()).collect(),
            commands: command_buffers.iter().flat_map(|cb| cb.commands().iter().cloned()).collect(),
            frame: signal.map(HeadlessFrame::id),
        };
        self.submissions.borrow_mut().push(submission);
        self.shared.bump(|s| s.submissions += 1);
        Ok(())
    }
}

#[derive(Debug)]
struct DeviceInner {
    shared: Rc<DeviceShared>,
    queue: HeadlessQueue,
}

/// Headless device. Clones share counters, ids and the queue.
#[derive(Debug, Clone)]
pub struct HeadlessDevice {
    inner: Rc<DeviceInner>,
}

impl Default for HeadlessDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessDevice {
    pub fn new() -> Self {
        let shared = Rc::new(DeviceShared::default());
        let queue = HeadlessQueue {
            shared: shared.clone(),
            submissions: RefCell::new(Vec::new()),
        };
        Self {
            inner: Rc::new(DeviceInner { shared, queue }),
        }
    }

    pub fn stats(&self) -> DeviceStats {
        self.inner.shared.stats.get()
    }

    /// Makes the next buffer or texture allocation fail with `OutOfMemory`.
    pub fn fail_next_allocation(&self) {
        self.inner.shared.fail_next.set(true);
    }

    pub fn queue(&self) -> &HeadlessQueue {
        &self.inner.queue
    }

    pub fn create_pipeline(
        &self,
        groups: Vec<HeadlessDescriptorGroup>,
        attributes: &[VertexAttribute],
        stride: u64,
    ) -> HeadlessPipeline {
        HeadlessPipeline::new(self.inner.shared.next_id(), groups, attributes.to_vec(), stride)
    }

    pub fn create_sampler(&self) -> HeadlessSampler {
        HeadlessSampler::new(self.inner.shared.next_id())
    }

    pub(super) fn shared(&self) -> &Rc<DeviceShared> {
        &self.inner.shared
    }
}

impl Device<HeadlessApi> for HeadlessDevice {
    fn create_buffer(&self, size: u64, access: BufferAccess, usage: BufferUsage) -> GpuResult<HeadlessBuffer> {
        if size == 0 {
            return Err(GpuError::ZeroSized { what: "buffer" });
        }
        let shared = &self.inner.shared;
        shared.check_allocation("buffer")?;
        shared.bump(|s| s.buffers_created += 1);
        Ok(HeadlessBuffer::new(shared.clone(), size, access, usage))
    }

    fn create_texture(&self, desc: &TextureDescriptor, pixels: &[u8]) -> GpuResult<HeadlessTexture> {
        let expected = desc.byte_len();
        if pixels.len() != expected {
            return Err(GpuError::TextureDataMismatch {
                expected,
                actual: pixels.len(),
            });
        }
        let shared = &self.inner.shared;
        shared.check_allocation("texture")?;
        shared.bump(|s| s.textures_created += 1);
        Ok(HeadlessTexture::new(shared.clone(), *desc, pixels.to_vec()))
    }

    fn create_command_buffer(&self, queue: QueueKind) -> GpuResult<HeadlessCommandBuffer> {
        let shared = &self.inner.shared;
        shared.bump(|s| s.command_buffers_created += 1);
        Ok(HeadlessCommandBuffer::new(shared.clone(), queue))
    }

    fn create_descriptor_pool(&self) -> GpuResult<HeadlessDescriptorPool> {
        let shared = &self.inner.shared;
        shared.bump(|s| s.pools_created += 1);
        Ok(HeadlessDescriptorPool::new(shared.clone()))
    }

    fn create_swapchain(
        &self,
        target: &PresentationTarget,
        desc: &SwapchainDescriptor,
        factory: Box<dyn FrameResourceFactory<HeadlessApi>>,
    ) -> GpuResult<HeadlessSwapchain> {
        let swapchain = HeadlessSwapchain::new(self.clone(), *target, *desc, factory)?;
        self.inner.shared.bump(|s| s.swapchains_created += 1);
        Ok(swapchain)
    }

    fn graphics_queue(&self) -> &HeadlessQueue {
        &self.inner.queue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::{Buffer, CommandBuffer, PixelFormat, TextureLayout, TextureUsage};

    fn font_desc(width: u32, height: u32) -> TextureDescriptor {
        TextureDescriptor {
            format: PixelFormat::R8G8B8A8Unorm,
            width,
            height,
            mip_levels: 1,
            usage: TextureUsage::SAMPLED_IMAGE,
            initial_layout: TextureLayout::ShaderResource,
        }
    }

    #[test]
    fn buffers_are_counted_on_drop() {
        let device = HeadlessDevice::new();
        let buf = device
            .create_buffer(64, BufferAccess::CpuAndGpu, BufferUsage::VERTEX_BUFFER)
            .unwrap();
        assert_eq!(device.stats().live_buffers(), 1);
        drop(buf);
        assert_eq!(device.stats().live_buffers(), 0);
    }

    #[test]
    fn empty_buffers_are_rejected() {
        let device = HeadlessDevice::new();
        let err = device
            .create_buffer(0, BufferAccess::CpuAndGpu, BufferUsage::INDEX_BUFFER)
            .unwrap_err();
        assert_eq!(err, GpuError::ZeroSized { what: "buffer" });
        assert_eq!(device.stats().buffers_created, 0);
    }

    #[test]
    fn buffer_update_bounds() {
        let device = HeadlessDevice::new();
        let mut buf = device
            .create_buffer(8, BufferAccess::CpuAndGpu, BufferUsage::INDEX_BUFFER)
            .unwrap();
        buf.update(4, &[1, 2, 3, 4]).unwrap();
        assert_eq!(buf.contents(), &[0, 0, 0, 0, 1, 2, 3, 4]);

        let err = buf.update(6, &[0; 4]).unwrap_err();
        assert_eq!(err, GpuError::OutOfBounds { offset: 6, len: 4, size: 8 });
    }

    #[test]
    fn texture_requires_matching_pixels() {
        let device = HeadlessDevice::new();
        let err = device.create_texture(&font_desc(2, 2), &[0; 15]).unwrap_err();
        assert_eq!(err, GpuError::TextureDataMismatch { expected: 16, actual: 15 });
        assert_eq!(device.stats().textures_created, 0);
    }

    #[test]
    fn injected_failure_hits_once() {
        let device = HeadlessDevice::new();
        device.fail_next_allocation();
        assert!(device.create_texture(&font_desc(1, 1), &[0; 4]).is_err());
        assert!(device.create_texture(&font_desc(1, 1), &[0; 4]).is_ok());
    }

    #[test]
    fn ids_are_unique_across_kinds() {
        let device = HeadlessDevice::new();
        let a = device.create_sampler();
        let b = device.create_buffer(4, BufferAccess::CpuAndGpu, BufferUsage::DATA_BUFFER).unwrap();
        let c = device.create_command_buffer(QueueKind::Graphics).unwrap();
        assert_ne!(a.id(), b.id());
        assert_ne!(b.id(), c.id());
    }

    #[test]
    fn submit_rejects_recording_buffers() {
        let device = HeadlessDevice::new();
        let mut cb = device.create_command_buffer(QueueKind::Graphics).unwrap();
        cb.begin().unwrap();
        assert!(device.graphics_queue().submit(&[&cb], None).is_err());

        cb.end().unwrap();
        device.graphics_queue().submit(&[&cb], None).unwrap();

        let subs = device.queue().submissions();
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].commands, vec![Command::Begin, Command::End]);
        assert_eq!(device.stats().submissions, 1);
    }
}
