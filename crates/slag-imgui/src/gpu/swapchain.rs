use super::{Api, CommandBuffer, Extent2d, GpuResult};

/// Resources owned by one swapchain slot.
///
/// Dropping the resources waits for the slot's command buffer to finish, so a
/// slot can be torn down while its last submission is still executing.
pub struct FrameResources<A: Api> {
    pub command_buffer: A::CommandBuffer,
    /// Per-frame descriptor pool; only the host's main-window frames carry one.
    pub descriptor_pool: Option<A::DescriptorPool>,
}

impl<A: Api> FrameResources<A> {
    pub fn new(command_buffer: A::CommandBuffer) -> Self {
        Self {
            command_buffer,
            descriptor_pool: None,
        }
    }

    pub fn with_descriptor_pool(command_buffer: A::CommandBuffer, pool: A::DescriptorPool) -> Self {
        Self {
            command_buffer,
            descriptor_pool: Some(pool),
        }
    }

    pub fn wait_until_finished(&self) {
        self.command_buffer.wait_until_finished();
    }

    pub fn is_finished(&self) -> bool {
        self.command_buffer.is_finished()
    }
}

impl<A: Api> Drop for FrameResources<A> {
    fn drop(&mut self) {
        self.command_buffer.wait_until_finished();
    }
}

/// Manufactures the resources of a swapchain slot.
///
/// Called by the swapchain once for every slot it creates.
pub trait FrameResourceFactory<A: Api> {
    fn create(&mut self, frame_index: usize, device: &A::Device) -> GpuResult<FrameResources<A>>;
}

impl<A, F> FrameResourceFactory<A> for F
where
    A: Api,
    F: FnMut(usize, &A::Device) -> GpuResult<FrameResources<A>>,
{
    fn create(&mut self, frame_index: usize, device: &A::Device) -> GpuResult<FrameResources<A>> {
        self(frame_index, device)
    }
}

/// Split view of an acquired frame: the image to render into plus the slot's resources.
pub struct FrameTarget<'a, A: Api> {
    pub back_buffer: &'a A::Texture,
    pub resources: &'a mut FrameResources<A>,
}

/// One presentable slot of a swapchain.
pub trait Frame<A: Api> {
    fn back_buffer(&self) -> &A::Texture;
    fn resources(&self) -> &FrameResources<A>;
    fn target_mut(&mut self) -> FrameTarget<'_, A>;
}

/// Ring of presentable frames bound to a window surface.
pub trait Swapchain<A: Api> {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    fn extent(&self) -> Extent2d {
        Extent2d::new(self.width(), self.height())
    }

    /// Number of frames in flight.
    fn frame_count(&self) -> usize;

    /// Slot index of the frame returned by `current_frame`.
    fn current_frame_index(&self) -> usize;

    /// Resizes the back buffers. `(0, 0)` marks the surface as minimized: no frame
    /// is available until a non-zero size arrives.
    fn resize(&mut self, width: u32, height: u32);

    /// Blocks until every frame's last submission has finished executing.
    fn wait_idle(&self);

    /// Frame currently acquired for recording, if the surface can present.
    fn current_frame(&mut self) -> Option<&mut A::Frame>;

    /// Presents the current frame and acquires the next one.
    ///
    /// May block until the next slot's previous submission has finished.
    fn next(&mut self) -> Option<&mut A::Frame>;
}
