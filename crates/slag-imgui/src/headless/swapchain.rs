use crate::gpu::{
    Frame, FrameResourceFactory, FrameResources, FrameTarget, GpuError, GpuResult, PixelFormat,
    PresentMode, Swapchain, SwapchainDescriptor, TextureDescriptor, TextureLayout, TextureUsage,
};
use crate::platform::PresentationTarget;

use super::{HeadlessApi, HeadlessDevice, HeadlessTexture};

/// One swapchain slot: back buffer plus the resources the factory made for it.
pub struct HeadlessFrame {
    id: u64,
    back_buffer: HeadlessTexture,
    resources: FrameResources<HeadlessApi>,
}

impl HeadlessFrame {
    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl Frame<HeadlessApi> for HeadlessFrame {
    fn back_buffer(&self) -> &HeadlessTexture {
        &self.back_buffer
    }

    fn resources(&self) -> &FrameResources<HeadlessApi> {
        &self.resources
    }

    fn target_mut(&mut self) -> FrameTarget<'_, HeadlessApi> {
        FrameTarget {
            back_buffer: &self.back_buffer,
            resources: &mut self.resources,
        }
    }
}

/// Round-robin swapchain without a surface.
pub struct HeadlessSwapchain {
    id: u64,
    device: HeadlessDevice,
    target: PresentationTarget,
    desc: SwapchainDescriptor,
    frames: Vec<HeadlessFrame>,
    current: usize,
    presents: u64,
}

impl HeadlessSwapchain {
    pub(super) fn new(
        device: HeadlessDevice,
        target: PresentationTarget,
        desc: SwapchainDescriptor,
        mut factory: Box<dyn FrameResourceFactory<HeadlessApi>>,
    ) -> GpuResult<Self> {
        if desc.frames_in_flight == 0 {
            return Err(GpuError::InvalidState("swapchain without frames"));
        }

        let mut frames = Vec::with_capacity(desc.frames_in_flight);
        for index in 0..desc.frames_in_flight {
            let resources = factory.create(index, &device)?;
            frames.push(HeadlessFrame {
                id: device.shared().next_id(),
                back_buffer: back_buffer(&device, desc.width, desc.height, desc.format),
                resources,
            });
        }

        log::debug!(
            "headless swapchain {}x{} with {} frames ({:?})",
            desc.width,
            desc.height,
            desc.frames_in_flight,
            desc.present_mode
        );

        Ok(Self {
            id: device.shared().next_id(),
            device,
            target,
            desc,
            frames,
            current: 0,
            presents: 0,
        })
    }

    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[inline]
    pub fn target(&self) -> &PresentationTarget {
        &self.target
    }

    #[inline]
    pub fn present_mode(&self) -> PresentMode {
        self.desc.present_mode
    }

    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.desc.format
    }

    /// Frames presented by `next` so far.
    #[inline]
    pub fn present_count(&self) -> u64 {
        self.presents
    }

    pub fn frames(&self) -> &[HeadlessFrame] {
        &self.frames
    }

    fn can_present(&self) -> bool {
        self.desc.width != 0 && self.desc.height != 0
    }
}

fn back_buffer(device: &HeadlessDevice, width: u32, height: u32, format: PixelFormat) -> HeadlessTexture {
    let desc = TextureDescriptor {
        format,
        width,
        height,
        mip_levels: 1,
        usage: TextureUsage::RENDER_TARGET,
        initial_layout: TextureLayout::Undefined,
    };
    let shared = device.shared();
    shared.bump(|s| s.textures_created += 1);
    // Back buffers are never read back, so no pixel storage.
    HeadlessTexture::new(shared.clone(), desc, Vec::new())
}

impl Swapchain<HeadlessApi> for HeadlessSwapchain {
    fn width(&self) -> u32 {
        self.desc.width
    }

    fn height(&self) -> u32 {
        self.desc.height
    }

    fn frame_count(&self) -> usize {
        self.frames.len()
    }

    fn current_frame_index(&self) -> usize {
        self.current
    }

    fn resize(&mut self, width: u32, height: u32) {
        if (width, height) == (self.desc.width, self.desc.height) {
            return;
        }

        for frame in &mut self.frames {
            frame.resources.wait_until_finished();
            frame.back_buffer = back_buffer(&self.device, width, height, self.desc.format);
        }
        self.desc.width = width;
        self.desc.height = height;
    }

    fn wait_idle(&self) {
        for frame in &self.frames {
            frame.resources.wait_until_finished();
        }
    }

    fn current_frame(&mut self) -> Option<&mut HeadlessFrame> {
        if !self.can_present() {
            return None;
        }
        self.frames.get_mut(self.current)
    }

    fn next(&mut self) -> Option<&mut HeadlessFrame> {
        if !self.can_present() {
            return None;
        }

        self.presents += 1;
        self.current = (self.current + 1) % self.frames.len();
        let frame = self.frames.get_mut(self.current)?;
        frame.resources.wait_until_finished();
        Some(frame)
    }
}

impl Drop for HeadlessSwapchain {
    fn drop(&mut self) {
        // Frames drain their command buffers as they drop.
        self.frames.clear();
        self.device.shared().bump(|s| s.swapchains_destroyed += 1);
    }
}
