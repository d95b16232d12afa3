use crate::coords::Vec2;
use crate::error::{BackendError, Result};
use crate::gpu::{
    Api, Attachment, BarrierAccess, ClearColor, CommandBuffer, Device, Frame, FrameResources,
    FrameTarget, GpuResult, ImageBarrier, PipelineStages, Queue, QueueKind, ScissorRect,
    Swapchain, SwapchainDescriptor, Texture, TextureLayout,
};
use crate::render::{DrawDataTranslator, FrameSlots, TranslateStats};
use crate::ui::PlatformViewport;
use crate::viewport::{RendererHooks, ViewportResources};

use super::Backend;

/// Frame resources of a secondary window: one graphics command buffer.
///
/// Secondary windows bind the backend's shared descriptor pool, so they get no
/// pool of their own.
pub fn ui_frame_resources<A: Api>(frame_index: usize, device: &A::Device) -> GpuResult<FrameResources<A>> {
    log::trace!("frame resources for slot {frame_index}");
    Ok(FrameResources::new(device.create_command_buffer(QueueKind::Graphics)?))
}

/// Borrowed backend state needed to record one window.
struct WindowRecorder<'a, A: Api> {
    device: &'a A::Device,
    translator: DrawDataTranslator<'a, A>,
    descriptor_pool: Option<&'a A::DescriptorPool>,
    clear: ClearColor,
}

impl<A: Api> WindowRecorder<'_, A> {
    /// Records and submits one frame. `None` when the swapchain has no frame.
    fn record(
        &self,
        viewport: &PlatformViewport,
        swapchain: &mut A::Swapchain,
        slots: &mut FrameSlots<A>,
    ) -> Result<Option<TranslateStats>> {
        let extent = swapchain.extent();
        let frame_index = swapchain.current_frame_index();
        let Some(frame) = swapchain.current_frame() else {
            return Ok(None);
        };

        let FrameTarget { back_buffer, resources } = frame.target_mut();
        let cmd = &mut resources.command_buffer;

        cmd.begin()?;
        if let Some(pool) = self.descriptor_pool {
            cmd.bind_descriptor_pool(pool);
        }

        cmd.insert_barrier(&ImageBarrier {
            texture: back_buffer,
            old_layout: TextureLayout::Undefined,
            new_layout: TextureLayout::RenderTarget,
            access_before: BarrierAccess::NONE,
            access_after: BarrierAccess::COLOR_ATTACHMENT_WRITE,
            sync_before: PipelineStages::NONE,
            sync_after: PipelineStages::COLOR_ATTACHMENT,
        });

        // Clear pass; the UI draws record outside it.
        let area = ScissorRect::new(0, 0, back_buffer.width(), back_buffer.height());
        cmd.begin_rendering(
            &[Attachment {
                texture: back_buffer,
                layout: TextureLayout::RenderTarget,
                clear_on_load: true,
                clear: self.clear,
            }],
            None,
            area,
        );
        cmd.end_rendering();

        let stats = self
            .translator
            .translate(&viewport.draw_data, cmd, slots.slot_mut(frame_index), extent)?;

        cmd.insert_barrier(&ImageBarrier {
            texture: back_buffer,
            old_layout: TextureLayout::RenderTarget,
            new_layout: TextureLayout::Present,
            access_before: BarrierAccess::COLOR_ATTACHMENT_WRITE,
            access_after: BarrierAccess::NONE,
            sync_before: PipelineStages::COLOR_ATTACHMENT,
            sync_after: PipelineStages::NONE,
        });
        cmd.end()?;

        let frame: &A::Frame = frame;
        self.device
            .graphics_queue()
            .submit(&[&frame.resources().command_buffer], Some(frame))?;

        Ok(Some(stats))
    }
}

impl<A: Api> RendererHooks for Backend<A> {
    fn create_window(&mut self, viewport: &PlatformViewport) -> Result<()> {
        let target = self.platform.target_for(viewport.native_handle)?;
        let (width, height) = viewport.pixel_size();
        let desc = SwapchainDescriptor {
            width,
            height,
            frames_in_flight: self.config.frames_in_flight,
            present_mode: self.config.present_mode,
            format: self.back_buffer_format,
        };

        let swapchain = self
            .device
            .create_swapchain(&target, &desc, Box::new(ui_frame_resources::<A>))?;

        if self
            .viewports
            .insert(viewport.id, ViewportResources::owned(swapchain))
            .is_some()
        {
            log::warn!("{:?} created twice; previous resources released", viewport.id);
        }
        log::debug!("{:?} created: {width}x{height}, {} frames", viewport.id, desc.frames_in_flight);
        Ok(())
    }

    fn destroy_window(&mut self, viewport: &PlatformViewport) -> Result<()> {
        let Some(mut resources) = self.viewports.remove(viewport.id) else {
            return Ok(());
        };

        // A borrowed swapchain outlives this entry: its frames must finish
        // before the slot buffers they read from are released.
        let borrowed = resources.swapchain().is_borrowed();
        if borrowed
            && resources
                .swapchain_mut()
                .with_mut(|sc| sc.wait_idle())
                .is_none()
        {
            log::warn!("{:?}: swapchain busy, destroying without waiting for its frames", viewport.id);
        }
        drop(resources);
        log::debug!("{:?} destroyed (swapchain borrowed: {borrowed})", viewport.id);
        Ok(())
    }

    fn set_window_size(&mut self, viewport: &PlatformViewport, size: Vec2) -> Result<()> {
        let id = viewport.id;
        let resources = self
            .viewports
            .get_mut(id)
            .ok_or(BackendError::UnknownViewport(id))?;

        let (width, height) = PlatformViewport::size_in_pixels(size);
        if resources
            .swapchain_mut()
            .with_mut(|sc| sc.resize(width, height))
            .is_none()
        {
            log::warn!("{id:?}: swapchain busy, resize to {width}x{height} skipped");
        }
        Ok(())
    }

    fn render_window(&mut self, viewport: &PlatformViewport) -> Result<()> {
        let id = viewport.id;
        let resources = self
            .viewports
            .get_mut(id)
            .ok_or(BackendError::UnknownViewport(id))?;

        let recorder = WindowRecorder {
            device: &self.device,
            translator: DrawDataTranslator::new(&self.device, &self.pipeline, &self.textures),
            descriptor_pool: self.descriptor_pool.as_ref(),
            clear: self.config.clear_color,
        };

        let (swapchain, slots) = resources.split_mut();
        let recorded = swapchain
            .with_mut(|sc| recorder.record(viewport, sc, slots))
            .transpose()?;

        match recorded {
            None => log::warn!("{id:?}: swapchain busy, render skipped"),
            Some(None) => log::trace!("{id:?}: no frame available"),
            Some(Some(stats)) => log::trace!("{id:?}: {stats:?}"),
        }
        Ok(())
    }

    fn swap_buffers(&mut self, viewport: &PlatformViewport) -> Result<()> {
        let id = viewport.id;
        let resources = self
            .viewports
            .get_mut(id)
            .ok_or(BackendError::UnknownViewport(id))?;

        if resources.swapchain_mut().with_mut(|sc| sc.next().is_some()).is_none() {
            log::warn!("{id:?}: swapchain busy, present skipped");
        }
        Ok(())
    }
}
