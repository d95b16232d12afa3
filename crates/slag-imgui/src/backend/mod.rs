//! Renderer backend: the context object tying the UI library to the GPU.
//!
//! Host side, per frame:
//! 1. `new_frame` with the descriptor pool of the frame being recorded
//! 2. the UI library builds draw data
//! 3. `render_draw_data` for the main window, inside the host's own pass
//! 4. `render_platform_windows` (or the hooks directly) for secondary windows

mod hooks;

use crate::config::BackendConfig;
use crate::error::{BackendError, Result};
use crate::gpu::{
    Api, DescriptorBundle, DescriptorPool, Device, PixelFormat, ShaderPipeline, TextureDescriptor,
    TextureLayout, TextureUsage,
};
use crate::platform::PlatformDescriptor;
use crate::render::{DrawDataTranslator, RenderTarget, TextureRegistry, TranslateStats};
use crate::ui::{BackendFlags, DrawData, Io, TextureId, ViewportId};
use crate::viewport::{SharedSwapchain, ViewportRegistry, ViewportResources};

pub use hooks::ui_frame_resources;

/// Descriptor group of the UI pipeline holding the texture binding.
const TEXTURE_GROUP: u32 = 0;

/// Everything `Backend::init` needs from the host.
pub struct BackendInit<A: Api> {
    pub device: A::Device,
    /// The host's main-window swapchain. The backend never destroys it.
    pub main_swapchain: SharedSwapchain<A>,
    /// Platform of the main window; secondary windows are created on the same one.
    pub platform: PlatformDescriptor,
    /// Pipeline drawing `DrawVert`s with the projection push constants.
    pub pipeline: A::Pipeline,
    pub sampler: A::Sampler,
    /// Format of the back buffers the pipeline renders into.
    pub back_buffer_format: PixelFormat,
    pub config: BackendConfig,
}

/// Renderer backend of one UI context.
///
/// Lives between `init` and `shutdown`. Not thread-safe; keep it next to the UI
/// context.
pub struct Backend<A: Api> {
    device: A::Device,
    pipeline: A::Pipeline,
    sampler: A::Sampler,
    platform: PlatformDescriptor,
    back_buffer_format: PixelFormat,
    config: BackendConfig,

    font_texture: A::Texture,
    font_bundle: Option<A::DescriptorBundle>,
    /// Pool handed to the last `new_frame`.
    descriptor_pool: Option<A::DescriptorPool>,

    textures: TextureRegistry<A>,
    viewports: ViewportRegistry<A>,
}

impl<A: Api> Backend<A> {
    /// Name registered in `Io::backend_renderer_name`.
    pub const RENDERER_NAME: &'static str = "imgui_impl_slag";

    /// Registers the backend with the UI context and uploads the font atlas.
    pub fn init(io: &mut Io, init: BackendInit<A>) -> Result<Self> {
        if let Some(name) = io.backend_renderer_name {
            return Err(BackendError::AlreadyInitialized(name));
        }

        let BackendInit {
            device,
            main_swapchain,
            platform,
            pipeline,
            sampler,
            back_buffer_format,
            config,
        } = init;

        let (pixels, width, height) = io.fonts.tex_data_as_rgba32();
        let desc = TextureDescriptor {
            format: PixelFormat::R8G8B8A8Unorm,
            width,
            height,
            mip_levels: 1,
            usage: TextureUsage::SAMPLED_IMAGE,
            initial_layout: TextureLayout::ShaderResource,
        };
        if pixels.len() != desc.byte_len() {
            return Err(BackendError::InvalidFontAtlas {
                width,
                height,
                len: pixels.len(),
            });
        }
        let font_texture = device.create_texture(&desc, pixels)?;

        let mut viewports = ViewportRegistry::new();
        viewports.insert(ViewportId::MAIN, ViewportResources::borrowed(main_swapchain));

        io.backend_renderer_name = Some(Self::RENDERER_NAME);
        io.backend_flags |= BackendFlags::RENDERER_HAS_VTX_OFFSET | BackendFlags::RENDERER_HAS_VIEWPORTS;
        io.fonts.tex_id = TextureId::FONT;

        log::debug!(
            "{} initialized: font atlas {width}x{height}, platform {}, back buffer {back_buffer_format:?}",
            Self::RENDERER_NAME,
            platform.kind()
        );

        Ok(Self {
            device,
            pipeline,
            sampler,
            platform,
            back_buffer_format,
            config,
            font_texture,
            font_bundle: None,
            descriptor_pool: None,
            textures: TextureRegistry::new(),
            viewports,
        })
    }

    /// Unregisters the backend and releases what it owns.
    ///
    /// Secondary windows still open lose their swapchains; the main swapchain is
    /// only released. No submission using backend resources may be in flight.
    pub fn shutdown(self, io: &mut Io) {
        let Self {
            mut viewports,
            mut textures,
            font_bundle,
            font_texture,
            ..
        } = self;

        let open = viewports.len();
        viewports.clear();
        textures.clear();
        drop(font_bundle);
        drop(font_texture);

        io.backend_renderer_name = None;
        io.backend_flags
            .remove(BackendFlags::RENDERER_HAS_VTX_OFFSET | BackendFlags::RENDERER_HAS_VIEWPORTS);
        io.fonts.tex_id = TextureId::NULL;

        log::debug!("{} shut down ({open} viewports released)", Self::RENDERER_NAME);
    }

    /// Starts a frame bound to `pool`.
    ///
    /// The pool is reset by the host every frame, which invalidates bundles made
    /// from it, so the font bundle is rebuilt on every call.
    pub fn new_frame(&mut self, pool: &A::DescriptorPool) -> Result<()> {
        let group = self
            .pipeline
            .descriptor_group(TEXTURE_GROUP)
            .ok_or(BackendError::MissingDescriptorGroup(TEXTURE_GROUP))?;

        let mut bundle = pool.make_bundle(group)?;
        bundle.set_sampler_and_texture(
            0,
            0,
            &self.font_texture,
            TextureLayout::ShaderResource,
            &self.sampler,
        );

        if self.font_bundle.is_none() {
            log::debug!("font descriptor bundle created");
        }
        self.textures.insert(TextureId::FONT, bundle.clone());
        self.font_bundle = Some(bundle);
        self.descriptor_pool = Some(pool.clone());
        Ok(())
    }

    /// Records `draw_data` into a command buffer the host is already recording.
    ///
    /// Used for the main window: the host owns the pass, barriers and submission.
    pub fn render_draw_data(&mut self, draw_data: &DrawData, target: RenderTarget<'_, A>) -> Result<TranslateStats> {
        let id = draw_data.owner_viewport;
        let resources = self
            .viewports
            .get_mut(id)
            .ok_or(BackendError::UnknownViewport(id))?;

        let translator = DrawDataTranslator::new(&self.device, &self.pipeline, &self.textures);
        let stats = translator.translate(
            draw_data,
            target.command_buffer,
            resources.slot_mut(target.frame_index),
            target.extent,
        )?;

        log::trace!("{id:?} frame {}: {stats:?}", target.frame_index);
        Ok(stats)
    }

    /// Makes a host-owned descriptor bundle drawable under a fresh texture id.
    pub fn register_texture(&mut self, bundle: A::DescriptorBundle) -> TextureId {
        self.textures.register(bundle)
    }

    /// Forgets a host texture. The font binding cannot be removed.
    pub fn unregister_texture(&mut self, id: TextureId) -> Option<A::DescriptorBundle> {
        if id == TextureId::FONT {
            log::warn!("the font texture binding is owned by the backend");
            return None;
        }
        self.textures.remove(id)
    }

    #[inline]
    pub fn font_texture_id(&self) -> TextureId {
        TextureId::FONT
    }

    #[inline]
    pub fn font_texture(&self) -> &A::Texture {
        &self.font_texture
    }

    #[inline]
    pub fn font_bundle(&self) -> Option<&A::DescriptorBundle> {
        self.font_bundle.as_ref()
    }

    #[inline]
    pub fn descriptor_pool(&self) -> Option<&A::DescriptorPool> {
        self.descriptor_pool.as_ref()
    }

    #[inline]
    pub fn viewport(&self, id: ViewportId) -> Option<&ViewportResources<A>> {
        self.viewports.get(id)
    }

    #[inline]
    pub fn viewport_count(&self) -> usize {
        self.viewports.len()
    }

    #[inline]
    pub fn device(&self) -> &A::Device {
        &self.device
    }

    #[inline]
    pub fn config(&self) -> &BackendConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::num::NonZeroIsize;
    use std::rc::Rc;

    use raw_window_handle::{RawDisplayHandle, RawWindowHandle, Win32WindowHandle, WindowsDisplayHandle};

    use super::*;
    use crate::coords::{Rect, Vec2};
    use crate::gpu::{
        CommandBuffer, Extent2d, Frame, FrameResources, GpuResult, PresentMode, QueueKind,
        Swapchain, SwapchainDescriptor,
    };
    use crate::headless::{HeadlessApi, HeadlessDescriptorGroup, HeadlessDevice};
    use crate::platform::NativeHandle;
    use crate::ui::{DrawList, DrawVert, FontAtlas, PlatformViewport};
    use crate::viewport::{RendererHooks, SwapchainSlot};

    type HeadlessBackend = Backend<HeadlessApi>;

    fn platform() -> PlatformDescriptor {
        let mut main = Win32WindowHandle::new(NonZeroIsize::new(0x10).unwrap());
        main.hinstance = NonZeroIsize::new(0x400000);
        PlatformDescriptor::new(
            RawWindowHandle::Win32(main),
            RawDisplayHandle::Windows(WindowsDisplayHandle::new()),
        )
    }

    fn io() -> Io {
        Io::new(FontAtlas::new(4, 2, vec![0xff; 4 * 2 * 4]))
    }

    fn main_swapchain(device: &HeadlessDevice) -> SharedSwapchain<HeadlessApi> {
        let target = platform().target_for(NativeHandle(0x10)).unwrap();
        let swapchain = device
            .create_swapchain(
                &target,
                &SwapchainDescriptor {
                    width: 320,
                    height: 200,
                    frames_in_flight: 2,
                    present_mode: PresentMode::Fifo,
                    format: PixelFormat::B8G8R8A8Unorm,
                },
                Box::new(|_: usize, d: &HeadlessDevice| -> GpuResult<FrameResources<HeadlessApi>> {
                    Ok(FrameResources::with_descriptor_pool(
                        d.create_command_buffer(QueueKind::Graphics)?,
                        d.create_descriptor_pool()?,
                    ))
                }),
            )
            .unwrap();
        Rc::new(RefCell::new(swapchain))
    }

    fn parts(device: &HeadlessDevice, main: SharedSwapchain<HeadlessApi>, groups: usize) -> BackendInit<HeadlessApi> {
        BackendInit {
            device: device.clone(),
            main_swapchain: main,
            platform: platform(),
            pipeline: device.create_pipeline(
                vec![HeadlessDescriptorGroup::new(1); groups],
                &DrawVert::ATTRIBUTES,
                DrawVert::STRIDE,
            ),
            sampler: device.create_sampler(),
            back_buffer_format: PixelFormat::B8G8R8A8Unorm,
            config: BackendConfig::default(),
        }
    }

    fn init(device: &HeadlessDevice, io: &mut Io) -> HeadlessBackend {
        Backend::init(io, parts(device, main_swapchain(device), 1)).unwrap()
    }

    fn window(id: u32, width: f32, height: f32) -> PlatformViewport {
        PlatformViewport::new(ViewportId(id), NativeHandle(0x100 + id as usize), Vec2::zero(), Vec2::new(width, height))
    }

    // ── init / shutdown ───────────────────────────────────────────────────

    #[test]
    fn init_registers_with_io() {
        let device = HeadlessDevice::new();
        let mut io = io();
        let backend = init(&device, &mut io);

        assert_eq!(io.backend_renderer_name, Some(HeadlessBackend::RENDERER_NAME));
        assert!(io.backend_flags.contains(BackendFlags::RENDERER_HAS_VTX_OFFSET | BackendFlags::RENDERER_HAS_VIEWPORTS));
        assert_eq!(io.fonts.tex_id, TextureId::FONT);
        assert_eq!(backend.font_texture().descriptor().width, 4);
        assert_eq!(backend.font_texture().pixels().len(), 32);
        assert!(backend.viewport(ViewportId::MAIN).unwrap().swapchain().is_borrowed());
    }

    #[test]
    fn second_init_fails_without_allocating() {
        let device = HeadlessDevice::new();
        let mut io = io();
        let _backend = init(&device, &mut io);

        let again = parts(&device, main_swapchain(&device), 1);
        let before = device.stats();
        let err = Backend::init(&mut io, again).err().unwrap();

        assert!(matches!(err, BackendError::AlreadyInitialized("imgui_impl_slag")));
        assert_eq!(device.stats().textures_created, before.textures_created);
    }

    #[test]
    fn bad_font_atlas_is_rejected() {
        let device = HeadlessDevice::new();
        let mut io = Io::new(FontAtlas::new(4, 4, vec![0; 10]));
        let err = Backend::init(&mut io, parts(&device, main_swapchain(&device), 1)).err().unwrap();

        assert!(matches!(err, BackendError::InvalidFontAtlas { width: 4, height: 4, len: 10 }));
        assert_eq!(io.backend_renderer_name, None);
    }

    #[test]
    fn font_upload_failure_surfaces() {
        let device = HeadlessDevice::new();
        let mut io = io();
        let init = parts(&device, main_swapchain(&device), 1);

        device.fail_next_allocation();
        let err = Backend::init(&mut io, init).err().unwrap();

        assert!(matches!(err, BackendError::Gpu(crate::gpu::GpuError::OutOfMemory { what: "texture" })));
        assert_eq!(io.backend_renderer_name, None);
        assert_eq!(io.fonts.tex_id, TextureId::NULL);
    }

    #[test]
    fn shutdown_releases_font_and_clears_io() {
        let device = HeadlessDevice::new();
        let mut io = io();
        let main = main_swapchain(&device);
        let backend = Backend::init(&mut io, parts(&device, main.clone(), 1)).unwrap();
        let live = device.stats().live_textures();

        backend.shutdown(&mut io);

        assert_eq!(io.backend_renderer_name, None);
        assert!(!io.backend_flags.intersects(BackendFlags::RENDERER_HAS_VTX_OFFSET | BackendFlags::RENDERER_HAS_VIEWPORTS));
        assert_eq!(io.fonts.tex_id, TextureId::NULL);
        // Font gone, main swapchain back buffers untouched.
        assert_eq!(device.stats().live_textures(), live - 1);
        assert_eq!(device.stats().swapchains_destroyed, 0);
        assert_eq!(Rc::strong_count(&main), 1);

        let _again = init(&device, &mut io);
    }

    // ── new_frame ─────────────────────────────────────────────────────────

    #[test]
    fn new_frame_builds_font_bundle() {
        let device = HeadlessDevice::new();
        let mut io = io();
        let mut backend = init(&device, &mut io);
        let pool = device.create_descriptor_pool().unwrap();

        assert!(backend.font_bundle().is_none());
        backend.new_frame(&pool).unwrap();

        let bundle = backend.font_bundle().unwrap();
        let bindings = bundle.bindings();
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].texture, backend.font_texture().id());
        assert_eq!(bindings[0].layout, TextureLayout::ShaderResource);
        assert_eq!(bundle.pool_id(), pool.id());
    }

    #[test]
    fn new_frame_rebuilds_after_pool_reset() {
        let device = HeadlessDevice::new();
        let mut io = io();
        let mut backend = init(&device, &mut io);
        let pool = device.create_descriptor_pool().unwrap();

        backend.new_frame(&pool).unwrap();
        let first = backend.font_bundle().unwrap().id();

        pool.reset();
        assert!(!backend.font_bundle().unwrap().is_valid());
        backend.new_frame(&pool).unwrap();

        let bundle = backend.font_bundle().unwrap();
        assert_ne!(bundle.id(), first);
        assert!(bundle.is_valid());
        assert_eq!(bundle.generation(), 1);
        assert_eq!(device.stats().bundles_created, 2);
    }

    #[test]
    fn new_frame_needs_texture_group() {
        let device = HeadlessDevice::new();
        let mut io = io();
        let mut backend = Backend::init(&mut io, parts(&device, main_swapchain(&device), 0)).unwrap();
        let pool = device.create_descriptor_pool().unwrap();

        let err = backend.new_frame(&pool).unwrap_err();
        assert!(matches!(err, BackendError::MissingDescriptorGroup(0)));
    }

    // ── textures ──────────────────────────────────────────────────────────

    #[test]
    fn registered_textures_are_drawable() {
        let device = HeadlessDevice::new();
        let mut io = io();
        let mut backend = init(&device, &mut io);
        let pool = device.create_descriptor_pool().unwrap();
        backend.new_frame(&pool).unwrap();

        let user = backend.register_texture(pool.make_bundle(&HeadlessDescriptorGroup::new(1)).unwrap());
        assert_ne!(user, backend.font_texture_id());

        let mut data = DrawData::new(ViewportId::MAIN, Vec2::zero(), Vec2::new(320.0, 200.0));
        let mut list = DrawList::new();
        list.add_rect(Rect::new(0.0, 0.0, 8.0, 8.0), Rect::default(), 0, Rect::from_size(320.0, 200.0), user);
        data.draw_lists.push(list);

        let mut cmd = device.create_command_buffer(QueueKind::Graphics).unwrap();
        cmd.begin().unwrap();
        let stats = backend
            .render_draw_data(&data, RenderTarget::new(&mut cmd, 0, Extent2d::new(320, 200)))
            .unwrap();
        assert_eq!(stats.draws, 1);

        assert!(backend.unregister_texture(user).is_some());
        assert!(backend.unregister_texture(TextureId::FONT).is_none());
        let stats = backend
            .render_draw_data(&data, RenderTarget::new(&mut cmd, 0, Extent2d::new(320, 200)))
            .unwrap();
        assert_eq!(stats.skipped_texture, 1);
    }

    #[test]
    fn render_draw_data_requires_known_viewport() {
        let device = HeadlessDevice::new();
        let mut io = io();
        let mut backend = init(&device, &mut io);
        let mut cmd = device.create_command_buffer(QueueKind::Graphics).unwrap();

        let data = DrawData::new(ViewportId(7), Vec2::zero(), Vec2::new(1.0, 1.0));
        let err = backend
            .render_draw_data(&data, RenderTarget::new(&mut cmd, 0, Extent2d::new(1, 1)))
            .unwrap_err();
        assert!(matches!(err, BackendError::UnknownViewport(ViewportId(7))));
    }

    // ── hooks ─────────────────────────────────────────────────────────────

    #[test]
    fn create_window_builds_owned_swapchain() {
        let device = HeadlessDevice::new();
        let mut io = io();
        let mut backend = init(&device, &mut io);

        backend.create_window(&window(2, 640.0, 480.0)).unwrap();

        let resources = backend.viewport(ViewportId(2)).unwrap();
        let SwapchainSlot::Owned(sc) = resources.swapchain() else {
            panic!("secondary window must own its swapchain");
        };
        assert_eq!((sc.width(), sc.height()), (640, 480));
        assert_eq!(sc.frame_count(), 3);
        assert_eq!(sc.present_mode(), PresentMode::Mailbox);
        assert_eq!(sc.format(), PixelFormat::B8G8R8A8Unorm);
        assert_eq!(resources.slots().len(), 3);
        assert!(sc.frames().iter().all(|f| f.resources().descriptor_pool.is_none()));
    }

    #[test]
    fn create_window_rejects_null_handle() {
        let device = HeadlessDevice::new();
        let mut io = io();
        let mut backend = init(&device, &mut io);

        let mut w = window(2, 10.0, 10.0);
        w.native_handle = NativeHandle(0);
        assert!(matches!(backend.create_window(&w), Err(BackendError::InvalidNativeHandle(0))));
        assert!(backend.viewport(ViewportId(2)).is_none());
    }

    #[test]
    fn destroy_window_is_idempotent() {
        let device = HeadlessDevice::new();
        let mut io = io();
        let mut backend = init(&device, &mut io);
        let w = window(2, 64.0, 64.0);

        backend.create_window(&w).unwrap();
        backend.destroy_window(&w).unwrap();
        backend.destroy_window(&w).unwrap();

        assert_eq!(device.stats().swapchains_destroyed, 1);
        assert_eq!(backend.viewport_count(), 1);
    }

    #[test]
    fn resize_and_create_agree_on_pixel_size() {
        let device = HeadlessDevice::new();
        let mut io = io();
        let mut backend = init(&device, &mut io);
        let w = window(2, 64.9, -3.0);
        backend.create_window(&w).unwrap();
        backend.set_window_size(&w, Vec2::new(-1.0, 48.6)).unwrap();

        let SwapchainSlot::Owned(sc) = backend.viewport(ViewportId(2)).unwrap().swapchain() else {
            panic!("secondary window must own its swapchain");
        };
        assert_eq!(w.pixel_size(), (64, 0));
        assert_eq!((sc.width(), sc.height()), PlatformViewport::size_in_pixels(Vec2::new(-1.0, 48.6)));
        assert_eq!((sc.width(), sc.height()), (0, 48));
    }

    #[test]
    fn hooks_on_unknown_viewport_fail() {
        let device = HeadlessDevice::new();
        let mut io = io();
        let mut backend = init(&device, &mut io);
        let w = window(9, 64.0, 64.0);

        assert!(matches!(backend.render_window(&w), Err(BackendError::UnknownViewport(_))));
        assert!(matches!(backend.swap_buffers(&w), Err(BackendError::UnknownViewport(_))));
        assert!(matches!(
            backend.set_window_size(&w, Vec2::new(1.0, 1.0)),
            Err(BackendError::UnknownViewport(_))
        ));
    }

    #[test]
    fn busy_main_swapchain_is_skipped() {
        let device = HeadlessDevice::new();
        let mut io = io();
        let main = main_swapchain(&device);
        let mut backend = Backend::init(&mut io, parts(&device, main.clone(), 1)).unwrap();
        let main_vp = PlatformViewport::new(ViewportId::MAIN, NativeHandle(0x10), Vec2::zero(), Vec2::new(320.0, 200.0));

        let held = main.borrow_mut();
        backend.render_window(&main_vp).unwrap();
        backend.swap_buffers(&main_vp).unwrap();
        backend.set_window_size(&main_vp, Vec2::new(64.0, 64.0)).unwrap();
        drop(held);

        assert_eq!(main.borrow().present_count(), 0);
        assert_eq!(main.borrow().width(), 320);
        assert!(device.queue().submissions().is_empty());

        backend.swap_buffers(&main_vp).unwrap();
        assert_eq!(main.borrow().present_count(), 1);
    }
}
