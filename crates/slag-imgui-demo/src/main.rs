use std::cell::RefCell;
use std::num::NonZeroIsize;
use std::rc::Rc;

use anyhow::{Context, Result};
use raw_window_handle::{RawDisplayHandle, RawWindowHandle, Win32WindowHandle, WindowsDisplayHandle};

use slag_imgui::coords::{Rect, Vec2};
use slag_imgui::gpu::{
    Attachment, BarrierAccess, ClearColor, CommandBuffer, DescriptorPool, Device, Frame,
    FrameResources, FrameTarget, GpuResult, ImageBarrier, PipelineStages, PixelFormat,
    PresentMode, Queue, QueueKind, ScissorRect, Swapchain, SwapchainDescriptor, TextureLayout,
};
use slag_imgui::headless::{HeadlessApi, HeadlessDescriptorGroup, HeadlessDevice, HeadlessFrame};
use slag_imgui::logging::{init_logging, LoggingConfig};
use slag_imgui::platform::{NativeHandle, PlatformDescriptor};
use slag_imgui::render::RenderTarget;
use slag_imgui::ui::{DrawCallback, DrawData, DrawList, DrawVert, FontAtlas, Io, PlatformViewport, TextureId, ViewportId};
use slag_imgui::viewport::{render_platform_windows, SharedSwapchain};
use slag_imgui::{Backend, BackendConfig, BackendInit, RendererHooks};

const FRAMES: usize = 8;
const MAIN_SIZE: (u32, u32) = (1280, 720);
const MAIN_HWND: usize = 0x1000;
const TOOL_HWND: usize = 0x2000;
const TOOL_ID: ViewportId = ViewportId(0x2222);

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let device = HeadlessDevice::new();
    let platform = win32_platform(MAIN_HWND)?;

    let main_swapchain = create_main_swapchain(&device, &platform)?;
    let mut io = Io::new(checker_atlas(64, 64));

    let mut backend = Backend::init(
        &mut io,
        BackendInit {
            device: device.clone(),
            main_swapchain: main_swapchain.clone(),
            platform,
            pipeline: device.create_pipeline(
                vec![HeadlessDescriptorGroup::new(1)],
                &DrawVert::ATTRIBUTES,
                DrawVert::STRIDE,
            ),
            sampler: device.create_sampler(),
            back_buffer_format: PixelFormat::B8G8R8A8Unorm,
            config: BackendConfig::default(),
        },
    )
    .context("initializing UI backend")?;
    log::info!("{} ready", Backend::<HeadlessApi>::RENDERER_NAME);

    let main_size = Vec2::new(MAIN_SIZE.0 as f32, MAIN_SIZE.1 as f32);
    let mut viewports = vec![PlatformViewport::new(
        ViewportId::MAIN,
        NativeHandle(MAIN_HWND),
        Vec2::zero(),
        main_size,
    )];

    for frame in 0..FRAMES {
        // ── platform events ───────────────────────────────────────────────
        match frame {
            1 => {
                let tool = PlatformViewport::new(
                    TOOL_ID,
                    NativeHandle(TOOL_HWND),
                    Vec2::new(1400.0, 120.0),
                    Vec2::new(360.0, 240.0),
                );
                backend.create_window(&tool).context("opening tool window")?;
                viewports.push(tool);
            }
            3 => resize_tool(&mut backend, &mut viewports, Vec2::zero())?,
            4 => resize_tool(&mut backend, &mut viewports, Vec2::new(420.0, 260.0))?,
            f if f == FRAMES - 1 => {
                if let Some(pos) = viewports.iter().position(|v| v.id == TOOL_ID) {
                    let tool = viewports.remove(pos);
                    backend.destroy_window(&tool).context("closing tool window")?;
                }
            }
            _ => {}
        }

        // ── UI ────────────────────────────────────────────────────────────
        for viewport in &mut viewports {
            viewport.draw_data = build_panel(viewport, frame);
        }

        render_main_window(&device, &main_swapchain, &mut backend, &viewports[0].draw_data)
            .with_context(|| format!("rendering main window, frame {frame}"))?;
        render_platform_windows(&mut backend, &viewports)
            .with_context(|| format!("rendering secondary windows, frame {frame}"))?;

        main_swapchain.borrow_mut().next();
        log::info!("frame {frame}: {} window(s)", viewports.len());
    }

    backend.shutdown(&mut io);

    let stats = device.stats();
    println!();
    println!("  slag-imgui headless run: {FRAMES} frames");
    println!("  submissions      {}", stats.submissions);
    println!("  buffers          {} created, {} live", stats.buffers_created, stats.live_buffers());
    println!("  textures         {} created, {} live", stats.textures_created, stats.live_textures());
    println!("  swapchains       {} created, {} live", stats.swapchains_created, stats.live_swapchains());
    println!("  bundles          {}", stats.bundles_created);
    println!("  present count    {}", main_swapchain.borrow().present_count());
    println!();
    Ok(())
}

fn win32_platform(hwnd: usize) -> Result<PlatformDescriptor> {
    let hwnd = NonZeroIsize::new(hwnd as isize).context("null main window handle")?;
    let mut window = Win32WindowHandle::new(hwnd);
    window.hinstance = NonZeroIsize::new(0x40_0000);
    Ok(PlatformDescriptor::new(
        RawWindowHandle::Win32(window),
        RawDisplayHandle::Windows(WindowsDisplayHandle::new()),
    ))
}

fn create_main_swapchain(device: &HeadlessDevice, platform: &PlatformDescriptor) -> Result<SharedSwapchain<HeadlessApi>> {
    let target = platform
        .target_for(NativeHandle(MAIN_HWND))
        .context("main window target")?;

    // Main-window frames own a descriptor pool; the backend binds it each frame.
    let factory = |_: usize, d: &HeadlessDevice| -> GpuResult<FrameResources<HeadlessApi>> {
        Ok(FrameResources::with_descriptor_pool(
            d.create_command_buffer(QueueKind::Graphics)?,
            d.create_descriptor_pool()?,
        ))
    };

    let swapchain = device
        .create_swapchain(
            &target,
            &SwapchainDescriptor {
                width: MAIN_SIZE.0,
                height: MAIN_SIZE.1,
                frames_in_flight: 3,
                present_mode: PresentMode::Mailbox,
                format: PixelFormat::B8G8R8A8Unorm,
            },
            Box::new(factory),
        )
        .context("creating main swapchain")?;
    Ok(Rc::new(RefCell::new(swapchain)))
}

fn render_main_window(
    device: &HeadlessDevice,
    swapchain: &SharedSwapchain<HeadlessApi>,
    backend: &mut Backend<HeadlessApi>,
    draw_data: &DrawData,
) -> Result<()> {
    let mut swapchain = swapchain.borrow_mut();
    let extent = swapchain.extent();
    let frame_index = swapchain.current_frame_index();
    let frame = swapchain.current_frame().context("main window has no frame")?;

    let FrameTarget { back_buffer, resources } = frame.target_mut();
    let pool = resources
        .descriptor_pool
        .clone()
        .context("main frame without descriptor pool")?;
    pool.reset();
    backend.new_frame(&pool)?;

    let cmd = &mut resources.command_buffer;
    cmd.begin()?;
    cmd.bind_descriptor_pool(&pool);
    cmd.insert_barrier(&ImageBarrier {
        texture: back_buffer,
        old_layout: TextureLayout::Undefined,
        new_layout: TextureLayout::RenderTarget,
        access_before: BarrierAccess::NONE,
        access_after: BarrierAccess::COLOR_ATTACHMENT_WRITE,
        sync_before: PipelineStages::NONE,
        sync_after: PipelineStages::COLOR_ATTACHMENT,
    });
    cmd.begin_rendering(
        &[Attachment {
            texture: back_buffer,
            layout: TextureLayout::RenderTarget,
            clear_on_load: true,
            clear: ClearColor::new(0.45, 0.55, 0.60, 1.0),
        }],
        None,
        ScissorRect::full(extent),
    );
    let stats = backend.render_draw_data(draw_data, RenderTarget::new(cmd, frame_index, extent))?;
    cmd.end_rendering();
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

    let frame: &HeadlessFrame = frame;
    device
        .graphics_queue()
        .submit(&[&frame.resources().command_buffer], Some(frame))?;

    log::debug!("main window: {stats:?}");
    Ok(())
}

fn resize_tool(backend: &mut Backend<HeadlessApi>, viewports: &mut [PlatformViewport], size: Vec2) -> Result<()> {
    let Some(tool) = viewports.iter_mut().find(|v| v.id == TOOL_ID) else {
        return Ok(());
    };
    tool.size = size;
    backend.set_window_size(tool, size).context("resizing tool window")?;
    Ok(())
}

/// Stand-in for the UI library: a window background, a title bar and a few
/// glyph quads, with one render-state reset in between.
fn build_panel(viewport: &PlatformViewport, frame: usize) -> DrawData {
    let mut data = DrawData::new(viewport.id, viewport.pos, viewport.size);
    let origin = viewport.pos;
    let clip = Rect::from_min_max(origin, origin + viewport.size);
    let white_uv = Rect::new(0.0, 0.0, 0.01, 0.01);

    let mut background = DrawList::new();
    background.add_rect(clip, white_uv, 0xf0_20_20_20, clip, TextureId::FONT);
    let title = Rect::from_min_max(origin, origin + Vec2::new(viewport.size.x, 19.0));
    background.add_rect(title, white_uv, 0xff_6a_40_29, clip, TextureId::FONT);

    let mut text = DrawList::new();
    let body = Rect::from_min_max(origin + Vec2::new(8.0, 24.0), origin + viewport.size - Vec2::splat(8.0));
    for i in 0..(4 + frame % 3) {
        let x = body.min.x + i as f32 * 7.0;
        let glyph = Rect::new(x, body.min.y, x + 6.0, body.min.y + 13.0);
        text.add_rect(glyph, Rect::new(0.0, 0.0, 0.1, 0.2), 0xff_ff_ff_ff, body, TextureId::FONT);
    }
    text.add_callback(DrawCallback::ResetRenderState);
    let footer = Rect::new(body.min.x, body.max.y - 13.0, body.min.x + 40.0, body.max.y);
    text.add_rect(footer, white_uv, 0xff_80_80_80, body, TextureId::FONT);

    data.draw_lists = vec![background, text];
    data
}

/// RGBA checkerboard standing in for a rasterized font atlas.
fn checker_atlas(width: u32, height: u32) -> FontAtlas {
    let mut pixels = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            let v = if (x / 8 + y / 8) % 2 == 0 { 0xff } else { 0x00 };
            pixels.extend_from_slice(&[0xff, 0xff, 0xff, v]);
        }
    }
    FontAtlas::new(width, height, pixels)
}
