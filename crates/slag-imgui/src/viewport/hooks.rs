use crate::coords::Vec2;
use crate::error::Result;
use crate::ui::{PlatformViewport, ViewportId};

/// Renderer side of the UI library's multi-viewport contract.
///
/// The UI platform layer calls these as OS windows come and go. Every hook
/// receives the platform viewport it concerns.
pub trait RendererHooks {
    /// A window was opened; create its swapchain.
    fn create_window(&mut self, viewport: &PlatformViewport) -> Result<()>;

    /// A window is closing; release everything held for it. Unknown windows are ignored.
    fn destroy_window(&mut self, viewport: &PlatformViewport) -> Result<()>;

    /// The window was resized. `(0, 0)` means minimized.
    fn set_window_size(&mut self, viewport: &PlatformViewport, size: Vec2) -> Result<()>;

    /// Record and submit the viewport's draw data.
    fn render_window(&mut self, viewport: &PlatformViewport) -> Result<()>;

    /// Present and move to the next frame.
    fn swap_buffers(&mut self, viewport: &PlatformViewport) -> Result<()>;
}

/// Renders then presents every secondary viewport, in that order.
///
/// The main viewport is skipped; the host renders it itself.
pub fn render_platform_windows(hooks: &mut dyn RendererHooks, viewports: &[PlatformViewport]) -> Result<()> {
    let secondary = || viewports.iter().filter(|v| v.id != ViewportId::MAIN);

    for viewport in secondary() {
        hooks.render_window(viewport)?;
    }
    for viewport in secondary() {
        hooks.swap_buffers(viewport)?;
    }
    Ok(())
}
