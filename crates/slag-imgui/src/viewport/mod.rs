//! Per-window renderer state and the lifecycle hooks driving it.

mod hooks;
mod registry;

pub use hooks::{render_platform_windows, RendererHooks};
pub use registry::{SharedSwapchain, SwapchainSlot, ViewportRegistry, ViewportResources};
