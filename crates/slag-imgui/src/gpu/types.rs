//! Plain value types passed across the capability surface.

use bitflags::bitflags;

/// Pixel formats the backend asks for.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum PixelFormat {
    #[default]
    Undefined,
    R8G8B8A8Unorm,
    R8G8B8A8UnormSrgb,
    B8G8R8A8Unorm,
    B8G8R8A8UnormSrgb,
}

impl PixelFormat {
    /// Size of one texel in bytes.
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Undefined => 0,
            _ => 4,
        }
    }
}

/// Image layouts used by barriers and attachments.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TextureLayout {
    Undefined,
    RenderTarget,
    ShaderResource,
    Present,
}

/// Swap behaviour of a swapchain.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum PresentMode {
    Immediate,
    #[default]
    Mailbox,
    Fifo,
}

/// Memory residency of a buffer.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BufferAccess {
    /// Host-visible; `update` writes land directly in GPU-readable memory.
    CpuAndGpu,
    GpuOnly,
}

/// Width of the elements in an index buffer.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum IndexType {
    U16,
    U32,
}

impl IndexType {
    /// Picks the index type matching an index element of `size` bytes.
    pub const fn for_size(size: usize) -> IndexType {
        if size == 2 { IndexType::U16 } else { IndexType::U32 }
    }

    pub const fn size(self) -> usize {
        match self {
            IndexType::U16 => 2,
            IndexType::U32 => 4,
        }
    }
}

/// Queue family a command buffer is recorded for.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum QueueKind {
    Graphics,
    Transfer,
    Compute,
}

/// Vertex attribute component layout.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum VertexFormat {
    Float32x2,
    Float32x4,
    /// Packed 8-bit RGBA read as a single 32-bit value.
    Uint32,
}

/// One attribute of a vertex layout.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct VertexAttribute {
    pub format: VertexFormat,
    pub offset: u32,
    pub location: u32,
}

bitflags! {
    /// How a texture will be used.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TextureUsage: u32 {
        const SAMPLED_IMAGE = 0b0001;
        const STORAGE = 0b0010;
        const RENDER_TARGET = 0b0100;
    }
}

bitflags! {
    /// How a buffer will be bound.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct BufferUsage: u32 {
        const VERTEX_BUFFER = 0b0001;
        const INDEX_BUFFER = 0b0010;
        const UNIFORM_BUFFER = 0b0100;
        const DATA_BUFFER = 0b1000;
    }
}

bitflags! {
    /// Memory access scopes on either side of a barrier.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct BarrierAccess: u32 {
        const NONE = 0;
        const SHADER_READ = 0b0001;
        const SHADER_WRITE = 0b0010;
        const COLOR_ATTACHMENT_READ = 0b0100;
        const COLOR_ATTACHMENT_WRITE = 0b1000;
        const TRANSFER_WRITE = 0b1_0000;
    }
}

bitflags! {
    /// Pipeline stages on either side of a barrier.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PipelineStages: u32 {
        const NONE = 0;
        const VERTEX_SHADER = 0b0001;
        const FRAGMENT_SHADER = 0b0010;
        const COLOR_ATTACHMENT = 0b0100;
        const TRANSFER = 0b1000;
    }
}

bitflags! {
    /// Shader stages a push-constant range is visible to.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ShaderStages: u32 {
        const VERTEX = 0b0001;
        const FRAGMENT = 0b0010;
    }
}

/// Size of a 2D surface in physical pixels.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct Extent2d {
    pub width: u32,
    pub height: u32,
}

impl Extent2d {
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub const fn is_zero(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Scissor rectangle in physical pixels.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct ScissorRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl ScissorRect {
    #[inline]
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Rectangle covering the whole extent.
    #[inline]
    pub const fn full(extent: Extent2d) -> Self {
        Self::new(0, 0, extent.width, extent.height)
    }
}

/// Rasterizer viewport.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct ViewportRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

impl ViewportRect {
    /// Viewport covering the whole extent with the `[0, 1]` depth range.
    pub fn full(extent: Extent2d) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: extent.width as f32,
            height: extent.height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }
}

/// Linear RGBA clear color.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct ClearColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl ClearColor {
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    #[inline]
    pub const fn black() -> Self {
        Self::new(0.0, 0.0, 0.0, 1.0)
    }
}

/// Creation parameters for a texture uploaded from pixels.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct TextureDescriptor {
    pub format: PixelFormat,
    pub width: u32,
    pub height: u32,
    pub mip_levels: u32,
    pub usage: TextureUsage,
    /// Layout the texture is left in after the upload.
    pub initial_layout: TextureLayout,
}

impl TextureDescriptor {
    /// Number of bytes the pixel upload must contain.
    pub fn byte_len(&self) -> usize {
        self.width as usize * self.height as usize * self.format.bytes_per_pixel()
    }
}

/// Creation parameters for a swapchain.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct SwapchainDescriptor {
    pub width: u32,
    pub height: u32,
    pub frames_in_flight: usize,
    pub present_mode: PresentMode,
    pub format: PixelFormat,
}
