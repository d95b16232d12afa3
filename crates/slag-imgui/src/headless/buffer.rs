use std::rc::Rc;

use crate::gpu::{Buffer, BufferAccess, BufferUsage, GpuError, GpuResult, Texture, TextureDescriptor};

use super::device::DeviceShared;

/// Host-memory buffer.
#[derive(Debug)]
pub struct HeadlessBuffer {
    id: u64,
    access: BufferAccess,
    usage: BufferUsage,
    bytes: Vec<u8>,
    shared: Rc<DeviceShared>,
}

impl HeadlessBuffer {
    pub(super) fn new(shared: Rc<DeviceShared>, size: u64, access: BufferAccess, usage: BufferUsage) -> Self {
        Self {
            id: shared.next_id(),
            access,
            usage,
            bytes: vec![0; size as usize],
            shared,
        }
    }

    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[inline]
    pub fn access(&self) -> BufferAccess {
        self.access
    }

    #[inline]
    pub fn usage(&self) -> BufferUsage {
        self.usage
    }

    #[inline]
    pub fn contents(&self) -> &[u8] {
        &self.bytes
    }
}

impl Buffer for HeadlessBuffer {
    fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    fn update(&mut self, offset: u64, data: &[u8]) -> GpuResult<()> {
        let size = self.size();
        let len = data.len() as u64;
        if offset.checked_add(len).is_none_or(|end| end > size) {
            return Err(GpuError::OutOfBounds { offset, len, size });
        }
        if self.access == BufferAccess::GpuOnly {
            return Err(GpuError::InvalidState("update of a GPU-only buffer"));
        }

        let start = offset as usize;
        self.bytes[start..start + data.len()].copy_from_slice(data);
        Ok(())
    }
}

impl Drop for HeadlessBuffer {
    fn drop(&mut self) {
        self.shared.bump(|s| s.buffers_destroyed += 1);
    }
}

/// Texture keeping its description and uploaded pixels.
#[derive(Debug)]
pub struct HeadlessTexture {
    id: u64,
    desc: TextureDescriptor,
    pixels: Vec<u8>,
    shared: Rc<DeviceShared>,
}

impl HeadlessTexture {
    pub(super) fn new(shared: Rc<DeviceShared>, desc: TextureDescriptor, pixels: Vec<u8>) -> Self {
        Self {
            id: shared.next_id(),
            desc,
            pixels,
            shared,
        }
    }

    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[inline]
    pub fn descriptor(&self) -> &TextureDescriptor {
        &self.desc
    }

    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

impl Texture for HeadlessTexture {
    fn width(&self) -> u32 {
        self.desc.width
    }

    fn height(&self) -> u32 {
        self.desc.height
    }
}

impl Drop for HeadlessTexture {
    fn drop(&mut self) {
        self.shared.bump(|s| s.textures_destroyed += 1);
    }
}

/// Sampler handle.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct HeadlessSampler {
    id: u64,
}

impl HeadlessSampler {
    pub(super) fn new(id: u64) -> Self {
        Self { id }
    }

    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }
}
