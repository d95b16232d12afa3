use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::gpu::{
    DescriptorBundle, DescriptorPool, GpuResult, ShaderPipeline, TextureLayout, VertexAttribute,
};

use super::device::DeviceShared;
use super::{HeadlessApi, HeadlessSampler, HeadlessTexture};

/// Layout of one descriptor group: how many bindings it declares.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct HeadlessDescriptorGroup {
    pub binding_count: u32,
}

impl HeadlessDescriptorGroup {
    pub const fn new(binding_count: u32) -> Self {
        Self { binding_count }
    }
}

#[derive(Debug)]
struct PipelineInner {
    id: u64,
    groups: Vec<HeadlessDescriptorGroup>,
    attributes: Vec<VertexAttribute>,
    stride: u64,
}

/// Pipeline handle describing descriptor groups and vertex layout.
#[derive(Debug, Clone)]
pub struct HeadlessPipeline {
    inner: Rc<PipelineInner>,
}

impl HeadlessPipeline {
    pub(super) fn new(
        id: u64,
        groups: Vec<HeadlessDescriptorGroup>,
        attributes: Vec<VertexAttribute>,
        stride: u64,
    ) -> Self {
        Self {
            inner: Rc::new(PipelineInner {
                id,
                groups,
                attributes,
                stride,
            }),
        }
    }

    #[inline]
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    pub fn vertex_attributes(&self) -> &[VertexAttribute] {
        &self.inner.attributes
    }

    pub fn vertex_stride(&self) -> u64 {
        self.inner.stride
    }
}

impl ShaderPipeline<HeadlessApi> for HeadlessPipeline {
    fn descriptor_group(&self, index: u32) -> Option<&HeadlessDescriptorGroup> {
        self.inner.groups.get(index as usize)
    }
}

#[derive(Debug)]
struct PoolInner {
    id: u64,
    generation: Cell<u64>,
    shared: Rc<DeviceShared>,
}

/// Descriptor pool handle. `reset` invalidates every bundle made so far.
#[derive(Debug, Clone)]
pub struct HeadlessDescriptorPool {
    inner: Rc<PoolInner>,
}

impl HeadlessDescriptorPool {
    pub(super) fn new(shared: Rc<DeviceShared>) -> Self {
        Self {
            inner: Rc::new(PoolInner {
                id: shared.next_id(),
                generation: Cell::new(0),
                shared,
            }),
        }
    }

    #[inline]
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// Number of resets so far.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.inner.generation.get()
    }
}

impl DescriptorPool<HeadlessApi> for HeadlessDescriptorPool {
    fn make_bundle(&self, group: &HeadlessDescriptorGroup) -> GpuResult<HeadlessDescriptorBundle> {
        let shared = &self.inner.shared;
        shared.bump(|s| s.bundles_created += 1);
        Ok(HeadlessDescriptorBundle {
            inner: Rc::new(BundleInner {
                id: shared.next_id(),
                pool: self.inner.clone(),
                generation: self.generation(),
                group: *group,
                bindings: RefCell::new(Vec::new()),
            }),
        })
    }

    fn reset(&self) {
        let generation = &self.inner.generation;
        generation.set(generation.get() + 1);
    }
}

/// One `set_sampler_and_texture` write.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct BundleBinding {
    pub binding: u32,
    pub array_element: u32,
    pub texture: u64,
    pub layout: TextureLayout,
    pub sampler: u64,
}

#[derive(Debug)]
struct BundleInner {
    id: u64,
    pool: Rc<PoolInner>,
    generation: u64,
    group: HeadlessDescriptorGroup,
    bindings: RefCell<Vec<BundleBinding>>,
}

/// Descriptor bundle handle. Clones see the same bindings.
#[derive(Debug, Clone)]
pub struct HeadlessDescriptorBundle {
    inner: Rc<BundleInner>,
}

impl HeadlessDescriptorBundle {
    #[inline]
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    pub fn pool_id(&self) -> u64 {
        self.inner.pool.id
    }

    /// Pool generation the bundle was made in.
    pub fn generation(&self) -> u64 {
        self.inner.generation
    }

    /// False once the owning pool has been reset.
    pub fn is_valid(&self) -> bool {
        self.inner.pool.generation.get() == self.inner.generation
    }

    pub fn group(&self) -> HeadlessDescriptorGroup {
        self.inner.group
    }

    pub fn bindings(&self) -> Vec<BundleBinding> {
        self.inner.bindings.borrow().clone()
    }
}

impl DescriptorBundle<HeadlessApi> for HeadlessDescriptorBundle {
    fn set_sampler_and_texture(
        &mut self,
        binding: u32,
        array_element: u32,
        texture: &HeadlessTexture,
        layout: TextureLayout,
        sampler: &HeadlessSampler,
    ) {
        if binding >= self.inner.group.binding_count {
            log::warn!("bundle {}: binding {binding} outside its group", self.inner.id);
        }

        let write = BundleBinding {
            binding,
            array_element,
            texture: texture.id(),
            layout,
            sampler: sampler.id(),
        };
        let mut bindings = self.inner.bindings.borrow_mut();
        bindings.retain(|b| (b.binding, b.array_element) != (binding, array_element));
        bindings.push(write);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::Device;
    use crate::headless::HeadlessDevice;

    #[test]
    fn reset_invalidates_bundles() {
        let device = HeadlessDevice::new();
        let pool = device.create_descriptor_pool().unwrap();
        let bundle = pool.make_bundle(&HeadlessDescriptorGroup::new(1)).unwrap();
        assert!(bundle.is_valid());

        pool.reset();
        assert!(!bundle.is_valid());
        assert_eq!(pool.generation(), 1);

        let fresh = pool.make_bundle(&HeadlessDescriptorGroup::new(1)).unwrap();
        assert!(fresh.is_valid());
        assert_eq!(fresh.generation(), 1);
    }

    #[test]
    fn rewriting_a_binding_replaces_it() {
        let device = HeadlessDevice::new();
        let pool = device.create_descriptor_pool().unwrap();
        let sampler = device.create_sampler();
        let desc = crate::gpu::TextureDescriptor {
            format: crate::gpu::PixelFormat::R8G8B8A8Unorm,
            width: 1,
            height: 1,
            mip_levels: 1,
            usage: crate::gpu::TextureUsage::SAMPLED_IMAGE,
            initial_layout: TextureLayout::ShaderResource,
        };
        let a = device.create_texture(&desc, &[0; 4]).unwrap();
        let b = device.create_texture(&desc, &[0; 4]).unwrap();

        let mut bundle = pool.make_bundle(&HeadlessDescriptorGroup::new(1)).unwrap();
        let observer = bundle.clone();
        bundle.set_sampler_and_texture(0, 0, &a, TextureLayout::ShaderResource, &sampler);
        bundle.set_sampler_and_texture(0, 0, &b, TextureLayout::ShaderResource, &sampler);

        let bindings = observer.bindings();
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings[0].texture, b.id());
    }
}
