use std::collections::HashMap;

use crate::gpu::Api;
use crate::ui::TextureId;

/// Maps texture ids carried by draw commands to descriptor bundles.
///
/// The registry holds handles only. Whoever registered a bundle still owns the
/// bundle; removing an entry never frees anything.
pub struct TextureRegistry<A: Api> {
    bundles: HashMap<TextureId, A::DescriptorBundle>,
    next_id: u64,
}

impl<A: Api> Default for TextureRegistry<A> {
    fn default() -> Self {
        Self {
            bundles: HashMap::new(),
            next_id: TextureId::FONT.0 + 1,
        }
    }
}

impl<A: Api> TextureRegistry<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `bundle` to a fresh id.
    pub fn register(&mut self, bundle: A::DescriptorBundle) -> TextureId {
        let id = TextureId(self.next_id);
        self.next_id += 1;
        self.bundles.insert(id, bundle);
        id
    }

    /// Binds `bundle` to a caller-chosen id, returning the previous binding.
    pub fn insert(&mut self, id: TextureId, bundle: A::DescriptorBundle) -> Option<A::DescriptorBundle> {
        self.bundles.insert(id, bundle)
    }

    pub fn remove(&mut self, id: TextureId) -> Option<A::DescriptorBundle> {
        self.bundles.remove(&id)
    }

    #[inline]
    pub fn get(&self, id: TextureId) -> Option<&A::DescriptorBundle> {
        self.bundles.get(&id)
    }

    #[inline]
    pub fn contains(&self, id: TextureId) -> bool {
        self.bundles.contains_key(&id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bundles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }

    pub fn clear(&mut self) {
        self.bundles.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::{DescriptorPool, Device};
    use crate::headless::{HeadlessApi, HeadlessDescriptorGroup, HeadlessDevice};

    #[test]
    fn register_skips_reserved_ids() {
        let device = HeadlessDevice::new();
        let pool = device.create_descriptor_pool().unwrap();
        let group = HeadlessDescriptorGroup::new(1);

        let mut registry = TextureRegistry::<HeadlessApi>::new();
        let a = registry.register(pool.make_bundle(&group).unwrap());
        let b = registry.register(pool.make_bundle(&group).unwrap());

        assert_ne!(a, TextureId::NULL);
        assert_ne!(a, TextureId::FONT);
        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn insert_replaces_binding() {
        let device = HeadlessDevice::new();
        let pool = device.create_descriptor_pool().unwrap();
        let group = HeadlessDescriptorGroup::new(1);

        let mut registry = TextureRegistry::<HeadlessApi>::new();
        let first = pool.make_bundle(&group).unwrap();
        let second = pool.make_bundle(&group).unwrap();

        assert!(registry.insert(TextureId::FONT, first.clone()).is_none());
        let old = registry.insert(TextureId::FONT, second.clone()).unwrap();
        assert_eq!(old.id(), first.id());
        assert_eq!(registry.get(TextureId::FONT).unwrap().id(), second.id());
    }

    #[test]
    fn remove_unknown_is_none() {
        let mut registry = TextureRegistry::<HeadlessApi>::new();
        assert!(registry.remove(TextureId(99)).is_none());
        assert!(!registry.contains(TextureId(99)));
    }
}
