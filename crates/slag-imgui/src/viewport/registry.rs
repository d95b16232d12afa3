use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::gpu::{Api, Swapchain};
use crate::render::{FrameSlots, SlotBuffers};
use crate::ui::ViewportId;

/// Host-owned swapchain the backend may drive (the main window's).
pub type SharedSwapchain<A> = Rc<RefCell<<A as Api>::Swapchain>>;

/// Swapchain of a viewport, owned or borrowed from the host.
pub enum SwapchainSlot<A: Api> {
    /// Created by the backend for a secondary window; destroyed with the viewport.
    Owned(A::Swapchain),
    /// The host's main swapchain; never destroyed here.
    Borrowed(SharedSwapchain<A>),
}

impl<A: Api> SwapchainSlot<A> {
    #[inline]
    pub fn is_borrowed(&self) -> bool {
        matches!(self, SwapchainSlot::Borrowed(_))
    }

    /// Runs `f` on the swapchain.
    ///
    /// Returns `None` when a borrowed swapchain is currently borrowed by the host.
    pub fn with_mut<R>(&mut self, f: impl FnOnce(&mut A::Swapchain) -> R) -> Option<R> {
        match self {
            SwapchainSlot::Owned(swapchain) => Some(f(swapchain)),
            SwapchainSlot::Borrowed(shared) => {
                let mut swapchain = shared.try_borrow_mut().ok()?;
                Some(f(&mut *swapchain))
            }
        }
    }

    fn frame_count(&self) -> usize {
        match self {
            SwapchainSlot::Owned(swapchain) => swapchain.frame_count(),
            SwapchainSlot::Borrowed(shared) => shared.try_borrow().map_or(0, |s| s.frame_count()),
        }
    }
}

/// Renderer state of one window.
pub struct ViewportResources<A: Api> {
    swapchain: SwapchainSlot<A>,
    slots: FrameSlots<A>,
}

impl<A: Api> ViewportResources<A> {
    pub fn new(swapchain: SwapchainSlot<A>) -> Self {
        let slots = FrameSlots::new(swapchain.frame_count());
        Self { swapchain, slots }
    }

    pub fn owned(swapchain: A::Swapchain) -> Self {
        Self::new(SwapchainSlot::Owned(swapchain))
    }

    pub fn borrowed(swapchain: SharedSwapchain<A>) -> Self {
        Self::new(SwapchainSlot::Borrowed(swapchain))
    }

    #[inline]
    pub fn swapchain(&self) -> &SwapchainSlot<A> {
        &self.swapchain
    }

    #[inline]
    pub fn swapchain_mut(&mut self) -> &mut SwapchainSlot<A> {
        &mut self.swapchain
    }

    #[inline]
    pub fn slots(&self) -> &FrameSlots<A> {
        &self.slots
    }

    pub fn slot_mut(&mut self, frame_index: usize) -> &mut SlotBuffers<A> {
        self.slots.slot_mut(frame_index)
    }

    /// Swapchain and slot buffers, borrowed separately.
    pub fn split_mut(&mut self) -> (&mut SwapchainSlot<A>, &mut FrameSlots<A>) {
        (&mut self.swapchain, &mut self.slots)
    }
}

/// Viewport id → renderer state.
pub struct ViewportRegistry<A: Api> {
    viewports: HashMap<ViewportId, ViewportResources<A>>,
}

impl<A: Api> Default for ViewportRegistry<A> {
    fn default() -> Self {
        Self {
            viewports: HashMap::new(),
        }
    }
}

impl<A: Api> ViewportRegistry<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `resources`, returning the entry it replaced.
    pub fn insert(&mut self, id: ViewportId, resources: ViewportResources<A>) -> Option<ViewportResources<A>> {
        self.viewports.insert(id, resources)
    }

    pub fn remove(&mut self, id: ViewportId) -> Option<ViewportResources<A>> {
        self.viewports.remove(&id)
    }

    #[inline]
    pub fn get(&self, id: ViewportId) -> Option<&ViewportResources<A>> {
        self.viewports.get(&id)
    }

    #[inline]
    pub fn get_mut(&mut self, id: ViewportId) -> Option<&mut ViewportResources<A>> {
        self.viewports.get_mut(&id)
    }

    #[inline]
    pub fn contains(&self, id: ViewportId) -> bool {
        self.viewports.contains_key(&id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.viewports.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.viewports.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = ViewportId> + '_ {
        self.viewports.keys().copied()
    }

    pub fn clear(&mut self) {
        self.viewports.clear();
    }
}
