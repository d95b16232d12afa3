use crate::gpu::{Api, Buffer, BufferAccess, BufferUsage, Device, GpuResult};

/// Smallest buffer a slot allocates. A frame with vertices but no indices
/// still binds an index buffer, and graphics APIs reject empty allocations.
pub const MIN_BUFFER_BYTES: u64 = 4;

/// Vertex and index buffer of one frame-in-flight slot.
///
/// Each slot owns at most one generation of each buffer. Growth drops the old
/// buffer and allocates a new one of exactly the required size (at least
/// [`MIN_BUFFER_BYTES`]); capacity never shrinks.
pub struct SlotBuffers<A: Api> {
    vertex: Option<A::Buffer>,
    index: Option<A::Buffer>,
}

impl<A: Api> Default for SlotBuffers<A> {
    fn default() -> Self {
        Self {
            vertex: None,
            index: None,
        }
    }
}

impl<A: Api> SlotBuffers<A> {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn vertex(&self) -> Option<&A::Buffer> {
        self.vertex.as_ref()
    }

    #[inline]
    pub fn index(&self) -> Option<&A::Buffer> {
        self.index.as_ref()
    }

    /// Current vertex buffer size in bytes (0 when unallocated).
    pub fn vertex_capacity(&self) -> u64 {
        self.vertex.as_ref().map_or(0, |b| b.size())
    }

    /// Current index buffer size in bytes (0 when unallocated).
    pub fn index_capacity(&self) -> u64 {
        self.index.as_ref().map_or(0, |b| b.size())
    }

    /// Grows either buffer that is smaller than requested.
    pub fn ensure_capacity(
        &mut self,
        device: &A::Device,
        vertex_bytes: u64,
        index_bytes: u64,
    ) -> GpuResult<()> {
        ensure_buffer::<A>(&mut self.vertex, device, vertex_bytes, BufferUsage::VERTEX_BUFFER)?;
        ensure_buffer::<A>(&mut self.index, device, index_bytes, BufferUsage::INDEX_BUFFER)?;
        Ok(())
    }

    /// Both buffers, mutably, once allocated.
    pub fn pair_mut(&mut self) -> Option<(&mut A::Buffer, &mut A::Buffer)> {
        match (self.vertex.as_mut(), self.index.as_mut()) {
            (Some(v), Some(i)) => Some((v, i)),
            _ => None,
        }
    }
}

fn ensure_buffer<A: Api>(
    slot: &mut Option<A::Buffer>,
    device: &A::Device,
    required: u64,
    usage: BufferUsage,
) -> GpuResult<()> {
    let required = required.max(MIN_BUFFER_BYTES);
    if slot.as_ref().is_some_and(|b| b.size() >= required) {
        return Ok(());
    }

    // Release the old generation before asking for the new one.
    let old = slot.take().map_or(0, |b| b.size());
    *slot = Some(device.create_buffer(required, BufferAccess::CpuAndGpu, usage)?);
    log::debug!("{usage:?} grown {old} -> {required} bytes");
    Ok(())
}

/// Per-frame-in-flight slot buffers of one window.
pub struct FrameSlots<A: Api> {
    slots: Vec<SlotBuffers<A>>,
}

impl<A: Api> FrameSlots<A> {
    pub fn new(frame_count: usize) -> Self {
        Self {
            slots: (0..frame_count).map(|_| SlotBuffers::new()).collect(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, frame_index: usize) -> Option<&SlotBuffers<A>> {
        self.slots.get(frame_index)
    }

    /// Slot for `frame_index`, growing the table if the swapchain gained frames.
    pub fn slot_mut(&mut self, frame_index: usize) -> &mut SlotBuffers<A> {
        if frame_index >= self.slots.len() {
            self.slots.resize_with(frame_index + 1, SlotBuffers::new);
        }
        &mut self.slots[frame_index]
    }

    pub fn iter(&self) -> impl Iterator<Item = &SlotBuffers<A>> {
        self.slots.iter()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::headless::{HeadlessApi, HeadlessDevice};

    type Slot = SlotBuffers<HeadlessApi>;

    #[test]
    fn first_request_allocates_exact_sizes() {
        let device = HeadlessDevice::new();
        let mut slot = Slot::new();
        slot.ensure_capacity(&device, 200, 60).unwrap();

        assert_eq!(slot.vertex_capacity(), 200);
        assert_eq!(slot.index_capacity(), 60);
        assert_eq!(slot.vertex().unwrap().usage(), BufferUsage::VERTEX_BUFFER);
        assert_eq!(slot.index().unwrap().usage(), BufferUsage::INDEX_BUFFER);
        assert_eq!(device.stats().buffers_created, 2);
    }

    #[test]
    fn smaller_request_keeps_buffer() {
        let device = HeadlessDevice::new();
        let mut slot = Slot::new();
        slot.ensure_capacity(&device, 200, 60).unwrap();
        let id = slot.vertex().unwrap().id();

        slot.ensure_capacity(&device, 100, 60).unwrap();
        assert_eq!(slot.vertex().unwrap().id(), id);
        assert_eq!(slot.vertex_capacity(), 200);
        assert_eq!(device.stats().buffers_created, 2);
    }

    #[test]
    fn growth_replaces_and_frees_old_buffer() {
        let device = HeadlessDevice::new();
        let mut slot = Slot::new();
        slot.ensure_capacity(&device, 200, 60).unwrap();
        slot.ensure_capacity(&device, 400, 60).unwrap();

        let stats = device.stats();
        assert_eq!(slot.vertex_capacity(), 400);
        assert_eq!(stats.buffers_created, 3);
        assert_eq!(stats.buffers_destroyed, 1);
    }

    #[test]
    fn failed_growth_leaves_slot_empty() {
        let device = HeadlessDevice::new();
        let mut slot = Slot::new();
        slot.ensure_capacity(&device, 200, 60).unwrap();

        device.fail_next_allocation();
        assert!(slot.ensure_capacity(&device, 400, 60).is_err());
        assert!(slot.vertex().is_none());
        assert!(slot.pair_mut().is_none());
    }

    #[test]
    fn empty_index_data_still_allocates() {
        let device = HeadlessDevice::new();
        let mut slot = Slot::new();
        slot.ensure_capacity(&device, 80, 0).unwrap();

        assert_eq!(slot.index_capacity(), MIN_BUFFER_BYTES);
        assert!(slot.pair_mut().is_some());
    }

    #[test]
    fn frame_slots_grow_on_demand() {
        let mut slots = FrameSlots::<HeadlessApi>::new(2);
        assert_eq!(slots.len(), 2);
        slots.slot_mut(4);
        assert_eq!(slots.len(), 5);
    }

    proptest! {
        #[test]
        fn reallocates_only_on_increase(mut sizes in prop::collection::vec(MIN_BUFFER_BYTES..10_000, 1..24)) {
            sizes.sort_unstable();
            let device = HeadlessDevice::new();
            let mut slot = Slot::new();

            let mut capacity = 0;
            let mut expected = 0;
            for &size in &sizes {
                if size > capacity {
                    expected += 1;
                    capacity = size;
                }
                slot.ensure_capacity(&device, size, 0).unwrap();
                prop_assert_eq!(slot.vertex_capacity(), capacity);
            }

            // One index buffer allocation plus one vertex buffer per increase.
            prop_assert_eq!(device.stats().buffers_created, expected + 1);
        }

        #[test]
        fn capacity_never_shrinks(sizes in prop::collection::vec(0u64..10_000, 1..24)) {
            let device = HeadlessDevice::new();
            let mut slot = Slot::new();

            let mut high = 0;
            for &size in &sizes {
                slot.ensure_capacity(&device, size, size).unwrap();
                high = high.max(size.max(MIN_BUFFER_BYTES));
                prop_assert_eq!(slot.vertex_capacity(), high);
                prop_assert_eq!(slot.index_capacity(), high);
            }
        }
    }
}
