/// Identifier of one execution slot of a [`WorkerPool`](super::WorkerPool).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(pub(crate) usize);

impl SlotId {
    /// Zero-based position of the slot in its pool, `< capacity`.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Fixed arena of execution slots.
///
/// Keeps a stack of free slot ids and an occupancy flag per slot. Unlike a
/// growable slab, the arena never grows: when every slot is taken,
/// [`take`](Self::take) returns `None` and the caller has to wait.
pub(crate) struct SlotArena {
    /// Stack of free slot ids; the most recently released slot is reused first.
    free: Vec<SlotId>,

    /// Marks whether a slot is currently occupied.
    occupied: Vec<bool>,
}

impl SlotArena {
    /// Creates an arena of `capacity` free slots.
    pub(crate) fn new(capacity: usize) -> Self {
        let free = (0..capacity).rev().map(SlotId).collect();
        let occupied = vec![false; capacity];

        Self { free, occupied }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.occupied.len()
    }

    /// Number of occupied slots.
    pub(crate) fn in_use(&self) -> usize {
        self.capacity() - self.free.len()
    }

    /// Occupies a free slot, if any.
    pub(crate) fn take(&mut self) -> Option<SlotId> {
        let slot = self.free.pop()?;
        self.occupied[slot.0] = true;
        Some(slot)
    }

    /// Frees `slot`.
    ///
    /// # Panics
    ///
    /// Panics if `slot` is out of range or not currently occupied.
    pub(crate) fn put(&mut self, slot: SlotId) {
        assert!(slot.0 < self.occupied.len(), "slot out of range");
        assert!(self.occupied[slot.0], "slot is not occupied");

        self.occupied[slot.0] = false;
        self.free.push(slot);
    }
}
