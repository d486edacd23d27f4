//! Fixed-capacity segment ring.
//!
//! Ring adjacency is implicit in the slot index: slot `i` is followed by
//! `(i + 1) % N` and preceded by `(i + N - 1) % N`. Only payloads and the two
//! flags change over a slot's life.

use super::segment::Segment;

/// One ring position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slot {
    /// Payload, written by ingestion while `ready` is false.
    pub segment: Segment,
    /// Owned by the consumer until retirement clears it.
    pub ready: bool,
    /// This slot is the one being integrated.
    pub running: bool,
}

impl Slot {
    /// An empty slot.
    pub const EMPTY: Self = Self {
        segment: Segment::ZERO,
        ready: false,
        running: false,
    };
}

/// Ring of `N` segment slots with producer and consumer positions.
#[derive(Debug, Clone)]
pub struct SegmentStore<const N: usize> {
    slots: [Slot; N],
    head: usize,
    tail: usize,
}

impl<const N: usize> Default for SegmentStore<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> SegmentStore<N> {
    /// Create a store with zeroed slots and both positions at slot 0.
    pub const fn new() -> Self {
        Self {
            slots: [Slot::EMPTY; N],
            head: 0,
            tail: 0,
        }
    }

    /// Re-zero every slot and rewind both positions.
    pub fn reset(&mut self) {
        self.slots = [Slot::EMPTY; N];
        self.head = 0;
        self.tail = 0;
    }

    /// Number of slots.
    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Ring successor of a position.
    #[inline]
    pub const fn next(index: usize) -> usize {
        (index + 1) % N
    }

    /// Ring predecessor of a position.
    #[inline]
    pub const fn previous(index: usize) -> usize {
        (index + N - 1) % N
    }

    /// Producer position (where the next segment is written).
    #[inline]
    pub fn head(&self) -> usize {
        self.head
    }

    /// Consumer position (the segment integrated next or now).
    #[inline]
    pub fn tail(&self) -> usize {
        self.tail
    }

    /// Slot at a ring position.
    #[inline]
    pub fn slot(&self, index: usize) -> &Slot {
        &self.slots[index % N]
    }

    /// Producer slot.
    #[inline]
    pub fn head_slot(&self) -> &Slot {
        &self.slots[self.head]
    }

    /// Consumer slot.
    #[inline]
    pub fn tail_slot(&self) -> &Slot {
        &self.slots[self.tail]
    }

    /// Whether the producer slot can take a segment.
    #[inline]
    pub fn has_space(&self) -> bool {
        !self.slots[self.head].ready
    }

    /// Number of admitted segments not yet retired.
    pub fn pending(&self) -> usize {
        self.slots.iter().filter(|s| s.ready).count()
    }

    /// Free slots remaining.
    #[inline]
    pub fn free(&self) -> usize {
        N - self.pending()
    }

    /// Write a payload into the producer slot, hand it to the consumer and
    /// advance the producer position.
    ///
    /// Returns the ring position written, or `None` if the producer slot is
    /// still owned by the consumer. The payload is written before the ready
    /// flag.
    pub fn push(&mut self, segment: &Segment) -> Option<usize> {
        let index = self.head;
        let slot = &mut self.slots[index];
        if slot.ready {
            return None;
        }
        slot.segment = *segment;
        slot.running = false;
        slot.ready = true;
        self.head = Self::next(index);
        Some(index)
    }

    /// Mark the consumer slot as the one being integrated.
    ///
    /// Returns false when the consumer slot holds nothing.
    pub fn mark_running(&mut self) -> bool {
        let slot = &mut self.slots[self.tail];
        if slot.ready {
            slot.running = true;
        }
        slot.ready
    }

    /// Retire the consumer slot and advance the consumer position.
    ///
    /// The ready flag is cleared first; the returned copy is the retired payload.
    pub fn retire(&mut self) -> Option<Segment> {
        let index = self.tail;
        let slot = &mut self.slots[index];
        if !slot.ready {
            return None;
        }
        slot.ready = false;
        slot.running = false;
        let segment = slot.segment;
        self.tail = Self::next(index);
        Some(segment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(sequence: u32) -> Segment {
        Segment {
            sequence,
            distance: 1.0,
            ..Segment::ZERO
        }
    }

    #[test]
    fn test_ring_links() {
        type Store = SegmentStore<4>;
        assert_eq!(Store::next(0), 1);
        assert_eq!(Store::next(3), 0);
        assert_eq!(Store::previous(0), 3);
        assert_eq!(Store::previous(2), 1);
    }

    #[test]
    fn test_new_store_is_zeroed() {
        let store = SegmentStore::<8>::new();
        assert_eq!(store.capacity(), 8);
        assert_eq!(store.head(), 0);
        assert_eq!(store.tail(), 0);
        for i in 0..8 {
            assert_eq!(*store.slot(i), Slot::EMPTY);
        }
    }

    #[test]
    fn test_push_until_full() {
        let mut store = SegmentStore::<3>::new();
        assert_eq!(store.push(&seg(0)), Some(0));
        assert_eq!(store.push(&seg(1)), Some(1));
        assert_eq!(store.push(&seg(2)), Some(2));
        assert!(!store.has_space());
        assert_eq!(store.push(&seg(3)), None);
        assert_eq!(store.pending(), 3);

        // the rejected push left slot 0 alone
        assert_eq!(store.slot(0).segment.sequence, 0);
        assert_eq!(store.head(), 0);
    }

    #[test]
    fn test_retire_in_order_and_wrap() {
        let mut store = SegmentStore::<2>::new();
        store.push(&seg(10));
        store.push(&seg(11));

        assert!(store.mark_running());
        assert!(store.tail_slot().running);
        assert_eq!(store.retire().map(|s| s.sequence), Some(10));
        assert!(!store.slot(0).ready);
        assert!(!store.slot(0).running);

        assert_eq!(store.push(&seg(12)), Some(0));
        assert_eq!(store.retire().map(|s| s.sequence), Some(11));
        assert_eq!(store.retire().map(|s| s.sequence), Some(12));
        assert_eq!(store.retire(), None);
        assert!(!store.mark_running());
        assert_eq!(store.free(), 2);
    }

    #[test]
    fn test_reset() {
        let mut store = SegmentStore::<4>::new();
        store.push(&seg(1));
        store.retire();
        store.push(&seg(2));
        store.reset();
        assert_eq!(store.head(), 0);
        assert_eq!(store.tail(), 0);
        assert_eq!(store.pending(), 0);
    }
}
