//! Frame slot ring
//!
//! A fixed set of frame-sized buffers handed between one producer (the
//! renderer) and one consumer (the page transfer). Slots are produced and
//! consumed in FIFO order; the slot at `write_index` is never readable and the
//! slot at `read_index` is never writable while it holds a published frame.

/// Fixed pool of `N` frame slots of `FRAME_SIZE` bytes each
pub struct FrameSlotPool<const N: usize, const FRAME_SIZE: usize> {
    slots: [[u8; FRAME_SIZE]; N],
    write_index: usize,
    read_index: usize,
    readable_count: usize,
    /// Producer holds the slot at `write_index`
    write_claimed: bool,
    /// Consumer holds the slot at `read_index`
    read_claimed: bool,
}

impl<const N: usize, const FRAME_SIZE: usize> FrameSlotPool<N, FRAME_SIZE> {
    const MIN_SLOTS: () = assert!(N >= 2, "a frame slot pool needs at least 2 slots");

    /// Create a pool with all slots zeroed and nothing readable
    pub const fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::MIN_SLOTS;
        Self {
            slots: [[0; FRAME_SIZE]; N],
            write_index: 0,
            read_index: 0,
            readable_count: 0,
            write_claimed: false,
            read_claimed: false,
        }
    }

    /// Zero every slot and drop all published frames
    pub fn reset(&mut self) {
        for slot in self.slots.iter_mut() {
            slot.fill(0);
        }
        self.write_index = 0;
        self.read_index = 0;
        self.readable_count = 0;
        self.write_claimed = false;
        self.read_claimed = false;
    }

    /// Number of slots in the pool
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Size of one slot in bytes
    pub const fn slot_size(&self) -> usize {
        FRAME_SIZE
    }

    /// Published frames not yet fully drained
    pub fn readable_count(&self) -> usize {
        self.readable_count
    }

    /// True if a slot is free for the producer
    pub fn writable(&self) -> bool {
        self.readable_count < N
    }

    /// Borrow the next slot for writing, or `None` if the pool is full
    ///
    /// Repeated calls return the same slot; the ring only advances on
    /// [`commit`](Self::commit).
    pub fn acquire_writable(&mut self) -> Option<&mut [u8; FRAME_SIZE]> {
        if !self.writable() {
            return None;
        }
        self.write_claimed = true;
        Some(&mut self.slots[self.write_index])
    }

    /// The slot claimed by the last [`acquire_writable`](Self::acquire_writable)
    ///
    /// # Panics
    /// If no slot is currently claimed.
    pub fn claimed_slot_mut(&mut self) -> &mut [u8; FRAME_SIZE] {
        assert!(self.write_claimed, "no writable slot claimed");
        &mut self.slots[self.write_index]
    }

    /// Publish the slot returned by [`acquire_writable`](Self::acquire_writable)
    ///
    /// # Panics
    /// If no slot was acquired since the last commit.
    pub fn commit(&mut self) {
        assert!(
            self.write_claimed,
            "commit without a matching acquire_writable"
        );
        debug_assert!(self.readable_count < N);
        self.write_claimed = false;
        self.write_index = (self.write_index + 1) % N;
        self.readable_count += 1;
    }

    /// True if at least one published frame is waiting
    pub fn readable(&self) -> bool {
        self.readable_count > 0
    }

    /// Borrow the oldest published frame, or `None` if nothing is readable
    pub fn peek_readable(&mut self) -> Option<&[u8; FRAME_SIZE]> {
        if !self.readable() {
            return None;
        }
        self.read_claimed = true;
        Some(&self.slots[self.read_index])
    }

    /// Read-only view of the oldest published frame, without claiming it
    pub fn front(&self) -> Option<&[u8; FRAME_SIZE]> {
        if self.readable() {
            Some(&self.slots[self.read_index])
        } else {
            None
        }
    }

    /// Hand the oldest published frame back to the producer
    ///
    /// # Panics
    /// If nothing is readable or the frame was never peeked.
    pub fn release(&mut self) {
        assert!(self.readable_count > 0, "release on an empty pool");
        assert!(self.read_claimed, "release without a matching peek_readable");
        self.read_claimed = false;
        self.read_index = (self.read_index + 1) % N;
        self.readable_count -= 1;
    }

    /// Slot currently reserved for the producer
    pub fn write_index(&self) -> usize {
        self.write_index
    }

    /// Slot currently at the head of the readable queue
    pub fn read_index(&self) -> usize {
        self.read_index
    }
}

impl<const N: usize, const FRAME_SIZE: usize> Default for FrameSlotPool<N, FRAME_SIZE> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    type Pool = FrameSlotPool<2, 4>;

    fn publish(pool: &mut Pool, tag: u8) -> bool {
        match pool.acquire_writable() {
            Some(slot) => {
                slot.fill(tag);
                pool.commit();
                true
            }
            None => false,
        }
    }

    fn consume(pool: &mut Pool) -> Option<u8> {
        let tag = pool.peek_readable()?[0];
        pool.release();
        Some(tag)
    }

    #[test]
    fn test_new_pool_is_empty() {
        let mut pool = Pool::new();
        assert!(pool.writable());
        assert!(!pool.readable());
        assert!(pool.peek_readable().is_none());
        assert_eq!(pool.capacity(), 2);
        assert_eq!(pool.slot_size(), 4);
    }

    #[test]
    fn test_acquire_does_not_advance() {
        let mut pool = Pool::new();
        let first = pool.acquire_writable().unwrap().as_ptr();
        let second = pool.acquire_writable().unwrap().as_ptr();
        assert_eq!(first, second);
        assert_eq!(pool.readable_count(), 0);
        assert_eq!(pool.write_index(), 0);
    }

    #[test]
    fn test_full_pool_denies_writes() {
        let mut pool = Pool::new();
        assert!(publish(&mut pool, 1));
        assert!(publish(&mut pool, 2));
        assert!(!pool.writable());
        assert!(pool.acquire_writable().is_none());
        assert_eq!(pool.readable_count(), 2);
    }

    #[test]
    fn test_fifo_order() {
        let mut pool = Pool::new();
        assert!(publish(&mut pool, 0xA));
        assert!(publish(&mut pool, 0xB));
        assert!(!publish(&mut pool, 0xC));

        assert_eq!(consume(&mut pool), Some(0xA));
        assert!(publish(&mut pool, 0xC));
        assert_eq!(consume(&mut pool), Some(0xB));
        assert_eq!(consume(&mut pool), Some(0xC));
        assert_eq!(consume(&mut pool), None);
    }

    #[test]
    fn test_writer_and_reader_never_share_a_slot() {
        let mut pool = Pool::new();
        assert!(publish(&mut pool, 1));
        let read = pool.peek_readable().unwrap().as_ptr();
        let write = pool.acquire_writable().unwrap().as_ptr();
        assert_ne!(read, write);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut pool = Pool::new();
        assert!(publish(&mut pool, 0xFF));
        pool.reset();
        assert_eq!(pool.readable_count(), 0);
        assert_eq!(pool.acquire_writable().unwrap(), &[0u8; 4]);
    }

    #[test]
    #[should_panic(expected = "commit without a matching acquire_writable")]
    fn test_commit_without_acquire_panics() {
        let mut pool = Pool::new();
        pool.commit();
    }

    #[test]
    #[should_panic(expected = "commit without a matching acquire_writable")]
    fn test_double_commit_panics() {
        let mut pool = Pool::new();
        let _ = pool.acquire_writable();
        pool.commit();
        pool.commit();
    }

    #[test]
    #[should_panic(expected = "release on an empty pool")]
    fn test_release_on_empty_panics() {
        let mut pool = Pool::new();
        pool.release();
    }

    #[derive(Debug, Clone)]
    enum Op {
        Produce(u8),
        Consume,
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![any::<u8>().prop_map(Op::Produce), Just(Op::Consume)]
    }

    proptest! {
        #[test]
        fn prop_conservation_fifo_and_exclusion(ops in proptest::collection::vec(op(), 0..64)) {
            let mut pool = Pool::new();
            let mut model: std::collections::VecDeque<u8> = std::collections::VecDeque::new();
            let mut commits = 0usize;
            let mut releases = 0usize;

            for op in ops {
                match op {
                    Op::Produce(tag) => {
                        if publish(&mut pool, tag) {
                            model.push_back(tag);
                            commits += 1;
                        } else {
                            prop_assert_eq!(model.len(), 2);
                        }
                    }
                    Op::Consume => {
                        let got = consume(&mut pool);
                        if got.is_some() {
                            releases += 1;
                        }
                        prop_assert_eq!(got, model.pop_front());
                    }
                }
                prop_assert_eq!(pool.readable_count(), commits - releases);
                prop_assert!(pool.readable_count() <= pool.capacity());

                let read = pool.peek_readable().map(|slot| slot.as_ptr());
                let write = pool.acquire_writable().map(|slot| slot.as_ptr());
                if let (Some(read), Some(write)) = (read, write) {
                    prop_assert_ne!(read, write);
                }
            }
        }
    }
}
