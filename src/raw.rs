//! The untyped transfer protocol.
//!
//! [`RawFifo`] owns the gating semaphores and the ring cursors but knows
//! nothing about the element type. The typed queue hands it a slot action
//! that constructs or extracts one element at the index it is given; the
//! protocol decides when the action may run and which slot it gets, so the
//! slot-walking logic exists once rather than once per element type.
//!
//! One transfer, either direction:
//!
//! 1. take the side lock, honoring the caller's wait flavor;
//! 2. wait on the gating semaphore in the same flavor; on failure release
//!    the side lock and return the error, state untouched;
//! 3. advance the side's cursor and run the action on the slot it yields;
//! 4. release the side lock;
//! 5. post the peer semaphore.
//!
//! The side lock is a binary semaphore with FIFO wakeup, held *across* the
//! gating wait: same-side callers pass the gate in arrival order, which
//! pins slot order to arrival order. A lock taken only around step 3 would
//! let two woken waiters race for the cursor and reorder their slots.

use core::cell::UnsafeCell;

use crate::error::SemError;
use crate::ring::RingCursor;
use crate::semaphore::{Semaphore, Wait};

pub(crate) struct RawFifo {
    /// Counts occupied slots; gates consumers.
    pop_sem: Semaphore,
    /// Counts free slots; gates producers.
    push_sem: Semaphore,
    /// Serializes producers in arrival order.
    write_lock: Semaphore,
    /// Serializes consumers in arrival order.
    read_lock: Semaphore,
    /// Next slot to fill. Guarded by `write_lock`.
    write: UnsafeCell<RingCursor>,
    /// Next slot to drain. Guarded by `read_lock`.
    read: UnsafeCell<RingCursor>,
}

// Safety: each cursor is only touched while the corresponding side lock is
// held, and the semaphores are Sync on their own.
unsafe impl Send for RawFifo {}
unsafe impl Sync for RawFifo {}

impl RawFifo {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            pop_sem: Semaphore::new(0, capacity),
            push_sem: Semaphore::new(capacity, capacity),
            write_lock: Semaphore::new(1, 1),
            read_lock: Semaphore::new(1, 1),
            write: UnsafeCell::new(RingCursor::new(capacity)),
            read: UnsafeCell::new(RingCursor::new(capacity)),
        }
    }

    /// Waits for a free slot, runs `fill` on it, then signals consumers.
    pub(crate) fn push(&self, how: Wait, fill: &mut dyn FnMut(usize)) -> Result<(), SemError> {
        self.transfer(
            how,
            &self.write_lock,
            &self.push_sem,
            &self.pop_sem,
            &self.write,
            fill,
        )
    }

    /// Waits for an occupied slot, runs `drain` on it, then signals
    /// producers.
    pub(crate) fn pop(&self, how: Wait, drain: &mut dyn FnMut(usize)) -> Result<(), SemError> {
        self.transfer(
            how,
            &self.read_lock,
            &self.pop_sem,
            &self.push_sem,
            &self.read,
            drain,
        )
    }

    /// Number of occupied slots.
    pub(crate) fn len(&self) -> usize {
        self.pop_sem.value()
    }

    /// Number of free slots.
    pub(crate) fn free_slots(&self) -> usize {
        self.push_sem.value()
    }

    /// First occupied slot and the occupied count. Exclusive access only;
    /// used by the typed queue's destructor to drain in place.
    pub(crate) fn occupied_range(&mut self) -> (usize, usize) {
        (self.read.get_mut().peek(), self.pop_sem.value())
    }

    fn transfer(
        &self,
        how: Wait,
        side: &Semaphore,
        gate: &Semaphore,
        peer: &Semaphore,
        cursor: &UnsafeCell<RingCursor>,
        action: &mut dyn FnMut(usize),
    ) -> Result<(), SemError> {
        // A relative timeout covers the whole operation, both waits.
        let how = how.pin();
        side.wait_using(how)?;
        let gated = match gate.wait_using(how) {
            Ok(()) => {
                // Safety: the side lock is held, making this cursor ours
                // alone until it is released below.
                let slot = unsafe { (*cursor.get()).advance() };
                action(slot);
                Ok(())
            }
            Err(error) => Err(error),
        };
        let released = side.post();
        debug_assert!(released.is_ok(), "side lock released while free");
        gated?;
        let posted = peer.post();
        // Both semaphores are sized to the slot count, so a post after a
        // completed slot action cannot overflow unless a counter was
        // corrupted. The element is already in (or out of) the ring either
        // way.
        debug_assert!(posted.is_ok(), "peer semaphore overflowed");
        posted
    }
}
