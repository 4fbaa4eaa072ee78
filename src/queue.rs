//! The typed queue.

use core::cell::UnsafeCell;
use core::mem::{self, MaybeUninit};
#[cfg(not(loom))]
use std::time::{Duration, Instant};

use crate::error::{SemError, SendError};
use crate::raw::RawFifo;
use crate::semaphore::Wait;

/// Bounded blocking FIFO queue.
///
/// Elements live in a ring of `CAP` pre-allocated slots; two counting
/// semaphores gate access, so a `send` on a full queue and a `recv` on an
/// empty one park the caller instead of spinning. Any number of producers
/// and consumers may share one queue; each side is served in arrival
/// order. Steady-state operation never allocates.
///
/// # Examples
///
/// ```
/// use semfifo::Queue;
/// use std::sync::Arc;
/// use std::thread;
///
/// let queue = Arc::new(Queue::<i32, 8>::new());
/// let q = queue.clone();
///
/// let producer = thread::spawn(move || {
///     for i in 0..100 {
///         q.send(i).unwrap();
///     }
/// });
///
/// for i in 0..100 {
///     assert_eq!(queue.recv().unwrap(), i);
/// }
/// producer.join().unwrap();
/// ```
pub struct Queue<T, const CAP: usize> {
    raw: RawFifo,
    slots: Box<[UnsafeCell<MaybeUninit<T>>; CAP]>,
}

// Safety: the semaphore pair hands each slot to exactly one thread at a
// time, and the side locks serialize cursor movement; sharing the queue is
// then as safe as sending `T` between threads.
unsafe impl<T: Send, const CAP: usize> Send for Queue<T, CAP> {}
unsafe impl<T: Send, const CAP: usize> Sync for Queue<T, CAP> {}

impl<T, const CAP: usize> Queue<T, CAP> {
    /// Creates an empty queue. The slot ring is allocated here, once.
    ///
    /// # Panics
    ///
    /// Panics if `CAP` is zero.
    pub fn new() -> Self {
        assert!(CAP > 0, "capacity must be greater than 0");

        let mut v = Vec::with_capacity(CAP);
        for _ in 0..CAP {
            v.push(UnsafeCell::new(MaybeUninit::uninit()));
        }
        let slots: Box<[UnsafeCell<MaybeUninit<T>>; CAP]> = v
            .into_boxed_slice()
            .try_into()
            .unwrap_or_else(|_| panic!("capacity mismatch"));

        Queue {
            raw: RawFifo::new(CAP),
            slots,
        }
    }

    /// Moves `value` into the queue, parking the caller while it is full.
    pub fn send(&self, value: T) -> Result<(), SendError<T>> {
        self.send_using(Wait::Forever, value)
    }

    /// Moves `value` into the queue if that is possible without parking.
    ///
    /// Fails with [`SemError::WouldBlock`] when the queue is full, and also
    /// when another producer is mid-send at this instant.
    pub fn try_send(&self, value: T) -> Result<(), SendError<T>> {
        self.send_using(Wait::NoWait, value)
    }

    /// Moves `value` into the queue, parking the caller for at most
    /// `timeout` before failing with [`SemError::TimedOut`].
    #[cfg(not(loom))]
    pub fn send_timeout(&self, value: T, timeout: Duration) -> Result<(), SendError<T>> {
        self.send_using(Wait::For(timeout), value)
    }

    /// Moves `value` into the queue, parking the caller until `deadline`
    /// at the latest.
    #[cfg(not(loom))]
    pub fn send_deadline(&self, value: T, deadline: Instant) -> Result<(), SendError<T>> {
        self.send_using(Wait::Until(deadline), value)
    }

    /// Clones `value` into the queue, parking the caller while it is full.
    pub fn send_ref(&self, value: &T) -> Result<(), SemError>
    where
        T: Clone,
    {
        self.raw
            .push(Wait::Forever, &mut |slot| self.store(slot, value.clone()))
    }

    /// Clones `value` into the queue if that is possible without parking.
    pub fn try_send_ref(&self, value: &T) -> Result<(), SemError>
    where
        T: Clone,
    {
        self.raw
            .push(Wait::NoWait, &mut |slot| self.store(slot, value.clone()))
    }

    /// Constructs an element directly in its slot, parking the caller
    /// while the queue is full. `make` runs only once a slot is reserved,
    /// so a full-queue wait builds nothing.
    pub fn send_with(&self, make: impl FnOnce() -> T) -> Result<(), SemError> {
        self.emplace_using(Wait::Forever, make)
    }

    /// Constructs an element directly in its slot if that is possible
    /// without parking.
    pub fn try_send_with(&self, make: impl FnOnce() -> T) -> Result<(), SemError> {
        self.emplace_using(Wait::NoWait, make)
    }

    /// Takes the oldest element, parking the caller while the queue is
    /// empty.
    pub fn recv(&self) -> Result<T, SemError> {
        self.recv_using(Wait::Forever)
    }

    /// Takes the oldest element if that is possible without parking.
    ///
    /// Fails with [`SemError::WouldBlock`] when the queue is empty, and
    /// also when another consumer is mid-recv at this instant.
    pub fn try_recv(&self) -> Result<T, SemError> {
        self.recv_using(Wait::NoWait)
    }

    /// Takes the oldest element, parking the caller for at most `timeout`
    /// before failing with [`SemError::TimedOut`].
    #[cfg(not(loom))]
    pub fn recv_timeout(&self, timeout: Duration) -> Result<T, SemError> {
        self.recv_using(Wait::For(timeout))
    }

    /// Takes the oldest element, parking the caller until `deadline` at
    /// the latest.
    #[cfg(not(loom))]
    pub fn recv_deadline(&self, deadline: Instant) -> Result<T, SemError> {
        self.recv_using(Wait::Until(deadline))
    }

    /// Exchanges the oldest element with `*out`, parking the caller while
    /// the queue is empty.
    ///
    /// The displaced value that `out` held before the call is dropped, once
    /// the exchange is complete. This is the extraction path for callers
    /// that recycle an out-parameter instead of constructing a fresh value
    /// per receive.
    pub fn recv_into(&self, out: &mut T) -> Result<(), SemError> {
        self.swap_using(Wait::Forever, out)
    }

    /// Exchanges the oldest element with `*out` if that is possible
    /// without parking.
    pub fn try_recv_into(&self, out: &mut T) -> Result<(), SemError> {
        self.swap_using(Wait::NoWait, out)
    }

    /// Number of elements currently queued. Racy: it may change before the
    /// caller can act on it.
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    /// True when no element is queued (racy, like [`len`](Self::len)).
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when every slot is occupied (racy, like [`len`](Self::len)).
    pub fn is_full(&self) -> bool {
        self.raw.free_slots() == 0
    }

    /// Capacity of the queue.
    pub const fn capacity(&self) -> usize {
        CAP
    }

    fn send_using(&self, how: Wait, value: T) -> Result<(), SendError<T>> {
        let mut value = Some(value);
        let result = self.raw.push(how, &mut |slot| {
            if let Some(value) = value.take() {
                self.store(slot, value);
            }
        });
        match result {
            Ok(()) => Ok(()),
            Err(error) => {
                // The gating wait failed, so the slot action never ran and
                // the element is still ours to hand back.
                let value = value
                    .take()
                    .expect("element was stored but the queue reported failure");
                Err(SendError { error, value })
            }
        }
    }

    fn emplace_using(&self, how: Wait, make: impl FnOnce() -> T) -> Result<(), SemError> {
        let mut make = Some(make);
        self.raw.push(how, &mut |slot| {
            if let Some(make) = make.take() {
                self.store(slot, make());
            }
        })
    }

    fn recv_using(&self, how: Wait) -> Result<T, SemError> {
        let mut taken = None;
        self.raw.pop(how, &mut |slot| taken = Some(self.load(slot)))?;
        Ok(taken.expect("pop succeeded without draining a slot"))
    }

    fn swap_using(&self, how: Wait, out: &mut T) -> Result<(), SemError> {
        self.raw.pop(how, &mut |slot| {
            // The exchange completes before the displaced value drops.
            let displaced = mem::replace(out, self.load(slot));
            drop(displaced);
        })
    }

    fn store(&self, slot: usize, value: T) {
        // Safety: the protocol hands a free slot to exactly one producer.
        unsafe {
            (*self.slots[slot].get()).write(value);
        }
    }

    fn load(&self, slot: usize) -> T {
        // Safety: the protocol hands an occupied slot to exactly one
        // consumer, and the slot is free (uninitialized) afterwards.
        unsafe { (*self.slots[slot].get()).assume_init_read() }
    }
}

impl<T, const CAP: usize> Default for Queue<T, CAP> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const CAP: usize> Drop for Queue<T, CAP> {
    fn drop(&mut self) {
        // Exclusive access: drop whatever still occupies the ring. The raw
        // protocol cannot do this itself, it does not know `T`.
        let (mut slot, occupied) = self.raw.occupied_range();
        for _ in 0..occupied {
            unsafe {
                (*self.slots[slot].get()).assume_init_drop();
            }
            slot = (slot + 1) % CAP;
        }
    }
}
