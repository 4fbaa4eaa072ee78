//! Counting semaphore with first-in-first-out wakeup order.
//!
//! The queue protocol is built from two of these: one counts free slots and
//! gates producers, the other counts occupied slots and gates consumers.
//! Platform condition variables wake waiters in no particular order, so the
//! semaphore keeps its own ticket queue: a `post` makes one permit
//! claimable and only the longest-waiting ticket may claim it.

use std::collections::VecDeque;
#[cfg(not(loom))]
use std::sync::{Condvar, Mutex};
#[cfg(not(loom))]
use std::time::{Duration, Instant};

#[cfg(loom)]
use loom::sync::{Condvar, Mutex};

use crate::context;
use crate::error::SemError;

/// How the gating wait of an operation behaves.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Wait {
    /// Park until a permit arrives.
    Forever,
    /// Fail with [`SemError::WouldBlock`] instead of parking.
    NoWait,
    /// Park at most this long, then fail with [`SemError::TimedOut`].
    #[cfg(not(loom))]
    For(Duration),
    /// Park until this point in time, then fail with [`SemError::TimedOut`].
    #[cfg(not(loom))]
    Until(Instant),
}

impl Wait {
    /// Fixes a relative timeout into an absolute deadline, so the several
    /// waits making up one queue operation share it.
    pub(crate) fn pin(self) -> Wait {
        match self {
            #[cfg(not(loom))]
            Wait::For(timeout) => Wait::Until(Instant::now() + timeout),
            other => other,
        }
    }
}

struct Waiter {
    ticket: u64,
    interrupted: bool,
}

struct State {
    value: usize,
    next_ticket: u64,
    waiters: VecDeque<Waiter>,
}

impl State {
    /// Removes the waiter holding `ticket` if it was interrupted.
    fn take_interrupted(&mut self, ticket: u64) -> bool {
        match self
            .waiters
            .iter()
            .position(|w| w.ticket == ticket && w.interrupted)
        {
            Some(at) => {
                self.waiters.remove(at);
                true
            }
            None => false,
        }
    }

    /// Claims a permit if `ticket` is the longest waiter and one is free.
    fn take_front(&mut self, ticket: u64) -> bool {
        if self.value > 0 && self.waiters.front().is_some_and(|w| w.ticket == ticket) {
            self.value -= 1;
            self.waiters.pop_front();
            true
        } else {
            false
        }
    }

    fn remove(&mut self, ticket: u64) {
        if let Some(at) = self.waiters.iter().position(|w| w.ticket == ticket) {
            self.waiters.remove(at);
        }
    }

    /// A permit is free and someone is queued for it.
    fn handoff_pending(&self) -> bool {
        self.value > 0 && !self.waiters.is_empty()
    }
}

/// Counting semaphore whose value stays within `[0, max]` and whose
/// waiters are woken in arrival order.
///
/// `wait` takes a permit, parking the caller behind earlier arrivals when
/// none is free; `post` releases one permit and hands it to the
/// longest-waiting thread. A permit posted while threads are queued is
/// reserved for the front of the queue: `try_wait` will not barge past it.
pub struct Semaphore {
    state: Mutex<State>,
    permits: Condvar,
    max: usize,
}

impl Semaphore {
    /// Creates a semaphore holding `initial` permits out of at most `max`.
    ///
    /// # Panics
    ///
    /// Panics if `max` is zero or `initial` exceeds `max`.
    pub fn new(initial: usize, max: usize) -> Self {
        assert!(max >= 1, "semaphore maximum must be at least 1");
        assert!(initial <= max, "initial value exceeds the maximum");
        Self {
            state: Mutex::new(State {
                value: initial,
                next_ticket: 0,
                waiters: VecDeque::new(),
            }),
            permits: Condvar::new(),
            max,
        }
    }

    /// Current number of free permits.
    ///
    /// The value may change the moment the lock is released; use it for
    /// sizing decisions and diagnostics, not for synchronization.
    pub fn value(&self) -> usize {
        self.state.lock().unwrap().value
    }

    /// Configured maximum value.
    pub fn max(&self) -> usize {
        self.max
    }

    /// Takes one permit, parking the caller until one is available.
    ///
    /// Fails with [`SemError::NotPermitted`] inside a
    /// [`no_block_scope`](crate::no_block_scope) and with
    /// [`SemError::Interrupted`] if [`interrupt_waiters`](Self::interrupt_waiters)
    /// runs while the caller is parked.
    pub fn wait(&self) -> Result<(), SemError> {
        self.block(None)
    }

    /// Takes one permit if that is possible without parking.
    ///
    /// Fails with [`SemError::WouldBlock`] when no permit is free or when
    /// earlier arrivals are still queued for the next one.
    pub fn try_wait(&self) -> Result<(), SemError> {
        let mut state = self.state.lock().unwrap();
        if state.value > 0 && state.waiters.is_empty() {
            state.value -= 1;
            Ok(())
        } else {
            Err(SemError::WouldBlock)
        }
    }

    /// Takes one permit, parking the caller for at most `timeout`.
    #[cfg(not(loom))]
    pub fn try_wait_for(&self, timeout: Duration) -> Result<(), SemError> {
        self.block(Some(Instant::now() + timeout))
    }

    /// Takes one permit, parking the caller until `deadline` at the latest.
    #[cfg(not(loom))]
    pub fn try_wait_until(&self, deadline: Instant) -> Result<(), SemError> {
        self.block(Some(deadline))
    }

    /// Releases one permit and wakes the longest-waiting thread, if any.
    ///
    /// Fails with [`SemError::Overflow`] when the value is already at the
    /// configured maximum; the value is unchanged in that case.
    pub fn post(&self) -> Result<(), SemError> {
        let mut state = self.state.lock().unwrap();
        if state.value == self.max {
            return Err(SemError::Overflow);
        }
        state.value += 1;
        if !state.waiters.is_empty() {
            // The platform condvar wakes in no particular order, so wake
            // everyone; only the front ticket can claim the permit and the
            // rest park again.
            self.permits.notify_all();
        }
        Ok(())
    }

    /// Wakes every thread currently parked in a wait; each returns
    /// [`SemError::Interrupted`]. Waits that begin afterwards are
    /// unaffected, as are permits already held.
    pub fn interrupt_waiters(&self) {
        let mut state = self.state.lock().unwrap();
        if state.waiters.is_empty() {
            return;
        }
        for waiter in &mut state.waiters {
            waiter.interrupted = true;
        }
        self.permits.notify_all();
    }

    pub(crate) fn wait_using(&self, how: Wait) -> Result<(), SemError> {
        match how {
            Wait::Forever => self.block(None),
            Wait::NoWait => self.try_wait(),
            #[cfg(not(loom))]
            Wait::For(timeout) => self.block(Some(Instant::now() + timeout)),
            #[cfg(not(loom))]
            Wait::Until(deadline) => self.block(Some(deadline)),
        }
    }

    #[cfg(not(loom))]
    fn block(&self, deadline: Option<Instant>) -> Result<(), SemError> {
        if context::blocking_forbidden() {
            return Err(SemError::NotPermitted);
        }
        let mut state = self.state.lock().unwrap();
        if state.value > 0 && state.waiters.is_empty() {
            state.value -= 1;
            return Ok(());
        }
        let ticket = state.next_ticket;
        state.next_ticket += 1;
        state.waiters.push_back(Waiter {
            ticket,
            interrupted: false,
        });
        loop {
            if state.take_interrupted(ticket) {
                if state.handoff_pending() {
                    self.permits.notify_all();
                }
                return Err(SemError::Interrupted);
            }
            if state.take_front(ticket) {
                if state.handoff_pending() {
                    self.permits.notify_all();
                }
                return Ok(());
            }
            state = match deadline {
                None => self.permits.wait(state).unwrap(),
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        // Too late; the claim checks above already ran once
                        // more, so a permit posted at the deadline was not
                        // lost.
                        state.remove(ticket);
                        if state.handoff_pending() {
                            self.permits.notify_all();
                        }
                        return Err(SemError::TimedOut);
                    }
                    self.permits.wait_timeout(state, deadline - now).unwrap().0
                }
            };
        }
    }

    #[cfg(loom)]
    fn block(&self, deadline: Option<std::time::Instant>) -> Result<(), SemError> {
        assert!(deadline.is_none(), "timed waits are compiled out under loom");
        if context::blocking_forbidden() {
            return Err(SemError::NotPermitted);
        }
        let mut state = self.state.lock().unwrap();
        if state.value > 0 && state.waiters.is_empty() {
            state.value -= 1;
            return Ok(());
        }
        let ticket = state.next_ticket;
        state.next_ticket += 1;
        state.waiters.push_back(Waiter {
            ticket,
            interrupted: false,
        });
        loop {
            if state.take_interrupted(ticket) {
                if state.handoff_pending() {
                    self.permits.notify_all();
                }
                return Err(SemError::Interrupted);
            }
            if state.take_front(ticket) {
                if state.handoff_pending() {
                    self.permits.notify_all();
                }
                return Ok(());
            }
            state = self.permits.wait(state).unwrap();
        }
    }
}
