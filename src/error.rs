//! Failure codes passed through from the gating semaphores.

use core::fmt;

/// Errors surfaced by semaphore operations.
///
/// The queue defines no failure codes of its own: every queue operation
/// either succeeds or reports one of these, unchanged, from the semaphore
/// that gated it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemError {
    /// A non-blocking wait found no permit. For the queue this means
    /// "full right now" on the send side and "empty right now" on the
    /// receive side.
    WouldBlock,
    /// A bounded wait reached its deadline before a permit arrived.
    TimedOut,
    /// The wait was aborted by [`Semaphore::interrupt_waiters`].
    ///
    /// [`Semaphore::interrupt_waiters`]: crate::Semaphore::interrupt_waiters
    Interrupted,
    /// A blocking wait was attempted inside a [`no_block_scope`].
    ///
    /// [`no_block_scope`]: crate::no_block_scope
    NotPermitted,
    /// A post found the semaphore already at its configured maximum.
    ///
    /// The queue sizes both of its semaphores to the slot count, so a
    /// post on its behalf can only overflow if a counter was corrupted.
    Overflow,
}

impl fmt::Display for SemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            SemError::WouldBlock => "operation would block",
            SemError::TimedOut => "wait timed out",
            SemError::Interrupted => "wait was interrupted",
            SemError::NotPermitted => "blocking is forbidden in this context",
            SemError::Overflow => "semaphore value is already at its maximum",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for SemError {}

/// A send that failed before its element entered the queue.
///
/// The element travels back to the caller instead of being dropped, so a
/// full-queue `try_send` can be retried without cloning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendError<T> {
    /// Why the gating wait failed.
    pub error: SemError,
    /// The element that was not enqueued.
    pub value: T,
}

impl<T> SendError<T> {
    /// Discards the element and keeps the failure code.
    pub fn into_error(self) -> SemError {
        self.error
    }
}

impl<T> fmt::Display for SendError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "send failed: {}", self.error)
    }
}

impl<T: fmt::Debug> std::error::Error for SendError<T> {}
