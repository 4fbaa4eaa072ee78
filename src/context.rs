//! Marking code that must not block.
//!
//! On the real-time targets this queue is modeled after, interrupt handlers
//! may use the try variants and `post` but must never park on a semaphore.
//! A hosted program marks such regions with [`no_block_scope`]; blocking
//! waits entered inside one fail with [`SemError::NotPermitted`] instead of
//! suspending the thread.
//!
//! [`SemError::NotPermitted`]: crate::SemError::NotPermitted

use std::cell::Cell;

std::thread_local! {
    static BLOCKING_FORBIDDEN: Cell<bool> = const { Cell::new(false) };
}

/// Runs `f` with blocking semaphore waits forbidden on the current thread.
///
/// Scopes nest: blocking stays forbidden until the outermost scope ends.
/// Non-blocking operations (`try_*` and `post`) remain available inside.
pub fn no_block_scope<R>(f: impl FnOnce() -> R) -> R {
    struct Restore(bool);
    impl Drop for Restore {
        fn drop(&mut self) {
            BLOCKING_FORBIDDEN.with(|flag| flag.set(self.0));
        }
    }

    let previous = BLOCKING_FORBIDDEN.with(|flag| flag.replace(true));
    let _restore = Restore(previous);
    f()
}

/// True while the current thread is inside a [`no_block_scope`].
pub(crate) fn blocking_forbidden() -> bool {
    BLOCKING_FORBIDDEN.with(Cell::get)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_sets_and_restores() {
        assert!(!blocking_forbidden());
        no_block_scope(|| {
            assert!(blocking_forbidden());
            no_block_scope(|| assert!(blocking_forbidden()));
            assert!(blocking_forbidden());
        });
        assert!(!blocking_forbidden());
    }
}
