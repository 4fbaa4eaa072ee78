//! semfifo - Bounded blocking FIFO queue gated by a pair of counting semaphores
//!
//! - `send` / `recv` : blocking operations that park the caller on a
//!   counting semaphore while the queue is full / empty
//! - `try_send` / `try_recv` : non-blocking variants that return Err
//!   immediately instead of parking
//! - `send_timeout` / `recv_timeout` and the `_deadline` variants : bounded
//!   waits that give up with a timeout error
//! - `send_ref` / `send_with` / `recv_into` : clone-in, construct-in-place
//!   and swap-out element paths
//!
//! One ring of `CAP` slots is allocated at construction; steady-state
//! operation never allocates. Two counting semaphores gate the ring: one
//! counts free slots and admits producers, the other counts occupied slots
//! and admits consumers. Waiters on either side are served in arrival
//! order, and the k-th value received is the k-th value sent.
//!
//! Code that must not block (the hosted analogue of an interrupt handler)
//! wraps itself in [`no_block_scope`]; blocking operations inside one fail
//! with [`SemError::NotPermitted`] while the `try_*` variants keep working.

#![warn(missing_docs)]

mod context;
mod error;
mod queue;
mod raw;
mod ring;
mod semaphore;

pub use context::no_block_scope;
pub use error::{SemError, SendError};
pub use queue::Queue;
pub use semaphore::Semaphore;
