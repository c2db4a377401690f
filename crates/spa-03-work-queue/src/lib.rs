//! # SPA Work Queue
//!
//! **Component:** 3
//!
//! ## Purpose
//!
//! Decouples the socket receive loops from transaction processing. Producers
//! enqueue `WorkItem`s; a small fixed pool of workers drains them in FIFO
//! order and hands each one to a `WorkHandler`.
//!
//! ```text
//! receive loops ──enqueue──→ [ WorkQueue (FIFO) ] ──recv──→ worker 1..N ──→ WorkHandler
//! ```
//!
//! ## Guarantees
//!
//! | Property | Enforcement |
//! |----------|-------------|
//! | `enqueue` never blocks | unbounded `mpsc` channel / `try_send` when bounded |
//! | Unbounded mode never rejects | `QueueMode::Unbounded` (default) |
//! | FIFO per worker | single shared receiver, one item at a time |
//! | Exactly one worker per item | item moved out of the channel |
//! | Handler failure is contained | worker logs and continues |
//! | Cancelled items are not processed | token checked before dispatch |
//!
//! With more than one worker there is no global ordering across workers.
//!
//! When queueing is disabled the `Dispatcher::Passthrough` variant runs the
//! handler inline on the producer's task.

pub mod dispatcher;
pub mod domain;
pub mod ports;
pub mod queue;
pub mod worker;

pub use dispatcher::Dispatcher;
pub use domain::{QueueConfig, QueueError, QueueMode, WorkItem};
pub use ports::WorkHandler;
pub use queue::{WorkQueue, WorkReceiver};
pub use worker::WorkerPool;
