//! The FIFO queue itself.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::domain::{QueueError, QueueMode, WorkItem};

#[derive(Debug, Clone)]
enum Sender {
    Unbounded(mpsc::UnboundedSender<WorkItem>),
    Bounded(mpsc::Sender<WorkItem>, usize),
}

#[derive(Debug)]
enum Receiver {
    Unbounded(mpsc::UnboundedReceiver<WorkItem>),
    Bounded(mpsc::Receiver<WorkItem>),
}

#[derive(Debug, Default)]
struct Counters {
    depth: AtomicUsize,
    enqueued: AtomicU64,
    rejected: AtomicU64,
}

/// Producer handle. Cheap to clone; every clone feeds the same queue.
#[derive(Debug, Clone)]
pub struct WorkQueue {
    sender: Sender,
    counters: Arc<Counters>,
}

/// Consumer side. Shared by the workers of a `WorkerPool`.
#[derive(Debug)]
pub struct WorkReceiver {
    receiver: Receiver,
    counters: Arc<Counters>,
}

impl WorkQueue {
    /// Creates a queue and its receiver.
    pub fn new(mode: QueueMode) -> (Self, WorkReceiver) {
        let counters = Arc::new(Counters::default());

        let (sender, receiver) = match mode {
            QueueMode::Unbounded => {
                let (tx, rx) = mpsc::unbounded_channel();
                (Sender::Unbounded(tx), Receiver::Unbounded(rx))
            }
            QueueMode::Bounded { capacity } => {
                let capacity = capacity.max(1);
                let (tx, rx) = mpsc::channel(capacity);
                (Sender::Bounded(tx, capacity), Receiver::Bounded(rx))
            }
        };

        (
            Self {
                sender,
                counters: Arc::clone(&counters),
            },
            WorkReceiver { receiver, counters },
        )
    }

    /// Adds `item` to the back of the queue without waiting.
    ///
    /// # Errors
    ///
    /// - `Full`: bounded mode only, the item is dropped and logged
    /// - `Closed`: the receiver is gone
    pub fn enqueue(&self, item: WorkItem) -> Result<(), QueueError> {
        let trace_id = item.trace_id().to_string();

        // counted before the send: a worker may dequeue before `send` returns
        self.counters.depth.fetch_add(1, Ordering::Relaxed);
        let result = match &self.sender {
            Sender::Unbounded(tx) => tx.send(item).map_err(|_| QueueError::Closed),
            Sender::Bounded(tx, capacity) => tx.try_send(item).map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => QueueError::Full {
                    capacity: *capacity,
                },
                mpsc::error::TrySendError::Closed(_) => QueueError::Closed,
            }),
        };

        match &result {
            Ok(()) => {
                self.counters.enqueued.fetch_add(1, Ordering::Relaxed);
                debug!(trace_id = %trace_id, depth = self.depth(), "Work item enqueued");
            }
            Err(e) => {
                self.counters.depth.fetch_sub(1, Ordering::Relaxed);
                self.counters.rejected.fetch_add(1, Ordering::Relaxed);
                warn!(trace_id = %trace_id, error = %e, "Work item rejected");
            }
        }

        result
    }

    /// Items waiting to be picked up by a worker.
    pub fn depth(&self) -> usize {
        self.counters.depth.load(Ordering::Relaxed)
    }

    pub fn enqueued_total(&self) -> u64 {
        self.counters.enqueued.load(Ordering::Relaxed)
    }

    pub fn rejected_total(&self) -> u64 {
        self.counters.rejected.load(Ordering::Relaxed)
    }
}

impl WorkReceiver {
    /// Waits for the next item. `None` once every producer is dropped and
    /// the queue is drained.
    pub async fn recv(&mut self) -> Option<WorkItem> {
        let item = match &mut self.receiver {
            Receiver::Unbounded(rx) => rx.recv().await,
            Receiver::Bounded(rx) => rx.recv().await,
        };

        if item.is_some() {
            self.counters.depth.fetch_sub(1, Ordering::Relaxed);
        }
        item
    }
}
