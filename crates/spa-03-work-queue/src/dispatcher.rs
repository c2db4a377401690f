//! Entry point used by producers: queue or run inline.

use std::sync::Arc;

use tracing::warn;

use crate::domain::{QueueError, WorkItem};
use crate::ports::WorkHandler;
use crate::queue::WorkQueue;

/// Where a new work item goes.
#[derive(Clone)]
pub enum Dispatcher {
    /// Enqueue and return immediately.
    Queued(WorkQueue),
    /// Queueing disabled: run the handler on the caller's task.
    ///
    /// `dispatch` returns only once the item is fully processed, legacy
    /// retries included. A single ingest loop therefore handles one item at
    /// a time for every connection.
    Passthrough(Arc<dyn WorkHandler>),
}

impl Dispatcher {
    /// Hands `item` off.
    ///
    /// In passthrough mode the handler's own failure is logged, not
    /// returned, matching what a worker would do.
    pub async fn dispatch(&self, item: WorkItem) -> Result<(), QueueError> {
        match self {
            Self::Queued(queue) => queue.enqueue(item),
            Self::Passthrough(handler) => {
                if item.is_cancelled() {
                    return Ok(());
                }
                let trace_id = item.trace_id().to_string();
                if let Err(e) = handler.handle(item).await {
                    warn!(trace_id = %trace_id, error = %e, "Work item failed");
                }
                Ok(())
            }
        }
    }

    /// Queue depth, zero in passthrough mode.
    pub fn depth(&self) -> usize {
        match self {
            Self::Queued(queue) => queue.depth(),
            Self::Passthrough(_) => 0,
        }
    }

    pub fn is_queued(&self) -> bool {
        matches!(self, Self::Queued(_))
    }
}
