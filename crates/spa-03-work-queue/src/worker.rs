//! Worker pool draining the queue.

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::domain::{QueueConfig, WorkItem};
use crate::ports::WorkHandler;
use crate::queue::WorkReceiver;

/// Fixed set of worker tasks sharing one receiver.
pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Starts `config.workers` tasks (at least one).
    ///
    /// Workers stop when `shutdown` is cancelled or when the queue is closed
    /// and drained.
    pub fn spawn(
        receiver: WorkReceiver,
        handler: Arc<dyn WorkHandler>,
        config: &QueueConfig,
        shutdown: CancellationToken,
    ) -> Self {
        let receiver = Arc::new(Mutex::new(receiver));
        let count = config.workers.max(1);

        let handles = (0..count)
            .map(|worker_id| {
                let receiver = Arc::clone(&receiver);
                let handler = Arc::clone(&handler);
                let shutdown = shutdown.clone();
                let delay = config.delay;
                tokio::spawn(async move {
                    run_worker(worker_id, receiver, handler, delay, shutdown).await;
                })
            })
            .collect();

        info!(workers = count, delay_ms = config.delay.as_millis() as u64, "Worker pool started");
        Self { handles }
    }

    pub fn size(&self) -> usize {
        self.handles.len()
    }

    /// Waits for every worker to exit.
    pub async fn join(self) {
        for handle in self.handles {
            if let Err(e) = handle.await {
                warn!(error = %e, "Worker task ended abnormally");
            }
        }
    }
}

async fn run_worker(
    worker_id: usize,
    receiver: Arc<Mutex<WorkReceiver>>,
    handler: Arc<dyn WorkHandler>,
    delay: std::time::Duration,
    shutdown: CancellationToken,
) {
    debug!(worker_id, "Worker started");

    loop {
        // The lock is held only while waiting, so items leave in FIFO order.
        let next = tokio::select! {
            _ = shutdown.cancelled() => None,
            item = async { receiver.lock().await.recv().await } => item,
        };

        let Some(item) = next else {
            break;
        };

        process(worker_id, item, handler.as_ref()).await;

        if !delay.is_zero() {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }

    debug!(worker_id, "Worker stopped");
}

async fn process(worker_id: usize, item: WorkItem, handler: &dyn WorkHandler) {
    let span = info_span!(
        "work_item",
        trace_id = %item.trace_id(),
        code = item.transaction().code(),
        worker_id
    );

    async move {
        if item.is_cancelled() {
            info!("Work item cancelled before processing, skipped");
            return;
        }

        if let Err(e) = handler.handle(item).await {
            warn!(error = %e, kind = ?e.kind(), "Work item failed");
        }
    }
    .instrument(span)
    .await;
}
