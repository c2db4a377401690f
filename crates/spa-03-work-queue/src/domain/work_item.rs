//! The unit of work carried by the queue.

use spa_types::Transaction;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// A transaction in flight, with its trace id and cancellation token.
///
/// Owned by the queue from `enqueue` until exactly one worker receives it.
#[derive(Debug)]
pub struct WorkItem {
    transaction: Transaction,
    trace_id: String,
    cancellation: CancellationToken,
}

impl WorkItem {
    /// Wraps `transaction` with a fresh trace id and token.
    pub fn new(transaction: Transaction) -> Self {
        Self::with_cancellation(transaction, CancellationToken::new())
    }

    /// Wraps `transaction` with a caller-owned token, e.g. a child of the
    /// shutdown token.
    pub fn with_cancellation(transaction: Transaction, cancellation: CancellationToken) -> Self {
        Self {
            transaction,
            trace_id: Uuid::new_v4().to_string(),
            cancellation,
        }
    }

    pub fn transaction(&self) -> &Transaction {
        &self.transaction
    }

    pub fn trace_id(&self) -> &str {
        &self.trace_id
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    pub fn into_transaction(self) -> Transaction {
        self.transaction
    }
}
