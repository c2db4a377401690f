//! Queue errors.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    /// Bounded queue at capacity; the item was not accepted.
    #[error("Work queue full ({capacity} items)")]
    Full { capacity: usize },

    /// Every receiver has been dropped.
    #[error("Work queue closed")]
    Closed,
}
