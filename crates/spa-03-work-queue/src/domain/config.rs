//! Queue configuration.

use std::time::Duration;

/// Channel flavour backing the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueueMode {
    /// Never rejects. Memory grows with the backlog.
    #[default]
    Unbounded,
    /// Rejects (and logs) once `capacity` items are waiting.
    Bounded { capacity: usize },
}

/// Work queue configuration.
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// When false, items are processed inline by the producer.
    pub enabled: bool,
    /// Number of worker tasks draining the queue.
    pub workers: usize,
    /// Pause a worker takes after each item.
    pub delay: Duration,
    pub mode: QueueMode,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            workers: 1,
            delay: Duration::ZERO,
            mode: QueueMode::Unbounded,
        }
    }
}
