//! Driving Ports (API - Inbound)

use async_trait::async_trait;
use spa_03_work_queue::WorkItem;

use crate::domain::{LifecycleError, Outcome};

/// Drives one work item through the lifecycle.
#[async_trait]
pub trait LifecycleApi: Send + Sync {
    async fn process(&self, item: &WorkItem) -> Result<Outcome, LifecycleError>;
}
