//! Queue ports.

use async_trait::async_trait;
use spa_types::GatewayError;

use crate::domain::WorkItem;

/// Processes one work item.
///
/// Errors abort only the current item; the worker keeps running.
#[async_trait]
pub trait WorkHandler: Send + Sync {
    async fn handle(&self, item: WorkItem) -> Result<(), GatewayError>;
}
