//! The work handler: lifecycle, then reply.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use spa_01_header_codec::ReplyBody;
use spa_02_socket_transport::FrameSender;
use spa_03_work_queue::{WorkHandler, WorkItem};
use spa_04_operator_lifecycle::{recover_action, LifecycleApi};
use spa_05_response_router::ResponseRouter;
use spa_telemetry::{record_reply, record_transaction};
use spa_types::{ErrorKind, GatewayError};
use tracing::{debug, info};

/// Drives each dequeued item through the lifecycle and routes the reply.
///
/// A cancelled item gets no reply; every other outcome, success or
/// failure, produces exactly one.
pub struct GatewayHandler<A: LifecycleApi, S: FrameSender> {
    lifecycle: Arc<A>,
    router: Arc<ResponseRouter<S>>,
}

impl<A: LifecycleApi, S: FrameSender> GatewayHandler<A, S> {
    pub fn new(lifecycle: Arc<A>, router: Arc<ResponseRouter<S>>) -> Self {
        Self { lifecycle, router }
    }

    pub fn router(&self) -> &Arc<ResponseRouter<S>> {
        &self.router
    }
}

fn error_label(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::Frame => "frame",
        ErrorKind::Transport => "transport",
        ErrorKind::Business => "business",
        ErrorKind::Infrastructure => "infrastructure",
        ErrorKind::Cancelled => "cancelled",
    }
}

#[async_trait]
impl<A, S> WorkHandler for GatewayHandler<A, S>
where
    A: LifecycleApi + 'static,
    S: FrameSender + 'static,
{
    async fn handle(&self, item: WorkItem) -> Result<(), GatewayError> {
        let started = Instant::now();
        let code = item.transaction().code();
        let action = recover_action(code)
            .map(|kind| kind.action.as_str())
            .unwrap_or("unknown");

        let (body, outcome) = match self.lifecycle.process(&item).await {
            Ok(outcome) => {
                info!(
                    code,
                    action,
                    outcome = outcome.as_str(),
                    situation = %outcome.situation(),
                    "Transaction processed"
                );
                (
                    ReplyBody::ok(outcome.situation().code(), outcome.data()),
                    outcome.as_str(),
                )
            }
            Err(e) if e.error.kind() == ErrorKind::Cancelled => {
                record_transaction(action, "cancelled", started.elapsed().as_secs_f64());
                debug!(code, "Cancelled item, no reply");
                return Ok(());
            }
            Err(e) => {
                info!(
                    code,
                    action,
                    situation = e.situation_code(),
                    error = %e,
                    "Transaction rejected"
                );
                (
                    ReplyBody::from_error(&e.error, e.situation_code()),
                    error_label(e.error.kind()),
                )
            }
        };

        record_transaction(action, outcome, started.elapsed().as_secs_f64());

        let delivered = self.router.route(item.transaction().header(), &body).await;
        record_reply(delivered.is_ok());
        delivered
    }
}
