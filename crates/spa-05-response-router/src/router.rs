//! Reply routing over the shared client connection.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use spa_01_header_codec::ReplyBody;
use spa_02_socket_transport::FrameSender;
use spa_types::{GatewayError, Header, TransportError};
use tracing::{debug, info, warn};

use crate::header::reply_header;

/// Router settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouterConfig {
    pub send_timeout: Duration,
    /// Total send attempts, including the first.
    pub send_attempts: u32,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            send_timeout: Duration::from_secs(5),
            send_attempts: 2,
        }
    }
}

/// Sends replies back to the caller through a [`FrameSender`].
pub struct ResponseRouter<S: FrameSender> {
    sender: Arc<S>,
    config: RouterConfig,
    sent: AtomicU64,
    failed: AtomicU64,
}

impl<S: FrameSender> ResponseRouter<S> {
    pub fn new(sender: Arc<S>, config: RouterConfig) -> Self {
        Self {
            sender,
            config,
            sent: AtomicU64::new(0),
            failed: AtomicU64::new(0),
        }
    }

    pub fn sender(&self) -> &Arc<S> {
        &self.sender
    }

    pub fn replies_sent(&self) -> u64 {
        self.sent.load(Ordering::Relaxed)
    }

    pub fn replies_failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    /// Encodes `body`, addresses it back to the sender of `request` and
    /// sends it.
    ///
    /// Transport failures reconnect and retry up to `send_attempts` times;
    /// the last one is returned once exhausted. Frame errors are returned
    /// at once.
    pub async fn route(&self, request: &Header, body: &ReplyBody) -> Result<(), GatewayError> {
        let payload = body.encode()?;
        let header = reply_header(request, payload.len())?;

        let result = self.send_with_reconnect(&header, &payload).await;
        match &result {
            Ok(()) => {
                self.sent.fetch_add(1, Ordering::Relaxed);
                debug!(
                    status = ?body.status,
                    code = body.code,
                    destination_branch = header.destination.branch,
                    destination_post = header.destination.post,
                    "Reply routed"
                );
            }
            Err(e) => {
                self.failed.fetch_add(1, Ordering::Relaxed);
                warn!(error = %e, "Reply could not be delivered");
            }
        }
        result
    }

    async fn send_with_reconnect(&self, header: &Header, payload: &[u8]) -> Result<(), GatewayError> {
        let attempts = self.config.send_attempts.max(1);
        let mut last_error = GatewayError::from(TransportError::NotConnected {
            remote: "router".to_string(),
        });

        for attempt in 1..=attempts {
            if !self.sender.is_connected() {
                if attempt > 1 {
                    info!(attempt, "Reconnecting to router");
                }
                if let Err(e) = self.sender.connect().await {
                    warn!(attempt, error = %e, "Router connect failed");
                    last_error = e.into();
                    continue;
                }
            }

            match self.sender.send(header, payload, self.config.send_timeout).await {
                Ok(()) => return Ok(()),
                Err(e @ GatewayError::Transport(_)) => {
                    warn!(attempt, attempts, error = %e, "Reply send failed");
                    self.sender.disconnect().await;
                    last_error = e;
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error)
    }
}
