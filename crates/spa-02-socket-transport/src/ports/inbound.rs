//! Inbound (Driving) port: what callers of the client role depend on.

use std::time::Duration;

use async_trait::async_trait;
use spa_types::{GatewayError, Header, TransportError};

/// Sends framed messages over the persistent outbound connection.
///
/// Implementations must serialize concurrent `send` calls so the bytes of
/// two frames never interleave on the wire.
#[async_trait]
pub trait FrameSender: Send + Sync {
    /// Establishes the connection. A no-op when already connected.
    async fn connect(&self) -> Result<(), TransportError>;

    /// Whether a connection is currently held.
    fn is_connected(&self) -> bool;

    /// Frames `header || payload` and writes it in one operation.
    ///
    /// Connects lazily when not connected. A write failure drops the
    /// connection and is returned as-is; there is no retry at this layer.
    async fn send(
        &self,
        header: &Header,
        payload: &[u8],
        timeout: Duration,
    ) -> Result<(), GatewayError>;

    /// Drops the current connection, if any.
    async fn disconnect(&self);
}
