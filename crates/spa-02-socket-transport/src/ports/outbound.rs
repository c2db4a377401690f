//! Outbound (Driven) port: how the client role obtains a stream.

use std::io;
use std::net::SocketAddr;

use async_trait::async_trait;
use tokio::io::AsyncWrite;

/// Opens byte streams to a remote endpoint.
///
/// Abstracted so the client can run against in-memory streams in tests.
#[async_trait]
pub trait Connector: Send + Sync {
    type Stream: AsyncWrite + Unpin + Send;

    async fn connect(&self, addr: SocketAddr) -> io::Result<Self::Stream>;
}
