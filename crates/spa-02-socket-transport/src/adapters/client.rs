//! Persistent outbound connection to the router endpoint.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use spa_01_header_codec::encode_frame;
use spa_types::{GatewayError, Header, TransportError};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::adapters::tcp::TcpConnector;
use crate::domain::ClientConfig;
use crate::ports::{Connector, FrameSender};

/// Client role: one connection, many concurrent senders.
///
/// The stream lives behind an async mutex, which is the single-writer
/// discipline for the shared connection.
pub struct SpaClient<C: Connector = TcpConnector> {
    connector: C,
    config: ClientConfig,
    stream: Mutex<Option<C::Stream>>,
    connected: AtomicBool,
    connect_attempts: AtomicU64,
}

impl SpaClient<TcpConnector> {
    /// Client using plain TCP.
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        Self::with_connector(config, TcpConnector)
    }
}

impl<C: Connector> SpaClient<C> {
    #[must_use]
    pub fn with_connector(config: ClientConfig, connector: C) -> Self {
        Self {
            connector,
            config,
            stream: Mutex::new(None),
            connected: AtomicBool::new(false),
            connect_attempts: AtomicU64::new(0),
        }
    }

    /// Number of connection attempts made so far.
    pub fn connect_attempts(&self) -> u64 {
        self.connect_attempts.load(Ordering::Relaxed)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    async fn connect_locked(&self, slot: &mut Option<C::Stream>) -> Result<(), TransportError> {
        if slot.is_some() {
            return Ok(());
        }

        let remote = self.config.router_addr;
        self.connect_attempts.fetch_add(1, Ordering::Relaxed);
        debug!(remote = %remote, "Connecting to router");

        let stream = tokio::time::timeout(self.config.connect_timeout, self.connector.connect(remote))
            .await
            .map_err(|_| TransportError::Timeout {
                millis: self.config.connect_timeout.as_millis() as u64,
            })?
            .map_err(|e| TransportError::ConnectFailed {
                remote: remote.to_string(),
                reason: e.to_string(),
            })?;

        *slot = Some(stream);
        self.connected.store(true, Ordering::Release);
        info!(remote = %remote, "Connected to router");
        Ok(())
    }

    fn mark_disconnected(&self, slot: &mut Option<C::Stream>) {
        *slot = None;
        self.connected.store(false, Ordering::Release);
    }
}

#[async_trait]
impl<C> FrameSender for SpaClient<C>
where
    C: Connector,
    C::Stream: 'static,
{
    async fn connect(&self) -> Result<(), TransportError> {
        let mut slot = self.stream.lock().await;
        self.connect_locked(&mut slot).await
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    async fn send(
        &self,
        header: &Header,
        payload: &[u8],
        timeout: Duration,
    ) -> Result<(), GatewayError> {
        let frame = encode_frame(header, payload)?;

        let mut slot = self.stream.lock().await;
        self.connect_locked(&mut slot).await?;

        let write = async {
            match slot.as_mut() {
                Some(stream) => {
                    stream.write_all(&frame).await?;
                    stream.flush().await
                }
                None => Err(std::io::Error::new(
                    std::io::ErrorKind::NotConnected,
                    "connection slot empty",
                )),
            }
        };

        let error = match tokio::time::timeout(timeout, write).await {
            Ok(Ok(())) => {
                debug!(bytes = frame.len(), "Frame sent");
                return Ok(());
            }
            Ok(Err(e)) => TransportError::WriteFailed {
                reason: e.to_string(),
            },
            Err(_) => TransportError::Timeout {
                millis: timeout.as_millis() as u64,
            },
        };

        warn!(error = %error, "Send failed, dropping connection");
        self.mark_disconnected(&mut slot);
        Err(error.into())
    }

    async fn disconnect(&self) {
        let mut slot = self.stream.lock().await;
        if slot.is_some() {
            info!(remote = %self.config.router_addr, "Disconnecting from router");
        }
        self.mark_disconnected(&mut slot);
    }
}
