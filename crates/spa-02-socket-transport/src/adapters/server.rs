//! Inbound listener and per-connection receive loop.

use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use spa_01_header_codec::FrameAccumulator;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::domain::{ConnectionStats, ReceivedFrame, ServerConfig};

/// Pause after a failed `accept` before trying again.
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// TCP listener for legacy SPA connections.
pub struct SpaServer {
    listener: TcpListener,
    config: ServerConfig,
    stats: Arc<ConnectionStats>,
    next_connection_id: AtomicU64,
}

impl SpaServer {
    /// Binds the listener to `config.bind_addr`.
    pub async fn bind(config: ServerConfig) -> io::Result<Self> {
        let listener = TcpListener::bind(config.bind_addr).await?;
        info!(addr = %listener.local_addr()?, "SPA listener bound");

        Ok(Self {
            listener,
            config,
            stats: Arc::new(ConnectionStats::new()),
            next_connection_id: AtomicU64::new(1),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Connection and frame counters for this listener.
    pub fn stats(&self) -> Arc<ConnectionStats> {
        Arc::clone(&self.stats)
    }

    /// Accepts connections until `shutdown` is cancelled.
    ///
    /// Each connection gets its own receive loop task; frames from every
    /// connection are delivered on `events`.
    pub async fn run(
        self,
        events: mpsc::UnboundedSender<ReceivedFrame>,
        shutdown: CancellationToken,
    ) {
        info!("SPA listener accepting connections");

        loop {
            let accepted = tokio::select! {
                _ = shutdown.cancelled() => break,
                accepted = self.listener.accept() => accepted,
            };

            let (stream, peer) = match accepted {
                Ok(pair) => pair,
                Err(e) => {
                    error!(error = %e, "Accept failed");
                    tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
                    continue;
                }
            };

            if let Err(e) = stream.set_nodelay(true) {
                debug!(peer = %peer, error = %e, "Could not disable Nagle");
            }

            let connection_id = self.next_connection_id.fetch_add(1, Ordering::Relaxed);
            let stats = Arc::clone(&self.stats);
            let events = events.clone();
            let shutdown = shutdown.child_token();
            let buffer_size = self.config.receive_buffer_size;

            stats.connection_opened();
            info!(connection_id, peer = %peer, active = stats.active(), "Connection accepted");

            tokio::spawn(async move {
                let result = receive_loop(
                    stream,
                    connection_id,
                    peer,
                    buffer_size,
                    events,
                    Arc::clone(&stats),
                    shutdown,
                )
                .await;

                if let Err(e) = result {
                    warn!(connection_id, peer = %peer, error = %e, "Connection read failed");
                }

                stats.connection_closed();
                info!(connection_id, peer = %peer, active = stats.active(), "Connection closed");
            });
        }

        info!("SPA listener stopped");
    }
}

/// Reads frames from `reader` until EOF, error, shutdown, or the consumer
/// going away.
///
/// Short reads are accumulated; malformed frames are logged and dropped
/// without closing the connection.
pub async fn receive_loop<R>(
    mut reader: R,
    connection_id: u64,
    peer: SocketAddr,
    buffer_size: usize,
    events: mpsc::UnboundedSender<ReceivedFrame>,
    stats: Arc<ConnectionStats>,
    shutdown: CancellationToken,
) -> io::Result<()>
where
    R: AsyncRead + Unpin,
{
    let mut accumulator = FrameAccumulator::with_capacity(buffer_size);

    loop {
        while let Some(result) = accumulator.next_frame() {
            match result {
                Ok(message) => {
                    stats.frame_received();
                    debug!(
                        connection_id,
                        message_size = message.header.message_size,
                        "Frame received"
                    );

                    let event = ReceivedFrame {
                        connection_id,
                        peer,
                        message,
                    };
                    if events.send(event).is_err() {
                        debug!(connection_id, "Frame consumer gone, closing receive loop");
                        return Ok(());
                    }
                }
                Err(e) => {
                    stats.frame_dropped();
                    warn!(connection_id, peer = %peer, error = %e, "Malformed frame dropped");
                }
            }
        }

        let read = tokio::select! {
            _ = shutdown.cancelled() => return Ok(()),
            read = reader.read_buf(accumulator.buffer_mut()) => read?,
        };

        if read == 0 {
            if accumulator.buffered() > 0 {
                warn!(
                    connection_id,
                    buffered = accumulator.buffered(),
                    "Connection closed mid-frame"
                );
            }
            return Ok(());
        }
    }
}
