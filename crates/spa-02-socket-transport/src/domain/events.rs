//! Events raised by the receive loops.

use std::net::SocketAddr;

use spa_types::FramedMessage;

/// A complete frame read from an inbound connection.
#[derive(Debug, Clone)]
pub struct ReceivedFrame {
    /// Server-assigned connection number, unique per process.
    pub connection_id: u64,
    /// Remote address of the connection.
    pub peer: SocketAddr,
    pub message: FramedMessage,
}
