//! Transport configuration.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Inbound listener configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the listener binds to.
    pub bind_addr: SocketAddr,
    /// Initial per-connection receive buffer capacity.
    pub receive_buffer_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 7100),
            receive_buffer_size: 8 * 1024,
        }
    }
}

/// Outbound router connection configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Router endpoint replies are sent to.
    pub router_addr: SocketAddr,
    /// Maximum time to establish the connection.
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            router_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 7200),
            connect_timeout: Duration::from_secs(5),
        }
    }
}
