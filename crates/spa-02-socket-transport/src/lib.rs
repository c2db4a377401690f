//! # SPA Socket Transport
//!
//! **Component:** 2
//! **Depends on:** Header Codec (1)
//!
//! ## Purpose
//!
//! Speaks SPA framing over TCP in both directions:
//!
//! - **Server** (`SpaServer`): accepts legacy connections and runs one
//!   receive loop task per connection. Complete frames are pushed onto a
//!   channel as `ReceivedFrame` events.
//! - **Client** (`SpaClient`): a single persistent connection to the router
//!   endpoint, shared by every worker. Writes are serialized by a lock.
//!
//! ## Failure Containment
//!
//! | Failure | Effect |
//! |---------|--------|
//! | Malformed frame | logged, dropped, connection kept |
//! | Socket read error / EOF | receive loop ends, connection counted as closed |
//! | Client write error | connection dropped, error surfaced to caller |
//!
//! ## Module Structure (Hexagonal Architecture)
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  adapters/server.rs  - SpaServer, receive_loop                  │
//! │  adapters/client.rs  - SpaClient                                │
//! │  adapters/tcp.rs     - TcpConnector                             │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ implements ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  ports/inbound.rs  - FrameSender trait                          │
//! │  ports/outbound.rs - Connector trait                            │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ uses ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  domain/config.rs  - ServerConfig, ClientConfig                 │
//! │  domain/stats.rs   - ConnectionStats                            │
//! │  domain/events.rs  - ReceivedFrame                              │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod adapters;
pub mod domain;
pub mod ports;

pub use adapters::{receive_loop, SpaClient, SpaServer, TcpConnector};
pub use domain::{ClientConfig, ConnectionStats, ReceivedFrame, ServerConfig, StatsSnapshot};
pub use ports::{Connector, FrameSender};
