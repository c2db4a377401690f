//! Transport adapters.

pub mod client;
pub mod server;
pub mod tcp;

pub use client::SpaClient;
pub use server::{receive_loop, SpaServer};
pub use tcp::TcpConnector;
