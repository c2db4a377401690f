//! Transport domain: configuration, connection statistics and events.

pub mod config;
pub mod events;
pub mod stats;

pub use config::{ClientConfig, ServerConfig};
pub use events::ReceivedFrame;
pub use stats::{ConnectionStats, StatsSnapshot};
