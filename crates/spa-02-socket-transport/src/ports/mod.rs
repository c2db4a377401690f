//! Transport ports.

pub mod inbound;
pub mod outbound;

pub use inbound::FrameSender;
pub use outbound::Connector;
