//! Cross-component flows.

pub mod http_flow;
pub mod loopback;
pub mod queue_flow;
