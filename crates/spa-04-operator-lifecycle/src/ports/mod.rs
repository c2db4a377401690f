//! Ports (hexagonal boundaries).

pub mod inbound;
pub mod outbound;

pub use inbound::LifecycleApi;
pub use outbound::{LegacyStore, PasswordRequest, PasswordService};
