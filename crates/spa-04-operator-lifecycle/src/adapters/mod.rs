//! Adapters for the outbound ports.

#[cfg(feature = "http-password")]
pub mod http_password;
pub mod memory_store;

#[cfg(feature = "http-password")]
pub use http_password::HttpPasswordService;
pub use memory_store::InMemoryLegacyStore;
