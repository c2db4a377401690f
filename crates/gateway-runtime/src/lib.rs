//! # SPA Gateway Runtime
//!
//! Wires the gateway components into a running process.
//!
//! ## Startup Sequence
//!
//! 1. Initialize telemetry (logging, metrics registry)
//! 2. Load configuration (`SPA_CONFIG` file, then environment overrides)
//! 3. Build the legacy store, password service and operator lifecycle
//! 4. Bind the SPA listener and start the worker pool
//! 5. Run until Ctrl+C, then cancel and drain
//!
//! ## Modules
//!
//! - `config` - `GatewayConfig` (TOML + environment)
//! - `gateway` - listener, queue and worker wiring
//! - `handler` - lifecycle + reply for one work item
//! - `adapters/http_mapping` - JSON request body to `Transaction`

pub mod adapters;
pub mod config;
pub mod gateway;
pub mod handler;

pub use config::{ConfigError, GatewayConfig};
pub use gateway::Gateway;
pub use handler::GatewayHandler;
