//! # SPA Telemetry
//!
//! Logging and metrics for the gateway.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use spa_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let config = TelemetryConfig::from_env();
//! init_telemetry(&config)?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `SPA_LOG_LEVEL` / `RUST_LOG` | `info` | Log filter |
//! | `SPA_JSON_LOGS` | `false` (`true` in containers) | JSON log lines |
//! | `SPA_SERVICE_NAME` | `spa-gateway` | Service name |

pub mod config;
pub mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::init_logging;
pub use metrics::{
    record_reply, record_transaction, register_metrics, render_metrics, CONNECTIONS_ACTIVE,
    FRAMES_DROPPED, FRAMES_RECEIVED, QUEUE_DEPTH, QUEUE_REJECTED, REPLIES_SENT, REPLY_FAILURES,
    TRANSACTIONS_PROCESSED, UPTIME,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Registers metrics, then installs the log subscriber.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    register_metrics()?;
    init_logging(config)
}
