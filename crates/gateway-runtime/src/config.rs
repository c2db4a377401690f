//! # Gateway Configuration
//!
//! One TOML document with a section per component. Every field has a
//! default, so an empty file (or no file) is a valid configuration.
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 7100
//!
//! [router]
//! host = "10.0.0.5"
//! port = 7200
//! send_attempts = 3
//!
//! [queue]
//! workers = 4
//! capacity = 10000
//!
//! [password_service]
//! base_url = "http://senha.internal:8080"
//! ```
//!
//! ## Environment Overrides
//!
//! | Variable | Field |
//! |----------|-------|
//! | `SPA_CONFIG` | path of the TOML file to load |
//! | `SPA_SERVER_PORT` | `server.port` |
//! | `SPA_ROUTER_HOST` | `router.host` |
//! | `SPA_ROUTER_PORT` | `router.port` |
//! | `SPA_QUEUE_ENABLED` | `queue.enabled` |
//! | `SPA_QUEUE_WORKERS` | `queue.workers` |

use std::env;
use std::fs;
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use spa_02_socket_transport::{ClientConfig, ServerConfig};
use spa_03_work_queue::{QueueConfig, QueueMode};
use spa_04_operator_lifecycle::RetryPolicy;
use spa_05_response_router::RouterConfig;
use thiserror::Error;

/// Errors that can occur during config loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {reason}")]
    Io { path: String, reason: String },

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid value '{value}' for {var}")]
    InvalidOverride { var: &'static str, value: String },

    #[error("Cannot resolve {host}:{port}: {reason}")]
    InvalidAddress {
        host: String,
        port: u16,
        reason: String,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Complete gateway configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub server: ServerSettings,
    pub router: RouterSettings,
    pub queue: QueueSettings,
    pub legacy: LegacySettings,
    pub password_service: PasswordServiceSettings,
}

/// Inbound listener.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub receive_buffer_size: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 7100,
            receive_buffer_size: 8192,
        }
    }
}

/// Outbound router connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterSettings {
    pub host: String,
    pub port: u16,
    pub connect_timeout_ms: u64,
    pub send_timeout_ms: u64,
    pub send_attempts: u32,
}

impl Default for RouterSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7200,
            connect_timeout_ms: 5000,
            send_timeout_ms: 5000,
            send_attempts: 2,
        }
    }
}

/// Work queue and worker pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueSettings {
    /// When false every frame is processed on the ingest loop, one at a
    /// time across all connections.
    pub enabled: bool,
    pub workers: usize,
    pub delay_ms: u64,
    /// `None` for an unbounded queue.
    pub capacity: Option<usize>,
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            workers: 1,
            delay_ms: 0,
            capacity: None,
        }
    }
}

/// Retry boundary around legacy store and password service calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LegacySettings {
    pub max_attempts: u32,
    pub attempt_timeout_ms: u64,
    pub backoff_ms: u64,
}

impl Default for LegacySettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            attempt_timeout_ms: 30_000,
            backoff_ms: 200,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordServiceSettings {
    pub base_url: String,
    pub timeout_ms: u64,
}

impl Default for PasswordServiceSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            timeout_ms: 10_000,
        }
    }
}

impl GatewayConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            reason: e.to_string(),
        })?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// File named by `SPA_CONFIG` (or defaults), then environment
    /// overrides, then [`validate`](Self::validate).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match lookup("SPA_CONFIG") {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_overrides(&lookup)?;
        config.validate()?;
        Ok(config)
    }

    fn apply_overrides<F>(&mut self, lookup: &F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = parse_var(lookup, "SPA_SERVER_PORT")? {
            self.server.port = port;
        }
        if let Some(host) = lookup("SPA_ROUTER_HOST") {
            self.router.host = host;
        }
        if let Some(port) = parse_var(lookup, "SPA_ROUTER_PORT")? {
            self.router.port = port;
        }
        if let Some(enabled) = parse_var(lookup, "SPA_QUEUE_ENABLED")? {
            self.queue.enabled = enabled;
        }
        if let Some(workers) = parse_var(lookup, "SPA_QUEUE_WORKERS")? {
            self.queue.workers = workers;
        }
        Ok(())
    }

    /// Rejects values that would leave a component unable to work.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks: [(bool, &str); 9] = [
            (self.server.receive_buffer_size == 0, "server.receive_buffer_size must be > 0"),
            (self.router.connect_timeout_ms == 0, "router.connect_timeout_ms must be > 0"),
            (self.router.send_timeout_ms == 0, "router.send_timeout_ms must be > 0"),
            (self.router.send_attempts == 0, "router.send_attempts must be > 0"),
            (self.queue.workers == 0, "queue.workers must be > 0"),
            (self.queue.capacity == Some(0), "queue.capacity must be > 0 when set"),
            (self.legacy.max_attempts == 0, "legacy.max_attempts must be > 0"),
            (self.legacy.attempt_timeout_ms == 0, "legacy.attempt_timeout_ms must be > 0"),
            (self.password_service.timeout_ms == 0, "password_service.timeout_ms must be > 0"),
        ];

        match checks.iter().find(|(failed, _)| *failed) {
            Some((_, message)) => Err(ConfigError::Invalid((*message).to_string())),
            None if self.password_service.base_url.trim().is_empty() => Err(
                ConfigError::Invalid("password_service.base_url must not be empty".to_string()),
            ),
            None => Ok(()),
        }
    }

    pub fn server_config(&self) -> Result<ServerConfig, ConfigError> {
        Ok(ServerConfig {
            bind_addr: resolve(&self.server.host, self.server.port)?,
            receive_buffer_size: self.server.receive_buffer_size,
        })
    }

    pub fn client_config(&self) -> Result<ClientConfig, ConfigError> {
        Ok(ClientConfig {
            router_addr: resolve(&self.router.host, self.router.port)?,
            connect_timeout: Duration::from_millis(self.router.connect_timeout_ms),
        })
    }

    pub fn router_config(&self) -> RouterConfig {
        RouterConfig {
            send_timeout: Duration::from_millis(self.router.send_timeout_ms),
            send_attempts: self.router.send_attempts,
        }
    }

    pub fn queue_config(&self) -> QueueConfig {
        QueueConfig {
            enabled: self.queue.enabled,
            workers: self.queue.workers,
            delay: Duration::from_millis(self.queue.delay_ms),
            mode: self
                .queue
                .capacity
                .map(|capacity| QueueMode::Bounded { capacity })
                .unwrap_or_default(),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.legacy.max_attempts,
            attempt_timeout: Duration::from_millis(self.legacy.attempt_timeout_ms),
            backoff: Duration::from_millis(self.legacy.backoff_ms),
        }
    }

    pub fn password_timeout(&self) -> Duration {
        Duration::from_millis(self.password_service.timeout_ms)
    }
}

fn parse_var<T, F>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(var)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidOverride { var, value })
        })
        .transpose()
}

fn resolve(host: &str, port: u16) -> Result<SocketAddr, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidAddress {
        host: host.to_string(),
        port,
        reason,
    };

    (host, port)
        .to_socket_addrs()
        .map_err(|e| invalid(e.to_string()))?
        .next()
        .ok_or_else(|| invalid("no address".to_string()))
}
