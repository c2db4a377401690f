//! # Error Types
//!
//! The gateway error taxonomy. Each family has its own containment rule:
//!
//! | Family | Raised by | Handling |
//! |--------|-----------|----------|
//! | `FrameError` | Header Codec, Socket Transport | frame dropped, connection kept |
//! | `TransportError` | Socket Transport client | reconnect-and-retry at the Response Router |
//! | `BusinessError` | Legacy procedures, lifecycle rules | never retried, replied with its code |
//! | `InfrastructureError` | Legacy store, password service | bounded retry, then surfaced |

use thiserror::Error;

/// Business error codes raised by the gateway itself.
///
/// Codes raised by legacy procedures are passed through unchanged.
pub mod codes {
    /// Transaction code does not map to a known family/action.
    pub const UNKNOWN_TRANSACTION_CODE: i32 = 1001;
    /// Requested action is not allowed from the current situation.
    pub const INVALID_TRANSITION: i32 = 1002;
    /// Origin branch/post addressing fields are missing.
    pub const MISSING_ADDRESSING: i32 = 1003;
    /// A transaction field failed validation.
    pub const INVALID_FIELD: i32 = 1004;
}

/// Malformed or incomplete frame.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    /// Fewer bytes available than a full header.
    #[error("Truncated header: need {needed} bytes, have {available}")]
    Truncated { needed: usize, available: usize },

    /// Header announces a size other than the supported layout.
    #[error("Unsupported header size {declared}, expected {expected}")]
    UnsupportedHeaderSize { declared: u8, expected: usize },

    /// `message_size` smaller than `header_size`.
    #[error("Size mismatch: message_size {message_size} < header_size {header_size}")]
    SizeMismatch { message_size: i16, header_size: u8 },

    /// Header plus payload does not fit in the 16-bit `message_size` field.
    #[error("Payload too large: {payload_len} bytes (max {max})")]
    PayloadTooLarge { payload_len: usize, max: usize },

    /// TCP payload shorter than the transaction code prefix.
    #[error("Missing transaction code: payload has {payload_len} bytes")]
    MissingTransactionCode { payload_len: usize },
}

/// Failure on the outbound socket.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("Not connected to {remote}")]
    NotConnected { remote: String },

    #[error("Connect to {remote} failed: {reason}")]
    ConnectFailed { remote: String, reason: String },

    #[error("Write failed: {reason}")]
    WriteFailed { reason: String },

    #[error("Operation timed out after {millis} ms")]
    Timeout { millis: u64 },

    #[error("Connection closed: {reason}")]
    Closed { reason: String },
}

/// Explicit rejection of an operation by a business rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Business rule rejected operation ({code}): {message}")]
pub struct BusinessError {
    pub code: i32,
    pub message: String,
}

impl BusinessError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Category of an infrastructure failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfrastructureKind {
    Database,
    Timeout,
    Unavailable,
    Unexpected,
}

impl std::fmt::Display for InfrastructureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InfrastructureKind::Database => write!(f, "database"),
            InfrastructureKind::Timeout => write!(f, "timeout"),
            InfrastructureKind::Unavailable => write!(f, "unavailable"),
            InfrastructureKind::Unexpected => write!(f, "unexpected"),
        }
    }
}

/// Database, timeout or otherwise unexpected failure of an external resource.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Infrastructure failure ({kind}): {context}")]
pub struct InfrastructureError {
    pub kind: InfrastructureKind,
    pub context: String,
}

impl InfrastructureError {
    pub fn new(kind: InfrastructureKind, context: impl Into<String>) -> Self {
        Self {
            kind,
            context: context.into(),
        }
    }

    pub fn database(context: impl Into<String>) -> Self {
        Self::new(InfrastructureKind::Database, context)
    }

    pub fn timeout(context: impl Into<String>) -> Self {
        Self::new(InfrastructureKind::Timeout, context)
    }

    pub fn unavailable(context: impl Into<String>) -> Self {
        Self::new(InfrastructureKind::Unavailable, context)
    }

    pub fn unexpected(context: impl Into<String>) -> Self {
        Self::new(InfrastructureKind::Unexpected, context)
    }
}

/// Discriminant of [`GatewayError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Frame,
    Transport,
    Business,
    Infrastructure,
    Cancelled,
}

/// Any failure the gateway can report for a single message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error(transparent)]
    Frame(#[from] FrameError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Business(#[from] BusinessError),

    #[error(transparent)]
    Infrastructure(#[from] InfrastructureError),

    /// Work item cancelled between lifecycle phases.
    #[error("Work item {trace_id} cancelled")]
    Cancelled { trace_id: String },
}

impl GatewayError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GatewayError::Frame(_) => ErrorKind::Frame,
            GatewayError::Transport(_) => ErrorKind::Transport,
            GatewayError::Business(_) => ErrorKind::Business,
            GatewayError::Infrastructure(_) => ErrorKind::Infrastructure,
            GatewayError::Cancelled { .. } => ErrorKind::Cancelled,
        }
    }

    /// Only infrastructure and transport failures are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Infrastructure | ErrorKind::Transport
        )
    }
}
