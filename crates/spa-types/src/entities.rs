//! # Core Domain Entities
//!
//! Defines the SPA header, the framed message read off the wire and the
//! transaction value consumed by the operator lifecycle.
//!
//! ## Clusters
//!
//! - **Addressing**: `Endpoint`, `Header`
//! - **Wire**: `FramedMessage`
//! - **Processing**: `Transaction`

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::errors::FrameError;

// =============================================================================
// CLUSTER A: ADDRESSING
// =============================================================================

/// Serialized size of an `Endpoint` in bytes.
pub const ENDPOINT_SIZE: usize = 17;

/// Serialized size of a `Header` in bytes (protocol version 1).
///
/// `5 x u8 + i16 + i32 + i16 + 2 x Endpoint + i16 + i16 + i64`
pub const HEADER_SIZE: usize = 59;

/// Protocol version written into headers built by the gateway.
pub const PROTOCOL_VERSION: u8 = 1;

/// One side of an SPA conversation.
///
/// Identifies a physical branch, a teller station (post), the operator
/// session and the terminal, together with its network address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    /// Bank branch number.
    pub branch: i16,
    /// Teller station within the branch.
    pub post: u8,
    /// Operator session identifier.
    pub operator_id: i32,
    /// Terminal identifier.
    pub terminal_id: i16,
    /// IPv4 address octets.
    pub ip: [u8; 4],
    /// TCP port.
    pub port: i32,
}

impl Endpoint {
    /// Returns true when the branch and post addressing fields are present.
    pub fn has_addressing(&self) -> bool {
        self.branch > 0 && self.post > 0
    }
}

/// The fixed-layout SPA message header.
///
/// `header_size` always equals [`HEADER_SIZE`] for the supported protocol
/// version and `message_size` equals `header_size + payload length`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Header {
    pub version: u8,
    pub time_to_live: u8,
    pub destination_ok: u8,
    pub compressed: u8,
    pub header_size: u8,
    pub message_size: i16,
    /// Operator credential / session token.
    pub badge: i32,
    pub timeout: i16,
    pub origin: Endpoint,
    pub destination: Endpoint,
    pub account_product: i16,
    pub account_product_branch: i16,
    pub account_product_number: i64,
}

impl Default for Header {
    fn default() -> Self {
        Self {
            version: PROTOCOL_VERSION,
            time_to_live: 0,
            destination_ok: 0,
            compressed: 0,
            header_size: HEADER_SIZE as u8,
            message_size: HEADER_SIZE as i16,
            badge: 0,
            timeout: 0,
            origin: Endpoint::default(),
            destination: Endpoint::default(),
            account_product: 0,
            account_product_branch: 0,
            account_product_number: 0,
        }
    }
}

impl Header {
    /// Number of payload bytes announced by this header.
    ///
    /// Zero when the header is malformed (`message_size < header_size`).
    pub fn payload_len(&self) -> usize {
        let total = self.message_size as i32 - self.header_size as i32;
        total.max(0) as usize
    }
}

// =============================================================================
// CLUSTER B: WIRE
// =============================================================================

/// A complete message received from the legacy network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramedMessage {
    pub header: Header,
    pub payload: Bytes,
}

// =============================================================================
// CLUSTER C: PROCESSING
// =============================================================================

/// Size of the transaction code prefix carried by TCP payloads.
pub const TRANSACTION_CODE_SIZE: usize = 4;

/// A syllabic-password transaction (`TransacaoSenhaSilabica`).
///
/// Immutable after construction. Both the TCP path and the HTTP mapping
/// adapter converge on this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    code: i32,
    header: Header,
    payload: Bytes,
}

impl Transaction {
    /// Builds a transaction from its parts.
    pub fn new(code: i32, header: Header, payload: Bytes) -> Self {
        Self {
            code,
            header,
            payload,
        }
    }

    /// Builds a transaction from a framed TCP message.
    ///
    /// The first four payload bytes hold the transaction code (i32 LE); the
    /// rest is the transaction payload.
    pub fn from_framed(message: FramedMessage) -> Result<Self, FrameError> {
        if message.payload.len() < TRANSACTION_CODE_SIZE {
            return Err(FrameError::MissingTransactionCode {
                payload_len: message.payload.len(),
            });
        }

        let mut code_bytes = [0u8; TRANSACTION_CODE_SIZE];
        code_bytes.copy_from_slice(&message.payload[..TRANSACTION_CODE_SIZE]);

        Ok(Self {
            code: i32::from_le_bytes(code_bytes),
            header: message.header,
            payload: message.payload.slice(TRANSACTION_CODE_SIZE..),
        })
    }

    pub fn code(&self) -> i32 {
        self.code
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn payload(&self) -> &Bytes {
        &self.payload
    }
}
