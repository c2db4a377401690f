//! HTTP request body to `Transaction` mapping.
//!
//! The HTTP entry point carries the same transaction as the TCP path, but
//! as JSON:
//!
//! ```json
//! { "code": 2001, "header": "{\"version\":1, ...}", "payload": "BA-CE-DI" }
//! ```
//!
//! `header` is itself a JSON document (camelCase fields) and `payload` is
//! text whose characters are mapped one-to-one onto ISO-8859-1 bytes.

use bytes::Bytes;
use serde::Deserialize;
use spa_01_header_codec::latin1;
use spa_types::{Header, Transaction, HEADER_SIZE};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MappingError {
    #[error("Malformed request body: {0}")]
    Body(String),

    #[error("Malformed header document: {0}")]
    Header(String),

    #[error("Payload character {ch:?} at index {index} is not ISO-8859-1")]
    Unmappable { ch: char, index: usize },

    #[error("Payload of {len} bytes does not fit in one message")]
    PayloadTooLarge { len: usize },
}

/// Wire shape of the HTTP request body.
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionRequest {
    pub code: i32,
    pub header: String,
    #[serde(default)]
    pub payload: String,
}

/// Decodes a raw JSON request body.
pub fn decode_request(body: &[u8]) -> Result<Transaction, MappingError> {
    let request: TransactionRequest =
        serde_json::from_slice(body).map_err(|e| MappingError::Body(e.to_string()))?;
    to_transaction(&request)
}

/// Builds the transaction for an already-parsed request.
///
/// `header_size` and `message_size` are recomputed from the payload so the
/// header matches what the TCP path would have produced.
pub fn to_transaction(request: &TransactionRequest) -> Result<Transaction, MappingError> {
    let mut header: Header =
        serde_json::from_str(&request.header).map_err(|e| MappingError::Header(e.to_string()))?;

    let payload = latin1::encode(&request.payload).map_err(|ch| MappingError::Unmappable {
        ch,
        index: request
            .payload
            .chars()
            .position(|c| c == ch)
            .unwrap_or_default(),
    })?;

    let message_size = i16::try_from(HEADER_SIZE + payload.len())
        .map_err(|_| MappingError::PayloadTooLarge { len: payload.len() })?;
    header.header_size = HEADER_SIZE as u8;
    header.message_size = message_size;

    Ok(Transaction::new(request.code, header, Bytes::from(payload)))
}
