//! Runtime adapters.

pub mod http_mapping;

pub use http_mapping::{decode_request, to_transaction, MappingError, TransactionRequest};
