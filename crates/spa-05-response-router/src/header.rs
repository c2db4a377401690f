//! Reply header derivation.

use spa_01_header_codec::MAX_MESSAGE_SIZE;
use spa_types::{FrameError, Header};

/// Builds the header for a reply to `request` carrying `payload_len` bytes.
///
/// | Field | Reply value |
/// |-------|-------------|
/// | origin / destination | swapped, verbatim |
/// | compressed | 0 |
/// | header_size | request's |
/// | message_size | header_size + payload_len |
/// | everything else | copied |
///
/// # Errors
///
/// `PayloadTooLarge` when the reply cannot be described by `message_size`.
pub fn reply_header(request: &Header, payload_len: usize) -> Result<Header, FrameError> {
    let header_size = usize::from(request.header_size);
    let max_payload = MAX_MESSAGE_SIZE.saturating_sub(header_size);

    if payload_len > max_payload {
        return Err(FrameError::PayloadTooLarge {
            payload_len,
            max: max_payload,
        });
    }

    Ok(Header {
        version: request.version,
        time_to_live: request.time_to_live,
        destination_ok: request.destination_ok,
        compressed: 0,
        header_size: request.header_size,
        message_size: (header_size + payload_len) as i16,
        badge: request.badge,
        timeout: request.timeout,
        origin: request.destination,
        destination: request.origin,
        account_product: request.account_product,
        account_product_branch: request.account_product_branch,
        account_product_number: request.account_product_number,
    })
}
