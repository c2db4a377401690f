//! Header encode/decode over byte buffers.
//!
//! Both directions walk the fields in declaration order with fixed widths, so
//! the layout never depends on in-memory struct representation.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use spa_types::{Endpoint, FrameError, Header, HEADER_SIZE};

/// Largest frame the 16-bit `message_size` field can describe.
pub const MAX_MESSAGE_SIZE: usize = i16::MAX as usize;

/// Decodes a header from the first [`HEADER_SIZE`] bytes of `bytes`.
///
/// # Errors
///
/// - `Truncated` if fewer than `HEADER_SIZE` bytes are available
/// - `UnsupportedHeaderSize` if the `header_size` field is not `HEADER_SIZE`
/// - `SizeMismatch` if `message_size < header_size`
pub fn decode(bytes: &[u8]) -> Result<Header, FrameError> {
    if bytes.len() < HEADER_SIZE {
        return Err(FrameError::Truncated {
            needed: HEADER_SIZE,
            available: bytes.len(),
        });
    }

    let mut buf = &bytes[..HEADER_SIZE];

    let version = buf.get_u8();
    let time_to_live = buf.get_u8();
    let destination_ok = buf.get_u8();
    let compressed = buf.get_u8();
    let header_size = buf.get_u8();
    let message_size = buf.get_i16_le();
    let badge = buf.get_i32_le();
    let timeout = buf.get_i16_le();
    let origin = get_endpoint(&mut buf);
    let destination = get_endpoint(&mut buf);
    let account_product = buf.get_i16_le();
    let account_product_branch = buf.get_i16_le();
    let account_product_number = buf.get_i64_le();

    if header_size as usize != HEADER_SIZE {
        return Err(FrameError::UnsupportedHeaderSize {
            declared: header_size,
            expected: HEADER_SIZE,
        });
    }

    if message_size < header_size as i16 {
        return Err(FrameError::SizeMismatch {
            message_size,
            header_size,
        });
    }

    Ok(Header {
        version,
        time_to_live,
        destination_ok,
        compressed,
        header_size,
        message_size,
        badge,
        timeout,
        origin,
        destination,
        account_product,
        account_product_branch,
        account_product_number,
    })
}

/// Encodes a header into its fixed-size wire form.
pub fn encode(header: &Header) -> [u8; HEADER_SIZE] {
    let mut out = [0u8; HEADER_SIZE];
    let mut buf = &mut out[..];
    encode_into(header, &mut buf);
    out
}

/// Appends the wire form of `header` to `buf`.
pub fn encode_into<B: BufMut>(header: &Header, buf: &mut B) {
    buf.put_u8(header.version);
    buf.put_u8(header.time_to_live);
    buf.put_u8(header.destination_ok);
    buf.put_u8(header.compressed);
    buf.put_u8(header.header_size);
    buf.put_i16_le(header.message_size);
    buf.put_i32_le(header.badge);
    buf.put_i16_le(header.timeout);
    put_endpoint(buf, &header.origin);
    put_endpoint(buf, &header.destination);
    buf.put_i16_le(header.account_product);
    buf.put_i16_le(header.account_product_branch);
    buf.put_i64_le(header.account_product_number);
}

/// Frames `header || payload` for transmission.
///
/// `message_size` is written from the actual payload length so the bytes on
/// the wire always satisfy the size invariant.
pub fn encode_frame(header: &Header, payload: &[u8]) -> Result<Bytes, FrameError> {
    let total = HEADER_SIZE + payload.len();
    if total > MAX_MESSAGE_SIZE {
        return Err(FrameError::PayloadTooLarge {
            payload_len: payload.len(),
            max: MAX_MESSAGE_SIZE - HEADER_SIZE,
        });
    }

    let framed = Header {
        header_size: HEADER_SIZE as u8,
        message_size: total as i16,
        ..*header
    };

    let mut buf = BytesMut::with_capacity(total);
    encode_into(&framed, &mut buf);
    buf.put_slice(payload);
    Ok(buf.freeze())
}

fn get_endpoint(buf: &mut &[u8]) -> Endpoint {
    let branch = buf.get_i16_le();
    let post = buf.get_u8();
    let operator_id = buf.get_i32_le();
    let terminal_id = buf.get_i16_le();
    let mut ip = [0u8; 4];
    buf.copy_to_slice(&mut ip);
    let port = buf.get_i32_le();

    Endpoint {
        branch,
        post,
        operator_id,
        terminal_id,
        ip,
        port,
    }
}

fn put_endpoint<B: BufMut>(buf: &mut B, endpoint: &Endpoint) {
    buf.put_i16_le(endpoint.branch);
    buf.put_u8(endpoint.post);
    buf.put_i32_le(endpoint.operator_id);
    buf.put_i16_le(endpoint.terminal_id);
    buf.put_slice(&endpoint.ip);
    buf.put_i32_le(endpoint.port);
}
