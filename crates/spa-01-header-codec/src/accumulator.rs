//! Stream framing.
//!
//! TCP carries no message boundaries: a read may return part of a header, a
//! header plus part of its payload, or several frames at once. The
//! accumulator buffers whatever arrives and hands out complete frames.

use bytes::{Buf, BytesMut};
use spa_types::{FrameError, FramedMessage, HEADER_SIZE};

use crate::codec;

/// Default initial buffer capacity.
pub const DEFAULT_BUFFER_CAPACITY: usize = 8 * 1024;

/// Reassembles frames from arbitrarily chunked input.
#[derive(Debug)]
pub struct FrameAccumulator {
    buffer: BytesMut,
}

impl FrameAccumulator {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_BUFFER_CAPACITY)
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(capacity.max(HEADER_SIZE)),
        }
    }

    /// Appends received bytes.
    pub fn extend(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);
    }

    /// Direct access for `AsyncReadExt::read_buf`.
    pub fn buffer_mut(&mut self) -> &mut BytesMut {
        &mut self.buffer
    }

    /// Bytes received but not yet returned as a frame.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Returns the next complete frame, if any.
    ///
    /// - `None`: more bytes are needed
    /// - `Some(Ok(_))`: one complete frame, removed from the buffer
    /// - `Some(Err(_))`: a malformed header; its `HEADER_SIZE` bytes were
    ///   discarded and the caller may keep polling
    pub fn next_frame(&mut self) -> Option<Result<FramedMessage, FrameError>> {
        if self.buffer.len() < HEADER_SIZE {
            return None;
        }

        let header = match codec::decode(&self.buffer) {
            Ok(header) => header,
            Err(err) => {
                self.buffer.advance(HEADER_SIZE);
                return Some(Err(err));
            }
        };

        let total = header.message_size as usize;
        if self.buffer.len() < total {
            self.buffer.reserve(total - self.buffer.len());
            return None;
        }

        let mut frame = self.buffer.split_to(total).freeze();
        frame.advance(HEADER_SIZE);

        Some(Ok(FramedMessage {
            header,
            payload: frame,
        }))
    }
}

impl Default for FrameAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{encode, encode_frame};
    use spa_types::Header;

    fn frame(payload: &[u8]) -> Vec<u8> {
        encode_frame(&Header::default(), payload).unwrap().to_vec()
    }

    fn drain(acc: &mut FrameAccumulator) -> Vec<Result<FramedMessage, FrameError>> {
        std::iter::from_fn(|| acc.next_frame()).collect()
    }

    #[test]
    fn test_waits_for_full_header() {
        let mut acc = FrameAccumulator::new();
        acc.extend(&frame(b"abc")[..HEADER_SIZE - 1]);
        assert!(acc.next_frame().is_none());
    }

    #[test]
    fn test_waits_for_full_payload() {
        let bytes = frame(b"abcdef");
        let mut acc = FrameAccumulator::new();
        acc.extend(&bytes[..HEADER_SIZE + 3]);
        assert!(acc.next_frame().is_none());

        acc.extend(&bytes[HEADER_SIZE + 3..]);
        let message = acc.next_frame().unwrap().unwrap();
        assert_eq!(message.payload.as_ref(), b"abcdef");
        assert_eq!(acc.buffered(), 0);
    }

    #[test]
    fn test_one_byte_at_a_time() {
        let mut stream = Vec::new();
        stream.extend(frame(b"first"));
        stream.extend(frame(b""));
        stream.extend(frame(b"third"));

        let mut acc = FrameAccumulator::with_capacity(1);
        let mut payloads = Vec::new();
        for byte in stream {
            acc.extend(&[byte]);
            while let Some(result) = acc.next_frame() {
                payloads.push(result.unwrap().payload.to_vec());
            }
        }

        assert_eq!(
            payloads,
            vec![b"first".to_vec(), Vec::new(), b"third".to_vec()]
        );
    }

    #[test]
    fn test_malformed_header_skipped() {
        let bad = Header {
            message_size: 3,
            ..Header::default()
        };

        let mut acc = FrameAccumulator::new();
        acc.extend(&encode(&bad));
        acc.extend(&frame(b"next"));

        let results = drain(&mut acc);
        assert_eq!(results.len(), 2);
        assert!(matches!(results[0], Err(FrameError::SizeMismatch { .. })));
        assert_eq!(results[1].as_ref().unwrap().payload.as_ref(), b"next");
    }
}
