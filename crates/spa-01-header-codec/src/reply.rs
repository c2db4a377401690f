//! Reply body carried back to the caller.
//!
//! Every reply, successful or not, starts with the same prefix so the caller
//! can tell failures apart without parsing free text:
//!
//! ```text
//! status u8 | code i32 | situation i8 | data_len u16 | data
//! ```

use bytes::{Buf, BufMut, Bytes, BytesMut};
use spa_types::{ErrorKind, FrameError, GatewayError, InfrastructureKind};

use crate::latin1;

/// Size of the fixed reply prefix.
pub const REPLY_PREFIX_SIZE: usize = 8;

/// Error codes for failures that do not carry their own business code.
pub mod codes {
    pub const FRAME_ERROR: i32 = 8001;
    pub const TRANSPORT_ERROR: i32 = 8101;
    pub const CANCELLED: i32 = 8201;
    pub const DATABASE_ERROR: i32 = 9001;
    pub const TIMEOUT_ERROR: i32 = 9002;
    pub const UNAVAILABLE_ERROR: i32 = 9003;
    pub const UNEXPECTED_ERROR: i32 = 9999;
}

/// Outcome class of a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ReplyStatus {
    Ok = 0,
    Business = 1,
    Infrastructure = 2,
    Frame = 3,
    Transport = 4,
    Cancelled = 5,
}

impl ReplyStatus {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Ok),
            1 => Some(Self::Business),
            2 => Some(Self::Infrastructure),
            3 => Some(Self::Frame),
            4 => Some(Self::Transport),
            5 => Some(Self::Cancelled),
            _ => None,
        }
    }
}

impl From<ErrorKind> for ReplyStatus {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::Frame => Self::Frame,
            ErrorKind::Transport => Self::Transport,
            ErrorKind::Business => Self::Business,
            ErrorKind::Infrastructure => Self::Infrastructure,
            ErrorKind::Cancelled => Self::Cancelled,
        }
    }
}

/// Structured reply payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyBody {
    pub status: ReplyStatus,
    pub code: i32,
    pub situation: i8,
    pub data: Bytes,
}

impl ReplyBody {
    /// Successful reply carrying `data`.
    pub fn ok(situation: i8, data: Bytes) -> Self {
        Self {
            status: ReplyStatus::Ok,
            code: 0,
            situation,
            data,
        }
    }

    /// Failure reply. The message travels as single-byte text.
    pub fn from_error(error: &GatewayError, situation: i8) -> Self {
        let code = match error {
            GatewayError::Business(e) => e.code,
            GatewayError::Frame(_) => codes::FRAME_ERROR,
            GatewayError::Transport(_) => codes::TRANSPORT_ERROR,
            GatewayError::Cancelled { .. } => codes::CANCELLED,
            GatewayError::Infrastructure(e) => match e.kind {
                InfrastructureKind::Database => codes::DATABASE_ERROR,
                InfrastructureKind::Timeout => codes::TIMEOUT_ERROR,
                InfrastructureKind::Unavailable => codes::UNAVAILABLE_ERROR,
                InfrastructureKind::Unexpected => codes::UNEXPECTED_ERROR,
            },
        };

        let message = match error {
            GatewayError::Business(e) => e.message.clone(),
            other => other.to_string(),
        };

        Self {
            status: error.kind().into(),
            code,
            situation,
            data: Bytes::from(latin1::encode_lossy(&message)),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == ReplyStatus::Ok
    }

    /// Encodes the body. Data beyond `u16::MAX` bytes is rejected.
    pub fn encode(&self) -> Result<Bytes, FrameError> {
        let data_len = u16::try_from(self.data.len()).map_err(|_| FrameError::PayloadTooLarge {
            payload_len: self.data.len(),
            max: u16::MAX as usize,
        })?;

        let mut buf = BytesMut::with_capacity(REPLY_PREFIX_SIZE + self.data.len());
        buf.put_u8(self.status as u8);
        buf.put_i32_le(self.code);
        buf.put_i8(self.situation);
        buf.put_u16_le(data_len);
        buf.put_slice(&self.data);
        Ok(buf.freeze())
    }

    /// Decodes a body produced by [`ReplyBody::encode`].
    pub fn decode(bytes: &[u8]) -> Result<Self, FrameError> {
        if bytes.len() < REPLY_PREFIX_SIZE {
            return Err(FrameError::Truncated {
                needed: REPLY_PREFIX_SIZE,
                available: bytes.len(),
            });
        }

        let mut buf = bytes;
        let raw_status = buf.get_u8();
        let code = buf.get_i32_le();
        let situation = buf.get_i8();
        let data_len = buf.get_u16_le() as usize;

        if buf.len() < data_len {
            return Err(FrameError::Truncated {
                needed: REPLY_PREFIX_SIZE + data_len,
                available: bytes.len(),
            });
        }

        // Unknown status values are treated as unexpected failures.
        let status = ReplyStatus::from_u8(raw_status).unwrap_or(ReplyStatus::Infrastructure);

        Ok(Self {
            status,
            code,
            situation,
            data: Bytes::copy_from_slice(&buf[..data_len]),
        })
    }

    /// Data decoded as single-byte text.
    pub fn message(&self) -> String {
        latin1::decode(&self.data)
    }
}
