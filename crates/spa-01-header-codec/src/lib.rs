//! # SPA Header Codec
//!
//! **Component:** 1 (leaf, no gateway dependencies)
//!
//! ## Purpose
//!
//! Encodes and decodes the fixed-size binary header used on the legacy SPA
//! network, splits a TCP byte stream into frames, and encodes the reply body
//! carried back to the caller.
//!
//! ## Wire Layout (little-endian, no padding)
//!
//! ```text
//! offset  size  field
//! ------  ----  -------------------------------
//!      0     1  version
//!      1     1  time_to_live
//!      2     1  destination_ok
//!      3     1  compressed
//!      4     1  header_size            (= 59)
//!      5     2  message_size           (= header_size + payload)
//!      7     4  badge
//!     11     2  timeout
//!     13    17  origin      {branch i16, post u8, operator_id i32,
//!                            terminal_id i16, ip [u8;4], port i32}
//!     30    17  destination {same layout}
//!     47     2  account_product
//!     49     2  account_product_branch
//!     51     8  account_product_number
//! ```
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement |
//! |-----------|-------------|
//! | `decode(encode(h)) == h` | `codec.rs` field order shared by both directions |
//! | `header_size == 59` | `decode()` rejects other values |
//! | `message_size >= header_size` | `decode()` returns `SizeMismatch` |
//! | Malformed frame does not poison the stream | `FrameAccumulator` skips one header |

pub mod accumulator;
pub mod codec;
pub mod latin1;
pub mod reply;

pub use accumulator::FrameAccumulator;
pub use codec::{decode, encode, encode_frame, encode_into, MAX_MESSAGE_SIZE};
pub use reply::{ReplyBody, ReplyStatus, REPLY_PREFIX_SIZE};
