//! # SPA Response Router
//!
//! **Component:** 5
//! **Depends on:** Header Codec (1), Socket Transport (2)
//!
//! ## Purpose
//!
//! Turns a processed transaction into a reply frame addressed back to its
//! caller and writes it on the shared router connection.
//!
//! ```text
//! request header ──reply_header──→ reply header (origin ⇄ destination)
//!                                        │
//! ReplyBody ──encode──→ payload ─────────┴──→ FrameSender::send
//!                                               │ transport error
//!                                               └──→ disconnect, connect, retry
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod header;
pub mod router;

pub use header::reply_header;
pub use router::{ResponseRouter, RouterConfig};
