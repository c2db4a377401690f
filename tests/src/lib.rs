//! # SPA Gateway Test Suite
//!
//! Cross-crate tests. Unit tests live next to the code in each crate.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── support.rs        # Fixtures: headers, frames, mock password service, reply reader
//! └── integration/
//!     ├── loopback.rs   # Real sockets: client → gateway → router endpoint
//!     ├── queue_flow.rs # Work queue + lifecycle + router without sockets
//!     └── http_flow.rs  # HTTP mapping adapter into the lifecycle
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p spa-tests
//! cargo test -p spa-tests integration::loopback
//!
//! # Benchmarks
//! cargo bench -p spa-tests
//! ```

#![allow(dead_code)]

pub mod integration;
pub mod support;
