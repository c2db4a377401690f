//! # SPA Types Crate
//!
//! This crate contains the entities exchanged between the gateway components
//! and the tagged error taxonomy they report with.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: the `Header` layout is defined once, here.
//! - **Immutable Values**: headers, frames and transactions are never mutated
//!   after construction; a reply header is a new value.
//! - **Tagged Errors**: failures are matched by variant, not by type hierarchy.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
