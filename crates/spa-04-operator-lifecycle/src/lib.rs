//! # SPA Operator Lifecycle
//!
//! **Component:** 4
//! **Depends on:** Work Queue (3), Header Codec (1) for ISO-8859-1 text
//!
//! ## Purpose
//!
//! Drives a transaction through validate → execute → confirm/cancel against
//! the legacy store and the external password service.
//!
//! ## Processing Steps
//!
//! 1. `recover_action`: code → family + action (pure lookup).
//! 2. Start: origin must carry branch/post; the session is allocated on
//!    first sight (`Started`), and reallocated when a finished session sees
//!    Validate, Execute or Register.
//! 3. `recover_situation`: the persisted situation decides the transition.
//!    Steps 2 to 5 hold a per-session lock, so concurrent workers never
//!    apply one phase twice.
//! 4. Run the phase's external calls, each through `execute_with_retry`.
//! 5. Persist the new situation.
//!
//! | Current | Action | Calls | Next |
//! |---------|--------|-------|------|
//! | Started | Validate | none | Started |
//! | Started | Execute (100) | `ExecutarSPXIdentificaCartao` | Executed |
//! | Started | Execute (200) | `TestarSenha`, `ExecutarSPXSenhaSilabica` | Executed |
//! | Started | Register | `GerarSaidaSenha`, `RegistrarSPXSenhaSilabica` | Executed |
//! | Executed | Confirm | `ConfirmarSPXSenhaSilabica` | Confirmed |
//! | Started/Executed/ConfigError | Cancel | `CancelarSPXSenhaSilabica` | Cancelled |
//! | Confirmed/Cancelled | Validate/Execute/Register | as from Started | new cycle |
//! | any | unhandled legacy failure | - | ConfigError |
//!
//! Replaying an applied phase returns `Outcome::AlreadyApplied` without any
//! external call. Anything else not in the table is `INVALID_TRANSITION`.
//!
//! ## Failure Semantics
//!
//! - Business rejections are attempted once and leave the situation as is.
//! - Infrastructure failures are retried with a fixed backoff; once
//!   exhausted the session is marked `ConfigError`.
//! - The work item's cancellation token is checked before the first phase
//!   and between external calls, never inside one.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod retry;
pub mod service;
mod session_lock;

#[cfg(feature = "http-password")]
pub use adapters::HttpPasswordService;
pub use adapters::InMemoryLegacyStore;
pub use domain::{
    recover_action, transition, Action, Family, LifecycleError, Outcome, RetryPolicy, SessionKey,
    Situation, SpxCall, SpxParameters, SpxResult, SpxValue, Transition,
};
pub use ports::{LegacyStore, LifecycleApi, PasswordRequest, PasswordService};
pub use retry::execute_with_retry;
pub use service::OperatorLifecycle;
