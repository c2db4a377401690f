//! Lifecycle domain: pure types and rules, no I/O.

pub mod action;
pub mod config;
pub mod outcome;
pub mod session;
pub mod spx;
pub mod state_machine;

pub use action::{recover_action, Action, Family, TransactionKind};
pub use config::RetryPolicy;
pub use outcome::{LifecycleError, Outcome};
pub use session::{validate_fields, SessionKey};
pub use spx::{procedures, SpxCall, SpxParameters, SpxResult, SpxRow, SpxValue, OUTPUT_COLUMN};
pub use state_machine::{starting_situation, transition, Situation, Transition};
