//! Operator session state machine.
//!
//! State Machine:
//! ```text
//!                 ┌── Validate ──┐
//!                 ↓              │
//! (none) ──→ [STARTED] ──────────┘
//!               │   │
//!               │   └── Execute / Register ──→ [EXECUTED] ── Confirm ──→ [CONFIRMED]
//!               │                                 │
//!               └──────────── Cancel ─────────────┴──────→ [CANCELLED]
//!
//! any unhandled legacy failure ──→ [CONFIG_ERROR] ── Cancel ──→ [CANCELLED]
//! ```
//!
//! Re-running a phase whose effect is already persisted is reported as
//! `AlreadyApplied` and never reaches the legacy store again.
//!
//! A session key outlives one cycle. Once it is `CONFIRMED` or `CANCELLED`,
//! a Validate, Execute or Register opens a fresh `STARTED` session for it.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::action::Action;

/// Persisted lifecycle status of an operator session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Situation {
    /// An unhandled legacy failure left the session in an unknown state.
    ConfigError,
    Started,
    Executed,
    Confirmed,
    Cancelled,
}

impl Situation {
    /// Wire value carried in replies and stored by the legacy side.
    pub fn code(self) -> i8 {
        match self {
            Self::ConfigError => -1,
            Self::Started => 0,
            Self::Executed => 1,
            Self::Confirmed => 2,
            Self::Cancelled => 9,
        }
    }

    pub fn from_code(code: i8) -> Option<Self> {
        match code {
            -1 => Some(Self::ConfigError),
            0 => Some(Self::Started),
            1 => Some(Self::Executed),
            2 => Some(Self::Confirmed),
            9 => Some(Self::Cancelled),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ConfigError => "config_error",
            Self::Started => "started",
            Self::Executed => "executed",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Confirmed | Self::Cancelled)
    }
}

impl fmt::Display for Situation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the lifecycle must do for `(current, action)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Field validation only; the situation does not change.
    Validate,
    /// Run the phase's external calls, then persist `to`.
    Advance { to: Situation },
    /// The phase's effect is already persisted.
    AlreadyApplied,
    /// Not allowed from this situation.
    Invalid,
}

/// Situation a transaction runs from, given what the store recovered.
///
/// `None` when no session exists yet and one must be allocated as
/// `Started`. A finished session is reopened only by an action that begins a
/// new cycle; Confirm and Cancel still see the terminal situation so replays
/// stay `AlreadyApplied`.
pub fn starting_situation(recovered: Option<Situation>, action: Action) -> Option<Situation> {
    match recovered {
        Some(current) if current.is_terminal() && action.opens_cycle() => None,
        other => other,
    }
}

/// Pure transition function.
pub fn transition(current: Situation, action: Action) -> Transition {
    use Situation::*;

    match (current, action) {
        (Started, Action::Validate) => Transition::Validate,

        (Started, Action::Execute) => Transition::Advance { to: Executed },
        (Started, Action::Register) => Transition::Advance { to: Executed },
        (Executed, Action::Execute | Action::Register) => Transition::AlreadyApplied,

        (Executed, Action::Confirm) => Transition::Advance { to: Confirmed },
        (Confirmed, Action::Confirm) => Transition::AlreadyApplied,

        (Started | Executed | ConfigError, Action::Cancel) => {
            Transition::Advance { to: Cancelled }
        }
        (Cancelled, Action::Cancel) => Transition::AlreadyApplied,

        _ => Transition::Invalid,
    }
}
