//! Transaction code lookup.
//!
//! A code is `family * 10 + digit`. The family picks the product line, the
//! digit picks the phase:
//!
//! | Digit | Action |
//! |-------|--------|
//! | 0 | Validate |
//! | 1 | Execute |
//! | 2 | Confirm |
//! | 5 | Register |
//! | 9 | Cancel |

use std::fmt;

use serde::{Deserialize, Serialize};
use spa_types::{codes, BusinessError};

/// Product line a transaction belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Family {
    /// Family 100.
    CardIdentification,
    /// Family 200.
    SyllabicPassword,
}

impl Family {
    pub fn code(self) -> i32 {
        match self {
            Self::CardIdentification => 100,
            Self::SyllabicPassword => 200,
        }
    }

    fn from_code(family: i32) -> Option<Self> {
        match family {
            100 => Some(Self::CardIdentification),
            200 => Some(Self::SyllabicPassword),
            _ => None,
        }
    }
}

/// Processing phase requested by a transaction. Fixed for its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Validate,
    Execute,
    Confirm,
    Register,
    Cancel,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Validate => "validate",
            Self::Execute => "execute",
            Self::Confirm => "confirm",
            Self::Register => "register",
            Self::Cancel => "cancel",
        }
    }

    /// Validate, Execute and Register begin a new cycle for a session key.
    pub fn opens_cycle(self) -> bool {
        matches!(self, Self::Validate | Self::Execute | Self::Register)
    }

    fn from_digit(digit: i32) -> Option<Self> {
        match digit {
            0 => Some(Self::Validate),
            1 => Some(Self::Execute),
            2 => Some(Self::Confirm),
            5 => Some(Self::Register),
            9 => Some(Self::Cancel),
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Family and action decoded from a transaction code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransactionKind {
    pub family: Family,
    pub action: Action,
}

/// Maps a transaction code to its family and action.
///
/// Pure lookup: the same code always yields the same answer.
///
/// # Errors
///
/// `UNKNOWN_TRANSACTION_CODE` when either part is not in the table.
pub fn recover_action(code: i32) -> Result<TransactionKind, BusinessError> {
    let unknown = || {
        BusinessError::new(
            codes::UNKNOWN_TRANSACTION_CODE,
            format!("Unknown transaction code {code}"),
        )
    };

    if code < 0 {
        return Err(unknown());
    }

    let family = Family::from_code(code / 10).ok_or_else(unknown)?;
    let action = Action::from_digit(code % 10).ok_or_else(unknown)?;

    Ok(TransactionKind { family, action })
}
