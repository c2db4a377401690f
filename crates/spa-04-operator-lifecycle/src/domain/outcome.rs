//! Result of driving one transaction.

use bytes::Bytes;
use spa_types::GatewayError;
use thiserror::Error;

use super::action::Action;
use super::state_machine::Situation;

/// Successful lifecycle step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Validate phase passed; nothing was called or persisted.
    Validated,
    /// The phase ran and `situation` was persisted.
    Applied { situation: Situation, data: Bytes },
    /// The phase had already been applied; no external call was made.
    AlreadyApplied { situation: Situation },
}

impl Outcome {
    pub fn situation(&self) -> Situation {
        match self {
            Self::Validated => Situation::Started,
            Self::Applied { situation, .. } | Self::AlreadyApplied { situation } => *situation,
        }
    }

    /// Bytes returned to the caller in the reply body.
    pub fn data(&self) -> Bytes {
        match self {
            Self::Applied { data, .. } => data.clone(),
            _ => Bytes::new(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validated => "validated",
            Self::Applied { .. } => "applied",
            Self::AlreadyApplied { .. } => "already_applied",
        }
    }
}

/// Failed lifecycle step, with what is known about the session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{error}")]
pub struct LifecycleError {
    pub error: GatewayError,
    /// `None` when the code was unknown.
    pub action: Option<Action>,
    /// `None` when no session could be read or allocated.
    pub situation: Option<Situation>,
}

impl LifecycleError {
    pub fn new(error: impl Into<GatewayError>) -> Self {
        Self {
            error: error.into(),
            action: None,
            situation: None,
        }
    }

    #[must_use]
    pub fn with_action(mut self, action: Action) -> Self {
        self.action = Some(action);
        self
    }

    #[must_use]
    pub fn with_situation(mut self, situation: Situation) -> Self {
        self.situation = Some(situation);
        self
    }

    /// Situation value for the reply; `-1` when unknown.
    pub fn situation_code(&self) -> i8 {
        self.situation.map_or(Situation::ConfigError.code(), Situation::code)
    }
}
