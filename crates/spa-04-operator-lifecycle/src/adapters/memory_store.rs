//! In-memory `LegacyStore` for development and tests.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use parking_lot::Mutex;
use spa_types::GatewayError;
use tracing::debug;

use crate::domain::{SessionKey, Situation, SpxCall, SpxResult};
use crate::ports::LegacyStore;

/// Keeps situations in a map and answers procedures from a script.
///
/// A procedure with nothing scripted succeeds with an empty result. Every
/// call is recorded so tests can count external effects.
#[derive(Default)]
pub struct InMemoryLegacyStore {
    situations: Mutex<HashMap<SessionKey, Situation>>,
    scripted: Mutex<HashMap<&'static str, VecDeque<Result<SpxResult, GatewayError>>>>,
    calls: Mutex<Vec<SpxCall>>,
}

impl InMemoryLegacyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues the next answer for `procedure`. Answers are consumed in order.
    pub fn script(&self, procedure: &'static str, result: Result<SpxResult, GatewayError>) {
        self.scripted
            .lock()
            .entry(procedure)
            .or_default()
            .push_back(result);
    }

    /// Seeds a persisted situation.
    pub fn set_situation(&self, key: SessionKey, situation: Situation) {
        self.situations.lock().insert(key, situation);
    }

    pub fn situation(&self, key: &SessionKey) -> Option<Situation> {
        self.situations.lock().get(key).copied()
    }

    /// Every procedure call seen so far, in order.
    pub fn calls(&self) -> Vec<SpxCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self, procedure: &str) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| c.procedure == procedure)
            .count()
    }
}

#[async_trait]
impl LegacyStore for InMemoryLegacyStore {
    async fn execute_spx(&self, call: &SpxCall) -> Result<SpxResult, GatewayError> {
        self.calls.lock().push(call.clone());
        debug!(procedure = call.procedure, params = call.parameters.len(), "SPX call");

        self.scripted
            .lock()
            .get_mut(call.procedure)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Ok(SpxResult::ok()))
    }

    async fn recover_situation(&self, key: &SessionKey) -> Result<Option<Situation>, GatewayError> {
        Ok(self.situation(key))
    }

    async fn persist_situation(
        &self,
        key: &SessionKey,
        situation: Situation,
    ) -> Result<(), GatewayError> {
        self.set_situation(*key, situation);
        Ok(())
    }
}
