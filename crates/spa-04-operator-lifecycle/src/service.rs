//! Operator Lifecycle Service - drives one transaction per call.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use spa_01_header_codec::latin1;
use spa_03_work_queue::WorkItem;
use spa_types::{codes, BusinessError, ErrorKind, GatewayError};
use tracing::{debug, info, warn};

use crate::domain::{
    procedures, recover_action, starting_situation, transition, validate_fields, Action, Family, LifecycleError,
    Outcome, RetryPolicy, SessionKey, Situation, SpxCall, SpxParameters, SpxValue, Transition,
    OUTPUT_COLUMN,
};
use crate::ports::{LegacyStore, LifecycleApi, PasswordRequest, PasswordService};
use crate::retry::execute_with_retry;
use crate::session_lock::SessionLocks;

/// Lifecycle service over a legacy store and a password service.
pub struct OperatorLifecycle<L, P>
where
    L: LegacyStore,
    P: PasswordService,
{
    store: Arc<L>,
    passwords: Arc<P>,
    retry: RetryPolicy,
    sessions: SessionLocks,
}

impl<L, P> OperatorLifecycle<L, P>
where
    L: LegacyStore,
    P: PasswordService,
{
    pub fn new(store: Arc<L>, passwords: Arc<P>, retry: RetryPolicy) -> Self {
        Self {
            store,
            passwords,
            retry,
            sessions: SessionLocks::new(),
        }
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    fn ensure_active(item: &WorkItem) -> Result<(), GatewayError> {
        if item.is_cancelled() {
            return Err(GatewayError::Cancelled {
                trace_id: item.trace_id().to_string(),
            });
        }
        Ok(())
    }

    /// Reads the persisted situation. Allocates a session on first sight and
    /// reopens a finished one when `action` begins a new cycle.
    async fn start(&self, key: &SessionKey, action: Action) -> Result<Situation, GatewayError> {
        let store = &self.store;

        let recovered = execute_with_retry(&self.retry, "recover_situation", move || {
            store.recover_situation(key)
        })
        .await?;

        if let Some(situation) = starting_situation(recovered, action) {
            debug!(session = %key, situation = %situation, "Session resumed");
            return Ok(situation);
        }

        self.persist(key, Situation::Started).await?;
        match recovered {
            Some(previous) => {
                debug!(session = %key, previous = %previous, "Session reopened for a new cycle")
            }
            None => debug!(session = %key, "Session started"),
        }
        Ok(Situation::Started)
    }

    async fn persist(&self, key: &SessionKey, situation: Situation) -> Result<(), GatewayError> {
        let store = &self.store;
        execute_with_retry(&self.retry, "persist_situation", move || {
            store.persist_situation(key, situation)
        })
        .await
    }

    /// Runs one procedure through the retry boundary. Returns the output
    /// column, empty when the procedure produced none.
    async fn call_spx(
        &self,
        procedure: &'static str,
        parameters: SpxParameters,
    ) -> Result<Bytes, GatewayError> {
        let call = SpxCall::new(procedure, parameters);
        let store = &self.store;
        let call_ref = &call;

        let result = execute_with_retry(&self.retry, procedure, move || store.execute_spx(call_ref))
            .await?
            .into_business_result(procedure)?;

        Ok(result
            .value(OUTPUT_COLUMN)
            .and_then(SpxValue::as_bytes)
            .cloned()
            .unwrap_or_default())
    }

    async fn test_password(&self, request: &PasswordRequest) -> Result<(), GatewayError> {
        let passwords = &self.passwords;
        execute_with_retry(&self.retry, "TestarSenha", move || passwords.test_password(request)).await
    }

    async fn generate_output(&self, request: &PasswordRequest) -> Result<String, GatewayError> {
        let passwords = &self.passwords;
        execute_with_retry(&self.retry, "GerarSaidaSenha", move || {
            passwords.generate_output(request)
        })
        .await
    }

    /// External calls of one phase, with a cancellation check before each.
    async fn run_phase(
        &self,
        item: &WorkItem,
        family: Family,
        action: Action,
        key: &SessionKey,
    ) -> Result<Bytes, GatewayError> {
        let transaction = item.transaction();
        let base = SpxParameters::for_session(key);
        let with_data = |base: &SpxParameters| {
            base.clone()
                .with(OUTPUT_COLUMN, SpxValue::Bytes(transaction.payload().clone()))
        };
        let password_request = || PasswordRequest {
            session: *key,
            terminal_id: transaction.header().origin.terminal_id,
            data: latin1::decode(transaction.payload()),
        };

        Self::ensure_active(item)?;

        match action {
            Action::Execute => match family {
                Family::CardIdentification => {
                    self.call_spx(procedures::IDENTIFY_CARD, with_data(&base)).await
                }
                Family::SyllabicPassword => {
                    self.test_password(&password_request()).await?;
                    Self::ensure_active(item)?;
                    self.call_spx(procedures::EXECUTE_PASSWORD, with_data(&base)).await
                }
            },
            Action::Confirm => self.call_spx(procedures::CONFIRM_PASSWORD, base).await,
            Action::Cancel => self.call_spx(procedures::CANCEL_PASSWORD, base).await,
            Action::Register => {
                let output = self.generate_output(&password_request()).await?;
                Self::ensure_active(item)?;

                let params = base.with("saida", SpxValue::Text(output.clone()));
                let data = self.call_spx(procedures::REGISTER_PASSWORD, params).await?;
                if data.is_empty() {
                    Ok(Bytes::from(latin1::encode_lossy(&output)))
                } else {
                    Ok(data)
                }
            }
            // Validate never leaves Started and never reaches a phase.
            Action::Validate => Ok(Bytes::new()),
        }
    }

    /// Records a failed phase. Unhandled legacy failures move the session to
    /// `ConfigError`; business rejections and cancellation leave it as is.
    async fn fail(
        &self,
        key: &SessionKey,
        current: Situation,
        action: Action,
        error: GatewayError,
    ) -> LifecycleError {
        let failure = LifecycleError::new(error).with_action(action);

        match failure.error.kind() {
            ErrorKind::Infrastructure | ErrorKind::Transport | ErrorKind::Frame => {
                warn!(
                    session = %key,
                    action = %action,
                    error = %failure.error,
                    "Unhandled legacy failure, session marked as config error"
                );
                if let Err(e) = self.persist(key, Situation::ConfigError).await {
                    warn!(session = %key, error = %e, "Could not persist config error");
                }
                failure.with_situation(Situation::ConfigError)
            }
            ErrorKind::Business | ErrorKind::Cancelled => {
                info!(session = %key, action = %action, error = %failure.error, "Phase rejected");
                failure.with_situation(current)
            }
        }
    }
}

#[async_trait]
impl<L, P> LifecycleApi for OperatorLifecycle<L, P>
where
    L: LegacyStore,
    P: PasswordService,
{
    async fn process(&self, item: &WorkItem) -> Result<Outcome, LifecycleError> {
        let transaction = item.transaction();

        let kind = recover_action(transaction.code()).map_err(LifecycleError::new)?;
        let action = kind.action;
        let reject = |e: GatewayError| LifecycleError::new(e).with_action(action);

        let key = SessionKey::from_header(transaction.header()).map_err(|e| reject(e.into()))?;
        let _session = self.sessions.acquire(key).await;
        Self::ensure_active(item).map_err(reject)?;
        let current = self.start(&key, action).await.map_err(reject)?;

        debug!(session = %key, action = %action, situation = %current, "Transaction recovered");

        match transition(current, action) {
            Transition::Invalid => {
                let error = BusinessError::new(
                    codes::INVALID_TRANSITION,
                    format!("Cannot {action} a session in situation {current}"),
                );
                info!(session = %key, action = %action, situation = %current, "Transition rejected");
                Err(reject(error.into()).with_situation(current))
            }

            Transition::AlreadyApplied => {
                info!(session = %key, action = %action, situation = %current, "Already applied, skipping");
                Ok(Outcome::AlreadyApplied { situation: current })
            }

            Transition::Validate => {
                validate_fields(kind.family, transaction)
                    .map_err(|e| reject(e.into()).with_situation(current))?;
                info!(session = %key, "Validated");
                Ok(Outcome::Validated)
            }

            Transition::Advance { to } => {
                let data = match self.run_phase(item, kind.family, action, &key).await {
                    Ok(data) => data,
                    Err(e) => return Err(self.fail(&key, current, action, e).await),
                };

                if let Err(e) = self.persist(&key, to).await {
                    return Err(self.fail(&key, current, action, e).await);
                }

                info!(session = %key, action = %action, from = %current, to = %to, "Phase applied");
                Ok(Outcome::Applied {
                    situation: to,
                    data,
                })
            }
        }
    }
}
