//! Driven Ports (SPI - Outbound Dependencies)

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use spa_types::GatewayError;

use crate::domain::{Situation, SessionKey, SpxCall, SpxResult};

/// Legacy data store: SPX procedures plus the persisted session situation.
///
/// Implementations report connection and database failures as
/// `InfrastructureError` and procedure rejections through
/// `SpxResult::return_code`.
#[async_trait]
pub trait LegacyStore: Send + Sync {
    async fn execute_spx(&self, call: &SpxCall) -> Result<SpxResult, GatewayError>;

    /// Last persisted situation, `None` for a session never started.
    async fn recover_situation(&self, key: &SessionKey) -> Result<Option<Situation>, GatewayError>;

    async fn persist_situation(
        &self,
        key: &SessionKey,
        situation: Situation,
    ) -> Result<(), GatewayError>;
}

/// Request sent to the external password service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordRequest {
    #[serde(flatten)]
    pub session: SessionKey,
    pub terminal_id: i16,
    /// Transaction payload decoded as ISO-8859-1.
    pub data: String,
}

/// External syllabic-password service.
#[async_trait]
pub trait PasswordService: Send + Sync {
    /// `GerarSaidaSenha`: builds the syllable groups shown to the customer.
    async fn generate_output(&self, request: &PasswordRequest) -> Result<String, GatewayError>;

    /// `TestarSenha`: checks the typed syllables. A wrong password is a
    /// business rejection.
    async fn test_password(&self, request: &PasswordRequest) -> Result<(), GatewayError>;
}
