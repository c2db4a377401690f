//! Legacy stored-procedure (SPX) call values.

use bytes::Bytes;
use spa_types::BusinessError;

use super::session::SessionKey;

/// Names of the legacy procedures the lifecycle drives.
pub mod procedures {
    pub const IDENTIFY_CARD: &str = "ExecutarSPXIdentificaCartao";
    pub const EXECUTE_PASSWORD: &str = "ExecutarSPXSenhaSilabica";
    pub const CONFIRM_PASSWORD: &str = "ConfirmarSPXSenhaSilabica";
    pub const CANCEL_PASSWORD: &str = "CancelarSPXSenhaSilabica";
    pub const REGISTER_PASSWORD: &str = "RegistrarSPXSenhaSilabica";
}

/// Column read back as reply data.
pub const OUTPUT_COLUMN: &str = "dados";

/// Typed parameter or column value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpxValue {
    Int(i32),
    BigInt(i64),
    Text(String),
    Bytes(Bytes),
}

impl SpxValue {
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }
}

/// Ordered, named procedure parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpxParameters {
    entries: Vec<(String, SpxValue)>,
}

impl SpxParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parameters every procedure receives: the session address.
    pub fn for_session(key: &SessionKey) -> Self {
        Self::new()
            .with("agencia", SpxValue::Int(i32::from(key.branch)))
            .with("posto", SpxValue::Int(i32::from(key.post)))
            .with("operador", SpxValue::Int(key.operator_id))
            .with("conta", SpxValue::BigInt(key.account_product_number))
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: SpxValue) -> Self {
        self.entries.push((name.into(), value));
        self
    }

    pub fn get(&self, name: &str) -> Option<&SpxValue> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SpxValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }
}

/// One procedure invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpxCall {
    pub procedure: &'static str,
    pub parameters: SpxParameters,
}

impl SpxCall {
    pub fn new(procedure: &'static str, parameters: SpxParameters) -> Self {
        Self {
            procedure,
            parameters,
        }
    }
}

/// Result row: named columns.
pub type SpxRow = Vec<(String, SpxValue)>;

/// What a procedure returned.
///
/// A non-zero `return_code` is a business rejection by the procedure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpxResult {
    pub return_code: i32,
    pub message: Option<String>,
    pub rows: Vec<SpxRow>,
}

impl SpxResult {
    pub fn ok() -> Self {
        Self::default()
    }

    pub fn rejected(return_code: i32, message: impl Into<String>) -> Self {
        Self {
            return_code,
            message: Some(message.into()),
            rows: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_row(mut self, row: SpxRow) -> Self {
        self.rows.push(row);
        self
    }

    /// First value of `column` in the first row that has it.
    pub fn value(&self, column: &str) -> Option<&SpxValue> {
        self.rows
            .iter()
            .flat_map(|row| row.iter())
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Turns a non-zero return code into a `BusinessError`.
    pub fn into_business_result(self, procedure: &str) -> Result<Self, BusinessError> {
        if self.return_code == 0 {
            return Ok(self);
        }
        let message = self
            .message
            .clone()
            .unwrap_or_else(|| format!("{procedure} returned {}", self.return_code));
        Err(BusinessError::new(self.return_code, message))
    }
}
