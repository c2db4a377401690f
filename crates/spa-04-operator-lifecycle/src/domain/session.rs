//! Session identity and field validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use spa_types::{codes, BusinessError, Header, Transaction};

use super::action::Family;

/// Identifies one operator session in the legacy store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionKey {
    pub branch: i16,
    pub post: u8,
    pub operator_id: i32,
    pub account_product_number: i64,
}

impl SessionKey {
    /// Starts a session from the request addressing.
    ///
    /// # Errors
    ///
    /// `MISSING_ADDRESSING` when the origin has no branch or post.
    pub fn from_header(header: &Header) -> Result<Self, BusinessError> {
        if !header.origin.has_addressing() {
            return Err(BusinessError::new(
                codes::MISSING_ADDRESSING,
                format!(
                    "Origin branch/post missing (branch={}, post={})",
                    header.origin.branch, header.origin.post
                ),
            ));
        }

        Ok(Self {
            branch: header.origin.branch,
            post: header.origin.post,
            operator_id: header.origin.operator_id,
            account_product_number: header.account_product_number,
        })
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.branch, self.post, self.operator_id, self.account_product_number
        )
    }
}

/// Field-level checks run by the Validate phase. No external call.
///
/// # Errors
///
/// `INVALID_FIELD` naming the first offending field.
pub fn validate_fields(family: Family, transaction: &Transaction) -> Result<(), BusinessError> {
    let header = transaction.header();
    let invalid = |field: &str, detail: String| {
        BusinessError::new(codes::INVALID_FIELD, format!("{field}: {detail}"))
    };

    if header.origin.operator_id <= 0 {
        return Err(invalid(
            "operator_id",
            format!("must be positive, got {}", header.origin.operator_id),
        ));
    }
    if header.account_product_branch <= 0 {
        return Err(invalid(
            "account_product_branch",
            format!("must be positive, got {}", header.account_product_branch),
        ));
    }
    if header.account_product_number <= 0 {
        return Err(invalid(
            "account_product_number",
            format!("must be positive, got {}", header.account_product_number),
        ));
    }
    if family == Family::SyllabicPassword && transaction.payload().is_empty() {
        return Err(invalid("payload", "password data missing".to_string()));
    }

    Ok(())
}
