use thiserror::Error;

use crate::domain::{AccountId, DomainError};
use crate::storage::StorageError;

/// Engine-level errors for financial operations
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Transactions are currently disabled")]
    TransactionsDisabled,

    #[error("Recipient account is invalid: {0}")]
    InvalidRecipient(AccountId),

    #[error("Loan limit exceeded for account {0}")]
    LoanLimitExceeded(AccountId),

    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl EngineError {
    /// The gate rejection maps to a forbidden status, distinct from
    /// ordinary validation failures
    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::TransactionsDisabled)
    }
}
