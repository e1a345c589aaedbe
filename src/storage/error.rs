use std::io;
use thiserror::Error;

use crate::domain::{AccountId, DomainError, TransactionId};

/// Storage-level errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    #[error("Transaction record not found: {0}")]
    RecordNotFound(TransactionId),

    #[error("Transaction record {0} is not in the expected loan state")]
    InvalidRecordState(TransactionId),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),
}
