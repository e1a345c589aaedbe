use thiserror::Error;

/// Domain-level errors representing business rule violations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Amount must be positive")]
    InvalidAmount,

    #[error("Insufficient funds")]
    InsufficientFunds,

    #[error("Arithmetic overflow")]
    Overflow,
}
