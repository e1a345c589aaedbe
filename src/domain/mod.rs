pub mod account;
pub mod amount;
pub mod error;
pub mod operations;
pub mod transaction;

// Re-export commonly used types
pub use account::{Account, AccountId, UserId};
pub use amount::{AmountType, FixedPoint};
pub use error::DomainError;
pub use operations::{apply_credit, apply_debit};
pub use transaction::{
    DateRange, TransactionDraft, TransactionId, TransactionKind, TransactionRecord,
};
