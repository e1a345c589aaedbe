pub mod accounts;
pub mod error;
pub mod ledger;
pub mod traits;

// Re-export commonly used types
pub use accounts::{AccountGuard, ConcurrentAccountStore};
pub use error::StorageError;
pub use ledger::ConcurrentLedger;
pub use traits::{AccountLease, AccountStore, Ledger};
