pub mod error;
pub mod gate;
pub mod processor;
pub mod requests;

// Re-export commonly used types
pub use error::EngineError;
pub use gate::FeatureGate;
pub use processor::{MAX_APPROVED_LOANS, PayLoanOutcome, TransactionEngine, TransferReceipt};
pub use requests::{
    DepositRequest, LoanRequest, PayLoanRequest, TransferRequest, WithdrawRequest,
};
