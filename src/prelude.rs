//! Prelude module for convenient imports
//!
//! Import everything you need with: `use teller::prelude::*;`

// Domain types
pub use crate::domain::{
    Account, AccountId, AmountType, DateRange, DomainError, FixedPoint, TransactionDraft,
    TransactionId, TransactionKind, TransactionRecord, UserId,
};

// Storage types
pub use crate::storage::{
    AccountLease, AccountStore, ConcurrentAccountStore, ConcurrentLedger, Ledger, StorageError,
};

// Engine types
pub use crate::engine::{
    DepositRequest, EngineError, FeatureGate, LoanRequest, MAX_APPROVED_LOANS, PayLoanOutcome,
    PayLoanRequest, TransactionEngine, TransferReceipt, TransferRequest, WithdrawRequest,
};

// Notification types
pub use crate::notify::{
    ChannelSink, LogSink, Notice, NoticeKind, NotificationSink, NotifyError, NullSink,
};

// IO types
pub use crate::io::{Command, CsvCommandStream, IoError, RawCommandRecord, write_snapshot};

// Replay types
pub use crate::replay::{AbortOnError, ErrorPolicy, ReplaySession, SilentSkip, SkipErrors};

// App types
pub use crate::app::{AppError, CliApp};
