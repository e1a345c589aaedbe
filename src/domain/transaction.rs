use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};

use super::account::AccountId;
use super::amount::AmountType;

/// Unique identifier for a ledger row, assigned by the ledger on append.
pub type TransactionId = u64;

/// Kind of money movement a ledger row records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
    Loan,
    LoanPaid,
    Transfer,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Deposit => "deposit",
            Self::Withdrawal => "withdrawal",
            Self::Loan => "loan",
            Self::LoanPaid => "loan_paid",
            Self::Transfer => "transfer",
        };
        f.write_str(label)
    }
}

/// Draft of a ledger row.
///
/// The ledger assigns the row identifier, and the timestamp when the draft
/// carries none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionDraft<A: AmountType> {
    pub account_id: AccountId,
    pub recipient_account_id: Option<AccountId>,
    pub kind: TransactionKind,
    pub amount: A,
    pub balance_after: A,
    pub loan_approved: bool,
    pub timestamp: Option<DateTime<Utc>>,
}

impl<A: AmountType> TransactionDraft<A> {
    /// Create a draft with no counterparty and no explicit timestamp
    pub fn new(account_id: AccountId, kind: TransactionKind, amount: A, balance_after: A) -> Self {
        Self {
            account_id,
            recipient_account_id: None,
            kind,
            amount,
            balance_after,
            loan_approved: false,
            timestamp: None,
        }
    }

    /// Set the counterparty account (transfers)
    pub fn with_recipient(mut self, recipient_account_id: AccountId) -> Self {
        self.recipient_account_id = Some(recipient_account_id);
        self
    }

    /// Pin the row to an explicit timestamp instead of the append time
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

/// Immutable record of a money movement.
///
/// Rows never change after append, except the loan lifecycle: approval flips
/// `loan_approved`, and payoff re-tags the kind from Loan to LoanPaid while
/// recording the post-debit balance snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRecord<A: AmountType> {
    pub id: TransactionId,
    pub account_id: AccountId,
    pub recipient_account_id: Option<AccountId>,
    pub kind: TransactionKind,
    pub amount: A,
    pub balance_after: A,
    pub loan_approved: bool,
    pub timestamp: DateTime<Utc>,
}

impl<A: AmountType> TransactionRecord<A> {
    /// An approved Loan row that has not yet been paid off
    pub fn is_payable_loan(&self) -> bool {
        self.kind == TransactionKind::Loan && self.loan_approved
    }
}

/// Inclusive calendar-date range, at ISO date granularity.
///
/// A row matches when the date component of its timestamp falls on or
/// between `start` and `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Whether the timestamp's date component falls within the range
    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        let date = timestamp.date_naive();
        self.start <= date && date <= self.end
    }
}
