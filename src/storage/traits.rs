use async_trait::async_trait;
use tokio::io::AsyncWrite;

use super::error::StorageError;
use crate::domain::{
    Account, AccountId, AmountType, DateRange, DomainError, TransactionDraft, TransactionId,
    TransactionRecord,
};

/// Trait for account state with pluggable storage backends.
///
/// All balance mutations go through a lease: an exclusive, per-account
/// mutation scope that serializes concurrent adjustments to the same
/// account while leaving distinct accounts independent.
#[async_trait]
pub trait AccountStore<A: AmountType>: Send + Sync {
    type Lease: AccountLease<A> + Send;

    /// Acquire the mutation lease for one account
    async fn acquire(&self, account_id: AccountId) -> Result<Self::Lease, StorageError>;

    /// Acquire leases for two distinct accounts.
    ///
    /// Locks are taken in ascending account-id order regardless of argument
    /// order, so concurrent pair acquisitions cannot form a lock cycle. The
    /// returned leases are in argument order. Callers must pass distinct
    /// ids.
    async fn acquire_pair(
        &self,
        first: AccountId,
        second: AccountId,
    ) -> Result<(Self::Lease, Self::Lease), StorageError>;

    /// Read a point-in-time copy of an account
    async fn read(&self, account_id: AccountId) -> Result<Account<A>, StorageError>;

    /// Register a provisioned account. Returns false when the id is taken.
    fn insert(&self, account: Account<A>) -> bool;

    /// Async snapshot of all accounts to a writer
    async fn snapshot<W>(&self, writer: W) -> Result<(), StorageError>
    where
        W: AsyncWrite + Unpin + Send;
}

/// Exclusive mutation scope over a single account.
///
/// While a lease is held no other caller can read-for-update or mutate the
/// account, so "read balance, compute, persist" is one indivisible step.
pub trait AccountLease<A: AmountType> {
    /// The account under the lease
    fn account(&self) -> &Account<A>;

    /// Current balance under the lease
    fn balance(&self) -> A {
        self.account().balance()
    }

    /// Apply a validated mutation and return the resulting balance
    fn try_update<F>(&mut self, update_fn: F) -> Result<A, DomainError>
    where
        F: FnOnce(&mut Account<A>) -> Result<(), DomainError>;
}

/// Trait for the append-only transaction ledger.
///
/// Rows are immutable once appended; the loan lifecycle (`approve_loan`,
/// `mark_loan_paid`) is the sole exception.
pub trait Ledger<A: AmountType>: Send + Sync {
    /// Persist a new row, assigning its id and (when the draft carries
    /// none) its timestamp
    fn append(&self, draft: TransactionDraft<A>) -> Result<TransactionRecord<A>, StorageError>;

    /// Persist several rows as one unit: either every draft is appended or
    /// none is
    fn append_all(
        &self,
        drafts: Vec<TransactionDraft<A>>,
    ) -> Result<Vec<TransactionRecord<A>>, StorageError>;

    /// Fetch a row by id (returns a clone, not a reference)
    fn get(&self, id: TransactionId) -> Option<TransactionRecord<A>>;

    /// External approval step: flag a pending Loan row as approved
    fn approve_loan(&self, id: TransactionId) -> Result<TransactionRecord<A>, StorageError>;

    /// Payoff step: re-tag an approved Loan row to LoanPaid and record the
    /// post-debit balance snapshot
    fn mark_loan_paid(
        &self,
        id: TransactionId,
        balance_after: A,
    ) -> Result<TransactionRecord<A>, StorageError>;

    /// Rows for one account, most recent first, optionally filtered by
    /// calendar date (inclusive on both ends)
    fn history(
        &self,
        account_id: AccountId,
        range: Option<DateRange>,
    ) -> Vec<TransactionRecord<A>>;

    /// Sum of `amount` over ALL accounts in the date range.
    ///
    /// Note this aggregates across every account, not just one; the report
    /// view depends on that scope.
    fn sum_amount(&self, range: DateRange) -> Result<A, StorageError>;

    /// Rows with kind = Loan and loan_approved = true for the account
    fn count_approved_loans(&self, account_id: AccountId) -> usize;
}
