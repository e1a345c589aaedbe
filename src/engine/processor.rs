use std::marker::PhantomData;

use tracing::{debug, warn};

use super::error::EngineError;
use super::gate::FeatureGate;
use super::requests::{
    DepositRequest, LoanRequest, PayLoanRequest, TransferRequest, WithdrawRequest,
};
use crate::domain::{
    AmountType, DomainError, TransactionDraft, TransactionId, TransactionKind, TransactionRecord,
    apply_credit, apply_debit,
};
use crate::notify::{Notice, NoticeKind, NotificationSink};
use crate::storage::{AccountLease, AccountStore, Ledger, StorageError};

/// Approved-loan cap per account
pub const MAX_APPROVED_LOANS: usize = 3;

/// Result of a loan payoff attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayLoanOutcome<A: AmountType> {
    /// The loan was debited and its row re-tagged to LoanPaid
    Paid(TransactionRecord<A>),
    /// The loan is not yet approved; nothing happened
    AwaitingApproval(TransactionId),
}

/// Both sides of a completed transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReceipt<A: AmountType> {
    /// Sender-side row (counterparty = recipient)
    pub outgoing: TransactionRecord<A>,
    /// Recipient-side row (counterparty = sender)
    pub incoming: TransactionRecord<A>,
}

/// Orchestrates each money-movement operation as one atomic unit.
///
/// Every operation checks the feature gate first, performs its balance
/// mutation(s) and ledger append(s) under the account lease(s), and only
/// then fires best-effort notifications. A ledger failure after a balance
/// mutation reverts the mutation before the lease is released, so no
/// balance change ever commits without its matching row.
pub struct TransactionEngine<A, S, L, N>
where
    A: AmountType,
    S: AccountStore<A>,
    L: Ledger<A>,
    N: NotificationSink<A>,
{
    accounts: S,
    ledger: L,
    sink: N,
    gate: FeatureGate,
    _phantom: PhantomData<A>,
}

impl<A, S, L, N> TransactionEngine<A, S, L, N>
where
    A: AmountType,
    S: AccountStore<A>,
    L: Ledger<A>,
    N: NotificationSink<A>,
{
    pub fn new(accounts: S, ledger: L, sink: N, gate: FeatureGate) -> Self {
        Self {
            accounts,
            ledger,
            sink,
            gate,
            _phantom: PhantomData,
        }
    }

    /// Reference to the account store (snapshots, provisioning)
    pub fn accounts(&self) -> &S {
        &self.accounts
    }

    /// Reference to the ledger (reports, external loan approval)
    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn gate(&self) -> &FeatureGate {
        &self.gate
    }

    fn ensure_enabled(&self) -> Result<(), EngineError> {
        if self.gate.is_enabled() {
            Ok(())
        } else {
            Err(EngineError::TransactionsDisabled)
        }
    }

    /// Best-effort notification; failures never unwind the committed
    /// mutation
    fn dispatch(&self, notice: Notice<A>) {
        if let Err(error) = self.sink.notify(notice) {
            warn!(error = %error, "notification dropped");
        }
    }

    /// Undo a credit that was just applied under this lease. The preceding
    /// credit guarantees the funds are present.
    fn revert_credit(lease: &mut S::Lease, amount: A) {
        if let Err(error) = lease.try_update(|account| apply_debit(account, amount)) {
            warn!(error = %error, "failed to revert credit");
        }
    }

    /// Undo a debit that was just applied under this lease
    fn revert_debit(lease: &mut S::Lease, amount: A) {
        if let Err(error) = lease.try_update(|account| apply_credit(account, amount)) {
            warn!(error = %error, "failed to revert debit");
        }
    }

    pub async fn deposit(
        &self,
        request: DepositRequest<A>,
    ) -> Result<TransactionRecord<A>, EngineError> {
        self.ensure_enabled()?;
        debug!(account_id = request.account_id(), "processing deposit");

        let mut lease = self.accounts.acquire(request.account_id()).await?;
        let new_balance =
            lease.try_update(|account| apply_credit(account, request.amount()))?;

        let draft = TransactionDraft::new(
            request.account_id(),
            TransactionKind::Deposit,
            request.amount(),
            new_balance,
        );
        let record = match self.ledger.append(draft) {
            Ok(record) => record,
            Err(error) => {
                Self::revert_credit(&mut lease, request.amount());
                return Err(error.into());
            }
        };

        let user_id = lease.account().user_id();
        drop(lease);

        self.dispatch(Notice {
            user_id,
            kind: NoticeKind::DepositMade,
            amount: request.amount(),
        });
        Ok(record)
    }

    pub async fn withdraw(
        &self,
        request: WithdrawRequest<A>,
    ) -> Result<TransactionRecord<A>, EngineError> {
        self.ensure_enabled()?;
        debug!(account_id = request.account_id(), "processing withdrawal");

        let mut lease = self.accounts.acquire(request.account_id()).await?;
        let new_balance = lease.try_update(|account| apply_debit(account, request.amount()))?;

        let draft = TransactionDraft::new(
            request.account_id(),
            TransactionKind::Withdrawal,
            request.amount(),
            new_balance,
        );
        let record = match self.ledger.append(draft) {
            Ok(record) => record,
            Err(error) => {
                Self::revert_debit(&mut lease, request.amount());
                return Err(error.into());
            }
        };

        let user_id = lease.account().user_id();
        drop(lease);

        self.dispatch(Notice {
            user_id,
            kind: NoticeKind::WithdrawalMade,
            amount: request.amount(),
        });
        Ok(record)
    }

    /// Record a loan request. No money moves until the loan is approved and
    /// paid off; the row carries the unchanged balance as its snapshot.
    pub async fn request_loan(
        &self,
        request: LoanRequest<A>,
    ) -> Result<TransactionRecord<A>, EngineError> {
        self.ensure_enabled()?;
        debug!(account_id = request.account_id(), "processing loan request");

        // The lease pins the balance snapshot; no mutation interleaves
        // between the cap check and the append.
        let lease = self.accounts.acquire(request.account_id()).await?;

        if self.ledger.count_approved_loans(request.account_id()) >= MAX_APPROVED_LOANS {
            return Err(EngineError::LoanLimitExceeded(request.account_id()));
        }

        let draft = TransactionDraft::new(
            request.account_id(),
            TransactionKind::Loan,
            request.amount(),
            lease.balance(),
        );
        let record = self.ledger.append(draft)?;

        let user_id = lease.account().user_id();
        drop(lease);

        self.dispatch(Notice {
            user_id,
            kind: NoticeKind::LoanRequested,
            amount: request.amount(),
        });
        Ok(record)
    }

    /// Pay off an approved loan.
    ///
    /// An unapproved loan is a quiet no-op. Payoff requires the loan amount
    /// to be strictly less than the balance; an exactly-equal loan is
    /// rejected. No notification is sent on this path.
    pub async fn pay_loan(
        &self,
        request: PayLoanRequest,
    ) -> Result<PayLoanOutcome<A>, EngineError> {
        self.ensure_enabled()?;
        debug!(
            transaction_id = request.transaction_id(),
            "processing loan payoff"
        );

        let loan = self
            .ledger
            .get(request.transaction_id())
            .ok_or(StorageError::RecordNotFound(request.transaction_id()))?;

        if loan.kind != TransactionKind::Loan {
            return Err(StorageError::InvalidRecordState(loan.id).into());
        }
        if !loan.loan_approved {
            debug!(transaction_id = loan.id, "loan not yet approved");
            return Ok(PayLoanOutcome::AwaitingApproval(loan.id));
        }

        let mut lease = self.accounts.acquire(loan.account_id).await?;

        // Strictly less than the balance; an exactly-equal loan is rejected
        if loan.amount >= lease.balance() {
            return Err(DomainError::InsufficientFunds.into());
        }

        let new_balance = lease.try_update(|account| apply_debit(account, loan.amount))?;
        let record = match self.ledger.mark_loan_paid(loan.id, new_balance) {
            Ok(record) => record,
            Err(error) => {
                Self::revert_debit(&mut lease, loan.amount);
                return Err(error.into());
            }
        };

        Ok(PayLoanOutcome::Paid(record))
    }

    /// Move money between two accounts as one atomic unit: both leases are
    /// held for the whole operation and every applied balance change is
    /// reverted before an error surfaces.
    pub async fn transfer(
        &self,
        request: TransferRequest<A>,
    ) -> Result<TransferReceipt<A>, EngineError> {
        self.ensure_enabled()?;
        debug!(
            sender = request.sender_id(),
            recipient = request.recipient_id(),
            "processing transfer"
        );

        let (mut sender, mut recipient) = self
            .accounts
            .acquire_pair(request.sender_id(), request.recipient_id())
            .await
            .map_err(|error| match error {
                StorageError::AccountNotFound(id) if id == request.recipient_id() => {
                    EngineError::InvalidRecipient(id)
                }
                other => EngineError::from(other),
            })?;

        let sender_balance = sender.try_update(|account| apply_debit(account, request.amount()))?;

        let recipient_balance =
            match recipient.try_update(|account| apply_credit(account, request.amount())) {
                Ok(balance) => balance,
                Err(error) => {
                    Self::revert_debit(&mut sender, request.amount());
                    return Err(error.into());
                }
            };

        let drafts = vec![
            TransactionDraft::new(
                request.sender_id(),
                TransactionKind::Transfer,
                request.amount(),
                sender_balance,
            )
            .with_recipient(request.recipient_id()),
            TransactionDraft::new(
                request.recipient_id(),
                TransactionKind::Transfer,
                request.amount(),
                recipient_balance,
            )
            .with_recipient(request.sender_id()),
        ];
        let mut records = match self.ledger.append_all(drafts) {
            Ok(records) => records,
            Err(error) => {
                Self::revert_credit(&mut recipient, request.amount());
                Self::revert_debit(&mut sender, request.amount());
                return Err(error.into());
            }
        };

        let sender_user = sender.account().user_id();
        let recipient_user = recipient.account().user_id();
        drop(sender);
        drop(recipient);

        self.dispatch(Notice {
            user_id: sender_user,
            kind: NoticeKind::TransferSent,
            amount: request.amount(),
        });
        self.dispatch(Notice {
            user_id: recipient_user,
            kind: NoticeKind::TransferReceived,
            amount: request.amount(),
        });

        let incoming = records.pop().expect("two transfer rows");
        let outgoing = records.pop().expect("two transfer rows");
        Ok(TransferReceipt { outgoing, incoming })
    }
}
