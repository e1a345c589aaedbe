use futures::{Stream, StreamExt};
use tracing::debug;

use super::error::ErrorPolicy;
use crate::domain::{Account, AmountType};
use crate::engine::{
    DepositRequest, EngineError, LoanRequest, PayLoanRequest, TransactionEngine, TransferRequest,
    WithdrawRequest,
};
use crate::io::{Command, IoError};
use crate::notify::NotificationSink;
use crate::storage::{AccountStore, Ledger};

/// Replays a command stream through the engine.
///
/// Engine operations go through the engine's own validation and gate;
/// `open` feeds the provisioning surface and `approve` the external loan
/// approval step directly.
pub struct ReplaySession<A, S, L, N, P>
where
    A: AmountType,
    S: AccountStore<A>,
    L: Ledger<A>,
    N: NotificationSink<A>,
    P: ErrorPolicy,
{
    engine: TransactionEngine<A, S, L, N>,
    policy: P,
}

impl<A, S, L, N, P> ReplaySession<A, S, L, N, P>
where
    A: AmountType,
    S: AccountStore<A>,
    L: Ledger<A>,
    N: NotificationSink<A>,
    P: ErrorPolicy,
{
    /// Create a new replay session
    pub fn new(engine: TransactionEngine<A, S, L, N>, policy: P) -> Self {
        Self { engine, policy }
    }

    /// Process a stream of commands.
    /// Returns true when the whole stream was processed (errors skipped per
    /// policy), false when the policy aborted.
    pub async fn process_stream<St>(&mut self, mut stream: St) -> bool
    where
        St: Stream<Item = Result<Command<A>, IoError>> + Unpin,
    {
        while let Some(result) = stream.next().await {
            match result {
                Ok(command) => {
                    if let Err(e) = self.apply(command).await
                        && !self.policy.handle_engine_error(e)
                    {
                        return false;
                    }
                }
                Err(e) => {
                    if !self.policy.handle_io_error(e) {
                        return false;
                    }
                }
            }
        }

        true
    }

    async fn apply(&self, command: Command<A>) -> Result<(), EngineError> {
        match command {
            Command::Open {
                account_id,
                user_id,
                balance,
            } => {
                if !self
                    .engine
                    .accounts()
                    .insert(Account::with_balance(account_id, user_id, balance))
                {
                    debug!(account_id, "account already open, ignoring");
                }
                Ok(())
            }
            Command::Deposit { account_id, amount } => {
                self.engine
                    .deposit(DepositRequest::new(account_id, amount)?)
                    .await?;
                Ok(())
            }
            Command::Withdraw { account_id, amount } => {
                self.engine
                    .withdraw(WithdrawRequest::new(account_id, amount)?)
                    .await?;
                Ok(())
            }
            Command::RequestLoan { account_id, amount } => {
                self.engine
                    .request_loan(LoanRequest::new(account_id, amount)?)
                    .await?;
                Ok(())
            }
            Command::ApproveLoan { transaction_id } => {
                self.engine.ledger().approve_loan(transaction_id)?;
                Ok(())
            }
            Command::PayLoan { transaction_id } => {
                self.engine
                    .pay_loan(PayLoanRequest::new(transaction_id))
                    .await?;
                Ok(())
            }
            Command::Transfer {
                sender_id,
                recipient_id,
                amount,
            } => {
                self.engine
                    .transfer(TransferRequest::new(sender_id, recipient_id, amount)?)
                    .await?;
                Ok(())
            }
        }
    }

    /// Reference to the underlying engine
    pub fn engine(&self) -> &TransactionEngine<A, S, L, N> {
        &self.engine
    }

    /// Consume the session and return the engine
    pub fn into_engine(self) -> TransactionEngine<A, S, L, N> {
        self.engine
    }
}
