//! Validated inputs, one struct per operation.
//!
//! Construction rejects malformed input (non-positive amounts, self
//! transfers) so the engine never sees an invalid request and no mutation
//! can begin on one.

use super::error::EngineError;
use crate::domain::{AccountId, AmountType, DomainError, TransactionId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepositRequest<A: AmountType> {
    account_id: AccountId,
    amount: A,
}

impl<A: AmountType> DepositRequest<A> {
    pub fn new(account_id: AccountId, amount: A) -> Result<Self, EngineError> {
        ensure_positive(amount)?;
        Ok(Self { account_id, amount })
    }

    pub fn account_id(&self) -> AccountId {
        self.account_id
    }

    pub fn amount(&self) -> A {
        self.amount
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WithdrawRequest<A: AmountType> {
    account_id: AccountId,
    amount: A,
}

impl<A: AmountType> WithdrawRequest<A> {
    pub fn new(account_id: AccountId, amount: A) -> Result<Self, EngineError> {
        ensure_positive(amount)?;
        Ok(Self { account_id, amount })
    }

    pub fn account_id(&self) -> AccountId {
        self.account_id
    }

    pub fn amount(&self) -> A {
        self.amount
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoanRequest<A: AmountType> {
    account_id: AccountId,
    amount: A,
}

impl<A: AmountType> LoanRequest<A> {
    pub fn new(account_id: AccountId, amount: A) -> Result<Self, EngineError> {
        ensure_positive(amount)?;
        Ok(Self { account_id, amount })
    }

    pub fn account_id(&self) -> AccountId {
        self.account_id
    }

    pub fn amount(&self) -> A {
        self.amount
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayLoanRequest {
    transaction_id: TransactionId,
}

impl PayLoanRequest {
    pub fn new(transaction_id: TransactionId) -> Self {
        Self { transaction_id }
    }

    pub fn transaction_id(&self) -> TransactionId {
        self.transaction_id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferRequest<A: AmountType> {
    sender_id: AccountId,
    recipient_id: AccountId,
    amount: A,
}

impl<A: AmountType> TransferRequest<A> {
    pub fn new(
        sender_id: AccountId,
        recipient_id: AccountId,
        amount: A,
    ) -> Result<Self, EngineError> {
        ensure_positive(amount)?;
        if sender_id == recipient_id {
            return Err(EngineError::InvalidRecipient(recipient_id));
        }
        Ok(Self {
            sender_id,
            recipient_id,
            amount,
        })
    }

    pub fn sender_id(&self) -> AccountId {
        self.sender_id
    }

    pub fn recipient_id(&self) -> AccountId {
        self.recipient_id
    }

    pub fn amount(&self) -> A {
        self.amount
    }
}

fn ensure_positive<A: AmountType>(amount: A) -> Result<(), EngineError> {
    if amount <= A::zero() {
        return Err(DomainError::InvalidAmount.into());
    }
    Ok(())
}
