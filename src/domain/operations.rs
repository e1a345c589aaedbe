use super::account::Account;
use super::amount::AmountType;
use super::error::DomainError;

/// Credit an account
pub fn apply_credit<A: AmountType>(
    account: &mut Account<A>,
    amount: A,
) -> Result<(), DomainError> {
    // Validate amount is positive
    if amount <= A::zero() {
        return Err(DomainError::InvalidAmount);
    }

    let new_balance = account
        .balance()
        .checked_add(amount)
        .ok_or(DomainError::Overflow)?;

    account.set_balance(new_balance);
    Ok(())
}

/// Debit an account.
///
/// Overdrafts are rejected: the balance must cover the full amount, so a
/// successful debit never leaves the balance negative.
pub fn apply_debit<A: AmountType>(account: &mut Account<A>, amount: A) -> Result<(), DomainError> {
    // Validate amount is positive
    if amount <= A::zero() {
        return Err(DomainError::InvalidAmount);
    }

    // Check sufficient funds
    if account.balance() < amount {
        return Err(DomainError::InsufficientFunds);
    }

    let new_balance = account
        .balance()
        .checked_sub(amount)
        .ok_or(DomainError::Overflow)?;

    account.set_balance(new_balance);
    Ok(())
}
