use super::amount::AmountType;

/// Unique identifier for a bank account.
pub type AccountId = u32;

/// Unique identifier for the user owning an account.
pub type UserId = u32;

/// Bank account with private fields enforcing invariants.
///
/// Accounts are provisioned externally; the engine only adjusts balances
/// through the account store's mutation lease.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account<A: AmountType> {
    account_id: AccountId,
    user_id: UserId,
    balance: A,
}

impl<A: AmountType> Account<A> {
    /// Create a new account with zero balance
    pub fn new(account_id: AccountId, user_id: UserId) -> Self {
        Self {
            account_id,
            user_id,
            balance: A::zero(),
        }
    }

    /// Create a new account with an opening balance
    pub fn with_balance(account_id: AccountId, user_id: UserId, balance: A) -> Self {
        Self {
            account_id,
            user_id,
            balance,
        }
    }

    /// Get the account ID
    pub fn account_id(&self) -> AccountId {
        self.account_id
    }

    /// Get the owning user's ID
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Get the current balance
    pub fn balance(&self) -> A {
        self.balance
    }

    // Internal mutation method for use by the operations module
    pub(crate) fn set_balance(&mut self, balance: A) {
        self.balance = balance;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::amount::FixedPoint;

    #[test]
    fn new_account_has_zero_balance() {
        let account = Account::<FixedPoint>::new(1, 10);

        assert_eq!(account.account_id(), 1);
        assert_eq!(account.user_id(), 10);
        assert_eq!(account.balance(), FixedPoint::zero());
    }

    #[test]
    fn opening_balance_is_recorded() {
        let account = Account::with_balance(7, 70, FixedPoint::from_raw(100_000));

        assert_eq!(account.account_id(), 7);
        assert_eq!(account.user_id(), 70);
        assert_eq!(account.balance(), FixedPoint::from_raw(100_000));
    }

    #[test]
    fn set_balance_replaces_value() {
        let mut account = Account::<FixedPoint>::new(1, 10);
        account.set_balance(FixedPoint::from_raw(5_000));

        assert_eq!(account.balance(), FixedPoint::from_raw(5_000));
    }

    #[test]
    fn account_can_be_cloned() {
        let account = Account::with_balance(1, 10, FixedPoint::from_raw(1_234));
        let cloned = account.clone();

        assert_eq!(account, cloned);
    }
}
