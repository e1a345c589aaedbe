use std::sync::Arc;

use async_trait::async_trait;
use dashmap::{DashMap, Entry};
use tokio::io::AsyncWrite;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::error::StorageError;
use super::traits::{AccountLease, AccountStore};
use crate::domain::{Account, AccountId, AmountType, DomainError};

/// Concurrent in-memory account store.
///
/// Each account lives in its own mutex cell inside a DashMap, so a lease on
/// one account never blocks callers touching other accounts. Accounts are
/// never removed, which keeps the clone-cell-then-lock sequence safe.
pub struct ConcurrentAccountStore<A: AmountType> {
    accounts: DashMap<AccountId, Arc<Mutex<Account<A>>>>,
}

impl<A: AmountType> ConcurrentAccountStore<A> {
    /// Create a new empty concurrent account store
    pub fn new() -> Self {
        Self {
            accounts: DashMap::new(),
        }
    }

    /// Number of provisioned accounts
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    fn cell(&self, account_id: AccountId) -> Result<Arc<Mutex<Account<A>>>, StorageError> {
        self.accounts
            .get(&account_id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(StorageError::AccountNotFound(account_id))
    }
}

impl<A: AmountType> Default for ConcurrentAccountStore<A> {
    fn default() -> Self {
        Self::new()
    }
}

/// Lease backed by an owned per-account mutex guard
pub struct AccountGuard<A: AmountType> {
    guard: OwnedMutexGuard<Account<A>>,
}

impl<A: AmountType> AccountLease<A> for AccountGuard<A> {
    fn account(&self) -> &Account<A> {
        &self.guard
    }

    fn try_update<F>(&mut self, update_fn: F) -> Result<A, DomainError>
    where
        F: FnOnce(&mut Account<A>) -> Result<(), DomainError>,
    {
        update_fn(&mut self.guard)?;
        Ok(self.guard.balance())
    }
}

#[async_trait]
impl<A: AmountType> AccountStore<A> for ConcurrentAccountStore<A> {
    type Lease = AccountGuard<A>;

    async fn acquire(&self, account_id: AccountId) -> Result<Self::Lease, StorageError> {
        let cell = self.cell(account_id)?;
        Ok(AccountGuard {
            guard: cell.lock_owned().await,
        })
    }

    async fn acquire_pair(
        &self,
        first: AccountId,
        second: AccountId,
    ) -> Result<(Self::Lease, Self::Lease), StorageError> {
        debug_assert_ne!(first, second, "pair acquisition requires distinct accounts");

        // Resolve both cells before locking either, so a missing account
        // surfaces without holding any lock.
        let first_cell = self.cell(first)?;
        let second_cell = self.cell(second)?;

        // Lock in ascending id order; concurrent pairs cannot cycle.
        let (first_guard, second_guard) = if first < second {
            let a = first_cell.lock_owned().await;
            let b = second_cell.lock_owned().await;
            (a, b)
        } else {
            let b = second_cell.lock_owned().await;
            let a = first_cell.lock_owned().await;
            (a, b)
        };

        Ok((
            AccountGuard { guard: first_guard },
            AccountGuard {
                guard: second_guard,
            },
        ))
    }

    async fn read(&self, account_id: AccountId) -> Result<Account<A>, StorageError> {
        let cell = self.cell(account_id)?;
        let account = cell.lock().await.clone();
        Ok(account)
    }

    fn insert(&self, account: Account<A>) -> bool {
        match self.accounts.entry(account.account_id()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(entry) => {
                entry.insert(Arc::new(Mutex::new(account)));
                true
            }
        }
    }

    async fn snapshot<W>(&self, mut writer: W) -> Result<(), StorageError>
    where
        W: AsyncWrite + Unpin + Send,
    {
        use tokio::io::AsyncWriteExt;

        writer.write_all(b"account,user,balance\n").await?;

        // Collect cells first so no DashMap shard lock is held across an
        // await point.
        let mut cells: Vec<(AccountId, Arc<Mutex<Account<A>>>)> = self
            .accounts
            .iter()
            .map(|entry| (*entry.key(), Arc::clone(entry.value())))
            .collect();
        cells.sort_by_key(|(id, _)| *id);

        for (_, cell) in cells {
            let account = cell.lock().await.clone();
            let line = format!(
                "{},{},{}\n",
                account.account_id(),
                account.user_id(),
                account.balance().to_decimal_string()
            );
            writer.write_all(line.as_bytes()).await?;
        }

        writer.flush().await?;
        Ok(())
    }
}

// Implement AccountStore for Arc<ConcurrentAccountStore> so the engine and
// the snapshot writer can share one store.
#[async_trait]
impl<A: AmountType> AccountStore<A> for Arc<ConcurrentAccountStore<A>> {
    type Lease = AccountGuard<A>;

    async fn acquire(&self, account_id: AccountId) -> Result<Self::Lease, StorageError> {
        (**self).acquire(account_id).await
    }

    async fn acquire_pair(
        &self,
        first: AccountId,
        second: AccountId,
    ) -> Result<(Self::Lease, Self::Lease), StorageError> {
        (**self).acquire_pair(first, second).await
    }

    async fn read(&self, account_id: AccountId) -> Result<Account<A>, StorageError> {
        (**self).read(account_id).await
    }

    fn insert(&self, account: Account<A>) -> bool {
        (**self).insert(account)
    }

    async fn snapshot<W>(&self, writer: W) -> Result<(), StorageError>
    where
        W: AsyncWrite + Unpin + Send,
    {
        (**self).snapshot(writer).await
    }
}
