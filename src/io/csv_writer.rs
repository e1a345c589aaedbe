use tokio::io::AsyncWrite;

use super::error::IoError;
use crate::domain::AmountType;
use crate::storage::AccountStore;

/// Write the account snapshot to CSV
pub async fn write_snapshot<A, S, W>(accounts: &S, writer: W) -> Result<(), IoError>
where
    A: AmountType,
    S: AccountStore<A>,
    W: AsyncWrite + Unpin + Send,
{
    accounts.snapshot(writer).await?;
    Ok(())
}
