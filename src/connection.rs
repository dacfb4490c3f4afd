use async_trait::async_trait;

use crate::batch::Transaction;
use crate::types::TxResultCode;

/// A database connection able to run a whole [`Transaction`] atomically.
///
/// Implementations must either commit every entry of the batch, in order, or none of them,
/// and classify the outcome into a [`TxResultCode`]. Lock contention reported by the
/// database must surface as [`TxResultCode::LockConflict`] so the executor can retry.
#[async_trait]
pub trait TransactionConnection: Send {
    async fn execute_transaction(&mut self, tx: &Transaction) -> TxResultCode;
}

#[async_trait]
impl<C> TransactionConnection for Box<C>
where
    C: TransactionConnection + ?Sized,
{
    async fn execute_transaction(&mut self, tx: &Transaction) -> TxResultCode {
        (**self).execute_transaction(tx).await
    }
}
