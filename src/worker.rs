use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::batch::Transaction;
use crate::callback::TransactionFuture;
use crate::connection::TransactionConnection;
use crate::error::SqlTxError;
use crate::executor::TransactionExecutor;

struct Job {
    tx: Transaction,
    respond_to: oneshot::Sender<bool>,
}

/// Background task that owns one connection and commits queued transactions in order.
///
/// Must be spawned from within a tokio runtime.
#[derive(Debug)]
pub struct TransactionWorker {
    sender: mpsc::UnboundedSender<Job>,
    handle: JoinHandle<()>,
}

impl TransactionWorker {
    pub fn spawn<C>(conn: C, executor: TransactionExecutor) -> Self
    where
        C: TransactionConnection + 'static,
    {
        let (sender, receiver) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run_worker(conn, executor, receiver));
        Self { sender, handle }
    }

    /// Queue `tx` and return its deferred result.
    ///
    /// # Errors
    /// Returns `SqlTxError::ConnectionError` if the worker has stopped.
    pub fn commit_async(&self, tx: Transaction) -> Result<TransactionFuture, SqlTxError> {
        let (respond_to, future) = TransactionFuture::channel();
        self.sender
            .send(Job { tx, respond_to })
            .map_err(|_| SqlTxError::ConnectionError("transaction worker closed".into()))?;
        Ok(future)
    }

    /// Queue `tx` and wait for it to finish.
    ///
    /// # Errors
    /// Returns `SqlTxError::ConnectionError` if the worker stops before reporting a result.
    pub async fn commit(&self, tx: Transaction) -> Result<bool, SqlTxError> {
        self.commit_async(tx)?.await
    }

    /// Stop accepting work, let queued transactions finish, and wait for the task to exit.
    ///
    /// # Errors
    /// Returns `SqlTxError::Other` if the worker task panicked.
    pub async fn shutdown(self) -> Result<(), SqlTxError> {
        drop(self.sender);
        self.handle
            .await
            .map_err(|err| SqlTxError::Other(format!("transaction worker failed: {err}")))
    }
}

async fn run_worker<C>(
    mut conn: C,
    executor: TransactionExecutor,
    mut receiver: mpsc::UnboundedReceiver<Job>,
) where
    C: TransactionConnection,
{
    debug!("transaction worker started");
    while let Some(Job { mut tx, respond_to }) = receiver.recv().await {
        let committed = executor.execute(&mut conn, &mut tx).await;
        // The submitter may have dropped its future; the outcome is still final.
        let _ = respond_to.send(committed);
    }
    debug!("transaction worker stopped");
}
