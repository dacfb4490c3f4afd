use std::fmt;

use async_trait::async_trait;
use deadpool_postgres::{Object, Pool};
use tokio_postgres::error::SqlState;
use tracing::debug;

use crate::batch::{StatementEntry, Transaction};
use crate::connection::TransactionConnection;
use crate::error::SqlTxError;
use crate::types::TxResultCode;

use super::params::param_refs;

/// Pooled Postgres connection that runs each [`Transaction`] in `BEGIN ... COMMIT`.
///
/// `deadlock_detected` (`40P01`) and `serialization_failure` (`40001`) are reported as
/// lock conflicts.
pub struct PostgresTxConnection {
    conn: Object,
}

impl PostgresTxConnection {
    #[must_use]
    pub fn new(conn: Object) -> Self {
        Self { conn }
    }

    /// Check a connection out of `pool`.
    ///
    /// # Errors
    /// Returns `SqlTxError::ConnectionError` if the pool cannot hand out a connection.
    pub async fn from_pool(pool: &Pool) -> Result<Self, SqlTxError> {
        let conn = pool
            .get()
            .await
            .map_err(|e| SqlTxError::ConnectionError(format!("Postgres pool error: {e}")))?;
        Ok(Self::new(conn))
    }

    #[must_use]
    pub fn into_inner(self) -> Object {
        self.conn
    }
}

impl fmt::Debug for PostgresTxConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgresTxConnection").finish_non_exhaustive()
    }
}

#[async_trait]
impl TransactionConnection for PostgresTxConnection {
    async fn execute_transaction(&mut self, tx: &Transaction) -> TxResultCode {
        match run_batch(&mut self.conn, tx).await {
            Ok(()) => TxResultCode::Success,
            Err(err) => {
                debug!(error = %err, "Postgres transaction attempt failed");
                classify_postgres_error(&err)
            }
        }
    }
}

async fn run_batch(conn: &mut Object, batch: &Transaction) -> Result<(), tokio_postgres::Error> {
    let tx = conn.transaction().await?;
    for entry in batch {
        match entry {
            StatementEntry::Raw(sql) => tx.batch_execute(sql).await?,
            StatementEntry::Prepared(stmt) => {
                let params = param_refs(stmt);
                tx.execute(stmt.sql(), &params).await?;
            }
        }
    }
    tx.commit().await
}

/// Map a tokio-postgres error onto a [`TxResultCode`].
#[must_use]
pub fn classify_postgres_error(err: &tokio_postgres::Error) -> TxResultCode {
    match err.code() {
        Some(code) if is_lock_conflict(code) => TxResultCode::LockConflict,
        Some(code) => TxResultCode::OtherError(code.code().to_owned()),
        None => TxResultCode::OtherError(err.to_string()),
    }
}

fn is_lock_conflict(code: &SqlState) -> bool {
    *code == SqlState::T_R_DEADLOCK_DETECTED || *code == SqlState::T_R_SERIALIZATION_FAILURE
}
