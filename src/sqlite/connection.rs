use std::fmt;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use rusqlite::{Connection, ErrorCode, TransactionBehavior, params_from_iter};
use tracing::error;

use crate::batch::{StatementEntry, Transaction};
use crate::connection::TransactionConnection;
use crate::error::SqlTxError;
use crate::types::TxResultCode;

use super::params::Params;

/// Statement detached from the batch so the attempt can run on the blocking pool.
struct OwnedStatement {
    sql: String,
    params: Option<Params>,
}

impl From<&StatementEntry> for OwnedStatement {
    fn from(entry: &StatementEntry) -> Self {
        match entry {
            StatementEntry::Raw(sql) => Self {
                sql: sql.clone(),
                params: None,
            },
            StatementEntry::Prepared(stmt) => Self {
                sql: stmt.sql().to_owned(),
                params: Some(Params::convert(stmt.params())),
            },
        }
    }
}

/// `SQLite` connection that executes each [`Transaction`] inside `BEGIN IMMEDIATE ... COMMIT`.
///
/// The connection is moved onto tokio's blocking pool for every attempt and handed back
/// afterwards. `SQLITE_BUSY` and `SQLITE_LOCKED` are reported as lock conflicts.
pub struct SqliteTxConnection {
    conn: Option<Connection>,
}

impl SqliteTxConnection {
    /// Wrap an existing connection. Its busy timeout is left untouched.
    #[must_use]
    pub fn new(conn: Connection) -> Self {
        Self { conn: Some(conn) }
    }

    /// Open `path` with a zero busy timeout so contention surfaces immediately as a lock
    /// conflict and goes through the serialized retry loop.
    ///
    /// # Errors
    /// Returns `SqlTxError::SqliteError` if the database cannot be opened or configured.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SqlTxError> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(Duration::ZERO)?;
        Ok(Self::new(conn))
    }

    /// Take back the underlying connection. `None` if it was lost to a panicked attempt.
    #[must_use]
    pub fn into_inner(mut self) -> Option<Connection> {
        self.conn.take()
    }
}

impl fmt::Debug for SqliteTxConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteTxConnection")
            .field("open", &self.conn.is_some())
            .finish()
    }
}

#[async_trait]
impl TransactionConnection for SqliteTxConnection {
    async fn execute_transaction(&mut self, tx: &Transaction) -> TxResultCode {
        let Some(mut conn) = self.conn.take() else {
            return TxResultCode::OtherError("connection lost".into());
        };
        let statements: Vec<OwnedStatement> = tx.iter().map(OwnedStatement::from).collect();

        let joined = tokio::task::spawn_blocking(move || {
            let result = run_batch(&mut conn, &statements);
            (conn, result)
        })
        .await;

        match joined {
            Ok((conn, result)) => {
                self.conn = Some(conn);
                match result {
                    Ok(()) => TxResultCode::Success,
                    Err(err) => classify_sqlite_error(&err),
                }
            }
            Err(err) => {
                error!(error = %err, "SQLite transaction attempt panicked, connection dropped");
                TxResultCode::OtherError("connection lost".into())
            }
        }
    }
}

fn run_batch(conn: &mut Connection, statements: &[OwnedStatement]) -> Result<(), rusqlite::Error> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    for stmt in statements {
        match &stmt.params {
            None => tx.execute_batch(&stmt.sql)?,
            Some(params) => {
                // `query` rather than `execute` so `returning` clauses are accepted.
                let mut prepared = tx.prepare_cached(&stmt.sql)?;
                let mut rows = prepared.query(params_from_iter(params.as_values()))?;
                while rows.next()?.is_some() {}
            }
        }
    }
    tx.commit()
}

/// Map a rusqlite error onto a [`TxResultCode`].
#[must_use]
pub fn classify_sqlite_error(err: &rusqlite::Error) -> TxResultCode {
    match err {
        rusqlite::Error::SqliteFailure(failure, _)
            if matches!(
                failure.code,
                ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked
            ) =>
        {
            TxResultCode::LockConflict
        }
        rusqlite::Error::SqliteFailure(failure, _) => {
            TxResultCode::OtherError(failure.extended_code.to_string())
        }
        other => TxResultCode::OtherError(other.to_string()),
    }
}
