//! Ordered SQL statement batches executed as one atomic transaction, with serialized retry
//! on lock conflicts.
//!
//! Build a [`Transaction`] from raw SQL and bound [`PreparedStatement`]s, then hand it to a
//! [`TransactionExecutor`] together with a [`TransactionConnection`]. When the database
//! reports a deadlock the whole batch is retried under a process-wide lock for up to
//! [`DEADLOCK_MAX_RETRY_TIME_MS`]. A [`TransactionWorker`] runs batches in the background and
//! hands back a [`TransactionFuture`] that a [`TransactionCallback`] can poll without blocking.
//!
//! ```rust,no_run
//! use sql_tx_batch::prelude::*;
//! # async fn demo() -> Result<(), SqlTxError> {
//! let mut conn = SqliteTxConnection::open("bank.db")?;
//! let mut tx = Transaction::new();
//! tx.append("update account set balance = balance - 10 where id = 1");
//! tx.append_prepared_statement(PreparedStatement::with_params(
//!     "update account set balance = balance + 10 where id = ?1",
//!     vec![RowValues::Int(2)],
//! ));
//!
//! let committed = TransactionExecutor::default().execute(&mut conn, &mut tx).await;
//! # let _ = committed;
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod callback;
pub mod clock;
pub mod config;
pub mod connection;
pub mod error;
pub mod executor;
pub mod observer;
pub mod prelude;
pub mod statement;
pub mod types;
pub mod worker;

#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use batch::{StatementEntry, Transaction};
pub use callback::{AsyncCallbackProcessor, TransactionCallback, TransactionFuture};
pub use clock::{Clock, SystemClock};
pub use config::{DEADLOCK_MAX_RETRY_TIME_MS, RetryOptions, RetryOptionsBuilder};
pub use connection::TransactionConnection;
pub use error::SqlTxError;
pub use executor::{TransactionExecutor, current_thread_id};
pub use observer::{RetryObserver, TracingObserver};
pub use statement::PreparedStatement;
pub use types::{RowValues, TxResultCode};
pub use worker::TransactionWorker;
