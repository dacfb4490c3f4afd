//! Convenient imports for common functionality.
//!
//! This module re-exports the most commonly used types so callers can build, execute and
//! poll transactions with a single `use`.

pub use crate::batch::{StatementEntry, Transaction};
pub use crate::callback::{AsyncCallbackProcessor, TransactionCallback, TransactionFuture};
pub use crate::config::{DEADLOCK_MAX_RETRY_TIME_MS, RetryOptions};
pub use crate::connection::TransactionConnection;
pub use crate::error::SqlTxError;
pub use crate::executor::TransactionExecutor;
pub use crate::statement::PreparedStatement;
pub use crate::types::{RowValues, TxResultCode};
pub use crate::worker::TransactionWorker;

#[cfg(feature = "postgres")]
pub use crate::postgres::PostgresTxConnection;
#[cfg(feature = "sqlite")]
pub use crate::sqlite::SqliteTxConnection;
