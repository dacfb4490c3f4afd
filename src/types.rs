use chrono::NaiveDateTime;
use serde_json::Value as JsonValue;

/// Values bound to prepared statement placeholders.
///
/// The same enum is shared by every backend adapter so a [`Transaction`](crate::Transaction)
/// can be built once and executed against either `SQLite` or Postgres:
/// ```rust
/// use sql_tx_batch::prelude::*;
///
/// let stmt = PreparedStatement::with_params(
///     "insert into account(id, owner) values(?1, ?2)",
///     vec![RowValues::Int(1), RowValues::Text("alice".into())],
/// );
/// assert!(stmt.is_fully_bound());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum RowValues {
    /// Integer value (64-bit)
    Int(i64),
    /// Floating point value (64-bit)
    Float(f64),
    /// Text/string value
    Text(String),
    /// Boolean value
    Bool(bool),
    /// Timestamp value
    Timestamp(NaiveDateTime),
    /// NULL value
    Null,
    /// JSON value
    JSON(JsonValue),
    /// Binary data
    Blob(Vec<u8>),
}

impl RowValues {
    /// Check if this value is NULL
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_int(&self) -> Option<&i64> {
        if let RowValues::Int(value) = self {
            Some(value)
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let RowValues::Text(value) = self {
            Some(value)
        } else {
            None
        }
    }
}

/// Result reported by a connection after attempting a whole [`Transaction`](crate::Transaction).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxResultCode {
    /// Every statement ran and the transaction committed.
    Success,
    /// The database aborted the transaction because of lock contention (deadlock, busy
    /// database, serialization failure). The whole batch may be retried.
    LockConflict,
    /// Any other failure, carrying the backend's error code (`SQLSTATE`, `SQLite` code name, ...).
    OtherError(String),
}

impl TxResultCode {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    #[must_use]
    pub fn is_lock_conflict(&self) -> bool {
        matches!(self, Self::LockConflict)
    }
}
