// SQLite module - runs transaction batches on a rusqlite connection
//
// - params: Parameter conversion between `RowValues` and SQLite types
// - connection: TransactionConnection implementation and error classification

pub mod connection;
pub mod params;

pub use connection::{SqliteTxConnection, classify_sqlite_error};
pub use params::Params as SqliteParams;
