// PostgreSQL module - runs transaction batches on a pooled tokio-postgres connection
//
// - config: Pool configuration checks
// - params: Parameter conversion between `RowValues` and PostgreSQL types
// - connection: TransactionConnection implementation and error classification

pub mod config;
pub mod connection;
pub mod params;

pub use config::create_pool;
pub use connection::{PostgresTxConnection, classify_postgres_error};
