use deadpool_postgres::{Config as PgConfig, Pool};
use tokio_postgres::NoTls;

use crate::error::SqlTxError;

/// Create a Postgres pool whose connections can back a
/// [`PostgresTxConnection`](super::PostgresTxConnection).
///
/// # Errors
/// Returns `SqlTxError::ConfigError` if required config fields are missing or
/// `SqlTxError::ConnectionError` if pool creation fails.
pub fn create_pool(pg_config: &PgConfig) -> Result<Pool, SqlTxError> {
    if pg_config.dbname.is_none() {
        return Err(SqlTxError::ConfigError("dbname is required".to_string()));
    }
    if pg_config.host.is_none() {
        return Err(SqlTxError::ConfigError("host is required".to_string()));
    }
    if pg_config.user.is_none() {
        return Err(SqlTxError::ConfigError("user is required".to_string()));
    }

    pg_config
        .create_pool(Some(deadpool_postgres::Runtime::Tokio1), NoTls)
        .map_err(|e| SqlTxError::ConnectionError(format!("Failed to create Postgres pool: {e}")))
}
