use thiserror::Error;

/// Errors raised while configuring backends or moving results between tasks.
///
/// The executor itself never returns these; transaction outcomes are reported as `bool`.
#[derive(Debug, Error)]
pub enum SqlTxError {
    #[cfg(feature = "postgres")]
    #[error(transparent)]
    PostgresError(#[from] tokio_postgres::Error),

    #[cfg(feature = "sqlite")]
    #[error(transparent)]
    SqliteError(#[from] rusqlite::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Parameter error: {0}")]
    ParameterError(String),

    #[error("SQL execution error: {0}")]
    ExecutionError(String),

    #[error("Other database error: {0}")]
    Other(String),
}

impl From<tokio::sync::oneshot::error::RecvError> for SqlTxError {
    fn from(_: tokio::sync::oneshot::error::RecvError) -> Self {
        SqlTxError::ConnectionError("transaction worker dropped the result".into())
    }
}
