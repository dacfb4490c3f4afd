use serde::Deserialize;

use crate::error::SqlTxError;
use crate::executor::TransactionExecutor;

/// Longest time a deadlocked transaction keeps retrying before it is declared permanently failed.
pub const DEADLOCK_MAX_RETRY_TIME_MS: u64 = 60_000;

/// Options for the deadlock retry loop.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RetryOptions {
    /// Retry ceiling in milliseconds, measured from the first retry attempt.
    #[serde(default = "default_max_retry_time_ms")]
    pub max_retry_time_ms: u64,
}

const fn default_max_retry_time_ms() -> u64 {
    DEADLOCK_MAX_RETRY_TIME_MS
}

impl Default for RetryOptions {
    fn default() -> Self {
        Self {
            max_retry_time_ms: DEADLOCK_MAX_RETRY_TIME_MS,
        }
    }
}

impl RetryOptions {
    #[must_use]
    pub fn builder() -> RetryOptionsBuilder {
        RetryOptionsBuilder::new()
    }

    /// Check the options before they are handed to an executor.
    ///
    /// # Errors
    /// Returns `SqlTxError::ConfigError` if the retry ceiling is zero.
    pub fn validate(&self) -> Result<(), SqlTxError> {
        if self.max_retry_time_ms == 0 {
            return Err(SqlTxError::ConfigError(
                "max_retry_time_ms must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

/// Fluent builder for [`RetryOptions`].
#[derive(Debug, Clone, Default)]
pub struct RetryOptionsBuilder {
    opts: RetryOptions,
}

impl RetryOptionsBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn max_retry_time_ms(mut self, max_retry_time_ms: u64) -> Self {
        self.opts.max_retry_time_ms = max_retry_time_ms;
        self
    }

    #[must_use]
    pub fn finish(self) -> RetryOptions {
        self.opts
    }

    /// Build a [`TransactionExecutor`] using the system clock and the tracing observer.
    ///
    /// # Errors
    /// Returns `SqlTxError::ConfigError` if the options are invalid.
    pub fn build(self) -> Result<TransactionExecutor, SqlTxError> {
        let opts = self.finish();
        opts.validate()?;
        Ok(TransactionExecutor::new(opts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_ceiling_is_sixty_seconds() {
        assert_eq!(RetryOptions::default().max_retry_time_ms, 60_000);
    }

    #[test]
    fn deserializes_with_default() {
        let opts: RetryOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(opts, RetryOptions::default());
        let opts: RetryOptions = serde_json::from_str(r#"{"max_retry_time_ms": 250}"#).unwrap();
        assert_eq!(opts.max_retry_time_ms, 250);
    }

    #[test]
    fn zero_ceiling_is_rejected() {
        let err = RetryOptions::builder().max_retry_time_ms(0).build().unwrap_err();
        assert!(matches!(err, SqlTxError::ConfigError(_)));
    }
}
