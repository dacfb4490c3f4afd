use std::fmt;
use std::sync::{Arc, LazyLock};
use std::thread;

use tokio::sync::Mutex;
use tracing::debug;

use crate::batch::Transaction;
use crate::clock::{Clock, SystemClock};
use crate::config::RetryOptions;
use crate::connection::TransactionConnection;
use crate::observer::{RetryObserver, TracingObserver};
use crate::types::TxResultCode;

// Only one task retries a deadlocked transaction at a time, process-wide, so concurrent
// retriers don't keep deadlocking each other.
static DEADLOCK_LOCK: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

/// Identity of the calling thread, for log attribution only.
#[must_use]
pub fn current_thread_id() -> String {
    format!("{:?}", thread::current().id())
}

/// Runs a [`Transaction`] against a connection, retrying the whole batch on lock conflicts.
///
/// Retries are serialized through a single process-wide lock held for the entire retry
/// loop and are bounded by [`RetryOptions::max_retry_time_ms`].
#[derive(Clone)]
pub struct TransactionExecutor {
    options: RetryOptions,
    clock: Arc<dyn Clock>,
    observer: Arc<dyn RetryObserver>,
}

impl Default for TransactionExecutor {
    fn default() -> Self {
        Self::new(RetryOptions::default())
    }
}

impl fmt::Debug for TransactionExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionExecutor")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl TransactionExecutor {
    #[must_use]
    pub fn new(options: RetryOptions) -> Self {
        Self {
            options,
            clock: Arc::new(SystemClock),
            observer: Arc::new(TracingObserver),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn RetryObserver>) -> Self {
        self.observer = observer;
        self
    }

    #[must_use]
    pub fn options(&self) -> &RetryOptions {
        &self.options
    }

    /// Execute `tx` on `conn`.
    ///
    /// Returns `true` when the transaction committed; the batch is left intact. Returns
    /// `false` when it failed permanently, either from a non-retryable error or because the
    /// retry ceiling was exceeded; the batch has then been cleaned up and must not be reused.
    pub async fn execute<C>(&self, conn: &mut C, tx: &mut Transaction) -> bool
    where
        C: TransactionConnection + ?Sized,
    {
        match conn.execute_transaction(tx).await {
            TxResultCode::Success => return true,
            TxResultCode::LockConflict => {
                if self.retry_deadlocked(conn, tx).await {
                    return true;
                }
            }
            TxResultCode::OtherError(code) => {
                debug!(code = %code, statements = tx.len(), "SQL transaction failed, not retrying");
            }
        }

        tx.cleanup();
        false
    }

    async fn retry_deadlocked<C>(&self, conn: &mut C, tx: &Transaction) -> bool
    where
        C: TransactionConnection + ?Sized,
    {
        let thread_id = current_thread_id();
        let _guard = DEADLOCK_LOCK.lock().await;

        let start = self.clock.now_ms();
        let mut loop_duration = 0;
        while loop_duration <= self.options.max_retry_time_ms {
            if conn.execute_transaction(tx).await.is_success() {
                return true;
            }

            self.observer.deadlock_retry(loop_duration, &thread_id);
            loop_duration = self.clock.elapsed_ms(start);
        }

        self.observer.deadlock_fatal(&thread_id);
        false
    }
}
