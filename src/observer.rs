use tracing::{error, warn};

/// Sink for retry-loop observations. Implementations must not influence control flow.
pub trait RetryObserver: Send + Sync {
    /// A retry attempt failed; the loop has been running for `loop_duration_ms`.
    fn deadlock_retry(&self, loop_duration_ms: u64, thread_id: &str);

    /// The retry ceiling was exceeded and the transaction is abandoned.
    fn deadlock_fatal(&self, thread_id: &str);
}

/// Default observer that reports through `tracing` under the `sql.sql` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl RetryObserver for TracingObserver {
    fn deadlock_retry(&self, loop_duration_ms: u64, thread_id: &str) {
        warn!(
            target: "sql.sql",
            loop_ms = loop_duration_ms,
            thread_id,
            "deadlocked SQL transaction, retrying"
        );
    }

    fn deadlock_fatal(&self, thread_id: &str) {
        error!(
            target: "sql.sql",
            thread_id,
            "fatal deadlocked SQL transaction, it will not be retried anymore"
        );
    }
}
