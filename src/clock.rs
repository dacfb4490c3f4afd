use std::sync::LazyLock;
use std::time::Instant;

static PROCESS_START: LazyLock<Instant> = LazyLock::new(Instant::now);

/// Millisecond time source used to bound the deadlock retry loop.
pub trait Clock: Send + Sync {
    /// Monotonic milliseconds since an arbitrary fixed origin.
    fn now_ms(&self) -> u64;

    /// Milliseconds elapsed since `start`, a value previously returned by [`now_ms`](Self::now_ms).
    fn elapsed_ms(&self, start: u64) -> u64 {
        self.now_ms().saturating_sub(start)
    }
}

/// Wall clock backed by [`Instant`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        u64::try_from(PROCESS_START.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}
