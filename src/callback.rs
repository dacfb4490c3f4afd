use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot::{self, error::TryRecvError};
use tracing::warn;

use crate::error::SqlTxError;

/// Deferred result of an asynchronously committed transaction.
///
/// The value can be collected once, either by polling [`try_take`](Self::try_take) from a
/// non-blocking loop or by awaiting the future.
#[derive(Debug)]
pub struct TransactionFuture {
    rx: Option<oneshot::Receiver<bool>>,
}

impl TransactionFuture {
    /// Create a connected sender/future pair.
    #[must_use]
    pub fn channel() -> (oneshot::Sender<bool>, Self) {
        let (tx, rx) = oneshot::channel();
        (tx, Self { rx: Some(rx) })
    }

    /// False once the result has been collected or the producer went away without one.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.rx.is_some()
    }

    /// Collect the result if it is available, without blocking.
    ///
    /// Returns `None` while the result is pending, after it has been collected, or when the
    /// producer was dropped; in the last case the future becomes invalid.
    pub fn try_take(&mut self) -> Option<bool> {
        let rx = self.rx.as_mut()?;
        match rx.try_recv() {
            Ok(committed) => {
                self.rx = None;
                Some(committed)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Closed) => {
                self.rx = None;
                None
            }
        }
    }
}

impl Future for TransactionFuture {
    type Output = Result<bool, SqlTxError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let Some(rx) = self.rx.as_mut() else {
            return Poll::Ready(Err(SqlTxError::ExecutionError(
                "transaction result already collected".into(),
            )));
        };
        match Pin::new(rx).poll(cx) {
            Poll::Ready(result) => {
                self.rx = None;
                Poll::Ready(result.map_err(SqlTxError::from))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

type Callback = Box<dyn FnOnce(bool) + Send>;

/// Pairs a [`TransactionFuture`] with a callback that runs once the result is in.
pub struct TransactionCallback {
    future: TransactionFuture,
    callback: Option<Callback>,
}

impl TransactionCallback {
    pub fn new<F>(future: TransactionFuture, callback: F) -> Self
    where
        F: FnOnce(bool) + Send + 'static,
    {
        Self {
            future,
            callback: Some(Box::new(callback)),
        }
    }

    /// Hand the result to the callback if it is available. Never blocks.
    ///
    /// Returns `true` only on the call that fired the callback. Earlier calls (result not
    /// ready) and later calls (already fired) return `false` and change nothing.
    pub fn invoke_if_ready(&mut self) -> bool {
        if self.callback.is_none() {
            return false;
        }

        let Some(committed) = self.future.try_take() else {
            return false;
        };
        if let Some(callback) = self.callback.take() {
            callback(committed);
        }
        true
    }

    /// True while the callback has not fired and a result can still arrive.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.callback.is_some() && self.future.is_valid()
    }

    #[must_use]
    pub fn has_fired(&self) -> bool {
        self.callback.is_none()
    }
}

impl fmt::Debug for TransactionCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionCallback")
            .field("future", &self.future)
            .field("fired", &self.has_fired())
            .finish()
    }
}

/// Holds outstanding callbacks and fires the ready ones from a polling loop.
#[derive(Debug, Default)]
pub struct AsyncCallbackProcessor {
    callbacks: Vec<TransactionCallback>,
}

impl AsyncCallbackProcessor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_callback(&mut self, callback: TransactionCallback) {
        self.callbacks.push(callback);
    }

    /// Fire every callback whose result is available and forget it. Returns how many fired.
    ///
    /// Callbacks whose producer went away without a result are dropped as well.
    pub fn process_ready_callbacks(&mut self) -> usize {
        let mut fired = 0;
        self.callbacks.retain_mut(|callback| {
            if callback.invoke_if_ready() {
                fired += 1;
                return false;
            }
            if !callback.is_pending() {
                warn!(target: "sql.sql", "transaction result abandoned before completion");
                return false;
            }
            true
        });
        fired
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    /// Drop every outstanding callback without running it.
    pub fn cancel_all(&mut self) {
        self.callbacks.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn counting_callback(
        future: TransactionFuture,
        calls: &Arc<AtomicUsize>,
    ) -> TransactionCallback {
        let calls = Arc::clone(calls);
        TransactionCallback::new(future, move |committed| {
            assert!(committed);
            calls.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn fires_once_after_result_arrives() {
        let (tx, future) = TransactionFuture::channel();
        let calls = Arc::new(AtomicUsize::new(0));
        let mut callback = counting_callback(future, &calls);

        assert!(!callback.invoke_if_ready());
        assert!(!callback.invoke_if_ready());
        assert!(callback.is_pending());
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        tx.send(true).unwrap();
        assert!(callback.invoke_if_ready());
        for _ in 0..5 {
            assert!(!callback.invoke_if_ready());
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(callback.has_fired());
    }

    #[test]
    fn dropped_sender_never_fires() {
        let (tx, future) = TransactionFuture::channel();
        let calls = Arc::new(AtomicUsize::new(0));
        let mut callback = counting_callback(future, &calls);
        drop(tx);

        assert!(!callback.invoke_if_ready());
        assert!(!callback.is_pending());
        assert!(!callback.has_fired());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn processor_keeps_pending_callbacks() {
        let calls = Arc::new(AtomicUsize::new(0));
        let (first_tx, first) = TransactionFuture::channel();
        let (_second_tx, second) = TransactionFuture::channel();
        let (third_tx, third) = TransactionFuture::channel();

        let mut processor = AsyncCallbackProcessor::new();
        processor.add_callback(counting_callback(first, &calls));
        processor.add_callback(counting_callback(second, &calls));
        processor.add_callback(counting_callback(third, &calls));

        assert_eq!(processor.process_ready_callbacks(), 0);
        assert_eq!(processor.len(), 3);

        first_tx.send(true).unwrap();
        drop(third_tx);
        assert_eq!(processor.process_ready_callbacks(), 1);
        assert_eq!(processor.len(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        processor.cancel_all();
        assert!(processor.is_empty());
    }

    #[tokio::test]
    async fn future_can_be_awaited() {
        let (tx, future) = TransactionFuture::channel();
        tx.send(false).unwrap();
        assert!(!future.await.unwrap());
    }

    #[tokio::test]
    async fn awaiting_abandoned_future_errors() {
        let (tx, future) = TransactionFuture::channel();
        drop(tx);
        assert!(matches!(future.await, Err(SqlTxError::ConnectionError(_))));
    }
}
