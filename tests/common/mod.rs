#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sql_tx_batch::{
    Clock, RetryObserver, StatementEntry, Transaction, TransactionConnection, TxResultCode,
};

/// Flatten a batch into the SQL text of its entries, in execution order.
pub fn batch_sql(tx: &Transaction) -> Vec<String> {
    tx.iter()
        .map(|entry| match entry {
            StatementEntry::Raw(sql) => sql.clone(),
            StatementEntry::Prepared(stmt) => stmt.sql().to_owned(),
        })
        .collect()
}

/// Connection that records every attempt and replays scripted result codes.
///
/// Once the script runs out every attempt returns the fallback code (`Success` by default).
pub struct ScriptedConnection {
    script: VecDeque<TxResultCode>,
    fallback: TxResultCode,
    pub attempts: Arc<Mutex<Vec<Vec<String>>>>,
    clock: Option<(Arc<ManualClock>, u64)>,
}

impl ScriptedConnection {
    pub fn new(script: impl IntoIterator<Item = TxResultCode>) -> Self {
        Self {
            script: script.into_iter().collect(),
            fallback: TxResultCode::Success,
            attempts: Arc::new(Mutex::new(Vec::new())),
            clock: None,
        }
    }

    pub fn succeeding() -> Self {
        Self::new(Vec::<TxResultCode>::new())
    }

    /// Fail every attempt with a lock conflict.
    pub fn always_conflicting() -> Self {
        let mut conn = Self::succeeding();
        conn.fallback = TxResultCode::LockConflict;
        conn
    }

    /// Advance `clock` by `step_ms` on every attempt.
    pub fn advancing(mut self, clock: Arc<ManualClock>, step_ms: u64) -> Self {
        self.clock = Some((clock, step_ms));
        self
    }

    pub fn attempt_count(&self) -> usize {
        self.attempts.lock().unwrap().len()
    }
}

#[async_trait]
impl TransactionConnection for ScriptedConnection {
    async fn execute_transaction(&mut self, tx: &Transaction) -> TxResultCode {
        self.attempts.lock().unwrap().push(batch_sql(tx));
        if let Some((clock, step)) = &self.clock {
            clock.advance(*step);
        }
        self.script
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

/// Manually driven clock.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub fn advance(&self, ms: u64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Observer that counts what the executor reported.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    pub retries: Mutex<Vec<u64>>,
    pub fatal: AtomicUsize,
}

impl RecordingObserver {
    pub fn retry_count(&self) -> usize {
        self.retries.lock().unwrap().len()
    }

    pub fn fatal_count(&self) -> usize {
        self.fatal.load(Ordering::SeqCst)
    }
}

impl RetryObserver for RecordingObserver {
    fn deadlock_retry(&self, loop_duration_ms: u64, thread_id: &str) {
        assert!(!thread_id.is_empty());
        self.retries.lock().unwrap().push(loop_duration_ms);
    }

    fn deadlock_fatal(&self, thread_id: &str) {
        assert!(!thread_id.is_empty());
        self.fatal.fetch_add(1, Ordering::SeqCst);
    }
}
