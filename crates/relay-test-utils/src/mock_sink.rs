// SPDX-FileCopyrightText: 2026 Relay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Log sink that keeps committed logs in memory.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use relay_audit::{BatchWriteError, ClosedInteractionLog, LogSink};
use relay_core::RelayError;

/// Captures every log written, with switchable failures.
///
/// `fail_batches` makes every `write_batch` fail, forcing the committer's
/// one-at-a-time fallback; `fail_log` makes single writes of one log fail.
#[derive(Default)]
pub struct MemoryLogSink {
    written: Mutex<Vec<ClosedInteractionLog>>,
    failing_logs: Mutex<HashSet<uuid::Uuid>>,
    fail_batches: AtomicBool,
    batch_calls: AtomicUsize,
}

impl MemoryLogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn logs(&self) -> Vec<ClosedInteractionLog> {
        self.written.lock().await.clone()
    }

    pub async fn count(&self) -> usize {
        self.written.lock().await.len()
    }

    pub fn fail_batches(&self, fail: bool) {
        self.fail_batches.store(fail, Ordering::SeqCst);
    }

    pub async fn fail_log(&self, uuid: uuid::Uuid) {
        self.failing_logs.lock().await.insert(uuid);
    }

    pub fn batch_calls(&self) -> usize {
        self.batch_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LogSink for MemoryLogSink {
    async fn write(&self, log: &ClosedInteractionLog) -> Result<(), RelayError> {
        if self.failing_logs.lock().await.contains(&log.uuid) {
            return Err(RelayError::LogPersist {
                source: format!("mock sink rejected log {}", log.uuid).into(),
            });
        }
        self.written.lock().await.push(log.clone());
        Ok(())
    }

    async fn write_batch(&self, logs: &[ClosedInteractionLog]) -> Result<(), BatchWriteError> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_batches.load(Ordering::SeqCst) {
            return Err(BatchWriteError::nothing_written(RelayError::LogPersist {
                source: "mock sink batch failure".into(),
            }));
        }
        self.written.lock().await.extend_from_slice(logs);
        Ok(())
    }
}
