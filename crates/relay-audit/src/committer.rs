// SPDX-FileCopyrightText: 2026 Relay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Background committer for closed interaction logs.
//!
//! Callers hand logs to a [`LogQueue`] without waiting; a single task
//! collects them into batches and writes them to a [`LogSink`]. Audit loss
//! is preferred over back-pressure: when the queue is full or a write fails
//! the log is reported locally and discarded.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use std::time::Duration;

use relay_config::model::AuditConfig;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::log::{ChannelError, ClosedInteractionLog, InteractionLog};
use crate::recording::{record_dropped, record_written};
use crate::sink::LogSink;

/// Batching parameters for a [`LogCommitter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitterConfig {
    pub queue_capacity: usize,
    pub batch_size: usize,
    pub flush_interval: Duration,
}

impl CommitterConfig {
    pub fn from_config(config: &AuditConfig) -> Self {
        Self {
            queue_capacity: config.queue_capacity.max(1),
            batch_size: config.batch_size.max(1),
            flush_interval: Duration::from_millis(config.flush_interval_ms.max(1)),
        }
    }
}

impl Default for CommitterConfig {
    fn default() -> Self {
        Self::from_config(&AuditConfig::default())
    }
}

/// Owns the background commit task.
pub struct LogCommitter {
    queue: LogQueue,
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl LogCommitter {
    /// Spawns the commit task on the current runtime.
    pub fn start(sink: Arc<dyn LogSink>, config: CommitterConfig) -> Self {
        let (tx, rx) = mpsc::channel(config.queue_capacity);
        let token = CancellationToken::new();
        let handle = tokio::spawn(run(
            sink,
            rx,
            config.batch_size,
            config.flush_interval,
            token.clone(),
        ));
        Self {
            queue: LogQueue { tx },
            token,
            handle,
        }
    }

    pub fn queue(&self) -> LogQueue {
        self.queue.clone()
    }

    /// Stops accepting logs, writes everything already queued, and waits
    /// for the task to finish.
    pub async fn stop(self) {
        self.token.cancel();
        if let Err(e) = self.handle.await {
            error!(error = %e, "log committer task failed");
        }
    }
}

async fn run(
    sink: Arc<dyn LogSink>,
    mut rx: mpsc::Receiver<ClosedInteractionLog>,
    batch_size: usize,
    flush_interval: Duration,
    token: CancellationToken,
) {
    let mut batch = Vec::with_capacity(batch_size);
    let mut ticker = tokio::time::interval(flush_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            received = rx.recv() => match received {
                Some(log) => {
                    batch.push(log);
                    if batch.len() >= batch_size {
                        flush(sink.as_ref(), &mut batch).await;
                    }
                }
                None => break,
            },
            _ = ticker.tick() => flush(sink.as_ref(), &mut batch).await,
        }
    }

    rx.close();
    while let Some(log) = rx.recv().await {
        batch.push(log);
        if batch.len() >= batch_size {
            flush(sink.as_ref(), &mut batch).await;
        }
    }
    flush(sink.as_ref(), &mut batch).await;
    debug!("log committer stopped");
}

async fn flush(sink: &dyn LogSink, batch: &mut Vec<ClosedInteractionLog>) {
    if batch.is_empty() {
        return;
    }
    let logs = std::mem::take(batch);

    let Err(e) = sink.write_batch(&logs).await else {
        record_written(logs.len());
        return;
    };
    // logs before `written` are durable; only the rest is retried
    let written = e.written.min(logs.len());
    record_written(written);
    let remaining = &logs[written..];
    warn!(
        count = remaining.len(),
        written,
        error = %e.source,
        "batch write failed, writing remaining logs one at a time"
    );
    for log in remaining {
        match sink.write(log).await {
            Ok(()) => record_written(1),
            Err(e) => {
                error!(
                    log_uuid = %log.uuid,
                    log_type = %log.log_type,
                    error = %e,
                    "failed to write channel log, discarding"
                );
                record_dropped("write_failed");
            }
        }
    }
}

/// Cheap handle for submitting closed logs.
#[derive(Debug, Clone)]
pub struct LogQueue {
    tx: mpsc::Sender<ClosedInteractionLog>,
}

impl LogQueue {
    /// Hands a log to the committer without waiting. Returns false if the
    /// log was dropped.
    pub fn queue(&self, log: ClosedInteractionLog) -> bool {
        match self.tx.try_send(log) {
            Ok(()) => true,
            Err(TrySendError::Full(log)) => {
                warn!(log_uuid = %log.uuid, log_type = %log.log_type, "log queue full, dropping channel log");
                record_dropped("queue_full");
                false
            }
            Err(TrySendError::Closed(log)) => {
                warn!(log_uuid = %log.uuid, log_type = %log.log_type, "log committer stopped, dropping channel log");
                record_dropped("closed");
                false
            }
        }
    }

    /// Wraps an open log so it is committed even if the caller never
    /// finishes it.
    pub fn track(&self, log: InteractionLog) -> TrackedInteraction {
        TrackedInteraction {
            log,
            queue: self.clone(),
            finished: false,
        }
    }
}

/// An open log that commits itself when dropped.
///
/// Call [`finish`](Self::finish) on the normal path. If the guard is
/// dropped first (the task was cancelled, or an error returned early) the
/// log records a `cancelled` error before it is closed and queued.
#[derive(Debug)]
pub struct TrackedInteraction {
    log: InteractionLog,
    queue: LogQueue,
    finished: bool,
}

impl TrackedInteraction {
    /// Closes and queues the log, returning its uuid.
    pub fn finish(mut self) -> uuid::Uuid {
        self.finished = true;
        self.log.uuid()
    }
}

impl Deref for TrackedInteraction {
    type Target = InteractionLog;

    fn deref(&self) -> &InteractionLog {
        &self.log
    }
}

impl DerefMut for TrackedInteraction {
    fn deref_mut(&mut self) -> &mut InteractionLog {
        &mut self.log
    }
}

impl Drop for TrackedInteraction {
    fn drop(&mut self) {
        if !self.finished {
            debug!(log_uuid = %self.log.uuid(), "interaction dropped before finish");
            self.log.error(ChannelError::with_code(
                "interaction cancelled before completion",
                "cancelled",
            ));
        }
        self.queue.queue(self.log.close_in_place());
    }
}
