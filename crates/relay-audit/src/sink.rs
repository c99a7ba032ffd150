// SPDX-FileCopyrightText: 2026 Relay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use async_trait::async_trait;
use relay_core::RelayError;

use crate::log::ClosedInteractionLog;

/// A batch write that stopped part way.
///
/// `written` counts the leading logs of the batch that are already durable;
/// they must not be written again.
#[derive(Debug, thiserror::Error)]
#[error("batch write failed after {written} logs: {source}")]
pub struct BatchWriteError {
    pub written: usize,
    #[source]
    pub source: RelayError,
}

impl BatchWriteError {
    /// Failure of a batch that was written all or nothing.
    pub fn nothing_written(source: RelayError) -> Self {
        Self { written: 0, source }
    }
}

/// Durable destination for closed interaction logs.
#[async_trait]
pub trait LogSink: Send + Sync {
    async fn write(&self, log: &ClosedInteractionLog) -> Result<(), RelayError>;

    /// Writes several logs in order.
    ///
    /// Sinks that can write atomically should override this and report
    /// [`BatchWriteError::nothing_written`] on failure.
    async fn write_batch(&self, logs: &[ClosedInteractionLog]) -> Result<(), BatchWriteError> {
        for (written, log) in logs.iter().enumerate() {
            self.write(log)
                .await
                .map_err(|source| BatchWriteError { written, source })?;
        }
        Ok(())
    }
}
