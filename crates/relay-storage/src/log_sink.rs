// SPDX-FileCopyrightText: 2026 Relay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persists closed interaction logs into `channel_logs`.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::SecondsFormat;
use rusqlite::params;

use relay_audit::{BatchWriteError, ClosedInteractionLog, LogSink};
use relay_core::RelayError;

use crate::database::Database;

const INSERT_LOG: &str = "INSERT INTO channel_logs \
     (uuid, log_type, channel_id, channel_type, msg_id, http_logs, errors, is_error, created_on, elapsed_ms) \
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)";

/// Column values of one log, encoded before crossing to the database thread.
struct LogRow {
    uuid: String,
    log_type: String,
    channel_id: Option<i64>,
    channel_type: String,
    msg_id: Option<i64>,
    http_logs: String,
    errors: String,
    is_error: bool,
    created_on: String,
    elapsed_ms: i64,
}

impl LogRow {
    fn encode(log: &ClosedInteractionLog) -> Result<Self, RelayError> {
        Ok(Self {
            uuid: log.uuid.to_string(),
            log_type: log.log_type.to_string(),
            channel_id: log.channel.channel_id().map(|id| id.0),
            channel_type: log.channel.channel_type().to_string(),
            msg_id: log.msg_id.map(|id| id.0),
            http_logs: serde_json::to_string(&log.http_logs).map_err(persist_err)?,
            errors: serde_json::to_string(&log.errors).map_err(persist_err)?,
            is_error: log.is_error,
            created_on: log.created_on.to_rfc3339_opts(SecondsFormat::Millis, true),
            elapsed_ms: i64::try_from(log.elapsed.as_millis()).unwrap_or(i64::MAX),
        })
    }

    fn insert(&self, conn: &rusqlite::Connection) -> rusqlite::Result<()> {
        conn.execute(
            INSERT_LOG,
            params![
                self.uuid,
                self.log_type,
                self.channel_id,
                self.channel_type,
                self.msg_id,
                self.http_logs,
                self.errors,
                self.is_error,
                self.created_on,
                self.elapsed_ms,
            ],
        )?;
        Ok(())
    }
}

fn persist_err(e: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> RelayError {
    RelayError::LogPersist { source: e.into() }
}

/// [`LogSink`] writing to the relay SQLite database.
///
/// Unattributed logs are stored with a NULL `channel_id` and the provider
/// type they arrived on.
pub struct SqliteLogSink {
    db: Arc<Database>,
}

impl SqliteLogSink {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl LogSink for SqliteLogSink {
    async fn write(&self, log: &ClosedInteractionLog) -> Result<(), RelayError> {
        let row = LogRow::encode(log)?;
        self.db
            .connection()
            .call(move |conn| row.insert(conn))
            .await
            .map_err(persist_err)
    }

    /// All rows land in one transaction: the batch is written whole or not at all.
    async fn write_batch(&self, logs: &[ClosedInteractionLog]) -> Result<(), BatchWriteError> {
        let rows = logs
            .iter()
            .map(LogRow::encode)
            .collect::<Result<Vec<_>, _>>()
            .map_err(BatchWriteError::nothing_written)?;
        self.db
            .connection()
            .call(move |conn| -> Result<(), rusqlite::Error> {
                let tx = conn.transaction()?;
                for row in &rows {
                    row.insert(&tx)?;
                }
                tx.commit()
            })
            .await
            .map_err(|e| BatchWriteError::nothing_written(persist_err(e)))
    }
}
