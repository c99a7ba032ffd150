// SPDX-FileCopyrightText: 2026 Relay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Connection management: PRAGMA setup, WAL mode and migrations.
//!
//! All statements run on tokio-rusqlite's single background thread, so a
//! [`Database`] is the only writer. Do not open extra connections for writes.

use std::path::Path;
use std::time::Duration;

use relay_config::model::StorageConfig;
use relay_core::RelayError;
use tracing::debug;

use crate::migrations::run_migrations;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Opens (creating if needed) the database at `path` and migrates it.
    pub async fn open(path: &str, wal_mode: bool) -> Result<Self, RelayError> {
        if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(RelayError::store)?;
        }
        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(RelayError::store)?;
        let db = Self { conn };
        db.prepare(wal_mode).await?;
        debug!(path, wal_mode, "database opened");
        Ok(db)
    }

    pub async fn from_config(config: &StorageConfig) -> Result<Self, RelayError> {
        Self::open(&config.database_path, config.wal_mode).await
    }

    /// A migrated private in-memory database.
    pub async fn open_in_memory() -> Result<Self, RelayError> {
        let conn = tokio_rusqlite::Connection::open_in_memory()
            .await
            .map_err(RelayError::store)?;
        let db = Self { conn };
        db.prepare(false).await?;
        Ok(db)
    }

    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Checkpoints the WAL so the database file is self-contained.
    pub async fn close(&self) -> Result<(), RelayError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.query_row("PRAGMA wal_checkpoint(TRUNCATE)", [], |_| Ok(()))
            })
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }

    async fn prepare(&self, wal_mode: bool) -> Result<(), RelayError> {
        self.conn
            .call(move |conn| -> Result<(), RelayError> {
                if wal_mode {
                    conn.query_row("PRAGMA journal_mode = WAL", [], |_| Ok(()))
                        .map_err(RelayError::store)?;
                    conn.execute_batch("PRAGMA synchronous = NORMAL;")
                        .map_err(RelayError::store)?;
                }
                conn.execute_batch("PRAGMA foreign_keys = ON;")
                    .map_err(RelayError::store)?;
                conn.busy_timeout(BUSY_TIMEOUT).map_err(RelayError::store)?;
                run_migrations(conn)
            })
            .await
            .map_err(|e| match e {
                tokio_rusqlite::Error::Error(inner) => inner,
                other => RelayError::store(other.to_string()),
            })
    }
}

/// Converts a tokio-rusqlite error into [`RelayError::Store`].
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> RelayError {
    RelayError::store(e)
}
