// SPDX-FileCopyrightText: 2026 Relay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wiring of the gateway core from a validated configuration.

use std::sync::Arc;

use relay_audit::{CommitterConfig, LogCommitter, TraceLimits};
use relay_channels::ChannelResolver;
use relay_config::RelayConfig;
use relay_core::RelayError;
use relay_media::{
    AttachmentIngestor, AttachmentService, FsBlobStore, IngestLimits, build_client,
};
use relay_storage::{Database, SqliteChannelStore, SqliteLogSink};
use tracing::{debug, info};

/// Live gateway core: the database, the channel resolver and the log
/// committer. Call [`shutdown`](Self::shutdown) so queued logs are flushed.
pub struct Runtime {
    pub config: RelayConfig,
    pub(crate) db: Arc<Database>,
    pub resolver: Arc<ChannelResolver>,
    committer: LogCommitter,
}

impl Runtime {
    pub async fn start(config: RelayConfig) -> Result<Self, RelayError> {
        let db = Arc::new(Database::from_config(&config.storage).await?);
        let store = Arc::new(SqliteChannelStore::new(Arc::clone(&db)));
        let resolver = Arc::new(ChannelResolver::from_config(store, &config.cache));
        let sink = Arc::new(SqliteLogSink::new(Arc::clone(&db)));
        let committer = LogCommitter::start(sink, CommitterConfig::from_config(&config.audit));
        info!(
            name = %config.gateway.name,
            database = %config.storage.database_path,
            "gateway core started"
        );
        Ok(Self {
            config,
            db,
            resolver,
            committer,
        })
    }

    pub fn attachment_service(&self) -> Result<AttachmentService, RelayError> {
        let media = &self.config.media;
        let ingestor = AttachmentIngestor::new(
            build_client(media)?,
            Arc::new(FsBlobStore::from_config(media)),
            IngestLimits::from_config(media),
        );
        Ok(AttachmentService::new(
            Arc::clone(&self.resolver),
            Arc::new(ingestor),
            self.committer.queue(),
            TraceLimits::from_config(&self.config.audit),
        ))
    }

    /// Drains the log queue, then checkpoints the database.
    pub async fn shutdown(self) -> Result<(), RelayError> {
        self.committer.stop().await;
        self.db.close().await?;
        debug!("gateway core stopped");
        Ok(())
    }
}
