// SPDX-FileCopyrightText: 2026 Relay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fetch-attachment requests: resolve the channel, ingest, and audit.

use std::sync::Arc;

use relay_audit::{InteractionLog, LogQueue, LogType, TraceLimits};
use relay_channels::ChannelResolver;
use relay_core::{ChannelType, ChannelUuid, ExpectedType, MsgId, RelayError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::ingest::{Attachment, AttachmentIngestor};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchAttachmentRequest {
    pub channel_type: ChannelType,
    pub channel_uuid: String,
    pub url: String,
    #[serde(default)]
    pub msg_id: Option<MsgId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchAttachmentResponse {
    pub attachment: Attachment,
    pub log_uuid: Uuid,
}

/// A failed fetch. `log_uuid` is set once an interaction log was opened,
/// so callers can point at the audit record.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct FetchAttachmentError {
    pub log_uuid: Option<Uuid>,
    #[source]
    pub error: RelayError,
}

impl From<RelayError> for FetchAttachmentError {
    fn from(error: RelayError) -> Self {
        Self {
            log_uuid: None,
            error,
        }
    }
}

pub struct AttachmentService {
    resolver: Arc<ChannelResolver>,
    ingestor: Arc<AttachmentIngestor>,
    logs: LogQueue,
    limits: TraceLimits,
}

impl AttachmentService {
    pub fn new(
        resolver: Arc<ChannelResolver>,
        ingestor: Arc<AttachmentIngestor>,
        logs: LogQueue,
        limits: TraceLimits,
    ) -> Self {
        Self {
            resolver,
            ingestor,
            logs,
            limits,
        }
    }

    pub async fn fetch(
        &self,
        request: FetchAttachmentRequest,
    ) -> Result<FetchAttachmentResponse, FetchAttachmentError> {
        if request.url.trim().is_empty() {
            return Err(RelayError::InvalidInput("url is required".to_string()).into());
        }
        let uuid: ChannelUuid = request.channel_uuid.parse()?;
        let expected = ExpectedType::Only(request.channel_type.clone());
        let channel = self.resolver.resolve_by_uuid(&expected, uuid).await?;

        let log = InteractionLog::new(LogType::AttachmentFetch, Arc::clone(&channel), request.msg_id)
            .with_limits(self.limits);
        let mut tracked = self.logs.track(log);

        let result = self
            .ingestor
            .fetch_and_store(&channel, &request.url, &mut tracked)
            .await;
        if let Err(e) = &result {
            tracked.error(e);
        }
        let log_uuid = tracked.finish();

        match result {
            Ok(attachment) => Ok(FetchAttachmentResponse {
                attachment,
                log_uuid,
            }),
            Err(error) => Err(FetchAttachmentError {
                log_uuid: Some(log_uuid),
                error,
            }),
        }
    }
}
