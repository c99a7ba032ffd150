// SPDX-FileCopyrightText: 2026 Relay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Subcommand implementations. Each returns data; `main` prints it.

use std::sync::Arc;

use relay_config::RelayConfig;
use relay_core::{Channel, ChannelUuid, ExpectedType, MessageKey, MsgId, RelayError};
use relay_media::{FetchAttachmentError, FetchAttachmentRequest, FetchAttachmentResponse};
use relay_optout::OptOutClassifier;
use serde::Serialize;

use crate::runtime::Runtime;

/// Which key space a `resolve` targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveTarget {
    Uuid(String),
    Address(String),
    Message {
        msg_id: Option<MsgId>,
        external_id: Option<String>,
    },
}

pub async fn run_resolve(
    runtime: &Runtime,
    expected: &ExpectedType,
    target: ResolveTarget,
) -> Result<Arc<Channel>, RelayError> {
    let resolver = &runtime.resolver;
    match target {
        ResolveTarget::Uuid(raw) => {
            let uuid: ChannelUuid = raw.parse()?;
            resolver.resolve_by_uuid(expected, uuid).await
        }
        ResolveTarget::Address(address) => resolver.resolve_by_address(expected, &address).await,
        ResolveTarget::Message {
            msg_id,
            external_id,
        } => {
            let key = MessageKey::new(msg_id, external_id.as_deref());
            resolver.resolve_by_message(expected, &key).await
        }
    }
}

pub async fn run_fetch_attachment(
    runtime: &Runtime,
    request: FetchAttachmentRequest,
) -> Result<FetchAttachmentResponse, FetchAttachmentError> {
    runtime.attachment_service()?.fetch(request).await
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptOutVerdict {
    pub text: String,
    pub opt_out: bool,
}

pub fn run_opt_out(config: &RelayConfig, text: &str) -> OptOutVerdict {
    let classifier = OptOutClassifier::from_config(&config.optout);
    OptOutVerdict {
        text: text.to_string(),
        opt_out: classifier.is_opt_out(text),
    }
}

/// Effective configuration as TOML.
pub fn run_config(config: &RelayConfig) -> Result<String, RelayError> {
    toml::to_string_pretty(config).map_err(|e| RelayError::Config(e.to_string()))
}
