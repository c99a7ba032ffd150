// SPDX-FileCopyrightText: 2026 Relay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query contract of the system of record for channels.

use std::fmt;

use async_trait::async_trait;

use crate::channel::Channel;
use crate::error::RelayError;
use crate::types::{ChannelUuid, ExpectedType, MsgId};

/// Message-derived lookup key: an internal message id and/or an opaque id
/// reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageKey {
    pub msg_id: Option<MsgId>,
    pub external_id: Option<String>,
}

impl MessageKey {
    /// Builds a key, treating an empty external id as absent.
    pub fn new(msg_id: Option<MsgId>, external_id: Option<&str>) -> Self {
        Self {
            msg_id,
            external_id: external_id
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(str::to_string),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.msg_id.is_none() && self.external_id.is_none()
    }
}

impl fmt::Display for MessageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg_id = self.msg_id.map(|id| id.to_string()).unwrap_or_default();
        let external_id = self.external_id.as_deref().unwrap_or_default();
        write!(f, "msg id: {msg_id} and external id: {external_id}")
    }
}

/// Which external-id column a message lookup matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExternalIdKind {
    /// Id assigned by the gateway that accepted the message.
    Gateway,
    /// Id assigned by the carrier behind the gateway.
    Carrier,
}

/// Result of a message lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageMatch {
    pub channel: Channel,
    /// Set when the match came through the external id rather than the message id.
    pub external_id_kind: Option<ExternalIdKind>,
}

/// Lookups against the system of record.
///
/// Implementations return [`RelayError::ChannelNotFound`] when no active
/// channel matches, [`RelayError::ChannelWrongType`] when matches exist but
/// none has the expected type, and any other error for failures talking to
/// the store.
#[async_trait]
pub trait ChannelStore: Send + Sync {
    async fn find_by_uuid(
        &self,
        expected: &ExpectedType,
        uuid: ChannelUuid,
    ) -> Result<Channel, RelayError>;

    async fn find_by_address(
        &self,
        expected: &ExpectedType,
        address: &str,
    ) -> Result<Channel, RelayError>;

    async fn find_by_message(
        &self,
        expected: &ExpectedType,
        key: &MessageKey,
    ) -> Result<MessageMatch, RelayError>;
}

/// Checks a found channel against the expected type.
pub fn ensure_type(
    expected: &ExpectedType,
    channel: Channel,
    key: impl fmt::Display,
) -> Result<Channel, RelayError> {
    if expected.matches(&channel.channel_type) {
        Ok(channel)
    } else {
        Err(RelayError::ChannelWrongType {
            expected: expected.to_string(),
            actual: channel.channel_type,
            key: key.to_string(),
        })
    }
}

/// Picks the candidate of the expected type from every active channel
/// matching a key. With no such candidate the first one is reported as the
/// wrong type; with no candidates at all the key is not found.
pub fn select_candidate(
    expected: &ExpectedType,
    candidates: Vec<Channel>,
    key: impl fmt::Display,
) -> Result<Channel, RelayError> {
    let mut candidates = candidates.into_iter().peekable();
    let Some(first) = candidates.peek().cloned() else {
        return Err(RelayError::ChannelNotFound {
            channel_type: expected.to_string(),
            key: key.to_string(),
        });
    };
    match candidates.find(|ch| expected.matches(&ch.channel_type)) {
        Some(found) => Ok(found),
        None => ensure_type(expected, first, key),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_key_normalizes_blank_external_id() {
        let key = MessageKey::new(None, Some("  "));
        assert!(key.is_empty());
        let key = MessageKey::new(Some(MsgId(12)), Some("ext-1"));
        assert_eq!(key.to_string(), "msg id: 12 and external id: ext-1");
    }

    fn channel(channel_type: &str) -> Channel {
        Channel {
            id: crate::ChannelId(1),
            uuid: ChannelUuid(uuid::Uuid::new_v4()),
            org_id: crate::OrgId(1),
            channel_type: channel_type.into(),
            name: None,
            schemes: vec!["tel".to_string()],
            address: Some("1234".to_string()),
            country: None,
            roles: crate::ChannelRoles::parse("SR"),
            config: crate::ConfigMap::new(),
            org_config: crate::ConfigMap::new(),
            org_is_anon: false,
        }
    }

    #[test]
    fn select_candidate_prefers_expected_type() {
        let found = select_candidate(
            &ExpectedType::from("TW"),
            vec![channel("MGA"), channel("TW")],
            "address: 1234",
        )
        .unwrap();
        assert_eq!(found.channel_type.as_str(), "TW");
    }

    #[test]
    fn select_candidate_reports_wrong_type_and_not_found() {
        let err = select_candidate(&ExpectedType::from("TW"), vec![channel("MGA")], "address: 1234")
            .unwrap_err();
        assert!(err.is_wrong_type());

        let err = select_candidate(&ExpectedType::Any, Vec::new(), "address: 1234").unwrap_err();
        assert!(err.is_not_found());
    }
}
