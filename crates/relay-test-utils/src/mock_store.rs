// SPDX-FileCopyrightText: 2026 Relay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory channel store with scriptable outages.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use relay_core::traits::store::select_candidate;
use relay_core::{
    Channel, ChannelStore, ChannelUuid, ExpectedType, ExternalIdKind, MessageKey, MessageMatch,
    MsgId, RelayError,
};

/// How the store misbehaves while a failure is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreFailure {
    /// Every query returns a store error.
    Unavailable,
    /// Every query waits forever, so only a caller deadline ends it.
    Hang,
}

#[derive(Default)]
struct Records {
    channels: Vec<Channel>,
    messages: HashMap<MsgId, ChannelUuid>,
    external_ids: HashMap<String, (ExternalIdKind, ChannelUuid)>,
}

/// A mock system of record.
///
/// Holds channels in memory and answers the three lookups the way the
/// SQLite store does, including wrong-type disambiguation. Every call is
/// counted, even failed ones.
#[derive(Default)]
pub struct MockChannelStore {
    records: Mutex<Records>,
    failure: Mutex<Option<StoreFailure>>,
    calls: AtomicUsize,
}

impl MockChannelStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_channel(&self, channel: Channel) {
        self.records.lock().await.channels.push(channel);
    }

    /// Deletes the channel, as a deactivation in the system of record would.
    pub async fn remove_channel(&self, uuid: ChannelUuid) {
        self.records
            .lock()
            .await
            .channels
            .retain(|ch| ch.uuid != uuid);
    }

    pub async fn add_message(&self, msg_id: MsgId, channel: ChannelUuid) {
        self.records.lock().await.messages.insert(msg_id, channel);
    }

    pub async fn add_external_id(&self, external_id: &str, kind: ExternalIdKind, channel: ChannelUuid) {
        self.records
            .lock()
            .await
            .external_ids
            .insert(external_id.to_string(), (kind, channel));
    }

    pub async fn set_failure(&self, failure: Option<StoreFailure>) {
        *self.failure.lock().await = failure;
    }

    /// Number of queries received so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn begin(&self) -> Result<(), RelayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let failure = *self.failure.lock().await;
        match failure {
            None => Ok(()),
            Some(StoreFailure::Unavailable) => {
                Err(RelayError::store("connection refused by mock store"))
            }
            Some(StoreFailure::Hang) => std::future::pending().await,
        }
    }
}

fn not_found(expected: &ExpectedType, key: impl std::fmt::Display) -> RelayError {
    RelayError::ChannelNotFound {
        channel_type: expected.to_string(),
        key: key.to_string(),
    }
}

#[async_trait]
impl ChannelStore for MockChannelStore {
    async fn find_by_uuid(
        &self,
        expected: &ExpectedType,
        uuid: ChannelUuid,
    ) -> Result<Channel, RelayError> {
        self.begin().await?;
        let records = self.records.lock().await;
        let candidates = records
            .channels
            .iter()
            .filter(|ch| ch.uuid == uuid)
            .cloned()
            .collect();
        select_candidate(expected, candidates, format_args!("uuid: {uuid}"))
    }

    async fn find_by_address(
        &self,
        expected: &ExpectedType,
        address: &str,
    ) -> Result<Channel, RelayError> {
        self.begin().await?;
        let records = self.records.lock().await;
        let candidates = records
            .channels
            .iter()
            .filter(|ch| ch.address.as_deref() == Some(address))
            .cloned()
            .collect();
        select_candidate(expected, candidates, format_args!("address: {address}"))
    }

    async fn find_by_message(
        &self,
        expected: &ExpectedType,
        key: &MessageKey,
    ) -> Result<MessageMatch, RelayError> {
        self.begin().await?;
        let records = self.records.lock().await;

        let (uuid, kind) = match key.msg_id.and_then(|id| records.messages.get(&id)) {
            Some(uuid) => (*uuid, None),
            None => match key
                .external_id
                .as_deref()
                .and_then(|id| records.external_ids.get(id))
            {
                Some((kind, uuid)) => (*uuid, Some(*kind)),
                None => return Err(not_found(expected, key)),
            },
        };

        let candidates = records
            .channels
            .iter()
            .filter(|ch| ch.uuid == uuid)
            .cloned()
            .collect();
        let channel = select_candidate(expected, candidates, key)?;
        Ok(MessageMatch {
            channel,
            external_id_kind: kind,
        })
    }
}
