// SPDX-FileCopyrightText: 2026 Relay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel resolution: cache first, then the store, with stale fallback.

use std::sync::Arc;
use std::time::Duration;

use relay_config::model::CacheConfig;
use relay_core::{
    Channel, ChannelRef, ChannelStore, ChannelType, ChannelUuid, ExpectedType, ExternalIdKind,
    MessageKey, MsgId, RelayError,
};
use tracing::{debug, warn};

use crate::cache::{CacheLookup, ChannelCache};
use crate::key::LookupKey;
use crate::recording::{record_lookup, record_stale_served};

/// Resolves channels for provider traffic.
///
/// Every lookup follows the same rules whatever the key space:
/// a fresh cache entry is returned without touching the store; otherwise
/// the store is asked and its answer refreshes the cache. A not-found
/// answer purges the key. A wrong-type answer leaves the cache alone.
/// Any other store failure is swallowed in favour of an expired entry if
/// one exists.
pub struct ChannelResolver {
    store: Arc<dyn ChannelStore>,
    cache: ChannelCache,
    store_timeout: Duration,
}

impl ChannelResolver {
    pub fn new(store: Arc<dyn ChannelStore>, ttl: Duration, store_timeout: Duration) -> Self {
        Self {
            store,
            cache: ChannelCache::new(ttl),
            store_timeout,
        }
    }

    pub fn from_config(store: Arc<dyn ChannelStore>, config: &CacheConfig) -> Self {
        Self::new(
            store,
            Duration::from_secs(config.ttl_secs),
            Duration::from_millis(config.store_timeout_ms),
        )
    }

    pub fn cache(&self) -> &ChannelCache {
        &self.cache
    }

    pub async fn resolve_by_uuid(
        &self,
        expected: &ExpectedType,
        uuid: ChannelUuid,
    ) -> Result<Arc<Channel>, RelayError> {
        self.resolve(LookupKey::Uuid(uuid), expected).await
    }

    pub async fn resolve_by_address(
        &self,
        expected: &ExpectedType,
        address: &str,
    ) -> Result<Arc<Channel>, RelayError> {
        self.resolve(LookupKey::Address(address.to_string()), expected)
            .await
    }

    /// Resolves through a message id, an external id, or both.
    pub async fn resolve_by_message(
        &self,
        expected: &ExpectedType,
        key: &MessageKey,
    ) -> Result<Arc<Channel>, RelayError> {
        if key.is_empty() {
            return Err(RelayError::InvalidInput(
                "message lookup needs a msg id or an external id".to_string(),
            ));
        }
        self.resolve(LookupKey::Message(key.clone()), expected).await
    }

    /// Files newly reported provider ids for a message whose channel is
    /// already cached. Does nothing when the message is not cached.
    pub fn link_external_ids(
        &self,
        msg_id: MsgId,
        gateway_id: Option<&str>,
        carrier_id: Option<&str>,
    ) {
        if !self.cache.link_external_ids(msg_id, gateway_id, carrier_id) {
            debug!(msg_id = %msg_id, "no cached channel to link external ids to");
        }
    }

    /// Like [`resolve_by_address`](Self::resolve_by_address), but an
    /// authoritative not-found yields [`ChannelRef::Unattributed`] so the
    /// interaction can still be logged.
    pub async fn attribute_by_address(
        &self,
        channel_type: &ChannelType,
        address: &str,
    ) -> Result<ChannelRef, RelayError> {
        let expected = ExpectedType::Only(channel_type.clone());
        match self.resolve_by_address(&expected, address).await {
            Ok(channel) => Ok(ChannelRef::Resolved(channel)),
            Err(e) if e.is_not_found() => Ok(ChannelRef::Unattributed {
                channel_type: channel_type.clone(),
            }),
            Err(e) => Err(e),
        }
    }

    async fn resolve(
        &self,
        key: LookupKey,
        expected: &ExpectedType,
    ) -> Result<Arc<Channel>, RelayError> {
        let index = key.index();
        let stale = match self.cache.lookup(&key, expected) {
            CacheLookup::Fresh(channel) => {
                debug!(index, key = %key, "channel cache hit");
                record_lookup(index, "fresh");
                return Ok(channel);
            }
            CacheLookup::Stale(channel) => Some(channel),
            CacheLookup::Miss => None,
        };

        let fetched = match tokio::time::timeout(self.store_timeout, self.fetch(&key, expected)).await
        {
            Ok(result) => result,
            Err(_) => Err(RelayError::Timeout {
                duration: self.store_timeout,
            }),
        };

        match fetched {
            Ok((channel, matched)) => {
                let channel = Arc::new(channel);
                self.cache.insert(&key, Arc::clone(&channel), matched);
                record_lookup(index, "refreshed");
                Ok(channel)
            }
            Err(e) if e.is_not_found() => {
                self.cache.evict(&key, expected);
                debug!(index, key = %key, "channel not found, cache entry purged");
                record_lookup(index, "not_found");
                Err(RelayError::ChannelNotFound {
                    channel_type: expected.to_string(),
                    key: key.to_string(),
                })
            }
            Err(e) if e.is_wrong_type() => {
                record_lookup(index, "wrong_type");
                Err(e)
            }
            Err(e) => match stale {
                Some(channel) => {
                    warn!(
                        index,
                        key = %key,
                        error = %e,
                        "channel store unavailable, serving expired cache entry"
                    );
                    record_lookup(index, "stale");
                    record_stale_served(index);
                    Ok(channel)
                }
                None => {
                    record_lookup(index, "error");
                    Err(e)
                }
            },
        }
    }

    async fn fetch(
        &self,
        key: &LookupKey,
        expected: &ExpectedType,
    ) -> Result<(Channel, Option<ExternalIdKind>), RelayError> {
        match key {
            LookupKey::Uuid(uuid) => {
                let channel = self.store.find_by_uuid(expected, *uuid).await?;
                Ok((channel, None))
            }
            LookupKey::Address(address) => {
                let channel = self.store.find_by_address(expected, address).await?;
                Ok((channel, None))
            }
            LookupKey::Message(msg_key) => {
                let found = self.store.find_by_message(expected, msg_key).await?;
                Ok((found.channel, found.external_id_kind))
            }
        }
    }
}
