// SPDX-FileCopyrightText: 2026 Relay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Process-local channel cache.
//!
//! Each key space sits behind its own `RwLock` so a busy address index
//! never contends with UUID lookups. Locks are only held for map access,
//! never across a store round-trip.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use relay_core::{
    Channel, ChannelType, ChannelUuid, ExpectedType, ExternalIdKind, MessageKey, MsgId,
};
use tokio::time::Instant;

use crate::key::LookupKey;

#[derive(Debug, Clone)]
struct CacheEntry {
    channel: Arc<Channel>,
    expires_at: Instant,
}

/// Outcome of a cache probe.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheLookup {
    /// Entry within its TTL; trust it.
    Fresh(Arc<Channel>),
    /// Entry past its TTL; only usable as a fallback.
    Stale(Arc<Channel>),
    Miss,
}

#[derive(Debug, Default)]
struct MessageIndex {
    by_msg_id: HashMap<MsgId, CacheEntry>,
    by_gateway_id: HashMap<String, CacheEntry>,
    by_carrier_id: HashMap<String, CacheEntry>,
}

impl MessageIndex {
    fn get(&self, key: &MessageKey) -> Option<&CacheEntry> {
        if let Some(entry) = key.msg_id.and_then(|id| self.by_msg_id.get(&id)) {
            return Some(entry);
        }
        let external_id = key.external_id.as_deref()?;
        self.by_gateway_id
            .get(external_id)
            .or_else(|| self.by_carrier_id.get(external_id))
    }

    fn remove(&mut self, key: &MessageKey) {
        if let Some(msg_id) = key.msg_id {
            self.by_msg_id.remove(&msg_id);
        }
        if let Some(external_id) = key.external_id.as_deref() {
            self.by_gateway_id.remove(external_id);
            self.by_carrier_id.remove(external_id);
        }
    }
}

/// Addresses are only unique per channel type, so each address holds one
/// entry per type.
type AddressIndex = HashMap<String, HashMap<ChannelType, CacheEntry>>;

/// TTL cache over the UUID, address and message key spaces.
#[derive(Debug)]
pub struct ChannelCache {
    ttl: Duration,
    by_uuid: RwLock<HashMap<ChannelUuid, CacheEntry>>,
    by_address: RwLock<AddressIndex>,
    by_message: RwLock<MessageIndex>,
}

impl ChannelCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            by_uuid: RwLock::default(),
            by_address: RwLock::default(),
            by_message: RwLock::default(),
        }
    }

    /// Probes the key space for `key`.
    ///
    /// An entry whose type does not satisfy `expected` is reported as a miss:
    /// it is neither served nor offered as a stale fallback. An address
    /// probed for any type yields the entry of that address expiring last.
    pub fn lookup(&self, key: &LookupKey, expected: &ExpectedType) -> CacheLookup {
        let entry = match key {
            LookupKey::Uuid(uuid) => read(&self.by_uuid).get(uuid).cloned(),
            LookupKey::Address(address) if address.is_empty() => None,
            LookupKey::Address(address) => {
                let index = read(&self.by_address);
                let by_type = index.get(address);
                match expected {
                    ExpectedType::Only(channel_type) => {
                        by_type.and_then(|entries| entries.get(channel_type)).cloned()
                    }
                    ExpectedType::Any => by_type
                        .and_then(|entries| entries.values().max_by_key(|entry| entry.expires_at))
                        .cloned(),
                }
            }
            LookupKey::Message(msg_key) => read(&self.by_message).get(msg_key).cloned(),
        };

        match entry {
            Some(entry) if expected.matches(&entry.channel.channel_type) => {
                if Instant::now() < entry.expires_at {
                    CacheLookup::Fresh(entry.channel)
                } else {
                    CacheLookup::Stale(entry.channel)
                }
            }
            _ => CacheLookup::Miss,
        }
    }

    /// Stores `channel` under `key` with a fresh TTL.
    ///
    /// For message keys the message id is always indexed; the external id is
    /// indexed under `matched` when the store says which column it hit.
    pub fn insert(&self, key: &LookupKey, channel: Arc<Channel>, matched: Option<ExternalIdKind>) {
        let entry = CacheEntry {
            channel,
            expires_at: Instant::now() + self.ttl,
        };
        match key {
            LookupKey::Uuid(uuid) => {
                write(&self.by_uuid).insert(*uuid, entry);
            }
            LookupKey::Address(address) if address.is_empty() => {}
            LookupKey::Address(address) => {
                let channel_type = entry.channel.channel_type.clone();
                write(&self.by_address)
                    .entry(address.clone())
                    .or_default()
                    .insert(channel_type, entry);
            }
            LookupKey::Message(msg_key) => {
                let mut index = write(&self.by_message);
                if let Some(external_id) = msg_key.external_id.clone() {
                    match matched {
                        Some(ExternalIdKind::Gateway) => {
                            index.by_gateway_id.insert(external_id, entry.clone());
                        }
                        Some(ExternalIdKind::Carrier) => {
                            index.by_carrier_id.insert(external_id, entry.clone());
                        }
                        None => {}
                    }
                }
                if let Some(msg_id) = msg_key.msg_id {
                    index.by_msg_id.insert(msg_id, entry);
                }
            }
        }
    }

    /// Removes every entry reachable from `key`. Address entries of types
    /// outside `expected` belong to other channels and are kept.
    pub fn evict(&self, key: &LookupKey, expected: &ExpectedType) {
        match key {
            LookupKey::Uuid(uuid) => {
                write(&self.by_uuid).remove(uuid);
            }
            LookupKey::Address(address) => {
                let mut index = write(&self.by_address);
                if let ExpectedType::Only(channel_type) = expected
                    && let Some(entries) = index.get_mut(address)
                {
                    entries.remove(channel_type);
                    if !entries.is_empty() {
                        return;
                    }
                }
                index.remove(address);
            }
            LookupKey::Message(msg_key) => write(&self.by_message).remove(msg_key),
        }
    }

    /// Copies the cached channel for `msg_id` into the external-id indices,
    /// keeping its expiry. Returns false when `msg_id` is not cached.
    pub fn link_external_ids(
        &self,
        msg_id: MsgId,
        gateway_id: Option<&str>,
        carrier_id: Option<&str>,
    ) -> bool {
        let mut index = write(&self.by_message);
        let Some(entry) = index.by_msg_id.get(&msg_id).cloned() else {
            return false;
        };
        if let Some(id) = gateway_id.filter(|id| !id.is_empty()) {
            index.by_gateway_id.insert(id.to_string(), entry.clone());
        }
        if let Some(id) = carrier_id.filter(|id| !id.is_empty()) {
            index.by_carrier_id.insert(id.to_string(), entry);
        }
        true
    }

    /// Number of entries per key space, as (uuid, address, message).
    pub fn sizes(&self) -> (usize, usize, usize) {
        let messages = read(&self.by_message);
        (
            read(&self.by_uuid).len(),
            read(&self.by_address).values().map(HashMap::len).sum(),
            messages.by_msg_id.len() + messages.by_gateway_id.len() + messages.by_carrier_id.len(),
        )
    }
}

// Entries are replaced whole, so a panicked writer cannot leave a map torn.
fn read<T>(lock: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use relay_core::{ChannelType, ChannelUuid};
    use relay_test_utils::channel_fixture;

    fn expected(code: &str) -> ExpectedType {
        ExpectedType::Only(ChannelType::new(code))
    }

    #[tokio::test(start_paused = true)]
    async fn entry_goes_stale_after_ttl() {
        let cache = ChannelCache::new(Duration::from_secs(60));
        let channel = Arc::new(channel_fixture("TW", "+12065551212"));
        let key = LookupKey::Uuid(channel.uuid);
        cache.insert(&key, channel.clone(), None);

        assert_eq!(cache.lookup(&key, &expected("TW")), CacheLookup::Fresh(channel.clone()));
        tokio::time::advance(Duration::from_secs(61)).await;
        assert_eq!(cache.lookup(&key, &expected("TW")), CacheLookup::Stale(channel));
    }

    #[tokio::test(start_paused = true)]
    async fn other_type_is_a_miss() {
        let cache = ChannelCache::new(Duration::from_secs(60));
        let channel = Arc::new(channel_fixture("TW", "+12065551212"));
        let key = LookupKey::Uuid(channel.uuid);
        cache.insert(&key, channel.clone(), None);

        assert_eq!(cache.lookup(&key, &expected("MGA")), CacheLookup::Miss);
        assert_eq!(cache.lookup(&key, &ExpectedType::Any), CacheLookup::Fresh(channel));
    }

    #[tokio::test(start_paused = true)]
    async fn empty_address_is_never_cached() {
        let cache = ChannelCache::new(Duration::from_secs(60));
        let channel = Arc::new(channel_fixture("TW", ""));
        let key = LookupKey::Address(String::new());
        cache.insert(&key, channel, None);

        assert_eq!(cache.sizes(), (0, 0, 0));
        assert_eq!(cache.lookup(&key, &ExpectedType::Any), CacheLookup::Miss);
    }

    #[tokio::test(start_paused = true)]
    async fn shared_address_keeps_one_entry_per_type() {
        let cache = ChannelCache::new(Duration::from_secs(60));
        let twilio = Arc::new(channel_fixture("TW", "1234"));
        let mblox = Arc::new(channel_fixture("MGA", "1234"));
        let key = LookupKey::Address("1234".into());
        cache.insert(&key, twilio.clone(), None);
        tokio::time::advance(Duration::from_secs(1)).await;
        cache.insert(&key, mblox.clone(), None);

        assert_eq!(cache.sizes(), (0, 2, 0));
        assert_eq!(cache.lookup(&key, &expected("TW")), CacheLookup::Fresh(twilio));
        assert_eq!(cache.lookup(&key, &ExpectedType::Any), CacheLookup::Fresh(mblox.clone()));

        cache.evict(&key, &expected("TW"));
        assert_eq!(cache.lookup(&key, &expected("TW")), CacheLookup::Miss);
        assert_eq!(cache.lookup(&key, &expected("MGA")), CacheLookup::Fresh(mblox));

        cache.evict(&key, &ExpectedType::Any);
        assert_eq!(cache.sizes(), (0, 0, 0));
    }

    #[tokio::test(start_paused = true)]
    async fn linked_external_ids_resolve_and_evict_together() {
        let cache = ChannelCache::new(Duration::from_secs(60));
        let channel = Arc::new(channel_fixture("SMPP", "1234"));
        let by_id = LookupKey::Message(MessageKey::new(Some(MsgId(10)), None));
        cache.insert(&by_id, channel.clone(), None);

        assert!(cache.link_external_ids(MsgId(10), Some("gw-1"), Some("car-1")));
        assert!(!cache.link_external_ids(MsgId(11), Some("gw-2"), None));

        let by_carrier = LookupKey::Message(MessageKey::new(None, Some("car-1")));
        assert_eq!(
            cache.lookup(&by_carrier, &ExpectedType::Any),
            CacheLookup::Fresh(channel)
        );

        cache.evict(
            &LookupKey::Message(MessageKey::new(Some(MsgId(10)), Some("car-1"))),
            &ExpectedType::Any,
        );
        assert_eq!(cache.lookup(&by_carrier, &ExpectedType::Any), CacheLookup::Miss);
        assert_eq!(cache.lookup(&by_id, &ExpectedType::Any), CacheLookup::Miss);
        assert_eq!(cache.sizes(), (0, 0, 1));
    }

    #[test]
    fn evicting_unknown_key_is_a_no_op() {
        let cache = ChannelCache::new(Duration::from_secs(60));
        cache.evict(&LookupKey::Uuid(ChannelUuid(uuid::Uuid::nil())), &ExpectedType::Any);
        assert_eq!(cache.sizes(), (0, 0, 0));
    }
}
