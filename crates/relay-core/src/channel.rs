// SPDX-FileCopyrightText: 2026 Relay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The configured channel record and its attribution wrapper.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::config_value::ConfigMap;
use crate::types::{ChannelId, ChannelType, ChannelUuid, OrgId};

/// Channel config key naming the domain callbacks should be built against.
pub const CONFIG_CALLBACK_DOMAIN: &str = "callback_domain";

/// One capability of a channel, stored as a single-character flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
pub enum ChannelRole {
    #[strum(serialize = "S")]
    Send,
    #[strum(serialize = "R")]
    Receive,
    #[strum(serialize = "C")]
    Call,
    #[strum(serialize = "A")]
    Answer,
    #[strum(serialize = "U")]
    Ussd,
}

impl ChannelRole {
    fn bit(self) -> u8 {
        match self {
            ChannelRole::Send => 1,
            ChannelRole::Receive => 1 << 1,
            ChannelRole::Call => 1 << 2,
            ChannelRole::Answer => 1 << 3,
            ChannelRole::Ussd => 1 << 4,
        }
    }
}

const ALL_ROLES: [ChannelRole; 5] = [
    ChannelRole::Send,
    ChannelRole::Receive,
    ChannelRole::Call,
    ChannelRole::Answer,
    ChannelRole::Ussd,
];

/// Set of roles a channel supports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ChannelRoles(u8);

impl ChannelRoles {
    /// Parses a flag string such as `"SR"`. Unknown characters are ignored.
    pub fn parse(flags: &str) -> Self {
        let bits = flags
            .chars()
            .filter_map(|c| c.to_string().parse::<ChannelRole>().ok())
            .fold(0, |acc, role| acc | role.bit());
        Self(bits)
    }

    pub fn contains(&self, role: ChannelRole) -> bool {
        self.0 & role.bit() != 0
    }

    pub fn iter(&self) -> impl Iterator<Item = ChannelRole> + '_ {
        ALL_ROLES.into_iter().filter(|r| self.contains(*r))
    }

    /// Flag string form, in canonical order.
    pub fn to_flags(&self) -> String {
        self.iter().map(|r| r.to_string()).collect()
    }
}

impl Serialize for ChannelRoles {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_flags())
    }
}

impl<'de> Deserialize<'de> for ChannelRoles {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let flags = String::deserialize(deserializer)?;
        Ok(ChannelRoles::parse(&flags))
    }
}

/// A configured connection to one external messaging provider.
///
/// Records are produced by the system of record and cached read-only;
/// they are never mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub id: ChannelId,
    pub uuid: ChannelUuid,
    pub org_id: OrgId,
    pub channel_type: ChannelType,
    pub name: Option<String>,
    pub schemes: Vec<String>,
    pub address: Option<String>,
    pub country: Option<String>,
    pub roles: ChannelRoles,
    pub config: ConfigMap,
    pub org_config: ConfigMap,
    pub org_is_anon: bool,
}

impl Channel {
    /// Address, or empty string if the channel has none.
    pub fn address(&self) -> &str {
        self.address.as_deref().unwrap_or_default()
    }

    pub fn has_address(&self) -> bool {
        !self.address().is_empty()
    }

    pub fn country(&self) -> &str {
        self.country.as_deref().unwrap_or_default()
    }

    pub fn has_role(&self, role: ChannelRole) -> bool {
        self.roles.contains(role)
    }

    /// Whether this channel serves only the passed scheme.
    pub fn is_scheme(&self, scheme: &str) -> bool {
        self.schemes.len() == 1 && self.schemes[0] == scheme
    }

    pub fn supports_scheme(&self, scheme: &str) -> bool {
        self.schemes.iter().any(|s| s == scheme)
    }

    pub fn config_string_or(&self, key: &str, default: &str) -> String {
        self.config.string_or(key, default)
    }

    pub fn config_int_or(&self, key: &str, default: i64) -> i64 {
        self.config.int_or(key, default)
    }

    pub fn config_bool_or(&self, key: &str, default: bool) -> bool {
        self.config.bool_or(key, default)
    }

    pub fn org_config_string_or(&self, key: &str, default: &str) -> String {
        self.org_config.string_or(key, default)
    }

    pub fn org_config_bool_or(&self, key: &str, default: bool) -> bool {
        self.org_config.bool_or(key, default)
    }

    pub fn callback_domain(&self, fallback: &str) -> String {
        self.config.string_or(CONFIG_CALLBACK_DOMAIN, fallback)
    }
}

/// The channel an interaction belongs to, if it could be attributed yet.
///
/// Status callbacks sometimes arrive before the owning channel can be
/// determined; those are carried as [`ChannelRef::Unattributed`] so the
/// "no channel" case is an explicit branch rather than a zero-valued record.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelRef {
    Resolved(Arc<Channel>),
    Unattributed { channel_type: ChannelType },
}

impl ChannelRef {
    pub fn channel(&self) -> Option<&Arc<Channel>> {
        match self {
            ChannelRef::Resolved(ch) => Some(ch),
            ChannelRef::Unattributed { .. } => None,
        }
    }

    pub fn channel_type(&self) -> &ChannelType {
        match self {
            ChannelRef::Resolved(ch) => &ch.channel_type,
            ChannelRef::Unattributed { channel_type } => channel_type,
        }
    }

    pub fn channel_id(&self) -> Option<ChannelId> {
        self.channel().map(|ch| ch.id)
    }

    pub fn channel_uuid(&self) -> Option<ChannelUuid> {
        self.channel().map(|ch| ch.uuid)
    }
}

impl From<Arc<Channel>> for ChannelRef {
    fn from(ch: Arc<Channel>) -> Self {
        ChannelRef::Resolved(ch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel(roles: &str, schemes: &[&str]) -> Channel {
        Channel {
            id: ChannelId(1),
            uuid: ChannelUuid(uuid::Uuid::nil()),
            org_id: OrgId(1),
            channel_type: ChannelType::new("TW"),
            name: Some("Twilio".into()),
            schemes: schemes.iter().map(|s| s.to_string()).collect(),
            address: None,
            country: Some("US".into()),
            roles: ChannelRoles::parse(roles),
            config: ConfigMap::new().with(CONFIG_CALLBACK_DOMAIN, "cb.example.com"),
            org_config: ConfigMap::new(),
            org_is_anon: false,
        }
    }

    #[test]
    fn roles_parse_single_character_flags() {
        let roles = ChannelRoles::parse("SRx");
        assert!(roles.contains(ChannelRole::Send));
        assert!(roles.contains(ChannelRole::Receive));
        assert!(!roles.contains(ChannelRole::Call));
        assert_eq!(roles.to_flags(), "SR");
        assert_eq!(ChannelRoles::parse("").to_flags(), "");
    }

    #[test]
    fn scheme_helpers() {
        let ch = channel("SR", &["tel"]);
        assert!(ch.is_scheme("tel"));
        assert!(ch.supports_scheme("tel"));

        let multi = channel("SR", &["tel", "whatsapp"]);
        assert!(!multi.is_scheme("tel"));
        assert!(multi.supports_scheme("whatsapp"));
    }

    #[test]
    fn empty_address_and_callback_domain() {
        let ch = channel("S", &["tel"]);
        assert_eq!(ch.address(), "");
        assert!(!ch.has_address());
        assert_eq!(ch.callback_domain("fallback.example.com"), "cb.example.com");
        assert!(ch.has_role(ChannelRole::Send));
        assert!(!ch.has_role(ChannelRole::Receive));
    }

    #[test]
    fn unattributed_ref_has_no_channel() {
        let r = ChannelRef::Unattributed {
            channel_type: ChannelType::new("MGA"),
        };
        assert!(r.channel().is_none());
        assert_eq!(r.channel_id(), None);
        assert_eq!(r.channel_type().as_str(), "MGA");

        let resolved = ChannelRef::from(Arc::new(channel("SR", &["tel"])));
        assert_eq!(resolved.channel_id(), Some(ChannelId(1)));
    }

    #[test]
    fn roles_serialize_as_flags() {
        let json = serde_json::to_string(&ChannelRoles::parse("RS")).unwrap();
        assert_eq!(json, "\"SR\"");
        let back: ChannelRoles = serde_json::from_str("\"C\"").unwrap();
        assert!(back.contains(ChannelRole::Call));
    }
}
