// SPDX-FileCopyrightText: 2026 Relay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt;

use relay_core::{ChannelUuid, MessageKey};

/// A key in one of the channel key spaces.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LookupKey {
    Uuid(ChannelUuid),
    Address(String),
    Message(MessageKey),
}

impl LookupKey {
    /// Metric and log label for the key space.
    pub fn index(&self) -> &'static str {
        match self {
            LookupKey::Uuid(_) => "uuid",
            LookupKey::Address(_) => "address",
            LookupKey::Message(_) => "message",
        }
    }
}

impl fmt::Display for LookupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupKey::Uuid(uuid) => write!(f, "uuid: {uuid}"),
            LookupKey::Address(address) => write!(f, "address: {address}"),
            LookupKey::Message(key) => key.fmt(f),
        }
    }
}
