// SPDX-FileCopyrightText: 2026 Relay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Identifier newtypes shared across the gateway.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RelayError;

/// Short code identifying which external messaging service a channel uses
/// (e.g. `TW`, `MGA`, `SMPP`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelType(String);

impl ChannelType {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChannelType {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

/// The provider type a lookup is constrained to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpectedType {
    /// Accept a channel of any provider type.
    Any,
    /// Accept only channels of this provider type.
    Only(ChannelType),
}

impl ExpectedType {
    /// Whether a channel of `actual` type satisfies this expectation.
    pub fn matches(&self, actual: &ChannelType) -> bool {
        match self {
            ExpectedType::Any => true,
            ExpectedType::Only(expected) => expected == actual,
        }
    }
}

impl fmt::Display for ExpectedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpectedType::Any => f.write_str("ANY"),
            ExpectedType::Only(t) => t.fmt(f),
        }
    }
}

impl From<ChannelType> for ExpectedType {
    fn from(t: ChannelType) -> Self {
        ExpectedType::Only(t)
    }
}

impl From<&str> for ExpectedType {
    fn from(code: &str) -> Self {
        if code.eq_ignore_ascii_case("any") {
            ExpectedType::Any
        } else {
            ExpectedType::Only(ChannelType::new(code))
        }
    }
}

/// Immutable channel identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelUuid(pub uuid::Uuid);

impl fmt::Display for ChannelUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for ChannelUuid {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        uuid::Uuid::parse_str(&s.to_lowercase())
            .map(ChannelUuid)
            .map_err(|e| RelayError::InvalidInput(format!("invalid channel uuid `{s}`: {e}")))
    }
}

/// Database row id of a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(pub i64);

/// Database row id of an organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrgId(pub i64);

impl fmt::Display for OrgId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifier of a message in the system of record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MsgId(pub i64);

impl fmt::Display for MsgId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
