// SPDX-FileCopyrightText: 2026 Relay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the relay message gateway.
//!
//! This crate provides the channel record, identifier types, the tagged
//! configuration value model, the shared error type and the query contract
//! of the channel system of record. Every other relay crate builds on it.

pub mod channel;
pub mod config_value;
pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use channel::{Channel, ChannelRef, ChannelRole, ChannelRoles};
pub use config_value::{ConfigMap, ConfigValue};
pub use error::RelayError;
pub use traits::{ChannelStore, ExternalIdKind, MessageKey, MessageMatch};
pub use types::{ChannelId, ChannelType, ChannelUuid, ExpectedType, MsgId, OrgId};
