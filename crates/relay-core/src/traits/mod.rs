// SPDX-FileCopyrightText: 2026 Relay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Contracts for collaborators that live outside the core.

pub mod store;

pub use store::{
    ChannelStore, ExternalIdKind, MessageKey, MessageMatch, ensure_type, select_candidate,
};
