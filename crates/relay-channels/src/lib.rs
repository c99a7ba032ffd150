// SPDX-FileCopyrightText: 2026 Relay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel resolution for the relay gateway.
//!
//! [`ChannelResolver`] answers "which channel owns this request?" by UUID,
//! by address, or by message id / provider id, keeping a process-local
//! [`ChannelCache`] so short store outages do not interrupt traffic for
//! channels seen recently.

pub mod cache;
pub mod key;
pub mod recording;
pub mod resolver;

pub use cache::{CacheLookup, ChannelCache};
pub use key::LookupKey;
pub use resolver::ChannelResolver;
