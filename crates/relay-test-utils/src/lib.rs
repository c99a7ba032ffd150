// SPDX-FileCopyrightText: 2026 Relay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for relay integration tests.
//!
//! Provides in-memory stand-ins for the system of record, the audit sink
//! and the blob store, each counting calls so tests can assert on exactly
//! how often a dependency was touched.
//!
//! # Components
//!
//! - [`MockChannelStore`] - Channel store with scriptable failures
//! - [`MemoryLogSink`] - Captures committed interaction logs
//! - [`MemoryBlobStore`] - Captures stored attachment bytes

pub mod fixtures;
pub mod mock_blob;
pub mod mock_sink;
pub mod mock_store;

pub use fixtures::{channel_fixture, channel_fixture_with};
pub use mock_blob::{MemoryBlobStore, StoredBlob};
pub use mock_sink::MemoryLogSink;
pub use mock_store::{MockChannelStore, StoreFailure};
