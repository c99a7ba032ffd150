// SPDX-FileCopyrightText: 2026 Relay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Audit trail of the gateway's exchanges with providers.
//!
//! Adapters open an [`InteractionLog`] per exchange, record HTTP traces and
//! errors into it, close it, and hand it to a [`LogQueue`]. The
//! [`LogCommitter`] writes queued logs to a [`LogSink`] in batches.

pub mod committer;
pub mod log;
pub mod recording;
pub mod sink;
pub mod trace;

pub use committer::{CommitterConfig, LogCommitter, LogQueue, TrackedInteraction};
pub use log::{ChannelError, ClosedInteractionLog, InteractionLog, LogType};
pub use sink::{BatchWriteError, LogSink};
pub use trace::{HttpLog, HttpTrace, REDACTED, TraceLimits};
