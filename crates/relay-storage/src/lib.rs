// SPDX-FileCopyrightText: 2026 Relay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence for the relay gateway.
//!
//! Provides WAL-mode SQLite storage with embedded migrations and a
//! single-writer model via `tokio-rusqlite`. [`SqliteChannelStore`] answers
//! channel lookups; [`SqliteLogSink`] persists closed interaction logs.

pub mod channel_store;
pub mod database;
pub mod log_sink;
pub mod migrations;

pub use channel_store::SqliteChannelStore;
pub use database::Database;
pub use log_sink::SqliteLogSink;
