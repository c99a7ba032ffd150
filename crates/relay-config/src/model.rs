// SPDX-FileCopyrightText: 2026 Relay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the relay gateway.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level relay configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RelayConfig {
    /// Gateway identity and logging.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// SQLite storage settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Channel cache settings.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Interaction log batching and truncation.
    #[serde(default)]
    pub audit: AuditConfig,

    /// Attachment download and storage.
    #[serde(default)]
    pub media: MediaConfig,

    /// Opt-out keyword extensions.
    #[serde(default)]
    pub optout: OptOutConfig,
}

/// Gateway identity configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Name reported in logs.
    #[serde(default = "default_gateway_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            name: default_gateway_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_gateway_name() -> String {
    "relay".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable write-ahead logging.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("relay").join("relay.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("relay.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Channel cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    /// Seconds a cached channel stays fresh after a store read.
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,

    /// Deadline for a single store lookup, in milliseconds.
    #[serde(default = "default_store_timeout_ms")]
    pub store_timeout_ms: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
            store_timeout_ms: default_store_timeout_ms(),
        }
    }
}

fn default_ttl_secs() -> u64 {
    60
}

fn default_store_timeout_ms() -> u64 {
    5_000
}

/// Interaction log configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    /// Maximum closed logs waiting for the committer.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Logs written per sink batch.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Flush a partial batch after this many milliseconds.
    #[serde(default = "default_flush_interval_ms")]
    pub flush_interval_ms: u64,

    #[serde(default = "default_max_url_bytes")]
    pub max_url_bytes: usize,

    #[serde(default = "default_max_trace_bytes")]
    pub max_request_bytes: usize,

    #[serde(default = "default_max_trace_bytes")]
    pub max_response_bytes: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
            batch_size: default_batch_size(),
            flush_interval_ms: default_flush_interval_ms(),
            max_url_bytes: default_max_url_bytes(),
            max_request_bytes: default_max_trace_bytes(),
            max_response_bytes: default_max_trace_bytes(),
        }
    }
}

fn default_queue_capacity() -> usize {
    4096
}

fn default_batch_size() -> usize {
    100
}

fn default_flush_interval_ms() -> u64 {
    500
}

fn default_max_url_bytes() -> usize {
    2048
}

fn default_max_trace_bytes() -> usize {
    50_000
}

/// Attachment ingestion configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MediaConfig {
    /// Largest body accepted from a remote attachment URL.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: u64,

    /// Leading bytes inspected for a content signature.
    #[serde(default = "default_sniff_bytes")]
    pub sniff_bytes: usize,

    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    #[serde(default = "default_store_timeout_secs")]
    pub store_timeout_secs: u64,

    /// Root directory for stored attachments.
    #[serde(default = "default_media_dir")]
    pub media_dir: String,

    /// Base URL that stored attachments are served from.
    #[serde(default = "default_public_url")]
    pub public_url: String,

    /// Path segment between `public_url` and the org directory.
    #[serde(default = "default_prefix")]
    pub prefix: String,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: default_max_body_bytes(),
            sniff_bytes: default_sniff_bytes(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            store_timeout_secs: default_store_timeout_secs(),
            media_dir: default_media_dir(),
            public_url: default_public_url(),
            prefix: default_prefix(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_max_body_bytes() -> u64 {
    100 * 1024 * 1024
}

fn default_sniff_bytes() -> usize {
    300
}

fn default_fetch_timeout_secs() -> u64 {
    30
}

fn default_store_timeout_secs() -> u64 {
    30
}

fn default_media_dir() -> String {
    dirs::data_dir()
        .map(|p| p.join("relay").join("media"))
        .unwrap_or_else(|| std::path::PathBuf::from("media"))
        .to_string_lossy()
        .into_owned()
}

fn default_public_url() -> String {
    "http://localhost:8000/storage".to_string()
}

fn default_prefix() -> String {
    "media".to_string()
}

fn default_user_agent() -> String {
    format!("relay/{}", env!("CARGO_PKG_VERSION"))
}

/// Additions to the built-in opt-out vocabulary.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OptOutConfig {
    /// Single-word keywords, matched per token.
    #[serde(default)]
    pub extra_keywords: Vec<String>,

    /// Multi-word phrases, matched as substrings.
    #[serde(default)]
    pub extra_phrases: Vec<String>,
}
