// SPDX-FileCopyrightText: 2026 Relay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error type shared by every relay crate.

use thiserror::Error;

use crate::types::ChannelType;

/// The primary error type used across channel resolution, audit logging and
/// attachment ingestion.
#[derive(Debug, Error)]
pub enum RelayError {
    /// No active channel matches the key. Authoritative: never masked by a
    /// stale cache entry.
    #[error("unable to find channel with type: {channel_type} and {key}")]
    ChannelNotFound { channel_type: String, key: String },

    /// The key resolves to a channel of another provider type.
    #[error("channel for {key} has type {actual}, expected {expected}")]
    ChannelWrongType {
        expected: String,
        actual: ChannelType,
        key: String,
    },

    /// The system of record failed (connection, query, decoding).
    #[error("store error: {source}")]
    Store {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// An outbound HTTP call could not complete at the transport layer.
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The blob store refused or failed to persist attachment bytes.
    #[error("blob store error: {source}")]
    BlobStore {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// An audit record could not be written durably.
    #[error("log persist error: {source}")]
    LogPersist {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Caller supplied a malformed request or key.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Operation exceeded its deadline.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RelayError {
    /// Wraps any error as a store failure.
    pub fn store(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Store {
            source: source.into(),
        }
    }

    /// Whether this error is the authoritative not-found outcome.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ChannelNotFound { .. })
    }

    /// Whether this error is a provider-type mismatch.
    pub fn is_wrong_type(&self) -> bool {
        matches!(self, Self::ChannelWrongType { .. })
    }

    /// Transient failures may be masked by a stale cache entry.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Store { .. } | Self::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_helpers() {
        let not_found = RelayError::ChannelNotFound {
            channel_type: "TW".into(),
            key: "uuid: 1".into(),
        };
        assert!(not_found.is_not_found());
        assert!(!not_found.is_transient());

        let wrong = RelayError::ChannelWrongType {
            expected: "TW".into(),
            actual: ChannelType::new("MGA"),
            key: "uuid: 1".into(),
        };
        assert!(wrong.is_wrong_type());
        assert!(!wrong.is_transient());

        assert!(RelayError::store(std::io::Error::other("down")).is_transient());
        assert!(
            RelayError::Timeout {
                duration: std::time::Duration::from_secs(1)
            }
            .is_transient()
        );
        assert!(!RelayError::Internal("x".into()).is_transient());
    }

    #[test]
    fn not_found_message_names_the_key() {
        let err = RelayError::ChannelNotFound {
            channel_type: "TW".into(),
            key: "address: 2020".into(),
        };
        assert_eq!(
            err.to_string(),
            "unable to find channel with type: TW and address: 2020"
        );
    }
}
