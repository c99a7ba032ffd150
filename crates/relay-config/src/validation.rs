// SPDX-FileCopyrightText: 2026 Relay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as non-empty paths, positive sizes and parseable URLs.

use crate::diagnostic::ConfigError;
use crate::model::RelayConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if config.storage.database_path.trim().is_empty() {
        fail("storage.database_path must not be empty".to_string());
    }

    if config.cache.ttl_secs == 0 {
        fail("cache.ttl_secs must be greater than zero".to_string());
    }

    if config.audit.batch_size == 0 {
        fail("audit.batch_size must be greater than zero".to_string());
    }

    if config.audit.queue_capacity < config.audit.batch_size {
        fail(format!(
            "audit.queue_capacity ({}) must be at least audit.batch_size ({})",
            config.audit.queue_capacity, config.audit.batch_size
        ));
    }

    if config.media.max_body_bytes < config.media.sniff_bytes as u64 {
        fail(format!(
            "media.max_body_bytes ({}) must be at least media.sniff_bytes ({})",
            config.media.max_body_bytes, config.media.sniff_bytes
        ));
    }

    if let Err(e) = url::Url::parse(&config.media.public_url) {
        fail(format!(
            "media.public_url `{}` is not a valid URL: {e}",
            config.media.public_url
        ));
    }

    for keyword in &config.optout.extra_keywords {
        if keyword.trim().is_empty() || keyword.contains(char::is_whitespace) {
            fail(format!(
                "optout.extra_keywords entry `{keyword}` must be a single word; use extra_phrases for phrases"
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(config: &RelayConfig) -> Vec<String> {
        validate_config(config)
            .unwrap_err()
            .into_iter()
            .map(|e| e.to_string())
            .collect()
    }

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&RelayConfig::default()).is_ok());
    }

    #[test]
    fn empty_database_path_fails_validation() {
        let mut config = RelayConfig::default();
        config.storage.database_path = "  ".to_string();
        assert!(messages(&config).iter().any(|m| m.contains("database_path")));
    }

    #[test]
    fn zero_ttl_fails_validation() {
        let mut config = RelayConfig::default();
        config.cache.ttl_secs = 0;
        assert!(messages(&config).iter().any(|m| m.contains("ttl_secs")));
    }

    #[test]
    fn queue_smaller_than_batch_fails_validation() {
        let mut config = RelayConfig::default();
        config.audit.queue_capacity = 10;
        config.audit.batch_size = 50;
        assert!(messages(&config).iter().any(|m| m.contains("queue_capacity")));
    }

    #[test]
    fn all_errors_are_collected() {
        let mut config = RelayConfig::default();
        config.cache.ttl_secs = 0;
        config.audit.batch_size = 0;
        config.media.public_url = "not a url".to_string();
        config.optout.extra_keywords = vec!["leave me".to_string()];
        assert_eq!(messages(&config).len(), 4);
    }
}
