// SPDX-FileCopyrightText: 2026 Relay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the relay configuration system.

use figment::Jail;
use relay_config::diagnostic::ConfigError;
use relay_config::{load_and_validate_path, load_and_validate_str, load_config_from_str};

#[test]
fn valid_toml_deserializes_into_relay_config() {
    let toml = r#"
[gateway]
name = "edge-1"
log_level = "debug"

[storage]
database_path = "/tmp/relay-test.db"
wal_mode = false

[cache]
ttl_secs = 30
store_timeout_ms = 250

[audit]
queue_capacity = 64
batch_size = 8
flush_interval_ms = 50

[media]
max_body_bytes = 1048576
public_url = "https://files.example.com"
prefix = "attachments"

[optout]
extra_keywords = ["basta"]
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.gateway.name, "edge-1");
    assert_eq!(config.gateway.log_level, "debug");
    assert_eq!(config.storage.database_path, "/tmp/relay-test.db");
    assert!(!config.storage.wal_mode);
    assert_eq!(config.cache.ttl_secs, 30);
    assert_eq!(config.cache.store_timeout_ms, 250);
    assert_eq!(config.audit.batch_size, 8);
    assert_eq!(config.audit.max_url_bytes, 2048);
    assert_eq!(config.media.max_body_bytes, 1_048_576);
    assert_eq!(config.media.sniff_bytes, 300);
    assert_eq!(config.media.prefix, "attachments");
    assert_eq!(config.optout.extra_keywords, vec!["basta"]);
}

#[test]
fn empty_toml_uses_defaults() {
    let config = load_and_validate_str("").expect("defaults validate");
    assert_eq!(config.cache.ttl_secs, 60);
    assert_eq!(config.audit.queue_capacity, 4096);
    assert_eq!(config.media.public_url, "http://localhost:8000/storage");
}

#[test]
fn unknown_key_suggests_correction() {
    let toml = r#"
[cache]
ttl_sec = 10
"#;
    let errors = load_and_validate_str(toml).unwrap_err();
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        ConfigError::UnknownKey {
            key,
            suggestion,
            span,
            ..
        } => {
            assert_eq!(key, "ttl_sec");
            assert_eq!(suggestion.as_deref(), Some("ttl_secs"));
            assert!(span.is_some());
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}

#[test]
fn unknown_section_is_rejected() {
    let errors = load_and_validate_str("[smtp]\nhost = \"x\"\n").unwrap_err();
    assert!(matches!(&errors[0], ConfigError::UnknownKey { key, .. } if key == "smtp"));
}

#[test]
fn wrong_type_is_reported() {
    let errors = load_and_validate_str("[cache]\nttl_secs = \"soon\"\n").unwrap_err();
    assert!(matches!(&errors[0], ConfigError::InvalidType { key, .. } if key == "cache.ttl_secs"));
}

#[test]
fn validation_runs_after_deserialization() {
    let errors = load_and_validate_str("[cache]\nttl_secs = 0\n").unwrap_err();
    assert!(matches!(&errors[0], ConfigError::Validation { message } if message.contains("ttl_secs")));
}

#[test]
fn env_vars_override_file_values() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "custom.toml",
            r#"
[media]
public_url = "https://file.example.com"
"#,
        )?;
        jail.set_env("RELAY_MEDIA_PUBLIC_URL", "https://env.example.com");
        jail.set_env("RELAY_CACHE_TTL_SECS", "15");

        let config = load_and_validate_path(std::path::Path::new("custom.toml"))
            .map_err(|errors| format!("{errors:?}"))?;
        assert_eq!(config.media.public_url, "https://env.example.com");
        assert_eq!(config.cache.ttl_secs, 15);
        Ok(())
    });
}
