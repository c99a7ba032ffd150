// SPDX-FileCopyrightText: 2026 Relay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tagged configuration values for channel and organization settings.
//!
//! Provider secrets and feature flags arrive as free-form JSON. Rather than
//! probing untyped values at every call site, values are decoded once into
//! [`ConfigValue`] and read through the typed `*_or` accessors on
//! [`ConfigMap`], which fall back to the caller's default on a type mismatch.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single configuration value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<ConfigValue>),
    Map(ConfigMap),
}

impl ConfigValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer view: numbers truncate, numeric strings parse.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ConfigValue::Number(n) if n.is_finite() => Some(*n as i64),
            ConfigValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&ConfigMap> {
        match self {
            ConfigValue::Map(m) => Some(m),
            _ => None,
        }
    }
}

impl From<serde_json::Value> for ConfigValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => ConfigValue::Null,
            serde_json::Value::Bool(b) => ConfigValue::Bool(b),
            serde_json::Value::Number(n) => n.as_f64().map_or(ConfigValue::Null, ConfigValue::Number),
            serde_json::Value::String(s) => ConfigValue::String(s),
            serde_json::Value::Array(items) => {
                ConfigValue::List(items.into_iter().map(ConfigValue::from).collect())
            }
            serde_json::Value::Object(obj) => ConfigValue::Map(ConfigMap(
                obj.into_iter().map(|(k, v)| (k, ConfigValue::from(v))).collect(),
            )),
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        ConfigValue::String(s.to_string())
    }
}

impl From<bool> for ConfigValue {
    fn from(b: bool) -> Self {
        ConfigValue::Bool(b)
    }
}

impl From<i64> for ConfigValue {
    fn from(n: i64) -> Self {
        ConfigValue::Number(n as f64)
    }
}

/// String-keyed configuration map. Absent maps are represented as empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigMap(pub BTreeMap<String, ConfigValue>);

impl ConfigMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON object. `None`, empty input and JSON `null` yield an empty map.
    pub fn from_json(raw: Option<&str>) -> Result<Self, serde_json::Error> {
        match raw.map(str::trim) {
            None | Some("") | Some("null") => Ok(Self::default()),
            Some(raw) => serde_json::from_str(raw),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<ConfigValue>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn string_or(&self, key: &str, default: &str) -> String {
        self.get(key)
            .and_then(ConfigValue::as_str)
            .unwrap_or(default)
            .to_string()
    }

    pub fn int_or(&self, key: &str, default: i64) -> i64 {
        self.get(key).and_then(ConfigValue::as_int).unwrap_or(default)
    }

    pub fn bool_or(&self, key: &str, default: bool) -> bool {
        self.get(key).and_then(ConfigValue::as_bool).unwrap_or(default)
    }

    pub fn map(&self, key: &str) -> Option<&ConfigMap> {
        self.get(key).and_then(ConfigValue::as_map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ConfigMap {
        ConfigMap::from_json(Some(
            r#"{"username":"bob","max_length":160,"port":"2775","secure":true,
                "nested":{"eng":"Reply STOP"},"ratio":1.9}"#,
        ))
        .unwrap()
    }

    #[test]
    fn typed_accessors_read_matching_types() {
        let cfg = sample();
        assert_eq!(cfg.string_or("username", "x"), "bob");
        assert_eq!(cfg.int_or("max_length", 0), 160);
        assert!(cfg.bool_or("secure", false));
        assert_eq!(
            cfg.map("nested").map(|m| m.string_or("eng", "")),
            Some("Reply STOP".to_string())
        );
    }

    #[test]
    fn int_accessor_parses_strings_and_truncates() {
        let cfg = sample();
        assert_eq!(cfg.int_or("port", 0), 2775);
        assert_eq!(cfg.int_or("ratio", 0), 1);
        assert_eq!(cfg.int_or("username", 7), 7);
    }

    #[test]
    fn mismatched_or_missing_values_fall_back() {
        let cfg = sample();
        assert_eq!(cfg.string_or("max_length", "dflt"), "dflt");
        assert!(!cfg.bool_or("username", false));
        assert_eq!(cfg.string_or("missing", "dflt"), "dflt");
        assert!(cfg.map("username").is_none());
    }

    #[test]
    fn null_and_empty_json_give_empty_map() {
        assert!(ConfigMap::from_json(None).unwrap().is_empty());
        assert!(ConfigMap::from_json(Some("null")).unwrap().is_empty());
        assert!(ConfigMap::from_json(Some("  ")).unwrap().is_empty());
        assert!(ConfigMap::from_json(Some("[1,2]")).is_err());
    }

    #[test]
    fn converts_from_json_value() {
        let value = serde_json::json!({"a": [1, "b", null], "c": false});
        let ConfigValue::Map(map) = ConfigValue::from(value) else {
            panic!("expected map");
        };
        assert_eq!(
            map.get("a"),
            Some(&ConfigValue::List(vec![
                ConfigValue::Number(1.0),
                ConfigValue::String("b".into()),
                ConfigValue::Null
            ]))
        );
        assert_eq!(map.get("c"), Some(&ConfigValue::Bool(false)));
    }
}
