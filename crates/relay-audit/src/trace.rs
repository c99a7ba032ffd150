// SPDX-FileCopyrightText: 2026 Relay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP exchange traces and their bounded, persisted form.

use std::sync::LazyLock;
use std::time::Duration;

use chrono::{DateTime, Utc};
use regex::Regex;
use relay_config::model::AuditConfig;
use serde::{Deserialize, Serialize};

/// Mask written over secret values.
pub const REDACTED: &str = "**********";

static BEARER_TOKEN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)(bearer\s+)[a-z0-9._~+/=\-]{8,}").ok());

/// One HTTP request/response pair as observed by a provider adapter.
///
/// `request` and `response` hold the raw dumps (start line, headers and
/// body). A trace whose transport failed has no status and may have no
/// response at all.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpTrace {
    pub method: String,
    pub url: String,
    pub request: String,
    pub status_code: Option<u16>,
    pub response: String,
    pub elapsed: Duration,
    pub retries: u32,
    pub created_on: DateTime<Utc>,
}

impl HttpTrace {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            request: String::new(),
            status_code: None,
            response: String::new(),
            elapsed: Duration::ZERO,
            retries: 0,
            created_on: Utc::now(),
        }
    }

    pub fn with_request(mut self, request: impl Into<String>) -> Self {
        self.request = request.into();
        self
    }

    pub fn with_response(mut self, status_code: u16, response: impl Into<String>) -> Self {
        self.status_code = Some(status_code);
        self.response = response.into();
        self
    }

    pub fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed = elapsed;
        self
    }

    /// Masks each secret (longest first, so a secret containing another is
    /// masked whole) and any bearer token in the url, request and response.
    pub fn redact<S: AsRef<str>>(mut self, secrets: &[S]) -> Self {
        let mut sorted: Vec<&str> = secrets
            .iter()
            .map(AsRef::as_ref)
            .filter(|s| !s.is_empty())
            .collect();
        sorted.sort_by_key(|s| std::cmp::Reverse(s.len()));

        for field in [&mut self.url, &mut self.request, &mut self.response] {
            for &secret in &sorted {
                if field.contains(secret) {
                    *field = field.replace(secret, REDACTED);
                }
            }
            if let Some(bearer) = BEARER_TOKEN.as_ref() {
                *field = bearer
                    .replace_all(field, format!("${{1}}{REDACTED}"))
                    .into_owned();
            }
        }
        self
    }
}

/// Byte budgets applied when a trace is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceLimits {
    pub max_url_bytes: usize,
    pub max_request_bytes: usize,
    pub max_response_bytes: usize,
}

impl Default for TraceLimits {
    fn default() -> Self {
        Self::from_config(&AuditConfig::default())
    }
}

impl TraceLimits {
    pub fn from_config(config: &AuditConfig) -> Self {
        Self {
            max_url_bytes: config.max_url_bytes,
            max_request_bytes: config.max_request_bytes,
            max_response_bytes: config.max_response_bytes,
        }
    }
}

/// The persisted form of an [`HttpTrace`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpLog {
    pub method: String,
    pub url: String,
    pub status_code: Option<u16>,
    pub request: String,
    pub response: String,
    pub elapsed_ms: u64,
    pub retries: u32,
    pub created_on: DateTime<Utc>,
}

impl HttpLog {
    pub fn from_trace(trace: HttpTrace, limits: &TraceLimits) -> Self {
        Self {
            method: trace.method,
            url: truncate(trace.url, limits.max_url_bytes),
            status_code: trace.status_code,
            request: truncate(trace.request, limits.max_request_bytes),
            response: truncate(trace.response, limits.max_response_bytes),
            elapsed_ms: u64::try_from(trace.elapsed.as_millis()).unwrap_or(u64::MAX),
            retries: trace.retries,
            created_on: trace.created_on,
        }
    }

    /// True when no response arrived or the status is outside `200..400`.
    pub fn is_error(&self) -> bool {
        !matches!(self.status_code, Some(200..=399))
    }
}

const ELLIPSIS: &str = "...";

/// Cuts `s` to at most `max` bytes on a char boundary, marking the cut.
fn truncate(mut s: String, max: usize) -> String {
    if s.len() <= max {
        return s;
    }
    let mut end = max.saturating_sub(ELLIPSIS.len());
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    s.truncate(end);
    if max >= ELLIPSIS.len() {
        s.push_str(ELLIPSIS);
    }
    s
}
