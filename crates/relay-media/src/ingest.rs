// SPDX-FileCopyrightText: 2026 Relay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fetches remote attachments and re-hosts them in the blob store.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use relay_audit::{HttpTrace, InteractionLog};
use relay_config::model::MediaConfig;
use relay_core::{Channel, ChannelType, RelayError};
use reqwest::header::{CONTENT_TYPE, HeaderMap};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use crate::blob::BlobStore;
use crate::classify::classify;
use crate::recording::record_fetch;

/// Content type of the degraded result for a non-2xx fetch.
pub const UNAVAILABLE: &str = "unavailable";

/// A re-hosted attachment.
///
/// `content_type` is empty when the type could not be determined; the
/// bytes are stored regardless.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub content_type: String,
    pub url: String,
    pub size: u64,
}

impl Attachment {
    /// The placeholder returned when the remote answered with a non-2xx status.
    pub fn unavailable(url: impl Into<String>) -> Self {
        Self {
            content_type: UNAVAILABLE.to_string(),
            url: url.into(),
            size: 0,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        self.content_type == UNAVAILABLE
    }
}

/// Provider hook for fetches that need more than a plain GET.
#[async_trait]
pub trait AttachmentRequestBuilder: Send + Sync {
    /// Builds the request for `url`. Calls made while building (a token
    /// fetch, say) should be recorded on `log`.
    async fn build_request(
        &self,
        client: &reqwest::Client,
        channel: &Channel,
        url: &Url,
        log: &mut InteractionLog,
    ) -> Result<reqwest::RequestBuilder, RelayError>;

    /// Values to mask in the recorded trace.
    fn redact_values(&self, _channel: &Channel) -> Vec<String> {
        Vec::new()
    }
}

/// GET with an `Authorization: Bearer` header taken from channel config.
#[derive(Debug, Clone)]
pub struct BearerTokenRequestBuilder {
    config_key: String,
}

impl BearerTokenRequestBuilder {
    pub fn new(config_key: impl Into<String>) -> Self {
        Self {
            config_key: config_key.into(),
        }
    }
}

#[async_trait]
impl AttachmentRequestBuilder for BearerTokenRequestBuilder {
    async fn build_request(
        &self,
        client: &reqwest::Client,
        channel: &Channel,
        url: &Url,
        _log: &mut InteractionLog,
    ) -> Result<reqwest::RequestBuilder, RelayError> {
        let token = channel.config_string_or(&self.config_key, "");
        if token.is_empty() {
            return Err(RelayError::InvalidInput(format!(
                "channel {} has no `{}` configured",
                channel.uuid, self.config_key
            )));
        }
        Ok(client.get(url.clone()).bearer_auth(token))
    }

    fn redact_values(&self, channel: &Channel) -> Vec<String> {
        vec![channel.config_string_or(&self.config_key, "")]
    }
}

/// Size and time bounds for ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestLimits {
    pub max_body_bytes: u64,
    pub sniff_bytes: usize,
    pub store_timeout: Duration,
}

impl IngestLimits {
    pub fn from_config(config: &MediaConfig) -> Self {
        Self {
            max_body_bytes: config.max_body_bytes,
            sniff_bytes: config.sniff_bytes,
            store_timeout: Duration::from_secs(config.store_timeout_secs),
        }
    }
}

impl Default for IngestLimits {
    fn default() -> Self {
        Self::from_config(&MediaConfig::default())
    }
}

/// Builds the HTTP client used for attachment fetches.
pub fn build_client(config: &MediaConfig) -> Result<reqwest::Client, RelayError> {
    reqwest::Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.fetch_timeout_secs))
        .build()
        .map_err(|e| RelayError::Transport {
            message: format!("failed to build HTTP client: {e}"),
            source: Some(Box::new(e)),
        })
}

fn transport(message: &str, e: reqwest::Error) -> RelayError {
    RelayError::Transport {
        message: format!("{message}: {e}"),
        source: Some(Box::new(e)),
    }
}

pub struct AttachmentIngestor {
    client: reqwest::Client,
    blob_store: Arc<dyn BlobStore>,
    builders: HashMap<ChannelType, Arc<dyn AttachmentRequestBuilder>>,
    limits: IngestLimits,
}

impl AttachmentIngestor {
    pub fn new(client: reqwest::Client, blob_store: Arc<dyn BlobStore>, limits: IngestLimits) -> Self {
        Self {
            client,
            blob_store,
            builders: HashMap::new(),
            limits,
        }
    }

    /// Registers a custom request builder for one provider type.
    pub fn with_builder(
        mut self,
        channel_type: ChannelType,
        builder: Arc<dyn AttachmentRequestBuilder>,
    ) -> Self {
        self.builders.insert(channel_type, builder);
        self
    }

    /// Downloads `url`, classifies it and stores it.
    ///
    /// The HTTP exchange is always recorded on `log`. Transport failures
    /// and blob store failures are errors; a non-2xx answer is not, and
    /// yields [`Attachment::unavailable`].
    pub async fn fetch_and_store(
        &self,
        channel: &Channel,
        url: &str,
        log: &mut InteractionLog,
    ) -> Result<Attachment, RelayError> {
        let parsed = Url::parse(url)
            .map_err(|e| RelayError::InvalidInput(format!("invalid attachment url `{url}`: {e}")))?;

        let custom = self.builders.get(&channel.channel_type);
        let secrets = custom
            .map(|b| b.redact_values(channel))
            .unwrap_or_default();
        let builder = match custom {
            Some(custom) => custom.build_request(&self.client, channel, &parsed, log).await?,
            None => self.client.get(parsed.clone()),
        };
        let request = builder
            .build()
            .map_err(|e| transport("unable to create attachment request", e))?;

        let mut trace = HttpTrace::new(request.method().as_str(), request.url().as_str())
            .with_request(dump_request(&request));
        let started = Instant::now();

        let mut response = match self.client.execute(request).await {
            Ok(response) => response,
            Err(e) => {
                log.http(trace.with_elapsed(started.elapsed()).redact(&secrets));
                record_fetch("failed");
                return Err(transport("attachment fetch failed", e));
            }
        };

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let mut head = dump_response_head(status, response.version(), response.headers());

        let body = self.read_body(&mut response).await;
        if let Ok(body) = &body
            && let Ok(text) = std::str::from_utf8(body)
        {
            head.push_str(text);
        }
        trace = trace.with_response(status.as_u16(), head);
        log.http(trace.with_elapsed(started.elapsed()).redact(&secrets));
        let body = body.inspect_err(|_| record_fetch("failed"))?;

        if !status.is_success() {
            info!(url, status = status.as_u16(), "attachment unavailable");
            record_fetch("unavailable");
            return Ok(Attachment::unavailable(url));
        }

        let url_extension = std::path::Path::new(parsed.path())
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();
        let head_len = body.len().min(self.limits.sniff_bytes);
        let classified = classify(&body[..head_len], url_extension, content_type.as_deref());

        let size = body.len() as u64;
        let path = blob_path(channel, &classified.extension);
        let stored = tokio::time::timeout(
            self.limits.store_timeout,
            self.blob_store.put(&path, &classified.content_type, body),
        )
        .await
        .unwrap_or(Err(RelayError::Timeout {
            duration: self.limits.store_timeout,
        }))
        .inspect_err(|_| record_fetch("failed"))?;

        debug!(
            channel_uuid = %channel.uuid,
            content_type = %classified.content_type,
            size,
            "attachment ingested"
        );
        record_fetch("stored");
        Ok(Attachment {
            content_type: classified.content_type,
            url: stored,
            size,
        })
    }

    async fn read_body(&self, response: &mut reqwest::Response) -> Result<Vec<u8>, RelayError> {
        let max = self.limits.max_body_bytes;
        let too_large = || RelayError::Transport {
            message: format!("attachment body exceeds {max} bytes"),
            source: None,
        };

        if response.content_length().is_some_and(|len| len > max) {
            return Err(too_large());
        }
        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| transport("error reading attachment body", e))?
        {
            if (body.len() + chunk.len()) as u64 > max {
                return Err(too_large());
            }
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }
}

/// `<org>/<first four of uuid>/<uuid>.<ext>`
fn blob_path(channel: &Channel, extension: &str) -> String {
    let id = uuid::Uuid::new_v4().to_string();
    let mut path = format!("{}/{}/{id}", channel.org_id, &id[..4]);
    if !extension.is_empty() {
        path.push('.');
        path.push_str(extension);
    }
    path
}

fn dump_request(request: &reqwest::Request) -> String {
    let url = request.url();
    let mut dump = format!("{} {}", request.method(), url.path());
    if let Some(query) = url.query() {
        let _ = write!(dump, "?{query}");
    }
    let _ = write!(dump, " HTTP/1.1\r\nHost: {}\r\n", url.host_str().unwrap_or_default());
    write_headers(&mut dump, request.headers());
    dump.push_str("\r\n");
    dump
}

fn dump_response_head(status: reqwest::StatusCode, version: reqwest::Version, headers: &HeaderMap) -> String {
    let mut dump = format!("{version:?} {status}\r\n");
    write_headers(&mut dump, headers);
    dump.push_str("\r\n");
    dump
}

fn write_headers(dump: &mut String, headers: &HeaderMap) {
    for (name, value) in headers {
        let _ = write!(dump, "{name}: {}\r\n", value.to_str().unwrap_or("<binary>"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_sentinel_keeps_original_url() {
        let att = Attachment::unavailable("https://example.com/a.jpg");
        assert!(att.is_unavailable());
        assert_eq!(att.size, 0);
        assert_eq!(att.url, "https://example.com/a.jpg");
    }

    #[test]
    fn response_head_dump() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, "image/png".parse().unwrap());
        let dump = dump_response_head(reqwest::StatusCode::OK, reqwest::Version::HTTP_11, &headers);
        assert_eq!(dump, "HTTP/1.1 200 OK\r\ncontent-type: image/png\r\n\r\n");
    }
}
