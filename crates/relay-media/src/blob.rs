// SPDX-FileCopyrightText: 2026 Relay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Durable storage for attachment bytes.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use relay_config::model::MediaConfig;
use relay_core::RelayError;
use tracing::debug;

/// Stores attachment bytes and hands back the URL they are served from.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Writes `body` at the relative `path`, returning its public URL.
    async fn put(&self, path: &str, content_type: &str, body: Vec<u8>) -> Result<String, RelayError>;
}

/// Blob store backed by a local directory served under a public base URL.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
    public_url: String,
    prefix: String,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>, public_url: &str, prefix: &str) -> Self {
        Self {
            root: root.into(),
            public_url: public_url.trim_end_matches('/').to_string(),
            prefix: prefix.trim_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &MediaConfig) -> Self {
        Self::new(&config.media_dir, &config.public_url, &config.prefix)
    }

    fn url_for(&self, path: &str) -> String {
        if self.prefix.is_empty() {
            format!("{}/{path}", self.public_url)
        } else {
            format!("{}/{}/{path}", self.public_url, self.prefix)
        }
    }
}

fn blob_error(e: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> RelayError {
    RelayError::BlobStore { source: e.into() }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn put(&self, path: &str, content_type: &str, body: Vec<u8>) -> Result<String, RelayError> {
        let relative = Path::new(path);
        if path.is_empty()
            || !relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)))
        {
            return Err(RelayError::InvalidInput(format!(
                "blob path `{path}` must be relative without `..`"
            )));
        }

        let full = self.root.join(relative);
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(blob_error)?;
        }
        let size = body.len();
        tokio::fs::write(&full, body).await.map_err(blob_error)?;
        debug!(path = %full.display(), content_type, size, "attachment stored");

        Ok(self.url_for(path))
    }
}
