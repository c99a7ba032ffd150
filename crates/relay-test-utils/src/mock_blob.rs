// SPDX-FileCopyrightText: 2026 Relay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Blob store that keeps attachments in memory.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use relay_core::RelayError;
use relay_media::BlobStore;

/// A stored attachment as the blob store saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    pub path: String,
    pub content_type: String,
    pub body: Vec<u8>,
}

/// Captures every `put`; URLs are `memory://<path>`.
#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<String, StoredBlob>>,
    failing: AtomicBool,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `put` fail.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub async fn blobs(&self) -> Vec<StoredBlob> {
        self.blobs.lock().await.values().cloned().collect()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, path: &str, content_type: &str, body: Vec<u8>) -> Result<String, RelayError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(RelayError::BlobStore {
                source: "mock blob store unavailable".into(),
            });
        }
        let blob = StoredBlob {
            path: path.to_string(),
            content_type: content_type.to_string(),
            body,
        };
        self.blobs.lock().await.insert(path.to_string(), blob);
        Ok(format!("memory://{path}"))
    }
}
