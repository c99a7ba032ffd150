// SPDX-FileCopyrightText: 2026 Relay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Attachment ingestion for the relay gateway.
//!
//! Remote media referenced by provider messages is downloaded with a hard
//! size cap, classified ([`classify`]) and re-hosted through a
//! [`BlobStore`], so stored messages never depend on provider URLs that
//! expire.

pub mod blob;
pub mod classify;
pub mod ingest;
pub mod recording;
pub mod service;

pub use blob::{BlobStore, FsBlobStore};
pub use ingest::{
    Attachment, AttachmentIngestor, AttachmentRequestBuilder, BearerTokenRequestBuilder,
    IngestLimits, UNAVAILABLE, build_client,
};
pub use service::{
    AttachmentService, FetchAttachmentError, FetchAttachmentRequest, FetchAttachmentResponse,
};
