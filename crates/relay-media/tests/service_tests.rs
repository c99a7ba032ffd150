// SPDX-FileCopyrightText: 2026 Relay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fetch-attachment requests end to end: resolution, ingestion and audit.

use std::sync::Arc;
use std::time::Duration;

use relay_audit::{CommitterConfig, LogCommitter, LogType, TraceLimits};
use relay_channels::ChannelResolver;
use relay_config::model::MediaConfig;
use relay_core::{ChannelType, MsgId, RelayError};
use relay_media::{
    AttachmentIngestor, AttachmentService, FetchAttachmentRequest, IngestLimits, build_client,
};
use relay_test_utils::{MemoryBlobStore, MemoryLogSink, MockChannelStore, channel_fixture};
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Harness {
    service: AttachmentService,
    committer: LogCommitter,
    sink: Arc<MemoryLogSink>,
    store: Arc<MockChannelStore>,
}

async fn harness() -> Harness {
    let store = Arc::new(MockChannelStore::new());
    let resolver = Arc::new(ChannelResolver::new(
        store.clone(),
        Duration::from_secs(60),
        Duration::from_secs(5),
    ));
    let client = build_client(&MediaConfig::default()).unwrap();
    let ingestor = Arc::new(AttachmentIngestor::new(
        client,
        Arc::new(MemoryBlobStore::new()),
        IngestLimits::default(),
    ));
    let sink = Arc::new(MemoryLogSink::new());
    let committer = LogCommitter::start(sink.clone(), CommitterConfig::default());
    let service = AttachmentService::new(resolver, ingestor, committer.queue(), TraceLimits::default());
    Harness {
        service,
        committer,
        sink,
        store,
    }
}

#[tokio::test]
async fn successful_fetch_is_logged_as_attachment_fetch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"%PDF-1.4 test".to_vec(), "application/pdf"))
        .mount(&server)
        .await;

    let h = harness().await;
    let channel = channel_fixture("MGA", "1234");
    h.store.add_channel(channel.clone()).await;

    let response = h
        .service
        .fetch(FetchAttachmentRequest {
            channel_type: ChannelType::new("MGA"),
            channel_uuid: channel.uuid.to_string().to_uppercase(),
            url: format!("{}/doc", server.uri()),
            msg_id: Some(MsgId(42)),
        })
        .await
        .unwrap();

    assert_eq!(response.attachment.content_type, "application/pdf");
    h.committer.stop().await;

    let logs = h.sink.logs().await;
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].uuid, response.log_uuid);
    assert_eq!(logs[0].log_type, LogType::AttachmentFetch);
    assert_eq!(logs[0].msg_id, Some(MsgId(42)));
    assert_eq!(logs[0].channel.channel_uuid(), Some(channel.uuid));
}

#[tokio::test]
async fn failed_fetch_returns_log_uuid_and_records_error() {
    let h = harness().await;
    let channel = channel_fixture("MGA", "1234");
    h.store.add_channel(channel.clone()).await;

    let err = h
        .service
        .fetch(FetchAttachmentRequest {
            channel_type: ChannelType::new("MGA"),
            channel_uuid: channel.uuid.to_string(),
            url: "http://127.0.0.1:1/x.jpg".to_string(),
            msg_id: None,
        })
        .await
        .unwrap_err();

    assert!(matches!(err.error, RelayError::Transport { .. }));
    let log_uuid = err.log_uuid.unwrap();
    h.committer.stop().await;

    let logs = h.sink.logs().await;
    assert_eq!(logs[0].uuid, log_uuid);
    assert!(logs[0].is_error);
    assert!(logs[0].errors[0].message.contains("transport error"));
}

#[tokio::test]
async fn bad_requests_fail_before_a_log_is_opened() {
    let h = harness().await;
    let channel = channel_fixture("MGA", "1234");
    h.store.add_channel(channel.clone()).await;

    let missing_url = h
        .service
        .fetch(FetchAttachmentRequest {
            channel_type: ChannelType::new("MGA"),
            channel_uuid: channel.uuid.to_string(),
            url: " ".to_string(),
            msg_id: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(missing_url.error, RelayError::InvalidInput(_)));
    assert!(missing_url.log_uuid.is_none());

    let bad_uuid = h
        .service
        .fetch(FetchAttachmentRequest {
            channel_type: ChannelType::new("MGA"),
            channel_uuid: "not-a-uuid".to_string(),
            url: "https://example.com/a.jpg".to_string(),
            msg_id: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(bad_uuid.error, RelayError::InvalidInput(_)));

    let wrong_type = h
        .service
        .fetch(FetchAttachmentRequest {
            channel_type: ChannelType::new("TW"),
            channel_uuid: channel.uuid.to_string(),
            url: "https://example.com/a.jpg".to_string(),
            msg_id: None,
        })
        .await
        .unwrap_err();
    assert!(wrong_type.error.is_wrong_type());

    h.committer.stop().await;
    assert_eq!(h.sink.count().await, 0);
}

#[test]
fn request_deserializes_from_json() {
    let request: FetchAttachmentRequest = serde_json::from_str(
        r#"{"channel_type":"TW","channel_uuid":"6a3c2b4e-0a51-4c1e-9b61-1f8d7a1c2e33","url":"https://x/y.jpg"}"#,
    )
    .unwrap();
    assert_eq!(request.channel_type.as_str(), "TW");
    assert_eq!(request.msg_id, None);
}
