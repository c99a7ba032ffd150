// SPDX-FileCopyrightText: 2026 Relay Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Interaction logs: the audit record of one exchange with a provider.
//!
//! An [`InteractionLog`] is open while the exchange is in flight and only
//! accepts traces and errors in that state. [`InteractionLog::close`]
//! consumes it and yields a [`ClosedInteractionLog`], so recording after
//! close does not compile.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use relay_core::{ChannelRef, MsgId, RelayError};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::trace::{HttpLog, HttpTrace, TraceLimits};

/// What kind of exchange a log describes.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    AsRefStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LogType {
    /// Inbound request not yet classified.
    Unknown,
    MsgSend,
    MsgStatus,
    MsgReceive,
    EventReceive,
    TokenFetch,
    AttachmentFetch,
}

/// A structured error attached to a log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelError {
    pub message: String,
    /// Short provider or gateway error code, when one exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ChannelError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
        }
    }

    pub fn with_code(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: Some(code.into()),
        }
    }
}

impl From<&RelayError> for ChannelError {
    fn from(err: &RelayError) -> Self {
        Self::new(err.to_string())
    }
}

impl From<RelayError> for ChannelError {
    fn from(err: RelayError) -> Self {
        Self::from(&err)
    }
}

impl From<&str> for ChannelError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// An open interaction log.
#[derive(Debug)]
pub struct InteractionLog {
    uuid: Uuid,
    log_type: LogType,
    channel: ChannelRef,
    msg_id: Option<MsgId>,
    incoming: Option<HttpTrace>,
    http_logs: Vec<HttpLog>,
    errors: Vec<ChannelError>,
    limits: TraceLimits,
    created_on: DateTime<Utc>,
    started: Instant,
}

impl InteractionLog {
    pub fn new(log_type: LogType, channel: impl Into<ChannelRef>, msg_id: Option<MsgId>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            log_type,
            channel: channel.into(),
            msg_id,
            incoming: None,
            http_logs: Vec::new(),
            errors: Vec::new(),
            limits: TraceLimits::default(),
            created_on: Utc::now(),
            started: Instant::now(),
        }
    }

    /// Opens a log for a request the gateway received.
    ///
    /// The type starts as [`LogType::Unknown`] until the payload is parsed.
    /// The inbound trace becomes the first HTTP entry when the log closes,
    /// ahead of any calls made while handling it.
    pub fn for_incoming(channel: impl Into<ChannelRef>, trace: HttpTrace) -> Self {
        let mut log = Self::new(LogType::Unknown, channel, None);
        log.incoming = Some(trace);
        log
    }

    pub fn for_send(channel: impl Into<ChannelRef>, msg_id: MsgId) -> Self {
        Self::new(LogType::MsgSend, channel, Some(msg_id))
    }

    pub fn with_limits(mut self, limits: TraceLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    pub fn log_type(&self) -> LogType {
        self.log_type
    }

    pub fn set_type(&mut self, log_type: LogType) {
        self.log_type = log_type;
    }

    pub fn channel(&self) -> &ChannelRef {
        &self.channel
    }

    pub fn msg_id(&self) -> Option<MsgId> {
        self.msg_id
    }

    pub fn set_msg_id(&mut self, msg_id: MsgId) {
        self.msg_id = Some(msg_id);
    }

    /// Sets the response the gateway wrote back for an incoming request.
    pub fn respond(&mut self, status_code: u16, response: impl Into<String>) {
        if let Some(incoming) = self.incoming.as_mut() {
            incoming.status_code = Some(status_code);
            incoming.response = response.into();
        }
    }

    /// Appends a trace. Secrets must already be redacted.
    pub fn http(&mut self, trace: HttpTrace) {
        self.http_logs.push(HttpLog::from_trace(trace, &self.limits));
    }

    pub fn error(&mut self, err: impl Into<ChannelError>) {
        self.errors.push(err.into());
    }

    pub fn error_with_code(&mut self, message: impl Into<String>, code: impl Into<String>) {
        self.errors.push(ChannelError::with_code(message, code));
    }

    pub fn errors(&self) -> &[ChannelError] {
        &self.errors
    }

    pub fn http_logs(&self) -> &[HttpLog] {
        &self.http_logs
    }

    pub fn close(mut self) -> ClosedInteractionLog {
        self.close_in_place()
    }

    /// Closes the log, leaving `self` emptied. Used by guards that only
    /// hold the log by reference when they commit it.
    pub(crate) fn close_in_place(&mut self) -> ClosedInteractionLog {
        let mut http_logs = std::mem::take(&mut self.http_logs);
        if let Some(mut incoming) = self.incoming.take() {
            incoming.elapsed = self.started.elapsed();
            http_logs.insert(0, HttpLog::from_trace(incoming, &self.limits));
        }
        let errors = std::mem::take(&mut self.errors);
        let is_error = !errors.is_empty() || http_logs.iter().any(HttpLog::is_error);

        ClosedInteractionLog {
            uuid: self.uuid,
            log_type: self.log_type,
            channel: self.channel.clone(),
            msg_id: self.msg_id,
            http_logs,
            errors,
            is_error,
            created_on: self.created_on,
            elapsed: self.started.elapsed(),
        }
    }
}

/// A finished log, ready to be committed.
#[derive(Debug, Clone, PartialEq)]
pub struct ClosedInteractionLog {
    pub uuid: Uuid,
    pub log_type: LogType,
    pub channel: ChannelRef,
    pub msg_id: Option<MsgId>,
    pub http_logs: Vec<HttpLog>,
    pub errors: Vec<ChannelError>,
    pub is_error: bool,
    pub created_on: DateTime<Utc>,
    pub elapsed: Duration,
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use relay_core::{
        Channel, ChannelId, ChannelRoles, ChannelType, ChannelUuid, ConfigMap, OrgId,
    };

    use super::*;

    fn channel() -> Arc<Channel> {
        Arc::new(Channel {
            id: ChannelId(3),
            uuid: ChannelUuid(Uuid::new_v4()),
            org_id: OrgId(1),
            channel_type: ChannelType::new("TW"),
            name: None,
            schemes: vec!["tel".into()],
            address: Some("+12065551212".into()),
            country: None,
            roles: ChannelRoles::parse("SR"),
            config: ConfigMap::new(),
            org_config: ConfigMap::new(),
            org_is_anon: false,
        })
    }

    fn trace(status: u16) -> HttpTrace {
        HttpTrace::new("POST", "https://api.example.com/messages").with_response(status, "{}")
    }

    #[test]
    fn recorded_error_without_traces_is_error() {
        let mut log = InteractionLog::new(LogType::MsgSend, channel(), Some(MsgId(5)));
        log.error("provider rejected destination");
        let closed = log.close();
        assert!(closed.is_error);
        assert!(closed.http_logs.is_empty());
    }

    #[test]
    fn server_error_trace_is_error() {
        let mut log = InteractionLog::new(LogType::MsgSend, channel(), None);
        log.http(trace(200));
        log.http(trace(500));
        assert!(log.close().is_error);
    }

    #[test]
    fn successful_traces_without_errors_are_not_error() {
        let mut log = InteractionLog::new(LogType::MsgStatus, channel(), None);
        log.http(trace(200));
        log.http(trace(204));
        let closed = log.close();
        assert!(!closed.is_error);
        assert_eq!(closed.http_logs.len(), 2);
    }

    #[test]
    fn incoming_trace_is_prepended_on_close() {
        let incoming = HttpTrace::new("POST", "https://relay.example.com/c/tw/receive");
        let mut log = InteractionLog::for_incoming(channel(), incoming);
        log.http(trace(200));
        log.set_type(LogType::MsgReceive);
        log.respond(200, "accepted");

        let closed = log.close();
        assert_eq!(closed.log_type, LogType::MsgReceive);
        assert_eq!(closed.http_logs.len(), 2);
        assert_eq!(closed.http_logs[0].url, "https://relay.example.com/c/tw/receive");
        assert_eq!(closed.http_logs[0].response, "accepted");
        assert!(!closed.is_error);
    }

    #[test]
    fn coded_errors_keep_their_code() {
        let mut log = InteractionLog::for_send(channel(), MsgId(9));
        log.error_with_code("invalid number", "21211");
        let closed = log.close();
        assert_eq!(closed.errors[0].code.as_deref(), Some("21211"));
        assert_eq!(closed.msg_id, Some(MsgId(9)));
        assert_eq!(closed.log_type.to_string(), "msg_send");
    }

    #[test]
    fn unattributed_log_keeps_channel_type() {
        let log = InteractionLog::new(
            LogType::MsgStatus,
            ChannelRef::Unattributed {
                channel_type: ChannelType::new("SMPP"),
            },
            None,
        );
        let closed = log.close();
        assert_eq!(closed.channel.channel_id(), None);
        assert_eq!(closed.channel.channel_type().as_str(), "SMPP");
    }
}
