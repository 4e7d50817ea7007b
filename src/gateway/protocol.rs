//! Gateway wire format and close reasons.
//!
//! ```text
//! client → IDENTIFY  { "operation": "IDENTIFY", "data": "<token>" }
//! server ← HELLO     { "operation": "HELLO", "data": { "identity": {..}, "heartbeatInterval": 30000 } }
//! client → HEARTBEAT { "operation": "HEARTBEAT" }
//! server ← HEARTBEAT_ACK { "operation": "HEARTBEAT_ACK" }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;

use crate::store::Identity;

pub const IDENTIFY: &str = "IDENTIFY";
pub const HEARTBEAT: &str = "HEARTBEAT";
pub const HELLO: &str = "HELLO";
pub const HEARTBEAT_ACK: &str = "HEARTBEAT_ACK";

/// A decoded client frame.
#[derive(Debug, Clone, Deserialize)]
pub struct InboundFrame {
    pub operation: String,
    #[serde(default)]
    pub data: Option<Value>,
}

impl InboundFrame {
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn op(&self) -> Operation {
        Operation::from(self.operation.as_str())
    }
}

/// Operations a client may send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Identify,
    Heartbeat,
    Unknown,
}

impl From<&str> for Operation {
    fn from(value: &str) -> Self {
        match value {
            IDENTIFY => Operation::Identify,
            HEARTBEAT => Operation::Heartbeat,
            _ => Operation::Unknown,
        }
    }
}

/// A server → client message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutboundMessage {
    pub operation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl OutboundMessage {
    pub fn new(operation: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            operation: operation.into(),
            data,
        }
    }

    pub fn hello(identity: &Identity, heartbeat_interval_ms: u64) -> Self {
        Self::new(
            HELLO,
            Some(json!({
                "identity": identity,
                "heartbeatInterval": heartbeat_interval_ms,
            })),
        )
    }

    pub fn heartbeat_ack() -> Self {
        Self::new(HEARTBEAT_ACK, None)
    }

    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Why the gateway closed a connection. Codes are stable for clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CloseReason {
    /// The peer closed the socket or the stream ended.
    PeerClosed,
    TransportError,
    UnknownOperation,
    ProtocolError,
    NotIdentified,
    InvalidCredential,
    AlreadyIdentified,
    /// A storage lookup failed while handling the frame.
    ServiceUnavailable,
    /// The access token used to identify was revoked.
    TokenRevoked,
    RateLimited,
    HeartbeatTimeout,
    SendFailure,
}

impl CloseReason {
    pub fn code(&self) -> u16 {
        match self {
            CloseReason::PeerClosed => 1000,
            CloseReason::TransportError => 4000,
            CloseReason::UnknownOperation => 4001,
            CloseReason::ProtocolError => 4002,
            CloseReason::NotIdentified => 4003,
            CloseReason::InvalidCredential => 4004,
            CloseReason::AlreadyIdentified => 4005,
            CloseReason::ServiceUnavailable => 4006,
            CloseReason::TokenRevoked => 4007,
            CloseReason::RateLimited => 4008,
            CloseReason::HeartbeatTimeout => 4009,
            CloseReason::SendFailure => 4010,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CloseReason::PeerClosed => "peer-closed",
            CloseReason::TransportError => "transport-error",
            CloseReason::UnknownOperation => "unknown-operation",
            CloseReason::ProtocolError => "protocol-error",
            CloseReason::NotIdentified => "not-identified",
            CloseReason::InvalidCredential => "invalid-credential",
            CloseReason::AlreadyIdentified => "already-identified",
            CloseReason::ServiceUnavailable => "service-unavailable",
            CloseReason::TokenRevoked => "token-revoked",
            CloseReason::RateLimited => "rate-limited",
            CloseReason::HeartbeatTimeout => "heartbeat-timeout",
            CloseReason::SendFailure => "send-failure",
        }
    }

    /// Whether the server should emit a close frame for this reason.
    pub fn sends_close_frame(&self) -> bool {
        !matches!(self, CloseReason::PeerClosed | CloseReason::TransportError)
    }
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.as_str(), self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn parses_frames_with_and_without_data() {
        let identify = InboundFrame::parse(r#"{"operation":"IDENTIFY","data":"tok"}"#).unwrap();
        assert_eq!(identify.op(), Operation::Identify);
        assert_eq!(identify.data, Some(Value::String("tok".into())));

        let heartbeat = InboundFrame::parse(r#"{"operation":"HEARTBEAT"}"#).unwrap();
        assert_eq!(heartbeat.op(), Operation::Heartbeat);
        assert!(heartbeat.data.is_none());

        let other = InboundFrame::parse(r#"{"operation":"DANCE"}"#).unwrap();
        assert_eq!(other.op(), Operation::Unknown);
    }

    #[test]
    fn malformed_frames_fail_to_parse() {
        assert!(InboundFrame::parse("not json").is_err());
        assert!(InboundFrame::parse(r#"{"data":"x"}"#).is_err());
        assert!(InboundFrame::parse(r#"{"operation":7}"#).is_err());
    }

    #[test]
    fn hello_and_ack_wire_shape() {
        let identity = Identity {
            id: "1".into(),
            username: "alice".into(),
            email: None,
            verified: true,
            bot: false,
        };
        let hello: Value = serde_json::from_str(&OutboundMessage::hello(&identity, 30_000).encode().unwrap()).unwrap();
        assert_eq!(hello["operation"], "HELLO");
        assert_eq!(hello["data"]["heartbeatInterval"], 30_000);
        assert_eq!(hello["data"]["identity"]["username"], "alice");

        assert_eq!(
            OutboundMessage::heartbeat_ack().encode().unwrap(),
            r#"{"operation":"HEARTBEAT_ACK"}"#
        );
    }

    #[test]
    fn close_codes_are_distinct() {
        let all = [
            CloseReason::PeerClosed,
            CloseReason::TransportError,
            CloseReason::UnknownOperation,
            CloseReason::ProtocolError,
            CloseReason::NotIdentified,
            CloseReason::InvalidCredential,
            CloseReason::AlreadyIdentified,
            CloseReason::ServiceUnavailable,
            CloseReason::TokenRevoked,
            CloseReason::RateLimited,
            CloseReason::HeartbeatTimeout,
            CloseReason::SendFailure,
        ];
        let codes: HashSet<u16> = all.iter().map(CloseReason::code).collect();
        assert_eq!(codes.len(), all.len());
    }
}
