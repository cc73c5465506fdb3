//! Wire protocol.
//!
//! Every message is one JSON envelope `{type, projectId?, clientId?,
//! userId?, seq?, payload}`. Inbound types are `presence.update` and
//! `op.submit`; everything else flows server → client. The constants at
//! the top are the transport contract shared with the connection pumps.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::collab::ops::Operation;
use crate::collab::presence::PresenceEntry;
use crate::document::Document;

/// Hard per-connection message size limit.
pub const MAX_MESSAGE_BYTES: usize = 64 * 1024;
/// Bounded per-client send queue; overflow drops the message.
pub const SEND_QUEUE_DEPTH: usize = 256;
/// Heartbeat ping cadence.
pub const PING_INTERVAL: Duration = Duration::from_secs(30);
/// A peer that misses pongs for this long is considered dead.
pub const PONG_DEADLINE: Duration = Duration::from_secs(60);
/// Socket write deadline; a slower peer gets disconnected.
pub const WRITE_DEADLINE: Duration = Duration::from_secs(10);
/// Cadence of the periodic dirty-room flush.
pub const FLUSH_INTERVAL: Duration = Duration::from_secs(30);

/// Message kind strings.
pub mod kind {
    pub const PRESENCE_UPDATE: &str = "presence.update";
    pub const OP_SUBMIT: &str = "op.submit";

    pub const WELCOME: &str = "welcome";
    pub const DOC_SYNC: &str = "doc.sync";
    pub const PRESENCE_STATE: &str = "presence.state";
    pub const PRESENCE_JOIN: &str = "presence.join";
    pub const PRESENCE_LEAVE: &str = "presence.leave";
    pub const OP_ACK: &str = "op.ack";
    pub const OP_NACK: &str = "op.nack";
    pub const OP_BROADCAST: &str = "op.broadcast";
    pub const ERROR: &str = "error";
}

/// The one-size-fits-all message envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seq: Option<u64>,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub payload: Value,
}

impl Envelope {
    #[must_use]
    pub fn new(kind: &str, payload: Value) -> Self {
        Self {
            kind: kind.to_string(),
            project_id: None,
            client_id: None,
            user_id: None,
            seq: None,
            payload,
        }
    }

    #[must_use]
    pub fn welcome(user_id: &str, display_name: &str) -> Self {
        Self::new(
            kind::WELCOME,
            json!({ "userId": user_id, "displayName": display_name }),
        )
    }

    /// Full-document sync sent once on join.
    #[must_use]
    pub fn doc_sync(document: &Document) -> Self {
        let doc = serde_json::to_value(document).unwrap_or(Value::Null);
        Self::new(kind::DOC_SYNC, json!({ "document": doc }))
    }

    /// The whole presence table, sorted by user id for stable output.
    #[must_use]
    pub fn presence_state(users: &[PresenceEntry]) -> Self {
        let users = serde_json::to_value(users).unwrap_or(Value::Null);
        Self::new(kind::PRESENCE_STATE, json!({ "users": users }))
    }

    #[must_use]
    pub fn presence_join(entry: &PresenceEntry) -> Self {
        let user = serde_json::to_value(entry).unwrap_or(Value::Null);
        Self::new(kind::PRESENCE_JOIN, json!({ "user": user }))
    }

    #[must_use]
    pub fn presence_leave(user_id: &str) -> Self {
        Self::new(kind::PRESENCE_LEAVE, json!({ "userId": user_id }))
    }

    #[must_use]
    pub fn presence_update(entry: &PresenceEntry) -> Self {
        let user = serde_json::to_value(entry).unwrap_or(Value::Null);
        Self::new(kind::PRESENCE_UPDATE, json!({ "user": user }))
    }

    #[must_use]
    pub fn op_ack(operation_id: &str, server_seq: u64, server_timestamp: u64) -> Self {
        let mut envelope = Self::new(
            kind::OP_ACK,
            json!({
                "operationId": operation_id,
                "serverSeq": server_seq,
                "serverTimestamp": server_timestamp,
            }),
        );
        envelope.seq = Some(server_seq);
        envelope
    }

    #[must_use]
    pub fn op_nack(operation_id: &str, reason: &str) -> Self {
        Self::new(
            kind::OP_NACK,
            json!({ "operationId": operation_id, "reason": reason }),
        )
    }

    #[must_use]
    pub fn op_broadcast(operation: &Operation, user_id: &str, server_seq: u64) -> Self {
        let op = serde_json::to_value(operation).unwrap_or(Value::Null);
        let mut envelope = Self::new(
            kind::OP_BROADCAST,
            json!({
                "operation": op,
                "userId": user_id,
                "serverSeq": server_seq,
            }),
        );
        envelope.seq = Some(server_seq);
        envelope
    }

    #[must_use]
    pub fn error(message: &str) -> Self {
        Self::new(kind::ERROR, json!({ "message": message }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_wire_shape() {
        let mut envelope = Envelope::op_ack("op_1", 7, 1_700_000_000_000);
        envelope.project_id = Some("proj_a".into());
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["type"], "op.ack");
        assert_eq!(json["projectId"], "proj_a");
        assert_eq!(json["seq"], 7);
        assert_eq!(json["payload"]["serverSeq"], 7);
        assert!(json.get("clientId").is_none());
    }

    #[test]
    fn inbound_parses_without_optionals() {
        let envelope: Envelope =
            serde_json::from_str(r#"{"type":"op.submit","payload":{"operation":{}}}"#).unwrap();
        assert_eq!(envelope.kind, kind::OP_SUBMIT);
        assert!(envelope.project_id.is_none());
    }
}
