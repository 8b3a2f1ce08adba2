/// JSON payload codec for protocol messages.
///
/// Payload layout (camelCase keys):
///
/// ```text
/// {"msgType": "...", "destGroupId": "...", "groupMsgType": "...", <body fields>}
/// ```
///
/// `groupMsgType` is present only on group-channel messages. Body fields
/// sit next to the header fields, not under a nested key, so `msgType` and
/// `destGroupId` are reserved and never appear in a consensus body.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ApianNetError;
use crate::message::types::*;
use crate::types::GroupId;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireMessage {
    msg_type: String,
    #[serde(default)]
    dest_group_id: GroupId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    group_msg_type: Option<String>,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

/// Serialize a message to its JSON payload.
pub fn encode(msg: &ApianMessage) -> Result<String, ApianNetError> {
    let (group_msg_type, fields) = match &msg.body {
        ApianBody::Consensus(fields) => (None, fields.clone()),
        ApianBody::Group(group) => (
            Some(group.group_msg_type().to_string()),
            group_fields(group)?,
        ),
    };

    let wire = WireMessage {
        msg_type: msg.msg_type.clone(),
        dest_group_id: msg.dest_group_id.clone(),
        group_msg_type,
        fields,
    };
    serde_json::to_string(&wire).map_err(|e| ApianNetError::Serialization(e.to_string()))
}

/// Parse a consensus-category payload. The body is kept as-is, including
/// any `groupMsgType` key it happens to carry.
pub fn decode_consensus(payload: &str) -> Result<ApianMessage, ApianNetError> {
    let wire: WireMessage = serde_json::from_str(payload)?;
    let mut fields = wire.fields;
    if let Some(group_msg_type) = wire.group_msg_type {
        fields.insert("groupMsgType".into(), Value::String(group_msg_type));
    }
    Ok(ApianMessage {
        msg_type: wire.msg_type,
        dest_group_id: wire.dest_group_id,
        body: ApianBody::Consensus(fields),
    })
}

/// Parse a group-channel payload into its typed kind.
pub fn decode_group(payload: &str) -> Result<ApianMessage, ApianNetError> {
    let wire: WireMessage = serde_json::from_str(payload)?;
    let Some(group_msg_type) = wire.group_msg_type else {
        return Err(ApianNetError::Deserialization(
            "group message without groupMsgType".into(),
        ));
    };

    let group = match group_msg_type.as_str() {
        GROUP_ANNOUNCE => {
            GroupMessage::Announce(serde_json::from_value(Value::Object(wire.fields))?)
        }
        GROUPS_REQUEST => GroupMessage::GroupsRequest,
        GROUP_MEMBER_STATUS => {
            GroupMessage::MemberStatus(serde_json::from_value(Value::Object(wire.fields))?)
        }
        _ => GroupMessage::Other {
            group_msg_type,
            fields: wire.fields,
        },
    };

    Ok(ApianMessage {
        msg_type: wire.msg_type,
        dest_group_id: wire.dest_group_id,
        body: ApianBody::Group(group),
    })
}

fn group_fields(group: &GroupMessage) -> Result<Map<String, Value>, ApianNetError> {
    let value = match group {
        GroupMessage::Announce(a) => to_value(a)?,
        GroupMessage::GroupsRequest => return Ok(Map::new()),
        GroupMessage::MemberStatus(s) => to_value(s)?,
        GroupMessage::Other { fields, .. } => return Ok(fields.clone()),
    };
    match value {
        Value::Object(map) => Ok(map),
        other => Err(ApianNetError::Serialization(format!(
            "group body is not an object: {other}"
        ))),
    }
}

fn to_value<S: Serialize>(body: &S) -> Result<Value, ApianNetError> {
    serde_json::to_value(body).map_err(|e| ApianNetError::Serialization(e.to_string()))
}
