/// Protocol message model.
///
/// `ApianMessage` carries the two fields routing needs (`msg_type`,
/// `dest_group_id`) plus a body. Consensus bodies stay opaque JSON objects:
/// only the consensus instance interprets them. Group bodies are typed
/// because the router branches on them.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::category::{MessageCategory, GROUP_MESSAGE};
use crate::types::{GroupId, PeerId};

// ── Group message kinds ──────────────────────────────────────────────────

/// Groupless request asking every instance to describe its group.
pub const GROUPS_REQUEST: &str = "APGrq";
/// Groupless announcement of a group's existence.
pub const GROUP_ANNOUNCE: &str = "APGAnn";
/// Membership status change for one peer in one group.
pub const GROUP_MEMBER_STATUS: &str = "APGMStat";

// ── MemberStatus ─────────────────────────────────────────────────────────

/// Lifecycle state of a peer inside a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MemberStatus {
    New,
    Joining,
    SyncingState,
    Active,
    Removed,
}

// ── Group payloads ───────────────────────────────────────────────────────

/// A group advertising itself to the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupAnnounce {
    pub group_id: GroupId,
    pub group_type: String,
    pub group_creator_id: PeerId,
    pub group_name: String,
}

/// A peer's membership status in a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMemberStatus {
    pub group_id: GroupId,
    pub peer_id: PeerId,
    pub status: MemberStatus,
}

/// Body of a message on the group channel.
#[derive(Debug, Clone, PartialEq)]
pub enum GroupMessage {
    Announce(GroupAnnounce),
    GroupsRequest,
    MemberStatus(GroupMemberStatus),
    /// Any kind this layer does not branch on, kept verbatim.
    Other {
        group_msg_type: String,
        fields: Map<String, Value>,
    },
}

impl GroupMessage {
    /// Wire tag of this group message kind.
    pub fn group_msg_type(&self) -> &str {
        match self {
            GroupMessage::Announce(_) => GROUP_ANNOUNCE,
            GroupMessage::GroupsRequest => GROUPS_REQUEST,
            GroupMessage::MemberStatus(_) => GROUP_MEMBER_STATUS,
            GroupMessage::Other { group_msg_type, .. } => group_msg_type,
        }
    }
}

// ── ApianMessage ─────────────────────────────────────────────────────────

/// Message body.
#[derive(Debug, Clone, PartialEq)]
pub enum ApianBody {
    /// Request, observation, command or clock-offset content.
    Consensus(Map<String, Value>),
    Group(GroupMessage),
}

/// A deserialized protocol message.
#[derive(Debug, Clone, PartialEq)]
pub struct ApianMessage {
    /// Wire type the message travels under.
    pub msg_type: String,
    /// Destination group; empty for groupless messages.
    pub dest_group_id: GroupId,
    pub body: ApianBody,
}

impl ApianMessage {
    /// A consensus-category message addressed to one group.
    pub fn consensus(
        category: MessageCategory,
        dest_group_id: GroupId,
        fields: Map<String, Value>,
    ) -> Self {
        Self {
            msg_type: category.wire_type().to_string(),
            dest_group_id,
            body: ApianBody::Consensus(fields),
        }
    }

    /// A group-channel message.
    pub fn group(dest_group_id: GroupId, message: GroupMessage) -> Self {
        Self {
            msg_type: GROUP_MESSAGE.to_string(),
            dest_group_id,
            body: ApianBody::Group(message),
        }
    }

    /// Groupless request for every group to identify itself.
    pub fn groups_request() -> Self {
        Self::group(GroupId::none(), GroupMessage::GroupsRequest)
    }

    /// Groupless announcement of a group.
    pub fn group_announce(announce: GroupAnnounce) -> Self {
        Self::group(GroupId::none(), GroupMessage::Announce(announce))
    }

    /// Membership status for `peer_id`, addressed to `group_id`.
    pub fn member_status(group_id: GroupId, peer_id: PeerId, status: MemberStatus) -> Self {
        Self::group(
            group_id.clone(),
            GroupMessage::MemberStatus(GroupMemberStatus {
                group_id,
                peer_id,
                status,
            }),
        )
    }

    pub fn as_group(&self) -> Option<&GroupMessage> {
        match &self.body {
            ApianBody::Group(g) => Some(g),
            ApianBody::Consensus(_) => None,
        }
    }

    pub fn is_groupless(&self) -> bool {
        self.dest_group_id.is_groupless()
    }
}
