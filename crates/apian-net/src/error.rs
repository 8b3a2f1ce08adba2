use crate::types::GroupId;

/// Error type returned by a consensus instance's message handler.
pub type InstanceError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced by the Apian network layer.
///
/// Nothing here is retried or recovered locally: every variant reaches
/// the caller of the failing entry point unchanged.
#[derive(Debug, thiserror::Error)]
pub enum ApianNetError {
    /// The transport delivered a category outside the closed dispatch set.
    #[error("unknown message category: {0}")]
    UnknownCategory(String),

    /// The message factory has no parser for this wire type.
    #[error("no parser registered for wire type: {0}")]
    UnknownWireType(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// A payload on the group channel did not decode to a group message.
    #[error("wire type {wire_type} did not produce a group message")]
    NotAGroupMessage { wire_type: String },

    /// A consensus instance failed while handling a routed message.
    #[error("instance for group {group_id} failed: {source}")]
    Instance {
        group_id: GroupId,
        #[source]
        source: InstanceError,
    },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("no active game session")]
    NoActiveGame,

    #[error("runtime shut down")]
    RuntimeClosed,
}

impl From<serde_json::Error> for ApianNetError {
    fn from(e: serde_json::Error) -> Self {
        ApianNetError::Deserialization(e.to_string())
    }
}

impl From<rmp_serde::encode::Error> for ApianNetError {
    fn from(e: rmp_serde::encode::Error) -> Self {
        ApianNetError::Serialization(e.to_string())
    }
}

impl From<rmp_serde::decode::Error> for ApianNetError {
    fn from(e: rmp_serde::decode::Error) -> Self {
        ApianNetError::Deserialization(e.to_string())
    }
}
