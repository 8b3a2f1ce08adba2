use serde::{Deserialize, Serialize};

use crate::error::ApianNetError;

/// Client-message envelope as it crosses the transport.
///
/// `wire_type` selects the dispatch category and the factory parser;
/// `payload` is the serialized message, opaque at this level.
/// Encoded as MessagePack for transports that carry raw bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientFrame {
    pub wire_type: String,
    pub payload: String,
}

impl ClientFrame {
    pub fn new(wire_type: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            wire_type: wire_type.into(),
            payload: payload.into(),
        }
    }

    /// Serialize to MessagePack bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ApianNetError> {
        rmp_serde::to_vec(self).map_err(Into::into)
    }

    /// Deserialize from MessagePack bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self, ApianNetError> {
        rmp_serde::from_slice(data).map_err(Into::into)
    }
}
