use serde::{Deserialize, Serialize};
use std::fmt;

// ── PeerId ───────────────────────────────────────────────────────────────

/// Transport-level identity of a connected peer.
///
/// Opaque to this layer: whatever string the P2P transport uses.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeerId(pub String);

impl PeerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for PeerId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for PeerId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for PeerId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ── GroupId ──────────────────────────────────────────────────────────────

/// Identifier of one consensus group multiplexed over the transport.
///
/// The empty id is meaningful: a message addressed to `GroupId::none()`
/// is *groupless* and targets the routing layer itself.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(pub String);

impl GroupId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The groupless destination.
    pub fn none() -> Self {
        Self(String::new())
    }

    /// Whether this id addresses no particular group.
    pub fn is_groupless(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for GroupId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for GroupId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for GroupId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ── Clock sync ───────────────────────────────────────────────────────────

/// Per-peer clock measurements as stored by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerClockSyncData {
    pub peer_id: PeerId,
    /// Estimated offset of the peer's system clock from ours.
    pub sys_clock_offset_ms: i64,
    /// Estimated one-way network lag.
    pub network_lag_ms: i64,
    /// Number of sync exchanges the estimate is based on.
    pub sync_count: u32,
}

/// Current Unix time in milliseconds.
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
