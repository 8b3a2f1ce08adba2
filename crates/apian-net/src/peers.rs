/// Registry of transport peers connected to the current game channel.
///
/// One entry per remote endpoint, keyed by transport id. Only the
/// peer-lifecycle bridge and session teardown mutate it.
use std::collections::HashMap;

use crate::types::{now_ms, PeerId};

/// A connected transport peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Peer {
    pub peer_id: PeerId,
    /// Hello payload the peer sent on join (usually JSON).
    pub hello_data: String,
    /// When the join notification arrived (Unix ms).
    pub joined_at: u64,
}

#[derive(Debug, Default)]
pub struct PeerRegistry {
    peers: HashMap<PeerId, Peer>,
}

impl PeerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a peer. A repeated join replaces the previous record.
    pub fn insert(&mut self, peer_id: PeerId, hello_data: String) -> Option<Peer> {
        let peer = Peer {
            peer_id: peer_id.clone(),
            hello_data,
            joined_at: now_ms(),
        };
        self.peers.insert(peer_id, peer)
    }

    pub fn get(&self, peer_id: &PeerId) -> Option<&Peer> {
        self.peers.get(peer_id)
    }

    pub fn contains(&self, peer_id: &PeerId) -> bool {
        self.peers.contains_key(peer_id)
    }

    pub fn remove(&mut self, peer_id: &PeerId) -> Option<Peer> {
        self.peers.remove(peer_id)
    }

    /// Drop every record at once. Returns how many there were.
    pub fn clear(&mut self) -> usize {
        let count = self.peers.len();
        self.peers.clear();
        count
    }

    /// Known peer ids, sorted.
    pub fn ids(&self) -> Vec<PeerId> {
        let mut ids: Vec<PeerId> = self.peers.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}
