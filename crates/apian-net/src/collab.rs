/// Collaborator interfaces: the P2P transport below and the application above.
use crate::error::ApianNetError;
use crate::peers::Peer;
use crate::types::{GroupId, PeerClockSyncData, PeerId};

/// Capabilities this layer needs from the peer-to-peer transport.
///
/// Inbound transport events are not part of this trait: the transport
/// integration calls the `on_*` entry points of [`ApianNet`](crate::ApianNet).
pub trait P2pTransport {
    /// Our own transport id.
    fn local_peer_id(&self) -> PeerId;

    /// Join a game channel, advertising `hello_data` to peers already there.
    fn join(&mut self, channel: &str, hello_data: &str) -> Result<(), ApianNetError>;

    /// Leave the current game channel.
    fn leave(&mut self);

    /// Publish a serialized message on a channel.
    fn send_message(
        &mut self,
        to_channel: &str,
        wire_type: &str,
        payload: &str,
    ) -> Result<(), ApianNetError>;

    /// Stored clock-sync snapshot for a peer, if the transport has one.
    fn peer_clock_sync_data(&self, peer_id: &PeerId) -> Option<PeerClockSyncData>;
}

/// Application-level ("backend") collaborator.
///
/// Receives session and membership notifications plus group
/// announcements, which no consensus instance sees.
pub trait ApianApplication {
    fn on_game_created(&mut self, game_id: &str);

    /// A peer joined the game channel. `peer` is its entry in the peer registry.
    fn on_peer_joined(&mut self, peer: &Peer);

    /// A peer left. Every instance has been told.
    ///
    /// `record` is the registry entry, still present at this point; `None`
    /// only for a peer that never joined.
    fn on_peer_left(&mut self, peer_id: &PeerId, record: Option<&Peer>);

    fn on_group_announce(
        &mut self,
        group_id: &GroupId,
        group_type: &str,
        creator_id: &PeerId,
        group_name: &str,
    );
}

// ── Recording doubles (tests) ───────────────────────────────────────
