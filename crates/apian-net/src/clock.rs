/// Clock-sync relay.
///
/// Clock sync is session-wide: every instance gets every peer's
/// measurements, whatever groups the peer belongs to.
use crate::collab::{ApianApplication, P2pTransport};
use crate::net::ApianNet;
use crate::types::{PeerClockSyncData, PeerId};

impl<T: P2pTransport, A: ApianApplication> ApianNet<T, A> {
    /// Transport measured clock offset and lag for `peer_id`.
    pub fn on_peer_sync(&mut self, peer_id: &PeerId, clock_offset_ms: i64, net_lag_ms: i64) {
        tracing::trace!("peer sync {peer_id}: offset={clock_offset_ms}ms lag={net_lag_ms}ms");
        for (_, instance) in self.instances.iter() {
            instance.on_peer_sync(peer_id, clock_offset_ms, net_lag_ms);
            self.stats.clock_syncs_relayed += 1;
        }
    }

    /// The transport's stored snapshot for `peer_id`, untouched.
    pub fn peer_clock_sync_data(&self, peer_id: &PeerId) -> Option<PeerClockSyncData> {
        self.transport.peer_clock_sync_data(peer_id)
    }
}
