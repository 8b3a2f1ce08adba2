/// `ApianNet`: the routing layer between one P2P transport and many
/// group-consensus instances.
///
/// Owns the peer and instance registries; collaborators only ever see
/// derived data. All entry points are synchronous and must be called from
/// one task at a time (see [`runtime`](crate::runtime) for a queue that
/// guarantees it).
///
/// Behaviour is split by concern:
/// - [`dispatch`](crate::dispatch): inbound client messages
/// - [`lifecycle`](crate::lifecycle): peer join/leave
/// - [`clock`](crate::clock): clock-sync relay
/// - [`session`](crate::session): game create/join/leave, outbound sends
use std::collections::VecDeque;

use crate::collab::{ApianApplication, P2pTransport};
use crate::config::NetConfig;
use crate::dispatch::DispatchTable;
use crate::instances::GroupInstanceRegistry;
use crate::message::MessageFactory;
use crate::peers::{Peer, PeerRegistry};
use crate::session::SessionNotice;
use crate::stats::RoutingStats;
use crate::types::{GroupId, PeerId};

pub struct ApianNet<T, A> {
    pub(crate) config: NetConfig,
    pub(crate) transport: T,
    pub(crate) app: A,
    pub(crate) factory: MessageFactory,
    pub(crate) dispatch: DispatchTable<T, A>,
    pub(crate) peers: PeerRegistry,
    pub(crate) instances: GroupInstanceRegistry,
    pub(crate) stats: RoutingStats,
    /// Channel of the game we are in, if any.
    pub(crate) current_game: Option<String>,
    /// Session notices awaiting `pump()`.
    pub(crate) notices: VecDeque<SessionNotice>,
}

impl<T: P2pTransport, A: ApianApplication> ApianNet<T, A> {
    /// Create a net with the built-in message factory.
    pub fn new(transport: T, app: A, config: NetConfig) -> Self {
        Self::with_factory(transport, app, MessageFactory::new(), config)
    }

    /// Create a net with a caller-supplied message factory.
    pub fn with_factory(transport: T, app: A, factory: MessageFactory, config: NetConfig) -> Self {
        Self {
            config,
            transport,
            app,
            factory,
            dispatch: DispatchTable::new(),
            peers: PeerRegistry::new(),
            instances: GroupInstanceRegistry::new(),
            stats: RoutingStats::default(),
            current_game: None,
            notices: VecDeque::new(),
        }
    }

    // ── Collaborators ────────────────────────────────────────────────────

    pub fn app(&self) -> &A {
        &self.app
    }

    pub fn app_mut(&mut self) -> &mut A {
        &mut self.app
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Register parsers for additional wire types.
    pub fn factory_mut(&mut self) -> &mut MessageFactory {
        &mut self.factory
    }

    pub fn config(&self) -> &NetConfig {
        &self.config
    }

    // ── Queries ──────────────────────────────────────────────────────────

    pub fn local_peer_id(&self) -> PeerId {
        self.transport.local_peer_id()
    }

    pub fn current_game_id(&self) -> Option<&str> {
        self.current_game.as_deref()
    }

    pub fn stats(&self) -> RoutingStats {
        self.stats
    }

    pub fn peer(&self, peer_id: &PeerId) -> Option<&Peer> {
        self.peers.get(peer_id)
    }

    pub fn peer_ids(&self) -> Vec<PeerId> {
        self.peers.ids()
    }

    pub fn peer_count(&self) -> usize {
        self.peers.len()
    }

    pub fn has_group_instance(&self, group_id: &GroupId) -> bool {
        self.instances.contains(group_id)
    }

    pub fn group_ids(&self) -> Vec<GroupId> {
        self.instances.group_ids()
    }

    /// Log-friendly source label: `local` for our own traffic.
    pub(crate) fn source_label(&self, from: &PeerId) -> String {
        if *from == self.transport.local_peer_id() {
            "local".to_string()
        } else {
            from.to_string()
        }
    }
}
