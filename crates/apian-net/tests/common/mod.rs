//! Recording doubles shared by the integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use apian_net::message::codec;
use apian_net::{
    ApianApplication, ApianMessage, ApianNet, ApianNetError, GroupId, GroupInstance,
    InstanceError, NetConfig, P2pTransport, Peer, PeerClockSyncData, PeerId,
};

/// Ordered record of every collaborator call, shared across doubles.
pub type Journal = Arc<Mutex<Vec<String>>>;

pub fn journal() -> Journal {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn entries(journal: &Journal) -> Vec<String> {
    journal.lock().unwrap().clone()
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_env_filter("warn").try_init();
}

// ── Transport ────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct TransportLog {
    pub joined: Vec<(String, String)>,
    pub leaves: usize,
    pub sent: Vec<(String, String, String)>,
}

#[derive(Clone)]
pub struct TestTransport {
    pub local_id: PeerId,
    pub log: Arc<Mutex<TransportLog>>,
    pub clock: HashMap<PeerId, PeerClockSyncData>,
}

impl TestTransport {
    pub fn new(local_id: &str) -> Self {
        Self {
            local_id: local_id.into(),
            log: Arc::new(Mutex::new(TransportLog::default())),
            clock: HashMap::new(),
        }
    }
}

impl P2pTransport for TestTransport {
    fn local_peer_id(&self) -> PeerId {
        self.local_id.clone()
    }

    fn join(&mut self, channel: &str, hello_data: &str) -> Result<(), ApianNetError> {
        self.log
            .lock()
            .unwrap()
            .joined
            .push((channel.to_string(), hello_data.to_string()));
        Ok(())
    }

    fn leave(&mut self) {
        self.log.lock().unwrap().leaves += 1;
    }

    fn send_message(
        &mut self,
        to_channel: &str,
        wire_type: &str,
        payload: &str,
    ) -> Result<(), ApianNetError> {
        self.log.lock().unwrap().sent.push((
            to_channel.to_string(),
            wire_type.to_string(),
            payload.to_string(),
        ));
        Ok(())
    }

    fn peer_clock_sync_data(&self, peer_id: &PeerId) -> Option<PeerClockSyncData> {
        self.clock.get(peer_id).cloned()
    }
}

// ── Application ──────────────────────────────────────────────────────

pub struct TestApp {
    pub journal: Journal,
}

impl TestApp {
    pub fn new(journal: Journal) -> Self {
        Self { journal }
    }

    fn record(&self, entry: String) {
        self.journal.lock().unwrap().push(entry);
    }
}

impl ApianApplication for TestApp {
    fn on_game_created(&mut self, game_id: &str) {
        self.record(format!("app:created:{game_id}"));
    }

    fn on_peer_joined(&mut self, peer: &Peer) {
        self.record(format!("app:joined:{}", peer.peer_id));
    }

    /// Journals `app:left:<id>` while the peer is still registered,
    /// `app:left:<id>:unregistered` otherwise.
    fn on_peer_left(&mut self, peer_id: &PeerId, record: Option<&Peer>) {
        match record {
            Some(peer) => self.record(format!("app:left:{}", peer.peer_id)),
            None => self.record(format!("app:left:{peer_id}:unregistered")),
        }
    }

    fn on_group_announce(
        &mut self,
        group_id: &GroupId,
        group_type: &str,
        creator_id: &PeerId,
        group_name: &str,
    ) {
        self.record(format!(
            "app:announce:{group_id}:{group_type}:{creator_id}:{group_name}"
        ));
    }
}

// ── Instance ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Received {
    pub from: PeerId,
    pub to: String,
    pub msg: ApianMessage,
    pub latency_ms: i64,
}

pub struct TestInstance {
    pub name: String,
    pub received: Mutex<Vec<Received>>,
    pub syncs: Mutex<Vec<(PeerId, i64, i64)>>,
    pub journal: Journal,
    pub fail: bool,
}

impl TestInstance {
    pub fn new(name: &str, journal: Journal) -> Arc<Self> {
        Arc::new(Self::build(name, journal, false))
    }

    pub fn failing(name: &str, journal: Journal) -> Arc<Self> {
        Arc::new(Self::build(name, journal, true))
    }

    fn build(name: &str, journal: Journal, fail: bool) -> Self {
        Self {
            name: name.to_string(),
            received: Mutex::new(Vec::new()),
            syncs: Mutex::new(Vec::new()),
            journal,
            fail,
        }
    }

    pub fn received(&self) -> Vec<Received> {
        self.received.lock().unwrap().clone()
    }

    pub fn syncs(&self) -> Vec<(PeerId, i64, i64)> {
        self.syncs.lock().unwrap().clone()
    }
}

impl GroupInstance for TestInstance {
    fn on_apian_message(
        &self,
        from: &PeerId,
        to: &str,
        msg: &ApianMessage,
        latency_ms: i64,
    ) -> Result<(), InstanceError> {
        self.journal
            .lock()
            .unwrap()
            .push(format!("instance:{}:{}", self.name, msg.msg_type));
        if self.fail {
            return Err(format!("{} refused", self.name).into());
        }
        self.received.lock().unwrap().push(Received {
            from: from.clone(),
            to: to.to_string(),
            msg: msg.clone(),
            latency_ms,
        });
        Ok(())
    }

    fn on_peer_sync(&self, peer_id: &PeerId, clock_offset_ms: i64, net_lag_ms: i64) {
        self.syncs
            .lock()
            .unwrap()
            .push((peer_id.clone(), clock_offset_ms, net_lag_ms));
    }
}

// ── Helpers ──────────────────────────────────────────────────────────

pub type TestNet = ApianNet<TestTransport, TestApp>;

pub fn test_net(journal: &Journal) -> TestNet {
    ApianNet::new(
        TestTransport::new("local"),
        TestApp::new(journal.clone()),
        NetConfig::new(),
    )
}

/// Push `msg` through the wire path as if `from` had sent it.
pub fn receive(
    net: &mut TestNet,
    from: &str,
    to: &str,
    latency_ms: i64,
    msg: &ApianMessage,
) -> Result<(), ApianNetError> {
    let payload = codec::encode(msg).unwrap();
    net.on_client_message(&from.into(), to, latency_ms, &msg.msg_type, &payload)
}
