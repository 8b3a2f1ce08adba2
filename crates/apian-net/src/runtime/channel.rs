/// In-process transport backed by tokio channels.
///
/// Outbound sends become [`OutboundFrame`]s on an unbounded channel that the
/// owner drains and forwards however it likes. Clock-sync snapshots are
/// recorded by the owner and served back through `peer_clock_sync_data`.
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use crate::collab::P2pTransport;
use crate::error::ApianNetError;
use crate::frame::ClientFrame;
use crate::types::{PeerClockSyncData, PeerId};

/// One outbound message, MessagePack-encoded as a [`ClientFrame`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundFrame {
    pub to_channel: String,
    pub data: Vec<u8>,
}

impl OutboundFrame {
    pub fn frame(&self) -> Result<ClientFrame, ApianNetError> {
        ClientFrame::from_bytes(&self.data)
    }
}

#[derive(Clone)]
pub struct ChannelTransport {
    local_id: PeerId,
    joined: Option<String>,
    outbound: mpsc::UnboundedSender<OutboundFrame>,
    clock: Arc<Mutex<HashMap<PeerId, PeerClockSyncData>>>,
}

impl ChannelTransport {
    pub fn new(local_id: impl Into<PeerId>) -> (Self, mpsc::UnboundedReceiver<OutboundFrame>) {
        let (outbound, rx) = mpsc::unbounded_channel();
        let transport = Self {
            local_id: local_id.into(),
            joined: None,
            outbound,
            clock: Arc::new(Mutex::new(HashMap::new())),
        };
        (transport, rx)
    }

    /// Channel currently joined, if any.
    pub fn joined_channel(&self) -> Option<&str> {
        self.joined.as_deref()
    }

    /// Store the latest clock-sync snapshot for a peer.
    ///
    /// Clones share the table, so a clone kept outside the runtime can
    /// record while the runtime serves queries.
    pub fn record_clock_sync(&self, data: PeerClockSyncData) {
        let mut clock = self.clock.lock().unwrap_or_else(|e| e.into_inner());
        clock.insert(data.peer_id.clone(), data);
    }
}

impl P2pTransport for ChannelTransport {
    fn local_peer_id(&self) -> PeerId {
        self.local_id.clone()
    }

    fn join(&mut self, channel: &str, hello_data: &str) -> Result<(), ApianNetError> {
        tracing::debug!("channel transport join {channel} ({} bytes hello)", hello_data.len());
        self.joined = Some(channel.to_string());
        Ok(())
    }

    fn leave(&mut self) {
        if let Some(channel) = self.joined.take() {
            tracing::debug!("channel transport left {channel}");
        }
    }

    fn send_message(
        &mut self,
        to_channel: &str,
        wire_type: &str,
        payload: &str,
    ) -> Result<(), ApianNetError> {
        let data = ClientFrame::new(wire_type, payload).to_bytes()?;
        self.outbound
            .send(OutboundFrame {
                to_channel: to_channel.to_string(),
                data,
            })
            .map_err(|_| ApianNetError::Transport("outbound channel closed".into()))
    }

    fn peer_clock_sync_data(&self, peer_id: &PeerId) -> Option<PeerClockSyncData> {
        let clock = self.clock.lock().unwrap_or_else(|e| e.into_inner());
        clock.get(peer_id).cloned()
    }
}
