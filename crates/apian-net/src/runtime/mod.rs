/// Serialized dispatch queue around [`ApianNet`].
///
/// `ApianNet` assumes its entry points are never called concurrently.
/// Transports that do I/O on several threads push [`TransportEvent`]s into
/// this runtime instead; one tokio task owns the net and applies events and
/// application commands strictly one at a time. A `LeaveGame` command is
/// therefore atomic with respect to any dispatch.
mod channel;
mod r#loop;

pub use channel::{ChannelTransport, OutboundFrame};

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::collab::{ApianApplication, P2pTransport};
use crate::error::ApianNetError;
use crate::frame::ClientFrame;
use crate::instances::InstanceHandle;
use crate::message::ApianMessage;
use crate::net::ApianNet;
use crate::session::GameCreationData;
use crate::stats::RoutingStats;
use crate::types::{GroupId, PeerId};

// ── Events (transport → runtime) ──────────────────────────────────────

/// Inbound transport notifications, applied in arrival order.
#[derive(Debug, Clone)]
pub enum TransportEvent {
    PeerJoined {
        peer_id: PeerId,
        hello_data: String,
    },
    PeerLeft {
        peer_id: PeerId,
    },
    PeerSync {
        peer_id: PeerId,
        clock_offset_ms: i64,
        net_lag_ms: i64,
    },
    /// A client message already split into wire type and payload.
    ClientMessage {
        from: PeerId,
        to: String,
        latency_ms: i64,
        frame: ClientFrame,
    },
    /// A client message still in its MessagePack frame encoding.
    ClientData {
        from: PeerId,
        to: String,
        latency_ms: i64,
        data: Vec<u8>,
    },
}

// ── Commands (app → runtime) ──────────────────────────────────────────

/// Commands the application sends to the runtime task.
pub enum RuntimeCommand {
    AddGroupInstance {
        instance: InstanceHandle,
        group_id: GroupId,
    },
    RemoveGroupInstance {
        group_id: GroupId,
    },
    CreateGame {
        data: GameCreationData,
        reply: oneshot::Sender<String>,
    },
    JoinGame {
        channel: String,
        reply: oneshot::Sender<Result<(), ApianNetError>>,
    },
    LeaveGame {
        reply: oneshot::Sender<()>,
    },
    RequestGroups {
        reply: oneshot::Sender<Result<(), ApianNetError>>,
    },
    SendApianMessage {
        channel: String,
        msg: ApianMessage,
        reply: oneshot::Sender<Result<(), ApianNetError>>,
    },
    GetPeers {
        reply: oneshot::Sender<Vec<PeerId>>,
    },
    GetStats {
        reply: oneshot::Sender<RoutingStats>,
    },
    Shutdown,
}

// ── Events (runtime → app) ───────────────────────────────────────────

/// Failures the runtime could not hand back to a caller directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeEvent {
    /// An inbound transport event failed to route. The loop keeps running.
    DispatchFailed { from: PeerId, description: String },
}

// ── RuntimeHandle ────────────────────────────────────────────────────

/// Cloneable handle for sending commands to the runtime.
#[derive(Clone)]
pub struct RuntimeHandle {
    cmd_tx: mpsc::Sender<RuntimeCommand>,
}

impl RuntimeHandle {
    /// Bind an instance to a group.
    pub async fn add_group_instance(
        &self,
        instance: InstanceHandle,
        group_id: GroupId,
    ) -> Result<(), ApianNetError> {
        self.send(RuntimeCommand::AddGroupInstance { instance, group_id })
            .await
    }

    /// Unbind the instance for a group.
    pub async fn remove_group_instance(&self, group_id: GroupId) -> Result<(), ApianNetError> {
        self.send(RuntimeCommand::RemoveGroupInstance { group_id })
            .await
    }

    /// Create a game; returns its id.
    pub async fn create_game(&self, data: GameCreationData) -> Result<String, ApianNetError> {
        let (reply, rx) = oneshot::channel();
        self.send(RuntimeCommand::CreateGame { data, reply }).await?;
        rx.await.map_err(|_| ApianNetError::RuntimeClosed)
    }

    pub async fn join_game(&self, channel: impl Into<String>) -> Result<(), ApianNetError> {
        let (reply, rx) = oneshot::channel();
        self.send(RuntimeCommand::JoinGame {
            channel: channel.into(),
            reply,
        })
        .await?;
        rx.await.map_err(|_| ApianNetError::RuntimeClosed)?
    }

    /// Leave the current game. Returns once both registries are cleared.
    pub async fn leave_game(&self) -> Result<(), ApianNetError> {
        let (reply, rx) = oneshot::channel();
        self.send(RuntimeCommand::LeaveGame { reply }).await?;
        rx.await.map_err(|_| ApianNetError::RuntimeClosed)
    }

    pub async fn request_groups(&self) -> Result<(), ApianNetError> {
        let (reply, rx) = oneshot::channel();
        self.send(RuntimeCommand::RequestGroups { reply }).await?;
        rx.await.map_err(|_| ApianNetError::RuntimeClosed)?
    }

    pub async fn send_apian_message(
        &self,
        channel: impl Into<String>,
        msg: ApianMessage,
    ) -> Result<(), ApianNetError> {
        let (reply, rx) = oneshot::channel();
        self.send(RuntimeCommand::SendApianMessage {
            channel: channel.into(),
            msg,
            reply,
        })
        .await?;
        rx.await.map_err(|_| ApianNetError::RuntimeClosed)?
    }

    /// Currently registered peers.
    pub async fn peers(&self) -> Vec<PeerId> {
        let (reply, rx) = oneshot::channel();
        if self.send(RuntimeCommand::GetPeers { reply }).await.is_err() {
            return Vec::new();
        }
        rx.await.unwrap_or_default()
    }

    /// Routing counters so far.
    pub async fn stats(&self) -> RoutingStats {
        let (reply, rx) = oneshot::channel();
        if self.send(RuntimeCommand::GetStats { reply }).await.is_err() {
            return RoutingStats::default();
        }
        rx.await.unwrap_or_default()
    }

    /// Graceful shutdown.
    pub async fn shutdown(&self) {
        let _ = self.cmd_tx.send(RuntimeCommand::Shutdown).await;
    }

    async fn send(&self, cmd: RuntimeCommand) -> Result<(), ApianNetError> {
        self.cmd_tx
            .send(cmd)
            .await
            .map_err(|_| ApianNetError::RuntimeClosed)
    }
}

// ── RuntimeChannels ──────────────────────────────────────────────────

/// Channels returned when the runtime starts.
pub struct RuntimeChannels<T, A> {
    /// Handle to send commands to the runtime.
    pub handle: RuntimeHandle,
    /// Sender the transport integration pushes inbound events into.
    pub transport: mpsc::Sender<TransportEvent>,
    /// Failures observed while running.
    pub events: mpsc::Receiver<RuntimeEvent>,
    /// Resolves to the net once the runtime shuts down.
    pub task: JoinHandle<ApianNet<T, A>>,
}

// ── NetRuntime ───────────────────────────────────────────────────────

/// The dispatch-queue runtime. Spawn it and talk to it through channels.
pub struct NetRuntime;

impl NetRuntime {
    /// Start the runtime task. Takes ownership of the net.
    ///
    /// Queue capacities come from the net's [`NetConfig`](crate::NetConfig).
    pub fn spawn<T, A>(net: ApianNet<T, A>) -> RuntimeChannels<T, A>
    where
        T: P2pTransport + Send + 'static,
        A: ApianApplication + Send + 'static,
    {
        let config = net.config().clone();
        let (cmd_tx, cmd_rx) = mpsc::channel::<RuntimeCommand>(config.command_buffer);
        let (transport_tx, transport_rx) = mpsc::channel::<TransportEvent>(config.event_buffer);
        let (event_tx, event_rx) = mpsc::channel::<RuntimeEvent>(config.notice_buffer);

        let task = tokio::spawn(r#loop::runtime_loop(net, cmd_rx, transport_rx, event_tx));

        RuntimeChannels {
            handle: RuntimeHandle { cmd_tx },
            transport: transport_tx,
            events: event_rx,
            task,
        }
    }
}
