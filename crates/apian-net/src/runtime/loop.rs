/// Runtime event loop: the only place the net is touched once spawned.
use tokio::sync::mpsc;

use crate::collab::{ApianApplication, P2pTransport};
use crate::error::ApianNetError;
use crate::frame::ClientFrame;
use crate::net::ApianNet;
use crate::types::PeerId;

use super::{RuntimeCommand, RuntimeEvent, TransportEvent};

/// Main event loop. Owns the net until shutdown, then hands it back.
pub(super) async fn runtime_loop<T, A>(
    mut net: ApianNet<T, A>,
    mut cmd_rx: mpsc::Receiver<RuntimeCommand>,
    mut transport_rx: mpsc::Receiver<TransportEvent>,
    event_tx: mpsc::Sender<RuntimeEvent>,
) -> ApianNet<T, A>
where
    T: P2pTransport,
    A: ApianApplication,
{
    tracing::info!("apian runtime started for {}", net.local_peer_id());

    loop {
        // Transport events first: a command observes every event queued before it.
        tokio::select! {
            biased;

            // ── 1. Inbound transport events ─────────────────────
            Some(event) = transport_rx.recv() => {
                handle_transport_event(&mut net, event, &event_tx);
            }

            // ── 2. Commands from the application ────────────────
            Some(cmd) = cmd_rx.recv() => {
                match cmd {
                    RuntimeCommand::AddGroupInstance { instance, group_id } => {
                        net.add_group_instance(instance, group_id);
                    }
                    RuntimeCommand::RemoveGroupInstance { group_id } => {
                        net.remove_group_instance(&group_id);
                    }
                    RuntimeCommand::CreateGame { data, reply } => {
                        let _ = reply.send(net.create_game(&data));
                    }
                    RuntimeCommand::JoinGame { channel, reply } => {
                        let _ = reply.send(net.join_game(&channel));
                    }
                    RuntimeCommand::LeaveGame { reply } => {
                        net.leave_game();
                        let _ = reply.send(());
                    }
                    RuntimeCommand::RequestGroups { reply } => {
                        let _ = reply.send(net.request_groups());
                    }
                    RuntimeCommand::SendApianMessage { channel, msg, reply } => {
                        let _ = reply.send(net.send_apian_message(&channel, &msg));
                    }
                    RuntimeCommand::GetPeers { reply } => {
                        let _ = reply.send(net.peer_ids());
                    }
                    RuntimeCommand::GetStats { reply } => {
                        let _ = reply.send(net.stats());
                    }
                    RuntimeCommand::Shutdown => {
                        tracing::info!("apian runtime shutting down");
                        break;
                    }
                }
            }

            else => break,
        }

        let delivered = net.pump();
        if delivered > 0 {
            tracing::trace!("pumped {delivered} session notice(s)");
        }
    }

    net
}

// ── Transport event handler ──────────────────────────────────────────

fn handle_transport_event<T, A>(
    net: &mut ApianNet<T, A>,
    event: TransportEvent,
    event_tx: &mpsc::Sender<RuntimeEvent>,
) where
    T: P2pTransport,
    A: ApianApplication,
{
    let (from, result) = match event {
        TransportEvent::PeerJoined {
            peer_id,
            hello_data,
        } => {
            net.on_peer_joined(&peer_id, &hello_data);
            return;
        }
        TransportEvent::PeerSync {
            peer_id,
            clock_offset_ms,
            net_lag_ms,
        } => {
            net.on_peer_sync(&peer_id, clock_offset_ms, net_lag_ms);
            return;
        }
        TransportEvent::PeerLeft { peer_id } => {
            let result = net.on_peer_left(&peer_id);
            (peer_id, result)
        }
        TransportEvent::ClientMessage {
            from,
            to,
            latency_ms,
            frame,
        } => {
            let result = net.on_client_frame(&from, &to, latency_ms, &frame);
            (from, result)
        }
        TransportEvent::ClientData {
            from,
            to,
            latency_ms,
            data,
        } => {
            let result = ClientFrame::from_bytes(&data)
                .and_then(|frame| net.on_client_frame(&from, &to, latency_ms, &frame));
            (from, result)
        }
    };

    if let Err(e) = result {
        report_failure(from, e, event_tx);
    }
}

/// Never waits on the observer: a full or closed event channel drops the event.
fn report_failure(from: PeerId, e: ApianNetError, event_tx: &mpsc::Sender<RuntimeEvent>) {
    tracing::warn!("dispatch from {from} failed: {e}");
    let event = RuntimeEvent::DispatchFailed {
        from,
        description: e.to_string(),
    };
    match event_tx.try_send(event) {
        Ok(()) => {}
        Err(mpsc::error::TrySendError::Full(dropped)) => {
            tracing::warn!("runtime event channel full, dropping {dropped:?}");
        }
        Err(mpsc::error::TrySendError::Closed(_)) => {
            tracing::debug!("runtime event receiver gone");
        }
    }
}
