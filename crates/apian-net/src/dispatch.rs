/// Inbound client-message dispatch.
///
/// Two levels:
/// 1. `DispatchTable`: wire category → handler, built once, closed.
/// 2. The group sub-router: destination lookup, with the groupless
///    kinds (`GroupAnnounce`, `GroupsRequest`) handled specially.
///
/// A message for a group with no registered instance, or a groupless kind
/// with no rule, is dropped without error. Drops are logged at debug level
/// and counted in [`RoutingStats`](crate::RoutingStats).
use std::collections::HashMap;

use crate::category::MessageCategory;
use crate::collab::{ApianApplication, P2pTransport};
use crate::error::ApianNetError;
use crate::frame::ClientFrame;
use crate::instances::InstanceHandle;
use crate::message::{ApianMessage, GroupMessage};
use crate::net::ApianNet;
use crate::types::{GroupId, PeerId};

// ── Dispatch table ─────────────────────────────────────────────────────

/// One inbound client message, as handed over by the transport.
pub(crate) struct Inbound<'a> {
    pub from: &'a PeerId,
    pub to: &'a str,
    pub latency_ms: i64,
    pub wire_type: &'a str,
    pub payload: &'a str,
}

type DispatchFn<T, A> = fn(&mut ApianNet<T, A>, &Inbound<'_>) -> Result<(), ApianNetError>;

/// Immutable category → handler map.
pub(crate) struct DispatchTable<T, A> {
    handlers: HashMap<&'static str, DispatchFn<T, A>>,
}

impl<T: P2pTransport, A: ApianApplication> DispatchTable<T, A> {
    pub(crate) fn new() -> Self {
        let mut handlers: HashMap<&'static str, DispatchFn<T, A>> = HashMap::new();
        for category in MessageCategory::ALL {
            let handler: DispatchFn<T, A> = if category.is_group() {
                ApianNet::dispatch_group_message
            } else {
                ApianNet::dispatch_apian_message
            };
            handlers.insert(category.wire_type(), handler);
        }
        Self { handlers }
    }

    fn get(&self, wire_type: &str) -> Option<DispatchFn<T, A>> {
        self.handlers.get(wire_type).copied()
    }
}

// ── Entry points ───────────────────────────────────────────────────────

impl<T: P2pTransport, A: ApianApplication> ApianNet<T, A> {
    /// Route one inbound client message.
    ///
    /// Fails on a category outside the closed set, on a payload the
    /// factory cannot parse, and on any instance error. Exactly one
    /// category handler runs per call.
    pub fn on_client_message(
        &mut self,
        from: &PeerId,
        to: &str,
        latency_ms: i64,
        wire_type: &str,
        payload: &str,
    ) -> Result<(), ApianNetError> {
        let handler = self
            .dispatch
            .get(wire_type)
            .ok_or_else(|| ApianNetError::UnknownCategory(wire_type.to_string()))?;

        self.stats.dispatched += 1;
        handler(
            self,
            &Inbound {
                from,
                to,
                latency_ms,
                wire_type,
                payload,
            },
        )
    }

    /// [`on_client_message`](Self::on_client_message) for a decoded frame.
    pub fn on_client_frame(
        &mut self,
        from: &PeerId,
        to: &str,
        latency_ms: i64,
        frame: &ClientFrame,
    ) -> Result<(), ApianNetError> {
        self.on_client_message(from, to, latency_ms, &frame.wire_type, &frame.payload)
    }

    /// Build a concrete message through the factory.
    pub fn deserialize_apian_message(
        &self,
        wire_type: &str,
        payload: &str,
    ) -> Result<ApianMessage, ApianNetError> {
        self.factory.deserialize(wire_type, payload)
    }

    // ── Category handlers ──────────────────────────────────────────────

    /// Requests, observations, commands, clock offsets: addressed delivery only.
    fn dispatch_apian_message(&mut self, inbound: &Inbound<'_>) -> Result<(), ApianNetError> {
        let msg = self.deserialize_apian_message(inbound.wire_type, inbound.payload)?;
        tracing::debug!(
            "dispatch apian message: type={} group={} src={}",
            msg.msg_type,
            msg.dest_group_id,
            self.source_label(inbound.from)
        );

        match self.instances.get(&msg.dest_group_id) {
            Some(instance) => {
                deliver(instance, &msg.dest_group_id, inbound, &msg)?;
                self.stats.delivered += 1;
            }
            None => {
                tracing::debug!(
                    "drop {}: no instance for group '{}'",
                    msg.msg_type,
                    msg.dest_group_id
                );
                self.stats.dropped_unknown_group += 1;
            }
        }
        Ok(())
    }

    /// Group channel: addressed delivery, else groupless handling.
    fn dispatch_group_message(&mut self, inbound: &Inbound<'_>) -> Result<(), ApianNetError> {
        let msg = self.deserialize_apian_message(inbound.wire_type, inbound.payload)?;
        let Some(group_msg) = msg.as_group() else {
            return Err(ApianNetError::NotAGroupMessage {
                wire_type: inbound.wire_type.to_string(),
            });
        };
        tracing::debug!(
            "dispatch group message: kind={} group='{}' src={}",
            group_msg.group_msg_type(),
            msg.dest_group_id,
            self.source_label(inbound.from)
        );

        if let Some(instance) = self.instances.get(&msg.dest_group_id) {
            deliver(instance, &msg.dest_group_id, inbound, &msg)?;
            self.stats.delivered += 1;
            return Ok(());
        }

        if !msg.dest_group_id.is_groupless() {
            tracing::debug!(
                "drop {}: no instance for group '{}'",
                group_msg.group_msg_type(),
                msg.dest_group_id
            );
            self.stats.dropped_unknown_group += 1;
            return Ok(());
        }

        self.route_groupless(inbound, &msg, group_msg)
    }

    fn route_groupless(
        &mut self,
        inbound: &Inbound<'_>,
        msg: &ApianMessage,
        group_msg: &GroupMessage,
    ) -> Result<(), ApianNetError> {
        match group_msg {
            GroupMessage::Announce(announce) => {
                self.app.on_group_announce(
                    &announce.group_id,
                    &announce.group_type,
                    &announce.group_creator_id,
                    &announce.group_name,
                );
                self.stats.group_announces += 1;
            }
            GroupMessage::GroupsRequest => {
                for (group_id, instance) in self.instances.iter() {
                    deliver(instance, group_id, inbound, msg)?;
                    self.stats.broadcast_deliveries += 1;
                }
            }
            other => {
                tracing::debug!(
                    "drop groupless {}: no routing rule",
                    other.group_msg_type()
                );
                self.stats.dropped_groupless += 1;
            }
        }
        Ok(())
    }
}

fn deliver(
    instance: &InstanceHandle,
    group_id: &GroupId,
    inbound: &Inbound<'_>,
    msg: &ApianMessage,
) -> Result<(), ApianNetError> {
    instance
        .on_apian_message(inbound.from, inbound.to, msg, inbound.latency_ms)
        .map_err(|source| ApianNetError::Instance {
            group_id: group_id.clone(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collab::mock::{AppEvent, MockApp, MockTransport, RecordingInstance};
    use crate::config::NetConfig;
    use crate::message::codec;
    use crate::message::{GroupAnnounce, MemberStatus};
    use serde_json::{Map, Value};

    fn net() -> ApianNet<MockTransport, MockApp> {
        ApianNet::new(MockTransport::new("local"), MockApp::default(), NetConfig::new())
    }

    fn command_payload(group: &str) -> String {
        let mut fields = Map::new();
        fields.insert("seqNum".into(), Value::from(4));
        codec::encode(&ApianMessage::consensus(
            MessageCategory::ClientCommand,
            group.into(),
            fields,
        ))
        .unwrap()
    }

    fn encoded(msg: &ApianMessage) -> String {
        codec::encode(msg).unwrap()
    }

    // ── Category dispatch ──────────────────────────────────────────────

    #[test]
    fn unknown_category_is_an_error() {
        let mut net = net();
        let err = net
            .on_client_message(&"A".into(), "ch", 0, "APwhat", "{}")
            .unwrap_err();
        assert!(matches!(err, ApianNetError::UnknownCategory(c) if c == "APwhat"));
        assert_eq!(net.stats().dispatched, 0);
    }

    #[test]
    fn consensus_message_reaches_its_group_only() {
        let mut net = net();
        let g1 = RecordingInstance::new("g1");
        let g2 = RecordingInstance::new("g2");
        net.add_group_instance(g1.clone(), "G1".into());
        net.add_group_instance(g2.clone(), "G2".into());

        net.on_client_message(&"A".into(), "G1", 35, "APapCmd", &command_payload("G1"))
            .unwrap();

        let got = g1.deliveries();
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].from, PeerId::from("A"));
        assert_eq!(got[0].to, "G1");
        assert_eq!(got[0].latency_ms, 35);
        assert_eq!(got[0].msg.msg_type, "APapCmd");
        assert!(g2.deliveries().is_empty());
        assert_eq!(net.stats().delivered, 1);
    }

    #[test]
    fn every_consensus_category_uses_addressed_delivery() {
        let mut net = net();
        let g1 = RecordingInstance::new("g1");
        net.add_group_instance(g1.clone(), "G1".into());

        for category in MessageCategory::ALL.into_iter().filter(|c| !c.is_group()) {
            let msg = ApianMessage::consensus(category, "G1".into(), Map::new());
            net.on_client_message(&"A".into(), "G1", 0, category.wire_type(), &encoded(&msg))
                .unwrap();
        }
        assert_eq!(g1.deliveries().len(), 4);
    }

    #[test]
    fn consensus_message_for_unknown_group_is_dropped() {
        let mut net = net();
        let g1 = RecordingInstance::new("g1");
        net.add_group_instance(g1.clone(), "G1".into());

        net.on_client_message(&"A".into(), "G9", 0, "APapRq", &command_payload("G9"))
            .unwrap();

        assert!(g1.deliveries().is_empty());
        assert_eq!(net.stats().dropped_unknown_group, 1);
    }

    #[test]
    fn malformed_payload_fails_the_dispatch() {
        let mut net = net();
        net.add_group_instance(RecordingInstance::new("g1"), "G1".into());
        let err = net
            .on_client_message(&"A".into(), "G1", 0, "APapObs", "not json")
            .unwrap_err();
        assert!(matches!(err, ApianNetError::Deserialization(_)));
    }

    #[test]
    fn instance_error_propagates_with_group() {
        let mut net = net();
        net.add_group_instance(RecordingInstance::failing("g1"), "G1".into());
        let err = net
            .on_client_message(&"A".into(), "G1", 0, "APapCmd", &command_payload("G1"))
            .unwrap_err();
        assert!(matches!(err, ApianNetError::Instance { group_id, .. } if group_id == GroupId::from("G1")));
    }

    #[test]
    fn client_frame_entry_point() {
        let mut net = net();
        let g1 = RecordingInstance::new("g1");
        net.add_group_instance(g1.clone(), "G1".into());
        let frame = ClientFrame::new("APapCmd", command_payload("G1"));
        net.on_client_frame(&"A".into(), "G1", 1, &frame).unwrap();
        assert_eq!(g1.deliveries().len(), 1);
    }

    // ── Group sub-router ───────────────────────────────────────────────

    #[test]
    fn addressed_group_message_reaches_one_instance() {
        let mut net = net();
        let g1 = RecordingInstance::new("g1");
        let g2 = RecordingInstance::new("g2");
        net.add_group_instance(g1.clone(), "G1".into());
        net.add_group_instance(g2.clone(), "G2".into());

        let msg = ApianMessage::member_status("G2".into(), "C".into(), MemberStatus::Active);
        net.on_client_message(&"A".into(), "G2", 3, "APGrp", &encoded(&msg))
            .unwrap();

        assert!(g1.deliveries().is_empty());
        assert_eq!(g2.deliveries().len(), 1);
        assert_eq!(g2.deliveries()[0].msg, msg);
    }

    #[test]
    fn groups_request_broadcasts_once_per_instance() {
        let mut net = net();
        let g1 = RecordingInstance::new("g1");
        let g2 = RecordingInstance::new("g2");
        net.add_group_instance(g1.clone(), "G1".into());
        net.add_group_instance(g2.clone(), "G2".into());

        let msg = ApianMessage::groups_request();
        net.on_client_message(&"A".into(), "game-1", 12, "APGrp", &encoded(&msg))
            .unwrap();

        for instance in [&g1, &g2] {
            let got = instance.deliveries();
            assert_eq!(got.len(), 1);
            assert_eq!(got[0].from, PeerId::from("A"));
            assert_eq!(got[0].to, "game-1");
            assert_eq!(got[0].latency_ms, 12);
            assert_eq!(got[0].msg, msg);
        }
        assert!(net.app().events.is_empty());
        assert_eq!(net.stats().broadcast_deliveries, 2);
    }

    #[test]
    fn group_announce_goes_to_app_only() {
        let mut net = net();
        let g1 = RecordingInstance::new("g1");
        net.add_group_instance(g1.clone(), "G1".into());

        let msg = ApianMessage::group_announce(GroupAnnounce {
            group_id: "G7".into(),
            group_type: "CreatorSez".into(),
            group_creator_id: "B".into(),
            group_name: "Lobby".into(),
        });
        net.on_client_message(&"B".into(), "game-1", 0, "APGrp", &encoded(&msg))
            .unwrap();

        assert!(g1.deliveries().is_empty());
        assert_eq!(
            net.app().events,
            vec![AppEvent::GroupAnnounce {
                group_id: "G7".into(),
                group_type: "CreatorSez".into(),
                creator_id: "B".into(),
                group_name: "Lobby".into(),
            }]
        );
    }

    #[test]
    fn unknown_groupless_kind_is_a_no_op() {
        let mut net = net();
        let g1 = RecordingInstance::new("g1");
        net.add_group_instance(g1.clone(), "G1".into());

        let payload = r#"{"msgType":"APGrp","destGroupId":"","groupMsgType":"APGjr"}"#;
        net.on_client_message(&"A".into(), "game-1", 0, "APGrp", payload)
            .unwrap();

        assert!(g1.deliveries().is_empty());
        assert!(net.app().events.is_empty());
        assert_eq!(net.stats().dropped_groupless, 1);
    }

    #[test]
    fn group_message_for_unknown_group_is_dropped() {
        let mut net = net();
        let g1 = RecordingInstance::new("g1");
        net.add_group_instance(g1.clone(), "G1".into());

        let msg = ApianMessage::member_status("G5".into(), "C".into(), MemberStatus::Joining);
        net.on_client_message(&"A".into(), "G5", 0, "APGrp", &encoded(&msg))
            .unwrap();

        assert!(g1.deliveries().is_empty());
        assert_eq!(net.stats().dropped_unknown_group, 1);
    }

    #[test]
    fn groups_request_with_no_instances_delivers_nothing() {
        let mut net = net();
        net.on_client_message(&"A".into(), "game-1", 0, "APGrp", &encoded(&ApianMessage::groups_request()))
            .unwrap();
        assert_eq!(net.stats().broadcast_deliveries, 0);
        assert_eq!(net.stats().dispatched, 1);
    }

    #[test]
    fn group_channel_rejects_consensus_body() {
        let mut net = net();
        net.factory_mut().register("APGrp", codec::decode_consensus);
        let err = net
            .on_client_message(&"A".into(), "G1", 0, "APGrp", &command_payload("G1"))
            .unwrap_err();
        assert!(matches!(err, ApianNetError::NotAGroupMessage { .. }));
    }

    #[test]
    fn broadcast_stops_at_first_failing_instance() {
        let mut net = net();
        let g1 = RecordingInstance::failing("g1");
        let g2 = RecordingInstance::new("g2");
        net.add_group_instance(g1, "G1".into());
        net.add_group_instance(g2.clone(), "G2".into());

        let result = net.on_client_message(
            &"A".into(),
            "game-1",
            0,
            "APGrp",
            &encoded(&ApianMessage::groups_request()),
        );
        assert!(result.is_err());
        // G1 sorts first, so G2 is never reached.
        assert!(g2.deliveries().is_empty());
    }
}
