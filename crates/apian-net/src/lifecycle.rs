/// Peer lifecycle bridge: transport join/leave → registry + instances + app.
///
/// Leave ordering is fixed: every instance gets a synthetic `Removed`
/// status, then the application is told, then the peer record goes.
/// Anyone reacting to the departure can still look the peer up.
use crate::collab::{ApianApplication, P2pTransport};
use crate::error::ApianNetError;
use crate::message::{ApianMessage, MemberStatus};
use crate::net::ApianNet;
use crate::types::PeerId;

impl<T: P2pTransport, A: ApianApplication> ApianNet<T, A> {
    /// A peer joined the game channel.
    pub fn on_peer_joined(&mut self, peer_id: &PeerId, hello_data: &str) {
        if self
            .peers
            .insert(peer_id.clone(), hello_data.to_string())
            .is_some()
        {
            tracing::debug!("peer {peer_id} re-joined, hello data replaced");
        } else {
            tracing::debug!("peer {peer_id} joined");
        }
        if let Some(peer) = self.peers.get(peer_id) {
            self.app.on_peer_joined(peer);
        }
    }

    /// A peer left the game channel.
    ///
    /// Fails only if an instance rejects its membership message; the
    /// remaining steps are then skipped and the error returned.
    pub fn on_peer_left(&mut self, peer_id: &PeerId) -> Result<(), ApianNetError> {
        if !self.peers.contains(peer_id) {
            tracing::debug!("peer {peer_id} left without a join record");
        }

        let local_id = self.transport.local_peer_id();
        for (group_id, instance) in self.instances.iter() {
            let msg =
                ApianMessage::member_status(group_id.clone(), peer_id.clone(), MemberStatus::Removed);
            instance
                .on_apian_message(&local_id, group_id.as_str(), &msg, 0)
                .map_err(|source| ApianNetError::Instance {
                    group_id: group_id.clone(),
                    source,
                })?;
            self.stats.member_removals_synthesized += 1;
        }

        self.app.on_peer_left(peer_id, self.peers.get(peer_id));

        self.peers.remove(peer_id);
        tracing::debug!("peer {peer_id} left, {} remaining", self.peers.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::collab::mock::{journal, AppEvent, MockApp, MockTransport, RecordingInstance};
    use crate::config::NetConfig;
    use crate::message::{GroupMessage, MemberStatus};
    use crate::net::ApianNet;
    use crate::types::{GroupId, PeerId};

    fn net() -> ApianNet<MockTransport, MockApp> {
        ApianNet::new(MockTransport::new("local"), MockApp::default(), NetConfig::new())
    }

    #[test]
    fn join_registers_then_notifies_app() {
        let mut net = net();
        net.on_peer_joined(&"A".into(), "{\"name\":\"a\"}");

        assert_eq!(net.peer(&"A".into()).unwrap().hello_data, "{\"name\":\"a\"}");
        assert_eq!(
            net.app().events,
            vec![AppEvent::PeerJoined("A".into(), "{\"name\":\"a\"}".into())]
        );
    }

    #[test]
    fn leave_fans_out_removed_status_to_every_instance() {
        let mut net = net();
        let g1 = RecordingInstance::new("g1");
        let g2 = RecordingInstance::new("g2");
        net.add_group_instance(g1.clone(), "G1".into());
        net.add_group_instance(g2.clone(), "G2".into());
        for peer in ["A", "B", "C"] {
            net.on_peer_joined(&peer.into(), "");
        }

        net.on_peer_left(&"B".into()).unwrap();

        for (instance, group) in [(&g1, "G1"), (&g2, "G2")] {
            let got = instance.deliveries();
            assert_eq!(got.len(), 1);
            assert_eq!(got[0].from, PeerId::from("local"));
            assert_eq!(got[0].to, group);
            assert_eq!(got[0].latency_ms, 0);
            let Some(GroupMessage::MemberStatus(status)) = got[0].msg.as_group() else {
                panic!("expected member status");
            };
            assert_eq!(status.group_id, GroupId::from(group));
            assert_eq!(status.peer_id, PeerId::from("B"));
            assert_eq!(status.status, MemberStatus::Removed);
        }
        assert_eq!(net.peer_ids(), vec![PeerId::from("A"), PeerId::from("C")]);
        assert_eq!(net.stats().member_removals_synthesized, 2);
    }

    #[test]
    fn leave_order_instances_then_app() {
        let log = journal();
        let mut net = ApianNet::new(
            MockTransport::new("local"),
            MockApp::with_journal(log.clone()),
            NetConfig::new(),
        );
        net.add_group_instance(RecordingInstance::journaled("g1", log.clone()), "G1".into());
        net.add_group_instance(RecordingInstance::journaled("g2", log.clone()), "G2".into());
        net.on_peer_joined(&"B".into(), "");
        log.lock().unwrap().clear();

        net.on_peer_left(&"B".into()).unwrap();

        let entries = log.lock().unwrap().clone();
        assert_eq!(
            entries,
            vec![
                "instance:g1:G1".to_string(),
                "instance:g2:G2".to_string(),
                format!("app:{:?}", AppEvent::PeerLeft("B".into())),
            ]
        );
    }

    #[test]
    fn app_sees_registered_record_on_join_and_leave() {
        let mut net = net();
        net.on_peer_joined(&"B".into(), "{\"seat\":2}");

        net.on_peer_left(&"B".into()).unwrap();

        let departed = &net.app().departed;
        assert_eq!(departed.len(), 1);
        let record = departed[0].as_ref().expect("record present during on_peer_left");
        assert_eq!(record.peer_id, PeerId::from("B"));
        assert_eq!(record.hello_data, "{\"seat\":2}");
        assert!(net.peer(&"B".into()).is_none());
    }

    #[test]
    fn failing_instance_keeps_peer_registered() {
        let mut net = net();
        net.add_group_instance(RecordingInstance::failing("g1"), "G1".into());
        net.on_peer_joined(&"B".into(), "");

        assert!(net.on_peer_left(&"B".into()).is_err());
        assert!(net.peer(&"B".into()).is_some());
        assert!(!net.app().events.contains(&AppEvent::PeerLeft("B".into())));
    }

    #[test]
    fn unknown_peer_leaving_still_reaches_instances() {
        let mut net = net();
        let g1 = RecordingInstance::new("g1");
        net.add_group_instance(g1.clone(), "G1".into());

        net.on_peer_left(&"ghost".into()).unwrap();

        assert_eq!(g1.deliveries().len(), 1);
        assert_eq!(net.app().events, vec![AppEvent::PeerLeft("ghost".into())]);
        assert_eq!(net.app().departed, vec![None]);
    }

    #[test]
    fn leave_with_no_instances_only_updates_registry_and_app() {
        let mut net = net();
        net.on_peer_joined(&"A".into(), "");
        net.on_peer_left(&"A".into()).unwrap();
        assert_eq!(net.peer_count(), 0);
        assert_eq!(net.stats().member_removals_synthesized, 0);
    }
}
